use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use edugenius::utils::logging;
use edugenius::{App, Config};

/// EduGenius：把教材变成游戏化家教
#[derive(Debug, Parser)]
#[command(name = "edugenius", version, about)]
struct Cli {
    /// 启动时导入的文档（PDF 或 UTF-8 文本）
    #[arg(short, long)]
    document: Option<PathBuf>,

    /// 配置文件路径（默认读取 ./edugenius.toml）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API 密钥（优先于配置文件和环境变量）
    #[arg(long)]
    api_key: Option<String>,

    /// 模型名称
    #[arg(long)]
    model: Option<String>,

    /// 显示详细日志
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref())?
        .with_cli_overrides(cli.api_key, cli.model, cli.verbose)?;

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config);

    // 运行交互界面
    App::new(config).run(cli.document).await?;

    Ok(())
}
