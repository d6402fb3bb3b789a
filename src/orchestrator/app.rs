//! 交互应用 - 编排层
//!
//! ## 职责
//!
//! 1. **资源所有者**：持有配置、会话和学习流程
//! 2. **命令分发**：把一行输入解析为命令并交给 `StudyFlow`
//! 3. **取消**：后端调用期间按 Ctrl-C 取消本次请求，会话不变
//! 4. **渲染**：把结果交给 `render` 变成文本

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, BackendError, SessionError};
use crate::models::{loaders::display_name, read_document_bytes};
use crate::orchestrator::command::{self, Command};
use crate::orchestrator::render;
use crate::services::{OpenAiTutor, TutoringBackend};
use crate::utils::logging::log_session_end;
use crate::workflow::{Session, StudyFlow};

/// 按配置构造后端
pub type BackendFactory = Box<dyn Fn(&Config) -> Arc<dyn TutoringBackend> + Send + Sync>;

/// 完成即表示取消
pub type CancelFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// 取消信号：每次后端调用取一个新的 future
pub type CancelSignal = Arc<dyn Fn() -> CancelFuture + Send + Sync>;

/// 一条命令执行后的去向
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// 继续交互，打印输出（可能为空）
    Continue(String),
    /// 退出
    Quit,
}

/// 应用主结构
pub struct App {
    config: Config,
    flow: StudyFlow,
    session: Session,
    factory: BackendFactory,
    cancel: CancelSignal,
}

impl App {
    /// 使用 OpenAI 后端创建应用
    pub fn new(config: Config) -> Self {
        Self::with_backend_factory(
            config,
            Box::new(|c: &Config| Arc::new(OpenAiTutor::new(c)) as Arc<dyn TutoringBackend>),
        )
    }

    /// 使用自定义后端创建应用
    pub fn with_backend_factory(config: Config, factory: BackendFactory) -> Self {
        Self {
            flow: StudyFlow::new(&config),
            session: Session::new(),
            config,
            factory,
            cancel: Arc::new(|| Box::pin(ctrl_c_pressed()) as CancelFuture),
        }
    }

    /// 替换取消信号（默认是 Ctrl-C）
    pub fn with_cancel_signal(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// 读取文档、构造后端并导入
    pub async fn launch(&mut self, path: &Path) -> AppResult<()> {
        if self.session.is_launched() {
            return Err(SessionError::AlreadyLaunched.into());
        }
        self.config.require_api_key()?;

        let name = display_name(path);
        let cancel = (self.cancel)();
        let this = &mut *self;
        let launch = async move {
            let bytes = read_document_bytes(path).await?;
            let backend = (this.factory)(&this.config);
            this.flow
                .launch(&mut this.session, backend, &bytes, &name)
                .await
        };

        cancellable(launch, cancel).await
    }

    /// 执行一条命令
    pub async fn execute(&mut self, command: Command) -> Step {
        debug!("执行命令: {:?}", command);

        let output: AppResult<String> = match command {
            Command::Empty => Ok(String::new()),
            Command::Quit => return Step::Quit,
            Command::Help => Ok(render::help(self.session.is_launched())),
            Command::Dashboard => Ok(render::dashboard(&self.session)),
            Command::ApiKey(key) => {
                self.config.llm_api_key = key;
                Ok("🔑 API key set.".to_string())
            }
            Command::Launch(path) => self.launch(&path).await.map(|_| {
                format!(
                    "✓ System Online! Loaded {}.\n{}",
                    display_name(&path),
                    render::help(true)
                )
            }),
            Command::Quiz { difficulty, topic } => cancellable(
                self.flow
                    .generate_quiz(&mut self.session, &topic, difficulty),
                (self.cancel)(),
            )
            .await
            .map(|result| render::quiz_result(&result)),
            Command::Answer(choice) => self
                .flow
                .lock_answer(&mut self.session, &choice)
                .map(|outcome| {
                    format!(
                        "{}\n{}",
                        render::outcome(&outcome),
                        render::profile(&self.session)
                    )
                }),
            Command::Explain => self
                .session
                .current_quiz()
                .ok_or_else(|| AppError::from(SessionError::NoActiveQuiz))
                .map(|q| render::explanation(&q.explanation)),
            Command::Plan => cancellable(
                self.flow.generate_study_plan(&self.session),
                (self.cancel)(),
            )
            .await
                .map(|plan| render::plan(self.config.plan_days, &plan)),
            Command::Ask(query) => cancellable(self.flow.ask(&self.session, &query), (self.cancel)())
                .await
                .map(|answer| render::answer(&answer)),
        };

        match output {
            Ok(text) => Step::Continue(text),
            Err(e) => {
                warn!("命令失败: {}", e);
                Step::Continue(render::error(&e))
            }
        }
    }

    /// 交互主循环
    ///
    /// 传入文档路径时先尝试导入；导入失败不会退出，用户可以再次 `launch`。
    pub async fn run(mut self, document: Option<PathBuf>) -> AppResult<()> {
        println!("{}\n", render::landing());

        if let Some(path) = document {
            let step = self.execute(Command::Launch(path)).await;
            if let Step::Continue(text) = step {
                println!("{}\n", text);
            }
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let prompt = if self.session.is_launched() {
                "edugenius> "
            } else {
                "edugenius (offline)> "
            };
            print!("{}", prompt);
            if let Err(e) = std::io::stdout().flush() {
                warn!("刷新标准输出失败: {}", e);
            }

            let line = tokio::select! {
                line = lines.next_line() => line.map_err(|e| AppError::file_read_failed("<stdin>", e))?,
                _ = ctrl_c_pressed() => None,
            };
            let Some(line) = line else {
                println!();
                break;
            };

            let step = match command::parse(&line) {
                Ok(cmd) => self.execute(cmd).await,
                Err(hint) => Step::Continue(hint),
            };

            match step {
                Step::Continue(text) if text.is_empty() => {}
                Step::Continue(text) => println!("{}\n", text),
                Step::Quit => break,
            }
        }

        log_session_end(
            self.session.xp(),
            self.session.correct_answers(),
            self.session.attempts(),
            self.session.elapsed().num_minutes(),
        );
        info!("👋 再见");
        Ok(())
    }
}

/// 让后端调用可以被取消
///
/// `cancel` 先完成时丢弃 `fut`，返回 `Cancelled`；会话只在 `fut` 完成时才会被修改。
pub async fn cancellable<T>(
    fut: impl Future<Output = AppResult<T>>,
    cancel: impl Future<Output = ()>,
) -> AppResult<T> {
    tokio::select! {
        result = fut => result,
        _ = cancel => {
            warn!("✋ 用户取消了请求");
            Err(BackendError::Cancelled.into())
        }
    }
}

/// 等待 Ctrl-C；无法注册信号处理时永不完成
async fn ctrl_c_pressed() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("无法监听 Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
