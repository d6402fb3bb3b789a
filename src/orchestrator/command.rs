//! 交互命令解析

use std::path::PathBuf;

use crate::models::Difficulty;

/// 一行输入对应的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 导入文档并启动
    Launch(PathBuf),
    /// 设置 API 密钥
    ApiKey(String),
    /// 生成题目；`topic` 为空时使用默认主题
    Quiz {
        difficulty: Difficulty,
        topic: String,
    },
    /// 锁定答案
    Answer(String),
    /// 查看当前题目的解析
    Explain,
    /// 生成学习计划
    Plan,
    /// 快速提问
    Ask(String),
    /// 进度面板
    Dashboard,
    Help,
    Quit,
    /// 空行
    Empty,
}

/// 解析一行输入
///
/// 错误时返回给用户看的提示。
pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Empty);
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };

    match head.to_lowercase().as_str() {
        "launch" | "load" => {
            if rest.is_empty() {
                Err("Usage: launch <path-to-pdf>".to_string())
            } else {
                Ok(Command::Launch(PathBuf::from(rest)))
            }
        }
        "key" => {
            if rest.is_empty() {
                Err("Usage: key <api-key>".to_string())
            } else {
                Ok(Command::ApiKey(rest.to_string()))
            }
        }
        "quiz" | "q" | "generate" => Ok(parse_quiz_args(rest)),
        "answer" | "a" | "lock" => {
            if rest.is_empty() {
                Err("Usage: answer <label or number>".to_string())
            } else {
                Ok(Command::Answer(rest.to_string()))
            }
        }
        "explain" => Ok(Command::Explain),
        "plan" => Ok(Command::Plan),
        "ask" => {
            if rest.is_empty() {
                Err("Usage: ask <question about the document>".to_string())
            } else {
                Ok(Command::Ask(rest.to_string()))
            }
        }
        "dashboard" | "stats" | "progress" => Ok(Command::Dashboard),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("Unknown command '{}'. Type `help`.", other)),
    }
}

/// `quiz [difficulty] [topic...]`：第一个词是难度别名时取作难度
fn parse_quiz_args(rest: &str) -> Command {
    let (first, remainder) = match rest.split_once(char::is_whitespace) {
        Some((f, r)) => (f, r.trim()),
        None => (rest, ""),
    };

    match Difficulty::find(first) {
        Some(difficulty) if !first.is_empty() => Command::Quiz {
            difficulty,
            topic: remainder.to_string(),
        },
        _ => Command::Quiz {
            difficulty: Difficulty::default(),
            topic: rest.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quiz_variants() {
        assert_eq!(
            parse("quiz hard Algebra basics").unwrap(),
            Command::Quiz {
                difficulty: Difficulty::Hard,
                topic: "Algebra basics".into()
            }
        );
        assert_eq!(
            parse("quiz Photosynthesis").unwrap(),
            Command::Quiz {
                difficulty: Difficulty::Easy,
                topic: "Photosynthesis".into()
            }
        );
        assert_eq!(
            parse("q").unwrap(),
            Command::Quiz {
                difficulty: Difficulty::Easy,
                topic: String::new()
            }
        );
        assert_eq!(
            parse("QUIZ Medium").unwrap(),
            Command::Quiz {
                difficulty: Difficulty::Medium,
                topic: String::new()
            }
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("  ").unwrap(), Command::Empty);
        assert_eq!(parse("plan").unwrap(), Command::Plan);
        assert_eq!(parse("stats").unwrap(), Command::Dashboard);
        assert_eq!(parse("exit").unwrap(), Command::Quit);
        assert_eq!(parse("answer B").unwrap(), Command::Answer("B".into()));
        assert_eq!(
            parse("ask what is osmosis?").unwrap(),
            Command::Ask("what is osmosis?".into())
        );
        assert_eq!(
            parse("launch ./books/biology notes.pdf").unwrap(),
            Command::Launch(PathBuf::from("./books/biology notes.pdf"))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("answer").is_err());
        assert!(parse("launch").is_err());
        assert!(parse("ask").is_err());
        assert!(parse("dance").unwrap_err().contains("dance"));
    }
}
