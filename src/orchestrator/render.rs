//! 终端渲染
//!
//! 纯函数：输入会话或结果，输出要打印的文本。题目和选项原样输出，不做改写。

use crate::error::{AppError, BackendError, ConfigError, FileError, SessionError};
use crate::models::Quiz;
use crate::workflow::session_ctx::XP_PER_RANK;
use crate::workflow::{AnswerOutcome, QuizResult, Session};

const PROGRESS_WIDTH: usize = 20;

pub fn landing() -> String {
    [
        "🎓 Welcome to EduGenius Pro",
        "Upload any textbook, lecture note, or research paper.",
        "Your document becomes a gamified tutor, a study planner, and a quiz master.",
        "",
        "Set OPENAI_API_KEY (or use `key <api-key>`), then `launch <path-to-pdf>`.",
    ]
    .join("\n")
}

pub fn help(launched: bool) -> String {
    let mut lines = vec!["Commands:"];
    if !launched {
        lines.push("  key <api-key>              set the API credential");
        lines.push("  launch <path>              load a textbook and start the tutor");
    }
    lines.extend([
        "  quiz [easy|medium|hard] [topic]   📝 generate a challenge",
        "  answer <label|number>      lock your answer",
        "  explain                    💡 show the explanation",
        "  plan                       📅 generate the study plan",
        "  ask <question>             🤖 quick ask about the document",
        "  dashboard                  📊 XP, rank and achievements",
        "  help                       show this list",
        "  quit                       leave",
    ]);
    lines.join("\n")
}

/// 侧边栏：段位、进度条和经验值
pub fn profile(session: &Session) -> String {
    let progress = session.progress_percent() as usize;
    let filled = progress * PROGRESS_WIDTH / XP_PER_RANK as usize;
    format!(
        "Rank: {} 🎖️  [{}{}]  XP: {}/{} to next level",
        session.rank(),
        "#".repeat(filled),
        ".".repeat(PROGRESS_WIDTH - filled),
        session.progress_percent(),
        XP_PER_RANK
    )
}

pub fn quiz(quiz: &Quiz) -> String {
    let mut out = String::new();
    if let Some(d) = quiz.difficulty {
        out.push_str(&format!("🎯 Active Recall Session ({})\n", d));
    }
    out.push_str(&format!("#### {}\n", quiz.question));
    for option in &quiz.options {
        out.push_str(&format!("  {}\n", option));
    }
    out.push_str("Choose your answer: `answer <label>`");
    out
}

pub fn quiz_result(result: &QuizResult) -> String {
    match result {
        QuizResult::Generated(q) => quiz(q),
        QuizResult::NoQuestion => {
            "📭 The document has nothing on that topic. Try another topic.".to_string()
        }
    }
}

pub fn outcome(outcome: &AnswerOutcome) -> String {
    match outcome {
        AnswerOutcome::Correct { awarded, .. } if *awarded > 0 => {
            format!("✅ Correct! +{} XP", awarded)
        }
        AnswerOutcome::Correct { .. } => "✅ Correct! (XP already claimed for this question)".to_string(),
        AnswerOutcome::Incorrect { correct_answer, .. } => {
            format!("❌ Incorrect. The answer was {}.", correct_answer)
        }
    }
}

pub fn explanation(text: &str) -> String {
    if text.trim().is_empty() {
        "💡 No explanation was provided for this question.".to_string()
    } else {
        format!("💡 {}", text)
    }
}

pub fn plan(days: u8, text: &str) -> String {
    format!(
        "📅 {}-Day Mastery Plan ({})\n\n{}",
        days,
        chrono::Local::now().format("%Y-%m-%d"),
        text
    )
}

pub fn answer(text: &str) -> String {
    format!("🤖 {}", text)
}

pub fn dashboard(session: &Session) -> String {
    let mut lines = vec![
        format!("📊 Total XP: {}", session.xp()),
        profile(session),
        format!(
            "Questions: {} generated, {} correct, {} attempts",
            session.quizzes_generated(),
            session.correct_answers(),
            session.attempts()
        ),
        format!("Session time: {} min", session.elapsed().num_minutes()),
    ];
    if let Some(name) = session.document_name() {
        lines.push(format!("Document: {}", name));
    }

    lines.push("### Recent Achievements".to_string());
    let achievements = session.achievements();
    if achievements.is_empty() {
        lines.push("  (none yet)".to_string());
    }
    for a in achievements {
        lines.push(format!("  🏆 {}: {}", a.title(), a.description()));
    }
    lines.join("\n")
}

/// 每类错误给出不同的提示
pub fn error(err: &AppError) -> String {
    match err {
        AppError::Backend(e) => {
            let icon = match e {
                BackendError::Unauthorized { .. } => "🔑",
                BackendError::DocumentUnreadable { .. } => "📄",
                BackendError::Generation { .. } => "🧩",
                BackendError::Unavailable { .. } | BackendError::Timeout { .. } => "🌐",
                BackendError::Cancelled => "✋",
                BackendError::NotIngested => "📥",
            };
            format!("{} {}", icon, e.user_hint())
        }
        AppError::Session(e) => match e {
            SessionError::NotLaunched => {
                "📥 No document is loaded yet. Use `launch <path>` first.".to_string()
            }
            SessionError::AlreadyLaunched => {
                "The tutor is already running for this session.".to_string()
            }
            SessionError::NoActiveQuiz => {
                "No active question. Generate one with `quiz`.".to_string()
            }
            SessionError::UnknownChoice { choice } => {
                format!("'{}' is not one of the options.", choice)
            }
        },
        AppError::File(FileError::NotFound { path }) => format!("📄 File not found: {}", path),
        AppError::File(e) => format!("📄 {}", e),
        AppError::Config(ConfigError::MissingApiKey) => {
            "🔑 No API key. Set OPENAI_API_KEY or use `key <api-key>`.".to_string()
        }
        AppError::Config(e) => format!("⚙️ {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;

    #[test]
    fn test_quiz_renders_question_and_options_verbatim() {
        let q = Quiz::new(
            "Solve x^2 = 9 (x > 0)",
            vec!["A) 3".into(), "B) -3".into(), "C) 9".into()],
            "A",
            "",
        )
        .with_difficulty(Difficulty::Hard);

        let text = quiz(&q);
        assert!(text.contains("(Hard)"));
        assert!(text.contains("#### Solve x^2 = 9 (x > 0)\n"));
        assert!(text.contains("  A) 3\n  B) -3\n  C) 9\n"));
    }

    #[test]
    fn test_profile_progress_bar() {
        let session = Session::new();
        let text = profile(&session);
        assert!(text.contains("Rank: Novice"));
        assert!(text.contains(&format!("[{}]", ".".repeat(PROGRESS_WIDTH))));
        assert!(text.contains("XP: 0/100"));
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            outcome(&AnswerOutcome::Correct {
                awarded: 10,
                explanation: String::new()
            }),
            "✅ Correct! +10 XP"
        );
        assert!(outcome(&AnswerOutcome::Incorrect {
            correct_answer: "C".into(),
            explanation: String::new()
        })
        .contains("The answer was C."));
    }

    #[test]
    fn test_error_classes_render_distinctly() {
        let rendered: Vec<String> = [
            AppError::from(BackendError::Unauthorized {
                message: "x".into(),
            }),
            AppError::from(BackendError::DocumentUnreadable { reason: "x".into() }),
            AppError::from(BackendError::Generation { reason: "x".into() }),
            AppError::from(BackendError::Unavailable { reason: "x".into() }),
        ]
        .iter()
        .map(error)
        .collect();

        assert!(rendered[0].starts_with("🔑"));
        assert!(rendered[1].starts_with("📄"));
        assert!(rendered[2].starts_with("🧩"));
        assert!(rendered[3].starts_with("🌐"));
    }

    #[test]
    fn test_dashboard_without_achievements() {
        let text = dashboard(&Session::new());
        assert!(text.contains("Total XP: 0"));
        assert!(text.contains("(none yet)"));
    }
}
