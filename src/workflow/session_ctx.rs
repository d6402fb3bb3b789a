//! 学习会话上下文
//!
//! 一个交互会话的全部可变状态：经验值、当前题目、作答闸门、后端句柄。
//! 由界面层持有并显式传给流程层，不做任何持久化。

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::error::SessionError;
use crate::models::{option_label, Quiz};
use crate::services::TutoringBackend;

/// 答对一题获得的经验值
pub const XP_REWARD: u32 = 10;

/// 每升一级所需经验值
pub const XP_PER_RANK: u32 = 100;

/// 段位（由经验值推导）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    Novice,
    Apprentice,
    Scholar,
    Master,
}

impl Rank {
    pub fn from_xp(xp: u32) -> Self {
        match xp / XP_PER_RANK {
            0 => Rank::Novice,
            1 => Rank::Apprentice,
            2 => Rank::Scholar,
            _ => Rank::Master,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::Novice => "Novice",
            Rank::Apprentice => "Apprentice",
            Rank::Scholar => "Scholar",
            Rank::Master => "Master",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 成就
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Achievement {
    /// 第一次答对
    FirstBlood,
    /// 经验值超过 50
    OnFire,
}

impl Achievement {
    pub fn title(self) -> &'static str {
        match self {
            Achievement::FirstBlood => "First Blood",
            Achievement::OnFire => "On Fire",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Achievement::FirstBlood => "Answered first question correctly",
            Achievement::OnFire => "5 correct answers in a row",
        }
    }
}

/// 锁定答案的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// 答对；`awarded` 为本次获得的经验值（同一题第二次起为 0）
    Correct { awarded: u32, explanation: String },
    /// 答错；不扣分，闸门保持打开
    Incorrect {
        correct_answer: String,
        explanation: String,
    },
}

impl AnswerOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, AnswerOutcome::Correct { .. })
    }

    pub fn explanation(&self) -> &str {
        match self {
            AnswerOutcome::Correct { explanation, .. }
            | AnswerOutcome::Incorrect { explanation, .. } => explanation,
        }
    }
}

/// 学习会话
pub struct Session {
    xp: u32,
    current_quiz: Option<Quiz>,
    /// 当前题目是否已经拿过经验值
    answered: bool,
    backend: Option<Arc<dyn TutoringBackend>>,
    document_name: Option<String>,
    started_at: DateTime<Local>,
    quizzes_generated: u32,
    correct_answers: u32,
    attempts: u32,
}

impl Session {
    pub fn new() -> Self {
        Self {
            xp: 0,
            current_quiz: None,
            answered: false,
            backend: None,
            document_name: None,
            started_at: Local::now(),
            quizzes_generated: 0,
            correct_answers: 0,
            attempts: 0,
        }
    }

    // ========== 后端句柄 ==========

    pub fn is_launched(&self) -> bool {
        self.backend.is_some()
    }

    /// 挂上已完成导入的后端
    pub fn attach_backend(&mut self, backend: Arc<dyn TutoringBackend>, document_name: &str) {
        self.backend = Some(backend);
        self.document_name = Some(document_name.to_string());
    }

    /// 取后端句柄，未启动时报错
    pub fn backend(&self) -> Result<Arc<dyn TutoringBackend>, SessionError> {
        self.backend.clone().ok_or(SessionError::NotLaunched)
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document_name.as_deref()
    }

    // ========== 题目与作答 ==========

    pub fn current_quiz(&self) -> Option<&Quiz> {
        self.current_quiz.as_ref()
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }

    /// 替换当前题目并重置作答闸门
    pub fn set_quiz(&mut self, quiz: Quiz) {
        self.current_quiz = Some(quiz);
        self.answered = false;
        self.quizzes_generated += 1;
    }

    /// 锁定答案
    ///
    /// `choice` 取第一个 `)` 之前的部分作为标签与正确答案比较。
    /// 每道题只在第一次答对时加经验值。
    pub fn lock_answer(&mut self, choice: &str) -> Result<AnswerOutcome, SessionError> {
        let quiz = self.current_quiz.as_ref().ok_or(SessionError::NoActiveQuiz)?;
        let correct_answer = quiz.correct_answer.trim().to_string();
        let explanation = quiz.explanation.clone();

        self.attempts += 1;

        if option_label(choice) != correct_answer {
            return Ok(AnswerOutcome::Incorrect {
                correct_answer,
                explanation,
            });
        }

        let awarded = if self.answered {
            0
        } else {
            self.answered = true;
            self.xp += XP_REWARD;
            self.correct_answers += 1;
            XP_REWARD
        };

        Ok(AnswerOutcome::Correct {
            awarded,
            explanation,
        })
    }

    // ========== 游戏化统计 ==========

    pub fn xp(&self) -> u32 {
        self.xp
    }

    pub fn rank(&self) -> Rank {
        Rank::from_xp(self.xp)
    }

    /// 距离下一段位的进度（0-99）
    pub fn progress_percent(&self) -> u32 {
        self.xp % XP_PER_RANK
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        let mut unlocked = Vec::new();
        if self.xp > 0 {
            unlocked.push(Achievement::FirstBlood);
        }
        if self.xp > 50 {
            unlocked.push(Achievement::OnFire);
        }
        unlocked
    }

    pub fn quizzes_generated(&self) -> u32 {
        self.quizzes_generated
    }

    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn elapsed(&self) -> chrono::Duration {
        Local::now() - self.started_at
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("xp", &self.xp)
            .field("current_quiz", &self.current_quiz)
            .field("answered", &self.answered)
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .field("document_name", &self.document_name)
            .field("started_at", &self.started_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> Quiz {
        Quiz::new(
            "Which organelle makes ATP?",
            vec![
                "A) Nucleus".into(),
                "B) Mitochondrion".into(),
                "C) Ribosome".into(),
            ],
            "B",
            "Mitochondria run cellular respiration.",
        )
    }

    #[test]
    fn test_new_session_defaults() {
        let session = Session::new();
        assert_eq!(session.xp(), 0);
        assert_eq!(session.rank(), Rank::Novice);
        assert!(session.current_quiz().is_none());
        assert!(!session.is_answered());
        assert!(!session.is_launched());
        assert!(matches!(session.backend(), Err(SessionError::NotLaunched)));
    }

    #[test]
    fn test_correct_answer_awards_once() {
        let mut session = Session::new();
        session.set_quiz(quiz());

        let first = session.lock_answer("B) Mitochondrion").unwrap();
        assert_eq!(
            first,
            AnswerOutcome::Correct {
                awarded: 10,
                explanation: "Mitochondria run cellular respiration.".into()
            }
        );
        assert_eq!(session.xp(), 10);

        let second = session.lock_answer("B) Mitochondrion").unwrap();
        assert!(matches!(second, AnswerOutcome::Correct { awarded: 0, .. }));
        assert_eq!(session.xp(), 10);
        assert_eq!(session.correct_answers(), 1);
        assert_eq!(session.attempts(), 2);
    }

    #[test]
    fn test_incorrect_answer_keeps_gate_open() {
        let mut session = Session::new();
        session.set_quiz(quiz());

        let wrong = session.lock_answer("A) Nucleus").unwrap();
        assert_eq!(
            wrong,
            AnswerOutcome::Incorrect {
                correct_answer: "B".into(),
                explanation: "Mitochondria run cellular respiration.".into()
            }
        );
        assert_eq!(session.xp(), 0);
        assert!(!session.is_answered());

        let retry = session.lock_answer("B").unwrap();
        assert!(matches!(retry, AnswerOutcome::Correct { awarded: 10, .. }));
    }

    #[test]
    fn test_new_quiz_resets_gate() {
        let mut session = Session::new();
        session.set_quiz(quiz());
        session.lock_answer("B").unwrap();
        assert!(session.is_answered());

        session.set_quiz(quiz());
        assert!(!session.is_answered());
        assert!(matches!(
            session.lock_answer("B").unwrap(),
            AnswerOutcome::Correct { awarded: 10, .. }
        ));
        assert_eq!(session.xp(), 20);
        assert_eq!(session.quizzes_generated(), 2);
    }

    #[test]
    fn test_lock_without_quiz() {
        let mut session = Session::new();
        assert_eq!(
            session.lock_answer("A"),
            Err(SessionError::NoActiveQuiz)
        );
        assert_eq!(session.attempts(), 0);
    }

    #[test]
    fn test_rank_progress_and_achievements() {
        assert_eq!(Rank::from_xp(99), Rank::Novice);
        assert_eq!(Rank::from_xp(100), Rank::Apprentice);
        assert_eq!(Rank::from_xp(250), Rank::Scholar);
        assert_eq!(Rank::from_xp(1000), Rank::Master);

        let mut session = Session::new();
        assert!(session.achievements().is_empty());

        for _ in 0..6 {
            session.set_quiz(quiz());
            session.lock_answer("B").unwrap();
        }
        assert_eq!(session.xp(), 60);
        assert_eq!(session.progress_percent(), 60);
        assert_eq!(
            session.achievements(),
            vec![Achievement::FirstBlood, Achievement::OnFire]
        );
    }
}
