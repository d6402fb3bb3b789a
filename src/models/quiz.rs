use serde::{Deserialize, Serialize};

use crate::models::difficulty::Difficulty;

/// 单道选择题
///
/// `options` 保持后端给出的原始顺序和文本（形如 `"A) Paris"`），
/// 界面层只读不改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub question: String,
    #[serde(default, deserialize_with = "deserialize_options")]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    /// 生成时的难度（后端返回的 JSON 里没有，由调用方补上）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

/// 题目校验失败的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizDefect {
    EmptyQuestion,
    TooFewOptions(usize),
    /// 正确答案没有匹配任何选项
    AnswerNotFound(String),
    /// 正确答案匹配了多个选项
    AmbiguousAnswer { label: String, matches: usize },
}

impl std::fmt::Display for QuizDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizDefect::EmptyQuestion => write!(f, "题干为空"),
            QuizDefect::TooFewOptions(n) => write!(f, "选项数量不足: {}", n),
            QuizDefect::AnswerNotFound(label) => write!(f, "正确答案 '{}' 不在选项中", label),
            QuizDefect::AmbiguousAnswer { label, matches } => {
                write!(f, "正确答案 '{}' 匹配了 {} 个选项", label, matches)
            }
        }
    }
}

/// 取选项的标签：第一个 `)` 之前的部分（去掉首尾空白）
///
/// 没有 `)` 时整段文本就是标签。
pub fn option_label(option: &str) -> &str {
    option.split(')').next().unwrap_or_default().trim()
}

impl Quiz {
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            options,
            correct_answer: correct_answer.into(),
            explanation: explanation.into(),
            difficulty: None,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// 检查题目是否可用：题干非空、至少两个选项、正确答案恰好匹配一个选项标签
    pub fn validate(&self) -> Result<(), QuizDefect> {
        if self.question.trim().is_empty() {
            return Err(QuizDefect::EmptyQuestion);
        }
        if self.options.len() < 2 {
            return Err(QuizDefect::TooFewOptions(self.options.len()));
        }

        let label = self.correct_answer.trim();
        let matches = self
            .options
            .iter()
            .filter(|opt| option_label(opt) == label)
            .count();

        match matches {
            1 => Ok(()),
            0 => Err(QuizDefect::AnswerNotFound(label.to_string())),
            n => Err(QuizDefect::AmbiguousAnswer {
                label: label.to_string(),
                matches: n,
            }),
        }
    }

    /// 把用户输入解析为某个选项的原文
    ///
    /// 支持三种写法：选项标签（`B`，忽略大小写）、从 1 开始的序号（`2`）、
    /// 或者完整的选项文本。
    pub fn resolve_choice(&self, input: &str) -> Option<&str> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Some(opt) = self
            .options
            .iter()
            .find(|opt| option_label(opt).eq_ignore_ascii_case(option_label(input)))
        {
            return Some(opt.as_str());
        }

        if let Ok(n) = input.parse::<usize>() {
            if n >= 1 && n <= self.options.len() {
                return Some(self.options[n - 1].as_str());
            }
        }

        self.options
            .iter()
            .find(|opt| opt.trim() == input)
            .map(String::as_str)
    }

    /// 正确选项的原文
    pub fn correct_option(&self) -> Option<&str> {
        let label = self.correct_answer.trim();
        self.options
            .iter()
            .find(|opt| option_label(opt) == label)
            .map(String::as_str)
    }
}

// 选项既可能是数组 ["A) x", "B) y"]，也可能是对象 {"A": "x", "B": "y"}
fn deserialize_options<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{MapAccess, SeqAccess, Visitor};
    use std::fmt;

    struct OptionsVisitor;

    impl<'de> Visitor<'de> for OptionsVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a list of labeled options or a label-to-text map")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut options = Vec::new();
            while let Some(opt) = seq.next_element::<String>()? {
                options.push(opt);
            }
            Ok(options)
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut options = Vec::new();
            while let Some((label, text)) = map.next_entry::<String, String>()? {
                options.push(format!("{}) {}", label.trim(), text.trim()));
            }
            Ok(options)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(OptionsVisitor)
}
