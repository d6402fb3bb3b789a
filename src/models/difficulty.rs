use phf::phf_map;
use serde::{Deserialize, Serialize};

/// 题目难度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

/// 难度别名表（键均为小写）
static DIFFICULTY_ALIASES: phf::Map<&'static str, Difficulty> = phf_map! {
    "easy" => Difficulty::Easy,
    "e" => Difficulty::Easy,
    "1" => Difficulty::Easy,
    "简单" => Difficulty::Easy,
    "medium" => Difficulty::Medium,
    "m" => Difficulty::Medium,
    "2" => Difficulty::Medium,
    "normal" => Difficulty::Medium,
    "中等" => Difficulty::Medium,
    "hard" => Difficulty::Hard,
    "h" => Difficulty::Hard,
    "3" => Difficulty::Hard,
    "困难" => Difficulty::Hard,
};

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// 标准名称
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// 从名称或别名解析（忽略大小写）
    pub fn find(s: &str) -> Option<Self> {
        DIFFICULTY_ALIASES.get(s.trim().to_lowercase().as_str()).copied()
    }

    /// 写进提示词的难度说明
    pub fn prompt_hint(self) -> &'static str {
        match self {
            Difficulty::Easy => "a recall question about a single explicit fact",
            Difficulty::Medium => "a question that requires understanding how two ideas relate",
            Difficulty::Hard => {
                "a question that requires applying or analysing the material, with plausible distractors"
            }
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::find(s).ok_or_else(|| format!("未知难度: {} (可选 Easy / Medium / Hard)", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_aliases() {
        assert_eq!(Difficulty::find("Hard"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::find(" MEDIUM "), Some(Difficulty::Medium));
        assert_eq!(Difficulty::find("e"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::find("困难"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::find("extreme"), None);
    }

    #[test]
    fn test_from_str_and_display() {
        let d: Difficulty = "3".parse().unwrap();
        assert_eq!(d, Difficulty::Hard);
        assert_eq!(d.to_string(), "Hard");
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_default_is_easy() {
        assert_eq!(Difficulty::default(), Difficulty::Easy);
    }
}
