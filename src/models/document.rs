//! 已导入的文档
//!
//! 文本按段落切块，提问或出题时按关键词挑选相关块拼成上下文。

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// 不参与检索打分的常见词
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "what", "which", "about", "into",
    "general", "review", "how", "why", "are", "was", "were", "does",
];

fn paragraph_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("paragraph regex is valid"))
}

fn word_splitter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{N}]+").expect("word regex is valid"))
}

#[derive(Debug, Clone)]
pub struct Document {
    /// 来源名称（文件名），仅用于日志和展示
    pub source: String,
    pub text: String,
    pub chunks: Vec<String>,
}

impl Document {
    /// 由提取出的纯文本构建文档并切块
    pub fn from_text(source: impl Into<String>, text: &str, chunk_chars: usize) -> Self {
        let chunk_chars = chunk_chars.max(1);
        let mut chunks = Vec::new();
        let mut current = String::new();

        for paragraph in paragraph_break().split(text) {
            let paragraph = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
            if paragraph.is_empty() {
                continue;
            }

            if !current.is_empty()
                && current.chars().count() + paragraph.chars().count() + 1 > chunk_chars
            {
                chunks.push(std::mem::take(&mut current));
            }

            if paragraph.chars().count() > chunk_chars {
                // 超长段落按字符硬切
                let chars: Vec<char> = paragraph.chars().collect();
                for piece in chars.chunks(chunk_chars) {
                    chunks.push(piece.iter().collect());
                }
                continue;
            }

            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(&paragraph);
        }
        if !current.is_empty() {
            chunks.push(current);
        }

        Self {
            source: source.into(),
            text: text.to_string(),
            chunks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// 按查询词挑选相关块，按原文顺序拼接，总长不超过 `max_chars`
    ///
    /// 没有任何块命中时退回到文档开头。
    pub fn select_context(&self, query: &str, max_chars: usize) -> String {
        let terms = query_terms(query);

        let mut scored: Vec<(usize, usize)> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(idx, chunk)| {
                let lower = chunk.to_lowercase();
                let score = terms.iter().filter(|t| lower.contains(t.as_str())).count();
                (idx, score)
            })
            .filter(|(_, score)| *score > 0)
            .collect();

        if scored.is_empty() {
            return self.leading_context(max_chars);
        }

        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut picked = Vec::new();
        let mut used = 0;
        for (idx, _) in scored {
            let len = self.chunks[idx].chars().count();
            if used + len > max_chars {
                continue;
            }
            used += len;
            picked.push(idx);
        }
        picked.sort_unstable();

        self.join(&picked)
    }

    /// 从全文均匀抽取若干块，用于学习计划这类需要全局视角的请求
    pub fn overview(&self, max_chars: usize) -> String {
        if self.chunks.is_empty() {
            return String::new();
        }

        let avg = (self.text.chars().count() / self.chunks.len()).max(1);
        let budget_chunks = (max_chars / avg).max(1);
        if budget_chunks >= self.chunks.len() {
            return self.leading_context(max_chars);
        }

        let step = self.chunks.len() as f64 / budget_chunks as f64;
        let mut picked: Vec<usize> = (0..budget_chunks)
            .map(|i| (i as f64 * step) as usize)
            .collect();
        picked.dedup();

        let mut used = 0;
        picked.retain(|&idx| {
            let len = self.chunks[idx].chars().count();
            if used + len > max_chars {
                return false;
            }
            used += len;
            true
        });

        self.join(&picked)
    }

    fn leading_context(&self, max_chars: usize) -> String {
        let mut picked = Vec::new();
        let mut used = 0;
        for (idx, chunk) in self.chunks.iter().enumerate() {
            let len = chunk.chars().count();
            if used + len > max_chars {
                break;
            }
            used += len;
            picked.push(idx);
        }
        self.join(&picked)
    }

    fn join(&self, indices: &[usize]) -> String {
        indices
            .iter()
            .map(|&i| self.chunks[i].as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// 查询词：小写、去重、长度至少 3、去掉常见词
fn query_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    word_splitter()
        .split(&query.to_lowercase())
        .filter(|w| w.chars().count() >= 3 && !STOP_WORDS.contains(w))
        .filter(|w| seen.insert(w.to_string()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "Photosynthesis converts light energy into chemical energy.\n\n\
                        The Calvin cycle fixes carbon dioxide.\n\n\
                        Mitochondria are the site of cellular respiration.\n\n\
                        Algebra studies symbols and the rules for manipulating them.";

    #[test]
    fn test_chunks_group_paragraphs() {
        let doc = Document::from_text("bio.pdf", TEXT, 100);
        assert!(doc.chunks.len() >= 2);
        assert!(doc.chunks.iter().all(|c| c.chars().count() <= 100));
        assert!(doc.chunks[0].starts_with("Photosynthesis"));
    }

    #[test]
    fn test_long_paragraph_is_split() {
        let long = "x".repeat(250);
        let doc = Document::from_text("long.txt", &long, 100);
        assert_eq!(doc.chunks.len(), 3);
        assert_eq!(doc.chunks[2].len(), 50);
    }

    #[test]
    fn test_select_context_prefers_matching_chunks() {
        let doc = Document::from_text("bio.pdf", TEXT, 60);
        let context = doc.select_context("Algebra rules", 80);
        assert!(context.contains("Algebra"));
        assert!(!context.contains("Photosynthesis"));
    }

    #[test]
    fn test_select_context_falls_back_to_leading_chunks() {
        let doc = Document::from_text("bio.pdf", TEXT, 60);
        let context = doc.select_context("General Review", 70);
        assert!(context.starts_with("Photosynthesis"));
    }

    #[test]
    fn test_query_terms_filter_stop_words() {
        let terms = query_terms("What is the Calvin cycle? calvin!");
        assert_eq!(terms, vec!["calvin", "cycle"]);
    }

    #[test]
    fn test_overview_spans_document() {
        let paragraphs: Vec<String> = (0..20).map(|i| format!("Section {i} body text.")).collect();
        let doc = Document::from_text("book.pdf", &paragraphs.join("\n\n"), 25);
        let overview = doc.overview(100);
        assert!(overview.contains("Section 0"));
        assert!(!overview.contains("Section 1 "));
        assert!(overview.chars().count() <= 100 + 10);
    }

    #[test]
    fn test_empty_text() {
        let doc = Document::from_text("empty.txt", "  \n\n  ", 100);
        assert!(doc.is_empty());
        assert_eq!(doc.select_context("anything", 100), "");
        assert_eq!(doc.overview(100), "");
    }
}
