use std::sync::OnceLock;

use regex::Regex;

use crate::llm::{prompts, CompletionOptions, LlmProvider};

pub const DEFAULT_TITLE: &str = "Daily Health Tip";

const MAX_TITLE_WORDS: usize = 5;

fn markdown_markers() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[*_#`>~]+").ok()).as_ref()
}

fn filler_prefix() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*(?:sure\b[,.!]?|here(?:'s|’s| is)\s+(?:a |the |your )?(?:[\w\-]+\s+)*?title\b(?: for (?:this|the|that) tip)?\s*[:\-]?|(?:[\w\-]+\s+)*?title\s*[:\-]|tip of the day\s*[:\-]|(?:daily |health )?tip\s*:)\s*",
        )
        .ok()
    })
    .as_ref()
}

/// Titles for daily tips: an LLM suggestion passed through [`clean_title`].
#[derive(Clone)]
pub struct TitleGenerator {
    llm: LlmProvider,
    temperature: f32,
}

impl TitleGenerator {
    pub fn new(llm: LlmProvider, temperature: f32) -> Self {
        Self { llm, temperature }
    }

    /// Never fails: any LLM error or empty result yields [`DEFAULT_TITLE`].
    pub async fn generate(&self, tip: &str) -> String {
        let options = CompletionOptions::with_temperature(self.temperature);

        match self
            .llm
            .complete(&prompts::tip_title_prompt(tip), Some(&options))
            .await
        {
            Ok(raw) => clean_title(&raw),
            Err(e) => {
                tracing::error!("Failed to generate title with LLM: {}", e);
                DEFAULT_TITLE.to_string()
            }
        }
    }
}

/// Normalize a model-suggested title.
///
/// Strips markdown markers and filler prefixes such as `Title:` or `Tip:`,
/// drops punctuation and symbols (emoji included), capitalizes each word and
/// keeps at most five words. Returns [`DEFAULT_TITLE`] if nothing survives.
pub fn clean_title(raw: &str) -> String {
    let first_line = raw
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    let mut text = match markdown_markers() {
        Some(re) => re.replace_all(first_line, "").into_owned(),
        None => first_line.to_string(),
    };
    if let Some(re) = filler_prefix() {
        loop {
            let stripped = re.replace(&text, "").into_owned();
            if stripped == text {
                break;
            }
            text = stripped;
        }
    }

    let plain: String = text
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}'))
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let words: Vec<String> = plain
        .split_whitespace()
        .take(MAX_TITLE_WORDS)
        .map(capitalize)
        .collect();

    if words.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        words.join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
