//! Text Normalizer: turns raw per-page PDF text into a single cleaned line
//! suitable for embedding in a prompt.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Error: No text found in PDF.")]
    EmptyText,
}

static LOWER_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());
static LETTER_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-zA-Z])(\d)").unwrap());
static DIGIT_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)([a-zA-Z])").unwrap());

/// Normalizes extracted résumé pages.
///
/// Rules, applied in order over the joined text:
/// 1. `aB` → `a B` (words merged by layout artifacts)
/// 2. `a1` → `a 1`
/// 3. `1a` → `1 a`
/// 4. `aB` → `a B` again (no-op after rule 1, kept for output parity)
///
/// Whitespace runs, including page breaks, collapse to single spaces.
pub fn normalize(raw_pages: &[String]) -> Result<String, NormalizeError> {
    let mut text = String::new();
    for page in raw_pages.iter().filter(|p| !p.is_empty()) {
        text.push_str(page);
        text.push('\n');
    }

    if text.trim_matches(is_separator).is_empty() {
        return Err(NormalizeError::EmptyText);
    }

    let text = LOWER_UPPER.replace_all(&text, "$1 $2");
    let text = LETTER_DIGIT.replace_all(&text, "$1 $2");
    let text = DIGIT_LETTER.replace_all(&text, "$1 $2");
    let text = LOWER_UPPER.replace_all(&text, "$1 $2");

    Ok(collapse_whitespace(&text))
}

/// Unicode whitespace plus the ASCII file/group/record/unit separators
/// (`\x1c`..=`\x1f`), which some PDF text streams emit between words.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}

fn collapse_whitespace(text: &str) -> String {
    text.split(is_separator)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
