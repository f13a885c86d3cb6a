//! Plain-text extraction from post HTML and excerpt truncation.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum excerpt length in characters, before the ellipsis.
pub const EXCERPT_MAX_CHARS: usize = 200;

/// A word-boundary cut is only used when the last space falls beyond this index.
const EXCERPT_MIN_WORD_CUT: usize = 50;

const ELLIPSIS: char = '…';

static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("valid regex")
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Reduce an HTML fragment to plain text.
///
/// Script and style blocks are removed with their content, remaining tags
/// are replaced by a space, and runs of whitespace collapse to one space.
pub fn strip_html(html: &str) -> String {
    let without_blocks = SCRIPT_STYLE_RE.replace_all(html, " ");
    let without_tags = TAG_RE.replace_all(&without_blocks, " ");
    let without_nbsp = without_tags.replace("&nbsp;", " ");
    WHITESPACE_RE
        .replace_all(&without_nbsp, " ")
        .trim()
        .to_string()
}

/// Truncate `text` to at most [`EXCERPT_MAX_CHARS`] characters plus an ellipsis.
///
/// Prefers cutting at the last space before the limit when that space lies
/// beyond position 50; otherwise hard-cuts at the limit. Text already within
/// the limit is returned unchanged.
pub fn truncate_excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_MAX_CHARS {
        return text.to_string();
    }

    let head: String = text.chars().take(EXCERPT_MAX_CHARS).collect();
    let cut = match head.rfind(' ') {
        Some(byte_idx) if head[..byte_idx].chars().count() > EXCERPT_MIN_WORD_CUT => {
            head[..byte_idx].trim_end()
        }
        _ => head.as_str(),
    };

    let mut excerpt = String::with_capacity(cut.len() + ELLIPSIS.len_utf8());
    excerpt.push_str(cut);
    excerpt.push(ELLIPSIS);
    excerpt
}
