//! Wiki markup to plaintext stripping
//!
//! First stage of the normalization pipeline: removes comments, references,
//! HTML tags, tables, templates, links, and emphasis markup from raw article
//! text. Heading markup (`==Section==`) is deliberately left in place; the
//! normalizer truncates at the references heading and its token filters drop
//! anything still carrying `=`.

use regex::Regex;
use std::sync::OnceLock;

static RE_COMMENT: OnceLock<Regex> = OnceLock::new();
static RE_REF_SELF_CLOSED: OnceLock<Regex> = OnceLock::new();
static RE_REF_PAIRED: OnceLock<Regex> = OnceLock::new();
static RE_HTML_TAG: OnceLock<Regex> = OnceLock::new();
static RE_CATEGORIES: OnceLock<Regex> = OnceLock::new();
static RE_FILES: OnceLock<Regex> = OnceLock::new();
static RE_EXTERNAL_LINK: OnceLock<Regex> = OnceLock::new();
static RE_EXTERNAL_BARE: OnceLock<Regex> = OnceLock::new();
static RE_LIST: OnceLock<Regex> = OnceLock::new();
static RE_INTERWIKI: OnceLock<Regex> = OnceLock::new();
static RE_MAGIC_WORDS: OnceLock<Regex> = OnceLock::new();

/// Link prefixes whose targets carry no body text
const SKIP_LINK_PREFIXES: &[&str] = &[
    "file:", "image:", "category:", "kategorie:", "catégorie:", "categoría:",
    "datei:", "fichier:", "archivo:", "wikt:", "wikipedia:", "wp:",
];

/// Converts MediaWiki markup to plain text
pub struct MarkupStripper;

impl MarkupStripper {
    pub fn new() -> Self {
        Self
    }

    /// Strip markup and return plain text with single-space/newline runs
    pub fn strip(&self, raw: &str) -> String {
        let re_comment = RE_COMMENT.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
        let mut text = re_comment.replace_all(raw, "").to_string();

        let re_ref_self = RE_REF_SELF_CLOSED
            .get_or_init(|| Regex::new(r"(?is)<ref\b[^>]*/>").unwrap());
        text = re_ref_self.replace_all(&text, "").to_string();
        let re_ref_pair = RE_REF_PAIRED
            .get_or_init(|| Regex::new(r"(?is)<ref\b[^>]*>.*?</ref\s*>").unwrap());
        text = re_ref_pair.replace_all(&text, "").to_string();

        let re_tag = RE_HTML_TAG.get_or_init(|| Regex::new(r"</?[a-zA-Z][^>\n]*>").unwrap());
        text = re_tag.replace_all(&text, "").to_string();

        text = strip_balanced(&text, ('{', '|'), ('|', '}'));
        text = strip_balanced(&text, ('{', '{'), ('}', '}'));

        let re_cat = RE_CATEGORIES.get_or_init(|| {
            Regex::new(r"(?i)\[\[(category|kategorie|catégorie|categoría):[^\]]*\]\]").unwrap()
        });
        text = re_cat.replace_all(&text, "").to_string();
        let re_files = RE_FILES.get_or_init(|| {
            Regex::new(r"(?i)\[\[(file|image|datei|fichier|archivo):[^\]]*\]\]").unwrap()
        });
        text = re_files.replace_all(&text, "").to_string();

        text = resolve_internal_links(&text);

        let re_ext = RE_EXTERNAL_LINK
            .get_or_init(|| Regex::new(r"\[https?://[^\s\]]+\s+([^\]]+)\]").unwrap());
        text = re_ext.replace_all(&text, "$1").to_string();
        let re_ext_bare = RE_EXTERNAL_BARE
            .get_or_init(|| Regex::new(r"\[(https?://[^\s\]]+)\]").unwrap());
        text = re_ext_bare.replace_all(&text, "$1").to_string();

        // '''''bold italic''''' first, then the shorter forms
        text = text.replace("'''''", "");
        text = text.replace("'''", "");
        text = text.replace("''", "");
        text = text.replace("----", "");

        let re_list = RE_LIST.get_or_init(|| Regex::new(r"(?m)^[*#:;]+\s*").unwrap());
        text = re_list.replace_all(&text, "").to_string();

        let re_interwiki = RE_INTERWIKI
            .get_or_init(|| Regex::new(r"\[\[[a-z]{2,3}(-[a-z]+)?:[^\]]+\]\]").unwrap());
        text = re_interwiki.replace_all(&text, "").to_string();
        let re_magic = RE_MAGIC_WORDS.get_or_init(|| Regex::new(r"__[A-Z]+__").unwrap());
        text = re_magic.replace_all(&text, "").to_string();

        collapse_whitespace(&text)
    }
}

impl Default for MarkupStripper {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove balanced two-character delimited regions, tracking nesting depth.
/// Used for templates (`{{ }}`) and tables (`{| |}`).
fn strip_balanced(text: &str, open: (char, char), close: (char, char)) -> String {
    let mut result = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == open.0 && chars.peek() == Some(&open.1) {
            depth += 1;
            chars.next();
        } else if c == close.0 && chars.peek() == Some(&close.1) {
            depth = depth.saturating_sub(1);
            chars.next();
        } else if depth == 0 {
            result.push(c);
        }
    }

    result
}

/// Replace `[[target]]` with `target` and `[[target|display]]` with
/// `display`; drop namespaced and interwiki targets entirely.
fn resolve_internal_links(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '[' || chars.peek() != Some(&'[') {
            result.push(c);
            continue;
        }
        chars.next();

        let mut content = String::new();
        let mut depth = 1usize;
        while let Some(ch) = chars.next() {
            if ch == '[' && chars.peek() == Some(&'[') {
                depth += 1;
                chars.next();
                content.push_str("[[");
            } else if ch == ']' && chars.peek() == Some(&']') {
                depth -= 1;
                chars.next();
                if depth == 0 {
                    break;
                }
                content.push_str("]]");
            } else {
                content.push(ch);
            }
        }

        let lower = content.to_lowercase();
        if SKIP_LINK_PREFIXES.iter().any(|p| lower.starts_with(p)) || is_interwiki(&lower) {
            continue;
        }

        match content.find('|') {
            Some(pipe) => result.push_str(&content[pipe + 1..]),
            None => result.push_str(&content),
        }
    }

    result
}

/// A two- or three-letter all-lowercase prefix before a colon marks a link
/// into another language edition.
fn is_interwiki(lower: &str) -> bool {
    match lower.find(':') {
        Some(pos) => {
            let prefix = &lower[..pos];
            (2..=3).contains(&prefix.len()) && prefix.chars().all(|c| c.is_ascii_lowercase())
        }
        None => false,
    }
}

/// Collapse space runs and newline runs, trim the ends
fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_newline = false;
    let mut prev_space = false;

    for c in text.chars() {
        if c == '\n' {
            if !prev_newline {
                result.push('\n');
                prev_newline = true;
            }
            prev_space = false;
        } else if c.is_whitespace() {
            if !prev_space && !prev_newline {
                result.push(' ');
                prev_space = true;
            }
        } else {
            result.push(c);
            prev_newline = false;
            prev_space = false;
        }
    }

    result.trim().to_string()
}
