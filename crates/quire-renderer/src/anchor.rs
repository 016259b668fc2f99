//! Heading anchors and text escaping.

use std::collections::{HashMap, HashSet};

/// Fallback anchor for headings whose text has no slug characters.
const EMPTY_SLUG: &str = "heading";

/// Assigns document-unique heading anchors.
///
/// Repeated slugs get a numeric suffix in order of appearance:
/// `goal`, `goal-1`, `goal-2`. A suffixed candidate that is already taken
/// (for instance by a heading literally titled "Goal 1") is skipped.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    /// Next suffix to try per base slug.
    counts: HashMap<String, usize>,
    /// Every anchor handed out so far.
    used: HashSet<String>,
}

impl AnchorRegistry {
    /// Anchor for a heading with the given text.
    pub fn generate(&mut self, text: &str) -> String {
        let base = slugify(text);
        let base = if base.is_empty() {
            EMPTY_SLUG.to_owned()
        } else {
            base
        };
        self.claim(base)
    }

    /// Anchor for an explicit `{#id}`, suffixed only if already taken.
    pub fn explicit(&mut self, id: &str) -> String {
        self.claim(id.to_owned())
    }

    fn claim(&mut self, base: String) -> String {
        let count = self.counts.entry(base.clone()).or_default();
        let mut id = match *count {
            0 => base.clone(),
            n => format!("{base}-{n}"),
        };
        while self.used.contains(&id) {
            *count += 1;
            id = format!("{base}-{count}");
        }
        *count += 1;
        self.used.insert(id.clone());
        id
    }
}

/// Convert text to URL-safe slug.
///
/// Lowercases, turns whitespace, dashes and underscores into single dashes,
/// and drops other punctuation. Non-ASCII letters are kept.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
