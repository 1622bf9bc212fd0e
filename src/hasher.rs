//! Content fingerprints for change detection.
//!
//! Two digests are produced from the same djb2-style rolling hash:
//!
//! - [`compute_content_hash`] sees every byte, so any edit changes it.
//! - [`compute_normalized_hash`] runs over a normalized copy of the text,
//!   so line-ending drift and whitespace reflow do not register as edits.
//!
//! These are change detectors, not cryptographic digests. The output is
//! stable for a given input within one build of this crate.

use regex::Regex;
use std::sync::LazyLock;

/// Seed value for the rolling hash.
const HASH_SEED: u32 = 5381;

static TRAILING_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t]+\n").expect("static regex")
});

static HORIZONTAL_RUNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t]+").expect("static regex")
});

static BLANK_LINE_RUNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n{3,}").expect("static regex")
});

fn djb2(bytes: &[u8]) -> u32 {
    bytes.iter().fold(HASH_SEED, |hash, &b| {
        hash.wrapping_mul(33).wrapping_add(u32::from(b))
    })
}

/// Hash the exact text, byte for byte.
///
/// Rendered as lowercase hex, zero-padded to 8 characters.
///
/// # Example
///
/// ```
/// use trackmark::hasher::compute_content_hash;
///
/// let hash = compute_content_hash("- [ ] write docs");
/// assert_eq!(hash.len(), 8);
/// assert_eq!(hash, compute_content_hash("- [ ] write docs"));
/// ```
#[must_use]
pub fn compute_content_hash(text: &str) -> String {
    format!("{:08x}", djb2(text.as_bytes()))
}

/// Normalize text so that whitespace-only edits compare equal.
///
/// Line endings become `\n`, trailing spaces/tabs are stripped from each
/// line, remaining runs of spaces/tabs collapse to one space, three or more
/// consecutive newlines collapse to a single blank line, and the result is
/// trimmed.
#[must_use]
pub fn normalize_content(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let stripped = TRAILING_WHITESPACE.replace_all(&unified, "\n");
    let collapsed = HORIZONTAL_RUNS.replace_all(&stripped, " ");
    let compact = BLANK_LINE_RUNS.replace_all(&collapsed, "\n\n");
    compact.trim().to_string()
}

/// Hash the text after [`normalize_content`].
#[must_use]
pub fn compute_normalized_hash(text: &str) -> String {
    compute_content_hash(&normalize_content(text))
}

/// Returns true if `text` no longer matches `stored_hash` byte for byte.
#[must_use]
pub fn has_content_changed(text: &str, stored_hash: &str) -> bool {
    compute_content_hash(text) != stored_hash
}

/// Returns true if `text` differs from `stored_hash` after normalization.
///
/// `stored_hash` must have been produced by [`compute_normalized_hash`].
#[must_use]
pub fn has_meaningful_change(text: &str, stored_hash: &str) -> bool {
    compute_normalized_hash(text) != stored_hash
}
