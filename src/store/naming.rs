//! Deterministic state filenames derived from source paths.
//!
//! A source path maps to `<sha256-hex>.json`. The backup sibling appends
//! `.bak`, and in-flight writes use `<name>.<uuid>.tmp`. Only lowercase hex,
//! dots and the fixed suffixes appear, so every name is filesystem-safe.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Extension of primary state files.
pub const STATE_SUFFIX: &str = ".json";

/// Suffix appended to a primary file name for its backup.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Suffix of in-flight temporary files.
pub const TMP_SUFFIX: &str = ".tmp";

/// Length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// Primary state file name for `source_path`.
///
/// # Example
///
/// ```
/// use trackmark::store::naming::state_file_name;
///
/// let name = state_file_name("/notes/plan.md");
/// assert!(name.ends_with(".json"));
/// assert_eq!(name, state_file_name("/notes/plan.md"));
/// ```
#[must_use]
pub fn state_file_name(source_path: &str) -> String {
    let digest = Sha256::digest(source_path.as_bytes());
    format!("{}{STATE_SUFFIX}", hex::encode(digest))
}

/// Backup file name for `source_path`.
#[must_use]
pub fn backup_file_name(source_path: &str) -> String {
    format!("{}{BACKUP_SUFFIX}", state_file_name(source_path))
}

/// Unique temporary file name next to `file_name`.
#[must_use]
pub fn tmp_file_name(file_name: &str) -> String {
    format!("{file_name}.{}{TMP_SUFFIX}", Uuid::new_v4().simple())
}

/// Check if `name` is a primary state file produced by [`state_file_name`].
#[must_use]
pub fn is_primary_state_file(name: &str) -> bool {
    name.strip_suffix(STATE_SUFFIX).is_some_and(|stem| {
        stem.len() == DIGEST_HEX_LEN && stem.bytes().all(|b| b.is_ascii_hexdigit())
    })
}

/// Check if `name` belongs to the naming scheme at all (primary, backup or
/// temporary file).
#[must_use]
pub fn is_scheme_file(name: &str) -> bool {
    if is_primary_state_file(name) {
        return true;
    }
    if let Some(primary) = name.strip_suffix(BACKUP_SUFFIX) {
        return is_primary_state_file(primary);
    }
    name.strip_suffix(TMP_SUFFIX)
        .and_then(|rest| rest.rsplit_once('.'))
        .is_some_and(|(primary, _)| is_primary_state_file(primary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_path_same_name() {
        assert_eq!(
            state_file_name("/home/u/notes/todo.md"),
            state_file_name("/home/u/notes/todo.md")
        );
    }

    #[test]
    fn test_different_paths_different_names() {
        assert_ne!(state_file_name("/a/todo.md"), state_file_name("/b/todo.md"));
        assert_ne!(state_file_name("/a/Todo.md"), state_file_name("/a/todo.md"));
    }

    #[test]
    fn test_name_is_filesystem_safe() {
        let name = state_file_name("C:\\Users\\me\\notes?*:|<>.md");
        assert!(name
            .chars()
            .all(|c| c.is_ascii_hexdigit() || c == '.' || c.is_ascii_lowercase()));
        assert!(!name.contains(['/', '\\', ':']));
    }

    #[test]
    fn test_primary_detection() {
        let name = state_file_name("/x.md");
        assert!(is_primary_state_file(&name));
        assert!(!is_primary_state_file(&backup_file_name("/x.md")));
        assert!(!is_primary_state_file(&tmp_file_name(&name)));
        assert!(!is_primary_state_file("settings.json"));
    }

    #[test]
    fn test_scheme_detection() {
        let name = state_file_name("/x.md");
        assert!(is_scheme_file(&name));
        assert!(is_scheme_file(&backup_file_name("/x.md")));
        assert!(is_scheme_file(&tmp_file_name(&name)));
        assert!(!is_scheme_file("notes.txt"));
        assert!(!is_scheme_file("settings.json.bak"));
    }

    #[test]
    fn test_tmp_names_are_unique() {
        let name = state_file_name("/x.md");
        assert_ne!(tmp_file_name(&name), tmp_file_name(&name));
    }
}
