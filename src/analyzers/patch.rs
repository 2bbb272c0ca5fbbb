//! Patch file sanity checks (spec §4.4 `patches`).
//!
//! Grounded in `examples/original_source/lib/inspect_patches.c`: a
//! 4-byte minimum size below which a patch is reported as possibly
//! corrupt, and a small state machine distinguishing unified (`---`/
//! `+++`/`@@`) from context (`***`/`---`) diff format by header lines.

/// Below this many bytes, a patch cannot possibly contain a valid diff
/// header and is reported as corrupt.
pub const MIN_PATCH_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffFormat {
    Unified,
    Context,
    Unknown,
}

pub fn is_corrupt(data: &[u8]) -> bool {
    data.len() < MIN_PATCH_SIZE
}

/// Classify a patch's diff format by scanning its header lines, the way
/// `maybe_unified`/`maybe_context` do in the original: a context diff
/// starts hunks with `***`, a unified diff with `---`/`+++` followed by
/// an `@@` hunk marker.
pub fn detect_format(text: &str) -> DiffFormat {
    let mut header_count = 0;
    let mut maybe_unified = false;
    let mut maybe_context = false;

    for line in text.lines().take(32) {
        if line.starts_with("--- ") || line.starts_with("+++ ") {
            maybe_unified = true;
            header_count += 1;
        } else if line.starts_with("*** ") {
            maybe_context = true;
            header_count += 1;
        } else if line.starts_with("@@ ") && maybe_unified {
            return DiffFormat::Unified;
        } else if line.starts_with("***************") && maybe_context {
            return DiffFormat::Context;
        }
        if header_count >= 2 && maybe_unified && !maybe_context {
            return DiffFormat::Unified;
        }
    }

    if maybe_context {
        DiffFormat::Context
    } else if maybe_unified {
        DiffFormat::Unified
    } else {
        DiffFormat::Unknown
    }
}

/// Distinct hunked files and total changed lines in a patch (spec §4.6
/// "Patch analyzer"), used against `patches.file_count_threshold`/
/// `line_count_threshold`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchStats {
    pub files_touched: usize,
    pub changed_lines: usize,
}

/// Count distinct target files (from unified `+++ b/...` headers, or
/// context `--- ...` headers when no unified markers are present) and
/// the total number of added/removed lines, ignoring the three-
/// character diff markers themselves.
pub fn count_patch_stats(text: &str) -> PatchStats {
    let mut files = std::collections::BTreeSet::new();
    let mut changed_lines = 0usize;

    for line in text.lines() {
        if let Some(path) = line.strip_prefix("+++ ") {
            files.insert(path.trim().to_string());
        } else if line.starts_with('+') {
            changed_lines += 1;
        } else if let Some(path) = line.strip_prefix("--- ") {
            if detect_format(text) == DiffFormat::Context {
                files.insert(path.trim().to_string());
            }
        } else if line.starts_with('-') {
            changed_lines += 1;
        }
    }

    PatchStats { files_touched: files.len(), changed_lines }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_four_bytes_is_corrupt() {
        assert!(is_corrupt(b""));
        assert!(is_corrupt(b"ab"));
        assert!(!is_corrupt(b"abcd"));
    }

    #[test]
    fn detects_unified_diff() {
        let text = "--- a/foo.c\n+++ b/foo.c\n@@ -1,3 +1,4 @@\n context\n+added\n";
        assert_eq!(detect_format(text), DiffFormat::Unified);
    }

    #[test]
    fn detects_context_diff() {
        let text = "*** a/foo.c\n--- b/foo.c\n***************\n*** 1,3 ****\n";
        assert_eq!(detect_format(text), DiffFormat::Context);
    }

    #[test]
    fn counts_files_and_changed_lines_in_unified_diff() {
        let text = "--- a/foo.c\n+++ b/foo.c\n@@ -1,3 +1,4 @@\n context\n-old\n+new\n+added\n";
        let stats = count_patch_stats(text);
        assert_eq!(stats.files_touched, 1);
        assert_eq!(stats.changed_lines, 3);
    }

    #[test]
    fn counts_distinct_files_across_multiple_hunks() {
        let text = "--- a/foo.c\n+++ b/foo.c\n@@ -1 +1 @@\n-a\n+b\n\
                     --- a/bar.c\n+++ b/bar.c\n@@ -1 +1 @@\n-c\n+d\n";
        let stats = count_patch_stats(text);
        assert_eq!(stats.files_touched, 2);
        assert_eq!(stats.changed_lines, 4);
    }

    #[test]
    fn unrecognized_text_is_unknown() {
        assert_eq!(detect_format("just some plain text\nwith no diff markers\n"), DiffFormat::Unknown);
    }
}
