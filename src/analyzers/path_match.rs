//! Ignore-glob matching shared by every inspection driver (spec §4.4,
//! §4.1 global + per-inspection ignore patterns).
//!
//! Grounded in the teacher's `src/utils/file.rs::is_path_excluded`,
//! which matches a glob pattern against both the full path and the
//! bare filename. Built on the teacher's existing `glob` dependency.
//! `glob::Pattern` already treats `*` as crossing path separators (it is
//! not path-component-aware the way `ignore`/`globset` are), so `**` is
//! accepted and simply behaves the same as a single `*`; brace
//! alternatives (`{a,b}`, not supported by `glob::Pattern` at all) are
//! expanded into one compiled pattern per alternative before matching.

/// Expand `{a,b,c}`-style brace alternatives in a single glob pattern
/// into the cartesian product of patterns, none of which contain braces
/// themselves. Only one brace group is expanded per call; nested or
/// multiple groups are expanded by recursing until none remain.
fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(close) = pattern[open..].find('}').map(|i| i + open) else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let alternatives = pattern[open + 1..close].split(',');

    let mut expanded = Vec::new();
    for alt in alternatives {
        let candidate = format!("{prefix}{alt}{suffix}");
        expanded.extend(expand_braces(&candidate));
    }
    expanded
}

/// A single ignore rule, pre-compiled into one or more glob patterns
/// (brace expansion may yield several).
pub struct IgnoreGlob {
    patterns: Vec<glob::Pattern>,
}

impl IgnoreGlob {
    pub fn compile(raw: &str) -> Result<IgnoreGlob, glob::PatternError> {
        let patterns = expand_braces(raw)
            .into_iter()
            .map(|p| glob::Pattern::new(&p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(IgnoreGlob { patterns })
    }

    /// True if `full_path` or its basename matches any of this rule's
    /// expanded patterns.
    pub fn matches(&self, full_path: &str) -> bool {
        let basename = full_path.rsplit('/').next().unwrap_or(full_path);
        self.patterns
            .iter()
            .any(|p| p.matches(full_path) || p.matches(basename))
    }
}

/// Compile a whole list of raw ignore globs, logging (rather than
/// failing the run on) any pattern that fails to compile.
pub fn compile_ignore_list(raw: &[String]) -> Vec<IgnoreGlob> {
    raw.iter()
        .filter_map(|pattern| match IgnoreGlob::compile(pattern) {
            Ok(g) => Some(g),
            Err(e) => {
                log::warn!("ignoring invalid glob pattern {pattern:?}: {e}");
                None
            }
        })
        .collect()
}

pub fn is_ignored(path: &str, globs: &[IgnoreGlob]) -> bool {
    globs.iter().any(|g| g.matches(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_full_path_and_basename() {
        let g = IgnoreGlob::compile("*.debug").unwrap();
        assert!(g.matches("/usr/lib/debug/foo.debug"));
        assert!(g.matches("foo.debug"));
        assert!(!g.matches("foo.so"));
    }

    #[test]
    fn double_star_behaves_like_single_star() {
        let g = IgnoreGlob::compile("/usr/share/doc/**").unwrap();
        assert!(g.matches("/usr/share/doc/foo/README"));
    }

    #[test]
    fn brace_alternative_expands_to_multiple_patterns() {
        let g = IgnoreGlob::compile("*.{so,so.*}").unwrap();
        assert!(g.matches("libfoo.so"));
        assert!(g.matches("libfoo.so.1"));
        assert!(!g.matches("libfoo.a"));
    }

    #[test]
    fn invalid_pattern_is_skipped_not_fatal() {
        let globs = compile_ignore_list(&["[".to_string(), "*.txt".to_string()]);
        assert_eq!(globs.len(), 1);
        assert!(is_ignored("notes.txt", &globs));
    }
}
