//! ABI/KMI comparison tool driver (spec §4.4 `abidiff`/`kmidiff`, Design
//! Notes "bitfield exit-code decoding").
//!
//! `abidiff`/`kmidiff` (from libabigail) report outcome purely through
//! their exit status, a bitmask rather than a simple 0/1/2. This module
//! only builds the argument vector and decodes that status; actually
//! spawning the tool goes through [`crate::parallel::Parallel`] the same
//! as every other external-tool-driving inspection.

/// libabigail's documented exit status bits, shared by `abidiff` and
/// `kmidiff`.
const ABIDIFF_ERROR: i32 = 1 << 0;
const ABIDIFF_USAGE_ERROR: i32 = 1 << 1;
const ABIDIFF_ABI_CHANGE: i32 = 1 << 2;
const ABIDIFF_ABI_INCOMPATIBLE_CHANGE: i32 = 1 << 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToolStatus {
    pub tool_error: bool,
    pub usage_error: bool,
    pub abi_changed: bool,
    pub abi_incompatible: bool,
}

impl ToolStatus {
    pub fn from_exit_code(code: i32) -> ToolStatus {
        ToolStatus {
            tool_error: code & ABIDIFF_ERROR != 0,
            usage_error: code & ABIDIFF_USAGE_ERROR != 0,
            abi_changed: code & ABIDIFF_ABI_CHANGE != 0,
            abi_incompatible: code & ABIDIFF_ABI_INCOMPATIBLE_CHANGE != 0,
        }
    }

    /// Whether the comparison itself failed to run at all, as opposed
    /// to running successfully and reporting an ABI change.
    pub fn tool_failed(&self) -> bool {
        self.tool_error || self.usage_error
    }
}

/// Verb rpminspect-rs' own result messages use for a failed comparison,
/// distinguishing a usage error (e.g. missing debug info, spec §8
/// "Missing debug package for ABI diff: Verify (usage error), not Bad")
/// from an outright tool crash.
pub fn failure_verb(status: &ToolStatus) -> &'static str {
    if status.usage_error { "could not be compared" } else { "failed to run" }
}

/// Build the argument vector for one `abidiff`/`kmidiff` invocation
/// comparing a before/after pair of debuginfo-equipped binaries on a
/// given architecture (spec: "per-architecture suppression/debug/header
/// args").
pub struct AbiCompareArgs<'a> {
    pub before: &'a str,
    pub after: &'a str,
    pub before_debuginfo: Option<&'a str>,
    pub after_debuginfo: Option<&'a str>,
    pub suppression_file: Option<&'a str>,
    pub headers_dir: Option<&'a str>,
    /// Extra verbatim arguments from the inspection's `extra_args`
    /// configuration key, inserted ahead of the positional before/after
    /// paths.
    pub extra_args: &'a [String],
}

pub fn build_args(opts: &AbiCompareArgs) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(supp) = opts.suppression_file {
        args.push("--suppressions".to_string());
        args.push(supp.to_string());
    }
    if let Some(dir) = opts.headers_dir {
        args.push("--headers-dir1".to_string());
        args.push(dir.to_string());
        args.push("--headers-dir2".to_string());
        args.push(dir.to_string());
    }
    if let Some(dbg) = opts.before_debuginfo {
        args.push("--debug-info-dir1".to_string());
        args.push(dbg.to_string());
    }
    if let Some(dbg) = opts.after_debuginfo {
        args.push("--debug-info-dir2".to_string());
        args.push(dbg.to_string());
    }
    args.extend(opts.extra_args.iter().cloned());
    args.push(opts.before.to_string());
    args.push(opts.after.to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_no_change_clean_exit() {
        let status = ToolStatus::from_exit_code(0);
        assert_eq!(status, ToolStatus::default());
        assert!(!status.tool_failed());
    }

    #[test]
    fn decodes_combined_change_and_incompatible_bits() {
        let status = ToolStatus::from_exit_code(ABIDIFF_ABI_CHANGE | ABIDIFF_ABI_INCOMPATIBLE_CHANGE);
        assert!(status.abi_changed);
        assert!(status.abi_incompatible);
        assert!(!status.tool_failed());
    }

    #[test]
    fn tool_error_bit_marks_tool_failed() {
        let status = ToolStatus::from_exit_code(ABIDIFF_ERROR);
        assert!(status.tool_failed());
    }

    #[test]
    fn build_args_includes_debuginfo_and_suppressions_when_present() {
        let opts = AbiCompareArgs {
            before: "before.so",
            after: "after.so",
            before_debuginfo: Some("/before/debug"),
            after_debuginfo: Some("/after/debug"),
            suppression_file: Some("/etc/abi.supp"),
            headers_dir: None,
            extra_args: &[],
        };
        let args = build_args(&opts);
        assert_eq!(
            args,
            vec![
                "--suppressions", "/etc/abi.supp",
                "--debug-info-dir1", "/before/debug",
                "--debug-info-dir2", "/after/debug",
                "before.so", "after.so",
            ]
        );
    }

    #[test]
    fn build_args_appends_extra_args_before_positionals() {
        let extra = vec!["--fail-no-debug-info".to_string()];
        let opts = AbiCompareArgs {
            before: "before.so",
            after: "after.so",
            before_debuginfo: None,
            after_debuginfo: None,
            suppression_file: None,
            headers_dir: None,
            extra_args: &extra,
        };
        let args = build_args(&opts);
        assert_eq!(args, vec!["--fail-no-debug-info", "before.so", "after.so"]);
    }
}
