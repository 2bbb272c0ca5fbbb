//! Command-line surface (spec §6), frozen enough that scripts driving
//! `rpminspect` keep working across releases.
//!
//! Modeled on the teacher's own `#[derive(Parser)]` shape in its
//! (pre-transformation) `cli.rs`, generalized from a single positional
//! directory argument to the before/after build identifiers this
//! framework actually takes.

use std::path::PathBuf;

use clap::Parser;

/// Audit one or two RPM builds and emit a severity-ranked report.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The "before" build identifier (a local directory or, once a
    /// `BuildSource` implementation resolves it, a remote build id).
    /// Omit to run in single-build mode against `after` only.
    pub before: Option<String>,

    /// The "after" build identifier. Required unless `--fetch-only` is
    /// given with just `before`.
    pub after: Option<String>,

    /// Path to the primary configuration document.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Named profile to overlay onto the primary configuration.
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Scratch directory for package extraction. Defaults to a fresh
    /// temporary directory unless `--keep` is also given.
    #[arg(long, value_name = "PATH")]
    pub workdir: Option<PathBuf>,

    /// Comma-separated architecture allowlist, or `all`.
    #[arg(long, value_delimiter = ',', default_value = "all")]
    pub arches: Vec<String>,

    /// Comma-separated inspection names to run, overriding the
    /// configuration's enabled set.
    #[arg(long, value_delimiter = ',')]
    pub tests: Vec<String>,

    /// Comma-separated inspection names to exclude, applied after
    /// `--tests`.
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Severity at or above which the process exits non-zero.
    #[arg(long, default_value = "verify")]
    pub threshold: String,

    /// Where to write the rendered report. Defaults to stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Report format.
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Retain the workdir after the run instead of deleting it.
    #[arg(long)]
    pub keep: bool,

    /// Raise logging verbosity by one step per occurrence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Acquire and extract the builds, then exit without inspecting.
    #[arg(long)]
    pub fetch_only: bool,

    /// Print the available configuration profiles and exit.
    #[arg(long)]
    pub list_profiles: bool,

    /// Print the inspection registry and exit.
    #[arg(long)]
    pub list_inspections: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_before_and_after_positionals() {
        let cli = Cli::parse_from(["rpminspect", "foo-1.0-1.src.rpm", "foo-1.0-2.src.rpm"]);
        assert_eq!(cli.before.as_deref(), Some("foo-1.0-1.src.rpm"));
        assert_eq!(cli.after.as_deref(), Some("foo-1.0-2.src.rpm"));
    }

    #[test]
    fn single_build_mode_leaves_after_unset() {
        let cli = Cli::parse_from(["rpminspect", "foo-1.0-2.src.rpm"]);
        assert_eq!(cli.before.as_deref(), Some("foo-1.0-2.src.rpm"));
        assert!(cli.after.is_none());
    }

    #[test]
    fn comma_separated_lists_split_correctly() {
        let cli = Cli::parse_from([
            "rpminspect",
            "--arches",
            "x86_64,aarch64",
            "--tests",
            "elf,patches",
            "foo.rpm",
        ]);
        assert_eq!(cli.arches, vec!["x86_64", "aarch64"]);
        assert_eq!(cli.tests, vec!["elf", "patches"]);
    }

    #[test]
    fn defaults_match_spec() {
        let cli = Cli::parse_from(["rpminspect", "foo.rpm"]);
        assert_eq!(cli.threshold, "verify");
        assert_eq!(cli.format, "text");
        assert!(!cli.keep);
        assert!(!cli.fetch_only);
    }
}
