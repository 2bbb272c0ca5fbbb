//! Configuration document model (spec §4.1) and CLI-facing defaults.
//!
//! Parsed the way the teacher crate handles its own `serde_yaml` document
//! (straight `#[derive(Deserialize)]` structs with `#[serde(default)]`
//! everywhere), plus a post-parse sweep that warns on unrecognized keys
//! instead of rejecting the document (spec's "unknown key ⇒ warn and
//! ignore" rule, §4.1).

mod profile;
mod vendor_data;

pub use profile::overlay_profile;
pub use vendor_data::{
    CapabilitiesEntry, FileInfoEntry, PoliticsEntry, RebaseableEntry, SecurityEntry, VendorData,
    parse_capabilities, parse_fileinfo, parse_mode10, parse_politics, parse_rebaseable, parse_security,
};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Top-level configuration document (spec §4.1). Every field has a
/// default so a missing or empty document still produces a usable,
/// all-inspections-enabled `Config`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub common: CommonSection,
    #[serde(default)]
    pub inspections: InspectionsSection,
    #[serde(default)]
    pub vendor_data: VendorDataSection,
    #[serde(default)]
    pub elf: RegexOptions,
    #[serde(default)]
    pub manpage: RegexOptions,
    #[serde(default)]
    pub xml: RegexOptions,
    #[serde(default)]
    pub products: BTreeMap<String, Value>,
    #[serde(default)]
    pub filesize: FilesizeSection,
    #[serde(default)]
    pub patches: PatchesSection,
    #[serde(default)]
    pub abidiff: AbiToolSection,
    #[serde(default)]
    pub kmidiff: KmidiffSection,
    #[serde(default)]
    pub pathmigration: PathMigrationSection,
    #[serde(default)]
    pub specname: SpecnameSection,
    #[serde(default)]
    pub vendor: VendorSection,
    /// Global ignore globs applied to every inspection (spec §4.1
    /// `ignore`), distinct from `common.ignore` in the original source
    /// but merged into one list here per Open Question 3's "canonicalize
    /// synonymous keys" resolution.
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// `filesize.size_threshold` (spec §4.1): either a positive byte
/// threshold or `info`/`info-only`/`info_only`, encoded as `-1` meaning
/// "report size changes informationally only" (spec §8 boundary case).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesizeSection {
    #[serde(default, deserialize_with = "deserialize_size_threshold")]
    pub size_threshold: i64,
}

impl Default for FilesizeSection {
    fn default() -> Self {
        FilesizeSection { size_threshold: 100 * 1024 * 1024 }
    }
}

fn deserialize_size_threshold<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(n) => Ok(n.as_i64().unwrap_or(100 * 1024 * 1024)),
        Value::String(s) if matches!(s.as_str(), "info" | "info-only" | "info_only") => Ok(-1),
        _ => Ok(100 * 1024 * 1024),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PatchesSection {
    #[serde(default)]
    pub file_count_threshold: Option<u32>,
    #[serde(default)]
    pub line_count_threshold: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AbiToolSection {
    #[serde(default)]
    pub security_level_threshold: Option<u32>,
    #[serde(default)]
    pub extra_args: Vec<String>,
    #[serde(default)]
    pub suppression_file: Option<PathBuf>,
    #[serde(default)]
    pub debuginfo_path: Option<PathBuf>,
    #[serde(default)]
    pub include_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KmidiffSection {
    #[serde(default)]
    pub extra_args: Vec<String>,
    #[serde(default)]
    pub suppression_file: Option<PathBuf>,
    #[serde(default)]
    pub debuginfo_path: Option<PathBuf>,
    #[serde(default)]
    pub kabi_dir: Option<PathBuf>,
    #[serde(default)]
    pub kabi_filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathMigrationSection {
    #[serde(default)]
    pub migrated_paths: BTreeMap<String, String>,
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpecnameMatch {
    #[default]
    Full,
    Prefix,
    Suffix,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpecnamePrimary {
    #[default]
    Name,
    Filename,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SpecnameSection {
    #[serde(default)]
    pub r#match: SpecnameMatch,
    #[serde(default)]
    pub primary: SpecnamePrimary,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FavorRelease {
    #[default]
    None,
    Oldest,
    Newest,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VendorSection {
    #[serde(default)]
    pub favor_release: FavorRelease,
}

/// Known top-level section names, used to warn on anything else found in
/// a parsed document (spec §4.1 "closed set of top-level sections").
const KNOWN_SECTIONS: &[&str] = &[
    "common",
    "inspections",
    "vendor_data",
    "elf",
    "manpage",
    "xml",
    "products",
    "filesize",
    "patches",
    "abidiff",
    "kmidiff",
    "pathmigration",
    "specname",
    "vendor",
    "ignore",
    // Recognized per spec §4.1 but not yet given dedicated typed fields;
    // listed here so they don't trigger a spurious "unrecognized
    // configuration section" warning.
    "koji",
    "commands",
    "security_path_prefix",
    "badwords",
    "metadata",
    "desktop",
    "changedfiles",
    "addedfiles",
    "ownership",
    "shellsyntax",
    "lto",
    "annocheck",
    "javabytecode",
    "files",
    "badfuncs",
    "runpath",
    "emptyrpm",
    "types",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommonSection {
    #[serde(default)]
    pub workdir: Option<PathBuf>,
    #[serde(default)]
    pub profiledir: Option<PathBuf>,
}

/// Per-inspection overrides: enable/disable and per-inspection ignore
/// globs (spec §4.4, §4.1 "enabled set").
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InspectionsSection {
    #[serde(default)]
    pub enabled: Option<Vec<String>>,
    #[serde(default)]
    pub disabled: Vec<String>,
    #[serde(default)]
    pub ignore: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VendorDataSection {
    #[serde(default)]
    pub fileinfo: Option<PathBuf>,
    #[serde(default)]
    pub capabilities: Option<PathBuf>,
    #[serde(default)]
    pub rebaseable: Option<PathBuf>,
    #[serde(default)]
    pub politics: Option<PathBuf>,
    #[serde(default)]
    pub security: Option<PathBuf>,
}

/// Include/exclude regex pairs shared by the `elf`, `manpage`, and `xml`
/// config sections (spec §4.1).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegexOptions {
    #[serde(default)]
    pub include_path: Option<String>,
    #[serde(default)]
    pub exclude_path: Option<String>,
}

impl RegexOptions {
    pub fn compile(&self) -> Result<CompiledRegexOptions> {
        Ok(CompiledRegexOptions {
            include_path: self
                .include_path
                .as_deref()
                .map(regex::Regex::new)
                .transpose()
                .context("compiling include_path regex")?,
            exclude_path: self
                .exclude_path
                .as_deref()
                .map(regex::Regex::new)
                .transpose()
                .context("compiling exclude_path regex")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CompiledRegexOptions {
    pub include_path: Option<regex::Regex>,
    pub exclude_path: Option<regex::Regex>,
}

impl CompiledRegexOptions {
    /// True if `path` should be examined: no include pattern means
    /// "everything included", an exclude match always wins.
    pub fn applies(&self, path: &str) -> bool {
        let included = self.include_path.as_ref().is_none_or(|re| re.is_match(path));
        let excluded = self.exclude_path.as_ref().is_some_and(|re| re.is_match(path));
        included && !excluded
    }
}

/// Parse a config document's raw text, warning (via `log::warn!`) about
/// any top-level key outside [`KNOWN_SECTIONS`] instead of failing.
pub fn parse_document(text: &str) -> Result<Config> {
    let raw: Value = serde_yaml::from_str(text).context("parsing configuration YAML")?;
    warn_on_unknown_sections(&raw);
    serde_yaml::from_value(raw).context("deserializing configuration document")
}

fn warn_on_unknown_sections(raw: &Value) {
    let Value::Mapping(map) = raw else { return };
    for key in map.keys() {
        if let Value::String(k) = key
            && !KNOWN_SECTIONS.contains(&k.as_str())
        {
            log::warn!("ignoring unrecognized configuration section '{k}'");
        }
    }
}

/// Load and parse a config file from disk.
pub fn load_document(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading configuration file {}", path.display()))?;
    parse_document(&text)
}
