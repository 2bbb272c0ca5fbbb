//! Vendor data file formats (spec §4.1, §6): small whitespace-delimited
//! text tables shipped alongside the main config document. Malformed
//! lines are logged and skipped rather than failing the whole load,
//! matching the forgiving posture spec §4.1 asks for on the main config
//! document's unknown keys.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

/// One `fileinfo` row: the expected mode/owner/group for a path (spec
/// §4.1 "fileinfo (10-char mode strings)").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfoEntry {
    pub mode_string: String,
    pub owner: String,
    pub group: String,
    pub path: String,
}

/// One `capabilities` row: the Linux capability string a given package's
/// file is expected to carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilitiesEntry {
    pub package: String,
    pub path: String,
    pub capability: String,
}

/// One `rebaseable` row: a package name allowed to jump version without
/// tripping the rebase-sensitive checks in `changedfiles`/`upstream`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseableEntry {
    pub package: String,
}

/// One `politics` row: an explicit allow/deny for a path by digest,
/// independent of the package it ships in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoliticsEntry {
    pub path: String,
    pub digest_sha256: String,
    pub allowed: bool,
}

/// One `security` row: a path pattern that always requires
/// `WaiverAuth::Security` regardless of what an inspection would
/// otherwise assign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityEntry {
    pub package: String,
    pub path_pattern: String,
}

/// All five vendor-data tables for a run, indexed for the lookups the
/// inspections actually perform.
#[derive(Debug, Clone, Default)]
pub struct VendorData {
    pub fileinfo: Vec<FileInfoEntry>,
    pub capabilities: Vec<CapabilitiesEntry>,
    pub rebaseable: HashMap<String, RebaseableEntry>,
    pub politics: Vec<PoliticsEntry>,
    pub security: Vec<SecurityEntry>,
}

impl VendorData {
    pub fn is_rebaseable(&self, package: &str) -> bool {
        self.rebaseable.contains_key(package)
    }

    pub fn expected_capability(&self, package: &str, path: &str) -> Option<&str> {
        self.capabilities
            .iter()
            .find(|e| e.package == package && e.path == path)
            .map(|e| e.capability.as_str())
    }

    pub fn fileinfo_for(&self, path: &str) -> Option<&FileInfoEntry> {
        self.fileinfo.iter().find(|e| e.path == path)
    }

    pub fn politics_for(&self, path: &str) -> Option<&PoliticsEntry> {
        self.politics.iter().find(|e| e.path == path)
    }

    pub fn requires_security_waiver(&self, package: &str, path: &str) -> bool {
        self.security
            .iter()
            .any(|e| e.package == package && glob::Pattern::new(&e.path_pattern).is_ok_and(|p| p.matches(path)))
    }
}

/// Parse a ten-character `ls -l`-style mode string into POSIX mode bits
/// (spec §6 "fileinfo lines" table). Any length other than 10 is a
/// malformed row (spec §8 boundary): warn and report mode 0 rather than
/// failing the whole vendor-data load.
pub fn parse_mode10(s: &str) -> u32 {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() != 10 {
        log::warn!("fileinfo: mode string {s:?} is not 10 characters, treating as mode 0");
        return 0;
    }

    let type_bits = match chars[0] {
        '-' => 0o100000,
        'd' => 0o040000,
        'l' => 0o120000,
        'b' => 0o060000,
        'c' => 0o020000,
        's' => 0o140000,
        'p' => 0o010000,
        'w' => 0,
        other => {
            log::warn!("fileinfo: unrecognized file type character {other:?}, treating as mode 0");
            return 0;
        }
    };

    let owner_r = if chars[1] == 'r' { 0o400 } else { 0 };
    let owner_w = if chars[2] == 'w' { 0o200 } else { 0 };
    let (owner_x, owner_s) = match chars[3] {
        'x' => (0o100, 0),
        's' => (0o100, 0o4000),
        'S' => (0, 0o4000),
        _ => (0, 0),
    };

    let group_r = if chars[4] == 'r' { 0o040 } else { 0 };
    let group_w = if chars[5] == 'w' { 0o020 } else { 0 };
    let (group_x, group_s) = match chars[6] {
        'x' => (0o010, 0),
        's' => (0o010, 0o2000),
        'S' => (0, 0o2000),
        _ => (0, 0),
    };

    let other_r = if chars[7] == 'r' { 0o004 } else { 0 };
    let other_w = if chars[8] == 'w' { 0o002 } else { 0 };
    let (other_x, other_t) = match chars[9] {
        'x' => (0o001, 0),
        't' => (0o001, 0o1000),
        'T' => (0, 0o1000),
        _ => (0, 0),
    };

    type_bits
        | owner_r | owner_w | owner_x | owner_s
        | group_r | group_w | group_x | group_s
        | other_r | other_w | other_x | other_t
}

fn lines_of(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading vendor data file {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

pub fn parse_fileinfo(path: &Path) -> Result<Vec<FileInfoEntry>> {
    let mut out = Vec::new();
    for line in lines_of(path)? {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            log::warn!("fileinfo: skipping malformed line {line:?}");
            continue;
        }
        out.push(FileInfoEntry {
            mode_string: fields[0].to_string(),
            owner: fields[1].to_string(),
            group: fields[2].to_string(),
            path: fields[3].to_string(),
        });
    }
    Ok(out)
}

pub fn parse_capabilities(path: &Path) -> Result<Vec<CapabilitiesEntry>> {
    let mut out = Vec::new();
    for line in lines_of(path)? {
        let fields: Vec<&str> = line.splitn(3, char::is_whitespace).collect();
        if fields.len() != 3 {
            log::warn!("capabilities: skipping malformed line {line:?}");
            continue;
        }
        out.push(CapabilitiesEntry {
            package: fields[0].to_string(),
            path: fields[1].to_string(),
            capability: fields[2].trim().to_string(),
        });
    }
    Ok(out)
}

pub fn parse_rebaseable(path: &Path) -> Result<HashMap<String, RebaseableEntry>> {
    let mut out = HashMap::new();
    for line in lines_of(path)? {
        let package = line.split_whitespace().next().unwrap_or(&line).to_string();
        out.insert(package.clone(), RebaseableEntry { package });
    }
    Ok(out)
}

pub fn parse_politics(path: &Path) -> Result<Vec<PoliticsEntry>> {
    let mut out = Vec::new();
    for line in lines_of(path)? {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            log::warn!("politics: skipping malformed line {line:?}");
            continue;
        }
        let allowed = match fields[2] {
            "allow" | "allowed" => true,
            "deny" | "denied" => false,
            other => {
                log::warn!("politics: unrecognized disposition {other:?}, treating as deny");
                false
            }
        };
        out.push(PoliticsEntry {
            path: fields[0].to_string(),
            digest_sha256: fields[1].to_string(),
            allowed,
        });
    }
    Ok(out)
}

pub fn parse_security(path: &Path) -> Result<Vec<SecurityEntry>> {
    let mut out = Vec::new();
    for line in lines_of(path)? {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            log::warn!("security: skipping malformed line {line:?}");
            continue;
        }
        out.push(SecurityEntry {
            package: fields[0].to_string(),
            path_pattern: fields[1].to_string(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parses_fileinfo_skipping_comments_and_blanks() {
        let f = write_temp("# comment\n\n-rwxr-xr-x root root /usr/bin/foo\n");
        let rows = parse_fileinfo(f.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].path, "/usr/bin/foo");
        assert_eq!(rows[0].mode_string, "-rwxr-xr-x");
    }

    #[test]
    fn malformed_fileinfo_line_is_skipped_not_fatal() {
        let f = write_temp("only two fields\n-rwxr-xr-x root root /bin/ok\n");
        let rows = parse_fileinfo(f.path()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn parses_capabilities_with_multi_word_capability() {
        let f = write_temp("ping /usr/bin/ping cap_net_raw+ep\n");
        let rows = parse_capabilities(f.path()).unwrap();
        assert_eq!(rows[0].capability, "cap_net_raw+ep");
    }

    #[test]
    fn politics_deny_by_default_on_unknown_disposition() {
        let f = write_temp("foo /usr/bin/foo abcd1234 maybe\n");
        // four fields is malformed for this format, so nothing parses
        let rows = parse_politics(f.path()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn parse_mode10_decodes_type_and_permission_bits() {
        assert_eq!(parse_mode10("-rwxr-xr-x"), 0o100755);
        assert_eq!(parse_mode10("drwxr-xr-x"), 0o040755);
        assert_eq!(parse_mode10("lrwxrwxrwx"), 0o120777);
    }

    #[test]
    fn parse_mode10_collapses_suid_sgid_sticky() {
        assert_eq!(parse_mode10("-rwsr-xr-x"), 0o104755);
        assert_eq!(parse_mode10("-rwxr-sr-x"), 0o102755);
        assert_eq!(parse_mode10("-rwxr-xr-t"), 0o101755);
        // capital S: special bit set but exec bit absent.
        assert_eq!(parse_mode10("-rwSr--r--"), 0o104644);
    }

    #[test]
    fn parse_mode10_wrong_length_warns_and_returns_zero() {
        assert_eq!(parse_mode10("-rwxr-xr-"), 0);
        assert_eq!(parse_mode10("-rwxr-xr-xx"), 0);
    }

    #[test]
    fn parse_mode10_unrecognized_type_char_returns_zero() {
        assert_eq!(parse_mode10("zrwxr-xr-x"), 0);
    }

    #[test]
    fn vendor_data_lookups() {
        let mut vd = VendorData::default();
        vd.rebaseable.insert("kernel".into(), RebaseableEntry { package: "kernel".into() });
        vd.security.push(SecurityEntry { package: "openssl".into(), path_pattern: "/etc/pki/*".into() });
        assert!(vd.is_rebaseable("kernel"));
        assert!(!vd.is_rebaseable("bash"));
        assert!(vd.requires_security_waiver("openssl", "/etc/pki/tls/cert.pem"));
        assert!(!vd.requires_security_waiver("openssl", "/etc/other/cert.pem"));
    }
}
