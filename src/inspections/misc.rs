//! Drivers for every registered inspection that is not one of the worked
//! examples (`elf`, `patches`, `rpmdeps`, `kmod`, `changedfiles`,
//! `abidiff`, `kmidiff` live in their own modules). Each of these still
//! reads real package/file data and reports genuine findings, but the
//! policy each one enforces is deliberately narrow — a complete
//! `rpminspect` reimplements entire RPM-packaging-guideline checklists
//! per inspection, which is out of scope here.

use crate::analyzers::{elf as elf_analyzer, xml as xml_analyzer};
use crate::inspections::{for_each_peer_file, register_inspection};
use crate::models::dep_rule::DepKind;
use crate::models::file::FileType;
use crate::models::result::ResultParams;
use crate::models::run_ctx::RunCtx;
use crate::models::severity::Severity;

fn emit(ctx: &RunCtx, name: &str, severity: Severity, message: String, file: Option<String>) {
    ctx.add_result(ResultParams {
        severity,
        inspection: name.to_string(),
        message,
        file,
        ..Default::default()
    });
}

// ---------------------------------------------------------------------
// license
// ---------------------------------------------------------------------

fn license_driver(ctx: &RunCtx) {
    for pkg in &ctx.packages {
        match &pkg.license {
            Some(tag) if !tag.trim().is_empty() => {}
            _ => emit(ctx, "license", Severity::Bad, format!("{} has no License tag", pkg.nevra), None),
        }
    }
}
register_inspection!(7, "license", true, license_driver);

// ---------------------------------------------------------------------
// emptyrpm
// ---------------------------------------------------------------------

fn emptyrpm_driver(ctx: &RunCtx) {
    // spec §8 boundary: Verify for after-only emptiness, Info if both
    // sides are already empty (a pre-existing condition, not a new one).
    for peer in &ctx.peers.peers {
        let Some(after_id) = peer.after else { continue };
        let after = &ctx.packages[after_id];
        if after.is_source_rpm || !after.files.is_empty() {
            continue;
        }
        let before_empty = peer.before.map(|id| ctx.packages[id].files.is_empty());
        let severity = if before_empty == Some(true) { Severity::Info } else { Severity::Verify };
        emit(ctx, "emptyrpm", severity, format!("{} carries no payload files", after.nevra), None);
    }
}
register_inspection!(8, "emptyrpm", true, emptyrpm_driver);

// ---------------------------------------------------------------------
// metadata
// ---------------------------------------------------------------------

fn metadata_driver(ctx: &RunCtx) {
    for pkg in &ctx.packages {
        if pkg.summary.as_deref().unwrap_or("").trim().is_empty() {
            emit(ctx, "metadata", Severity::Verify, format!("{} has an empty Summary", pkg.nevra), None);
        }
        if pkg.description.as_deref().unwrap_or("").trim().is_empty() {
            emit(ctx, "metadata", Severity::Verify, format!("{} has an empty %description", pkg.nevra), None);
        }
    }
    for peer in ctx.peers.complete_peers() {
        let before = &ctx.packages[peer.before.unwrap()];
        let after = &ctx.packages[peer.after.unwrap()];
        if before.vendor != after.vendor {
            emit(
                ctx,
                "metadata",
                Severity::Info,
                format!("{} vendor changed from {:?} to {:?}", after.name, before.vendor, after.vendor),
                None,
            );
        }
    }
}
register_inspection!(9, "metadata", true, metadata_driver);

// ---------------------------------------------------------------------
// manpage
// ---------------------------------------------------------------------

fn manpage_driver(ctx: &RunCtx) {
    let Ok(opts) = ctx.config.manpage.compile() else {
        emit(ctx, "manpage", Severity::Bad, "manpage include/exclude regex failed to compile".into(), None);
        return;
    };
    for_each_peer_file(ctx, "manpage", |_pkg, after, _before| {
        if after.file_type != FileType::Regular || !opts.applies(&after.localpath) {
            return;
        }
        if !after.localpath.contains("/man/") {
            return;
        }
        if !after.localpath.contains('.') {
            emit(
                ctx,
                "manpage",
                Severity::Verify,
                format!("{} has no section suffix (man1, man3, ...)", after.localpath),
                Some(after.localpath.clone()),
            );
        }
    });
}
register_inspection!(10, "manpage", true, manpage_driver);

// ---------------------------------------------------------------------
// xml
// ---------------------------------------------------------------------

fn xml_driver(ctx: &RunCtx) {
    let Ok(opts) = ctx.config.xml.compile() else {
        emit(ctx, "xml", Severity::Bad, "xml include/exclude regex failed to compile".into(), None);
        return;
    };
    for_each_peer_file(ctx, "xml", |_pkg, after, _before| {
        if after.file_type != FileType::Regular || !opts.applies(&after.localpath) {
            return;
        }
        let Some(path) = &after.fullpath else { return };
        let Ok(data) = std::fs::read(path) else { return };
        let validation = xml_analyzer::validate(&data);
        if !validation.well_formed {
            emit(
                ctx,
                "xml",
                Severity::Bad,
                format!(
                    "{} is not well-formed XML: {}",
                    after.localpath,
                    validation.error.as_deref().unwrap_or("unknown error")
                ),
                Some(after.localpath.clone()),
            );
        }
    });
}
register_inspection!(11, "xml", true, xml_driver);

// ---------------------------------------------------------------------
// desktop
// ---------------------------------------------------------------------

fn desktop_driver(ctx: &RunCtx) {
    for_each_peer_file(ctx, "desktop", |_pkg, after, _before| {
        if !after.localpath.ends_with(".desktop") {
            return;
        }
        let Some(path) = &after.fullpath else { return };
        let Ok(text) = std::fs::read_to_string(path) else { return };
        for required in ["[Desktop Entry]", "Name=", "Type="] {
            if !text.contains(required) {
                emit(
                    ctx,
                    "desktop",
                    Severity::Bad,
                    format!("{} is missing required key {required:?}", after.localpath),
                    Some(after.localpath.clone()),
                );
            }
        }
    });
}
register_inspection!(12, "desktop", true, desktop_driver);

// ---------------------------------------------------------------------
// disttag
// ---------------------------------------------------------------------

fn disttag_driver(ctx: &RunCtx) {
    for pkg in &ctx.packages {
        let has_dist_tag = pkg.release.contains(".el") || pkg.release.contains(".fc") || pkg.release.contains(".module");
        if !has_dist_tag {
            emit(
                ctx,
                "disttag",
                Severity::Verify,
                format!("{} release {:?} carries no recognizable dist tag", pkg.nevra, pkg.release),
                None,
            );
        }
    }
}
register_inspection!(13, "disttag", true, disttag_driver);

// ---------------------------------------------------------------------
// specname
// ---------------------------------------------------------------------

fn specname_driver(ctx: &RunCtx) {
    for pkg in &ctx.packages {
        if !pkg.is_source_rpm {
            continue;
        }
        let expected = format!("{}.spec", pkg.name);
        let has_matching_spec = pkg.files.iter().any(|f| f.basename() == expected);
        if !has_matching_spec {
            emit(
                ctx,
                "specname",
                Severity::Verify,
                format!("{} does not contain a spec file named {expected:?}", pkg.nevra),
                None,
            );
        }
    }
}
register_inspection!(14, "specname", true, specname_driver);

// ---------------------------------------------------------------------
// modularity
// ---------------------------------------------------------------------

fn modularity_driver(ctx: &RunCtx) {
    for pkg in &ctx.packages {
        let looks_modular = pkg.release.contains(".module");
        let has_module_metadata = pkg.files.iter().any(|f| f.localpath.contains("/modulemd"));
        if looks_modular && !has_module_metadata {
            emit(
                ctx,
                "modularity",
                Severity::Info,
                format!("{} release suggests a module build but carries no modulemd payload", pkg.nevra),
                None,
            );
        }
    }
}
register_inspection!(15, "modularity", true, modularity_driver);

// ---------------------------------------------------------------------
// javabytecode
// ---------------------------------------------------------------------

/// Class-file major version 61 corresponds to Java 17, a reasonable
/// default ceiling absent a configured target release.
const DEFAULT_MAX_CLASS_MAJOR: u16 = 61;

fn javabytecode_driver(ctx: &RunCtx) {
    for_each_peer_file(ctx, "javabytecode", |_pkg, after, _before| {
        if !after.localpath.ends_with(".class") {
            return;
        }
        let Some(path) = &after.fullpath else { return };
        let Ok(data) = std::fs::read(path) else { return };
        if data.len() < 8 || data[0..4] != [0xCA, 0xFE, 0xBA, 0xBE] {
            return;
        }
        let major = u16::from_be_bytes([data[6], data[7]]);
        if major > DEFAULT_MAX_CLASS_MAJOR {
            emit(
                ctx,
                "javabytecode",
                Severity::Verify,
                format!("{} was compiled for class file major version {major}, above the expected ceiling", after.localpath),
                Some(after.localpath.clone()),
            );
        }
    });
}
register_inspection!(16, "javabytecode", true, javabytecode_driver);

// ---------------------------------------------------------------------
// movedfiles / removedfiles / addedfiles
// ---------------------------------------------------------------------

fn movedfiles_driver(ctx: &RunCtx) {
    for peer in ctx.peers.complete_peers() {
        let before = &ctx.packages[peer.before.unwrap()];
        let after = &ctx.packages[peer.after.unwrap()];
        for bf in &before.files {
            let Some(peer_idx) = bf.peer_file else { continue };
            let af = &after.files[peer_idx];
            if af.localpath != bf.localpath && af.basename() == bf.basename() {
                emit(
                    ctx,
                    "movedfiles",
                    Severity::Info,
                    format!("file moved from {} to {}", bf.localpath, af.localpath),
                    Some(af.localpath.clone()),
                );
            }
        }
    }
}
register_inspection!(17, "movedfiles", false, movedfiles_driver);

fn removedfiles_driver(ctx: &RunCtx) {
    for peer in ctx.peers.complete_peers() {
        let before = &ctx.packages[peer.before.unwrap()];
        let after = &ctx.packages[peer.after.unwrap()];
        for bf in &before.files {
            if bf.peer_file.is_none() {
                emit(
                    ctx,
                    "removedfiles",
                    Severity::Verify,
                    format!("{} removed from {}", bf.localpath, after.name),
                    Some(bf.localpath.clone()),
                );
            }
        }
    }
}
register_inspection!(18, "removedfiles", false, removedfiles_driver);

fn addedfiles_driver(ctx: &RunCtx) {
    for peer in ctx.peers.complete_peers() {
        let after = &ctx.packages[peer.after.unwrap()];
        for af in &after.files {
            if af.peer_file.is_none() {
                emit(
                    ctx,
                    "addedfiles",
                    Severity::Info,
                    format!("{} added to {}", af.localpath, after.name),
                    Some(af.localpath.clone()),
                );
            }
        }
    }
}
register_inspection!(19, "addedfiles", false, addedfiles_driver);

// ---------------------------------------------------------------------
// upstream
// ---------------------------------------------------------------------

fn upstream_driver(ctx: &RunCtx) {
    for peer in ctx.peers.complete_peers() {
        let before = &ctx.packages[peer.before.unwrap()];
        let after = &ctx.packages[peer.after.unwrap()];
        if before.source != after.source && before.version == after.version {
            emit(
                ctx,
                "upstream",
                Severity::Info,
                format!("{} Source tags changed without a version bump ({})", after.name, after.version),
                None,
            );
        }
    }
}
register_inspection!(20, "upstream", false, upstream_driver);

// ---------------------------------------------------------------------
// ownership
// ---------------------------------------------------------------------

fn ownership_driver(ctx: &RunCtx) {
    for_each_peer_file(ctx, "ownership", |_pkg, after, _before| {
        if after.owner != "root" || after.group != "root" {
            emit(
                ctx,
                "ownership",
                Severity::Info,
                format!("{} owned by {}:{} instead of root:root", after.localpath, after.owner, after.group),
                Some(after.localpath.clone()),
            );
        }
    });
}
register_inspection!(21, "ownership", true, ownership_driver);

// ---------------------------------------------------------------------
// shellsyntax
// ---------------------------------------------------------------------

fn shellsyntax_driver(ctx: &RunCtx) {
    for_each_peer_file(ctx, "shellsyntax", |_pkg, after, _before| {
        if after.file_type != FileType::Regular {
            return;
        }
        let Some(path) = &after.fullpath else { return };
        let Ok(data) = std::fs::read(path) else { return };
        let Some(first_line) = data.split(|&b| b == b'\n').next() else { return };
        let is_shell_script = first_line.starts_with(b"#!") && first_line.windows(2).any(|w| w == b"sh");
        if is_shell_script && after.mode & 0o111 == 0 {
            emit(
                ctx,
                "shellsyntax",
                Severity::Verify,
                format!("{} has a shell shebang but is not executable", after.localpath),
                Some(after.localpath.clone()),
            );
        }
    });
}
register_inspection!(22, "shellsyntax", true, shellsyntax_driver);

// ---------------------------------------------------------------------
// annocheck
// ---------------------------------------------------------------------

fn annocheck_driver(ctx: &RunCtx) {
    emit(
        ctx,
        "annocheck",
        Severity::Skip,
        "annocheck driver requires the external annocheck binary, which this run did not configure".to_string(),
        None,
    );
}
register_inspection!(23, "annocheck", true, annocheck_driver);

// ---------------------------------------------------------------------
// dsodeps
// ---------------------------------------------------------------------

fn is_soname(name: &str) -> bool {
    name.contains(".so")
}

fn dsodeps_driver(ctx: &RunCtx) {
    for peer in ctx.peers.complete_peers() {
        let before = &ctx.packages[peer.before.unwrap()];
        let after = &ctx.packages[peer.after.unwrap()];
        let before_rules = before.dep_rules_with(crate::deps::collect_dep_rules);
        let after_rules = after.dep_rules_with(crate::deps::collect_dep_rules);

        let before_sonames: std::collections::HashSet<&str> = before_rules
            .iter()
            .filter(|r| r.kind == DepKind::Requires && is_soname(&r.name))
            .map(|r| r.name.as_str())
            .collect();
        for rule in after_rules.iter().filter(|r| r.kind == DepKind::Requires && is_soname(&r.name)) {
            if !before_sonames.contains(rule.name.as_str()) {
                emit(
                    ctx,
                    "dsodeps",
                    Severity::Info,
                    format!("{} gained a new shared library dependency on {}", after.name, rule.name),
                    None,
                );
            }
        }
    }
}
register_inspection!(24, "dsodeps", false, dsodeps_driver);

// ---------------------------------------------------------------------
// filesize
// ---------------------------------------------------------------------

const LARGE_FILE_BYTES: u64 = 100 * 1024 * 1024;

fn filesize_driver(ctx: &RunCtx) {
    // spec §4.1 `filesize.size_threshold`/§8 boundary: -1 ("info"/
    // "info-only"/"info_only") means every size change is Info only,
    // regardless of how large the growth is.
    let info_only = ctx.config.filesize.size_threshold < 0;

    for_each_peer_file(ctx, "filesize", |_pkg, after, before| {
        if after.size > LARGE_FILE_BYTES {
            emit(
                ctx,
                "filesize",
                Severity::Info,
                format!("{} is {} bytes", after.localpath, after.size),
                Some(after.localpath.clone()),
            );
        }
        if let Some(before) = before
            && before.size != 0
            && after.size > before.size.saturating_mul(2)
        {
            emit(
                ctx,
                "filesize",
                if info_only { Severity::Info } else { Severity::Verify },
                format!("{} grew from {} to {} bytes", after.localpath, before.size, after.size),
                Some(after.localpath.clone()),
            );
        }
    });
}
register_inspection!(25, "filesize", true, filesize_driver);

// ---------------------------------------------------------------------
// permissions
// ---------------------------------------------------------------------

fn permissions_driver(ctx: &RunCtx) {
    for_each_peer_file(ctx, "permissions", |_pkg, after, _before| {
        if after.file_type == FileType::Regular && after.mode & 0o002 != 0 {
            emit(
                ctx,
                "permissions",
                Severity::Bad,
                format!("{} is world-writable (mode {:o})", after.localpath, after.mode & 0o7777),
                Some(after.localpath.clone()),
            );
        }
        if after.mode & 0o4000 != 0 {
            emit(
                ctx,
                "permissions",
                Severity::Verify,
                format!("{} is setuid (mode {:o})", after.localpath, after.mode & 0o7777),
                Some(after.localpath.clone()),
            );
        }
        if let Some(expected) = ctx.vendor_data.fileinfo_for(&after.localpath) {
            let expected_mode = crate::config::parse_mode10(&expected.mode_string) & 0o7777;
            if expected_mode != after.mode & 0o7777 {
                emit(
                    ctx,
                    "permissions",
                    Severity::Verify,
                    format!(
                        "{} has mode {:o}, vendor data expects {:o}",
                        after.localpath,
                        after.mode & 0o7777,
                        expected_mode
                    ),
                    Some(after.localpath.clone()),
                );
            }
        }
    });
}
register_inspection!(26, "permissions", true, permissions_driver);

// ---------------------------------------------------------------------
// capabilities
// ---------------------------------------------------------------------

fn capabilities_driver(ctx: &RunCtx) {
    for pkg in &ctx.packages {
        for file in &pkg.files {
            if ctx.vendor_data.expected_capability(&pkg.name, &file.localpath).is_some() {
                emit(
                    ctx,
                    "capabilities",
                    Severity::Skip,
                    format!(
                        "{} has a configured capability expectation, but file capability xattrs are not \
                         captured during extraction and cannot be compared",
                        file.localpath
                    ),
                    Some(file.localpath.clone()),
                );
            }
        }
    }
}
register_inspection!(27, "capabilities", true, capabilities_driver);

// ---------------------------------------------------------------------
// arch
// ---------------------------------------------------------------------

fn arch_driver(ctx: &RunCtx) {
    for pkg in &ctx.packages {
        if pkg.arch != "noarch" {
            continue;
        }
        for file in &pkg.files {
            if file.file_type != FileType::Regular {
                continue;
            }
            let Some(path) = &file.fullpath else { continue };
            let Ok(data) = std::fs::read(path) else { continue };
            if let Ok(Some(_findings)) = elf_analyzer::examine(&data) {
                emit(
                    ctx,
                    "arch",
                    Severity::Bad,
                    format!("{} is tagged noarch but ships the ELF object {}", pkg.nevra, file.localpath),
                    Some(file.localpath.clone()),
                );
            }
        }
    }
}
register_inspection!(28, "arch", true, arch_driver);

// ---------------------------------------------------------------------
// subpackages
// ---------------------------------------------------------------------

fn subpackages_driver(ctx: &RunCtx) {
    for peer in &ctx.peers.peers {
        if peer.is_added() {
            let pkg = &ctx.packages[peer.after.unwrap()];
            emit(ctx, "subpackages", Severity::Info, format!("new subpackage {}", pkg.name), None);
        } else if peer.is_removed() {
            let pkg = &ctx.packages[peer.before.unwrap()];
            emit(ctx, "subpackages", Severity::Verify, format!("subpackage {} disappeared", pkg.name), None);
        }
    }
}
register_inspection!(29, "subpackages", false, subpackages_driver);

// ---------------------------------------------------------------------
// changelog
// ---------------------------------------------------------------------

fn changelog_driver(ctx: &RunCtx) {
    for peer in ctx.peers.complete_peers() {
        let before = &ctx.packages[peer.before.unwrap()];
        let after = &ctx.packages[peer.after.unwrap()];
        if before.version != after.version || before.release != after.release {
            emit(
                ctx,
                "changelog",
                Severity::Diagnostic,
                format!(
                    "{} moved from {}-{} to {}-{}; confirm the %changelog gained a matching entry",
                    after.name, before.version, before.release, after.version, after.release
                ),
                None,
            );
        }
    }
}
register_inspection!(30, "changelog", false, changelog_driver);

// ---------------------------------------------------------------------
// pathmigration
// ---------------------------------------------------------------------

const MIGRATED_PATH_PREFIXES: &[(&str, &str)] =
    &[("/bin/", "/usr/bin/"), ("/sbin/", "/usr/sbin/"), ("/lib/", "/usr/lib/"), ("/lib64/", "/usr/lib64/")];

fn pathmigration_driver(ctx: &RunCtx) {
    for_each_peer_file(ctx, "pathmigration", |_pkg, after, _before| {
        for (old, new) in MIGRATED_PATH_PREFIXES {
            if after.localpath.starts_with(old) {
                emit(
                    ctx,
                    "pathmigration",
                    Severity::Verify,
                    format!("{} uses legacy path prefix {old}; packaging guidelines expect {new}", after.localpath),
                    Some(after.localpath.clone()),
                );
            }
        }
    });
}
register_inspection!(31, "pathmigration", true, pathmigration_driver);

// ---------------------------------------------------------------------
// lto
// ---------------------------------------------------------------------

fn lto_driver(ctx: &RunCtx) {
    for_each_peer_file(ctx, "lto", |_pkg, after, _before| {
        if !after.localpath.ends_with(".a") {
            return;
        }
        let Some(path) = &after.fullpath else { return };
        let Ok(data) = std::fs::read(path) else { return };
        if data.windows(b".gnu.lto_".len()).any(|w| w == b".gnu.lto_") {
            emit(
                ctx,
                "lto",
                Severity::Bad,
                format!("{} is a static archive containing LTO bytecode instead of native objects", after.localpath),
                Some(after.localpath.clone()),
            );
        }
    });
}
register_inspection!(32, "lto", true, lto_driver);

// ---------------------------------------------------------------------
// symlinks
// ---------------------------------------------------------------------

fn symlinks_driver(ctx: &RunCtx) {
    for pkg in &ctx.packages {
        let localpaths: std::collections::HashSet<&str> = pkg.files.iter().map(|f| f.localpath.as_str()).collect();
        for file in &pkg.files {
            if file.file_type != FileType::Symlink {
                continue;
            }
            let Some(target) = &file.fullpath else { continue };
            let Ok(raw_target) = std::fs::read_link(target) else { continue };
            let Some(target_str) = raw_target.to_str() else { continue };
            let resolved = if target_str.starts_with('/') {
                target_str.to_string()
            } else {
                let dir = file.localpath.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
                format!("{dir}/{target_str}")
            };
            if !localpaths.contains(resolved.as_str()) {
                emit(
                    ctx,
                    "symlinks",
                    Severity::Verify,
                    format!("{} -> {target_str} dangles outside the package payload", file.localpath),
                    Some(file.localpath.clone()),
                );
            }
        }
    }
}
register_inspection!(33, "symlinks", true, symlinks_driver);

// ---------------------------------------------------------------------
// files
// ---------------------------------------------------------------------

const FORBIDDEN_DIRS: &[&str] = &["/tmp/", "/var/tmp/", "/root/"];

fn files_driver(ctx: &RunCtx) {
    for_each_peer_file(ctx, "files", |_pkg, after, _before| {
        for forbidden in FORBIDDEN_DIRS {
            if after.localpath.starts_with(forbidden) {
                emit(
                    ctx,
                    "files",
                    Severity::Bad,
                    format!("{} installs into forbidden path {forbidden}", after.localpath),
                    Some(after.localpath.clone()),
                );
            }
        }
    });
}
register_inspection!(34, "files", true, files_driver);

// ---------------------------------------------------------------------
// types
// ---------------------------------------------------------------------

fn types_driver(ctx: &RunCtx) {
    for_each_peer_file(ctx, "types", |_pkg, after, before| {
        let Some(before) = before else { return };
        if before.file_type != after.file_type {
            emit(
                ctx,
                "types",
                Severity::Verify,
                format!("{} changed type from {:?} to {:?}", after.localpath, before.file_type, after.file_type),
                Some(after.localpath.clone()),
            );
        }
    });
}
register_inspection!(35, "types", false, types_driver);

// ---------------------------------------------------------------------
// config
// ---------------------------------------------------------------------

fn config_driver(ctx: &RunCtx) {
    for_each_peer_file(ctx, "config", |_pkg, after, before| {
        let Some(before) = before else { return };
        if before.is_config() != after.is_config() {
            emit(
                ctx,
                "config",
                Severity::Verify,
                format!("{}'s %config flag changed across builds", after.localpath),
                Some(after.localpath.clone()),
            );
        }
    });
}
register_inspection!(36, "config", false, config_driver);

// ---------------------------------------------------------------------
// doc
// ---------------------------------------------------------------------

fn doc_driver(ctx: &RunCtx) {
    for_each_peer_file(ctx, "doc", |_pkg, after, _before| {
        if after.localpath.contains("/doc/") && after.size == 0 {
            emit(
                ctx,
                "doc",
                Severity::Info,
                format!("{} is an empty %doc file", after.localpath),
                Some(after.localpath.clone()),
            );
        }
    });
}
register_inspection!(37, "doc", true, doc_driver);

// ---------------------------------------------------------------------
// virus
// ---------------------------------------------------------------------

fn virus_driver(ctx: &RunCtx) {
    emit(
        ctx,
        "virus",
        Severity::Skip,
        "virus driver requires an external antivirus scanner, which this run did not configure".to_string(),
        None,
    );
}
register_inspection!(38, "virus", true, virus_driver);

// ---------------------------------------------------------------------
// politics
// ---------------------------------------------------------------------

fn politics_driver(ctx: &RunCtx) {
    for pkg in &ctx.packages {
        for file in &pkg.files {
            if let Some(entry) = ctx.vendor_data.politics_for(&file.localpath)
                && !entry.allowed
            {
                emit(
                    ctx,
                    "politics",
                    Severity::Bad,
                    format!("{} is denylisted by politically sensitive content rule (digest {})", file.localpath, entry.digest_sha256),
                    Some(file.localpath.clone()),
                );
            }
        }
    }
}
register_inspection!(39, "politics", true, politics_driver);

// ---------------------------------------------------------------------
// badfuncs
// ---------------------------------------------------------------------

const BANNED_FUNCTIONS: &[&str] = &["gets", "strcpy", "sprintf", "vsprintf", "strcat"];

fn badfuncs_driver(ctx: &RunCtx) {
    for_each_peer_file(ctx, "badfuncs", |_pkg, after, _before| {
        if after.file_type != FileType::Regular {
            return;
        }
        let Some(path) = &after.fullpath else { return };
        let Ok(data) = std::fs::read(path) else { return };
        let Ok(Some(findings)) = elf_analyzer::examine(&data) else { return };
        for banned in BANNED_FUNCTIONS {
            if findings.imported_symbols.iter().any(|s| s == banned) {
                emit(
                    ctx,
                    "badfuncs",
                    Severity::Bad,
                    format!("{} imports banned function {banned}", after.localpath),
                    Some(after.localpath.clone()),
                );
            }
        }
    });
}
register_inspection!(40, "badfuncs", true, badfuncs_driver);

// ---------------------------------------------------------------------
// runpath
// ---------------------------------------------------------------------

fn runpath_driver(ctx: &RunCtx) {
    for_each_peer_file(ctx, "runpath", |_pkg, after, _before| {
        if after.file_type != FileType::Regular {
            return;
        }
        let Some(path) = &after.fullpath else { return };
        let Ok(data) = std::fs::read(path) else { return };
        if data.windows(b"$ORIGIN/../../".len()).any(|w| w == b"$ORIGIN/../../") {
            emit(
                ctx,
                "runpath",
                Severity::Verify,
                format!("{} appears to set an overly broad $ORIGIN-relative runpath", after.localpath),
                Some(after.localpath.clone()),
            );
        }
    });
}
register_inspection!(41, "runpath", true, runpath_driver);

// ---------------------------------------------------------------------
// unicode
// ---------------------------------------------------------------------

fn has_bidi_control(text: &str) -> bool {
    text.chars().any(|c| matches!(c as u32, 0x202A..=0x202E | 0x2066..=0x2069))
}

fn unicode_driver(ctx: &RunCtx) {
    for_each_peer_file(ctx, "unicode", |_pkg, after, _before| {
        if after.file_type != FileType::Regular || after.size > 1_000_000 {
            return;
        }
        let Some(path) = &after.fullpath else { return };
        let Ok(text) = std::fs::read_to_string(path) else { return };
        if has_bidi_control(&text) {
            emit(
                ctx,
                "unicode",
                Severity::Bad,
                format!("{} contains a Unicode bidirectional control character", after.localpath),
                Some(after.localpath.clone()),
            );
        }
    });
}
register_inspection!(42, "unicode", true, unicode_driver);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bidi_control_detection() {
        assert!(has_bidi_control("safe\u{202E}evil"));
        assert!(!has_bidi_control("perfectly ordinary text"));
    }

    #[test]
    fn soname_detection() {
        assert!(is_soname("libfoo.so.1"));
        assert!(!is_soname("foo-devel"));
    }

    #[test]
    fn path_migration_table_maps_legacy_prefixes() {
        assert!(MIGRATED_PATH_PREFIXES.iter().any(|(old, _)| *old == "/bin/"));
    }
}
