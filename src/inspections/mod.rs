//! The inspection registry (spec §4.4): a closed set of named checks,
//! each registered as `(id_bit, name, single_build_ok, driver)` and
//! dispatched uniformly.
//!
//! Registration follows the teacher's own `inventory`-based pattern in
//! `src/parsers/metadata.rs` (`register_parser!` + `inventory::collect!`)
//! — generalized here from "package type parser" to "inspection driver".

mod abidiff;
mod changedfiles;
mod elf;
mod kmod;
mod misc;
mod patches;
mod rpmdeps;

use crate::models::file::File;
use crate::models::pkg::Pkg;
use crate::models::run_ctx::RunCtx;

/// Uniform inspection driver signature: given the run context, inspect
/// whatever it needs to and call `ctx.add_result` for every finding.
pub type InspectionDriver = fn(&RunCtx);

/// One entry in the closed inspection registry.
pub struct InspectionMetadata {
    /// Bit position in `RunCtx::enabled_mask`.
    pub id_bit: u32,
    pub name: &'static str,
    /// Whether this inspection can run against a single build (no
    /// "after" side) rather than requiring a before/after comparison.
    pub single_build_ok: bool,
    pub driver: InspectionDriver,
}

inventory::collect!(InspectionMetadata);

/// Register one inspection. Mirrors the teacher's `register_parser!`
/// macro shape.
macro_rules! register_inspection {
    ($id_bit:expr, $name:expr, $single_build_ok:expr, $driver:path) => {
        inventory::submit! {
            $crate::inspections::InspectionMetadata {
                id_bit: $id_bit,
                name: $name,
                single_build_ok: $single_build_ok,
                driver: $driver,
            }
        }
    };
}
pub(crate) use register_inspection;

/// Every registered inspection, in registration order (not alphabetical
/// — matches `inventory`'s own iteration order, which is link order and
/// therefore stable for a given build but not meaningful to sort by).
pub fn all() -> impl Iterator<Item = &'static InspectionMetadata> {
    inventory::iter::<InspectionMetadata>()
}

pub fn by_name(name: &str) -> Option<&'static InspectionMetadata> {
    all().find(|i| i.name == name)
}

/// Run every inspection whose bit is set in `ctx.enabled_mask`.
pub fn run_enabled(ctx: &RunCtx) {
    for inspection in all() {
        if ctx.enabled_mask & (1u64 << inspection.id_bit) == 0 {
            continue;
        }
        if !inspection.single_build_ok && ctx.after_build.is_none() {
            ctx.add_result(crate::models::result::ResultParams {
                severity: crate::models::severity::Severity::Skip,
                inspection: inspection.name.to_string(),
                message: format!("{} requires a before/after comparison", inspection.name),
                ..Default::default()
            });
            continue;
        }
        (inspection.driver)(ctx);
    }
}

/// Iterate every complete package peer's matched files, applying the
/// global and per-inspection ignore globs (spec §4.4 `for_each_peer_file`,
/// resolving Open Question 3 by canonicalizing both the config's
/// per-inspection ignore-group keys and the registry's inspection names
/// to the same string before comparing).
pub fn for_each_peer_file<'a>(
    ctx: &'a RunCtx,
    inspection: &str,
    mut visit: impl FnMut(&'a Pkg, &'a File, Option<&'a File>),
) {
    let mut ignore_globs: Vec<String> = ctx.config.ignore.clone();
    if let Some(extra) = ctx.config.inspections.ignore.get(inspection) {
        ignore_globs.extend(extra.iter().cloned());
    }
    let compiled = crate::analyzers::path_match::compile_ignore_list(&ignore_globs);

    for peer in ctx.peers.complete_peers() {
        let Some(after_id) = peer.after else { continue };
        let after_pkg = &ctx.packages[after_id];
        let before_pkg = peer.before.map(|id| &ctx.packages[id]);

        for file in &after_pkg.files {
            if crate::analyzers::path_match::is_ignored(&file.localpath, &compiled) {
                continue;
            }
            let before_file = before_pkg.and_then(|bp| {
                file.peer_file.and_then(|_| {
                    bp.files.iter().find(|bf| bf.peer_file == Some(file.idx))
                })
            });
            visit(after_pkg, file, before_file);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_non_empty_and_names_are_unique() {
        let names: Vec<&str> = all().map(|i| i.name).collect();
        assert!(!names.is_empty());
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len(), "duplicate inspection name in registry");
    }

    #[test]
    fn by_name_finds_a_known_inspection() {
        assert!(by_name("elf").is_some());
        assert!(by_name("not-a-real-inspection").is_none());
    }
}
