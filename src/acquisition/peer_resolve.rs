//! Package- and file-level peer resolution (spec §4.2 step 5).
//!
//! Grounded in `examples/original_source/src/librpminspect/peers.c`:
//! package peering is keyed on `(name, arch)`, claimed entries are
//! removed from the candidate pool so a given after-package can match at
//! most one before-package, and anything left unclaimed on either side
//! becomes a removed/added peer.

use std::collections::HashMap;

use crate::models::peer::{Peer, PeerSet};
use crate::models::pkg::{BuildSide, Pkg, PkgId};

/// Pair up before/after packages by `(name, arch)`.
pub fn resolve_package_peers(packages: &[Pkg]) -> PeerSet {
    let mut after_pool: HashMap<(&str, &str), Vec<PkgId>> = HashMap::new();
    for pkg in packages.iter().filter(|p| p.side == BuildSide::After) {
        after_pool.entry(pkg.peer_key()).or_default().push(pkg.id);
    }

    let mut claimed_after = vec![false; packages.len()];
    let mut set = PeerSet::new();

    for before in packages.iter().filter(|p| p.side == BuildSide::Before) {
        let candidates = after_pool.get_mut(&before.peer_key());
        let matched = candidates.and_then(|pool| {
            let pos = pool.iter().position(|&id| !claimed_after[id]);
            pos.map(|pos| pool.remove(pos))
        });
        match matched {
            Some(after_id) => {
                claimed_after[after_id] = true;
                set.push(Peer { before: Some(before.id), after: Some(after_id) });
            }
            None => set.push(Peer { before: Some(before.id), after: None }),
        }
    }

    for pkg in packages.iter().filter(|p| p.side == BuildSide::After) {
        if !claimed_after[pkg.id] {
            set.push(Peer { before: None, after: Some(pkg.id) });
        }
    }

    set
}

/// Substitute `from` with `to` in `path`, used to relax a file-peering
/// match across a version or version-release bump (spec §4.2 step 5
/// "successively relaxed localpath/version-substitution matching").
fn substitute(path: &str, from: &str, to: &str) -> Option<String> {
    if from.is_empty() || !path.contains(from) {
        return None;
    }
    Some(path.replacen(from, to, 1))
}

/// Resolve file-level peers for one complete package peer, writing
/// `peer_file` indices directly onto both packages' `files` vectors.
///
/// Three successively relaxed match tiers, each claiming from the
/// remaining unclaimed pool before falling through to the next:
/// 1. identical `localpath`,
/// 2. `localpath` with the after package's version substituted for the
///    before package's version (paths like `/usr/share/doc/foo-1.0/...`),
/// 3. the same substitution using `version-release` instead of just
///    `version`.
pub fn resolve_file_peers(before: &mut Pkg, after: &mut Pkg) {
    let before_version = before.version.clone();
    let after_version = after.version.clone();
    let before_vr = format!("{}-{}", before.version, before.release);
    let after_vr = format!("{}-{}", after.version, after.release);

    let mut after_unclaimed: Vec<usize> = (0..after.files.len()).collect();

    for bi in 0..before.files.len() {
        let candidates = [
            before.files[bi].localpath.clone(),
            substitute(&before.files[bi].localpath, &before_version, &after_version)
                .unwrap_or_default(),
            substitute(&before.files[bi].localpath, &before_vr, &after_vr).unwrap_or_default(),
        ];

        let found = candidates.iter().find_map(|candidate| {
            if candidate.is_empty() {
                return None;
            }
            after_unclaimed
                .iter()
                .position(|&ai| &after.files[ai].localpath == candidate)
        });

        if let Some(pos) = found {
            let ai = after_unclaimed.remove(pos);
            before.files[bi].peer_file = Some(ai);
            after.files[ai].peer_file = Some(bi);
        }
    }
}
