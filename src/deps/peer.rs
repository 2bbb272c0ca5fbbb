//! Two-pass symmetric dep-rule peering (spec §4.3).
//!
//! Grounded in `examples/original_source/lib/deprules.c::find_deprule_peers`:
//! a before→after pass followed by a second after→before pass, each
//! skipping rows that already have a peer from the first pass. This is
//! deliberately not a single merge-sort-style pass — it's the documented
//! tie-break when several rows of the same kind share a name (the first
//! pass prefers the lowest-index after-side match for each before-side
//! row; the second pass then mops up any after-side row the first pass
//! didn't claim, preferring the lowest-index before-side match).

use crate::models::dep_rule::DepRule;

/// Peer `before` and `after` dependency rule vectors of a single kind,
/// writing `peer` indices into both in place.
pub fn peer_dep_rules(before: &mut [DepRule], after: &mut [DepRule]) {
    for bi in 0..before.len() {
        if before[bi].peer.is_some() {
            continue;
        }
        if let Some(ai) = after
            .iter()
            .position(|a| a.peer.is_none() && a.name == before[bi].name)
        {
            before[bi].peer = Some(ai);
            after[ai].peer = Some(bi);
        }
    }

    for ai in 0..after.len() {
        if after[ai].peer.is_some() {
            continue;
        }
        if let Some(bi) = before
            .iter()
            .position(|b| b.peer.is_none() && b.name == after[ai].name)
        {
            after[ai].peer = Some(bi);
            before[bi].peer = Some(ai);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dep_rule::{DepKind, DepOp};

    fn rule(name: &str) -> DepRule {
        DepRule::new(DepKind::Requires, name, DepOp::None, None)
    }

    #[test]
    fn peers_matching_names_both_directions() {
        let mut before = vec![rule("foo"), rule("bar")];
        let mut after = vec![rule("bar"), rule("foo")];
        peer_dep_rules(&mut before, &mut after);
        assert_eq!(before[0].peer, Some(1));
        assert_eq!(before[1].peer, Some(0));
        assert_eq!(after[0].peer, Some(1));
        assert_eq!(after[1].peer, Some(0));
    }

    #[test]
    fn unmatched_rows_stay_unpeered() {
        let mut before = vec![rule("foo"), rule("removed-only")];
        let mut after = vec![rule("foo"), rule("added-only")];
        peer_dep_rules(&mut before, &mut after);
        assert_eq!(before[0].peer, Some(0));
        assert!(before[1].peer.is_none());
        assert!(after[1].peer.is_none());
    }

    #[test]
    fn duplicate_names_peer_by_first_available_index() {
        let mut before = vec![rule("dup"), rule("dup")];
        let mut after = vec![rule("dup"), rule("dup")];
        peer_dep_rules(&mut before, &mut after);
        assert_eq!(before[0].peer, Some(0));
        assert_eq!(before[1].peer, Some(1));
    }
}
