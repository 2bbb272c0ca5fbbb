//! Before/after package pairing (spec §3, §4.2 step 5).

use super::pkg::PkgId;

/// A `(name, arch)` match between the before and after build. Either side
/// may be absent: a `before`-only peer is a removed package, an
/// `after`-only peer is an added one.
///
/// File-level peering (`File::peer_file`) is resolved separately, once
/// per `Peer`, and stored directly on the two packages' `files` vectors
/// rather than duplicated here.
#[derive(Debug, Clone, Copy)]
pub struct Peer {
    pub before: Option<PkgId>,
    pub after: Option<PkgId>,
}

impl Peer {
    pub fn is_complete(&self) -> bool {
        self.before.is_some() && self.after.is_some()
    }

    pub fn is_added(&self) -> bool {
        self.before.is_none() && self.after.is_some()
    }

    pub fn is_removed(&self) -> bool {
        self.before.is_some() && self.after.is_none()
    }
}

/// The full set of package peers for a run, plus the packages that were
/// never claimed by any peer (shouldn't happen once resolution runs to
/// completion, but kept distinct so the resolver can assert it).
#[derive(Debug, Default)]
pub struct PeerSet {
    pub peers: Vec<Peer>,
}

impl PeerSet {
    pub fn new() -> Self {
        PeerSet { peers: Vec::new() }
    }

    pub fn push(&mut self, peer: Peer) {
        self.peers.push(peer);
    }

    pub fn complete_peers(&self) -> impl Iterator<Item = &Peer> {
        self.peers.iter().filter(|p| p.is_complete())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_added_removed_complete() {
        let complete = Peer { before: Some(0), after: Some(1) };
        let added = Peer { before: None, after: Some(2) };
        let removed = Peer { before: Some(3), after: None };

        assert!(complete.is_complete() && !complete.is_added() && !complete.is_removed());
        assert!(added.is_added() && !added.is_complete());
        assert!(removed.is_removed() && !removed.is_complete());
    }

    #[test]
    fn complete_peers_filters_partial_entries() {
        let mut set = PeerSet::new();
        set.push(Peer { before: Some(0), after: Some(1) });
        set.push(Peer { before: None, after: Some(2) });
        assert_eq!(set.complete_peers().count(), 1);
    }
}
