//! Domain model shared by every inspection (spec §3).

pub mod dep_rule;
pub mod file;
pub mod peer;
pub mod pkg;
pub mod result;
pub mod run_ctx;
pub mod severity;

pub use dep_rule::{DepKind, DepOp, DepRule};
pub use file::{File, FileType};
pub use peer::{Peer, PeerSet};
pub use pkg::{BuildSide, Pkg, PkgId};
pub use result::{ResultParams, ResultRecord};
pub use run_ctx::RunCtx;
pub use severity::{Severity, WaiverAuth};
