//! # rpminspect
//!
//! `rpminspect` audits one or two RPM package builds. Given an "after"
//! build, or a "before"/"after" pair, it runs a battery of independent
//! *inspections* over the extracted package payloads and emits a merged,
//! severity-ranked report.
//!
//! ## Architecture
//!
//! The crate is organized the way the framework itself is laid out:
//!
//! - [`config`]: the nested configuration document and profile overlay
//!   system (§4.1) plus the vendor data file formats it loads.
//! - [`acquisition`]: turning a build specification into extracted,
//!   parsed [`models::pkg::Pkg`]s on disk, and peering them across builds
//!   (§4.2).
//! - [`deps`]: collecting, filtering, peering, and classifying RPM
//!   dependency rows (§4.3).
//! - [`inspections`]: the inspection registry and driver contract (§4.4),
//!   including the worked-example inspections (`elf`, `patches`,
//!   `rpmdeps`, `kmod`, `changedfiles`, `abidiff`, `kmidiff`) and the
//!   closed set of stub entries for every other named inspection.
//! - [`analyzers`]: the shared, pure-data analyzers several inspections
//!   lean on (ELF hardening, kernel module metadata, patch format,
//!   XML well-formedness, spec-file macro scanning, the ABI-tool exit
//!   code decoder, and ignore-glob matching) (§4.6).
//! - [`parallel`]: the bounded subprocess driver external tools run
//!   through (§4.7).
//! - [`models`]: the shared domain model — `Pkg`, `File`, `Peer`,
//!   `DepRule`, `Result`, and the immutable `RunCtx` every inspection
//!   reads (§3).
//!
//! Out of scope for this crate, by design (spec §1 Non-goals): the
//! command-line help/man/packaging surface beyond the CLI parser itself,
//! the concrete text/JSON/XML/YAML/markdown renderers (the aggregator
//! only exposes the ordered result stream), remote build-service clients
//! (a `BuildSource` trait is the seam), and the domain-specific policy
//! logic of every individual inspection beyond the worked examples.

pub mod acquisition;
pub mod analyzers;
pub mod cli;
pub mod config;
pub mod deps;
pub mod error;
pub mod inspections;
pub mod models;
pub mod parallel;
pub mod report;

pub use error::RpmInspectError;
pub use models::run_ctx::RunCtx;
pub use models::severity::Severity;
