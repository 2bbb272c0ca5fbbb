//! File-content analyzers used by the inspection drivers (spec §4.4).
//! Each submodule is a pure-data analyzer: reading raw bytes/text in,
//! structured findings out. Driving the external tools a handful of
//! these lean on (`modinfo`, `abidiff`, `kmidiff`) goes through
//! [`crate::parallel`].

pub mod abi;
pub mod elf;
pub mod kmod;
pub mod macros;
pub mod patch;
pub mod path_match;
pub mod xml;
