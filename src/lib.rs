//! Decomposes a raw Apple II DOS 3.3 floppy disk image into its constituent
//! sectors and files, reconstructing filesystem structure and detokenizing
//! AppleSoft BASIC programs along the way. Every deviation from a
//! well-formed DOS 3.3 disk is recorded as a severity-classified anomaly
//! rather than failing the whole decomposition; see [`container::Anomaly`].
//!
//! The crate root is deliberately thin: [`disk::Disk`] owns the raw image
//! and the generic sector map, [`taste::taste`] identifies a filesystem and
//! hands back a typed walk result, and [`applesoft`] detokenizes BASIC
//! program bytes once a file has been reconstructed. Directory traversal,
//! CLI argument handling, and output formatting live in the `a2disk` binary,
//! not here.

pub mod container;
pub mod disk;
pub mod error;
pub mod known_hashes;
pub mod fields;
pub mod applesoft;
pub mod dos33;
pub mod taste;
