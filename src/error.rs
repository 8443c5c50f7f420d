//! Error taxonomy. Following the teacher crate's convention
//! (`dos33::DOS33Error`, `fs::dos3x::types::Error`), whole-operation failures
//! are `thiserror` enums; local, recoverable inconsistencies discovered
//! during a walk are never modeled as `Result` errors, they become
//! [`crate::container::Anomaly`] records instead (see `dos33` and
//! `applesoft`).

use thiserror::Error;

/// Failures that reject an entire raw image before any sector can be
/// classified.
#[derive(Error,Debug,PartialEq,Eq)]
pub enum ImageError {
    #[error("buffer is {0} bytes, expected 143360 (140 KiB)")]
    UnsupportedSize(usize),
    #[error("track {track} sector {sector} is out of bounds")]
    OutOfBounds { track: u8, sector: u8 },
}

/// Returned by [`crate::taste::taste`] when the VTOC is inconsistent with
/// DOS 3.3. The underlying [`crate::disk::Disk`] is untouched and remains
/// usable as a generic (unidentified) disk.
#[derive(Error,Debug,PartialEq,Eq)]
pub enum TasteError {
    #[error("not a DOS 3.3 disk: {0}")]
    NotDos33(String),
}

/// Returned by a registered file-type parser (see `dos33::file_types`) when
/// it cannot make sense of a file's contents. Always converted into a
/// CORRUPTION anomaly on the `File` by the caller; never propagated further.
#[derive(Error,Debug,PartialEq,Eq)]
pub enum ParserError {
    #[error("{0}")]
    Malformed(String),
}
