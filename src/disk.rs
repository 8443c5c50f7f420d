//! Raw disk image and generic sector model. Owns the 140 KiB buffer and the
//! `(track, sector) -> role` map described in spec.md §3/§4.2; supports
//! reclassification of a sector's role as the DOS 3.3 walker discovers what
//! each one actually is.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

use crate::container::{NodeId, Tree, AnomalyLevel};
use crate::error::ImageError;
use crate::known_hashes;

pub const SECTOR_SIZE: usize = 256;
pub const SECTORS_PER_TRACK: usize = 16;
pub const TRACKS_PER_DISK: usize = 35;
pub const DISK_BYTES: usize = TRACKS_PER_DISK * SECTORS_PER_TRACK * SECTOR_SIZE;

/// The discovered role of a sector. Reclassification mutates this field in
/// place on the owning [`SectorMeta`] rather than allocating a new wrapper
/// object and leaving the old one dangling (see spec.md §9, "Reclassification
/// without orphans"): there is exactly one struct per `(track, sector)` for
/// the lifetime of the `Disk`, so "at most one live owner" is true by
/// construction rather than something the walker must maintain.
#[derive(Debug,Clone,PartialEq,Eq)]
pub enum SectorRole {
    Generic,
    Boot1,
    Vtoc,
    Catalog,
    FileMetadata { filename: String },
    FileData { filename: String },
    Free,
}

impl SectorRole {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Generic => "GenericSector",
            Self::Boot1 => "Boot1",
            Self::Vtoc => "VTOCSector",
            Self::Catalog => "CatalogSector",
            Self::FileMetadata { .. } => "FileMetadataSector",
            Self::FileData { .. } => "FileDataSector",
            Self::Free => "FreeSector",
        }
    }

    /// Whether this sector has already been claimed by some role other than
    /// the default. Used by the walker to detect collisions before
    /// reclassifying (spec.md §4.3).
    pub fn is_specialized(&self) -> bool {
        !matches!(self, Self::Generic)
    }
}

/// Metadata and current role for one `(track, sector)` slot. Bytes never
/// mutate; hash and entropy are computed once, at disk load time, since the
/// underlying data is immutable for the life of the `Disk`.
#[derive(Debug)]
pub struct SectorMeta {
    pub track: u8,
    pub sector: u8,
    pub hash: String,
    pub entropy_pct: u8,
    pub role: SectorRole,
    pub node: NodeId,
}

impl SectorMeta {
    /// `HumanName` per spec.md §4.4.
    pub fn human_name(&self) -> String {
        known_hashes::human_name(&self.hash, self.entropy_pct)
    }

    /// Hex/ASCII dump of this sector's bytes, in the spirit of
    /// `examples/original_source/src/apple2disk/utils.py`'s `HexDump`, but
    /// expressed as an owned string via iterator chunking instead of a print
    /// loop.
    pub fn hex_dump(&self, data: &[u8]) -> String {
        let mut out = String::new();
        for (row, chunk) in data.chunks(8).enumerate() {
            out.push_str(&format!("${:04x}:  ", row * 8));
            for b in chunk {
                out.push_str(&format!("{:02x} ", b));
            }
            out.push_str("   ");
            for b in chunk {
                let c = *b & 0x7f;
                if c.is_ascii_graphic() || c == b' ' {
                    out.push(c as char);
                } else {
                    out.push('.');
                }
            }
            out.push('\n');
        }
        out
    }
}

fn index_of(track: u8, sector: u8) -> usize {
    track as usize * SECTORS_PER_TRACK + sector as usize
}

/// Owns the raw 140 KiB buffer and the reclassifiable sector map. This is
/// the root of the container tree: every sector is a direct child, and
/// reconstructed files (and their parsed contents) are attached as the walk
/// proceeds.
pub struct Disk {
    pub name: String,
    data: Box<[u8; DISK_BYTES]>,
    pub hash: String,
    sectors: Vec<SectorMeta>,
    tree: Tree,
    root: NodeId,
}

impl Disk {
    /// Construct a `Disk` from a 143,360-byte buffer. Rejects any other
    /// length per spec.md §4.2 step 1.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Result<Self, ImageError> {
        if data.len() != DISK_BYTES {
            log::warn!("rejecting image of {} bytes, expected {}", data.len(), DISK_BYTES);
            return Err(ImageError::UnsupportedSize(data.len()));
        }
        let name = name.into();
        let boxed: Box<[u8; DISK_BYTES]> = data.into_boxed_slice().try_into()
            .unwrap_or_else(|_| unreachable!("length checked above"));
        let hash = sha1_hex(&boxed[..]);

        let mut tree = Tree::new();
        let root = tree.add_root(format!("Disk({})", name));

        let mut sectors = Vec::with_capacity(TRACKS_PER_DISK * SECTORS_PER_TRACK);
        for track in 0..TRACKS_PER_DISK as u8 {
            for sector in 0..SECTORS_PER_TRACK as u8 {
                let offset = track as usize * SECTORS_PER_TRACK * SECTOR_SIZE + sector as usize * SECTOR_SIZE;
                let slice = &boxed[offset..offset+SECTOR_SIZE];
                let node = tree.add_child(root, format!("Sector(${:02x},${:02x})", track, sector));
                sectors.push(SectorMeta {
                    track,
                    sector,
                    hash: sha1_hex(slice),
                    entropy_pct: entropy_pct(slice),
                    role: SectorRole::Generic,
                    node,
                });
            }
        }

        let mut disk = Self { name, data: boxed, hash, sectors, tree, root };
        // Assign ownership of (0,0) to Boot1 by reclassification, per
        // spec.md §4.2 step 4.
        disk.set_role(0, 0, SectorRole::Boot1).expect("(0,0) always in bounds");
        Ok(disk)
    }

    pub fn root_node(&self) -> NodeId { self.root }
    pub fn tree(&self) -> &Tree { &self.tree }
    pub fn tree_mut(&mut self) -> &mut Tree { &mut self.tree }

    pub fn append_anomaly(&mut self, level: AnomalyLevel, message: impl Into<String>) {
        self.tree.append_anomaly(self.root, level, message);
    }

    fn bounds_check(&self, track: u8, sector: u8) -> Result<(), ImageError> {
        if sector as usize >= SECTORS_PER_TRACK || track as usize >= TRACKS_PER_DISK {
            return Err(ImageError::OutOfBounds { track, sector });
        }
        Ok(())
    }

    /// Current owner handle for `(track, sector)`.
    pub fn sector(&self, track: u8, sector: u8) -> Result<&SectorMeta, ImageError> {
        self.bounds_check(track, sector)?;
        Ok(&self.sectors[index_of(track, sector)])
    }

    /// The raw 256-byte window for `(track, sector)`. Never mutates.
    pub fn sector_data(&self, track: u8, sector: u8) -> Result<&[u8], ImageError> {
        self.bounds_check(track, sector)?;
        let offset = track as usize * SECTORS_PER_TRACK * SECTOR_SIZE + sector as usize * SECTOR_SIZE;
        Ok(&self.data[offset..offset+SECTOR_SIZE])
    }

    /// All 560 sectors, track-major then sector-minor (the same order they
    /// were loaded in; spec.md §5 requires this order be preserved).
    pub fn sectors(&self) -> &[SectorMeta] {
        &self.sectors
    }

    /// Rewrap `(track, sector)`'s role, returning the role it held before.
    /// This is the Rust expression of spec.md §4.3's reclassification: the
    /// "new wrapper" is just a new enum value assigned in place, so the
    /// unique-owner and single-sector-object invariants hold automatically
    /// rather than needing to be separately maintained (see `SectorRole`'s
    /// doc comment).
    pub fn set_role(&mut self, track: u8, sector: u8, role: SectorRole) -> Result<SectorRole, ImageError> {
        self.bounds_check(track, sector)?;
        let idx = index_of(track, sector);
        log::debug!("({}) ${:02x},${:02x}: {} -> {}", self.name, track, sector, self.sectors[idx].role.type_tag(), role.type_tag());
        Ok(std::mem::replace(&mut self.sectors[idx].role, role))
    }

    /// Node this sector's anomalies should attach to.
    pub fn sector_node(&self, track: u8, sector: u8) -> Result<NodeId, ImageError> {
        self.bounds_check(track, sector)?;
        Ok(self.sectors[index_of(track, sector)].node)
    }

    /// SHA-1 of the boot sector (0,0), used by the driver to group disks
    /// that share an identical first-stage boot loader.
    pub fn boot1_hash(&self) -> &str {
        &self.sectors[index_of(0, 0)].hash
    }
}

fn sha1_hex(bytes: &[u8]) -> String {
    let mut h = sha1_smol::Sha1::new();
    h.update(bytes);
    h.digest().to_string()
}

/// `(zlib_compressed_len * 100) / 256`, per spec.md §3.
fn entropy_pct(bytes: &[u8]) -> u8 {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(bytes).expect("compressing an in-memory buffer cannot fail");
    let compressed = enc.finish().expect("compressing an in-memory buffer cannot fail");
    ((compressed.len() * 100) / SECTOR_SIZE) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_size() {
        let err = Disk::new("t", vec![0u8; 100]).unwrap_err();
        assert_eq!(err, ImageError::UnsupportedSize(100));
    }

    #[test]
    fn has_560_sectors_and_boot1_at_0_0() {
        let disk = Disk::new("zero", vec![0u8; DISK_BYTES]).unwrap();
        assert_eq!(disk.sectors().len(), 560);
        assert_eq!(disk.sector(0,0).unwrap().role, SectorRole::Boot1);
        assert_eq!(disk.sector(0,1).unwrap().role, SectorRole::Generic);
    }

    #[test]
    fn out_of_bounds_is_reported() {
        let disk = Disk::new("zero", vec![0u8; DISK_BYTES]).unwrap();
        assert!(disk.sector(35, 0).is_err());
        assert!(disk.sector(0, 16).is_err());
    }

    #[test]
    fn zero_sector_hash_is_known() {
        let disk = Disk::new("zero", vec![0u8; DISK_BYTES]).unwrap();
        // (0,1) is still all-zero and untouched
        assert_eq!(disk.sector(0,1).unwrap().human_name(), "Zero sector");
    }

    #[test]
    fn reclassification_preserves_single_owner() {
        let mut disk = Disk::new("t", vec![0u8; DISK_BYTES]).unwrap();
        let prior = disk.set_role(1, 0, SectorRole::Free).unwrap();
        assert_eq!(prior, SectorRole::Generic);
        assert_eq!(disk.sector(1,0).unwrap().role, SectorRole::Free);
        assert_eq!(disk.sectors().len(), 560, "reclassification must not add a duplicate child");
    }
}
