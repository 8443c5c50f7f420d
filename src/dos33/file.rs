//! Per-file track/sector-list chain walk and sparse-data reconstruction,
//! spec.md §4.5(c). Grounded in
//! `examples/original_source/src/apple2disk/dos33disk.py`'s
//! `Dos33Disk.ReadFile`, translated from its `while next_track and
//! next_sector` loop into an explicit Rust loop over `(track, sector)`
//! tuples.

use crate::container::{AnomalyLevel, NodeId, Tree};
use crate::disk::{Disk, SectorRole, SECTOR_SIZE};
use crate::dos33::catalog::CatalogEntry;
use crate::dos33::file_types::{self, ParsedContents};

pub const PAIRS_PER_TS_SECTOR: usize = 122;

/// A file's reconstructed data, keeping holes explicit rather than
/// zero-filling them (spec.md §9 design choice (b)). `blocks` holds only the
/// slots that were actually present on disk, each paired with its logical
/// slot index; `total_slots` is the trimmed slot-vector length, i.e. the
/// number of data-sector slots the catalog's `length` field implies once the
/// metadata sectors actually walked are subtracted out.
#[derive(Debug, Default)]
pub struct FileContents {
    pub blocks: Vec<(usize, Vec<u8>)>,
    pub total_slots: usize,
}

impl FileContents {
    /// Concatenation of the present blocks in logical order. Holes are
    /// simply absent, so this is shorter than `total_slots * 256` whenever
    /// the file is sparse.
    pub fn sequence(&self) -> Vec<u8> {
        self.blocks.iter().flat_map(|(_, b)| b.iter().copied()).collect()
    }

    pub fn occupied_slots(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_hole(&self, idx: usize) -> bool {
        idx < self.total_slots && !self.blocks.iter().any(|(i, _)| *i == idx)
    }
}

/// A reconstructed file: its catalog entry, whether the walk found it
/// deleted, its (possibly sparse, possibly empty) contents, and any parsed
/// view of those contents (AppleSoft today; other file types have no
/// parser).
pub struct FileEntry {
    pub catalog: CatalogEntry,
    pub deleted: bool,
    pub contents: FileContents,
    pub parsed: Option<ParsedContents>,
    pub node: NodeId,
}

/// Walk one file's track/sector-list chain and reconstruct its contents.
/// `free_marked` is the free-map bitmap decoded from the VTOC; any data
/// sector this walk claims that was also marked free gets noted in
/// `overlaps_free` so the caller can raise the post-walk reconciliation
/// anomaly described in spec.md §9.
pub fn read_file(
    disk: &mut Disk,
    parent: NodeId,
    entry: CatalogEntry,
    free_marked: &[bool],
    overlaps_free: &mut Vec<(u8, u8)>,
) -> FileEntry {
    let filename = entry.file_name_trimmed();
    let node = disk.tree_mut().add_child(parent, format!("File({})", filename));

    let mut next = (entry.first_ts_track, entry.first_ts_sector);
    let mut ts_sector_count = 0usize;
    let mut slots: Vec<Option<(u8, u8)>> = vec![None; entry.length as usize];
    let mut deleted = false;
    let mut visited = std::collections::HashSet::new();

    while next.0 != 0 && next.1 != 0 {
        if !visited.insert(next) {
            disk.tree_mut().append_anomaly(
                node,
                AnomalyLevel::Corruption,
                format!("track/sector list revisits (${:02x},${:02x}); stopping", next.0, next.1),
            );
            break;
        }
        ts_sector_count += 1;

        if next.0 == 0xFF {
            deleted = true;
            disk.tree_mut().append_anomaly(
                node,
                AnomalyLevel::Info,
                "file is marked deleted in the catalog".to_string(),
            );
            break;
        }

        let bytes = match disk.sector_data(next.0, next.1) {
            Ok(b) => b.to_vec(),
            Err(_) => {
                disk.tree_mut().append_anomaly(
                    node,
                    AnomalyLevel::Corruption,
                    format!("track/sector list points out of bounds at (${:02x},${:02x})", next.0, next.1),
                );
                break;
            }
        };

        let want_role = SectorRole::FileMetadata { filename: filename.clone() };
        let prior = disk.set_role(next.0, next.1, want_role.clone()).expect("bounds checked above");
        if prior.is_specialized() && prior != want_role {
            let sector_node = disk.sector_node(next.0, next.1).expect("bounds checked above");
            disk.tree_mut().append_anomaly(
                sector_node,
                AnomalyLevel::Corruption,
                format!("track/sector list sector (${:02x},${:02x}) already claimed", next.0, next.1),
            );
        }

        let next_track = bytes[1];
        let next_sector = bytes[2];
        let sector_offset = crate::fields::u16_le(&bytes, 5) as usize;

        for pair in 0..PAIRS_PER_TS_SECTOR {
            let off = 0x0C + pair * 2;
            if off + 2 > bytes.len() {
                break;
            }
            let t = bytes[off];
            let s = bytes[off + 1];
            if t == 0 && s == 0 {
                break;
            }
            let idx = sector_offset + pair;
            if idx < slots.len() {
                slots[idx] = Some((t, s));
            }
        }

        next = (next_track, next_sector);
    }

    let trimmed_len = entry.length.saturating_sub(ts_sector_count as u16) as usize;
    slots.truncate(trimmed_len.min(slots.len()));

    let mut contents = FileContents { blocks: Vec::new(), total_slots: slots.len() };
    for (idx, slot) in slots.iter().enumerate() {
        let Some((t, s)) = slot else { continue };
        match disk.sector_data(*t, *s) {
            Err(_) => {
                disk.tree_mut().append_anomaly(
                    node,
                    AnomalyLevel::Corruption,
                    format!("data sector (${:02x},${:02x}) for slot {} is out of bounds", t, s, idx),
                );
                continue;
            }
            Ok(data) => {
                let data = data.to_vec();
                let sector_idx = *t as usize * crate::disk::SECTORS_PER_TRACK + *s as usize;
                if free_marked.get(sector_idx).copied().unwrap_or(false) {
                    overlaps_free.push((*t, *s));
                }
                let want_role = SectorRole::FileData { filename: filename.clone() };
                let prior = disk.set_role(*t, *s, want_role.clone()).expect("bounds checked above");
                // `prior == want_role` means this is an idempotent re-taste, not a
                // collision; `prior == Free` means the overlap is already reported by
                // the dedicated free-map reconciliation anomaly above, not this one.
                if prior.is_specialized() && prior != want_role && prior != SectorRole::Free {
                    let sector_node = disk.sector_node(*t, *s).expect("bounds checked above");
                    disk.tree_mut().append_anomaly(
                        sector_node,
                        AnomalyLevel::Corruption,
                        format!("data sector (${:02x},${:02x}) already claimed", t, s),
                    );
                }
                contents.blocks.push((idx, data));
                assert_eq!(contents.blocks.last().unwrap().1.len(), SECTOR_SIZE);
            }
        }
    }

    let parsed = parse_contents(disk.tree_mut(), node, &entry, &filename, &contents);

    FileEntry { catalog: entry, deleted, contents, parsed, node }
}

fn parse_contents(tree: &mut Tree, node: NodeId, entry: &CatalogEntry, filename: &str, contents: &FileContents) -> Option<ParsedContents> {
    let info = file_types::lookup(entry.file_type())?;
    let parser = info.parser?;
    let sequence = contents.sequence();
    match parser(tree, node, filename, &sequence) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tree.append_anomaly(node, AnomalyLevel::Corruption, format!("failed to parse as {}: {}", info.long, e));
            None
        }
    }
}
