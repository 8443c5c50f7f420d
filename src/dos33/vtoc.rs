//! Volume Table of Contents parsing and free-map decoding, spec.md §4.5(a).
//! Field offsets and the freemap bit-packing are taken verbatim from
//! `examples/original_source/src/apple2disk/dos33disk.py`'s `VTOCSector`
//! (the `bitstring` unpack format string there enumerates the same offsets
//! this module reads by hand).

use crate::container::AnomalyLevel;
use crate::disk::{Disk, SectorRole};
use crate::error::{ImageError, TasteError};
use crate::fields::{freemap_bit, u16_le, u32_be};

pub const VTOC_TRACK: u8 = 0x11;
pub const VTOC_SECTOR: u8 = 0x00;

#[derive(Debug)]
pub struct Vtoc {
    pub catalog_track: u8,
    pub catalog_sector: u8,
    pub volume: u8,
    pub max_ts_pairs: u8,
    pub tracks_per_disk: u8,
    pub sectors_per_track: u8,
    pub bytes_per_sector: u16,
}

/// Parse the VTOC at (0x11, 0x00), reclassify it, decode its free-map, and
/// return the parsed fields. Returns `Err(TasteError::NotDos33(..))` without
/// mutating the disk if the mandatory fields don't match DOS 3.3 (dos
/// release, bytes/sector, sectors/track, max T/S pairs); non-mandatory
/// mismatches (track count, catalog location) are recorded as anomalies and
/// do not abort identification.
///
/// Returns the free-map as a 560-entry bitmap (track-major, sector-minor,
/// same indexing as `Disk::sectors()`) so the caller can later reconcile it
/// against which sectors actually ended up holding file data (spec.md §9's
/// deferred free-map/file-allocation reconciliation).
pub fn parse_and_classify(disk: &mut Disk) -> Result<(Vtoc, Vec<bool>), TasteError> {
    let bytes = disk.sector_data(VTOC_TRACK, VTOC_SECTOR)
        .map_err(|_| TasteError::NotDos33("VTOC sector (0x11,0x00) out of bounds".into()))?
        .to_vec();

    let catalog_track = bytes[0x01];
    let catalog_sector = bytes[0x02];
    let dos_release = bytes[0x03];
    let volume = bytes[0x06];
    let max_ts_pairs = bytes[0x27];
    let tracks_per_disk = bytes[0x34];
    let sectors_per_track = bytes[0x35];
    let bytes_per_sector = u16_le(&bytes, 0x36);

    if dos_release != 3 {
        return Err(TasteError::NotDos33(format!("dos_release is {} not 3", dos_release)));
    }
    if bytes_per_sector != 256 {
        return Err(TasteError::NotDos33(format!("bytes_per_sector is {} not 256", bytes_per_sector)));
    }
    if sectors_per_track != 16 {
        return Err(TasteError::NotDos33(format!("sectors_per_track is {} not 16", sectors_per_track)));
    }
    if max_ts_pairs != 122 {
        return Err(TasteError::NotDos33(format!("max_ts_pairs is {} not 122", max_ts_pairs)));
    }

    // Past this point the disk is committed to being DOS 3.3; reclassify and
    // record soft inconsistencies as anomalies instead of rejecting.
    disk.set_role(VTOC_TRACK, VTOC_SECTOR, SectorRole::Vtoc)
        .expect("VTOC coordinates are always in bounds");
    let vtoc_node = disk.sector_node(VTOC_TRACK, VTOC_SECTOR).expect("checked above");

    if tracks_per_disk != 35 {
        disk.tree_mut().append_anomaly(
            vtoc_node,
            AnomalyLevel::Unusual,
            format!("tracks_per_disk is {} not 35", tracks_per_disk),
        );
    }
    if (catalog_track, catalog_sector) != (0x11, 0x0F) {
        disk.tree_mut().append_anomaly(
            vtoc_node,
            AnomalyLevel::Unusual,
            format!("catalog chain starts at (${:02x},${:02x}) not (0x11,0x0f)", catalog_track, catalog_sector),
        );
    }

    let freemap = decode_freemap(disk, &bytes, tracks_per_disk, vtoc_node);

    Ok((Vtoc {
        catalog_track,
        catalog_sector,
        volume,
        max_ts_pairs,
        tracks_per_disk,
        sectors_per_track,
        bytes_per_sector,
    }, freemap))
}

fn decode_freemap(disk: &mut Disk, vtoc_bytes: &[u8], tracks_per_disk: u8, vtoc_node: crate::container::NodeId) -> Vec<bool> {
    let freemap_base = 0x38;
    let mut free_marked = vec![false; crate::disk::TRACKS_PER_DISK * crate::disk::SECTORS_PER_TRACK];

    for track in 0..tracks_per_disk {
        let word_offset = freemap_base + track as usize * 4;
        if word_offset + 4 > vtoc_bytes.len() {
            break;
        }
        let word = u32_be(vtoc_bytes, word_offset);
        for sector in 0..16u8 {
            if !freemap_bit(word, sector) {
                continue;
            }
            if track == 0 {
                disk.tree_mut().append_anomaly(
                    vtoc_node,
                    AnomalyLevel::Corruption,
                    "Freemap claims free sector in track 0".to_string(),
                );
                continue;
            }
            if track as usize >= crate::disk::TRACKS_PER_DISK {
                disk.tree_mut().append_anomaly(
                    vtoc_node,
                    AnomalyLevel::Corruption,
                    format!("Freemap claims free sector on track {} beyond disk bounds", track),
                );
                continue;
            }
            let idx = track as usize * crate::disk::SECTORS_PER_TRACK + sector as usize;
            free_marked[idx] = true;
            let prior = disk.set_role(track, sector, SectorRole::Free).expect("bounds checked above");
            // `prior == Free` means this sector was already free (e.g. a re-taste
            // of an already-tasted disk), not a collision with a real owner.
            if prior.is_specialized() && prior != SectorRole::Free {
                let node = disk.sector_node(track, sector).expect("bounds checked above");
                disk.tree_mut().append_anomaly(
                    node,
                    AnomalyLevel::Corruption,
                    "VTOC claims used sector is free".to_string(),
                );
                // the sector was already claimed by something real; restore
                // its role rather than letting the freemap silently steal it
                disk.set_role(track, sector, prior).ok();
            }
        }
    }
    free_marked
}

/// Convenience used only when the caller wants bounds errors surfaced as
/// `ImageError` rather than folded into `TasteError` (not used by `taste`,
/// kept for symmetry with the rest of the walker's helpers).
pub fn read_vtoc_sector(disk: &Disk) -> Result<&[u8], ImageError> {
    disk.sector_data(VTOC_TRACK, VTOC_SECTOR)
}
