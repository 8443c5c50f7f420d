//! End-to-end scenarios against synthesized disk images, mirroring the
//! concrete scenarios in spec.md §8 (S1-S6). Each test builds a raw
//! 143,360-byte buffer by hand (no real disk image on hand to read back;
//! there's no writer side to this crate) and drives it through the public
//! `Disk::new` / `taste::taste` pipeline exactly as the CLI driver would.

use a2disk::disk::{Disk, SectorRole, DISK_BYTES, SECTORS_PER_TRACK, SECTOR_SIZE};
use a2disk::dos33::file_types::ParsedContents;
use a2disk::taste::{self, Tasted};

fn sector_offset(track: u8, sector: u8) -> usize {
    track as usize * SECTORS_PER_TRACK * SECTOR_SIZE + sector as usize * SECTOR_SIZE
}

fn put(raw: &mut [u8], track: u8, sector: u8, at: usize, bytes: &[u8]) {
    let base = sector_offset(track, sector) + at;
    raw[base..base + bytes.len()].copy_from_slice(bytes);
}

fn padded_name(name: &str) -> [u8; 30] {
    let mut out = [b' '; 30];
    out[..name.len()].copy_from_slice(name.as_bytes());
    out
}

/// Writes a minimal valid VTOC: dos_release=3, volume=254, 35 tracks, 16
/// sectors/track, 256 bytes/sector, 122 T/S pairs/sector, catalog chain
/// starting at `catalog` (defaults to (0x11,0x0F) in every scenario but S4).
fn write_vtoc(raw: &mut [u8], catalog: (u8, u8)) {
    put(raw, 0x11, 0x00, 0x01, &[catalog.0]);
    put(raw, 0x11, 0x00, 0x02, &[catalog.1]);
    put(raw, 0x11, 0x00, 0x03, &[3]); // dos_release
    put(raw, 0x11, 0x00, 0x06, &[254]); // volume
    put(raw, 0x11, 0x00, 0x27, &[122]); // max_ts_pairs
    put(raw, 0x11, 0x00, 0x34, &[35]); // tracks_per_disk
    put(raw, 0x11, 0x00, 0x35, &[16]); // sectors_per_track
    put(raw, 0x11, 0x00, 0x36, &256u16.to_le_bytes()); // bytes_per_sector
}

/// One catalog entry slot (35 bytes) at `slot` (0..7) within the catalog
/// sector at `(track, sector)`.
fn write_catalog_entry(
    raw: &mut [u8],
    track: u8,
    sector: u8,
    slot: usize,
    first_ts: (u8, u8),
    file_type: u8,
    name: &str,
    length: u16,
) {
    let off = 0x0B + slot * 35;
    put(raw, track, sector, off, &[first_ts.0, first_ts.1, file_type]);
    put(raw, track, sector, off + 3, &padded_name(name));
    put(raw, track, sector, off + 33, &length.to_le_bytes());
}

/// A minimal tokenized AppleSoft program: a single `10 PRINT "HI"` line,
/// optionally followed by extra raw token bytes spliced into that line
/// before its terminating 0x00 (used by the S6 bad-token scenario).
fn hello_program_bytes(extra_tokens: &[u8]) -> Vec<u8> {
    const LOAD_ADDRESS: u16 = 0x801;
    let mut tokens = vec![0xBA]; // PRINT
    tokens.push(b'"');
    tokens.extend_from_slice(b"HI");
    tokens.push(b'"');
    tokens.extend_from_slice(extra_tokens);
    tokens.push(0x00);

    let next_addr = LOAD_ADDRESS + 2 + 2 + tokens.len() as u16;
    let mut buf = Vec::new();
    buf.extend_from_slice(&0u16.to_le_bytes()); // declared length, unused
    buf.extend_from_slice(&next_addr.to_le_bytes());
    buf.extend_from_slice(&10u16.to_le_bytes());
    buf.extend_from_slice(&tokens);
    buf.extend_from_slice(&0u16.to_le_bytes()); // end-of-program marker
    buf
}

/// Builds the S2 "minimal DOS 3.3" disk: VTOC + one catalog sector with a
/// single HELLO AppleSoft entry + one T/S list sector + one data sector.
/// Returns the raw buffer so callers can layer further corruption on top.
fn minimal_dos33(extra_tokens: &[u8]) -> Vec<u8> {
    let mut raw = vec![0u8; DISK_BYTES];
    write_vtoc(&mut raw, (0x11, 0x0F));
    write_catalog_entry(&mut raw, 0x11, 0x0F, 0, (0x11, 0x0C), 0x02, "HELLO", 2);

    // T/S list sector (0x11, 0x0C): next=(0,0), sector_offset=0, one pair.
    put(&mut raw, 0x11, 0x0C, 0x05, &0u16.to_le_bytes());
    put(&mut raw, 0x11, 0x0C, 0x0C, &[0x11, 0x0B]);

    // Data sector (0x11, 0x0B): the AppleSoft program.
    let program = hello_program_bytes(extra_tokens);
    put(&mut raw, 0x11, 0x0B, 0, &program);

    raw
}

#[test]
fn s2_minimal_dos33_catalog_and_listing() {
    let raw = minimal_dos33(&[]);
    let mut disk = Disk::new("s2", raw).unwrap();
    let Tasted::Dos33(dos) = taste::taste(&mut disk).unwrap();

    assert_eq!(
        dos.catalog_listing(),
        "DISK VOLUME 254\n A 002 HELLO                         \n",
    );

    let file = dos.files.get("HELLO").unwrap();
    let ParsedContents::Applesoft(program) = file.parsed.as_ref().unwrap();
    assert_eq!(program.list(), "10  PRINT \"HI\"");

    let corruption_count = disk.tree().all_anomalies().iter()
        .filter(|(_, a)| a.level == a2disk::container::AnomalyLevel::Corruption)
        .count();
    assert_eq!(corruption_count, 0);
}

#[test]
fn s3_freemap_corruption_on_track_zero() {
    let mut raw = minimal_dos33(&[]);
    // freemap word for track 0: mark sector 2 free (bit 15-2=13).
    let bit = 1u32 << (15 - 2);
    let word = bit << 16;
    put(&mut raw, 0x11, 0x00, 0x38, &word.to_be_bytes());

    let mut disk = Disk::new("s3", raw).unwrap();
    taste::taste(&mut disk).unwrap();

    let anomalies = disk.tree().all_anomalies();
    let matches: Vec<_> = anomalies.iter()
        .filter(|(_, a)| a.message == "Freemap claims free sector in track 0")
        .collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].1.level, a2disk::container::AnomalyLevel::Corruption);

    // (0,2) must remain a GenericSector, never reclassified to Free.
    assert_eq!(disk.sector(0, 2).unwrap().role, SectorRole::Generic);
}

#[test]
fn s4_catalog_at_unusual_location() {
    let mut raw = vec![0u8; DISK_BYTES];
    write_vtoc(&mut raw, (0x11, 0x0E)); // not the conventional (0x11, 0x0F)

    let mut disk = Disk::new("s4", raw).unwrap();
    let Tasted::Dos33(dos) = taste::taste(&mut disk).unwrap();
    assert!(dos.filenames.is_empty());

    let anomalies = disk.tree().all_anomalies();
    assert!(anomalies.iter().any(|(_, a)|
        a.level == a2disk::container::AnomalyLevel::Unusual
        && a.message.contains("catalog chain starts at")
    ));
    assert_eq!(disk.sector(0x11, 0x0E).unwrap().role, SectorRole::Catalog);
}

#[test]
fn s5_deleted_file_listed_with_empty_contents() {
    let mut raw = vec![0u8; DISK_BYTES];
    write_vtoc(&mut raw, (0x11, 0x0F));
    write_catalog_entry(&mut raw, 0x11, 0x0F, 0, (0xFF, 0x05), 0x00, "GONE", 1);

    let mut disk = Disk::new("s5", raw).unwrap();
    let Tasted::Dos33(dos) = taste::taste(&mut disk).unwrap();

    let file = dos.files.get("GONE").unwrap();
    assert!(file.deleted);
    assert_eq!(file.contents.occupied_slots(), 0);

    let anomalies = disk.tree().all_anomalies();
    assert!(anomalies.iter().any(|(_, a)| a.message.contains("deleted")));
}

#[test]
fn s6_unknown_applesoft_token_keeps_rest_of_listing() {
    let raw = minimal_dos33(&[0xFE]); // splice an unassigned token into the PRINT line
    let mut disk = Disk::new("s6", raw).unwrap();
    let Tasted::Dos33(dos) = taste::taste(&mut disk).unwrap();

    let file = dos.files.get("HELLO").unwrap();
    let ParsedContents::Applesoft(program) = file.parsed.as_ref().unwrap();
    assert_eq!(program.lines.len(), 1);

    let anomalies = disk.tree().all_anomalies();
    assert!(anomalies.iter().any(|(_, a)|
        a.level == a2disk::container::AnomalyLevel::Corruption
        && a.message.contains("unexpected token: FE")
    ));
}
