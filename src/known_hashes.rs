//! SHA-1 fingerprints of well-known boot/RWTS sectors, mapped to human
//! labels. Grounded in `examples/original_source/src/apple2disk/disk.py`
//! (`Sector.KNOWN_HASHES`); labels are for display only and never influence
//! parsing or classification.

/// `(sha1_hex, label)` pairs, complete per spec.md §6.
pub const KNOWN_HASHES: &[(&str,&str)] = &[
    ("b376885ac8452b6cbf9ced81b1080bfd570d9b91", "Zero sector"),
    ("90e6b1a0689974743cb92ca0b833ff1e683f4a73", "Boot1 (DOS 3.3 August 1980)"),
    ("7ab36247fdf62e87f98d2964dd74d6572d17fff0", "Boot1 (DOS 3.3 January 1983)"),
    ("16e4c17a85eb321bae784ab716975ddeef6da2c6", "Boot1 (DOS 3.3 System Master)"),
    ("822c7450afa01f46bbc828d4d46e01bc08d73198", "Boot1 (ProntoDOS (1982))"),
    ("30da15678e0d70e20ecf86bcb2de3fd3874dbd0d", "Boot1 (ProntoDOS (March 1983))"),
    ("93d81a812d824d58dedec8f7787e9cfcc7a2d3b3", "Boot1 (Apple Pascal, Fortran)"),
    ("adeb3be5c3d9487a76f1917d1c28104a1a6fc72f", "Boot1 (Faster DOS 3.3?)"),
    ("4f4aff4e1eb8d806164544b64dc967abd76128a4", "Boot1 (ProDOS?)"),
];

/// Look up a label for a lowercase hex SHA-1 digest, if it names a
/// well-known sector.
pub fn lookup(hash: &str) -> Option<&'static str> {
    KNOWN_HASHES.iter().find(|(h,_)| *h == hash).map(|(_,label)| *label)
}

/// `HumanName` per spec.md §4.4: the known label if the hash is recognized,
/// otherwise `"Hash <hex> (Entropy: <ratio>%)"`.
pub fn human_name(hash: &str, entropy_pct: u8) -> String {
    match lookup(hash) {
        Some(label) => label.to_string(),
        None => format!("Hash {} (Entropy: {}%)", hash, entropy_pct),
    }
}
