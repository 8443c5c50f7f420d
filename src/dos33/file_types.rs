//! File-type dispatch table, spec.md §4.5(c)/§6. A lookup from the
//! catalog's file-type byte to a display name and an optional content
//! parser, so new parsers can be registered without touching the walker in
//! `file.rs`.

use crate::container::{NodeId, Tree};
use crate::error::ParserError;

/// Parsed content variants. AppleSoft is the only format this crate
/// understands beyond raw bytes (spec.md's Non-goals exclude other
/// file-type parsers); the enum exists so `file_types::lookup` has
/// somewhere to grow without changing `FileEntry`'s shape.
#[derive(Debug)]
pub enum ParsedContents {
    Applesoft(crate::applesoft::Program),
}

pub type Parser = fn(&mut Tree, NodeId, &str, &[u8]) -> Result<ParsedContents, ParserError>;

pub struct FileTypeInfo {
    pub short: char,
    pub long: &'static str,
    pub parser: Option<Parser>,
}

/// Dispatch on the low 7 bits of the catalog file-type byte (bit 7 is the
/// lock flag, handled separately by `CatalogEntry::locked`).
pub fn lookup(code: u8) -> Option<FileTypeInfo> {
    match code {
        0x00 => Some(FileTypeInfo { short: 'T', long: "TEXT", parser: None }),
        0x01 => Some(FileTypeInfo { short: 'I', long: "INTEGER BASIC", parser: None }),
        0x02 => Some(FileTypeInfo { short: 'A', long: "APPLESOFT BASIC", parser: Some(parse_applesoft) }),
        0x04 => Some(FileTypeInfo { short: 'B', long: "BINARY", parser: None }),
        0x08 => Some(FileTypeInfo { short: 'S', long: "Type S File", parser: None }),
        0x10 => Some(FileTypeInfo { short: 'R', long: "Relocatable", parser: None }),
        0x20 => Some(FileTypeInfo { short: 'a', long: "Type a File", parser: None }),
        0x40 => Some(FileTypeInfo { short: 'b', long: "Type b File", parser: None }),
        _ => None,
    }
}

fn parse_applesoft(tree: &mut Tree, parent: NodeId, filename: &str, data: &[u8]) -> Result<ParsedContents, ParserError> {
    Ok(ParsedContents::Applesoft(crate::applesoft::parse(tree, parent, filename, data)))
}
