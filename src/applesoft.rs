//! AppleSoft BASIC detokenizer. Parses an in-memory tokenized program image
//! (as reconstructed from a DOS 3.3 file's data sectors) into a line-numbered
//! listing. Grounded in `examples/original_source/src/apple2disk/
//! applesoft.py` for exact token values and traversal order, and in the
//! teacher crate's `lang::applesoft::tokenizer::Tokenizer::detokenize` for
//! idiomatic structure (a running `addr` cursor, a `log`-adjacent anomaly on
//! any unrecognized token).

use crate::container::{NodeId, Tree, AnomalyLevel};
use crate::fields::u16_le;

/// BASIC program load address; the first line record's `next_line_addr` is
/// measured against this.
const LOAD_ADDRESS: u16 = 0x801;

/// Token values run from `END` (0x80) to `MID$` (0xEA), one slot per byte
/// value starting at 0x80. Complete per spec.md §6.
const TOKENS: [&str; 0xEA - 0x80 + 1] = [
    "END","FOR","NEXT","DATA","INPUT","DEL","DIM","READ","GR","TEXT",
    "PR #","IN #","CALL","PLOT","HLIN","VLIN","HGR2","HGR","HCOLOR=","HPLOT",
    "DRAW","XDRAW","HTAB","HOME","ROT=","SCALE=","SHLOAD","TRACE","NOTRACE","NORMAL",
    "INVERSE","FLASH","COLOR=","POP","VTAB","HIMEM:","LOMEM:","ONERR","RESUME","RECALL",
    "STORE","SPEED=","LET","GOTO","RUN","IF","RESTORE","&","GOSUB","RETURN",
    "REM","STOP","ON","WAIT","LOAD","SAVE","DEF FN","POKE","PRINT","CONT",
    "LIST","CLEAR","GET","NEW","TAB","TO","FN","SPC(","THEN","AT",
    "NOT","STEP","+","-","*","/",";","AND","OR",">",
    "=","<","SGN","INT","ABS","USR","FRE","SCRN (","PDL","POS",
    "SQR","RND","LOG","EXP","COS","SIN","TAN","ATN","PEEK","LEN",
    "STR$","VAL","ASC","CHR$","LEFT$","RIGHT$","MID$",
];

fn token_keyword(byte: u8) -> Option<&'static str> {
    if (0x80..=0xEA).contains(&byte) {
        Some(TOKENS[(byte - 0x80) as usize])
    } else {
        None
    }
}

/// One decoded line: its BASIC line number and detokenized text.
#[derive(Debug,Clone)]
pub struct Line {
    pub number: u16,
    pub text: String,
}

/// A fully decoded AppleSoft program.
#[derive(Debug)]
pub struct Program {
    pub declared_length: u16,
    pub lines: Vec<Line>,
    pub node: NodeId,
}

impl Program {
    /// `List()` per spec.md §4.6: `"<n> <text>"` joined by newlines, in file
    /// order.
    pub fn list(&self) -> String {
        self.lines.iter()
            .map(|l| format!("{} {}", l.number, l.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Parse a tokenized program buffer (header + line records) into a
/// [`Program`], attaching any anomalies found along the way to a new child
/// of `parent` named after the file. Never fails outright: a corrupt line
/// record simply stops the decode at that point (the lines decoded so far
/// are kept), matching the walker's general partial-failure policy.
pub fn parse(tree: &mut Tree, parent: NodeId, filename: &str, data: &[u8]) -> Program {
    let node = tree.add_child(parent, format!("AppleSoft({})", filename));

    let declared_length = if data.len() >= 2 { u16_le(data, 0) } else { 0 };

    let mut lines = Vec::new();
    let mut addr: usize = 2; // skip the 2-byte declared-length header
    let mut last_memory: u16 = LOAD_ADDRESS;
    let mut last_line_number: Option<u16> = None;

    loop {
        if addr + 4 > data.len() {
            break;
        }
        let next_line_addr = u16_le(data, addr);
        let line_number = u16_le(data, addr + 2);
        if next_line_addr == 0 {
            break;
        }
        let tokens_start = addr + 4;

        let mut text = String::new();
        let mut cursor = tokens_start;
        loop {
            if cursor >= data.len() {
                // buffer exhausted mid-line; stop the whole decode here
                return Program { declared_length, lines, node };
            }
            let byte = data[cursor];
            cursor += 1;
            if byte == 0 {
                break;
            }
            if byte >= 0x80 {
                match token_keyword(byte) {
                    Some(kw) => {
                        text.push(' ');
                        text.push_str(kw);
                        text.push(' ');
                    }
                    None => {
                        tree.append_anomaly(
                            node,
                            AnomalyLevel::Corruption,
                            format!("Line number {} contains unexpected token: {:02X}", line_number, byte),
                        );
                    }
                }
            } else {
                text.push(byte as char);
            }
        }

        let bytes_consumed = cursor - addr;
        if last_memory as usize + bytes_consumed != next_line_addr as usize {
            let gap = next_line_addr as i64 - last_memory as i64 - bytes_consumed as i64;
            tree.append_anomaly(
                node,
                AnomalyLevel::Unusual,
                format!(
                    "{:x} + {:x} == {:x} != {:x} (gap {})",
                    last_memory, bytes_consumed, last_memory as usize + bytes_consumed, next_line_addr, gap
                ),
            );
        }
        if let Some(prev) = last_line_number {
            if line_number <= prev {
                tree.append_anomaly(
                    node,
                    AnomalyLevel::Unusual,
                    format!("{} <= {}: {}", line_number, prev, text),
                );
            }
        }

        last_memory = next_line_addr;
        last_line_number = Some(line_number);
        lines.push(Line { number: line_number, text });
        addr = cursor;
    }

    Program { declared_length, lines, node }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Tree;

    /// Hand-assembled minimal program: `10 PRINT "HI"` at load address 0x801.
    /// Bytes: declared-len header (informational, not enforced), then one
    /// line record: next-addr, line-num, tokens..., 0x00, then terminator.
    fn hello_program_bytes() -> Vec<u8> {
        let tokens: Vec<u8> = {
            let mut t = vec![0xBA]; // PRINT
            t.push(b'"');
            t.extend_from_slice(b"HI");
            t.push(b'"');
            t.push(0x00);
            t
        };
        let next_addr: u16 = LOAD_ADDRESS + 2 + 2 + tokens.len() as u16;
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u16.to_le_bytes()); // declared length, unused by decoder
        buf.extend_from_slice(&next_addr.to_le_bytes());
        buf.extend_from_slice(&10u16.to_le_bytes());
        buf.extend_from_slice(&tokens);
        buf.extend_from_slice(&0u16.to_le_bytes()); // end-of-program marker
        buf
    }

    #[test]
    fn decodes_hello_world() {
        let mut tree = Tree::new();
        let root = tree.add_root("disk");
        let data = hello_program_bytes();
        let prog = parse(&mut tree, root, "HELLO", &data);
        assert_eq!(prog.lines.len(), 1);
        assert_eq!(prog.lines[0].number, 10);
        assert_eq!(prog.list(), "10  PRINT \"HI\"");
        assert!(tree.anomalies(prog.node).is_empty());
    }

    #[test]
    fn unknown_token_yields_corruption_but_keeps_going() {
        let mut tree = Tree::new();
        let root = tree.add_root("disk");
        let tokens: Vec<u8> = vec![0xFE, 0x00]; // 0xFE is unassigned (> MID$)
        let next_addr: u16 = LOAD_ADDRESS + 2 + 2 + tokens.len() as u16;
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&next_addr.to_le_bytes());
        buf.extend_from_slice(&10u16.to_le_bytes());
        buf.extend_from_slice(&tokens);
        buf.extend_from_slice(&0u16.to_le_bytes());

        let prog = parse(&mut tree, root, "BAD", &buf);
        assert_eq!(prog.lines.len(), 1);
        let anomalies = tree.anomalies(prog.node);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].level, AnomalyLevel::Corruption);
        assert!(anomalies[0].message.contains("FE"));
    }

    #[test]
    fn line_number_regression_is_unusual() {
        let mut tree = Tree::new();
        let root = tree.add_root("disk");
        let mut buf = vec![0u8;2];
        let mut next = LOAD_ADDRESS;
        for (num, text_tok) in [(20u16, 0x00u8), (10u16, 0x00u8)] {
            let tokens = vec![text_tok];
            next += 2 + 2 + tokens.len() as u16;
            buf.extend_from_slice(&next.to_le_bytes());
            buf.extend_from_slice(&num.to_le_bytes());
            buf.extend_from_slice(&tokens);
        }
        buf.extend_from_slice(&0u16.to_le_bytes());

        let prog = parse(&mut tree, root, "REGRESS", &buf);
        assert_eq!(prog.lines.len(), 2);
        let anomalies = tree.anomalies(prog.node);
        assert!(anomalies.iter().any(|a| a.message.contains("10 <= 20")));
    }
}
