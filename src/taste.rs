//! Taster dispatch: the single entry point a driver calls to identify a
//! [`Disk`]'s filesystem. Structured as a short list of named tasters tried
//! in order rather than a single hard-coded call into `dos33`, so that
//! support for another DOS 3.3-era filesystem could be added later without
//! touching this file's callers (spec.md's Non-goals keep other formats out
//! of scope for now; the shape is still worth keeping generic, the way the
//! teacher crate's own `fs` module dispatches across ProDOS/Pascal/CP/M by
//! file-system name rather than a single hard-coded type).

use crate::disk::Disk;
use crate::dos33::{self, Dos33Disk};

/// What a disk tasted as. Only one variant exists today; this is the seam a
/// second filesystem would extend.
pub enum Tasted {
    Dos33(Dos33Disk),
}

/// Reasons every registered taster declined a disk, one per taster tried.
pub struct ReasonNotIdentified {
    pub attempts: Vec<(&'static str, String)>,
}

/// Try each registered taster against `disk` in turn, returning the first
/// match. `disk` is mutated in place by whichever taster accepts it (sectors
/// get reclassified, anomalies get attached); a disk no taster accepts is
/// left exactly as it was handed in.
pub fn taste(disk: &mut Disk) -> Result<Tasted, ReasonNotIdentified> {
    let mut attempts = Vec::new();

    match dos33::taste(disk) {
        Ok(d) => return Ok(Tasted::Dos33(d)),
        Err(e) => attempts.push(("dos33", e.to_string())),
    }

    Err(ReasonNotIdentified { attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::DISK_BYTES;

    #[test]
    fn unidentified_disk_reports_every_taster_tried() {
        let mut disk = Disk::new("t", vec![0u8; DISK_BYTES]).unwrap();
        let err = taste(&mut disk).unwrap_err();
        assert_eq!(err.attempts.len(), 1);
        assert_eq!(err.attempts[0].0, "dos33");
    }
}
