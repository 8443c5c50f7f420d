//! Typed observations about disk state that deviate from a well-formed DOS 3.3 disk.

use std::fmt;

/// Severity of an [`Anomaly`]. Ordered from least to most concerning.
#[derive(Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord)]
pub enum AnomalyLevel {
    /// Informational; not a deviation, just worth noting (e.g. a deleted file).
    Info,
    /// Deviates from common practice but is not itself invalid.
    Unusual,
    /// Violates a format invariant the walker relies on.
    Corruption,
}

impl fmt::Display for AnomalyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "INFO",
            Self::Unusual => "UNUSUAL",
            Self::Corruption => "CORRUPTION",
        };
        write!(f,"{}",s)
    }
}

/// A single recorded observation, attached to whichever container noticed it.
#[derive(Debug,Clone)]
pub struct Anomaly {
    pub level: AnomalyLevel,
    pub message: String,
}

impl Anomaly {
    pub fn new(level: AnomalyLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into() }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,"{} anomaly: {}",self.level,self.message)
    }
}
