//! Pin descriptors: single-ended buses and differential pairs.

use serde::Serialize;
use std::fmt;

use crate::connector::reference;
use crate::error::DefinitionError;

/// Signal direction as seen from the FPGA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Input to the FPGA.
    In,
    /// Output from the FPGA.
    Out,
    /// Bidirectional.
    InOut,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
            Direction::InOut => write!(f, "inout"),
        }
    }
}

/// The electrical shape of a pin descriptor.
///
/// Inversion only exists for single-ended pins; a differential pair is never
/// inverted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinKind {
    /// One package pin per bit, optionally active-low.
    SingleEnded {
        /// Package pin (or connector reference) per bit, LSB first.
        names: Vec<String>,
        /// Whether the signal is active-low.
        invert: bool,
    },
    /// A positive/negative package pin pair per bit.
    Differential {
        /// Positive pins, LSB first.
        positive: Vec<String>,
        /// Negative pins, paired 1:1 with `positive`.
        negative: Vec<String>,
    },
}

/// A directional group of physical connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pins {
    kind: PinKind,
    dir: Direction,
}

fn split(names: &str) -> Vec<String> {
    names.split_whitespace().map(str::to_string).collect()
}

impl Pins {
    /// Single-ended pins from a whitespace-separated list, LSB first.
    pub fn new(names: &str, dir: Direction) -> Self {
        Self {
            kind: PinKind::SingleEnded {
                names: split(names),
                invert: false,
            },
            dir,
        }
    }

    /// Active-low single-ended pins.
    pub fn inverted(names: &str, dir: Direction) -> Self {
        Self {
            kind: PinKind::SingleEnded {
                names: split(names),
                invert: true,
            },
            dir,
        }
    }

    /// Differential pairs from matching positive and negative lists.
    pub fn diff_pairs(positive: &str, negative: &str, dir: Direction) -> Self {
        Self {
            kind: PinKind::Differential {
                positive: split(positive),
                negative: split(negative),
            },
            dir,
        }
    }

    /// Sets inversion on single-ended pins; differential pins are left untouched.
    pub fn invert(mut self, invert: bool) -> Self {
        if let PinKind::SingleEnded { invert: ref mut i, .. } = self.kind {
            *i = invert;
        }
        self
    }

    /// Rewrites every name into a reference to a logical pin of a connector.
    pub fn on_connector(mut self, connector: &str, index: u32) -> Self {
        let rewrite = |names: &mut Vec<String>| {
            for name in names.iter_mut() {
                let rewritten = reference(connector, index, name);
                *name = rewritten;
            }
        };
        match &mut self.kind {
            PinKind::SingleEnded { names, .. } => rewrite(names),
            PinKind::Differential { positive, negative } => {
                rewrite(positive);
                rewrite(negative);
            }
        }
        self
    }

    /// Returns the electrical shape.
    pub fn kind(&self) -> &PinKind {
        &self.kind
    }

    /// Returns the direction.
    pub fn dir(&self) -> Direction {
        self.dir
    }

    /// Number of bits.
    pub fn width(&self) -> usize {
        match &self.kind {
            PinKind::SingleEnded { names, .. } => names.len(),
            PinKind::Differential { positive, .. } => positive.len(),
        }
    }

    /// Returns `true` for differential pairs.
    pub fn is_differential(&self) -> bool {
        matches!(self.kind, PinKind::Differential { .. })
    }

    /// Returns `true` for active-low single-ended pins.
    pub fn is_inverted(&self) -> bool {
        matches!(self.kind, PinKind::SingleEnded { invert: true, .. })
    }

    pub(crate) fn validate(&self, path: &str) -> Result<(), DefinitionError> {
        match &self.kind {
            PinKind::SingleEnded { names, .. } if names.is_empty() => {
                Err(DefinitionError::EmptyPins {
                    path: path.to_string(),
                })
            }
            PinKind::Differential { positive, negative } => {
                if positive.len() != negative.len() {
                    return Err(DefinitionError::DiffPairMismatch {
                        path: path.to_string(),
                        positive: positive.len(),
                        negative: negative.len(),
                    });
                }
                if positive.is_empty() {
                    return Err(DefinitionError::EmptyPins {
                        path: path.to_string(),
                    });
                }
                Ok(())
            }
            PinKind::SingleEnded { .. } => Ok(()),
        }
    }

    /// Checks that the descriptor has exactly `expected` bits.
    pub fn expect_width(self, path: &str, expected: usize) -> Result<Self, DefinitionError> {
        if self.width() != expected {
            return Err(DefinitionError::WidthMismatch {
                path: path.to_string(),
                expected,
                actual: self.width(),
            });
        }
        Ok(self)
    }
}
