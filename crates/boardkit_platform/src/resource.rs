//! Resources and subsignal trees.
//!
//! A [`Resource`] is the unit a design binds to: a `(name, index)` identity
//! over either a single [`Pins`] descriptor or a tree of named [`Subsignal`]s.
//! Every node may carry an [`Attrs`] set that overrides its ancestors'.

use std::collections::HashSet;

use crate::attrs::Attrs;
use crate::clock::Clock;
use crate::error::DefinitionError;
use crate::pins::Pins;

/// The body of a resource or subsignal: pins, or named children.
#[derive(Debug, Clone, PartialEq)]
pub enum Io {
    /// A leaf carrying one pin descriptor.
    Pins(Pins),
    /// An ordered group of named children.
    Group(Vec<Subsignal>),
}

/// A named node inside a composite resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Subsignal {
    name: String,
    io: Io,
    attrs: Attrs,
    clock: Option<Clock>,
}

impl Subsignal {
    /// Creates a leaf subsignal.
    pub fn new(name: impl Into<String>, pins: Pins) -> Self {
        Self {
            name: name.into(),
            io: Io::Pins(pins),
            attrs: Attrs::new(),
            clock: None,
        }
    }

    /// Creates a subsignal that groups further subsignals.
    pub fn group(name: impl Into<String>, children: Vec<Subsignal>) -> Self {
        Self {
            name: name.into(),
            io: Io::Group(children),
            attrs: Attrs::new(),
            clock: None,
        }
    }

    /// Attaches attributes that override the parent's.
    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Marks the subsignal's pins as a clock input of the given frequency.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Returns the subsignal name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the body.
    pub fn io(&self) -> &Io {
        &self.io
    }

    /// Returns the attributes declared on this node.
    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Returns the clock frequency, if this is a clock input.
    pub fn clock(&self) -> Option<Clock> {
        self.clock
    }
}

/// A named, indexed top-level I/O unit of a platform.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    name: String,
    index: u32,
    io: Io,
    attrs: Attrs,
    clock: Option<Clock>,
}

impl Resource {
    /// Creates a resource over a single pin descriptor.
    pub fn new(name: impl Into<String>, index: u32, pins: Pins) -> Self {
        Self {
            name: name.into(),
            index,
            io: Io::Pins(pins),
            attrs: Attrs::new(),
            clock: None,
        }
    }

    /// Creates a composite resource from subsignals.
    pub fn group(name: impl Into<String>, index: u32, subsignals: Vec<Subsignal>) -> Self {
        Self {
            name: name.into(),
            index,
            io: Io::Group(subsignals),
            attrs: Attrs::new(),
            clock: None,
        }
    }

    /// Attaches the resource-wide attributes.
    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Marks the resource as a clock input of the given frequency.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Returns the resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the resource index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the body.
    pub fn io(&self) -> &Io {
        &self.io
    }

    /// Returns the resource-wide attributes.
    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Returns the clock frequency, if this is a clock input.
    pub fn clock(&self) -> Option<Clock> {
        self.clock
    }

    /// Dotted path of the resource itself, e.g. `clk.0`.
    pub fn path(&self) -> String {
        format!("{}.{}", self.name, self.index)
    }

    /// Base port name of the resource itself, e.g. `clk_0`.
    pub fn port(&self) -> String {
        format!("{}_{}", self.name, self.index)
    }

    /// Checks the shape of the whole tree.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        validate_node(&self.path(), &self.io, self.clock.is_some())
    }
}

fn validate_node(path: &str, io: &Io, has_clock: bool) -> Result<(), DefinitionError> {
    match io {
        Io::Pins(pins) => pins.validate(path),
        Io::Group(children) => {
            if has_clock {
                return Err(DefinitionError::ClockOnGroup {
                    path: path.to_string(),
                });
            }
            if children.is_empty() {
                return Err(DefinitionError::EmptyGroup {
                    path: path.to_string(),
                });
            }
            let mut seen = HashSet::new();
            for child in children {
                if !seen.insert(child.name.as_str()) {
                    return Err(DefinitionError::DuplicateSubsignal {
                        path: path.to_string(),
                        name: child.name.clone(),
                    });
                }
                let child_path = format!("{path}.{}", child.name);
                validate_node(&child_path, &child.io, child.clock.is_some())?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::Direction;

    #[test]
    fn identity_helpers() {
        let r = Resource::new("clk", 0, Pins::new("B12", Direction::In));
        assert_eq!(r.path(), "clk.0");
        assert_eq!(r.port(), "clk_0");
        assert!(r.validate().is_ok());
    }

    #[test]
    fn duplicate_subsignal_rejected() {
        let r = Resource::group(
            "eth",
            0,
            vec![
                Subsignal::new("mdc", Pins::new("A19", Direction::Out)),
                Subsignal::new("mdc", Pins::new("D16", Direction::InOut)),
            ],
        );
        assert_eq!(
            r.validate().unwrap_err(),
            DefinitionError::DuplicateSubsignal {
                path: "eth.0".to_string(),
                name: "mdc".to_string(),
            }
        );
    }

    #[test]
    fn nested_errors_report_full_path() {
        let r = Resource::group(
            "mem",
            1,
            vec![Subsignal::group(
                "ctl",
                vec![Subsignal::new("cs", Pins::new("", Direction::Out))],
            )],
        );
        assert_eq!(
            r.validate().unwrap_err(),
            DefinitionError::EmptyPins {
                path: "mem.1.ctl.cs".to_string(),
            }
        );
    }

    #[test]
    fn empty_group_rejected() {
        let r = Resource::group("serdes", 0, vec![]);
        assert!(matches!(r.validate(), Err(DefinitionError::EmptyGroup { .. })));
    }

    #[test]
    fn clock_only_on_pins() {
        let r = Resource::group(
            "serdes",
            0,
            vec![Subsignal::new("rx", Pins::diff_pairs("Y5", "Y6", Direction::In))],
        )
        .with_clock(Clock::mhz(100.0));
        assert!(matches!(r.validate(), Err(DefinitionError::ClockOnGroup { .. })));

        let leaf = Resource::group(
            "serdes",
            0,
            vec![Subsignal::new("rx", Pins::diff_pairs("Y5", "Y6", Direction::In))
                .with_clock(Clock::mhz(100.0))],
        );
        assert!(leaf.validate().is_ok());
    }
}
