//! Resource resolution: turning a resource tree into per-bit physical bindings.
//!
//! Attributes are merged root to leaf (platform defaults, then the resource,
//! then each subsignal) and resolved once per leaf against the platform.
//! Connector references in pin names are followed to a package pin. Output
//! order is declaration order: children in the order they were declared,
//! bits LSB first.

use serde::Serialize;

use crate::attrs::{Attrs, ResolvedAttrs};
use crate::clock::Clock;
use crate::connector::{resolve_pin, Connector};
use crate::error::ResolutionError;
use crate::pins::{Direction, PinKind, Pins};
use crate::platform::Platform;
use crate::resource::{Io, Resource};

/// One bit of a resolved resource, bound to a package pin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhysicalBinding {
    /// Dotted path of the owning leaf, e.g. `ddr3.0.dq`.
    pub path: String,
    /// Base port name of the owning leaf, e.g. `ddr3_0__dq`.
    pub port: String,
    /// Bit position within the leaf, LSB first.
    pub bit: usize,
    /// Total number of bits in the leaf.
    pub width: usize,
    /// Package pin (the positive half for differential pairs).
    pub pin: String,
    /// Negative package pin of a differential pair.
    pub pin_n: Option<String>,
    /// Direction as seen from the FPGA.
    pub direction: Direction,
    /// Active-low single-ended signal.
    pub invert: bool,
    /// Whether this bit is a differential pair.
    pub is_differential: bool,
    /// Fully merged and resolved attributes.
    pub attrs: ResolvedAttrs,
    /// Clock frequency, if the leaf is a clock input.
    pub clock: Option<Clock>,
}

/// Resolves `resource` against `connectors` and `platform`.
///
/// Produces one binding per bit of every leaf. Fails on the first resolver
/// error or unresolvable connector reference, naming the leaf's path.
pub fn resolve_resource(
    resource: &Resource,
    connectors: &[Connector],
    platform: &Platform,
) -> Result<Vec<PhysicalBinding>, ResolutionError> {
    let ctx = Walk {
        connectors,
        platform,
    };
    let mut out = Vec::new();
    ctx.node(
        resource.path(),
        resource.port(),
        resource.io(),
        platform.default_attrs().merge(resource.attrs()),
        resource.clock(),
        &mut out,
    )?;
    Ok(out)
}

struct Walk<'a> {
    connectors: &'a [Connector],
    platform: &'a Platform,
}

impl Walk<'_> {
    fn node(
        &self,
        path: String,
        port: String,
        io: &Io,
        attrs: Attrs,
        clock: Option<Clock>,
        out: &mut Vec<PhysicalBinding>,
    ) -> Result<(), ResolutionError> {
        match io {
            Io::Pins(pins) => self.leaf(path, port, pins, &attrs, clock, out),
            Io::Group(children) => {
                for child in children {
                    self.node(
                        format!("{path}.{}", child.name()),
                        format!("{port}__{}", child.name()),
                        child.io(),
                        attrs.merge(child.attrs()),
                        child.clock(),
                        out,
                    )?;
                }
                Ok(())
            }
        }
    }

    fn leaf(
        &self,
        path: String,
        port: String,
        pins: &Pins,
        attrs: &Attrs,
        clock: Option<Clock>,
        out: &mut Vec<PhysicalBinding>,
    ) -> Result<(), ResolutionError> {
        let resolved = attrs
            .resolve(self.platform)
            .map_err(|source| ResolutionError::Resolver {
                path: path.clone(),
                source,
            })?;
        let width = pins.width();
        let pin = |name: &str| {
            resolve_pin(name, self.connectors).map_err(|reason| ResolutionError::UnresolvedPin {
                path: path.clone(),
                pin: name.to_string(),
                reason,
            })
        };

        let pairs: Vec<(String, Option<String>)> = match pins.kind() {
            PinKind::SingleEnded { names, .. } => names
                .iter()
                .map(|n| Ok((pin(n)?, None)))
                .collect::<Result<_, ResolutionError>>()?,
            PinKind::Differential { positive, negative } => positive
                .iter()
                .zip(negative)
                .map(|(p, n)| Ok((pin(p)?, Some(pin(n)?))))
                .collect::<Result<_, ResolutionError>>()?,
        };

        for (bit, (pin, pin_n)) in pairs.into_iter().enumerate() {
            out.push(PhysicalBinding {
                path: path.clone(),
                port: port.clone(),
                bit,
                width,
                pin,
                pin_n,
                direction: pins.dir(),
                invert: pins.is_inverted(),
                is_differential: pins.is_differential(),
                attrs: resolved.clone(),
                clock,
            });
        }
        Ok(())
    }
}
