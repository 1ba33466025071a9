//! Resource factories for recurring board patterns.
//!
//! Boards list only the pins that differ; the factories expand them into
//! fully formed [`Resource`]s. Every factory is a pure function with no
//! platform dependency.

use std::collections::HashSet;

use crate::attrs::Attrs;
use crate::error::DefinitionError;
use crate::pins::{Direction, Pins};
use crate::resource::{Resource, Subsignal};

/// One entry of a [`PinSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinEntry {
    /// Takes the next sequential index.
    Auto(String),
    /// Pinned to an explicit index.
    At(u32, String),
}

/// Pins for an array of identical resources, with auto or explicit indices.
///
/// Auto entries are numbered from zero in order. An index that ends up
/// assigned twice, whether explicitly or automatically, is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinSet {
    entries: Vec<PinEntry>,
}

impl PinSet {
    /// Auto-indexed pins from a whitespace-separated list.
    pub fn list(pins: &str) -> Self {
        Self {
            entries: pins
                .split_whitespace()
                .map(|p| PinEntry::Auto(p.to_string()))
                .collect(),
        }
    }

    /// Explicitly indexed pins.
    pub fn indexed<P: Into<String>>(pins: impl IntoIterator<Item = (u32, P)>) -> Self {
        Self {
            entries: pins
                .into_iter()
                .map(|(i, p)| PinEntry::At(i, p.into()))
                .collect(),
        }
    }

    /// Appends an auto-indexed pin.
    pub fn auto(mut self, pin: impl Into<String>) -> Self {
        self.entries.push(PinEntry::Auto(pin.into()));
        self
    }

    /// Appends an explicitly indexed pin.
    pub fn at(mut self, index: u32, pin: impl Into<String>) -> Self {
        self.entries.push(PinEntry::At(index, pin.into()));
        self
    }

    /// Assigns indices, preserving entry order.
    pub fn assign(&self, name: &str) -> Result<Vec<(u32, &str)>, DefinitionError> {
        let mut next = 0;
        let mut used = HashSet::new();
        let mut assigned = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let (index, pin) = match entry {
                PinEntry::Auto(pin) => {
                    let index = next;
                    next += 1;
                    (index, pin)
                }
                PinEntry::At(index, pin) => (*index, pin),
            };
            if !used.insert(index) {
                return Err(DefinitionError::IndexCollision {
                    name: name.to_string(),
                    index,
                });
            }
            assigned.push((index, pin.as_str()));
        }
        Ok(assigned)
    }
}

impl From<&str> for PinSet {
    fn from(pins: &str) -> Self {
        PinSet::list(pins)
    }
}

/// Parameters shared by every resource a factory produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactoryOptions {
    /// Active-low pins.
    pub invert: bool,
    /// Resource-wide attributes.
    pub attrs: Attrs,
    /// Interpret pin names as logical pins of this connector.
    pub connector: Option<(String, u32)>,
}

impl FactoryOptions {
    /// Default options: active-high, no attributes, package pins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets inversion.
    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Sets the resource-wide attributes.
    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Places the pins on a connector.
    pub fn on_connector(mut self, name: impl Into<String>, index: u32) -> Self {
        self.connector = Some((name.into(), index));
        self
    }

    fn pins(&self, names: &str, dir: Direction) -> Pins {
        self.place(Pins::new(names, dir).invert(self.invert))
    }

    fn place(&self, pins: Pins) -> Pins {
        match &self.connector {
            Some((name, index)) => pins.on_connector(name, *index),
            None => pins,
        }
    }
}

fn split_resources(
    name: &str,
    pins: PinSet,
    dir: Direction,
    opts: &FactoryOptions,
) -> Result<Vec<Resource>, DefinitionError> {
    pins.assign(name)?
        .into_iter()
        .map(|(index, pin)| {
            let path = format!("{name}.{index}");
            let pins = opts.pins(pin, dir).expect_width(&path, 1)?;
            Ok(Resource::new(name, index, pins).with_attrs(opts.attrs.clone()))
        })
        .collect()
}

/// One `button` input per pin.
pub fn button_resources(
    pins: impl Into<PinSet>,
    opts: &FactoryOptions,
) -> Result<Vec<Resource>, DefinitionError> {
    split_resources("button", pins.into(), Direction::In, opts)
}

/// One `switch` input per pin.
pub fn switch_resources(
    pins: impl Into<PinSet>,
    opts: &FactoryOptions,
) -> Result<Vec<Resource>, DefinitionError> {
    split_resources("switch", pins.into(), Direction::In, opts)
}

/// One `led` output per pin.
pub fn led_resources(
    pins: impl Into<PinSet>,
    opts: &FactoryOptions,
) -> Result<Vec<Resource>, DefinitionError> {
    split_resources("led", pins.into(), Direction::Out, opts)
}

/// An `rgb_led` with `r`, `g` and `b` outputs.
pub fn rgb_led_resource(
    index: u32,
    r: &str,
    g: &str,
    b: &str,
    opts: &FactoryOptions,
) -> Result<Resource, DefinitionError> {
    let sub = |name: &str, pin: &str| -> Result<Subsignal, DefinitionError> {
        let pins = opts
            .pins(pin, Direction::Out)
            .expect_width(&format!("rgb_led.{index}.{name}"), 1)?;
        Ok(Subsignal::new(name, pins))
    };
    Ok(Resource::group(
        "rgb_led",
        index,
        vec![sub("r", r)?, sub("g", g)?, sub("b", b)?],
    )
    .with_attrs(opts.attrs.clone()))
}

/// Pins of a SPI flash chip. `wp` and `hold` are optional; without them
/// only the 1x and 2x variants are produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpiFlashPins {
    /// Chip select, always active-low.
    pub cs_n: String,
    /// Serial clock.
    pub clk: String,
    /// Controller out, peripheral in (dq0).
    pub copi: String,
    /// Controller in, peripheral out (dq1).
    pub cipo: String,
    /// Write protect, active-low (dq2).
    pub wp_n: Option<String>,
    /// Hold, active-low (dq3).
    pub hold_n: Option<String>,
}

/// Expands a SPI flash into `spi_flash_1x`, `spi_flash_2x` and, when both
/// `wp_n` and `hold_n` are wired, `spi_flash_4x` resources.
pub fn spi_flash_resources(
    index: u32,
    pins: &SpiFlashPins,
    opts: &FactoryOptions,
) -> Result<Vec<Resource>, DefinitionError> {
    let place = |p: Pins| opts.place(p);
    let common = |path: &str| -> Result<Vec<Subsignal>, DefinitionError> {
        Ok(vec![
            Subsignal::new("cs", place(Pins::inverted(&pins.cs_n, Direction::Out))),
            Subsignal::new(
                "clk",
                place(Pins::new(&pins.clk, Direction::Out)).expect_width(&format!("{path}.clk"), 1)?,
            ),
        ])
    };
    let quad = pins.wp_n.as_deref().zip(pins.hold_n.as_deref());
    let resource = |name: &str, subs: Vec<Subsignal>| {
        Resource::group(name, index, subs).with_attrs(opts.attrs.clone())
    };

    let path_1x = format!("spi_flash_1x.{index}");
    let mut io_1x = common(&path_1x)?;
    io_1x.push(Subsignal::new(
        "copi",
        place(Pins::new(&pins.copi, Direction::Out)).expect_width(&format!("{path_1x}.copi"), 1)?,
    ));
    io_1x.push(Subsignal::new(
        "cipo",
        place(Pins::new(&pins.cipo, Direction::In)).expect_width(&format!("{path_1x}.cipo"), 1)?,
    ));
    if let Some((wp, hold)) = quad {
        io_1x.push(Subsignal::new(
            "wp",
            place(Pins::inverted(wp, Direction::Out)).expect_width(&format!("{path_1x}.wp"), 1)?,
        ));
        io_1x.push(Subsignal::new(
            "hold",
            place(Pins::inverted(hold, Direction::Out))
                .expect_width(&format!("{path_1x}.hold"), 1)?,
        ));
    }
    let mut resources = vec![resource("spi_flash_1x", io_1x)];

    let path_2x = format!("spi_flash_2x.{index}");
    let mut io_2x = common(&path_2x)?;
    io_2x.push(Subsignal::new(
        "dq",
        place(Pins::new(
            &format!("{} {}", pins.copi, pins.cipo),
            Direction::InOut,
        ))
        .expect_width(&format!("{path_2x}.dq"), 2)?,
    ));
    resources.push(resource("spi_flash_2x", io_2x));

    if let Some((wp, hold)) = quad {
        let path_4x = format!("spi_flash_4x.{index}");
        let mut io_4x = common(&path_4x)?;
        io_4x.push(Subsignal::new(
            "dq",
            place(Pins::new(
                &format!("{} {} {wp} {hold}", pins.copi, pins.cipo),
                Direction::InOut,
            ))
            .expect_width(&format!("{path_4x}.dq"), 4)?,
        ));
        resources.push(resource("spi_flash_4x", io_4x));
    }
    Ok(resources)
}

/// Pins of a ULPI USB PHY.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UlpiPins {
    /// Eight data pins, LSB first.
    pub data: String,
    /// Clock pin.
    pub clk: String,
    /// Bus direction pin.
    pub dir: String,
    /// Next-data pin.
    pub nxt: String,
    /// Stop pin.
    pub stp: String,
    /// Optional PHY reset.
    pub rst: Option<String>,
    /// Direction of the clock: input when the PHY drives it.
    pub clk_dir: Direction,
    /// Whether the reset is active-low.
    pub rst_invert: bool,
}

/// A `ulpi` resource.
pub fn ulpi_resource(
    index: u32,
    pins: &UlpiPins,
    opts: &FactoryOptions,
) -> Result<Resource, DefinitionError> {
    let path = format!("ulpi.{index}");
    let place = |names: &str, dir: Direction, width: usize, name: &str| {
        opts.place(Pins::new(names, dir))
            .expect_width(&format!("{path}.{name}"), width)
    };
    let mut subs = vec![
        Subsignal::new("data", place(&pins.data, Direction::InOut, 8, "data")?),
        Subsignal::new("clk", place(&pins.clk, pins.clk_dir, 1, "clk")?),
        Subsignal::new("dir", place(&pins.dir, Direction::In, 1, "dir")?),
        Subsignal::new("nxt", place(&pins.nxt, Direction::In, 1, "nxt")?),
        Subsignal::new("stp", place(&pins.stp, Direction::Out, 1, "stp")?),
    ];
    if let Some(rst) = &pins.rst {
        subs.push(Subsignal::new(
            "rst",
            place(rst, Direction::Out, 1, "rst")?.invert(pins.rst_invert),
        ));
    }
    Ok(Resource::group("ulpi", index, subs).with_attrs(opts.attrs.clone()))
}

/// A `uart` resource with `rx` and `tx`, plus optional `rts` / `cts`.
pub fn uart_resource(
    index: u32,
    rx: &str,
    tx: &str,
    flow: Option<(&str, &str)>,
    opts: &FactoryOptions,
) -> Result<Resource, DefinitionError> {
    let path = format!("uart.{index}");
    let sub = |name: &str, pin: &str, dir: Direction| -> Result<Subsignal, DefinitionError> {
        let pins = opts
            .pins(pin, dir)
            .expect_width(&format!("{path}.{name}"), 1)?;
        Ok(Subsignal::new(name, pins))
    };
    let mut subs = vec![sub("rx", rx, Direction::In)?, sub("tx", tx, Direction::Out)?];
    if let Some((rts, cts)) = flow {
        subs.push(sub("rts", rts, Direction::Out)?);
        subs.push(sub("cts", cts, Direction::In)?);
    }
    Ok(Resource::group("uart", index, subs).with_attrs(opts.attrs.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Io;

    fn indices(resources: &[Resource]) -> Vec<u32> {
        resources.iter().map(Resource::index).collect()
    }

    #[test]
    fn explicit_indices_are_never_renumbered() {
        let buttons = button_resources(
            PinSet::indexed([(0, "P1"), (2, "P3")]),
            &FactoryOptions::new(),
        )
        .unwrap();
        assert_eq!(indices(&buttons), vec![0, 2]);
        assert!(buttons.iter().all(|b| b.name() == "button"));
    }

    #[test]
    fn list_assigns_sequential_indices() {
        let leds = led_resources("A13 A12 B19", &FactoryOptions::new().invert(true)).unwrap();
        assert_eq!(indices(&leds), vec![0, 1, 2]);
        match leds[2].io() {
            Io::Pins(p) => {
                assert!(p.is_inverted());
                assert_eq!(p.dir(), Direction::Out);
            }
            Io::Group(_) => panic!("expected pins"),
        }
    }

    #[test]
    fn overlapping_auto_and_explicit_indices_collide() {
        let pins = PinSet::list("P1 P2").at(1, "P3");
        assert_eq!(
            switch_resources(pins, &FactoryOptions::new()).unwrap_err(),
            DefinitionError::IndexCollision {
                name: "switch".to_string(),
                index: 1,
            }
        );
        let pins = PinSet::indexed([(4, "E15"), (4, "D16")]);
        assert!(matches!(
            switch_resources(pins, &FactoryOptions::new()),
            Err(DefinitionError::IndexCollision { index: 4, .. })
        ));
    }

    #[test]
    fn attrs_and_connector_are_shared() {
        let opts = FactoryOptions::new()
            .attrs(Attrs::new().with("IO_TYPE", "LVCMOS33"))
            .on_connector("pmod", 1);
        let leds = led_resources("1 2", &opts).unwrap();
        assert_eq!(leds[1].attrs().len(), 1);
        match leds[1].io() {
            Io::Pins(p) => assert_eq!(
                p.kind(),
                &crate::pins::PinKind::SingleEnded {
                    names: vec!["pmod_1:2".to_string()],
                    invert: false,
                }
            ),
            Io::Group(_) => panic!("expected pins"),
        }
    }

    #[test]
    fn spi_flash_variants() {
        let pins = SpiFlashPins {
            cs_n: "R2".to_string(),
            clk: "U3".to_string(),
            copi: "W2".to_string(),
            cipo: "V2".to_string(),
            wp_n: Some("Y2".to_string()),
            hold_n: Some("W1".to_string()),
        };
        let flash = spi_flash_resources(0, &pins, &FactoryOptions::new()).unwrap();
        let names: Vec<_> = flash.iter().map(Resource::name).collect();
        assert_eq!(names, vec!["spi_flash_1x", "spi_flash_2x", "spi_flash_4x"]);

        let Io::Group(subs) = flash[2].io() else {
            panic!("expected subsignals");
        };
        let dq = subs.iter().find(|s| s.name() == "dq").unwrap();
        let Io::Pins(dq) = dq.io() else {
            panic!("expected pins");
        };
        assert_eq!(dq.width(), 4);
        let cs = &subs[0];
        assert!(matches!(cs.io(), Io::Pins(p) if p.is_inverted()));

        let dual = SpiFlashPins {
            wp_n: None,
            hold_n: None,
            ..pins
        };
        assert_eq!(
            spi_flash_resources(0, &dual, &FactoryOptions::new()).unwrap().len(),
            2
        );
    }

    #[test]
    fn ulpi_checks_data_width() {
        let mut pins = UlpiPins {
            data: "B9 C6 A7 E9 A8 D9 C10 C7".to_string(),
            clk: "B6".to_string(),
            dir: "A6".to_string(),
            nxt: "B8".to_string(),
            stp: "C8".to_string(),
            rst: Some("C9".to_string()),
            clk_dir: Direction::In,
            rst_invert: true,
        };
        let ulpi = ulpi_resource(0, &pins, &FactoryOptions::new()).unwrap();
        let Io::Group(subs) = ulpi.io() else {
            panic!("expected subsignals");
        };
        assert_eq!(subs.len(), 6);
        assert!(matches!(subs[5].io(), Io::Pins(p) if p.is_inverted()));

        pins.data = "B9 C6".to_string();
        assert_eq!(
            ulpi_resource(0, &pins, &FactoryOptions::new()).unwrap_err(),
            DefinitionError::WidthMismatch {
                path: "ulpi.0.data".to_string(),
                expected: 8,
                actual: 2,
            }
        );
    }

    #[test]
    fn uart_and_rgb_led() {
        let uart = uart_resource(0, "A1", "A2", Some(("A3", "A4")), &FactoryOptions::new()).unwrap();
        let Io::Group(subs) = uart.io() else {
            panic!("expected subsignals");
        };
        let names: Vec<_> = subs.iter().map(Subsignal::name).collect();
        assert_eq!(names, vec!["rx", "tx", "rts", "cts"]);

        let led = rgb_led_resource(0, "K4", "M3", "J3", &FactoryOptions::new().invert(true)).unwrap();
        assert_eq!(led.path(), "rgb_led.0");
        assert!(led.validate().is_ok());
        assert!(rgb_led_resource(0, "K4 K5", "M3", "J3", &FactoryOptions::new()).is_err());
    }
}
