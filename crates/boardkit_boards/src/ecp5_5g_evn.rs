//! Lattice ECP5-5G Evaluation Board (LFE5UM5G-85F).
//!
//! Bank 1 and bank 6 I/O voltages are set by jumper resistors. The `VCCIO1`
//! and `VCCIO6` settings record that choice and the IO_TYPE of the LEDs,
//! buttons and switches is resolved from them at build time.

use indexmap::IndexMap;

use boardkit_platform::{
    button_resources, led_resources, switch_resources, Attrs, Clock, DefinitionError, Direction,
    FactoryOptions, PinSet, Pins, Platform, PlatformDef, ProgramCommand, Resolver, Resource,
    Subsignal, Toolchain,
};

/// Registry name.
pub const NAME: &str = "ecp5_5g_evn";

/// Board settings and their defaults.
pub const SETTINGS: &[(&str, &str)] = &[("VCCIO1", "2V5"), ("VCCIO6", "3V3")];

const VOLTAGES: &[&str] = &["3V3", "2V5"];

const OPENOCD_CFG: &str = "\
interface ftdi
ftdi_device_desc \"Lattice ECP5 Evaluation Board\"
ftdi_vid_pid 0x0403 0x6010
ftdi_channel 0
ftdi_layout_init 0xfff8 0xfffb
reset_config none
adapter_khz 25000

jtag newtap ecp5 tap -irlen 8 -expected-id 0x81113043
";

fn vccio_to_iostandard(vccio: &str) -> Result<String, String> {
    match vccio {
        "2V5" => Ok("LVCMOS25".to_string()),
        "3V3" => Ok("LVCMOS33".to_string()),
        other => Err(format!("unsupported VCCIO '{other}'")),
    }
}

fn bank_iostandard(setting: &'static str) -> Attrs {
    let resolver = Resolver::new(format!("{}_iostandard", setting.to_lowercase()), move |p| {
        let vccio = p
            .setting(setting)
            .ok_or_else(|| format!("setting {setting} is not set"))?;
        vccio_to_iostandard(vccio)
    });
    Attrs::new().with("IO_TYPE", resolver)
}

fn serdes(index: u32, tx: (&str, &str), rx: (&str, &str)) -> Resource {
    Resource::group(
        "serdes",
        index,
        vec![
            Subsignal::new("tx", Pins::diff_pairs(tx.0, tx.1, Direction::Out)),
            Subsignal::new("rx", Pins::diff_pairs(rx.0, rx.1, Direction::In)),
        ],
    )
}

fn resources() -> Result<Vec<Resource>, DefinitionError> {
    let lvcmos33 = Attrs::new().with("IO_TYPE", "LVCMOS33");
    let mut resources = vec![
        Resource::new("rst", 0, Pins::inverted("G2", Direction::In)).with_attrs(lvcmos33.clone()),
        Resource::new("clk12", 0, Pins::new("A10", Direction::In))
            .with_clock(Clock::mhz(12.0))
            .with_attrs(lvcmos33),
    ];

    let bank1 = FactoryOptions::new()
        .invert(true)
        .attrs(bank_iostandard("VCCIO1"));
    let bank6 = FactoryOptions::new()
        .invert(true)
        .attrs(bank_iostandard("VCCIO6"));

    resources.extend(led_resources(
        "A13 A12 B19 A18 B18 C17 A17 B17",
        &bank1,
    )?);
    resources.extend(button_resources("P4", &bank6)?);
    resources.extend(switch_resources(
        PinSet::indexed([(1, "J1"), (2, "H1"), (3, "K1")]),
        &bank6,
    )?);
    resources.extend(switch_resources(
        PinSet::indexed([(4, "E15"), (5, "D16"), (6, "B16"), (7, "C16"), (8, "A16")]),
        &bank1,
    )?);

    resources.extend([
        serdes(0, ("W4", "W5"), ("Y5", "Y6")),
        serdes(1, ("W8", "W9"), ("Y7", "Y8")),
        serdes(2, ("W13", "W14"), ("Y14", "Y15")),
        serdes(3, ("W17", "W18"), ("Y16", "Y17")),
        Resource::new("serdes_clk", 0, Pins::diff_pairs("Y11", "Y12", Direction::In)),
        // 200 MHz
        Resource::new("serdes_clk", 1, Pins::diff_pairs("Y19", "W20", Direction::In)),
    ]);

    Ok(resources)
}

/// Validates `settings` and fills in defaults for the ones not given.
fn settings(given: &IndexMap<String, String>) -> Result<IndexMap<String, String>, DefinitionError> {
    let mut settings = IndexMap::new();
    for (key, default) in SETTINGS {
        let value = given.get(*key).map(String::as_str).unwrap_or(*default);
        if !VOLTAGES.contains(&value) {
            return Err(DefinitionError::InvalidSetting {
                key: key.to_string(),
                value: value.to_string(),
                expected: VOLTAGES.join(", "),
            });
        }
        settings.insert(key.to_string(), value.to_string());
    }
    Ok(settings)
}

/// Builds the ECP5-5G-EVN platform with the given bank voltages.
pub fn platform(given: &IndexMap<String, String>) -> Result<Platform, DefinitionError> {
    Platform::new(PlatformDef {
        name: NAME.to_string(),
        device: "LFE5UM5G-85F".to_string(),
        package: "BG381".to_string(),
        speed: "8".to_string(),
        default_clock: "clk12".to_string(),
        default_reset: Some("rst".to_string()),
        resources: resources()?,
        settings: settings(given)?,
        toolchain: Toolchain::lattice_ecp5()
            .with_file("{{name}}-openocd.cfg", OPENOCD_CFG)
            .with_programmer(ProgramCommand::openocd_svf()),
        ..PlatformDef::default()
    })
}
