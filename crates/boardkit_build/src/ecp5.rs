//! Inputs for the open Lattice ECP5 flow: a yosys script and an LPF
//! constraint file, plus the nextpnr device and package options.

use std::fmt::Write as _;

use indexmap::IndexMap;

use boardkit_platform::{PhysicalBinding, Platform};

use crate::design::Design;
use crate::error::BuildError;

/// nextpnr-ecp5 option selecting the device.
pub fn nextpnr_device(device: &str) -> Option<&'static str> {
    Some(match device {
        "LFE5U-12F" => "--12k",
        "LFE5U-25F" => "--25k",
        "LFE5U-45F" => "--45k",
        "LFE5U-85F" => "--85k",
        "LFE5UM-25F" => "--um-25k",
        "LFE5UM-45F" => "--um-45k",
        "LFE5UM-85F" => "--um-85k",
        "LFE5UM5G-25F" => "--um5g-25k",
        "LFE5UM5G-45F" => "--um5g-45k",
        "LFE5UM5G-85F" => "--um5g-85k",
        _ => return None,
    })
}

/// nextpnr-ecp5 package name.
pub fn nextpnr_package(package: &str) -> Option<&'static str> {
    Some(match package {
        "BG256" => "CABGA256",
        "MG285" => "CSFBGA285",
        "BG381" => "CABGA381",
        "BG554" => "CABGA554",
        "BG756" => "CABGA756",
        _ => return None,
    })
}

/// Template variables this family adds on top of the platform's.
pub fn template_vars(platform: &Platform) -> Result<IndexMap<String, String>, BuildError> {
    let device = nextpnr_device(platform.device()).ok_or_else(|| BuildError::UnsupportedDevice {
        device: platform.device().to_string(),
    })?;
    let package =
        nextpnr_package(platform.package()).ok_or_else(|| BuildError::UnsupportedPackage {
            package: platform.package().to_string(),
        })?;
    Ok(IndexMap::from([
        ("nextpnr_device".to_string(), device.to_string()),
        ("nextpnr_package".to_string(), package.to_string()),
    ]))
}

fn opt<'a>(overrides: &'a IndexMap<String, String>, key: &str) -> Option<&'a str> {
    overrides.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

/// The yosys synthesis script, `<name>.ys`.
pub fn yosys_script(name: &str, design: &Design, overrides: &IndexMap<String, String>) -> String {
    let read_opts = opt(overrides, "read_verilog_opts")
        .map(|o| format!("{o} "))
        .unwrap_or_default();
    let mut s = String::from("# Generated by boardkit\n");
    for file in design.files_with_extension("v") {
        let _ = writeln!(s, "read_verilog {read_opts}{file}");
    }
    for file in design.files_with_extension("sv") {
        let _ = writeln!(s, "read_verilog -sv {read_opts}{file}");
    }
    for file in design.files_with_extension("il") {
        let _ = writeln!(s, "read_ilang {file}");
    }
    let _ = writeln!(
        s,
        "{}",
        opt(overrides, "script_after_read").unwrap_or("# (script_after_read placeholder)")
    );
    let synth_opts = opt(overrides, "synth_opts")
        .map(|o| format!("{o} "))
        .unwrap_or_default();
    let _ = writeln!(s, "synth_ecp5 {synth_opts}-top {}", design.top);
    let _ = writeln!(
        s,
        "{}",
        opt(overrides, "script_after_synth").unwrap_or("# (script_after_synth placeholder)")
    );
    let _ = writeln!(s, "write_json {name}.json");
    s
}

/// Constraint port names for one binding: the positive (or only) port,
/// and the negative port of a differential pair.
pub fn port_names(binding: &PhysicalBinding) -> (String, Option<String>) {
    let bit = |port: String| {
        if binding.width > 1 {
            format!("{port}[{}]", binding.bit)
        } else {
            port
        }
    };
    if binding.is_differential {
        (
            bit(format!("{}__p", binding.port)),
            Some(bit(format!("{}__n", binding.port))),
        )
    } else {
        (bit(format!("{}__io", binding.port)), None)
    }
}

/// The LPF constraint file, `<name>.lpf`, for the given bindings.
pub fn lpf(bindings: &[PhysicalBinding], overrides: &IndexMap<String, String>) -> String {
    let mut s = String::from("# Generated by boardkit\nBLOCK ASYNCPATHS;\nBLOCK RESETPATHS;\n");
    for binding in bindings {
        let (port, port_n) = port_names(binding);
        let mut locate = vec![(port, binding.pin.as_str())];
        if let (Some(port_n), Some(pin_n)) = (port_n, binding.pin_n.as_deref()) {
            locate.push((port_n, pin_n));
        }
        for (port, pin) in &locate {
            let _ = writeln!(s, "LOCATE COMP \"{port}\" SITE \"{pin}\";");
            if !binding.attrs.is_empty() {
                let _ = write!(s, "IOBUF PORT \"{port}\"");
                for (key, value) in &binding.attrs {
                    let _ = write!(s, " {key}={value}");
                }
                s.push_str(";\n");
            }
        }
    }
    for binding in bindings {
        if let Some(clock) = binding.clock {
            let (port, _) = port_names(binding);
            let _ = writeln!(s, "FREQUENCY PORT \"{port}\" {} HZ;", clock.frequency());
        }
    }
    let _ = writeln!(
        s,
        "{}",
        opt(overrides, "add_preferences").unwrap_or("# (add_preferences placeholder)")
    );
    s
}
