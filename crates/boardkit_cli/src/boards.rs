//! `boardkit boards` and `boardkit resources`: registry inspection.

use indexmap::IndexMap;

use boardkit_platform::{PhysicalBinding, Platform};

use crate::{GlobalArgs, ReportFormat, ResourcesArgs};

/// Runs `boardkit boards`.
pub fn list(_global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    for info in boardkit_boards::boards() {
        println!("{:<20} {}", info.name, info.description);
        for (key, default) in info.settings {
            println!("{:<20}   {key} (default {default})", "");
        }
    }
    Ok(0)
}

/// Runs `boardkit resources <board>`.
pub fn resources(args: &ResourcesArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let settings: IndexMap<String, String> = args.settings.iter().cloned().collect();
    let platform = boardkit_boards::board(&args.board, &settings)?;
    let bindings = platform.resolve_all()?;

    match args.format {
        ReportFormat::Json => println!("{}", render_json(&platform, &bindings)?),
        ReportFormat::Text => {
            if !global.quiet {
                eprintln!(
                    "  Resolving {} ({} {} speed {})",
                    platform.name(),
                    platform.device(),
                    platform.package(),
                    platform.speed()
                );
            }
            print!("{}", render_text(&bindings));
        }
    }
    Ok(0)
}

fn render_json(
    platform: &Platform,
    bindings: &[PhysicalBinding],
) -> Result<String, serde_json::Error> {
    let report = serde_json::json!({
        "board": platform.name(),
        "device": platform.device(),
        "package": platform.package(),
        "speed": platform.speed(),
        "settings": platform.settings(),
        "bindings": bindings,
    });
    serde_json::to_string_pretty(&report)
}

fn render_text(bindings: &[PhysicalBinding]) -> String {
    let mut out = String::new();
    for b in bindings {
        let bit = if b.width > 1 {
            format!("[{}]", b.bit)
        } else {
            String::new()
        };
        let pin = match &b.pin_n {
            Some(n) => format!("{}/{n}", b.pin),
            None => b.pin.clone(),
        };
        let mut flags = vec![b.direction.to_string()];
        if b.invert {
            flags.push("inverted".to_string());
        }
        if let Some(clock) = b.clock {
            flags.push(clock.to_string());
        }
        let attrs: Vec<_> = b.attrs.iter().map(|(k, v)| format!("{k}={v}")).collect();
        out.push_str(&format!(
            "{:<24} {:<10} {:<10} {}\n",
            format!("{}{bit}", b.path),
            pin,
            flags.join(","),
            attrs.join(" ")
        ));
    }
    out
}
