//! Builds against the registered boards with a scripted toolchain.

use std::cell::RefCell;
use std::io;
use std::path::Path;

use indexmap::IndexMap;

use boardkit_boards::{board, butterstick, ecp5_5g_evn};
use boardkit_build::{prepare, program, BuildOptions, BuildState, Design, Exit, Invocation, ToolEnv};
use boardkit_platform::Stage;

fn fake_tools(dir: &Path, names: &[&str]) {
    for name in names {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
    }
}

fn blinky() -> Design {
    Design::new("blinky")
        .with_source("blinky.v", "module blinky(input clk, output led); endmodule")
        .request("clk", 0)
        .request("button", 0)
}

/// Writes a placeholder output for every `*.json`, `*.config`, `*.bit` or
/// `*.svf` argument, the way the real tools would.
fn toolchain_stub(calls: &RefCell<Vec<Invocation>>) -> impl FnMut(&Invocation) -> io::Result<Exit> + '_ {
    move |inv: &Invocation| {
        calls.borrow_mut().push(inv.clone());
        for arg in &inv.args {
            if [".json", ".config", ".bit", ".svf"]
                .iter()
                .any(|ext| arg.ends_with(ext))
            {
                std::fs::write(inv.cwd.join(arg), arg.as_bytes())?;
            }
        }
        Ok(Exit::SUCCESS)
    }
}

#[test]
fn butterstick_plan_renders_the_expected_commands() {
    let platform = butterstick::platform().unwrap();
    let plan = prepare(&blinky(), &platform, &BuildOptions::new("top")).unwrap();

    let lines: Vec<_> = plan.commands().iter().map(|c| c.line.as_str()).collect();
    assert_eq!(
        lines,
        vec![
            "yosys -q -l top.rpt top.ys",
            "nextpnr-ecp5 --quiet --log top.tim --25k --package CABGA381 --speed 8 \
             --json top.json --lpf top.lpf --textcfg top.config",
            "ecppack --compress --freq 38.8 --input top.config --bit top.bit --svf top.svf",
            "dfu-suffix -v 1209 -p 5af0 -a top.bit",
        ]
    );
    assert_eq!(plan.commands()[3].stage, Stage::Finish);

    let lpf = String::from_utf8(plan.files()["top.lpf"].clone()).unwrap();
    assert!(lpf.contains("LOCATE COMP \"clk_0__io\" SITE \"B12\";"));
    assert!(lpf.contains("IOBUF PORT \"clk_0__io\" IO_TYPE=LVCMOS33;"));
    assert!(lpf.contains("LOCATE COMP \"button_0__io\" SITE \"U16\";"));
    assert!(lpf.contains("FREQUENCY PORT \"clk_0__io\" 30000000 HZ;"));
    assert!(!lpf.contains("ddr3"), "only requested resources are constrained");
}

#[test]
fn caller_overrides_win_over_board_defaults() {
    let platform = butterstick::platform().unwrap();
    let options = BuildOptions::new("top").with_override("ecppack_opts", "--compress");
    let plan = prepare(&blinky(), &platform, &options).unwrap();
    assert_eq!(plan.overrides()["ecppack_opts"], "--compress");
    assert_eq!(
        plan.commands()[2].line,
        "ecppack --compress --input top.config --bit top.bit --svf top.svf"
    );
}

#[test]
fn butterstick_builds_and_programs_over_dfu() {
    let tools = tempfile::tempdir().unwrap();
    fake_tools(
        tools.path(),
        &["yosys", "nextpnr-ecp5", "ecppack", "dfu-suffix", "dfu-util"],
    );
    let env = ToolEnv::empty().with_path(tools.path());

    let platform = board(butterstick::NAME, &IndexMap::new()).unwrap();
    let mut plan = prepare(&blinky(), &platform, &BuildOptions::new("top")).unwrap();
    let calls = RefCell::new(Vec::new());
    let artifacts = {
        let mut runner = toolchain_stub(&calls);
        plan.execute(&env, &mut runner).unwrap()
    };
    assert_eq!(plan.state(), BuildState::Done);
    assert_eq!(calls.borrow().len(), 4);
    assert_eq!(artifacts.get("top.bit"), Some(&b"top.bit"[..]));

    let programmed = RefCell::new(Vec::new());
    let mut runner = |inv: &Invocation| -> io::Result<Exit> {
        programmed.borrow_mut().push(inv.clone());
        Ok(Exit::SUCCESS)
    };
    program(artifacts, &platform, &env, &mut runner).unwrap();
    let programmed = programmed.into_inner();
    assert_eq!(programmed.len(), 1);
    assert_eq!(programmed[0].program, tools.path().join("dfu-util"));
    assert!(programmed[0].args[1].ends_with("top.bit"));
}

#[test]
fn ecp5_5g_evn_generates_openocd_config() {
    let platform = ecp5_5g_evn::platform(&IndexMap::new()).unwrap();
    let design = Design::new("blinky").request("clk12", 0).request("led", 0);
    let plan = prepare(&design, &platform, &BuildOptions::new("blinky")).unwrap();

    let cfg = String::from_utf8(plan.files()["blinky-openocd.cfg"].clone()).unwrap();
    assert!(cfg.starts_with("interface ftdi\n"));
    assert!(plan.commands()[1].args.contains(&"--um5g-85k".to_string()));

    let lpf = String::from_utf8(plan.files()["blinky.lpf"].clone()).unwrap();
    assert!(lpf.contains("IOBUF PORT \"led_0__io\" IO_TYPE=LVCMOS25;"));
    assert!(lpf.contains("FREQUENCY PORT \"clk12_0__io\" 12000000 HZ;"));
}

#[test]
fn ecp5_5g_evn_programs_config_and_vectors() {
    let tools = tempfile::tempdir().unwrap();
    fake_tools(tools.path(), &["yosys", "nextpnr-ecp5", "ecppack", "openocd"]);
    let env = ToolEnv::empty().with_path(tools.path());

    let platform = ecp5_5g_evn::platform(&IndexMap::new()).unwrap();
    let design = Design::new("blinky").request("clk12", 0);
    let mut plan = prepare(&design, &platform, &BuildOptions::new("top")).unwrap();
    let calls = RefCell::new(Vec::new());
    let artifacts = {
        let mut runner = toolchain_stub(&calls);
        plan.execute(&env, &mut runner).unwrap()
    };
    assert!(artifacts.contains("top-openocd.cfg"));
    assert!(artifacts.contains("top.svf"));

    let mut args = Vec::new();
    let mut runner = |inv: &Invocation| -> io::Result<Exit> {
        args = inv.args.clone();
        Ok(Exit::SUCCESS)
    };
    program(artifacts, &platform, &env, &mut runner).unwrap();
    assert_eq!(args[0], "-f");
    assert!(args[1].ends_with("top-openocd.cfg"));
    assert!(args[3].ends_with("top.svf; exit"));
}
