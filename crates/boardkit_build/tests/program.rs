//! Programmer tests: artifact extraction, argument rendering and failure policy.

use std::cell::RefCell;
use std::io;
use std::path::Path;

use boardkit_build::{program, BuildArtifacts, Exit, Invocation, ProgramError, ToolEnv};
use boardkit_platform::{
    Direction, Pins, Platform, PlatformDef, ProgramCommand, Resource, Toolchain,
};

fn fake_tool(dir: &Path, name: &str) {
    let path = dir.join(name);
    std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}

fn platform(programmer: Option<ProgramCommand>) -> Platform {
    let mut toolchain = Toolchain::lattice_ecp5();
    toolchain.programmer = programmer;
    Platform::new(PlatformDef {
        name: "board".to_string(),
        device: "LFE5U-25F".to_string(),
        package: "BG381".to_string(),
        speed: "8".to_string(),
        default_clock: "clk".to_string(),
        resources: vec![Resource::new("clk", 0, Pins::new("B12", Direction::In))],
        toolchain,
        ..PlatformDef::default()
    })
    .unwrap()
}

fn artifacts() -> BuildArtifacts {
    let mut a = BuildArtifacts::new("top");
    a.insert("top.bit", b"BIT".to_vec());
    a.insert("top.svf", b"SVF".to_vec());
    a.insert("top-openocd.cfg", b"interface ftdi".to_vec());
    a
}

#[test]
fn dfu_util_receives_the_bitstream() {
    let tools = tempfile::tempdir().unwrap();
    fake_tool(tools.path(), "dfu-util");
    let env = ToolEnv::empty().with_path(tools.path());

    let seen = RefCell::new(Vec::new());
    let mut runner = |inv: &Invocation| -> io::Result<Exit> {
        assert_eq!(inv.args[0], "-D");
        assert_eq!(std::fs::read(&inv.args[1])?, b"BIT");
        seen.borrow_mut().push(inv.clone());
        Ok(Exit::SUCCESS)
    };
    program(
        artifacts(),
        &platform(Some(ProgramCommand::dfu_util())),
        &env,
        &mut runner,
    )
    .unwrap();

    let seen = seen.into_inner();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].program, tools.path().join("dfu-util"));
    assert!(!Path::new(&seen[0].args[1]).exists(), "extracted file must be removed");
}

#[test]
fn openocd_gets_config_and_vectors() {
    let tools = tempfile::tempdir().unwrap();
    fake_tool(tools.path(), "openocd");
    let env = ToolEnv::empty().with_path(tools.path());

    let seen = RefCell::new(Vec::new());
    let mut runner = |inv: &Invocation| -> io::Result<Exit> {
        seen.borrow_mut().push(inv.clone());
        Ok(Exit::SUCCESS)
    };
    program(
        artifacts(),
        &platform(Some(ProgramCommand::openocd_svf())),
        &env,
        &mut runner,
    )
    .unwrap();

    let inv = &seen.borrow()[0];
    assert_eq!(inv.args.len(), 4);
    assert_eq!(inv.args[0], "-f");
    assert!(inv.args[1].ends_with("top-openocd.cfg"));
    assert_eq!(inv.args[2], "-c");
    assert!(inv.args[3].starts_with("transport select jtag; init; svf -quiet "));
    assert!(inv.args[3].contains("top.svf; exit"));
}

#[test]
fn env_variable_selects_programming_tool() {
    let tools = tempfile::tempdir().unwrap();
    fake_tool(tools.path(), "dfu-util-custom");
    let custom = tools.path().join("dfu-util-custom");
    let env = ToolEnv::empty().with_var("DFU_UTIL", custom.to_str().unwrap());

    let mut program_path = None;
    let mut runner = |inv: &Invocation| -> io::Result<Exit> {
        program_path = Some(inv.program.clone());
        Ok(Exit::SUCCESS)
    };
    program(
        artifacts(),
        &platform(Some(ProgramCommand::dfu_util())),
        &env,
        &mut runner,
    )
    .unwrap();
    assert_eq!(program_path, Some(custom));
}

#[test]
fn failure_is_reported_once() {
    let tools = tempfile::tempdir().unwrap();
    fake_tool(tools.path(), "dfu-util");
    let env = ToolEnv::empty().with_path(tools.path());

    let mut calls = 0;
    let mut runner = |_: &Invocation| -> io::Result<Exit> {
        calls += 1;
        Ok(Exit::code(74))
    };
    let err = program(
        artifacts(),
        &platform(Some(ProgramCommand::dfu_util())),
        &env,
        &mut runner,
    )
    .unwrap_err();
    assert_eq!(calls, 1);
    assert!(matches!(err, ProgramError::ProgramTool { code: Some(74), .. }));
}

#[test]
fn missing_pieces() {
    let env = ToolEnv::empty();
    let mut runner = |_: &Invocation| -> io::Result<Exit> { panic!("nothing should run") };

    let err = program(artifacts(), &platform(None), &env, &mut runner).unwrap_err();
    assert!(matches!(err, ProgramError::NoProgrammer { .. }));

    let err = program(
        artifacts(),
        &platform(Some(ProgramCommand::dfu_util())),
        &env,
        &mut runner,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ProgramError::MissingTool { ref env_var, .. } if env_var == "DFU_UTIL"
    ));

    let tools = tempfile::tempdir().unwrap();
    fake_tool(tools.path(), "dfu-util");
    let env = ToolEnv::empty().with_path(tools.path());
    let mut only_svf = BuildArtifacts::new("top");
    only_svf.insert("top.svf", b"SVF".to_vec());
    let err = program(
        only_svf,
        &platform(Some(ProgramCommand::dfu_util())),
        &env,
        &mut runner,
    )
    .unwrap_err();
    assert!(matches!(err, ProgramError::MissingArtifact { ref name } if name == "top.bit"));
}
