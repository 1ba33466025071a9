//! Shared project plumbing for `build` and `program`: locating the project,
//! loading its configuration, and turning it into a design and a platform.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use boardkit_build::Design;
use boardkit_config::{ProjectConfig, CONFIG_FILE};
use boardkit_platform::Platform;

use crate::GlobalArgs;

/// Walks up from `start` looking for `boardkit.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// Reads the project's sources, requests and request clocks into a [`Design`].
///
/// Sources are stored under their file name, so two sources sharing a name in
/// different directories are rejected.
pub fn load_design(
    config: &ProjectConfig,
    root: &Path,
) -> Result<Design, Box<dyn std::error::Error>> {
    let mut design = Design::new(&config.project.top);
    for source in &config.project.sources {
        let path = root.join(source);
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .ok_or_else(|| format!("source '{source}' has no file name"))?;
        if design.sources.contains_key(&file) {
            return Err(format!("two sources are named '{file}'").into());
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        design = design.with_source(file, text);
    }
    for request in &config.requests {
        design = design.request(&request.name, request.index);
        if let Some(clock) = request.clock {
            design = design.with_clock(&request.name, request.index, clock);
        }
    }
    Ok(design)
}

/// Constructs the project's board, or `board` when given on the command line.
///
/// Settings from `boardkit.toml` only apply to the board they were written for.
pub fn load_platform(
    config: &ProjectConfig,
    board: Option<&str>,
) -> Result<Platform, Box<dyn std::error::Error>> {
    let name = board.unwrap_or(&config.board.name);
    let settings = if name == config.board.name {
        config.board.settings.clone()
    } else {
        IndexMap::new()
    };
    Ok(boardkit_boards::board(name, &settings)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
[project]
name = "blinky"
top = "blinky"
sources = ["src/blinky.v"]

[board]
name = "ecp5_5g_evn"

[board.settings]
VCCIO1 = "3V3"

[[request]]
name = "clk12"
"#;

    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), CONFIG).unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/blinky.v"), "module blinky; endmodule").unwrap();
        tmp
    }

    #[test]
    fn find_project_root_in_parent() {
        let tmp = project();
        let root = find_project_root(&tmp.path().join("src")).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn find_project_root_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = find_project_root(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("could not find boardkit.toml"));
    }

    #[test]
    fn resolve_project_root_from_config_file() {
        let tmp = project();
        let global = GlobalArgs {
            quiet: false,
            verbose: false,
            config: Some(tmp.path().join(CONFIG_FILE).to_str().unwrap().to_string()),
        };
        assert_eq!(resolve_project_root(&global).unwrap(), tmp.path());
    }

    #[test]
    fn design_reads_sources_and_requests() {
        let tmp = project();
        let config = boardkit_config::load_config(tmp.path()).unwrap();
        let design = load_design(&config, tmp.path()).unwrap();
        assert_eq!(design.top, "blinky");
        assert_eq!(design.sources["blinky.v"], "module blinky; endmodule");
        assert_eq!(design.requests, vec![("clk12".to_string(), 0)]);
    }

    #[test]
    fn request_clock_reaches_the_constraints() {
        let tmp = project();
        let config = CONFIG.replace(
            "name = \"clk12\"\n",
            "name = \"clk12\"\nclock = \"25MHz\"\n",
        );
        fs::write(tmp.path().join(CONFIG_FILE), config).unwrap();
        let config = boardkit_config::load_config(tmp.path()).unwrap();
        let design = load_design(&config, tmp.path()).unwrap();
        assert_eq!(
            design.clocks,
            vec![("clk12".to_string(), 0, boardkit_platform::Clock::mhz(25.0))]
        );

        let platform = load_platform(&config, None).unwrap();
        let plan = boardkit_build::prepare(
            &design,
            &platform,
            &boardkit_build::BuildOptions::default(),
        )
        .unwrap();
        let lpf = String::from_utf8(plan.files()["top.lpf"].clone()).unwrap();
        assert!(lpf.contains("FREQUENCY PORT \"clk12_0__io\" 25000000 HZ;"));
    }

    #[test]
    fn missing_source_is_reported() {
        let tmp = project();
        fs::remove_file(tmp.path().join("src/blinky.v")).unwrap();
        let config = boardkit_config::load_config(tmp.path()).unwrap();
        let err = load_design(&config, tmp.path()).unwrap_err();
        assert!(err.to_string().contains("blinky.v"));
    }

    #[test]
    fn settings_follow_the_configured_board() {
        let tmp = project();
        let config = boardkit_config::load_config(tmp.path()).unwrap();
        let platform = load_platform(&config, None).unwrap();
        assert_eq!(platform.setting("VCCIO1"), Some("3V3"));

        let other = load_platform(&config, Some("butterstick_r1_0")).unwrap();
        assert_eq!(other.name(), "butterstick_r1_0");
    }
}
