//! Configuration types deserialized from `boardkit.toml`.

use indexmap::IndexMap;
use serde::Deserialize;

use boardkit_platform::Clock;

/// The top-level project configuration parsed from `boardkit.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata and HDL sources.
    pub project: ProjectMeta,
    /// The board to build for.
    pub board: BoardConfig,
    /// Resources the design binds to, in declaration order.
    #[serde(default, rename = "request")]
    pub requests: Vec<ResourceRequest>,
    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,
}

/// Core project metadata required in every `boardkit.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// Name of the top-level HDL module.
    pub top: String,
    /// HDL source files, relative to the project directory.
    #[serde(default)]
    pub sources: Vec<String>,
}

/// Board selection.
#[derive(Debug, Deserialize)]
pub struct BoardConfig {
    /// Registry name of the board (e.g., "butterstick_r1_0").
    pub name: String,
    /// Board parameters such as bank voltages.
    #[serde(default)]
    pub settings: IndexMap<String, String>,
}

/// A board resource the design uses, identified by name and index.
///
/// `clock` constrains the resource to a frequency, written as `"48MHz"` or a
/// number of Hertz. It replaces any frequency the board declares.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceRequest {
    /// Resource name.
    pub name: String,
    /// Resource index.
    #[serde(default)]
    pub index: u32,
    /// Clock constraint for the resource.
    #[serde(default)]
    pub clock: Option<Clock>,
}

/// Build settings.
#[derive(Debug, Deserialize)]
pub struct BuildConfig {
    /// Base name of every generated file.
    #[serde(default = "default_name")]
    pub name: String,
    /// Directory where artifacts are saved, relative to the project directory.
    #[serde(default = "default_dir")]
    pub dir: String,
    /// Whether the toolchain runs in verbose mode.
    #[serde(default)]
    pub verbose: bool,
    /// Toolchain option overrides, applied over the board's defaults.
    #[serde(default)]
    pub overrides: IndexMap<String, String>,
}

fn default_name() -> String {
    "top".to_string()
}

fn default_dir() -> String {
    "build".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            dir: default_dir(),
            verbose: false,
            overrides: IndexMap::new(),
        }
    }
}
