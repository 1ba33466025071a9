//! Concrete board definitions and a registry to construct them by name.
//!
//! Each board module builds a [`Platform`] from its pin tables using the
//! resource factories of `boardkit_platform`. The registry in this module is
//! what the CLI and the project configuration refer to.

#![warn(missing_docs)]

pub mod butterstick;
pub mod ecp5_5g_evn;
pub mod error;

use indexmap::IndexMap;

use boardkit_platform::{DefinitionError, Platform};

pub use error::BoardError;

/// A registered board.
#[derive(Debug, Clone, Copy)]
pub struct BoardInfo {
    /// Registry name.
    pub name: &'static str,
    /// One-line description shown by `boardkit boards`.
    pub description: &'static str,
    /// Accepted settings with their default values.
    pub settings: &'static [(&'static str, &'static str)],
    build: fn(&IndexMap<String, String>) -> Result<Platform, DefinitionError>,
}

fn butterstick_platform(_: &IndexMap<String, String>) -> Result<Platform, DefinitionError> {
    butterstick::platform()
}

const BOARDS: &[BoardInfo] = &[
    BoardInfo {
        name: butterstick::NAME,
        description: "ButterStick r1.0 (LFE5U-25F, DDR3, RGMII, ULPI, SYZYGY)",
        settings: &[],
        build: butterstick_platform,
    },
    BoardInfo {
        name: ecp5_5g_evn::NAME,
        description: "Lattice ECP5-5G Evaluation Board (LFE5UM5G-85F)",
        settings: ecp5_5g_evn::SETTINGS,
        build: ecp5_5g_evn::platform,
    },
];

/// Returns every registered board, in registration order.
pub fn boards() -> &'static [BoardInfo] {
    BOARDS
}

/// Looks up a board's registry entry.
pub fn find(name: &str) -> Option<&'static BoardInfo> {
    BOARDS.iter().find(|b| b.name == name)
}

/// Constructs the board registered as `name` with the given settings.
///
/// Settings the board does not declare are rejected rather than ignored.
pub fn board(name: &str, settings: &IndexMap<String, String>) -> Result<Platform, BoardError> {
    let info = find(name).ok_or_else(|| BoardError::UnknownBoard {
        name: name.to_string(),
        available: BOARDS
            .iter()
            .map(|b| b.name)
            .collect::<Vec<_>>()
            .join(", "),
    })?;
    if let Some(key) = settings
        .keys()
        .find(|k| !info.settings.iter().any(|(s, _)| *s == k.as_str()))
    {
        return Err(BoardError::UnknownSetting {
            board: name.to_string(),
            key: key.clone(),
        });
    }
    Ok((info.build)(settings)?)
}
