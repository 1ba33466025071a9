//! Board description model for the boardkit FPGA toolchain driver.
//!
//! Physical pins compose into [`Pins`] descriptors, which are grouped into
//! [`Resource`]s (optionally through nested [`Subsignal`]s) carrying
//! electrical [`Attrs`]. A [`Platform`] aggregates resources, [`Connector`]s
//! and the [`Toolchain`] hooks that the build pipeline interprets.
//! [`Platform::resolve`] flattens a resource into [`PhysicalBinding`]s.

#![warn(missing_docs)]

pub mod attrs;
pub mod clock;
pub mod connector;
pub mod error;
pub mod factory;
pub mod pins;
pub mod platform;
pub mod resolve;
pub mod resource;
pub mod toolchain;

pub use attrs::{overlay, AttrValue, Attrs, ResolvedAttrs, Resolver};
pub use clock::{Clock, ParseClockError};
pub use connector::{resolve_pin, Connector};
pub use error::{DefinitionError, ResolutionError, ResolverError, UnresolvedReason};
pub use factory::{
    button_resources, led_resources, rgb_led_resource, spi_flash_resources, switch_resources,
    uart_resource, ulpi_resource, FactoryOptions, PinSet, SpiFlashPins, UlpiPins,
};
pub use pins::{Direction, PinKind, Pins};
pub use platform::{Platform, PlatformDef};
pub use resolve::{resolve_resource, PhysicalBinding};
pub use resource::{Io, Resource, Subsignal};
pub use toolchain::{tool_env_var, CommandTemplate, ProgramCommand, Stage, Toolchain, ToolchainFamily};
