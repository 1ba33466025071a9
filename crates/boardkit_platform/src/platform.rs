//! The platform aggregate: device identity, resources, connectors and
//! toolchain hooks.
//!
//! A [`Platform`] is validated once in [`Platform::new`] and is immutable
//! afterwards, so it can be shared by reference between concurrent builds.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::attrs::Attrs;
use crate::connector::Connector;
use crate::error::{DefinitionError, ResolutionError};
use crate::resolve::{resolve_resource, PhysicalBinding};
use crate::resource::Resource;
use crate::toolchain::Toolchain;

/// The raw parts of a platform, before validation.
#[derive(Debug, Clone, Default)]
pub struct PlatformDef {
    /// Registry name of the board, e.g. `butterstick_r1_0`.
    pub name: String,
    /// Device identifier, e.g. `LFE5U-25F`.
    pub device: String,
    /// Package identifier, e.g. `BG381`.
    pub package: String,
    /// Speed grade.
    pub speed: String,
    /// Name of the default clock resource (index 0).
    pub default_clock: String,
    /// Name of the default reset resource (index 0), if any.
    pub default_reset: Option<String>,
    /// Top-level resources, in declaration order.
    pub resources: Vec<Resource>,
    /// Connectors, in declaration order.
    pub connectors: Vec<Connector>,
    /// Board parameters readable by attribute resolvers.
    pub settings: IndexMap<String, String>,
    /// Attributes applied underneath every resource's own set.
    pub default_attrs: Attrs,
    /// Build and program behavior.
    pub toolchain: Toolchain,
}

/// A validated, immutable board description.
#[derive(Debug, Clone)]
pub struct Platform {
    def: PlatformDef,
    default_clock: usize,
}

impl Platform {
    /// Validates a definition and freezes it.
    ///
    /// Checks resource and connector identities, the shape of every
    /// resource tree, and that the default clock and reset exist.
    pub fn new(def: PlatformDef) -> Result<Self, DefinitionError> {
        let mut seen = HashSet::new();
        for resource in &def.resources {
            if !seen.insert((resource.name(), resource.index())) {
                return Err(DefinitionError::DuplicateResource {
                    name: resource.name().to_string(),
                    index: resource.index(),
                });
            }
            resource.validate()?;
        }

        let mut seen = HashSet::new();
        for connector in &def.connectors {
            if !seen.insert((connector.name(), connector.index())) {
                return Err(DefinitionError::DuplicateConnector {
                    name: connector.name().to_string(),
                    index: connector.index(),
                });
            }
        }

        let position = |name: &str| {
            def.resources
                .iter()
                .position(|r| r.name() == name && r.index() == 0)
        };
        let default_clock = position(&def.default_clock)
            .ok_or_else(|| DefinitionError::UnknownDefaultClock(def.default_clock.clone()))?;
        if let Some(reset) = &def.default_reset {
            if position(reset).is_none() {
                return Err(DefinitionError::UnknownDefaultReset(reset.clone()));
            }
        }

        Ok(Self { def, default_clock })
    }

    /// Returns the board's registry name.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Returns the device identifier.
    pub fn device(&self) -> &str {
        &self.def.device
    }

    /// Returns the package identifier.
    pub fn package(&self) -> &str {
        &self.def.package
    }

    /// Returns the speed grade.
    pub fn speed(&self) -> &str {
        &self.def.speed
    }

    /// Returns all resources in declaration order.
    pub fn resources(&self) -> &[Resource] {
        &self.def.resources
    }

    /// Returns all connectors in declaration order.
    pub fn connectors(&self) -> &[Connector] {
        &self.def.connectors
    }

    /// Returns the board parameters.
    pub fn settings(&self) -> &IndexMap<String, String> {
        &self.def.settings
    }

    /// Reads one board parameter.
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.def.settings.get(key).map(String::as_str)
    }

    /// Returns the attributes applied underneath every resource.
    pub fn default_attrs(&self) -> &Attrs {
        &self.def.default_attrs
    }

    /// Returns the toolchain hooks.
    pub fn toolchain(&self) -> &Toolchain {
        &self.def.toolchain
    }

    /// Finds a resource by identity.
    pub fn lookup(&self, name: &str, index: u32) -> Result<&Resource, ResolutionError> {
        self.def
            .resources
            .iter()
            .find(|r| r.name() == name && r.index() == index)
            .ok_or_else(|| ResolutionError::UnknownResource {
                name: name.to_string(),
                index,
            })
    }

    /// Returns the default clock resource.
    pub fn default_clock(&self) -> &Resource {
        &self.def.resources[self.default_clock]
    }

    /// Returns the default reset resource, if the board has one.
    pub fn default_reset(&self) -> Option<&Resource> {
        let reset = self.def.default_reset.as_deref()?;
        self.lookup(reset, 0).ok()
    }

    /// Finds a connector by identity.
    pub fn connector(&self, name: &str, index: u32) -> Option<&Connector> {
        self.def
            .connectors
            .iter()
            .find(|c| c.name() == name && c.index() == index)
    }

    /// Resolves one resource into per-bit physical bindings.
    pub fn resolve(&self, resource: &Resource) -> Result<Vec<PhysicalBinding>, ResolutionError> {
        resolve_resource(resource, &self.def.connectors, self)
    }

    /// Resolves every resource, failing on the first error.
    pub fn resolve_all(&self) -> Result<Vec<PhysicalBinding>, ResolutionError> {
        let mut bindings = Vec::new();
        for resource in &self.def.resources {
            bindings.extend(self.resolve(resource)?);
        }
        Ok(bindings)
    }
}
