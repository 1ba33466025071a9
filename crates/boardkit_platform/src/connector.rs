//! Connectors: named headers mapping logical pin names to package pins.
//!
//! A pin name of the form `<connector>_<index>:<pin>` refers to a logical pin
//! of a connector instead of a package pin. Connector mappings may themselves
//! point at another connector's logical pin; [`resolve_pin`] follows such
//! chains and rejects cycles.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::UnresolvedReason;

/// A named, indexed physical header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connector {
    name: String,
    index: u32,
    pins: IndexMap<String, String>,
}

impl Connector {
    /// Creates a connector from `(logical name, target)` pairs.
    ///
    /// A target is either a package pin or a reference to another connector.
    pub fn new<K, V>(name: impl Into<String>, index: u32, pins: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            index,
            pins: pins
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the connector name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the connector index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the `<name>_<index>` identifier used in references.
    pub fn id(&self) -> String {
        format!("{}_{}", self.name, self.index)
    }

    /// Looks up the target of a logical pin.
    pub fn get(&self, pin: &str) -> Option<&str> {
        self.pins.get(pin).map(String::as_str)
    }

    /// Iterates over `(logical name, target)` pairs in declaration order.
    pub fn pins(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pins.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Formats a reference to a logical pin of a connector.
pub fn reference(connector: &str, index: u32, pin: &str) -> String {
    format!("{connector}_{index}:{pin}")
}

/// A parsed `<connector>_<index>:<pin>` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorRef<'a> {
    /// Connector name.
    pub connector: &'a str,
    /// Connector index.
    pub index: u32,
    /// Logical pin on the connector.
    pub pin: &'a str,
}

/// Parses a pin name as a connector reference.
///
/// Returns `None` for plain package pins (no `:`), and an error for names
/// that contain `:` but are not well-formed references.
pub fn parse_reference(name: &str) -> Option<Result<ConnectorRef<'_>, UnresolvedReason>> {
    let (head, pin) = name.split_once(':')?;
    let parsed = head
        .rsplit_once('_')
        .and_then(|(connector, index)| {
            let index = index.parse().ok()?;
            (!connector.is_empty() && !pin.is_empty()).then_some(ConnectorRef {
                connector,
                index,
                pin,
            })
        })
        .ok_or(UnresolvedReason::Malformed);
    Some(parsed)
}

/// Resolves a pin name to a package pin, following connector indirection.
///
/// Plain names are returned unchanged. The chain of visited references is
/// tracked so that a cycle fails deterministically instead of looping.
pub fn resolve_pin(name: &str, connectors: &[Connector]) -> Result<String, UnresolvedReason> {
    let mut current = name.to_string();
    let mut visited = HashSet::new();
    let mut chain = Vec::new();

    loop {
        let parsed = match parse_reference(&current) {
            None => return Ok(current),
            Some(parsed) => parsed?,
        };
        if !visited.insert(current.clone()) {
            chain.push(current);
            return Err(UnresolvedReason::Cycle(chain));
        }
        chain.push(current.clone());

        let connector = connectors
            .iter()
            .find(|c| c.name == parsed.connector && c.index == parsed.index)
            .ok_or_else(|| {
                UnresolvedReason::UnknownConnector(format!("{}_{}", parsed.connector, parsed.index))
            })?;
        let target = connector
            .get(parsed.pin)
            .ok_or_else(|| UnresolvedReason::UnknownConnectorPin {
                connector: connector.id(),
                pin: parsed.pin.to_string(),
            })?;
        current = target.to_string();
    }
}
