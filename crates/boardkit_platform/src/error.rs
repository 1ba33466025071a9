//! Error types for board definitions and resource resolution.

/// A malformed board definition, detected while the platform is being built.
///
/// These are never recovered from: a board that fails to construct cannot be
/// used for any build.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// Two resources share the same `(name, index)` identity.
    #[error("duplicate resource {name}.{index}")]
    DuplicateResource {
        /// Resource name.
        name: String,
        /// Resource index.
        index: u32,
    },

    /// Two connectors share the same `(name, index)` identity.
    #[error("duplicate connector {name}_{index}")]
    DuplicateConnector {
        /// Connector name.
        name: String,
        /// Connector index.
        index: u32,
    },

    /// Two siblings in one subsignal group share a name.
    #[error("duplicate subsignal '{name}' in {path}")]
    DuplicateSubsignal {
        /// Path of the group containing the duplicate.
        path: String,
        /// The repeated subsignal name.
        name: String,
    },

    /// A pin descriptor lists no pins.
    #[error("{path} has no pins")]
    EmptyPins {
        /// Path of the offending node.
        path: String,
    },

    /// A subsignal group has no children.
    #[error("{path} has no subsignals")]
    EmptyGroup {
        /// Path of the offending node.
        path: String,
    },

    /// Positive and negative halves of a differential descriptor differ in length.
    #[error("differential pins of {path} are unbalanced: {positive} positive, {negative} negative")]
    DiffPairMismatch {
        /// Path of the offending node.
        path: String,
        /// Number of positive pins.
        positive: usize,
        /// Number of negative pins.
        negative: usize,
    },

    /// A clock was attached to a node that does not own pins directly.
    #[error("clock on {path} must be attached to a pin descriptor, not a group")]
    ClockOnGroup {
        /// Path of the offending node.
        path: String,
    },

    /// A resource factory was given a pin list of the wrong width.
    #[error("{path} expects {expected} pin(s), got {actual}")]
    WidthMismatch {
        /// Path of the offending node.
        path: String,
        /// Required number of pins.
        expected: usize,
        /// Number of pins supplied.
        actual: usize,
    },

    /// A resource factory was asked to assign the same index twice.
    #[error("index {index} of '{name}' is assigned more than once")]
    IndexCollision {
        /// Name of the resource family being expanded.
        name: String,
        /// The colliding index.
        index: u32,
    },

    /// The default clock does not name a resource of the platform.
    #[error("default clock '{0}' is not a resource of this platform")]
    UnknownDefaultClock(String),

    /// The default reset does not name a resource of the platform.
    #[error("default reset '{0}' is not a resource of this platform")]
    UnknownDefaultReset(String),

    /// A board parameter was given an unsupported value.
    #[error("invalid value '{value}' for setting {key} (expected one of: {expected})")]
    InvalidSetting {
        /// Setting name.
        key: String,
        /// The rejected value.
        value: String,
        /// Comma-separated list of accepted values.
        expected: String,
    },
}

/// A failure raised by a platform-bound attribute resolver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("resolver for {key} failed: {message}")]
pub struct ResolverError {
    /// The attribute key being resolved.
    pub key: String,
    /// The message returned by the resolver.
    pub message: String,
}

/// Why a pin name could not be turned into a package pin.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnresolvedReason {
    /// The name contains `:` but is not of the form `<connector>_<index>:<pin>`.
    #[error("malformed connector reference")]
    Malformed,

    /// No connector with this `<name>_<index>` exists.
    #[error("unknown connector {0}")]
    UnknownConnector(String),

    /// The connector exists but does not map this logical pin.
    #[error("connector {connector} has no pin '{pin}'")]
    UnknownConnectorPin {
        /// Connector id (`<name>_<index>`).
        connector: String,
        /// The missing logical pin.
        pin: String,
    },

    /// Following connector indirections revisited a reference.
    #[error("connector reference cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

/// Errors raised while resolving resources against a concrete platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// An attribute resolver failed.
    #[error("cannot resolve attributes of {path}: {source}")]
    Resolver {
        /// Path of the leaf whose attributes were being resolved.
        path: String,
        /// The underlying resolver failure.
        source: ResolverError,
    },

    /// A connector reference could not be resolved.
    #[error("pin '{pin}' of {path} is unresolved: {reason}")]
    UnresolvedPin {
        /// Path of the leaf owning the pin.
        path: String,
        /// The pin name as written in the definition.
        pin: String,
        /// What went wrong.
        reason: UnresolvedReason,
    },

    /// No resource with this identity exists on the platform.
    #[error("no resource {name}.{index} on this platform")]
    UnknownResource {
        /// Requested resource name.
        name: String,
        /// Requested resource index.
        index: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_duplicate_resource() {
        let err = DefinitionError::DuplicateResource {
            name: "led".to_string(),
            index: 3,
        };
        assert_eq!(format!("{err}"), "duplicate resource led.3");
    }

    #[test]
    fn display_cycle() {
        let reason = UnresolvedReason::Cycle(vec![
            "a_0:X".to_string(),
            "b_0:Y".to_string(),
            "a_0:X".to_string(),
        ]);
        assert_eq!(
            format!("{reason}"),
            "connector reference cycle: a_0:X -> b_0:Y -> a_0:X"
        );
    }

    #[test]
    fn display_unresolved_pin() {
        let err = ResolutionError::UnresolvedPin {
            path: "ext.0.io".to_string(),
            pin: "pmod_1:D0".to_string(),
            reason: UnresolvedReason::UnknownConnector("pmod_1".to_string()),
        };
        assert_eq!(
            format!("{err}"),
            "pin 'pmod_1:D0' of ext.0.io is unresolved: unknown connector pmod_1"
        );
    }

    #[test]
    fn display_invalid_setting() {
        let err = DefinitionError::InvalidSetting {
            key: "VCCIO1".to_string(),
            value: "1V8".to_string(),
            expected: "3V3, 2V5".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "invalid value '1V8' for setting VCCIO1 (expected one of: 3V3, 2V5)"
        );
    }
}
