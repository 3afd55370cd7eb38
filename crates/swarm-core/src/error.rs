//! Error types for Swarm

use thiserror::Error;

/// The main error type for Swarm operations
#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Component not found: {component} on entity {entity}")]
    ComponentNotFound { entity: String, component: String },

    #[error("Singleton not set: {0}")]
    SingletonNotFound(&'static str),

    #[error("Duplicate entity name: {0}")]
    DuplicateEntityName(String),

    #[error("Invalid particle count: {0} (must be between 1 and {max})", max = u32::MAX)]
    InvalidParticleCount(usize),

    #[error("Degenerate boundary: half extent on {axis} axis is {value}, must be positive and finite")]
    DegenerateBounds { axis: char, value: f32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Failed to allocate {what} for {count} particles")]
    Allocation {
        what: &'static str,
        count: usize,
        #[source]
        source: std::collections::TryReserveError,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

/// Result type alias for Swarm operations
pub type Result<T> = std::result::Result<T, SwarmError>;

impl From<toml::de::Error> for SwarmError {
    fn from(err: toml::de::Error) -> Self {
        SwarmError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for SwarmError {
    fn from(err: toml::ser::Error) -> Self {
        SwarmError::TomlSerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_error_names_the_limit() {
        let msg = SwarmError::InvalidParticleCount(0).to_string();
        assert!(msg.contains("0"));
        assert!(msg.contains(&u32::MAX.to_string()));
    }

    #[test]
    fn allocation_error_keeps_source() {
        let source = Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err();
        let err = SwarmError::Allocation {
            what: "transform buffer",
            count: 7,
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "Failed to allocate transform buffer for 7 particles");
    }

    #[test]
    fn toml_errors_convert() {
        let err: SwarmError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(matches!(err, SwarmError::TomlParseError(_)));
    }
}
