//! Render configuration.
//!
//! The attribute mode decides what a resource renders when the request carries no
//! sparse fieldset for its type. It is passed into every render through
//! [`RenderOptions`], so two renders running side by side never observe each
//! other's setting.

use std::fmt;
use std::str::FromStr;

/// Environment variable read by [`RenderOptions::from_env`].
pub const ATTRIBUTE_MODE_ENV: &str = "JSONAPI_ATTRIBUTE_MODE";

/// Attribute visibility when no `fields[type]` entry exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttributeMode {
    /// Render every declared attribute.
    #[default]
    Maximal,
    /// Render no attributes.
    Minimal,
}

impl fmt::Display for AttributeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeMode::Maximal => write!(f, "maximal"),
            AttributeMode::Minimal => write!(f, "minimal"),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown attribute mode `{0}`, expected `minimal` or `maximal`")]
    UnknownAttributeMode(String),
}

impl FromStr for AttributeMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "maximal" => Ok(AttributeMode::Maximal),
            "minimal" => Ok(AttributeMode::Minimal),
            _ => Err(ConfigError::UnknownAttributeMode(s.to_string())),
        }
    }
}

/// Options threaded through a single render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub attribute_mode: AttributeMode,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resources without a sparse fieldset render no attributes.
    pub fn enable_minimal(&mut self) -> &mut Self {
        self.attribute_mode = AttributeMode::Minimal;
        self
    }

    /// Resources without a sparse fieldset render every attribute.
    pub fn enable_maximal(&mut self) -> &mut Self {
        self.attribute_mode = AttributeMode::Maximal;
        self
    }

    pub fn minimal() -> Self {
        Self {
            attribute_mode: AttributeMode::Minimal,
        }
    }

    /// Reads [`ATTRIBUTE_MODE_ENV`]; an unset variable yields the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(ATTRIBUTE_MODE_ENV) {
            Ok(raw) => Ok(Self {
                attribute_mode: raw.parse()?,
            }),
            Err(_) => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_maximal() {
        assert_eq!(RenderOptions::default().attribute_mode, AttributeMode::Maximal);
    }

    #[test]
    fn test_toggle_modes() {
        let mut options = RenderOptions::new();
        options.enable_minimal();
        assert_eq!(options.attribute_mode, AttributeMode::Minimal);
        options.enable_maximal();
        assert_eq!(options.attribute_mode, AttributeMode::Maximal);
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("Minimal".parse::<AttributeMode>(), Ok(AttributeMode::Minimal));
        assert_eq!(" maximal ".parse::<AttributeMode>(), Ok(AttributeMode::Maximal));
        assert_eq!(
            "all".parse::<AttributeMode>(),
            Err(ConfigError::UnknownAttributeMode("all".into()))
        );
        assert_eq!(AttributeMode::Minimal.to_string(), "minimal");
    }
}
