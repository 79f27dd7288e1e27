//! Compiler configuration.

use serde::Deserialize;
use smol_str::SmolStr;
use thiserror::Error;

/// Scalar type names recognized when no configuration is supplied.
pub const DEFAULT_SCALAR_TYPES: &[&str] = &["String", "Boolean", "Integer", "Float", "Null"];

/// Errors that can occur while loading [`CompilerOptions`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The options document is not valid JSON or has the wrong shape.
    #[error("invalid compiler options: {0}")]
    Json(#[from] serde_json::Error),

    /// A scalar type name is empty or not an identifier.
    #[error("invalid scalar type name: {0:?}")]
    InvalidScalarType(String),
}

/// Options accepted by [`Compiler::new`](crate::compiler::Compiler::new).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Names usable as column types without a codelist declaration.
    pub scalar_types: Vec<SmolStr>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            scalar_types: DEFAULT_SCALAR_TYPES.iter().map(|&t| SmolStr::new(t)).collect(),
        }
    }
}

impl CompilerOptions {
    /// Load options from a JSON document such as `{"scalarTypes": ["String", "Date"]}`.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Replace the scalar type set.
    pub fn with_scalar_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.scalar_types = types.into_iter().map(SmolStr::new).collect();
        self
    }

    pub fn is_scalar_type(&self, name: &str) -> bool {
        self.scalar_types.iter().any(|t| t == name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for name in &self.scalar_types {
            let mut chars = name.chars();
            let valid_start = chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
            if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidScalarType(name.to_string()));
            }
        }
        Ok(())
    }
}
