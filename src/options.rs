//! Run-wide options applied to every variable created
//!
//! Options can be assembled with the builder methods or loaded from a TOML
//! file:
//!
//! ```toml
//! prefix = "/device1"
//! instance_id = 2
//! flags = "volatile,audit"
//! verbose = true
//! force_default = false
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::registry::{FlagsError, VarFlags};

/// Errors that can occur when loading an options file
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("Failed to read options file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse options TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid global flags: {0}")]
    FlagsError(#[from] FlagsError),
}

/// Options applied to every variable of a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateOptions {
    /// Prepended to every variable name
    pub prefix: Option<String>,
    /// Instance discriminator stamped on every variable
    pub instance_id: u32,
    /// Unioned into every variable's flags
    pub flags: VarFlags,
    /// Emit progress diagnostics
    pub verbose: bool,
    /// Overwrite the value of variables that already exist
    pub force_default: bool,
}

/// TOML structure for deserializing options
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlOptions {
    prefix: Option<String>,
    instance_id: Option<u32>,
    flags: Option<String>,
    verbose: Option<bool>,
    force_default: Option<bool>,
}

impl CreateOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Load options from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, OptionsError> {
        let parsed: TomlOptions = toml::from_str(content)?;
        let flags = match parsed.flags {
            Some(text) => VarFlags::parse_list(&text)?,
            None => VarFlags::empty(),
        };

        Ok(CreateOptions {
            prefix: parsed.prefix.filter(|p| !p.is_empty()),
            instance_id: parsed.instance_id.unwrap_or(0),
            flags,
            verbose: parsed.verbose.unwrap_or(false),
            force_default: parsed.force_default.unwrap_or(false),
        })
    }

    /// Set the variable name prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    /// Set the instance identifier
    pub fn with_instance_id(mut self, instance_id: u32) -> Self {
        self.instance_id = instance_id;
        self
    }

    /// Set the global flags
    pub fn with_flags(mut self, flags: VarFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Enable or disable progress diagnostics
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enable or disable overwriting values of existing variables
    pub fn with_force_default(mut self, force_default: bool) -> Self {
        self.force_default = force_default;
        self
    }
}
