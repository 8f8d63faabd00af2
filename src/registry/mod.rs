//! Interface to the external variable registry
//!
//! The registry owns storage, permission enforcement and notification for
//! every variable. This crate only needs a narrow slice of it: creating a
//! variable from a descriptor, binding aliases to a created variable, and the
//! registry's own vocabulary for type names, flag names and permission specs.

mod lexer;
mod memory;
mod permissions;
mod types;

pub use memory::{MemoryRegistry, StoredVariable};
pub use permissions::{parse_spec, PermissionError, Permissions, PrincipalList};
pub use types::{FlagsError, ValueError, VarFlags, VarHandle, VarType, VarValue};

pub(crate) use types::leading_unsigned;

use thiserror::Error;

use crate::builder::VarInfo;

/// Maximum length of a variable name in bytes
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length of a short name in bytes
pub const MAX_SHORTNAME_LEN: usize = 64;

/// Format specifiers must be strictly shorter than this
pub const MAX_FORMATSPEC_LEN: usize = 64;

/// Tag specs must be strictly shorter than this
pub const MAX_TAGSPEC_LEN: usize = 256;

/// Maximum number of principals in a read or write permission list
pub const MAX_UIDS: usize = 8;

/// Errors reported by the registry itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("'{name}' already exists")]
    AlreadyExists { name: String },

    #[error("no variable with handle {handle}")]
    UnknownHandle { handle: VarHandle },

    #[error("invalid variable name '{name}'")]
    InvalidName { name: String },

    #[error("value type {got} does not match variable type {expected}")]
    TypeMismatch { expected: VarType, got: VarType },

    #[error("{0}")]
    Rejected(String),
}

/// Name lookups the registry defines: type names, flag names and permission specs
pub trait Vocabulary {
    /// Resolve a type name
    fn type_from_name(&self, name: &str) -> Option<VarType> {
        VarType::from_name(name)
    }

    /// Decode a symbolic flag list into a mask
    fn parse_flags(&self, text: &str) -> Result<VarFlags, FlagsError> {
        VarFlags::parse_list(text)
    }

    /// Decode a permission spec into at most `max` principals
    fn parse_permission_spec(&self, text: &str, max: usize) -> Result<Vec<u32>, PermissionError> {
        parse_spec(text, max)
    }
}

/// The operations the builder drives against the registry
pub trait Registry: Vocabulary {
    /// Create a variable, returning its handle
    fn create_variable(&mut self, info: &VarInfo) -> Result<VarHandle, RegistryError>;

    /// Bind an additional name to an existing variable
    fn create_alias(&mut self, handle: VarHandle, alias: &str) -> Result<(), RegistryError>;

    /// Look up a variable (or alias) by name
    fn find_by_name(&self, name: &str) -> Option<VarHandle>;

    /// Overwrite the value of an existing variable
    fn set_value(&mut self, handle: VarHandle, value: &VarValue) -> Result<(), RegistryError>;
}
