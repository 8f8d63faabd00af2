//! In-process registry used by the CLI and tests

use std::collections::HashMap;
use std::fmt;

use super::{Registry, RegistryError, VarHandle, VarValue, Vocabulary};
use crate::builder::VarInfo;

/// A variable held by [`MemoryRegistry`]
#[derive(Debug, Clone)]
pub struct StoredVariable {
    pub handle: VarHandle,
    pub info: VarInfo,
    pub aliases: Vec<String>,
}

/// One line summary: handle, name, type, value, flags and aliases
impl fmt::Display for StoredVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.handle, self.info.name)?;
        match self.info.var_type {
            Some(ty) => write!(f, " ({ty})")?,
            None => f.write_str(" (untyped)")?,
        }
        if let Some(value) = &self.info.value {
            write!(f, " = {value:?}")?;
        }
        if !self.info.flags.is_empty() {
            write!(f, " [{}]", self.info.flags)?;
        }
        if !self.aliases.is_empty() {
            write!(f, " aliases: {}", self.aliases.join(", "))?;
        }
        Ok(())
    }
}

/// Registry keeping every variable in memory
///
/// Variable names and aliases share one namespace; handles are assigned
/// sequentially starting at 1.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    variables: Vec<StoredVariable>,
    names: HashMap<String, VarHandle>,
}

impl MemoryRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a variable by handle
    pub fn get(&self, handle: VarHandle) -> Option<&StoredVariable> {
        let index = usize::try_from(handle.0).ok()?.checked_sub(1)?;
        self.variables.get(index)
    }

    fn get_mut(&mut self, handle: VarHandle) -> Option<&mut StoredVariable> {
        let index = usize::try_from(handle.0).ok()?.checked_sub(1)?;
        self.variables.get_mut(index)
    }

    /// Get a variable by its name or one of its aliases
    pub fn lookup(&self, name: &str) -> Option<&StoredVariable> {
        self.names.get(name).and_then(|h| self.get(*h))
    }

    /// All variables in creation order
    pub fn variables(&self) -> impl Iterator<Item = &StoredVariable> {
        self.variables.iter()
    }

    /// Number of variables (aliases not counted)
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    fn claim_name(&mut self, name: &str, handle: VarHandle) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::InvalidName {
                name: name.to_string(),
            });
        }
        if self.names.contains_key(name) {
            return Err(RegistryError::AlreadyExists {
                name: name.to_string(),
            });
        }
        self.names.insert(name.to_string(), handle);
        Ok(())
    }
}

impl Vocabulary for MemoryRegistry {}

impl Registry for MemoryRegistry {
    fn create_variable(&mut self, info: &VarInfo) -> Result<VarHandle, RegistryError> {
        let next = u32::try_from(self.variables.len() + 1)
            .map_err(|_| RegistryError::Rejected("registry is full".to_string()))?;
        let handle = VarHandle(next);

        if let (Some(ty), Some(value)) = (info.var_type, &info.value) {
            if value.var_type() != ty {
                return Err(RegistryError::TypeMismatch {
                    expected: ty,
                    got: value.var_type(),
                });
            }
        }

        self.claim_name(&info.name, handle)?;

        let mut stored = info.clone();
        stored.handle = Some(handle);
        self.variables.push(StoredVariable {
            handle,
            info: stored,
            aliases: Vec::new(),
        });
        Ok(handle)
    }

    fn create_alias(&mut self, handle: VarHandle, alias: &str) -> Result<(), RegistryError> {
        if self.get(handle).is_none() {
            return Err(RegistryError::UnknownHandle { handle });
        }
        self.claim_name(alias, handle)?;
        if let Some(var) = self.get_mut(handle) {
            var.aliases.push(alias.to_string());
        }
        Ok(())
    }

    fn find_by_name(&self, name: &str) -> Option<VarHandle> {
        self.names.get(name).copied()
    }

    fn set_value(&mut self, handle: VarHandle, value: &VarValue) -> Result<(), RegistryError> {
        let var = self
            .get_mut(handle)
            .ok_or(RegistryError::UnknownHandle { handle })?;
        if let Some(expected) = var.info.var_type {
            if value.var_type() != expected {
                return Err(RegistryError::TypeMismatch {
                    expected,
                    got: value.var_type(),
                });
            }
        }
        var.info.value = Some(value.clone());
        Ok(())
    }
}
