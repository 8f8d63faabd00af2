//! In-memory description of one variable before it is submitted

use crate::registry::{Permissions, VarFlags, VarHandle, VarType, VarValue};

/// Everything the registry needs to create one variable
///
/// A descriptor starts zeroed, is filled attribute by attribute from a JSON
/// object, adjusted by the run's [`crate::CreateOptions`], and submitted once.
/// `handle` is only set once the registry has created the variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarInfo {
    /// Hierarchical variable name
    pub name: String,
    /// Alternate display name
    pub short_name: Option<String>,
    /// 32-bit identifier, parsed from hex
    pub guid: u32,
    pub var_type: Option<VarType>,
    /// Initial value, decoded according to `var_type`
    pub value: Option<VarValue>,
    /// Byte capacity for variable-length types (includes the terminator once built)
    pub length: usize,
    pub format_spec: String,
    pub tag_spec: String,
    pub flags: VarFlags,
    pub permissions: Permissions,
    pub instance_id: u32,
    pub handle: Option<VarHandle>,
}

impl VarInfo {
    /// Whether the registry has accepted this variable
    pub fn is_created(&self) -> bool {
        self.handle.is_some()
    }
}
