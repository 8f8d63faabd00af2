//! Submits built descriptors to the registry
//!
//! One definition moves through these states, never backwards:
//! parsed -> attributes applied -> created -> aliases applied, or
//! parsed -> attributes applied -> creation failed.

use serde_json::Value;
use tracing::{info, warn};

use crate::builder::{apply_aliases, build_descriptor, find_key, VarInfo};
use crate::error::VarCreateError;
use crate::options::CreateOptions;
use crate::registry::{Registry, RegistryError};

/// Build and create the variable described by one JSON definition,
/// then bind its aliases
pub fn create_from_value<R: Registry>(
    registry: &mut R,
    vardata: &Value,
    options: &CreateOptions,
) -> Result<VarInfo, VarCreateError> {
    let info = build_descriptor(vardata, options, &*registry)?;
    let aliases = vardata.as_object().and_then(|object| find_key(object, "alias"));
    create_variable(registry, info, aliases, options)
}

/// Create a built descriptor and, once it has a handle, bind `aliases`
///
/// Alias failures are reported but the variable itself stays created.
/// When creation is refused and `force_default` is set, the initial value is
/// written into the variable that already holds the name instead.
pub fn create_variable<R: Registry + ?Sized>(
    registry: &mut R,
    mut info: VarInfo,
    aliases: Option<&Value>,
    options: &CreateOptions,
) -> Result<VarInfo, VarCreateError> {
    if options.verbose {
        info!(variable = %info.name, instance = info.instance_id, "creating variable");
    }

    match registry.create_variable(&info) {
        Ok(handle) => {
            info.handle = Some(handle);
            if let Some(aliases) = aliases {
                apply_aliases(registry, &info, aliases)?;
            }
            Ok(info)
        }
        Err(source) => {
            warn!(variable = %info.name, "failed to create variable: {source}");
            if options.force_default {
                force_default(registry, &info, source)?;
                return Ok(info);
            }
            Err(VarCreateError::CreationFailed {
                name: info.name,
                source,
            })
        }
    }
}

/// Overwrite the value of the existing variable named like `info`
fn force_default<R: Registry + ?Sized>(
    registry: &mut R,
    info: &VarInfo,
    creation_error: RegistryError,
) -> Result<(), VarCreateError> {
    let creation_failed = |source| VarCreateError::CreationFailed {
        name: info.name.clone(),
        source,
    };

    let (Some(handle), Some(value)) = (registry.find_by_name(&info.name), &info.value) else {
        return Err(creation_failed(creation_error));
    };

    registry.set_value(handle, value).map_err(|source| {
        warn!(variable = %info.name, "failed to set default value for existing variable: {source}");
        creation_failed(source)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::registry::{MemoryRegistry, VarHandle, VarValue};
    use serde_json::json;

    #[test]
    fn test_create_sets_handle() {
        let mut registry = MemoryRegistry::new();
        let info = create_from_value(
            &mut registry,
            &json!({"name": "/sys/a", "type": "uint16", "value": "5"}),
            &CreateOptions::new(),
        )
        .unwrap();
        assert_eq!(info.handle, Some(VarHandle(1)));
        assert!(info.is_created());
        assert_eq!(
            registry.lookup("/sys/a").unwrap().info.value,
            Some(VarValue::Uint16(5))
        );
    }

    #[test]
    fn test_build_failure_never_reaches_registry() {
        let mut registry = MemoryRegistry::new();
        let err = create_from_value(
            &mut registry,
            &json!({"name": "/sys/a", "type": "uint16", "value": "lots"}),
            &CreateOptions::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_creation_failure_names_variable() {
        let mut registry = MemoryRegistry::new();
        let def = json!({"name": "/sys/a", "type": "uint16"});
        create_from_value(&mut registry, &def, &CreateOptions::new()).unwrap();

        let err = create_from_value(&mut registry, &def, &CreateOptions::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CreationFailed);
        assert!(err.to_string().contains("/sys/a"));
    }

    #[test]
    fn test_aliases_not_attempted_when_creation_fails() {
        let mut registry = MemoryRegistry::new();
        create_from_value(
            &mut registry,
            &json!({"name": "/sys/a", "type": "uint16"}),
            &CreateOptions::new(),
        )
        .unwrap();

        let result = create_from_value(
            &mut registry,
            &json!({"name": "/sys/a", "type": "uint16", "alias": "/a"}),
            &CreateOptions::new(),
        );
        assert!(result.is_err());
        assert!(registry.find_by_name("/a").is_none());
    }

    #[test]
    fn test_alias_failure_keeps_variable() {
        let mut registry = MemoryRegistry::new();
        let err = create_from_value(
            &mut registry,
            &json!({"name": "/sys/a", "type": "uint16", "alias": "/sys/a"}),
            &CreateOptions::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AliasFailed);
        assert!(registry.lookup("/sys/a").is_some());
    }

    #[test]
    fn test_alias_key_ignores_case() {
        let mut registry = MemoryRegistry::new();
        let info = create_from_value(
            &mut registry,
            &json!({"NAME": "/sys/a", "Type": "uint16", "Alias": ["/a", "/b"]}),
            &CreateOptions::new(),
        )
        .unwrap();
        assert_eq!(registry.find_by_name("/a"), info.handle);
        assert_eq!(registry.find_by_name("/b"), info.handle);
    }

    #[test]
    fn test_force_default_overwrites_existing_value() {
        let mut registry = MemoryRegistry::new();
        create_from_value(
            &mut registry,
            &json!({"name": "/sys/a", "type": "uint16", "value": "1"}),
            &CreateOptions::new(),
        )
        .unwrap();

        let options = CreateOptions::new().with_force_default(true);
        let info = create_from_value(
            &mut registry,
            &json!({"name": "/sys/a", "type": "uint16", "value": "2"}),
            &options,
        )
        .unwrap();
        assert!(!info.is_created());
        assert_eq!(
            registry.lookup("/sys/a").unwrap().info.value,
            Some(VarValue::Uint16(2))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_force_default_without_value_still_fails() {
        let mut registry = MemoryRegistry::new();
        let def = json!({"name": "/sys/a", "type": "uint16"});
        create_from_value(&mut registry, &def, &CreateOptions::new()).unwrap();

        let options = CreateOptions::new().with_force_default(true);
        let err = create_from_value(&mut registry, &def, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CreationFailed);
    }
}
