//! Alias fan-out for a created variable

use serde_json::Value;
use tracing::warn;

use super::VarInfo;
use crate::error::{AttributeErrorKind, VarCreateError};
use crate::outcome::Outcome;
use crate::registry::Registry;

/// Bind every alias named by `aliases` (a string or an array of strings) to
/// the created variable `info`.
///
/// Every alias is attempted; the returned error is the last failure observed.
/// Aliases that were bound stay bound when a later one fails. On success the
/// number of aliases bound is returned.
pub fn apply_aliases<R: Registry + ?Sized>(
    registry: &mut R,
    info: &VarInfo,
    aliases: &Value,
) -> Result<usize, VarCreateError> {
    let Some(handle) = info.handle else {
        return Err(VarCreateError::InvalidArgument(format!(
            "cannot alias '{}' before it is created",
            info.name
        )));
    };

    let entries: Vec<&Value> = match aliases {
        Value::String(_) => vec![aliases],
        Value::Array(items) => items.iter().collect(),
        _ => {
            return Err(VarCreateError::attribute(
                "alias",
                AttributeErrorKind::NotAString,
            ))
        }
    };

    let mut outcome = Outcome::new();
    for entry in entries {
        let result = alias_name(entry).and_then(|alias| {
            registry
                .create_alias(handle, alias)
                .map_err(|source| VarCreateError::AliasFailed {
                    name: info.name.clone(),
                    alias: alias.to_string(),
                    source,
                })
        });
        if let Err(err) = &result {
            warn!(variable = %info.name, "{err}");
        }
        outcome.record(result);
    }
    outcome.into_result()
}

fn alias_name(entry: &Value) -> Result<&str, VarCreateError> {
    match entry.as_str() {
        Some("") => Err(VarCreateError::attribute("alias", AttributeErrorKind::Empty)),
        Some(name) => Ok(name),
        None => Err(VarCreateError::attribute(
            "alias",
            AttributeErrorKind::NotAString,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::registry::{MemoryRegistry, VarType};
    use serde_json::json;

    fn created(registry: &mut MemoryRegistry, name: &str) -> VarInfo {
        let mut info = VarInfo {
            name: name.to_string(),
            var_type: Some(VarType::Uint32),
            ..VarInfo::default()
        };
        info.handle = Some(registry.create_variable(&info).unwrap());
        info
    }

    #[test]
    fn test_single_alias() {
        let mut registry = MemoryRegistry::new();
        let info = created(&mut registry, "/sys/uptime");
        assert_eq!(apply_aliases(&mut registry, &info, &json!("/uptime")).unwrap(), 1);
        assert_eq!(registry.find_by_name("/uptime"), info.handle);
    }

    #[test]
    fn test_requires_handle() {
        let mut registry = MemoryRegistry::new();
        let info = VarInfo {
            name: "/sys/x".to_string(),
            ..VarInfo::default()
        };
        let err = apply_aliases(&mut registry, &info, &json!("/x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(registry.find_by_name("/x").is_none());
    }

    #[test]
    fn test_failure_does_not_stop_later_aliases() {
        let mut registry = MemoryRegistry::new();
        created(&mut registry, "a");
        let info = created(&mut registry, "/sys/primary");

        let err = apply_aliases(&mut registry, &info, &json!(["a", "b"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AliasFailed);
        assert_eq!(registry.find_by_name("b"), info.handle);
        assert!(registry.find_by_name("/sys/primary").is_some());
    }

    #[test]
    fn test_last_failure_is_reported() {
        let mut registry = MemoryRegistry::new();
        let info = created(&mut registry, "/sys/primary");

        let err = apply_aliases(&mut registry, &info, &json!(["/sys/primary", "ok", 7])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(registry.find_by_name("ok"), info.handle);
    }

    #[test]
    fn test_invalid_alias_shape() {
        let mut registry = MemoryRegistry::new();
        let info = created(&mut registry, "/sys/primary");
        assert!(apply_aliases(&mut registry, &info, &json!({"name": "x"})).is_err());
        assert!(apply_aliases(&mut registry, &info, &json!([""])).is_err());
        assert_eq!(apply_aliases(&mut registry, &info, &json!([])).unwrap(), 0);
    }
}
