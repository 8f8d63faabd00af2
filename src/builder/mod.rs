//! Builds variable descriptors from JSON definitions
//!
//! A definition is a JSON object whose recognized keys are applied in a fixed
//! order (see [`Attribute::ALL`]). Keys match regardless of ASCII case;
//! unrecognized keys are ignored. After the
//! attributes, the run's [`CreateOptions`] are applied: global flags, string
//! capacity, instance id and name prefix.
//!
//! ```
//! use serde_json::json;
//! use varcreate::builder::build_descriptor;
//! use varcreate::registry::{MemoryRegistry, VarType};
//! use varcreate::CreateOptions;
//!
//! let def = json!({ "name": "/sys/test/a", "type": "uint16", "value": "42" });
//! let info = build_descriptor(&def, &CreateOptions::new(), &MemoryRegistry::new()).unwrap();
//! assert_eq!(info.var_type, Some(VarType::Uint16));
//! ```

mod alias;
mod attributes;
mod descriptor;

pub use alias::apply_aliases;
pub use attributes::Attribute;
pub use descriptor::VarInfo;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::VarCreateError;
use crate::options::CreateOptions;
use crate::outcome::Outcome;
use crate::registry::{VarValue, Vocabulary, MAX_NAME_LEN};

/// Build a descriptor from one JSON variable definition
///
/// Every present attribute is applied even after an earlier one fails; the
/// error returned is the last failure. The descriptor is only returned when
/// nothing failed and both `name` and `type` resolved.
pub fn build_descriptor(
    vardata: &Value,
    options: &CreateOptions,
    vocabulary: &dyn Vocabulary,
) -> Result<VarInfo, VarCreateError> {
    let object = vardata.as_object().ok_or_else(|| {
        VarCreateError::InvalidArgument("variable definition is not a JSON object".to_string())
    })?;

    let mut info = VarInfo::default();
    let mut outcome = Outcome::new();

    for attribute in Attribute::ALL {
        let Some(value) = find_key(object, attribute.key()) else {
            continue;
        };
        let result = attribute
            .apply(&mut info, value, vocabulary)
            .map_err(|kind| VarCreateError::attribute(attribute.key(), kind));
        if let Err(err) = &result {
            warn!(variable = %info.name, "{err}");
        }
        outcome.record(result);
    }

    for required in [Attribute::Name, Attribute::Type] {
        if find_key(object, required.key()).is_none() {
            outcome.fail(VarCreateError::InvalidArgument(format!(
                "missing required attribute '{}'",
                required.key()
            )));
        }
    }

    if let Err(err) = apply_options(&mut info, options) {
        warn!(variable = %info.name, "{err}");
        outcome.fail(err);
    }

    outcome.into_result()?;
    Ok(info)
}

/// Apply run-wide options to a descriptor whose attributes are already set
///
/// All adjustments are made even if one fails; the last failure is returned.
pub fn apply_options(info: &mut VarInfo, options: &CreateOptions) -> Result<(), VarCreateError> {
    let mut outcome = Outcome::new();

    info.flags |= options.flags;

    if info.var_type.is_some_and(|ty| ty.is_variable_length()) && info.length > 0 {
        // reserve the terminator
        match info.length.checked_add(1) {
            Some(capacity) => {
                info.length = capacity;
                if let Some(VarValue::Str(value)) = &info.value {
                    if value.len() >= capacity {
                        outcome.fail(VarCreateError::too_large(
                            format!("value of '{}'", info.name),
                            value.len(),
                            capacity - 1,
                        ));
                    }
                }
            }
            None => outcome.fail(VarCreateError::too_large(
                format!("declared length of '{}'", info.name),
                info.length,
                usize::MAX - 1,
            )),
        }
    }

    info.instance_id = options.instance_id;

    if let Some(prefix) = options.prefix.as_deref() {
        if !info.name.is_empty() {
            let prefixed = format!("{prefix}{}", info.name);
            if prefixed.len() > MAX_NAME_LEN {
                outcome.fail(VarCreateError::too_large(
                    format!("prefixed name '{prefixed}'"),
                    prefixed.len(),
                    MAX_NAME_LEN,
                ));
            } else {
                info.name = prefixed;
            }
        }
    }

    outcome.into_result().map(|_| ())
}

/// Look up a definition key, ignoring ASCII case
///
/// When several keys differ only in case, the first in map order wins.
pub(crate) fn find_key<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
        .map(|(_, value)| value)
}
