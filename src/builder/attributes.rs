//! Per-attribute coercion of JSON values into descriptor fields

use serde_json::Value;

use super::VarInfo;
use crate::error::AttributeErrorKind;
use crate::registry::{
    leading_unsigned, PrincipalList, VarType, VarValue, Vocabulary, MAX_FORMATSPEC_LEN,
    MAX_NAME_LEN, MAX_SHORTNAME_LEN, MAX_TAGSPEC_LEN, MAX_UIDS,
};

/// A recognized attribute of a variable definition
///
/// `alias` is not listed here: it can only be applied once the variable
/// exists, see [`super::apply_aliases`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Name,
    Guid,
    Type,
    Format,
    Length,
    Value,
    Tags,
    Flags,
    Description,
    ShortName,
    Read,
    Write,
}

impl Attribute {
    /// Processing order. `type` must precede `value`.
    pub const ALL: [Attribute; 12] = [
        Attribute::Name,
        Attribute::Guid,
        Attribute::Type,
        Attribute::Format,
        Attribute::Length,
        Attribute::Value,
        Attribute::Tags,
        Attribute::Flags,
        Attribute::Description,
        Attribute::ShortName,
        Attribute::Read,
        Attribute::Write,
    ];

    /// The JSON key of the attribute
    pub fn key(&self) -> &'static str {
        match self {
            Attribute::Name => "name",
            Attribute::Guid => "guid",
            Attribute::Type => "type",
            Attribute::Format => "fmt",
            Attribute::Length => "length",
            Attribute::Value => "value",
            Attribute::Tags => "tags",
            Attribute::Flags => "flags",
            Attribute::Description => "description",
            Attribute::ShortName => "shortname",
            Attribute::Read => "read",
            Attribute::Write => "write",
        }
    }

    /// Coerce `value` into the descriptor field this attribute controls
    pub fn apply(
        &self,
        info: &mut VarInfo,
        value: &Value,
        vocabulary: &dyn Vocabulary,
    ) -> Result<(), AttributeErrorKind> {
        let text = as_text(value)?;
        match self {
            Attribute::Name => coerce_name(info, text),
            Attribute::Guid => coerce_guid(info, text),
            Attribute::Type => coerce_type(info, text, vocabulary),
            Attribute::Format => {
                info.format_spec = bounded_below(text, MAX_FORMATSPEC_LEN)?.to_string();
                Ok(())
            }
            Attribute::Length => coerce_length(info, text),
            Attribute::Value => coerce_value(info, text),
            Attribute::Tags => {
                info.tag_spec = bounded_below(text, MAX_TAGSPEC_LEN)?.to_string();
                Ok(())
            }
            Attribute::Flags => coerce_flags(info, text, vocabulary),
            Attribute::Description => non_empty(text).map(|_| ()),
            Attribute::ShortName => {
                let short = non_empty(text)?;
                check_len(short, MAX_SHORTNAME_LEN)?;
                info.short_name = Some(short.to_string());
                Ok(())
            }
            Attribute::Read => {
                let ids = vocabulary.parse_permission_spec(text, MAX_UIDS)?;
                info.permissions.read = PrincipalList(ids);
                Ok(())
            }
            Attribute::Write => {
                let ids = vocabulary.parse_permission_spec(text, MAX_UIDS)?;
                info.permissions.write = PrincipalList(ids);
                Ok(())
            }
        }
    }
}

fn as_text(value: &Value) -> Result<&str, AttributeErrorKind> {
    value.as_str().ok_or(AttributeErrorKind::NotAString)
}

fn non_empty(text: &str) -> Result<&str, AttributeErrorKind> {
    if text.is_empty() {
        Err(AttributeErrorKind::Empty)
    } else {
        Ok(text)
    }
}

/// Length must be at most `max` bytes
fn check_len(text: &str, max: usize) -> Result<(), AttributeErrorKind> {
    if text.len() > max {
        return Err(AttributeErrorKind::TooLarge {
            len: text.len(),
            max,
        });
    }
    Ok(())
}

/// Length must be strictly below `limit` bytes (room for a terminator)
fn bounded_below(text: &str, limit: usize) -> Result<&str, AttributeErrorKind> {
    check_len(text, limit - 1)?;
    Ok(text)
}

fn coerce_name(info: &mut VarInfo, text: &str) -> Result<(), AttributeErrorKind> {
    check_len(non_empty(text)?, MAX_NAME_LEN)?;
    info.name = text.to_string();
    Ok(())
}

/// Non-hex text yields 0 rather than an error
fn coerce_guid(info: &mut VarInfo, text: &str) -> Result<(), AttributeErrorKind> {
    info.guid = u32::try_from(leading_unsigned(text, 16)).unwrap_or(u32::MAX);
    Ok(())
}

fn coerce_type(
    info: &mut VarInfo,
    text: &str,
    vocabulary: &dyn Vocabulary,
) -> Result<(), AttributeErrorKind> {
    let ty = vocabulary
        .type_from_name(text)
        .ok_or_else(|| AttributeErrorKind::UnknownType(text.to_string()))?;
    info.var_type = Some(ty);
    Ok(())
}

/// `0x`/`0X` selects hex, anything else is decimal
fn coerce_length(info: &mut VarInfo, text: &str) -> Result<(), AttributeErrorKind> {
    let radix = if text.starts_with("0x") || text.starts_with("0X") {
        16
    } else {
        10
    };
    info.length = usize::try_from(leading_unsigned(text, radix)).unwrap_or(usize::MAX);
    Ok(())
}

fn coerce_value(info: &mut VarInfo, text: &str) -> Result<(), AttributeErrorKind> {
    let value = match info.var_type {
        None => return Err(AttributeErrorKind::UntypedValue),
        Some(VarType::Str) => VarValue::Str(text.to_string()),
        Some(ty) => VarValue::decode(text, ty)?,
    };
    info.value = Some(value);
    Ok(())
}

/// On failure the flags decoded before the bad token are kept on the descriptor
fn coerce_flags(
    info: &mut VarInfo,
    text: &str,
    vocabulary: &dyn Vocabulary,
) -> Result<(), AttributeErrorKind> {
    match vocabulary.parse_flags(text) {
        Ok(flags) => {
            info.flags = flags;
            Ok(())
        }
        Err(err) => {
            info.flags = err.partial;
            Err(err.into())
        }
    }
}
