//! Typed value model shared with the variable registry

use std::fmt;

use base64::Engine;
use bitflags::bitflags;
use thiserror::Error;

use super::lexer::{tokenize, ListToken};

/// Opaque identifier assigned by the registry once a variable exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarHandle(pub u32);

impl fmt::Display for VarHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The storage type of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarType {
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float,
    Str,
    Bool,
    Blob,
}

impl VarType {
    pub const ALL: [VarType; 10] = [
        VarType::Int16,
        VarType::Uint16,
        VarType::Int32,
        VarType::Uint32,
        VarType::Int64,
        VarType::Uint64,
        VarType::Float,
        VarType::Str,
        VarType::Bool,
        VarType::Blob,
    ];

    /// Canonical type name as written in variable definition files
    pub fn name(&self) -> &'static str {
        match self {
            VarType::Int16 => "int16",
            VarType::Uint16 => "uint16",
            VarType::Int32 => "int32",
            VarType::Uint32 => "uint32",
            VarType::Int64 => "int64",
            VarType::Uint64 => "uint64",
            VarType::Float => "float",
            VarType::Str => "str",
            VarType::Bool => "bool",
            VarType::Blob => "blob",
        }
    }

    /// Resolve a type name. `string` is accepted as a synonym for `str`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "string" {
            return Some(VarType::Str);
        }
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Whether the type stores a variable amount of data bounded by a declared length
    pub fn is_variable_length(&self) -> bool {
        matches!(self, VarType::Str)
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed initial value
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Float(f32),
    Str(String),
    Bool(bool),
    Blob(Vec<u8>),
}

/// Reasons a textual value cannot be decoded for a type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("'{text}' is not a valid {ty}")]
    Invalid { ty: VarType, text: String },

    #[error("'{text}' is out of range for {ty}")]
    OutOfRange { ty: VarType, text: String },
}

impl VarValue {
    /// Decode the textual form of a value according to `ty`
    pub fn decode(text: &str, ty: VarType) -> Result<Self, ValueError> {
        let invalid = || ValueError::Invalid {
            ty,
            text: text.to_string(),
        };
        let out_of_range = || ValueError::OutOfRange {
            ty,
            text: text.to_string(),
        };

        match ty {
            VarType::Str => Ok(VarValue::Str(text.to_string())),
            VarType::Float => text
                .trim()
                .parse::<f32>()
                .map(VarValue::Float)
                .map_err(|_| invalid()),
            VarType::Bool => parse_bool(text).map(VarValue::Bool).ok_or_else(invalid),
            VarType::Blob => base64::engine::general_purpose::STANDARD
                .decode(text.trim())
                .map(VarValue::Blob)
                .map_err(|_| invalid()),
            VarType::Int16 | VarType::Int32 | VarType::Int64 => {
                let n = parse_signed(text).ok_or_else(invalid)?;
                match ty {
                    VarType::Int16 => i16::try_from(n).map(VarValue::Int16),
                    VarType::Int32 => i32::try_from(n).map(VarValue::Int32),
                    _ => i64::try_from(n).map(VarValue::Int64),
                }
                .map_err(|_| out_of_range())
            }
            VarType::Uint16 | VarType::Uint32 | VarType::Uint64 => {
                let n = parse_unsigned(text).ok_or_else(invalid)?;
                match ty {
                    VarType::Uint16 => u16::try_from(n).map(VarValue::Uint16),
                    VarType::Uint32 => u32::try_from(n).map(VarValue::Uint32),
                    _ => u64::try_from(n).map(VarValue::Uint64),
                }
                .map_err(|_| out_of_range())
            }
        }
    }

    /// The type this value belongs to
    pub fn var_type(&self) -> VarType {
        match self {
            VarValue::Int16(_) => VarType::Int16,
            VarValue::Uint16(_) => VarType::Uint16,
            VarValue::Int32(_) => VarType::Int32,
            VarValue::Uint32(_) => VarType::Uint32,
            VarValue::Int64(_) => VarType::Int64,
            VarValue::Uint64(_) => VarType::Uint64,
            VarValue::Float(_) => VarType::Float,
            VarValue::Str(_) => VarType::Str,
            VarValue::Bool(_) => VarType::Bool,
            VarValue::Blob(_) => VarType::Blob,
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Int16(v) => write!(f, "{v}"),
            VarValue::Uint16(v) => write!(f, "{v}"),
            VarValue::Int32(v) => write!(f, "{v}"),
            VarValue::Uint32(v) => write!(f, "{v}"),
            VarValue::Int64(v) => write!(f, "{v}"),
            VarValue::Uint64(v) => write!(f, "{v}"),
            VarValue::Float(v) => write!(f, "{v}"),
            VarValue::Str(s) => f.write_str(s),
            VarValue::Bool(b) => write!(f, "{b}"),
            VarValue::Blob(bytes) => {
                f.write_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
            }
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Split an optional `0x`/`0X` prefix, returning the digits and their radix
fn split_radix(text: &str) -> (&str, u32) {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (text, 10),
    }
}

fn parse_unsigned(text: &str) -> Option<u128> {
    let text = text.trim();
    let text = text.strip_prefix('+').unwrap_or(text);
    let (digits, radix) = split_radix(text);
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    u128::from_str_radix(digits, radix).ok()
}

fn parse_signed(text: &str) -> Option<i128> {
    let text = text.trim();
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = i128::try_from(parse_unsigned(rest)?).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parse the leading unsigned integer of `text` the way C's `strtoul` does:
/// leading whitespace is skipped, digits are consumed until the first
/// non-digit, no digits yields 0 and overflow saturates.
pub(crate) fn leading_unsigned(text: &str, radix: u32) -> u64 {
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    let text = if radix == 16 { split_radix(text).0 } else { text };

    text.chars()
        .map_while(|c| c.to_digit(radix))
        .try_fold(0u64, |acc, d| {
            acc.checked_mul(u64::from(radix))?.checked_add(u64::from(d))
        })
        .unwrap_or(u64::MAX)
}

bitflags! {
    /// Behavioral flags understood by the registry
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VarFlags: u32 {
        const VOLATILE = 1 << 0;
        const READONLY = 1 << 1;
        const HIDDEN = 1 << 2;
        const DIRTY = 1 << 3;
        const AUDIT = 1 << 4;
        const METRIC = 1 << 5;
        const PASSWORD = 1 << 6;
    }
}

/// A flag list containing a name the registry does not know
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown flag '{token}' (decoded so far: {partial})")]
pub struct FlagsError {
    /// The offending text
    pub token: String,
    /// Flags decoded before the offending token
    pub partial: VarFlags,
}

impl VarFlags {
    const NAMES: [(&'static str, VarFlags); 7] = [
        ("volatile", VarFlags::VOLATILE),
        ("readonly", VarFlags::READONLY),
        ("hidden", VarFlags::HIDDEN),
        ("dirty", VarFlags::DIRTY),
        ("audit", VarFlags::AUDIT),
        ("metric", VarFlags::METRIC),
        ("password", VarFlags::PASSWORD),
    ];

    /// Look up a single flag by name (case-insensitive)
    pub fn from_flag_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, flag)| *flag)
    }

    /// Decode a symbolic flag list such as `"volatile,readonly"`
    pub fn parse_list(text: &str) -> Result<Self, FlagsError> {
        let mut flags = VarFlags::empty();
        for token in tokenize(text) {
            let known = match token {
                Ok(ListToken::Word(name)) => Self::from_flag_name(name),
                Ok(ListToken::Number(_)) | Err(_) => None,
            };
            match known {
                Some(flag) => flags |= flag,
                None => {
                    return Err(FlagsError {
                        token: token.map_or_else(str::to_string, |t| t.text().to_string()),
                        partial: flags,
                    })
                }
            }
        }
        Ok(flags)
    }

    /// Names of the set flags in declaration order
    pub fn flag_names(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl fmt::Display for VarFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        f.write_str(&self.flag_names().join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        for ty in VarType::ALL {
            assert_eq!(VarType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(VarType::from_name("string"), Some(VarType::Str));
        assert_eq!(VarType::from_name("UINT16"), None);
        assert_eq!(VarType::from_name("quaternion"), None);
    }

    #[test]
    fn test_decode_integers() {
        assert_eq!(
            VarValue::decode("-42", VarType::Int16),
            Ok(VarValue::Int16(-42))
        );
        assert_eq!(
            VarValue::decode("0x1F", VarType::Uint32),
            Ok(VarValue::Uint32(31))
        );
        assert_eq!(
            VarValue::decode("18446744073709551615", VarType::Uint64),
            Ok(VarValue::Uint64(u64::MAX))
        );
    }

    #[test]
    fn test_decode_out_of_range() {
        assert!(matches!(
            VarValue::decode("70000", VarType::Uint16),
            Err(ValueError::OutOfRange { .. })
        ));
        assert!(matches!(
            VarValue::decode("-1", VarType::Uint32),
            Err(ValueError::Invalid { .. })
        ));
    }

    #[test]
    fn test_decode_other_types() {
        assert_eq!(
            VarValue::decode("2.5", VarType::Float),
            Ok(VarValue::Float(2.5))
        );
        assert_eq!(
            VarValue::decode("Yes", VarType::Bool),
            Ok(VarValue::Bool(true))
        );
        assert_eq!(
            VarValue::decode("AQID", VarType::Blob),
            Ok(VarValue::Blob(vec![1, 2, 3]))
        );
        assert_eq!(
            VarValue::decode(" padded ", VarType::Str),
            Ok(VarValue::Str(" padded ".to_string()))
        );
        assert!(VarValue::decode("maybe", VarType::Bool).is_err());
        assert!(VarValue::decode("abc", VarType::Int32).is_err());
    }

    #[test]
    fn test_leading_unsigned() {
        assert_eq!(leading_unsigned("1234", 10), 1234);
        assert_eq!(leading_unsigned("  12abc", 10), 12);
        assert_eq!(leading_unsigned("0x1f", 16), 31);
        assert_eq!(leading_unsigned("DEADbeef", 16), 0xDEAD_BEEF);
        assert_eq!(leading_unsigned("xyz", 16), 0);
        assert_eq!(leading_unsigned("", 10), 0);
        assert_eq!(leading_unsigned("99999999999999999999999", 10), u64::MAX);
    }

    #[test]
    fn test_parse_flag_list() {
        assert_eq!(
            VarFlags::parse_list("volatile, ReadOnly|hidden"),
            Ok(VarFlags::VOLATILE | VarFlags::READONLY | VarFlags::HIDDEN)
        );
        assert_eq!(VarFlags::parse_list(""), Ok(VarFlags::empty()));
    }

    #[test]
    fn test_unknown_flag_keeps_partial_mask() {
        let err = VarFlags::parse_list("volatile,sparkly,hidden").unwrap_err();
        assert_eq!(err.token, "sparkly");
        assert_eq!(err.partial, VarFlags::VOLATILE);
    }

    #[test]
    fn test_flags_display() {
        assert_eq!(VarFlags::empty().to_string(), "none");
        assert_eq!(
            (VarFlags::AUDIT | VarFlags::VOLATILE).to_string(),
            "volatile,audit"
        );
    }
}
