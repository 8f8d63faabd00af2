//! Read/write permission lists

use std::fmt;

use thiserror::Error;

use super::lexer::{tokenize, ListToken};

/// Errors decoding a permission spec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    #[error("more than {max} principals in permission spec")]
    TooMany { max: usize },

    #[error("invalid principal '{token}' in permission spec")]
    InvalidPrincipal { token: String },
}

/// Decode a comma separated list of numeric principal identifiers, allowing at most `max`
pub fn parse_spec(text: &str, max: usize) -> Result<Vec<u32>, PermissionError> {
    let mut principals = Vec::new();
    for token in tokenize(text) {
        let id = match token {
            Ok(ListToken::Number(digits)) => digits.parse::<u32>().ok(),
            Ok(ListToken::Word(_)) | Err(_) => None,
        };
        let Some(id) = id else {
            return Err(PermissionError::InvalidPrincipal {
                token: token.map_or_else(str::to_string, |t| t.text().to_string()),
            });
        };
        if principals.len() == max {
            return Err(PermissionError::TooMany { max });
        }
        principals.push(id);
    }
    Ok(principals)
}

/// The principals allowed to read and write a variable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions {
    pub read: PrincipalList,
    pub write: PrincipalList,
}

/// An ordered list of principal identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrincipalList(pub Vec<u32>);

/// Renders the list back in spec form (`1000,1001`)
impl fmt::Display for PrincipalList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.0.iter().map(|id| id.to_string()).collect();
        f.write_str(&ids.join(","))
    }
}
