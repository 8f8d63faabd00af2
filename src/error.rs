//! Error types for building and creating variables

use std::fmt;
use std::io;
use std::path::PathBuf;

use ariadne::{Config, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::registry::{FlagsError, PermissionError, RegistryError, ValueError};

/// Coarse classification of every failure this crate reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    TooLarge,
    Unsupported,
    NotFound,
    IoFailure,
    MalformedDocument,
    CreationFailed,
    AliasFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidArgument => "invalid-argument",
            ErrorKind::TooLarge => "too-large",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::NotFound => "not-found",
            ErrorKind::IoFailure => "io-failure",
            ErrorKind::MalformedDocument => "malformed-document",
            ErrorKind::CreationFailed => "creation-failed",
            ErrorKind::AliasFailed => "alias-failed",
        };
        f.write_str(s)
    }
}

/// Why a single attribute value was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeErrorKind {
    #[error("expected a string")]
    NotAString,

    #[error("must not be empty")]
    Empty,

    #[error("{len} bytes exceeds the limit of {max}")]
    TooLarge { len: usize, max: usize },

    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("value given before any type was resolved")]
    UntypedValue,

    #[error("unsupported value: {0}")]
    Value(#[from] ValueError),

    #[error(transparent)]
    Flags(#[from] FlagsError),

    #[error(transparent)]
    Permissions(#[from] PermissionError),
}

impl AttributeErrorKind {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAString | Self::Empty | Self::Flags(_) => ErrorKind::InvalidArgument,
            Self::TooLarge { .. } => ErrorKind::TooLarge,
            Self::UnknownType(_) | Self::UntypedValue | Self::Value(_) => ErrorKind::Unsupported,
            Self::Permissions(PermissionError::TooMany { .. }) => ErrorKind::TooLarge,
            Self::Permissions(PermissionError::InvalidPrincipal { .. }) => {
                ErrorKind::InvalidArgument
            }
        }
    }
}

/// Errors that can occur while creating variables from definition documents
#[derive(Debug, Error)]
pub enum VarCreateError {
    /// Missing or malformed structural input
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A bounded quantity was exceeded
    #[error("{what} is too large ({len} > {max})")]
    TooLarge {
        what: String,
        len: usize,
        max: usize,
    },

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("'{}' not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("I/O failure on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document is not valid JSON
    #[error("malformed document at line {line}, column {column}: {message}")]
    MalformedDocument {
        line: usize,
        column: usize,
        /// Byte offset of the error in the source text
        offset: usize,
        message: String,
    },

    /// One attribute of a variable definition was rejected
    #[error("attribute '{attribute}': {kind}")]
    Attribute {
        attribute: &'static str,
        kind: AttributeErrorKind,
    },

    #[error("failed to create variable '{name}': {source}")]
    CreationFailed {
        name: String,
        #[source]
        source: RegistryError,
    },

    #[error("failed to alias '{name}' as '{alias}': {source}")]
    AliasFailed {
        name: String,
        alias: String,
        #[source]
        source: RegistryError,
    },
}

impl VarCreateError {
    /// Create an attribute error
    pub fn attribute(attribute: &'static str, kind: impl Into<AttributeErrorKind>) -> Self {
        Self::Attribute {
            attribute,
            kind: kind.into(),
        }
    }

    /// Create a too-large error
    pub fn too_large(what: impl Into<String>, len: usize, max: usize) -> Self {
        Self::TooLarge {
            what: what.into(),
            len,
            max,
        }
    }

    /// Create a malformed document error from a JSON parse failure
    pub fn malformed(source: &str, err: &serde_json::Error) -> Self {
        let (line, column) = (err.line(), err.column());
        Self::MalformedDocument {
            line,
            column,
            offset: byte_offset(source, line, column),
            message: strip_position(&err.to_string()),
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::TooLarge { .. } => ErrorKind::TooLarge,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Io { .. } => ErrorKind::IoFailure,
            Self::MalformedDocument { .. } => ErrorKind::MalformedDocument,
            Self::Attribute { kind, .. } => kind.kind(),
            Self::CreationFailed { .. } => ErrorKind::CreationFailed,
            Self::AliasFailed { .. } => ErrorKind::AliasFailed,
        }
    }

    /// Format the error with source context using ariadne
    ///
    /// Only malformed documents carry a position; every other error renders
    /// as its plain message.
    pub fn report(&self, source: &str, filename: &str) -> String {
        let Self::MalformedDocument {
            offset, message, ..
        } = self
        else {
            return self.to_string();
        };

        let Some(prefix) = source.get(..*offset) else {
            return self.to_string();
        };
        let start = prefix.chars().count();
        let end = start + usize::from(*offset < source.len());
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, start)
            .with_config(Config::default().with_color(false))
            .with_message("malformed document")
            .with_label(Label::new((filename, start..end)).with_message(message))
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// Convert a 1-based line/column into a byte offset, clamped to a char boundary
fn byte_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let mut offset = (line_start + column.saturating_sub(1)).min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// serde_json appends " at line X column Y" to its messages
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}
