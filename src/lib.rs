//! varcreate - create registry variables from JSON definition files
//!
//! This library walks JSON documents describing named, typed variables,
//! converts each definition into a [`VarInfo`] descriptor and creates it
//! (plus any aliases) through a [`Registry`].
//!
//! # Example
//!
//! ```rust
//! use varcreate::{create_from_str, CreateOptions, MemoryRegistry};
//!
//! let mut registry = MemoryRegistry::new();
//! let outcome = create_from_str(
//!     &mut registry,
//!     r#"{ "vars": [ { "name": "/sys/test/a", "type": "uint16", "value": "42" } ] }"#,
//!     &CreateOptions::new(),
//! )
//! .unwrap();
//!
//! assert!(outcome.is_success());
//! assert!(registry.lookup("/sys/test/a").is_some());
//! ```

pub mod batch;
pub mod builder;
pub mod driver;
pub mod error;
pub mod options;
pub mod outcome;
pub mod registry;

pub use batch::{create_from_dir, create_from_file, create_from_str, MAX_DOCUMENT_SIZE};
pub use builder::{build_descriptor, VarInfo};
pub use driver::create_from_value;
pub use error::{AttributeErrorKind, ErrorKind, VarCreateError};
pub use options::{CreateOptions, OptionsError};
pub use outcome::Outcome;
pub use registry::{MemoryRegistry, Registry, VarFlags, VarHandle, VarType, VarValue, Vocabulary};

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "description": "test variables",
        "vars": [
            {
                "name": "/sys/test/a",
                "type": "uint16",
                "value": "42",
                "flags": "volatile",
                "alias": ["/a", "/test/a"]
            },
            {
                "name": "/sys/test/b",
                "type": "str",
                "length": "16",
                "value": "hello"
            }
        ]
    }"#;

    #[test]
    fn test_create_document() {
        let mut registry = MemoryRegistry::new();
        let outcome = create_from_str(&mut registry, DOCUMENT, &CreateOptions::new()).unwrap();
        assert_eq!(outcome.succeeded(), 2);
        assert_eq!(registry.len(), 2);

        let a = registry.lookup("/a").unwrap();
        assert_eq!(a.info.name, "/sys/test/a");
        assert_eq!(a.aliases, vec!["/a", "/test/a"]);
        assert_eq!(a.info.flags, VarFlags::VOLATILE);

        let b = registry.lookup("/sys/test/b").unwrap();
        assert_eq!(b.info.length, 17);
    }

    #[test]
    fn test_create_document_with_options() {
        let mut registry = MemoryRegistry::new();
        let options = CreateOptions::new()
            .with_prefix("/node7")
            .with_instance_id(7)
            .with_flags(VarFlags::AUDIT);
        create_from_str(&mut registry, DOCUMENT, &options)
            .unwrap()
            .into_result()
            .unwrap();

        let a = registry.lookup("/node7/sys/test/a").unwrap();
        assert_eq!(a.info.instance_id, 7);
        assert_eq!(a.info.flags, VarFlags::VOLATILE | VarFlags::AUDIT);
        // aliases are not prefixed
        assert!(registry.lookup("/a").is_some());
    }

    #[test]
    fn test_second_run_reports_creation_failures() {
        let mut registry = MemoryRegistry::new();
        create_from_str(&mut registry, DOCUMENT, &CreateOptions::new()).unwrap();
        let outcome = create_from_str(&mut registry, DOCUMENT, &CreateOptions::new()).unwrap();
        assert_eq!(outcome.failed(), 2);
        assert_eq!(
            outcome.last_error().map(VarCreateError::kind),
            Some(ErrorKind::CreationFailed)
        );
    }
}
