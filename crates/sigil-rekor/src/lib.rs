//! Typed transparency log entry bodies
//!
//! The canonicalized body of a log entry is RFC 8785 JSON describing what
//! the log witnessed. This crate parses the supported (kind, version)
//! combinations into typed structures for comparison against the bundle.

pub mod body;
pub mod error;

pub use body::{
    DsseV001Body, EntryBody, HashValue, HashedRekordV001Body, IntotoV002Body,
};
pub use error::{Error, Result};
