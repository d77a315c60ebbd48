//! Office Open XML (OOXML) support.
//!
//! The unified `style`/`element`/`meta` layers read OOXML parts directly off
//! a [`crate::storage::Storage`] the same way they read ODF parts:
//! `word/document.xml`, `styles.xml` and friends are opened straight out of
//! the archive through [`crate::xml::Element`]. What remains here is the
//! machinery those layers cannot get from `Storage` alone:
//!
//! - `opc`: Open Packaging Conventions parts/relationships/content-types,
//!   needed to resolve `r:id` references (drawings, embedded images).
//! - `crypto` (`ooxml_encryption` feature): Standard2007/Agile encryption,
//!   the OOXML/CFB branch of the crypto unwrap layer.
pub mod error;
pub mod opc;

#[cfg(feature = "ooxml_encryption")]
pub mod crypto;

// Re-export commonly used types from the OPC layer.
pub use opc::{OpcPackage, PackURI};

// Re-export error types.
pub use error::{OoxmlError, Result};
