//! compodoc - a unified reader for compound office documents.
//!
//! This crate ingests ODF (OpenDocument) and OOXML (Office Open XML) files
//! from either a ZIP or a Compound File Binary (CFB/OLE2) container, and
//! exposes a traversable, partially editable in-memory document model with
//! resolvable styles.
//!
//! # Layers
//!
//! - [`path`] / [`stream`]: normalized paths and byte streams (L1)
//! - [`storage`]: unified Zip/CFB archive access (L2)
//! - [`xml`]: a namespace-aware XML facade over `quick-xml` (L3)
//! - [`crypto`]: ODF manifest crypto and OOXML/CFB encryption unwrap (L4)
//! - [`meta`]: file-type detection and entry enumeration (L5)
//! - [`style`]: style registry and inheritance resolution (L6)
//! - [`element`]: the polymorphic document element graph (L7)
//! - [`table`]: the table cursor and dimension estimator (L8)
//! - [`document`]: the top-level `Document` facade (L9)
//!
//! `ole` and `ooxml` retain lower-level legacy-format and OOXML-package
//! support used by the layers above; `common` carries shared utilities
//! (error taxonomy, unit conversions, detection helpers).

pub mod common;
pub mod config;
pub mod crypto;
pub mod document;
pub mod element;
pub mod meta;
pub mod ole;
pub mod ooxml;
pub mod path;
pub mod storage;
pub mod stream;
pub mod style;
pub mod table;
pub mod xml;

pub use common::{Error, Result};
pub use config::Config;
pub use document::Document;
pub use meta::FileMeta;
pub use path::Path;
