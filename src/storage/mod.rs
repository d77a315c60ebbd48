//! Unified archive filesystem (L2).
//!
//! `Storage` abstracts over a ZIP archive and a CFB (compound file) container
//! behind one read interface keyed by [`crate::path::Path`], so everything
//! above this layer (crypto unwrap, meta parsing, the element graph) never
//! has to know which container format it is reading from.

mod cfb;
mod zip;

pub use cfb::CfbStorage;
pub use zip::ZipStorage;

use crate::common::{Error, Result};
use crate::path::Path;
use crate::stream::Source;

/// A read-only virtual filesystem over an archive.
///
/// Invariants: for every file path P, every proper ancestor of P is either
/// absent from the archive or a directory; `is_file(P) && is_directory(P)`
/// is never both true; `size(P)` is defined iff `is_file(P)`.
pub trait Storage {
    fn is_file(&self, path: &Path) -> bool;
    fn is_directory(&self, path: &Path) -> bool;
    fn size(&self, path: &Path) -> Option<u64>;
    fn read(&self, path: &Path) -> Result<Box<dyn Source>>;

    /// Immediate children of `path` (non-recursive).
    fn visit(&self, path: &Path, f: &mut dyn FnMut(&Path));

    /// Every file reachable from `path`, recursively.
    fn walk(&self, path: &Path, f: &mut dyn FnMut(&Path)) {
        self.visit(path, &mut |child| {
            f(child);
            if self.is_directory(child) {
                self.walk(child, f);
            }
        });
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_directory(path)
    }
}

/// Probe a byte buffer and wrap it in whichever `Storage` backend matches
/// its magic bytes, trying ZIP first and CFB second (the order the
/// document facade's `open()` also uses).
pub fn open_bytes(bytes: Vec<u8>) -> Result<Box<dyn Storage>> {
    const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";
    const OLE2_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

    if bytes.len() >= 4 && &bytes[0..4] == ZIP_SIGNATURE {
        return Ok(Box::new(ZipStorage::from_bytes(bytes)?));
    }
    if bytes.len() >= 8 && &bytes[0..8] == OLE2_SIGNATURE {
        return Ok(Box::new(CfbStorage::from_bytes(bytes)?));
    }
    Err(Error::NotOfficeFile)
}
