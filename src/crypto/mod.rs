//! Crypto unwrap layer: turns an encrypted [`Storage`] into a
//! plaintext one, given a password. Two independent branches exist because
//! ODF and OOXML encrypt at different layers of their respective
//! containers:
//!
//! - ODF encrypts individual ZIP entries, keyed off `META-INF/manifest.xml`
//!   (`manifest`, `odf::DecryptingStorage`).
//! - OOXML/CFB encrypts the *whole* OOXML package as a single opaque
//!   stream inside a CFB envelope (`EncryptionInfo` + `EncryptedPackage`);
//!   unwrapping it yields a plain ZIP, which is then reopened as a fresh
//!   [`crate::storage::zip::ZipStorage`].
//!
//! Both branches converge on the same `decrypt(password) -> bool` facade at
//! the document level.

pub mod manifest;
pub mod odf;

pub use manifest::Manifest;
pub use odf::DecryptingStorage;

use crate::common::{Error, Result};
use crate::path::Path;
use crate::storage::Storage;
use crate::stream::read_all;

/// Attempts to read and parse `META-INF/manifest.xml` off `storage`.
/// Returns `Ok(None)` when the file simply doesn't exist (not an ODF
/// package, or an ODF package with no manifest at all).
pub fn read_odf_manifest(storage: &dyn Storage) -> Result<Option<Manifest>> {
    let path = Path::new("META-INF/manifest.xml");
    if !storage.is_file(&path) {
        return Ok(None);
    }
    let mut source = storage.read(&path)?;
    let bytes = read_all(source.as_mut())?;
    Ok(Some(Manifest::parse(&bytes)?))
}

/// Unlocks an ODF package given its already-parsed manifest. Returns
/// `storage` unchanged if the manifest says nothing is encrypted.
pub fn unlock_odf(storage: Box<dyn Storage>, manifest: Manifest, password: &str) -> Result<Box<dyn Storage>> {
    DecryptingStorage::unlock(storage, manifest, password)
}

/// Whether a CFB container looks like an OOXML encryption envelope (has
/// both top-level `EncryptionInfo` and `EncryptedPackage` streams).
pub fn is_ooxml_encrypted_cfb(storage: &dyn Storage) -> bool {
    storage.is_file(&Path::new("EncryptionInfo")) && storage.is_file(&Path::new("EncryptedPackage"))
}

/// Unlocks an OOXML-in-CFB encryption envelope, dispatching between the
/// Standard 2007 and Agile ciphers based on `EncryptionInfo`'s version
/// header, and returns the recovered ZIP package as a fresh `Storage`.
#[cfg(feature = "ooxml_encryption")]
pub fn unlock_ooxml_cfb(storage: &dyn Storage, password: &str) -> Result<Box<dyn Storage>> {
    use crate::ooxml::crypto::{decrypt_ooxml_package_agile, decrypt_ooxml_package_standard_2007};
    use crate::storage::ZipStorage;

    let mut info_source = storage.read(&Path::new("EncryptionInfo"))?;
    let encryption_info = read_all(info_source.as_mut())?;
    let mut package_source = storage.read(&Path::new("EncryptedPackage"))?;
    let encrypted_package = read_all(package_source.as_mut())?;

    if encryption_info.len() < 4 {
        return Err(Error::CorruptedFile(
            "EncryptionInfo stream too short to contain a version header".to_string(),
        ));
    }
    let version_major = u16::from_le_bytes([encryption_info[0], encryption_info[1]]);
    let version_minor = u16::from_le_bytes([encryption_info[2], encryption_info[3]]);

    let plain = match (version_major, version_minor) {
        (3, 2) => decrypt_ooxml_package_standard_2007(&encryption_info, &encrypted_package, password)
            .map_err(|e| map_password_error(e.into()))?,
        (4, 4) | (4, 2) => decrypt_ooxml_package_agile(&encryption_info, &encrypted_package, password)
            .map_err(|e| map_password_error(e.into()))?,
        (major, minor) => {
            return Err(Error::Unsupported(format!(
                "unsupported OOXML EncryptionInfo version {major}.{minor}"
            )));
        },
    };

    Ok(Box::new(ZipStorage::from_bytes(plain)?))
}

#[cfg(feature = "ooxml_encryption")]
fn map_password_error(err: Error) -> Error {
    match err {
        Error::InvalidFormat(s) if s.contains("incorrect password") => Error::WrongPassword,
        other => other,
    }
}
