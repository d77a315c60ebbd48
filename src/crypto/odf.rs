//! ODF manifest crypto unwrap.
//!
//! Wraps an encrypted [`Storage`] so every `read()` transparently decrypts
//! and raw-inflates, matching the manifest-declared algorithm per entry.

use std::io::Cursor;

use aes::Aes256;
use aes::cipher::{AsyncStreamCipher, BlockDecryptMut, KeyIvInit, block_padding::Pkcs7};
use cbc::Decryptor as CbcDecryptor;
use flate2::read::DeflateDecoder;
use sha1::{Digest as _, Sha1};
use sha2::Sha256;
use std::io::Read as _;

use super::manifest::{Algorithm, ChecksumType, KeyDerivation, Manifest, ManifestEntry, StartKeyGeneration};
use crate::common::{Error, Result};
use crate::path::Path;
use crate::storage::Storage;
use crate::stream::{Source, read_all};

type Aes256CbcDec = CbcDecryptor<Aes256>;
type TripleDesCbcDec = CbcDecryptor<des::TdesEde3>;
type BlowfishCfbDec = cfb_mode::Decryptor<blowfish::Blowfish>;

/// Storage wrapper that decrypts manifest-listed entries on read and passes
/// every other path straight through to `inner`.
pub struct DecryptingStorage {
    inner: Box<dyn Storage>,
    manifest: Manifest,
    derived_key: Vec<u8>,
}

impl DecryptingStorage {
    /// Verify `password` against the manifest's smallest encrypted entry and,
    /// on success, return a `Storage` that decrypts every encrypted entry on
    /// read. Returns `inner` unchanged if the manifest isn't encrypted at all.
    pub fn unlock(inner: Box<dyn Storage>, manifest: Manifest, password: &str) -> Result<Box<dyn Storage>> {
        if !manifest.encrypted {
            return Ok(inner);
        }

        let smallest = manifest
            .smallest_encrypted_entry()
            .ok_or_else(|| Error::CorruptedContent("no encrypted entries in manifest".into()))?;

        if smallest.checksum_type == ChecksumType::Unknown
            || smallest.algorithm == Algorithm::Unknown
            || smallest.key_derivation == KeyDerivation::Unknown
            || smallest.start_key_generation == StartKeyGeneration::Unknown
        {
            return Err(Error::UnsupportedCryptoAlgorithm(format!(
                "entry {:?}: checksum_type={:?} algorithm={:?} key_derivation={:?} start_key_generation={:?}",
                smallest.full_path,
                smallest.checksum_type,
                smallest.algorithm,
                smallest.key_derivation,
                smallest.start_key_generation
            )));
        }

        let start_key = compute_start_key(password, smallest.start_key_generation, smallest.start_key_size)?;
        let derived_key = derive_key(&start_key, &smallest.key_salt, smallest.key_iteration_count, smallest.key_size);

        let entry_path = Path::new(smallest.full_path.clone());
        let raw = read_all(&mut *inner.read(&entry_path)?).map_err(Error::Io)?;
        let decrypted = decrypt_entry(&derived_key, smallest, &raw)?;
        let checksum = compute_checksum(&decrypted, smallest.checksum_type);
        if checksum != smallest.checksum {
            return Err(Error::WrongPassword);
        }

        Ok(Box::new(DecryptingStorage { inner, manifest, derived_key }))
    }

    fn entry_for(&self, path: &Path) -> Option<&ManifestEntry> {
        let key = path.as_str().trim_start_matches('/');
        self.manifest.entries.get(key)
    }
}

impl Storage for DecryptingStorage {
    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }

    fn is_directory(&self, path: &Path) -> bool {
        self.inner.is_directory(path)
    }

    fn size(&self, path: &Path) -> Option<u64> {
        match self.entry_for(path) {
            Some(entry) => Some(entry.size),
            None => self.inner.size(path),
        }
    }

    fn read(&self, path: &Path) -> Result<Box<dyn Source>> {
        let Some(entry) = self.entry_for(path) else {
            return self.inner.read(path);
        };

        let raw = read_all(&mut *self.inner.read(path)?).map_err(Error::Io)?;
        let decrypted = decrypt_entry(&self.derived_key, entry, &raw)?;
        let inflated = inflate_raw(&decrypted)?;
        if inflated.len() as u64 != entry.size {
            return Err(Error::CorruptedContent(format!(
                "entry {} inflated to {} bytes, manifest declares {}",
                entry.full_path,
                inflated.len(),
                entry.size
            )));
        }
        Ok(Box::new(Cursor::new(inflated)))
    }

    fn visit(&self, path: &Path, f: &mut dyn FnMut(&Path)) {
        self.inner.visit(path, f)
    }
}

fn compute_start_key(password: &str, generation: StartKeyGeneration, size: u32) -> Result<Vec<u8>> {
    let full = match generation {
        StartKeyGeneration::Sha1 => {
            let mut hasher = Sha1::new();
            hasher.update(password.as_bytes());
            hasher.finalize().to_vec()
        },
        StartKeyGeneration::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(password.as_bytes());
            hasher.finalize().to_vec()
        },
        StartKeyGeneration::Unknown => unreachable!("caller rejects Unknown before this point"),
    };

    let size = size as usize;
    if full.len() < size {
        return Err(Error::CorruptedContent("start key hash shorter than declared start_key_size".into()));
    }
    Ok(full[..size].to_vec())
}

fn derive_key(start_key: &[u8], salt: &[u8], iterations: u32, key_size: u32) -> Vec<u8> {
    let mut out = vec![0u8; key_size as usize];
    pbkdf2::pbkdf2_hmac::<Sha1>(start_key, salt, iterations, &mut out);
    out
}

fn decrypt_entry(key: &[u8], entry: &ManifestEntry, data: &[u8]) -> Result<Vec<u8>> {
    match entry.algorithm {
        Algorithm::Aes256Cbc => Aes256CbcDec::new_from_slices(key, &entry.iv)
            .map_err(|e| Error::CorruptedContent(e.to_string()))?
            .decrypt_padded_vec_mut::<Pkcs7>(data)
            .map_err(|_| Error::WrongPassword),
        Algorithm::TripleDesCbc => TripleDesCbcDec::new_from_slices(key, &entry.iv)
            .map_err(|e| Error::CorruptedContent(e.to_string()))?
            .decrypt_padded_vec_mut::<Pkcs7>(data)
            .map_err(|_| Error::WrongPassword),
        Algorithm::BlowfishCfb => {
            let mut buf = data.to_vec();
            let decryptor = BlowfishCfbDec::new_from_slices(key, &entry.iv)
                .map_err(|e| Error::CorruptedContent(e.to_string()))?;
            decryptor.decrypt(&mut buf);
            Ok(buf)
        },
        Algorithm::Unknown => unreachable!("caller rejects Unknown before this point"),
    }
}

fn compute_checksum(data: &[u8], checksum_type: ChecksumType) -> Vec<u8> {
    let window = match checksum_type {
        ChecksumType::Sha1_1k | ChecksumType::Sha256_1k => &data[..data.len().min(1024)],
        ChecksumType::Sha1 | ChecksumType::Sha256 | ChecksumType::Unknown => data,
    };
    match checksum_type {
        ChecksumType::Sha256 | ChecksumType::Sha256_1k => {
            let mut hasher = Sha256::new();
            hasher.update(window);
            hasher.finalize().to_vec()
        },
        ChecksumType::Sha1 | ChecksumType::Sha1_1k | ChecksumType::Unknown => {
            let mut hasher = Sha1::new();
            hasher.update(window);
            hasher.finalize().to_vec()
        },
    }
}

/// ODF encrypts raw DEFLATE streams, never zlib-wrapped ones.
fn inflate_raw(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::CorruptedContent(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_key_truncates_to_requested_size() {
        let key = compute_start_key("password", StartKeyGeneration::Sha1, 16).unwrap();
        assert_eq!(key.len(), 16);
    }

    #[test]
    fn start_key_rejects_oversized_request() {
        let err = compute_start_key("password", StartKeyGeneration::Sha1, 64).unwrap_err();
        assert!(matches!(err, Error::CorruptedContent(_)));
    }

    #[test]
    fn checksum_1k_variant_only_hashes_first_kilobyte() {
        let data = vec![7u8; 4096];
        let full = compute_checksum(&data, ChecksumType::Sha256);
        let truncated = compute_checksum(&data, ChecksumType::Sha256_1k);
        assert_ne!(full, truncated);
        assert_eq!(truncated, compute_checksum(&data[..1024], ChecksumType::Sha256));
    }
}
