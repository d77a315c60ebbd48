//! `META-INF/manifest.xml` parsing.

use std::collections::HashMap;

use crate::xml::Element;

/// How a manifest entry's checksum was computed, per
/// `manifest:checksum-type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumType {
    Sha256,
    Sha1,
    Sha256_1k,
    Sha1_1k,
    Unknown,
}

impl ChecksumType {
    fn parse(value: &str) -> Self {
        let v = value.to_ascii_lowercase();
        let truncated = v.contains("1k") || v.ends_with("-1k") || v.ends_with("/1k");
        if v.contains("sha256") {
            if truncated { ChecksumType::Sha256_1k } else { ChecksumType::Sha256 }
        } else if v.contains("sha1") {
            if truncated { ChecksumType::Sha1_1k } else { ChecksumType::Sha1 }
        } else {
            ChecksumType::Unknown
        }
    }
}

/// Cipher used for `manifest:algorithm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Aes256Cbc,
    TripleDesCbc,
    BlowfishCfb,
    Unknown,
}

impl Algorithm {
    fn parse(value: &str) -> Self {
        let v = value.to_ascii_lowercase();
        if v.contains("aes256") || v.contains("aes-256") {
            Algorithm::Aes256Cbc
        } else if v.contains("tripledes") || v.contains("triple-des") || v.contains("3des") {
            Algorithm::TripleDesCbc
        } else if v.contains("blowfish") {
            Algorithm::BlowfishCfb
        } else {
            Algorithm::Unknown
        }
    }
}

/// `manifest:key-derivation-name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDerivation {
    Pbkdf2,
    Unknown,
}

impl KeyDerivation {
    fn parse(value: &str) -> Self {
        if value.to_ascii_uppercase().contains("PBKDF2") {
            KeyDerivation::Pbkdf2
        } else {
            KeyDerivation::Unknown
        }
    }
}

/// `manifest:start-key-generation-name`. Defaults to `Sha1`/20 bytes when
/// the whole `manifest:start-key-generation` element is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartKeyGeneration {
    Sha1,
    Sha256,
    Unknown,
}

impl StartKeyGeneration {
    fn parse(value: &str) -> Self {
        let v = value.to_ascii_lowercase();
        if v.contains("sha256") {
            StartKeyGeneration::Sha256
        } else if v.contains("sha1") {
            StartKeyGeneration::Sha1
        } else {
            StartKeyGeneration::Unknown
        }
    }
}

/// One `manifest:file-entry` with a `manifest:encryption-data` child.
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    pub full_path: String,
    pub media_type: String,
    /// Plaintext size once decrypted.
    pub size: u64,
    pub encrypted: bool,
    pub checksum_type: ChecksumType,
    pub checksum: Vec<u8>,
    pub algorithm: Algorithm,
    pub iv: Vec<u8>,
    pub key_derivation: KeyDerivation,
    pub key_size: u32,
    pub key_iteration_count: u32,
    pub key_salt: Vec<u8>,
    pub start_key_generation: StartKeyGeneration,
    pub start_key_size: u32,
}

/// The parsed contents of `META-INF/manifest.xml`.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// `manifest:media-type` of the root (`full-path="/"`) entry, used by
    /// the meta parser as a fallback type signal when `/mimetype`
    /// is absent.
    pub root_media_type: Option<String>,
    pub entries: HashMap<String, ManifestEntry>,
    /// True if at least one entry carries `manifest:encryption-data`.
    pub encrypted: bool,
}

impl Manifest {
    pub fn parse(bytes: &[u8]) -> crate::common::Result<Manifest> {
        let root = Element::parse(bytes)?;
        let mut manifest = Manifest::default();

        for entry in root.element_children().filter(|e| e.is("manifest:file-entry")) {
            let full_path = entry.attr("manifest:full-path").unwrap_or("").to_string();
            let media_type = entry.attr("manifest:media-type").unwrap_or("").to_string();
            let size = entry
                .attr("manifest:size")
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0);

            if full_path == "/" {
                manifest.root_media_type = Some(media_type.clone());
            }

            let Some(enc) = entry.first_child_element("manifest:encryption-data") else {
                continue;
            };
            manifest.encrypted = true;

            let checksum_type = enc
                .attr("manifest:checksum-type")
                .map(ChecksumType::parse)
                .unwrap_or(ChecksumType::Unknown);
            let checksum = enc
                .attr("manifest:checksum")
                .and_then(decode_base64)
                .unwrap_or_default();

            let (algorithm, iv) = match enc.first_child_element("manifest:algorithm") {
                Some(alg) => (
                    alg.attr("manifest:algorithm-name")
                        .map(Algorithm::parse)
                        .unwrap_or(Algorithm::Unknown),
                    alg.attr("manifest:initialisation-vector")
                        .and_then(decode_base64)
                        .unwrap_or_default(),
                ),
                None => (Algorithm::Unknown, Vec::new()),
            };

            let (key_derivation, key_size, key_iteration_count, key_salt) =
                match enc.first_child_element("manifest:key-derivation") {
                    Some(kd) => (
                        kd.attr("manifest:key-derivation-name")
                            .map(KeyDerivation::parse)
                            .unwrap_or(KeyDerivation::Unknown),
                        kd.attr("manifest:key-size").and_then(|s| s.parse().ok()).unwrap_or(32),
                        kd.attr("manifest:iteration-count")
                            .and_then(|s| s.parse().ok())
                            .unwrap_or(0),
                        kd.attr("manifest:salt").and_then(decode_base64).unwrap_or_default(),
                    ),
                    None => (KeyDerivation::Unknown, 32, 0, Vec::new()),
                };

            // Absent start-key-generation defaults to SHA1/20.
            let (start_key_generation, start_key_size) =
                match enc.first_child_element("manifest:start-key-generation") {
                    Some(skg) => (
                        skg.attr("manifest:start-key-generation-name")
                            .map(StartKeyGeneration::parse)
                            .unwrap_or(StartKeyGeneration::Sha1),
                        skg.attr("manifest:key-size").and_then(|s| s.parse().ok()).unwrap_or(20),
                    ),
                    None => (StartKeyGeneration::Sha1, 20),
                };

            manifest.entries.insert(
                full_path.clone(),
                ManifestEntry {
                    full_path,
                    media_type,
                    size,
                    encrypted: true,
                    checksum_type,
                    checksum,
                    algorithm,
                    iv,
                    key_derivation,
                    key_size,
                    key_iteration_count,
                    key_salt,
                    start_key_generation,
                    start_key_size,
                },
            );
        }

        Ok(manifest)
    }

    /// The encrypted entry with the smallest plaintext size, used for
    /// password verification.
    pub fn smallest_encrypted_entry(&self) -> Option<&ManifestEntry> {
        self.entries.values().filter(|e| e.encrypted).min_by_key(|e| e.size)
    }
}

fn decode_base64(s: &str) -> Option<Vec<u8>> {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD.decode(s.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.3">
  <manifest:file-entry manifest:full-path="/" manifest:version="1.3" manifest:media-type="application/vnd.oasis.opendocument.text"/>
  <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml" manifest:size="128">
    <manifest:encryption-data manifest:checksum-type="SHA256/1K" manifest:checksum="AAAA">
      <manifest:algorithm manifest:algorithm-name="aes256-cbc" manifest:initialisation-vector="BBBB"/>
      <manifest:key-derivation manifest:key-derivation-name="PBKDF2" manifest:key-size="32" manifest:iteration-count="100000" manifest:salt="CCCC"/>
      <manifest:start-key-generation manifest:start-key-generation-name="SHA256" manifest:key-size="32"/>
    </manifest:encryption-data>
  </manifest:file-entry>
</manifest:manifest>"#;

    #[test]
    fn parses_entries_and_root_media_type() {
        let manifest = Manifest::parse(SAMPLE.as_bytes()).unwrap();
        assert!(manifest.encrypted);
        assert_eq!(
            manifest.root_media_type.as_deref(),
            Some("application/vnd.oasis.opendocument.text")
        );
        let entry = manifest.entries.get("content.xml").unwrap();
        assert_eq!(entry.checksum_type, ChecksumType::Sha256_1k);
        assert_eq!(entry.algorithm, Algorithm::Aes256Cbc);
        assert_eq!(entry.key_derivation, KeyDerivation::Pbkdf2);
        assert_eq!(entry.start_key_generation, StartKeyGeneration::Sha256);
        assert_eq!(entry.start_key_size, 32);
    }

    #[test]
    fn missing_start_key_generation_defaults_to_sha1_20() {
        let xml = SAMPLE.replace(
            r#"<manifest:start-key-generation manifest:start-key-generation-name="SHA256" manifest:key-size="32"/>"#,
            "",
        );
        let manifest = Manifest::parse(xml.as_bytes()).unwrap();
        let entry = manifest.entries.get("content.xml").unwrap();
        assert_eq!(entry.start_key_generation, StartKeyGeneration::Sha1);
        assert_eq!(entry.start_key_size, 20);
    }

    #[test]
    fn smallest_encrypted_entry_picks_minimum_size() {
        let xml = SAMPLE.replace(r#"manifest:size="128""#, r#"manifest:size="5""#);
        let manifest = Manifest::parse(xml.as_bytes()).unwrap();
        let smallest = manifest.smallest_encrypted_entry().unwrap();
        assert_eq!(smallest.full_path, "content.xml");
    }
}
