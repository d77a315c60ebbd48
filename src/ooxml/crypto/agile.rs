use crate::ooxml::error::{OoxmlError, Result};
use crate::xml::Element;
use aes::Aes128;
use aes::cipher::{BlockDecryptMut, KeyIvInit, block_padding::NoPadding};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use cbc::Decryptor as Aes128CbcDec;
use sha1::{Digest, Sha1};

use super::password_to_utf16le;

const AGILE_BLOCK_SIZE: usize = 16;

const K_VERIFIER_INPUT_BLOCK: [u8; 8] = [0xfe, 0xa7, 0xd2, 0x76, 0x3b, 0x4b, 0x9e, 0x79];
const K_HASHED_VERIFIER_BLOCK: [u8; 8] = [0xd7, 0xaa, 0x0f, 0x6d, 0x30, 0x61, 0x34, 0x4e];
const K_CRYPTO_KEY_BLOCK: [u8; 8] = [0x14, 0x6e, 0x0b, 0xe7, 0xab, 0xac, 0xd0, 0xd6];

type Aes128CbcDecMut = Aes128CbcDec<Aes128>;

struct AgileKeyEncryptor {
    spin_count: u32,
    salt: Vec<u8>,
    block_size: usize,
    key_bits: usize,
    encrypted_verifier_hash_input: Vec<u8>,
    encrypted_verifier_hash_value: Vec<u8>,
    encrypted_key_value: Vec<u8>,
}

struct AgileEncryptionInfo {
    key_salt: Vec<u8>,
    block_size: usize,
    key_encryptor: AgileKeyEncryptor,
}

/// Decrypts an OOXML package protected with ECMA-376 "Agile" encryption:
/// `EncryptionInfo` carries an 8-byte binary header followed by an XML
/// descriptor (`<encryption>`/`<keyData>`/`<keyEncryptors>`); the password
/// unwraps the content key via a 100,000-iteration SHA-1 spin, and
/// `EncryptedPackage` is an 8-byte little-endian `StreamSize` followed by
/// the package ciphertext split into 4096-byte AES-128-CBC segments, each
/// keyed with an IV derived from the segment index.
pub fn decrypt_ooxml_package_agile(
    encryption_info: &[u8],
    encrypted_package: &[u8],
    password: &str,
) -> Result<Vec<u8>> {
    if encryption_info.len() <= 8 {
        return Err(OoxmlError::InvalidFormat(
            "EncryptionInfo stream too short for Agile header".to_string(),
        ));
    }

    let info = parse_agile_encryption_info(&encryption_info[8..])?;
    let encryptor = &info.key_encryptor;

    let pw_hash = hash_password_agile(password, &encryptor.salt, encryptor.spin_count);
    let key_size = encryptor.key_bits / 8;

    let verifier_input = decrypt_block_agile(
        &pw_hash,
        &K_VERIFIER_INPUT_BLOCK,
        &encryptor.salt,
        None,
        encryptor.block_size,
        key_size,
        &encryptor.encrypted_verifier_hash_input,
    )?;
    let verifier_hash = decrypt_block_agile(
        &pw_hash,
        &K_HASHED_VERIFIER_BLOCK,
        &encryptor.salt,
        None,
        encryptor.block_size,
        key_size,
        &encryptor.encrypted_verifier_hash_value,
    )?;

    let mut sha = Sha1::new();
    sha.update(&verifier_input);
    let computed_hash = sha.finalize();
    if verifier_hash.len() < computed_hash.len()
        || verifier_hash[..computed_hash.len()] != computed_hash[..]
    {
        return Err(OoxmlError::InvalidFormat(
            "incorrect password for Agile encrypted OOXML package".to_string(),
        ));
    }

    let content_key = decrypt_block_agile(
        &pw_hash,
        &K_CRYPTO_KEY_BLOCK,
        &encryptor.salt,
        None,
        encryptor.block_size,
        key_size,
        &encryptor.encrypted_key_value,
    )?;

    decrypt_agile_package_stream(&content_key, &info.key_salt, info.block_size, encrypted_package)
}

fn parse_agile_encryption_info(xml_bytes: &[u8]) -> Result<AgileEncryptionInfo> {
    let root = Element::parse(xml_bytes)
        .map_err(|e| OoxmlError::InvalidFormat(format!("invalid Agile EncryptionInfo XML: {e}")))?;

    let key_data = root
        .first_child_element("keyData")
        .ok_or_else(|| OoxmlError::InvalidFormat("Agile EncryptionInfo missing keyData".into()))?;

    let key_salt = decode_b64_attr(key_data, "saltValue")?;
    let block_size: usize = attr_as(key_data, "blockSize", 16)?;

    let key_encryptors = root.first_child_element("keyEncryptors").ok_or_else(|| {
        OoxmlError::InvalidFormat("Agile EncryptionInfo missing keyEncryptors".into())
    })?;
    let key_encryptor_wrapper = key_encryptors.first_child_element("keyEncryptor").ok_or_else(|| {
        OoxmlError::InvalidFormat("Agile EncryptionInfo missing keyEncryptor".into())
    })?;
    let encrypted_key = key_encryptor_wrapper
        .element_children()
        .find(|c| c.local_name() == "encryptedKey")
        .ok_or_else(|| OoxmlError::InvalidFormat("Agile EncryptionInfo missing encryptedKey".into()))?;

    let key_encryptor = AgileKeyEncryptor {
        spin_count: attr_as(encrypted_key, "spinCount", 100_000)?,
        salt: decode_b64_attr(encrypted_key, "saltValue")?,
        block_size: attr_as(encrypted_key, "blockSize", 16)?,
        key_bits: attr_as(encrypted_key, "keyBits", 128)?,
        encrypted_verifier_hash_input: decode_b64_attr(encrypted_key, "encryptedVerifierHashInput")?,
        encrypted_verifier_hash_value: decode_b64_attr(encrypted_key, "encryptedVerifierHashValue")?,
        encrypted_key_value: decode_b64_attr(encrypted_key, "encryptedKeyValue")?,
    };

    Ok(AgileEncryptionInfo {
        key_salt,
        block_size,
        key_encryptor,
    })
}

fn decode_b64_attr(el: &Element, name: &str) -> Result<Vec<u8>> {
    let value = el
        .attr(name)
        .ok_or_else(|| OoxmlError::InvalidFormat(format!("Agile EncryptionInfo missing `{name}`")))?;
    BASE64_STANDARD
        .decode(value)
        .map_err(|e| OoxmlError::InvalidFormat(format!("invalid base64 in `{name}`: {e}")))
}

fn attr_as(el: &Element, name: &str, default: usize) -> Result<usize> {
    match el.attr(name) {
        Some(v) => v
            .parse::<usize>()
            .map_err(|e| OoxmlError::InvalidFormat(format!("invalid `{name}`: {e}"))),
        None => Ok(default),
    }
}

fn hash_password_agile(password: &str, salt: &[u8], spin_count: u32) -> Vec<u8> {
    let mut sha = Sha1::new();
    sha.update(salt);
    sha.update(password_to_utf16le(password));
    let mut hash = sha.finalize().to_vec();

    let mut iter = [0u8; 4];
    for i in 0..spin_count {
        iter.copy_from_slice(&i.to_le_bytes());
        let mut sha = Sha1::new();
        sha.update(iter);
        sha.update(&hash);
        hash = sha.finalize().to_vec();
    }

    hash
}

fn generate_key_agile(password_hash: &[u8], block_key: &[u8], key_size: usize) -> Vec<u8> {
    let mut sha = Sha1::new();
    sha.update(password_hash);
    sha.update(block_key);
    let key = sha.finalize().to_vec();

    if key.len() == key_size {
        return key;
    }
    let mut out = vec![0x36u8; key_size];
    let copy = out.len().min(key.len());
    out[..copy].copy_from_slice(&key[..copy]);
    out
}

fn pad_36_to_block(mut iv: Vec<u8>, block_size: usize) -> Vec<u8> {
    if iv.len() == block_size {
        return iv;
    }
    if iv.len() > block_size {
        iv.truncate(block_size);
        return iv;
    }
    iv.resize(block_size, 0x36);
    iv
}

fn generate_iv_agile(key_salt: &[u8], block_key: Option<&[u8]>, block_size: usize) -> Vec<u8> {
    let iv = if let Some(block_key) = block_key {
        let mut sha = Sha1::new();
        sha.update(key_salt);
        sha.update(block_key);
        sha.finalize().to_vec()
    } else {
        key_salt.to_vec()
    };
    pad_36_to_block(iv, block_size)
}

#[allow(clippy::too_many_arguments)]
fn decrypt_block_agile(
    pw_hash: &[u8],
    block_key: &[u8],
    verifier_salt: &[u8],
    iv_block_key: Option<&[u8]>,
    block_size: usize,
    key_size: usize,
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let inter_key = generate_key_agile(pw_hash, block_key, key_size);
    let iv = generate_iv_agile(verifier_salt, iv_block_key, block_size);
    let cipher = Aes128CbcDecMut::new_from_slices(&inter_key, &iv)
        .map_err(|_| OoxmlError::InvalidFormat("invalid AES key/iv for Agile block".into()))?;

    cipher
        .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
        .map_err(|_| OoxmlError::InvalidFormat("failed to decrypt Agile block".into()))
}

fn decrypt_agile_package_stream(
    content_key: &[u8],
    key_salt: &[u8],
    block_size: usize,
    encrypted: &[u8],
) -> Result<Vec<u8>> {
    if encrypted.len() < 8 {
        return Err(OoxmlError::InvalidFormat(
            "EncryptedPackage stream too short for Agile StreamSize".to_string(),
        ));
    }

    let mut size_bytes = [0u8; 8];
    size_bytes.copy_from_slice(&encrypted[..8]);
    let stream_size = u64::from_le_bytes(size_bytes) as usize;

    const SEGMENT_SIZE: usize = 4096;
    let ciphertext = &encrypted[8..];
    let mut plain = Vec::with_capacity(ciphertext.len());

    let mut offset = 0usize;
    let mut block_index: u32 = 0;
    while offset < ciphertext.len() {
        let this_len = (ciphertext.len() - offset).min(SEGMENT_SIZE);
        let segment = &ciphertext[offset..offset + this_len];

        let block_key = block_index.to_le_bytes();
        let iv = generate_iv_agile(key_salt, Some(&block_key), AGILE_BLOCK_SIZE.max(block_size));
        let cipher = Aes128CbcDecMut::new_from_slices(content_key, &iv)
            .map_err(|_| OoxmlError::InvalidFormat("invalid AES key/iv for Agile segment".into()))?;
        let segment_plain = cipher
            .decrypt_padded_vec_mut::<NoPadding>(segment)
            .map_err(|_| OoxmlError::InvalidFormat("failed to decrypt Agile segment".into()))?;
        plain.extend_from_slice(&segment_plain);

        offset += this_len;
        block_index += 1;
    }

    if plain.len() < stream_size {
        return Err(OoxmlError::InvalidFormat(
            "decrypted Agile stream smaller than declared StreamSize".to_string(),
        ));
    }
    plain.truncate(stream_size);
    Ok(plain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_encryption_info() {
        let err = decrypt_ooxml_package_agile(&[0u8; 4], &[0u8; 32], "pw").unwrap_err();
        assert!(matches!(err, OoxmlError::InvalidFormat(_)));
    }

    #[test]
    fn key_padding_truncates_and_extends() {
        let hash = vec![1u8; 20];
        let key = generate_key_agile(&hash, &K_VERIFIER_INPUT_BLOCK, 16);
        assert_eq!(key.len(), 16);
    }

    #[test]
    fn iv_padding_is_block_sized() {
        let iv = generate_iv_agile(&[1u8; 16], None, 16);
        assert_eq!(iv.len(), 16);
        let iv = generate_iv_agile(&[1u8; 4], Some(&[0u8; 4]), 16);
        assert_eq!(iv.len(), 16);
    }
}
