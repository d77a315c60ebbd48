pub mod agile;
pub mod standard2007;

pub use agile::decrypt_ooxml_package_agile;
pub use standard2007::decrypt_ooxml_package_standard_2007;

/// OOXML/CFB decryption helpers (ECMA-376 Standard 2007 and Agile).
///
/// Compiled only when the `ooxml_encryption` feature is enabled. Both
/// ciphers share the password-to-UTF-16LE conversion MS-OFFCRYPTO keys off
/// of; everything else (spin counts, block ciphers, XML shapes) differs
/// enough between the two that each gets its own module.
fn password_to_utf16le(password: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(password.len() * 2);
    for ch in password.encode_utf16() {
        let bytes = ch.to_le_bytes();
        buf.push(bytes[0]);
        buf.push(bytes[1]);
    }
    buf
}
