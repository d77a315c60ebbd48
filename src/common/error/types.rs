//! Unified error types for Litchi library.
//!
//! This module provides a unified error type that encompasses errors from both
//! OLE2 and OOXML parsing, presenting a consistent API to users.
use thiserror::Error;

/// Main error type for Litchi operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error occurred
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid file format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// File is not a recognized Office format
    #[error("Not a valid Office file")]
    NotOfficeFile,

    /// Corrupted or malformed file
    #[error("Corrupted file: {0}")]
    CorruptedFile(String),

    /// Stream or part not found
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(String),

    /// Invalid content type
    #[error("Invalid content type: expected {expected}, got {got}")]
    InvalidContentType { expected: String, got: String },

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Feature disabled at compile time
    #[error("Feature '{0}' is disabled. Enable it with --features {0}")]
    FeatureDisabled(String),

    /// The byte buffer has no ZIP end-of-central-directory signature (L2).
    #[error("not a ZIP file")]
    NoZipFile,

    /// The byte buffer has no CFB/OLE2 header signature (L2).
    #[error("not a compound file")]
    NoCfbFile,

    /// A CFB container's FAT/directory chain is structurally inconsistent (L2).
    #[error("corrupted compound file: {0}")]
    CfbFileCorrupted(String),

    /// A requested path does not resolve to any entry (L1).
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Neither `mimetype` nor `META-INF/manifest.xml` identify the container
    /// as an OpenDocument package (L5).
    #[error("not an OpenDocument file")]
    NoOpenDocumentFile,

    /// None of `word/document.xml`, `ppt/presentation.xml`, or
    /// `xl/workbook.xml` are present (L5).
    #[error("not an Office Open XML file")]
    NoOfficeOpenXmlFile,

    /// One of checksum_type/algorithm/key_derivation/start_key_generation is
    /// `unknown` for the manifest's smallest encrypted entry (L4).
    #[error("unsupported crypto algorithm: {0}")]
    UnsupportedCryptoAlgorithm(String),

    /// The derived key's checksum does not match the manifest's recorded
    /// checksum for the smallest encrypted entry (L4).
    #[error("wrong password")]
    WrongPassword,

    /// An entry decrypted and inflated to a size other than the manifest's
    /// recorded plaintext size (L4).
    #[error("corrupted content: {0}")]
    CorruptedContent(String),

    /// An XML part failed to parse as XML at all (L3).
    #[error("not XML: {0}")]
    NotXml(String),

    /// `guess()`/`open()` could not classify the container as any known
    /// document type (L5). Not fatal: callers see `FileType::Unknown`.
    #[error("unknown file type")]
    UnknownFileType,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for Litchi operations.
pub type Result<T> = std::result::Result<T, Error>;

