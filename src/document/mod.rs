//! Top-level `Document` facade (L9): opens a Zip- or CFB-backed
//! compound file, classifies it, optionally decrypts it, and exposes the
//! style/element/table layers above over whichever container format and
//! document family it turned out to be.

mod backtranslate;

use std::collections::HashMap;
use std::io::Cursor;

use crate::common::{Error, Result};
use crate::config::Config;
use crate::crypto::{self, Manifest};
use crate::meta::{self, FileMeta, FileType};
use crate::path::Path;
use crate::storage::{self, Storage};
use crate::stream::read_all;

/// Which document family a successfully opened container turned out to
/// hold, as distinct from [`FileType`] (which also covers states - like
/// `OfficeOpenXmlEncrypted` - that [`Document::open`] resolves away once
/// it has actually looked inside the container).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Odf,
    Ooxml,
    OoxmlEncryptedCfb,
    Legacy,
}

/// A single opened compound document.
///
/// Holds the archive's `Storage` (already crypto-unwrapped once
/// [`Document::decrypt`] succeeds), its classification, and - for ODF
/// documents only - the manifest needed to unlock it.
pub struct Document {
    storage: Option<Box<dyn Storage>>,
    family: Option<Family>,
    manifest: Option<Manifest>,
    meta: FileMeta,
    opened: bool,
    decrypted: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            storage: None,
            family: None,
            manifest: None,
            meta: FileMeta::default(),
            opened: false,
            decrypted: false,
        }
    }

    /// Classifies a byte buffer without retaining any state on `self`
    /// without mutating or retaining any state on `self`.
    pub fn guess(bytes: &[u8]) -> Result<FileType> {
        let storage = storage::open_bytes(bytes.to_vec())?;
        let manifest = crypto::read_odf_manifest(storage.as_ref()).unwrap_or(None);
        classify(storage.as_ref(), manifest.as_ref()).map(|(ty, _)| ty)
    }

    /// Opens `bytes` as a Zip or CFB container, classifies it as ODF, OOXML,
    /// or a legacy binary format, and records whether it's encrypted.
    /// Returns `false` (rather than an error) for anything that isn't a
    /// recognized container at all, matching `open()`'s boolean contract.
    pub fn open(&mut self, bytes: &[u8]) -> bool {
        self.close();

        let Ok(storage) = storage::open_bytes(bytes.to_vec()) else {
            return false;
        };

        let manifest = crypto::read_odf_manifest(storage.as_ref()).unwrap_or(None);
        let Ok((file_type, family)) = classify(storage.as_ref(), manifest.as_ref()) else {
            tracing::warn!("could not classify opened container as any known document type");
            return false;
        };

        let encrypted = match family {
            Family::Odf => manifest.as_ref().is_some_and(|m| m.encrypted),
            Family::OoxmlEncryptedCfb => true,
            Family::Ooxml | Family::Legacy => false,
        };

        self.storage = Some(storage);
        self.family = Some(family);
        self.manifest = manifest;
        self.decrypted = !encrypted;
        self.meta = FileMeta {
            file_type,
            encrypted,
            entry_count: 0,
            entries: Vec::new(),
        };
        self.opened = true;

        if self.decrypted {
            self.populate_entries();
        }
        true
    }

    /// Drops the open storage and resets to the unopened state.
    pub fn close(&mut self) {
        self.storage = None;
        self.family = None;
        self.manifest = None;
        self.meta = FileMeta::default();
        self.opened = false;
        self.decrypted = false;
    }

    /// Unlocks an encrypted document. No-op success if already decrypted;
    /// fails (returns `false`, does not mutate state) if not opened, not
    /// encrypted in a supported way, or the password is wrong.
    pub fn decrypt(&mut self, password: &str) -> bool {
        if !self.opened {
            return false;
        }
        if self.decrypted {
            return true;
        }

        let Some(family) = self.family else { return false };
        let Some(storage) = self.storage.take() else { return false };

        let unlocked = match family {
            Family::Odf => {
                let Some(manifest) = self.manifest.clone() else {
                    self.storage = Some(storage);
                    return false;
                };
                crypto::unlock_odf(storage, manifest, password)
            },
            Family::OoxmlEncryptedCfb => unlock_ooxml_envelope(storage.as_ref(), password),
            Family::Legacy | Family::Ooxml => {
                self.storage = Some(storage);
                return false;
            },
        };

        match unlocked {
            Ok(new_storage) => {
                self.storage = Some(new_storage);
                self.decrypted = true;
                self.meta.encrypted = false;
                if family == Family::OoxmlEncryptedCfb {
                    if let Ok((ty, _)) = classify(self.storage.as_ref().unwrap().as_ref(), None) {
                        self.meta.file_type = ty;
                    }
                }
                self.populate_entries();
                true
            },
            Err(Error::WrongPassword) => {
                self.storage = Some(storage);
                false
            },
            Err(err) => {
                tracing::warn!(error = %err, "decrypt failed");
                self.storage = Some(storage);
                false
            },
        }
    }

    pub fn meta(&self) -> &FileMeta {
        &self.meta
    }

    fn storage(&self) -> Option<&dyn Storage> {
        self.storage.as_deref()
    }

    fn populate_entries(&mut self) {
        let Some(storage) = self.storage() else { return };
        let entries = match self.meta.file_type {
            FileType::OpenDocumentPresentation | FileType::OpenDocumentSpreadsheet => {
                meta::enumerate_content_entries(storage, self.meta.file_type, 10_000, 500).unwrap_or_default()
            },
            _ => Vec::new(),
        };
        self.meta.entry_count = entries.len() as u32;
        self.meta.entries = entries;
    }

    /// True once opened, decrypted, and the document family is one an
    /// external HTML renderer can actually produce output for.
    pub fn can_translate(&self) -> bool {
        self.opened
            && self.decrypted
            && matches!(
                self.meta.file_type,
                FileType::OpenDocumentText
                    | FileType::OpenDocumentPresentation
                    | FileType::OpenDocumentSpreadsheet
                    | FileType::OpenDocumentGraphics
                    | FileType::OfficeOpenXmlDocument
                    | FileType::OfficeOpenXmlPresentation
                    | FileType::OfficeOpenXmlWorkbook
            )
    }

    /// Renders the document to `out_path` as HTML. Always reports
    /// `FeatureDisabled`: the renderer is an external collaborator this
    /// crate does not itself embed.
    pub fn translate(&self, _out_path: &std::path::Path, _config: &Config) -> Result<bool> {
        if !self.can_translate() {
            return Ok(false);
        }
        Err(Error::FeatureDisabled("html-translate".to_string()))
    }

    /// True only for an opened, decrypted, *editable* ODF document.
    /// OOXML back-translation is out of scope for now.
    pub fn can_back_translate(&self, config: &Config) -> bool {
        self.opened
            && self.decrypted
            && config.editable
            && matches!(
                self.meta.file_type,
                FileType::OpenDocumentText
                    | FileType::OpenDocumentPresentation
                    | FileType::OpenDocumentSpreadsheet
                    | FileType::OpenDocumentGraphics
            )
    }

    /// Applies a `{"modifiedText": {cid: text}}` diff to
    /// `content.xml` and writes the patched archive to `out_path`. Every
    /// other archive entry is re-emitted byte-for-byte from the
    /// (already-decrypted) source storage.
    pub fn back_translate(&self, diff: &[u8], out_path: &std::path::Path, config: &Config) -> Result<bool> {
        if !self.can_back_translate(config) {
            return Ok(false);
        }
        let Some(storage) = self.storage() else { return Ok(false) };

        let parsed: DiffPayload = serde_json::from_slice(diff).map_err(|e| Error::ParseError(e.to_string()))?;
        let modified: HashMap<u32, String> = parsed
            .modified_text
            .into_iter()
            .filter_map(|(k, v)| k.parse::<u32>().ok().map(|id| (id, v)))
            .collect();

        let content_path = Path::new("content.xml");
        let mut content_source = storage.read(&content_path)?;
        let content_bytes = read_all(content_source.as_mut())?;
        let patched = backtranslate::apply_diff(&content_bytes, &modified, false)?;

        let out_bytes = build_patched_zip(storage, "content.xml", &patched)?;
        std::fs::write(out_path, out_bytes)?;
        Ok(true)
    }
}

#[derive(serde::Deserialize)]
struct DiffPayload {
    #[serde(rename = "modifiedText", default)]
    modified_text: HashMap<String, String>,
}

/// Re-emits every file reachable from `storage`'s root into a fresh ZIP
/// archive, substituting `new_contents` for `entry_name` and copying every
/// other entry through unmodified. Reading through `Storage` rather than the
/// original archive bytes keeps this correct even when the source was
/// opened from an encrypted container.
fn build_patched_zip(storage: &dyn Storage, entry_name: &str, new_contents: &[u8]) -> Result<Vec<u8>> {
    use std::io::Write as _;
    use zip::write::SimpleFileOptions;

    let mut paths = Vec::new();
    storage.walk(&Path::root(), &mut |p| paths.push(p.clone()));

    let mut out = Cursor::new(Vec::new());
    let mut writer = zip::ZipWriter::new(&mut out);
    for path in paths {
        if storage.is_directory(&path) {
            continue;
        }
        let name = path.as_str().to_string();
        writer
            .start_file(&name, SimpleFileOptions::default())
            .map_err(|e| Error::ZipError(e.to_string()))?;
        if name == entry_name {
            writer.write_all(new_contents)?;
        } else {
            let mut source = storage.read(&path)?;
            let bytes = read_all(source.as_mut())?;
            writer.write_all(&bytes)?;
        }
    }
    writer.finish().map_err(|e| Error::ZipError(e.to_string()))?;
    Ok(out.into_inner())
}

fn unlock_ooxml_envelope(storage: &dyn Storage, password: &str) -> Result<Box<dyn Storage>> {
    #[cfg(feature = "ooxml_encryption")]
    {
        crypto::unlock_ooxml_cfb(storage, password)
    }
    #[cfg(not(feature = "ooxml_encryption"))]
    {
        let _ = (storage, password);
        Err(Error::FeatureDisabled("ooxml_encryption".to_string()))
    }
}

/// Classifies a freshly probed `Storage`: ODF (by mimetype/manifest), then
/// OOXML (by canonical part presence), then an OOXML encryption envelope,
/// then the CFB legacy fallback. The CFB branch is infallible: any
/// container that parsed as CFB at all resolves to at least the generic
/// `FileType::Cfb`, never an error - only a plain byte buffer that isn't a
/// Zip or CFB container to begin with fails to classify (caught earlier, by
/// `storage::open_bytes` itself).
fn classify(storage: &dyn Storage, manifest: Option<&Manifest>) -> Result<(FileType, Family)> {
    if let Ok(ty) = meta::probe_odf_type(storage, manifest) {
        return Ok((ty, Family::Odf));
    }
    if let Ok(ty) = meta::probe_ooxml_type(storage) {
        return Ok((ty, Family::Ooxml));
    }
    if meta::is_ooxml_encryption_envelope(storage) {
        return Ok((FileType::OfficeOpenXmlEncrypted, Family::OoxmlEncryptedCfb));
    }
    Ok((meta::probe_legacy_cfb_type(storage), Family::Legacy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_starts_unopened() {
        let doc = Document::new();
        assert!(!doc.can_translate());
        assert_eq!(doc.meta().file_type, FileType::Unknown);
    }

    #[test]
    fn open_rejects_garbage_bytes() {
        let mut doc = Document::new();
        assert!(!doc.open(b"not an office file"));
        assert_eq!(doc.meta().file_type, FileType::Unknown);
    }

    #[test]
    fn decrypt_before_open_fails() {
        let mut doc = Document::new();
        assert!(!doc.decrypt("password"));
    }

    #[test]
    fn guess_classifies_without_mutating_any_document() {
        let zip_bytes = minimal_odt_zip();
        let ty = Document::guess(&zip_bytes).unwrap();
        assert_eq!(ty, FileType::OpenDocumentText);
    }

    #[test]
    fn open_unencrypted_odt_reports_not_encrypted() {
        let zip_bytes = minimal_odt_zip();
        let mut doc = Document::new();
        assert!(doc.open(&zip_bytes));
        assert!(!doc.meta().encrypted);
        assert_eq!(doc.meta().file_type, FileType::OpenDocumentText);
        assert_eq!(doc.meta().entry_count, 0);
    }

    #[test]
    fn back_translate_refuses_when_not_editable() {
        let zip_bytes = minimal_odt_zip();
        let mut doc = Document::new();
        assert!(doc.open(&zip_bytes));
        let config = Config::default();
        assert!(!doc.can_back_translate(&config));
    }

    fn minimal_odt_zip() -> Vec<u8> {
        use std::io::Write as _;
        use zip::write::SimpleFileOptions;

        let mut buf = std::io::Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(&mut buf);
        writer.start_file("mimetype", SimpleFileOptions::default()).unwrap();
        writer
            .write_all(b"application/vnd.oasis.opendocument.text")
            .unwrap();
        writer
            .start_file("content.xml", SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(
                br#"<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0">
                    <office:body><office:text/></office:body>
                </office:document-content>"#,
            )
            .unwrap();
        writer.finish().unwrap();
        buf.into_inner()
    }
}
