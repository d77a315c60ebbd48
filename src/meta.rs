//! Meta parser (L5): file-type detection and entry (page/sheet)
//! enumeration, without building the full element graph.

use crate::common::{Error, Result};
use crate::path::Path;
use crate::storage::Storage;
use crate::stream::read_all;
use crate::table::estimate_dimensions;
use crate::xml::Element;

/// Document type recognized by the meta probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum FileType {
    #[default]
    Unknown,
    OpenDocumentText,
    OpenDocumentPresentation,
    OpenDocumentSpreadsheet,
    OpenDocumentGraphics,
    OfficeOpenXmlDocument,
    OfficeOpenXmlPresentation,
    OfficeOpenXmlWorkbook,
    OfficeOpenXmlEncrypted,
    LegacyWord,
    LegacyPowerPoint,
    LegacyExcel,
    Pdf,
    Text,
    Csv,
    Rtf,
    Markdown,
    Zip,
    Cfb,
}

/// One page/sheet/slide entry within a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileMetaEntry {
    pub name: String,
    pub row_count: u32,
    pub col_count: u32,
    pub notes: Option<String>,
}

/// Top-level document metadata, returned by probing a [`Storage`] without
/// building the element graph.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct FileMeta {
    pub file_type: FileType,
    pub encrypted: bool,
    pub entry_count: u32,
    pub entries: Vec<FileMetaEntry>,
}

const ODF_MIME_TEXT: &str = "application/vnd.oasis.opendocument.text";
const ODF_MIME_PRESENTATION: &str = "application/vnd.oasis.opendocument.presentation";
const ODF_MIME_SPREADSHEET: &str = "application/vnd.oasis.opendocument.spreadsheet";
const ODF_MIME_GRAPHICS: &str = "application/vnd.oasis.opendocument.graphics";

fn odf_type_from_mime(mime: &str) -> Option<FileType> {
    Some(match mime {
        ODF_MIME_TEXT => FileType::OpenDocumentText,
        ODF_MIME_PRESENTATION => FileType::OpenDocumentPresentation,
        ODF_MIME_SPREADSHEET => FileType::OpenDocumentSpreadsheet,
        ODF_MIME_GRAPHICS => FileType::OpenDocumentGraphics,
        _ => return None,
    })
}

/// Determines ODF document type: `/mimetype` entry first, falling back to
/// the root entry's `manifest:media-type` in `META-INF/manifest.xml`.
/// Returns `Err(NoOpenDocumentFile)` if neither marker is present.
pub fn probe_odf_type(storage: &dyn Storage, manifest: Option<&crate::crypto::Manifest>) -> Result<FileType> {
    let mimetype_path = Path::new("mimetype");
    if storage.is_file(&mimetype_path) {
        let mut source = storage.read(&mimetype_path)?;
        let bytes = read_all(source.as_mut())?;
        let mime = String::from_utf8_lossy(&bytes);
        if let Some(ty) = odf_type_from_mime(mime.trim()) {
            return Ok(ty);
        }
    }

    if let Some(manifest) = manifest {
        if let Some(mime) = manifest.root_media_type.as_deref() {
            if let Some(ty) = odf_type_from_mime(mime) {
                return Ok(ty);
            }
        }
    }

    Err(Error::NoOpenDocumentFile)
}

/// Determines OOXML document type by the presence of the canonical main
/// part for each application. Returns `Err(NoOfficeOpenXmlFile)` if none of
/// the three markers are present.
pub fn probe_ooxml_type(storage: &dyn Storage) -> Result<FileType> {
    if storage.is_file(&Path::new("word/document.xml")) {
        return Ok(FileType::OfficeOpenXmlDocument);
    }
    if storage.is_file(&Path::new("ppt/presentation.xml")) {
        return Ok(FileType::OfficeOpenXmlPresentation);
    }
    if storage.is_file(&Path::new("xl/workbook.xml")) {
        return Ok(FileType::OfficeOpenXmlWorkbook);
    }
    Err(Error::NoOfficeOpenXmlFile)
}

/// True if a CFB container looks like an OOXML-in-CFB encryption envelope:
/// both `EncryptionInfo` and `EncryptedPackage` streams present at the
/// top level.
pub fn is_ooxml_encryption_envelope(storage: &dyn Storage) -> bool {
    storage.is_file(&Path::new("EncryptionInfo")) && storage.is_file(&Path::new("EncryptedPackage"))
}

/// Determines a CFB container's legacy binary format by its well-known
/// top-level stream names, once it's already been ruled out as an OOXML
/// encryption envelope. `Workbook` covers Excel 97-2003; older Excel
/// 5.0/95 files use `Book` instead. A CFB container matching none of these
/// falls back to the generic `FileType::Cfb`, never `Unknown` - any
/// container that parsed as CFB at all is a recognized, if unclassified,
/// file.
pub fn probe_legacy_cfb_type(storage: &dyn Storage) -> FileType {
    if storage.is_file(&Path::new("WordDocument")) {
        FileType::LegacyWord
    } else if storage.is_file(&Path::new("PowerPoint Document")) {
        FileType::LegacyPowerPoint
    } else if storage.is_file(&Path::new("Workbook")) || storage.is_file(&Path::new("Book")) {
        FileType::LegacyExcel
    } else {
        FileType::Cfb
    }
}

/// Parses `meta.xml`'s `<meta:document-statistic>` attributes, seeding
/// page/table counts. Missing file or element yields `None` rather than
/// failing the whole probe.
pub fn parse_document_statistic(storage: &dyn Storage) -> Option<u32> {
    let path = Path::new("meta.xml");
    if !storage.is_file(&path) {
        return None;
    }
    let mut source = storage.read(&path).ok()?;
    let bytes = read_all(source.as_mut()).ok()?;
    let root = Element::parse(&bytes).ok()?;

    let mut statistic = None;
    root.visit_descendants(&mut |el| {
        if statistic.is_none() && el.local_name() == "document-statistic" {
            statistic = el
                .attr("meta:page-count")
                .or_else(|| el.attr("meta:table-count"))
                .and_then(|v| v.parse::<u32>().ok());
        }
    });
    statistic
}

/// Enumerates `content.xml`'s entries: each `draw:page` (presentation) or
/// `table:table` (spreadsheet), with dimensions estimated via the table
/// cursor for spreadsheets.
pub fn enumerate_content_entries(
    storage: &dyn Storage,
    file_type: FileType,
    limit_rows: u32,
    limit_cols: u32,
) -> Result<Vec<FileMetaEntry>> {
    let path = Path::new("content.xml");
    if !storage.is_file(&path) {
        return Ok(Vec::new());
    }
    let mut source = storage.read(&path)?;
    let bytes = read_all(source.as_mut())?;
    let root = Element::parse(&bytes)?;

    let mut entries = Vec::new();
    match file_type {
        FileType::OpenDocumentPresentation => {
            root.visit_descendants(&mut |el| {
                if el.local_name() == "page" && el.tag.starts_with("draw:") {
                    entries.push(FileMetaEntry {
                        name: el.attr("draw:name").unwrap_or_default().to_string(),
                        row_count: 0,
                        col_count: 0,
                        notes: None,
                    });
                }
            });
        },
        FileType::OpenDocumentSpreadsheet => {
            root.visit_descendants(&mut |el| {
                if el.local_name() == "table" && el.tag.starts_with("table:") {
                    let dims = estimate_dimensions(el, limit_rows, limit_cols);
                    entries.push(FileMetaEntry {
                        name: el.attr("table:name").unwrap_or_default().to_string(),
                        row_count: dims.rows,
                        col_count: dims.cols,
                        notes: None,
                    });
                }
            });
        },
        _ => {},
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_body_yields_no_entries() {
        let xml = br#"<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0">
            <office:body><office:text/></office:body>
        </office:document-content>"#;
        let root = Element::parse(xml).unwrap();
        let mut entries = Vec::new();
        root.visit_descendants(&mut |el| {
            if el.local_name() == "page" {
                entries.push(el);
            }
        });
        assert!(entries.is_empty());
    }

    struct FakeStorage(Vec<&'static str>);

    impl Storage for FakeStorage {
        fn is_file(&self, path: &Path) -> bool {
            self.0.iter().any(|n| *n == path.as_str())
        }
        fn is_directory(&self, _path: &Path) -> bool {
            false
        }
        fn size(&self, _path: &Path) -> Option<u64> {
            None
        }
        fn read(&self, _path: &Path) -> Result<Box<dyn crate::stream::Source>> {
            Err(Error::ComponentNotFound("fake".to_string()))
        }
        fn visit(&self, _path: &Path, _f: &mut dyn FnMut(&Path)) {}
    }

    #[test]
    fn legacy_cfb_streams_map_to_known_types() {
        assert_eq!(
            probe_legacy_cfb_type(&FakeStorage(vec!["WordDocument"])),
            FileType::LegacyWord
        );
        assert_eq!(
            probe_legacy_cfb_type(&FakeStorage(vec!["PowerPoint Document"])),
            FileType::LegacyPowerPoint
        );
        assert_eq!(
            probe_legacy_cfb_type(&FakeStorage(vec!["Workbook"])),
            FileType::LegacyExcel
        );
        assert_eq!(probe_legacy_cfb_type(&FakeStorage(vec![])), FileType::Cfb);
    }

    #[test]
    fn odf_mime_maps_to_known_types() {
        assert_eq!(odf_type_from_mime(ODF_MIME_TEXT), Some(FileType::OpenDocumentText));
        assert_eq!(
            odf_type_from_mime(ODF_MIME_SPREADSHEET),
            Some(FileType::OpenDocumentSpreadsheet)
        );
        assert_eq!(odf_type_from_mime("bogus/type"), None);
    }
}
