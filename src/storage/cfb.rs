//! CFB (compound file / OLE2)-backed `Storage`, wrapping [`crate::ole::OleFile`].

use std::io::Cursor;

use parking_lot::Mutex;

use super::Storage;
use crate::common::{Error, Result};
use crate::ole::OleFile;
use crate::path::Path;
use crate::stream::Source;

pub struct CfbStorage {
    file: Mutex<OleFile<Cursor<Vec<u8>>>>,
}

impl CfbStorage {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let file =
            OleFile::open(Cursor::new(bytes)).map_err(|e| Error::CorruptedFile(e.to_string()))?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    fn segments(path: &Path) -> Vec<&str> {
        path.as_str()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Storage for CfbStorage {
    fn is_file(&self, path: &Path) -> bool {
        let segments = Self::segments(path);
        if segments.is_empty() {
            return false;
        }
        let file = self.file.lock();
        file.exists(&segments) && !file.directory_exists(&segments)
    }

    fn is_directory(&self, path: &Path) -> bool {
        let segments = Self::segments(path);
        if segments.is_empty() {
            return true;
        }
        let file = self.file.lock();
        file.directory_exists(&segments)
    }

    fn size(&self, path: &Path) -> Option<u64> {
        let segments = Self::segments(path);
        let file = self.file.lock();
        file.list_directory_entries(&segments[..segments.len().saturating_sub(1)])
            .ok()
            .and_then(|entries| {
                entries
                    .into_iter()
                    .find(|e| Some(e.name.as_str()) == segments.last().copied())
                    .map(|e| e.size)
            })
    }

    fn read(&self, path: &Path) -> Result<Box<dyn Source>> {
        let segments = Self::segments(path);
        let mut file = self.file.lock();
        let data = file
            .open_stream(&segments)
            .map_err(|_| Error::ComponentNotFound(path.as_str().to_string()))?;
        Ok(Box::new(Cursor::new(data)))
    }

    fn visit(&self, path: &Path, f: &mut dyn FnMut(&Path)) {
        let segments = Self::segments(path);
        let file = self.file.lock();
        if let Ok(entries) = file.list_directory_entries(&segments) {
            for entry in entries {
                let child = if segments.is_empty() {
                    Path::new(entry.name.clone())
                } else {
                    path.join(&Path::new(entry.name.clone()))
                };
                f(&child);
            }
        }
    }
}
