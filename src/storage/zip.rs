//! ZIP-backed `Storage`, reading and writing archives via the `zip` crate.

use std::io::Cursor;
use std::io::Read as _;

use parking_lot::Mutex;

use super::Storage;
use crate::common::{Error, Result};
use crate::path::Path;
use crate::stream::Source;

pub struct ZipStorage {
    archive: Mutex<zip::ZipArchive<Cursor<Vec<u8>>>>,
    names: Vec<String>,
}

impl ZipStorage {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::ZipError(e.to_string()))?;
        let names = archive.file_names().map(|s| s.to_string()).collect();
        Ok(Self {
            archive: Mutex::new(archive),
            names,
        })
    }

    fn normalized(&self, path: &Path) -> String {
        path.as_str().trim_start_matches('/').to_string()
    }
}

impl Storage for ZipStorage {
    fn is_file(&self, path: &Path) -> bool {
        let name = self.normalized(path);
        self.names.iter().any(|n| n == &name && !n.ends_with('/'))
    }

    fn is_directory(&self, path: &Path) -> bool {
        let name = self.normalized(path);
        if name.is_empty() {
            return true;
        }
        let dir_name = format!("{}/", name.trim_end_matches('/'));
        self.names
            .iter()
            .any(|n| n == &dir_name || (n.starts_with(&dir_name) && n != &name))
    }

    fn size(&self, path: &Path) -> Option<u64> {
        let name = self.normalized(path);
        let mut archive = self.archive.lock();
        archive.by_name(&name).ok().map(|f| f.size())
    }

    fn read(&self, path: &Path) -> Result<Box<dyn Source>> {
        let name = self.normalized(path);
        let mut archive = self.archive.lock();
        let mut file = archive
            .by_name(&name)
            .map_err(|_| Error::ComponentNotFound(name.clone()))?;
        let mut buf = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buf)?;
        Ok(Box::new(Cursor::new(buf)))
    }

    fn visit(&self, path: &Path, f: &mut dyn FnMut(&Path)) {
        let prefix = self.normalized(path);
        let prefix = if prefix.is_empty() {
            String::new()
        } else {
            format!("{}/", prefix.trim_end_matches('/'))
        };
        let mut seen = std::collections::HashSet::new();
        for name in &self.names {
            let Some(rest) = name.strip_prefix(prefix.as_str()) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            let child = match rest.find('/') {
                Some(idx) => &rest[..idx],
                None => rest,
            };
            if seen.insert(child.to_string()) {
                f(&Path::new(format!("{}{}", prefix, child)));
            }
        }
    }
}
