//! Embedded-file backend: the whitelist lives in a local JSON file.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::core::command::{Location, Target};
use crate::core::document::Whitelist;
use crate::io::backend::Backend;
use crate::io::error::StoreError;
use crate::io::scan::scan_locations;

/// Local JSON file store. Scoped targets resolve to `<dir>/<folder>/<file>`
/// where `<dir>` is the directory holding the default file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    default_path: PathBuf,
    root: PathBuf,
}

impl FileBackend {
    pub fn new(default_path: impl Into<PathBuf>) -> Self {
        let default_path = default_path.into();
        let root = default_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self { default_path, root }
    }

    pub fn path_for(&self, target: &Target) -> PathBuf {
        match target {
            Target::Default => self.default_path.clone(),
            Target::At(location) => self.root.join(&location.folder).join(&location.file),
        }
    }
}

impl Backend for FileBackend {
    #[instrument(skip_all, fields(target = %target))]
    fn fetch(&self, target: &Target) -> Result<Whitelist, StoreError> {
        let path = self.path_for(target);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "whitelist file missing, treating as empty");
                return Ok(Whitelist::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Whitelist::decode(&contents)?)
    }

    #[instrument(skip_all, fields(target = %target, entries = doc.len()))]
    fn store(&self, target: &Target, doc: &Whitelist, _message: &str) -> Result<(), StoreError> {
        let path = self.path_for(target);
        write_atomic(&path, &doc.to_compact()?)?;
        debug!(path = %path.display(), "whitelist written");
        Ok(())
    }

    fn locations(&self) -> Result<Vec<Location>, StoreError> {
        scan_locations(&self.root)
            .map_err(|err| StoreError::Io(std::io::Error::other(format!("{err:#}"))))
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Write via a uniquely named, hidden temp file in the same directory, then
/// rename over `path`. Readers never see a torn document.
fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
