use crate::localization::{Localizer, StringTable};
use crate::options::ParseOptions;
use crate::store::{KeyValueStore, MemoryStore, StoreValue};
use crate::trail::{LearningTrail, TrailError};
use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid TOML: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("Could not encode TOML: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("Invalid trail: {0}")]
    Trail(#[from] TrailError),
}

/// Read a file, reporting a missing file as `NotFound`
pub fn read_file(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Resolve a resource named relative to `base_dir`, if it exists
pub fn resolve_resource(resource: &RelativePath, base_dir: &Path) -> Option<PathBuf> {
    let path = resource.to_path(base_dir);
    if path.exists() {
        Some(path)
    } else {
        log::warn!("resource not found: {}", path.display());
        None
    }
}

/// Load and parse a trail file.
///
/// The background image is resolved against the trail file's directory. A
/// missing image is logged and left unresolved.
pub fn load_trail(
    path: &Path,
    options: &ParseOptions,
    localizer: Option<&dyn Localizer>,
) -> Result<LearningTrail, IoError> {
    let xml = read_file(path)?;
    let mut trail = LearningTrail::parse(&xml, options, localizer)?;

    let base_dir = path.parent().unwrap_or(Path::new("."));
    trail.background_image_path = trail
        .background_image
        .as_deref()
        .and_then(|image| resolve_resource(image, base_dir));
    Ok(trail)
}

/// Re-read a trail file and swap in the steps that changed.
///
/// Only does anything with authoring support enabled. Returns the indexes of
/// replaced steps.
pub fn reload_trail(
    existing: &mut LearningTrail,
    path: &Path,
    options: &ParseOptions,
    localizer: Option<&dyn Localizer>,
) -> Result<Vec<usize>, IoError> {
    if !options.authoring_support_enabled {
        log::debug!("authoring support disabled, not reloading {}", path.display());
        return Ok(Vec::new());
    }
    let reloaded = load_trail(path, options, localizer)?;
    let updated = existing.update_steps_from(reloaded);
    if !updated.is_empty() {
        log::info!("reloaded steps {updated:?} of {}", existing.identifier);
    }
    Ok(updated)
}

/// Load a TOML string table with a `[strings]` section
pub fn load_string_table(path: &Path) -> Result<StringTable, IoError> {
    let source = read_file(path)?;
    Ok(StringTable::from_toml_str(&source)?)
}

/// A key-value store kept in a TOML file.
///
/// Changes are held in memory until [`FileStore::save`].
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: MemoryStore,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, IoError> {
        let path = path.into();
        let values = if path.exists() {
            toml::from_str(&fs::read_to_string(&path)?)?
        } else {
            MemoryStore::new()
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<(), IoError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string(&self.values)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<StoreValue> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: StoreValue) {
        self.values.set(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}
