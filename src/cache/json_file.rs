//! JSON file cache implementation

use crate::cache::{CacheEnvelope, CatalogCache};
use crate::catalog::Catalog;
use crate::config::CacheConfig;
use crate::CacheFailure;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Stores the catalog as a single JSON document at a fixed path
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    path: PathBuf,
    version: String,
}

impl JsonFileCache {
    /// Creates a cache bound to a file path and version tag
    pub fn new(path: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }

    /// Creates a cache from the `[cache]` configuration section
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(&config.path, &config.version)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Reads and validates the envelope
    ///
    /// # Returns
    ///
    /// * `Ok(Catalog)` - The stored catalog, index rebuilt
    /// * `Err(CacheFailure)` - Missing file, unreadable JSON or version mismatch
    pub fn try_load(&self) -> Result<Catalog, CacheFailure> {
        if !self.path.exists() {
            return Err(CacheFailure::Missing(self.path.display().to_string()));
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let envelope: CacheEnvelope = serde_json::from_reader(reader)?;

        if envelope.version != self.version {
            return Err(CacheFailure::VersionMismatch {
                expected: self.version.clone(),
                found: envelope.version,
            });
        }

        Ok(Catalog::from_records(envelope.records))
    }

    /// Writes the full catalog, replacing any previous snapshot
    ///
    /// The envelope is written to a sibling temporary file first and then
    /// renamed over the target, so readers never see a half-written file.
    pub fn try_save(&self, catalog: &Catalog) -> Result<(), CacheFailure> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let envelope = CacheEnvelope::new(&self.version, catalog);
        let temp_path = self.temp_path();
        let result = write_envelope(&temp_path, &envelope)
            .and_then(|()| fs::rename(&temp_path, &self.path).map_err(CacheFailure::from));

        if result.is_err() && temp_path.exists() {
            if let Err(e) = fs::remove_file(&temp_path) {
                tracing::debug!("Could not remove {}: {}", temp_path.display(), e);
            }
        }
        result
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_envelope(path: &Path, envelope: &CacheEnvelope) -> Result<(), CacheFailure> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, envelope)?;
    writer.flush()?;
    Ok(())
}

impl CatalogCache for JsonFileCache {
    fn load(&self) -> Option<Catalog> {
        match self.try_load() {
            Ok(catalog) => {
                tracing::info!(
                    "Loaded {} records from cache {}",
                    catalog.len(),
                    self.path.display()
                );
                Some(catalog)
            }
            Err(CacheFailure::Missing(_)) => {
                tracing::debug!("No cache at {}", self.path.display());
                None
            }
            Err(e) => {
                tracing::info!("Ignoring cache {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn save(&self, catalog: &Catalog) {
        match self.try_save(catalog) {
            Ok(()) => tracing::debug!(
                "Saved {} records to cache {}",
                catalog.len(),
                self.path.display()
            ),
            Err(e) => tracing::warn!("Failed to save cache {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CastMember, Record};
    use tempfile::TempDir;

    fn sample_catalog() -> Catalog {
        Catalog::from_records(vec![
            Record {
                id: Some("tt0111161".to_string()),
                title: Some("The Shawshank Redemption".to_string()),
                year: Some(1994),
                rating: Some(9.3),
                genres: vec!["Drama".to_string()],
                cast: vec![CastMember {
                    name: "Tim Robbins".to_string(),
                    image_url: Some("https://img.example/tim.jpg".to_string()),
                }],
                budget_usd: Some(25_000_000),
                details_fetched: true,
                ..Record::new(1)
            },
            Record {
                id: Some("tt0068646".to_string()),
                title: Some("The Godfather".to_string()),
                ..Record::new(2)
            },
        ])
    }

    #[test]
    fn test_round_trip_same_version() {
        let dir = TempDir::new().unwrap();
        let cache = JsonFileCache::new(dir.path().join("cache.json"), "1");
        let catalog = sample_catalog();

        cache.try_save(&catalog).unwrap();
        let loaded = cache.try_load().unwrap();

        assert_eq!(loaded.len(), catalog.len());
        assert_eq!(loaded.records(), catalog.records());
        assert_eq!(loaded.get_by_id("tt0068646").unwrap().rank, 2);
    }

    #[test]
    fn test_version_mismatch_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        JsonFileCache::new(&path, "1").save(&sample_catalog());

        let newer = JsonFileCache::new(&path, "2");
        assert!(matches!(
            newer.try_load(),
            Err(CacheFailure::VersionMismatch { .. })
        ));
        assert!(newer.load().is_none());
    }

    #[test]
    fn test_missing_file_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = JsonFileCache::new(dir.path().join("absent.json"), "1");
        assert!(matches!(cache.try_load(), Err(CacheFailure::Missing(_))));
        assert!(cache.load().is_none());
    }

    #[test]
    fn test_corrupt_file_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ not json").unwrap();

        let cache = JsonFileCache::new(&path, "1");
        assert!(matches!(
            cache.try_load(),
            Err(CacheFailure::Serialization(_))
        ));
        assert!(cache.load().is_none());
    }

    #[test]
    fn test_save_replaces_previous_content() {
        let dir = TempDir::new().unwrap();
        let cache = JsonFileCache::new(dir.path().join("cache.json"), "1");

        cache.try_save(&sample_catalog()).unwrap();
        cache
            .try_save(&Catalog::from_records(vec![Record::new(1)]))
            .unwrap();

        assert_eq!(cache.try_load().unwrap().len(), 1);
        assert!(!cache.temp_path().exists());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let cache = JsonFileCache::new(dir.path().join("nested/deeper/cache.json"), "1");
        cache.try_save(&sample_catalog()).unwrap();
        assert!(cache.path().exists());
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        // A directory at the target path makes the final rename fail
        let path = dir.path().join("cache.json");
        fs::create_dir(&path).unwrap();

        let cache = JsonFileCache::new(&path, "1");
        assert!(cache.try_save(&sample_catalog()).is_err());
        assert!(!cache.temp_path().exists());

        cache.save(&sample_catalog());
        assert!(!cache.temp_path().exists());
    }
}
