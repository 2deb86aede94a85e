use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::HistoryError;
use crate::models::{DrawHistory, GameConfig};
use crate::reconstruct::reconstruct;
use crate::source::{read_source, text_from_bytes};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    content: u64,
    config: GameConfig,
}

/// Mémoïsation des historiques reconstruits, par chemin, contenu et paramètres.
///
/// Le fichier est relu à chaque appel : une source modifiée sur disque donne
/// une nouvelle entrée.
#[derive(Debug, Default)]
pub struct HistoryCache {
    entries: Mutex<HashMap<CacheKey, Arc<DrawHistory>>>,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, path: &Path, config: &GameConfig) -> Result<Arc<DrawHistory>, HistoryError> {
        let bytes = read_source(path)?;
        let key = CacheKey {
            path: path.to_path_buf(),
            content: content_hash(&bytes),
            config: config.clone(),
        };

        if let Some(history) = self.entries().get(&key) {
            log::debug!("Historique en cache pour {:?}", path);
            return Ok(Arc::clone(history));
        }

        let text = text_from_bytes(path, &bytes)?;
        let history = Arc::new(reconstruct(&text, config)?);
        self.entries().insert(key, Arc::clone(&history));
        Ok(history)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<DrawHistory>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn content_hash(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WYNIKI: &str = "16616 01 02 03 04 05 06 07 08 09 10 11 12 13 14 15 16 17 18 19 20\n";

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("multimulti-cache-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_same_source_is_shared() {
        let path = temp_path("shared.txt");
        std::fs::write(&path, WYNIKI).unwrap();
        let cache = HistoryCache::new();
        let config = GameConfig::default();

        let first = cache.load(&path, &config).unwrap();
        let second = cache.load(&path, &config).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_changed_content_is_reparsed() {
        let path = temp_path("changed.txt");
        std::fs::write(&path, WYNIKI).unwrap();
        let cache = HistoryCache::new();
        let config = GameConfig::default();

        let first = cache.load(&path, &config).unwrap();
        std::fs::write(
            &path,
            format!("16617 21 22 23 24 25 26 27 28 29 30 31 32 33 34 35 36 37 38 39 40\n{WYNIKI}"),
        )
        .unwrap();
        let second = cache.load(&path, &config).unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert_eq!(cache.len(), 2);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_errors_are_not_cached() {
        let path = temp_path("no-draws.txt");
        std::fs::write(&path, "Strona 1 z 1").unwrap();
        let cache = HistoryCache::new();
        assert!(cache.load(&path, &GameConfig::default()).is_err());
        assert!(cache.is_empty());
        std::fs::remove_file(path).unwrap();
    }
}
