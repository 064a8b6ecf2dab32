//! A region directory kept in memory and saved as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{DirectoryError, Region, RegionDirectory};

type Worlds = FxHashMap<String, BTreeMap<String, Region>>;

/// An in-process region store, optionally saved to a JSON file.
#[derive(Debug, Default)]
pub struct MemoryRegionDirectory {
    worlds: RwLock<Worlds>,
    path: Option<PathBuf>,
}

impl MemoryRegionDirectory {
    /// An empty store that is never written to disk.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the store saved at `path`, or an empty one if the file does not exist yet.
    ///
    /// # Errors
    /// Fails if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref().to_path_buf();
        let worlds = if path.exists() {
            let json = fs::read_to_string(&path)?;
            serde_json::from_str(&json)?
        } else {
            Worlds::default()
        };

        let count: usize = worlds.values().map(BTreeMap::len).sum();
        log::info!("Loaded {count} regions from {}", path.display());

        Ok(Self {
            worlds: RwLock::new(worlds),
            path: Some(path),
        })
    }
}

fn key(id: &str) -> String {
    id.to_ascii_lowercase()
}

impl RegionDirectory for MemoryRegionDirectory {
    fn regions(&self, world: &str) -> Result<Vec<Region>, DirectoryError> {
        Ok(self
            .worlds
            .read()
            .get(world)
            .map(|regions| regions.values().cloned().collect())
            .unwrap_or_default())
    }

    fn region(&self, world: &str, id: &str) -> Result<Option<Region>, DirectoryError> {
        Ok(self
            .worlds
            .read()
            .get(world)
            .and_then(|regions| regions.get(&key(id)).cloned()))
    }

    fn add_region(&self, world: &str, region: Region) -> Result<(), DirectoryError> {
        let mut worlds = self.worlds.write();
        let regions = worlds.entry(world.to_string()).or_default();
        let id = key(&region.id);
        if regions.contains_key(&id) {
            return Err(DirectoryError::Duplicate(region.id));
        }
        regions.insert(id, region);
        Ok(())
    }

    fn remove_region(&self, world: &str, id: &str) -> Result<Option<Region>, DirectoryError> {
        Ok(self
            .worlds
            .write()
            .get_mut(world)
            .and_then(|regions| regions.remove(&key(id))))
    }

    fn update_region(
        &self,
        world: &str,
        id: &str,
        update: &mut dyn FnMut(&mut Region),
    ) -> Result<bool, DirectoryError> {
        let mut worlds = self.worlds.write();
        let Some(region) = worlds
            .get_mut(world)
            .and_then(|regions| regions.get_mut(&key(id)))
        else {
            return Ok(false);
        };
        update(region);
        Ok(true)
    }

    fn save(&self) -> Result<(), DirectoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&*self.worlds.read())?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        log::debug!("Saved regions to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use eregions_utils::{BlockPos, Cuboid};

    use super::*;

    fn region(id: &str) -> Region {
        Region::new(
            id,
            Cuboid::from_corners(BlockPos::new(0, 0, 0), BlockPos::new(3, 3, 3)),
        )
    }

    #[test]
    fn test_ids_ignore_case_and_duplicates_fail() {
        let directory = MemoryRegionDirectory::new();
        directory.add_region("world", region("Base")).expect("add");
        assert!(directory.region("world", "BASE").expect("read").is_some());
        assert!(matches!(
            directory.add_region("world", region("base")),
            Err(DirectoryError::Duplicate(_))
        ));
        assert!(directory.region("nether", "base").expect("read").is_none());
    }

    #[test]
    fn test_regions_are_sorted_by_id() {
        let directory = MemoryRegionDirectory::new();
        for id in ["c", "a", "b"] {
            directory.add_region("world", region(id)).expect("add");
        }
        let ids: Vec<String> = directory
            .regions("world")
            .expect("read")
            .into_iter()
            .map(|region| region.id)
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_update_and_remove() {
        let directory = MemoryRegionDirectory::new();
        directory.add_region("world", region("home")).expect("add");

        let updated = directory
            .update_region("world", "home", &mut |region| region.priority = 7)
            .expect("update");
        assert!(updated);
        assert_eq!(
            directory.region("world", "home").expect("read").map(|r| r.priority),
            Some(7)
        );
        assert!(!directory
            .update_region("world", "missing", &mut |_| {})
            .expect("update"));

        assert!(directory.remove_region("world", "home").expect("remove").is_some());
        assert!(directory.remove_region("world", "home").expect("remove").is_none());
    }

    #[test]
    fn test_save_and_open() {
        let dir = std::env::temp_dir().join(format!("eregions-regions-{}", uuid::Uuid::new_v4()));
        let path = dir.join("regions.json");

        let directory = MemoryRegionDirectory::open(&path).expect("open empty");
        directory.add_region("world", region("home")).expect("add");
        directory.save().expect("save");

        let reopened = MemoryRegionDirectory::open(&path).expect("reopen");
        assert!(reopened.region("world", "home").expect("read").is_some());

        fs::remove_dir_all(dir).ok();
    }
}
