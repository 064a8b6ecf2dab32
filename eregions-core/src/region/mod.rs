//! Regions and the directory that stores them.
//!
//! [`RegionDirectory`] is the storage port. [`RegionService`] layers the plugin's rules on top
//! of it: overlap checks, default flags, ownership bookkeeping.

pub mod flags;
pub mod memory;
pub mod model;
pub mod service;

use thiserror::Error;

pub use flags::{BORDER_VIEW_FLAG, CREATOR_FLAG, EXPELLED_FLAG, FlagKind, FlagRegistry};
pub use memory::MemoryRegionDirectory;
pub use model::{FlagEntry, FlagState, FlagValue, Region, RegionGroup};
pub use service::RegionService;

/// A failure of the region store itself.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A region with this id already exists in the world.
    #[error("region '{0}' already exists")]
    Duplicate(String),
    /// Reading or writing the backing file failed.
    #[error("region storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The backing file is not valid region JSON.
    #[error("region storage is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The store cannot be reached.
    #[error("region storage unavailable: {0}")]
    Unavailable(String),
}

/// Why a region could not be created.
#[derive(Debug, Error)]
pub enum CreateRegionError {
    /// A region with this name already exists in the world.
    #[error("region '{0}' already exists")]
    AlreadyExists(String),
    /// The new bounds overlap these regions.
    #[error("selection overlaps {}", .0.join(", "))]
    Overlap(Vec<String>),
    /// The store failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Why a flag could not be changed.
#[derive(Debug, Error)]
pub enum FlagError {
    /// No flag with this name is registered.
    #[error("unknown flag '{0}'")]
    UnknownFlag(String),
    /// The value does not fit the flag's kind.
    #[error("invalid value '{value}' for flag '{flag}'")]
    InvalidValue {
        /// The flag name.
        flag: String,
        /// The rejected input.
        value: String,
    },
    /// The region does not exist.
    #[error("region '{0}' not found")]
    RegionNotFound(String),
    /// The store failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Storage of regions, per world.
///
/// Region ids are matched ignoring case.
pub trait RegionDirectory: Send + Sync {
    /// Every region in the world, in a stable order.
    ///
    /// # Errors
    /// Fails if the store cannot be read.
    fn regions(&self, world: &str) -> Result<Vec<Region>, DirectoryError>;

    /// Looks up one region.
    ///
    /// # Errors
    /// Fails if the store cannot be read.
    fn region(&self, world: &str, id: &str) -> Result<Option<Region>, DirectoryError>;

    /// Adds a region.
    ///
    /// # Errors
    /// Fails with [`DirectoryError::Duplicate`] if the id is taken.
    fn add_region(&self, world: &str, region: Region) -> Result<(), DirectoryError>;

    /// Removes a region, returning it if it existed.
    ///
    /// # Errors
    /// Fails if the store cannot be written.
    fn remove_region(&self, world: &str, id: &str) -> Result<Option<Region>, DirectoryError>;

    /// Applies `update` to a region in place. Returns false if the region does not exist.
    ///
    /// # Errors
    /// Fails if the store cannot be written.
    fn update_region(
        &self,
        world: &str,
        id: &str,
        update: &mut dyn FnMut(&mut Region),
    ) -> Result<bool, DirectoryError>;

    /// Persists pending changes.
    ///
    /// # Errors
    /// Fails if the store cannot be written.
    fn save(&self) -> Result<(), DirectoryError>;
}
