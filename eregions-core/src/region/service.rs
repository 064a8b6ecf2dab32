//! Region creation, rosters and flags, enforced on top of a [`super::RegionDirectory`].

use std::sync::Arc;

use eregions_utils::{BlockPos, Cuboid, PlayerId};

use super::{
    BORDER_VIEW_FLAG, CREATOR_FLAG, CreateRegionError, DirectoryError, EXPELLED_FLAG, FlagError,
    FlagRegistry, FlagState, FlagValue, Region, RegionDirectory, RegionGroup,
};
use crate::config::ConfigStore;
use crate::host::PlayerSnapshot;

/// The plugin's view of the region directory.
pub struct RegionService {
    directory: Arc<dyn RegionDirectory>,
    flags: FlagRegistry,
    config: Arc<ConfigStore>,
}

impl RegionService {
    /// Wraps `directory` with the built-in flag registry.
    #[must_use]
    pub fn new(directory: Arc<dyn RegionDirectory>, config: Arc<ConfigStore>) -> Self {
        Self {
            directory,
            flags: FlagRegistry::with_defaults(),
            config,
        }
    }

    /// The flags regions may carry.
    #[must_use]
    pub const fn flag_registry(&self) -> &FlagRegistry {
        &self.flags
    }

    /// Creates a region owned by `owner` spanning the two corners.
    ///
    /// Nothing is written unless every check passes. If saving fails the region is taken out
    /// again.
    ///
    /// # Errors
    /// See [`CreateRegionError`].
    pub fn create_region(
        &self,
        world: &str,
        name: &str,
        a: BlockPos,
        b: BlockPos,
        owner: &PlayerSnapshot,
    ) -> Result<Region, CreateRegionError> {
        if self.directory.region(world, name)?.is_some() {
            return Err(CreateRegionError::AlreadyExists(name.to_string()));
        }

        let bounds = Cuboid::from_corners(a, b);
        let overlapping = self.overlapping(world, &bounds)?;
        if !overlapping.is_empty() {
            return Err(CreateRegionError::Overlap(overlapping));
        }

        let config = self.config.get();
        let defaults = &config.worldguard;
        let mut region = Region::new(name, bounds);
        region.priority = defaults.default_priority;
        region.owners.insert(owner.id);

        for pair in &defaults.default_flags {
            let Some((flag, value)) = pair.split_once('=') else {
                continue;
            };
            match self.flags.parse(flag.trim(), value) {
                Ok(value) => region.set_flag(flag.trim(), value, None),
                Err(error) => log::warn!("Skipping default flag '{pair}': {error}"),
            }
        }
        if defaults.border_view_on_create {
            region.set_flag(BORDER_VIEW_FLAG, FlagValue::State(FlagState::Allow), None);
        }
        region.set_flag(CREATOR_FLAG, FlagValue::Text(owner.name.clone()), None);

        self.directory.add_region(world, region.clone())?;
        if let Err(error) = self.directory.save() {
            self.directory.remove_region(world, &region.id)?;
            return Err(error.into());
        }

        log::info!(
            "Region '{}' created in {world} by {} at {}",
            region.id,
            owner.name,
            region.bounds
        );
        Ok(region)
    }

    /// Ids of regions in the world that share a block with `bounds`.
    ///
    /// # Errors
    /// Fails if the directory cannot be read.
    pub fn overlapping(&self, world: &str, bounds: &Cuboid) -> Result<Vec<String>, DirectoryError> {
        Ok(self
            .directory
            .regions(world)?
            .into_iter()
            .filter(|region| region.bounds.intersects(bounds))
            .map(|region| region.id)
            .collect())
    }

    /// Looks up one region.
    ///
    /// # Errors
    /// Fails if the directory cannot be read.
    pub fn region(&self, world: &str, name: &str) -> Result<Option<Region>, DirectoryError> {
        self.directory.region(world, name)
    }

    /// Removes a region. Returns false if it did not exist. If saving fails the region is put
    /// back.
    ///
    /// # Errors
    /// Fails if the directory cannot be written.
    pub fn remove_region(&self, world: &str, name: &str) -> Result<bool, DirectoryError> {
        let Some(removed) = self.directory.remove_region(world, name)? else {
            return Ok(false);
        };
        if let Err(error) = self.directory.save() {
            self.directory.add_region(world, removed)?;
            return Err(error);
        }
        log::info!("Region '{name}' removed from {world}");
        Ok(true)
    }

    /// Returns true if the player owns the region. Lookup failures count as not owning it.
    #[must_use]
    pub fn is_owner(&self, world: &str, name: &str, player: PlayerId) -> bool {
        self.lookup(world, name)
            .is_some_and(|region| region.is_owner(player))
    }

    /// Returns true if the player is a member or owner of the region.
    #[must_use]
    pub fn is_member(&self, world: &str, name: &str, player: PlayerId) -> bool {
        self.lookup(world, name)
            .is_some_and(|region| region.is_member(player))
    }

    /// Ids of the regions the player owns in the world.
    #[must_use]
    pub fn owned_regions(&self, world: &str, player: PlayerId) -> Vec<String> {
        match self.directory.regions(world) {
            Ok(regions) => regions
                .into_iter()
                .filter(|region| region.is_owner(player))
                .map(|region| region.id)
                .collect(),
            Err(error) => {
                log::error!("Failed to list regions of {world}: {error}");
                Vec::new()
            }
        }
    }

    /// Ids of every region in the world.
    #[must_use]
    pub fn region_ids(&self, world: &str) -> Vec<String> {
        self.directory
            .regions(world)
            .map(|regions| regions.into_iter().map(|region| region.id).collect())
            .unwrap_or_default()
    }

    /// Adds a member. Returns false if the region does not exist.
    ///
    /// # Errors
    /// Fails if the directory cannot be written.
    pub fn add_member(
        &self,
        world: &str,
        name: &str,
        target: &PlayerSnapshot,
    ) -> Result<bool, DirectoryError> {
        self.modify(world, name, |region| {
            region.members.insert(target.id);
        })
    }

    /// Removes a member and records them as expelled.
    ///
    /// # Errors
    /// Fails if the directory cannot be written.
    pub fn remove_member(
        &self,
        world: &str,
        name: &str,
        target: &PlayerSnapshot,
    ) -> Result<bool, DirectoryError> {
        self.modify(world, name, |region| {
            region.members.remove(&target.id);
            region.set_flag(EXPELLED_FLAG, FlagValue::Text(target.name.clone()), None);
        })
    }

    /// Adds an owner.
    ///
    /// # Errors
    /// Fails if the directory cannot be written.
    pub fn add_owner(
        &self,
        world: &str,
        name: &str,
        target: &PlayerSnapshot,
    ) -> Result<bool, DirectoryError> {
        self.modify(world, name, |region| {
            region.owners.insert(target.id);
        })
    }

    /// Removes an owner and records them as expelled.
    ///
    /// # Errors
    /// Fails if the directory cannot be written.
    pub fn remove_owner(
        &self,
        world: &str,
        name: &str,
        target: &PlayerSnapshot,
    ) -> Result<bool, DirectoryError> {
        self.modify(world, name, |region| {
            region.owners.remove(&target.id);
            region.set_flag(EXPELLED_FLAG, FlagValue::Text(target.name.clone()), None);
        })
    }

    /// Sets a flag from its textual value.
    ///
    /// # Errors
    /// Fails if the flag is unknown, the value does not parse, or the region does not exist.
    pub fn set_flag(
        &self,
        world: &str,
        name: &str,
        flag: &str,
        raw_value: &str,
        group: Option<RegionGroup>,
    ) -> Result<FlagValue, FlagError> {
        let value = self.flags.parse(flag, raw_value)?;
        let stored = value.clone();
        if !self.modify(world, name, move |region| {
            region.set_flag(flag, stored.clone(), group);
        })? {
            return Err(FlagError::RegionNotFound(name.to_string()));
        }
        Ok(value)
    }

    /// Removes a flag. Clearing a flag that is not set succeeds.
    ///
    /// # Errors
    /// Fails if the flag is unknown or the region does not exist.
    pub fn clear_flag(&self, world: &str, name: &str, flag: &str) -> Result<(), FlagError> {
        if self.flags.kind(flag).is_none() {
            return Err(FlagError::UnknownFlag(flag.to_string()));
        }
        if !self.modify(world, name, |region| {
            region.flags.remove(flag);
        })? {
            return Err(FlagError::RegionNotFound(name.to_string()));
        }
        Ok(())
    }

    /// The flags of a region as `name=value` strings, sorted by name.
    ///
    /// # Errors
    /// Fails with [`FlagError::RegionNotFound`] if the region does not exist.
    pub fn flags(&self, world: &str, name: &str) -> Result<Vec<String>, FlagError> {
        let region = self
            .directory
            .region(world, name)?
            .ok_or_else(|| FlagError::RegionNotFound(name.to_string()))?;
        Ok(region
            .flags
            .iter()
            .map(|(flag, entry)| format!("{flag}={}", entry.value))
            .collect())
    }

    /// Regions in the world with `regionborder-view` set to allow.
    ///
    /// # Errors
    /// Fails if the directory cannot be read.
    pub fn border_view_regions(&self, world: &str) -> Result<Vec<Region>, DirectoryError> {
        Ok(self
            .directory
            .regions(world)?
            .into_iter()
            .filter(|region| region.state_flag(BORDER_VIEW_FLAG) == Some(FlagState::Allow))
            .collect())
    }

    /// Saves the directory.
    ///
    /// # Errors
    /// Fails if the directory cannot be written.
    pub fn save(&self) -> Result<(), DirectoryError> {
        self.directory.save()
    }

    fn lookup(&self, world: &str, name: &str) -> Option<Region> {
        self.directory
            .region(world, name)
            .inspect_err(|error| log::error!("Failed to read region '{name}': {error}"))
            .ok()
            .flatten()
    }

    /// Applies `change` and saves. A failed save restores the region as it was.
    fn modify(
        &self,
        world: &str,
        name: &str,
        mut change: impl FnMut(&mut Region),
    ) -> Result<bool, DirectoryError> {
        let mut previous = None;
        let found = self.directory.update_region(world, name, &mut |region: &mut Region| {
            previous = Some(region.clone());
            change(region);
        })?;
        let Some(previous) = previous.filter(|_| found) else {
            return Ok(false);
        };

        if let Err(error) = self.directory.save() {
            self.directory.update_region(world, name, &mut |region: &mut Region| {
                *region = previous.clone();
            })?;
            return Err(error);
        }
        Ok(true)
    }
}
