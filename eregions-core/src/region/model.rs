//! Region data as stored in the directory.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use eregions_utils::{Cuboid, PlayerId};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// The two values of a state flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagState {
    /// The action is permitted.
    Allow,
    /// The action is refused.
    Deny,
}

impl Display for FlagState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        })
    }
}

/// The value of a flag on a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FlagValue {
    /// An allow/deny state.
    State(FlagState),
    /// Free text.
    Text(String),
    /// A whole number.
    Integer(i64),
    /// A decimal number.
    Double(f64),
    /// A boolean.
    Boolean(bool),
}

impl Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State(state) => state.fmt(f),
            Self::Text(text) => f.write_str(text),
            Self::Integer(value) => value.fmt(f),
            Self::Double(value) => value.fmt(f),
            Self::Boolean(value) => value.fmt(f),
        }
    }
}

/// Who a flag applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionGroup {
    /// Everyone.
    All,
    /// Members and owners.
    Members,
    /// Owners only.
    Owners,
    /// Everyone who is not a member.
    NonMembers,
    /// Everyone who is not an owner.
    NonOwners,
}

impl RegionGroup {
    /// Every group, in display order.
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Members,
        Self::Owners,
        Self::NonMembers,
        Self::NonOwners,
    ];

    /// The lowercase name used in commands.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Members => "members",
            Self::Owners => "owners",
            Self::NonMembers => "nonmembers",
            Self::NonOwners => "nonowners",
        }
    }
}

impl Display for RegionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegionGroup {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|group| group.name().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// A flag value together with the group it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagEntry {
    /// The value.
    pub value: FlagValue,
    /// The group the value applies to. `None` means the flag's default group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<RegionGroup>,
}

/// A protected cuboid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Lowercase identifier, unique per world.
    pub id: String,
    /// The protected box.
    pub bounds: Cuboid,
    /// Higher priorities win where regions meet.
    pub priority: i32,
    /// Players who manage the region.
    #[serde(default)]
    pub owners: FxHashSet<PlayerId>,
    /// Players allowed to build.
    #[serde(default)]
    pub members: FxHashSet<PlayerId>,
    /// Flags by name.
    #[serde(default)]
    pub flags: BTreeMap<String, FlagEntry>,
}

impl Region {
    /// Creates an empty region. The id is lowercased.
    #[must_use]
    pub fn new(id: &str, bounds: Cuboid) -> Self {
        Self {
            id: id.to_ascii_lowercase(),
            bounds,
            priority: 0,
            owners: FxHashSet::default(),
            members: FxHashSet::default(),
            flags: BTreeMap::new(),
        }
    }

    /// True if the player is an owner.
    #[must_use]
    pub fn is_owner(&self, player: PlayerId) -> bool {
        self.owners.contains(&player)
    }

    /// Owners count as members.
    #[must_use]
    pub fn is_member(&self, player: PlayerId) -> bool {
        self.is_owner(player) || self.members.contains(&player)
    }

    /// The value of a flag, if set.
    #[must_use]
    pub fn flag(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name).map(|entry| &entry.value)
    }

    /// The value of a state flag, if set.
    #[must_use]
    pub fn state_flag(&self, name: &str) -> Option<FlagState> {
        match self.flag(name)? {
            FlagValue::State(state) => Some(*state),
            _ => None,
        }
    }

    /// Sets or replaces a flag.
    pub fn set_flag(&mut self, name: &str, value: FlagValue, group: Option<RegionGroup>) {
        self.flags
            .insert(name.to_string(), FlagEntry { value, group });
    }
}

#[cfg(test)]
mod tests {
    use eregions_utils::BlockPos;

    use super::*;

    #[test]
    fn test_region_membership() {
        let mut region = Region::new(
            "Base1",
            Cuboid::from_corners(BlockPos::new(0, 0, 0), BlockPos::new(1, 1, 1)),
        );
        let owner = PlayerId::random();
        let member = PlayerId::random();
        region.owners.insert(owner);
        region.members.insert(member);

        assert_eq!(region.id, "base1");
        assert!(region.is_member(owner));
        assert!(region.is_member(member));
        assert!(!region.is_owner(member));
    }

    #[test]
    fn test_region_group_parse() {
        assert_eq!("NonMembers".parse(), Ok(RegionGroup::NonMembers));
        assert_eq!("everyone".parse::<RegionGroup>(), Err(()));
    }

    #[test]
    fn test_region_serde() {
        let mut region = Region::new(
            "home",
            Cuboid::from_corners(BlockPos::new(0, 0, 0), BlockPos::new(4, 4, 4)),
        );
        region.set_flag("pvp", FlagValue::State(FlagState::Deny), Some(RegionGroup::NonMembers));
        let json = serde_json::to_string(&region).expect("serialize");
        let back: Region = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, region);
        assert_eq!(back.state_flag("pvp"), Some(FlagState::Deny));
    }
}
