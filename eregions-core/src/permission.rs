//! Permission nodes checked by the plugin.

/// `/eregion help`.
pub const HELP: &str = "eregions.help";
/// `/eregion reload`.
pub const RELOAD: &str = "eregions.reload";
/// `/eregion create`.
pub const REGION_CREATE: &str = "eregions.region.create";
/// `/eregion cancel`.
pub const CANCEL: &str = "eregions.create";
/// `/eregion remove`.
pub const REGION_REMOVE: &str = "eregions.region.remove";
/// `/eregion member`.
pub const REGION_MEMBERS: &str = "eregions.region.members";
/// `/eregion owner`.
pub const REGION_OWNER: &str = "eregions.region.owner";
/// `/eregion flag`. Each flag also needs its own node, see [`flag_nodes`].
pub const REGION_FLAG: &str = "eregions.region.flag";
/// `/eregion flags`.
pub const REGION_FLAGS: &str = "eregions.region.flags";
/// `/eregion move`.
pub const REGION_MOVE: &str = "eregions.region.move";
/// `/eregion size`.
pub const REGION_SIZE: &str = "eregions.region.size";
/// Required to be told about nearby region boundaries.
pub const REGION_VIEW: &str = "eregions.region.view";
/// `/eregion admin`.
pub const ADMIN: &str = "eregions.admin";
/// `/eregion admin flag`.
pub const ADMIN_FLAG: &str = "eregions.admin.flag";

/// The two nodes either of which allows changing `flag` with `/eregion flag`.
#[must_use]
pub fn flag_nodes(flag: &str) -> [String; 2] {
    [
        format!("worldguard.region.flag.flags.{flag}.*"),
        format!("eregions.region.flag.flags.{flag}.*"),
    ]
}

/// Whether a granted node covers `node`.
///
/// `*` covers everything and `prefix.*` covers every node below `prefix`.
#[must_use]
pub fn covers(granted: &str, node: &str) -> bool {
    granted == node
        || granted == "*"
        || granted
            .strip_suffix('*')
            .is_some_and(|prefix| prefix.ends_with('.') && node.starts_with(prefix))
}
