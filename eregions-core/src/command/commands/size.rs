//! Handler for the "size" sub-command.

use eregions_utils::Cuboid;

use crate::command::commands::move_region::{announce_reshape, facing_offset};
use crate::command::commands::{SubCommand, filter_prefix, parse_distance, reply, require_player};
use crate::command::error::CommandError;
use crate::command::sender::CommandSender;
use crate::permission;
use crate::plugin::ERegions;
use crate::selection::ReshapeError;

/// Grows or shrinks the completed selection.
pub struct SizeCommand;

/// Which side of the selection a resize works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDirection {
    /// The top face.
    Up,
    /// The bottom face.
    Down,
    /// The side the player is looking at.
    Face,
}

impl ResizeDirection {
    fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "face" => Some(Self::Face),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Face => "face",
        }
    }
}

/// Moves one face of `bounds` by `distance` blocks. A positive distance grows the box.
///
/// The face side uses the player's yaw: only the faces the player looks towards move, and only
/// along the axes the yaw has a rounded component on. Returns `None` if a corner would leave
/// the coordinate range.
#[must_use]
pub fn resize(
    bounds: Cuboid,
    direction: ResizeDirection,
    distance: i32,
    yaw: f32,
) -> Option<Cuboid> {
    let (min, max) = (bounds.min(), bounds.max());
    let (min, max) = match direction {
        ResizeDirection::Up => (min, max.checked_offset(0, distance, 0)?),
        ResizeDirection::Down => (min.checked_offset(0, distance.checked_neg()?, 0)?, max),
        ResizeDirection::Face => {
            let (dx, dz) = facing_offset(yaw, distance);
            let grow = distance > 0;
            let (min_x, max_x) = split_axis(dx, grow);
            let (min_z, max_z) = split_axis(dz, grow);
            (
                min.checked_offset(min_x, 0, min_z)?,
                max.checked_offset(max_x, 0, max_z)?,
            )
        }
    };
    Some(Cuboid::from_corners(min, max))
}

/// Splits an axis offset between the min and max corner.
///
/// Growing pushes the face on the offset's side outwards. Shrinking pulls in the face the
/// player looks at, which lies opposite the (negated) offset.
const fn split_axis(delta: i32, grow: bool) -> (i32, i32) {
    match (delta > 0, grow) {
        (true, true) | (false, false) => (0, delta),
        (false, true) | (true, false) => (delta, 0),
    }
}

impl SubCommand for SizeCommand {
    fn name(&self) -> &'static str {
        "size"
    }

    fn permission(&self) -> &'static str {
        permission::REGION_SIZE
    }

    fn description(&self) -> &'static str {
        "Resize the selected area"
    }

    fn usage(&self) -> &'static str {
        "/eregion size <up|down|face> <+/-distance>"
    }

    fn execute(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        args: &[&str],
    ) -> Result<(), CommandError> {
        let player = require_player(sender)?;
        let [direction, raw] = args else {
            return Err(CommandError::InvalidUsage(self.usage()));
        };
        let Some(direction) = ResizeDirection::parse(direction) else {
            reply(plugin, sender, "invalid-direction", &[]);
            return Ok(());
        };
        let Some(distance) = parse_distance(raw) else {
            reply(plugin, sender, "invalid-distance", &[]);
            return Ok(());
        };

        let resized = plugin
            .selections()
            .reshape(player, |bounds| resize(bounds, direction, distance, player.yaw));
        let bounds = match resized {
            Ok((_, bounds)) => bounds,
            Err(ReshapeError::NoCompletedSelection) => {
                reply(plugin, sender, "no-completed-selection", &[]);
                return Ok(());
            }
            Err(ReshapeError::OutOfRange) => {
                reply(plugin, sender, "invalid-distance", &[]);
                return Ok(());
            }
        };

        log::debug!(
            "{} resized their selection {} to {bounds}",
            player.name,
            direction.name()
        );
        announce_reshape(
            plugin,
            sender,
            player,
            ("region-resized", "selection-resized"),
            distance,
            bounds,
            &[("direction", direction.name())],
        );
        Ok(())
    }

    fn tab_complete(
        &self,
        _plugin: &ERegions,
        _sender: &CommandSender,
        args: &[&str],
    ) -> Vec<String> {
        match args {
            [typed] => filter_prefix(["up", "down", "face"], typed),
            [_, typed] => filter_prefix(["+10", "-5", "+1", "-1"], typed),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use eregions_utils::BlockPos;

    use super::*;

    fn sample() -> Cuboid {
        Cuboid::from_corners(BlockPos::new(0, 60, 0), BlockPos::new(10, 70, 10))
    }

    #[test]
    fn test_vertical_resize() {
        let up = resize(sample(), ResizeDirection::Up, 5, 0.0).expect("in range");
        assert_eq!(up.max(), BlockPos::new(10, 75, 10));
        assert_eq!(up.min(), BlockPos::new(0, 60, 0));

        let down = resize(sample(), ResizeDirection::Down, 5, 0.0).expect("in range");
        assert_eq!(down.min(), BlockPos::new(0, 55, 0));
    }

    #[test]
    fn test_face_grows_towards_view() {
        // Facing +z.
        let grown = resize(sample(), ResizeDirection::Face, 4, 0.0).expect("in range");
        assert_eq!(grown.max(), BlockPos::new(10, 70, 14));
        assert_eq!(grown.min(), BlockPos::new(0, 60, 0));

        // Facing -x.
        let grown = resize(sample(), ResizeDirection::Face, 4, 90.0).expect("in range");
        assert_eq!(grown.min(), BlockPos::new(-4, 60, 0));
        assert_eq!(grown.max(), BlockPos::new(10, 70, 10));
    }

    #[test]
    fn test_face_shrinks_viewed_side() {
        // Facing +z, shrink pulls the +z face back.
        let shrunk = resize(sample(), ResizeDirection::Face, -3, 0.0).expect("in range");
        assert_eq!(shrunk.max(), BlockPos::new(10, 70, 7));
        assert_eq!(shrunk.min(), BlockPos::new(0, 60, 0));
    }

    #[test]
    fn test_out_of_range_is_refused() {
        assert_eq!(resize(sample(), ResizeDirection::Up, i32::MAX, 0.0), None);
        assert_eq!(resize(sample(), ResizeDirection::Down, i32::MIN, 0.0), None);
        assert_eq!(resize(sample(), ResizeDirection::Face, i32::MAX, 0.0), None);
    }

    #[test]
    fn test_overshrinking_stays_normalised() {
        let flipped = resize(sample(), ResizeDirection::Up, -20, 0.0).expect("in range");
        assert!(flipped.min().y() <= flipped.max().y());
    }
}
