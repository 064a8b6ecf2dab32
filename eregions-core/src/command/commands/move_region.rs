//! Handler for the "move" sub-command.

use eregions_utils::Cuboid;

use crate::command::commands::{SubCommand, filter_prefix, parse_distance, reply, require_player};
use crate::command::error::CommandError;
use crate::command::sender::CommandSender;
use crate::host::PlayerSnapshot;
use crate::permission;
use crate::plugin::ERegions;
use crate::selection::ReshapeError;
use crate::trigger::TriggerContext;

/// Shifts the completed selection along the direction the player faces.
pub struct MoveCommand;

/// Horizontal block offset of `distance` blocks along `yaw` degrees.
///
/// Yaw 0 faces +z and yaw 90 faces -x.
#[must_use]
pub fn facing_offset(yaw: f32, distance: i32) -> (i32, i32) {
    let radians = f64::from(yaw).to_radians();
    let distance = f64::from(distance);
    (
        (-radians.sin() * distance).round() as i32,
        (radians.cos() * distance).round() as i32,
    )
}

/// Refreshes the visualiser, fires `trigger` with the new corners and confirms with `key`.
pub(crate) fn announce_reshape(
    plugin: &ERegions,
    sender: &CommandSender,
    player: &PlayerSnapshot,
    (trigger, key): (&str, &str),
    distance: i32,
    bounds: Cuboid,
    placeholders: &[(&str, &str)],
) {
    let config = plugin.config().get();
    let settings = &config.settings;
    plugin.triggers().schedule_player_command(
        player.id,
        &format!("{} we", settings.visualizer_command),
        settings.visualizer_delay_ticks,
    );

    let size = distance.unsigned_abs().to_string();
    let context = TriggerContext::default().with_points(
        size.clone(),
        bounds.min().to_string(),
        bounds.max().to_string(),
    );
    plugin.triggers().execute(trigger, player, &context);

    let mut placeholders = placeholders.to_vec();
    placeholders.push(("size", &size));
    reply(plugin, sender, key, &placeholders);
}

impl SubCommand for MoveCommand {
    fn name(&self) -> &'static str {
        "move"
    }

    fn permission(&self) -> &'static str {
        permission::REGION_MOVE
    }

    fn description(&self) -> &'static str {
        "Move the selected area"
    }

    fn usage(&self) -> &'static str {
        "/eregion move <+/-distance>"
    }

    fn execute(
        &self,
        plugin: &ERegions,
        sender: &CommandSender,
        args: &[&str],
    ) -> Result<(), CommandError> {
        let player = require_player(sender)?;
        let [raw] = args else {
            return Err(CommandError::InvalidUsage(self.usage()));
        };
        let Some(distance) = parse_distance(raw) else {
            reply(plugin, sender, "invalid-distance", &[]);
            return Ok(());
        };

        let (dx, dz) = facing_offset(player.yaw, distance);
        let moved = plugin.selections().reshape(player, |bounds| {
            Some(Cuboid::from_corners(
                bounds.min().checked_offset(dx, 0, dz)?,
                bounds.max().checked_offset(dx, 0, dz)?,
            ))
        });
        let bounds = match moved {
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

        log::debug!("{} moved their selection to {bounds}", player.name);
        announce_reshape(
            plugin,
            sender,
            player,
            ("region-moved", "selection-moved"),
            distance,
            bounds,
            &[],
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
            [typed] => filter_prefix(["+10", "-5", "+1", "-1"], typed),
            _ => Vec::new(),
        }
    }
}
