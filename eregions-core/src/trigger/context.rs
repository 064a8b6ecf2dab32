//! Placeholder values for trigger commands.

use crate::host::PlayerSnapshot;

/// Values substituted into a trigger's command lines.
///
/// Every field is optional. A placeholder whose value is absent stays in the output as
/// written, so `{region_flag}` on a trigger fired without a flag reaches the command verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerContext {
    /// `{region_name}`
    pub region_name: Option<String>,
    /// `{target_player}`
    pub target_player: Option<String>,
    /// `{flag_name}`
    pub flag_name: Option<String>,
    /// `{size}`
    pub size: Option<String>,
    /// `{region_flag}`
    pub region_flag: Option<String>,
    /// `{state_flag}`
    pub state_flag: Option<String>,
    /// `{point_1}`
    pub point_1: Option<String>,
    /// `{point_2}`
    pub point_2: Option<String>,
}

impl TriggerContext {
    /// A context carrying only a region name.
    #[must_use]
    pub fn region(name: impl Into<String>) -> Self {
        Self {
            region_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Adds the player a command acted on.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_player = Some(target.into());
        self
    }

    /// Adds the flag that was added or removed.
    #[must_use]
    pub fn with_flag_name(mut self, flag: impl Into<String>) -> Self {
        self.flag_name = Some(flag.into());
        self
    }

    /// Adds a flag together with the state it changed to.
    #[must_use]
    pub fn with_flag_state(mut self, flag: impl Into<String>, state: impl Into<String>) -> Self {
        self.region_flag = Some(flag.into());
        self.state_flag = Some(state.into());
        self
    }

    /// Adds a reshape distance and the new corners.
    #[must_use]
    pub fn with_points(
        mut self,
        size: impl Into<String>,
        point_1: impl Into<String>,
        point_2: impl Into<String>,
    ) -> Self {
        self.size = Some(size.into());
        self.point_1 = Some(point_1.into());
        self.point_2 = Some(point_2.into());
        self
    }

    /// Captures the substitution table for a player at the moment a trigger fires.
    #[must_use]
    pub fn bind(&self, player: &PlayerSnapshot) -> Placeholders {
        let block = player.position.block_pos();
        let mut pairs = vec![
            ("{player_name}", player.name.clone()),
            ("{player_displayname}", player.display_name.clone()),
            ("{player_world}", player.world.clone()),
            ("{player_x}", block.x().to_string()),
            ("{player_y}", block.y().to_string()),
            ("{player_z}", block.z().to_string()),
        ];

        let optional = [
            ("{region_name}", &self.region_name),
            ("{target_player}", &self.target_player),
            ("{flag_name}", &self.flag_name),
            ("{size}", &self.size),
            ("{region_flag}", &self.region_flag),
            ("{state_flag}", &self.state_flag),
            ("{point_1}", &self.point_1),
            ("{point_2}", &self.point_2),
        ];
        pairs.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| Some((key, value.clone()?))),
        );

        Placeholders(pairs)
    }
}

/// A bound placeholder table.
#[derive(Debug, Clone)]
pub struct Placeholders(Vec<(&'static str, String)>);

impl Placeholders {
    /// Replaces every known placeholder in `template`.
    #[must_use]
    pub fn apply(&self, template: &str) -> String {
        self.0
            .iter()
            .fold(template.to_string(), |text, (key, value)| text.replace(key, value))
    }
}
