//! Lines typed into the terminal, acting out what players would do on a real server.

use std::str::FromStr;
use std::sync::Arc;

use eregions_core::host::{PlayerDirectory, PlayerSnapshot};
use eregions_core::{Click, CommandSender, ERegions};
use eregions_utils::{BlockPos, Vector3};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tokio_util::sync::CancellationToken;

use crate::host::SimHost;

const HELP: &str = "\
eregion <args>                 run /eregion as the console
as <player> <args>             run /eregion as a player
tab <player|console> <args>    complete /eregion
join <player> | leave <player> | die <player>
sneak <player> [on|off]
click <player> <x> <y> <z>     left click a block
air <player>                   left click into the air
chat <player> <message>
goto <player> <x> <y> <z> [yaw]
grant <player> <node> | revoke <player> <node>
save | reload | stop";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Eregion(String),
    As { player: String, line: String },
    Tab { who: String, args: Vec<String> },
    Join(String),
    Leave(String),
    Die(String),
    Sneak { player: String, on: Option<bool> },
    Click { player: String, pos: BlockPos },
    Air(String),
    Chat { player: String, message: String },
    Goto {
        player: String,
        position: Vector3<f64>,
        yaw: Option<f32>,
    },
    Grant { player: String, node: String },
    Revoke { player: String, node: String },
    Save,
    Reload,
    Stop,
    Help,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '{0}', type 'help'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' is not a number")]
    Number(String),
}

/// Splits off the first word and the trimmed rest.
fn split_word(line: &str) -> (&str, &str) {
    let line = line.trim();
    line.split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()))
}

fn number<T: FromStr>(raw: &str) -> Result<T, ParseError> {
    raw.parse().map_err(|_| ParseError::Number(raw.to_string()))
}

impl ConsoleCommand {
    /// Parses a console line. A leading slash is ignored.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let trailing_space = line.ends_with(char::is_whitespace);
        let line = line.trim();
        let line = line.strip_prefix('/').unwrap_or(line);
        let (verb, rest) = split_word(line);
        let words: Vec<&str> = rest.split_whitespace().collect();

        let command = match (verb.to_lowercase().as_str(), words.as_slice()) {
            ("eregion" | "er", _) => Self::Eregion(rest.to_string()),
            ("as", [_, ..]) => {
                let (player, line) = split_word(rest);
                Self::As {
                    player: player.to_string(),
                    line: line.to_string(),
                }
            }
            ("as", []) => return Err(ParseError::Usage("as <player> <args>")),
            ("tab", [who, args @ ..]) => {
                let mut args: Vec<String> = args.iter().map(ToString::to_string).collect();
                if trailing_space || args.is_empty() {
                    args.push(String::new());
                }
                Self::Tab {
                    who: (*who).to_string(),
                    args,
                }
            }
            ("join", [player]) => Self::Join((*player).to_string()),
            ("leave", [player]) => Self::Leave((*player).to_string()),
            ("die", [player]) => Self::Die((*player).to_string()),
            ("sneak", [player]) => Self::Sneak {
                player: (*player).to_string(),
                on: None,
            },
            ("sneak", [player, state]) => Self::Sneak {
                player: (*player).to_string(),
                on: Some(matches!(state.to_lowercase().as_str(), "on" | "true" | "yes")),
            },
            ("click", [player, x, y, z]) => Self::Click {
                player: (*player).to_string(),
                pos: BlockPos::new(number(x)?, number(y)?, number(z)?),
            },
            ("air", [player]) => Self::Air((*player).to_string()),
            ("chat", [_, _, ..]) => {
                let (player, message) = split_word(rest);
                Self::Chat {
                    player: player.to_string(),
                    message: message.to_string(),
                }
            }
            ("goto", [player, x, y, z, yaw @ ..]) if yaw.len() <= 1 => Self::Goto {
                player: (*player).to_string(),
                position: Vector3::new(number(x)?, number(y)?, number(z)?),
                yaw: yaw.first().map(|yaw| number(yaw)).transpose()?,
            },
            ("grant", [player, node]) => Self::Grant {
                player: (*player).to_string(),
                node: (*node).to_string(),
            },
            ("revoke", [player, node]) => Self::Revoke {
                player: (*player).to_string(),
                node: (*node).to_string(),
            },
            ("save", []) => Self::Save,
            ("reload", []) => Self::Reload,
            ("stop" | "exit" | "quit", []) => Self::Stop,
            ("help" | "?", _) => Self::Help,
            ("tab", _) => return Err(ParseError::Usage("tab <player|console> <args>")),
            ("join" | "leave" | "die" | "air", _) => {
                return Err(ParseError::Usage("<verb> <player>"));
            }
            ("sneak", _) => return Err(ParseError::Usage("sneak <player> [on|off]")),
            ("click", _) => return Err(ParseError::Usage("click <player> <x> <y> <z>")),
            ("chat", _) => return Err(ParseError::Usage("chat <player> <message>")),
            ("goto", _) => return Err(ParseError::Usage("goto <player> <x> <y> <z> [yaw]")),
            ("grant" | "revoke", _) => return Err(ParseError::Usage("<verb> <player> <node>")),
            _ => return Err(ParseError::Unknown(verb.to_string())),
        };
        Ok(command)
    }
}

/// Applies console commands to the plugin and the simulated host.
pub struct Console {
    plugin: Arc<ERegions>,
    host: Arc<SimHost>,
    cancel_token: CancellationToken,
}

impl Console {
    pub fn new(plugin: Arc<ERegions>, host: Arc<SimHost>, cancel_token: CancellationToken) -> Self {
        Self {
            plugin,
            host,
            cancel_token,
        }
    }

    /// Reads lines from stdin until it closes or the token is cancelled.
    pub async fn run(self) {
        let mut lines = BufReader::new(stdin()).lines();
        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => break,
                line = lines.next_line() => match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => self.handle_line(&line),
                    Ok(None) => {
                        log::info!("Console input closed");
                        break;
                    }
                    Err(error) => {
                        log::error!("Failed to read console input: {error}");
                        break;
                    }
                },
            }
        }
    }

    pub fn handle_line(&self, line: &str) {
        match ConsoleCommand::parse(line) {
            Ok(command) => self.execute(command),
            Err(error) => log::warn!("{error}"),
        }
    }

    fn player(&self, name: &str) -> Option<PlayerSnapshot> {
        let player = self.host.player_by_name(name);
        if player.is_none() {
            log::warn!("{name} is not online");
        }
        player
    }

    fn execute(&self, command: ConsoleCommand) {
        let plugin = &self.plugin;
        match command {
            ConsoleCommand::Eregion(line) => plugin.handle_command(&CommandSender::Console, &line),
            ConsoleCommand::As { player, line } => {
                if let Some(player) = self.player(&player) {
                    plugin.handle_command(&CommandSender::Player(player), &line);
                }
            }
            ConsoleCommand::Tab { who, args } => {
                let sender = if who.eq_ignore_ascii_case("console") {
                    CommandSender::Console
                } else if let Some(player) = self.player(&who) {
                    CommandSender::Player(player)
                } else {
                    return;
                };
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                let completions = plugin.tab_complete(&sender, &args);
                log::info!("Completions: {}", completions.join(" "));
            }
            ConsoleCommand::Join(name) => {
                if self.host.join(&name).is_none() {
                    log::warn!("{name} is already online");
                }
            }
            ConsoleCommand::Leave(name) => {
                if let Some(player) = self.player(&name) {
                    plugin.on_quit(&player);
                    self.host.leave(player.id);
                }
            }
            ConsoleCommand::Die(name) => {
                if let Some(player) = self.player(&name) {
                    log::info!("{name} died");
                    plugin.on_death(&player);
                }
            }
            ConsoleCommand::Sneak { player, on } => {
                if let Some(player) = self.player(&player) {
                    let sneaking = on.unwrap_or(!player.sneaking);
                    self.host.update(player.id, |p| p.sneaking = sneaking);
                    log::info!("{} is {}sneaking", player.name, if sneaking { "" } else { "not " });
                }
            }
            ConsoleCommand::Click { player, pos } => {
                if let Some(player) = self.player(&player) {
                    let cancelled = plugin.on_interact(&player, Click::LeftBlock(pos));
                    log::debug!("Click at {pos} cancelled: {cancelled}");
                }
            }
            ConsoleCommand::Air(player) => {
                if let Some(player) = self.player(&player) {
                    plugin.on_interact(&player, Click::LeftAir { target: None });
                }
            }
            ConsoleCommand::Chat { player, message } => {
                if let Some(player) = self.player(&player)
                    && !plugin.on_chat(&player, &message)
                {
                    tracing::info!(target: "chat", "<{}> {message}", player.name);
                }
            }
            ConsoleCommand::Goto {
                player,
                position,
                yaw,
            } => {
                let moved = self.player(&player).and_then(|player| {
                    self.host.update(player.id, |p| {
                        p.position = position;
                        if let Some(yaw) = yaw {
                            p.yaw = yaw;
                        }
                    })
                });
                if let Some(player) = moved {
                    plugin.on_move(&player);
                }
            }
            ConsoleCommand::Grant { player, node } => {
                if let Some(player) = self.player(&player) {
                    self.host.grant(player.id, &node);
                }
            }
            ConsoleCommand::Revoke { player, node } => {
                if let Some(player) = self.player(&player)
                    && !self.host.revoke(player.id, &node)
                {
                    log::warn!("{} was not granted {node}", player.name);
                }
            }
            ConsoleCommand::Save => match plugin.save() {
                Ok(()) => log::info!("Regions saved"),
                Err(error) => log::error!("Failed to save regions: {error}"),
            },
            ConsoleCommand::Reload => {
                if let Err(error) = plugin.reload() {
                    log::error!("Reload failed: {error}");
                }
            }
            ConsoleCommand::Stop => self.cancel_token.cancel(),
            ConsoleCommand::Help => log::info!("Console commands:\n{HELP}"),
        }
    }
}
