//! Configured command lines, parsed once into a closed set of actions.
//!
//! A configured line may start with a dialect tag that decides who runs it or how it is
//! shown. Tags are matched most specific first:
//!
//! | tag                  | action                                     |
//! |----------------------|--------------------------------------------|
//! | `asPlayer! msg `     | chat line to the player                    |
//! | `asConsole! msg `    | line in the server log                     |
//! | `asConsole! say `    | chat line to everyone                      |
//! | `asPlayer!`          | command run with the player's permissions  |
//! | `asConsole!`         | command run as the console                 |
//! | `chat!`              | chat line to the player                    |
//! | `actionbar;N!`       | action bar for `N` seconds (`actionbar!` 1)|
//! | `title;N!`           | title, `%subtitle%` splits off a subtitle  |
//! | `subtitle;N!`        | subtitle only                              |
//!
//! Anything else is a console command.

use std::fmt::{self, Display};
use std::str::FromStr;

use thiserror::Error;

/// Seconds a presentation stays up when the tag does not say.
pub const DEFAULT_DISPLAY_SECONDS: u32 = 1;

const SUBTITLE_MARKER: &str = "%subtitle%";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    /// Runs a command with the triggering player's permissions.
    RunAsPlayer(String),
    /// Runs a command as the console.
    RunAsConsole(String),
    /// Sends a chat line to the triggering player.
    SendChat(String),
    /// Shows an action bar, cleared again after `seconds` when positive.
    SendActionBar {
        /// Text to show.
        text: String,
        /// Display time.
        seconds: u32,
    },
    /// Shows a title and subtitle.
    SendTitle {
        /// Title line, may be empty.
        title: String,
        /// Subtitle line, may be empty.
        subtitle: String,
        /// Display time.
        seconds: u32,
    },
    /// Writes a line to the server log.
    LogToConsole(String),
    /// Sends a chat line to everyone online.
    Broadcast(String),
}

/// A command line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionParseError {
    /// The line was empty after trimming.
    #[error("command line is blank")]
    Blank,
    /// A `tag;N!` prefix carried something other than a whole number of seconds.
    #[error("invalid duration `{duration}` in `{tag}` prefix")]
    InvalidDuration {
        /// The tag, e.g. `actionbar`.
        tag: &'static str,
        /// The text found between `;` and `!`.
        duration: String,
    },
}

impl CommandAction {
    /// Parses a trigger command line. Untagged lines run as console commands.
    ///
    /// # Errors
    /// Returns an error for blank lines and malformed durations.
    pub fn parse_command(raw: &str) -> Result<Self, ActionParseError> {
        let line = raw.trim();
        if line.is_empty() {
            return Err(ActionParseError::Blank);
        }

        if let Some(rest) = line.strip_prefix("asPlayer! msg ") {
            return Ok(Self::SendChat(rest.trim().to_string()));
        }
        if let Some(rest) = line.strip_prefix("asConsole! msg ") {
            return Ok(Self::LogToConsole(rest.trim().to_string()));
        }
        if let Some(rest) = line.strip_prefix("asConsole! say ") {
            return Ok(Self::Broadcast(rest.trim().to_string()));
        }
        if let Some(rest) = line.strip_prefix("asPlayer!") {
            return Ok(Self::RunAsPlayer(strip_slash(rest)));
        }
        if let Some(rest) = line.strip_prefix("asConsole!") {
            return Ok(Self::RunAsConsole(strip_slash(rest)));
        }
        if let Some(presentation) = Self::parse_presentation(line) {
            return presentation;
        }

        Ok(Self::RunAsConsole(strip_slash(line)))
    }

    /// Parses a message line. Untagged lines are chat lines.
    ///
    /// # Errors
    /// Returns an error for blank lines and malformed durations.
    pub fn parse_message(raw: &str) -> Result<Self, ActionParseError> {
        if raw.trim().is_empty() {
            return Err(ActionParseError::Blank);
        }
        Self::parse_presentation(raw).unwrap_or_else(|| Ok(Self::SendChat(raw.to_string())))
    }

    /// Parses the presentation tags shared by commands and messages.
    fn parse_presentation(line: &str) -> Option<Result<Self, ActionParseError>> {
        if let Some(rest) = line.strip_prefix("chat!") {
            return Some(Ok(Self::SendChat(rest.trim().to_string())));
        }
        if let Some((seconds, rest)) = split_tag(line, "actionbar") {
            return Some(seconds.map(|seconds| Self::SendActionBar {
                text: rest.trim().to_string(),
                seconds,
            }));
        }
        if let Some((seconds, rest)) = split_tag(line, "title") {
            return Some(seconds.map(|seconds| {
                let (title, subtitle) = rest
                    .split_once(SUBTITLE_MARKER)
                    .unwrap_or((rest, ""));
                Self::SendTitle {
                    title: title.trim().to_string(),
                    subtitle: subtitle.trim().to_string(),
                    seconds,
                }
            }));
        }
        if let Some((seconds, rest)) = split_tag(line, "subtitle") {
            return Some(seconds.map(|seconds| Self::SendTitle {
                title: String::new(),
                subtitle: rest.trim().to_string(),
                seconds,
            }));
        }
        None
    }

    /// Returns a copy with `render` applied to every piece of text.
    #[must_use]
    pub fn map_text(&self, render: impl Fn(&str) -> String) -> Self {
        match self {
            Self::RunAsPlayer(line) => Self::RunAsPlayer(render(line)),
            Self::RunAsConsole(line) => Self::RunAsConsole(render(line)),
            Self::SendChat(text) => Self::SendChat(render(text)),
            Self::SendActionBar { text, seconds } => Self::SendActionBar {
                text: render(text),
                seconds: *seconds,
            },
            Self::SendTitle {
                title,
                subtitle,
                seconds,
            } => Self::SendTitle {
                title: render(title),
                subtitle: render(subtitle),
                seconds: *seconds,
            },
            Self::LogToConsole(text) => Self::LogToConsole(render(text)),
            Self::Broadcast(text) => Self::Broadcast(render(text)),
        }
    }
}

impl FromStr for CommandAction {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_command(s)
    }
}

impl Display for CommandAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunAsPlayer(line) => write!(f, "asPlayer! {line}"),
            Self::RunAsConsole(line) => write!(f, "asConsole! {line}"),
            Self::SendChat(text) => write!(f, "chat! {text}"),
            Self::SendActionBar { text, seconds } => write!(f, "actionbar;{seconds}! {text}"),
            Self::SendTitle {
                title,
                subtitle,
                seconds,
            } => write!(f, "title;{seconds}! {title} {SUBTITLE_MARKER} {subtitle}"),
            Self::LogToConsole(text) => write!(f, "asConsole! msg {text}"),
            Self::Broadcast(text) => write!(f, "asConsole! say {text}"),
        }
    }
}

/// Matches `tag!rest` or `tag;N!rest`.
///
/// Returns `None` when the line does not start with the tag at all.
fn split_tag<'a>(
    line: &'a str,
    tag: &'static str,
) -> Option<(Result<u32, ActionParseError>, &'a str)> {
    let after = line.strip_prefix(tag)?;
    if let Some(rest) = after.strip_prefix('!') {
        return Some((Ok(DEFAULT_DISPLAY_SECONDS), rest));
    }

    let timed = after.strip_prefix(';')?;
    let (duration, rest) = timed.split_once('!')?;
    let seconds = duration
        .trim()
        .parse::<u32>()
        .map_err(|_| ActionParseError::InvalidDuration {
            tag,
            duration: duration.to_string(),
        });
    Some((seconds, rest))
}

fn strip_slash(command: &str) -> String {
    let command = command.trim();
    command.strip_prefix('/').unwrap_or(command).to_string()
}
