//! Errors returned by sub-commands.

use thiserror::Error;

use crate::region::DirectoryError;

/// Why a sub-command did not run to completion.
///
/// Expected outcomes such as a missing region are reported to the sender by the command itself
/// and are not errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command needs a player and was run from the console.
    #[error("only players can use this command")]
    PlayerOnly,
    /// The arguments did not match the usage string carried here.
    #[error("invalid usage, expected {0}")]
    InvalidUsage(&'static str),
    /// The sender lacks the sub-command's permission node.
    #[error("permission denied")]
    PermissionDenied,
    /// The region directory failed underneath the command.
    #[error("region storage failed: {0}")]
    Directory(#[from] DirectoryError),
}
