//! # eRegions Core
//!
//! Player-driven region creation for a block game server. Players start a selection with
//! `/eregion create`, sneak-click two corners and type a name in chat. Configured command
//! triggers react to every step, and players who come close to a region's edge can be told
//! about it.
//!
//! The server is reached only through the ports in [`host`], the region store through
//! [`region::RegionDirectory`] and the selection tool through [`selection::SelectionTool`].
//! [`ERegions`] wires everything together.

pub mod boundary;
pub mod command;
pub mod config;
pub mod host;
pub mod listener;
pub mod message;
pub mod permission;
pub mod plugin;
pub mod region;
pub mod scheduler;
pub mod selection;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod trigger;

pub use command::sender::CommandSender;
pub use config::{ConfigError, ConfigStore, PluginConfig};
pub use host::{Clock, Host, ManualClock, PlayerSnapshot, SystemClock};
pub use listener::Click;
pub use plugin::ERegions;
