//! Event-dispatch and command-interception core for a game-server
//! scripting layer.
//!
//! The host process feeds this crate raw callbacks: client and server text
//! commands, configstring writes, per-tick frame pulses, and console
//! output. A background listener additionally drains the host's statistics
//! feed. Everything funnels into the [`registry::EventRegistry`], which
//! fans the resulting domain events out to externally-registered handlers
//! with veto/override semantics.
//!
//! Threading model: all host callbacks arrive on the single tick thread;
//! the stats listener runs on the async runtime and dispatches its channels
//! from there. The [`scheduler::FrameScheduler`] is the one cross-context
//! bridge: any thread may enqueue work, the tick pump drains it.

pub mod config;
pub mod error;
pub mod hooks;
pub mod interceptor;
pub mod redirect;
pub mod registry;
pub mod scheduler;
pub mod stats;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::StatsSettings;
pub use error::{FeedError, PlayerError};
pub use hooks::Core;
pub use interceptor::{CommandInterceptor, CS_ROUND_STATUS, CS_SERVERINFO, CS_VOTE_STRING};
pub use redirect::{PrintRedirection, RedirectGuard};
pub use registry::{channels, EventArg, EventRegistry, Outcome, Reply};
pub use scheduler::{FrameScheduler, SchedulerHandle};
pub use stats::{ListenerHandle, StatsListener, POLL_INTERVAL};
pub use types::{
    HookReply, HostServices, Player, PlayerProvider, ReplyChannel, ReplyTarget, Team, VarMap,
};
