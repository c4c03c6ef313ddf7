//! Named-channel event dispatch with veto/override semantics.
//!
//! Every domain event in the core funnels through [`EventRegistry`]. A
//! channel is an ordered pipeline of handlers; the first handler that vetoes
//! stops the chain, and a handler may substitute a replacement for the
//! channel's primary (first positional) argument, which then propagates to
//! the handlers after it and to the dispatching caller.
//!
//! Dispatch is deliberately not thread-safe for handlers: a handler runs on
//! whatever thread dispatches its channel (tick thread for interceptor and
//! scheduler channels, the background context for stats channels). Work that
//! must cross contexts goes through the frame task scheduler.

use crate::types::{Player, VarMap};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// The fixed channel roster, created once at registry construction.
pub mod channels {
    pub const CLIENT_COMMAND: &str = "client_command";
    pub const SERVER_COMMAND: &str = "server_command";
    pub const CHAT: &str = "chat";
    pub const VOTE_CALLED: &str = "vote_called";
    pub const VOTE_STARTED: &str = "vote_started";
    pub const VOTE_ENDED: &str = "vote_ended";
    pub const VOTE: &str = "vote";
    pub const TEAM_SWITCH_ATTEMPT: &str = "team_switch_attempt";
    pub const TEAM_SWITCH: &str = "team_switch";
    pub const USERINFO: &str = "userinfo";
    pub const SET_CONFIGSTRING: &str = "set_configstring";
    pub const FRAME: &str = "frame";
    pub const MAP: &str = "map";
    pub const NEW_GAME: &str = "new_game";
    pub const GAME_COUNTDOWN: &str = "game_countdown";
    pub const GAME_START: &str = "game_start";
    pub const GAME_END: &str = "game_end";
    pub const ROUND_COUNTDOWN: &str = "round_countdown";
    pub const ROUND_START: &str = "round_start";
    pub const ROUND_END: &str = "round_end";
    pub const STATS: &str = "stats";
    pub const DEATH: &str = "death";
    pub const KILL: &str = "kill";
    pub const CONSOLE_PRINT: &str = "console_print";
    pub const PLAYER_CONNECT: &str = "player_connect";
    pub const PLAYER_LOADED: &str = "player_loaded";
    pub const PLAYER_DISCONNECT: &str = "player_disconnect";
    pub const PLAYER_SPAWN: &str = "player_spawn";

    pub const ALL: &[&str] = &[
        CLIENT_COMMAND,
        SERVER_COMMAND,
        CHAT,
        VOTE_CALLED,
        VOTE_STARTED,
        VOTE_ENDED,
        VOTE,
        TEAM_SWITCH_ATTEMPT,
        TEAM_SWITCH,
        USERINFO,
        SET_CONFIGSTRING,
        FRAME,
        MAP,
        NEW_GAME,
        GAME_COUNTDOWN,
        GAME_START,
        GAME_END,
        ROUND_COUNTDOWN,
        ROUND_START,
        ROUND_END,
        STATS,
        DEATH,
        KILL,
        CONSOLE_PRINT,
        PLAYER_CONNECT,
        PLAYER_LOADED,
        PLAYER_DISCONNECT,
        PLAYER_SPAWN,
    ];
}

/// One positional argument of a domain event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventArg {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Player(Player),
    Vars(VarMap),
    Json(serde_json::Value),
}

impl EventArg {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EventArg::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EventArg::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            EventArg::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_player(&self) -> Option<&Player> {
        match self {
            EventArg::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_vars(&self) -> Option<&VarMap> {
        match self {
            EventArg::Vars(v) => Some(v),
            _ => None,
        }
    }
}

impl From<&str> for EventArg {
    fn from(s: &str) -> Self {
        EventArg::Str(s.to_string())
    }
}

impl From<String> for EventArg {
    fn from(s: String) -> Self {
        EventArg::Str(s)
    }
}

impl From<bool> for EventArg {
    fn from(b: bool) -> Self {
        EventArg::Bool(b)
    }
}

impl From<i64> for EventArg {
    fn from(n: i64) -> Self {
        EventArg::Int(n)
    }
}

impl From<Player> for EventArg {
    fn from(p: Player) -> Self {
        EventArg::Player(p)
    }
}

impl From<Option<Player>> for EventArg {
    fn from(p: Option<Player>) -> Self {
        p.map_or(EventArg::Null, EventArg::Player)
    }
}

impl From<VarMap> for EventArg {
    fn from(v: VarMap) -> Self {
        EventArg::Vars(v)
    }
}

impl From<serde_json::Value> for EventArg {
    fn from(v: serde_json::Value) -> Self {
        EventArg::Json(v)
    }
}

/// A handler's verdict on one dispatch.
///
/// `Pass` is "no opinion": the arguments flow through unchanged. `Veto`
/// suppresses the triggering action and stops the chain. `Substitute`
/// replaces the channel's primary argument for everything downstream.
#[derive(Debug, Clone)]
pub enum Reply {
    Pass,
    Veto,
    Substitute(EventArg),
}

/// Final result of dispatching one event through a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// All handlers ran without a veto; carries the final, possibly
    /// substituted argument list.
    Continue(Vec<EventArg>),
    Veto,
}

impl Outcome {
    pub fn is_veto(&self) -> bool {
        matches!(self, Outcome::Veto)
    }

    /// The final primary argument, if the chain completed.
    pub fn primary(&self) -> Option<&EventArg> {
        match self {
            Outcome::Continue(args) => args.first(),
            Outcome::Veto => None,
        }
    }
}

/// A registered event handler. Runs on the dispatching thread.
pub type Handler = Arc<dyn Fn(&[EventArg]) -> Reply + Send + Sync>;

#[derive(Default)]
struct Channel {
    handlers: Vec<Handler>,
    /// Single-slot caller context: overwrite on set, consumed on take.
    /// Only the `vote_started` channel uses it by convention.
    caller: Option<Player>,
}

/// Registry of named channels. Channels live for the process lifetime and
/// are mutated only by registration calls.
pub struct EventRegistry {
    channels: RwLock<HashMap<String, Channel>>,
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRegistry {
    /// Creates the registry with the full fixed channel roster.
    pub fn new() -> Self {
        let mut map = HashMap::new();
        for name in channels::ALL {
            map.insert((*name).to_string(), Channel::default());
        }
        Self {
            channels: RwLock::new(map),
        }
    }

    /// Appends a handler to a channel. Registration order is execution
    /// order; duplicate registrations are allowed and run twice.
    pub fn register<F>(&self, channel: &str, handler: F)
    where
        F: Fn(&[EventArg]) -> Reply + Send + Sync + 'static,
    {
        let mut map = self.channels.write();
        let entry = map.entry(channel.to_string()).or_default();
        entry.handlers.push(Arc::new(handler));
        debug!(
            channel,
            handlers = entry.handlers.len(),
            "registered event handler"
        );
    }

    /// Records the player attributed as initiator for the next dispatch on
    /// this channel. Overwrites any previously recorded caller.
    pub fn set_caller(&self, channel: &str, player: Player) {
        let mut map = self.channels.write();
        if let Some(entry) = map.get_mut(channel) {
            entry.caller = Some(player);
        } else {
            warn!(channel, "caller recorded for unknown channel");
        }
    }

    /// Consumes the recorded caller, if any.
    pub fn take_caller(&self, channel: &str) -> Option<Player> {
        self.channels.write().get_mut(channel)?.caller.take()
    }

    /// Runs a channel's handlers in registration order.
    ///
    /// A panicking handler is caught here, logged with its channel and
    /// position, and reported as a veto: the safe default when a definite
    /// answer is owed to the caller.
    pub fn dispatch(&self, channel: &str, args: Vec<EventArg>) -> Outcome {
        let handlers = {
            let map = self.channels.read();
            match map.get(channel) {
                Some(entry) => entry.handlers.clone(),
                None => {
                    warn!(channel, "dispatch on unknown channel");
                    return Outcome::Continue(args);
                }
            }
        };

        if handlers.is_empty() {
            debug!(channel, "no handlers registered");
            return Outcome::Continue(args);
        }

        let mut args = args;
        for (position, handler) in handlers.iter().enumerate() {
            let reply = panic::catch_unwind(AssertUnwindSafe(|| handler(&args)));
            match reply {
                Ok(Reply::Pass) => {}
                Ok(Reply::Veto) => {
                    debug!(channel, position, "handler vetoed event");
                    return Outcome::Veto;
                }
                Ok(Reply::Substitute(value)) => {
                    if args.is_empty() {
                        args.push(value);
                    } else {
                        args[0] = value;
                    }
                }
                Err(payload) => {
                    error!(
                        channel,
                        position,
                        panic = panic_message(&payload),
                        "handler panicked; treating event as vetoed"
                    );
                    return Outcome::Veto;
                }
            }
        }
        Outcome::Continue(args)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic payload>"
    }
}
