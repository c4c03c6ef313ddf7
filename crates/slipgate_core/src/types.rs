//! Shared types and external-collaborator interfaces.
//!
//! The core borrows player snapshots and host state through the traits in
//! this module; it never owns either. The host process supplies an
//! implementation of [`HostServices`] and [`PlayerProvider`] at startup.

use crate::error::{PlayerError, TeamParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A player's team assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Free,
    Red,
    Blue,
    Spectator,
}

impl Team {
    /// Lowercase label used in event payloads and wire text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Free => "free",
            Team::Red => "red",
            Team::Blue => "blue",
            Team::Spectator => "spectator",
        }
    }

    /// Single-letter form used by the `team` client command.
    pub fn letter(&self) -> char {
        match self {
            Team::Free => 'f',
            Team::Red => 'r',
            Team::Blue => 'b',
            Team::Spectator => 's',
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Team {
    type Err = TeamParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(Team::Free),
            "red" => Ok(Team::Red),
            "blue" => Ok(Team::Blue),
            "spectator" => Ok(Team::Spectator),
            other => Err(TeamParseError(other.to_string())),
        }
    }
}

/// An order-preserving `\key\value\key\value` snapshot, the host's native
/// shape for userinfo strings and configstrings.
///
/// Order matters: a rewritten userinfo command must serialize its keys back
/// in the order they were observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarMap(Vec<(String, String)>);

impl VarMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses backslash-delimited alternating key/value text. A leading
    /// backslash is tolerated; a trailing key with no value maps to the
    /// empty string.
    pub fn parse(text: &str) -> Self {
        let mut vars = Vec::new();
        let mut fields = text.trim_start_matches('\\').split('\\');
        while let Some(key) = fields.next() {
            if key.is_empty() {
                continue;
            }
            let value = fields.next().unwrap_or("");
            vars.push((key.to_string(), value.to_string()));
        }
        Self(vars)
    }

    /// Looks up a key, returning `None` when absent. Callers that want the
    /// host's empty-string default should use [`VarMap::get_or_empty`].
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Absent keys read as the empty string, matching host semantics.
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// Sets a key in place, or appends it if new. Appending keeps the
    /// serialized order stable for keys that already existed.
    pub fn set(&mut self, key: &str, value: &str) {
        if let Some(entry) = self.0.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value.to_string();
        } else {
            self.0.push((key.to_string(), value.to_string()));
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes back to the `\key\value` wire shape, in insertion order.
    pub fn to_wire(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.iter() {
            out.push('\\');
            out.push_str(key);
            out.push('\\');
            out.push_str(value);
        }
        out
    }
}

/// A borrowed snapshot of one player's externally-owned state.
///
/// Constructed by the host's [`PlayerProvider`]; the core never mutates it
/// and never holds it past the callback that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Slot index assigned by the host.
    pub client_id: i32,
    /// Stable numeric identity; zero for bots.
    pub steam_id: u64,
    pub name: String,
    pub team: Team,
    /// The player's last-observed userinfo variables.
    pub cvars: VarMap,
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.client_id)
    }
}

/// Host-side player lookup and the one corrective action the core performs.
pub trait PlayerProvider: Send + Sync {
    /// Resolves the player occupying a client slot.
    fn player_by_client(&self, client_id: i32) -> Result<Player, PlayerError>;

    /// Resolves a player by stable numeric identity.
    fn player_by_steam_id(&self, steam_id: u64) -> Result<Player, PlayerError>;

    /// Resolves a player by display name. Bots carry no numeric identity,
    /// so the stats feed falls back to this.
    fn player_by_name(&self, name: &str) -> Result<Player, PlayerError>;

    /// Moves a player onto a team. Used to undo a vetoed team switch.
    fn put_team(&self, player: &Player, team: Team);
}

/// Read access to host state the interceptor needs mid-callback.
pub trait HostServices: Send + Sync {
    /// Returns the current value of a configstring slot, empty if unset.
    fn configstring(&self, index: u16) -> String;

    /// Returns a console variable's value, `None` if unset.
    fn cvar(&self, name: &str) -> Option<String>;
}

/// A destination that can receive a textual reply, e.g. a chat channel.
/// Print redirection flushes its captured buffer through this.
pub trait ReplyChannel: Send + Sync {
    fn reply(&self, text: &str);
}

/// Shared handle to a reply destination.
pub type ReplyTarget = Arc<dyn ReplyChannel>;

/// Uniform hook return convention toward the host: proceed unchanged,
/// suppress the underlying action, or proceed with a replacement value.
#[derive(Debug, Clone, PartialEq)]
pub enum HookReply {
    Pass,
    Veto,
    Replace(String),
}

impl HookReply {
    /// Picks the reply for a possibly-rewritten command: `Replace` only
    /// when the text actually changed.
    pub(crate) fn for_rewrite(original: &str, current: String) -> Self {
        if current == original {
            HookReply::Pass
        } else {
            HookReply::Replace(current)
        }
    }
}
