//! In-memory fakes for the external collaborators, shared by the module
//! tests.

use crate::error::PlayerError;
use crate::registry::{EventArg, EventRegistry, Reply};
use crate::types::{HostServices, Player, PlayerProvider, Team, VarMap};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A handful of players resolvable by slot, steam id, or name. Records
/// corrective team moves so tests can assert on them.
#[derive(Default)]
pub struct FakePlayers {
    players: Mutex<Vec<Player>>,
    moves: Mutex<Vec<(i32, Team)>>,
}

impl FakePlayers {
    pub fn add(&self, client_id: i32, steam_id: u64, name: &str, team: Team) {
        self.add_with_cvars(client_id, steam_id, name, team, "");
    }

    pub fn add_with_cvars(
        &self,
        client_id: i32,
        steam_id: u64,
        name: &str,
        team: Team,
        cvars: &str,
    ) {
        self.players.lock().push(Player {
            client_id,
            steam_id,
            name: name.to_string(),
            team,
            cvars: VarMap::parse(cvars),
        });
    }

    pub fn moves(&self) -> Vec<(i32, Team)> {
        self.moves.lock().clone()
    }
}

impl PlayerProvider for FakePlayers {
    fn player_by_client(&self, client_id: i32) -> Result<Player, PlayerError> {
        self.players
            .lock()
            .iter()
            .find(|p| p.client_id == client_id)
            .cloned()
            .ok_or(PlayerError::NonexistentClient(client_id))
    }

    fn player_by_steam_id(&self, steam_id: u64) -> Result<Player, PlayerError> {
        self.players
            .lock()
            .iter()
            .find(|p| p.steam_id == steam_id)
            .cloned()
            .ok_or(PlayerError::NonexistentSteamId(steam_id))
    }

    fn player_by_name(&self, name: &str) -> Result<Player, PlayerError> {
        self.players
            .lock()
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| PlayerError::NonexistentName(name.to_string()))
    }

    fn put_team(&self, player: &Player, team: Team) {
        self.moves.lock().push((player.client_id, team));
    }
}

/// Host state the interceptor reads back mid-callback.
#[derive(Default)]
pub struct FakeHost {
    configstrings: Mutex<HashMap<u16, String>>,
    cvars: Mutex<HashMap<String, String>>,
}

impl FakeHost {
    pub fn set_configstring(&self, index: u16, value: &str) {
        self.configstrings.lock().insert(index, value.to_string());
    }

    pub fn set_cvar(&self, name: &str, value: &str) {
        self.cvars.lock().insert(name.to_string(), value.to_string());
    }
}

impl HostServices for FakeHost {
    fn configstring(&self, index: u16) -> String {
        self.configstrings
            .lock()
            .get(&index)
            .cloned()
            .unwrap_or_default()
    }

    fn cvar(&self, name: &str) -> Option<String> {
        self.cvars.lock().get(name).cloned()
    }
}

/// A pass-through handler that records every argument list it sees.
pub struct Recorded {
    events: Arc<Mutex<Vec<Vec<EventArg>>>>,
}

impl Recorded {
    pub fn install(registry: &EventRegistry, channel: &str) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        registry.register(channel, move |args| {
            sink.lock().push(args.to_vec());
            Reply::Pass
        });
        Self { events }
    }

    pub fn events(&self) -> Vec<Vec<EventArg>> {
        self.events.lock().clone()
    }
}
