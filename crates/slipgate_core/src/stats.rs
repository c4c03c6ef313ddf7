//! Background listener for the match statistics feed.
//!
//! Subscribes to the host's stats feed (newline-delimited JSON records over
//! TCP), decodes each record, and dispatches the corresponding domain
//! events. Runs as a self-rescheduling poll on the async runtime, roughly
//! every 250ms, never on the tick thread. Transport faults trigger a full
//! reinitialization of the connection rather than a stop; delivery across a
//! reconnect is at-least-once.

use crate::config::StatsSettings;
use crate::error::{FeedError, PlayerError};
use crate::registry::{channels, EventRegistry};
use crate::types::{Player, PlayerProvider, Team};
use serde_json::Value;
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Poll cadence for the feed.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Stop-side handle for a spawned listener. Stopping is a flag consulted at
/// the top of each poll; there is no cancellation token.
#[derive(Clone)]
pub struct ListenerHandle {
    stop: Arc<AtomicBool>,
}

impl ListenerHandle {
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

struct FeedConnection {
    stream: TcpStream,
    buf: Vec<u8>,
}

impl FeedConnection {
    async fn open(settings: &StatsSettings) -> Result<Self, FeedError> {
        let mut stream = TcpStream::connect(settings.address()).await?;
        let hello = match &settings.password {
            Some(password) => {
                serde_json::json!({ "SUBSCRIBE": "stats", "PASSWORD": password })
            }
            None => serde_json::json!({ "SUBSCRIBE": "stats" }),
        };
        let mut line = hello.to_string();
        line.push('\n');
        stream.write_all(line.as_bytes()).await?;
        info!(address = %settings.address(), "subscribed to stats feed");
        Ok(Self {
            stream,
            buf: Vec::new(),
        })
    }

    /// Returns the next complete record line without blocking, or `None`
    /// when no more data is currently available.
    fn try_recv_line(&mut self) -> Result<Option<String>, FeedError> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
                line.pop();
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }
            let mut chunk = [0u8; 4096];
            match self.stream.try_read(&mut chunk) {
                Ok(0) => {
                    return Err(std::io::Error::new(
                        ErrorKind::UnexpectedEof,
                        "stats feed closed the connection",
                    )
                    .into())
                }
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Drains the stats feed and turns records into domain events.
pub struct StatsListener {
    settings: StatsSettings,
    registry: Arc<EventRegistry>,
    players: Arc<dyn PlayerProvider>,
    stop: Arc<AtomicBool>,
    conn: Option<FeedConnection>,
    /// True between MATCH_STARTED and the next MATCH_REPORT. Guards against
    /// the spurious reports the feed emits on map changes and restarts.
    in_progress: bool,
}

impl StatsListener {
    pub fn new(
        settings: StatsSettings,
        registry: Arc<EventRegistry>,
        players: Arc<dyn PlayerProvider>,
    ) -> Self {
        Self {
            settings,
            registry,
            players,
            stop: Arc::new(AtomicBool::new(false)),
            conn: None,
            in_progress: false,
        }
    }

    pub fn handle(&self) -> ListenerHandle {
        ListenerHandle {
            stop: Arc::clone(&self.stop),
        }
    }

    /// Spawns the poll loop onto the async runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        if !self.settings.enabled {
            info!("stats feed disabled; listener marked done");
            return;
        }
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        while !self.stop.load(Ordering::Relaxed) {
            ticker.tick().await;
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            if let Err(e) = self.poll().await {
                error!(error = %e, "stats feed fault; reinitializing connection");
                self.reinitialize().await;
            }
        }
        info!("stats listener stopped");
    }

    /// One poll: drains every record currently available, dispatching each.
    /// Returns on the first no-data condition.
    async fn poll(&mut self) -> Result<(), FeedError> {
        if self.conn.is_none() {
            self.conn = Some(FeedConnection::open(&self.settings).await?);
        }
        loop {
            let line = match self.conn.as_mut() {
                Some(conn) => conn.try_recv_line()?,
                None => return Ok(()),
            };
            match line {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => {
                    let record: Value = serde_json::from_str(&line)?;
                    self.handle_record(record);
                }
                None => return Ok(()),
            }
        }
    }

    /// Tears the connection down and reopens it with the same settings, as
    /// at start-up. A failed reopen is retried on the next poll.
    async fn reinitialize(&mut self) {
        self.conn = None;
        self.in_progress = false;
        match FeedConnection::open(&self.settings).await {
            Ok(conn) => self.conn = Some(conn),
            Err(e) => warn!(error = %e, "stats feed reconnect failed; will retry"),
        }
    }

    /// Interprets one decoded record. A record whose players cannot be
    /// resolved is logged and skipped; sibling records still process.
    fn handle_record(&mut self, record: Value) {
        self.registry
            .dispatch(channels::STATS, vec![record.clone().into()]);

        let kind = record
            .get("TYPE")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let data = record.get("DATA").cloned().unwrap_or(Value::Null);

        match kind.as_str() {
            "MATCH_STARTED" => {
                self.in_progress = true;
                self.registry
                    .dispatch(channels::GAME_START, vec![data.into()]);
            }
            "ROUND_OVER" => {
                self.registry
                    .dispatch(channels::ROUND_END, vec![data.into()]);
            }
            "MATCH_REPORT" => {
                // The feed emits this on map changes and restarts too; only
                // a match we saw start counts as a real game end.
                if self.in_progress {
                    self.registry
                        .dispatch(channels::GAME_END, vec![data.into()]);
                }
                self.in_progress = false;
            }
            "PLAYER_DEATH" => {
                if let Err(e) = self.player_death(&data) {
                    error!(error = %e, "skipping death record");
                }
            }
            "PLAYER_SWITCHTEAM" => {
                if let Err(e) = self.player_switch_team(&data) {
                    error!(error = %e, "skipping team switch record");
                }
            }
            _ => {}
        }
    }

    fn player_death(&self, data: &Value) -> Result<(), PlayerError> {
        let victim = self.resolve(data.get("VICTIM"))?;
        let killer = match data.get("KILLER") {
            None | Some(Value::Null) => None,
            Some(killer_ref) => match self.resolve(Some(killer_ref)) {
                Ok(player) => Some(player),
                Err(e) => {
                    debug!(error = %e, "killer unresolved; reporting death without one");
                    None
                }
            },
        };

        self.registry.dispatch(
            channels::DEATH,
            vec![victim.clone().into(), killer.clone().into(), data.clone().into()],
        );
        if let Some(killer) = killer {
            self.registry.dispatch(
                channels::KILL,
                vec![victim.into(), killer.into(), data.clone().into()],
            );
        }
        Ok(())
    }

    fn player_switch_team(&self, data: &Value) -> Result<(), PlayerError> {
        // Feed quirk: the acting player rides the KILLER field here.
        let actor = data.get("KILLER");
        let player = self.resolve(actor)?;
        let old_team = str_field(actor, "OLD_TEAM").to_lowercase();
        let new_team = str_field(actor, "TEAM").to_lowercase();
        if old_team == new_team {
            return Ok(());
        }

        let outcome = self.registry.dispatch(
            channels::TEAM_SWITCH,
            vec![
                player.clone().into(),
                old_team.clone().into(),
                new_team.into(),
            ],
        );
        if outcome.is_veto() {
            // Corrective action: the switch was rejected, move them back.
            match old_team.parse::<Team>() {
                Ok(team) => self.players.put_team(&player, team),
                Err(e) => warn!(error = %e, "cannot undo switch to unknown team"),
            }
        }
        Ok(())
    }

    /// Resolves a feed player reference: by numeric identity when non-zero,
    /// by name otherwise (bots carry no id).
    fn resolve(&self, reference: Option<&Value>) -> Result<Player, PlayerError> {
        let steam_id = steam_id_field(reference);
        if steam_id != 0 {
            self.players.player_by_steam_id(steam_id)
        } else {
            self.players.player_by_name(&str_field(reference, "NAME"))
        }
    }
}

fn str_field(value: Option<&Value>, key: &str) -> String {
    value
        .and_then(|v| v.get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// The feed writes steam ids as either strings or numbers.
fn steam_id_field(value: Option<&Value>) -> u64 {
    match value.and_then(|v| v.get("STEAM_ID")) {
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}
