//! Parses raw client/server text commands and configstring updates into
//! domain events.
//!
//! Incoming commands are evaluated against an ordered set of patterns; the
//! first one whose guard holds decides the event. Commands matching nothing
//! pass through unchanged. All parsing runs on the tick thread.

use crate::error::PlayerError;
use crate::registry::{channels, EventArg, EventRegistry, Outcome};
use crate::types::{HookReply, HostServices, PlayerProvider, VarMap};
use lazy_static::lazy_static;
use parking_lot::Mutex;
use regex::Regex;
use std::sync::Arc;
use tracing::{error, warn};

/// Configstring slot carrying the server info (`g_gameState` among it).
pub const CS_SERVERINFO: u16 = 0;
/// Configstring slot carrying the active vote text.
pub const CS_VOTE_STRING: u16 = 9;
/// Configstring slot carrying round status for round-based modes.
pub const CS_ROUND_STATUS: u16 = 661;

lazy_static! {
    static ref RE_SAY: Regex = Regex::new(r#"(?i)^say +"?(?P<msg>.+?)"?$"#).unwrap();
    static ref RE_SAY_TEAM: Regex = Regex::new(r#"(?i)^say_team +"?(?P<msg>.+?)"?$"#).unwrap();
    static ref RE_CALLVOTE: Regex =
        Regex::new(r#"(?i)^(?:cv|callvote) +(?P<cmd>[^ ]+)(?: "?(?P<args>.+?)"?)?$"#).unwrap();
    static ref RE_VOTE: Regex = Regex::new(r"(?i)^vote +(?P<arg>.)").unwrap();
    static ref RE_TEAM: Regex = Regex::new(r"(?i)^team +(?P<arg>.)").unwrap();
    static ref RE_VOTE_ENDED: Regex =
        Regex::new("^print \"Vote (?P<result>passed|failed)\\.\n\"$").unwrap();
    static ref RE_USERINFO: Regex = Regex::new(r#"^userinfo "(?P<vars>.+)"$"#).unwrap();
}

/// Parsing state tracked across calls, reset where the protocol demands it.
#[derive(Debug, Default)]
struct SessionState {
    /// Whether a vote is currently on the board. Set when the vote
    /// configstring goes non-empty, cleared when it empties or the vote
    /// result print arrives.
    vote_active: bool,
    /// Last-known attack/defend round number. The wire format omits
    /// `round`/`turn` on some updates within a round, so we reuse this.
    ad_round_number: i64,
}

/// Turns raw host callbacks into domain events via the registry.
pub struct CommandInterceptor {
    registry: Arc<EventRegistry>,
    players: Arc<dyn PlayerProvider>,
    host: Arc<dyn HostServices>,
    session: Mutex<SessionState>,
}

impl CommandInterceptor {
    pub fn new(
        registry: Arc<EventRegistry>,
        players: Arc<dyn PlayerProvider>,
        host: Arc<dyn HostServices>,
    ) -> Self {
        Self {
            registry,
            players,
            host,
            session: Mutex::new(SessionState::default()),
        }
    }

    /// Whether a vote is currently active, as tracked from the vote
    /// configstring and the vote result print.
    pub fn is_vote_active(&self) -> bool {
        self.session.lock().vote_active
    }

    /// Handles a raw client command (`say`, `callvote`, `team`, ...).
    ///
    /// Dispatches the generic `client_command` event first; its veto stops
    /// everything, its substitution replaces the text examined by the
    /// pattern table. Faults reply veto, the safe default.
    pub fn handle_client_command(&self, client_id: i32, cmd: &str) -> HookReply {
        match self.client_command(client_id, cmd) {
            Ok(reply) => reply,
            Err(e) => {
                error!(client_id, cmd, error = %e, "client command handling failed");
                HookReply::Veto
            }
        }
    }

    fn client_command(&self, client_id: i32, original: &str) -> Result<HookReply, PlayerError> {
        let player = self.players.player_by_client(client_id)?;

        let mut cmd = original.to_string();
        match self.registry.dispatch(
            channels::CLIENT_COMMAND,
            vec![cmd.clone().into(), player.clone().into()],
        ) {
            Outcome::Veto => return Ok(HookReply::Veto),
            Outcome::Continue(args) => {
                if let Some(s) = args.first().and_then(EventArg::as_str) {
                    cmd = s.to_string();
                }
            }
        }

        if let Some(caps) = RE_SAY.captures(&cmd) {
            let msg = caps["msg"].replace('"', "");
            let outcome = self.registry.dispatch(
                channels::CHAT,
                vec![player.into(), msg.into(), "all".into()],
            );
            if outcome.is_veto() {
                return Ok(HookReply::Veto);
            }
            return Ok(HookReply::for_rewrite(original, cmd));
        }

        if let Some(caps) = RE_SAY_TEAM.captures(&cmd) {
            let msg = caps["msg"].replace('"', "");
            let channel = player.team.as_str();
            let outcome = self.registry.dispatch(
                channels::CHAT,
                vec![player.into(), msg.into(), channel.into()],
            );
            if outcome.is_veto() {
                return Ok(HookReply::Veto);
            }
            return Ok(HookReply::for_rewrite(original, cmd));
        }

        if let Some(caps) = RE_CALLVOTE.captures(&cmd) {
            if !self.is_vote_active() {
                let vote = caps["cmd"].to_string();
                let args = caps
                    .name("args")
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                // Record the caller so a following vote_started dispatch can
                // attribute the vote, should it go through.
                self.registry
                    .set_caller(channels::VOTE_STARTED, player.clone());
                let outcome = self.registry.dispatch(
                    channels::VOTE_CALLED,
                    vec![player.into(), vote.into(), args.into()],
                );
                if outcome.is_veto() {
                    return Ok(HookReply::Veto);
                }
            }
            return Ok(HookReply::for_rewrite(original, cmd));
        }

        if let Some(caps) = RE_VOTE.captures(&cmd) {
            if self.is_vote_active() {
                let arg = caps["arg"].to_ascii_lowercase();
                let choice = match arg.as_str() {
                    "y" | "1" => Some(true),
                    "n" | "2" => Some(false),
                    _ => None,
                };
                if let Some(choice) = choice {
                    let outcome = self
                        .registry
                        .dispatch(channels::VOTE, vec![player.into(), choice.into()]);
                    if outcome.is_veto() {
                        return Ok(HookReply::Veto);
                    }
                }
            }
            return Ok(HookReply::for_rewrite(original, cmd));
        }

        if let Some(caps) = RE_TEAM.captures(&cmd) {
            let arg = caps["arg"]
                .chars()
                .next()
                .map(|c| c.to_ascii_lowercase())
                .unwrap_or_default();
            if arg == player.team.letter() {
                // Joining the team they are already on; nothing to veto.
                return Ok(HookReply::for_rewrite(original, cmd));
            }
            let target = match arg {
                'f' => Some("free"),
                'r' => Some("red"),
                'b' => Some("blue"),
                's' => Some("spectator"),
                'a' => Some("any"),
                _ => None,
            };
            if let Some(target) = target {
                let current = player.team.as_str();
                let outcome = self.registry.dispatch(
                    channels::TEAM_SWITCH_ATTEMPT,
                    vec![player.into(), current.into(), target.into()],
                );
                if outcome.is_veto() {
                    return Ok(HookReply::Veto);
                }
            }
            return Ok(HookReply::for_rewrite(original, cmd));
        }

        if let Some(caps) = RE_USERINFO.captures(&cmd) {
            let mut new_info = VarMap::parse(&caps["vars"]);
            let old_info = &player.cvars;

            let mut changed = VarMap::new();
            for (key, value) in new_info.iter() {
                if old_info.get(key) != Some(value) {
                    changed.set(key, value);
                }
            }

            if !changed.is_empty() {
                match self.registry.dispatch(
                    channels::USERINFO,
                    vec![changed.clone().into(), player.into()],
                ) {
                    Outcome::Veto => return Ok(HookReply::Veto),
                    Outcome::Continue(args) => {
                        if let Some(returned) = args.first().and_then(EventArg::as_vars) {
                            if *returned != changed {
                                // A handler rewrote the changed set; fold it
                                // into the full value set and re-serialize.
                                for (key, value) in returned.iter() {
                                    new_info.set(key, value);
                                }
                                cmd = format!("userinfo \"{}\"", new_info.to_wire());
                            }
                        }
                    }
                }
            }
        }

        Ok(HookReply::for_rewrite(original, cmd))
    }

    /// Handles server-to-client text. One shape is recognized: the fixed
    /// vote-result print, which yields `vote_ended(bool)`.
    pub fn handle_server_command(&self, client_id: i32, original: &str) -> HookReply {
        let player = if client_id >= 0 {
            match self.players.player_by_client(client_id) {
                Ok(player) => Some(player),
                // The recipient left between the send and the hook; let the
                // text through untouched.
                Err(_) => return HookReply::Pass,
            }
        } else {
            None
        };

        let mut cmd = original.to_string();
        match self.registry.dispatch(
            channels::SERVER_COMMAND,
            vec![cmd.clone().into(), player.into()],
        ) {
            Outcome::Veto => return HookReply::Veto,
            Outcome::Continue(args) => {
                if let Some(s) = args.first().and_then(EventArg::as_str) {
                    cmd = s.to_string();
                }
            }
        }

        if let Some(caps) = RE_VOTE_ENDED.captures(&cmd) {
            let passed = &caps["result"] == "passed";
            self.session.lock().vote_active = false;
            self.registry
                .dispatch(channels::VOTE_ENDED, vec![passed.into()]);
        }

        HookReply::for_rewrite(original, cmd)
    }

    /// Intercepts a configstring write.
    ///
    /// The generic `set_configstring` event runs first on the usual
    /// veto/substitute contract, then the indices with known semantics are
    /// decoded: 9 (vote text), 0 (game state), 661 (round state).
    pub fn handle_set_configstring(&self, index: u16, original: &str) -> HookReply {
        let mut value = original.to_string();
        match self.registry.dispatch(
            channels::SET_CONFIGSTRING,
            vec![value.clone().into(), (index as i64).into()],
        ) {
            Outcome::Veto => return HookReply::Veto,
            Outcome::Continue(args) => {
                if let Some(s) = args.first().and_then(EventArg::as_str) {
                    value = s.to_string();
                }
            }
        }
        let reply = HookReply::for_rewrite(original, value.clone());

        match index {
            CS_VOTE_STRING => {
                if value.is_empty() {
                    self.session.lock().vote_active = false;
                } else {
                    let mut parts = value.split_whitespace();
                    let vote = parts.next().unwrap_or_default().to_string();
                    let args = parts.collect::<Vec<_>>().join(" ");
                    self.session.lock().vote_active = true;
                    let caller = self.registry.take_caller(channels::VOTE_STARTED);
                    self.registry.dispatch(
                        channels::VOTE_STARTED,
                        vec![caller.into(), vote.into(), args.into()],
                    );
                }
                reply
            }
            CS_SERVERINFO => {
                self.game_state_change(&value);
                reply
            }
            CS_ROUND_STATUS => {
                self.round_status_change(&value);
                reply
            }
            _ => reply,
        }
    }

    /// Applies the game-state transition table from the serverinfo
    /// configstring. Unknown transitions warn and produce no event.
    fn game_state_change(&self, value: &str) {
        let old_cs = VarMap::parse(&self.host.configstring(CS_SERVERINFO));
        if old_cs.is_empty() {
            return;
        }
        let new_cs = VarMap::parse(value);
        let old_state = old_cs.get_or_empty("g_gameState");
        let new_state = new_cs.get_or_empty("g_gameState");
        if old_state == new_state {
            return;
        }
        match (old_state, new_state) {
            ("PRE_GAME", "COUNT_DOWN") => {
                self.session.lock().ad_round_number = 1;
                self.registry
                    .dispatch(channels::GAME_COUNTDOWN, Vec::new());
            }
            ("PRE_GAME", "IN_PROGRESS")
            | ("COUNT_DOWN", "IN_PROGRESS")
            | ("IN_PROGRESS", "PRE_GAME")
            | ("COUNT_DOWN", "PRE_GAME") => {}
            (old, new) => {
                warn!(old, new, "unknown game state transition");
            }
        }
    }

    /// Decodes the round-status configstring shared by the two round-based
    /// mode families and dispatches round countdown/start.
    fn round_status_change(&self, value: &str) {
        let cvars = VarMap::parse(value);
        if cvars.is_empty() {
            return;
        }

        let round_number = if cvars.contains_key("turn") {
            // Attack/defend. A zero state means the update is not yet
            // applicable to a round.
            if parse_int(cvars.get("state")) == 0 {
                return;
            }
            // `round` and `turn` appear only on the countdown update; the
            // first round is 0, not 1. Later updates within the round omit
            // them, so fall back to the remembered number.
            match (try_int(cvars.get("round")), try_int(cvars.get("turn"))) {
                (Some(round), Some(turn)) => {
                    let number = round * 2 + 1 + turn;
                    self.session.lock().ad_round_number = number;
                    number
                }
                _ => self.session.lock().ad_round_number,
            }
        } else {
            // Capture modes carry the round number directly.
            parse_int(cvars.get("round"))
        };

        if round_number != 0 {
            if cvars.contains_key("time") {
                self.registry
                    .dispatch(channels::ROUND_COUNTDOWN, vec![round_number.into()]);
            } else {
                self.registry
                    .dispatch(channels::ROUND_START, vec![round_number.into()]);
            }
        }
    }
}

fn try_int(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.parse().ok())
}

fn parse_int(value: Option<&str>) -> i64 {
    try_int(value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Reply;
    use crate::test_support::{FakeHost, FakePlayers, Recorded};
    use crate::types::Team;
    use std::sync::Arc;

    fn setup() -> (Arc<EventRegistry>, Arc<FakePlayers>, Arc<FakeHost>, CommandInterceptor) {
        let registry = Arc::new(EventRegistry::new());
        let players = Arc::new(FakePlayers::default());
        let host = Arc::new(FakeHost::default());
        let interceptor = CommandInterceptor::new(
            Arc::clone(&registry),
            players.clone() as Arc<dyn PlayerProvider>,
            host.clone() as Arc<dyn HostServices>,
        );
        (registry, players, host, interceptor)
    }

    #[test]
    fn say_yields_chat_on_channel_all() {
        let (registry, players, _host, interceptor) = setup();
        players.add(1, 100, "Slab", Team::Free);
        let chat = Recorded::install(&registry, channels::CHAT);

        let reply = interceptor.handle_client_command(1, "say \"hello\"");
        assert_eq!(reply, HookReply::Pass);

        let events = chat.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0][1].as_str(), Some("hello"));
        assert_eq!(events[0][2].as_str(), Some("all"));
    }

    #[test]
    fn say_team_uses_the_players_team_channel() {
        let (registry, players, _host, interceptor) = setup();
        players.add(2, 200, "Crash", Team::Red);
        let chat = Recorded::install(&registry, channels::CHAT);

        interceptor.handle_client_command(2, "say_team \"go\"");

        let events = chat.events();
        assert_eq!(events[0][1].as_str(), Some("go"));
        assert_eq!(events[0][2].as_str(), Some("red"));
    }

    #[test]
    fn chat_veto_suppresses_the_command() {
        let (registry, players, _host, interceptor) = setup();
        players.add(1, 100, "Slab", Team::Free);
        registry.register(channels::CHAT, |_| Reply::Veto);

        let reply = interceptor.handle_client_command(1, "say bad words");
        assert_eq!(reply, HookReply::Veto);
    }

    #[test]
    fn client_command_substitution_feeds_the_pattern_table() {
        let (registry, players, _host, interceptor) = setup();
        players.add(1, 100, "Slab", Team::Free);
        registry.register(channels::CLIENT_COMMAND, |_| {
            Reply::Substitute("say rewritten".into())
        });
        let chat = Recorded::install(&registry, channels::CHAT);

        let reply = interceptor.handle_client_command(1, "say original");
        assert_eq!(reply, HookReply::Replace("say rewritten".to_string()));
        assert_eq!(chat.events()[0][1].as_str(), Some("rewritten"));
    }

    #[test]
    fn callvote_guard_blocks_while_a_vote_is_active() {
        let (registry, players, _host, interceptor) = setup();
        players.add(3, 300, "Orbb", Team::Blue);
        let called = Recorded::install(&registry, channels::VOTE_CALLED);

        interceptor.handle_client_command(3, "callvote kick 3");
        assert_eq!(called.events().len(), 1);
        assert_eq!(called.events()[0][1].as_str(), Some("kick"));
        assert_eq!(called.events()[0][2].as_str(), Some("3"));

        // Vote goes up on the board; a second callvote yields no event.
        interceptor.handle_set_configstring(CS_VOTE_STRING, "kick 3");
        interceptor.handle_client_command(3, "callvote map q3dm17");
        assert_eq!(called.events().len(), 1);
    }

    #[test]
    fn vote_command_requires_an_active_vote() {
        let (registry, players, _host, interceptor) = setup();
        players.add(3, 300, "Orbb", Team::Blue);
        let votes = Recorded::install(&registry, channels::VOTE);

        interceptor.handle_client_command(3, "vote y");
        assert!(votes.events().is_empty());

        interceptor.handle_set_configstring(CS_VOTE_STRING, "kick 3");
        interceptor.handle_client_command(3, "vote y");
        interceptor.handle_client_command(3, "vote 2");
        let events = votes.events();
        assert_eq!(events[0][1].as_bool(), Some(true));
        assert_eq!(events[1][1].as_bool(), Some(false));
    }

    #[test]
    fn vote_started_consumes_the_recorded_caller() {
        let (registry, players, _host, interceptor) = setup();
        players.add(3, 300, "Orbb", Team::Blue);
        let started = Recorded::install(&registry, channels::VOTE_STARTED);

        interceptor.handle_client_command(3, "callvote kick 3");
        interceptor.handle_set_configstring(CS_VOTE_STRING, "kick 3");

        let events = started.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0][0].as_player().map(|p| p.client_id), Some(3));
        assert_eq!(events[0][1].as_str(), Some("kick"));
        assert_eq!(events[0][2].as_str(), Some("3"));

        // Caller is read-once: a host-initiated vote has no caller.
        interceptor.handle_set_configstring(CS_VOTE_STRING, "");
        interceptor.handle_set_configstring(CS_VOTE_STRING, "map q3dm17");
        assert_eq!(started.events()[1][0], EventArg::Null);
    }

    #[test]
    fn team_command_ignores_joining_the_current_team() {
        let (registry, players, _host, interceptor) = setup();
        players.add(4, 400, "Anarki", Team::Red);
        let attempts = Recorded::install(&registry, channels::TEAM_SWITCH_ATTEMPT);

        let reply = interceptor.handle_client_command(4, "team r");
        assert_eq!(reply, HookReply::Pass);
        assert!(attempts.events().is_empty());

        interceptor.handle_client_command(4, "team s");
        let events = attempts.events();
        assert_eq!(events[0][1].as_str(), Some("red"));
        assert_eq!(events[0][2].as_str(), Some("spectator"));
    }

    #[test]
    fn userinfo_reports_only_changed_keys() {
        let (registry, players, _host, interceptor) = setup();
        players.add_with_cvars(5, 500, "A", Team::Free, "\\name\\A\\model\\sarge");
        let userinfo = Recorded::install(&registry, channels::USERINFO);

        let reply =
            interceptor.handle_client_command(5, "userinfo \"\\name\\B\\model\\sarge\"");
        assert_eq!(reply, HookReply::Pass);

        let events = userinfo.events();
        assert_eq!(events.len(), 1);
        let changed = events[0][0].as_vars().unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed.get("name"), Some("B"));
    }

    #[test]
    fn userinfo_substitution_rewrites_the_full_command() {
        let (registry, players, _host, interceptor) = setup();
        players.add_with_cvars(5, 500, "A", Team::Free, "\\name\\A\\model\\sarge");
        registry.register(channels::USERINFO, |_| {
            let mut fixed = VarMap::new();
            fixed.set("name", "Censored");
            Reply::Substitute(EventArg::Vars(fixed))
        });

        let reply =
            interceptor.handle_client_command(5, "userinfo \"\\name\\Rude\\model\\sarge\"");
        assert_eq!(
            reply,
            HookReply::Replace("userinfo \"\\name\\Censored\\model\\sarge\"".to_string())
        );
    }

    #[test]
    fn unmatched_commands_pass_through() {
        let (_registry, players, _host, interceptor) = setup();
        players.add(1, 100, "Slab", Team::Free);
        assert_eq!(interceptor.handle_client_command(1, "score"), HookReply::Pass);
    }

    #[test]
    fn nonexistent_player_replies_veto() {
        let (_registry, _players, _host, interceptor) = setup();
        assert_eq!(interceptor.handle_client_command(9, "say hi"), HookReply::Veto);
    }

    #[test]
    fn vote_result_print_dispatches_vote_ended() {
        let (registry, _players, _host, interceptor) = setup();
        let ended = Recorded::install(&registry, channels::VOTE_ENDED);

        interceptor.handle_set_configstring(CS_VOTE_STRING, "kick 3");
        assert!(interceptor.is_vote_active());

        interceptor.handle_server_command(-1, "print \"Vote passed.\n\"");
        assert_eq!(ended.events()[0][0].as_bool(), Some(true));
        assert!(!interceptor.is_vote_active());

        interceptor.handle_server_command(-1, "print \"Vote failed.\n\"");
        assert_eq!(ended.events()[1][0].as_bool(), Some(false));
    }

    #[test]
    fn countdown_transition_resets_round_counter_and_dispatches() {
        let (registry, _players, host, interceptor) = setup();
        let countdown = Recorded::install(&registry, channels::GAME_COUNTDOWN);
        host.set_configstring(CS_SERVERINFO, "\\g_gameState\\PRE_GAME");

        interceptor.handle_set_configstring(CS_SERVERINFO, "\\g_gameState\\COUNT_DOWN");
        assert_eq!(countdown.events().len(), 1);

        // Recognized no-event transition.
        host.set_configstring(CS_SERVERINFO, "\\g_gameState\\COUNT_DOWN");
        interceptor.handle_set_configstring(CS_SERVERINFO, "\\g_gameState\\IN_PROGRESS");
        assert_eq!(countdown.events().len(), 1);
    }

    #[test]
    fn ad_round_number_is_derived_and_remembered() {
        let (registry, _players, _host, interceptor) = setup();
        let countdowns = Recorded::install(&registry, channels::ROUND_COUNTDOWN);
        let starts = Recorded::install(&registry, channels::ROUND_START);

        // round=2, turn=1 -> 2*2 + 1 + 1 = 6, announced with a countdown.
        interceptor.handle_set_configstring(
            CS_ROUND_STATUS,
            "\\state\\1\\round\\2\\turn\\1\\time\\30",
        );
        assert_eq!(countdowns.events()[0][0].as_int(), Some(6));

        // The round-start update omits round/turn; the remembered value is
        // reused.
        interceptor.handle_set_configstring(CS_ROUND_STATUS, "\\state\\1\\turn\\1");
        assert_eq!(starts.events()[0][0].as_int(), Some(6));
    }

    #[test]
    fn ad_zero_state_produces_no_event() {
        let (registry, _players, _host, interceptor) = setup();
        let starts = Recorded::install(&registry, channels::ROUND_START);
        interceptor.handle_set_configstring(CS_ROUND_STATUS, "\\state\\0\\turn\\0");
        assert!(starts.events().is_empty());
    }

    #[test]
    fn capture_mode_round_number_is_read_directly() {
        let (registry, _players, _host, interceptor) = setup();
        let countdowns = Recorded::install(&registry, channels::ROUND_COUNTDOWN);
        let starts = Recorded::install(&registry, channels::ROUND_START);

        interceptor.handle_set_configstring(CS_ROUND_STATUS, "\\round\\3\\time\\10");
        assert_eq!(countdowns.events()[0][0].as_int(), Some(3));

        interceptor.handle_set_configstring(CS_ROUND_STATUS, "\\round\\3");
        assert_eq!(starts.events()[0][0].as_int(), Some(3));
    }

    #[test]
    fn set_configstring_substitution_is_returned() {
        let (registry, _players, _host, interceptor) = setup();
        registry.register(channels::SET_CONFIGSTRING, |_| {
            Reply::Substitute("rewritten".into())
        });
        let reply = interceptor.handle_set_configstring(42, "original");
        assert_eq!(reply, HookReply::Replace("rewritten".to_string()));
    }

    #[test]
    fn set_configstring_veto_is_propagated() {
        let (registry, _players, _host, interceptor) = setup();
        registry.register(channels::SET_CONFIGSTRING, |_| Reply::Veto);
        assert_eq!(
            interceptor.handle_set_configstring(42, "x"),
            HookReply::Veto
        );
    }
}
