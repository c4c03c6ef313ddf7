//! The host-facing hook surface.
//!
//! [`Core`] wires the registry, scheduler, interceptor, and print
//! redirection together and exposes one method per host callback. Every
//! hook follows the uniform return convention: pass through, veto, or
//! proceed with a replacement value. A fault inside a hook is caught,
//! logged, and reported as a veto.

use crate::config::StatsSettings;
use crate::interceptor::CommandInterceptor;
use crate::redirect::{PrintRedirection, RedirectGuard};
use crate::registry::{channels, EventArg, EventRegistry, Outcome};
use crate::scheduler::{FrameScheduler, SchedulerHandle};
use crate::stats::{ListenerHandle, StatsListener};
use crate::types::{HookReply, HostServices, PlayerProvider, ReplyTarget};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// The event-dispatch and command-interception core, one per process.
pub struct Core {
    registry: Arc<EventRegistry>,
    scheduler: FrameScheduler,
    interceptor: CommandInterceptor,
    redirection: Arc<PrintRedirection>,
    players: Arc<dyn PlayerProvider>,
    host: Arc<dyn HostServices>,
    first_game: AtomicBool,
    stats_warning_issued: AtomicBool,
}

impl Core {
    pub fn new(players: Arc<dyn PlayerProvider>, host: Arc<dyn HostServices>) -> Self {
        let registry = Arc::new(EventRegistry::new());
        let interceptor = CommandInterceptor::new(
            Arc::clone(&registry),
            Arc::clone(&players),
            Arc::clone(&host),
        );
        Self {
            registry,
            scheduler: FrameScheduler::new(),
            interceptor,
            redirection: Arc::new(PrintRedirection::new()),
            players,
            host,
            first_game: AtomicBool::new(true),
            stats_warning_issued: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> Arc<EventRegistry> {
        Arc::clone(&self.registry)
    }

    /// Thread-safe enqueue handle for next-tick work.
    pub fn scheduler_handle(&self) -> SchedulerHandle {
        self.scheduler.handle()
    }

    /// Redirects console output into `target` until the guard drops.
    pub fn redirect_print(&self, target: ReplyTarget) -> RedirectGuard {
        self.redirection.redirect(target)
    }

    /// Builds and spawns the stats listener against this core's registry.
    pub fn spawn_stats_listener(&self, settings: StatsSettings) -> (ListenerHandle, JoinHandle<()>) {
        let listener = StatsListener::new(
            settings,
            Arc::clone(&self.registry),
            Arc::clone(&self.players),
        );
        let handle = listener.handle();
        (handle, listener.spawn())
    }

    // ------------------------------------------------------------------
    // Host callbacks, tick thread
    // ------------------------------------------------------------------

    pub fn handle_client_command(&self, client_id: i32, cmd: &str) -> HookReply {
        self.interceptor.handle_client_command(client_id, cmd)
    }

    pub fn handle_server_command(&self, client_id: i32, cmd: &str) -> HookReply {
        self.interceptor.handle_server_command(client_id, cmd)
    }

    pub fn handle_set_configstring(&self, index: u16, value: &str) -> HookReply {
        self.interceptor.handle_set_configstring(index, value)
    }

    /// One tick pulse: drains the deferred-task queue, then dispatches the
    /// `frame` event.
    pub fn handle_frame(&self) {
        self.scheduler.run_frame(&self.registry);
    }

    /// Called when a game starts or restarts. Dispatches `map` on real map
    /// loads, then `new_game`.
    pub fn handle_new_game(&self, is_restart: bool) {
        if self.first_game.swap(false, Ordering::Relaxed) {
            let settings = StatsSettings::from_host(self.host.as_ref());
            if !settings.enabled && !self.stats_warning_issued.swap(true, Ordering::Relaxed) {
                warn!(
                    "some events will not fire because the stats feed is disabled; \
                     launch the server with stats_enable 1"
                );
            }
        }

        if !is_restart {
            let mapname = self.host.cvar("mapname").unwrap_or_default();
            let factory = self.host.cvar("g_factory").unwrap_or_default();
            self.registry
                .dispatch(channels::MAP, vec![mapname.into(), factory.into()]);
        }
        self.registry.dispatch(channels::NEW_GAME, Vec::new());
    }

    /// Called for every line the server prints to the console. The text
    /// keeps flowing to the `console_print` channel even while a
    /// redirection captures it.
    pub fn handle_console_print(&self, text: &str) -> HookReply {
        if text.is_empty() {
            return HookReply::Pass;
        }
        debug!(target: "console", "{}", text.trim_end_matches('\n'));

        match self
            .registry
            .dispatch(channels::CONSOLE_PRINT, vec![text.into()])
        {
            Outcome::Veto => HookReply::Veto,
            Outcome::Continue(args) => {
                self.redirection.capture(text);
                match args.first().and_then(EventArg::as_str) {
                    Some(replacement) if replacement != text => {
                        HookReply::Replace(replacement.to_string())
                    }
                    _ => HookReply::Pass,
                }
            }
        }
    }

    pub fn handle_player_connect(&self, client_id: i32) -> HookReply {
        self.lifecycle_event(channels::PLAYER_CONNECT, client_id, None)
    }

    pub fn handle_player_loaded(&self, client_id: i32) -> HookReply {
        self.lifecycle_event(channels::PLAYER_LOADED, client_id, None)
    }

    pub fn handle_player_disconnect(&self, client_id: i32, reason: &str) -> HookReply {
        self.lifecycle_event(channels::PLAYER_DISCONNECT, client_id, Some(reason.into()))
    }

    pub fn handle_player_spawn(&self, client_id: i32) -> HookReply {
        self.lifecycle_event(channels::PLAYER_SPAWN, client_id, None)
    }

    /// Shared shape of the player lifecycle hooks: resolve the player,
    /// dispatch, and translate the outcome. A string substitution becomes
    /// the replacement value toward the host (e.g. a custom denial message
    /// on `player_connect`).
    fn lifecycle_event(
        &self,
        channel: &str,
        client_id: i32,
        extra: Option<EventArg>,
    ) -> HookReply {
        let player = match self.players.player_by_client(client_id) {
            Ok(player) => player,
            Err(e) => {
                error!(channel, client_id, error = %e, "lifecycle hook failed");
                return HookReply::Veto;
            }
        };

        let mut args = vec![player.into()];
        if let Some(extra) = extra {
            args.push(extra);
        }
        match self.registry.dispatch(channel, args) {
            Outcome::Veto => HookReply::Veto,
            Outcome::Continue(args) => match args.first().and_then(EventArg::as_str) {
                Some(replacement) => HookReply::Replace(replacement.to_string()),
                None => HookReply::Pass,
            },
        }
    }
}
