//! Console command entry point
//!
//! `debughookcalls.start <hook name> <seconds>`
//!
//! Only the server console may start a measurement. Player callers are
//! ignored without a reply.

use crate::error::{ProfilerError, Result};
use crate::hooks::HookId;
use crate::host::Host;
use crate::session;

/// Command name used when no configuration overrides it
pub const DEFAULT_COMMAND: &str = "debughookcalls.start";

/// Who issued a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// Server console or RCON
    Server,
    /// An in-game player
    Player(String),
}

impl Caller {
    pub fn is_server(&self) -> bool {
        matches!(self, Caller::Server)
    }
}

/// A validated start request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartCommand {
    pub hook: HookId,
    pub duration_secs: f64,
}

impl StartCommand {
    /// Parse positional arguments `<hook name> <seconds>`
    ///
    /// Arguments past the second are ignored.
    pub fn parse<S: AsRef<str>>(command: &str, args: &[S]) -> Result<Self> {
        let usage = || ProfilerError::Usage {
            command: command.to_string(),
        };

        if args.len() < 2 {
            return Err(usage());
        }
        let duration_secs: f64 = args[1].as_ref().trim().parse().map_err(|_| usage())?;

        let hook: HookId = args[0].as_ref().parse()?;
        session::window_for(duration_secs)?;

        Ok(Self {
            hook,
            duration_secs,
        })
    }
}

/// Run the start command against `host` and return the replies for the
/// caller
pub fn execute<S: AsRef<str>>(
    host: &mut Host,
    caller: &Caller,
    command: &str,
    args: &[S],
) -> Vec<String> {
    if !caller.is_server() {
        tracing::debug!(?caller, command, "ignoring command from non-server caller");
        return Vec::new();
    }

    let request = match StartCommand::parse(command, args) {
        Ok(request) => request,
        Err(e) => return vec![e.to_string()],
    };

    match host.start(request.hook, request.duration_secs) {
        Ok(outcome) => outcome
            .aborted
            .map(|hook| format!("Stopped current test for hook {}", hook))
            .into_iter()
            .collect(),
        Err(e) => vec![e.to_string()],
    }
}
