//! Interactive server console
//!
//! Line handling is synchronous and lives on [`Console`]; [`run`] wires it to
//! stdin, the deadline queue and the synthetic workload on a single-threaded
//! tokio runtime.

use crate::cli::OutputFormat;
use crate::command::{self, Caller};
use crate::config::ProfilerConfig;
use crate::hooks::{HookEvent, HookId};
use crate::host::Host;
use crate::spatial::Position;
use crate::workload::Workload;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Interval;

/// Whether the console keeps running after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

const FIRE_USAGE: &str = "Usage: fire <hook name> [x y z]";

pub struct Console {
    host: Host,
    command: String,
    format: OutputFormat,
}

impl Console {
    pub fn new(config: &ProfilerConfig, format: OutputFormat, start: Instant) -> Self {
        Self {
            host: Host::new(config, start),
            command: config.command.clone(),
            format,
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut Host {
        &mut self.host
    }

    /// Handle one console line, returning the replies to print
    pub fn handle_line(&mut self, line: &str) -> (Flow, Vec<String>) {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return (Flow::Continue, Vec::new());
        };
        let args: Vec<&str> = words.collect();

        let replies = match word {
            "quit" | "exit" => return (Flow::Quit, Vec::new()),
            "hooks" => HookId::ALL.iter().map(|h| h.to_string()).collect(),
            "status" => vec![self.status()],
            "fire" => self.fire(&args),
            w if w == self.command => {
                command::execute(&mut self.host, &Caller::Server, &self.command, args.as_slice())
            }
            other => vec![format!("Unknown command: {}", other)],
        };
        (Flow::Continue, replies)
    }

    /// Run due deadlines; returns the lines to print on stdout
    pub fn poll(&mut self, now: Instant) -> Vec<String> {
        let reports = self.host.advance_to(now);
        if self.format != OutputFormat::Json {
            return Vec::new();
        }
        reports
            .iter()
            .filter_map(|report| match report.to_json() {
                Ok(json) => Some(json),
                Err(e) => {
                    tracing::error!("Failed to serialize report: {}", e);
                    None
                }
            })
            .collect()
    }

    fn status(&self) -> String {
        let session = self.host.session();
        match session.active_hook() {
            Some(hook) => format!(
                "Measuring {} for {} second(s): {} calls so far",
                hook,
                session.test_duration(),
                session.call_count()
            ),
            None => "Idle".to_string(),
        }
    }

    fn fire(&mut self, args: &[&str]) -> Vec<String> {
        let Some(name) = args.first() else {
            return vec![FIRE_USAGE.to_string()];
        };
        let hook: HookId = match name.parse() {
            Ok(hook) => hook,
            Err(e) => return vec![e.to_string()],
        };

        let position = match &args[1..] {
            [] => None,
            [x, y, z] => match (x.parse(), y.parse(), z.parse()) {
                (Ok(x), Ok(y), Ok(z)) => Some(Position::new(x, y, z)),
                _ => return vec![FIRE_USAGE.to_string()],
            },
            _ => return vec![FIRE_USAGE.to_string()],
        };

        self.host.dispatch(&HookEvent::sample(hook, position));
        Vec::new()
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Drive the console until `quit`, or until stdin closes and no
/// measurement is running
pub async fn run(config: ProfilerConfig, format: OutputFormat, seed: Option<u64>) -> Result<()> {
    let workload = config.workload.as_ref().map(Workload::new).transpose()?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut ticker = workload
        .as_ref()
        .map(|w| tokio::time::interval(w.interval()));

    let mut console = Console::new(&config, format, Instant::now());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        if !stdin_open && !console.host().session().is_active() {
            break;
        }

        let deadline = console.host_mut().next_deadline();
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => {
                        let (flow, replies) = console.handle_line(&line);
                        for reply in replies {
                            println!("{}", reply);
                        }
                        if flow == Flow::Quit {
                            break;
                        }
                    }
                    None => {
                        tracing::debug!("stdin closed");
                        stdin_open = false;
                    }
                }
            }
            _ = sleep_until(deadline) => {}
            _ = tick(&mut ticker) => {
                if let Some(workload) = &workload {
                    console.host_mut().dispatch(&workload.next_event(&mut rng));
                }
            }
        }

        for line in console.poll(Instant::now()) {
            println!("{}", line);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn console(format: OutputFormat) -> (Console, Instant) {
        let t0 = Instant::now();
        (Console::new(&ProfilerConfig::default(), format, t0), t0)
    }

    #[test]
    fn test_blank_line_ignored() {
        let (mut console, _) = console(OutputFormat::Text);
        assert_eq!(console.handle_line("   "), (Flow::Continue, Vec::new()));
    }

    #[test]
    fn test_quit() {
        let (mut console, _) = console(OutputFormat::Text);
        assert_eq!(console.handle_line("quit").0, Flow::Quit);
        assert_eq!(console.handle_line("exit").0, Flow::Quit);
    }

    #[test]
    fn test_hooks_lists_allow_list() {
        let (mut console, _) = console(OutputFormat::Text);
        let (_, replies) = console.handle_line("hooks");
        assert_eq!(replies.len(), 5);
        assert_eq!(replies[0], "CanAcceptItem");
    }

    #[test]
    fn test_unknown_command() {
        let (mut console, _) = console(OutputFormat::Text);
        let (_, replies) = console.handle_line("frobnicate now");
        assert_eq!(replies, vec!["Unknown command: frobnicate".to_string()]);
    }

    #[test]
    fn test_start_fire_and_status() {
        let (mut console, _) = console(OutputFormat::Text);
        assert_eq!(console.handle_line("status").1, vec!["Idle".to_string()]);

        console.handle_line("debughookcalls.start OnItemSplit 5");
        console.handle_line("fire OnItemSplit 105 0 0");
        console.handle_line("fire OnItemSplit");
        console.handle_line("fire CanStackItem 1 2 3");

        assert_eq!(
            console.handle_line("status").1,
            vec!["Measuring OnItemSplit for 5 second(s): 2 calls so far".to_string()]
        );
    }

    #[test]
    fn test_fire_usage_errors() {
        let (mut console, _) = console(OutputFormat::Text);
        assert_eq!(console.handle_line("fire").1, vec![FIRE_USAGE.to_string()]);
        assert_eq!(console.handle_line("fire OnItemSplit 1 2").1, vec![FIRE_USAGE.to_string()]);
        assert_eq!(console.handle_line("fire OnItemSplit a b c").1, vec![FIRE_USAGE.to_string()]);
        assert_eq!(
            console.handle_line("fire Nope").1,
            vec!["Unsupported hook name: Nope".to_string()]
        );
    }

    #[test]
    fn test_poll_text_format_prints_nothing() {
        let (mut console, t0) = console(OutputFormat::Text);
        console.handle_line("debughookcalls.start CanStackItem 1");
        assert!(console.poll(t0 + Duration::from_secs(1)).is_empty());
        assert!(!console.host().session().is_active());
    }

    #[test]
    fn test_poll_json_format_prints_report() {
        let (mut console, t0) = console(OutputFormat::Json);
        console.handle_line("debughookcalls.start OnMaxStackable 2");
        for _ in 0..3 {
            console.handle_line("fire OnMaxStackable 105 0 0");
        }

        assert!(console.poll(t0 + Duration::from_secs(1)).is_empty());
        let out = console.poll(t0 + Duration::from_secs(2));
        assert_eq!(out.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&out[0]).unwrap();
        assert_eq!(value["hook"], "OnMaxStackable");
        assert_eq!(value["call_count"], 3);
        assert_eq!(value["hotspots"][0]["location"]["x"], 100.0);
    }

    #[test]
    fn test_custom_command_name() {
        let config = ProfilerConfig {
            command: "hp.start".to_string(),
            ..Default::default()
        };
        let mut console = Console::new(&config, OutputFormat::Text, Instant::now());
        console.handle_line("hp.start CanAcceptItem 3");
        assert!(console.host().session().is_active());

        let (_, replies) = console.handle_line("debughookcalls.start CanAcceptItem 3");
        assert_eq!(replies, vec!["Unknown command: debughookcalls.start".to_string()]);
    }
}
