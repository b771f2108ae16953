mod config;

use std::io::{self, BufRead, Write};

use chess_core::{
    Engine, EngineController, MAX_PLY, Position, format_info, move_to_uci, parse_go,
    perft_divide, set_position_from_uci,
};
use classical_engine::{ClassicalEngine, DEFAULT_CONTEMPT};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use config::EngineConfig;

/// Write one protocol line to stdout and flush it.
///
/// Called from the search worker as well as the command loop; each call
/// holds the stdout lock for the whole line.
fn send(line: &str) {
    let mut out = io::stdout().lock();
    writeln!(out, "{line}").ok();
    out.flush().ok();
}

fn init_logging(level: &str) {
    // stdout belongs to the protocol, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Split `setoption name <name...> value <value...>` arguments.
fn parse_setoption(args: &[&str]) -> Option<(String, String)> {
    let name_at = args.iter().position(|&a| a == "name")?;
    let value_at = args.iter().position(|&a| a == "value").unwrap_or(args.len());
    if value_at <= name_at + 1 {
        return None;
    }
    let name = args[name_at + 1..value_at].join(" ");
    let value = args.get(value_at + 1..).map(|v| v.join(" ")).unwrap_or_default();
    Some((name, value))
}

struct Session {
    config: EngineConfig,
    controller: EngineController<ClassicalEngine>,
    position: Position,
    depth_cap: u8,
}

impl Session {
    fn new(config: EngineConfig) -> Self {
        let mut engine = ClassicalEngine::with_hash(config.hash_mb);
        engine.set_option("NullMove", &config.null_move.to_string());

        let controller = EngineController::new(engine);
        let position = Position::startpos();
        if let Err(e) = controller.set_position(position.clone(), Vec::new()) {
            warn!(error = %e, "could not set the start position");
        }

        Self {
            depth_cap: config.default_depth,
            config,
            controller,
            position,
        }
    }

    /// Handle one command line. Returns false on `quit`.
    fn handle(&mut self, parts: &[&str]) -> bool {
        let Some((&command, args)) = parts.split_first() else {
            return true;
        };

        match command {
            "uci" => {
                let (name, author) = self.controller.identity();
                send(&format!("id name {name}"));
                send(&format!("id author {author}"));
                send(&format!(
                    "option name Hash type spin default {} min 1 max 4096",
                    self.config.hash_mb
                ));
                send(&format!(
                    "option name Depth type spin default {} min 1 max {}",
                    self.config.default_depth,
                    MAX_PLY - 1
                ));
                send(&format!(
                    "option name NullMove type check default {}",
                    self.config.null_move
                ));
                send(&format!(
                    "option name Contempt type spin default {DEFAULT_CONTEMPT} min -1000 max 1000"
                ));
                send("uciok");
            }
            "isready" => send("readyok"),
            "ucinewgame" => {
                self.controller.stop();
                self.controller.wait();
                self.position = Position::startpos();
                let reset = self
                    .controller
                    .new_game()
                    .and_then(|_| self.controller.set_position(self.position.clone(), Vec::new()));
                if let Err(e) = reset {
                    send(&format!("info string {e}"));
                }
            }
            "setoption" => self.set_option(args),
            "position" => {
                let mut position = self.position.clone();
                let result = set_position_from_uci(&mut position, args).and_then(|history| {
                    self.controller.set_position(position.clone(), history)
                });
                match result {
                    Ok(()) => self.position = position,
                    Err(e) => {
                        warn!(error = %e, "rejected position command");
                        send(&format!("info string {e}"));
                    }
                }
            }
            "go" => self.go(args),
            "stop" => self.controller.stop(),
            "quit" => {
                self.controller.stop();
                return false;
            }
            "perft" => self.perft(args),
            "d" => send(&self.position.to_string()),
            other => debug!(command = other, "ignoring unknown command"),
        }
        true
    }

    fn set_option(&mut self, args: &[&str]) {
        let Some((name, value)) = parse_setoption(args) else {
            send("info string malformed setoption");
            return;
        };

        if name.eq_ignore_ascii_case("Depth") {
            match value.parse::<u8>() {
                Ok(depth) if depth >= 1 => self.depth_cap = depth.min((MAX_PLY - 1) as u8),
                _ => send(&format!("info string invalid Depth '{value}'")),
            }
            return;
        }

        match self.controller.set_option(&name, &value) {
            Ok(true) => info!(%name, %value, "option set"),
            Ok(false) => send(&format!("info string unknown option or value: {name} = {value}")),
            Err(e) => send(&format!("info string {e}")),
        }
    }

    fn go(&mut self, args: &[&str]) {
        let mut limits = parse_go(args);
        if args.iter().all(|&a| a != "depth") {
            limits.depth = self.depth_cap;
        }
        limits.max_time = self.config.max_time();

        let started = self.controller.start(
            limits,
            |info| send(&format_info(info)),
            |result| {
                let best = result
                    .best_move
                    .map(move_to_uci)
                    .unwrap_or_else(|| "0000".to_string());
                send(&format!("bestmove {best}"));
            },
        );
        if let Err(e) = started {
            send(&format!("info string {e}"));
        }
    }

    fn perft(&mut self, args: &[&str]) {
        let Some(depth) = args.first().and_then(|d| d.parse::<u8>().ok()) else {
            send("info string usage: perft <depth>");
            return;
        };
        let started = std::time::Instant::now();
        let mut position = self.position.clone();
        let divide = perft_divide(&mut position, depth);
        let total: u64 = divide.iter().map(|(_, n)| n).sum();
        for (mv, nodes) in divide {
            send(&format!("{}: {nodes}", move_to_uci(mv)));
        }
        send(&format!(
            "\nNodes searched: {total} ({} ms)",
            started.elapsed().as_millis()
        ));
    }
}

fn main() {
    let (config, config_error) = match EngineConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (EngineConfig::default(), Some(e)),
    };
    init_logging(&config.log_level);
    if let Some(e) = config_error {
        warn!(error = %e, "falling back to the default configuration");
    }

    chess_core::init();
    info!(?config, "engine starting");

    let mut session = Session::new(config);
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let parts: Vec<&str> = line.split_whitespace().collect();
        if !session.handle(&parts) {
            break;
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod main_tests;
