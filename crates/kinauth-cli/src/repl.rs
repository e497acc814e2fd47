//! REPL – the interactive kinauth shell.
//!
//! Supported slash-commands:
//!   /help                         – show this list
//!   /enroll                       – record a new gesture sequence
//!   /login [replay|impostor|absent] – attempt a login (default: replay)
//!   /status                       – show authentication status
//!   /settings                     – edit `~/.kinauth/config.toml`
//!   /quit | /exit                 – exit the CLI

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use kinauth_hal::sim::frame_interval;
use kinauth_hal::{MotionScript, SimPerformer};
use kinauth_runtime::{AuthStatus, AuthenticationSequencer, SequencerPhase};
use kinauth_types::{AttemptReport, Verdict};
use tokio::runtime::Runtime;
use tokio::sync::watch;

use crate::config::{self, Config};
use crate::performance::{self, Performance};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Enroll,
    Login(Performance),
    Status,
    Settings,
    Quit,
    Unknown(String),
}

fn parse(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let cmd = words.next()?;
    let arg = words.next();
    Some(match (cmd, arg) {
        ("/help", _) => Command::Help,
        ("/enroll", _) => Command::Enroll,
        ("/login", None | Some("replay")) => Command::Login(Performance::Replay),
        ("/login", Some("impostor")) => Command::Login(Performance::Impostor),
        ("/login", Some("absent")) => Command::Login(Performance::Absent),
        ("/status", _) => Command::Status,
        ("/settings", _) => Command::Settings,
        ("/quit" | "/exit", _) => Command::Quit,
        _ => Command::Unknown(line.trim().to_string()),
    })
}

/// Runtime handles the REPL drives attempts with.
pub struct Session {
    rt: Runtime,
    sequencer: AuthenticationSequencer,
    config: Config,
}

impl Session {
    pub fn new(rt: Runtime, sequencer: AuthenticationSequencer, config: Config) -> Self {
        Self {
            rt,
            sequencer,
            config,
        }
    }

    fn frames_per_move(&self) -> usize {
        performance::frames_per_move(
            self.config.sensor_fps,
            self.sequencer.context().config().recording_seconds,
        )
    }

    /// Run one attempt while the simulated user performs `scripts`.
    fn perform<T, F, Fut>(&self, scripts: Vec<MotionScript>, attempt: F) -> T
    where
        F: FnOnce(AuthenticationSequencer) -> Fut,
        Fut: Future<Output = T>,
    {
        let ctx = Arc::clone(self.sequencer.context());
        let sequencer = self.sequencer.clone();
        let interval = frame_interval(self.config.sensor_fps);

        self.rt.block_on(async move {
            let performer = SimPerformer::spawn(
                ctx.frame_sink(),
                ctx.hub().subscribe_window(),
                scripts,
                interval,
            );
            let progress = tokio::spawn(show_progress(ctx.status().subscribe()));

            let outcome = attempt(sequencer).await;

            progress.abort();
            performer.shutdown().await;
            outcome
        })
    }
}

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled each iteration; when set the REPL exits cleanly.
pub fn run(session: &Session, shutdown: Arc<AtomicBool>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "kinauth>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let Some(command) = parse(&line) else {
            continue;
        };

        match command {
            Command::Help => cmd_help(),
            Command::Enroll => cmd_enroll(session),
            Command::Login(performance) => cmd_login(session, performance),
            Command::Status => cmd_status(session),
            Command::Settings => cmd_settings(),
            Command::Quit => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            Command::Unknown(other) => {
                println!(
                    "{} '{}'. Type {} for available commands.",
                    "Unknown command:".red(),
                    other.yellow(),
                    "/help".bold()
                );
            }
        }
    }

    session.sequencer.context().shutdown();
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "kinauth Commands".bold().underline());
    println!("  {}                 – record a new gesture sequence", "/enroll".bold().cyan());
    println!("  {}  – log in as the enrolled user (default)", "/login [replay]".bold().cyan());
    println!("  {}        – log in with the wrong gestures", "/login impostor".bold().cyan());
    println!("  {}          – log in while out of view", "/login absent".bold().cyan());
    println!("  {}                 – show authentication status", "/status".bold().cyan());
    println!("  {}               – edit ~/.kinauth/config.toml", "/settings".bold().cyan());
    println!("  {}            – exit the CLI", "/quit  /exit".bold().cyan());
    println!();
}

fn cmd_enroll(session: &Session) {
    let count = session.sequencer.context().config().num_gestures;
    let scripts = performance::enrollment(count, session.frames_per_move());

    println!("{} {} gesture(s) …", "Enrolling".bold(), count);
    match session.perform(scripts, |seq| async move { seq.enroll().await }) {
        Ok(n) => println!("  {} {} gesture(s) enrolled.", "✓".green().bold(), n),
        Err(e) => println!("  {} {}", "Enrollment failed:".red(), e),
    }
}

fn cmd_login(session: &Session, performance: Performance) {
    let count = session.sequencer.context().enrolled_count();
    if count == 0 {
        println!("  Nothing enrolled yet. Run {} first.", "/enroll".bold());
        return;
    }
    let scripts = performance::login(performance, count, session.frames_per_move());

    println!("{} ({:?}) …", "Logging in".bold(), performance);
    match session.perform(scripts, |seq| async move { seq.login_with_report().await }) {
        Ok(report) => print_report(&report),
        Err(e) if e.is_retryable() => {
            println!("  {} {}", "Attempt aborted:".yellow(), e);
            println!("  Step into view and try again.");
        }
        Err(e) => println!("  {} {}", "Login failed:".red(), e),
    }
}

fn cmd_status(session: &Session) {
    let ctx = session.sequencer.context();
    let board = ctx.status();
    let status = match board.status() {
        AuthStatus::Authenticated => board.status().to_string().green(),
        AuthStatus::PreviousAttemptFailed => board.status().to_string().red(),
        AuthStatus::NotAuthenticated => board.status().to_string().yellow(),
    };

    println!("{}", "Authentication Status".bold().underline());
    println!("  Status          : {}", status);
    println!("  Enrolled        : {} gesture(s)", ctx.enrolled_count());
    println!("  Last phase      : {}", board.phase());
    println!("  Verdicts so far : {}", board.verdicts_written());
    println!(
        "  Sensor tracking : {}",
        if ctx.hub().tracking_available() { "yes".green() } else { "no".dimmed() }
    );
}

fn cmd_settings() {
    let mut cfg = match config::load() {
        Ok(Some(c)) => c,
        Ok(None) => Config::default(),
        Err(e) => {
            println!("{}: {}", "Error loading config".red(), e);
            return;
        }
    };

    println!("{}", "Settings Editor".bold().underline());
    cfg.auth.num_gestures = prompt_parse(
        &format!("  Gestures per sequence (1-10) [{}]: ", cfg.auth.num_gestures),
        cfg.auth.num_gestures,
    );
    cfg.auth.recording_seconds = prompt_parse(
        &format!("  Seconds per gesture (1-10)   [{}]: ", cfg.auth.recording_seconds),
        cfg.auth.recording_seconds,
    );
    cfg.sensor_fps = prompt_parse(
        &format!("  Sensor frame rate            [{}]: ", cfg.sensor_fps),
        cfg.sensor_fps,
    );

    if let Err(e) = cfg.auth.validate() {
        println!("{}: {}", "Not saved".red(), e);
        return;
    }

    match config::save(&cfg) {
        Ok(()) => {
            println!(
                "{} {}",
                "✓ Settings saved to".green(),
                config::config_path().display().to_string().bold()
            );
            println!("  Restart kinauth to apply them.");
        }
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

async fn show_progress(mut phases: watch::Receiver<SequencerPhase>) {
    while phases.changed().await.is_ok() {
        let phase = phases.borrow_and_update().clone();
        match phase {
            SequencerPhase::RetryNotice => println!("  {}", phase.to_string().yellow()),
            p if !p.is_terminal() => println!("  {}", p.to_string().dimmed()),
            _ => {}
        }
    }
}

fn print_report(report: &AttemptReport) {
    for s in &report.scores {
        let score = match s.score {
            Some(v) => format!("{v:.3}"),
            None => "pruned".to_string(),
        };
        let mark = if s.matched { "✓".green() } else { "✗".red() };
        println!("  {} gesture {}: {}", mark, s.position + 1, score.dimmed());
    }
    let elapsed = report.finished_at - report.started_at;
    match report.verdict {
        Verdict::Accepted => println!(
            "  {} in {:.1}s",
            "AUTHENTICATED".green().bold(),
            elapsed.num_milliseconds() as f64 / 1000.0
        ),
        Verdict::Rejected { position } => println!(
            "  {} at gesture {}",
            "REJECTED".red().bold(),
            position + 1
        ),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Prompt for a value. Returns `default` on Enter or unparsable input.
fn prompt_parse<T: std::str::FromStr + std::fmt::Display + Copy>(msg: &str, default: T) -> T {
    let raw = prompt_str(msg, &default.to_string());
    match raw.parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            println!(
                "  {} '{}' is not a valid number, keeping {}",
                "Warning:".yellow(),
                raw,
                default
            );
            default
        }
    }
}

/// Prompt for a string value. Returns `default` when the user presses Enter.
pub(crate) fn prompt_str(msg: &str, default: &str) -> String {
    print!("{}", msg);
    io::stdout().flush().ok();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(_) => {
            let trimmed = line.trim().to_string();
            if trimmed.is_empty() {
                default.to_string()
            } else {
                trimmed
            }
        }
        Err(_) => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   \n"), None);
    }

    #[test]
    fn login_defaults_to_replay() {
        assert_eq!(parse("/login\n"), Some(Command::Login(Performance::Replay)));
        assert_eq!(
            parse("/login impostor"),
            Some(Command::Login(Performance::Impostor))
        );
        assert_eq!(parse("/login absent"), Some(Command::Login(Performance::Absent)));
    }

    #[test]
    fn unknown_login_style_is_unknown() {
        assert_eq!(
            parse("/login twice"),
            Some(Command::Unknown("/login twice".to_string()))
        );
    }

    #[test]
    fn quit_aliases() {
        assert_eq!(parse("/quit"), Some(Command::Quit));
        assert_eq!(parse("/exit"), Some(Command::Quit));
        assert_eq!(parse("/enroll"), Some(Command::Enroll));
    }
}
