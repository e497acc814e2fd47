//! `kinauth-cli` – interactive gesture authentication demo.
//!
//! This binary:
//!
//! 1. Checks for `~/.kinauth/config.toml`; runs a **First-Run Wizard** when
//!    the file is absent.
//! 2. Builds the authentication context and a simulated sensor.
//! 3. Drops the user into an **interactive REPL** (`/enroll`, `/login`,
//!    `/status`, `/settings`, `/help`).
//! 4. Intercepts **Ctrl-C** to cancel any running attempt and exit.

mod config;
mod performance;
mod repl;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use kinauth_runtime::{AuthContext, AuthenticationSequencer};
use tracing::warn;

fn main() {
    // KINAUTH_LOG_FORMAT=json switches to newline-delimited JSON. User-facing
    // output still goes through println!.
    let _telemetry = kinauth_runtime::init_tracing("kinauth");

    print_banner();

    // ── First-Run Wizard ──────────────────────────────────────────────────
    match config::load() {
        Ok(None) => run_first_run_wizard(),
        Ok(Some(_)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
        }
        Err(e) => println!("{}: {}", "Config error".red(), e),
    }

    let cfg = config::load_or_default().unwrap_or_else(|e| {
        println!("{}: {} – using defaults", "Config error".red(), e);
        config::Config::default()
    });

    let ctx = match AuthContext::new(cfg.auth.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{}: {}", "Invalid configuration".red(), e);
            std::process::exit(2);
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}: {}", "Failed to start async runtime".red(), e);
            std::process::exit(1);
        }
    };

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    let ctx_for_ctrlc = ctx.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – cancelling …".yellow().bold());
        ctx_for_ctrlc.shutdown();
        println!("{}", "  ✓ Running attempt cancelled. Press Enter to exit.".green());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; Ctrl-C will not cancel attempts");
    }

    println!(
        "  {} gesture(s) per sequence, {}s per gesture, simulated sensor at {} fps",
        cfg.auth.num_gestures.to_string().bold(),
        cfg.auth.recording_seconds.to_string().bold(),
        cfg.sensor_fps.to_string().bold()
    );
    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    // ── Interactive REPL ──────────────────────────────────────────────────
    let session = repl::Session::new(rt, AuthenticationSequencer::new(ctx), cfg);
    repl::run(&session, shutdown);
}

// ─────────────────────────────────────────────────────────────────────────────
// First-Run Wizard
// ─────────────────────────────────────────────────────────────────────────────

fn run_first_run_wizard() {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║       kinauth First-Run Wizard       ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().cyan());
    println!();
    println!("  No configuration found.  Let's set up kinauth.\n");

    let mut cfg = config::Config::default();

    let raw = repl::prompt_str(
        &format!("  How many gestures in your sequence? (1-10) [{}]: ", cfg.auth.num_gestures),
        &cfg.auth.num_gestures.to_string(),
    );
    if let Ok(n) = raw.parse::<usize>() {
        cfg.auth.num_gestures = n;
    }

    let raw = repl::prompt_str(
        &format!("  Seconds to perform each gesture? (1-10) [{}]: ", cfg.auth.recording_seconds),
        &cfg.auth.recording_seconds.to_string(),
    );
    if let Ok(s) = raw.parse::<u64>() {
        cfg.auth.recording_seconds = s;
    }

    if let Err(e) = cfg.auth.validate() {
        println!("  {}: {} – keeping defaults", "Invalid choice".red(), e);
        cfg = config::Config::default();
    }

    match config::save(&cfg) {
        Ok(()) => println!(
            "\n  {} Config saved to {}\n",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   __   _                  __  __ "#.bold().cyan());
    println!("{}", r#"  / /__(_)__  ___ ___ __ _/ /_/ / "#.bold().cyan());
    println!("{}", r#" /  '_/ / _ \/ _ `/ // / __/ _ \  "#.bold().cyan());
    println!("{}", r#"/_/\_\/_/_//_/\_,_/\_,_/\__/_//_/  "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "kinauth".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Gesture-sequence authentication");
    println!();
}
