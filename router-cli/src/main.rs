use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::Parser;
use lansim::cli::{Reply, Session};
use lansim::network::Network;
use lansim::persist;
use log::{info, warn};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use simplelog::*;

/// Router-style shell for the LAN simulator
#[derive(Parser, Debug)]
#[command(name = "lansim", version, about)]
struct Args {
    /// Load the topology from a JSON configuration instead of the default lab
    #[arg(short, long, conflicts_with = "empty")]
    config: Option<PathBuf>,

    /// Start with an empty network
    #[arg(long)]
    empty: bool,

    /// Run the commands in this file, echoing each one, then exit
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Log filter: off, error, warn, info, debug or trace
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level: LevelFilter = args
        .log_level
        .parse()
        .map_err(|_| anyhow!("Unknown log level {}", args.log_level))?;
    CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )])
    .context("Failed to initialise the logger")?;

    let network = if let Some(path) = &args.config {
        info!("Loading topology from {}", path.display());
        persist::load_file(path).with_context(|| format!("Loading {}", path.display()))?
    } else if args.empty {
        Network::new()
    } else {
        Network::lab()
    };
    let mut session = Session::new(network);

    match &args.script {
        Some(script) => run_script(&mut session, script),
        None => run_interactive(&mut session),
    }
}

/// Prints the outcome of one line, false once the session should end
fn execute(session: &mut Session, line: &str) -> bool {
    match session.execute(line) {
        Ok(Reply::Quit) => {
            println!("Goodbye!");
            false
        }
        Ok(Reply::Silent) => true,
        Ok(reply) => {
            println!("{reply}");
            true
        }
        Err(err) => {
            println!("Error: {err}");
            true
        }
    }
}

fn run_script(session: &mut Session, script: &Path) -> anyhow::Result<()> {
    let text = fs::read_to_string(script)
        .with_context(|| format!("Reading script {}", script.display()))?;
    for line in text.lines().map(str::trim) {
        // blank lines and IOS-style comments
        if line.is_empty() || line.starts_with('!') || line.starts_with('#') {
            continue;
        }
        println!("{}{line}", session.prompt());
        if !execute(session, line) {
            break;
        }
    }
    Ok(())
}

fn run_interactive(session: &mut Session) -> anyhow::Result<()> {
    println!("Router Simulator CLI");
    println!("Type 'help' for the commands available in each mode");
    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline(&session.prompt()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(err) = editor.add_history_entry(line.as_str()) {
                        warn!("Could not record history: {err}");
                    }
                }
                if !execute(session, &line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => println!("Use 'quit' to exit"),
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
