//! `heist` command-line runner.
//!
//! Registers guards from `--guard NAME:ID` flags (or from an interactive
//! prompt when none are given), runs the simulation on the museum layout,
//! writes one CSV log per actor into `--out-dir`, and prints the report.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use heist::building::Layout;
use heist::engine::{SimConfig, Simulation};
use heist::record::{CsvDirWriter, DEFAULT_RECORD_CAP};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "heist")]
#[command(version)]
#[command(about = "Guards hunt an intruder through a museum, one thread per actor")]
struct Cli {
    /// Register a guard as NAME:ID. Repeatable. Without any, guards are
    /// read from stdin.
    #[arg(long = "guard", value_name = "NAME:ID", value_parser = parse_guard)]
    guards: Vec<(String, u32)>,

    /// Seed for every random draw in the run.
    #[arg(long, env = "HEIST_SEED")]
    seed: Option<u64>,

    /// Directory receiving `log_<id>.csv` files.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Quiet turns before an actor leaves.
    #[arg(long, default_value_t = 15)]
    boredom_max: u32,

    /// Shared turns before a guard is overwhelmed.
    #[arg(long, default_value_t = 15)]
    stress_max: u32,

    /// One-in-N chance per turn of a guard heading home on a hunch (0 disables).
    #[arg(long, default_value_t = 25)]
    bad_feeling_odds: u32,

    /// Pause after every actor turn, in milliseconds.
    #[arg(long, default_value_t = 2)]
    turn_pause_ms: u64,

    /// Maximum records per actor before the run aborts.
    #[arg(long, default_value_t = DEFAULT_RECORD_CAP)]
    record_cap: u64,

    /// Enable debug logging (one event per action record).
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn sim_config(&self) -> SimConfig {
        SimConfig {
            boredom_max: self.boredom_max,
            stress_max: self.stress_max,
            bad_feeling_odds: (self.bad_feeling_odds > 0).then_some(self.bad_feeling_odds),
            seed: self.seed,
            turn_pause: Duration::from_millis(self.turn_pause_ms),
            record_cap: self.record_cap,
            ..SimConfig::default()
        }
    }
}

fn parse_guard(s: &str) -> Result<(String, u32), String> {
    let (name, id) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected NAME:ID, got `{s}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("guard name is empty".into());
    }
    let id = id
        .trim()
        .parse()
        .map_err(|e| format!("invalid guard id `{id}`: {e}"))?;
    Ok((name.to_owned(), id))
}

/// Prompt for guards until `done` or end of input.
fn read_guards<R: BufRead, W: Write>(mut input: R, mut out: W) -> io::Result<Vec<(String, u32)>> {
    let mut guards = Vec::new();
    let mut line = String::new();
    loop {
        write!(out, "Enter guard name (or 'done' to finish): ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let name = line.trim().to_owned();
        if name == "done" {
            break;
        }
        if name.is_empty() {
            continue;
        }

        write!(out, "Enter guard ID: ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        match line.trim().parse() {
            Ok(id) => guards.push((name, id)),
            Err(_) => writeln!(out, "`{}` is not a valid ID; guard skipped.", line.trim())?,
        }
    }
    Ok(guards)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let building = Layout::museum()
        .build()
        .context("museum layout is invalid")?;
    let writer = CsvDirWriter::create(&cli.out_dir)
        .with_context(|| format!("cannot create log directory {}", cli.out_dir.display()))?;
    let mut sim = Simulation::new(building, cli.sim_config(), Box::new(writer))?;

    let guards = if cli.guards.is_empty() {
        let stdin = io::stdin();
        read_guards(stdin.lock(), io::stdout()).context("reading guards from stdin")?
    } else {
        cli.guards.clone()
    };
    for (name, id) in &guards {
        if let Err(e) = sim.register_guard(name, *id) {
            eprintln!("Guard {name} (ID {id}) not added: {e}");
        }
    }

    info!(
        guards = sim.guard_count(),
        seed = sim.seed(),
        out_dir = %cli.out_dir.display(),
        "starting run"
    );
    let report = sim.run().context("simulation aborted")?;
    println!("{report}");
    Ok(())
}
