//! Repify CLI
//!
//! Usage:
//!   repify --list                                  # Show exercises
//!   repify --demo --exercise squat                 # Simulated pose source
//!   repify --frames session.jsonl --side mirrored  # Replay recorded landmarks
//!   cat frames.jsonl | repify --frames -           # Landmarks from stdin
//!   repify --serve                                 # HTTP API server
//!   repify --demo --json                           # JSON output

use clap::Parser;
use colored::Colorize;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use repify::core::{run_server, EngineConfig, ExerciseTable, RepEngine, SimulatedPose};
use repify::types::{FrameOutput, LandmarkSet, SessionSummary, Side};
use repify::{DEFAULT_EXERCISE, SIM_FPS, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "repify",
    version = VERSION,
    about = "Repify - count exercise reps from pose landmarks",
    long_about = "Repify watches the angle at one joint (elbow, knee) across a stream of\n\
                  pose landmarks and counts a rep each time the joint goes from fully\n\
                  extended to fully contracted.\n\n\
                  Modes:\n  \
                  --list      Show the exercise table\n  \
                  --demo      Simulated pose source (default)\n  \
                  --frames    Replay JSON-lines landmark frames (- for stdin)\n  \
                  --serve     HTTP API server\n\n\
                  States:\n  \
                  WAITING     - No full extension yet\n  \
                  EXTENDED    - Joint open, ready for a rep\n  \
                  CONTRACTED  - Joint closed, rep counted"
)]
struct Args {
    /// Exercise id (see --list)
    #[arg(short, long, default_value = DEFAULT_EXERCISE)]
    exercise: String,

    /// Limb to track (primary = left, mirrored = right)
    #[arg(long, value_enum, default_value_t = Side::Primary)]
    side: Side,

    /// JSON file of extra or overriding exercise definitions
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Treat landmarks with visibility below this as missing
    #[arg(long)]
    min_visibility: Option<f64>,

    /// List exercises and exit
    #[arg(short, long)]
    list: bool,

    /// Run against the simulated pose source (default mode; wins over --frames)
    #[arg(short, long)]
    demo: bool,

    /// Simulated rep cycles to run (demo mode)
    #[arg(long, default_value_t = 5)]
    cycles: u32,

    /// Drop the vertex landmark every N frames (demo mode)
    #[arg(long)]
    dropout: Option<u32>,

    /// Pace simulated frames at camera rate instead of as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Replay landmark frames from a JSON-lines file ("-" for stdin)
    #[arg(short, long)]
    frames: Option<String>,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Print every frame, not just state changes
    #[arg(long)]
    verbose: bool,
}

/// Selected run mode
#[derive(Debug, PartialEq)]
enum Mode<'a> {
    List,
    Serve,
    Replay(&'a str),
    Demo,
}

impl Args {
    fn mode(&self) -> Mode<'_> {
        if self.list {
            Mode::List
        } else if self.serve {
            Mode::Serve
        } else {
            match (&self.frames, self.demo) {
                (Some(source), false) => Mode::Replay(source.as_str()),
                _ => Mode::Demo,
            }
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let args = Args::parse();
    if args.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(&args).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let table = Arc::new(match &args.config {
        Some(path) => ExerciseTable::load(path)?,
        None => ExerciseTable::builtin(),
    });

    match args.mode() {
        Mode::List => {
            print_exercises(&table);
            Ok(())
        }
        Mode::Serve => run_serve(args, table).await,
        Mode::Replay(source) => run_replay(source, args, table),
        Mode::Demo => run_demo(args, table).await,
    }
}

/// Build and start an engine for the selected exercise
fn start_engine(args: &Args, table: Arc<ExerciseTable>) -> Result<RepEngine, Box<dyn Error>> {
    let config = EngineConfig {
        min_visibility: args.min_visibility,
    };
    let mut engine = RepEngine::with_config(table, config);
    engine.start(&args.exercise, args.side)?;

    if !args.json {
        engine.on_rep(|event| {
            println!("{}", format!("  ✓ REP {}", event.rep_count).green().bold());
        });
    }
    Ok(engine)
}

/// Run the simulated pose source
async fn run_demo(args: &Args, table: Arc<ExerciseTable>) -> Result<(), Box<dyn Error>> {
    let mut engine = start_engine(args, Arc::clone(&table))?;
    let def = table.resolve(&args.exercise)?;

    let mut source = SimulatedPose::for_exercise(def, args.side);
    if let Some(n) = args.dropout {
        source = source.with_dropout(n);
    }
    let frames = source.period_frames() as usize * args.cycles as usize;

    if !args.json {
        print_header(&args.exercise, args, def.instructions.as_str());
    }

    let frame_interval = Duration::from_secs(1) / SIM_FPS;
    for landmarks in source.take(frames) {
        let output = engine.process_frame(&landmarks);
        print_frame(&output, args)?;
        if args.realtime {
            tokio::time::sleep(frame_interval).await;
        }
    }

    engine.stop();
    print_summary(engine.summary(), args)
}

/// Replay JSON-lines landmark frames
fn run_replay(source: &str, args: &Args, table: Arc<ExerciseTable>) -> Result<(), Box<dyn Error>> {
    let mut engine = start_engine(args, Arc::clone(&table))?;
    let reader: Box<dyn BufRead> = if source == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(source)?))
    };

    if !args.json {
        let def = table.resolve(&args.exercise)?;
        print_header(&args.exercise, args, def.instructions.as_str());
    }

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let landmarks: LandmarkSet = match serde_json::from_str(line) {
            Ok(set) => set,
            Err(e) => {
                warn!(line = line_no + 1, error = %e, "skipping malformed frame");
                continue;
            }
        };
        let output = engine.process_frame(&landmarks);
        print_frame(&output, args)?;
    }

    engine.stop();
    print_summary(engine.summary(), args)
}

/// Run HTTP API server
async fn run_serve(args: &Args, table: Arc<ExerciseTable>) -> Result<(), Box<dyn Error>> {
    println!();
    println!("{}", format!("Repify v{} API Server", VERSION).bold());
    println!();
    run_server(&args.addr, table).await
}

/// Print exercise table
fn print_exercises(table: &ExerciseTable) {
    println!("{}", "Exercises".bold());
    for (id, def) in table.iter() {
        println!(
            "  {:<16} {:<16} {:<10} extended>{:.0}° contracted<{:.0}°",
            id.cyan(),
            def.name,
            def.primary.joint_name().trim_start_matches("left_"),
            def.extended_threshold,
            def.contracted_threshold
        );
        if !def.instructions.is_empty() {
            println!("  {:<16} {}", "", def.instructions.dimmed());
        }
    }
}

/// Print header
fn print_header(exercise: &str, args: &Args, instructions: &str) {
    println!("{}", format!("Repify v{} - {} ({})", VERSION, exercise, args.side).bold());
    if !instructions.is_empty() {
        println!("Setup: {}", instructions);
    }
    println!();
}

/// Print one frame, honoring --json / --verbose / --no-color
fn print_frame(output: &FrameOutput, args: &Args) -> Result<(), Box<dyn Error>> {
    if !args.verbose && !output.reason.is_transition() {
        return Ok(());
    }
    if args.json {
        println!("{}", serde_json::to_string(output)?);
    } else if args.no_color {
        println!("{}", output.to_parseable_string());
    } else {
        println!("{}", output.to_terminal_string());
    }
    Ok(())
}

/// Print end-of-session summary
fn print_summary(summary: Option<SessionSummary>, args: &Args) -> Result<(), Box<dyn Error>> {
    let Some(summary) = summary else {
        return Ok(());
    };
    if args.json {
        println!("{}", serde_json::to_string(&summary)?);
        return Ok(());
    }
    println!();
    println!(
        "{} {} reps of {} ({}) in {}",
        "Session ended.".bold(),
        summary.rep_count.to_string().green().bold(),
        summary.exercise_name,
        summary.side,
        summary.elapsed
    );
    println!(
        "  frames: {} processed, {} skipped",
        summary.frames_processed, summary.frames_skipped
    );
    Ok(())
}
