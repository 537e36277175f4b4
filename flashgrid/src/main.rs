use std::path::PathBuf;

use clap::Parser;
use flashgrid::prelude::*;
use flashgrid::render::terminal::TerminalRenderer;
use flashgrid::runtime::collaborators::MediaFormat;
use flashgrid::runtime::runner::{Pacing, Runner};
use flashgrid::runtime::simulated::{ClipSink, SimulatedCamera};

#[derive(Parser, Debug)]
#[command(version, about = "Record a flash pattern and replay it")]
struct Args {
    /// YAML config file. Defaults to $FLASHGRID_CONFIG or the user config dir
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for flash timing and cell choice
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    grid_size: Option<usize>,

    #[arg(long)]
    columns: Option<usize>,

    #[arg(long)]
    max_flashes: Option<usize>,

    /// Run on a virtual clock instead of waiting in real time
    #[arg(long)]
    fast: bool,

    /// Only apply changes on frame boundaries at this rate
    #[arg(long, value_name = "FPS")]
    frame_synced: Option<u32>,

    /// User agent used to pick the clip format
    #[arg(long, default_value = "flashgrid")]
    user_agent: String,

    /// Print the recorded pattern as JSON when done
    #[arg(long)]
    print_pattern: bool,
}

fn main() {
    init_logger();
    let args = Args::parse();

    if let Err(err) = run(args) {
        eprintln!("flashgrid failed: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), SessionError> {
    let config = load_config(&args)?;
    info!(
        "{} cells, {} flashes per recording",
        config.grid_size, config.max_flashes
    );

    let pacing = match args.frame_synced {
        Some(fps) => Pacing::FrameSynced { fps },
        None => Pacing::Deadline,
    };
    let format = MediaFormat::for_platform(&args.user_agent);

    let pattern = if args.fast {
        let clock = ManualClock::new(SystemClock.now());
        run_session(config, clock, pacing, format)?
    } else {
        run_session(config, SystemClock, pacing, format)?
    };

    if args.print_pattern {
        let json = serde_json::to_string_pretty(&pattern).map_err(|err| {
            SessionError::Io(std::io::Error::other(err))
        })?;
        println!("{}", json);
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<Config, SessionError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => match Config::default_path() {
            Some(path) => Config::load_if_exists(&path)?.unwrap_or_default(),
            None => Config::default(),
        },
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(grid_size) = args.grid_size {
        config.grid_size = grid_size;
    }
    if let Some(columns) = args.columns {
        config.grid_columns = columns;
    }
    if let Some(max_flashes) = args.max_flashes {
        config.max_flashes = max_flashes;
    }

    config.validate()?;
    Ok(config)
}

fn run_session<K: Clock + Clone>(
    config: Config,
    clock: K,
    pacing: Pacing,
    format: MediaFormat,
) -> Result<Pattern, SessionError> {
    let renderer = TerminalRenderer::new(config.grid_size, config.grid_columns);
    let camera = SimulatedCamera::new("user-facing camera");
    let sink = ClipSink::new(clock.clone(), format);
    let mut session = Session::new(config, camera, sink, renderer)?;

    let report = Runner::new(clock).with_pacing(pacing).run(&mut session)?;

    if let Some(clip) = session.media() {
        info!(
            "Clip {} ({}ms, {})",
            clip.file_name("flashgrid"),
            clip.duration_millis(),
            clip.format.mime_type()
        );
    }
    if report.replayed_cells != report.pattern.cell_indices() {
        warn!("Replay diverged from the recorded pattern");
    }

    Ok(report.pattern)
}
