use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use sandpile_core::{CellView, Sandpile, SandpileConfig, Seed, ToppleStrategy};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Glyphs for heights 0 through 6
const PALETTE: [char; 7] = [' ', '.', ':', '-', '=', '+', '*'];
/// Glyph for anything taller than the palette covers
const OVERFLOW_GLYPH: char = '#';

/// Headless abelian sandpile driver
#[derive(Parser, Debug)]
#[command(name = "sandpile-demo")]
#[command(about = "Runs an abelian sandpile and prints it as text", long_about = None)]
struct Args {
    /// JSON config file; overrides the grid flags below
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid width in cells
    #[arg(long, default_value_t = 64)]
    width: usize,

    /// Grid height in cells
    #[arg(long, default_value_t = 64)]
    height: usize,

    /// Grains dropped on the centre cell
    #[arg(short = 'g', long, default_value_t = 20_000)]
    grains: u32,

    /// Fill with random heights from this RNG seed instead of a centre pile
    #[arg(long)]
    random: Option<u64>,

    /// Tallest random height (with --random)
    #[arg(long, default_value_t = 7)]
    max_height: u32,

    /// Toppling backend (auto, full-scan, frontier)
    #[arg(short, long, default_value = "auto")]
    strategy: String,

    /// Steps computed per frame
    #[arg(long, default_value_t = sandpile_core::config::DEFAULT_STEPS_PER_FRAME)]
    steps_per_frame: u32,

    /// Stop after this many frames (0 = run until stable)
    #[arg(short, long, default_value_t = 0)]
    frames: u64,

    /// Print every Nth frame (0 = only the final one)
    #[arg(short, long, default_value_t = 0)]
    render_every: u64,

    /// Print final statistics as JSON
    #[arg(long)]
    json: bool,
}

fn parse_strategy(name: &str) -> Result<ToppleStrategy, String> {
    match name.to_lowercase().as_str() {
        "auto" => Ok(ToppleStrategy::Auto),
        "full-scan" | "full_scan" | "fullscan" => Ok(ToppleStrategy::FullScan),
        "frontier" => Ok(ToppleStrategy::Frontier),
        other => Err(format!("unknown strategy '{other}'")),
    }
}

fn load_config(args: &Args) -> Result<SandpileConfig, Box<dyn Error>> {
    if let Some(path) = &args.config {
        let text = std::fs::read_to_string(path)?;
        let config: SandpileConfig = serde_json::from_str(&text)?;
        info!("Loaded config from {}", path.display());
        return Ok(config);
    }

    let seed = match args.random {
        Some(seed) => Seed::Random {
            seed,
            max_height: args.max_height,
        },
        None => Seed::Center {
            height: args.grains,
        },
    };

    Ok(SandpileConfig {
        width: args.width,
        height: args.height,
        seed,
        strategy: parse_strategy(&args.strategy)?,
        steps_per_frame: args.steps_per_frame,
    })
}

fn render(view: CellView<'_>) -> String {
    let mut out = String::with_capacity((view.width() + 1) * view.height());
    for row in view.rows() {
        out.extend(
            row.iter()
                .map(|&h| PALETTE.get(h as usize).copied().unwrap_or(OVERFLOW_GLYPH)),
        );
        out.push('\n');
    }
    out
}

/// Whether `frame` is one of the periodic frames printed inside the loop
fn is_render_frame(frame: u64, render_every: u64) -> bool {
    frame.checked_rem(render_every) == Some(0)
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = load_config(args)?;
    let mut pile = Sandpile::from_config(&config)?;

    let mut frame = 0_u64;
    let mut running = true;
    while running && (args.frames == 0 || frame < args.frames) {
        running = pile.compute_steps(config.steps_per_frame);
        frame += 1;

        if is_render_frame(frame, args.render_every) {
            // The view must be re-taken every frame
            println!("frame {frame}, iteration {}", pile.iteration_count());
            println!("{}", render(pile.raw_view()));
        }
    }

    if !is_render_frame(frame, args.render_every) {
        println!("{}", render(pile.raw_view()));
    }

    let stats = pile.stats();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!(
            "{} frames, {} iterations, {} topplings, mass {}, {}",
            frame,
            stats.iteration,
            stats.total_topplings,
            stats.total_mass,
            if running { "still running" } else { "stable" }
        );
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
