#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
use anyhow::Context;
#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;
#[cfg(not(target_arch = "wasm32"))]
use tetris_engine::{Command, Game, RenderCell, Settings, PREVIEW_DEPTH};

/// Runs a scripted session headlessly and prints the resulting well.
///
/// A script is a list of tokens separated by whitespace or commas. Command
/// names (`left`, `right`, `rotate`, `soft`, `hard`, `pause`, `reset`, ...)
/// are queued; `wait:<ms>` runs one frame of that length, applying everything
/// queued so far.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug, Clone)]
struct Opts {
    /// Inline script, e.g. "left left rotate wait:750 hard"
    #[arg(long, default_value = "")]
    script: String,
    /// Read the script from a file instead
    #[arg(long, conflicts_with = "script")]
    script_file: Option<PathBuf>,
    /// Seed for the bag shuffle
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Gravity interval in milliseconds
    #[arg(long, default_value_t = 750)]
    tick_ms: u32,
    /// Extra idle frames to run after the script
    #[arg(long, default_value_t = 0)]
    frames: u32,
    /// Length of each idle frame in milliseconds
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f64,
    /// Hide the ghost piece in the output
    #[arg(long)]
    no_ghost: bool,
    /// Print the full view as JSON instead of a text board
    #[arg(long)]
    json: bool,
}

#[cfg(not(target_arch = "wasm32"))]
enum Step {
    Queue(Command),
    Wait(f64),
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_script(script: &str) -> anyhow::Result<Vec<Step>> {
    script
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|token| -> anyhow::Result<Step> {
            if let Some(ms) = token.strip_prefix("wait:") {
                let ms: f64 = ms
                    .parse()
                    .with_context(|| format!("bad wait duration in {token:?}"))?;
                Ok(Step::Wait(ms))
            } else {
                Ok(Step::Queue(token.parse()?))
            }
        })
        .collect()
}

#[cfg(not(target_arch = "wasm32"))]
fn render_text(game: &Game) -> String {
    let mut out = String::new();
    for row in game.render_grid() {
        out.push('|');
        for cell in row {
            out.push(match cell {
                RenderCell::Empty => '.',
                RenderCell::Block(kind) => kind.letter(),
                RenderCell::Ghost(_) => ':',
            });
        }
        out.push_str("|\n");
    }
    let stats = game.stats();
    let upcoming: String = game
        .upcoming(PREVIEW_DEPTH)
        .iter()
        .map(|k| k.letter())
        .collect();
    out.push_str(&format!(
        "state {:?}  score {}  lines {}  pieces {}  speed {:.2}/s  next {}\n",
        stats.state, stats.score, stats.lines, stats.pieces, stats.drops_per_second, upcoming
    ));
    out
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    let script = match &opts.script_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?,
        None => opts.script.clone(),
    };
    let steps = parse_script(&script)?;

    let settings = Settings {
        tick_ms: opts.tick_ms,
        ghost_enabled: !opts.no_ghost,
        seed: Some(opts.seed),
        ..Settings::default()
    };
    let mut game = Game::new(settings);

    for step in steps {
        match step {
            Step::Queue(cmd) => game.submit_command(cmd),
            Step::Wait(ms) => game.step(ms),
        }
    }
    // flush anything queued after the last wait
    game.step(0.0);
    for _ in 0..opts.frames {
        game.step(opts.frame_ms);
    }

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&game.view())?);
    } else {
        print!("{}", render_text(&game));
    }
    Ok(())
}
