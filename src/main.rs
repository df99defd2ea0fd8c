//! Hexhive: falling-block puzzle on a rotating hexagonal hive, in the terminal.

mod app;
mod highscores;
mod input;
mod theme;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use hexhive::HiveConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "theme not loaded, using defaults");
        theme::Theme::default_for_palette(args.palette)
    });
    let config = args.hive_config();
    info!(?config, "starting hexhive");

    let mut app = App::new(args, config, theme)?;
    app.run()?;
    Ok(())
}

/// The terminal UI owns stdout, so logs only go to a file when one is given.
fn init_logging(args: &Args) -> Result<()> {
    let Some(path) = args.log_file.as_ref() else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.as_str()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .init();
    Ok(())
}

/// Falling-block puzzle on a rotating hexagonal hive.
#[derive(Debug, Parser)]
#[command(
    name = "hexhive",
    version,
    about = "Falling-block puzzle on a rotating hexagonal hive. Fill lines along any of the three hex axes.",
    long_about = "Hexhive is a terminal puzzle played on a ring-shaped hex board.\n\n\
        Pieces appear in the hole at the centre and fall toward the rim. Turn the whole hive \
        in 60 degree steps to change which way is down. A line of cells along any of the three \
        hex axes clears when every cell in it is filled; chained clears score a combo bonus.\n\n\
        CONTROLS (normal):\n  Left/Right  Move    Up        Rotate CW   Down       Soft drop\n  \
        Enter/Space Hard drop   A / D      Turn hive  P          Pause      Q / Esc    Quit\n\n\
        CONTROLS (vim):\n  h/l         Move    k or i     Rotate CW   u          Rotate CCW\n  \
        j           Soft drop  Space      Hard drop  [ / ]      Turn hive  p  Pause   q  Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Radius of the spawn hole. Cells this close to the centre never hold blocks.
    #[arg(long, default_value = "1", value_name = "N")]
    pub inner_radius: i32,

    /// Radius of the hive rim.
    #[arg(long, default_value = "6", value_name = "N")]
    pub outer_radius: i32,

    /// Lines shorter than this never clear.
    #[arg(long = "min-line", default_value = "4", value_name = "N")]
    pub min_line: usize,

    /// Also clear same-colour groups of six or more connected cells.
    #[arg(long)]
    pub honey: bool,

    /// Fixed seed for the piece sequence.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Name stored with your leaderboard entries.
    #[arg(short, long, default_value = "player", value_name = "NAME")]
    pub nickname: String,

    /// Skip main menu and start game immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Disable the line-clear fade and the hive spin animation.
    #[arg(long)]
    pub no_animation: bool,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Write logs to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (e.g. info, debug, hexhive=trace).
    #[arg(long, default_value = "info", value_name = "FILTER")]
    pub log_level: String,
}

impl Args {
    pub fn hive_config(&self) -> HiveConfig {
        HiveConfig {
            inner_radius: self.inner_radius,
            outer_radius: self.outer_radius,
            min_line_len: self.min_line,
            honey_clusters: self.honey,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
