use anyhow::Context;
use clap::{Parser, Subcommand};
use ringmap::geometry::{self, Point};
use ringmap::settings::MapSettings;
use ringmap::svg;
use ringmap::view::{Controller, ViewState};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "RINGMAP";

#[derive(Parser, Debug)]
#[command(name = "ringmap", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Render the map as an SVG document.
    Render {
        /// Map config file (TOML); the built-in colony when omitted
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,

        /// Zoom factor, clamped to 0.5..=3.0
        #[arg(long, default_value_t = 1.0)]
        zoom: f64,

        /// Horizontal pan offset in canvas pixels (equal to viewbox units for the square SVG canvas)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        pan_x: f64,

        /// Vertical pan offset in canvas pixels (equal to viewbox units for the square SVG canvas)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        pan_y: f64,

        /// Output file; stdout when omitted
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },
    /// Print the SVG path data of one annulus sector.
    Path {
        #[arg(long)]
        inner: f64,

        #[arg(long)]
        outer: f64,

        /// Start angle in degrees (0 = up, clockwise)
        #[arg(long, allow_negative_numbers = true)]
        start: f64,

        /// End angle in degrees
        #[arg(long, allow_negative_numbers = true)]
        end: f64,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        cx: f64,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        cy: f64,
    },
    /// Validate a map config and list its sectors.
    Check {
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            config,
            zoom,
            pan_x,
            pan_y,
            out,
        } => render(config.as_deref(), ViewState::at(zoom, Point::new(pan_x, pan_y)), out),
        Commands::Path {
            inner,
            outer,
            start,
            end,
            cx,
            cy,
        } => {
            let path =
                geometry::describe_annulus_sector(Point::new(cx, cy), inner, outer, start, end);
            println!("{path}");
            Ok(())
        }
        Commands::Check { config } => check(config.as_deref()),
    }
}

fn load_settings(config: Option<&Path>) -> anyhow::Result<MapSettings> {
    match config {
        Some(path) => MapSettings::load(path, ENV_PREFIX)
            .with_context(|| format!("Failed to load map config '{}'", path.display())),
        None => Ok(MapSettings::default()),
    }
}

fn render(config: Option<&Path>, state: ViewState, out: Option<PathBuf>) -> anyhow::Result<()> {
    let settings = load_settings(config)?;
    let layout = settings.layout()?;
    let controller = Controller::with_state(layout, settings.viewport(), state);
    let document = svg::render(&controller, &settings.title);

    match out {
        Some(path) => {
            fs_err::write(&path, document)?;
            log::info!("Wrote {}", path.display());
        }
        None => print!("{document}"),
    }
    Ok(())
}

fn check(config: Option<&Path>) -> anyhow::Result<()> {
    let settings = load_settings(config)?;
    let layout = settings.layout()?;
    let ring = layout.ring();

    println!(
        "{}: {} sectors on ring {:.1}..{:.1} ({})",
        settings.title,
        layout.sectors().len(),
        ring.inner,
        ring.outer,
        layout.extras().detail
    );
    for sector in layout.sectors() {
        let category = sector
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>3}  {:>8.2}..{:<8.2} {}  {:<10} {}",
            sector.id, sector.span.start, sector.span.end, sector.color, category, sector.name
        );
    }
    Ok(())
}
