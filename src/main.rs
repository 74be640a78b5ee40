#[macro_use]
extern crate tracing;

use std::env;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _};
use circle_gesture::cli::{Cli, Sub};
use circle_gesture::params::RecognitionParameters;
use circle_gesture::recognizer::GestureRecognizer;
use circle_gesture::replay::{self, ReplayEvent};
use circle_gesture_config::Config;
use clap::Parser;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "circle_gesture=debug,info";

fn main() -> anyhow::Result<()> {
    let directives = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();

    let _client = tracy_client::Client::start();

    let config_path = cli
        .config
        .or_else(|| env::var_os("CIRCLE_GESTURE_CONFIG").map(PathBuf::from));

    match cli.subcommand {
        Sub::Validate => {
            let path = config_path
                .context("no config file given, pass --config or set CIRCLE_GESTURE_CONFIG")?;
            load_config(&path)?;
            info!("config is valid");
        }
        Sub::Replay {
            trace,
            json,
            diagnostics,
        } => {
            let config = match &config_path {
                Some(path) => load_config(path)?,
                None => Config::default(),
            };
            let params = RecognitionParameters::from_config(&config);

            let file = File::open(&trace).with_context(|| format!("error opening {trace:?}"))?;
            let records = replay::read_trace(BufReader::new(file))
                .with_context(|| format!("error reading trace {trace:?}"))?;
            debug!("replaying {} records with {params:?}", records.len());

            let mut recognizer = GestureRecognizer::new(params);
            let events = replay::replay(&mut recognizer, &records, diagnostics);

            let mut stdout = io::stdout().lock();
            for event in &events {
                if json {
                    writeln!(stdout, "{}", serde_json::to_string(event)?)?;
                } else {
                    print_event(&mut stdout, event)?;
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    // Keep miette's rendering of the parse diagnostics.
    Config::load(path).map_err(|err| anyhow!("{err:?}"))
}

fn print_event(out: &mut impl Write, event: &ReplayEvent) -> io::Result<()> {
    writeln!(out, "{:>6} {:>9.3}s {:?}", event.tick, event.t, event.event)?;

    let Some(diagnostics) = &event.diagnostics else {
        return Ok(());
    };

    match diagnostics.circle {
        Some(circle) => writeln!(
            out,
            "       circle center ({:.3}, {:.3}) radius {:.3}",
            circle.center.x, circle.center.y, circle.radius
        )?,
        None => writeln!(out, "       no circle fitted")?,
    }

    if !diagnostics.incorrect_points.is_empty() {
        writeln!(
            out,
            "       {} samples outside the tolerance band:",
            diagnostics.incorrect_points.len()
        )?;
        for point in &diagnostics.incorrect_points {
            writeln!(out, "         ({:.3}, {:.3})", point.x, point.y)?;
        }
    }

    Ok(())
}
