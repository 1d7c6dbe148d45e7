use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use clap::Parser;
use serde_json::json;

use thermal_score_rs::{
    load_igc, AirportDirectory, CategoryScore, FlightScore, FlightScorer, ScoringConfig,
    ScoringMode, Thermal,
};

#[derive(Parser, Debug)]
#[command(name = "thermal_score")]
#[command(about = "Score the thermals of a glider flight recorder trace", long_about = None)]
struct Args {
    /// Path to the flight recorder file (.igc or .igc.gz)
    #[arg(value_name = "FILE")]
    trace: PathBuf,

    /// JSON airport directory ([{name, latitude, longitude}]); built-in list if omitted
    #[arg(long)]
    airports: Option<PathBuf>,

    /// JSON scoring configuration; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scoring mode (plain, energy_compensated)
    #[arg(long)]
    scoring_mode: Option<String>,

    /// Optimize thermals on parallel threads
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Print the full result as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn clock(seconds: f64) -> String {
    let secs = (seconds.max(0.0).round() as u32) % 86_400;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| format!("{:.0}s", seconds))
}

fn describe(t: &Thermal) -> String {
    format!(
        "{} - {}  {:>6.0} m  {:>5.2} m/s  {:>8.1} points",
        clock(t.start_time),
        clock(t.end_time),
        t.effective_gain,
        t.average_climb,
        t.points
    )
}

fn print_category(title: &str, category: Option<&CategoryScore>) {
    println!("{}:", title);
    let Some(category) = category else {
        println!("  no thermals");
        return;
    };
    println!("  Strongest thermal: {}", describe(&category.strongest));
    match &category.best_window {
        Some(window) => println!(
            "  Best hour: {:.1} points from {} to {} ({} thermals)",
            window.points,
            clock(window.start_time),
            clock(window.end_time),
            window.last_thermal_index - window.first_thermal_index + 1
        ),
        None => println!("  Best hour: no thermal fits the window"),
    }
}

fn print_report(score: &FlightScore) {
    println!("Took off from {}", score.takeoff.name);
    for t in &score.thermals {
        println!("  {}", describe(t));
    }
    println!("Total: {:.1} points in {} thermals", score.total_points(), score.thermals.len());
    print_category("Local", score.local.as_ref());
    print_category("Cross-country", score.remote.as_ref());
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match args.config.as_ref() {
        Some(path) => ScoringConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ScoringConfig::default(),
    };
    if let Some(mode) = args.scoring_mode.as_deref() {
        config.scoring_mode = mode.parse::<ScoringMode>()?;
    }
    if args.parallel {
        config.parallel_optimize = true;
    }

    let directory = match args.airports.as_ref() {
        Some(path) => AirportDirectory::from_json_file(path)
            .with_context(|| format!("loading airports {}", path.display()))?,
        None => AirportDirectory::builtin(),
    };
    log::debug!("{} airports in directory", directory.airports().len());

    let igc = load_igc(&args.trace)
        .with_context(|| format!("reading {}", args.trace.display()))?;
    if let Some(date) = igc.header.date {
        log::info!(
            "flight of {} ({})",
            date,
            igc.header.glider_id.as_deref().unwrap_or("unknown glider")
        );
    }

    let scorer = FlightScorer::new(config)?;
    let score = match scorer
        .prepare(igc.fixes)
        .and_then(|trace| {
            log::info!("{} samples in trace", trace.len());
            scorer.score(&trace, &directory)
        }) {
        Ok(score) => score,
        Err(e) if e.is_invalid_trace() => {
            anyhow::bail!("{} is not a usable flight trace: {}", args.trace.display(), e)
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        let output = json!({
            "trace": args.trace.display().to_string(),
            "header": igc.header,
            "scoring_mode": scorer.config().scoring_mode,
            "score": score,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&score);
    }
    Ok(())
}
