//! ScanLab CLI — backtests, anchor extraction, and matrix scores.
//!
//! Commands:
//! - `run` — execute a scanner backtest from a TOML config or flags, over
//!   CSV candle files or seeded synthetic data
//! - `anchors` — extract P&F anchor points and zones from one CSV series
//! - `matrix` — multi-box-size P&F matrix score for one CSV series

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use scanlab_core::data::synthetic::{minute_series, SyntheticConfig};
use scanlab_core::data::{load_csv_file, MemoryCandleSource};
use scanlab_core::domain::Timeframe;
use scanlab_core::engine::EngineConfig;
use scanlab_core::pnf::{
    matrix_score, pnf_points, AnchorConfig, PnfMatrix, DEFAULT_BOX_SIZES, DEFAULT_REVERSAL,
};
use scanlab_runner::{run_backtest, write_csv, write_json, RunConfig, ScannerSummary};

#[derive(Parser)]
#[command(name = "scanlab", about = "ScanLab CLI — P&F anchors and scanner backtests")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a scanner backtest.
    Run {
        /// Path to a TOML run config. Flags below override nothing when
        /// this is given.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Scanner ids (e.g. 1 12 23). Required without --config.
        #[arg(long, num_args = 1..)]
        scanners: Vec<u16>,

        /// Instruments to scan. Required without --config.
        #[arg(long, num_args = 1..)]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD). Required without --config.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Required without --config.
        #[arg(long)]
        end: Option<String>,

        /// Evaluation timeframe: 1, 3, 5, or "daily".
        #[arg(long, default_value = "1")]
        timeframe: String,

        /// Directory of per-instrument CSV candle files.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Generate seeded synthetic data instead of reading CSV files.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Seed for synthetic data.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output directory for result JSON/CSV.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Extract anchor points and zones from one CSV candle series.
    Anchors {
        /// CSV candle file.
        file: PathBuf,

        /// Box size as a fraction (0.01 = 1%).
        #[arg(long, default_value_t = 0.01)]
        box_pct: f64,

        /// Boxes required to reverse a column.
        #[arg(long, default_value_t = 3)]
        reversal: u32,
    },
    /// Multi-box-size P&F matrix score for one CSV candle series.
    Matrix {
        /// CSV candle file.
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            scanners,
            symbols,
            start,
            end,
            timeframe,
            data_dir,
            synthetic,
            seed,
            output_dir,
        } => cmd_run(
            config, scanners, symbols, start, end, &timeframe, data_dir, synthetic, seed,
            &output_dir,
        ),
        Commands::Anchors {
            file,
            box_pct,
            reversal,
        } => cmd_anchors(&file, box_pct, reversal),
        Commands::Matrix { file } => cmd_matrix(&file),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    config_path: Option<PathBuf>,
    scanners: Vec<u16>,
    symbols: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    timeframe: &str,
    data_dir: Option<PathBuf>,
    synthetic: bool,
    seed: u64,
    output_dir: &Path,
) -> Result<()> {
    let config = match config_path {
        Some(path) => RunConfig::from_toml_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => {
            if scanners.is_empty() || symbols.is_empty() {
                bail!("--scanners and --symbols are required without --config");
            }
            let start = parse_date(start.as_deref().context("--start is required")?)?;
            let end = parse_date(end.as_deref().context("--end is required")?)?;
            RunConfig {
                scanners,
                universe: symbols,
                start_date: start,
                end_date: end,
                timeframe: parse_timeframe(timeframe)?,
                engine: EngineConfig::default(),
            }
        }
    };

    let source = build_source(&config, data_dir.as_deref(), synthetic, seed)?;
    let report = run_backtest(source, &config)?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let json_path = output_dir.join(format!("{}.json", report.run_id));
    let csv_path = output_dir.join(format!("{}.csv", report.run_id));
    write_json(&json_path, &report.results)?;
    write_csv(&csv_path, &report.results)?;

    println!("run {}", report.run_id);
    println!(
        "{} units processed, {} skipped, {} triggers",
        report.units_total,
        report.units_failed,
        report.results.len()
    );
    for id in config.scanner_ids() {
        let summary = ScannerSummary::compute(id, &report.results);
        let success = summary
            .success_rate()
            .map(|r| format!("{:.1}%", r * 100.0))
            .unwrap_or_else(|| "-".into());
        println!(
            "scanner {id}: {} triggers, success {}, 1% target {}, stoploss {}",
            summary.triggers, success, summary.hit_target_1pct, summary.hit_stoploss
        );
        for trade in ScannerSummary::top_trades(id, &report.results, 3) {
            println!(
                "  {} {} {:+.2}% in 30min",
                trade.instrument,
                trade.trigger_time,
                trade.return_at("30min").unwrap_or(0.0)
            );
        }
    }
    println!("results written to {} and {}", json_path.display(), csv_path.display());
    Ok(())
}

fn cmd_anchors(file: &Path, box_pct: f64, reversal: u32) -> Result<()> {
    let candles =
        load_csv_file(file).with_context(|| format!("loading {}", file.display()))?;
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();

    let points = pnf_points(&highs, &lows, box_pct, reversal);
    if points.is_empty() {
        println!("no P&F activity at box size {box_pct}");
        return Ok(());
    }
    let matrix = PnfMatrix::from_points(&points, box_pct);
    let config = AnchorConfig::default();
    let anchors = config.anchor_points(&matrix, None);

    println!(
        "{} boxes in {} columns, {} price levels",
        points.len(),
        matrix.width(),
        matrix.height()
    );
    if anchors.is_empty() {
        println!("no anchor points (matrix narrower than the column minimum)");
        return Ok(());
    }

    println!("{:<12} {:>8} {:>10} {:>12}", "price", "boxes", "type", "confidence");
    for anchor in &anchors {
        println!(
            "{:<12.2} {:>8} {:>10} {:>12.3}",
            anchor.price_level,
            anchor.box_count,
            format!("{:?}", anchor.kind),
            anchor.confidence
        );
    }

    let zones = config.group_into_zones(&anchors);
    for (i, zone) in zones.iter().enumerate() {
        println!(
            "zone {}: center {:.2}, range {:.2}..{:.2}, {} boxes",
            i + 1,
            zone.zone_center,
            zone.zone_range.0,
            zone.zone_range.1,
            zone.total_activity
        );
    }
    Ok(())
}

fn cmd_matrix(file: &Path) -> Result<()> {
    let candles =
        load_csv_file(file).with_context(|| format!("loading {}", file.display()))?;
    match matrix_score(&candles, &DEFAULT_BOX_SIZES, DEFAULT_REVERSAL) {
        Some(score) => {
            for s in &score.scores {
                println!(
                    "box {:>6.2}%: {:?} ({:+}), last price {:.2}",
                    s.box_size * 100.0,
                    s.column_kind,
                    s.score,
                    s.latest_price
                );
            }
            println!(
                "total {:+} → {:?}{}",
                score.total,
                score.strength,
                if score.super_alert { " (super alert)" } else { "" }
            );
        }
        None => println!("not enough candles for a matrix score"),
    }
    Ok(())
}

fn build_source(
    config: &RunConfig,
    data_dir: Option<&Path>,
    synthetic: bool,
    seed: u64,
) -> Result<Arc<MemoryCandleSource>> {
    if synthetic {
        let trading_days = (config.end_date - config.start_date).num_days().max(1) as usize;
        let mut source = MemoryCandleSource::new();
        let synth = SyntheticConfig::default();
        for (i, instrument) in config.universe.iter().enumerate() {
            let candles =
                minute_series(seed + i as u64, config.start_date, trading_days, &synth);
            source.insert(instrument, candles);
        }
        return Ok(Arc::new(source));
    }

    let dir = data_dir.context("--data-dir is required unless --synthetic is set")?;
    let source = MemoryCandleSource::from_csv_dir(dir)
        .with_context(|| format!("loading candles from {}", dir.display()))?;
    if source.is_empty() {
        bail!("no CSV candle files found in {}", dir.display());
    }
    Ok(Arc::new(source))
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{text}', expected YYYY-MM-DD"))
}

fn parse_timeframe(text: &str) -> Result<Timeframe> {
    match text {
        "1" | "1m" => Ok(Timeframe::M1),
        "3" | "3m" => Ok(Timeframe::M3),
        "5" | "5m" => Ok(Timeframe::M5),
        "daily" | "day" | "d" => Ok(Timeframe::Daily),
        other => bail!("unknown timeframe '{other}' (expected 1, 3, 5, or daily)"),
    }
}
