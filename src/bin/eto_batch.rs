use chrono::NaiveDate;
use clap::Parser;
use eto_daily_service::eto::sample::{
    DEFAULT_CADENCE_MINUTES, DEFAULT_ELEVATION_M, DEFAULT_LATITUDE_DEG,
};
use eto_daily_service::eto::SiteConstants;
use eto_daily_service::export::write_daily_csv;
use eto_daily_service::services::{estimate_windows, select_windows, DateRange};
use eto_daily_service::source::SampleSource;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "eto-batch")]
#[command(about = "Compute the daily ETo table from a station CSV/XLSX export", long_about = None)]
struct Cli {
    /// Local .csv or .xlsx sample file
    #[arg(long, env = "SAMPLE_SOURCE_FILE")]
    file: Option<PathBuf>,

    /// CSV export URL (ignored when a file is given)
    #[arg(long, env = "SAMPLE_SOURCE_URL")]
    url: Option<String>,

    /// Worksheet name for .xlsx files (default: first sheet)
    #[arg(long, env = "SAMPLE_SOURCE_SHEET")]
    sheet: Option<String>,

    /// First agronomic date to report (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last agronomic date to report (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Output CSV path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Site latitude in degrees (north positive)
    #[arg(long, env = "SITE_LATITUDE", default_value_t = DEFAULT_LATITUDE_DEG, allow_negative_numbers = true)]
    latitude: f64,

    /// Site elevation in meters
    #[arg(long, env = "SITE_ELEVATION_M", default_value_t = DEFAULT_ELEVATION_M, allow_negative_numbers = true)]
    elevation: f64,

    /// Sampling interval of the input in minutes
    #[arg(long, env = "SAMPLE_CADENCE_MINUTES", default_value_t = DEFAULT_CADENCE_MINUTES)]
    cadence_minutes: f64,

    /// Days estimated in parallel
    #[arg(long, env = "ESTIMATION_CONCURRENCY", default_value = "8")]
    parallel: usize,

    /// Download retries for --url
    #[arg(long, env = "FETCH_MAX_RETRIES", default_value = "3")]
    max_retries: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so the table can be piped from stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let start_time = Instant::now();

    let source = match (cli.file, cli.url) {
        (Some(file), _) => {
            if !file.exists() {
                return Err(format!("File not found: {file:?}").into());
            }
            SampleSource::from_path(file, cli.sheet)
        }
        (None, Some(url)) => SampleSource::Url(url),
        (None, None) => return Err("--file or --url is required".into()),
    };
    let range = DateRange::new(cli.start, cli.end);
    range.validate()?;
    let site = SiteConstants::new(cli.latitude, cli.elevation)
        .with_cadence_minutes(cli.cadence_minutes);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Loading samples from {}", source.id()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let samples = source.load(cli.max_retries).await?;
    spinner.finish_with_message(format!("✓ Loaded {} samples", samples.len()));

    let windows = select_windows(&samples, range)?;

    let pb = ProgressBar::new(windows.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let results = estimate_windows(windows, site, cli.parallel, |result| {
        pb.set_message(result.date.to_string());
        pb.inc(1);
    })
    .await?;
    pb.finish_with_message(format!("✓ Computed {} days", results.len()));

    match &cli.output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            write_daily_csv(writer, &results)?;
            info!("Wrote {} days to {:?}", results.len(), path);
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_daily_csv(&mut handle, &results)?;
            handle.flush()?;
        }
    }

    info!(
        "Batch completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
