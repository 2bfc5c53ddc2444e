use anyhow::Context;
use bearingcore::collaborator::{AnalysisCollaborator, FixtureCollaborator, HttpCollaborator};
use chrono::NaiveDate;
use clap::Parser;
use generator::profile::{build_fleet, FleetConfig};
use service::bridge::{service_bind_address, ServiceBridge};
use std::fs;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use workflow::config::{ReportConfig, ReportMode, DEFAULT_SERVICE_URL};
use workflow::runner::Runner;

mod generator;
mod service;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Bearing vibration report driver")]
struct Args {
    /// Load a report config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_SERVICE_URL)]
    service_url: String,
    /// Machine to report on; repeat for several
    #[arg(long = "machine")]
    machines: Vec<String>,
    /// Restrict a single-machine report to one bearing
    #[arg(long)]
    bearing: Option<String>,
    #[arg(long, value_enum, default_value_t = ReportMode::Single)]
    mode: ReportMode,
    /// Report date (YYYY-MM-DD), today when omitted
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long, default_value = "reports")]
    output: PathBuf,
    /// Also export one spectrum CSV per bearing axis
    #[arg(long, default_value_t = false)]
    csv: bool,
    /// Run the stand-in analysis service instead of reporting
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = 9000)]
    port: u16,
    /// Seed for the synthetic fleet
    #[arg(long, default_value_t = 7)]
    seed: u64,
    #[arg(long, default_value_t = 3)]
    fleet_size: usize,
    /// Use canned responses from a JSON fixture instead of the service
    #[arg(long)]
    fixture: Option<PathBuf>,
    /// Write the synthetic fleet as a JSON fixture and exit
    #[arg(long)]
    dump_fixture: Option<PathBuf>,
}

fn load_fixture(path: &PathBuf) -> anyhow::Result<FixtureCollaborator> {
    let contents = fs::read_to_string(path).with_context(|| format!("reading fixture {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing fixture {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: Args) -> anyhow::Result<()> {
    let fixture = match &args.fixture {
        Some(path) => Some(load_fixture(path)?),
        None if args.serve || args.dump_fixture.is_some() => Some(build_fleet(&FleetConfig {
            machines: args.fleet_size,
            seed: args.seed,
            ..FleetConfig::default()
        })),
        None => None,
    };

    if let Some(path) = &args.dump_fixture {
        let fleet = fixture.as_ref().context("no fleet to dump")?;
        let json = serde_json::to_string_pretty(fleet).context("serializing fixture")?;
        fs::write(path, json).with_context(|| format!("writing fixture {}", path.display()))?;
        println!("Fixture with {} machine(s) -> {}", fleet.machines.len(), path.display());
        return Ok(());
    }

    if args.serve {
        let fleet = fixture.context("no fleet to serve")?;
        return ServiceBridge::new(fleet).serve(service_bind_address(args.port)).await;
    }

    let config = match &args.workflow {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::from_args(
            args.service_url.clone(),
            args.machines.clone(),
            args.bearing.clone(),
            args.mode,
            args.date,
            args.output.clone(),
            args.csv,
        )?,
    };

    let http;
    let collaborator: &dyn AnalysisCollaborator = match &fixture {
        Some(fleet) => fleet,
        None => {
            http = HttpCollaborator::new(&config.service_url)
                .with_context(|| format!("connecting to {}", config.service_url))?;
            &http
        }
    };

    let summary = Runner::new(config).execute(collaborator).await?;
    println!(
        "Reports -> documents {}, pages {}, csv {}, requests {}, failed {}, empty {}",
        summary.documents.len(),
        summary.page_count,
        summary.csv_files.len(),
        summary.metrics.requests,
        summary.metrics.failures,
        summary.metrics.empty
    );
    for path in &summary.documents {
        println!("  {}", path.display());
    }
    for (machine_id, reason) in &summary.failures {
        println!("  failed {}: {}", machine_id, reason);
    }
    Ok(())
}
