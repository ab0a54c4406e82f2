//! FanZone Gen CLI
//!
//! Writes fan_zone_defs.cpp into the output directory.
//! Returns non-zero on any unresolved reference or missing input.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fanzone_gen::{GenerationPipeline, GeneratorConfig, GENERATOR_VERSION};

#[derive(Parser)]
#[command(name = "fanzone-gen")]
#[command(about = "Phosphor fan zone definition parser")]
struct Cli {
    /// Fan zone definitional YAML
    #[arg(short = 'z', long = "zone_yaml")]
    zone_yaml: Option<PathBuf>,

    /// Fan definitional YAML
    #[arg(short = 'f', long = "fan_yaml")]
    fan_yaml: Option<PathBuf>,

    /// Events to set speeds YAML
    #[arg(short = 'e', long = "events_yaml")]
    events_yaml: Option<PathBuf>,

    /// Conditions to determine zone YAML
    #[arg(short = 'c', long = "zone_conditions_yaml")]
    zone_conditions_yaml: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'o', long = "output_dir", default_value = ".")]
    output_dir: PathBuf,

    /// Log every zone and event as it is assembled
    #[arg(short, long)]
    verbose: bool,
}

impl From<Cli> for GeneratorConfig {
    fn from(cli: Cli) -> Self {
        Self {
            zone_yaml: cli.zone_yaml,
            fan_yaml: cli.fan_yaml,
            events_yaml: cli.events_yaml,
            zone_conditions_yaml: cli.zone_conditions_yaml,
            output_dir: cli.output_dir,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "fanzone_gen=debug"
    } else {
        "fanzone_gen=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = GeneratorConfig::from(cli);
    if let Err(e) = config.validate() {
        error!("{}", e);
        eprintln!("usage: fanzone-gen -z <zone_yaml> -f <fan_yaml> [-e <events_yaml>] [-c <zone_conditions_yaml>] [-o <output_dir>]");
        return ExitCode::FAILURE;
    }

    info!(version = GENERATOR_VERSION, "generating fan zone definitions");

    match GenerationPipeline::new(config).generate() {
        Ok(report) => {
            info!(
                zone_groups = report.zone_groups,
                zones = report.zones,
                events = report.events,
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
