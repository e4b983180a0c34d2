mod error;
mod logging;
mod report;
mod settings;

use carpool_route_lib::Planner;
use carpool_route_lib::dataset::load_segments_from_files;
use clap::Parser;
use error::Result;
use report::Report;
use settings::Settings;
use std::process::ExitCode;

fn main() -> ExitCode {
    let settings = Settings::parse();
    logging::setup_logging();
    tracing::info!("carpool-route v{}", env!("CARGO_PKG_VERSION"));

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg_attr(feature = "profiling", profiling::function)]
fn run(settings: &Settings) -> Result<()> {
    let (starts, ends) = settings.query_points()?;
    let segments = load_segments_from_files(settings.segments.clone())?;

    let planner = Planner::new(settings.planner_config());
    let plan = planner.plan(&segments, &starts, &ends)?;
    let overlay = settings
        .overlay
        .then(|| plan.overlay(&planner.config().palette));

    let report = Report::new(&plan, overlay);
    report.log_summary();
    report.write(settings.output.as_deref(), settings.pretty)
}
