use std::process::ExitCode;
use std::time::Instant;

use structopt::StructOpt;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod chart;
mod config;
mod display;
mod error;
mod results;

use crate::config::Opt;
use crate::error::PlotError;
use crate::results::ResultSet;

fn main() -> ExitCode {
    init_logging();
    let opt = Opt::from_args();

    match run(&opt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lock_plot=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(opt: &Opt) -> Result<(), PlotError> {
    let _elapsed = scopeguard::guard(Instant::now(), |start| {
        debug!("done in {:?}", start.elapsed());
    });

    let results = ResultSet::load(&opt.input)?;
    if results.is_empty() {
        warn!("{} has no data rows, the chart will be empty", opt.input.display());
    }
    let groups = results.group_by_lock_type();
    let chart = chart::render(&groups, &opt.render_options());

    info!(
        "plotting {} lock types: {}",
        chart.series.len(),
        chart.legend().join(", ")
    );
    let written = chart::persist(&chart, &opt.output)?;

    if opt.no_show {
        return Ok(());
    }
    if let Err(e) = display::show(&written) {
        warn!("could not open {}: {}", written.display(), e);
    }

    Ok(())
}
