use std::path::PathBuf;

use structopt::StructOpt;

use crate::chart::RenderOptions;

/// Plot lock benchmark timings, one line per lock type.
#[derive(Debug, StructOpt)]
#[structopt(name = "lock-plot")]
pub struct Opt {
    /// Benchmark results with LockType, ThreadCount and Time(ms) columns
    #[structopt(short, long, parse(from_os_str), default_value = "benchmark_results.csv")]
    pub input: PathBuf,

    /// Image to write; the extension picks the format
    #[structopt(short, long, parse(from_os_str), default_value = "benchmark_results.png")]
    pub output: PathBuf,

    #[structopt(long, default_value = "Benchmark Results for Different Lock Types")]
    pub title: String,

    /// Image width in pixels
    #[structopt(long, default_value = "1000")]
    pub width: u32,

    /// Image height in pixels
    #[structopt(long, default_value = "600")]
    pub height: u32,

    /// Average rows that share a lock type and thread count
    #[structopt(long)]
    pub average: bool,

    /// Draw points in thread count order rather than file order
    #[structopt(long)]
    pub sort_threads: bool,

    /// Save the image without opening a viewer
    #[structopt(long)]
    pub no_show: bool,
}

impl Opt {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            title: self.title.clone(),
            size: (self.width, self.height),
            average: self.average,
            sort_threads: self.sort_threads,
        }
    }
}
