use anyhow::Result;
use clap::Parser;

/// Saturate CPU cores with busy-looping workers.
#[derive(Debug, Parser)]
pub struct Opts {
    /// Number of workers to run.
    #[clap(long, default_value_t = num_cpus::get())]
    pub workers: usize,
}

/// Log to stderr at info level. Timestamps only on errors.
pub fn init_logging() -> Result<()> {
    let mut lcfg = simplelog::ConfigBuilder::new();
    lcfg.set_time_level(simplelog::LevelFilter::Error)
        .set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);
    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        lcfg.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;
    Ok(())
}
