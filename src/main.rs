use std::thread;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use step_timing::config::TimingConfig;
use step_timing::logging;
use step_timer::{time_block, timed, MonotonicClock, StepTimer};

fn checksum(data: &[u8]) -> u32 {
    data.iter().fold(0u32, |acc, &byte| acc.rotate_left(5) ^ u32::from(byte))
}

fn parse_batch_size(raw: &str) -> Result<usize, std::num::ParseIntError> {
    raw.trim().parse()
}

fn load_config() -> anyhow::Result<TimingConfig> {
    match std::env::args().nth(1) {
        Some(path) => TimingConfig::load_from_file(&path)
            .with_context(|| format!("failed to load config from {}", path)),
        None => Ok(TimingConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    logging::init(&config)?;

    info!("Starting {} v{}", step_timing::NAME, step_timing::VERSION);

    let timer = StepTimer::with_parts(MonotonicClock::new(), config.tracing_sink());

    let data = time_block!(timer, "generate", {
        (0..1_000_000u32).map(|i| (i % 251) as u8).collect::<Vec<u8>>()
    });

    let timed_checksum = timed!(timer, checksum);
    let sum = timed_checksum.call((data.as_slice(),));
    info!("Checksum of {} bytes: {:#010x}", data.len(), sum);

    timer.step("sleep", || thread::sleep(Duration::from_millis(50)));

    // A failing call is passed through without a timing line
    let timed_parse = timer.wrap(parse_batch_size);
    match timed_parse.try_call(("lots",)) {
        Ok(size) => info!("Batch size: {}", size),
        Err(err) => warn!("Invalid batch size: {}", err),
    }

    info!("Done");
    Ok(())
}
