//! GreenPost client - post simulated greenhouse readings to an HTTP endpoint
//!
//! Usage:
//!   greenpost-client --config node.json           - Run cycles until stopped
//!   greenpost-client --config node.json --once    - Run a single cycle
//!
//! Set `RUST_LOG=debug` for transport details.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use greenpost_connectors::{load_config, MonotonicClock, SimulatedSensors, SoftwareWatchdog, StdConnectivity, StdDelay};
use greenpost_core::{Liveness, TelemetryClient, VERSION};
use log::{error, info, warn};

#[derive(Parser)]
#[command(name = "greenpost-client")]
#[command(about = "Measure greenhouse sensors and post them as JSON over HTTP", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, default_value = "greenpost.json")]
    config: PathBuf,

    /// Run one measurement cycle and exit
    #[arg(long)]
    once: bool,

    /// Seed for the simulated sensors
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Stop after this many cycles (0 runs forever)
    #[arg(long, default_value_t = 0)]
    cycles: u64,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    info!("greenpost-client {}", VERSION);

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            error!("{}: {}", cli.config.display(), err);
            return ExitCode::FAILURE;
        }
    };
    info!(
        "node {} posting to {}:{}{} every {} ms",
        config.identity.id,
        config.server.host,
        config.server.port,
        config.server.path,
        config.schedule.send_interval_ms
    );

    let mut client = match TelemetryClient::new(
        &config,
        SimulatedSensors::new(cli.seed),
        StdConnectivity::default(),
        MonotonicClock::new(),
        StdDelay,
    ) {
        Ok(client) => client,
        Err(err) => {
            error!("invalid configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut watchdog = SoftwareWatchdog::new();

    if cli.once {
        return match client.run_cycle(&mut watchdog) {
            Ok(report) => {
                println!(
                    "cycle {}: {} bytes posted, {} bytes of reply, {} alerts",
                    report.cycle, report.body_bytes, report.drained_bytes, report.alerts
                );
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("cycle failed: {}", err);
                ExitCode::FAILURE
            }
        };
    }

    watchdog.arm(config.schedule.watchdog_timeout_ms);
    loop {
        match client.run_cycle(&mut watchdog) {
            Ok(report) => info!(
                "cycle {}: {} bytes posted, {} alerts",
                report.cycle, report.body_bytes, report.alerts
            ),
            Err(err) => warn!("cycle {} failed: {}", client.cycles(), err),
        }

        // a hung step on a board ends in a reset; here the supervisor restarts us
        if watchdog.is_expired() {
            error!("watchdog expired during cycle {}", client.cycles());
            return ExitCode::FAILURE;
        }
        if cli.cycles != 0 && client.cycles() >= cli.cycles {
            let stats = client.stats();
            info!(
                "done: {} sent, {} failed, {} bytes",
                stats.requests_sent, stats.requests_failed, stats.bytes_sent
            );
            return ExitCode::SUCCESS;
        }

        client.sleep_until_next_cycle(&mut watchdog);
    }
}
