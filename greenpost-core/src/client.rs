//! Measurement cycle
//!
//! One cycle: sample every sensor, re-evaluate alerts, make sure the network
//! is up, post the document and drain the reply. A failed cycle is logged
//! and the next one starts after the usual sleep; the node never stops.

use embedded_hal::delay::DelayNs;

use crate::alert::refresh_alerts;
use crate::config::{ClientConfig, NetworkConfig, ScheduleConfig};
use crate::document::{Document, DocumentLayout};
use crate::errors::{ConfigResult, CycleError, TransportError};
use crate::sampler::Sampler;
use crate::sensors::{DeviceIdentity, SensorRegistry};
use crate::time::TimeSource;
use crate::traits::{Connectivity, Liveness, SensorProvider};
use crate::transport::{TransportDriver, TransportStats};

/// Summary of one successful cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Cycle number, starting at 1
    pub cycle: u64,
    /// Body bytes posted
    pub body_bytes: usize,
    /// Reply bytes drained
    pub drained_bytes: usize,
    /// Temperature probes outside their band
    pub alerts: usize,
    /// Whether the network had to be joined first
    pub joined: bool,
}

/// Sensor node running measurement cycles
pub struct TelemetryClient<S, C, T, D> {
    sensors: S,
    transport: TransportDriver<C, T, D>,
    registry: SensorRegistry,
    identity: DeviceIdentity,
    layout: DocumentLayout,
    sampler: Sampler,
    network: NetworkConfig,
    schedule: ScheduleConfig,
    cycles: u64,
}

impl<S, C, T, D> TelemetryClient<S, C, T, D>
where
    S: SensorProvider,
    C: Connectivity,
    T: TimeSource,
    D: DelayNs,
{
    /// Validate `config` and set up the node
    pub fn new(config: &ClientConfig, sensors: S, connectivity: C, clock: T, delay: D) -> ConfigResult<Self> {
        config.validate()?;
        let transport = TransportDriver::new(connectivity, clock, delay, config.transport_settings());
        Ok(Self {
            sensors,
            transport,
            registry: config.build_registry()?,
            identity: config.identity()?,
            layout: config.layout(),
            sampler: config.sampler()?,
            network: config.network.clone(),
            schedule: config.schedule,
            cycles: 0,
        })
    }

    /// Readings from the latest cycle
    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    /// The transport driver
    pub fn transport(&self) -> &TransportDriver<C, T, D> {
        &self.transport
    }

    /// The transport driver, mutably
    pub fn transport_mut(&mut self) -> &mut TransportDriver<C, T, D> {
        &mut self.transport
    }

    /// Transport totals
    pub fn stats(&self) -> TransportStats {
        self.transport.stats()
    }

    /// Cycles started so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Sensor provider
    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }

    /// Run one measurement cycle
    pub fn run_cycle<L: Liveness>(&mut self, liveness: &mut L) -> Result<CycleReport, CycleError> {
        self.cycles += 1;
        gp_debug!("cycle {} starting", self.cycles);

        self.registry.measure_all(&self.sampler, &mut self.sensors, liveness);
        let alerts = refresh_alerts(&mut self.registry);

        let joined = self
            .transport
            .ensure_network(&self.network, liveness)
            .map_err(CycleError::Network)?
            .is_some();

        let document = Document::build(&self.registry, &self.identity, &self.layout);
        let delivery = self.transport.post(&document, liveness).map_err(classify)?;

        Ok(CycleReport {
            cycle: self.cycles,
            body_bytes: delivery.body_bytes,
            drained_bytes: delivery.drained_bytes,
            alerts,
            joined,
        })
    }

    /// Sleep for the send interval, refreshing `liveness` along the way
    pub fn sleep_until_next_cycle<L: Liveness>(&mut self, liveness: &mut L) {
        let slice = (self.schedule.watchdog_timeout_ms / 2).max(1);
        let mut remaining = self.schedule.send_interval_ms;
        while remaining > 0 {
            let step = remaining.min(slice);
            self.transport.delay_mut().delay_ms(step);
            liveness.refresh();
            remaining -= step;
        }
    }

    /// Run cycles forever
    pub fn run_forever<L: Liveness>(&mut self, liveness: &mut L) -> ! {
        liveness.arm(self.schedule.watchdog_timeout_ms);
        loop {
            match self.run_cycle(liveness) {
                Ok(report) => gp_info!(
                    "cycle {}: {} bytes posted, {} alerts",
                    report.cycle,
                    report.body_bytes,
                    report.alerts
                ),
                Err(err) => gp_warn!("cycle {} failed: {}", self.cycles, err),
            }
            self.sleep_until_next_cycle(liveness);
        }
    }
}

/// Split transport failures into "network down" and "request broken"
fn classify(err: TransportError) -> CycleError {
    match err {
        TransportError::Join(_)
        | TransportError::Address(_)
        | TransportError::Resolve(_)
        | TransportError::Connect(_)
        | TransportError::RetriesExhausted { .. } => CycleError::Network(err),
        TransportError::Io(_) | TransportError::LengthMismatch { .. } => CycleError::Delivery(err),
    }
}
