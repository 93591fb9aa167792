//! Lifecycle control: region creation, thread spawn and orderly
//! shutdown of the whole producer.

use std::sync::Arc;
use std::thread::JoinHandle;

use thiserror::Error;
use tracing::info;

use grill_common::catalog::{Catalog, ConfigError};
use grill_common::config::LineConfig;
use grill_common::control;
use grill_common::error::RegionError;
use grill_common::layout::LineShared;
use grill_common::region::RegionOwner;

use crate::{dispatcher, generator, monitor, worker};

/// Fatal producer startup errors.
#[derive(Debug, Error)]
pub enum LineError {
    /// Configuration or catalog failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Shared region could not be created.
    #[error(transparent)]
    Region(#[from] RegionError),

    /// A runtime thread could not be spawned.
    #[error("failed to spawn thread '{name}': {source}")]
    Spawn {
        /// Thread name.
        name: String,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Final counters printed at shutdown.
#[derive(Debug, Clone, Copy)]
pub struct Summary {
    /// Orders generated over the run.
    pub generated: u64,
    /// Orders completed over the run.
    pub processed: u64,
    /// Orders still queued when the line stopped (discarded).
    pub queued: u32,
    /// Configured station count.
    pub stations: u32,
    /// Configured milliseconds per step.
    pub step_millis: u64,
    /// Configured milliseconds between orders.
    pub order_millis: u64,
}

/// The running producer: the owned region plus its `3 + N` threads.
pub struct ProductionLine {
    region: Arc<RegionOwner>,
    threads: Vec<JoinHandle<()>>,
}

impl ProductionLine {
    /// Validate the configuration, create the region and start every
    /// runtime thread.
    pub fn start(
        region_name: &str,
        config: LineConfig,
        catalog: Catalog,
        seed: u64,
    ) -> Result<Self, LineError> {
        config.validate()?;
        catalog.validate()?;

        let region = Arc::new(RegionOwner::create(region_name, &config, &catalog)?);
        let catalog = Arc::new(catalog);
        let mut line = Self {
            region,
            threads: Vec::with_capacity(3 + config.stations as usize),
        };

        let spawn_all = |line: &mut Self| -> Result<(), LineError> {
            {
                let region = line.region.clone();
                let catalog = catalog.clone();
                line.spawn("generator", move || {
                    generator::run(region.state(), &catalog, seed)
                })?;
            }
            {
                let region = line.region.clone();
                line.spawn("dispatcher", move || dispatcher::run(region.state()))?;
            }
            {
                let region = line.region.clone();
                line.spawn("monitor", move || monitor::run(region.state()))?;
            }
            for id in 0..config.stations as usize {
                let region = line.region.clone();
                line.spawn(&format!("station-{id}"), move || {
                    worker::run(region.state(), id)
                })?;
            }
            Ok(())
        };

        if let Err(e) = spawn_all(&mut line) {
            // Partial startup: bring down whatever got spawned before
            // reporting the failure.
            line.stop_threads();
            return Err(e);
        }

        info!(
            stations = config.stations,
            step_millis = config.step_millis,
            order_millis = config.order_millis,
            region = region_name,
            "production line started"
        );
        Ok(line)
    }

    fn spawn(
        &mut self,
        name: &str,
        body: impl FnOnce() + Send + 'static,
    ) -> Result<(), LineError> {
        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(body)
            .map_err(|source| LineError::Spawn {
                name: name.to_string(),
                source,
            })?;
        self.threads.push(handle);
        Ok(())
    }

    /// The mapped region state.
    pub fn state(&self) -> &LineShared {
        self.region.state()
    }

    /// Stop the line: flip the lifecycle flag, wake every waiter and
    /// join all threads. Undispatched backlog orders are discarded with
    /// the region, which is unlinked when the last handle drops.
    pub fn shutdown(mut self) -> Summary {
        self.stop_threads();

        let state = self.region.state();
        let status = control::line_status(state);
        Summary {
            generated: status.generated,
            processed: status.processed,
            queued: status.queued,
            stations: status.stations,
            step_millis: status.step_millis,
            order_millis: status.order_millis,
        }
    }

    fn stop_threads(&mut self) {
        let state = self.region.state();
        state.set_active(false);

        // Broadcast every wait condition under its own lock so no
        // sleeping thread misses the flag flip.
        for station in state.active_stations() {
            let guard = station.core.lock();
            station.cond.notify_all();
            drop(guard);
        }
        state.drain_backlog();
        {
            let guard = state.globals.lock();
            state.new_order.notify_all();
            drop(guard);
        }

        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn unique(tag: &str) -> String {
        format!("test_line_{tag}_{}", std::process::id())
    }

    #[test]
    fn start_and_shutdown_joins_cleanly() {
        let config = LineConfig {
            stations: 2,
            step_millis: 0,
            order_millis: 50,
            ..LineConfig::default()
        };
        let name = unique("cycle");
        let line = ProductionLine::start(&name, config, Catalog::builtin(), 1).expect("start");

        // Let the generator and workers turn over a few orders.
        std::thread::sleep(Duration::from_millis(400));

        let summary = line.shutdown();
        assert!(summary.generated >= 1);
        assert!(summary.processed <= summary.generated);
        assert_eq!(summary.stations, 2);

        // The region name is gone once the line is down.
        assert!(!std::path::Path::new(&format!("/dev/shm/grill_{name}")).exists());
    }

    #[test]
    fn invalid_config_is_rejected_before_region_creation() {
        let config = LineConfig {
            stations: 0,
            ..LineConfig::default()
        };
        let result = ProductionLine::start(&unique("badcfg"), config, Catalog::builtin(), 1);
        assert!(matches!(result, Err(LineError::Config(_))));
    }

    #[test]
    fn second_producer_on_same_region_fails() {
        let config = LineConfig {
            step_millis: 0,
            order_millis: 1_000,
            ..LineConfig::default()
        };
        let name = unique("dup");
        let line =
            ProductionLine::start(&name, config.clone(), Catalog::builtin(), 1).expect("first");
        let second = ProductionLine::start(&name, config, Catalog::builtin(), 1);
        assert!(matches!(
            second,
            Err(LineError::Region(RegionError::ProducerAlreadyRunning { .. }))
        ));
        line.shutdown();
    }
}
