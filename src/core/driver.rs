use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error};

use crate::consts;
use crate::core::processor::{CycleStatus, Processor};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Instructions per second. Zero runs unpaced.
    pub rate_hz: u32,
    /// Stop after this many instructions.
    pub max_steps: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            rate_hz: consts::DEFAULT_RATE_HZ,
            max_steps: None,
        }
    }
}

impl DriverConfig {
    fn interval(&self) -> Option<Duration> {
        match self.rate_hz {
            0 => None,
            hz => Some(Duration::from_secs(1) / hz),
        }
    }
}

/// How far into the run the given step is due. Saturates instead of
/// wrapping for schedules longer than `u64::MAX` nanoseconds.
fn schedule_offset(interval: Duration, steps: u64) -> Duration {
    let nanos = interval.as_nanos().saturating_mul(steps as u128);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Shared flag checked by the drive loop between instructions.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub frames: u64,
    /// Steps spent spinning on the key-wait instruction.
    pub waiting_steps: u64,
}

#[derive(Debug, Default)]
pub struct Driver {
    config: DriverConfig,
    stop: StopHandle,
}

impl Driver {
    pub fn new(config: DriverConfig) -> Self {
        Driver {
            config,
            stop: StopHandle::default(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Steps the processor until stopped, the step limit is reached, or an
    /// instruction fails. Pacing is against a fixed schedule from the start of
    /// the run so sleep overshoot doesn't accumulate.
    pub fn run(&self, processor: &mut Processor) -> Result<RunSummary> {
        let interval = self.config.interval();
        let mut summary = RunSummary::default();
        debug!(
            "drive loop starting at {} Hz, step limit {:?}",
            self.config.rate_hz, self.config.max_steps
        );

        let start = Instant::now();
        while !self.stop.is_stopped() {
            if self.config.max_steps.is_some_and(|max| summary.steps >= max) {
                break;
            }

            match processor.step() {
                Ok(CycleStatus::RedrawScreen) => summary.frames += 1,
                Ok(CycleStatus::Waiting) => summary.waiting_steps += 1,
                Ok(CycleStatus::Continue) => {}
                Err(e) => {
                    error!("machine halted after {} steps: {}", summary.steps, e);
                    return Err(e);
                }
            }
            summary.steps += 1;

            if let Some(interval) = interval {
                let deadline = start.checked_add(schedule_offset(interval, summary.steps));
                let now = Instant::now();
                if let Some(deadline) = deadline.filter(|&d| d > now) {
                    spin_sleep::sleep(deadline - now);
                }
            }
        }

        debug!(
            "drive loop stopped: {} steps, {} frames, {} waiting",
            summary.steps, summary.frames, summary.waiting_steps
        );
        Ok(summary)
    }
}
