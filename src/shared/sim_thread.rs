//! Simulation thread that runs independently from the UI.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::GrowthError;
use crate::scheduler::{Scheduler, SchedulerState};

use super::commands::SimCommand;
use super::snapshot::GrowthSnapshot;

/// Poll interval while nothing is scheduled (~60fps)
const IDLE_POLL: Duration = Duration::from_millis(16);

/// Latest-value mailbox; a new snapshot replaces an unread one
#[derive(Default)]
struct SnapshotSlot {
    latest: Mutex<Option<GrowthSnapshot>>,
    published: Condvar,
}

impl SnapshotSlot {
    fn lock(&self) -> MutexGuard<'_, Option<GrowthSnapshot>> {
        // A poisoned slot still holds a complete snapshot
        self.latest.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, snapshot: GrowthSnapshot) {
        *self.lock() = Some(snapshot);
        self.published.notify_all();
    }

    fn take(&self) -> Option<GrowthSnapshot> {
        self.lock().take()
    }
}

/// Handle for controlling the simulation thread
pub struct SimulationHandle {
    /// Thread handle
    thread: Option<JoinHandle<()>>,
    /// Channel to send commands to simulation
    command_tx: Sender<SimCommand>,
    /// Most recent unread snapshot
    snapshots: Arc<SnapshotSlot>,
}

impl SimulationHandle {
    /// Spawn a new simulation thread
    pub fn spawn(config: Config) -> Result<Self, GrowthError> {
        let scheduler = Scheduler::new(config)?;
        Ok(Self::spawn_with(scheduler))
    }

    /// Spawn a simulation thread around an existing scheduler
    pub fn spawn_with(scheduler: Scheduler) -> Self {
        let (command_tx, command_rx) = mpsc::channel();
        let snapshots = Arc::new(SnapshotSlot::default());

        let slot = Arc::clone(&snapshots);
        let thread = thread::spawn(move || {
            run_simulation(scheduler, command_rx, &slot);
        });

        Self {
            thread: Some(thread),
            command_tx,
            snapshots,
        }
    }

    /// Send a command to the simulation
    pub fn send(&self, command: SimCommand) {
        let _ = self.command_tx.send(command);
    }

    /// Take the latest snapshot if one was published since the last call
    /// (non-blocking)
    pub fn latest_snapshot(&self) -> Option<GrowthSnapshot> {
        self.snapshots.take()
    }

    /// Block until a snapshot satisfies `pred` or the timeout elapses
    pub fn wait_for(
        &self,
        timeout: Duration,
        mut pred: impl FnMut(&GrowthSnapshot) -> bool,
    ) -> Option<GrowthSnapshot> {
        let deadline = Instant::now() + timeout;
        let mut latest = self.snapshots.lock();
        loop {
            if let Some(snapshot) = latest.take() {
                if pred(&snapshot) {
                    return Some(snapshot);
                }
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            latest = match self.snapshots.published.wait_timeout(latest, remaining) {
                Ok((guard, _)) => guard,
                Err(e) => e.into_inner().0,
            };
        }
    }

    /// Shutdown the simulation thread
    pub fn shutdown(&mut self) {
        self.send(SimCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Apply one command; returns false on shutdown
fn handle_command(scheduler: &mut Scheduler, command: SimCommand) -> bool {
    let result = match command {
        SimCommand::Seed(image) => {
            log::info!("Seed: {}x{} image", image.width(), image.height());
            scheduler.seed(image)
        }
        SimCommand::SetSampleRate(rate) => {
            log::info!("SetSampleRate: {}", rate);
            scheduler.set_sample_rate(rate)
        }
        SimCommand::SetQuality(mode) => {
            log::info!("SetQuality: {:?}", mode);
            scheduler.set_quality(mode)
        }
        SimCommand::Reset => scheduler.reset(),
        SimCommand::Inject(seeds) => scheduler.inject(&seeds).map(|n| {
            log::debug!("Injected {} of {} cells", n, seeds.len());
        }),
        SimCommand::Step => scheduler.tick_now().map(|_| ()),
        SimCommand::Stop => {
            scheduler.request_stop();
            Ok(())
        }
        SimCommand::Shutdown => return false,
    };

    if let Err(e) = result {
        log::error!("Command failed: {}", e);
    }
    true
}

/// Main simulation loop running in separate thread
fn run_simulation(
    mut scheduler: Scheduler,
    command_rx: Receiver<SimCommand>,
    snapshots: &SnapshotSlot,
) {
    let snapshot_interval = scheduler.config().scheduler.snapshot_interval.max(1) as u64;
    let mut last_published: Option<(SchedulerState, u64)> = None;

    // Publish initial snapshot
    snapshots.publish(GrowthSnapshot::from_scheduler(&scheduler));

    loop {
        // Commands are only applied between ticks
        let mut commanded = false;
        loop {
            match command_rx.try_recv() {
                Ok(command) => {
                    commanded = true;
                    if !handle_command(&mut scheduler, command) {
                        log::info!("Simulation thread shutting down");
                        return;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return,
            }
        }

        let now = Instant::now();
        if let Err(e) = scheduler.poll(now) {
            log::error!("Tick failed: {}", e);
        }

        // Publish after commands, on state change, or every N ticks
        let marker = (scheduler.state(), scheduler.tick_count());
        let changed = match last_published {
            _ if commanded => true,
            None => true,
            Some((state, tick)) => {
                state != marker.0
                    || marker.1 < tick
                    || marker.1 >= tick + snapshot_interval
            }
        };
        if changed {
            snapshots.publish(GrowthSnapshot::from_scheduler(&scheduler));
            last_published = Some(marker);
        }

        let wait = scheduler
            .time_until_due(Instant::now())
            .map_or(IDLE_POLL, |d| d.min(IDLE_POLL));
        if wait.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(wait);
        }
    }
}
