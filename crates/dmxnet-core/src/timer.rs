//! Busy-wait periodic timer for driving output framerates.
//!
//! The timer owns one dedicated OS thread that spins on a monotonic clock
//! until the next deadline, then invokes the callback. Spinning keeps wake-up
//! jitter well under a millisecond, at the cost of pinning one CPU core for
//! as long as the timer runs. Deadlines are fixed multiples of the interval
//! from the start instant, so slow callbacks never accumulate drift; ticks
//! that would fire later than the skip threshold are dropped instead.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use dmxnet_core::timer::PrecisionTimer;
//!
//! let timer = PrecisionTimer::from_framerate(44.0)?;
//! timer.start(|tick| {
//!     println!("tick {} late by {:?}", tick.count, tick.late_by);
//! })?;
//! std::thread::sleep(Duration::from_secs(1));
//! timer.stop()?;
//! # Ok::<(), dmxnet_core::timer::TimerError>(())
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, trace, warn};

#[derive(Debug, Error)]
pub enum TimerError {
    #[error("timer interval cannot be zero")]
    ZeroInterval,
    #[error("invalid framerate: {framerate}")]
    InvalidFramerate { framerate: f64 },
    #[error("timer is already running")]
    AlreadyRunning,
    #[error("timer is not running")]
    NotRunning,
    #[error("failed to spawn timer thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Passed to the callback on every tick that fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    /// Index of this tick, starting at 1. Skipped ticks still count.
    pub count: u64,
    /// Time since the timer started.
    pub elapsed: Duration,
    /// How far past its deadline this tick fired.
    pub late_by: Duration,
    /// Wall time spent in the previous callback invocation.
    pub previous_callback: Duration,
}

pub struct PrecisionTimer {
    interval: Duration,
    skip_threshold: Option<Duration>,
    stop_flag: Arc<AtomicBool>,
    thread_handle: Mutex<Option<JoinHandle<()>>>,
}

impl PrecisionTimer {
    pub fn new(interval: Duration) -> Result<Self, TimerError> {
        if interval.is_zero() {
            return Err(TimerError::ZeroInterval);
        }
        Ok(Self {
            interval,
            skip_threshold: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            thread_handle: Mutex::new(None),
        })
    }

    pub fn from_framerate(framerate: f64) -> Result<Self, TimerError> {
        if !framerate.is_finite() || framerate <= 0.0 {
            return Err(TimerError::InvalidFramerate { framerate });
        }
        let interval = Duration::try_from_secs_f64(1.0 / framerate)
            .map_err(|_| TimerError::InvalidFramerate { framerate })?;
        Self::new(interval)
    }

    /// Ticks firing this late or later are skipped. `None` never skips.
    pub fn with_skip_threshold(mut self, threshold: Option<Duration>) -> Self {
        self.skip_threshold = threshold;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.thread_handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn start<F>(&self, mut callback: F) -> Result<(), TimerError>
    where
        F: FnMut(TimerTick) + Send + 'static,
    {
        let mut handle_slot = self.thread_handle.lock();
        if handle_slot.is_some() {
            return Err(TimerError::AlreadyRunning);
        }
        self.stop_flag.store(false, Ordering::SeqCst);

        let interval = self.interval;
        let skip_threshold = self.skip_threshold;
        let stop_flag = Arc::clone(&self.stop_flag);

        let handle = std::thread::Builder::new()
            .name("dmx-precision-timer".into())
            .spawn(move || {
                let start = Instant::now();
                let mut deadline = Duration::ZERO;
                let mut count: u64 = 0;
                let mut previous_callback = Duration::ZERO;

                'ticks: while !stop_flag.load(Ordering::Relaxed) {
                    count += 1;
                    deadline += interval;

                    let elapsed = loop {
                        if stop_flag.load(Ordering::Relaxed) {
                            break 'ticks;
                        }
                        let elapsed = start.elapsed();
                        if elapsed >= deadline {
                            break elapsed;
                        }
                        std::hint::spin_loop();
                    };

                    let late_by = elapsed - deadline;
                    if skip_threshold.is_some_and(|threshold| late_by >= threshold) {
                        trace!(tick = count, late_by = ?late_by, "skipping late tick");
                        continue;
                    }

                    let callback_start = Instant::now();
                    callback(TimerTick {
                        count,
                        elapsed,
                        late_by,
                        previous_callback,
                    });
                    previous_callback = callback_start.elapsed();
                }
                debug!(ticks = count, "precision timer stopped");
            })?;

        *handle_slot = Some(handle);
        Ok(())
    }

    /// Signals the timer thread and waits for it to finish.
    pub fn stop(&self) -> Result<(), TimerError> {
        let handle = self.thread_handle.lock().take();
        let Some(handle) = handle else {
            return Err(TimerError::NotRunning);
        };
        self.stop_flag.store(true, Ordering::SeqCst);
        join_timer_thread(handle);
        Ok(())
    }
}

fn join_timer_thread(handle: JoinHandle<()>) {
    if let Err(panic) = handle.join() {
        let message = panic
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("non-string panic payload");
        warn!(panic = message, "precision timer thread panicked");
    }
}

impl Drop for PrecisionTimer {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.lock().take() {
            join_timer_thread(handle);
        }
    }
}
