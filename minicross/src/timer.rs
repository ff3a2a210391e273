use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Counts elapsed ticks on a background thread until stopped.
///
/// The thread waits on a channel with a timeout; every timeout is one tick, and
/// dropping the sender wakes it up for good. Stopping is idempotent, and dropping a
/// `Timer` stops it, so the thread never outlives its owner.
#[derive(Debug)]
pub struct Timer {
  interval: Duration,
  ticks: Arc<AtomicU64>,
  stop_tx: Option<Sender<()>>,
  handle: Option<JoinHandle<()>>,
}

impl Timer {
  /// Starts counting from zero, one tick per `interval`.
  pub fn start(interval: Duration) -> Self {
    let mut timer = Self::stopped(interval);
    timer.restart();
    timer
  }

  /// A timer at zero that isn't running.
  pub fn stopped(interval: Duration) -> Self {
    Self {
      interval,
      ticks: Arc::new(AtomicU64::new(0)),
      stop_tx: None,
      handle: None,
    }
  }

  /// Stops any running count, resets to zero and starts again.
  pub fn restart(&mut self) {
    self.stop();
    // A fresh counter, so a late increment from the old thread can't leak in.
    self.ticks = Arc::new(AtomicU64::new(0));

    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let ticks = Arc::clone(&self.ticks);
    let interval = self.interval;
    let handle = thread::spawn(move || {
      loop {
        match stop_rx.recv_timeout(interval) {
          Err(RecvTimeoutError::Timeout) => {
            ticks.fetch_add(1, Ordering::Relaxed);
          }
          Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
      }
    });

    self.stop_tx = Some(stop_tx);
    self.handle = Some(handle);
  }

  /// Stops counting. The elapsed value is kept. Safe to call any number of times.
  pub fn stop(&mut self) {
    drop(self.stop_tx.take());
    if let Some(handle) = self.handle.take() {
      let _ = handle.join();
    }
  }

  pub fn is_running(&self) -> bool {
    self.handle.is_some()
  }

  /// Ticks counted since the last (re)start.
  pub fn elapsed(&self) -> u64 {
    self.ticks.load(Ordering::Relaxed)
  }
}

impl Drop for Timer {
  fn drop(&mut self) {
    self.stop();
  }
}
