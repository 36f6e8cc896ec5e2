//! Frame scheduling
//!
//! A [`FrameDriver`] hands out one-shot callbacks that run on the next display
//! frame with a millisecond timestamp. Callbacks requested while a frame is
//! running are deferred to the following frame.
//!
//! Two drivers are provided:
//!
//! - [`ManualFrameDriver`]: the host owns the clock and pumps frames
//!   explicitly. Deterministic, used by tests and embedders with their own
//!   render loop.
//! - [`TimerFrameDriver`]: a fixed-cadence fallback that sleeps until the next
//!   16ms tick and fires pending callbacks with the tick's timestamp.

use std::cell::{Cell, RefCell};
use std::thread;
use std::time::{Duration, Instant};

use slotmap::{new_key_type, SlotMap};
use tracing::trace;

new_key_type! {
    /// Handle for a pending frame callback
    pub struct FrameId;
}

/// One-shot callback receiving the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Source of display frames and a monotonic millisecond clock
pub trait FrameDriver {
    /// Current time in milliseconds on the driver's clock
    fn now(&self) -> f64;

    /// Run `callback` on the next frame
    fn request_frame(&self, callback: FrameCallback) -> FrameId;

    /// Drop a pending callback; returns false if it already ran
    fn cancel_frame(&self, id: FrameId) -> bool;
}

/// Pending callbacks in request order
#[derive(Default)]
struct FrameQueue {
    callbacks: RefCell<SlotMap<FrameId, FrameCallback>>,
    order: RefCell<Vec<FrameId>>,
}

impl FrameQueue {
    fn push(&self, callback: FrameCallback) -> FrameId {
        let id = self.callbacks.borrow_mut().insert(callback);
        self.order.borrow_mut().push(id);
        id
    }

    fn cancel(&self, id: FrameId) -> bool {
        let removed = self.callbacks.borrow_mut().remove(id).is_some();
        if removed {
            self.order.borrow_mut().retain(|pending| *pending != id);
        }
        removed
    }

    fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    /// Run every callback queued before this call
    fn run(&self, timestamp: f64) -> usize {
        let batch = std::mem::take(&mut *self.order.borrow_mut());
        let mut ran = 0;
        for id in batch {
            // A callback may have cancelled a later one in this batch
            let callback = self.callbacks.borrow_mut().remove(id);
            if let Some(callback) = callback {
                callback(timestamp);
                ran += 1;
            }
        }
        trace!(timestamp, ran, "frame");
        ran
    }
}

/// Frame driver pumped by the host
///
/// # Example
///
/// ```rust
/// use ellibre_animation::{FrameDriver, ManualFrameDriver};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let driver = ManualFrameDriver::new();
/// let seen = Rc::new(Cell::new(0.0));
/// let sink = seen.clone();
/// driver.request_frame(Box::new(move |ts| sink.set(ts)));
///
/// driver.run_frame(16.0);
/// assert_eq!(seen.get(), 16.0);
/// ```
#[derive(Default)]
pub struct ManualFrameDriver {
    clock: Cell<f64>,
    queue: FrameQueue,
}

impl ManualFrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock without running a frame
    pub fn set_time(&self, ms: f64) {
        self.clock.set(ms);
    }

    /// Run a frame stamped `timestamp`. The clock never moves backwards, but
    /// the timestamp is passed through as given.
    pub fn run_frame(&self, timestamp: f64) -> usize {
        if timestamp > self.clock.get() {
            self.clock.set(timestamp);
        }
        self.queue.run(timestamp)
    }

    /// Advance the clock by `dt` milliseconds and run a frame
    pub fn advance(&self, dt: f64) -> usize {
        self.run_frame(self.clock.get() + dt)
    }

    /// Number of callbacks waiting for the next frame
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl FrameDriver for ManualFrameDriver {
    fn now(&self) -> f64 {
        self.clock.get()
    }

    fn request_frame(&self, callback: FrameCallback) -> FrameId {
        self.queue.push(callback)
    }

    fn cancel_frame(&self, id: FrameId) -> bool {
        self.queue.cancel(id)
    }
}

/// Default frame cadence of the timer fallback
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Fixed-cadence frame driver for hosts without a display clock
///
/// Each frame is due `interval` after the previous one; a frame that is
/// already late fires immediately. [`TimerFrameDriver::run_frame`] blocks the
/// calling thread until the frame is due.
pub struct TimerFrameDriver {
    origin: Instant,
    interval_ms: f64,
    last_frame: Cell<f64>,
    queue: FrameQueue,
}

impl TimerFrameDriver {
    pub fn new() -> Self {
        Self::with_interval(FRAME_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            origin: Instant::now(),
            interval_ms: interval.as_secs_f64() * 1000.0,
            last_frame: Cell::new(0.0),
            queue: FrameQueue::default(),
        }
    }

    /// Wait for the next tick and run it; returns false when nothing is pending
    pub fn run_frame(&self) -> bool {
        if self.queue.len() == 0 {
            return false;
        }
        let current = self.now();
        let time_to_call = (self.interval_ms - (current - self.last_frame.get())).max(0.0);
        if time_to_call > 0.0 {
            thread::sleep(Duration::from_secs_f64(time_to_call / 1000.0));
        }
        let timestamp = current + time_to_call;
        self.last_frame.set(timestamp);
        self.queue.run(timestamp);
        true
    }

    /// Pump frames until no callbacks remain; returns the number of frames run
    pub fn run_until_idle(&self) -> usize {
        let mut frames = 0;
        while self.run_frame() {
            frames += 1;
        }
        frames
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Default for TimerFrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDriver for TimerFrameDriver {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn request_frame(&self, callback: FrameCallback) -> FrameId {
        self.queue.push(callback)
    }

    fn cancel_frame(&self, id: FrameId) -> bool {
        self.queue.cancel(id)
    }
}
