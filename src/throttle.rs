//! Leading/trailing call throttling.
//!
//! [`Throttle`] bounds how often a callback runs: the first request in a
//! quiet period runs immediately (leading edge), and if more requests
//! arrive before the interval elapses, exactly one further run happens at
//! the end of the interval (trailing edge). Any number of requests inside
//! one interval collapse into at most two executions.
//!
//! The trailing edge is fired by a single timer thread per throttle,
//! parked on a condition variable until the next deadline.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Scheduling state. `PendingLeading` covers the span where the callback
/// is executing outside the lock; a request arriving then counts as a
/// trailing request for the cooldown that follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    PendingLeading,
    Cooldown,
    CooldownWithTrailingPending,
}

struct Inner {
    state: State,
    deadline: Option<Instant>,
    shutdown: bool,
}

struct Shared {
    interval: Duration,
    inner: Mutex<Inner>,
    condvar: Condvar,
    callback: Callback,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            // Recover from poisoned mutex - the data is still accessible
            poisoned.into_inner()
        })
    }

    /// Run the callback as a leading edge and enter cooldown afterwards.
    /// Expects `inner.state` to already be `PendingLeading`.
    fn run_and_cool_down(&self) {
        (self.callback)();

        let mut inner = self.lock();
        if inner.shutdown {
            return;
        }
        // a request that arrived while the callback ran becomes the
        // trailing edge of the cooldown we are entering
        inner.state = match inner.state {
            State::PendingLeading => State::Cooldown,
            _ => State::CooldownWithTrailingPending,
        };
        inner.deadline = Some(Instant::now() + self.interval);
        drop(inner);
        self.condvar.notify_one();
    }

    fn request(&self) {
        let mut inner = self.lock();
        if inner.shutdown {
            return;
        }
        match inner.state {
            State::Idle => {
                inner.state = State::PendingLeading;
                drop(inner);
                self.run_and_cool_down();
            }
            State::PendingLeading | State::Cooldown => {
                inner.state = State::CooldownWithTrailingPending;
            }
            State::CooldownWithTrailingPending => {}
        }
    }

    fn timer_loop(&self) {
        loop {
            let mut inner = self.lock();
            if inner.shutdown {
                break;
            }

            let Some(deadline) = inner.deadline else {
                drop(
                    self.condvar
                        .wait(inner)
                        .unwrap_or_else(|poisoned| poisoned.into_inner()),
                );
                continue;
            };

            let now = Instant::now();
            if now < deadline {
                drop(
                    self.condvar
                        .wait_timeout(inner, deadline - now)
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .0,
                );
                continue;
            }

            inner.deadline = None;
            match inner.state {
                State::CooldownWithTrailingPending => {
                    inner.state = State::PendingLeading;
                    drop(inner);
                    // trailing run; restarts the cooldown
                    self.run_and_cool_down();
                }
                State::Cooldown => {
                    inner.state = State::Idle;
                }
                State::Idle | State::PendingLeading => {}
            }
        }
    }
}

/// Lightweight trigger for a [`Throttle`], cheap to clone into listeners.
#[derive(Clone)]
pub struct ThrottleHandle {
    shared: Arc<Shared>,
}

impl ThrottleHandle {
    /// Request an execution; coalesced per the leading/trailing discipline.
    pub fn call(&self) {
        self.shared.request();
    }
}

impl std::fmt::Debug for ThrottleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThrottleHandle").finish()
    }
}

/// A leading/trailing throttled callback.
///
/// Dropping the throttle cancels any pending trailing run and stops the
/// timer thread.
pub struct Throttle {
    shared: Arc<Shared>,
    timer: Option<thread::JoinHandle<()>>,
}

impl Throttle {
    /// Create a throttle that runs `callback` at most twice per `interval`.
    pub fn new(interval: Duration, callback: impl Fn() + Send + Sync + 'static) -> Self {
        let shared = Arc::new(Shared {
            interval,
            inner: Mutex::new(Inner {
                state: State::Idle,
                deadline: None,
                shutdown: false,
            }),
            condvar: Condvar::new(),
            callback: Arc::new(callback),
        });

        let timer = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("sill-throttle".into())
                .spawn(move || shared.timer_loop())
                .ok()
        };

        Self { shared, timer }
    }

    /// Request an execution; coalesced per the leading/trailing discipline.
    pub fn call(&self) {
        self.shared.request();
    }

    /// A cloneable trigger sharing this throttle's state.
    pub fn handle(&self) -> ThrottleHandle {
        ThrottleHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Drop any pending trailing run and return to the idle state. Further
    /// calls start a fresh leading edge.
    pub fn cancel(&self) {
        let mut inner = self.shared.lock();
        inner.state = State::Idle;
        inner.deadline = None;
    }
}

impl Drop for Throttle {
    fn drop(&mut self) {
        {
            let mut inner = self.shared.lock();
            inner.shutdown = true;
        }
        self.shared.condvar.notify_one();
        if let Some(timer) = self.timer.take() {
            let _ = timer.join();
        }
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("interval", &self.shared.interval)
            .finish()
    }
}
