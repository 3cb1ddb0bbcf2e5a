use std::time::Duration;

/// How the driver advances its owned value on each tick.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Advance {
    /// `value = (value + delta) mod period` — angles, bezier t.
    Wrap { delta: f64, period: f64 },
    /// `value = min(value + delta, max)` — one-shot build-ups.
    Saturate { delta: f64, max: f64 },
    /// Saturate at `max`, then restart from `restart` on the next tick.
    Cycle { delta: f64, max: f64, restart: f64 },
}

impl Advance {
    fn step(self, value: f64) -> f64 {
        match self {
            Self::Wrap { delta, period } => {
                if period <= 0.0 {
                    return value;
                }
                (value + delta).rem_euclid(period)
            }
            Self::Saturate { delta, max } => (value + delta).min(max),
            Self::Cycle { delta, max, restart } => {
                if value >= max {
                    restart
                } else {
                    (value + delta).min(max)
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
}

/// Per-instance animation driver: a two-state machine advancing one owned
/// scalar on a fixed cadence.
///
/// The value is reset to its initial on every Idle→Running transition, and
/// `tick()` is a no-op while Idle, so nothing can advance after teardown.
#[derive(Clone, Debug)]
pub struct AnimationDriver {
    state: DriverState,
    value: f64,
    initial: f64,
    advance: Advance,
    interval: Duration,
    ticks: u64,
}

/// Default animation cadence: 20 steps per second.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

impl AnimationDriver {
    pub fn new(initial: f64, advance: Advance, interval: Duration) -> Self {
        Self {
            state: DriverState::Idle,
            value: initial,
            initial,
            advance,
            interval,
            ticks: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Total ticks that actually advanced the value (diagnostic).
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Reconcile with the animate flag. Turning an already-running driver on
    /// is a no-op; turning it on from idle resets the value first.
    pub fn set_animating(&mut self, animate: bool) {
        match (self.state, animate) {
            (DriverState::Idle, true) => {
                self.value = self.initial;
                self.state = DriverState::Running;
                tracing::debug!(initial = self.initial, "animation started");
            }
            (DriverState::Running, false) => {
                self.state = DriverState::Idle;
                tracing::debug!(value = self.value, ticks = self.ticks, "animation stopped");
            }
            _ => {}
        }
    }

    /// Deterministic teardown: after this, ticks never advance the value.
    pub fn stop(&mut self) {
        self.set_animating(false);
    }

    /// Advance one cadence step. Returns the new value when Running, `None`
    /// when Idle (no repaint needed).
    pub fn tick(&mut self) -> Option<f64> {
        if self.state != DriverState::Running {
            return None;
        }
        self.value = self.advance.step(self.value);
        self.ticks += 1;
        Some(self.value)
    }
}
