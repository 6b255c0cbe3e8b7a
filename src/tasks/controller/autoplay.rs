//! Auto-play cadence.
//!
//! Ticks are a single deadline field advanced from the scheduled time, so
//! the cadence never drifts with wakeup latency. A pause is a wall-clock
//! suppression window: ticks that land inside it are consumed silently while
//! the cadence keeps running underneath.

use std::time::{Duration, Instant};

use crate::config::AutoPlayOptions;
use crate::events::Direction;

#[derive(Debug)]
pub struct AutoPlay {
    active: bool,
    speed: f32,
    direction: Direction,
    paused_until: Option<Instant>,
    next_tick: Option<Instant>,
    opts: AutoPlayOptions,
}

impl AutoPlay {
    pub fn new(opts: AutoPlayOptions) -> Self {
        Self {
            active: false,
            speed: 1.0,
            direction: Direction::Forward,
            paused_until: None,
            next_tick: None,
            opts,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Interval between ticks at the current speed.
    pub fn interval(&self) -> Duration {
        self.opts.base_interval.div_f64(f64::from(self.speed))
    }

    /// The pending tick, if playback is active.
    pub fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Starts or stops playback and returns the new active state. Starting
    /// schedules the first tick one interval out; stopping drops the pending
    /// tick. An open pause window is wall-clock state and survives.
    pub fn toggle(&mut self, now: Instant) -> bool {
        self.active = !self.active;
        self.next_tick = self.active.then(|| now + self.interval());
        self.active
    }

    /// Suppresses the ticks whose scheduled time falls before `now + window`.
    /// The cadence itself keeps running. A newer pause overwrites an older
    /// one.
    pub fn pause(&mut self, window: Duration, now: Instant) {
        self.paused_until = Some(now + window);
    }

    /// Applies a new speed multiplier; the range is the caller's to enforce.
    /// While active the cadence restarts from `now`, so no tick at the old
    /// interval can still fire.
    pub fn set_speed(&mut self, multiplier: f32, now: Instant) {
        self.speed = multiplier;
        if self.active {
            self.next_tick = Some(now + self.interval());
        }
    }

    /// Flips the travel direction and returns the new one. The pending tick
    /// stays where it is; it simply navigates the other way.
    pub fn toggle_direction(&mut self) -> Direction {
        self.direction = self.direction.flipped();
        self.direction
    }

    /// Consumes a due tick. The cadence advances from the scheduled time,
    /// not from `now`. Returns the direction to navigate, or `None` when the
    /// tick's scheduled time lands inside the pause window.
    pub fn on_tick(&mut self, now: Instant) -> Option<Direction> {
        let due = self.next_tick?;
        if now < due {
            return None;
        }
        self.next_tick = Some(due + self.interval());
        match self.paused_until {
            Some(until) if due < until => None,
            _ => {
                self.paused_until = None;
                Some(self.direction)
            }
        }
    }
}
