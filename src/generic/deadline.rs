/*!
A deadline timestamp.

Budgeted operations --- clausification, a solve, a model search --- carry a [Deadline] rather than a duration, so nested stages share one clock.
Expiry is always reported as a timeout, never folded into failure.
*/

use std::time::{Duration, Instant};

/// An optional point in time after which an operation should stop.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// A deadline which never passes.
    pub fn none() -> Self {
        Deadline { at: None }
    }

    /// A deadline `timeout` from now; a zero timeout means no deadline.
    pub fn after(timeout: Duration) -> Self {
        if timeout.is_zero() {
            Self::none()
        } else {
            Deadline {
                at: Some(Instant::now() + timeout),
            }
        }
    }

    /// Whether the deadline has passed.
    pub fn expired(&self) -> bool {
        match self.at {
            None => false,
            Some(instant) => Instant::now() >= instant,
        }
    }

    /// The time remaining, if the deadline is finite.
    pub fn remaining(&self) -> Option<Duration> {
        self.at
            .map(|instant| instant.saturating_duration_since(Instant::now()))
    }
}
