//! Bounded retry-with-interval
//!
//! Every wait in an export run goes through [`Poll`]: act, let the page settle for
//! a fixed interval, then check a condition, at most `max_attempts` times. There is
//! no unbounded blocking anywhere in a run.

use crate::dom::Document;
use std::time::Duration;

/// Result of a bounded poll
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    /// The condition produced a value on the given attempt (1-based)
    Ready { value: T, attempts: u32 },
    /// The attempt budget ran out
    Exhausted { attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Ready { attempts, .. } | PollOutcome::Exhausted { attempts } => *attempts,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            PollOutcome::Ready { value, .. } => Some(value),
            PollOutcome::Exhausted { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready { .. })
    }
}

/// Fixed interval, bounded attempt count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poll {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Poll {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self { interval, max_attempts }
    }

    /// Wait, then check, until `check` yields a value or the budget is spent
    pub fn until<D, T, C>(&self, doc: &D, check: C) -> PollOutcome<T>
    where
        D: Document + ?Sized,
        C: FnMut(u32) -> Option<T>,
    {
        self.drive(doc, |_| {}, check)
    }

    /// Act, wait, then check, until `check` yields a value or the budget is spent
    pub fn drive<D, T, A, C>(&self, doc: &D, mut act: A, mut check: C) -> PollOutcome<T>
    where
        D: Document + ?Sized,
        A: FnMut(u32),
        C: FnMut(u32) -> Option<T>,
    {
        for attempt in 1..=self.max_attempts {
            act(attempt);
            doc.wait(self.interval);
            if let Some(value) = check(attempt) {
                return PollOutcome::Ready { value, attempts: attempt };
            }
        }

        PollOutcome::Exhausted { attempts: self.max_attempts }
    }
}
