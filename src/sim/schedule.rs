//! Scheduled task handles driven by the session clock
//!
//! The return-to-start timer and the marquee scroller are owned by the game
//! session and advanced from the tick loop. Both are cancelled and re-armed on
//! every phase transition so a stale task can never act on a later phase.
//! Cancelling an idle handle is a no-op.

use serde::{Deserialize, Serialize};

use crate::consts::{MARQUEE_RESET, MARQUEE_SPEED};

/// One-shot timer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deferred {
    due_ms: Option<u64>,
}

impl Deferred {
    /// Arm (or re-arm) to fire `delay_ms` after `now_ms`
    pub fn arm(&mut self, now_ms: u64, delay_ms: u64) {
        self.due_ms = Some(now_ms.saturating_add(delay_ms));
    }

    pub fn cancel(&mut self) {
        self.due_ms = None;
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.due_ms.is_some()
    }

    /// Returns `true` exactly once, on the first poll at or after the due time
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.due_ms {
            Some(due) if now_ms >= due => {
                self.due_ms = None;
                true
            }
            _ => false,
        }
    }
}

/// Horizontal scroll offset for the idle-screen status line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Marquee {
    active: bool,
    offset: f32,
}

impl Marquee {
    /// Start scrolling from the right edge
    pub fn start(&mut self) {
        self.active = true;
        self.offset = 0.0;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn advance(&mut self) {
        if !self.active {
            return;
        }
        self.offset += MARQUEE_SPEED;
        if self.offset >= MARQUEE_RESET {
            self.offset = 0.0;
        }
    }
}
