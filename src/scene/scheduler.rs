//! Frame coalescing and the one-shot delayed revalidation.

use serde::{Deserialize, Serialize};

/// Scheduler settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Delay after mount before the one-time geometry revalidation.
    #[serde(default = "default_revalidate_after_ms")]
    pub revalidate_after_ms: f64,
}

fn default_revalidate_after_ms() -> f64 {
    1200.0
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            revalidate_after_ms: default_revalidate_after_ms(),
        }
    }
}

/// A granted frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    /// Sequence number of the frame, starting at 0.
    pub index: u64,
    /// Whether the delayed revalidation falls due in this frame.
    pub revalidate: bool,
}

/// "Schedule on next frame, coalesce repeated requests".
///
/// At most one frame is pending at a time; requests arriving while one is pending
/// are absorbed. After [`FrameScheduler::cancel`] every call is inert.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    config: SchedulerConfig,
    alive: bool,
    pending: bool,
    revalidate_at_ms: Option<f64>,
    frames: u64,
    requests: u64,
    coalesced: u64,
}

impl FrameScheduler {
    /// Live scheduler with nothing pending.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            alive: true,
            pending: false,
            revalidate_at_ms: None,
            frames: 0,
            requests: 0,
            coalesced: 0,
        }
    }

    /// Arm the one-time revalidation relative to `now_ms`.
    pub fn arm_revalidation(&mut self, now_ms: f64) {
        if self.alive {
            self.revalidate_at_ms = Some(now_ms + self.config.revalidate_after_ms);
        }
    }

    /// Ask for a frame. Returns `true` when this call scheduled a new frame and
    /// `false` when it was absorbed into a pending one (or the scheduler is dead).
    pub fn request(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.requests += 1;
        if self.pending {
            self.coalesced += 1;
            return false;
        }
        self.pending = true;
        true
    }

    /// Whether a frame is waiting.
    pub fn is_pending(&self) -> bool {
        self.alive && self.pending
    }

    /// When the host should wake us without input, if ever.
    pub fn next_deadline_ms(&self) -> Option<f64> {
        self.revalidate_at_ms.filter(|_| self.alive)
    }

    /// Consume the pending frame (or a due revalidation).
    pub fn begin_frame(&mut self, now_ms: f64) -> Option<FrameTicket> {
        if !self.alive {
            return None;
        }
        let revalidate = self.revalidate_at_ms.is_some_and(|at| now_ms >= at);
        if !self.pending && !revalidate {
            return None;
        }
        if revalidate {
            self.revalidate_at_ms = None;
        }
        self.pending = false;
        let ticket = FrameTicket {
            index: self.frames,
            revalidate,
        };
        self.frames += 1;
        Some(ticket)
    }

    /// Teardown: drop pending work and refuse everything afterwards.
    pub fn cancel(&mut self) {
        self.alive = false;
        self.pending = false;
        self.revalidate_at_ms = None;
    }

    /// Whether [`FrameScheduler::cancel`] has not been called.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Frames granted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Requests received so far, and how many of them were absorbed.
    pub fn request_counts(&self) -> (u64, u64) {
        (self.requests, self.coalesced)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/scheduler.rs"]
mod tests;
