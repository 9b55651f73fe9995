//! Motion stage
//!
//! The stage owns everything controllers share: the anchor arena, the
//! rendering surface, the style sink and the timer queue. Controllers borrow
//! it for the duration of a call; deferred completion steps receive it again
//! when their timer fires.
//!
//! # Driving the clock
//!
//! ```ignore
//! // Deterministic stepping (tests, frame-locked hosts)
//! stage.advance(16);
//!
//! // Wall clock, e.g. once per event-loop iteration
//! stage.pump();
//! ```

use std::time::{Duration, Instant};

use unison_core::{
    unique_token, Anchor, AnchorId, AnchorSet, CssRule, RuleHandle, StyleSink, Surface,
};

use crate::timer::{TimerId, TimerQueue};

/// Deferred step run against the stage when its timer expires
pub type Task<S, K> = Box<dyn FnOnce(&mut Stage<S, K>)>;

/// Prefix of the stage-wide class that hides an element
pub const VISIBILITY_CLASS_PREFIX: &str = "__unison_visibility_";

/// Shared context of all controllers driving one surface
pub struct Stage<S: Surface + 'static, K: StyleSink + 'static> {
    anchors: AnchorSet<S::Target>,
    surface: S,
    sink: K,
    timers: TimerQueue<Task<S, K>>,
    visibility_class: String,
    visibility_rule: Option<RuleHandle>,
    last_pump: Option<Instant>,
}

impl<S: Surface + 'static, K: StyleSink + 'static> Stage<S, K> {
    pub fn new(surface: S, sink: K) -> Self {
        Self {
            anchors: AnchorSet::new(),
            surface,
            sink,
            timers: TimerQueue::new(),
            visibility_class: unique_token(VISIBILITY_CLASS_PREFIX),
            visibility_rule: None,
            last_pump: None,
        }
    }

    /// Register an anchor; named anchors become reachable by name
    pub fn add_anchor(&mut self, anchor: Anchor<S::Target>) -> AnchorId {
        self.anchors.insert(anchor)
    }

    pub fn anchors(&self) -> &AnchorSet<S::Target> {
        &self.anchors
    }

    pub fn anchors_mut(&mut self) -> &mut AnchorSet<S::Target> {
        &mut self.anchors
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    /// Class that hides an element while keeping its layout box
    pub fn visibility_class(&self) -> &str {
        &self.visibility_class
    }

    /// Publish the visibility rule on first use
    pub fn ensure_visibility_rule(&mut self) {
        if self.visibility_rule.is_some() {
            return;
        }
        let rule = CssRule::class(&self.visibility_class).add_important("visibility", "hidden");
        self.visibility_rule = Some(self.sink.publish(&rule.to_string()));
        tracing::debug!("Stage: published visibility rule '{}'", self.visibility_class);
    }

    pub fn hide(&mut self, target: &S::Target) {
        self.surface.set_class(target, &self.visibility_class, true);
    }

    pub fn show(&mut self, target: &S::Target) {
        self.surface.set_class(target, &self.visibility_class, false);
    }

    pub fn set_class(&mut self, target: &S::Target, class: &str, present: bool) {
        self.surface.set_class(target, class, present);
    }

    /// Run `task` against the stage after `delay_ms`
    pub fn schedule(&mut self, delay_ms: u64, task: Task<S, K>) -> TimerId {
        self.timers.schedule(delay_ms, task)
    }

    /// Cancel a pending task; returns whether it was still pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.cancel(id).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.is_pending(id)
    }

    /// Number of tasks waiting for their timer
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Stage clock in milliseconds
    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    /// Advance the clock by `ms`, running every task that expires
    ///
    /// Returns the number of tasks run.
    pub fn advance(&mut self, ms: u64) -> usize {
        let until = self.timers.now().saturating_add(ms);
        let mut fired = 0;
        while let Some((id, task)) = self.timers.pop_due(until) {
            tracing::trace!("Stage: timer {:?} fired at {}ms", id, self.timers.now());
            task(self);
            fired += 1;
        }
        self.timers.advance_to(until);
        fired
    }

    /// Run tasks until no timer is pending
    pub fn run_until_idle(&mut self) -> usize {
        let mut fired = 0;
        while let Some(deadline) = self.timers.next_deadline() {
            let now = self.timers.now();
            fired += self.advance(deadline.saturating_sub(now));
        }
        fired
    }

    /// Advance by the wall-clock time elapsed since the previous pump
    ///
    /// The first call only starts the clock.
    pub fn pump(&mut self) -> usize {
        self.pump_at(Instant::now())
    }

    /// Like [`pump`](Self::pump) with a host-supplied frame timestamp
    ///
    /// Only whole milliseconds are consumed; the remainder carries over to
    /// the next call.
    pub fn pump_at(&mut self, now: Instant) -> usize {
        let Some(last) = self.last_pump else {
            self.last_pump = Some(now);
            return 0;
        };
        let ms = now.saturating_duration_since(last).as_millis() as u64;
        if ms == 0 {
            return 0;
        }
        self.last_pump = Some(last + Duration::from_millis(ms));
        self.advance(ms)
    }
}
