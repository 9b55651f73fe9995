//! Duration-based motion
//!
//! A [`DiscreteMotion`] runs a whole transition per call. `forward` morphs the
//! begin element into the end element; `backward` morphs back. The morph is
//! expressed as a pair of `@keyframes` blocks per connector, so the surface
//! animates it on its own clock. A completion step is scheduled on the
//! [`Stage`] timer queue for every connector and finalizes visibility,
//! status and hooks once the duration has elapsed.
//!
//! # Re-entrancy
//!
//! A controller runs at most one transition at a time. Calling `forward` or
//! `backward` again before the last completion step has run fails with
//! [`MotionError::TransitionInFlight`]. [`DiscreteMotion::cancel`] abandons
//! a running transition and puts every connector back where it started. A
//! transition whose completion timers were cancelled directly on the stage is
//! rolled back the same way on the next call.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use smallvec::SmallVec;
use unison_core::{
    animation_value, random_code, AnchorRef, AnchorSet, AnchorStatus, CssRule, Direction,
    HookPhase, Keyframes, MotionError, Result, RuleHandle, StyleSink, Surface,
};

use crate::base::{Connector, Motion, MotionBase, TargetPair};
use crate::config::{DiscreteOptions, DurationSpec, FadeDetail, FadeSpec};
use crate::interpolate::Endpoints;
use crate::stage::{Stage, Task};
use crate::timer::TimerId;

/// Timing function of the crossfade
const FADE_TIMING: &str = "ease";

/// Payload of a completion callback
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionEvent<T> {
    pub direction: Direction,
    /// Resolved targets by anchor name, in connector order
    ///
    /// Unnamed anchors are not listed.
    pub targets: IndexMap<String, T>,
}

impl<T> CompletionEvent<T> {
    pub fn get(&self, name: &str) -> Option<&T> {
        self.targets.get(name)
    }
}

type CompletionFn<T> = Box<dyn FnOnce(&CompletionEvent<T>)>;

/// Timers of a started transition, one per connector
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionHandle {
    direction: Direction,
    timers: SmallVec<[TimerId; 4]>,
}

impl TransitionHandle {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Completion timers, in connector order
    pub fn timers(&self) -> &[TimerId] {
        &self.timers
    }
}

/// Applied state of one connector's running transition
struct Step<T> {
    timer: TimerId,
    connector: Connector,
    from: T,
    to: T,
    from_class: String,
    to_class: String,
    rule: RuleHandle,
    done: Rc<Cell<bool>>,
}

impl<T> Step<T> {
    /// Undo the step and restore the status required to start `direction`
    fn roll_back<S, K>(self, stage: &mut Stage<S, K>, direction: Direction)
    where
        S: Surface<Target = T> + 'static,
        K: StyleSink + 'static,
    {
        stage.set_class(&self.from, &self.from_class, false);
        stage.set_class(&self.to, &self.to_class, false);
        stage.show(&self.from);
        stage.hide(&self.to);
        stage.sink_mut().retract(self.rule);
        self.connector
            .set_status(stage.anchors_mut(), direction.required_status());
    }
}

/// Controller running fixed-duration transitions
pub struct DiscreteMotion<T> {
    base: MotionBase<T>,
    durations: DurationSpec,
    timing: Option<String>,
    fade: Option<FadeSpec>,
    in_flight: Rc<Cell<bool>>,
    running: Option<(Direction, Vec<Step<T>>)>,
}

impl<T: Clone + fmt::Debug + 'static> DiscreteMotion<T> {
    pub fn new(options: DiscreteOptions) -> Self {
        Self {
            base: MotionBase::new(options.motion),
            durations: options.duration,
            timing: options.timing,
            fade: options.transition,
            in_flight: Rc::new(Cell::new(false)),
            running: None,
        }
    }

    /// Pair two anchors and hide the end target
    pub fn connect<S, K>(
        &mut self,
        stage: &mut Stage<S, K>,
        begin: impl Into<AnchorRef>,
        end: impl Into<AnchorRef>,
    ) -> Result<Connector>
    where
        S: Surface<Target = T> + 'static,
        K: StyleSink + 'static,
    {
        self.base.connect(stage, begin.into(), end.into())
    }

    /// Whether a transition's completion is still pending
    pub fn is_running(&self) -> bool {
        self.in_flight.get()
    }

    /// Duration of a transition in `direction`, in milliseconds
    pub fn duration(&self, direction: Direction) -> u32 {
        self.durations.for_direction(direction)
    }

    /// Crossfade of a transition in `direction`, if any
    pub fn fade(&self, direction: Direction) -> Option<FadeDetail> {
        self.fade.and_then(|fade| fade.for_direction(direction))
    }

    /// Morph every begin element into its end element
    pub fn forward<S, K>(&mut self, stage: &mut Stage<S, K>) -> Result<TransitionHandle>
    where
        S: Surface<Target = T> + 'static,
        K: StyleSink + 'static,
    {
        self.run(stage, Direction::Forward, None)
    }

    /// Like [`forward`](Self::forward), calling `on_complete` once every
    /// connector has finished
    pub fn forward_with<S, K>(
        &mut self,
        stage: &mut Stage<S, K>,
        on_complete: impl FnOnce(&CompletionEvent<T>) + 'static,
    ) -> Result<TransitionHandle>
    where
        S: Surface<Target = T> + 'static,
        K: StyleSink + 'static,
    {
        self.run(stage, Direction::Forward, Some(Box::new(on_complete)))
    }

    /// Morph every end element back into its begin element
    pub fn backward<S, K>(&mut self, stage: &mut Stage<S, K>) -> Result<TransitionHandle>
    where
        S: Surface<Target = T> + 'static,
        K: StyleSink + 'static,
    {
        self.run(stage, Direction::Backward, None)
    }

    pub fn backward_with<S, K>(
        &mut self,
        stage: &mut Stage<S, K>,
        on_complete: impl FnOnce(&CompletionEvent<T>) + 'static,
    ) -> Result<TransitionHandle>
    where
        S: Surface<Target = T> + 'static,
        K: StyleSink + 'static,
    {
        self.run(stage, Direction::Backward, Some(Box::new(on_complete)))
    }

    /// Abandon the running transition
    ///
    /// Pending completion steps are dropped without firing end hooks or the
    /// completion callback, and every connector that had not finished is
    /// restored to the state it started from. Returns whether a transition
    /// was running.
    pub fn cancel<S, K>(&mut self, stage: &mut Stage<S, K>) -> bool
    where
        S: Surface<Target = T> + 'static,
        K: StyleSink + 'static,
    {
        if !self.in_flight.get() {
            self.running = None;
            return false;
        }
        let Some((direction, steps)) = self.running.take() else {
            self.in_flight.set(false);
            return true;
        };
        for step in steps {
            stage.cancel(step.timer);
            if !step.done.get() {
                step.roll_back(stage, direction);
            }
        }
        self.in_flight.set(false);
        tracing::debug!("Motion '{}': {} cancelled", self.base.label(), direction);
        true
    }

    /// Roll back a transition whose last completion timer no longer exists
    fn recover_abandoned<S, K>(&mut self, stage: &mut Stage<S, K>)
    where
        S: Surface<Target = T> + 'static,
        K: StyleSink + 'static,
    {
        let abandoned = self.in_flight.get()
            && self
                .running
                .as_ref()
                .and_then(|(_, steps)| steps.last())
                .is_some_and(|step| !stage.is_pending(step.timer));
        if abandoned {
            tracing::warn!(
                "Motion '{}': completion timer was cancelled, rolling back",
                self.base.label()
            );
            self.cancel(stage);
        }
    }

    fn run<S, K>(
        &mut self,
        stage: &mut Stage<S, K>,
        direction: Direction,
        on_complete: Option<CompletionFn<T>>,
    ) -> Result<TransitionHandle>
    where
        S: Surface<Target = T> + 'static,
        K: StyleSink + 'static,
    {
        self.recover_abandoned(stage);
        if self.in_flight.get() {
            tracing::warn!(
                "Motion '{}': {} rejected, a transition is still running",
                self.base.label(),
                direction
            );
            return Err(MotionError::TransitionInFlight {
                motion: self.base.label(),
            });
        }
        self.base.require_connectors()?;
        let expected = direction.required_status();
        for connector in self.base.connectors() {
            if let Err(err) = connector.check_status(stage.anchors(), expected) {
                tracing::warn!("Motion '{}': {} rejected: {}", self.base.label(), direction, err);
                return Err(err);
            }
        }
        let pairs = self.base.visible_targets(stage.anchors(), stage.surface())?;

        let duration = self.duration(direction);
        let fade = self.fade(direction);
        let event = CompletionEvent {
            direction,
            targets: named_targets(stage.anchors(), self.base.connectors(), &pairs),
        };
        tracing::debug!(
            "Motion '{}': {} started ({}ms, {} connectors)",
            self.base.label(),
            direction,
            duration,
            pairs.len()
        );

        self.in_flight.set(true);
        let last = pairs.len() - 1;
        let mut completion = Some((event, on_complete));
        let mut timers = SmallVec::new();
        let mut steps = Vec::with_capacity(pairs.len());
        let connectors = self.base.connectors().iter().copied();
        for (index, (connector, pair)) in connectors.zip(pairs).enumerate() {
            let (from, to) = pair.oriented(direction);
            let code = random_code();
            let from_class = format!("__unison_anim_from_{}", code);
            let to_class = format!("__unison_anim_to_{}", code);

            let css = self.transition_css(
                stage.surface(),
                direction,
                &pair,
                &code,
                duration,
                fade,
                &from_class,
                &to_class,
            );

            connector.notify(stage.anchors_mut(), &pair, direction, HookPhase::Start);
            connector.set_status(stage.anchors_mut(), AnchorStatus::Running);

            let rule = stage.sink_mut().publish(&css);
            stage.set_class(&from, &from_class, true);
            stage.set_class(&to, &to_class, true);
            if fade.is_some() {
                stage.show(&to);
            }

            let finish = if index == last { completion.take() } else { None };
            let in_flight = self.in_flight.clone();
            let label = self.base.label();
            let done = Rc::new(Cell::new(false));
            let step_from = from.clone();
            let step_to = to.clone();
            let step_classes = (from_class.clone(), to_class.clone());
            let task_done = done.clone();
            let task: Task<S, K> = Box::new(move |stage: &mut Stage<S, K>| {
                task_done.set(true);
                stage.hide(&from);
                stage.show(&to);
                stage.set_class(&from, &from_class, false);
                stage.set_class(&to, &to_class, false);
                stage.sink_mut().retract(rule);
                connector.set_status(stage.anchors_mut(), direction.terminal_status());
                connector.notify(stage.anchors_mut(), &pair, direction, HookPhase::End);

                if let Some((event, on_complete)) = finish {
                    in_flight.set(false);
                    tracing::debug!("Motion '{}': {} finished", label, direction);
                    if let Some(on_complete) = on_complete {
                        on_complete(&event);
                    }
                }
            });
            let timer = stage.schedule(u64::from(duration), task);
            timers.push(timer);
            steps.push(Step {
                timer,
                connector,
                from: step_from,
                to: step_to,
                from_class: step_classes.0,
                to_class: step_classes.1,
                rule,
                done,
            });
        }

        self.running = Some((direction, steps));
        Ok(TransitionHandle { direction, timers })
    }

    /// Keyframes and animation classes for one connector
    #[allow(clippy::too_many_arguments)]
    fn transition_css<S: Surface<Target = T>>(
        &self,
        surface: &S,
        direction: Direction,
        pair: &TargetPair<T>,
        code: &str,
        duration: u32,
        fade: Option<FadeDetail>,
        from_class: &str,
        to_class: &str,
    ) -> String {
        let (from, to) = pair.oriented(direction);
        let mut endpoints = Endpoints::new(surface.element_box(&from), surface.element_box(&to));
        if direction == Direction::Forward {
            endpoints = endpoints.with_bias(self.base.bias());
        }
        let start = endpoints.frame(0.0, None);
        let finish = endpoints.frame(1.0, None);
        let from_radii = surface.corner_radii(&from);
        let to_radii = surface.corner_radii(&to);
        let radii_start = endpoints.radii(&from_radii, &to_radii, 0.0);
        let radii_finish = endpoints.radii(&from_radii, &to_radii, 1.0);

        let from_anim = format!("__unison_from_anim_{}", code);
        let to_anim = format!("__unison_to_anim_{}", code);
        let mut from_frames = Keyframes::new(&from_anim)
            .add_from("transform", start.begin.to_css())
            .add_to("transform", finish.begin.to_css());
        let mut to_frames = Keyframes::new(&to_anim)
            .add_from("transform", start.end.to_css())
            .add_to("transform", finish.end.to_css());
        for (property, radius) in radii_start.begin_rows() {
            from_frames = from_frames.add_from(property, radius);
        }
        for (property, radius) in radii_finish.begin_rows() {
            from_frames = from_frames.add_to(property, radius);
        }
        for (property, radius) in radii_start.end_rows() {
            to_frames = to_frames.add_from(property, radius);
        }
        for (property, radius) in radii_finish.end_rows() {
            to_frames = to_frames.add_to(property, radius);
        }

        let timing = self.timing.as_deref();
        let mut from_animation = animation_value(&from_anim, duration, timing, None);
        let mut to_animation = animation_value(&to_anim, duration, timing, None);
        let mut blocks = vec![from_frames.to_string(), to_frames.to_string()];
        if let Some(fade) = fade {
            let from_fade = format!("__unison_from_fade_{}", code);
            let to_fade = format!("__unison_to_fade_{}", code);
            blocks.push(
                Keyframes::new(&from_fade)
                    .add_from("opacity", 1)
                    .add_to("opacity", 0)
                    .to_string(),
            );
            blocks.push(
                Keyframes::new(&to_fade)
                    .add_from("opacity", 0)
                    .add_to("opacity", 1)
                    .to_string(),
            );
            let fade_value = |name: &str| {
                animation_value(name, fade.duration, Some(FADE_TIMING), Some(fade.delay))
            };
            from_animation = format!("{}, {}", from_animation, fade_value(&from_fade));
            to_animation = format!("{}, {}", to_animation, fade_value(&to_fade));
        }

        let z_index = self.base.z_index();
        blocks.push(
            animation_class(from_class, &from_animation, z_index + 1, surface.is_static_position(&from))
                .to_string(),
        );
        blocks.push(
            animation_class(to_class, &to_animation, z_index, surface.is_static_position(&to))
                .to_string(),
        );
        blocks.join("\n")
    }
}

fn animation_class(class: &str, animation: &str, z_index: i32, static_position: bool) -> CssRule {
    let rule = CssRule::class(class)
        .add_prefixed("animation", animation)
        .add("animation-fill-mode", "both")
        .add("transform-origin", "left top")
        .add_important("z-index", z_index);
    // Stacking needs a positioned element
    if static_position {
        rule.add("position", "relative")
    } else {
        rule
    }
}

fn named_targets<T: Clone>(
    anchors: &AnchorSet<T>,
    connectors: &[Connector],
    pairs: &[TargetPair<T>],
) -> IndexMap<String, T> {
    let mut targets = IndexMap::new();
    for (connector, pair) in connectors.iter().zip(pairs) {
        for (id, target) in [(connector.begin, &pair.begin), (connector.end, &pair.end)] {
            if let Some(name) = anchors.get(id).and_then(|anchor| anchor.name()) {
                targets.insert(name.to_string(), target.clone());
            }
        }
    }
    targets
}

impl<T: Clone + fmt::Debug + 'static> Motion for DiscreteMotion<T> {
    type Target = T;

    fn base(&self) -> &MotionBase<T> {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Fade, MotionOptions};
    use std::cell::RefCell;
    use unison_core::{
        Anchor, CornerRadii, ElementBox, HeadlessSurface, HookFns, Length, MemoryStyleSink,
        MotionEvent, NodeId,
    };

    type Log = Rc<RefCell<Vec<String>>>;
    type TestStage = Stage<HeadlessSurface, MemoryStyleSink>;

    fn recorder(log: &Log, name: &'static str) -> HookFns<NodeId> {
        let push = |edge: &'static str| {
            let log = log.clone();
            move |_: &MotionEvent<NodeId>| log.borrow_mut().push(format!("{}:{}", name, edge))
        };
        HookFns::new()
            .on_forward_start(push("forward-start"))
            .on_forward_end(push("forward-end"))
            .on_backward_start(push("backward-start"))
            .on_backward_end(push("backward-end"))
    }

    /// Stage with nodes `a` (0,0 100x50) and `b` (300,0 200x50) plus
    /// `c` / `d` for multi-connector tests
    fn fixture() -> (TestStage, HeadlessSurface, Log) {
        let surface = HeadlessSurface::new();
        surface.add_node("a", ElementBox::new(0.0, 0.0, 100.0, 50.0));
        surface.add_node("b", ElementBox::new(300.0, 0.0, 200.0, 50.0));
        surface.add_node("c", ElementBox::new(0.0, 100.0, 40.0, 40.0));
        surface.add_node("d", ElementBox::new(0.0, 300.0, 80.0, 80.0));
        let log = Log::default();
        let mut stage = Stage::new(surface.clone(), MemoryStyleSink::new());
        for name in ["a", "b", "c", "d"] {
            stage.add_anchor(
                Anchor::new(surface.locator(name))
                    .named(name)
                    .with_hooks(recorder(&log, name)),
            );
        }
        (stage, surface, log)
    }

    fn connected(options: DiscreteOptions) -> (TestStage, HeadlessSurface, Log, DiscreteMotion<NodeId>) {
        let (mut stage, surface, log) = fixture();
        let mut motion = DiscreteMotion::new(options);
        motion.connect(&mut stage, "a", "b").unwrap();
        (stage, surface, log, motion)
    }

    fn node(surface: &HeadlessSurface, name: &str) -> NodeId {
        surface.find(name).unwrap()
    }

    fn status(stage: &TestStage, name: &str) -> AnchorStatus {
        let id = stage.anchors().lookup(name).unwrap();
        stage.anchors().get(id).unwrap().status()
    }

    fn counter() -> (Rc<Cell<usize>>, impl FnOnce(&CompletionEvent<NodeId>) + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move |_: &CompletionEvent<NodeId>| c.set(c.get() + 1))
    }

    #[test]
    fn test_forward_completes_after_duration() {
        let (mut stage, surface, _, mut motion) =
            connected(DiscreteOptions::default().with_duration(500));
        let (a, b) = (node(&surface, "a"), node(&surface, "b"));
        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();

        motion
            .forward_with(&mut stage, move |event: &CompletionEvent<NodeId>| {
                *s.borrow_mut() = Some(event.clone());
            })
            .unwrap();
        assert!(motion.is_running());
        assert_eq!(status(&stage, "a"), AnchorStatus::Running);

        assert_eq!(stage.advance(499), 0);
        assert!(seen.borrow().is_none());
        assert_eq!(stage.advance(1), 1);

        let event = seen.borrow_mut().take().unwrap();
        assert_eq!(event.direction, Direction::Forward);
        assert_eq!(event.get("a"), Some(&a));
        assert_eq!(event.get("b"), Some(&b));
        assert_eq!(status(&stage, "a"), AnchorStatus::End);
        assert_eq!(status(&stage, "b"), AnchorStatus::End);
        assert!(!motion.is_running());

        let hidden = stage.visibility_class().to_string();
        assert!(surface.has_class(a, &hidden));
        assert!(!surface.has_class(b, &hidden));
        // Only the visibility rule remains
        assert_eq!(stage.sink().len(), 1);
        assert_eq!(surface.classes(a), vec![hidden]);
    }

    #[test]
    fn test_forward_css() {
        let (mut stage, surface, _, mut motion) =
            connected(DiscreteOptions::default().with_timing("ease-in-out"));
        motion.forward(&mut stage).unwrap();

        let sink = stage.sink();
        assert!(sink.contains("from {transform: translate(0px, 0px) scale(1, 1);"));
        assert!(sink.contains("to {transform: translate(300px, 0px) scale(2, 1);"));
        assert!(sink.contains("from {transform: translate(-300px, 0px) scale(0.5, 1);"));
        assert!(sink.contains("500ms ease-in-out;"));
        assert!(sink.contains("-webkit-animation: __unison_from_anim_"));
        assert!(sink.contains("animation-fill-mode: both;"));
        assert!(sink.contains("z-index: 1 !important;"));
        assert!(!sink.contains("_fade_"));

        let a = node(&surface, "a");
        assert!(surface
            .classes(a)
            .iter()
            .any(|class| class.starts_with("__unison_anim_from_")));
        // The end element stays hidden without a fade
        assert!(surface.has_class(node(&surface, "b"), stage.visibility_class()));
    }

    #[test]
    fn test_hooks_fire_around_transition() {
        let (mut stage, _, log, mut motion) = connected(DiscreteOptions::default());
        motion.forward(&mut stage).unwrap();
        assert_eq!(*log.borrow(), vec!["a:forward-start", "b:forward-start"]);

        stage.run_until_idle();
        assert_eq!(
            *log.borrow(),
            vec!["a:forward-start", "b:forward-start", "a:forward-end", "b:forward-end"]
        );
    }

    #[test]
    fn test_forward_from_end_is_rejected_without_side_effects() {
        let (mut stage, surface, log, mut motion) = connected(DiscreteOptions::default());
        let connector = motion.connectors()[0];
        connector.set_status(stage.anchors_mut(), AnchorStatus::End);
        let published = stage.sink().published_count();
        let classes = surface.classes(node(&surface, "a"));

        assert_eq!(
            motion.forward(&mut stage).unwrap_err(),
            MotionError::PreconditionViolation {
                anchor: "a".into(),
                actual: AnchorStatus::End,
                expected: AnchorStatus::Begin,
            }
        );
        assert_eq!(stage.sink().published_count(), published);
        assert_eq!(surface.classes(node(&surface, "a")), classes);
        assert_eq!(stage.pending(), 0);
        assert!(log.borrow().is_empty());
        assert!(!motion.is_running());
    }

    #[test]
    fn test_backward_before_forward_is_rejected() {
        let (mut stage, _, _, mut motion) = connected(DiscreteOptions::default());
        assert!(matches!(
            motion.backward(&mut stage),
            Err(MotionError::PreconditionViolation {
                expected: AnchorStatus::End,
                ..
            })
        ));
    }

    #[test]
    fn test_reentrant_call_is_rejected() {
        let (mut stage, _, _, mut motion) = connected(DiscreteOptions::default());
        motion.forward(&mut stage).unwrap();

        let in_flight = MotionError::TransitionInFlight {
            motion: "<anonymous>".into(),
        };
        assert_eq!(motion.forward(&mut stage).unwrap_err(), in_flight);
        assert_eq!(motion.backward(&mut stage).unwrap_err(), in_flight);
        assert_eq!(stage.pending(), 1);

        stage.run_until_idle();
        assert!(motion.backward(&mut stage).is_ok());
    }

    #[test]
    fn test_cancel_restores_begin_state() {
        let (mut stage, surface, log, mut motion) = connected(DiscreteOptions::default());
        let (count, on_complete) = counter();
        let (a, b) = (node(&surface, "a"), node(&surface, "b"));

        motion.forward_with(&mut stage, on_complete).unwrap();
        assert!(motion.cancel(&mut stage));
        assert!(!motion.is_running());
        assert!(!motion.cancel(&mut stage));

        assert_eq!(stage.pending(), 0);
        assert_eq!(stage.run_until_idle(), 0);
        assert_eq!(count.get(), 0);
        assert_eq!(status(&stage, "a"), AnchorStatus::Begin);
        assert_eq!(status(&stage, "b"), AnchorStatus::Begin);
        let hidden = stage.visibility_class().to_string();
        assert_eq!(surface.classes(a), Vec::<String>::new());
        assert_eq!(surface.classes(b), vec![hidden]);
        assert_eq!(stage.sink().len(), 1);
        assert_eq!(*log.borrow(), vec!["a:forward-start", "b:forward-start"]);

        motion.forward(&mut stage).unwrap();
        stage.run_until_idle();
        assert_eq!(status(&stage, "a"), AnchorStatus::End);
    }

    #[test]
    fn test_cancelled_completion_timer_does_not_wedge() {
        let (mut stage, _, _, mut motion) = connected(DiscreteOptions::default());
        let handle = motion.forward(&mut stage).unwrap();
        assert!(stage.cancel(handle.timers()[0]));
        stage.run_until_idle();
        assert!(motion.is_running());

        // The next call rolls the abandoned run back before starting
        assert!(motion.backward(&mut stage).is_err());
        assert!(!motion.is_running());
        assert_eq!(status(&stage, "a"), AnchorStatus::Begin);
        motion.forward(&mut stage).unwrap();
        stage.run_until_idle();
        assert_eq!(status(&stage, "b"), AnchorStatus::End);
    }

    #[test]
    fn test_cancel_keeps_finished_connectors() {
        let (mut stage, _, _) = fixture();
        let mut motion = DiscreteMotion::new(DiscreteOptions::default());
        motion.connect(&mut stage, "a", "b").unwrap();
        motion.connect(&mut stage, "c", "d").unwrap();

        let handle = motion.forward(&mut stage).unwrap();
        assert!(stage.cancel(handle.timers()[1]));
        stage.run_until_idle();
        assert_eq!(status(&stage, "a"), AnchorStatus::End);

        assert!(motion.cancel(&mut stage));
        assert_eq!(status(&stage, "a"), AnchorStatus::End);
        assert_eq!(status(&stage, "c"), AnchorStatus::Begin);
        assert_eq!(status(&stage, "d"), AnchorStatus::Begin);
    }

    #[test]
    fn test_backward_after_forward() {
        let (mut stage, surface, log, mut motion) =
            connected(DiscreteOptions::default().with_durations(300, 200));
        let (count, on_complete) = counter();

        motion.forward(&mut stage).unwrap();
        stage.advance(300);
        log.borrow_mut().clear();

        motion.backward_with(&mut stage, on_complete).unwrap();
        // The end element morphs back onto the begin box
        assert!(stage
            .sink()
            .contains("to {transform: translate(-300px, 0px) scale(0.5, 1);"));
        stage.advance(199);
        assert_eq!(count.get(), 0);
        stage.advance(1);
        assert_eq!(count.get(), 1);

        assert_eq!(status(&stage, "a"), AnchorStatus::Begin);
        assert_eq!(status(&stage, "b"), AnchorStatus::Begin);
        let hidden = stage.visibility_class().to_string();
        assert!(!surface.has_class(node(&surface, "a"), &hidden));
        assert!(surface.has_class(node(&surface, "b"), &hidden));
        assert_eq!(
            *log.borrow(),
            vec!["a:backward-start", "b:backward-start", "a:backward-end", "b:backward-end"]
        );
    }

    #[test]
    fn test_fade_only_for_configured_direction() {
        let fade = FadeSpec::PerDirection {
            forward: Some(Fade::Duration(200)),
            backward: None,
        };
        let (mut stage, surface, _, mut motion) =
            connected(DiscreteOptions::default().with_fade(fade));
        let b = node(&surface, "b");

        motion.forward(&mut stage).unwrap();
        assert!(stage.sink().contains("@keyframes __unison_from_fade_"));
        assert!(stage.sink().contains("from {opacity: 0;} to {opacity: 1;}"));
        assert!(stage.sink().contains("200ms ease 0ms"));
        // The fading-in element is shown right away
        assert!(!surface.has_class(b, stage.visibility_class()));

        stage.run_until_idle();
        motion.backward(&mut stage).unwrap();
        assert!(!stage.sink().contains("_fade_"));
        assert!(!stage.sink().contains("opacity"));
    }

    #[test]
    fn test_forward_bias_is_not_applied_backward() {
        let options = DiscreteOptions::new(MotionOptions::default().with_offset(10.0, 0.0));
        let (mut stage, _, _, mut motion) = connected(options);

        motion.forward(&mut stage).unwrap();
        assert!(stage.sink().contains("to {transform: translate(310px, 0px) scale(2, 1);"));
        stage.run_until_idle();

        motion.backward(&mut stage).unwrap();
        assert!(!stage.sink().contains("310px"));
        assert!(stage.sink().contains("translate(-300px, 0px)"));
    }

    #[test]
    fn test_mismatched_radius_unit_is_omitted() {
        let (mut stage, surface, _, mut motion) = connected(DiscreteOptions::default());
        surface.set_radii(node(&surface, "a"), Length::px(4.0));
        surface.set_radii(
            node(&surface, "b"),
            CornerRadii::new(
                Length::percent(50.0),
                Length::px(8.0),
                Length::px(8.0),
                Length::px(8.0),
            ),
        );

        motion.forward(&mut stage).unwrap();
        assert!(stage.sink().contains("border-top-right-radius: 4px;"));
        assert!(stage.sink().contains("border-bottom-left-radius"));
        assert!(!stage.sink().contains("border-top-left-radius"));
    }

    #[test]
    fn test_position_only_for_static_targets() {
        let (mut stage, surface, _, mut motion) = connected(DiscreteOptions::default());
        surface.set_static_position(node(&surface, "b"), false);

        motion.forward(&mut stage).unwrap();
        assert_eq!(stage.sink().text().matches("position: relative;").count(), 1);
    }

    #[test]
    fn test_completion_fires_once_for_all_connectors() {
        let (mut stage, _, log) = fixture();
        let mut motion = DiscreteMotion::new(DiscreteOptions::default());
        motion.connect(&mut stage, "a", "b").unwrap();
        motion.connect(&mut stage, "c", "d").unwrap();
        let (count, on_complete) = counter();

        let handle = motion.forward_with(&mut stage, on_complete).unwrap();
        assert_eq!(handle.direction(), Direction::Forward);
        assert_eq!(handle.timers().len(), 2);
        assert!(handle.timers().iter().all(|id| stage.is_pending(*id)));

        assert_eq!(stage.advance(500), 2);
        assert_eq!(count.get(), 1);
        for name in ["a", "b", "c", "d"] {
            assert_eq!(status(&stage, name), AnchorStatus::End);
        }
        assert!(handle.timers().iter().all(|id| !stage.is_pending(*id)));
        assert_eq!(log.borrow().len(), 8);
    }

    #[test]
    fn test_undisplayed_target_is_rejected() {
        let (mut stage, surface, _, mut motion) = connected(DiscreteOptions::default());
        surface.set_displayed(node(&surface, "a"), false);

        assert_eq!(
            motion.forward(&mut stage).unwrap_err(),
            MotionError::not_visible("a")
        );
        assert!(!motion.is_running());
        assert_eq!(stage.pending(), 0);
    }

    #[test]
    fn test_no_connectors() {
        let (mut stage, _, _) = fixture();
        let mut motion = DiscreteMotion::<NodeId>::new(DiscreteOptions::default());
        assert!(matches!(
            motion.forward(&mut stage),
            Err(MotionError::ArgumentInvalid(_))
        ));
    }
}
