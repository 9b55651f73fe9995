//! Progress-driven motion
//!
//! A [`ContinuousMotion`] is steered by repeated [`set`](ContinuousMotion::set)
//! calls with a progress value in `[0, 100]`, typically from a slider or a
//! scroll position. Every call in the open interval recomputes the transform
//! of both sides of every connector and republishes one rule set; reaching 0
//! or 100 finalizes visibility and fires the end hooks.
//!
//! Edges are detected against the previously applied progress, so repeated
//! calls at an edge fire nothing.

use std::fmt;

use unison_core::{
    format_number, random_code, AnchorRef, AnchorStatus, CssRule, Direction, HookPhase,
    MotionError, Result, RuleHandle, StyleSink, Surface,
};

use crate::base::{Connector, Motion, MotionBase, TargetPair};
use crate::config::ContinuousOptions;
use crate::interpolate::{Affine, Endpoints, TransitionWindow};
use crate::stage::Stage;

const BEGIN_CLASS_PREFIX: &str = "__unison_progress_begin_";
const END_CLASS_PREFIX: &str = "__unison_progress_end_";

/// Controller driven by an explicit progress value
pub struct ContinuousMotion<T> {
    base: MotionBase<T>,
    window: Option<TransitionWindow>,
    progress: f32,
    token: String,
    rule: Option<RuleHandle>,
}

impl<T: Clone + fmt::Debug + 'static> ContinuousMotion<T> {
    /// Create a controller; fails when the transition window is malformed
    pub fn new(options: ContinuousOptions) -> Result<Self> {
        let window = options
            .transition
            .map(|[start, stop]| TransitionWindow::from_progress(start, stop))
            .transpose()?;
        Ok(Self {
            base: MotionBase::new(options.motion),
            window,
            progress: 0.0,
            token: random_code(),
            rule: None,
        })
    }

    /// Pair two anchors
    ///
    /// Both targets must resolve and be displayed; the end target is hidden.
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
        let begin = stage.anchors().resolve_ref(&begin.into())?;
        let end = stage.anchors().resolve_ref(&end.into())?;
        for id in [begin, end] {
            let target = stage.anchors().require_target(id)?;
            if !stage.surface().is_visible(&target) {
                return Err(MotionError::not_visible(stage.anchors().label(id)));
            }
        }
        self.base.connect(stage, begin.into(), end.into())
    }

    /// Last applied progress
    pub fn get(&self) -> f32 {
        self.progress
    }

    pub fn window(&self) -> Option<&TransitionWindow> {
        self.window.as_ref()
    }

    /// Class carrying the begin-side transform of connector `index`
    pub fn begin_class(&self, index: usize) -> String {
        format!("{}{}_{}", BEGIN_CLASS_PREFIX, self.token, index)
    }

    /// Class carrying the end-side transform of connector `index`
    pub fn end_class(&self, index: usize) -> String {
        format!("{}{}_{}", END_CLASS_PREFIX, self.token, index)
    }

    /// Move every connector to `progress` (0-100)
    ///
    /// Values are not clamped. Validation happens before anything changes.
    pub fn set<S, K>(&mut self, stage: &mut Stage<S, K>, progress: f32) -> Result<()>
    where
        S: Surface<Target = T> + 'static,
        K: StyleSink + 'static,
    {
        if !(0.0..=100.0).contains(&progress) {
            return Err(MotionError::ArgumentInvalid(format!(
                "progress must be within [0, 100], got {}",
                progress
            )));
        }
        self.base.require_connectors()?;
        let pairs = self.base.visible_targets(stage.anchors(), stage.surface())?;

        let previous = self.progress;
        if progress <= 0.0 {
            if previous > 0.0 {
                self.finish(stage, &pairs, Direction::Backward, previous >= 100.0);
            }
        } else if progress >= 100.0 {
            if previous < 100.0 {
                self.finish(stage, &pairs, Direction::Forward, previous <= 0.0);
            }
        } else {
            self.apply(stage, &pairs, previous, progress / 100.0);
        }
        self.progress = progress;
        Ok(())
    }

    /// Settle on the terminal side of `direction`
    ///
    /// `jumped` means the opposite edge was left without an intermediate
    /// value, so the start hooks have not fired yet.
    fn finish<S, K>(
        &mut self,
        stage: &mut Stage<S, K>,
        pairs: &[TargetPair<T>],
        direction: Direction,
        jumped: bool,
    ) where
        S: Surface<Target = T> + 'static,
        K: StyleSink + 'static,
    {
        tracing::debug!("Motion '{}': {} finished", self.base.label(), direction);
        for (index, (connector, pair)) in self.base.connectors().iter().zip(pairs).enumerate() {
            if jumped {
                connector.notify(stage.anchors_mut(), pair, direction, HookPhase::Start);
            }
            let (from, to) = pair.oriented(direction);
            stage.hide(&from);
            stage.show(&to);
            stage.set_class(&pair.begin, &self.begin_class(index), false);
            stage.set_class(&pair.end, &self.end_class(index), false);
            connector.set_status(stage.anchors_mut(), direction.terminal_status());
            connector.notify(stage.anchors_mut(), pair, direction, HookPhase::End);
        }
        if let Some(handle) = self.rule.take() {
            stage.sink_mut().retract(handle);
        }
    }

    /// Apply the interpolated state at fraction `t` strictly inside (0, 1)
    fn apply<S, K>(
        &mut self,
        stage: &mut Stage<S, K>,
        pairs: &[TargetPair<T>],
        previous: f32,
        t: f32,
    ) where
        S: Surface<Target = T> + 'static,
        K: StyleSink + 'static,
    {
        let entering = if previous <= 0.0 {
            Some(Direction::Forward)
        } else if previous >= 100.0 {
            Some(Direction::Backward)
        } else {
            None
        };
        if let Some(direction) = entering {
            tracing::debug!("Motion '{}': {} started", self.base.label(), direction);
        }

        let z_index = self.base.z_index();
        let mut rules = Vec::with_capacity(pairs.len() * 2);
        for (index, (connector, pair)) in self.base.connectors().iter().zip(pairs).enumerate() {
            connector.set_status(stage.anchors_mut(), AnchorStatus::Running);
            if let Some(direction) = entering {
                connector.notify(stage.anchors_mut(), pair, direction, HookPhase::Start);
                let (from, to) = pair.oriented(direction);
                stage.show(&from);
                stage.hide(&to);
            }
            if self.window.is_some() {
                stage.show(&pair.begin);
                stage.show(&pair.end);
            }

            let endpoints = Endpoints::new(
                stage.surface().element_box(&pair.begin),
                stage.surface().element_box(&pair.end),
            )
            .with_bias(self.base.bias());
            let frame = endpoints.frame(t, self.window.as_ref());
            tracing::trace!(
                "Motion '{}' #{} at {}: begin {:?}, end {:?}",
                self.base.label(),
                index,
                t,
                frame.begin,
                frame.end
            );

            let begin_class = self.begin_class(index);
            let end_class = self.end_class(index);
            rules.push(side_rule(&begin_class, &frame.begin, frame.begin_opacity, z_index + 1));
            rules.push(side_rule(&end_class, &frame.end, frame.end_opacity, z_index));
            stage.set_class(&pair.begin, &begin_class, true);
            stage.set_class(&pair.end, &end_class, true);
        }

        let text = rules
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        if let Some(handle) = self.rule.take() {
            stage.sink_mut().retract(handle);
        }
        self.rule = Some(stage.sink_mut().publish(&text));
    }
}

fn side_rule(class: &str, affine: &Affine, opacity: Option<f32>, z_index: i32) -> CssRule {
    let rule = CssRule::class(class)
        .add("transform", affine.to_css())
        .add("transform-origin", "left top")
        .add("position", "relative")
        .add_important("z-index", z_index);
    match opacity {
        Some(opacity) => rule.add_important("opacity", format_number(opacity)),
        None => rule,
    }
}

impl<T: Clone + fmt::Debug + 'static> Motion for ContinuousMotion<T> {
    type Target = T;

    fn base(&self) -> &MotionBase<T> {
        &self.base
    }
}
