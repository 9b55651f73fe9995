//! State shared by all motion controllers
//!
//! A controller owns an ordered list of connectors. Insertion order is
//! significant: hooks fire in that order, and the last connector is the one
//! whose completion reports the end of a discrete transition.

use std::fmt;

use unison_core::{
    AnchorId, AnchorRef, AnchorSet, AnchorStatus, Direction, HookPhase, MotionError, MotionEvent,
    Offset, Result, StyleSink, Surface,
};

use crate::config::MotionOptions;
use crate::stage::Stage;

/// One shared-element relationship: a begin anchor and an end anchor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Connector {
    pub begin: AnchorId,
    pub end: AnchorId,
}

impl Connector {
    /// Fail unless both anchors are in `expected` status
    pub fn check_status<T>(&self, anchors: &AnchorSet<T>, expected: AnchorStatus) -> Result<()> {
        for id in [self.begin, self.end] {
            let actual = anchors.require(id)?.status();
            if actual != expected {
                return Err(MotionError::PreconditionViolation {
                    anchor: anchors.label(id),
                    actual,
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Set both anchors' status
    pub fn set_status<T>(&self, anchors: &mut AnchorSet<T>, status: AnchorStatus) {
        for id in [self.begin, self.end] {
            if let Some(anchor) = anchors.get_mut(id) {
                anchor.set_status(status);
            }
        }
    }

    /// Fire the `phase` hook of `direction` on the begin anchor, then the end anchor
    pub fn notify<T: Clone>(
        &self,
        anchors: &mut AnchorSet<T>,
        targets: &TargetPair<T>,
        direction: Direction,
        phase: HookPhase,
    ) {
        for (id, current) in [(self.begin, &targets.begin), (self.end, &targets.end)] {
            if let Some(anchor) = anchors.get_mut(id) {
                let event = MotionEvent {
                    direction,
                    begin: targets.begin.clone(),
                    end: targets.end.clone(),
                    current: current.clone(),
                };
                anchor.notify(phase, &event);
            }
        }
    }
}

/// Resolved targets of one connector
#[derive(Clone, Debug, PartialEq)]
pub struct TargetPair<T> {
    pub begin: T,
    pub end: T,
}

impl<T: Clone> TargetPair<T> {
    /// `(from, to)` for a transition in `direction`
    pub fn oriented(&self, direction: Direction) -> (T, T) {
        match direction {
            Direction::Forward => (self.begin.clone(), self.end.clone()),
            Direction::Backward => (self.end.clone(), self.begin.clone()),
        }
    }
}

#[derive(Clone, Debug)]
struct CachedTargets<T> {
    begin: Option<T>,
    end: Option<T>,
}

/// Connectors and configuration common to both controllers
pub struct MotionBase<T> {
    options: MotionOptions,
    connectors: Vec<Connector>,
    // Last resolved targets, by connector index
    cache: Vec<CachedTargets<T>>,
}

impl<T: Clone + fmt::Debug + 'static> MotionBase<T> {
    pub fn new(options: MotionOptions) -> Self {
        Self {
            options,
            connectors: Vec::new(),
            cache: Vec::new(),
        }
    }

    pub fn options(&self) -> &MotionOptions {
        &self.options
    }

    pub fn name(&self) -> Option<&str> {
        self.options.name.as_deref()
    }

    /// Name for messages
    pub fn label(&self) -> String {
        self.name().unwrap_or("<anonymous>").to_string()
    }

    pub fn z_index(&self) -> i32 {
        self.options.z_index
    }

    /// Positional bias for forward transitions
    pub fn bias(&self) -> Offset {
        self.options.bias()
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Pair two anchors and hide the end target
    ///
    /// The begin element is taken to be the visible one when the pair is made.
    pub fn connect<S, K>(
        &mut self,
        stage: &mut Stage<S, K>,
        begin: AnchorRef,
        end: AnchorRef,
    ) -> Result<Connector>
    where
        S: Surface<Target = T> + 'static,
        K: StyleSink + 'static,
    {
        let begin = stage.anchors().resolve_ref(&begin)?;
        let end = stage.anchors().resolve_ref(&end)?;
        if begin == end {
            return Err(MotionError::ArgumentInvalid(format!(
                "a connector needs two different anchors, got '{}' twice",
                stage.anchors().label(begin)
            )));
        }

        stage.ensure_visibility_rule();
        let begin_target = stage.anchors().require(begin)?.resolve();
        let end_target = stage.anchors().require(end)?.resolve();
        if let Some(target) = &end_target {
            stage.hide(target);
        }

        let connector = Connector { begin, end };
        self.connectors.push(connector);
        self.cache.push(CachedTargets {
            begin: begin_target,
            end: end_target,
        });

        tracing::debug!(
            "Motion '{}': connected '{}' -> '{}' (connector #{})",
            self.label(),
            stage.anchors().label(begin),
            stage.anchors().label(end),
            self.connectors.len() - 1
        );
        Ok(connector)
    }

    /// Fail when there is nothing to animate
    pub fn require_connectors(&self) -> Result<()> {
        if self.connectors.is_empty() {
            return Err(MotionError::ArgumentInvalid(format!(
                "motion '{}' has no connectors",
                self.label()
            )));
        }
        Ok(())
    }

    /// Resolve the targets of connector `index`
    ///
    /// Anchors are re-resolved on every call; the cached target is used only
    /// when the locator currently finds nothing.
    pub fn targets(&mut self, anchors: &AnchorSet<T>, index: usize) -> Result<TargetPair<T>> {
        let (Some(&connector), Some(cached)) = (self.connectors.get(index), self.cache.get_mut(index))
        else {
            return Err(MotionError::ArgumentInvalid(format!(
                "connector #{} does not exist ({} connected)",
                index,
                self.connectors.len()
            )));
        };
        Ok(TargetPair {
            begin: refresh(anchors, connector.begin, &mut cached.begin)?,
            end: refresh(anchors, connector.end, &mut cached.end)?,
        })
    }

    /// Resolve every connector's targets and require them to be visible
    pub fn visible_targets<S: Surface<Target = T>>(
        &mut self,
        anchors: &AnchorSet<T>,
        surface: &S,
    ) -> Result<Vec<TargetPair<T>>> {
        let mut pairs = Vec::with_capacity(self.connectors.len());
        for index in 0..self.connectors.len() {
            let pair = self.targets(anchors, index)?;
            let connector = self.connectors[index];
            for (id, target) in [(connector.begin, &pair.begin), (connector.end, &pair.end)] {
                if !surface.is_visible(target) {
                    return Err(MotionError::not_visible(anchors.label(id)));
                }
            }
            pairs.push(pair);
        }
        Ok(pairs)
    }
}

fn refresh<T: Clone>(anchors: &AnchorSet<T>, id: AnchorId, slot: &mut Option<T>) -> Result<T> {
    if let Some(target) = anchors.require(id)?.resolve() {
        *slot = Some(target.clone());
        return Ok(target);
    }
    slot.clone()
        .ok_or_else(|| MotionError::not_found(anchors.label(id)))
}

/// Common surface of the motion controllers
pub trait Motion {
    type Target: Clone + fmt::Debug + 'static;

    fn base(&self) -> &MotionBase<Self::Target>;

    fn name(&self) -> Option<&str> {
        self.base().name()
    }

    fn connectors(&self) -> &[Connector] {
        self.base().connectors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unison_core::{Anchor, ElementBox, HeadlessSurface, MemoryStyleSink, NodeId};

    fn stage_with_pair() -> (Stage<HeadlessSurface, MemoryStyleSink>, HeadlessSurface, NodeId, NodeId) {
        let surface = HeadlessSurface::new();
        let a = surface.add_node("a", ElementBox::new(0.0, 0.0, 10.0, 10.0));
        let b = surface.add_node("b", ElementBox::new(50.0, 0.0, 20.0, 20.0));
        let mut stage = Stage::new(surface.clone(), MemoryStyleSink::new());
        stage.add_anchor(Anchor::new(surface.locator("a")).named("a"));
        stage.add_anchor(Anchor::new(surface.locator("b")).named("b"));
        (stage, surface, a, b)
    }

    #[test]
    fn test_connect_hides_end_target() {
        let (mut stage, surface, a, b) = stage_with_pair();
        let mut base = MotionBase::new(MotionOptions::named("m"));

        let connector = base.connect(&mut stage, "a".into(), "b".into()).unwrap();
        assert_eq!(Some(connector.begin), stage.anchors().lookup("a"));
        assert!(!surface.has_class(a, stage.visibility_class()));
        assert!(surface.has_class(b, stage.visibility_class()));
        assert_eq!(base.connectors().len(), 1);
    }

    #[test]
    fn test_connect_rejects_same_anchor_and_unknown_names() {
        let (mut stage, _, _, _) = stage_with_pair();
        let mut base = MotionBase::new(MotionOptions::default());

        assert!(matches!(
            base.connect(&mut stage, "a".into(), "a".into()),
            Err(MotionError::ArgumentInvalid(_))
        ));
        assert_eq!(
            base.connect(&mut stage, "a".into(), "nope".into()),
            Err(MotionError::UnknownAnchor("nope".into()))
        );
        assert!(base.connectors().is_empty());
    }

    #[test]
    fn test_targets_fall_back_to_cache() {
        let (mut stage, surface, a, b) = stage_with_pair();
        let mut base = MotionBase::new(MotionOptions::default());
        base.connect(&mut stage, "a".into(), "b".into()).unwrap();

        surface.remove_node(b);
        let pair = base.targets(stage.anchors(), 0).unwrap();
        assert_eq!(pair, TargetPair { begin: a, end: b });

        // The cached node is gone from the surface, so it is not visible
        assert_eq!(
            base.visible_targets(stage.anchors(), stage.surface()),
            Err(MotionError::not_visible("b"))
        );
    }

    #[test]
    fn test_targets_out_of_range() {
        let (mut stage, _, _, _) = stage_with_pair();
        let mut base = MotionBase::new(MotionOptions::default());
        assert!(matches!(
            base.targets(stage.anchors(), 0),
            Err(MotionError::ArgumentInvalid(_))
        ));

        base.connect(&mut stage, "a".into(), "b".into()).unwrap();
        assert!(base.targets(stage.anchors(), 0).is_ok());
        assert!(matches!(
            base.targets(stage.anchors(), 1),
            Err(MotionError::ArgumentInvalid(_))
        ));
    }

    #[test]
    fn test_unresolvable_target_is_reported() {
        let surface = HeadlessSurface::new();
        surface.add_node("a", ElementBox::new(0.0, 0.0, 10.0, 10.0));
        let mut stage = Stage::new(surface.clone(), MemoryStyleSink::new());
        stage.add_anchor(Anchor::new(surface.locator("a")).named("a"));
        stage.add_anchor(Anchor::new(surface.locator("late")).named("late"));

        let mut base = MotionBase::new(MotionOptions::default());
        base.connect(&mut stage, "a".into(), "late".into()).unwrap();
        assert_eq!(
            base.targets(stage.anchors(), 0),
            Err(MotionError::not_found("late"))
        );

        // Resolved lazily once the element exists
        let late = surface.add_node("late", ElementBox::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(base.targets(stage.anchors(), 0).unwrap().end, late);
    }

    #[test]
    fn test_check_status() {
        let (mut stage, _, _, _) = stage_with_pair();
        let mut base = MotionBase::new(MotionOptions::default());
        let connector = base.connect(&mut stage, "a".into(), "b".into()).unwrap();

        assert!(connector.check_status(stage.anchors(), AnchorStatus::Begin).is_ok());
        connector.set_status(stage.anchors_mut(), AnchorStatus::End);
        assert_eq!(
            connector.check_status(stage.anchors(), AnchorStatus::Begin),
            Err(MotionError::PreconditionViolation {
                anchor: "a".into(),
                actual: AnchorStatus::End,
                expected: AnchorStatus::Begin,
            })
        );
    }
}
