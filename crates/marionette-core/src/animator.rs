//! Per-action animation playback
//!
//! One animator exists per in-flight `Action` event. It counts ticks,
//! applies the server's outcomes exactly once at the configured result
//! tick, and completes after a minimum dwell or at the hard ceiling. The
//! "still playing" answer from the stage is treated as advisory: skills
//! with no animation never report done, so the ceiling is what guarantees
//! playback always moves on.

use crate::battler::BattlerRef;
use crate::config::TimingConfig;
use crate::defs::ContentDefs;
use crate::event::ActionEvent;
use crate::host::{HostBridge, Stage};
use crate::id::{AnimationId, EffectId, ATTACK_SKILL};
use crate::session::BattleSession;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Drives one action event from animation start to completion
#[derive(Debug)]
pub struct ActionAnimator {
    event: ActionEvent,
    subject: BattlerRef,
    elapsed: u32,
    applied: bool,
    /// Fast path: no animation and nothing visible to show, so results
    /// applied at start and the action completes on the next tick
    instant: bool,
}

impl ActionAnimator {
    /// Begin playback of one action
    ///
    /// Returns `None` when the subject reference no longer resolves; the
    /// event is skipped and the queue moves on.
    pub fn start(
        event: ActionEvent,
        session: &mut BattleSession,
        defs: &ContentDefs,
        stage: &mut dyn Stage,
        effects: &mut VecDeque<EffectId>,
    ) -> Option<Self> {
        let subject = event.subject;
        let (is_enemy, subject_attack) = match session.combatant(subject) {
            Some(c) => (c.is_enemy(), c.attack_animation()),
            None => {
                warn!(subject = %subject, "action subject not found, skipping event");
                return None;
            }
        };

        let animation = resolve_animation(&event, defs);
        let quiet = event
            .targets
            .iter()
            .all(|t| t.damage == 0 && !t.missed);

        let mut animator = Self {
            event,
            subject,
            elapsed: 0,
            applied: false,
            instant: animation.is_none() && quiet,
        };

        if animator.instant {
            animator.apply_results(session, stage, effects);
            return Some(animator);
        }

        if is_enemy {
            stage.flash(subject);
        }
        let play = if animation.is_subject_attack() {
            subject_attack
        } else {
            animation
        };
        if !play.is_none() {
            for outcome in &animator.event.targets {
                stage.play_animation(outcome.target, play);
            }
        }
        Some(animator)
    }

    /// Which battler is acting
    pub fn subject(&self) -> BattlerRef {
        self.subject
    }

    /// True once outcomes have been written into the roster
    pub fn applied(&self) -> bool {
        self.applied
    }

    /// Ticks elapsed since the action started
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// Advance one tick; true when the action is complete
    pub fn tick(
        &mut self,
        session: &mut BattleSession,
        host: &mut dyn HostBridge,
        stage: &mut dyn Stage,
        timing: &TimingConfig,
        effects: &mut VecDeque<EffectId>,
    ) -> bool {
        self.elapsed += 1;

        if self.instant {
            self.finish(host, stage);
            return true;
        }

        if !self.applied && self.elapsed >= timing.result_tick() {
            self.apply_results(session, stage, effects);
            host.refresh_status();
        }

        if self.elapsed >= timing.timeout_ticks() {
            if !self.applied {
                self.apply_results(session, stage, effects);
                host.refresh_status();
            }
            warn!(
                subject = %self.subject,
                elapsed = self.elapsed,
                "animation never reported done, forcing completion"
            );
            self.finish(host, stage);
            return true;
        }

        if self.elapsed >= timing.min_ticks() && !stage.animation_playing() {
            self.finish(host, stage);
            return true;
        }

        false
    }

    /// Write every outcome into the roster, exactly once
    ///
    /// The after-values are absolute, so a second call would be a no-op on
    /// the pools; the guard exists so popups and effect queueing cannot
    /// repeat either.
    fn apply_results(
        &mut self,
        session: &mut BattleSession,
        stage: &mut dyn Stage,
        effects: &mut VecDeque<EffectId>,
    ) {
        if self.applied {
            return;
        }
        self.applied = true;

        for outcome in &self.event.targets {
            if session.vitals(outcome.target).is_none() {
                warn!(target = %outcome.target, "outcome target not found, skipping");
                continue;
            }

            if outcome.missed {
                stage.show_miss(outcome.target);
                continue;
            }

            stage.show_damage(outcome.target, outcome.damage, outcome.critical);
            if let Some(vitals) = session.vitals_mut(outcome.target) {
                vitals.set_hp(outcome.hp_after);
                vitals.set_mp(outcome.mp_after);
            }
            for state in &outcome.added_states {
                session.add_state(outcome.target, *state);
            }
            for state in &outcome.removed_states {
                session.remove_state(outcome.target, *state);
            }
            if session
                .vitals(outcome.target)
                .map(|v| !v.alive())
                .unwrap_or(false)
            {
                stage.play_collapse(outcome.target);
                session.mark_collapsed(outcome.target);
            }
            effects.extend(outcome.effects.iter().copied());
        }
    }

    fn finish(&self, host: &mut dyn HostBridge, stage: &mut dyn Stage) {
        stage.end_action(self.subject);
        host.begin_waiting();
    }
}

/// Resolve which animation an action plays
///
/// Explicit skill or item wins; an action with neither falls back to the
/// basic-attack skill. Unknown ids degrade to "no animation".
fn resolve_animation(event: &ActionEvent, defs: &ContentDefs) -> AnimationId {
    if let Some(skill) = event.skill {
        return match defs.skill(skill) {
            Some(def) => def.animation,
            None => {
                debug!(%skill, "unknown skill in action, no animation");
                AnimationId::new(0)
            }
        };
    }
    if let Some(item) = event.item {
        return match defs.item(item) {
            Some(def) => def.animation,
            None => {
                debug!(%item, "unknown item in action, no animation");
                AnimationId::new(0)
            }
        };
    }
    match defs.skill(ATTACK_SKILL) {
        Some(def) => def.animation,
        // No attack skill defined; play the subject's own attack.
        None => AnimationId::new(-1),
    }
}
