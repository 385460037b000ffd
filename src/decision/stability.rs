//! Hysteresis layer preventing action thrash
//!
//! Dwell time, challenge margin, per-action switch-cooldowns, and a global
//! post-switch freeze together keep agents committed to a choice long
//! enough for it to play out.

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use tracing::debug;

use crate::actions::{ActionKind, ActionSet};
use crate::core::config::DecisionConfig;
use crate::core::types::Seconds;

/// What the stability layer decided this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Keep running the current action
    Continue(ActionKind),
    /// Switch to a new action (old one, if any, has exited)
    Switch {
        from: Option<ActionKind>,
        to: ActionKind,
    },
}

impl Transition {
    pub fn active(&self) -> ActionKind {
        match *self {
            Transition::Continue(kind) => kind,
            Transition::Switch { to, .. } => to,
        }
    }

    pub fn switched(&self) -> bool {
        matches!(self, Transition::Switch { .. })
    }
}

/// Per-agent hysteresis state
#[derive(Debug, Clone)]
pub struct StabilityLayer {
    current: Option<ActionKind>,
    /// Seconds the current action has been active
    dwell: Seconds,
    /// Per-action exclusion windows after exiting that action
    switch_cooldowns: AHashMap<ActionKind, Seconds>,
    /// Freeze on all re-evaluation right after a switch
    global_cooldown: Seconds,
}

impl StabilityLayer {
    pub fn new() -> Self {
        Self {
            current: None,
            dwell: 0.0,
            switch_cooldowns: AHashMap::new(),
            global_cooldown: 0.0,
        }
    }

    pub fn current(&self) -> Option<ActionKind> {
        self.current
    }

    pub fn dwell(&self) -> Seconds {
        self.dwell
    }

    /// Advance timers by one frame
    pub fn tick(&mut self, dt: Seconds) {
        if self.current.is_some() {
            self.dwell += dt;
        }
        self.global_cooldown = (self.global_cooldown - dt).max(0.0);
        for cooldown in self.switch_cooldowns.values_mut() {
            *cooldown = (*cooldown - dt).max(0.0);
        }
        self.switch_cooldowns.retain(|_, cooldown| *cooldown > 0.0);
    }

    /// Whether a just-exited action is still excluded from candidacy
    pub fn on_switch_cooldown(&self, kind: ActionKind) -> bool {
        self.switch_cooldowns
            .get(&kind)
            .map_or(false, |&cooldown| cooldown > 0.0)
    }

    /// Resolve this tick's transition from blended scores.
    ///
    /// `scores` is indexed by `ActionKind::index`. `forced_exit` reports
    /// whether the current action demanded to stop; it overrides dwell
    /// protection but not cooldown exclusion of successors.
    pub fn resolve(
        &mut self,
        scores: &[f32],
        set: &ActionSet,
        forced_exit: bool,
        config: &DecisionConfig,
    ) -> Transition {
        // Global freeze: commit to the current action, no questions
        if self.global_cooldown > 0.0 && !forced_exit {
            if let Some(current) = self.current {
                return Transition::Continue(current);
            }
        }

        let proposed = self.best_candidate(scores, set);

        let transition = match (self.current, proposed) {
            (None, Some(to)) => self.switch(None, to, config),
            (None, None) => {
                // Nothing scoring at all: idle on patrol
                self.switch(None, ActionKind::Patrol, config)
            }
            (Some(current), None) => Transition::Continue(current),
            (Some(current), Some(challenger)) => {
                if challenger == current && !forced_exit {
                    return Transition::Continue(current);
                }

                if forced_exit {
                    let to = if challenger == current {
                        // Forced out with itself on top: next best or idle
                        self.next_best(scores, set, current)
                            .unwrap_or(ActionKind::Patrol)
                    } else {
                        challenger
                    };
                    return self.switch(Some(current), to, config);
                }

                let current_score = scores[current.index()];
                let challenger_score = scores[challenger.index()];

                // Inside the dwell window the challenger must win by margin
                if self.dwell < config.min_dwell
                    && challenger_score <= current_score + config.switch_margin
                {
                    return Transition::Continue(current);
                }

                // Outside the dwell window any strictly better score wins
                if challenger_score <= current_score {
                    return Transition::Continue(current);
                }

                self.switch(Some(current), challenger, config)
            }
        };

        transition
    }

    /// Highest-scoring candidate not excluded by name-cooldown or
    /// switch-cooldown. Ties break by `ActionKind::ALL` order because
    /// iteration follows that order and later equal scores do not replace
    /// the running best.
    fn best_candidate(&self, scores: &[f32], set: &ActionSet) -> Option<ActionKind> {
        let mut best: Option<(ActionKind, OrderedFloat<f32>)> = None;
        for kind in ActionKind::ALL {
            if set.on_cooldown(kind) || self.on_switch_cooldown(kind) {
                if self.current != Some(kind) {
                    continue;
                }
            }
            let score = OrderedFloat(scores[kind.index()]);
            if score <= OrderedFloat(0.0) {
                continue;
            }
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((kind, score));
            }
        }
        best.map(|(kind, _)| kind)
    }

    /// Best candidate other than `excluded`
    fn next_best(&self, scores: &[f32], set: &ActionSet, excluded: ActionKind) -> Option<ActionKind> {
        let mut best: Option<(ActionKind, OrderedFloat<f32>)> = None;
        for kind in ActionKind::ALL {
            if kind == excluded || set.on_cooldown(kind) || self.on_switch_cooldown(kind) {
                continue;
            }
            let score = OrderedFloat(scores[kind.index()]);
            if score <= OrderedFloat(0.0) {
                continue;
            }
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((kind, score));
            }
        }
        best.map(|(kind, _)| kind)
    }

    fn switch(
        &mut self,
        from: Option<ActionKind>,
        to: ActionKind,
        config: &DecisionConfig,
    ) -> Transition {
        if let Some(from) = from {
            self.switch_cooldowns.insert(from, config.switch_cooldown);
            debug!(?from, ?to, dwell = self.dwell, "action switch");
        }
        self.current = Some(to);
        self.dwell = 0.0;
        self.global_cooldown = config.global_decision_cooldown;
        Transition::Switch { from, to }
    }
}

impl Default for StabilityLayer {
    fn default() -> Self {
        Self::new()
    }
}
