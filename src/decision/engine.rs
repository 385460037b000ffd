//! Per-agent decision driver
//!
//! One engine per agent ties the pipeline together: feature extraction,
//! rule scoring, the shared neural scorer, blending, hysteresis, then
//! execution of whichever action survives. Scoring runs on a fixed
//! interval; execution of the active action runs every tick.

use tracing::trace;

use crate::actions::{evaluate, execute, ActionKind, ActionSet};
use crate::agent::AgentContext;
use crate::brain::features;
use crate::core::types::{AgentId, Seconds, Vec3};
use crate::decision::blend;
use crate::decision::stability::{StabilityLayer, Transition};
use crate::runtime::interface::Runtime;
use crate::runtime::SimulationContext;

/// Decision pipeline state for one agent
pub struct DecisionEngine {
    /// Seconds since spawn; drives the neural blend ramp and resets on
    /// respawn so a fresh life starts back at rule-trusting weights
    time_alive: Seconds,
    next_decision_at: Seconds,
    actions: ActionSet,
    stability: StabilityLayer,
    throttle: execute::PathThrottle,
    /// Target whose engagement this agent has registered, which can lag
    /// `context.target` between decision points
    engaged_target: Option<AgentId>,
    rule_scores: Vec<f32>,
    blended: Vec<f32>,
}

impl DecisionEngine {
    pub fn new() -> Self {
        let n = ActionKind::ALL.len();
        Self {
            time_alive: 0.0,
            next_decision_at: 0.0,
            actions: ActionSet::new(),
            stability: StabilityLayer::new(),
            throttle: execute::PathThrottle::default(),
            engaged_target: None,
            rule_scores: vec![0.0; n],
            blended: vec![0.0; n],
        }
    }

    pub fn active_action(&self) -> Option<ActionKind> {
        self.stability.current()
    }

    pub fn time_alive(&self) -> Seconds {
        self.time_alive
    }

    /// Last blended score vector, indexed by `ActionKind::index`
    pub fn scores(&self) -> &[f32] {
        &self.blended
    }

    /// A new life starts over: no action, no dwell, rule-heavy blending
    pub fn reset_on_respawn(&mut self) {
        self.time_alive = 0.0;
        self.next_decision_at = 0.0;
        self.actions = ActionSet::new();
        self.stability = StabilityLayer::new();
        self.throttle = execute::PathThrottle::default();
        self.engaged_target = None;
    }

    /// Advance one frame: maybe re-decide, always drive the active action
    pub fn tick(
        &mut self,
        context: &mut AgentContext,
        sim: &mut SimulationContext,
        runtime: &mut dyn Runtime,
        now: Seconds,
        dt: Seconds,
    ) {
        self.time_alive += dt;
        self.actions.tick(dt, self.stability.current());
        self.stability.tick(dt);
        context.decay_pressure(dt);

        if now >= self.next_decision_at {
            self.next_decision_at = now + sim.config.decision_interval;
            self.decide(context, sim, now);
        }

        if let Some(active) = self.stability.current() {
            execute::execute(
                active,
                context,
                &mut self.actions,
                &mut self.throttle,
                runtime,
                &sim.memory,
                now,
            );
        }
    }

    /// One scoring pass through the whole pipeline
    fn decide(&mut self, context: &mut AgentContext, sim: &mut SimulationContext, now: Seconds) {
        // Retarget while Engage stays active: move the registration so the
        // crowd counts track who is actually being shot at
        if self.stability.current() == Some(ActionKind::Engage)
            && context.target != self.engaged_target
        {
            if let Some(old) = self.engaged_target.take() {
                sim.engagements.unregister(context.self_id, old);
            }
            if let Some(new) = context.target {
                sim.engagements.register(context.self_id, new);
                self.engaged_target = Some(new);
            }
        }

        context.allies_on_target = match context.target {
            Some(target) => sim.engagements.allies_on_target(context.self_id, target),
            None => 0,
        };

        evaluate::evaluate_all(
            context,
            &self.actions,
            now,
            sim.difficulty.aggression_multiplier(),
            &mut self.rule_scores,
        );

        let inputs = features::extract(context);
        let neural_raw = sim.brain.net.feed_forward(&inputs);

        blend::blend_all(
            &self.rule_scores,
            &neural_raw,
            context,
            self.time_alive,
            &sim.config,
            &mut self.blended,
        );

        let forced_exit = self
            .stability
            .current()
            .map_or(false, |active| execute::should_exit(active, context));

        let transition =
            self.stability
                .resolve(&self.blended, &self.actions, forced_exit, &sim.config);

        if let Transition::Switch { from, to } = transition {
            if let Some(from) = from {
                execute::on_exit(
                    from,
                    self.engaged_target.take(),
                    context,
                    &mut sim.engagements,
                    &mut sim.memory,
                    now,
                );
            }
            self.engaged_target =
                execute::on_enter(to, context, &mut sim.engagements, &mut sim.memory, now);
            self.actions.reset_time_active(to);
            trace!(agent = ?context.self_id, from = ?from, to = to.name(), "decision");
        }
    }

    /// Fold incoming damage into pressure and the shared danger map
    pub fn note_damage(
        &mut self,
        context: &mut AgentContext,
        sim: &mut SimulationContext,
        amount: f32,
        source: Option<Vec3>,
        now: Seconds,
    ) {
        context.add_pressure(amount);
        context.is_hurt = context.health_fraction < 0.6;
        let spot = source.unwrap_or(context.position);
        sim.memory.mark_danger(spot, now, amount);
        // Hit without eyes on anyone: remember where we got jumped
        if !context.has_line_of_sight {
            sim.memory.mark_ambush(context.position, now);
        }
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}
