//! Blending rule scores with the neural scorer
//!
//! Three stages, in an order that is load-bearing:
//! 1. raw net outputs are scaled by fixed per-action importance priors,
//! 2. rule and neural scores blend with a weight that ramps up over the
//!    agent's lifetime,
//! 3. contextual adjustment then hard constraints run last, so neither
//!    scorer can override a constraint.

use crate::actions::ActionKind;
use crate::agent::AgentContext;
use crate::core::config::DecisionConfig;
use crate::core::types::Seconds;

/// Hand-tuned prior on how much each action's neural output matters
pub fn importance_weight(kind: ActionKind) -> f32 {
    match kind {
        ActionKind::Heal => 2.0,
        ActionKind::Retreat => 1.6,
        ActionKind::TakeCover => 1.5,
        ActionKind::Reload => 1.3,
        ActionKind::Engage => 1.2,
        ActionKind::Flank => 1.1,
        ActionKind::Suppress => 1.0,
        ActionKind::Chase => 1.0,
        ActionKind::Search => 0.9,
        ActionKind::ThrowGrenade => 1.0,
        ActionKind::Panic => 0.8,
        ActionKind::BossCommand => 0.9,
        ActionKind::Patrol => 0.7,
        ActionKind::Unstuck => 0.7,
    }
}

/// Neural blend weight for an agent that has been alive `time_alive`
/// seconds: ramps linearly from the floor to the cap
pub fn neural_weight(time_alive: Seconds, config: &DecisionConfig) -> f32 {
    let t = (time_alive / config.neural_ramp_duration).clamp(0.0, 1.0);
    config.neural_weight_floor + (config.neural_weight_cap - config.neural_weight_floor) * t
}

/// Blend rule and neural scores for every action, then adjust and constrain
pub fn blend_all(
    rule_scores: &[f32],
    neural_raw: &[f32],
    context: &AgentContext,
    time_alive: Seconds,
    config: &DecisionConfig,
    out: &mut [f32],
) {
    debug_assert_eq!(rule_scores.len(), ActionKind::ALL.len());
    debug_assert_eq!(neural_raw.len(), ActionKind::ALL.len());

    let w = neural_weight(time_alive, config);

    for kind in ActionKind::ALL {
        let i = kind.index();
        let neural = (neural_raw[i] * importance_weight(kind)).min(1.0);
        let blended = rule_scores[i] * (1.0 - w) + neural * w;
        out[i] = constrain(kind, adjust(kind, blended, context), context);
    }

    // A stuck agent cannot execute anything else. Unstuck is pinned to the
    // ceiling and every rival is capped below the switch margin, so the
    // override survives blending, boosts, and dwell protection alike.
    if context.is_stuck {
        let unstuck = ActionKind::Unstuck.index();
        let cap = 1.0 - config.switch_margin - 0.05;
        for (i, score) in out.iter_mut().enumerate() {
            if i != unstuck {
                *score = score.min(cap);
            }
        }
        out[unstuck] = 1.0;
    }
}

/// Contextual adjustment: health state shifts the defensive/offensive mix
fn adjust(kind: ActionKind, score: f32, context: &AgentContext) -> f32 {
    let mut score = score;

    let defensive = matches!(
        kind,
        ActionKind::Heal | ActionKind::Retreat | ActionKind::Panic
    );

    if defensive {
        if context.health_fraction < 0.3 {
            score *= 1.3;
        } else if context.health_fraction > 0.8 {
            score *= 0.5;
        }
    }

    // Cautious agents lean into cover a little harder
    if kind == ActionKind::TakeCover {
        score *= 1.0 + 0.2 * (context.personality.caution - 0.5);
    }

    score
}

/// Hard constraints applied last so nothing can override them
fn constrain(kind: ActionKind, score: f32, context: &AgentContext) -> f32 {
    if kind.needs_ranged_weapon() && !context.has_ranged_weapon {
        return 0.0;
    }
    if kind == ActionKind::ThrowGrenade && !context.has_throwable {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}
