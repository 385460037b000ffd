//! Rule-based utility scoring
//!
//! Pure functions of the context plus each action's cooldown state. The
//! thresholds here are contract, not tuning guesses: integration tests pin
//! them. An action on cooldown always scores 0, whatever else is true.

use crate::actions::{ActionKind, ActionSet};
use crate::agent::AgentContext;
use crate::core::types::Seconds;

/// Health fraction below which an agent is critical
const HEALTH_CRITICAL: f32 = 0.3;

/// Health fraction below which an agent is wounded
const HEALTH_WOUNDED: f32 = 0.6;

/// Pressure above which the agent is considered under heavy fire
const PRESSURE_HEAVY: f32 = 2.0;

/// Grenade throw window in meters
const GRENADE_MIN_RANGE: f32 = 8.0;
const GRENADE_MAX_RANGE: f32 = 25.0;

/// Score every action into `out`, indexed by `ActionKind::index`
pub fn evaluate_all(
    context: &AgentContext,
    set: &ActionSet,
    now: Seconds,
    difficulty_aggression: f32,
    out: &mut [f32],
) {
    debug_assert_eq!(out.len(), ActionKind::ALL.len());
    for kind in ActionKind::ALL {
        out[kind.index()] = evaluate(kind, context, set, now, difficulty_aggression);
    }
}

/// Rule score for one action, in [0, 1]
pub fn evaluate(
    kind: ActionKind,
    context: &AgentContext,
    set: &ActionSet,
    now: Seconds,
    difficulty_aggression: f32,
) -> f32 {
    if set.on_cooldown(kind) {
        return 0.0;
    }

    let score = match kind {
        ActionKind::Unstuck => score_unstuck(context),
        ActionKind::Heal => score_heal(context),
        ActionKind::Retreat => score_retreat(context),
        ActionKind::Panic => score_panic(context),
        ActionKind::Reload => score_reload(context),
        ActionKind::TakeCover => score_take_cover(context),
        ActionKind::Engage => score_engage(context) * offensive_scale(difficulty_aggression),
        ActionKind::Flank => score_flank(context) * offensive_scale(difficulty_aggression),
        ActionKind::Suppress => score_suppress(context, now) * offensive_scale(difficulty_aggression),
        ActionKind::Chase => score_chase(context, now) * offensive_scale(difficulty_aggression),
        ActionKind::Search => score_search(context, now),
        ActionKind::ThrowGrenade => score_throw_grenade(context),
        ActionKind::BossCommand => score_boss_command(context),
        ActionKind::Patrol => score_patrol(context),
    };

    score.clamp(0.0, 1.0)
}

/// Difficulty aggression (0.8..1.5) scales offensive scores, capped so it
/// can never push one past the defensive overrides
fn offensive_scale(difficulty_aggression: f32) -> f32 {
    difficulty_aggression.clamp(0.8, 1.5)
}

/// Hard override: stuck agents do nothing but unstick
fn score_unstuck(context: &AgentContext) -> f32 {
    if context.is_stuck {
        1.0
    } else {
        0.0
    }
}

fn score_heal(context: &AgentContext) -> f32 {
    if !context.has_healing_item {
        return 0.0;
    }
    if context.health_fraction < HEALTH_CRITICAL {
        return 0.95;
    }
    if context.health_fraction < HEALTH_WOUNDED
        && (!context.has_line_of_sight || context.pressure < 0.5)
    {
        return 0.75;
    }
    0.0
}

fn score_retreat(context: &AgentContext) -> f32 {
    if context.health_fraction < HEALTH_CRITICAL && context.pressure > PRESSURE_HEAVY {
        0.95
    } else {
        0.0
    }
}

fn score_panic(context: &AgentContext) -> f32 {
    if context.is_hurt && context.pressure > 3.0 && context.personality.caution > 0.5 {
        0.8
    } else {
        0.0
    }
}

fn score_reload(context: &AgentContext) -> f32 {
    if context.is_reloading {
        return 0.9;
    }
    if context.ammo_fraction <= 0.0 {
        return 0.92;
    }
    if context.is_low_ammo && !context.has_line_of_sight {
        return 0.7;
    }
    0.0
}

fn score_take_cover(context: &AgentContext) -> f32 {
    let mut score: f32 = 0.0;
    if context.pressure > PRESSURE_HEAVY {
        score = score.max(0.85);
    }
    if (context.is_reloading || context.is_hurt) && context.has_line_of_sight {
        score = score.max(0.88);
    }
    if context.has_line_of_sight && context.target_distance < 10.0 {
        score = score.max(0.6);
    }
    score
}

fn score_engage(context: &AgentContext) -> f32 {
    if context.target.is_none() || !context.has_line_of_sight || context.target_distance >= 30.0 {
        return 0.0;
    }
    let mut score = 0.5;
    if context.pressure < 1.0 {
        score += 0.2;
    }
    if context.target_distance < 15.0 {
        score += 0.1;
    }
    score
}

fn score_flank(context: &AgentContext) -> f32 {
    // Crowd de-confliction: when the target is already swarmed, peel off
    if context.target.is_some() && context.allies_on_target > 2 {
        return 0.7;
    }
    if context.has_line_of_sight && context.target_distance > 20.0 && context.pressure < 1.0 {
        return 0.45;
    }
    if !context.has_line_of_sight && context.last_seen_position.is_some() {
        return 0.3;
    }
    0.0
}

fn score_suppress(context: &AgentContext, now: Seconds) -> f32 {
    let recently_seen = context
        .time_since_seen(now)
        .map_or(false, |elapsed| elapsed <= 3.0);

    if !context.has_line_of_sight
        && recently_seen
        && !context.is_low_ammo
        && context.pressure < PRESSURE_HEAVY
    {
        0.6
    } else {
        0.0
    }
}

fn score_chase(context: &AgentContext, now: Seconds) -> f32 {
    if !context.can_chase {
        return 0.0;
    }
    if context.has_line_of_sight && context.target_distance > 20.0 {
        return 0.6;
    }
    let seen_recently = context
        .time_since_seen(now)
        .map_or(false, |elapsed| elapsed <= 20.0);
    if !context.has_line_of_sight && seen_recently {
        return 0.55;
    }
    0.1
}

fn score_search(context: &AgentContext, now: Seconds) -> f32 {
    let lost_contact = context
        .time_since_seen(now)
        .map_or(false, |elapsed| elapsed > 5.0);

    if !context.has_line_of_sight && lost_contact {
        0.4
    } else {
        0.05
    }
}

fn score_throw_grenade(context: &AgentContext) -> f32 {
    if !context.has_throwable {
        return 0.0;
    }
    let in_window = context.target_distance >= GRENADE_MIN_RANGE
        && context.target_distance <= GRENADE_MAX_RANGE;
    if context.target.is_none() || !in_window {
        return 0.0;
    }
    if !context.has_line_of_sight || context.pressure > PRESSURE_HEAVY {
        0.82
    } else {
        0.4
    }
}

fn score_boss_command(context: &AgentContext) -> f32 {
    if context.is_squad_leader && context.live_squadmates >= 2 && context.target.is_some() {
        0.65
    } else {
        0.0
    }
}

fn score_patrol(context: &AgentContext) -> f32 {
    if context.target.is_none() && context.last_seen_position.is_none() {
        0.2
    } else {
        0.05
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Personality;
    use crate::core::types::{AgentId, Vec3};

    fn context() -> AgentContext {
        AgentContext::new(AgentId::new(), Vec3::default(), Personality::default())
    }

    fn score(kind: ActionKind, ctx: &AgentContext) -> f32 {
        evaluate(kind, ctx, &ActionSet::new(), 100.0, 1.0)
    }

    #[test]
    fn test_stuck_always_scores_one() {
        let mut ctx = context();
        ctx.is_stuck = true;
        assert_eq!(score(ActionKind::Unstuck, &ctx), 1.0);
        ctx.is_stuck = false;
        assert_eq!(score(ActionKind::Unstuck, &ctx), 0.0);
    }

    #[test]
    fn test_heal_critical_health() {
        let mut ctx = context();
        ctx.health_fraction = 0.2;
        assert!((score(ActionKind::Heal, &ctx) - 0.95).abs() < 0.001);
    }

    #[test]
    fn test_heal_wounded_needs_safety() {
        let mut ctx = context();
        ctx.health_fraction = 0.5;
        ctx.has_line_of_sight = true;
        ctx.pressure = 1.0;
        assert_eq!(score(ActionKind::Heal, &ctx), 0.0);

        ctx.pressure = 0.2;
        assert!((score(ActionKind::Heal, &ctx) - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_heal_requires_item() {
        let mut ctx = context();
        ctx.health_fraction = 0.1;
        ctx.has_healing_item = false;
        assert_eq!(score(ActionKind::Heal, &ctx), 0.0);
    }

    #[test]
    fn test_retreat_needs_both_low_health_and_pressure() {
        let mut ctx = context();
        ctx.health_fraction = 0.2;
        ctx.pressure = 1.0;
        assert_eq!(score(ActionKind::Retreat, &ctx), 0.0);

        ctx.pressure = 2.5;
        assert!((score(ActionKind::Retreat, &ctx) - 0.95).abs() < 0.001);
    }

    #[test]
    fn test_reload_priorities() {
        let mut ctx = context();
        ctx.is_reloading = true;
        assert!((score(ActionKind::Reload, &ctx) - 0.9).abs() < 0.001);

        ctx.is_reloading = false;
        ctx.ammo_fraction = 0.0;
        assert!((score(ActionKind::Reload, &ctx) - 0.92).abs() < 0.001);

        ctx.ammo_fraction = 0.2;
        ctx.is_low_ammo = true;
        ctx.has_line_of_sight = false;
        assert!((score(ActionKind::Reload, &ctx) - 0.7).abs() < 0.001);
    }

    #[test]
    fn test_take_cover_under_fire_beats_proximity_rule() {
        let mut ctx = context();
        ctx.pressure = 2.5;
        ctx.has_line_of_sight = true;
        ctx.target_distance = 5.0;
        assert!((score(ActionKind::TakeCover, &ctx) - 0.85).abs() < 0.001);
    }

    #[test]
    fn test_take_cover_while_reloading_exposed() {
        let mut ctx = context();
        ctx.is_reloading = true;
        ctx.has_line_of_sight = true;
        assert!((score(ActionKind::TakeCover, &ctx) - 0.88).abs() < 0.001);
    }

    #[test]
    fn test_engage_stacks_bonuses() {
        let mut ctx = context();
        ctx.target = Some(AgentId::new());
        ctx.has_line_of_sight = true;
        ctx.target_distance = 10.0;
        ctx.pressure = 0.5;
        assert!((score(ActionKind::Engage, &ctx) - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_engage_needs_line_of_sight() {
        let mut ctx = context();
        ctx.target = Some(AgentId::new());
        ctx.target_distance = 10.0;
        assert_eq!(score(ActionKind::Engage, &ctx), 0.0);
    }

    #[test]
    fn test_flank_crowd_deconfliction() {
        let mut ctx = context();
        ctx.target = Some(AgentId::new());
        ctx.allies_on_target = 3;
        assert!((score(ActionKind::Flank, &ctx) - 0.7).abs() < 0.001);
    }

    #[test]
    fn test_flank_far_and_calm() {
        let mut ctx = context();
        ctx.has_line_of_sight = true;
        ctx.target_distance = 25.0;
        ctx.pressure = 0.5;
        assert!((score(ActionKind::Flank, &ctx) - 0.45).abs() < 0.001);
    }

    #[test]
    fn test_suppress_on_recently_hidden_target() {
        let mut ctx = context();
        ctx.note_sighting(Vec3::new(10.0, 0.0, 0.0), 98.0);
        ctx.has_line_of_sight = false;
        assert!((score(ActionKind::Suppress, &ctx) - 0.6).abs() < 0.001);

        // Seen too long ago
        let mut stale = context();
        stale.note_sighting(Vec3::new(10.0, 0.0, 0.0), 50.0);
        stale.has_line_of_sight = false;
        assert_eq!(score(ActionKind::Suppress, &stale), 0.0);
    }

    #[test]
    fn test_chase_gated_by_flag() {
        let mut ctx = context();
        ctx.has_line_of_sight = true;
        ctx.target_distance = 30.0;
        assert_eq!(score(ActionKind::Chase, &ctx), 0.0);

        ctx.can_chase = true;
        assert!((score(ActionKind::Chase, &ctx) - 0.6).abs() < 0.001);
    }

    #[test]
    fn test_search_after_losing_contact() {
        let mut ctx = context();
        ctx.note_sighting(Vec3::new(10.0, 0.0, 0.0), 90.0);
        ctx.has_line_of_sight = false;
        assert!((score(ActionKind::Search, &ctx) - 0.4).abs() < 0.001);
    }

    #[test]
    fn test_grenade_window_and_boost() {
        let mut ctx = context();
        ctx.target = Some(AgentId::new());
        ctx.has_throwable = true;
        ctx.target_distance = 15.0;
        ctx.has_line_of_sight = true;
        assert!((score(ActionKind::ThrowGrenade, &ctx) - 0.4).abs() < 0.001);

        ctx.has_line_of_sight = false;
        assert!((score(ActionKind::ThrowGrenade, &ctx) - 0.82).abs() < 0.001);

        ctx.target_distance = 5.0;
        assert_eq!(score(ActionKind::ThrowGrenade, &ctx), 0.0);
        ctx.target_distance = 30.0;
        assert_eq!(score(ActionKind::ThrowGrenade, &ctx), 0.0);
    }

    #[test]
    fn test_cooldown_zeroes_any_score() {
        let mut ctx = context();
        ctx.is_stuck = true;

        let mut set = ActionSet::new();
        set.set_cooldown(ActionKind::Unstuck, 1.0);
        assert_eq!(evaluate(ActionKind::Unstuck, &ctx, &set, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_difficulty_aggression_scales_engage() {
        let mut ctx = context();
        ctx.target = Some(AgentId::new());
        ctx.has_line_of_sight = true;
        ctx.target_distance = 20.0;
        ctx.pressure = 1.5;

        let normal = evaluate(ActionKind::Engage, &ctx, &ActionSet::new(), 0.0, 1.0);
        let hard = evaluate(ActionKind::Engage, &ctx, &ActionSet::new(), 0.0, 1.4);
        assert!(hard > normal);
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let mut ctx = context();
        ctx.target = Some(AgentId::new());
        ctx.has_line_of_sight = true;
        ctx.target_distance = 10.0;
        ctx.pressure = 0.0;

        for kind in ActionKind::ALL {
            let s = evaluate(kind, &ctx, &ActionSet::new(), 100.0, 1.5);
            assert!((0.0..=1.0).contains(&s), "{kind:?} scored {s}");
        }
    }
}
