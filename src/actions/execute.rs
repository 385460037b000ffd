//! Action execution against the runtime collaborators
//!
//! Execution is called at most once per tick for the active action and
//! must fail soft: unmet preconditions are no-ops that the next
//! evaluation pass scores down naturally. Pathfinding failures fall back
//! to straight-line movement with a retry throttle.

use tracing::debug;

use crate::actions::{ActionKind, ActionSet};
use crate::agent::AgentContext;
use crate::core::types::{AgentId, Seconds, Vec3};
use crate::memory::MemoryStore;
use crate::runtime::interface::{ItemKind, MoveResult, Runtime};
use crate::runtime::EngagementRegistry;

/// Cover attempt cooldowns (prevents cover-search spam)
const COVER_COOLDOWN_SUCCESS: Seconds = 2.0;
const COVER_COOLDOWN_FAILURE: Seconds = 1.0;

/// Grenade cooldowns
const GRENADE_COOLDOWN_SUCCESS: Seconds = 15.0;
const GRENADE_COOLDOWN_FAILURE: Seconds = 2.0;

/// Seconds between pathfinding retries after a NoPath result
const PATH_RETRY_DELAY: Seconds = 1.5;

/// Radius of the ring of candidate cover points
const COVER_SEARCH_RADIUS: f32 = 8.0;

/// Throttles pathfinding retries after failures
#[derive(Debug, Clone, Default)]
pub struct PathThrottle {
    retry_at: Seconds,
}

impl PathThrottle {
    /// Path toward a destination, falling back to straight-line movement
    /// while pathfinding is failing. Returns true when a path was accepted.
    pub fn move_toward(
        &mut self,
        runtime: &mut dyn Runtime,
        from: Vec3,
        destination: Vec3,
        now: Seconds,
    ) -> bool {
        if now < self.retry_at {
            runtime.move_direct((destination - from).normalize());
            return false;
        }

        match runtime.move_to(destination) {
            MoveResult::Moving | MoveResult::Arrived => true,
            MoveResult::NoPath => {
                self.retry_at = now + PATH_RETRY_DELAY;
                runtime.move_direct((destination - from).normalize());
                false
            }
        }
    }
}

/// Strategy weight nudge when a flank resolves
const FLANK_REWARD: f32 = 0.05;

/// Bookkeeping when an action becomes active. Returns the target whose
/// engagement was registered; the engine keeps it so the exit side
/// unregisters the same agent even after a retarget.
pub fn on_enter(
    kind: ActionKind,
    context: &AgentContext,
    engagements: &mut EngagementRegistry,
    memory: &mut MemoryStore,
    now: Seconds,
) -> Option<AgentId> {
    debug!(agent = ?context.self_id, action = kind.name(), "action entered");
    match kind {
        ActionKind::Engage => {
            if let Some(target) = context.target {
                engagements.register(context.self_id, target);
                return Some(target);
            }
        }
        ActionKind::Unstuck => {
            // The place that trapped us goes on the map for everyone
            memory.mark_stuck(context.position, now);
        }
        _ => {}
    }
    None
}

/// Bookkeeping when an action stops being active. `engaged` is the target
/// registered on enter (or on a later retarget), not whatever the context
/// happens to point at now.
pub fn on_exit(
    kind: ActionKind,
    engaged: Option<AgentId>,
    context: &AgentContext,
    engagements: &mut EngagementRegistry,
    memory: &mut MemoryStore,
    now: Seconds,
) {
    match kind {
        ActionKind::Engage => {
            if let Some(target) = engaged {
                engagements.unregister(context.self_id, target);
            }
        }
        ActionKind::Flank => {
            // Score the approach that was being run: regaining line of
            // sight counts as the flank paying off
            if let Some(anchor) = context.target_position.or(context.last_seen_position) {
                let flank = pick_flank_point(context.position, anchor, memory, now);
                let success = context.has_line_of_sight;
                memory.record_approach_outcome(flank, success, now);
                memory.reward_strategy(
                    "flank_wide",
                    if success { FLANK_REWARD } else { -FLANK_REWARD },
                );
            }
        }
        _ => {}
    }
}

/// Forced exit: the action must yield even if still selected
pub fn should_exit(kind: ActionKind, context: &AgentContext) -> bool {
    match kind {
        // A reload must yield when death is imminent; cover or retreat
        // will win the next evaluation
        ActionKind::Reload => context.health_fraction < 0.3 && context.pressure > 2.0,
        _ => false,
    }
}

/// Drive the active action for one tick
pub fn execute(
    kind: ActionKind,
    context: &AgentContext,
    set: &mut ActionSet,
    throttle: &mut PathThrottle,
    runtime: &mut dyn Runtime,
    memory: &MemoryStore,
    now: Seconds,
) {
    match kind {
        ActionKind::Unstuck => {
            // Back out perpendicular to the blocked direction and dash
            let away = if context.target_direction.length() > 0.0 {
                Vec3::new(-context.target_direction.z, 0.0, context.target_direction.x)
            } else {
                Vec3::new(1.0, 0.0, 0.0)
            };
            runtime.move_direct(away);
            runtime.dash();
        }

        ActionKind::Heal => {
            runtime.stop();
            if !runtime.use_item(ItemKind::Medkit) {
                debug!(agent = ?context.self_id, "heal requested with no medkit");
            }
        }

        ActionKind::Retreat => {
            runtime.set_run(true);
            let away = context.target_direction * -1.0;
            if away.length() > 0.0 {
                runtime.move_direct(away.normalize());
            }
        }

        ActionKind::Panic => {
            runtime.set_run(true);
            runtime.dash();
            let away = context.target_direction * -1.0;
            runtime.move_direct(if away.length() > 0.0 {
                away.normalize()
            } else {
                Vec3::new(0.0, 0.0, -1.0)
            });
        }

        ActionKind::Reload => {
            if !runtime.reload_weapon() {
                debug!(agent = ?context.self_id, "reload refused by runtime");
            }
        }

        ActionKind::TakeCover => {
            match find_cover_point(context.position, memory, now) {
                Some(cover) => {
                    throttle.move_toward(runtime, context.position, cover, now);
                    set.set_cooldown(ActionKind::TakeCover, COVER_COOLDOWN_SUCCESS);
                }
                None => {
                    set.set_cooldown(ActionKind::TakeCover, COVER_COOLDOWN_FAILURE);
                }
            }
        }

        ActionKind::Engage => {
            if let Some(target_pos) = context.target_position {
                runtime.set_run(false);
                if context.has_line_of_sight {
                    runtime.fire_weapon();
                } else {
                    throttle.move_toward(runtime, context.position, target_pos, now);
                }
            }
        }

        ActionKind::Flank => {
            if let Some(anchor) = context.target_position.or(context.last_seen_position) {
                let flank = pick_flank_point(context.position, anchor, memory, now);
                throttle.move_toward(runtime, context.position, flank, now);
            }
        }

        ActionKind::Suppress => {
            if context.last_seen_position.is_some() {
                runtime.set_run(false);
                runtime.fire_weapon();
            }
        }

        ActionKind::Chase => {
            if let Some(goal) = context.target_position.or(context.last_seen_position) {
                runtime.set_run(true);
                throttle.move_toward(runtime, context.position, goal, now);
            }
        }

        ActionKind::Search => {
            if let Some(last_seen) = context.last_seen_position {
                runtime.set_run(false);
                throttle.move_toward(runtime, context.position, last_seen, now);
            }
        }

        ActionKind::ThrowGrenade => {
            let thrown = context
                .target_position
                .or(context.last_seen_position)
                .map(|at| runtime.throw_item(ItemKind::Grenade, at))
                .unwrap_or(false);

            set.set_cooldown(
                ActionKind::ThrowGrenade,
                if thrown {
                    GRENADE_COOLDOWN_SUCCESS
                } else {
                    GRENADE_COOLDOWN_FAILURE
                },
            );
        }

        ActionKind::BossCommand => {
            // The order itself is issued by the squad coordinator on its
            // next pass; the leader just holds position while commanding
            runtime.stop();
        }

        ActionKind::Patrol => {
            runtime.set_run(false);
            let waypoint = patrol_waypoint(context.position, now);
            throttle.move_toward(runtime, context.position, waypoint, now);
        }
    }
}

/// Pick the coolest point on a ring around the agent, or `None` when
/// nowhere beats standing still
fn find_cover_point(position: Vec3, memory: &MemoryStore, now: Seconds) -> Option<Vec3> {
    let here = memory.heat_at(position, now, COVER_SEARCH_RADIUS);

    let mut best: Option<(Vec3, f32)> = None;
    for i in 0..8 {
        let angle = i as f32 * std::f32::consts::FRAC_PI_4;
        let candidate = position
            + Vec3::new(
                angle.cos() * COVER_SEARCH_RADIUS,
                0.0,
                angle.sin() * COVER_SEARCH_RADIUS,
            );
        let heat = memory.heat_at(candidate, now, COVER_SEARCH_RADIUS);
        if best.map_or(true, |(_, h)| heat < h) {
            best = Some((candidate, heat));
        }
    }

    best.filter(|&(_, heat)| heat < here).map(|(pos, _)| pos)
}

/// Choose the flank side with the better approach history
fn pick_flank_point(position: Vec3, anchor: Vec3, memory: &MemoryStore, now: Seconds) -> Vec3 {
    let toward = (anchor - position).normalize();
    let side = Vec3::new(-toward.z, 0.0, toward.x) * 12.0;

    let left = anchor + side;
    let right = anchor - side;

    if memory.approach_weight(left, now) >= memory.approach_weight(right, now) {
        left
    } else {
        right
    }
}

/// Deterministic wandering waypoint: a slow circle around the current spot
fn patrol_waypoint(position: Vec3, now: Seconds) -> Vec3 {
    let angle = (now * 0.1) % std::f32::consts::TAU;
    position + Vec3::new(angle.cos() * 10.0, 0.0, angle.sin() * 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Personality;
    use crate::core::config::DecisionConfig;
    use crate::core::types::AgentId;

    /// Scripted runtime recording what execution asked for
    #[derive(Default)]
    struct ScriptedRuntime {
        pub fired: u32,
        pub reloads: u32,
        pub items_used: Vec<ItemKind>,
        pub throws: Vec<(ItemKind, Vec3)>,
        pub move_targets: Vec<Vec3>,
        pub direct_moves: Vec<Vec3>,
        pub running: bool,
        pub path_available: bool,
        pub has_grenade: bool,
    }

    impl crate::runtime::interface::Sensing for ScriptedRuntime {
        fn has_line_of_sight(&self, _from: Vec3, _to: Vec3) -> bool {
            true
        }
    }

    impl crate::runtime::interface::Movement for ScriptedRuntime {
        fn move_to(&mut self, destination: Vec3) -> MoveResult {
            if self.path_available {
                self.move_targets.push(destination);
                MoveResult::Moving
            } else {
                MoveResult::NoPath
            }
        }
        fn move_direct(&mut self, direction: Vec3) {
            self.direct_moves.push(direction);
        }
        fn set_run(&mut self, running: bool) {
            self.running = running;
        }
        fn dash(&mut self) {}
        fn stop(&mut self) {}
    }

    impl crate::runtime::interface::Combat for ScriptedRuntime {
        fn fire_weapon(&mut self) -> bool {
            self.fired += 1;
            true
        }
        fn reload_weapon(&mut self) -> bool {
            self.reloads += 1;
            true
        }
        fn switch_weapon(&mut self, _slot: crate::runtime::interface::WeaponSlot) -> bool {
            true
        }
        fn melee_attack(&mut self) -> bool {
            true
        }
        fn use_item(&mut self, item: ItemKind) -> bool {
            self.items_used.push(item);
            true
        }
        fn throw_item(&mut self, item: ItemKind, at: Vec3) -> bool {
            if self.has_grenade {
                self.throws.push((item, at));
                true
            } else {
                false
            }
        }
    }

    impl crate::runtime::interface::Inventory for ScriptedRuntime {
        fn has_ranged_weapon(&self) -> bool {
            true
        }
        fn ammo_fraction(&self) -> f32 {
            1.0
        }
        fn has_healing_item(&self) -> bool {
            true
        }
        fn has_throwable(&self) -> bool {
            self.has_grenade
        }
    }

    fn context_with_target() -> AgentContext {
        let mut ctx =
            AgentContext::new(AgentId::new(), Vec3::default(), Personality::default());
        ctx.target = Some(AgentId::new());
        ctx.target_position = Some(Vec3::new(15.0, 0.0, 0.0));
        ctx.target_direction = Vec3::new(1.0, 0.0, 0.0);
        ctx.target_distance = 15.0;
        ctx.has_line_of_sight = true;
        ctx
    }

    fn memory() -> MemoryStore {
        MemoryStore::new(&DecisionConfig::default())
    }

    #[test]
    fn test_engage_fires_with_line_of_sight() {
        let ctx = context_with_target();
        let mut set = ActionSet::new();
        let mut runtime = ScriptedRuntime {
            path_available: true,
            ..Default::default()
        };

        execute(
            ActionKind::Engage,
            &ctx,
            &mut set,
            &mut PathThrottle::default(),
            &mut runtime,
            &memory(),
            0.0,
        );
        assert_eq!(runtime.fired, 1);
    }

    #[test]
    fn test_grenade_success_sets_long_cooldown() {
        let ctx = context_with_target();
        let mut set = ActionSet::new();
        let mut runtime = ScriptedRuntime {
            path_available: true,
            has_grenade: true,
            ..Default::default()
        };

        execute(
            ActionKind::ThrowGrenade,
            &ctx,
            &mut set,
            &mut PathThrottle::default(),
            &mut runtime,
            &memory(),
            0.0,
        );
        assert_eq!(runtime.throws.len(), 1);
        assert!((set.state(ActionKind::ThrowGrenade).cooldown - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_grenade_failure_sets_short_cooldown() {
        let ctx = context_with_target();
        let mut set = ActionSet::new();
        let mut runtime = ScriptedRuntime {
            path_available: true,
            has_grenade: false,
            ..Default::default()
        };

        execute(
            ActionKind::ThrowGrenade,
            &ctx,
            &mut set,
            &mut PathThrottle::default(),
            &mut runtime,
            &memory(),
            0.0,
        );
        assert!(runtime.throws.is_empty());
        assert!((set.state(ActionKind::ThrowGrenade).cooldown - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_no_path_falls_back_to_direct_movement() {
        let ctx = context_with_target();
        let mut set = ActionSet::new();
        let mut throttle = PathThrottle::default();
        let mut runtime = ScriptedRuntime::default(); // path_available = false

        execute(
            ActionKind::Chase,
            &ctx,
            &mut set,
            &mut throttle,
            &mut runtime,
            &memory(),
            0.0,
        );
        assert!(runtime.move_targets.is_empty());
        assert_eq!(runtime.direct_moves.len(), 1);

        // Retry throttled: next call goes straight to direct movement
        // without asking the pathfinder again
        execute(
            ActionKind::Chase,
            &ctx,
            &mut set,
            &mut throttle,
            &mut runtime,
            &memory(),
            0.5,
        );
        assert_eq!(runtime.direct_moves.len(), 2);
    }

    #[test]
    fn test_cover_moves_away_from_heat() {
        let mut ctx = context_with_target();
        ctx.position = Vec3::new(0.0, 0.0, 0.0);
        let mut set = ActionSet::new();
        let mut runtime = ScriptedRuntime {
            path_available: true,
            ..Default::default()
        };

        let mut mem = memory();
        mem.mark_danger(Vec3::new(5.0, 0.0, 0.0), 0.0, 3.0);

        execute(
            ActionKind::TakeCover,
            &ctx,
            &mut set,
            &mut PathThrottle::default(),
            &mut runtime,
            &mem,
            0.0,
        );

        let dest = runtime.move_targets[0];
        // Chosen cover must sit on the far side from the danger
        assert!(dest.x < 0.0, "cover at {dest:?} should flee +x danger");
        assert!((set.state(ActionKind::TakeCover).cooldown - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_engage_registers_engagement() {
        let ctx = context_with_target();
        let mut engagements = EngagementRegistry::new();
        let mut mem = memory();

        let engaged = on_enter(ActionKind::Engage, &ctx, &mut engagements, &mut mem, 0.0);
        assert_eq!(engaged, ctx.target);
        assert_eq!(
            engagements.allies_on_target(AgentId::new(), ctx.target.unwrap()),
            1
        );

        on_exit(ActionKind::Engage, engaged, &ctx, &mut engagements, &mut mem, 0.0);
        assert_eq!(
            engagements.allies_on_target(AgentId::new(), ctx.target.unwrap()),
            0
        );
    }

    #[test]
    fn test_exit_unregisters_enter_time_target_after_retarget() {
        // The context retargets while Engage stays active; exit still
        // removes the registration made on enter
        let mut ctx = context_with_target();
        let original = ctx.target.unwrap();
        let mut engagements = EngagementRegistry::new();
        let mut mem = memory();

        let engaged = on_enter(ActionKind::Engage, &ctx, &mut engagements, &mut mem, 0.0);
        ctx.target = Some(AgentId::new());

        on_exit(ActionKind::Engage, engaged, &ctx, &mut engagements, &mut mem, 1.0);
        assert_eq!(engagements.allies_on_target(AgentId::new(), original), 0);
    }

    #[test]
    fn test_unstuck_enter_marks_stuck_spot() {
        let mut ctx = context_with_target();
        ctx.position = Vec3::new(7.0, 0.0, -2.0);
        ctx.is_stuck = true;
        let mut engagements = EngagementRegistry::new();
        let mut mem = memory();

        on_enter(ActionKind::Unstuck, &ctx, &mut engagements, &mut mem, 3.0);
        assert!(mem.near_stuck_spot(ctx.position, 1.0));
    }

    #[test]
    fn test_flank_exit_records_approach_outcome() {
        let mut ctx = context_with_target();
        ctx.has_line_of_sight = true;
        let mut engagements = EngagementRegistry::new();
        let mut mem = memory();

        let anchor = ctx.target_position.unwrap();
        let flank = pick_flank_point(ctx.position, anchor, &mem, 0.0);

        // Repetition builds confidence in the approach point
        for i in 0..6 {
            on_exit(
                ActionKind::Flank,
                None,
                &ctx,
                &mut engagements,
                &mut mem,
                i as f32,
            );
        }

        assert!(mem.approach_weight(flank, 6.0) > 1.5);
        assert!(mem.global.strategy.get("flank_wide") > 1.0);
    }

    #[test]
    fn test_reload_yields_to_imminent_death() {
        let mut ctx = context_with_target();
        ctx.health_fraction = 0.2;
        ctx.pressure = 3.0;
        assert!(should_exit(ActionKind::Reload, &ctx));

        ctx.pressure = 0.5;
        assert!(!should_exit(ActionKind::Reload, &ctx));
    }
}
