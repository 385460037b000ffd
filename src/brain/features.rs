//! Feature extraction for the neural scorer
//!
//! The input layout is a fixed contract with persisted brains: changing it
//! changes `INPUT_SIZE` and invalidates old snapshots on load.

use crate::agent::AgentContext;

/// Number of input features
pub const INPUT_SIZE: usize = 10;

/// Distance at which the normalized-distance feature saturates
const DISTANCE_SCALE: f32 = 50.0;

/// Pressure at which the normalized-pressure feature saturates
const PRESSURE_SCALE: f32 = 5.0;

/// Extract the fixed 10-feature input vector from a context
pub fn extract(context: &AgentContext) -> [f32; INPUT_SIZE] {
    let distance = if context.target.is_some() {
        (context.target_distance / DISTANCE_SCALE).min(1.0)
    } else {
        1.0
    };

    [
        context.health_fraction,
        distance,
        context.has_line_of_sight as u8 as f32,
        (context.pressure / PRESSURE_SCALE).min(1.0),
        context.ammo_fraction,
        context.is_reloading as u8 as f32,
        context.personality.aggression,
        context.personality.caution,
        context.personality.teamwork,
        context.target_health_fraction,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Personality;
    use crate::core::types::{AgentId, Vec3};

    #[test]
    fn test_features_are_normalized() {
        let mut ctx = AgentContext::new(AgentId::new(), Vec3::default(), Personality::default());
        ctx.target = Some(AgentId::new());
        ctx.target_distance = 500.0;
        ctx.pressure = 100.0;

        for value in extract(&ctx) {
            assert!((0.0..=1.0).contains(&value), "feature out of range: {value}");
        }
    }

    #[test]
    fn test_no_target_reads_as_max_distance() {
        let ctx = AgentContext::new(AgentId::new(), Vec3::default(), Personality::default());
        let features = extract(&ctx);
        assert_eq!(features[1], 1.0);
    }

    #[test]
    fn test_flags_map_to_unit_values() {
        let mut ctx = AgentContext::new(AgentId::new(), Vec3::default(), Personality::default());
        ctx.has_line_of_sight = true;
        ctx.is_reloading = true;

        let features = extract(&ctx);
        assert_eq!(features[2], 1.0);
        assert_eq!(features[5], 1.0);
    }
}
