//! Decision hot-path benchmarks
//!
//! The per-tick budget is shared across dozens of agents, so the scoring
//! pipeline is measured in isolation and end to end.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use skirmish_ai::actions::{evaluate, ActionKind, ActionSet};
use skirmish_ai::brain::{features, NeuralNet, INPUT_SIZE};
use skirmish_ai::decision::blend;
use skirmish_ai::{AgentContext, AgentId, DecisionConfig, Personality, Vec3};

fn combat_context() -> AgentContext {
    let mut rng = StdRng::seed_from_u64(7);
    let mut ctx = AgentContext::new(
        AgentId::new(),
        Vec3::new(10.0, 0.0, 10.0),
        Personality::roll(&mut rng),
    );
    ctx.target = Some(AgentId::new());
    ctx.target_position = Some(Vec3::new(25.0, 0.0, 10.0));
    ctx.target_distance = 15.0;
    ctx.target_direction = Vec3::new(1.0, 0.0, 0.0);
    ctx.has_line_of_sight = true;
    ctx.pressure = 1.5;
    ctx.health_fraction = 0.7;
    ctx.can_chase = true;
    ctx.has_throwable = true;
    ctx
}

fn bench_rule_scoring(c: &mut Criterion) {
    let ctx = combat_context();
    let set = ActionSet::new();
    let mut out = vec![0.0; ActionKind::ALL.len()];

    c.bench_function("rule_scoring_all_actions", |b| {
        b.iter(|| {
            evaluate::evaluate_all(black_box(&ctx), &set, 30.0, 1.0, &mut out);
            black_box(&out);
        })
    });
}

fn bench_neural_forward(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let net = NeuralNet::random(vec![INPUT_SIZE, 16, ActionKind::ALL.len()], &mut rng);
    let ctx = combat_context();
    let inputs = features::extract(&ctx);

    c.bench_function("neural_feed_forward", |b| {
        b.iter(|| black_box(net.feed_forward(black_box(&inputs))))
    });
}

fn bench_full_scoring_pass(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let net = NeuralNet::random(vec![INPUT_SIZE, 16, ActionKind::ALL.len()], &mut rng);
    let ctx = combat_context();
    let set = ActionSet::new();
    let config = DecisionConfig::default();

    let mut rule = vec![0.0; ActionKind::ALL.len()];
    let mut blended = vec![0.0; ActionKind::ALL.len()];

    c.bench_function("full_scoring_pass", |b| {
        b.iter(|| {
            evaluate::evaluate_all(black_box(&ctx), &set, 30.0, 1.0, &mut rule);
            let neural = net.feed_forward(&features::extract(&ctx));
            blend::blend_all(&rule, &neural, &ctx, 120.0, &config, &mut blended);
            black_box(&blended);
        })
    });
}

criterion_group!(
    benches,
    bench_rule_scoring,
    bench_neural_forward,
    bench_full_scoring_pass
);
criterion_main!(benches);
