//! Headless skirmish driver
//!
//! Runs a scripted two-team firefight against a kinematic stub runtime and
//! reports what the decision core did. Useful for smoke-testing tuning
//! changes and for profiling the decision hot path outside the game.

use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use skirmish_ai::actions::ActionKind;
use skirmish_ai::agent::AgentRecord;
use skirmish_ai::brain::EpisodeReport;
use skirmish_ai::memory::persist::{FileStore, MemoryBackedStore, SnapshotStore};
use skirmish_ai::runtime::interface::{
    Combat, Inventory, ItemKind, MoveResult, Movement, Sensing, WeaponSlot,
};
use skirmish_ai::{
    AgentContext, AgentId, DecisionConfig, DecisionEngine, Personality, SimulationContext, Vec3,
};

#[derive(Parser, Debug)]
#[command(name = "skirmish_sim", about = "Headless decision-core skirmish")]
struct Args {
    /// Agents per team
    #[arg(long, default_value_t = 4)]
    team_size: usize,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 120.0)]
    duration: f32,

    /// Fixed frame step in seconds
    #[arg(long, default_value_t = 0.05)]
    dt: f32,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Directory for persisted memory and brain snapshots; in-memory when
    /// omitted
    #[arg(long)]
    persist_dir: Option<PathBuf>,
}

/// Kinematic stub standing in for the game world
struct StubRuntime {
    position: Vec3,
    velocity: Vec3,
    speed: f32,
    shots_fired: u32,
    grenades: u32,
}

impl StubRuntime {
    fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::default(),
            speed: 4.0,
            shots_fired: 0,
            grenades: 1,
        }
    }

    fn step(&mut self, dt: f32) {
        self.position = self.position + self.velocity * (self.speed * dt);
    }
}

impl Sensing for StubRuntime {
    fn has_line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        from.distance(&to) < 40.0
    }
}

impl Movement for StubRuntime {
    fn move_to(&mut self, destination: Vec3) -> MoveResult {
        let to = destination - self.position;
        if to.length() < 0.5 {
            self.velocity = Vec3::default();
            MoveResult::Arrived
        } else {
            self.velocity = to.normalize();
            MoveResult::Moving
        }
    }

    fn move_direct(&mut self, direction: Vec3) {
        self.velocity = direction.normalize();
    }

    fn set_run(&mut self, running: bool) {
        self.speed = if running { 7.0 } else { 4.0 };
    }

    fn dash(&mut self) {}

    fn stop(&mut self) {
        self.velocity = Vec3::default();
    }
}

impl Combat for StubRuntime {
    fn fire_weapon(&mut self) -> bool {
        self.shots_fired += 1;
        true
    }
    fn reload_weapon(&mut self) -> bool {
        true
    }
    fn switch_weapon(&mut self, _slot: WeaponSlot) -> bool {
        true
    }
    fn melee_attack(&mut self) -> bool {
        true
    }
    fn use_item(&mut self, _item: ItemKind) -> bool {
        true
    }
    fn throw_item(&mut self, _item: ItemKind, _at: Vec3) -> bool {
        if self.grenades > 0 {
            self.grenades -= 1;
            true
        } else {
            false
        }
    }
}

impl Inventory for StubRuntime {
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
        self.grenades > 0
    }
}

struct SimAgent {
    context: AgentContext,
    engine: DecisionEngine,
    runtime: StubRuntime,
    team: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = DecisionConfig::default();
    if let Err(reason) = config.validate() {
        eprintln!("invalid configuration: {reason}");
        std::process::exit(1);
    }

    let mut file_store;
    let mut mem_store;
    let store: &mut dyn SnapshotStore = match &args.persist_dir {
        Some(dir) => {
            file_store = FileStore::new(dir.clone());
            &mut file_store
        }
        None => {
            mem_store = MemoryBackedStore::default();
            &mut mem_store
        }
    };

    let mut sim = SimulationContext::new(config, store, "skirmish_flats", args.seed);
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut agents = spawn_teams(&mut sim, &mut rng, args.team_size);
    info!(
        teams = 2,
        per_team = args.team_size,
        duration = args.duration,
        "skirmish starting"
    );

    let mut now = 0.0;
    let mut switches = vec![0u32; ActionKind::ALL.len()];
    while now < args.duration {
        run_frame(&mut sim, &mut agents, now, args.dt, &mut switches);
        now += args.dt;
    }

    report(&sim, &agents, &switches, args.duration);

    // Session teardown persists memory and, if the ratchet allows, the brain
    let episode = EpisodeReport {
        survival_seconds: args.duration,
        kills: agents.iter().map(|a| a.runtime.shots_fired / 50).sum(),
        damage_dealt: agents.iter().map(|a| a.runtime.shots_fired as f32).sum(),
    };
    if sim.brain.report_fitness(episode) {
        skirmish_ai::brain::loader::save_brain(store, &sim.brain);
    }
    sim.memory.save(store, "skirmish_flats");
}

fn spawn_teams(sim: &mut SimulationContext, rng: &mut StdRng, team_size: usize) -> Vec<SimAgent> {
    let mut agents = Vec::new();
    for team in 0..2 {
        let facing = if team == 0 { 1.0 } else { -1.0 };
        let base_x = facing * -30.0;

        let mut ids = Vec::new();
        for i in 0..team_size {
            let id = AgentId::new();
            let position = Vec3::new(base_x, 0.0, i as f32 * 3.0);
            sim.registry.register(AgentRecord {
                id,
                position,
                health_fraction: 1.0,
                is_alive: true,
            });

            let mut context = AgentContext::new(id, position, Personality::roll(rng));
            context.can_chase = true;
            context.has_throwable = true;

            agents.push(SimAgent {
                context,
                engine: DecisionEngine::new(),
                runtime: StubRuntime::new(position),
                team,
            });
            ids.push(id);
        }

        let squad = sim.squads.create_squad(ids[0], ids[1..].to_vec());
        sim.squads
            .set_target(squad, Some(Vec3::new(-base_x, 0.0, 0.0)));
    }
    agents
}

fn run_frame(
    sim: &mut SimulationContext,
    agents: &mut [SimAgent],
    now: f32,
    dt: f32,
    switches: &mut [u32],
) {
    sim.begin_tick(now);
    sim.squads.tick(&sim.registry, &mut sim.memory, now);
    sim.difficulty.update(now);

    // Sensing pass: nearest live enemy becomes the target
    let snapshot: Vec<(AgentId, Vec3, usize)> = agents
        .iter()
        .map(|a| (a.context.self_id, a.runtime.position, a.team))
        .collect();

    for agent in agents.iter_mut() {
        let here = agent.runtime.position;
        agent.context.position = here;

        let nearest = snapshot
            .iter()
            .filter(|(id, _, team)| *team != agent.team && sim.registry.resolve(*id).is_some())
            .min_by(|a, b| {
                here.distance(&a.1)
                    .partial_cmp(&here.distance(&b.1))
                    .expect("distances are finite")
            });

        match nearest {
            Some(&(id, position, _)) => {
                agent.context.target = Some(id);
                agent.context.target_position = Some(position);
                agent.context.target_distance = here.distance(&position);
                agent.context.target_direction = (position - here).normalize();
                if agent.runtime.has_line_of_sight(here, position) {
                    agent.context.note_sighting(position, now);
                } else {
                    agent.context.has_line_of_sight = false;
                }
            }
            None => agent.context.clear_target(),
        }

        agent.context.is_squad_leader = sim.squads.is_leader(agent.context.self_id);
        agent.context.live_squadmates = sim
            .squads
            .live_squadmates(agent.context.self_id, &sim.registry);
        agent.context.squad_order = sim.squads.order_for(agent.context.self_id);
        agent.context.has_throwable = agent.runtime.has_throwable();

        let before = agent.engine.active_action();
        agent
            .engine
            .tick(&mut agent.context, sim, &mut agent.runtime, now, dt);
        let after = agent.engine.active_action();
        if before != after {
            if let Some(kind) = after {
                switches[kind.index()] += 1;
            }
        }

        agent.runtime.step(dt);
        if let Some(record) = sim.registry.resolve_mut(agent.context.self_id) {
            record.position = agent.runtime.position;
        }
    }
}

fn report(sim: &SimulationContext, agents: &[SimAgent], switches: &[u32], duration: f32) {
    let shots: u32 = agents.iter().map(|a| a.runtime.shots_fired).sum();
    info!(duration, shots, "skirmish finished");

    for kind in ActionKind::ALL {
        let count = switches[kind.index()];
        if count > 0 {
            info!(action = kind.name(), entries = count, "action usage");
        }
    }

    info!(
        difficulty = sim.difficulty.score(),
        aggression = sim.difficulty.aggression_multiplier(),
        "difficulty at teardown"
    );
}
