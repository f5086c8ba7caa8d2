//! Habitat Simulation Runner
//!
//! Generates a map, plays a few scripted rounds headless, and verifies that
//! replaying the recorded actions reproduces the same state hash.

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use habitat::{
    SimConfig, DeterministicRng, IsoProjection, TilePos, VERSION,
    game::{
        events::GameEventData,
        mapgen::setup_game,
        state::{GameState, StateView},
        turn::{apply_action, replay_actions, TurnAction},
        visibility::{FogMask, FogSubscription, VisibilityEngine},
        HatchInPlace, TerrainHazard,
    },
};

/// Rounds played by the demo (one round = every player takes a turn).
const DEMO_ROUNDS: u32 = 4;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Habitat Simulation v{}", VERSION);

    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load_from_path(&path)?,
        None => SimConfig::default(),
    };
    info!(
        "Board {}x{}, {} nodes, {} players, seed {}",
        config.board_width, config.board_height, config.node_count, config.players, config.seed
    );

    demo_game(&config)
}

/// One step toward the board centre.
fn step_toward_center(state: &GameState, from: TilePos) -> Option<TilePos> {
    let board = state.board()?;
    let center = TilePos::new(board.width() / 2, board.height() / 2);
    let next = from.offset((center.x - from.x).signum(), (center.y - from.y).signum());
    (next != from).then_some(next)
}

/// Actions the active player takes this turn: hatch every egg, then step
/// every ready creature toward the centre.
fn scripted_turn(state: &GameState) -> Vec<TurnAction> {
    let player = state.active_player();
    let mut actions: Vec<TurnAction> = state
        .eggs()
        .keys()
        .filter(|id| state.creature(**id).is_some_and(|c| c.owner == player))
        .map(|egg| TurnAction::Hatch { egg: *egg })
        .collect();

    actions.extend(
        state
            .creatures()
            .iter()
            .filter(|c| c.owner == player && c.is_active() && !c.has_moved)
            .filter_map(|c| {
                step_toward_center(state, c.position)
                    .map(|target| TurnAction::Move { creature: c.id, target })
            }),
    );
    actions
}

/// Demo function to exercise the simulation.
fn demo_game(config: &SimConfig) -> Result<()> {
    info!("=== Generating Map ===");

    let mut rng = DeterministicRng::new(config.seed);
    let mut state = setup_game(config, &mut rng)?;
    let initial = state.clone();

    let mut fog = FogMask::new();
    let mut subscription = FogSubscription::new();
    if let Some(update) = VisibilityEngine::new(&state).initialize_visibility(&mut fog) {
        update.commit(&mut state);
    }
    VisibilityEngine::new(&state).toggle_fog_of_war(config.fog_enabled, &mut fog);
    if let Some(player) = state.player(state.active_player) {
        subscription.sync(&player.visible, &mut fog);
    }

    let effect = TerrainHazard::default();
    let hatcher = HatchInPlace;
    let mut recorded: Vec<TurnAction> = Vec::new();

    info!("=== Playing {} Rounds ===", DEMO_ROUNDS);

    while state.turn <= DEMO_ROUNDS {
        let mut actions = scripted_turn(&state);
        actions.push(TurnAction::EndTurn);

        for action in actions {
            let result = apply_action(&mut state, action, &effect, &hatcher);
            if !result.accepted {
                continue;
            }
            recorded.push(action);

            for event in &result.events {
                match &event.data {
                    GameEventData::Displaced(moved) => {
                        info!(
                            "Turn {}: {} pushed {} -> {}",
                            event.turn, moved.creature, moved.from, moved.to
                        );
                    }
                    GameEventData::Hatched { egg, biome, .. } => {
                        info!("Turn {}: {} hatched in {:?}", event.turn, egg, biome);
                    }
                    GameEventData::BiomeCaptured { biome, player, previous_owner } => {
                        info!(
                            "Turn {}: {} captured {} from {:?}",
                            event.turn, player, biome, previous_owner
                        );
                    }
                    GameEventData::TurnEnded { .. } => {}
                }
            }
        }

        if let Some(player) = state.player(state.active_player) {
            if let Some(delta) = subscription.sync(&player.visible, &mut fog) {
                info!(
                    "Fog for {}: +{} -{} tiles",
                    player.id,
                    delta.added.len(),
                    delta.removed.len()
                );
            }
        }
    }

    // Print final results
    info!("=== Final Positions ===");
    let projection = IsoProjection::default();
    for creature in state.creatures() {
        let (sx, sy) = projection.to_screen(creature.position);
        info!(
            "{} ({}) of {} at {} screen ({}, {}) vitality {}",
            creature.id,
            creature.species,
            creature.owner,
            creature.position,
            sx,
            sy,
            creature.vitality
        );
    }
    for player in state.players() {
        let owned = state.biomes_owned_by(player.id).count();
        info!("{}: {} biomes, {} visible tiles", player.id, owned, player.visible.len());
    }

    let hash = state.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    info!("Recorded actions: {}", recorded.len());

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let mut replay_initial = initial;
    let replay_engine = VisibilityEngine::new(&replay_initial);
    if let Some(update) = replay_engine.initialize_visibility(&mut FogMask::new()) {
        update.commit(&mut replay_initial);
    }
    let (replay_hash, _) = replay_actions(&replay_initial, &recorded, &effect, &hatcher);
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash {
        bail!("DETERMINISM FAILURE: Hashes differ!");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}
