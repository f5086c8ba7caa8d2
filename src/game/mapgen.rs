//! Map Generation
//!
//! Seeds biome nodes with spacing rejection, partitions the board around
//! them, and lays out the starting game.

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::core::coord::{adjacent, TilePos};
use crate::core::rng::DeterministicRng;
use crate::error::GenerationError;
use crate::game::partition::{generate_partition, is_within_spacing, Node};
use crate::game::state::{
    Biome, BiomeId, Board, Creature, GameState, Player, PlayerId, Terrain,
};

/// Player colours, assigned in turn order and cycled.
pub const PLAYER_COLORS: [u32; 4] = [0xE0_5A_47, 0x4A_90_D9, 0xF2_C1_4E, 0x7B_C6_7E];

/// Species given to starting creatures.
pub const STARTER_SPECIES: &str = "sprout";

/// Output of map generation.
#[derive(Clone, Debug)]
pub struct GeneratedMap {
    /// Board with terrain, biome assignment and habitat flags
    pub board: Board,
    /// Unclaimed biomes, one per node
    pub biomes: BTreeMap<BiomeId, Biome>,
    /// Seed nodes in placement order
    pub nodes: Vec<Node>,
}

/// Draw `count` seed nodes at least `spacing` apart (Manhattan).
///
/// Candidates closer than `spacing` to an accepted node are rejected, and a
/// tile already holding a node is always rejected, even with zero spacing.
/// Node ids are assigned in acceptance order starting at 0.
pub fn sample_nodes(
    width: i32,
    height: i32,
    count: usize,
    spacing: u32,
    attempts: u32,
    rng: &mut DeterministicRng,
) -> Result<Vec<Node>, GenerationError> {
    if width <= 0 || height <= 0 {
        return Err(GenerationError::InvalidBoard { width, height });
    }

    let mut nodes: Vec<Node> = Vec::with_capacity(count);
    let mut spent = 0;

    while nodes.len() < count && spent < attempts {
        spent += 1;
        let candidate = rng.random_tile(width, height);
        if is_within_spacing(candidate, &nodes, spacing.max(1)) {
            continue;
        }
        nodes.push(Node::new(BiomeId(nodes.len() as u32), candidate));
    }

    if nodes.len() < count {
        return Err(GenerationError::SamplerExhausted {
            requested: count,
            placed: nodes.len(),
            attempts: spent,
        });
    }

    debug!("Sampled {} nodes in {} draws", nodes.len(), spent);
    Ok(nodes)
}

/// Generate a board and its biomes from config.
pub fn generate_map(
    config: &SimConfig,
    rng: &mut DeterministicRng,
) -> Result<GeneratedMap, GenerationError> {
    let nodes = sample_nodes(
        config.board_width,
        config.board_height,
        config.node_count,
        config.min_node_spacing,
        config.sampler_attempts,
        rng,
    )?;

    build_map(config.board_width, config.board_height, nodes, rng)
}

/// Partition a board around given nodes and build its biomes.
pub fn build_map(
    width: i32,
    height: i32,
    nodes: Vec<Node>,
    rng: &mut DeterministicRng,
) -> Result<GeneratedMap, GenerationError> {
    if width <= 0 || height <= 0 {
        return Err(GenerationError::InvalidBoard { width, height });
    }

    let partition = generate_partition(width, height, &nodes);
    partition.resolve()?;

    let mut board = Board::new(width, height);
    partition.apply_to(&mut board);

    let mut biomes = BTreeMap::new();
    for node in &nodes {
        let terrain = rng.choose(&Terrain::ALL).copied().unwrap_or_default();
        biomes.insert(node.id, Biome::new(node.id, node.position, terrain));
    }

    for pos in board.positions().collect::<Vec<_>>() {
        let biome = board.tile(pos).and_then(|tile| tile.biome);
        let terrain = biome.and_then(|id| biomes.get(&id)).map(|b| b.terrain);
        if let (Some(tile), Some(terrain)) = (board.tile_mut(pos), terrain) {
            tile.terrain = terrain;
        }
    }

    for node in &nodes {
        if let Some(tile) = board.tile_mut(node.position) {
            tile.is_habitat = true;
        }
    }

    Ok(GeneratedMap { board, biomes, nodes })
}

/// Build a ready-to-play game.
///
/// Player `i` owns biome `i` (when there is one) and starts with a creature
/// on its habitat plus an egg beside it. Eggs never go on a habitat tile.
pub fn setup_game(
    config: &SimConfig,
    rng: &mut DeterministicRng,
) -> Result<GameState, GenerationError> {
    let GeneratedMap { board, mut biomes, nodes } = generate_map(config, rng)?;

    let players: Vec<Player> = (0..config.players)
        .map(|i| Player::new(PlayerId(i), PLAYER_COLORS[i as usize % PLAYER_COLORS.len()]))
        .collect();

    let mut starts: Vec<(PlayerId, TilePos)> = Vec::new();
    for (player, node) in players.iter().zip(nodes.iter()) {
        if let Some(biome) = biomes.get_mut(&node.id) {
            biome.owner = Some(player.id);
        }
        starts.push((player.id, node.position));
    }

    let (width, height) = (board.width(), board.height());
    let mut state = GameState::new(board, biomes, players);

    for &(owner, habitat) in &starts {
        let id = state.next_creature_id();
        let vitality = config.starting_vitality;
        state.add_creature(Creature::new(id, STARTER_SPECIES, owner, habitat, vitality));

        let nest = adjacent(habitat, width, height).into_iter().find(|pos| {
            !starts.iter().any(|(_, start)| start == pos)
                && !state.creatures.iter().any(|c| c.position == *pos)
        });
        if let Some(nest) = nest {
            let id = state.next_creature_id();
            state.lay_egg(Creature::egg(id, STARTER_SPECIES, owner, nest, vitality));
        }
    }

    info!(
        "Generated {}x{} board with {} biomes for {} players",
        width,
        height,
        state.biomes.len(),
        state.players.len()
    );

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::collision::find_overlaps;

    #[test]
    fn test_sampler_respects_spacing() {
        let mut rng = DeterministicRng::new(99);
        let nodes = sample_nodes(20, 20, 6, 5, 1000, &mut rng).unwrap();
        assert_eq!(nodes.len(), 6);
        for (i, a) in nodes.iter().enumerate() {
            assert_eq!(a.id, BiomeId(i as u32));
            for b in nodes.iter().skip(i + 1) {
                assert!(a.position.manhattan(b.position) >= 5);
            }
        }
    }

    #[test]
    fn test_sampler_exhausts() {
        let mut rng = DeterministicRng::new(1);
        // A 3x3 board cannot hold two nodes 5 apart (max distance is 4)
        let err = sample_nodes(3, 3, 2, 5, 200, &mut rng).unwrap_err();
        assert_eq!(
            err,
            GenerationError::SamplerExhausted { requested: 2, placed: 1, attempts: 200 }
        );
    }

    #[test]
    fn test_sampler_rejects_empty_board() {
        let mut rng = DeterministicRng::new(1);
        let err = sample_nodes(0, 4, 1, 5, 10, &mut rng).unwrap_err();
        assert_eq!(err, GenerationError::InvalidBoard { width: 0, height: 4 });
    }

    #[test]
    fn test_generate_map_is_total_and_deterministic() {
        let config = SimConfig::default();
        let a = generate_map(&config, &mut DeterministicRng::new(config.seed)).unwrap();
        let b = generate_map(&config, &mut DeterministicRng::new(config.seed)).unwrap();

        assert_eq!(a.board, b.board);
        assert_eq!(a.nodes, b.nodes);
        let assigned = |pos| a.board.tile(pos).is_some_and(|t| t.biome.is_some());
        assert!(a.board.positions().all(assigned));

        for node in &a.nodes {
            let tile = a.board.tile(node.position).unwrap();
            assert!(tile.is_habitat);
            assert_eq!(tile.biome, Some(node.id));
            assert_eq!(a.biomes[&node.id].habitat, node.position);
        }
    }

    #[test]
    fn test_build_map_without_nodes_fails() {
        let mut rng = DeterministicRng::new(3);
        let err = build_map(4, 4, Vec::new(), &mut rng).unwrap_err();
        assert_eq!(err, GenerationError::NoNodes);
    }

    #[test]
    fn test_zero_spacing_never_stacks_nodes() {
        let mut rng = DeterministicRng::new(0);
        let nodes = sample_nodes(2, 1, 2, 0, 100, &mut rng).unwrap();
        assert_ne!(nodes[0].position, nodes[1].position);
    }

    #[test]
    fn test_setup_with_zero_spacing_has_no_overlaps() {
        let config = SimConfig {
            board_width: 2,
            board_height: 1,
            node_count: 2,
            min_node_spacing: 0,
            ..SimConfig::default()
        };
        for seed in 0..8 {
            let state = setup_game(&config, &mut DeterministicRng::new(seed)).unwrap();
            assert!(find_overlaps(&state.creatures, &state.eggs).is_empty());
            assert_eq!(state.creatures.iter().filter(|c| c.is_active()).count(), 2);
            for biome in state.biomes.values() {
                let board = state.board.as_ref().unwrap();
                assert!(!board.biome_tiles(biome.id).is_empty());
            }
            // Both tiles are habitats, so there is nowhere to nest
            assert!(state.eggs.is_empty());
        }
    }

    #[test]
    fn test_setup_game() {
        let config = SimConfig::default();
        let state = setup_game(&config, &mut DeterministicRng::new(config.seed)).unwrap();

        assert_eq!(state.players.len(), 2);
        assert_eq!(state.active_player, PlayerId(0));
        assert_eq!(state.turn, 1);
        for player in &state.players {
            assert_eq!(state.biomes_owned_by(player.id).count(), 1);
            assert!(state.creatures.iter().any(|c| c.owner == player.id && c.is_active()));
        }
        assert_eq!(state.eggs.len(), 2);
    }
}
