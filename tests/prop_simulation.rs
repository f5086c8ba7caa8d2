//! Property-based tests for movement, partitioning and visibility.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use proptest::prelude::*;

use habitat::core::coord::TilePos;
use habitat::game::collision::find_overlaps;
use habitat::game::partition::{generate_partition, Node};
use habitat::game::state::{BiomeId, Board, Creature, CreatureId, GameState, Player, PlayerId};
use habitat::game::visibility::{FogMask, VisibilityEngine};
use habitat::game::{move_animal, NoEffect};
use habitat::DeterministicRng;

/// Board with `count` creatures on distinct tiles, placed from `seed`.
fn scattered(width: i32, height: i32, count: usize, seed: u64) -> GameState {
    let mut rng = DeterministicRng::new(seed);
    let mut tiles: Vec<TilePos> = Board::new(width, height).positions().collect();
    rng.shuffle(&mut tiles);

    let players = vec![Player::new(PlayerId(0), 0)];
    let mut state = GameState::new(Board::new(width, height), BTreeMap::new(), players);
    for (i, pos) in tiles.into_iter().take(count).enumerate() {
        state.add_creature(Creature::new(CreatureId(i as u32), "newt", PlayerId(0), pos, 3));
    }
    state
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// With few enough creatures a free landing tile always exists, so a
    /// resolved move never leaves two creatures on one tile.
    #[test]
    fn prop_move_keeps_exclusivity_and_bounds(
        width in 2i32..9,
        height in 2i32..9,
        count in 1usize..5,
        seed in any::<u64>(),
        mover in 0u32..4,
        tx in 0i32..9,
        ty in 0i32..9,
    ) {
        let state = scattered(width, height, count, seed);
        let mover = CreatureId(mover % count as u32);
        let target = TilePos::new(tx % width, ty % height);

        let outcome = move_animal(mover, target, &state, &NoEffect);

        prop_assert_eq!(outcome.creatures.len(), count);
        prop_assert!(find_overlaps(&outcome.creatures, &state.eggs).is_empty());
        prop_assert!(outcome.creatures.iter().all(|c| c.position.in_bounds(width, height)));

        let moved = outcome.creatures.iter().find(|c| c.id == mover).unwrap();
        prop_assert_eq!(moved.position, target);

        if let Some(event) = outcome.displacement {
            prop_assert_ne!(event.to, target);
            let at_landing = outcome.creatures.iter().filter(|c| c.position == event.to).count();
            prop_assert_eq!(at_landing, 1);
        }
    }

    /// Every tile is assigned, to a nearest node, and ties go to the earliest node.
    #[test]
    fn prop_partition_total_and_first_wins(
        width in 1i32..14,
        height in 1i32..14,
        raw in prop::collection::vec((0i32..14, 0i32..14), 1..7),
    ) {
        let nodes: Vec<Node> = raw
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Node::new(BiomeId(i as u32), TilePos::new(x % width, y % height)))
            .collect();
        let map = generate_partition(width, height, &nodes);

        prop_assert!(map.is_resolved());
        for y in 0..height {
            for x in 0..width {
                let pos = TilePos::new(x, y);
                let best = nodes.iter().map(|n| n.position.manhattan(pos)).min().unwrap();
                let expected = nodes.iter().find(|n| n.position.manhattan(pos) == best).unwrap().id;
                prop_assert_eq!(map.get(pos), Some(expected));
            }
        }
    }

    /// Revealing the same block twice changes nothing the second time.
    #[test]
    fn prop_reveal_around_idempotent(
        width in 1i32..10,
        height in 1i32..10,
        cx in 0i32..10,
        cy in 0i32..10,
    ) {
        let players = vec![Player::new(PlayerId(0), 0)];
        let mut state = GameState::new(Board::new(width, height), BTreeMap::new(), players);
        let center = TilePos::new(cx % width, cy % height);
        let mut fog = FogMask::new();

        let first = VisibilityEngine::new(&state)
            .reveal_around(PlayerId(0), center, &mut fog)
            .unwrap();
        let after_first = first.visible.clone();
        first.commit(&mut state);
        let second = VisibilityEngine::new(&state)
            .reveal_around(PlayerId(0), center, &mut fog)
            .unwrap();

        prop_assert_eq!(&second.visible, &after_first);
        prop_assert!(second.delta.is_none());
        prop_assert!(after_first.iter().all(|key| key.to_pos().in_bounds(width, height)));
        prop_assert!(after_first.len() <= 9);
    }
}
