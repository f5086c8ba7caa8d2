//! Game State Definitions
//!
//! Board, creatures, biomes and players.
//! Uses BTreeMap/BTreeSet for deterministic iteration order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::coord::{CoordKey, TilePos};
use crate::core::hash::{StateHash, compute_state_hash};

// =============================================================================
// IDS
// =============================================================================

/// Stable creature identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct CreatureId(pub u32);

/// Player identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// Biome identifier. Equal to the id of the seed node that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct BiomeId(pub u32);

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl fmt::Display for BiomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

// =============================================================================
// BOARD
// =============================================================================

/// Terrain category of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Terrain {
    /// Open grassland
    #[default]
    Meadow = 0,
    /// Woodland
    Forest = 1,
    /// Shallow water
    Marsh = 2,
    /// Dry sand
    Desert = 3,
    /// Bare rock
    Tundra = 4,
}

impl Terrain {
    /// All terrain kinds, in discriminant order.
    pub const ALL: [Terrain; 5] = [
        Terrain::Meadow,
        Terrain::Forest,
        Terrain::Marsh,
        Terrain::Desert,
        Terrain::Tundra,
    ];
}

/// A single board tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    /// Terrain category
    pub terrain: Terrain,
    /// Owning biome (None before generation)
    pub biome: Option<BiomeId>,
    /// Is this the biome's habitat tile?
    pub is_habitat: bool,
}

/// Fixed-size grid of tiles, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Board {
    /// Create a board filled with default tiles.
    ///
    /// Non-positive dimensions produce an empty board.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tiles: vec![Tile::default(); width as usize * height as usize],
        }
    }

    /// Board width.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Board height.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of tiles.
    #[inline]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Is the position on the board?
    #[inline]
    pub fn contains(&self, pos: TilePos) -> bool {
        pos.in_bounds(self.width, self.height)
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        if self.contains(pos) {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    /// Tile at a position.
    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.index(pos).and_then(|idx| self.tiles.get(idx))
    }

    /// Mutable tile at a position.
    pub fn tile_mut(&mut self, pos: TilePos) -> Option<&mut Tile> {
        self.index(pos).and_then(move |idx| self.tiles.get_mut(idx))
    }

    /// Terrain at a position.
    pub fn terrain_at(&self, pos: TilePos) -> Option<Terrain> {
        self.tile(pos).map(|tile| tile.terrain)
    }

    /// Every position, row-major.
    pub fn positions(&self) -> impl Iterator<Item = TilePos> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| TilePos::new(x, y)))
    }

    /// Tiles owned by a biome, row-major.
    pub fn biome_tiles(&self, biome: BiomeId) -> Vec<TilePos> {
        self.positions()
            .filter(|pos| self.tile(*pos).is_some_and(|tile| tile.biome == Some(biome)))
            .collect()
    }
}

// =============================================================================
// CREATURES
// =============================================================================

/// Lifecycle of a creature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Unhatched egg
    Dormant,
    /// Hatched and playable
    #[default]
    Active,
}

/// Horizontal facing, used by presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing left
    Left,
    /// Facing right
    #[default]
    Right,
}

impl Facing {
    /// Facing after stepping from `from_x` to `to_x`.
    ///
    /// Right when x strictly increases, left when it decreases.
    /// A purely vertical step keeps the current facing.
    #[inline]
    pub fn after_step(self, from_x: i32, to_x: i32) -> Self {
        match to_x.cmp(&from_x) {
            std::cmp::Ordering::Greater => Facing::Right,
            std::cmp::Ordering::Less => Facing::Left,
            std::cmp::Ordering::Equal => self,
        }
    }
}

/// A creature occupying a tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    /// Stable unique id
    pub id: CreatureId,
    /// Species name
    pub species: String,
    /// Owning player
    pub owner: PlayerId,
    /// Current tile
    pub position: TilePos,
    /// Tile before the last move
    pub previous_position: TilePos,
    /// Dormant egg or active creature
    pub lifecycle: Lifecycle,
    /// Hit points; zero or below means dead
    pub vitality: i32,
    /// Has this creature acted this turn?
    pub has_moved: bool,
    /// Horizontal facing
    pub facing: Facing,
}

impl Creature {
    /// Create an active creature.
    pub fn new(
        id: CreatureId,
        species: impl Into<String>,
        owner: PlayerId,
        position: TilePos,
        vitality: i32,
    ) -> Self {
        Self {
            id,
            species: species.into(),
            owner,
            position,
            previous_position: position,
            lifecycle: Lifecycle::Active,
            vitality,
            has_moved: false,
            facing: Facing::Right,
        }
    }

    /// Create a dormant egg.
    pub fn egg(
        id: CreatureId,
        species: impl Into<String>,
        owner: PlayerId,
        position: TilePos,
        vitality: i32,
    ) -> Self {
        Self {
            lifecycle: Lifecycle::Dormant,
            ..Self::new(id, species, owner, position, vitality)
        }
    }

    /// Is the creature active?
    #[inline]
    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// Is the creature alive?
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.vitality > 0
    }
}

/// Egg index: dormant creature id to its tile.
pub type EggIndex = BTreeMap<CreatureId, TilePos>;

// =============================================================================
// BIOMES & PLAYERS
// =============================================================================

/// A biome: the territory of one partition node.
///
/// Its tiles live on the board (`Tile::biome`), not here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Biome {
    /// Biome id
    pub id: BiomeId,
    /// Owning player (None = unclaimed)
    pub owner: Option<PlayerId>,
    /// Anchor tile
    pub habitat: TilePos,
    /// Accumulated lushness, grown elsewhere
    pub lushness: u32,
    /// Dominant terrain
    pub terrain: Terrain,
}

impl Biome {
    /// Create an unclaimed biome.
    pub fn new(id: BiomeId, habitat: TilePos, terrain: Terrain) -> Self {
        Self {
            id,
            owner: None,
            habitat,
            lushness: 0,
            terrain,
        }
    }
}

/// Per-player fog-of-war state.
pub type VisibleSet = BTreeSet<CoordKey>;

/// A player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player id
    pub id: PlayerId,
    /// Display colour (0xRRGGBB)
    pub color: u32,
    /// Currently visible tiles
    pub visible: VisibleSet,
}

impl Player {
    /// Create a player with nothing visible.
    pub fn new(id: PlayerId, color: u32) -> Self {
        Self {
            id,
            color,
            visible: VisibleSet::new(),
        }
    }
}

// =============================================================================
// READ ACCESS
// =============================================================================

/// Narrow read interface over game state.
///
/// The resolver and visibility engine only ever read through this.
pub trait StateView {
    /// The board, if generated.
    fn board(&self) -> Option<&Board>;
    /// All creatures, eggs included.
    fn creatures(&self) -> &[Creature];
    /// Dormant creature index.
    fn eggs(&self) -> &EggIndex;
    /// All biomes.
    fn biomes(&self) -> &BTreeMap<BiomeId, Biome>;
    /// Players in turn order.
    fn players(&self) -> &[Player];
    /// Player whose turn it is.
    fn active_player(&self) -> PlayerId;

    /// Look up a creature.
    fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures().iter().find(|c| c.id == id)
    }

    /// Look up a player.
    fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players().iter().find(|p| p.id == id)
    }

    /// Is the creature indexed as an egg?
    fn is_egg(&self, id: CreatureId) -> bool {
        self.eggs().contains_key(&id)
    }
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Complete game state.
///
/// Owned by the caller; simulation functions read it through [`StateView`]
/// and hand back new values for the caller to commit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Board (None before generation)
    pub board: Option<Board>,
    /// All creatures
    pub creatures: Vec<Creature>,
    /// Eggs
    pub eggs: EggIndex,
    /// Biomes by id
    pub biomes: BTreeMap<BiomeId, Biome>,
    /// Players in turn order
    pub players: Vec<Player>,
    /// Whose turn it is
    pub active_player: PlayerId,
    /// Turn counter, starting at 1
    pub turn: u32,
}

impl GameState {
    /// Create a state on a generated board.
    pub fn new(board: Board, biomes: BTreeMap<BiomeId, Biome>, players: Vec<Player>) -> Self {
        let active_player = players.first().map(|p| p.id).unwrap_or_default();
        Self {
            board: Some(board),
            creatures: Vec::new(),
            eggs: EggIndex::new(),
            biomes,
            players,
            active_player,
            turn: 1,
        }
    }

    /// Add an active creature.
    pub fn add_creature(&mut self, creature: Creature) {
        self.creatures.push(creature);
    }

    /// Add a dormant creature and index it as an egg.
    pub fn lay_egg(&mut self, egg: Creature) {
        self.eggs.insert(egg.id, egg.position);
        self.creatures.push(egg);
    }

    /// Next unused creature id.
    pub fn next_creature_id(&self) -> CreatureId {
        let max = self.creatures.iter().map(|c| c.id.0).max();
        CreatureId(max.map_or(0, |id| id + 1))
    }

    /// Mutable player lookup.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Replace a player's visible set.
    pub fn set_visible(&mut self, id: PlayerId, visible: VisibleSet) {
        if let Some(player) = self.player_mut(id) {
            player.visible = visible;
        }
    }

    /// Biomes owned by a player.
    pub fn biomes_owned_by(&self, id: PlayerId) -> impl Iterator<Item = &Biome> {
        self.biomes.values().filter(move |b| b.owner == Some(id))
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.turn, self.active_player.0, |hasher| {
            if let Some(board) = &self.board {
                hasher.update_i32(board.width());
                hasher.update_i32(board.height());
                for pos in board.positions() {
                    if let Some(tile) = board.tile(pos) {
                        hasher.update_u8(tile.terrain as u8);
                        hasher.update_opt_u32(tile.biome.map(|b| b.0));
                        hasher.update_bool(tile.is_habitat);
                    }
                }
            }

            // Creatures in list order; order is part of the state
            for creature in &self.creatures {
                hasher.update_u32(creature.id.0);
                hasher.update_str(&creature.species);
                hasher.update_u32(creature.owner.0);
                hasher.update_pos(creature.position);
                hasher.update_pos(creature.previous_position);
                hasher.update_bool(creature.is_active());
                hasher.update_i32(creature.vitality);
                hasher.update_bool(creature.has_moved);
                hasher.update_bool(creature.facing == Facing::Right);
            }

            for (id, pos) in &self.eggs {
                hasher.update_u32(id.0);
                hasher.update_pos(*pos);
            }

            for biome in self.biomes.values() {
                hasher.update_u32(biome.id.0);
                hasher.update_opt_u32(biome.owner.map(|p| p.0));
                hasher.update_pos(biome.habitat);
                hasher.update_u32(biome.lushness);
                hasher.update_u8(biome.terrain as u8);
            }

            for player in &self.players {
                hasher.update_u32(player.id.0);
                hasher.update_u32(player.color);
                hasher.update_u32(player.visible.len() as u32);
                for key in &player.visible {
                    hasher.update_u64(key.raw());
                }
            }
        })
    }
}

impl StateView for GameState {
    fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    fn eggs(&self) -> &EggIndex {
        &self.eggs
    }

    fn biomes(&self) -> &BTreeMap<BiomeId, Biome> {
        &self.biomes
    }

    fn players(&self) -> &[Player] {
        &self.players
    }

    fn active_player(&self) -> PlayerId {
        self.active_player
    }
}

// =============================================================================
// TESTS
// =============================================================================
