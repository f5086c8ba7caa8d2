//! Visibility Engine
//!
//! Computes each player's visible-tile set and the minimal changes the fog
//! renderer needs to see. Visible sets live on [`Player`]; the engine only
//! reads state and hands back updates for the caller to commit.
//!
//! ## Visible set
//!
//! ```text
//! visible(p) = ⋃ 3x3(c)      for c owned by p, active, not an egg
//!            ∪ tiles(b)      for b owned by p
//! ```
//!
//! Everything is clipped to the board. Keys come from [`coord_key`].

use tracing::{debug, trace};

use crate::core::coord::{coord_key, dedup_positions, key_set, neighborhood, TilePos};
use crate::game::state::{BiomeId, GameState, Player, PlayerId, StateView, VisibleSet};

// =============================================================================
// RENDERER CONTRACT
// =============================================================================

/// Fog layer of the presentation side.
///
/// Implementations must tolerate revealing an already-visible tile and hiding
/// an already-hidden one.
pub trait FogRenderer {
    /// Lift fog from these tiles.
    fn reveal_tiles(&mut self, tiles: &[TilePos]);
    /// Put fog back on these tiles.
    fn hide_tiles(&mut self, tiles: &[TilePos]);
    /// Fog the whole board.
    fn cover_all(&mut self);
    /// Remove all fog.
    fn clear_all(&mut self);
}

/// In-memory fog layer.
///
/// Used headless and by tests to observe what a renderer would show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FogMask {
    covered: bool,
    revealed: VisibleSet,
    batches: usize,
}

impl Default for FogMask {
    fn default() -> Self {
        Self::new()
    }
}

impl FogMask {
    /// Fully fogged mask.
    pub fn new() -> Self {
        Self {
            covered: true,
            revealed: VisibleSet::new(),
            batches: 0,
        }
    }

    /// Is fog drawn at all?
    pub fn is_covered(&self) -> bool {
        self.covered
    }

    /// Can the tile be seen through the fog?
    pub fn is_visible(&self, pos: TilePos) -> bool {
        !self.covered || self.revealed.contains(&coord_key(pos))
    }

    /// Tiles revealed through the fog.
    pub fn revealed(&self) -> &VisibleSet {
        &self.revealed
    }

    /// Number of reveal/hide batches received.
    pub fn batches(&self) -> usize {
        self.batches
    }
}

impl FogRenderer for FogMask {
    fn reveal_tiles(&mut self, tiles: &[TilePos]) {
        self.batches += 1;
        self.revealed.extend(tiles.iter().copied().map(coord_key));
    }

    fn hide_tiles(&mut self, tiles: &[TilePos]) {
        self.batches += 1;
        for pos in tiles {
            self.revealed.remove(&coord_key(*pos));
        }
    }

    fn cover_all(&mut self) {
        self.covered = true;
        self.revealed.clear();
    }

    fn clear_all(&mut self) {
        self.covered = false;
        self.revealed.clear();
    }
}

// =============================================================================
// DIFF
// =============================================================================

/// Tiles that changed between two visible sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibilityDelta {
    /// new - old
    pub added: Vec<TilePos>,
    /// old - new
    pub removed: Vec<TilePos>,
}

/// Diff two visible sets by coordinate key.
///
/// Returns None when the sets are equal.
pub fn diff_visibility(old: &VisibleSet, new: &VisibleSet) -> Option<VisibilityDelta> {
    if old == new {
        return None;
    }
    Some(VisibilityDelta {
        added: new.difference(old).map(|key| key.to_pos()).collect(),
        removed: old.difference(new).map(|key| key.to_pos()).collect(),
    })
}

/// Presentation-side subscription that forwards only changed tiles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FogSubscription {
    last: VisibleSet,
}

impl FogSubscription {
    /// Subscription that has pushed nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last set pushed to the renderer.
    pub fn last(&self) -> &VisibleSet {
        &self.last
    }

    /// Push the difference between the last set and `visible`.
    pub fn sync<R>(&mut self, visible: &VisibleSet, renderer: &mut R) -> Option<VisibilityDelta>
    where
        R: FogRenderer + ?Sized,
    {
        let delta = diff_visibility(&self.last, visible)?;
        if !delta.added.is_empty() {
            renderer.reveal_tiles(&delta.added);
        }
        if !delta.removed.is_empty() {
            renderer.hide_tiles(&delta.removed);
        }
        trace!("Fog sync: +{} -{}", delta.added.len(), delta.removed.len());
        self.last = visible.clone();
        Some(delta)
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// A player's new visible set, ready to commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibilityUpdate {
    /// Player the set belongs to
    pub player: PlayerId,
    /// Full visible set after the update
    pub visible: VisibleSet,
    /// Change against the stored set (None = unchanged)
    pub delta: Option<VisibilityDelta>,
}

impl VisibilityUpdate {
    fn new(player: PlayerId, old: &VisibleSet, visible: VisibleSet) -> Self {
        let delta = diff_visibility(old, &visible);
        Self { player, visible, delta }
    }

    /// Store the set on the player.
    pub fn commit(self, state: &mut GameState) {
        state.set_visible(self.player, self.visible);
    }
}

/// Read-only visibility computations over a state snapshot.
pub struct VisibilityEngine<'s, S: StateView + ?Sized> {
    state: &'s S,
}

impl<'s, S: StateView + ?Sized> VisibilityEngine<'s, S> {
    /// Engine over a snapshot.
    pub fn new(state: &'s S) -> Self {
        Self { state }
    }

    fn stored(&self, player: PlayerId) -> Option<&'s Player> {
        self.state.player(player)
    }

    /// Reveal the 3x3 block around `center` for `player`.
    ///
    /// The renderer receives exactly the clipped, deduplicated block. The
    /// update is the stored set plus that block. None if the board or the
    /// player is missing.
    pub fn reveal_around<R>(
        &self,
        player: PlayerId,
        center: TilePos,
        renderer: &mut R,
    ) -> Option<VisibilityUpdate>
    where
        R: FogRenderer + ?Sized,
    {
        let board = self.state.board()?;
        let stored = self.stored(player)?;

        let tiles = dedup_positions(neighborhood(center, board.width(), board.height()));
        if !tiles.is_empty() {
            renderer.reveal_tiles(&tiles);
        }

        let mut visible = stored.visible.clone();
        visible.extend(tiles.iter().copied().map(coord_key));
        Some(VisibilityUpdate::new(player, &stored.visible, visible))
    }

    /// Reveal every tile of `biome` for `player`.
    ///
    /// A biome with no tiles is a no-op: no notification and None.
    pub fn reveal_biome_tiles<R>(
        &self,
        player: PlayerId,
        biome: BiomeId,
        renderer: &mut R,
    ) -> Option<VisibilityUpdate>
    where
        R: FogRenderer + ?Sized,
    {
        let board = self.state.board()?;
        let stored = self.stored(player)?;

        let tiles = board.biome_tiles(biome);
        if tiles.is_empty() {
            debug!("Biome {} owns no tiles; nothing to reveal", biome);
            return None;
        }
        renderer.reveal_tiles(&tiles);

        let mut visible = stored.visible.clone();
        visible.extend(tiles.iter().copied().map(coord_key));
        Some(VisibilityUpdate::new(player, &stored.visible, visible))
    }

    /// Recompute a player's visible set from scratch.
    pub fn compute_visible(&self, player: PlayerId) -> VisibleSet {
        let Some(board) = self.state.board() else {
            return VisibleSet::new();
        };
        let (width, height) = (board.width(), board.height());

        let around_creatures = self
            .state
            .creatures()
            .iter()
            .filter(|c| c.owner == player && c.is_active() && !self.state.is_egg(c.id))
            .flat_map(|c| neighborhood(c.position, width, height));

        let owned_biomes = self
            .state
            .biomes()
            .values()
            .filter(|b| b.owner == Some(player))
            .flat_map(|b| board.biome_tiles(b.id));

        key_set(around_creatures.chain(owned_biomes))
    }

    /// Full recompute for one player, replacing the stored set.
    ///
    /// None if the player does not exist.
    pub fn update_player_visibility(&self, player: PlayerId) -> Option<VisibilityUpdate> {
        let stored = self.stored(player)?;
        let visible = self.compute_visible(player);
        Some(VisibilityUpdate::new(player, &stored.visible, visible))
    }

    /// Game-start visibility for the active player, sent as one batch.
    pub fn initialize_visibility<R>(&self, renderer: &mut R) -> Option<VisibilityUpdate>
    where
        R: FogRenderer + ?Sized,
    {
        let player = self.state.active_player();
        let update = self.update_player_visibility(player)?;

        let tiles: Vec<TilePos> = update.visible.iter().map(|key| key.to_pos()).collect();
        if !tiles.is_empty() {
            renderer.reveal_tiles(&tiles);
        }
        debug!("Initial visibility for {}: {} tiles", player, tiles.len());
        Some(update)
    }

    /// Switch fog on or off.
    ///
    /// Enabling fogs the board and then reveals the active player's stored set.
    pub fn toggle_fog_of_war<R>(&self, enabled: bool, renderer: &mut R)
    where
        R: FogRenderer + ?Sized,
    {
        if !enabled {
            renderer.clear_all();
            return;
        }

        renderer.cover_all();
        let tiles: Vec<TilePos> = self
            .stored(self.state.active_player())
            .map(|p| p.visible.iter().map(|key| key.to_pos()).collect())
            .unwrap_or_default();
        if !tiles.is_empty() {
            renderer.reveal_tiles(&tiles);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
