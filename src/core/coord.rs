//! Grid Coordinates
//!
//! Integer tile positions, the isometric screen projection, and the
//! distance / neighbourhood helpers every other module builds on.
//!
//! All functions here assume positions are on the board unless they take
//! the board dimensions explicitly. Passing an off-board position where an
//! on-board one is expected is a caller error.

use std::collections::BTreeSet;
use std::fmt;
use serde::{Serialize, Deserialize};

/// Integer tile position.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TilePos {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl TilePos {
    /// Create a new position.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by a delta.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Manhattan distance (`|dx| + |dy|`).
    #[inline]
    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Is this position inside a `width x height` board?
    #[inline]
    pub fn in_bounds(self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < width && self.y < height
    }
}

impl fmt::Debug for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for TilePos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

// =============================================================================
// COORDINATE KEYS
// =============================================================================

/// Canonical set key for a tile position.
///
/// Packs `x` into the high 32 bits and `y` into the low 32 bits, so `(1, 2)`
/// and `(2, 1)` never collide. Ordering is column-major.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CoordKey(u64);

impl CoordKey {
    /// Raw packed value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Decode back into a position.
    #[inline]
    pub fn to_pos(self) -> TilePos {
        TilePos {
            x: (self.0 >> 32) as u32 as i32,
            y: self.0 as u32 as i32,
        }
    }
}

impl fmt::Debug for CoordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoordKey({self})")
    }
}

impl fmt::Display for CoordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pos = self.to_pos();
        write!(f, "{},{}", pos.x, pos.y)
    }
}

/// The one place tile positions are turned into set keys.
#[inline]
pub fn coord_key(pos: TilePos) -> CoordKey {
    CoordKey(((pos.x as u32 as u64) << 32) | pos.y as u32 as u64)
}

/// Build a key set from positions.
pub fn key_set<I: IntoIterator<Item = TilePos>>(positions: I) -> BTreeSet<CoordKey> {
    positions.into_iter().map(coord_key).collect()
}

/// Remove duplicate positions, keeping the first occurrence of each.
pub fn dedup_positions<I: IntoIterator<Item = TilePos>>(positions: I) -> Vec<TilePos> {
    let mut seen = BTreeSet::new();
    positions
        .into_iter()
        .filter(|pos| seen.insert(coord_key(*pos)))
        .collect()
}

// =============================================================================
// NEIGHBOURHOODS
// =============================================================================

/// 3x3 offsets, row by row, centre included.
const NEIGHBORHOOD_OFFSETS: [(i32, i32); 9] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0), (0, 0), (1, 0),
    (-1, 1), (0, 1), (1, 1),
];

/// Orthogonal offsets: E, S, W, N.
pub const ORTHOGONAL_OFFSETS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Diagonal offsets: SE, SW, NW, NE.
pub const DIAGONAL_OFFSETS: [(i32, i32); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

/// The 3x3 block centred on `center`, clipped to the board.
///
/// Row-major order, no duplicates.
pub fn neighborhood(center: TilePos, width: i32, height: i32) -> Vec<TilePos> {
    NEIGHBORHOOD_OFFSETS
        .iter()
        .map(|&(dx, dy)| center.offset(dx, dy))
        .filter(|pos| pos.in_bounds(width, height))
        .collect()
}

/// The 8 surrounding tiles (orthogonals first, then diagonals), clipped to the board.
pub fn adjacent(center: TilePos, width: i32, height: i32) -> Vec<TilePos> {
    ORTHOGONAL_OFFSETS
        .iter()
        .chain(DIAGONAL_OFFSETS.iter())
        .map(|&(dx, dy)| center.offset(dx, dy))
        .filter(|pos| pos.in_bounds(width, height))
        .collect()
}

// =============================================================================
// ISOMETRIC PROJECTION
// =============================================================================

/// Skewed projection between grid coordinates and screen pixels.
///
/// A tile's screen anchor is the top vertex of its diamond:
/// `sx = (x - y) * half_width`, `sy = (x + y) * half_height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TileSize", into = "TileSize")]
pub struct IsoProjection {
    half_width: i32,
    half_height: i32,
}

/// Full tile size in pixels; the serialized form of [`IsoProjection`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSize {
    /// Diamond width
    pub tile_width: i32,
    /// Diamond height
    pub tile_height: i32,
}

impl From<TileSize> for IsoProjection {
    fn from(size: TileSize) -> Self {
        Self::from_tile_size(size.tile_width, size.tile_height)
    }
}

impl From<IsoProjection> for TileSize {
    fn from(proj: IsoProjection) -> Self {
        Self {
            tile_width: proj.half_width * 2,
            tile_height: proj.half_height * 2,
        }
    }
}

impl Default for IsoProjection {
    fn default() -> Self {
        Self {
            half_width: 32,
            half_height: 16,
        }
    }
}

impl IsoProjection {
    /// Create a projection from full tile dimensions.
    ///
    /// Each half-extent is clamped to at least one pixel.
    pub fn from_tile_size(tile_width: i32, tile_height: i32) -> Self {
        Self {
            half_width: (tile_width / 2).max(1),
            half_height: (tile_height / 2).max(1),
        }
    }

    /// Grid position to screen anchor.
    #[inline]
    pub fn to_screen(&self, pos: TilePos) -> (i32, i32) {
        (
            (pos.x - pos.y) * self.half_width,
            (pos.x + pos.y) * self.half_height,
        )
    }

    /// Half the diamond width in pixels.
    pub fn half_width(&self) -> i32 {
        self.half_width
    }

    /// Half the diamond height in pixels.
    pub fn half_height(&self) -> i32 {
        self.half_height
    }

    /// Screen point to the grid tile whose diamond contains it.
    ///
    /// Exact inverse of [`to_screen`](Self::to_screen) on anchors; points
    /// inside a diamond floor to that tile.
    pub fn to_grid(&self, sx: i32, sy: i32) -> TilePos {
        let hw = self.half_width as i64;
        let hh = self.half_height as i64;
        let (sx, sy) = (sx as i64, sy as i64);
        let denom = 2 * hw * hh;
        let a = sx * hh + sy * hw;
        let b = sy * hw - sx * hh;
        TilePos {
            x: a.div_euclid(denom) as i32,
            y: b.div_euclid(denom) as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = TilePos::new(0, 0);
        let b = TilePos::new(3, 4);
        assert_eq!(a.manhattan(b), 7);
        assert_eq!(b.manhattan(a), 7);
    }

    #[test]
    fn test_coord_key_is_ordered_pair() {
        let a = coord_key(TilePos::new(1, 2));
        let b = coord_key(TilePos::new(2, 1));
        assert_ne!(a, b);
        assert_eq!(a.to_pos(), TilePos::new(1, 2));
        assert_eq!(a.to_string(), "1,2");
    }

    #[test]
    fn test_coord_key_negative_roundtrip() {
        let pos = TilePos::new(-3, 7);
        assert_eq!(coord_key(pos).to_pos(), pos);
    }

    #[test]
    fn test_neighborhood_clipping() {
        // Corner keeps 4 tiles
        assert_eq!(neighborhood(TilePos::new(0, 0), 4, 4).len(), 4);
        // Edge keeps 6
        assert_eq!(neighborhood(TilePos::new(1, 0), 4, 4).len(), 6);
        // Interior keeps all 9
        let inner = neighborhood(TilePos::new(1, 1), 4, 4);
        assert_eq!(inner.len(), 9);
        assert!(inner.contains(&TilePos::new(1, 1)));
        // 1x1 board is just the centre
        assert_eq!(neighborhood(TilePos::new(0, 0), 1, 1), vec![TilePos::new(0, 0)]);
    }

    #[test]
    fn test_adjacent_excludes_center() {
        let tiles = adjacent(TilePos::new(1, 1), 3, 3);
        assert_eq!(tiles.len(), 8);
        assert!(!tiles.contains(&TilePos::new(1, 1)));
        assert_eq!(tiles[0], TilePos::new(2, 1));
    }

    #[test]
    fn test_dedup_keeps_first() {
        let input = vec![
            TilePos::new(1, 1),
            TilePos::new(0, 0),
            TilePos::new(1, 1),
            TilePos::new(0, 0),
        ];
        assert_eq!(dedup_positions(input), vec![TilePos::new(1, 1), TilePos::new(0, 0)]);
    }

    #[test]
    fn test_iso_projection_roundtrip() {
        let proj = IsoProjection::default();
        for x in 0..6 {
            for y in 0..6 {
                let pos = TilePos::new(x, y);
                let (sx, sy) = proj.to_screen(pos);
                assert_eq!(proj.to_grid(sx, sy), pos);
                // A point just inside the diamond still maps to the tile
                assert_eq!(proj.to_grid(sx, sy + 1), pos);
            }
        }
    }

    #[test]
    fn test_iso_projection_degenerate_size() {
        let proj = IsoProjection::from_tile_size(0, -4);
        assert_eq!((proj.half_width(), proj.half_height()), (1, 1));
        assert_eq!(proj.to_grid(3, 4), TilePos::new(3, 0));

        let parsed: IsoProjection =
            serde_json::from_str(r#"{ "tile_width": 0, "tile_height": 32 }"#).unwrap();
        assert_eq!(parsed.half_width(), 1);
        assert_eq!(parsed.to_grid(3, 4), TilePos::new(1, -2));
    }

    #[test]
    fn test_iso_projection_skew() {
        let proj = IsoProjection::from_tile_size(64, 32);
        assert_eq!(proj.to_screen(TilePos::new(1, 0)), (32, 16));
        assert_eq!(proj.to_screen(TilePos::new(0, 1)), (-32, 16));
    }
}
