//! Spatial aggregation of hook calls into a coarse grid
//!
//! Every position is snapped to the nearest multiple of the grid size on each
//! axis. Calls are tallied per cell and the busiest cells are ranked for the
//! end-of-session report.
//!
//! Rounding uses `f64::round`, i.e. round half away from zero:
//! `150 → 200`, `-150 → -200`, `149.9 → 100`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Grid size used when no configuration overrides it
pub const DEFAULT_GRID_SIZE: f64 = 100.0;

/// A point in the host's world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// True when every coordinate is a finite number
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Snap a single coordinate to the grid
fn snap(value: f64, grid_size: f64) -> f64 {
    // `+ 0.0` turns -0.0 into 0.0 so that it prints as "0"
    (value / grid_size).round() * grid_size + 0.0
}

/// Quantize a position to the nearest grid point on every axis
///
/// # Example
/// ```
/// use hookprof::spatial::{quantize, Position};
///
/// let snapped = quantize(Position::new(105.0, -49.0, 251.0), 100.0);
/// assert_eq!(snapped, Position::new(100.0, 0.0, 300.0));
/// ```
pub fn quantize(position: Position, grid_size: f64) -> Position {
    Position {
        x: snap(position.x, grid_size),
        y: snap(position.y, grid_size),
        z: snap(position.z, grid_size),
    }
}

/// 2^63, the first magnitude an `i64` cannot hold
const INDEX_LIMIT: f64 = 9_223_372_036_854_775_808.0;

fn cell_index(value: f64, grid_size: f64) -> Option<i64> {
    let index = (value / grid_size).round();
    // NaN fails the comparison too
    if index.abs() < INDEX_LIMIT {
        Some(index as i64)
    } else {
        None
    }
}

/// Integer index of a grid cell
///
/// Cells are keyed by index rather than by their float center so the key is
/// `Eq + Hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub ix: i64,
    pub iy: i64,
    pub iz: i64,
}

impl GridCell {
    /// Cell containing `position`
    ///
    /// `None` for a non-finite position, or when a cell index falls outside
    /// the `i64` range.
    pub fn of(position: Position, grid_size: f64) -> Option<Self> {
        Some(Self {
            ix: cell_index(position.x, grid_size)?,
            iy: cell_index(position.y, grid_size)?,
            iz: cell_index(position.z, grid_size)?,
        })
    }

    /// Grid point this cell is centered on
    pub fn center(&self, grid_size: f64) -> Position {
        Position {
            x: self.ix as f64 * grid_size + 0.0,
            y: self.iy as f64 * grid_size + 0.0,
            z: self.iz as f64 * grid_size + 0.0,
        }
    }
}

/// A ranked cell in a report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    /// Number of calls attributed to the cell
    pub count: u64,
    /// Quantized location of the cell
    pub location: Position,
}

#[derive(Debug, Clone, Copy)]
struct CellTally {
    count: u64,
    first_seen: u64,
}

/// Call counts per grid cell
#[derive(Debug, Clone)]
pub struct SpatialAggregator {
    grid_size: f64,
    cells: HashMap<GridCell, CellTally>,
    /// Insertion sequence, used to break ties in `top_n`
    next_seq: u64,
}

impl Default for SpatialAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE)
    }
}

impl SpatialAggregator {
    /// Create an aggregator over a grid of the given size
    ///
    /// # Panics
    ///
    /// Panics if `grid_size` is not a positive finite number.
    pub fn new(grid_size: f64) -> Self {
        assert!(
            grid_size.is_finite() && grid_size > 0.0,
            "Grid size must be positive and finite"
        );
        Self {
            grid_size,
            cells: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    /// Quantize a position with this aggregator's grid
    pub fn quantize(&self, position: Position) -> Position {
        quantize(position, self.grid_size)
    }

    /// Count one call at `position`
    ///
    /// Returns `false` (and counts nothing) when the position has no grid
    /// cell, see [`GridCell::of`].
    pub fn increment(&mut self, position: Position) -> bool {
        match GridCell::of(position, self.grid_size) {
            Some(cell) => {
                self.increment_cell(cell);
                true
            }
            None => false,
        }
    }

    /// Count one call in `cell`
    pub fn increment_cell(&mut self, cell: GridCell) {
        let next_seq = &mut self.next_seq;
        let tally = self.cells.entry(cell).or_insert_with(|| {
            let first_seen = *next_seq;
            *next_seq += 1;
            CellTally {
                count: 0,
                first_seen,
            }
        });
        tally.count += 1;
    }

    /// Count recorded for `cell`, zero when never seen
    pub fn count(&self, cell: GridCell) -> u64 {
        self.cells.get(&cell).map_or(0, |t| t.count)
    }

    /// Up to `n` busiest cells, highest count first
    ///
    /// Cells with equal counts keep the order in which they were first seen.
    pub fn top_n(&self, n: usize) -> Vec<Hotspot> {
        let mut sorted: Vec<_> = self.cells.iter().collect();
        sorted.sort_by(|a, b| {
            b.1.count
                .cmp(&a.1.count)
                .then(a.1.first_seen.cmp(&b.1.first_seen))
        });

        sorted
            .into_iter()
            .take(n)
            .map(|(cell, tally)| Hotspot {
                count: tally.count,
                location: cell.center(self.grid_size),
            })
            .collect()
    }

    /// Number of distinct cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Sum of all cell counts
    pub fn total(&self) -> u64 {
        self.cells.values().map(|t| t.count).sum()
    }

    /// Drop every cell
    pub fn clear(&mut self) {
        self.cells.clear();
        self.next_seq = 0;
    }
}
