//! The authoritative island surface: a square matrix of terrain categories
//! plus the pure grid algorithms (resize, paint, normalize).
//!
//! The grid is always square, its outer ring is water for the whole editing
//! lifetime, and resize steps move the side length by ±2 while preserving the
//! existing content centered.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest editable side length; `resize_smaller` clamps here.
pub const MIN_SIDE: usize = 4;
/// Largest editable side length; `resize_larger` clamps here.
pub const MAX_SIDE: usize = 44;
/// Side length of a freshly started session.
pub const DEFAULT_SIDE: usize = 21;

/// One terrain category per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Water,
    Lowland,
    Highland,
    Mountain,
}

impl Terrain {
    /// Single-letter code used in the engine map-text format.
    pub fn code(self) -> char {
        match self {
            Terrain::Water => 'W',
            Terrain::Lowland => 'L',
            Terrain::Highland => 'H',
            Terrain::Mountain => 'M',
        }
    }

    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'W' => Some(Terrain::Water),
            'L' => Some(Terrain::Lowland),
            'H' => Some(Terrain::Highland),
            'M' => Some(Terrain::Mountain),
            _ => None,
        }
    }
}

/// Failures when parsing externally supplied map text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapTextError {
    #[error("map text is empty")]
    Empty,
    #[error("row {0} has a different length than row 0")]
    Ragged(usize),
    #[error("map is {rows}x{cols}, expected a square")]
    NotSquare { rows: usize, cols: usize },
    #[error("unknown terrain code '{0}'")]
    BadCode(char),
}

/// Square island grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainGrid {
    side: usize,
    cells: Vec<Terrain>,
}

impl Default for TerrainGrid {
    fn default() -> Self {
        Self::new(DEFAULT_SIDE)
    }
}

impl TerrainGrid {
    /// All-water grid of the given side length.
    pub fn new(side: usize) -> Self {
        Self { side, cells: vec![Terrain::Water; side * side] }
    }

    /// Parse newline-separated rows of W/L/H/M codes.
    pub fn from_map_text(text: &str) -> Result<Self, MapTextError> {
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.is_empty() {
            return Err(MapTextError::Empty);
        }
        let cols = lines[0].chars().count();
        let rows = lines.len();
        let mut cells = Vec::with_capacity(rows * cols);
        for (r, line) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(MapTextError::Ragged(r));
            }
            for c in line.chars() {
                cells.push(Terrain::from_code(c).ok_or(MapTextError::BadCode(c))?);
            }
        }
        if rows != cols {
            return Err(MapTextError::NotSquare { rows, cols });
        }
        Ok(Self { side: rows, cells })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Terrain {
        self.cells[row * self.side + col]
    }

    #[inline]
    fn set(&mut self, row: usize, col: usize, t: Terrain) {
        self.cells[row * self.side + col] = t;
    }

    /// Paint one cell. The outer ring is not user-editable and must stay
    /// water, so border (and out-of-range) coordinates are a silent no-op.
    pub fn paint(&mut self, row: usize, col: usize, t: Terrain) {
        if row == 0 || col == 0 || row + 1 >= self.side || col + 1 >= self.side {
            return;
        }
        self.set(row, col, t);
    }

    /// Interior write without the border guard. Restricted to crate-internal
    /// callers that already iterate interior coordinates only.
    pub(crate) fn set_interior(&mut self, row: usize, col: usize, t: Terrain) {
        debug_assert!(row > 0 && col > 0 && row + 1 < self.side && col + 1 < self.side);
        self.set(row, col, t);
    }

    /// Reset every cell to water, keeping the current side length.
    pub fn clear(&mut self) {
        self.cells.fill(Terrain::Water);
    }

    pub fn is_all_water(&self) -> bool {
        self.cells.iter().all(|&c| c == Terrain::Water)
    }

    pub fn land_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != Terrain::Water).count()
    }

    /// Centroid of all non-water cells, truncated to integer coordinates.
    /// Falls back to the geometric center of an all-water grid.
    pub fn land_centroid(&self) -> (usize, usize) {
        let mut sum_r = 0usize;
        let mut sum_c = 0usize;
        let mut n = 0usize;
        for r in 0..self.side {
            for c in 0..self.side {
                if self.get(r, c) != Terrain::Water {
                    sum_r += r;
                    sum_c += c;
                    n += 1;
                }
            }
        }
        if n == 0 {
            (self.side / 2, self.side / 2)
        } else {
            (sum_r / n, sum_c / n)
        }
    }

    /// Grow by one water ring on every edge. No-op at `MAX_SIDE`.
    pub fn resize_larger(&mut self) {
        if self.side >= MAX_SIDE {
            return;
        }
        let new_side = self.side + 2;
        let mut grown = TerrainGrid::new(new_side);
        for r in 0..self.side {
            for c in 0..self.side {
                grown.set(r + 1, c + 1, self.get(r, c));
            }
        }
        *self = grown;
    }

    /// Strip the two outermost rings and re-add a fresh water border,
    /// shrinking the side by 2. No-op at `MIN_SIDE`.
    ///
    /// The outer ring is water by invariant, so a `resize_larger` followed by
    /// `resize_smaller` restores the grid exactly.
    pub fn resize_smaller(&mut self) {
        if self.side <= MIN_SIDE {
            return;
        }
        let new_side = self.side - 2;
        let mut shrunk = TerrainGrid::new(new_side);
        for r in 1..new_side - 1 {
            for c in 1..new_side - 1 {
                shrunk.set(r, c, self.get(r + 1, c + 1));
            }
        }
        *self = shrunk;
    }

    /// Newline-joined rows of terrain codes, the wire format consumed by the
    /// simulation engine constructor.
    pub fn map_text(&self) -> String {
        let mut out = String::with_capacity(self.side * (self.side + 1));
        for r in 0..self.side {
            if r > 0 {
                out.push('\n');
            }
            for c in 0..self.side {
                out.push(self.get(r, c).code());
            }
        }
        out
    }

    /// Recompute the smallest square that contains all land with at most one
    /// ring of water margin.
    ///
    /// Algorithm: two transpose-and-trim passes (the second restores the
    /// original orientation), each dropping leading/trailing rows while the
    /// first or last *two* rows are entirely water, then padding the shorter
    /// dimension back to a square with all-water rows or columns, alternating
    /// sides starting at the low side.
    ///
    /// An all-water grid is returned unchanged; trimming it to nothing is
    /// explicitly disallowed. Idempotent on already-minimal grids.
    pub fn normalize_to_minimal_square(&self) -> TerrainGrid {
        if self.is_all_water() {
            return self.clone();
        }

        let mut m: Vec<Vec<Terrain>> = (0..self.side)
            .map(|r| (0..self.side).map(|c| self.get(r, c)).collect())
            .collect();

        for _ in 0..2 {
            m = transpose(m);
            // The `> 2` guard keeps the trim loops well-defined on grids
            // where land fills every row inside the border ring.
            while m.len() > 2 && row_is_water(&m[0]) && row_is_water(&m[1]) {
                m.remove(0);
            }
            while m.len() > 2 && row_is_water(&m[m.len() - 1]) && row_is_water(&m[m.len() - 2]) {
                m.pop();
            }
        }

        let mut rows = m.len();
        let mut cols = m[0].len();
        if rows < cols {
            let mut i = 0usize;
            while rows < cols {
                let water_row = vec![Terrain::Water; cols];
                if i % 2 == 0 {
                    m.insert(0, water_row);
                } else {
                    m.push(water_row);
                }
                i += 1;
                rows += 1;
            }
        } else if cols < rows {
            let mut i = 0usize;
            while cols < rows {
                for row in &mut m {
                    if i % 2 == 0 {
                        row.insert(0, Terrain::Water);
                    } else {
                        row.push(Terrain::Water);
                    }
                }
                i += 1;
                cols += 1;
            }
        }

        let side = m.len();
        let cells = m.into_iter().flatten().collect();
        let out = TerrainGrid { side, cells };
        log::debug!("normalized island from side {} to side {}", self.side, out.side);
        out
    }
}

fn row_is_water(row: &[Terrain]) -> bool {
    row.iter().all(|&c| c == Terrain::Water)
}

fn transpose(m: Vec<Vec<Terrain>>) -> Vec<Vec<Terrain>> {
    let rows = m.len();
    let cols = m[0].len();
    (0..cols)
        .map(|c| (0..rows).map(|r| m[r][c]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from(rows: &[&str]) -> TerrainGrid {
        TerrainGrid::from_map_text(&rows.join("\n")).expect("valid map text")
    }

    #[test]
    fn default_grid_is_all_water_side_21() {
        let g = TerrainGrid::default();
        assert_eq!(g.side(), 21);
        assert!(g.is_all_water());
    }

    #[test]
    fn paint_on_border_never_changes_content() {
        let mut g = TerrainGrid::new(6);
        let before = g.clone();
        for k in 0..6 {
            g.paint(0, k, Terrain::Mountain);
            g.paint(5, k, Terrain::Mountain);
            g.paint(k, 0, Terrain::Mountain);
            g.paint(k, 5, Terrain::Mountain);
        }
        g.paint(9, 9, Terrain::Mountain); // out of range, also silent
        assert_eq!(g, before);
    }

    #[test]
    fn paint_interior_sets_cell() {
        let mut g = TerrainGrid::new(6);
        g.paint(2, 3, Terrain::Highland);
        assert_eq!(g.get(2, 3), Terrain::Highland);
        assert_eq!(g.land_count(), 1);
    }

    #[test]
    fn resize_larger_adds_water_ring_preserving_content() {
        let mut g = TerrainGrid::new(4);
        assert!(g.is_all_water());
        g.resize_larger();
        assert_eq!(g.side(), 6);
        assert!(g.is_all_water());

        let mut g = TerrainGrid::new(6);
        g.paint(2, 2, Terrain::Lowland);
        g.resize_larger();
        assert_eq!(g.side(), 8);
        assert_eq!(g.get(3, 3), Terrain::Lowland);
        assert_eq!(g.land_count(), 1);
    }

    #[test]
    fn resize_round_trip_restores_grid_exactly() {
        let mut g = TerrainGrid::new(8);
        g.paint(2, 3, Terrain::Highland);
        g.paint(4, 4, Terrain::Mountain);
        g.paint(5, 2, Terrain::Lowland);
        let before = g.clone();
        g.resize_larger();
        g.resize_smaller();
        assert_eq!(g, before);
    }

    #[test]
    fn resize_clamps_at_bounds() {
        let mut g = TerrainGrid::new(MIN_SIDE);
        g.resize_smaller();
        assert_eq!(g.side(), MIN_SIDE);

        let mut g = TerrainGrid::new(MAX_SIDE);
        g.resize_larger();
        assert_eq!(g.side(), MAX_SIDE);

        // Any sequence of resizes stays within bounds.
        let mut g = TerrainGrid::default();
        for _ in 0..40 {
            g.resize_larger();
        }
        assert!(g.side() <= MAX_SIDE);
        for _ in 0..40 {
            g.resize_smaller();
        }
        assert!(g.side() >= MIN_SIDE);
    }

    #[test]
    fn resize_smaller_strips_two_rings() {
        let mut g = TerrainGrid::new(8);
        g.paint(3, 3, Terrain::Mountain);
        g.resize_smaller();
        assert_eq!(g.side(), 6);
        assert_eq!(g.get(2, 2), Terrain::Mountain);
        assert_eq!(g.land_count(), 1);
    }

    #[test]
    fn normalize_all_water_is_unchanged() {
        let g = TerrainGrid::default();
        assert_eq!(g.normalize_to_minimal_square(), g);
    }

    #[test]
    fn normalize_minimal_grid_is_unchanged() {
        let g = grid_from(&["WWWW", "WHHW", "WLLW", "WWWW"]);
        assert_eq!(g.normalize_to_minimal_square(), g);
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut g = TerrainGrid::new(12);
        g.paint(2, 7, Terrain::Highland);
        g.paint(3, 7, Terrain::Lowland);
        g.paint(3, 8, Terrain::Mountain);
        let once = g.normalize_to_minimal_square();
        let twice = once.normalize_to_minimal_square();
        assert_eq!(once, twice);
    }

    #[test]
    fn normalize_preserves_every_land_cell() {
        let mut g = TerrainGrid::new(10);
        g.paint(4, 4, Terrain::Lowland);
        g.paint(4, 5, Terrain::Highland);
        g.paint(5, 4, Terrain::Mountain);
        let n = g.normalize_to_minimal_square();
        assert_eq!(n.land_count(), g.land_count());
        let mut kinds: Vec<Terrain> = Vec::new();
        for r in 0..n.side() {
            for c in 0..n.side() {
                if n.get(r, c) != Terrain::Water {
                    kinds.push(n.get(r, c));
                }
            }
        }
        kinds.sort_by_key(|t| t.code());
        assert_eq!(kinds, vec![Terrain::Highland, Terrain::Lowland, Terrain::Mountain]);
    }

    #[test]
    fn normalize_pads_columns_low_side_first() {
        // Vertical two-cell strip: trims to 4 rows x 3 cols, then pads one
        // column on the left (low side).
        let mut g = TerrainGrid::new(8);
        g.paint(3, 3, Terrain::Lowland);
        g.paint(4, 3, Terrain::Lowland);
        let n = g.normalize_to_minimal_square();
        assert_eq!(n.map_text(), "WWWW\nWWLW\nWWLW\nWWWW");
    }

    #[test]
    fn normalize_pads_rows_alternating_top_then_bottom() {
        // Horizontal three-cell strip: trims to 3 rows x 5 cols, then pads a
        // top row followed by a bottom row.
        let mut g = TerrainGrid::new(8);
        g.paint(3, 2, Terrain::Lowland);
        g.paint(3, 3, Terrain::Lowland);
        g.paint(3, 4, Terrain::Lowland);
        let n = g.normalize_to_minimal_square();
        assert_eq!(n.map_text(), "WWWWW\nWWWWW\nWLLLW\nWWWWW\nWWWWW");
    }

    #[test]
    fn normalize_leaves_full_interior_grid_untrimmed() {
        // Land in every interior cell: only single water rows border the
        // content, so neither trim loop fires.
        let mut g = TerrainGrid::new(6);
        for r in 1..5 {
            for c in 1..5 {
                g.paint(r, c, Terrain::Lowland);
            }
        }
        assert_eq!(g.normalize_to_minimal_square(), g);
    }

    #[test]
    fn map_text_round_trip() {
        let mut g = TerrainGrid::new(5);
        g.paint(1, 1, Terrain::Highland);
        g.paint(2, 3, Terrain::Mountain);
        let parsed = TerrainGrid::from_map_text(&g.map_text()).expect("round trip");
        assert_eq!(parsed, g);
    }

    #[test]
    fn from_map_text_rejects_bad_input() {
        assert_eq!(TerrainGrid::from_map_text(""), Err(MapTextError::Empty));
        assert_eq!(
            TerrainGrid::from_map_text("WWW\nWW"),
            Err(MapTextError::Ragged(1))
        );
        assert_eq!(
            TerrainGrid::from_map_text("WWW\nWWW"),
            Err(MapTextError::NotSquare { rows: 2, cols: 3 })
        );
        assert_eq!(
            TerrainGrid::from_map_text("WW\nWX"),
            Err(MapTextError::BadCode('X'))
        );
    }

    #[test]
    fn land_centroid_truncates_and_falls_back_to_center() {
        let g = TerrainGrid::new(9);
        assert_eq!(g.land_centroid(), (4, 4));

        let mut g = TerrainGrid::new(9);
        g.paint(2, 2, Terrain::Lowland);
        g.paint(3, 5, Terrain::Lowland);
        // Means are 2.5 and 3.5, truncated to (2, 3).
        assert_eq!(g.land_centroid(), (2, 3));
    }
}
