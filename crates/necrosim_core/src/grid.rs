//! Grid of environment cells indexing agents and destructible walls.
//!
//! Each cell holds the ids of the live agents whose home cell it is (derived
//! from the agent's center point) and the ids of the destructible walls
//! crossing it. An agent is indexed in exactly one cell at a time; a wall
//! may appear in many cells. The radius-bounded scan is an index
//! acceleration only: its result set must equal an exhaustive scan.

use crate::config::GridConfig;
use necrosim_data::{AgentId, Point, Rect, WallId};

#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub agents: Vec<AgentId>,
    pub walls: Vec<WallId>,
    pub accessible: bool,
}

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    pub rows: usize,
    pub cols: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    cells: Vec<Cell>,
}

impl SpatialGrid {
    pub fn new(config: &GridConfig) -> Self {
        let mut cells = vec![
            Cell {
                agents: Vec::new(),
                walls: Vec::new(),
                accessible: true,
            };
            config.rows * config.cols
        ];
        for &(row, col) in &config.inaccessible {
            cells[row * config.cols + col].accessible = false;
        }
        Self {
            rows: config.rows,
            cols: config.cols,
            cell_width: config.cell_width,
            cell_height: config.cell_height,
            cells,
        }
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Home cell of a point, or `None` outside the grid.
    #[inline]
    pub fn cell_of(&self, p: &Point) -> Option<(usize, usize)> {
        if !p.x.is_finite() || !p.y.is_finite() || p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let col = (p.x / self.cell_width) as usize;
        let row = (p.y / self.cell_height) as usize;
        if row >= self.rows || col >= self.cols {
            None
        } else {
            Some((row, col))
        }
    }

    pub fn cell_rect(&self, row: usize, col: usize) -> Rect {
        Rect::new(
            Point::new(col as f64 * self.cell_width, row as f64 * self.cell_height),
            Point::new(
                (col + 1) as f64 * self.cell_width,
                (row + 1) as f64 * self.cell_height,
            ),
        )
    }

    pub fn is_accessible(&self, row: usize, col: usize) -> bool {
        self.cells[self.index(row, col)].accessible
    }

    pub fn accessible_cells(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if self.is_accessible(row, col) {
                    out.push((row, col));
                }
            }
        }
        out
    }

    pub fn agents_in(&self, row: usize, col: usize) -> &[AgentId] {
        &self.cells[self.index(row, col)].agents
    }

    pub fn walls_in(&self, row: usize, col: usize) -> &[WallId] {
        &self.cells[self.index(row, col)].walls
    }

    pub fn insert_agent(&mut self, id: AgentId, position: &Point) {
        if let Some((row, col)) = self.cell_of(position) {
            let idx = self.index(row, col);
            self.cells[idx].agents.push(id);
        }
    }

    pub fn remove_agent(&mut self, id: AgentId, position: &Point) {
        if let Some((row, col)) = self.cell_of(position) {
            let idx = self.index(row, col);
            self.cells[idx].agents.retain(|&a| a != id);
        }
    }

    /// Reindexes an agent whose center moved. The removal and insertion
    /// happen in one call so a lookup between them can never observe the
    /// agent in both cells or in neither.
    pub fn move_agent(&mut self, id: AgentId, old: &Point, new: &Point) {
        let old_cell = self.cell_of(old);
        let new_cell = self.cell_of(new);
        if old_cell == new_cell {
            return;
        }
        if let Some((row, col)) = old_cell {
            let idx = self.index(row, col);
            self.cells[idx].agents.retain(|&a| a != id);
        }
        if let Some((row, col)) = new_cell {
            let idx = self.index(row, col);
            self.cells[idx].agents.push(id);
        }
    }

    pub fn insert_wall(&mut self, id: WallId, row: usize, col: usize) {
        let idx = self.index(row, col);
        if !self.cells[idx].walls.contains(&id) {
            self.cells[idx].walls.push(id);
        }
    }

    pub fn remove_wall(&mut self, id: WallId, cells: &[(usize, usize)]) {
        for &(row, col) in cells {
            let idx = self.index(row, col);
            self.cells[idx].walls.retain(|&w| w != id);
        }
    }

    /// Cell coordinates within `ceil(radius / cell_size)` rows/columns of
    /// the cell containing `center`, clamped to the grid.
    pub fn cells_within(&self, center: &Point, radius: f64) -> Vec<(usize, usize)> {
        let Some((row, col)) = self.cell_of(center) else {
            return Vec::new();
        };
        let reach_cols = (radius / self.cell_width).ceil() as i64;
        let reach_rows = (radius / self.cell_height).ceil() as i64;
        let row0 = (row as i64 - reach_rows).max(0) as usize;
        let row1 = ((row as i64 + reach_rows) as usize).min(self.rows - 1);
        let col0 = (col as i64 - reach_cols).max(0) as usize;
        let col1 = ((col as i64 + reach_cols) as usize).min(self.cols - 1);

        let mut out = Vec::with_capacity((row1 - row0 + 1) * (col1 - col0 + 1));
        for r in row0..=row1 {
            for c in col0..=col1 {
                out.push((r, c));
            }
        }
        out
    }

    /// All cell coordinates, row-major.
    pub fn all_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows).flat_map(move |r| (0..self.cols).map(move |c| (r, c)))
    }
}
