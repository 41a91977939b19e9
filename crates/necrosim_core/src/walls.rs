//! Wall store: construction-time borders, player builds and breach
//! splitting.
//!
//! Every wall in the store knows which grid cells its segment crosses;
//! destructible walls are additionally indexed into those cells so the
//! breach step can find them without scanning the global list. A breach
//! removes the clipped portion and re-registers up to two remainder pieces
//! as independent walls.

use crate::geometry::{self, EPS};
use crate::grid::SpatialGrid;
use necrosim_data::{Point, Rect, Segment, Wall, WallId};
use std::collections::BTreeMap;

use crate::vector::VectorOps;

#[derive(Debug, Clone, Default)]
pub struct WallStore {
    walls: BTreeMap<WallId, Wall>,
    cells_by_wall: BTreeMap<WallId, Vec<(usize, usize)>>,
    next_id: u64,
}

impl WallStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: WallId) -> Option<&Wall> {
        self.walls.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wall> {
        self.walls.values()
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    /// Snapshot of all walls, in id order.
    pub fn all(&self) -> Vec<Wall> {
        self.walls.values().copied().collect()
    }

    /// Total length of all destructible walls; used by the breach
    /// conservation tests and the snapshot.
    pub fn destructible_length(&self) -> f64 {
        self.walls
            .values()
            .filter(|w| w.destructible)
            .map(|w| w.segment.length())
            .sum()
    }

    /// Registers a wall and indexes it into every grid cell its segment
    /// crosses. Zero-length segments are rejected.
    pub fn add_wall(
        &mut self,
        segment: Segment,
        destructible: bool,
        grid: &mut SpatialGrid,
    ) -> Option<WallId> {
        if segment.length() < EPS {
            return None;
        }
        let id = WallId(self.next_id);
        self.next_id += 1;

        let mut cells = Vec::new();
        for (row, col) in geometry::cells_crossed(&segment, grid.cell_width, grid.cell_height) {
            if row < 0 || col < 0 {
                continue;
            }
            let (row, col) = (row as usize, col as usize);
            if row >= grid.rows || col >= grid.cols {
                continue;
            }
            cells.push((row, col));
            if destructible {
                grid.insert_wall(id, row, col);
            }
        }

        self.walls.insert(
            id,
            Wall {
                id,
                segment,
                destructible,
            },
        );
        self.cells_by_wall.insert(id, cells);
        Some(id)
    }

    pub fn remove_wall(&mut self, id: WallId, grid: &mut SpatialGrid) -> Option<Wall> {
        let wall = self.walls.remove(&id)?;
        if let Some(cells) = self.cells_by_wall.remove(&id) {
            if wall.destructible {
                grid.remove_wall(id, &cells);
            }
        }
        Some(wall)
    }

    /// Removes the portion of every destructible wall crossing `cell_rect`.
    /// Each wall split in two becomes two independent walls re-indexed to
    /// their own cells; a wall fully consumed disappears. Returns the total
    /// length removed.
    pub fn breach_cell(
        &mut self,
        row: usize,
        col: usize,
        cell_rect: &Rect,
        grid: &mut SpatialGrid,
    ) -> f64 {
        let ids: Vec<WallId> = grid.walls_in(row, col).to_vec();
        let mut removed_length = 0.0;

        for id in ids {
            let Some(wall) = self.walls.get(&id).copied() else {
                continue;
            };
            let Some(clipped) = geometry::clip_segment(cell_rect, &wall.segment) else {
                continue;
            };
            if clipped.length() < EPS {
                continue;
            }
            removed_length += clipped.length();

            let remainders = subtract_portion(&wall.segment, &clipped);
            self.remove_wall(id, grid);
            for piece in remainders {
                let _ = self.add_wall(piece, true, grid);
            }
        }
        removed_length
    }

    /// Builds the four arena border walls plus the borders of every
    /// inaccessible cell, all permanent.
    pub fn build_boundaries(&mut self, grid: &mut SpatialGrid, arena: &Rect) {
        let corners = [
            Point::new(arena.min.x, arena.min.y),
            Point::new(arena.max.x, arena.min.y),
            Point::new(arena.max.x, arena.max.y),
            Point::new(arena.min.x, arena.max.y),
        ];
        for i in 0..4 {
            let _ = self.add_wall(Segment::new(corners[i], corners[(i + 1) % 4]), false, grid);
        }

        let blocked: Vec<(usize, usize)> = grid
            .all_cells()
            .filter(|&(r, c)| !grid.is_accessible(r, c))
            .collect();
        for (row, col) in blocked {
            let rect = grid.cell_rect(row, col);
            let corners = [
                rect.min,
                Point::new(rect.max.x, rect.min.y),
                rect.max,
                Point::new(rect.min.x, rect.max.y),
            ];
            for i in 0..4 {
                let _ = self.add_wall(Segment::new(corners[i], corners[(i + 1) % 4]), false, grid);
            }
        }
    }

    /// Player wall build: debits available wall length (partial build
    /// allowed), pads both ends by `padding`, registers and indexes the
    /// wall. Returns the id, or `None` when no length was available or the
    /// requested segment was degenerate.
    pub fn build_wall(
        &mut self,
        segment: Segment,
        destructible: bool,
        padding: f64,
        available_length: &mut f64,
        grid: &mut SpatialGrid,
    ) -> Option<WallId> {
        let requested = segment.length();
        if requested < EPS || *available_length < EPS {
            return None;
        }
        let built = requested.min(*available_length);
        let dir = segment.direction().normalized();
        let end = segment.a.offset(dir * built);

        let padded = Segment::new(
            segment.a.offset(-(dir * padding)),
            end.offset(dir * padding),
        );
        let id = self.add_wall(padded, destructible, grid)?;
        *available_length -= built;
        Some(id)
    }
}

/// Subtracts `portion` (a sub-segment of `wall`) from `wall`, returning the
/// surviving pieces ordered from `wall.a`.
fn subtract_portion(wall: &Segment, portion: &Segment) -> Vec<Segment> {
    let dir = wall.direction();
    let len_sq = dir.magnitude_squared();
    if len_sq < EPS * EPS {
        return Vec::new();
    }
    let param = |p: &Point| {
        let v = wall.a.vector_to(p);
        v.dot(&dir) / len_sq
    };
    let (mut t0, mut t1) = (param(&portion.a), param(&portion.b));
    if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1);
    }
    let t0 = t0.clamp(0.0, 1.0);
    let t1 = t1.clamp(0.0, 1.0);

    let at = |t: f64| wall.a.offset(dir * t);
    let mut pieces = Vec::new();
    let head = Segment::new(wall.a, at(t0));
    if head.length() > EPS {
        pieces.push(head);
    }
    let tail = Segment::new(at(t1), wall.b);
    if tail.length() > EPS {
        pieces.push(tail);
    }
    pieces
}
