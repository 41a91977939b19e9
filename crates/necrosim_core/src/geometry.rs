//! Geometric primitives shared by perception, movement and ballistics.
//!
//! Line clipping uses the Cohen-Sutherland outcode scheme; grid traversal
//! steps one cell at a time along the dominant axis so that every cell a
//! segment passes through is visited exactly once, in segment order. Wall
//! indexing and shot impact walking both depend on that ordering.

use necrosim_data::{Point, Rect, Segment};

pub const EPS: f64 = 1e-9;

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTTOM: u8 = 4;
const TOP: u8 = 8;

fn outcode(rect: &Rect, x: f64, y: f64) -> u8 {
    let mut code = INSIDE;
    if x < rect.min.x {
        code |= LEFT;
    } else if x > rect.max.x {
        code |= RIGHT;
    }
    if y < rect.min.y {
        code |= BOTTOM;
    } else if y > rect.max.y {
        code |= TOP;
    }
    code
}

/// Clips `seg` against `rect`. Returns `None` when the segment lies fully
/// outside. A segment fully inside is returned unchanged.
pub fn clip_segment(rect: &Rect, seg: &Segment) -> Option<Segment> {
    let (mut x0, mut y0) = (seg.a.x, seg.a.y);
    let (mut x1, mut y1) = (seg.b.x, seg.b.y);
    let mut code0 = outcode(rect, x0, y0);
    let mut code1 = outcode(rect, x1, y1);

    loop {
        if code0 | code1 == INSIDE {
            return Some(Segment::new(Point::new(x0, y0), Point::new(x1, y1)));
        }
        if code0 & code1 != INSIDE {
            return None;
        }
        let out = if code0 != INSIDE { code0 } else { code1 };
        let (x, y) = if out & TOP != 0 {
            (
                x0 + (x1 - x0) * (rect.max.y - y0) / (y1 - y0),
                rect.max.y,
            )
        } else if out & BOTTOM != 0 {
            (
                x0 + (x1 - x0) * (rect.min.y - y0) / (y1 - y0),
                rect.min.y,
            )
        } else if out & RIGHT != 0 {
            (
                rect.max.x,
                y0 + (y1 - y0) * (rect.max.x - x0) / (x1 - x0),
            )
        } else {
            (
                rect.min.x,
                y0 + (y1 - y0) * (rect.min.x - x0) / (x1 - x0),
            )
        };
        if out == code0 {
            x0 = x;
            y0 = y;
            code0 = outcode(rect, x0, y0);
        } else {
            x1 = x;
            y1 = y;
            code1 = outcode(rect, x1, y1);
        }
    }
}

/// Same outcode loop as [`clip_segment`] without materializing the clipped
/// segment. Used for the line-of-fire bystander check.
pub fn segment_crosses_rect(rect: &Rect, seg: &Segment) -> bool {
    let (mut x0, mut y0) = (seg.a.x, seg.a.y);
    let (mut x1, mut y1) = (seg.b.x, seg.b.y);
    let mut code0 = outcode(rect, x0, y0);
    let mut code1 = outcode(rect, x1, y1);

    loop {
        if code0 | code1 == INSIDE {
            return true;
        }
        if code0 & code1 != INSIDE {
            return false;
        }
        let out = if code0 != INSIDE { code0 } else { code1 };
        let (x, y) = if out & TOP != 0 {
            (
                x0 + (x1 - x0) * (rect.max.y - y0) / (y1 - y0),
                rect.max.y,
            )
        } else if out & BOTTOM != 0 {
            (
                x0 + (x1 - x0) * (rect.min.y - y0) / (y1 - y0),
                rect.min.y,
            )
        } else if out & RIGHT != 0 {
            (
                rect.max.x,
                y0 + (y1 - y0) * (rect.max.x - x0) / (x1 - x0),
            )
        } else {
            (
                rect.min.x,
                y0 + (y1 - y0) * (rect.min.x - x0) / (x1 - x0),
            )
        };
        if out == code0 {
            x0 = x;
            y0 = y;
            code0 = outcode(rect, x0, y0);
        } else {
            x1 = x;
            y1 = y;
            code1 = outcode(rect, x1, y1);
        }
    }
}

/// Intersection point of two segments in parametric form, `None` when they
/// miss or are parallel.
pub fn segment_intersection(a: &Segment, b: &Segment) -> Option<Point> {
    let dax = a.b.x - a.a.x;
    let day = a.b.y - a.a.y;
    let dbx = b.b.x - b.a.x;
    let dby = b.b.y - b.a.y;
    let denom = dax * dby - day * dbx;
    if denom.abs() < 1e-12 {
        return None;
    }

    let t = ((b.a.x - a.a.x) * dby - (b.a.y - a.a.y) * dbx) / denom;
    let u = ((b.a.x - a.a.x) * day - (b.a.y - a.a.y) * dax) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Point::new(a.a.x + t * dax, a.a.y + t * day))
    } else {
        None
    }
}

pub fn segments_intersect(a: &Segment, b: &Segment) -> bool {
    segment_intersection(a, b).is_some()
}

/// Orthogonal projection of `p` onto the infinite line through `seg`. Used
/// to derive a wall's outward normal from an agent's position. A degenerate
/// zero-length segment projects to its own endpoint.
pub fn nearest_point_on_line(p: &Point, seg: &Segment) -> Point {
    let dx = seg.b.x - seg.a.x;
    let dy = seg.b.y - seg.a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < EPS * EPS {
        return seg.a;
    }
    let t = ((p.x - seg.a.x) * dx + (p.y - seg.a.y) * dy) / len_sq;
    Point::new(seg.a.x + t * dx, seg.a.y + t * dy)
}

/// Closest point of `points` to `reference` by squared Euclidean distance;
/// ties go to the first encountered.
pub fn nearest_point(reference: &Point, points: &[Point]) -> Option<Point> {
    let mut best: Option<(f64, Point)> = None;
    for p in points {
        let d = reference.distance_squared_to(p);
        if best.map_or(true, |(bd, _)| d < bd) {
            best = Some((d, *p));
        }
    }
    best.map(|(_, p)| p)
}

/// All grid cells `(row, col)` crossed by `seg`, in segment order, with no
/// duplicates and no gaps, including both endpoints' cells. Coordinates may
/// be negative for segments outside the grid proper; callers clamp to their
/// bounds.
///
/// On an exact corner crossing the column step is taken before the row
/// step, so a segment spanning the diagonal of an R x C block of cells
/// visits R + C - 1 cells.
pub fn cells_crossed(seg: &Segment, cell_w: f64, cell_h: f64) -> Vec<(i32, i32)> {
    let cell_at = |x: f64, y: f64| ((y / cell_h).floor() as i32, (x / cell_w).floor() as i32);

    let (row0, col0) = cell_at(seg.a.x, seg.a.y);
    let (row1, col1) = cell_at(seg.b.x, seg.b.y);

    let mut cells = Vec::with_capacity(((row1 - row0).abs() + (col1 - col0).abs() + 1) as usize);
    cells.push((row0, col0));
    if (row0, col0) == (row1, col1) {
        return cells;
    }

    let dx = seg.b.x - seg.a.x;
    let dy = seg.b.y - seg.a.y;
    let step_col: i32 = if dx > 0.0 {
        1
    } else if dx < 0.0 {
        -1
    } else {
        0
    };
    let step_row: i32 = if dy > 0.0 {
        1
    } else if dy < 0.0 {
        -1
    } else {
        0
    };

    // Parametric distance to the next vertical/horizontal cell boundary and
    // per-cell increments, in units of the segment parameter [0, 1].
    let mut t_max_x = if step_col > 0 {
        ((col0 + 1) as f64 * cell_w - seg.a.x) / dx
    } else if step_col < 0 {
        (col0 as f64 * cell_w - seg.a.x) / dx
    } else {
        f64::INFINITY
    };
    let mut t_max_y = if step_row > 0 {
        ((row0 + 1) as f64 * cell_h - seg.a.y) / dy
    } else if step_row < 0 {
        (row0 as f64 * cell_h - seg.a.y) / dy
    } else {
        f64::INFINITY
    };
    let t_delta_x = if step_col != 0 {
        cell_w / dx.abs()
    } else {
        f64::INFINITY
    };
    let t_delta_y = if step_row != 0 {
        cell_h / dy.abs()
    } else {
        f64::INFINITY
    };

    let mut row = row0;
    let mut col = col0;
    let max_steps = (row1 - row0).abs() + (col1 - col0).abs();
    for _ in 0..max_steps {
        if t_max_x <= t_max_y {
            col += step_col;
            t_max_x += t_delta_x;
        } else {
            row += step_row;
            t_max_y += t_delta_y;
        }
        cells.push((row, col));
        if (row, col) == (row1, col1) {
            break;
        }
    }
    cells
}
