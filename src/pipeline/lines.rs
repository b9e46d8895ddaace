//! Ruled-line table detection over page geometry.
//!
//! Works on plain page primitives (characters with bounding boxes and ruling
//! edges) in top-left page coordinates, so it can be driven by pdfium in
//! production and by hand-built layouts in tests.
//!
//! ## Algorithm
//!
//! ```text
//! edges ──▶ snap ──▶ join ──▶ min length ──▶ intersections ──▶ cells ──▶ tables ──▶ text
//! ```
//!
//! 1. snap nearly-aligned edges onto their cluster mean (`snap_tolerance`)
//! 2. join collinear edges separated by a small gap (`join_tolerance`)
//! 3. drop edges shorter than `edge_min_length`
//! 4. every crossing of a vertical and a horizontal edge is an intersection
//!    (`intersection_tolerance`)
//! 5. a cell is the smallest rectangle whose four corners are intersections
//!    connected by shared edges
//! 6. cells sharing a corner belong to the same table; single-cell tables
//!    are discarded
//! 7. characters are assigned to the cell containing their centre and joined
//!    into words and lines (`text_tolerance`)

use super::table::RawTable;
use crate::config::TableSettings;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Boxes thinner than this (points) are drawn rules, not rectangles.
pub const RULE_THICKNESS: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Axis-aligned box, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x0: f32,
    pub top: f32,
    pub x1: f32,
    pub bottom: f32,
}

impl BBox {
    pub fn new(x0: f32, top: f32, x1: f32, bottom: f32) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    fn contains_centre_of(&self, other: &BBox) -> bool {
        let h_mid = (other.x0 + other.x1) / 2.0;
        let v_mid = (other.top + other.bottom) / 2.0;
        self.x0 <= h_mid && h_mid < self.x1 && self.top <= v_mid && v_mid < self.bottom
    }

    fn corners(&self) -> [PointKey; 4] {
        [
            key(self.x0, self.top),
            key(self.x0, self.bottom),
            key(self.x1, self.top),
            key(self.x1, self.bottom),
        ]
    }
}

/// A horizontal or vertical ruling segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub x0: f32,
    pub x1: f32,
    pub top: f32,
    pub bottom: f32,
    pub orientation: Orientation,
}

impl Edge {
    pub fn horizontal(x0: f32, x1: f32, y: f32) -> Self {
        Self {
            x0: x0.min(x1),
            x1: x0.max(x1),
            top: y,
            bottom: y,
            orientation: Orientation::Horizontal,
        }
    }

    pub fn vertical(x: f32, top: f32, bottom: f32) -> Self {
        Self {
            x0: x,
            x1: x,
            top: top.min(bottom),
            bottom: top.max(bottom),
            orientation: Orientation::Vertical,
        }
    }

    pub fn length(&self) -> f32 {
        match self.orientation {
            Orientation::Horizontal => self.x1 - self.x0,
            Orientation::Vertical => self.bottom - self.top,
        }
    }
}

/// One glyph and where it sits on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageChar {
    pub text: char,
    pub bbox: BBox,
}

/// Everything the detector needs from one page.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub chars: Vec<PageChar>,
    pub edges: Vec<Edge>,
}

/// Turn the bounding box of a drawn path into ruling edges.
///
/// Thin boxes are a single rule through their centre line; anything larger
/// is a rectangle and contributes its four sides.
pub fn edges_from_bbox(bbox: BBox) -> Vec<Edge> {
    let (w, h) = (bbox.width(), bbox.height());
    if w <= RULE_THICKNESS && h <= RULE_THICKNESS {
        Vec::new()
    } else if h <= RULE_THICKNESS {
        vec![Edge::horizontal(bbox.x0, bbox.x1, (bbox.top + bbox.bottom) / 2.0)]
    } else if w <= RULE_THICKNESS {
        vec![Edge::vertical((bbox.x0 + bbox.x1) / 2.0, bbox.top, bbox.bottom)]
    } else {
        vec![
            Edge::horizontal(bbox.x0, bbox.x1, bbox.top),
            Edge::horizontal(bbox.x0, bbox.x1, bbox.bottom),
            Edge::vertical(bbox.x0, bbox.top, bbox.bottom),
            Edge::vertical(bbox.x1, bbox.top, bbox.bottom),
        ]
    }
}

/// Largest cross-axis drift (points) for a path segment to count as a rule.
pub const AXIS_TOLERANCE: f32 = 0.5;

/// One step of a drawn path, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathStep {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    /// A curve only moves the pen; it is never a rule.
    CurveTo(f32, f32),
    /// Back to the start of the current subpath.
    Close,
}

/// Turn the segments of one drawn path into ruling edges.
///
/// Every axis-aligned line, including the implicit line of a closed
/// subpath, becomes one edge. Diagonal and zero-length lines are skipped.
pub fn edges_from_path(steps: &[PathStep]) -> Vec<Edge> {
    let mut edges = Vec::new();
    let mut pen: Option<(f32, f32)> = None;
    let mut start: Option<(f32, f32)> = None;

    for step in steps {
        match *step {
            PathStep::MoveTo(x, y) => {
                pen = Some((x, y));
                start = Some((x, y));
            }
            PathStep::LineTo(x, y) => {
                if let Some(from) = pen {
                    edges.extend(rule_between(from, (x, y)));
                }
                pen = Some((x, y));
                start = start.or(Some((x, y)));
            }
            PathStep::CurveTo(x, y) => {
                pen = Some((x, y));
                start = start.or(Some((x, y)));
            }
            PathStep::Close => {
                if let (Some(from), Some(to)) = (pen, start) {
                    edges.extend(rule_between(from, to));
                }
                pen = start;
            }
        }
    }
    edges
}

fn rule_between((x0, y0): (f32, f32), (x1, y1): (f32, f32)) -> Option<Edge> {
    let (dx, dy) = ((x1 - x0).abs(), (y1 - y0).abs());
    if dx <= AXIS_TOLERANCE && dy <= AXIS_TOLERANCE {
        None
    } else if dy <= AXIS_TOLERANCE {
        Some(Edge::horizontal(x0, x1, (y0 + y1) / 2.0))
    } else if dx <= AXIS_TOLERANCE {
        Some(Edge::vertical((x0 + x1) / 2.0, y0, y1))
    } else {
        None
    }
}

/// Detect every ruled table on a page and read out its cell text.
pub fn find_tables(layout: &PageLayout, settings: &TableSettings) -> Vec<RawTable> {
    let edges: Vec<Edge> = merge_edges(layout.edges.clone(), settings)
        .into_iter()
        .filter(|e| e.length() >= settings.edge_min_length)
        .collect();

    let junctions = edges_to_intersections(&edges, settings.intersection_tolerance);
    let cells = intersections_to_cells(&junctions);
    let tables = cells_to_tables(cells);

    tables
        .iter()
        .map(|cells| table_text(cells, &layout.chars, settings.text_tolerance))
        .collect()
}

// ── Edge merging ─────────────────────────────────────────────────────────

/// Snap then join edges.
pub fn merge_edges(edges: Vec<Edge>, settings: &TableSettings) -> Vec<Edge> {
    let (mut horizontal, mut vertical): (Vec<Edge>, Vec<Edge>) = edges
        .into_iter()
        .partition(|e| e.orientation == Orientation::Horizontal);

    snap(&mut horizontal, |e| e.top, |e, y| {
        e.top = y;
        e.bottom = y;
    }, settings.snap_tolerance);
    snap(&mut vertical, |e| e.x0, |e, x| {
        e.x0 = x;
        e.x1 = x;
    }, settings.snap_tolerance);

    let mut merged = join(horizontal, settings.join_tolerance);
    merged.extend(join(vertical, settings.join_tolerance));
    merged
}

/// Move edges whose cross-axis position chains within `tolerance` onto the
/// cluster mean.
fn snap(
    edges: &mut [Edge],
    position: fn(&Edge) -> f32,
    set: fn(&mut Edge, f32),
    tolerance: f32,
) {
    if edges.is_empty() {
        return;
    }
    edges.sort_by(|a, b| position(a).total_cmp(&position(b)));

    let mut start = 0;
    for i in 1..=edges.len() {
        let split = i == edges.len() || position(&edges[i]) - position(&edges[i - 1]) > tolerance;
        if split {
            let cluster = &mut edges[start..i];
            let mean = cluster.iter().map(position).sum::<f32>() / cluster.len() as f32;
            for e in cluster.iter_mut() {
                set(e, mean);
            }
            start = i;
        }
    }
}

/// Merge collinear edges that overlap or are separated by at most `tolerance`.
fn join(mut edges: Vec<Edge>, tolerance: f32) -> Vec<Edge> {
    let Some(first) = edges.first() else {
        return edges;
    };
    let orientation = first.orientation;

    // (line position, start, end) along the edge's own axis
    let axis = |e: &Edge| match orientation {
        Orientation::Horizontal => (e.top, e.x0, e.x1),
        Orientation::Vertical => (e.x0, e.top, e.bottom),
    };
    edges.sort_by(|a, b| {
        let (pa, sa, _) = axis(a);
        let (pb, sb, _) = axis(b);
        pa.total_cmp(&pb).then(sa.total_cmp(&sb))
    });

    let mut out: Vec<Edge> = Vec::with_capacity(edges.len());
    for edge in edges {
        let (pos, start, end) = axis(&edge);
        if let Some(last) = out.last_mut() {
            let (last_pos, _, last_end) = axis(last);
            if last_pos == pos && start <= last_end + tolerance {
                match orientation {
                    Orientation::Horizontal => last.x1 = last.x1.max(end),
                    Orientation::Vertical => last.bottom = last.bottom.max(end),
                }
                continue;
            }
        }
        out.push(edge);
    }
    out
}

// ── Intersections and cells ──────────────────────────────────────────────

type PointKey = (u32, u32);

fn key(x: f32, y: f32) -> PointKey {
    (x.to_bits(), y.to_bits())
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    x: f32,
    y: f32,
}

/// An intersection and the edges that pass through it.
#[derive(Debug, Default)]
struct Junction {
    horizontal: Vec<usize>,
    vertical: Vec<usize>,
}

struct Junctions {
    points: Vec<Point>,
    by_point: HashMap<PointKey, Junction>,
}

impl Junctions {
    fn get(&self, p: Point) -> Option<&Junction> {
        self.by_point.get(&key(p.x, p.y))
    }

    /// Two points on the same row or column joined by a common edge.
    fn connected(&self, a: Point, b: Point) -> bool {
        let (Some(ja), Some(jb)) = (self.get(a), self.get(b)) else {
            return false;
        };
        if a.x == b.x && ja.vertical.iter().any(|e| jb.vertical.contains(e)) {
            return true;
        }
        a.y == b.y && ja.horizontal.iter().any(|e| jb.horizontal.contains(e))
    }
}

fn edges_to_intersections(edges: &[Edge], tolerance: f32) -> Junctions {
    let mut by_point: HashMap<PointKey, Junction> = HashMap::new();
    let mut points = Vec::new();

    let horizontal: Vec<(usize, &Edge)> = edges
        .iter()
        .enumerate()
        .filter(|(_, e)| e.orientation == Orientation::Horizontal)
        .collect();

    for (vi, v) in edges
        .iter()
        .enumerate()
        .filter(|(_, e)| e.orientation == Orientation::Vertical)
    {
        for &(hi, h) in &horizontal {
            let crosses = v.top - tolerance <= h.top
                && h.top <= v.bottom + tolerance
                && h.x0 - tolerance <= v.x0
                && v.x0 <= h.x1 + tolerance;
            if !crosses {
                continue;
            }
            let p = Point { x: v.x0, y: h.top };
            let junction = by_point.entry(key(p.x, p.y)).or_insert_with(|| {
                points.push(p);
                Junction::default()
            });
            junction.horizontal.push(hi);
            junction.vertical.push(vi);
        }
    }

    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    Junctions { points, by_point }
}

fn intersections_to_cells(junctions: &Junctions) -> Vec<BBox> {
    let points = &junctions.points;
    let mut cells = Vec::new();

    for (i, &pt) in points.iter().enumerate() {
        let rest = &points[i + 1..];
        let right: Vec<Point> = rest.iter().copied().filter(|p| p.y == pt.y).collect();

        'below: for &below in rest.iter().filter(|p| p.x == pt.x) {
            if !junctions.connected(pt, below) {
                continue;
            }
            for &r in &right {
                if !junctions.connected(pt, r) {
                    continue;
                }
                let corner = Point {
                    x: r.x,
                    y: below.y,
                };
                if junctions.get(corner).is_some()
                    && junctions.connected(corner, r)
                    && junctions.connected(corner, below)
                {
                    cells.push(BBox::new(pt.x, pt.y, corner.x, corner.y));
                    break 'below;
                }
            }
        }
    }

    cells
}

/// Group cells that share corners into tables, top-to-bottom then left-to-right.
fn cells_to_tables(cells: Vec<BBox>) -> Vec<Vec<BBox>> {
    let mut remaining = cells;
    let mut corners: HashSet<PointKey> = HashSet::new();
    let mut current: Vec<BBox> = Vec::new();
    let mut tables: Vec<Vec<BBox>> = Vec::new();

    while !remaining.is_empty() {
        let before = current.len();
        let mut i = 0;
        while i < remaining.len() {
            let cell_corners = remaining[i].corners();
            if current.is_empty() || cell_corners.iter().any(|c| corners.contains(c)) {
                corners.extend(cell_corners);
                current.push(remaining.remove(i));
            } else {
                i += 1;
            }
        }
        if current.len() == before {
            tables.push(std::mem::take(&mut current));
            corners.clear();
        }
    }
    if !current.is_empty() {
        tables.push(current);
    }

    tables.retain(|t| t.len() > 1);
    tables.sort_by(|a, b| {
        let (ta, xa) = table_origin(a);
        let (tb, xb) = table_origin(b);
        ta.total_cmp(&tb).then(xa.total_cmp(&xb))
    });
    tables
}

fn table_origin(cells: &[BBox]) -> (f32, f32) {
    let top = cells.iter().map(|c| c.top).fold(f32::INFINITY, f32::min);
    let x0 = cells.iter().map(|c| c.x0).fold(f32::INFINITY, f32::min);
    (top, x0)
}

// ── Text ─────────────────────────────────────────────────────────────────

/// Lay the cells out as rows aligned on the table's distinct left edges.
fn table_text(cells: &[BBox], chars: &[PageChar], tolerance: f32) -> RawTable {
    let mut columns: Vec<f32> = cells.iter().map(|c| c.x0).collect();
    columns.sort_by(f32::total_cmp);
    columns.dedup();

    let mut sorted: Vec<&BBox> = cells.iter().collect();
    sorted.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0)));

    let mut rows: RawTable = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let top = sorted[i].top;
        let mut row: Vec<Option<String>> = vec![None; columns.len()];
        while i < sorted.len() && sorted[i].top == top {
            let cell = sorted[i];
            if let Some(col) = columns.iter().position(|&x| x == cell.x0) {
                row[col] = Some(cell_text(cell, chars, tolerance));
            }
            i += 1;
        }
        rows.push(row);
    }
    rows
}

fn cell_text(cell: &BBox, chars: &[PageChar], tolerance: f32) -> String {
    let mut inside: Vec<&PageChar> = chars
        .iter()
        .filter(|c| cell.contains_centre_of(&c.bbox))
        .collect();
    if inside.is_empty() {
        return String::new();
    }
    inside.sort_by(|a, b| {
        a.bbox
            .top
            .total_cmp(&b.bbox.top)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut lines: Vec<Vec<&PageChar>> = Vec::new();
    for c in inside {
        match lines.last_mut() {
            Some(line) if c.bbox.top - line[line.len() - 1].bbox.top <= tolerance => line.push(c),
            _ => lines.push(vec![c]),
        }
    }

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal));
            let mut text = String::new();
            let mut prev_x1: Option<f32> = None;
            for c in line {
                if let Some(x1) = prev_x1 {
                    if c.bbox.x0 - x1 > tolerance {
                        text.push(' ');
                    }
                }
                text.push(c.text);
                prev_x1 = Some(c.bbox.x1);
            }
            text
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> TableSettings {
        TableSettings::default()
    }

    fn ch(text: char, x0: f32, top: f32) -> PageChar {
        PageChar {
            text,
            bbox: BBox::new(x0, top, x0 + 8.0, top + 10.0),
        }
    }

    /// Ruled grid with the given column and row boundaries.
    fn grid(xs: &[f32], ys: &[f32]) -> Vec<Edge> {
        let (x_min, x_max) = (xs[0], xs[xs.len() - 1]);
        let (y_min, y_max) = (ys[0], ys[ys.len() - 1]);
        let mut edges: Vec<Edge> = ys
            .iter()
            .map(|&y| Edge::horizontal(x_min, x_max, y))
            .collect();
        edges.extend(xs.iter().map(|&x| Edge::vertical(x, y_min, y_max)));
        edges
    }

    #[test]
    fn reads_a_two_by_two_grid() {
        let layout = PageLayout {
            edges: grid(&[0.0, 50.0, 100.0], &[0.0, 20.0, 40.0]),
            chars: vec![ch('學', 5.0, 5.0), ch('分', 13.0, 5.0), ch('3', 60.0, 25.0)],
        };
        let tables = find_tables(&layout, &settings());
        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0],
            vec![
                vec![Some("學分".to_string()), Some(String::new())],
                vec![Some(String::new()), Some("3".to_string())],
            ]
        );
    }

    #[test]
    fn words_and_lines_inside_a_cell() {
        let layout = PageLayout {
            edges: grid(&[0.0, 100.0, 150.0], &[0.0, 40.0, 60.0]),
            chars: vec![
                ch('A', 2.0, 2.0),
                ch('B', 10.0, 2.5),
                ch('C', 30.0, 2.0),
                ch('D', 2.0, 20.0),
            ],
        };
        let tables = find_tables(&layout, &settings());
        assert_eq!(tables[0][0][0].as_deref(), Some("AB C\nD"));
    }

    #[test]
    fn single_box_is_not_a_table() {
        let layout = PageLayout {
            edges: edges_from_bbox(BBox::new(10.0, 10.0, 200.0, 80.0)),
            chars: vec![ch('x', 20.0, 20.0)],
        };
        assert!(find_tables(&layout, &settings()).is_empty());
    }

    #[test]
    fn snaps_and_joins_broken_rules() {
        let edges = vec![
            Edge::horizontal(0.0, 48.0, 20.0),
            Edge::horizontal(51.0, 100.0, 21.5),
            Edge::vertical(0.0, 0.0, 10.0),
            Edge::vertical(0.5, 12.0, 40.0),
        ];
        let merged = merge_edges(edges, &settings());
        assert_eq!(merged.len(), 2);

        let h = merged
            .iter()
            .find(|e| e.orientation == Orientation::Horizontal)
            .unwrap();
        assert_eq!((h.x0, h.x1), (0.0, 100.0));
        assert!((h.top - 20.75).abs() < 1e-6);

        let v = merged
            .iter()
            .find(|e| e.orientation == Orientation::Vertical)
            .unwrap();
        assert_eq!((v.top, v.bottom), (0.0, 40.0));
    }

    #[test]
    fn short_edges_are_dropped() {
        let mut edges = grid(&[0.0, 50.0, 100.0], &[0.0, 20.0, 40.0]);
        // stray tick marks
        edges.push(Edge::horizontal(200.0, 201.0, 300.0));
        edges.push(Edge::vertical(250.0, 300.0, 301.5));
        let layout = PageLayout {
            edges,
            chars: Vec::new(),
        };
        let mut strict = settings();
        strict.edge_min_length = 5.0;
        let tables = find_tables(&layout, &strict);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].len(), 2);
    }

    #[test]
    fn separate_grids_are_separate_tables_in_reading_order() {
        let mut edges = grid(&[0.0, 50.0, 100.0], &[200.0, 220.0, 240.0]);
        edges.extend(grid(&[0.0, 50.0, 100.0], &[0.0, 20.0, 40.0]));
        let layout = PageLayout {
            edges,
            chars: vec![ch('1', 5.0, 5.0), ch('2', 5.0, 205.0)],
        };
        let tables = find_tables(&layout, &settings());
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0][0][0].as_deref(), Some("1"));
        assert_eq!(tables[1][0][0].as_deref(), Some("2"));
    }

    #[test]
    fn merged_cell_leaves_gap() {
        // Top row is one wide cell; the bottom row has two.
        let edges = vec![
            Edge::horizontal(0.0, 100.0, 0.0),
            Edge::horizontal(0.0, 100.0, 20.0),
            Edge::horizontal(0.0, 100.0, 40.0),
            Edge::vertical(0.0, 0.0, 40.0),
            Edge::vertical(100.0, 0.0, 40.0),
            Edge::vertical(50.0, 20.0, 40.0),
        ];
        let layout = PageLayout {
            edges,
            chars: vec![ch('T', 40.0, 5.0)],
        };
        let tables = find_tables(&layout, &settings());
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0][0], vec![Some("T".to_string()), None]);
        assert_eq!(tables[0][1].len(), 2);
    }

    /// A whole grid drawn as one path: outer box as a closed subpath, then
    /// each inner rule as its own move/line pair.
    fn grid_as_one_path(xs: &[f32], ys: &[f32]) -> Vec<PathStep> {
        let (x_min, x_max) = (xs[0], xs[xs.len() - 1]);
        let (y_min, y_max) = (ys[0], ys[ys.len() - 1]);
        let mut steps = vec![
            PathStep::MoveTo(x_min, y_min),
            PathStep::LineTo(x_max, y_min),
            PathStep::LineTo(x_max, y_max),
            PathStep::LineTo(x_min, y_max),
            PathStep::Close,
        ];
        for &y in &ys[1..ys.len() - 1] {
            steps.push(PathStep::MoveTo(x_min, y));
            steps.push(PathStep::LineTo(x_max, y));
        }
        for &x in &xs[1..xs.len() - 1] {
            steps.push(PathStep::MoveTo(x, y_min));
            steps.push(PathStep::LineTo(x, y_max));
        }
        steps
    }

    #[test]
    fn grid_drawn_as_one_path_is_a_table() {
        let (xs, ys) = ([0.0, 50.0, 100.0, 150.0], [0.0, 20.0, 40.0]);
        let steps = grid_as_one_path(&xs, &ys);

        let edges = edges_from_path(&steps);
        assert_eq!(edges.len(), 7);
        let layout = PageLayout {
            edges,
            chars: vec![ch('A', 5.0, 5.0), ch('F', 105.0, 25.0)],
        };
        let tables = find_tables(&layout, &settings());
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].len(), 2);
        assert_eq!(tables[0][0].len(), 3);
        assert_eq!(tables[0][0][0].as_deref(), Some("A"));
        assert_eq!(tables[0][1][2].as_deref(), Some("F"));

        // The same path reduced to its bounds is one box and no table.
        let bounds_only = PageLayout {
            edges: edges_from_bbox(BBox::new(0.0, 0.0, 150.0, 40.0)),
            chars: Vec::new(),
        };
        assert!(find_tables(&bounds_only, &settings()).is_empty());
    }

    #[test]
    fn path_segments_keep_only_axis_aligned_lines() {
        let steps = [
            PathStep::MoveTo(0.0, 0.0),
            PathStep::LineTo(30.0, 30.0),
            PathStep::LineTo(30.0, 30.2),
            PathStep::CurveTo(60.0, 10.0),
            PathStep::LineTo(60.0, 50.0),
            PathStep::LineTo(90.0, 50.25),
        ];
        assert_eq!(
            edges_from_path(&steps),
            vec![
                Edge::vertical(60.0, 10.0, 50.0),
                Edge::horizontal(60.0, 90.0, 50.125),
            ]
        );
        // A line with no starting point draws nothing.
        assert!(edges_from_path(&[PathStep::LineTo(10.0, 0.0)]).is_empty());
    }

    #[test]
    fn thin_boxes_become_rules() {
        let h = edges_from_bbox(BBox::new(0.0, 10.0, 100.0, 10.5));
        assert_eq!(h, vec![Edge::horizontal(0.0, 100.0, 10.25)]);
        let v = edges_from_bbox(BBox::new(5.0, 0.0, 6.0, 80.0));
        assert_eq!(v, vec![Edge::vertical(5.5, 0.0, 80.0)]);
        assert!(edges_from_bbox(BBox::new(0.0, 0.0, 1.0, 1.0)).is_empty());
        assert_eq!(edges_from_bbox(BBox::new(0.0, 0.0, 50.0, 50.0)).len(), 4);
    }
}
