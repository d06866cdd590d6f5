//! Alignment guides for blocks being moved.
//!
//! Every reference rectangle (unfocused blocks, then the container) yields
//! five candidates per axis. A proposed position snaps to the first candidate
//! closer than the tolerance, and that candidate's guide line becomes visible.

use crate::config::DEFAULT_SNAP_TOLERANCE;
use crate::layout::Layout;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// One snap candidate on a single axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Where the moving box's top (or left) edge would go.
    pub position: f64,
    /// Where the guide line is drawn.
    pub show: f64,
}

impl Candidate {
    fn new(position: f64, show: f64) -> Self {
        Self { position, show }
    }
}

/// Active guide lines. `None` means no guide on that axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Mark {
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none()
    }

    pub fn clear(&mut self) {
        self.x = None;
        self.y = None;
    }
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped top-left corner.
    pub point: Point,
    /// Guides activated by the snap.
    pub mark: Mark,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            mark: Mark::default(),
        }
    }

    pub fn snapped_x(&self) -> bool {
        self.mark.x.is_some()
    }

    pub fn snapped_y(&self) -> bool {
        self.mark.y.is_some()
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        !self.mark.is_empty()
    }
}

/// Candidate lines for one gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkLines {
    pub x: Vec<Candidate>,
    pub y: Vec<Candidate>,
}

impl MarkLines {
    /// Build candidates for a box of size `moving` against `references`,
    /// kept in iteration order.
    pub fn compute(moving: Size, references: impl IntoIterator<Item = Rect>) -> Self {
        let mut lines = MarkLines::default();
        for r in references {
            let (top, left) = (r.y0, r.x0);
            let (w, h) = (r.width(), r.height());

            lines.y.push(Candidate::new(top, top));
            lines.y.push(Candidate::new(top + h, top + h));
            lines
                .y
                .push(Candidate::new(top + h / 2.0 - moving.height / 2.0, top + h / 2.0));
            lines.y.push(Candidate::new(top - moving.height, top));
            lines.y.push(Candidate::new(top + h - moving.height, top + h));

            lines.x.push(Candidate::new(left, left));
            lines.x.push(Candidate::new(left + w, left + w));
            lines
                .x
                .push(Candidate::new(left + w / 2.0 - moving.width / 2.0, left + w / 2.0));
            lines.x.push(Candidate::new(left - moving.width, left));
            lines.x.push(Candidate::new(left + w - moving.width, left + w));
        }
        lines
    }

    /// Candidates for moving the focused blocks of `layout` as one box.
    ///
    /// References are the unfocused blocks followed by the container.
    /// Returns an empty set when nothing is focused.
    pub fn for_focused(layout: &Layout) -> Self {
        let data = layout.focus_data();
        let Some(moving) = data.focus.iter().map(|b| b.bounds()).reduce(|a, b| a.union(b))
        else {
            return Self::default();
        };
        let references = data
            .unfocus
            .iter()
            .map(|b| b.bounds())
            .chain(std::iter::once(layout.container.bounds()));
        Self::compute(moving.size(), references)
    }

    /// Snap a proposed top-left corner with the default tolerance.
    pub fn snap(&self, proposed: Point) -> SnapResult {
        self.snap_with_tolerance(proposed, DEFAULT_SNAP_TOLERANCE)
    }

    /// Snap each axis to the first candidate strictly within `tolerance`.
    pub fn snap_with_tolerance(&self, proposed: Point, tolerance: f64) -> SnapResult {
        let mut result = SnapResult::none(proposed);
        if let Some(c) = first_within(&self.y, proposed.y, tolerance) {
            result.point.y = c.position;
            result.mark.y = Some(c.show);
        }
        if let Some(c) = first_within(&self.x, proposed.x, tolerance) {
            result.point.x = c.position;
            result.mark.x = Some(c.show);
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() && self.y.is_empty()
    }
}

fn first_within(candidates: &[Candidate], value: f64, tolerance: f64) -> Option<&Candidate> {
    candidates
        .iter()
        .find(|c| (c.position - value).abs() < tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Block, Container};

    fn sized(left: f64, top: f64, w: f64, h: f64) -> Block {
        let mut block = Block::new("text", top, left);
        block.width = Some(w);
        block.height = Some(h);
        block.adjust_position = false;
        block
    }

    #[test]
    fn test_five_candidates_per_axis() {
        let lines = MarkLines::compute(
            Size::new(20.0, 10.0),
            [Rect::new(100.0, 50.0, 140.0, 80.0)],
        );
        assert_eq!(lines.x.len(), 5);
        assert_eq!(lines.y.len(), 5);

        assert_eq!(lines.y[0], Candidate::new(50.0, 50.0));
        assert_eq!(lines.y[1], Candidate::new(80.0, 80.0));
        assert_eq!(lines.y[2], Candidate::new(60.0, 65.0));
        assert_eq!(lines.y[3], Candidate::new(40.0, 50.0));
        assert_eq!(lines.y[4], Candidate::new(70.0, 80.0));

        assert_eq!(lines.x[0], Candidate::new(100.0, 100.0));
        assert_eq!(lines.x[1], Candidate::new(140.0, 140.0));
        assert_eq!(lines.x[2], Candidate::new(110.0, 120.0));
        assert_eq!(lines.x[3], Candidate::new(80.0, 100.0));
        assert_eq!(lines.x[4], Candidate::new(120.0, 140.0));
    }

    #[test]
    fn test_snap_within_tolerance() {
        let lines = MarkLines::compute(
            Size::new(20.0, 10.0),
            [Rect::new(100.0, 50.0, 140.0, 80.0)],
        );
        let result = lines.snap(Point::new(103.0, 300.0));
        assert_eq!(result.point, Point::new(100.0, 300.0));
        assert_eq!(result.mark.x, Some(100.0));
        assert_eq!(result.mark.y, None);
        assert!(result.snapped_x());
        assert!(!result.snapped_y());
    }

    #[test]
    fn test_tolerance_is_strict() {
        let lines = MarkLines::compute(Size::new(0.0, 0.0), [Rect::new(100.0, 100.0, 100.0, 100.0)]);
        let result = lines.snap(Point::new(105.0, 400.0));
        assert!(!result.is_snapped());
        assert_eq!(result.point, Point::new(105.0, 400.0));
    }

    #[test]
    fn test_first_match_wins_over_nearest() {
        let lines = MarkLines::compute(
            Size::new(10.0, 10.0),
            [
                Rect::new(96.0, 500.0, 106.0, 510.0),
                Rect::new(100.0, 500.0, 110.0, 510.0),
            ],
        );
        // Second sibling is exact, but the first is within tolerance
        let result = lines.snap(Point::new(100.0, 0.0));
        assert_eq!(result.point.x, 96.0);
        assert_eq!(result.mark.x, Some(96.0));
    }

    #[test]
    fn test_custom_tolerance() {
        let lines = MarkLines::compute(Size::new(0.0, 0.0), [Rect::new(0.0, 0.0, 0.0, 0.0)]);
        assert!(!lines.snap_with_tolerance(Point::new(8.0, 8.0), 5.0).is_snapped());
        let result = lines.snap_with_tolerance(Point::new(8.0, 8.0), 10.0);
        assert_eq!(result.point, Point::ZERO);
    }

    #[test]
    fn test_for_focused_includes_container() {
        let mut layout = Layout::new(Container::new(500.0, 300.0));
        let moving = layout.add_block(sized(10.0, 10.0, 40.0, 20.0));
        layout.add_block(sized(200.0, 100.0, 50.0, 50.0));
        layout.block_mut(moving).unwrap().focus = true;

        let lines = MarkLines::for_focused(&layout);
        assert_eq!(lines.x.len(), 10);
        // Container center for a 40 wide box
        assert_eq!(lines.x[7], Candidate::new(230.0, 250.0));
        assert_eq!(lines.y[7], Candidate::new(140.0, 150.0));
    }

    #[test]
    fn test_for_focused_empty_selection() {
        let mut layout = Layout::default();
        layout.add_block(sized(0.0, 0.0, 10.0, 10.0));
        assert!(MarkLines::for_focused(&layout).is_empty());
    }
}
