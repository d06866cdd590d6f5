//! Moving the focused blocks.

use super::LayoutEvents;
use crate::layout::{BlockId, Layout};
use crate::snap::{Mark, MarkLines};
use kurbo::{Point, Vec2};
use log::debug;

/// State of a move gesture over the focused blocks.
#[derive(Debug, Clone)]
pub struct MoveDrag {
    /// Pointer position at pointer-down.
    start_point: Point,
    /// Latest pointer position.
    current_point: Point,
    /// Starting top-left of every focused block.
    starts: Vec<(BlockId, Point)>,
    /// Starting top-left of the focused blocks' bounding box.
    anchor: Point,
    lines: MarkLines,
    mark: Mark,
    tolerance: f64,
    dragging: bool,
}

impl MoveDrag {
    /// Start a move. Returns `None` if no block is focused.
    pub fn begin(layout: &Layout, pointer: Point, tolerance: f64) -> Option<Self> {
        let focus = layout.focus_data().focus;
        let bounds = focus.iter().map(|b| b.bounds()).reduce(|a, b| a.union(b))?;
        let starts = focus.iter().map(|b| (b.id, b.position())).collect();
        Some(Self {
            start_point: pointer,
            current_point: pointer,
            starts,
            anchor: bounds.origin(),
            lines: MarkLines::for_focused(layout),
            mark: Mark::default(),
            tolerance,
            dragging: false,
        })
    }

    /// Pointer displacement since pointer-down.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// Ids of the blocks being moved.
    pub fn block_ids(&self) -> Vec<BlockId> {
        self.starts.iter().map(|(id, _)| *id).collect()
    }

    /// Guides currently shown.
    pub fn mark(&self) -> Mark {
        self.mark
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Apply a pointer move. With `axis_lock` only the axis with the larger
    /// displacement moves.
    pub fn update(
        &mut self,
        layout: &mut Layout,
        events: &mut LayoutEvents,
        pointer: Point,
        axis_lock: bool,
    ) -> Mark {
        if !self.dragging && pointer == self.start_point {
            return self.mark;
        }
        self.current_point = pointer;
        if !self.dragging {
            self.dragging = true;
            debug!("move started with {} blocks", self.starts.len());
            events.start(layout);
        }

        let mut delta = self.delta();
        let (mut lock_x, mut lock_y) = (false, false);
        if axis_lock {
            if delta.x.abs() > delta.y.abs() {
                delta.y = 0.0;
                lock_y = true;
            } else {
                delta.x = 0.0;
                lock_x = true;
            }
        }

        let mut snapped = self
            .lines
            .snap_with_tolerance(self.anchor + delta, self.tolerance);
        // A locked axis stays put even if a guide is close
        if lock_x {
            snapped.point.x = self.anchor.x;
            snapped.mark.x = None;
        }
        if lock_y {
            snapped.point.y = self.anchor.y;
            snapped.mark.y = None;
        }
        let delta = snapped.point - self.anchor;

        for (id, start) in &self.starts {
            if let Some(block) = layout.block_mut(*id) {
                block.set_position(*start + delta);
            }
        }
        self.mark = snapped.mark;
        self.mark
    }

    /// Pointer released. Emits `dragend` if the pointer moved, and returns
    /// whether any block ended up away from where it started.
    pub fn end(mut self, layout: &Layout, events: &mut LayoutEvents) -> bool {
        self.mark.clear();
        if !self.dragging {
            return false;
        }
        debug!("move ended at delta {:?}", self.delta());
        events.end(layout);
        self.starts.iter().any(|(id, start)| {
            layout
                .block(*id)
                .is_some_and(|block| block.position() != *start)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Block, Container};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sized(left: f64, top: f64, w: f64, h: f64, focus: bool) -> Block {
        let mut block = Block::new("text", top, left);
        block.width = Some(w);
        block.height = Some(h);
        block.adjust_position = false;
        block.focus = focus;
        block
    }

    fn counting_events() -> (LayoutEvents, Rc<RefCell<(u32, u32)>>) {
        let counts = Rc::new(RefCell::new((0, 0)));
        let mut events = LayoutEvents::new();
        let s = counts.clone();
        events.dragstart.on(move |_: &Layout| s.borrow_mut().0 += 1);
        let e = counts.clone();
        events.dragend.on(move |_: &Layout| e.borrow_mut().1 += 1);
        (events, counts)
    }

    #[test]
    fn test_begin_requires_focus() {
        let mut layout = Layout::default();
        layout.add_block(sized(0.0, 0.0, 10.0, 10.0, false));
        assert!(MoveDrag::begin(&layout, Point::ZERO, 5.0).is_none());
    }

    #[test]
    fn test_click_without_move_emits_nothing() {
        let mut layout = Layout::default();
        layout.add_block(sized(0.0, 0.0, 10.0, 10.0, true));
        let (mut events, counts) = counting_events();

        let mut drag = MoveDrag::begin(&layout, Point::new(5.0, 5.0), 5.0).unwrap();
        drag.update(&mut layout, &mut events, Point::new(5.0, 5.0), false);
        assert!(!drag.end(&layout, &mut events));
        assert_eq!(*counts.borrow(), (0, 0));
    }

    #[test]
    fn test_move_all_focused() {
        let mut layout = Layout::new(Container::new(1000.0, 1000.0));
        let a = layout.add_block(sized(100.0, 100.0, 10.0, 10.0, true));
        let b = layout.add_block(sized(300.0, 300.0, 10.0, 10.0, true));
        let (mut events, counts) = counting_events();

        let mut drag = MoveDrag::begin(&layout, Point::new(105.0, 105.0), 5.0).unwrap();
        drag.update(&mut layout, &mut events, Point::new(125.0, 145.0), false);
        drag.update(&mut layout, &mut events, Point::new(137.0, 163.0), false);

        assert_eq!(layout.block(a).unwrap().position(), Point::new(132.0, 158.0));
        assert_eq!(layout.block(b).unwrap().position(), Point::new(332.0, 358.0));
        assert!(drag.end(&layout, &mut events));
        assert_eq!(*counts.borrow(), (1, 1));
    }

    #[test]
    fn test_snap_to_sibling_left_edge() {
        let mut layout = Layout::new(Container::new(1000.0, 1000.0));
        let moving = layout.add_block(sized(0.0, 400.0, 20.0, 20.0, true));
        layout.add_block(sized(100.0, 50.0, 40.0, 30.0, false));
        let (mut events, _) = counting_events();

        let mut drag = MoveDrag::begin(&layout, Point::new(10.0, 410.0), 5.0).unwrap();
        let mark = drag.update(&mut layout, &mut events, Point::new(113.0, 410.0), false);

        assert_eq!(layout.block(moving).unwrap().left, 100.0);
        assert_eq!(mark.x, Some(100.0));
        assert_eq!(mark.y, None);
        assert!(drag.end(&layout, &mut events));
    }

    #[test]
    fn test_move_back_to_start_is_not_a_change() {
        let mut layout = Layout::new(Container::new(1000.0, 1000.0));
        let id = layout.add_block(sized(300.0, 300.0, 10.0, 10.0, true));
        let (mut events, counts) = counting_events();

        let mut drag = MoveDrag::begin(&layout, Point::new(305.0, 305.0), 5.0).unwrap();
        drag.update(&mut layout, &mut events, Point::new(325.0, 305.0), false);
        drag.update(&mut layout, &mut events, Point::new(305.0, 305.0), false);

        assert_eq!(layout.block(id).unwrap().position(), Point::new(300.0, 300.0));
        assert!(!drag.end(&layout, &mut events));
        assert_eq!(*counts.borrow(), (1, 1));
    }

    #[test]
    fn test_axis_lock() {
        let mut layout = Layout::new(Container::new(1000.0, 1000.0));
        let id = layout.add_block(sized(200.0, 200.0, 10.0, 10.0, true));
        let (mut events, _) = counting_events();

        let mut drag = MoveDrag::begin(&layout, Point::new(200.0, 200.0), 5.0).unwrap();
        drag.update(&mut layout, &mut events, Point::new(260.0, 230.0), true);
        assert_eq!(layout.block(id).unwrap().position(), Point::new(260.0, 200.0));

        drag.update(&mut layout, &mut events, Point::new(210.0, 280.0), true);
        assert_eq!(layout.block(id).unwrap().position(), Point::new(200.0, 280.0));
    }

    #[test]
    fn test_guide_cleared_when_out_of_range() {
        let mut layout = Layout::new(Container::new(1000.0, 1000.0));
        layout.add_block(sized(0.0, 400.0, 20.0, 20.0, true));
        layout.add_block(sized(100.0, 50.0, 40.0, 30.0, false));
        let (mut events, _) = counting_events();
        let mut drag = MoveDrag::begin(&layout, Point::ZERO, 5.0).unwrap();

        let mark = drag.update(&mut layout, &mut events, Point::new(101.0, 0.0), false);
        assert_eq!(mark.x, Some(100.0));
        let mark = drag.update(&mut layout, &mut events, Point::new(250.0, 0.0), false);
        assert!(mark.is_empty());
        assert!(drag.mark().is_empty());
    }
}
