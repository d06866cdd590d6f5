//! Resizing a block by one of its handles.

use super::LayoutEvents;
use crate::error::{EditorError, EditorResult};
use crate::layout::{Block, BlockId, Layout};
use kurbo::{Point, Rect, Vec2};
use log::debug;
use serde::{Deserialize, Serialize};

/// Which side of an axis a handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Top or left: the size grows as the pointer moves towards the origin.
    Start,
    /// The axis is not resized.
    Center,
    /// Bottom or right.
    End,
}

/// Resize handle positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::Top,
        ResizeHandle::TopRight,
        ResizeHandle::Right,
        ResizeHandle::BottomRight,
        ResizeHandle::Bottom,
        ResizeHandle::BottomLeft,
        ResizeHandle::Left,
    ];

    /// Horizontal direction.
    pub fn horizontal(self) -> Direction {
        match self {
            ResizeHandle::TopLeft | ResizeHandle::Left | ResizeHandle::BottomLeft => {
                Direction::Start
            }
            ResizeHandle::Top | ResizeHandle::Bottom => Direction::Center,
            ResizeHandle::TopRight | ResizeHandle::Right | ResizeHandle::BottomRight => {
                Direction::End
            }
        }
    }

    /// Vertical direction.
    pub fn vertical(self) -> Direction {
        match self {
            ResizeHandle::TopLeft | ResizeHandle::Top | ResizeHandle::TopRight => Direction::Start,
            ResizeHandle::Left | ResizeHandle::Right => Direction::Center,
            ResizeHandle::BottomLeft | ResizeHandle::Bottom | ResizeHandle::BottomRight => {
                Direction::End
            }
        }
    }

    pub fn is_corner(self) -> bool {
        self.horizontal() != Direction::Center && self.vertical() != Direction::Center
    }

    /// Where the handle is drawn on `bounds`.
    pub fn position(self, bounds: Rect) -> Point {
        let x = match self.horizontal() {
            Direction::Start => bounds.x0,
            Direction::Center => bounds.center().x,
            Direction::End => bounds.x1,
        };
        let y = match self.vertical() {
            Direction::Start => bounds.y0,
            Direction::Center => bounds.center().y,
            Direction::End => bounds.y1,
        };
        Point::new(x, y)
    }
}

/// Which dimensions a component lets the user resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeCapability {
    #[serde(default)]
    pub width: bool,
    #[serde(default)]
    pub height: bool,
}

impl ResizeCapability {
    pub const NONE: Self = Self {
        width: false,
        height: false,
    };
    pub const BOTH: Self = Self {
        width: true,
        height: true,
    };

    /// Handles to show for this capability.
    pub fn handles(self) -> Vec<ResizeHandle> {
        ResizeHandle::ALL
            .into_iter()
            .filter(|h| self.allows(*h))
            .collect()
    }

    /// Whether `handle` is enabled.
    pub fn allows(self, handle: ResizeHandle) -> bool {
        if handle.is_corner() {
            return self.width && self.height;
        }
        match handle.horizontal() {
            Direction::Center => self.height,
            _ => self.width,
        }
    }
}

/// Resize one side of an axis. Returns the new `(position, size)`.
fn resize_axis(direction: Direction, start: f64, size: f64, delta: f64) -> (f64, f64) {
    match direction {
        Direction::Center => (start, size),
        Direction::End => (start, (size + delta).max(0.0)),
        Direction::Start => {
            let new_size = (size - delta).max(0.0);
            // Opposite edge stays where it was
            (start + size - new_size, new_size)
        }
    }
}

/// State of a resize gesture.
#[derive(Debug, Clone)]
pub struct ResizeDrag {
    block: BlockId,
    handle: ResizeHandle,
    start_point: Point,
    current_point: Point,
    /// Block bounds at pointer-down.
    start: Rect,
    /// The block as it was at pointer-down.
    original: Block,
    dragging: bool,
}

impl ResizeDrag {
    /// Start resizing `block` from `handle`.
    pub fn begin(
        layout: &Layout,
        block: BlockId,
        handle: ResizeHandle,
        pointer: Point,
    ) -> EditorResult<Self> {
        let original = layout
            .block(block)
            .ok_or(EditorError::BlockNotFound(block))?
            .clone();
        Ok(Self {
            block,
            handle,
            start_point: pointer,
            current_point: pointer,
            start: original.bounds(),
            original,
            dragging: false,
        })
    }

    pub fn block_id(&self) -> BlockId {
        self.block
    }

    pub fn handle(&self) -> ResizeHandle {
        self.handle
    }

    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Apply a pointer move.
    pub fn update(&mut self, layout: &mut Layout, events: &mut LayoutEvents, pointer: Point) {
        if !self.dragging && pointer == self.start_point {
            return;
        }
        self.current_point = pointer;
        if !self.dragging {
            self.dragging = true;
            debug!("resize started on {:?}", self.handle);
            events.start(layout);
        }
        let delta = self.delta();
        let (left, width) = resize_axis(
            self.handle.horizontal(),
            self.start.x0,
            self.start.width(),
            delta.x,
        );
        let (top, height) = resize_axis(
            self.handle.vertical(),
            self.start.y0,
            self.start.height(),
            delta.y,
        );
        let Some(block) = layout.block_mut(self.block) else {
            return;
        };
        let start = self.start;
        if left == start.x0 && top == start.y0 && width == start.width() && height == start.height() {
            // Back at the starting size: nothing has been resized
            *block = self.original.clone();
            return;
        }
        block.left = left;
        block.top = top;
        if self.handle.horizontal() != Direction::Center {
            block.width = Some(width);
        }
        if self.handle.vertical() != Direction::Center {
            block.height = Some(height);
        }
        block.has_resize = true;
    }

    /// Pointer released. Emits `dragend` if the pointer moved, and returns
    /// whether the block differs from pointer-down.
    pub fn end(self, layout: &Layout, events: &mut LayoutEvents) -> bool {
        if !self.dragging {
            return false;
        }
        debug!("resize ended at delta {:?}", self.delta());
        events.end(layout);
        layout.block(self.block) != Some(&self.original)
    }
}
