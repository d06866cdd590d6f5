//! Pointer gestures that edit the layout.
//!
//! Each gesture mutates the layout directly for live feedback and brackets its
//! mutations with `dragstart`/`dragend`, so the `drag` command records exactly
//! one undo step per gesture.

mod mover;
mod palette;
mod resize;

pub use mover::MoveDrag;
pub use palette::{DropEffect, PaletteDrag};
pub use resize::{Direction, ResizeCapability, ResizeDrag, ResizeHandle};

use crate::event::DragEvents;
use crate::input::Modifiers;
use crate::layout::Layout;
use crate::snap::Mark;
use kurbo::Point;

/// Drag signals carrying the live layout.
pub type LayoutEvents = DragEvents<Layout>;

/// The gesture currently owning the pointer.
#[derive(Debug, Clone)]
pub enum Gesture {
    Move(MoveDrag),
    Resize(ResizeDrag),
}

impl Gesture {
    /// Feed a pointer move. Returns the guides to display.
    pub fn update(
        &mut self,
        layout: &mut Layout,
        events: &mut LayoutEvents,
        pointer: Point,
        modifiers: Modifiers,
    ) -> Mark {
        match self {
            Gesture::Move(drag) => drag.update(layout, events, pointer, modifiers.shift),
            Gesture::Resize(drag) => {
                drag.update(layout, events, pointer);
                Mark::default()
            }
        }
    }

    /// Finish the gesture. Returns true if the layout changed.
    pub fn end(self, layout: &Layout, events: &mut LayoutEvents) -> bool {
        match self {
            Gesture::Move(drag) => drag.end(layout, events),
            Gesture::Resize(drag) => drag.end(layout, events),
        }
    }

    pub fn is_dragging(&self) -> bool {
        match self {
            Gesture::Move(drag) => drag.is_dragging(),
            Gesture::Resize(drag) => drag.is_dragging(),
        }
    }
}
