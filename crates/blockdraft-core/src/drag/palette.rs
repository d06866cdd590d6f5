//! Dropping new blocks from the component palette.

use super::LayoutEvents;
use crate::layout::{Block, BlockId, Layout};
use kurbo::Point;
use log::debug;

/// Drop affordance shown while hovering the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropEffect {
    #[default]
    None,
    Copy,
}

/// Palette drag state: which component is being carried.
#[derive(Debug, Clone, Default)]
pub struct PaletteDrag {
    armed: Option<String>,
    effect: DropEffect,
}

impl PaletteDrag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer went down on a palette entry.
    pub fn arm(&mut self, component_key: impl Into<String>) {
        let key = component_key.into();
        debug!("palette armed with {key}");
        self.armed = Some(key);
    }

    /// Component being carried, if any.
    pub fn armed(&self) -> Option<&str> {
        self.armed.as_deref()
    }

    pub fn effect(&self) -> DropEffect {
        self.effect
    }

    pub fn enter(&mut self) {
        if self.armed.is_some() {
            self.effect = DropEffect::Copy;
        }
    }

    pub fn over(&mut self) {
        self.enter();
    }

    pub fn leave(&mut self) {
        self.effect = DropEffect::None;
    }

    /// Insert the carried component at `at`. A drop without an armed
    /// component is ignored.
    pub fn drop(
        &mut self,
        layout: &mut Layout,
        events: &mut LayoutEvents,
        at: Point,
    ) -> Option<BlockId> {
        let key = self.armed.take()?;
        self.effect = DropEffect::None;
        events.start(layout);
        let id = layout.add_block(Block::new(key, at.y, at.x));
        events.end(layout);
        Some(id)
    }

    /// The palette drag ended, dropped or not.
    pub fn release(&mut self) {
        self.armed = None;
        self.effect = DropEffect::None;
    }
}
