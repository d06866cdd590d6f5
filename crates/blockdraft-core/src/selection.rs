//! Focus rules for pointer-down on blocks and on the background.

use crate::input::Modifiers;
use crate::layout::{BlockId, Layout};

/// Whether the multi-select modifier is held.
pub fn is_multi_select(modifiers: Modifiers) -> bool {
    modifiers.shift
}

/// Update focus for a pointer-down on `id`.
///
/// Without the multi-select modifier an unfocused block becomes the only
/// focused block, and a focused block stays as it is so the selection can be
/// dragged. With the modifier, the block is forced on while fewer than two
/// blocks are focused and toggled otherwise.
///
/// Returns whether the block is focused afterwards, or `None` if it is not in
/// the layout.
pub fn select_block(layout: &mut Layout, id: BlockId, modifiers: Modifiers) -> Option<bool> {
    let focused = layout.block(id)?.focus;
    let count = layout.focus_count();
    if is_multi_select(modifiers) {
        let block = layout.block_mut(id)?;
        block.focus = if count < 2 { true } else { !focused };
        return Some(block.focus);
    }
    if !focused {
        layout.clear_focus(Some(id));
        layout.block_mut(id)?.focus = true;
    }
    Some(true)
}

/// Pointer-down on the empty background. Clears all focus unless the
/// multi-select modifier is held. Returns true if focus was cleared.
pub fn click_background(layout: &mut Layout, modifiers: Modifiers) -> bool {
    if is_multi_select(modifiers) {
        return false;
    }
    layout.clear_focus(None);
    true
}
