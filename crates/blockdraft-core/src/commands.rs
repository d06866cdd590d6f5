//! Commands registered on the layout editor's history.

use crate::error::{EditorError, EditorResult};
use crate::event::DragEvents;
use crate::history::{Command, CommandExecute, Commander, InitContext, Teardown};
use crate::layout::{Block, BlockId, Layout};
use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;

pub const DELETE: &str = "delete";
pub const CLEAR: &str = "clear";
pub const DRAG: &str = "drag";
pub const PLACE_TOP: &str = "placeTop";
pub const PLACE_BOTTOM: &str = "placeBottom";
pub const UPDATE_BLOCK: &str = "updateBlock";
pub const UPDATE_MODEL_VALUE: &str = "updateModelValue";
pub const SELECT_ALL: &str = "selectAll";

/// Arguments for commands that need more than the layout.
#[derive(Debug, Clone, Default)]
pub enum CommandArgs {
    #[default]
    None,
    /// Replace the block with id `target` by `block`.
    UpdateBlock { block: Block, target: BlockId },
    /// Replace the whole layout.
    UpdateModel(Layout),
}

/// History type used by the editor.
pub type LayoutCommander = Commander<Layout, CommandArgs>;

/// Undo/redo pair that swaps the block list.
fn replace_blocks(before: Vec<Block>, after: Vec<Block>) -> CommandExecute<Layout> {
    CommandExecute::new(
        move |layout: &mut Layout| layout.set_blocks(before.clone()),
        move |layout: &mut Layout| layout.set_blocks(after.clone()),
    )
}

/// Register every editor command on `commander`.
pub fn register_layout_commands(commander: &mut LayoutCommander) -> EditorResult<()> {
    commander.register(DeleteCommand)?;
    commander.register(ClearCommand)?;
    commander.register(DragCommand::default())?;
    commander.register(PlaceTopCommand)?;
    commander.register(PlaceBottomCommand)?;
    commander.register(UpdateBlockCommand)?;
    commander.register(UpdateModelValueCommand)?;
    commander.register(SelectAllCommand)?;
    Ok(())
}

/// Remove the focused blocks.
pub struct DeleteCommand;

impl Command<Layout, CommandArgs> for DeleteCommand {
    fn name(&self) -> &str {
        DELETE
    }

    fn keyboard(&self) -> &[&str] {
        &["backspace", "delete", "ctrl+d"]
    }

    fn execute(&mut self, layout: &Layout, _: CommandArgs) -> EditorResult<CommandExecute<Layout>> {
        let before = layout.blocks.clone();
        let after = layout.focus_data().unfocused_cloned();
        Ok(replace_blocks(before, after))
    }
}

/// Remove every block.
pub struct ClearCommand;

impl Command<Layout, CommandArgs> for ClearCommand {
    fn name(&self) -> &str {
        CLEAR
    }

    fn execute(&mut self, layout: &Layout, _: CommandArgs) -> EditorResult<CommandExecute<Layout>> {
        Ok(replace_blocks(layout.blocks.clone(), Vec::new()))
    }
}

/// One undo step per gesture, whichever drag source produced it.
#[derive(Default)]
pub struct DragCommand {
    /// Blocks as they were at the last `dragstart`.
    before: Rc<RefCell<Option<Vec<Block>>>>,
}

impl Command<Layout, CommandArgs> for DragCommand {
    fn name(&self) -> &str {
        DRAG
    }

    fn init(&mut self, ctx: &mut InitContext<'_, Layout>) -> Option<Teardown<Layout>> {
        let before = self.before.clone();
        let start = ctx.events.dragstart.on(move |layout: &Layout| {
            *before.borrow_mut() = Some(layout.blocks.clone());
        });
        let dispatcher = ctx.dispatcher.clone();
        let end = ctx
            .events
            .dragend
            .on(move |_: &Layout| dispatcher.request(DRAG));
        Some(Box::new(move |events: &mut DragEvents<Layout>| {
            events.dragstart.off(start);
            events.dragend.off(end);
        }))
    }

    fn destroy(&mut self) {
        self.before.borrow_mut().take();
    }

    fn execute(&mut self, layout: &Layout, _: CommandArgs) -> EditorResult<CommandExecute<Layout>> {
        let Some(before) = self.before.borrow_mut().take() else {
            debug!("drag committed without dragstart, nothing to record");
            return Ok(CommandExecute::unchanged());
        };
        if before == layout.blocks {
            debug!("drag ended where it started, nothing to record");
            return Ok(CommandExecute::unchanged());
        }
        let after = layout.blocks.clone();
        debug!("drag committed ({} blocks)", after.len());
        Ok(replace_blocks(before, after))
    }
}

/// Raise the focused blocks above every unfocused block.
pub struct PlaceTopCommand;

impl Command<Layout, CommandArgs> for PlaceTopCommand {
    fn name(&self) -> &str {
        PLACE_TOP
    }

    fn keyboard(&self) -> &[&str] {
        &["ctrl+up"]
    }

    fn execute(&mut self, layout: &Layout, _: CommandArgs) -> EditorResult<CommandExecute<Layout>> {
        let max = layout
            .focus_data()
            .unfocus
            .iter()
            .map(|b| b.z_index)
            .max()
            .unwrap_or(0);
        let before = layout.blocks.clone();
        let mut after = layout.blocks.clone();
        for block in after.iter_mut().filter(|b| b.focus) {
            block.z_index = max + 1;
        }
        Ok(replace_blocks(before, after))
    }
}

/// Lower the focused blocks below every unfocused block.
pub struct PlaceBottomCommand;

impl Command<Layout, CommandArgs> for PlaceBottomCommand {
    fn name(&self) -> &str {
        PLACE_BOTTOM
    }

    fn keyboard(&self) -> &[&str] {
        &["ctrl+down"]
    }

    fn execute(&mut self, layout: &Layout, _: CommandArgs) -> EditorResult<CommandExecute<Layout>> {
        let min = layout
            .focus_data()
            .unfocus
            .iter()
            .map(|b| b.z_index)
            .min()
            .unwrap_or(0);
        let mut z = min - 1;
        let before = layout.blocks.clone();
        let mut after = layout.blocks.clone();
        if z < 0 {
            // Keep z-indices non-negative by lifting everything else
            let shift = -z;
            for block in after.iter_mut().filter(|b| !b.focus) {
                block.z_index += shift;
            }
            z = 0;
        }
        for block in after.iter_mut().filter(|b| b.focus) {
            block.z_index = z;
        }
        Ok(replace_blocks(before, after))
    }
}

/// Replace one block, identified by id.
pub struct UpdateBlockCommand;

impl Command<Layout, CommandArgs> for UpdateBlockCommand {
    fn name(&self) -> &str {
        UPDATE_BLOCK
    }

    fn execute(&mut self, layout: &Layout, args: CommandArgs) -> EditorResult<CommandExecute<Layout>> {
        let CommandArgs::UpdateBlock { mut block, target } = args else {
            return Err(EditorError::MissingArgument(UPDATE_BLOCK));
        };
        let Some(index) = layout.index_of(target) else {
            warn!("updateBlock: block {target} is no longer in the layout");
            return Err(EditorError::BlockNotFound(target));
        };
        // The replacement takes over the target's identity
        if block.id != target {
            debug!("updateBlock: re-keying {} as {target}", block.id);
            block.id = target;
        }
        let before = layout.blocks.clone();
        let mut after = layout.blocks.clone();
        after[index] = block;
        Ok(replace_blocks(before, after))
    }
}

/// Replace the whole layout, container included.
pub struct UpdateModelValueCommand;

impl Command<Layout, CommandArgs> for UpdateModelValueCommand {
    fn name(&self) -> &str {
        UPDATE_MODEL_VALUE
    }

    fn execute(&mut self, layout: &Layout, args: CommandArgs) -> EditorResult<CommandExecute<Layout>> {
        let CommandArgs::UpdateModel(after) = args else {
            return Err(EditorError::MissingArgument(UPDATE_MODEL_VALUE));
        };
        let before = layout.clone();
        Ok(CommandExecute::new(
            move |layout: &mut Layout| *layout = before.clone(),
            move |layout: &mut Layout| *layout = after.clone(),
        ))
    }
}

/// Focus every block. Not recorded.
pub struct SelectAllCommand;

impl Command<Layout, CommandArgs> for SelectAllCommand {
    fn name(&self) -> &str {
        SELECT_ALL
    }

    fn keyboard(&self) -> &[&str] {
        &["ctrl+a"]
    }

    fn follow_queue(&self) -> bool {
        false
    }

    fn execute(&mut self, _: &Layout, _: CommandArgs) -> EditorResult<CommandExecute<Layout>> {
        Ok(CommandExecute::redo_only(|layout: &mut Layout| {
            for block in &mut layout.blocks {
                block.focus = true;
            }
        }))
    }
}
