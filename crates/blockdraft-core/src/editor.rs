//! Editor facade: owns the layout and routes host input to gestures,
//! commands and selection.
//!
//! Every handler finishes by draining commands posted during the handler, so
//! a gesture's undo step exists by the time control returns to the host.
//! Subscribers of [`Editor::on_change`] are notified after each mutation.

use crate::commands::{
    self, CommandArgs, LayoutCommander, PLACE_BOTTOM, PLACE_TOP, UPDATE_BLOCK,
    UPDATE_MODEL_VALUE, register_layout_commands,
};
use crate::config::EditorConfig;
use crate::drag::{
    DropEffect, Gesture, LayoutEvents, MoveDrag, PaletteDrag, ResizeDrag, ResizeHandle,
};
use crate::error::{EditorError, EditorResult};
use crate::event::EventChannel;
use crate::history::KeyOutcome;
use crate::input::{KeyInput, Modifiers};
use crate::layout::{Block, BlockId, Layout};
use crate::operator::PropertyEditor;
use crate::registry::{ComponentRegistry, FormData};
use crate::selection;
use crate::snap::Mark;
use kurbo::Point;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Modal dialogs provided by the host.
pub trait Dialogs {
    /// Show a text area. Returns the entered text, or `None` if cancelled.
    fn textarea(&mut self, initial: &str, title: &str, readonly: bool) -> Option<String>;

    /// Show a message.
    fn alert(&mut self, message: &str);
}

/// Dialogs that are always cancelled.
#[derive(Debug, Default)]
pub struct NoDialogs;

impl Dialogs for NoDialogs {
    fn textarea(&mut self, _: &str, _: &str, _: bool) -> Option<String> {
        None
    }

    fn alert(&mut self, message: &str) {
        warn!("{message}");
    }
}

/// Entries of a block's context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMenuAction {
    PlaceTop,
    PlaceBottom,
    Delete,
    ShowJson,
    ImportJson,
}

impl ContextMenuAction {
    pub const ALL: [ContextMenuAction; 5] = [
        ContextMenuAction::PlaceTop,
        ContextMenuAction::PlaceBottom,
        ContextMenuAction::Delete,
        ContextMenuAction::ShowJson,
        ContextMenuAction::ImportJson,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContextMenuAction::PlaceTop => "Bring to front",
            ContextMenuAction::PlaceBottom => "Send to back",
            ContextMenuAction::Delete => "Delete block",
            ContextMenuAction::ShowJson => "View data",
            ContextMenuAction::ImportJson => "Import block",
        }
    }
}

/// Toolbar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolbarAction {
    Undo,
    Redo,
    Delete,
    Clear,
    PlaceTop,
    PlaceBottom,
    Import,
    Export,
    TogglePreview,
    Close,
}

impl ToolbarAction {
    pub const ALL: [ToolbarAction; 10] = [
        ToolbarAction::Undo,
        ToolbarAction::Redo,
        ToolbarAction::Delete,
        ToolbarAction::Clear,
        ToolbarAction::PlaceTop,
        ToolbarAction::PlaceBottom,
        ToolbarAction::Import,
        ToolbarAction::Export,
        ToolbarAction::TogglePreview,
        ToolbarAction::Close,
    ];

    /// Button label. The preview toggle depends on the current mode.
    pub fn label(self, preview: bool) -> &'static str {
        match self {
            ToolbarAction::Undo => "Undo",
            ToolbarAction::Redo => "Redo",
            ToolbarAction::Delete => "Delete",
            ToolbarAction::Clear => "Clear",
            ToolbarAction::PlaceTop => "Bring to front",
            ToolbarAction::PlaceBottom => "Send to back",
            ToolbarAction::Import => "Import",
            ToolbarAction::Export => "Export",
            ToolbarAction::TogglePreview if preview => "Edit",
            ToolbarAction::TogglePreview => "Preview",
            ToolbarAction::Close => "Close",
        }
    }

    /// Keyboard hint.
    pub fn tip(self) -> Option<&'static str> {
        match self {
            ToolbarAction::Undo => Some("ctrl+z"),
            ToolbarAction::Redo => Some("ctrl+y, ctrl+shift+z"),
            ToolbarAction::Delete => Some("ctrl+d, backspace, delete"),
            ToolbarAction::PlaceTop => Some("ctrl+up"),
            ToolbarAction::PlaceBottom => Some("ctrl+down"),
            _ => None,
        }
    }
}

/// The page editor.
pub struct Editor<O> {
    config: EditorConfig,
    layout: Layout,
    events: LayoutEvents,
    commander: LayoutCommander,
    registry: ComponentRegistry<O>,
    dialogs: Box<dyn Dialogs>,
    palette: PaletteDrag,
    gesture: Option<Gesture>,
    mark: Mark,
    selected: Option<BlockId>,
    form_data: FormData,
    preview: bool,
    editing: bool,
    on_change: EventChannel<Layout>,
}

impl<O> std::fmt::Debug for Editor<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("layout", &self.layout)
            .field("commander", &self.commander)
            .field("selected", &self.selected)
            .field("preview", &self.preview)
            .field("editing", &self.editing)
            .finish_non_exhaustive()
    }
}

impl<O> Editor<O> {
    /// Create an editor with an empty layout sized from `config`.
    pub fn new(
        config: EditorConfig,
        registry: ComponentRegistry<O>,
        dialogs: Box<dyn Dialogs>,
    ) -> EditorResult<Self> {
        let mut commander = LayoutCommander::with_limit(config.history_limit);
        register_layout_commands(&mut commander)?;
        let mut events = LayoutEvents::new();
        commander.init(&mut events);
        info!(
            "Editor ready with {} components and {} commands",
            registry.len(),
            commander.command_names().len()
        );
        Ok(Self {
            layout: Layout::new(config.container),
            config,
            events,
            commander,
            registry,
            dialogs,
            palette: PaletteDrag::new(),
            gesture: None,
            mark: Mark::default(),
            selected: None,
            form_data: FormData::new(),
            preview: false,
            editing: true,
            on_change: EventChannel::new(),
        })
    }

    /// Replace the layout without recording history, e.g. on load.
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
        self.commander.clear_history();
        self.gesture = None;
        self.mark.clear();
        self.selected = None;
        self.notify();
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ComponentRegistry<O> {
        &self.registry
    }

    pub fn commander(&self) -> &LayoutCommander {
        &self.commander
    }

    /// Alignment guides to draw.
    pub fn mark(&self) -> Mark {
        self.mark
    }

    /// Block shown in the property panel.
    pub fn selected(&self) -> Option<BlockId> {
        self.selected
    }

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn drop_effect(&self) -> DropEffect {
        self.palette.effect()
    }

    pub fn form_data(&self) -> &FormData {
        &self.form_data
    }

    pub fn form_data_mut(&mut self) -> &mut FormData {
        &mut self.form_data
    }

    /// Subscribers called with the layout after each mutation.
    pub fn on_change(&mut self) -> &mut EventChannel<Layout> {
        &mut self.on_change
    }

    fn notify(&mut self) {
        self.on_change.emit(&self.layout);
    }

    /// Drain posted commands and tidy up after a mutation.
    fn settle(&mut self) -> EditorResult<()> {
        let result = self.commander.flush(&mut self.layout);
        if self.selected.is_some_and(|id| self.layout.block(id).is_none()) {
            self.selected = None;
        }
        self.notify();
        result.map(|_| ())
    }

    /// Invoke a command by name and notify subscribers.
    pub fn invoke(&mut self, name: &str, args: CommandArgs) -> EditorResult<()> {
        let result = self.commander.invoke(name, &mut self.layout, args);
        self.settle()?;
        result
    }

    // --- Palette ---

    /// Pointer-down on a palette entry.
    pub fn palette_pointer_down(&mut self, component_key: &str) -> EditorResult<()> {
        if self.registry.get(component_key).is_none() {
            return Err(EditorError::UnknownComponent(component_key.to_string()));
        }
        self.palette.arm(component_key);
        Ok(())
    }

    pub fn canvas_drag_enter(&mut self) {
        self.palette.enter();
    }

    pub fn canvas_drag_over(&mut self) {
        self.palette.over();
    }

    pub fn canvas_drag_leave(&mut self) {
        self.palette.leave();
    }

    /// Drop the carried component at `at` (container coordinates).
    pub fn canvas_drop(&mut self, at: Point) -> EditorResult<Option<BlockId>> {
        let id = self.palette.drop(&mut self.layout, &mut self.events, at);
        if id.is_some() {
            self.settle()?;
        }
        Ok(id)
    }

    /// The palette drag ended.
    pub fn palette_release(&mut self) {
        self.palette.release();
    }

    // --- Canvas pointer input ---

    /// Pointer-down on a block: update focus and start moving the selection.
    pub fn block_pointer_down(
        &mut self,
        id: BlockId,
        pointer: Point,
        modifiers: Modifiers,
    ) -> EditorResult<()> {
        if self.preview {
            return Ok(());
        }
        selection::select_block(&mut self.layout, id, modifiers)
            .ok_or(EditorError::BlockNotFound(id))?;
        self.selected = Some(id);
        self.gesture = MoveDrag::begin(&self.layout, pointer, self.config.snap_tolerance)
            .map(Gesture::Move);
        self.notify();
        Ok(())
    }

    /// Pointer-down on the empty canvas.
    pub fn container_pointer_down(&mut self, modifiers: Modifiers) {
        if self.preview {
            return;
        }
        if selection::click_background(&mut self.layout, modifiers) {
            self.selected = None;
            self.notify();
        }
    }

    /// Pointer-down on a resize handle of a focused block. Returns false if
    /// the component does not offer that handle.
    pub fn handle_pointer_down(
        &mut self,
        id: BlockId,
        handle: ResizeHandle,
        pointer: Point,
    ) -> EditorResult<bool> {
        if self.preview {
            return Ok(false);
        }
        let block = self.layout.block(id).ok_or(EditorError::BlockNotFound(id))?;
        if !block.focus || !self.registry.resize_capability(&block.component_key).allows(handle) {
            return Ok(false);
        }
        self.gesture = Some(Gesture::Resize(ResizeDrag::begin(
            &self.layout,
            id,
            handle,
            pointer,
        )?));
        Ok(true)
    }

    /// Pointer moved while a gesture is active.
    pub fn pointer_move(&mut self, pointer: Point, modifiers: Modifiers) -> Mark {
        let Some(gesture) = &mut self.gesture else {
            return self.mark;
        };
        self.mark = gesture.update(&mut self.layout, &mut self.events, pointer, modifiers);
        if gesture.is_dragging() {
            self.notify();
        }
        self.mark
    }

    /// Pointer released. Returns true if a gesture committed an undo step.
    pub fn pointer_up(&mut self) -> EditorResult<bool> {
        self.mark.clear();
        let Some(gesture) = self.gesture.take() else {
            return Ok(false);
        };
        let dragging = gesture.is_dragging();
        let changed = gesture.end(&self.layout, &mut self.events);
        if dragging {
            self.settle()?;
        }
        Ok(changed)
    }

    /// Rendered size of a block became known.
    pub fn measure_block(&mut self, id: BlockId, width: f64, height: f64) -> bool {
        let changed = self.layout.measure_block(id, width, height);
        if changed {
            self.notify();
        }
        changed
    }

    // --- Keyboard ---

    /// Key press on the editing surface.
    pub fn key_down(&mut self, key: &KeyInput) -> EditorResult<KeyOutcome> {
        if self.preview || !self.editing {
            return Ok(KeyOutcome::Ignored);
        }
        let outcome = self.commander.handle_key(key, &mut self.layout);
        if matches!(outcome, Ok(KeyOutcome::Handled(_)) | Err(_)) {
            self.settle()?;
        }
        outcome
    }

    // --- Toolbar ---

    /// Step back one entry. Returns false at the start of history.
    pub fn undo(&mut self) -> EditorResult<bool> {
        let changed = self.commander.undo(&mut self.layout);
        if changed {
            self.settle()?;
        }
        Ok(changed)
    }

    /// Step forward one entry. Returns false at the end of history.
    pub fn redo(&mut self) -> EditorResult<bool> {
        let changed = self.commander.redo(&mut self.layout);
        if changed {
            self.settle()?;
        }
        Ok(changed)
    }

    pub fn delete(&mut self) -> EditorResult<()> {
        self.invoke(commands::DELETE, CommandArgs::None)
    }

    pub fn clear(&mut self) -> EditorResult<()> {
        self.invoke(commands::CLEAR, CommandArgs::None)
    }

    pub fn place_top(&mut self) -> EditorResult<()> {
        self.invoke(PLACE_TOP, CommandArgs::None)
    }

    pub fn place_bottom(&mut self) -> EditorResult<()> {
        self.invoke(PLACE_BOTTOM, CommandArgs::None)
    }

    pub fn select_all(&mut self) -> EditorResult<()> {
        self.invoke(commands::SELECT_ALL, CommandArgs::None)
    }

    /// Replace the layout from JSON as one undoable step.
    ///
    /// Malformed JSON is reported through the dialogs and leaves the layout
    /// untouched.
    pub fn import_json(&mut self, json: &str) -> EditorResult<()> {
        let layout = match Layout::from_json(json) {
            Ok(layout) => layout,
            Err(err) => {
                warn!("Rejected layout import: {err}");
                self.dialogs.alert(&format!("Could not parse JSON: {err}"));
                return Err(err);
            }
        };
        self.invoke(UPDATE_MODEL_VALUE, CommandArgs::UpdateModel(layout))
    }

    /// Layout as compact JSON.
    pub fn export_json(&self) -> EditorResult<String> {
        self.layout.to_json()
    }

    /// Ask the host for layout JSON and import it. Returns false if the
    /// dialog was cancelled.
    pub fn import(&mut self) -> EditorResult<bool> {
        let Some(text) = self.dialogs.textarea("", "Paste layout JSON", false) else {
            return Ok(false);
        };
        self.import_json(&text)?;
        Ok(true)
    }

    /// Show the layout JSON read-only.
    pub fn export(&mut self) -> EditorResult<()> {
        let json = self.export_json()?;
        self.dialogs.textarea(&json, "Exported JSON", true);
        Ok(())
    }

    /// Switch between editing and preview. Entering preview clears focus.
    pub fn toggle_preview(&mut self) {
        if !self.preview {
            self.layout.clear_focus(None);
            self.selected = None;
        }
        self.preview = !self.preview;
        debug!("preview = {}", self.preview);
        self.notify();
    }

    /// Hide the editor and show the rendered page.
    pub fn close_editing(&mut self) {
        self.layout.clear_focus(None);
        self.selected = None;
        self.editing = false;
        self.notify();
    }

    pub fn open_editing(&mut self) {
        self.editing = true;
    }

    /// Run a toolbar button.
    pub fn toolbar(&mut self, action: ToolbarAction) -> EditorResult<()> {
        match action {
            ToolbarAction::Undo => {
                self.undo()?;
            }
            ToolbarAction::Redo => {
                self.redo()?;
            }
            ToolbarAction::Delete => self.delete()?,
            ToolbarAction::Clear => self.clear()?,
            ToolbarAction::PlaceTop => self.place_top()?,
            ToolbarAction::PlaceBottom => self.place_bottom()?,
            ToolbarAction::Import => {
                self.import()?;
            }
            ToolbarAction::Export => self.export()?,
            ToolbarAction::TogglePreview => self.toggle_preview(),
            ToolbarAction::Close => self.close_editing(),
        }
        Ok(())
    }

    // --- Context menu ---

    /// Entries offered for a block, empty in preview mode.
    pub fn context_menu_actions(&self) -> &'static [ContextMenuAction] {
        if self.preview {
            &[]
        } else {
            &ContextMenuAction::ALL
        }
    }

    /// Run a context menu entry on block `id`.
    pub fn context_menu(&mut self, id: BlockId, action: ContextMenuAction) -> EditorResult<()> {
        if self.preview {
            return Ok(());
        }
        let block = self
            .layout
            .block(id)
            .ok_or(EditorError::BlockNotFound(id))?;
        match action {
            ContextMenuAction::PlaceTop => self.place_top(),
            ContextMenuAction::PlaceBottom => self.place_bottom(),
            ContextMenuAction::Delete => self.delete(),
            ContextMenuAction::ShowJson => {
                let json = serde_json::to_string_pretty(block)?;
                self.dialogs.textarea(&json, "Block data", true);
                Ok(())
            }
            ContextMenuAction::ImportJson => {
                let Some(text) = self.dialogs.textarea("", "Paste block JSON", false) else {
                    return Ok(());
                };
                self.import_block_json(id, &text)
            }
        }
    }

    /// Replace block `id` with one parsed from JSON, as one undoable step.
    pub fn import_block_json(&mut self, id: BlockId, json: &str) -> EditorResult<()> {
        let block: Block = match serde_json::from_str(json) {
            Ok(block) => block,
            Err(err) => {
                warn!("Rejected block import: {err}");
                self.dialogs.alert(&format!("Could not parse JSON: {err}"));
                return Err(err.into());
            }
        };
        self.invoke(UPDATE_BLOCK, CommandArgs::UpdateBlock { block, target: id })
    }

    // --- Property panel ---

    /// Edit buffer for the current selection.
    pub fn property_editor(&self) -> PropertyEditor {
        PropertyEditor::new(&self.layout, self.selected)
    }

    /// Commit a property panel buffer.
    pub fn apply_properties(&mut self, editor: &PropertyEditor) -> EditorResult<()> {
        let result = editor.apply(&mut self.commander, &mut self.layout);
        self.settle()?;
        result
    }

    // --- Rendering ---

    /// Render every block in layout order.
    pub fn render(&self, custom_props: Option<&FormData>) -> EditorResult<Vec<O>> {
        self.layout
            .blocks
            .iter()
            .map(|b| self.registry.render_block(b, &self.form_data, custom_props))
            .collect()
    }
}

impl<O> Drop for Editor<O> {
    fn drop(&mut self) {
        self.commander.destroy(&mut self.events);
    }
}
