//! Property panel edit buffer.
//!
//! Edits are made on a private copy and only reach the layout through
//! `apply`, which goes through the command history so it can be undone.

use crate::commands::{CommandArgs, LayoutCommander, UPDATE_BLOCK, UPDATE_MODEL_VALUE};
use crate::error::{EditorError, EditorResult};
use crate::layout::{Block, BlockId, Container, Layout};
use crate::registry::{ComponentRegistry, PropKind};
use serde_json::Value;

/// What the panel is editing.
#[derive(Debug, Clone, PartialEq)]
pub enum EditTarget {
    /// No block selected: the container size.
    Container(Container),
    /// A copy of the selected block.
    Block(Block),
}

/// Widget kind of one panel field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Number,
    Text,
    Prop(PropKind),
}

/// One row of the property panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelField {
    /// Dotted path into the edit buffer, e.g. `props.text` or `model.default`.
    pub path: String,
    pub label: String,
    pub kind: FieldKind,
}

impl PanelField {
    fn new(path: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            kind,
        }
    }
}

/// Edit buffer for the property panel.
#[derive(Debug, Clone)]
pub struct PropertyEditor {
    selected: Option<BlockId>,
    buffer: EditTarget,
}

impl PropertyEditor {
    /// Load the buffer for `selected`, or for the container if `None`.
    pub fn new(layout: &Layout, selected: Option<BlockId>) -> Self {
        let mut editor = Self {
            selected,
            buffer: EditTarget::Container(layout.container),
        };
        editor.reset(layout);
        editor
    }

    /// Block being edited, if any.
    pub fn selected(&self) -> Option<BlockId> {
        self.selected
    }

    /// Switch to another selection and reload.
    pub fn select(&mut self, layout: &Layout, selected: Option<BlockId>) {
        self.selected = selected;
        self.reset(layout);
    }

    /// Discard edits and reload from the layout.
    ///
    /// A selection that no longer exists falls back to the container.
    pub fn reset(&mut self, layout: &Layout) {
        let block = self.selected.and_then(|id| layout.block(id));
        self.buffer = match block {
            Some(block) => EditTarget::Block(block.clone()),
            None => {
                self.selected = None;
                EditTarget::Container(layout.container)
            }
        };
    }

    pub fn buffer(&self) -> &EditTarget {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut EditTarget {
        &mut self.buffer
    }

    /// Set the container size. Ignored while a block is selected.
    pub fn set_container_size(&mut self, width: f64, height: f64) -> bool {
        match &mut self.buffer {
            EditTarget::Container(container) => {
                *container = Container::new(width, height);
                true
            }
            EditTarget::Block(_) => false,
        }
    }

    fn block_buffer(&mut self) -> Option<&mut Block> {
        match &mut self.buffer {
            EditTarget::Block(block) => Some(block),
            EditTarget::Container(_) => None,
        }
    }

    /// Set a property on the buffered block.
    pub fn set_prop(&mut self, name: impl Into<String>, value: Value) -> bool {
        self.block_buffer()
            .map(|b| b.props.insert(name.into(), value))
            .is_some()
    }

    /// Bind a model field of the buffered block to a form data key.
    pub fn set_model_binding(&mut self, field: impl Into<String>, key: impl Into<String>) -> bool {
        self.block_buffer()
            .map(|b| b.model.insert(field.into(), key.into()))
            .is_some()
    }

    /// Set the slot name of the buffered block. Empty clears it.
    pub fn set_slot_name(&mut self, slot: impl Into<String>) -> bool {
        let slot = slot.into();
        self.block_buffer()
            .map(|b| b.slot_name = (!slot.is_empty()).then_some(slot))
            .is_some()
    }

    /// Commit the buffer as one undoable step.
    pub fn apply(&self, commander: &mut LayoutCommander, layout: &mut Layout) -> EditorResult<()> {
        match (&self.buffer, self.selected) {
            (EditTarget::Block(block), Some(target)) => commander.invoke(
                UPDATE_BLOCK,
                layout,
                CommandArgs::UpdateBlock {
                    block: block.clone(),
                    target,
                },
            ),
            (EditTarget::Container(container), _) => {
                let mut next = layout.clone();
                next.container = *container;
                commander.invoke(UPDATE_MODEL_VALUE, layout, CommandArgs::UpdateModel(next))
            }
            (EditTarget::Block(block), None) => Err(EditorError::BlockNotFound(block.id)),
        }
    }

    /// Panel rows for the current buffer.
    pub fn fields<O>(&self, registry: &ComponentRegistry<O>) -> Vec<PanelField> {
        let block = match &self.buffer {
            EditTarget::Container(_) => {
                return vec![
                    PanelField::new("container.width", "Container width", FieldKind::Number),
                    PanelField::new("container.height", "Container height", FieldKind::Number),
                ];
            }
            EditTarget::Block(block) => block,
        };
        let mut fields = vec![PanelField::new("slotName", "Slot name", FieldKind::Text)];
        if let Some(component) = registry.get(&block.component_key) {
            for (name, spec) in &component.props {
                fields.push(PanelField::new(
                    format!("props.{name}"),
                    spec.label.clone(),
                    FieldKind::Prop(spec.kind.clone()),
                ));
            }
            for (field, label) in &component.model {
                fields.push(PanelField::new(
                    format!("model.{field}"),
                    label.clone(),
                    FieldKind::Text,
                ));
            }
        }
        fields
    }
}
