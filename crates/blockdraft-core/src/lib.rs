//! BlockDraft Core Library
//!
//! Interaction and state engine for the BlockDraft page editor: the layout
//! model, command history, drag gestures and alignment guides.

pub mod commands;
pub mod config;
pub mod drag;
pub mod editor;
pub mod error;
pub mod event;
pub mod history;
pub mod input;
pub mod layout;
pub mod operator;
pub mod registry;
pub mod selection;
pub mod snap;

pub use commands::{CommandArgs, LayoutCommander, register_layout_commands};
pub use config::EditorConfig;
pub use drag::{DropEffect, Gesture, LayoutEvents, ResizeCapability, ResizeHandle};
pub use editor::{ContextMenuAction, Dialogs, Editor, NoDialogs, ToolbarAction};
pub use error::{EditorError, EditorResult};
pub use event::{DragEvents, EventChannel, ListenerId};
pub use history::{Command, CommandExecute, Commander, Dispatcher, KeyOutcome};
pub use input::{KeyCombo, KeyInput, Modifiers, MouseButton, PointerEvent};
pub use layout::{Block, BlockId, Container, FocusData, Layout};
pub use operator::{EditTarget, PropertyEditor};
pub use registry::{Component, ComponentRegistry, ComponentRender, FormData, PropKind, PropSpec, RenderContext};
pub use snap::{Mark, MarkLines, SnapResult};
