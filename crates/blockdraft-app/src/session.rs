//! Scripted editor sessions.
//!
//! A script is a JSON array of [`SessionStep`]s replayed against an
//! [`Editor`], standing in for the pointer and keyboard events a host would
//! deliver. Blocks are referred to by their index in the layout.

use blockdraft_core::{
    BlockId, ContextMenuAction, Editor, EditorError, KeyInput, Modifiers, ResizeHandle,
    ToolbarAction,
};
use kurbo::Point;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while replaying a script.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Step {step}: {source}")]
    Editor {
        step: usize,
        #[source]
        source: EditorError,
    },
    #[error("Step {step}: no block at index {index}")]
    NoSuchBlock { step: usize, index: usize },
    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),
}

/// One scripted input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SessionStep {
    /// Drag a palette component onto the canvas. With a size, the block is
    /// measured right away as the renderer would.
    Drop {
        component: String,
        x: f64,
        y: f64,
        #[serde(default)]
        size: Option<(f64, f64)>,
    },
    /// Report the rendered size of a block.
    Measure { block: usize, width: f64, height: f64 },
    /// Pointer-down on a block.
    Click {
        block: usize,
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Pointer-down on a resize handle.
    Resize {
        block: usize,
        handle: ResizeHandle,
        x: f64,
        y: f64,
    },
    /// Pointer-down on empty canvas.
    Background {
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Pointer move.
    Move {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Pointer up.
    Release,
    /// Key press.
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Undo one step.
    Undo,
    /// Redo one step.
    Redo,
    /// Toolbar button.
    Toolbar { action: ToolbarAction },
    /// Context menu entry on a block.
    Menu {
        block: usize,
        action: ContextMenuAction,
    },
    /// Set a property through the property panel.
    SetProp {
        block: usize,
        name: String,
        value: serde_json::Value,
    },
    /// Bind a model field through the property panel.
    Bind {
        block: usize,
        field: String,
        key: String,
    },
    /// Resize the container through the property panel.
    Container { width: f64, height: f64 },
    /// Replace the layout from JSON.
    Import { json: String },
    /// Set a form data value.
    Form {
        key: String,
        value: serde_json::Value,
    },
}

/// Parse a script.
pub fn parse_script(json: &str) -> Result<Vec<SessionStep>, SessionError> {
    Ok(serde_json::from_str(json)?)
}

fn block_at<O>(editor: &Editor<O>, step: usize, index: usize) -> Result<BlockId, SessionError> {
    editor
        .layout()
        .blocks
        .get(index)
        .map(|b| b.id)
        .ok_or(SessionError::NoSuchBlock { step, index })
}

fn apply_step<O>(editor: &mut Editor<O>, step: usize, input: &SessionStep) -> Result<(), SessionError> {
    let wrap = |source| SessionError::Editor { step, source };
    match input {
        SessionStep::Drop {
            component,
            x,
            y,
            size,
        } => {
            editor.palette_pointer_down(component).map_err(wrap)?;
            editor.canvas_drag_enter();
            let id = editor.canvas_drop(Point::new(*x, *y)).map_err(wrap)?;
            editor.palette_release();
            if let (Some(id), Some((w, h))) = (id, size) {
                editor.measure_block(id, *w, *h);
            }
        }
        SessionStep::Measure {
            block,
            width,
            height,
        } => {
            let id = block_at(editor, step, *block)?;
            editor.measure_block(id, *width, *height);
        }
        SessionStep::Click {
            block,
            x,
            y,
            modifiers,
        } => {
            let id = block_at(editor, step, *block)?;
            editor
                .block_pointer_down(id, Point::new(*x, *y), *modifiers)
                .map_err(wrap)?;
        }
        SessionStep::Resize {
            block,
            handle,
            x,
            y,
        } => {
            let id = block_at(editor, step, *block)?;
            let grabbed = editor
                .handle_pointer_down(id, *handle, Point::new(*x, *y))
                .map_err(wrap)?;
            if !grabbed {
                debug!("step {step}: handle {handle:?} not available");
            }
        }
        SessionStep::Background { modifiers } => editor.container_pointer_down(*modifiers),
        SessionStep::Move { x, y, modifiers } => {
            editor.pointer_move(Point::new(*x, *y), *modifiers);
        }
        SessionStep::Release => {
            editor.pointer_up().map_err(wrap)?;
        }
        SessionStep::Key { key, modifiers } => {
            editor
                .key_down(&KeyInput::new(key.clone(), *modifiers))
                .map_err(wrap)?;
        }
        SessionStep::Undo => {
            editor.undo().map_err(wrap)?;
        }
        SessionStep::Redo => {
            editor.redo().map_err(wrap)?;
        }
        SessionStep::Toolbar { action } => editor.toolbar(*action).map_err(wrap)?,
        SessionStep::Menu { block, action } => {
            let id = block_at(editor, step, *block)?;
            editor.context_menu(id, *action).map_err(wrap)?;
        }
        SessionStep::SetProp { block, name, value } => {
            let id = block_at(editor, step, *block)?;
            let mut panel = editor.property_editor();
            panel.select(editor.layout(), Some(id));
            panel.set_prop(name.clone(), value.clone());
            editor.apply_properties(&panel).map_err(wrap)?;
        }
        SessionStep::Bind { block, field, key } => {
            let id = block_at(editor, step, *block)?;
            let mut panel = editor.property_editor();
            panel.select(editor.layout(), Some(id));
            panel.set_model_binding(field.clone(), key.clone());
            editor.apply_properties(&panel).map_err(wrap)?;
        }
        SessionStep::Container { width, height } => {
            let mut panel = editor.property_editor();
            panel.select(editor.layout(), None);
            panel.set_container_size(*width, *height);
            editor.apply_properties(&panel).map_err(wrap)?;
        }
        SessionStep::Import { json } => editor.import_json(json).map_err(wrap)?,
        SessionStep::Form { key, value } => {
            editor.form_data_mut().insert(key.clone(), value.clone());
        }
    }
    Ok(())
}

/// Replay `steps` in order, stopping at the first error.
pub fn run_steps<O>(editor: &mut Editor<O>, steps: &[SessionStep]) -> Result<(), SessionError> {
    for (index, step) in steps.iter().enumerate() {
        debug!("step {index}: {step:?}");
        apply_step(editor, index, step)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::demo_registry;
    use blockdraft_core::{Container, EditorConfig, NoDialogs};

    fn editor() -> Editor<String> {
        let config = EditorConfig {
            container: Container::new(500.0, 300.0),
            ..EditorConfig::default()
        };
        Editor::new(config, demo_registry(), Box::new(NoDialogs)).unwrap()
    }

    #[test]
    fn test_parse_script() {
        let steps = parse_script(
            r#"[
                {"op": "drop", "component": "button", "x": 50, "y": 50, "size": [40, 20]},
                {"op": "click", "block": 0, "x": 35, "y": 45},
                {"op": "move", "x": 135, "y": 95, "modifiers": {"shift": true}},
                {"op": "release"},
                {"op": "toolbar", "action": "undo"},
                {"op": "redo"},
                {"op": "resize", "block": 0, "handle": "bottom_right", "x": 0, "y": 0}
            ]"#,
        )
        .unwrap();
        assert_eq!(steps.len(), 7);
        assert!(matches!(steps[2], SessionStep::Move { modifiers, .. } if modifiers.shift));
    }

    #[test]
    fn test_parse_rejects_unknown_op() {
        assert!(matches!(
            parse_script(r#"[{"op": "teleport"}]"#),
            Err(SessionError::Script(_))
        ));
    }

    #[test]
    fn test_scenario_insert_move_undo() {
        let mut editor = editor();
        let steps = parse_script(
            r#"[
                {"op": "drop", "component": "button", "x": 50, "y": 50, "size": [40, 20]},
                {"op": "click", "block": 0, "x": 35, "y": 45},
                {"op": "move", "x": 135, "y": 95},
                {"op": "release"}
            ]"#,
        )
        .unwrap();
        run_steps(&mut editor, &steps).unwrap();
        let block = &editor.layout().blocks[0];
        assert_eq!((block.left, block.top), (130.0, 90.0));
        assert_eq!(editor.commander().len(), 2);

        run_steps(&mut editor, &[SessionStep::Toolbar { action: ToolbarAction::Undo }]).unwrap();
        let block = &editor.layout().blocks[0];
        assert_eq!((block.left, block.top), (30.0, 40.0));
    }

    #[test]
    fn test_missing_block_reports_step() {
        let mut editor = editor();
        let err = run_steps(&mut editor, &[SessionStep::Release, SessionStep::Measure {
            block: 3,
            width: 1.0,
            height: 1.0,
        }])
        .unwrap_err();
        assert!(matches!(err, SessionError::NoSuchBlock { step: 1, index: 3 }));
    }

    #[test]
    fn test_panel_steps() {
        let mut editor = editor();
        let steps = vec![
            SessionStep::Drop {
                component: "input".to_string(),
                x: 100.0,
                y: 100.0,
                size: Some((80.0, 20.0)),
            },
            SessionStep::Bind {
                block: 0,
                field: "default".to_string(),
                key: "username".to_string(),
            },
            SessionStep::Container {
                width: 640.0,
                height: 480.0,
            },
        ];
        run_steps(&mut editor, &steps).unwrap();
        assert_eq!(editor.layout().blocks[0].model["default"], "username");
        assert_eq!(editor.layout().container, Container::new(640.0, 480.0));
        assert_eq!(editor.commander().len(), 3);
    }
}
