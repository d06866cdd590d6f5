//! Keyboard shortcut registry and documentation.

use blockdraft_core::KeyCombo;
use blockdraft_core::commands::{DELETE, PLACE_BOTTOM, PLACE_TOP, SELECT_ALL};
use blockdraft_core::history::{REDO, UNDO};

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    /// Command the shortcut invokes.
    pub command: &'static str,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        command: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            command,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// The binding as the editor matches it.
    pub fn combo(&self) -> Option<KeyCombo> {
        self.format().parse().ok()
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, UNDO, "Undo"),
            Shortcut::new("Y", true, false, REDO, "Redo"),
            Shortcut::new("Z", true, true, REDO, "Redo"),
            Shortcut::new("A", true, false, SELECT_ALL, "Select all blocks"),
            Shortcut::new("Up", true, false, PLACE_TOP, "Bring selection to front"),
            Shortcut::new("Down", true, false, PLACE_BOTTOM, "Send selection to back"),
            Shortcut::new("Delete", false, false, DELETE, "Delete selected blocks"),
            Shortcut::new("Backspace", false, false, DELETE, "Delete selected blocks"),
            Shortcut::new("D", true, false, DELETE, "Delete selected blocks"),
        ]
    }

    /// Pointer gestures that depend on held modifiers.
    pub fn gestures() -> Vec<(&'static str, &'static str)> {
        vec![
            ("Shift+Click", "Add or remove a block from the selection"),
            ("Shift+Drag", "Lock movement to the dominant axis"),
        ]
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        for (gesture, description) in Self::gestures() {
            println!("  {gesture:20} {description}");
        }
        println!();
    }
}
