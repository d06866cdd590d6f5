//! Headless application state: an editor with the demo components, fed from
//! files.

use anyhow::{Context, Result};
use blockdraft_core::{Editor, EditorConfig, Layout, NoDialogs};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::components::demo_registry;
use crate::session::{self, SessionStep};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub editor: EditorConfig,
    /// Pretty-print exported layouts.
    pub pretty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "BlockDraft".to_string(),
            editor: EditorConfig::default(),
            pretty: true,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    editor: Editor<String>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let editor = Editor::new(config.editor.clone(), demo_registry(), Box::new(NoDialogs))?;
        info!("{} ready", config.title);
        Ok(Self { config, editor })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn editor(&self) -> &Editor<String> {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor<String> {
        &mut self.editor
    }

    /// Replace the layout with the contents of a layout file.
    pub fn load_layout(&mut self, path: &Path) -> Result<()> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading layout {}", path.display()))?;
        let layout = Layout::from_json(&json)
            .with_context(|| format!("parsing layout {}", path.display()))?;
        info!("Loaded {} blocks from {}", layout.len(), path.display());
        self.editor.set_layout(layout);
        Ok(())
    }

    /// Replay a script of session steps.
    pub fn run_script(&mut self, steps: &[SessionStep]) -> Result<()> {
        session::run_steps(&mut self.editor, steps)?;
        info!(
            "Replayed {} steps, {} undo entries",
            steps.len(),
            self.editor.commander().len()
        );
        Ok(())
    }

    /// Replay a script file.
    pub fn run_script_file(&mut self, path: &Path) -> Result<()> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        let steps = session::parse_script(&json)
            .with_context(|| format!("parsing script {}", path.display()))?;
        self.run_script(&steps)
    }

    /// One rendered line per block, in layout order.
    pub fn outline(&self) -> Result<Vec<String>> {
        let rendered = self.editor.render(None)?;
        Ok(self
            .editor
            .layout()
            .blocks
            .iter()
            .zip(rendered)
            .map(|(block, line)| {
                let focus = if block.focus { "*" } else { " " };
                format!(
                    "{focus} z={:<3} ({}, {}) {line}",
                    block.z_index, block.left, block.top
                )
            })
            .collect())
    }

    /// Current layout as JSON.
    pub fn layout_json(&self) -> Result<String> {
        let layout = self.editor.layout();
        let json = if self.config.pretty {
            layout.to_json_pretty()?
        } else {
            layout.to_json()?
        };
        Ok(json)
    }

    /// Write the layout to `path`.
    pub fn save_layout(&self, path: &Path) -> Result<()> {
        let json = self.layout_json()?;
        std::fs::write(path, json).with_context(|| format!("writing layout {}", path.display()))?;
        info!("Saved layout to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: AppConfig = serde_json::from_str(r#"{"pretty": false}"#).unwrap();
        assert!(!config.pretty);
        assert_eq!(config.title, "BlockDraft");
        assert_eq!(config.editor, EditorConfig::default());
    }

    #[test]
    fn test_outline_marks_focus() {
        let mut app = App::new(AppConfig::default()).unwrap();
        let steps = session::parse_script(
            r#"[
                {"op": "drop", "component": "text", "x": 20, "y": 20},
                {"op": "drop", "component": "image", "x": 200, "y": 200, "size": [100, 100]},
                {"op": "click", "block": 1, "x": 160, "y": 160}
            ]"#,
        )
        .unwrap();
        app.run_script(&steps).unwrap();

        let outline = app.outline().unwrap();
        assert_eq!(outline.len(), 2);
        assert!(outline[0].starts_with("  z=0"));
        assert_eq!(outline[1], "* z=0   (150, 150) image default-img.jpg [100x100]");
    }
}
