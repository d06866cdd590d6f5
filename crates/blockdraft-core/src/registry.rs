//! Component registry: what can be dropped on the canvas and how it renders.
//!
//! The engine never interprets a block's props or model bindings. It only
//! reads each component's resize capability and hands the renderer a
//! [`RenderContext`] with the bindings resolved against form data.

use crate::drag::ResizeCapability;
use crate::error::{EditorError, EditorResult};
use crate::layout::Block;
use kurbo::Size;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Values bound to components through their model fields.
pub type FormData = Map<String, Value>;

/// Model field name of a component's primary value.
pub const DEFAULT_MODEL_FIELD: &str = "default";

/// One choice in a select property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A column of a table property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub label: String,
    pub field: String,
}

/// Layout of a table property: its columns and the field shown as summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOption {
    pub columns: Vec<TableColumn>,
    pub show_key: String,
}

/// Kind of editor widget used for a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropKind {
    Input,
    Color,
    Select { options: Vec<SelectOption> },
    Table { table: TableOption },
}

/// Metadata for one editable property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropSpec {
    pub label: String,
    pub kind: PropKind,
}

impl PropSpec {
    pub fn input(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: PropKind::Input,
        }
    }

    pub fn color(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: PropKind::Color,
        }
    }

    pub fn select(label: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self {
            label: label.into(),
            kind: PropKind::Select { options },
        }
    }

    pub fn table(label: impl Into<String>, table: TableOption) -> Self {
        Self {
            label: label.into(),
            kind: PropKind::Table { table },
        }
    }
}

/// A model field resolved against form data.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBinding {
    /// Form data key the block binds this field to.
    pub key: Option<String>,
    /// Current value, `None` when unbound or unset.
    pub value: Option<Value>,
}

impl ModelBinding {
    /// Write a new value back to form data. Unbound fields are ignored.
    pub fn write(&self, form_data: &mut FormData, value: Value) -> bool {
        match &self.key {
            Some(key) => {
                form_data.insert(key.clone(), value);
                true
            }
            None => false,
        }
    }
}

/// Everything a renderer needs to draw one block.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub props: &'a Map<String, Value>,
    /// Model field name -> binding.
    pub model: BTreeMap<String, ModelBinding>,
    /// Explicit size, only for blocks that were resized.
    pub size: Option<Size>,
    /// Host-provided extra props for the block's slot name.
    pub custom: Option<&'a Value>,
}

impl<'a> RenderContext<'a> {
    /// Resolve `block` for `component`.
    pub fn new<O>(
        block: &'a Block,
        component: &Component<O>,
        form_data: &FormData,
        custom_props: Option<&'a FormData>,
    ) -> Self {
        let model = component
            .model
            .iter()
            .map(|(field, _)| {
                let key = block.model.get(field).cloned();
                let value = key.as_ref().and_then(|k| form_data.get(k)).cloned();
                (field.clone(), ModelBinding { key, value })
            })
            .collect();
        let size = block.has_resize.then(|| block.size());
        let custom = block
            .slot_name
            .as_ref()
            .zip(custom_props)
            .and_then(|(slot, props)| props.get(slot));
        Self {
            props: &block.props,
            model,
            size,
            custom,
        }
    }

    /// String property, if set.
    pub fn prop_str(&self, name: &str) -> Option<&str> {
        self.props.get(name).and_then(Value::as_str)
    }

    /// Binding for a model field.
    pub fn binding(&self, field: &str) -> Option<&ModelBinding> {
        self.model.get(field)
    }
}

/// Draws a component. `Output` is whatever the host renders to.
pub trait ComponentRender {
    type Output;

    /// Palette preview.
    fn preview(&self) -> Self::Output;

    /// Canvas rendering of a placed block.
    fn render(&self, ctx: &RenderContext<'_>) -> Self::Output;
}

/// A component type available in the palette.
pub struct Component<O> {
    pub label: String,
    pub renderer: Box<dyn ComponentRender<Output = O>>,
    /// Editable properties in display order.
    pub props: Vec<(String, PropSpec)>,
    /// Model field name -> label, in display order.
    pub model: Vec<(String, String)>,
    pub resize: ResizeCapability,
}

impl<O> std::fmt::Debug for Component<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("label", &self.label)
            .field("props", &self.props)
            .field("model", &self.model)
            .field("resize", &self.resize)
            .finish()
    }
}

impl<O> Component<O> {
    pub fn new(label: impl Into<String>, renderer: impl ComponentRender<Output = O> + 'static) -> Self {
        Self {
            label: label.into(),
            renderer: Box::new(renderer),
            props: Vec::new(),
            model: Vec::new(),
            resize: ResizeCapability::NONE,
        }
    }

    pub fn with_prop(mut self, name: impl Into<String>, spec: PropSpec) -> Self {
        self.props.push((name.into(), spec));
        self
    }

    pub fn with_model(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.model.push((field.into(), label.into()));
        self
    }

    pub fn with_resize(mut self, resize: ResizeCapability) -> Self {
        self.resize = resize;
        self
    }

    pub fn prop(&self, name: &str) -> Option<&PropSpec> {
        self.props.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }
}

/// Registered components, in registration order.
pub struct ComponentRegistry<O> {
    components: Vec<(String, Component<O>)>,
}

impl<O> Default for ComponentRegistry<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> std::fmt::Debug for ComponentRegistry<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.components.iter().map(|(k, _)| k))
            .finish()
    }
}

impl<O> ComponentRegistry<O> {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Register a component. An existing key is replaced in place.
    pub fn register(&mut self, key: impl Into<String>, component: Component<O>) {
        let key = key.into();
        match self.components.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => {
                warn!("Replacing component {key:?}");
                entry.1 = component;
            }
            None => self.components.push((key, component)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Component<O>> {
        self.components
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, c)| c)
    }

    /// Components in palette order.
    pub fn components(&self) -> impl Iterator<Item = (&str, &Component<O>)> {
        self.components.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Resize capability of a component, none for unknown keys.
    pub fn resize_capability(&self, key: &str) -> ResizeCapability {
        self.get(key).map(|c| c.resize).unwrap_or_default()
    }

    /// Palette preview of a component.
    pub fn preview(&self, key: &str) -> EditorResult<O> {
        let component = self
            .get(key)
            .ok_or_else(|| EditorError::UnknownComponent(key.to_string()))?;
        Ok(component.renderer.preview())
    }

    /// Render a placed block.
    pub fn render_block(
        &self,
        block: &Block,
        form_data: &FormData,
        custom_props: Option<&FormData>,
    ) -> EditorResult<O> {
        let component = self
            .get(&block.component_key)
            .ok_or_else(|| EditorError::UnknownComponent(block.component_key.clone()))?;
        let ctx = RenderContext::new(block, component, form_data, custom_props);
        Ok(component.renderer.render(&ctx))
    }
}
