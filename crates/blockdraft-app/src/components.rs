//! Demo component set rendered as plain text.

use blockdraft_core::registry::{
    Component, ComponentRegistry, ComponentRender, DEFAULT_MODEL_FIELD, PropSpec,
    RenderContext, SelectOption, TableColumn, TableOption,
};
use blockdraft_core::ResizeCapability;
use serde_json::Value;

fn size_suffix(ctx: &RenderContext<'_>) -> String {
    match ctx.size {
        Some(size) => format!(" [{}x{}]", size.width, size.height),
        None => String::new(),
    }
}

fn bound_value(ctx: &RenderContext<'_>, field: &str) -> String {
    match ctx.binding(field) {
        Some(binding) => match (&binding.key, &binding.value) {
            (Some(key), Some(Value::String(s))) => format!("{key}={s:?}"),
            (Some(key), Some(value)) => format!("{key}={value}"),
            (Some(key), None) => format!("{key}=<unset>"),
            (None, _) => "<unbound>".to_string(),
        },
        None => "<unbound>".to_string(),
    }
}

struct TextView;

impl ComponentRender for TextView {
    type Output = String;

    fn preview(&self) -> String {
        "Preview text".to_string()
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let text = ctx.prop_str("text").unwrap_or("Text");
        let mut out = format!("text {text:?}");
        if let Some(color) = ctx.prop_str("color") {
            out.push_str(&format!(" color={color}"));
        }
        if let Some(size) = ctx.prop_str("size") {
            out.push_str(&format!(" size={size}"));
        }
        out
    }
}

struct ButtonView;

impl ComponentRender for ButtonView {
    type Output = String;

    fn preview(&self) -> String {
        "[ Button ]".to_string()
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let text = ctx.prop_str("text").unwrap_or("Button");
        let kind = ctx.prop_str("type").unwrap_or("default");
        format!("button [ {text} ] type={kind}{}", size_suffix(ctx))
    }
}

struct InputView;

impl ComponentRender for InputView {
    type Output = String;

    fn preview(&self) -> String {
        "[______]".to_string()
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        format!(
            "input {}{}",
            bound_value(ctx, DEFAULT_MODEL_FIELD),
            size_suffix(ctx)
        )
    }
}

struct SelectView;

impl ComponentRender for SelectView {
    type Output = String;

    fn preview(&self) -> String {
        "[ v ]".to_string()
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let labels: Vec<&str> = ctx
            .props
            .get("options")
            .and_then(Value::as_array)
            .map(|options| {
                options
                    .iter()
                    .filter_map(|o| o.get("label").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();
        format!(
            "select {} options=[{}]",
            bound_value(ctx, DEFAULT_MODEL_FIELD),
            labels.join(", ")
        )
    }
}

struct NumberRangeView;

impl ComponentRender for NumberRangeView {
    type Output = String;

    fn preview(&self) -> String {
        "[ 0 ] - [ 0 ]".to_string()
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        format!(
            "number-range {} .. {}{}",
            bound_value(ctx, "start"),
            bound_value(ctx, "end"),
            size_suffix(ctx)
        )
    }
}

struct ImageView;

impl ComponentRender for ImageView {
    type Output = String;

    fn preview(&self) -> String {
        "[image]".to_string()
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let url = ctx.prop_str("url").unwrap_or("default-img.jpg");
        // Images fall back to 100x100 when never resized
        let (w, h) = ctx
            .size
            .map(|s| (s.width, s.height))
            .unwrap_or((100.0, 100.0));
        format!("image {url} [{w}x{h}]")
    }
}

/// Registry with the demo components, in palette order.
pub fn demo_registry() -> ComponentRegistry<String> {
    let mut registry = ComponentRegistry::new();

    registry.register(
        "text",
        Component::new("Text", TextView)
            .with_prop("text", PropSpec::input("Text"))
            .with_prop("color", PropSpec::color("Font color"))
            .with_prop(
                "size",
                PropSpec::select(
                    "Font size",
                    ["14px", "16px", "18px", "24px"]
                        .into_iter()
                        .map(|s| SelectOption::new(s, s))
                        .collect(),
                ),
            ),
    );

    registry.register(
        "button",
        Component::new("Button", ButtonView)
            .with_prop("text", PropSpec::input("Text"))
            .with_prop(
                "type",
                PropSpec::select(
                    "Button type",
                    vec![
                        SelectOption::new("Primary", "primary"),
                        SelectOption::new("Success", "success"),
                        SelectOption::new("Info", "info"),
                        SelectOption::new("Warning", "warning"),
                        SelectOption::new("Danger", "danger"),
                    ],
                ),
            )
            .with_prop(
                "size",
                PropSpec::select(
                    "Button size",
                    vec![
                        SelectOption::new("Default", ""),
                        SelectOption::new("Medium", "medium"),
                        SelectOption::new("Small", "small"),
                        SelectOption::new("Mini", "mini"),
                    ],
                ),
            )
            .with_resize(ResizeCapability::BOTH),
    );

    registry.register(
        "input",
        Component::new("Input", InputView)
            .with_model(DEFAULT_MODEL_FIELD, "Bound field")
            .with_resize(ResizeCapability::BOTH),
    );

    registry.register(
        "select",
        Component::new("Select", SelectView)
            .with_prop(
                "options",
                PropSpec::table(
                    "Options",
                    TableOption {
                        columns: vec![
                            TableColumn {
                                label: "Label".to_string(),
                                field: "label".to_string(),
                            },
                            TableColumn {
                                label: "Value".to_string(),
                                field: "value".to_string(),
                            },
                            TableColumn {
                                label: "Comment".to_string(),
                                field: "comments".to_string(),
                            },
                        ],
                        show_key: "label".to_string(),
                    },
                ),
            )
            .with_model(DEFAULT_MODEL_FIELD, "Bound field"),
    );

    registry.register(
        "number-range",
        Component::new("Number range", NumberRangeView)
            .with_model("start", "Start field")
            .with_model("end", "End field")
            .with_resize(ResizeCapability {
                width: false,
                height: true,
            }),
    );

    registry.register(
        "image",
        Component::new("Image", ImageView)
            .with_prop("url", PropSpec::input("Address"))
            .with_resize(ResizeCapability::BOTH),
    );

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockdraft_core::registry::FormData;
    use blockdraft_core::{Block, ResizeHandle};
    use serde_json::json;

    #[test]
    fn test_palette_order() {
        let registry = demo_registry();
        let keys: Vec<&str> = registry.components().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["text", "button", "input", "select", "number-range", "image"]
        );
    }

    #[test]
    fn test_resize_capabilities() {
        let registry = demo_registry();
        assert!(registry.resize_capability("text").handles().is_empty());
        assert_eq!(
            registry.resize_capability("number-range").handles(),
            vec![ResizeHandle::Top, ResizeHandle::Bottom]
        );
        assert_eq!(registry.resize_capability("image").handles().len(), 8);
    }

    #[test]
    fn test_render_text_props() {
        let registry = demo_registry();
        let mut block = Block::new("text", 0.0, 0.0);
        block.props.insert("text".to_string(), json!("Hello"));
        block.props.insert("color".to_string(), json!("#f00"));
        let out = registry.render_block(&block, &FormData::new(), None).unwrap();
        assert_eq!(out, "text \"Hello\" color=#f00");
    }

    #[test]
    fn test_render_input_binding() {
        let registry = demo_registry();
        let mut block = Block::new("input", 0.0, 0.0);
        block
            .model
            .insert(DEFAULT_MODEL_FIELD.to_string(), "username".to_string());
        let mut form = FormData::new();
        form.insert("username".to_string(), json!("ada"));
        let out = registry.render_block(&block, &form, None).unwrap();
        assert_eq!(out, "input username=\"ada\"");
    }

    #[test]
    fn test_render_image_default_size() {
        let registry = demo_registry();
        let block = Block::new("image", 0.0, 0.0);
        let out = registry.render_block(&block, &FormData::new(), None).unwrap();
        assert_eq!(out, "image default-img.jpg [100x100]");
    }

    #[test]
    fn test_render_select_options() {
        let registry = demo_registry();
        let mut block = Block::new("select", 0.0, 0.0);
        block.props.insert(
            "options".to_string(),
            json!([{"label": "One", "value": "1"}, {"label": "Two", "value": "2"}]),
        );
        let out = registry.render_block(&block, &FormData::new(), None).unwrap();
        assert_eq!(out, "select <unbound> options=[One, Two]");
    }
}
