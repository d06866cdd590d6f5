//! Layout document: the container and the blocks placed on it.

use crate::error::EditorResult;
use kurbo::{Point, Rect, Size};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// Stable identity of a placed block.
pub type BlockId = Uuid;

fn new_block_id() -> BlockId {
    Uuid::new_v4()
}

/// One placed component instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Identity used for update-by-reference lookups.
    #[serde(default = "new_block_id")]
    pub id: BlockId,
    /// Key of the component in the registry.
    pub component_key: String,
    /// Distance from the container's top edge.
    pub top: f64,
    /// Distance from the container's left edge.
    pub left: f64,
    /// Rendered width (absent until first measured).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Rendered height (absent until first measured).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Stacking order, compared relative to other blocks.
    #[serde(default)]
    pub z_index: i32,
    /// Whether the block is selected.
    #[serde(default)]
    pub focus: bool,
    /// Recenter on the drop point when the real size is first known.
    #[serde(default)]
    pub adjust_position: bool,
    /// The renderer should apply explicit pixel dimensions.
    #[serde(default)]
    pub has_resize: bool,
    /// Component properties, interpreted by the renderer only.
    #[serde(default)]
    pub props: Map<String, Value>,
    /// Model field name -> form data key.
    #[serde(default)]
    pub model: BTreeMap<String, String>,
    /// Name of a custom slot / custom props entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_name: Option<String>,
}

impl Block {
    /// Create a freshly dropped block at the given point.
    pub fn new(component_key: impl Into<String>, top: f64, left: f64) -> Self {
        Self {
            id: new_block_id(),
            component_key: component_key.into(),
            top,
            left,
            width: None,
            height: None,
            z_index: 0,
            focus: false,
            adjust_position: true,
            has_resize: false,
            props: Map::new(),
            model: BTreeMap::new(),
            slot_name: None,
        }
    }

    /// Top-left corner.
    pub fn position(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Move the top-left corner.
    pub fn set_position(&mut self, position: Point) {
        self.left = position.x;
        self.top = position.y;
    }

    /// Size, with unmeasured dimensions treated as zero.
    pub fn size(&self) -> Size {
        Size::new(self.width.unwrap_or(0.0), self.height.unwrap_or(0.0))
    }

    /// Bounding box in container coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position(), self.size())
    }
}

/// Size of the editing container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub width: f64,
    pub height: f64,
}

impl Container {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The container as a rectangle anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Selected and unselected blocks, derived from the `focus` flags.
#[derive(Debug, Default)]
pub struct FocusData<'a> {
    pub focus: Vec<&'a Block>,
    pub unfocus: Vec<&'a Block>,
}

impl FocusData<'_> {
    /// Owned copies of the unselected blocks.
    pub fn unfocused_cloned(&self) -> Vec<Block> {
        self.unfocus.iter().map(|&b| b.clone()).collect()
    }
}

/// A page layout: the unit of undo/redo snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub container: Container,
    /// Blocks in render order (back to front).
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Layout {
    /// Create an empty layout.
    pub fn new(container: Container) -> Self {
        Self {
            container,
            blocks: Vec::new(),
        }
    }

    /// Append a block.
    pub fn add_block(&mut self, block: Block) -> BlockId {
        let id = block.id;
        self.blocks.push(block);
        id
    }

    /// Remove a block by id.
    pub fn remove_block(&mut self, id: BlockId) -> Option<Block> {
        let index = self.index_of(id)?;
        Some(self.blocks.remove(index))
    }

    /// Replace the block list.
    pub fn set_blocks(&mut self, blocks: Vec<Block>) {
        self.blocks = blocks;
    }

    /// Position of a block in render order.
    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    /// Partition blocks into focused and unfocused. Always recomputed.
    pub fn focus_data(&self) -> FocusData<'_> {
        let mut data = FocusData::default();
        for block in &self.blocks {
            if block.focus {
                data.focus.push(block);
            } else {
                data.unfocus.push(block);
            }
        }
        data
    }

    /// Ids of focused blocks in render order.
    pub fn focused_ids(&self) -> Vec<BlockId> {
        self.blocks.iter().filter(|b| b.focus).map(|b| b.id).collect()
    }

    /// Number of focused blocks.
    pub fn focus_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.focus).count()
    }

    /// Clear the focus flag on every block except `keep`.
    pub fn clear_focus(&mut self, keep: Option<BlockId>) {
        for block in &mut self.blocks {
            if Some(block.id) != keep {
                block.focus = false;
            }
        }
    }

    /// Record the rendered size of a block.
    ///
    /// A block still waiting for its first measurement is recentered on its
    /// drop point and its `adjust_position` flag is cleared for good.
    /// Returns true if the block changed.
    pub fn measure_block(&mut self, id: BlockId, width: f64, height: f64) -> bool {
        let Some(block) = self.block_mut(id) else {
            return false;
        };
        if block.adjust_position {
            block.left -= width / 2.0;
            block.top -= height / 2.0;
            block.adjust_position = false;
            block.width = Some(width);
            block.height = Some(height);
            return true;
        }
        if block.width.is_none() || block.height.is_none() {
            block.width.get_or_insert(width);
            block.height.get_or_insert(height);
            return true;
        }
        false
    }

    /// Bounding box of all blocks.
    pub fn bounds(&self) -> Option<Rect> {
        self.blocks
            .iter()
            .map(Block::bounds)
            .reduce(|acc, r| acc.union(r))
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Serialize the layout to compact JSON.
    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize the layout to indented JSON.
    pub fn to_json_pretty(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a layout from JSON. Blocks repeating an earlier block's id
    /// get a fresh one.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let mut layout: Self = serde_json::from_str(json)?;
        layout.rekey_duplicates();
        Ok(layout)
    }

    /// Give every block whose id was already seen a new id. Returns how many
    /// blocks were re-keyed.
    pub fn rekey_duplicates(&mut self) -> usize {
        let mut seen = HashSet::new();
        let mut rekeyed = 0;
        for block in &mut self.blocks {
            if !seen.insert(block.id) {
                let id = new_block_id();
                warn!("Duplicate block id {}, re-keyed as {id}", block.id);
                block.id = id;
                seen.insert(id);
                rekeyed += 1;
            }
        }
        rekeyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(key: &str, left: f64, top: f64, w: f64, h: f64) -> Block {
        let mut block = Block::new(key, top, left);
        block.width = Some(w);
        block.height = Some(h);
        block.adjust_position = false;
        block
    }

    #[test]
    fn test_new_block_defaults() {
        let block = Block::new("button", 50.0, 60.0);
        assert!(block.adjust_position);
        assert!(!block.focus);
        assert!(!block.has_resize);
        assert_eq!(block.width, None);
        assert_eq!(block.bounds(), Rect::new(60.0, 50.0, 60.0, 50.0));
    }

    #[test]
    fn test_focus_partition_recomputed() {
        let mut layout = Layout::new(Container::new(500.0, 300.0));
        let a = layout.add_block(sized("text", 0.0, 0.0, 10.0, 10.0));
        let b = layout.add_block(sized("text", 20.0, 0.0, 10.0, 10.0));

        assert_eq!(layout.focus_data().focus.len(), 0);
        layout.block_mut(a).unwrap().focus = true;
        let data = layout.focus_data();
        assert_eq!(data.focus.len(), 1);
        assert_eq!(data.focus[0].id, a);
        assert_eq!(data.unfocus[0].id, b);
    }

    #[test]
    fn test_clear_focus_keeps_one() {
        let mut layout = Layout::default();
        let a = layout.add_block(sized("text", 0.0, 0.0, 10.0, 10.0));
        let b = layout.add_block(sized("text", 20.0, 0.0, 10.0, 10.0));
        for block in &mut layout.blocks {
            block.focus = true;
        }
        layout.clear_focus(Some(b));
        assert!(!layout.block(a).unwrap().focus);
        assert!(layout.block(b).unwrap().focus);
        layout.clear_focus(None);
        assert_eq!(layout.focus_count(), 0);
    }

    #[test]
    fn test_measure_recenters_once() {
        let mut layout = Layout::default();
        let id = layout.add_block(Block::new("button", 50.0, 50.0));

        assert!(layout.measure_block(id, 40.0, 20.0));
        let block = layout.block(id).unwrap();
        assert_eq!(block.left, 30.0);
        assert_eq!(block.top, 40.0);
        assert!(!block.adjust_position);
        assert_eq!(block.size(), Size::new(40.0, 20.0));

        // Later measurements never move it again
        assert!(!layout.measure_block(id, 80.0, 80.0));
        assert_eq!(layout.block(id).unwrap().left, 30.0);
    }

    #[test]
    fn test_measure_unknown_block() {
        let mut layout = Layout::default();
        assert!(!layout.measure_block(Uuid::new_v4(), 10.0, 10.0));
    }

    #[test]
    fn test_remove_block() {
        let mut layout = Layout::default();
        let id = layout.add_block(Block::new("text", 0.0, 0.0));
        assert!(layout.remove_block(id).is_some());
        assert!(layout.is_empty());
        assert!(layout.remove_block(id).is_none());
    }

    #[test]
    fn test_json_uses_camel_case() {
        let mut layout = Layout::new(Container::new(500.0, 300.0));
        let mut block = sized("button", 10.0, 20.0, 30.0, 40.0);
        block.z_index = 3;
        layout.add_block(block);

        let json = layout.to_json().unwrap();
        assert!(json.contains("\"componentKey\":\"button\""));
        assert!(json.contains("\"zIndex\":3"));
        assert!(json.contains("\"adjustPosition\":false"));

        let parsed = Layout::from_json(&json).unwrap();
        assert_eq!(parsed, layout);
    }

    #[test]
    fn test_json_missing_fields_get_defaults() {
        let json = r#"{"container":{"width":500,"height":300},
            "blocks":[{"componentKey":"text","top":1,"left":2}]}"#;
        let layout = Layout::from_json(json).unwrap();
        let block = &layout.blocks[0];
        assert_eq!(block.z_index, 0);
        assert!(!block.focus);
        assert!(block.props.is_empty());
        assert_eq!(block.width, None);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(Layout::from_json("{not json").is_err());
        assert!(Layout::from_json(r#"{"blocks":[]}"#).is_err());
    }

    #[test]
    fn test_json_duplicate_ids_are_rekeyed() {
        let id = new_block_id();
        let json = format!(
            r#"{{"container":{{"width":500,"height":300}},
            "blocks":[{{"id":"{id}","componentKey":"text","top":1,"left":2}},
                      {{"id":"{id}","componentKey":"button","top":3,"left":4}}]}}"#
        );
        let mut layout = Layout::from_json(&json).unwrap();
        assert_eq!(layout.blocks[0].id, id);
        assert_ne!(layout.blocks[1].id, id);
        assert_eq!(layout.block(id).unwrap().component_key, "text");
        assert_eq!(layout.rekey_duplicates(), 0);

        let copy = layout.blocks[0].clone();
        layout.blocks.push(copy);
        assert_eq!(layout.rekey_duplicates(), 1);
        assert_eq!(layout.blocks[0].id, id);
        assert_ne!(layout.blocks[2].id, id);
        assert_ne!(layout.blocks[2].id, layout.blocks[1].id);
    }

    #[test]
    fn test_layout_bounds() {
        let mut layout = Layout::default();
        assert!(layout.bounds().is_none());
        layout.add_block(sized("a", 0.0, 0.0, 10.0, 10.0));
        layout.add_block(sized("b", 50.0, 20.0, 10.0, 10.0));
        assert_eq!(layout.bounds(), Some(Rect::new(0.0, 0.0, 60.0, 30.0)));
    }
}
