//! In-memory block editor shared by the landing page and product design editors.
//!
//! The editor owns an ordered list of [`Block`]s plus an optional selection.
//! Every mutation keeps `order` dense (`0..n`) so the list can be persisted
//! without a separate renumbering step.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::domain::blocks::{Block, BlockContent, BlockStyles};
use crate::domain::entities::{PageComponentRecord, ProductComponent};
use crate::domain::types::BlockKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("block `{id}` not found")]
    NotFound { id: Uuid },
    #[error("block `{id}` is {expected}, cannot replace its content with {found}")]
    KindMismatch {
        id: Uuid,
        expected: BlockKind,
        found: BlockKind,
    },
    #[error("index {index} is out of range for {len} blocks")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("unknown block type `{type_name}`")]
    UnknownType { type_name: String },
    #[error("invalid {kind} content: {message}")]
    InvalidContent { kind: BlockKind, message: String },
}

/// A block as submitted by an editor client on save.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub styles: Value,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default)]
pub struct BlockEditor {
    blocks: Vec<Block>,
    selected: Option<Uuid>,
}

impl BlockEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an editor from stored blocks, sorted by their `order`.
    pub fn from_blocks(mut blocks: Vec<Block>) -> Self {
        blocks.sort_by_key(|block| block.order);
        let mut editor = Self {
            blocks,
            selected: None,
        };
        editor.renumber();
        editor
    }

    /// Build an editor from submitted components, in submission order.
    ///
    /// Unlike loading stored rows, submitted content is decoded strictly.
    pub fn from_inputs(
        inputs: Vec<ComponentInput>,
        brand_id: Option<Uuid>,
    ) -> Result<Self, EditorError> {
        let mut blocks = Vec::with_capacity(inputs.len());
        for (position, input) in inputs.into_iter().enumerate() {
            let kind = BlockKind::parse(&input.component_type).ok_or_else(|| {
                EditorError::UnknownType {
                    type_name: input.component_type.clone(),
                }
            })?;
            let content = BlockContent::from_parts(kind, &input.content).map_err(|err| {
                EditorError::InvalidContent {
                    kind,
                    message: err.to_string(),
                }
            })?;

            blocks.push(Block {
                id: input.id.unwrap_or_else(Uuid::new_v4),
                content,
                styles: BlockStyles::from_value(&input.styles),
                order: position as i32,
                is_active: input.is_active,
                brand_id,
            });
        }

        Ok(Self::from_blocks(blocks))
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn selected(&self) -> Option<&Block> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Append a block with the default content and styles for `kind` and
    /// select it.
    pub fn add(&mut self, kind: BlockKind, brand_id: Option<Uuid>) -> Uuid {
        self.push(
            BlockContent::template(kind),
            BlockStyles::template(kind),
            brand_id,
        )
    }

    /// Append a block with explicit content and select it.
    pub fn push(
        &mut self,
        content: BlockContent,
        styles: BlockStyles,
        brand_id: Option<Uuid>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let order = self.blocks.len() as i32;
        self.blocks.push(Block {
            id,
            content,
            styles,
            order,
            is_active: true,
            brand_id,
        });
        self.selected = Some(id);
        id
    }

    /// Replace the content and/or styles of one block.
    ///
    /// Content must keep the block's variant.
    pub fn update(
        &mut self,
        id: Uuid,
        content: Option<BlockContent>,
        styles: Option<BlockStyles>,
    ) -> Result<(), EditorError> {
        let block = self
            .blocks
            .iter_mut()
            .find(|block| block.id == id)
            .ok_or(EditorError::NotFound { id })?;

        if let Some(content) = &content
            && content.kind() != block.kind()
        {
            return Err(EditorError::KindMismatch {
                id,
                expected: block.kind(),
                found: content.kind(),
            });
        }

        if let Some(content) = content {
            block.content = content;
        }
        if let Some(styles) = styles {
            block.styles = styles;
        }
        Ok(())
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Block, EditorError> {
        let index = self.index_of(id)?;
        let removed = self.blocks.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.renumber();
        Ok(removed)
    }

    pub fn select(&mut self, id: Uuid) -> Result<(), EditorError> {
        self.index_of(id)?;
        self.selected = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Move a block to `index`, shifting the blocks in between.
    pub fn move_to(&mut self, id: Uuid, index: usize) -> Result<(), EditorError> {
        let len = self.blocks.len();
        if index >= len {
            return Err(EditorError::IndexOutOfRange { index, len });
        }
        let current = self.index_of(id)?;
        let block = self.blocks.remove(current);
        self.blocks.insert(index, block);
        self.renumber();
        Ok(())
    }

    /// Flip a block's visibility on public pages. Returns the new state.
    pub fn toggle_active(&mut self, id: Uuid) -> Result<bool, EditorError> {
        let index = self.index_of(id)?;
        let block = &mut self.blocks[index];
        block.is_active = !block.is_active;
        Ok(block.is_active)
    }

    fn index_of(&self, id: Uuid) -> Result<usize, EditorError> {
        self.blocks
            .iter()
            .position(|block| block.id == id)
            .ok_or(EditorError::NotFound { id })
    }

    fn renumber(&mut self) {
        for (position, block) in self.blocks.iter_mut().enumerate() {
            block.order = position as i32;
        }
    }

    /// Stored components for the product design document.
    pub fn to_product_components(&self) -> Result<Vec<ProductComponent>, serde_json::Error> {
        self.blocks
            .iter()
            .map(|block| {
                Ok(ProductComponent {
                    id: block.id,
                    component_type: block.kind().as_str().to_string(),
                    content: block.content.content_value()?,
                    styles: block.styles.to_value(),
                    order: block.order,
                    is_active: block.is_active,
                })
            })
            .collect()
    }

    /// Stored rows for a landing page, with dense positions.
    pub fn to_page_components(
        &self,
        page_id: Uuid,
    ) -> Result<Vec<PageComponentRecord>, serde_json::Error> {
        self.blocks
            .iter()
            .map(|block| {
                Ok(PageComponentRecord {
                    id: block.id,
                    page_id,
                    component_type: block.kind().as_str().to_string(),
                    content: block.content.content_value()?,
                    styles: block.styles.to_value(),
                    position: block.order,
                    is_active: block.is_active,
                })
            })
            .collect()
    }
}

/// Load product design components into editor blocks. Components with an
/// unrecognised type are skipped.
pub fn blocks_from_product_components(components: &[ProductComponent]) -> Vec<Block> {
    components
        .iter()
        .filter_map(|component| {
            stored_block(
                component.id,
                &component.component_type,
                &component.content,
                &component.styles,
                component.order,
                component.is_active,
            )
        })
        .collect()
}

/// Load landing page rows into editor blocks. Rows with an unrecognised type
/// are skipped.
pub fn blocks_from_page_components(rows: &[PageComponentRecord], brand_id: Uuid) -> Vec<Block> {
    rows.iter()
        .filter_map(|row| {
            stored_block(
                row.id,
                &row.component_type,
                &row.content,
                &row.styles,
                row.position,
                row.is_active,
            )
            .map(|block| Block {
                brand_id: Some(brand_id),
                ..block
            })
        })
        .collect()
}

fn stored_block(
    id: Uuid,
    type_name: &str,
    content: &serde_json::Value,
    styles: &serde_json::Value,
    order: i32,
    is_active: bool,
) -> Option<Block> {
    let Some(kind) = BlockKind::parse(type_name) else {
        warn!(
            target = "brandpage::domain::editor",
            block_id = %id,
            type_name,
            "skipping stored block with unknown type"
        );
        return None;
    };

    Some(Block {
        id,
        content: BlockContent::from_parts_lossy(kind, content),
        styles: BlockStyles::from_value(styles),
        order,
        is_active,
        brand_id: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::blocks::TextContent;

    fn orders(editor: &BlockEditor) -> Vec<i32> {
        editor.blocks().iter().map(|block| block.order).collect()
    }

    #[test]
    fn add_selects_new_block_with_defaults() {
        let mut editor = BlockEditor::new();
        let id = editor.add(BlockKind::Hero, None);

        let selected = editor.selected().expect("selection");
        assert_eq!(selected.id, id);
        assert_eq!(selected.content, BlockContent::template(BlockKind::Hero));
        assert_eq!(selected.styles, BlockStyles::template(BlockKind::Hero));
    }

    #[test]
    fn add_then_delete_restores_length() {
        let mut editor = BlockEditor::new();
        editor.add(BlockKind::Heading, None);
        editor.add(BlockKind::Text, None);
        let before = editor.len();

        let id = editor.add(BlockKind::Image, None);
        editor.delete(id).expect("delete");

        assert_eq!(editor.len(), before);
        assert!(editor.get(id).is_none());
        assert!(editor.selected().is_none());
        assert_eq!(orders(&editor), vec![0, 1]);
    }

    #[test]
    fn delete_keeps_selection_of_other_block() {
        let mut editor = BlockEditor::new();
        let first = editor.add(BlockKind::Heading, None);
        let second = editor.add(BlockKind::Text, None);
        editor.select(first).expect("select");

        editor.delete(second).expect("delete");
        assert_eq!(editor.selected().map(|b| b.id), Some(first));
    }

    #[test]
    fn update_touches_only_target_block() {
        let mut editor = BlockEditor::new();
        let first = editor.add(BlockKind::Text, None);
        let second = editor.add(BlockKind::Text, None);
        let untouched = editor.get(second).cloned().expect("second");

        editor
            .update(
                first,
                Some(BlockContent::Text(TextContent {
                    text: "Updated".into(),
                    ..TextContent::default()
                })),
                None,
            )
            .expect("update");

        assert_eq!(
            editor.get(first).map(|b| &b.content),
            Some(&BlockContent::Text(TextContent {
                text: "Updated".into(),
                ..TextContent::default()
            }))
        );
        assert_eq!(editor.get(second), Some(&untouched));
    }

    #[test]
    fn update_rejects_variant_change() {
        let mut editor = BlockEditor::new();
        let id = editor.add(BlockKind::Text, None);

        let err = editor
            .update(id, Some(BlockContent::template(BlockKind::Hero)), None)
            .expect_err("kind mismatch");
        assert_eq!(
            err,
            EditorError::KindMismatch {
                id,
                expected: BlockKind::Text,
                found: BlockKind::Hero
            }
        );
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut editor = BlockEditor::new();
        let missing = Uuid::new_v4();
        assert_eq!(
            editor.select(missing),
            Err(EditorError::NotFound { id: missing })
        );
        assert_eq!(
            editor.update(missing, None, None),
            Err(EditorError::NotFound { id: missing })
        );
        assert!(editor.delete(missing).is_err());
    }

    #[test]
    fn move_to_keeps_orders_dense() {
        let mut editor = BlockEditor::new();
        let a = editor.add(BlockKind::Heading, None);
        let b = editor.add(BlockKind::Text, None);
        let c = editor.add(BlockKind::Divider, None);

        editor.move_to(c, 0).expect("move");
        let ids: Vec<Uuid> = editor.blocks().iter().map(|block| block.id).collect();
        assert_eq!(ids, vec![c, a, b]);
        assert_eq!(orders(&editor), vec![0, 1, 2]);

        assert_eq!(
            editor.move_to(a, 3),
            Err(EditorError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn toggle_active_flips_visibility() {
        let mut editor = BlockEditor::new();
        let id = editor.add(BlockKind::Button, None);
        assert_eq!(editor.toggle_active(id), Ok(false));
        assert_eq!(editor.toggle_active(id), Ok(true));
    }

    #[test]
    fn from_blocks_sorts_and_renumbers() {
        let mut editor = BlockEditor::new();
        let a = editor.add(BlockKind::Heading, None);
        let b = editor.add(BlockKind::Text, None);
        let mut blocks = editor.into_blocks();
        blocks[0].order = 10;
        blocks[1].order = 4;

        let reloaded = BlockEditor::from_blocks(blocks);
        let ids: Vec<Uuid> = reloaded.blocks().iter().map(|block| block.id).collect();
        assert_eq!(ids, vec![b, a]);
        assert_eq!(orders(&reloaded), vec![0, 1]);
    }

    #[test]
    fn from_inputs_rejects_unknown_types_and_bad_content() {
        let unknown = ComponentInput {
            id: None,
            component_type: "CAROUSEL".into(),
            content: Value::Null,
            styles: Value::Null,
            is_active: true,
        };
        assert_eq!(
            BlockEditor::from_inputs(vec![unknown], None).err(),
            Some(EditorError::UnknownType {
                type_name: "CAROUSEL".into()
            })
        );

        let mistyped = ComponentInput {
            id: None,
            component_type: "HEADING".into(),
            content: serde_json::json!({ "level": "two" }),
            styles: Value::Null,
            is_active: true,
        };
        assert!(matches!(
            BlockEditor::from_inputs(vec![mistyped], None),
            Err(EditorError::InvalidContent {
                kind: BlockKind::Heading,
                ..
            })
        ));
    }

    #[test]
    fn product_components_reload_identically() {
        let mut editor = BlockEditor::new();
        editor.add(BlockKind::Hero, None);
        editor.add(BlockKind::Testimonials, None);
        let components = editor.to_product_components().expect("serialize");

        let reloaded = BlockEditor::from_blocks(blocks_from_product_components(&components));
        assert_eq!(reloaded.blocks(), editor.blocks());
    }
}
