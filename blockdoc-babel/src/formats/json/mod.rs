//! JSON format implementation
//!
//! The block tree as the editor stores it: an array of blocks with `id`,
//! `type`, `props`, `content` and `children`. Blocks read without an id get
//! one from the configured generator, and blocks without content get the
//! empty content their type declares.

use crate::error::ConversionError;
use crate::format::Format;
use crate::formats::FormatSettings;
use crate::model::{assign_missing_ids, Block, IdStrategy};
use crate::schema::Schema;
use std::sync::Arc;

pub struct JsonFormat {
    schema: Arc<Schema>,
    ids: IdStrategy,
}

impl JsonFormat {
    pub fn new(settings: &FormatSettings) -> Self {
        Self {
            schema: Arc::clone(&settings.schema),
            ids: settings.ids,
        }
    }
}

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Block tree as JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Vec<Block>, ConversionError> {
        let mut blocks: Vec<Block> = serde_json::from_str(source)?;
        self.schema.fill_missing_content(&mut blocks);
        self.schema.validate_blocks(&blocks)?;
        assign_missing_ids(&mut blocks, self.ids.generator().as_mut());
        Ok(blocks)
    }

    fn serialize(&self, blocks: &[Block]) -> Result<String, ConversionError> {
        self.schema.validate_blocks(blocks)?;
        Ok(serde_json::to_string_pretty(blocks)?)
    }
}
