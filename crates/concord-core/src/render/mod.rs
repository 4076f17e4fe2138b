pub mod layout;
pub mod pdf;
pub mod sink;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConcordError;
pub use layout::{layout_document, Layout};
pub use sink::{DocumentSink, FileSink, MemorySink};

/// Where an image block's bytes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

impl ImageSource {
    pub(crate) fn load(&self) -> Result<Vec<u8>, ConcordError> {
        match self {
            ImageSource::Path(path) => std::fs::read(path).map_err(|e| {
                ConcordError::RenderFailure(format!("cannot read image {}: {e}", path.display()))
            }),
            ImageSource::Bytes(bytes) => Ok(bytes.to_vec()),
        }
    }
}

/// One unit of document content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// Tabular data. Every row has exactly as many cells as there are columns.
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// A paragraph, word-wrapped to the content width.
    Text(String),
    /// A raster image drawn at the left margin, scaled to `width` x `height`.
    Image {
        source: ImageSource,
        width: f32,
        height: f32,
    },
}

impl ContentBlock {
    pub fn table(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, ConcordError> {
        let block = ContentBlock::Table { columns, rows };
        block.validate()?;
        Ok(block)
    }

    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text(text.into())
    }

    pub fn image(source: ImageSource, width: f32, height: f32) -> Result<Self, ConcordError> {
        let block = ContentBlock::Image {
            source,
            width,
            height,
        };
        block.validate()?;
        Ok(block)
    }

    /// Check the structural invariants of the block.
    pub fn validate(&self) -> Result<(), ConcordError> {
        match self {
            ContentBlock::Table { columns, rows } => {
                if columns.is_empty() {
                    return Err(ConcordError::InvalidBlock("table has no columns".into()));
                }
                if let Some((i, row)) = rows
                    .iter()
                    .enumerate()
                    .find(|(_, row)| row.len() != columns.len())
                {
                    return Err(ConcordError::InvalidBlock(format!(
                        "table row {i} has {} cells, expected {}",
                        row.len(),
                        columns.len()
                    )));
                }
                Ok(())
            }
            ContentBlock::Text(_) => Ok(()),
            ContentBlock::Image { width, height, .. } => {
                let valid = |v: f32| v.is_finite() && v > 0.0;
                if valid(*width) && valid(*height) {
                    Ok(())
                } else {
                    Err(ConcordError::InvalidBlock(format!(
                        "image dimensions must be positive, got {width} x {height}"
                    )))
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Page size in PDF units (US Letter).
    pub fn page_size(self) -> (f32, f32) {
        match self {
            Orientation::Portrait => (612.0, 792.0),
            Orientation::Landscape => (792.0, 612.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Margins {
    pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(50.0)
    }
}

/// Document-level settings for a render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub app_name: String,
    pub app_version: String,
    /// Drawn on the first page only. Empty means no title.
    pub title: String,
    pub margins: Margins,
    pub orientation: Orientation,
    /// Timestamp printed under the header on every page.
    pub generated_at: NaiveDateTime,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            app_name: "Concord".into(),
            app_version: env!("CARGO_PKG_VERSION").into(),
            title: String::new(),
            margins: Margins::default(),
            orientation: Orientation::Portrait,
            generated_at: chrono::Local::now().naive_local(),
        }
    }
}

/// Render blocks into a complete PDF held in memory.
///
/// Every block is validated before layout starts, so an invalid block
/// produces no output at all.
pub fn render_document(
    blocks: &[ContentBlock],
    options: &RenderOptions,
) -> Result<Vec<u8>, ConcordError> {
    for block in blocks {
        block.validate()?;
    }
    let layout = layout_document(blocks, options);
    let bytes = pdf::encode(&layout, blocks, options)?;
    debug!(
        pages = layout.pages.len(),
        bytes = bytes.len(),
        "rendered document"
    );
    Ok(bytes)
}

/// Render and hand the finished document to a sink.
///
/// The sink only sees complete documents.
pub fn write_document(
    blocks: &[ContentBlock],
    options: &RenderOptions,
    sink: &mut dyn DocumentSink,
    filename: &str,
) -> Result<(), ConcordError> {
    let bytes = render_document(blocks, options)?;
    sink.commit(filename, &bytes)
}
