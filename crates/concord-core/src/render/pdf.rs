use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

use crate::error::ConcordError;
use crate::render::layout::{DrawOp, FontStyle, Layout};
use crate::render::{ContentBlock, RenderOptions};

fn font_resource(style: FontStyle) -> &'static str {
    match style {
        FontStyle::Regular => "F1",
        FontStyle::Bold => "F2",
    }
}

fn image_resource(block: usize) -> String {
    format!("Im{block}")
}

/// Encode a finished layout as PDF bytes.
pub fn encode(
    layout: &Layout,
    blocks: &[ContentBlock],
    options: &RenderOptions,
) -> Result<Vec<u8>, ConcordError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(standard_font("Helvetica"));
    let bold_id = doc.add_object(standard_font("Helvetica-Bold"));

    let mut images: BTreeMap<usize, Object> = BTreeMap::new();
    for op in layout.pages.iter().flat_map(|p| &p.ops) {
        let DrawOp::Image { block, .. } = op else {
            continue;
        };
        if images.contains_key(block) {
            continue;
        }
        let Some(ContentBlock::Image { source, .. }) = blocks.get(*block) else {
            return Err(ConcordError::RenderFailure(format!(
                "layout references missing image block {block}"
            )));
        };
        let stream = lopdf::xobject::image_from(source.load()?)
            .map_err(|e| ConcordError::RenderFailure(format!("cannot embed image: {e}")))?;
        images.insert(*block, doc.add_object(stream).into());
    }

    let mut xobjects = Dictionary::new();
    for (block, id) in images {
        xobjects.set(image_resource(block), id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
        "XObject" => xobjects,
    });

    let mut page_ids = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = Content {
            operations: page.ops.iter().flat_map(operations_for).collect::<Vec<_>>(),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    let count = i64::try_from(page_ids.len())
        .map_err(|e| ConcordError::RenderFailure(e.to_string()))?;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<Object>>(),
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), layout.page_width.into(), layout.page_height.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(win_ansi_bytes(&options.title)),
        "Producer" => Object::string_literal(win_ansi_bytes(&format!(
            "{} {}",
            options.app_name, options.app_version
        ))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn standard_font(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn operations_for(op: &DrawOp) -> Vec<Operation> {
    match op {
        DrawOp::Text {
            x,
            y,
            size,
            style,
            text,
        } => vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font_resource(*style).into(), (*size).into()]),
            Operation::new("Td", vec![(*x).into(), (*y).into()]),
            Operation::new(
                "Tj",
                vec![Object::String(win_ansi_bytes(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ],
        DrawOp::Image {
            block,
            x,
            y,
            width,
            height,
        } => vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    (*width).into(),
                    0.into(),
                    0.into(),
                    (*height).into(),
                    (*x).into(),
                    (*y).into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(image_resource(*block).into_bytes())]),
            Operation::new("Q", vec![]),
        ],
    }
}

/// Encode text for the standard fonts' WinAnsi encoding.
///
/// Latin-1 maps directly, a few typographic characters map into the
/// 0x80-0x9F block and anything else becomes '?'.
pub fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_document;

    fn page_count(bytes: &[u8]) -> usize {
        Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn test_win_ansi_bytes() {
        assert_eq!(win_ansi_bytes("Año 2024"), b"A\xF1o 2024".to_vec());
        assert_eq!(win_ansi_bytes("\u{20AC}5"), vec![0x80, b'5']);
        assert_eq!(win_ansi_bytes("\u{4E2D}"), b"?".to_vec());
    }

    #[test]
    fn test_render_produces_loadable_pdf() {
        let blocks = vec![
            ContentBlock::text("The report and the invoice contain the same data."),
            ContentBlock::table(
                vec!["ISBN".into(), "Quantity".into()],
                vec![vec!["9780134685991".into(), "2".into()]],
            )
            .unwrap(),
        ];
        let bytes = render_document(&blocks, &RenderOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn test_render_page_count_matches_layout() {
        let rows: Vec<Vec<String>> = (0..120)
            .map(|i| vec![format!("key{i}"), i.to_string()])
            .collect();
        let blocks = vec![ContentBlock::table(vec!["Key".into(), "N".into()], rows).unwrap()];
        let options = RenderOptions::default();
        let layout = crate::render::layout_document(&blocks, &options);
        let bytes = render_document(&blocks, &options).unwrap();
        assert_eq!(page_count(&bytes), layout.pages.len());
    }

    #[test]
    fn test_unreadable_image_fails_render() {
        let blocks = vec![ContentBlock::image(
            crate::render::ImageSource::Path("/nonexistent/logo.png".into()),
            40.0,
            40.0,
        )
        .unwrap()];
        let err = render_document(&blocks, &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, ConcordError::RenderFailure(_)));
    }
}
