use serde::Serialize;
use tracing::trace;

use crate::render::{ContentBlock, RenderOptions};

/// Horizontal distance between table columns.
pub const COLUMN_WIDTH: f32 = 100.0;
/// Characters a table cell holds before wrapping to a second line.
pub const CELL_WRAP_CHARS: usize = 30;
/// Vertical advance per table row.
pub const ROW_HEIGHT: f32 = 20.0;
/// Extra advance for a row in which any cell wrapped.
pub const WRAP_EXTRA: f32 = 10.0;
/// Vertical advance per paragraph line.
pub const TEXT_LINE_HEIGHT: f32 = 15.0;
/// Approximate glyph width used to size paragraph lines.
pub const TEXT_CHAR_WIDTH: f32 = 5.0;
/// Gap left under an image.
pub const IMAGE_GAP: f32 = 10.0;

const HEADER_SIZE: f32 = 12.0;
const DATE_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 8.0;
const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FontStyle {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        text: String,
    },
    /// Image from block `block`, with (x, y) at its lower-left corner.
    Image {
        block: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageLayout {
    pub number: usize,
    pub ops: Vec<DrawOp>,
}

/// Page furniture emitted while laying out, in order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LayoutEvent {
    Header { page: usize },
    Footer { page: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<PageLayout>,
    pub events: Vec<LayoutEvent>,
}

/// Phases of the paginator. A page runs header, body, then footer; a body
/// that overflows passes through `AwaitingPageBreak` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    RenderingHeader,
    RenderingBody,
    AwaitingPageBreak,
    RenderingFooter,
    Finished,
}

impl RenderPhase {
    pub fn can_advance_to(self, next: RenderPhase) -> bool {
        use RenderPhase::*;
        matches!(
            (self, next),
            (RenderingHeader, RenderingBody)
                | (RenderingBody, AwaitingPageBreak)
                | (RenderingBody, RenderingFooter)
                | (AwaitingPageBreak, RenderingFooter)
                | (RenderingFooter, RenderingHeader)
                | (RenderingFooter, Finished)
        )
    }
}

/// Lay out blocks into pages.
///
/// Pure: the same blocks and options always give the same layout.
pub fn layout_document(blocks: &[ContentBlock], options: &RenderOptions) -> Layout {
    let mut paginator = Paginator::new(options);
    paginator.start_page();

    for (index, block) in blocks.iter().enumerate() {
        match block {
            ContentBlock::Table { columns, rows } => paginator.draw_table(columns, rows),
            ContentBlock::Text(text) => paginator.draw_paragraph(text),
            ContentBlock::Image { width, height, .. } => {
                paginator.draw_image(index, *width, *height)
            }
        }
        // No trailing empty page after the last block.
        if paginator.below_bottom() && index + 1 < blocks.len() {
            paginator.break_page();
        }
    }

    paginator.finish()
}

enum TextProgress {
    Completed,
    Interrupted { next: usize },
}

struct Paginator<'a> {
    options: &'a RenderOptions,
    width: f32,
    height: f32,
    phase: RenderPhase,
    cursor: f32,
    date_line: String,
    pages: Vec<PageLayout>,
    events: Vec<LayoutEvent>,
}

impl<'a> Paginator<'a> {
    fn new(options: &'a RenderOptions) -> Self {
        let (width, height) = options.orientation.page_size();
        Self {
            options,
            width,
            height,
            phase: RenderPhase::RenderingHeader,
            cursor: height - options.margins.top,
            date_line: format!("Date: {}", options.generated_at.format(DATE_FORMAT)),
            pages: Vec::new(),
            events: Vec::new(),
        }
    }

    fn transition(&mut self, next: RenderPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "invalid render transition {:?} -> {:?}",
            self.phase,
            next
        );
        self.phase = next;
    }

    fn page_number(&self) -> usize {
        self.pages.len()
    }

    fn push_text(&mut self, x: f32, y: f32, size: f32, style: FontStyle, text: String) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(DrawOp::Text {
                x,
                y,
                size,
                style,
                text,
            });
        }
    }

    fn start_page(&mut self) {
        if !self.pages.is_empty() {
            self.transition(RenderPhase::RenderingHeader);
        }
        let number = self.pages.len() + 1;
        self.pages.push(PageLayout {
            number,
            ops: Vec::new(),
        });
        self.cursor = self.draw_header();
        self.events.push(LayoutEvent::Header { page: number });

        if number == 1 && !self.options.title.is_empty() {
            self.cursor -= 10.0;
            let title = self.options.title.clone();
            self.push_text(
                self.options.margins.left,
                self.cursor,
                TITLE_SIZE,
                FontStyle::Bold,
                title,
            );
            self.cursor -= 20.0;
        }
        self.transition(RenderPhase::RenderingBody);
    }

    /// Draws the header and returns the y where the body starts.
    fn draw_header(&mut self) -> f32 {
        let left = self.options.margins.left;
        let mut y = self.height - self.options.margins.top;
        let app_line = format!("{} {}", self.options.app_name, self.options.app_version);
        self.push_text(left, y, HEADER_SIZE, FontStyle::Bold, app_line);
        y -= 15.0;
        let date_line = self.date_line.clone();
        self.push_text(left, y, DATE_SIZE, FontStyle::Regular, date_line);
        y - 20.0
    }

    fn draw_footer(&mut self) {
        let label = format!("Page {}", self.page_number());
        let text_width = label.chars().count() as f32 * FOOTER_SIZE * 0.5;
        let x = (self.width - text_width) / 2.0;
        let y = self.options.margins.bottom - 10.0;
        self.push_text(x, y, FOOTER_SIZE, FontStyle::Regular, label);
        self.events.push(LayoutEvent::Footer {
            page: self.page_number(),
        });
    }

    fn below_bottom(&self) -> bool {
        self.cursor < self.options.margins.bottom
    }

    fn break_page(&mut self) {
        trace!(page = self.page_number(), cursor = self.cursor, "page break");
        self.transition(RenderPhase::AwaitingPageBreak);
        self.transition(RenderPhase::RenderingFooter);
        self.draw_footer();
        self.start_page();
    }

    fn finish(mut self) -> Layout {
        self.transition(RenderPhase::RenderingFooter);
        self.draw_footer();
        self.transition(RenderPhase::Finished);
        Layout {
            page_width: self.width,
            page_height: self.height,
            pages: self.pages,
            events: self.events,
        }
    }

    fn draw_column_headers(&mut self, columns: &[String]) {
        let left = self.options.margins.left;
        for (i, column) in columns.iter().enumerate() {
            let x = left + i as f32 * COLUMN_WIDTH;
            self.push_text(x, self.cursor, BODY_SIZE, FontStyle::Bold, column.clone());
        }
        self.cursor -= ROW_HEIGHT;
    }

    fn draw_table(&mut self, columns: &[String], rows: &[Vec<String>]) {
        self.draw_column_headers(columns);
        let left = self.options.margins.left;

        for row in rows {
            if self.below_bottom() {
                self.break_page();
                self.cursor -= ROW_HEIGHT;
                self.draw_column_headers(columns);
            }

            let mut wrapped = false;
            for (i, cell) in row.iter().enumerate() {
                let x = left + i as f32 * COLUMN_WIDTH;
                let (first, second) = wrap_cell(cell);
                self.push_text(x, self.cursor, BODY_SIZE, FontStyle::Regular, first);
                if let Some(second) = second {
                    wrapped = true;
                    self.push_text(
                        x,
                        self.cursor - WRAP_EXTRA,
                        BODY_SIZE,
                        FontStyle::Regular,
                        second,
                    );
                }
            }
            self.cursor -= ROW_HEIGHT + if wrapped { WRAP_EXTRA } else { 0.0 };
        }
    }

    fn max_line_chars(&self) -> usize {
        let usable = self.width - self.options.margins.left - self.options.margins.right;
        (usable / TEXT_CHAR_WIDTH).floor().max(1.0) as usize
    }

    fn draw_paragraph(&mut self, text: &str) {
        let lines = wrap_paragraph(text, self.max_line_chars());
        let mut pending: &[String] = &lines;
        loop {
            match self.draw_text_lines(pending) {
                TextProgress::Completed => break,
                // Last line reached the margin: the block loop breaks the page.
                TextProgress::Interrupted { next } if next >= pending.len() => break,
                TextProgress::Interrupted { next } => {
                    self.break_page();
                    pending = &pending[next..];
                }
            }
        }
    }

    fn draw_text_lines(&mut self, lines: &[String]) -> TextProgress {
        let left = self.options.margins.left;
        for (i, line) in lines.iter().enumerate() {
            self.push_text(left, self.cursor, BODY_SIZE, FontStyle::Regular, line.clone());
            self.cursor -= TEXT_LINE_HEIGHT;
            if self.below_bottom() {
                return TextProgress::Interrupted { next: i + 1 };
            }
        }
        TextProgress::Completed
    }

    fn draw_image(&mut self, block: usize, width: f32, height: f32) {
        let x = self.options.margins.left;
        let y = self.cursor - height;
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(DrawOp::Image {
                block,
                x,
                y,
                width,
                height,
            });
        }
        self.cursor -= height + IMAGE_GAP;
    }
}

/// Split a cell into its first line and an optional second line.
///
/// Text past twice the wrap width is dropped.
pub fn wrap_cell(cell: &str) -> (String, Option<String>) {
    let mut chars = cell.chars();
    let first: String = chars.by_ref().take(CELL_WRAP_CHARS).collect();
    let second: String = chars.take(CELL_WRAP_CHARS).collect();
    if second.is_empty() {
        (first, None)
    } else {
        (first, Some(second))
    }
}

/// Greedy word wrap. A word longer than `max_chars` gets a line of its own.
pub fn wrap_paragraph(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
            current_len = word_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
