//! Form document rendering.
//!
//! Builds the A4 PDF that accompanies every submission: labeled field
//! sections, numbered attachment images, and a signature box. Rendering is a
//! pure function of the input; identical input produces identical bytes.
//!
//! Attachment images must already be JPEG (see `convert`); they are embedded
//! as DCTDecode XObjects without re-encoding.

use std::io::Cursor;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Image error: {0}")]
    Image(String),

    #[error("PDF write error: {0}")]
    Write(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One layout element of the document body.
#[derive(Debug, Clone)]
pub enum Section {
    /// Two labeled values side by side.
    Pair {
        left: (String, String),
        right: (String, String),
    },
    /// A labeled full-width text block.
    Block { label: String, value: String },
}

/// A renderable form document.
#[derive(Debug, Clone, Default)]
pub struct FormDocument {
    /// Organization mark in the top-left corner.
    pub logo: Option<String>,
    /// Centered document title.
    pub title: Option<String>,
    /// Date in the top-right corner.
    pub corner_date: Option<String>,
    pub sections: Vec<Section>,
    /// Heading above the attachment series, e.g. "Kvitteringer:".
    pub attachment_heading: Option<String>,
    /// Caption prefix per image; rendered as "{caption} {n}:".
    pub attachment_caption: String,
    /// JPEG-encoded attachment images, in order.
    pub attachments: Vec<Vec<u8>>,
    /// Signature box content in the bottom-left corner of the last page.
    pub signature: Option<String>,
}

// A4 geometry in points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const FONT_SIZE: f32 = 12.0;
const LABEL_SIZE: f32 = 13.0;
const TITLE_SIZE: f32 = 16.0;
const LINE_HEIGHT: f32 = 16.0;
const SECTION_GAP: f32 = 14.0;
const MAX_IMAGE_HEIGHT: f32 = 300.0;
// Room reserved at the page bottom for the signature box.
const BOTTOM_RESERVE: f32 = 90.0;

// Wrap widths in characters, sized for Helvetica at FONT_SIZE.
const FULL_WIDTH_CHARS: usize = 82;
const COLUMN_CHARS: usize = 38;

/// Map text to WinAnsi bytes; Latin-1 covers the Norwegian letters, anything
/// outside becomes '?'.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) <= 0xFF { c as u8 } else { b'?' })
        .collect()
}

/// Greedy word wrap by character count. Words longer than a whole line
/// (pasted URLs, typically) are split at the limit so no line overflows the
/// content width.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            for piece in split_word(word, max_chars) {
                if current.is_empty() {
                    current = piece;
                } else if current.chars().count() + 1 + piece.chars().count() <= max_chars {
                    current.push(' ');
                    current.push_str(&piece);
                } else {
                    lines.push(std::mem::take(&mut current));
                    current = piece;
                }
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn split_word(word: &str, max_chars: usize) -> Vec<String> {
    if word.chars().count() <= max_chars {
        return vec![word.to_string()];
    }
    word.chars()
        .collect::<Vec<char>>()
        .chunks(max_chars.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

struct PageBuilder {
    operations: Vec<Operation>,
    /// XObject names referenced by this page, indexes into the image table.
    images: Vec<usize>,
}

impl PageBuilder {
    fn new() -> Self {
        PageBuilder {
            operations: Vec::new(),
            images: Vec::new(),
        }
    }

    fn text(&mut self, font: &str, size: f32, x: f32, y: f32, text: &str) {
        self.operations.push(Operation::new("BT", vec![]));
        self.operations
            .push(Operation::new("Tf", vec![font.into(), size.into()]));
        self.operations
            .push(Operation::new("Td", vec![x.into(), y.into()]));
        self.operations.push(Operation::new(
            "Tj",
            vec![Object::String(
                encode_win_ansi(text),
                StringFormat::Literal,
            )],
        ));
        self.operations.push(Operation::new("ET", vec![]));
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.operations.push(Operation::new(
            "re",
            vec![x.into(), y.into(), width.into(), height.into()],
        ));
        self.operations.push(Operation::new("S", vec![]));
    }

    fn image(&mut self, index: usize, x: f32, y: f32, width: f32, height: f32) {
        self.images.push(index);
        self.operations.push(Operation::new("q", vec![]));
        self.operations.push(Operation::new(
            "cm",
            vec![
                width.into(),
                0.into(),
                0.into(),
                height.into(),
                x.into(),
                y.into(),
            ],
        ));
        self.operations
            .push(Operation::new("Do", vec![format!("Im{}", index).into()]));
        self.operations.push(Operation::new("Q", vec![]));
    }
}

struct Renderer<'a> {
    doc: &'a FormDocument,
    pages: Vec<PageBuilder>,
    cursor_y: f32,
}

impl<'a> Renderer<'a> {
    fn new(doc: &'a FormDocument) -> Self {
        let mut renderer = Renderer {
            doc,
            pages: Vec::new(),
            cursor_y: 0.0,
        };
        renderer.new_page();
        renderer
    }

    fn new_page(&mut self) {
        let mut page = PageBuilder::new();
        let mut top = PAGE_HEIGHT - MARGIN;

        if self.pages.is_empty() {
            if let Some(logo) = &self.doc.logo {
                page.text("F2", TITLE_SIZE, MARGIN, PAGE_HEIGHT - 30.0, logo);
            }
            if let Some(date) = &self.doc.corner_date {
                let x = PAGE_WIDTH - MARGIN - date.len() as f32 * FONT_SIZE * 0.5;
                page.text("F1", FONT_SIZE, x, PAGE_HEIGHT - 30.0, date);
            }
            if let Some(title) = &self.doc.title {
                let x = (PAGE_WIDTH - title.len() as f32 * TITLE_SIZE * 0.5) / 2.0;
                page.text("F2", TITLE_SIZE, x.max(MARGIN), top, title);
                top -= TITLE_SIZE + SECTION_GAP;
            }
        }

        self.pages.push(page);
        self.cursor_y = top;
    }

    fn page(&mut self) -> &mut PageBuilder {
        self.pages.last_mut().expect("at least one page")
    }

    fn ensure_room(&mut self, needed: f32) {
        if self.cursor_y - needed < BOTTOM_RESERVE {
            self.new_page();
        }
    }

    fn labeled_column(&mut self, x: f32, label: &str, lines: &[String]) -> f32 {
        let mut y = self.cursor_y;
        self.page().text("F2", LABEL_SIZE, x, y, label);
        y -= LINE_HEIGHT;
        for line in lines {
            self.page().text("F1", FONT_SIZE, x, y, line);
            y -= LINE_HEIGHT;
        }
        self.cursor_y - y
    }

    fn render_section(&mut self, section: &Section) {
        match section {
            Section::Pair { left, right } => {
                let left_lines = wrap_text(&left.1, COLUMN_CHARS);
                let right_lines = wrap_text(&right.1, COLUMN_CHARS);
                let rows = left_lines.len().max(right_lines.len());
                let height = LINE_HEIGHT * (rows as f32 + 1.0);
                self.ensure_room(height + SECTION_GAP);

                let used_left = self.labeled_column(MARGIN, &left.0, &left_lines);
                let used_right = self.labeled_column(
                    MARGIN + CONTENT_WIDTH / 2.0 + 10.0,
                    &right.0,
                    &right_lines,
                );
                self.cursor_y -= used_left.max(used_right) + SECTION_GAP;
            }
            Section::Block { label, value } => {
                let lines = wrap_text(value, FULL_WIDTH_CHARS);
                let height = LINE_HEIGHT * (lines.len() as f32 + 1.0);
                self.ensure_room(height + SECTION_GAP);

                let used = self.labeled_column(MARGIN, label, &lines);
                self.cursor_y -= used + SECTION_GAP;
            }
        }
    }

    fn render_attachments(&mut self, dimensions: &[(u32, u32)]) {
        if self.doc.attachments.is_empty() {
            return;
        }

        if let Some(heading) = &self.doc.attachment_heading {
            self.ensure_room(LINE_HEIGHT + SECTION_GAP);
            let y = self.cursor_y;
            self.page().text("F2", LABEL_SIZE, MARGIN, y, heading);
            self.cursor_y -= LINE_HEIGHT + 4.0;
        }

        for (index, (width, height)) in dimensions.iter().enumerate() {
            // Scale to fit the content width, capped at MAX_IMAGE_HEIGHT.
            let scale = (CONTENT_WIDTH / *width as f32)
                .min(MAX_IMAGE_HEIGHT / *height as f32)
                .min(1.0);
            let draw_width = *width as f32 * scale;
            let draw_height = *height as f32 * scale;

            let needed = LINE_HEIGHT + draw_height + SECTION_GAP;
            self.ensure_room(needed);

            let caption = format!("{} {}:", self.doc.attachment_caption, index + 1);
            let y = self.cursor_y;
            self.page().text("F1", FONT_SIZE, MARGIN, y, &caption);
            let image_top = y - LINE_HEIGHT;
            self.page()
                .image(index, MARGIN, image_top - draw_height, draw_width, draw_height);
            self.cursor_y = image_top - draw_height - SECTION_GAP;
        }
    }

    fn render_signature(&mut self) {
        if let Some(signature) = &self.doc.signature {
            let page = self.page();
            let box_width = (signature.len().max(8) as f32 * FONT_SIZE * 0.55) + 20.0;
            page.rect(MARGIN - 10.0, 20.0, box_width, 50.0);
            page.text("F1", FONT_SIZE, MARGIN, 52.0, "Signatur:");
            page.text("F1", FONT_SIZE, MARGIN, 32.0, signature);
        }
    }
}

impl FormDocument {
    /// Render to PDF bytes. Deterministic: no timestamps, no random IDs.
    pub fn render(&self) -> Result<Vec<u8>, PdfError> {
        // Read dimensions from the JPEG headers up front; a malformed
        // attachment fails the whole render before anything is assembled.
        let mut dimensions = Vec::with_capacity(self.attachments.len());
        for jpeg in &self.attachments {
            let dims = image::ImageReader::new(Cursor::new(jpeg))
                .with_guessed_format()
                .map_err(|e| PdfError::Image(e.to_string()))?
                .into_dimensions()
                .map_err(|e| PdfError::Image(e.to_string()))?;
            dimensions.push(dims);
        }

        let mut renderer = Renderer::new(self);
        for section in &self.sections {
            renderer.render_section(section);
        }
        renderer.render_attachments(&dimensions);
        renderer.render_signature();

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let font_bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut image_ids = Vec::with_capacity(self.attachments.len());
        for (jpeg, (width, height)) in self.attachments.iter().zip(&dimensions) {
            let stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => *width as i64,
                    "Height" => *height as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                jpeg.clone(),
            );
            image_ids.push(doc.add_object(stream));
        }

        let mut page_ids = Vec::with_capacity(renderer.pages.len());
        for page in &renderer.pages {
            let content = Content {
                operations: page.operations.clone(),
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

            let mut xobjects = lopdf::Dictionary::new();
            for index in &page.images {
                xobjects.set(format!("Im{}", index), image_ids[*index]);
            }

            let resources = dictionary! {
                "Font" => dictionary! {
                    "F1" => font_regular,
                    "F2" => font_bold,
                },
                "XObject" => xobjects,
            };

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
                "Contents" => content_id,
                "Resources" => resources,
            });
            page_ids.push(page_id);
        }

        let count = page_ids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        Ok(out)
    }
}
