//! Cursor-based PDF writer over lopdf.
//!
//! Positions are given in points from the page's top-left corner, like a text
//! cursor moving down the page; they are flipped into PDF user space when
//! operators are written. Text uses the standard Type1 fonts with WinAnsi
//! encoding and the same metric tables the preview measures with.
//!
//! Text that runs past the bottom margin continues on a new page.

use std::collections::{BTreeMap, HashMap};
use std::mem;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::layout::{get_metrics, FontFamily};
use crate::preview::template::PageTemplate;
use crate::render::RenderError;

/// Line advance as a multiple of the font size.
const LINE_HEIGHT: f32 = 1.2;
/// Baseline offset below the top of a line, as a multiple of the font size.
const ASCENT: f32 = 0.8;

// ────────────────────────────────────────────────────────────────────────────
// Styles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
    pub const RED: Rgb = Rgb(0xff, 0x00, 0x00);
    pub const GREY: Rgb = Rgb(0x66, 0x66, 0x66);
    pub const PLACEHOLDER: Rgb = Rgb(0xee, 0xee, 0xee);

    fn operands(self) -> String {
        format!(
            "{:.3} {:.3} {:.3}",
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    /// Stretches every line but a paragraph's last to the full width.
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: FontFamily,
    pub size: f32,
    pub color: Rgb,
    pub align: Align,
    pub underline: bool,
}

impl TextStyle {
    pub fn new(font: FontFamily, size: f32, color: Rgb) -> Self {
        Self {
            font,
            size,
            color,
            align: Align::Left,
            underline: false,
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }
}

/// Where and how big an image is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageBox {
    /// Left edge; the left margin when `None`.
    pub x: Option<f32>,
    /// Top edge; the cursor when `None`, in which case the cursor moves below the image.
    pub y: Option<f32>,
    pub width: f32,
    pub height: f32,
    /// Scale to fit inside the box keeping the aspect ratio, or stretch to fill it.
    pub keep_aspect: bool,
    /// Horizontal placement of a fitted image inside the box.
    pub align: Align,
    /// Centre a fitted image vertically inside the box.
    pub center_vertically: bool,
}

impl ImageBox {
    pub fn fit(width: f32, height: f32) -> Self {
        Self {
            x: None,
            y: None,
            width,
            height,
            keep_aspect: true,
            align: Align::Left,
            center_vertically: false,
        }
    }

    pub fn stretch(width: f32, height: f32) -> Self {
        Self {
            keep_aspect: false,
            ..Self::fit(width, height)
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self.center_vertically = true;
        self
    }
}

struct EmbeddedImage {
    name: String,
    id: ObjectId,
    width: u32,
    height: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Writer
// ────────────────────────────────────────────────────────────────────────────

pub struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    fonts: Dictionary,
    page_refs: Vec<Object>,
    width: f32,
    height: f32,
    margin: f32,
    title: String,
    /// Operators of the page being written.
    content: Vec<u8>,
    page_images: BTreeMap<String, ObjectId>,
    images: HashMap<PathBuf, EmbeddedImage>,
    y: f32,
    line_height: f32,
}

impl PdfWriter {
    /// Starts a document on `template`'s paper with its first page open.
    pub fn new(template: &PageTemplate, margin: f32, title: &str) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for family in FontFamily::ALL {
            let mut font = Dictionary::new();
            font.set("Type", Object::Name(b"Font".to_vec()));
            font.set("Subtype", Object::Name(b"Type1".to_vec()));
            font.set("BaseFont", Object::Name(family.base_font().as_bytes().to_vec()));
            font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
            let font_id = doc.add_object(Object::Dictionary(font));
            fonts.set(family.resource_name(), Object::Reference(font_id));
        }

        let (width, height) = template.size_pt();
        Self {
            doc,
            pages_id,
            fonts,
            page_refs: Vec::new(),
            width,
            height,
            margin,
            title: title.to_string(),
            content: Vec::new(),
            page_images: BTreeMap::new(),
            images: HashMap::new(),
            y: margin,
            line_height: 12.0 * LINE_HEIGHT,
        }
    }

    pub fn page_width(&self) -> f32 {
        self.width
    }

    pub fn page_height(&self) -> f32 {
        self.height
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Pages written so far, including the open one.
    pub fn page_count(&self) -> usize {
        self.page_refs.len() + 1
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    /// Advances the cursor by `lines` of the most recently used text size.
    pub fn move_down(&mut self, lines: f32) {
        self.y += lines * self.line_height;
    }

    pub fn add_page(&mut self) {
        self.close_page();
        self.y = self.margin;
    }

    // ── text ────────────────────────────────────────────────────────────────

    /// Flows `text` across the content width from the cursor.
    pub fn text(&mut self, text: &str, style: &TextStyle) {
        let width = self.content_width();
        self.text_in(text, style, self.margin, width);
    }

    /// Flows `text` in a column starting at `x`, from the cursor.
    pub fn text_in(&mut self, text: &str, style: &TextStyle, x: f32, width: f32) {
        let metrics = get_metrics(style.font);
        let line_height = style.size * LINE_HEIGHT;
        self.line_height = line_height;
        let max_em = width / style.size;

        for paragraph in text.split('\n') {
            let lines = metrics.wrap(paragraph, max_em, true);
            if lines.is_empty() {
                self.y += line_height;
                continue;
            }
            let last = lines.len() - 1;
            for (i, line) in lines.iter().enumerate() {
                if self.y + line_height > self.height - self.margin && self.y > self.margin {
                    self.add_page();
                }
                let line_width = line.width_em * style.size;
                let spaces = line.text.matches(' ').count();
                let (dx, word_spacing) = match style.align {
                    Align::Left => (0.0, 0.0),
                    Align::Center => ((width - line_width) / 2.0, 0.0),
                    Align::Right => (width - line_width, 0.0),
                    Align::Justify if i < last && spaces > 0 => {
                        (0.0, (width - line_width) / spaces as f32)
                    }
                    Align::Justify => (0.0, 0.0),
                };
                let baseline = self.y + style.size * ASCENT;
                self.show_text(&line.text, style, x + dx, baseline, word_spacing);
                if style.underline {
                    let drawn = line_width + word_spacing * spaces as f32;
                    let offset = baseline + style.size * 0.1;
                    self.line(x + dx, offset, x + dx + drawn, offset, style.color, style.size / 20.0);
                }
                self.y += line_height;
            }
        }
    }

    /// Moves the cursor to `(x, y)` and flows `text` in a column `width` wide.
    pub fn text_at(&mut self, text: &str, style: &TextStyle, x: f32, y: f32, width: f32) {
        self.y = y;
        self.text_in(text, style, x, width);
    }

    fn show_text(&mut self, text: &str, style: &TextStyle, x: f32, baseline: f32, word_spacing: f32) {
        let mut op = format!(
            "BT /{} {:.2} Tf {} rg {:.3} Tw {:.2} {:.2} Td ",
            style.font.resource_name(),
            style.size,
            style.color.operands(),
            word_spacing,
            x,
            self.height - baseline
        )
        .into_bytes();
        push_string_literal(&mut op, &encode_win_ansi(text));
        op.extend_from_slice(b" Tj ET\n");
        self.content.extend_from_slice(&op);
    }

    // ── shapes ──────────────────────────────────────────────────────────────

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.push_op(&format!(
            "{} rg {:.2} {:.2} {:.2} {:.2} re f",
            color.operands(),
            x,
            self.height - y - height,
            width,
            height
        ));
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgb, width: f32) {
        self.push_op(&format!(
            "{} RG {:.2} w {:.2} {:.2} m {:.2} {:.2} l S",
            color.operands(),
            width,
            x1,
            self.height - y1,
            x2,
            self.height - y2
        ));
    }

    /// Rule across the content width at the cursor, then one line down.
    pub fn separator(&mut self, color: Rgb, width: f32) {
        let y = self.y;
        self.line(self.margin, y, self.width - self.margin, y, color, width);
        self.move_down(1.0);
    }

    // ── images ──────────────────────────────────────────────────────────────

    /// Draws a JPEG or PNG into `placement`, returning the drawn size.
    pub fn image(&mut self, path: &Path, placement: ImageBox) -> Result<(f32, f32), RenderError> {
        let (name, id, px_width, px_height) = {
            let image = self.embed(path)?;
            (image.name.clone(), image.id, image.width as f32, image.height as f32)
        };

        let (width, height) = if placement.keep_aspect {
            let scale = (placement.width / px_width).min(placement.height / px_height);
            (px_width * scale, px_height * scale)
        } else {
            (placement.width, placement.height)
        };
        let dx = match placement.align {
            Align::Center => (placement.width - width) / 2.0,
            Align::Right => placement.width - width,
            _ => 0.0,
        };
        let dy = if placement.center_vertically {
            (placement.height - height) / 2.0
        } else {
            0.0
        };

        let x = placement.x.unwrap_or(self.margin) + dx;
        let top = placement.y.unwrap_or(self.y) + dy;
        self.push_op(&format!(
            "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /{} Do Q",
            width,
            height,
            x,
            self.height - top - height,
            name
        ));
        self.page_images.insert(name, id);

        if placement.y.is_none() {
            self.y = top + height;
        }
        Ok((width, height))
    }

    fn embed(&mut self, path: &Path) -> Result<&EmbeddedImage, RenderError> {
        if !self.images.contains_key(path) {
            let rgb = image::open(path)?.to_rgb8();
            let (width, height) = rgb.dimensions();

            let mut dict = Dictionary::new();
            dict.set("Type", Object::Name(b"XObject".to_vec()));
            dict.set("Subtype", Object::Name(b"Image".to_vec()));
            dict.set("Width", Object::Integer(width as i64));
            dict.set("Height", Object::Integer(height as i64));
            dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
            dict.set("BitsPerComponent", Object::Integer(8));
            let id = self.doc.add_object(Stream::new(dict, rgb.into_raw()));

            let name = format!("Im{}", self.images.len() + 1);
            self.images.insert(
                path.to_path_buf(),
                EmbeddedImage {
                    name,
                    id,
                    width,
                    height,
                },
            );
        }
        self.images
            .get(path)
            .ok_or_else(|| RenderError::Io(std::io::Error::other("embedded image missing")))
    }

    // ── output ──────────────────────────────────────────────────────────────

    fn push_op(&mut self, op: &str) {
        self.content.extend_from_slice(op.as_bytes());
        self.content.push(b'\n');
    }

    fn close_page(&mut self) {
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(self.fonts.clone()));
        if !self.page_images.is_empty() {
            let mut xobjects = Dictionary::new();
            for (name, id) in mem::take(&mut self.page_images) {
                xobjects.set(name, Object::Reference(id));
            }
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        let content = mem::take(&mut self.content);
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(self.width),
                    Object::Real(self.height),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Dictionary(resources)),
        ]);
        let page_id = self.doc.add_object(page);
        self.page_refs.push(Object::Reference(page_id));
    }

    /// Closes the open page and serialises the document.
    pub fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        self.close_page();

        let count = self.page_refs.len() as i64;
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(mem::take(&mut self.page_refs))),
            ("Count", Object::Integer(count)),
        ]);
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.doc.trailer.set("Root", catalog_id);

        let created = chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
        let info_id = self.doc.add_object(Dictionary::from_iter(vec![
            ("Title", Object::string_literal(encode_win_ansi(&self.title))),
            ("Producer", Object::string_literal("playbill")),
            ("CreationDate", Object::string_literal(created)),
        ]));
        self.doc.trailer.set("Info", info_id);

        self.doc.compress();
        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Encoding
// ────────────────────────────────────────────────────────────────────────────

/// Maps text onto WinAnsiEncoding; characters outside it become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '\t' => b' ',
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8a,
            '‹' => 0x8b,
            'Œ' => 0x8c,
            'Ž' => 0x8e,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9a,
            '›' => 0x9b,
            'œ' => 0x9c,
            'ž' => 0x9e,
            'Ÿ' => 0x9f,
            _ => b'?',
        })
        .collect()
}

/// Appends `bytes` as a PDF literal string, escaping delimiters and high bytes.
fn push_string_literal(out: &mut Vec<u8>, bytes: &[u8]) {
    out.push(b'(');
    for &b in bytes {
        match b {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(b);
            }
            0x80..=0xff => out.extend_from_slice(format!("\\{b:03o}").as_bytes()),
            _ => out.push(b),
        }
    }
    out.push(b')');
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::template::A5;

    fn writer() -> PdfWriter {
        PdfWriter::new(&A5, 40.0, "Test programme")
    }

    fn body() -> TextStyle {
        TextStyle::new(FontFamily::TimesRoman, 12.0, Rgb(0x33, 0x33, 0x33))
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]))
            .save(&path)
            .unwrap();
        path
    }

    fn content_of(w: &PdfWriter) -> String {
        String::from_utf8_lossy(&w.content).into_owned()
    }

    // ── encoding ────────────────────────────────────────────────────────────

    #[test]
    fn test_win_ansi_maps_typographic_marks() {
        assert_eq!(encode_win_ansi("It’s – “ok”"), b"It\x92s \x96 \x93ok\x94".to_vec());
        assert_eq!(encode_win_ansi("café"), b"caf\xe9".to_vec());
        assert_eq!(encode_win_ansi("⚠"), b"?".to_vec());
    }

    #[test]
    fn test_string_literal_escapes() {
        let mut out = Vec::new();
        push_string_literal(&mut out, b"a(b)\\\xe9");
        assert_eq!(out, b"(a\\(b\\)\\\\\\351)".to_vec());
    }

    // ── flow ────────────────────────────────────────────────────────────────

    #[test]
    fn test_text_advances_cursor_per_line() {
        let mut w = writer();
        w.text("One line", &body());
        assert!((w.y() - (40.0 + 14.4)).abs() < 1e-3);
        w.text("First\nSecond", &body());
        assert!((w.y() - (40.0 + 3.0 * 14.4)).abs() < 1e-3);
    }

    #[test]
    fn test_move_down_uses_last_text_size() {
        let mut w = writer();
        w.text("Heading", &TextStyle::new(FontFamily::TimesBold, 20.0, Rgb::GREY));
        let y = w.y();
        w.move_down(0.5);
        assert!((w.y() - y - 12.0).abs() < 1e-3);
    }

    #[test]
    fn test_long_text_continues_on_new_page() {
        let mut w = writer();
        let synopsis = "A country house, two proposals and a handbag at Victoria Station. ".repeat(80);
        w.text(&synopsis, &body().align(Align::Justify));
        assert!(w.page_count() >= 2, "pages: {}", w.page_count());
        assert!(w.y() <= w.page_height() - w.margin());
    }

    #[test]
    fn test_justified_lines_set_word_spacing() {
        let mut w = writer();
        let text = "The butler announces every guest with growing alarm as the evening wears on.";
        w.text(&text.repeat(2), &body().align(Align::Justify));
        let content = content_of(&w);
        let spacings: Vec<&str> = content
            .lines()
            .filter_map(|l| l.split(" Tw ").next()?.rsplit(' ').next())
            .collect();
        assert!(spacings.iter().any(|s| *s != "0.000"));
        assert_eq!(spacings.last(), Some(&"0.000"));
    }

    #[test]
    fn test_centered_text_offsets_x() {
        let mut w = writer();
        w.text("Synopsis", &body().align(Align::Center));
        let expected =
            40.0 + (w.content_width() - get_metrics(FontFamily::TimesRoman).measure_str("Synopsis") * 12.0) / 2.0;
        assert!(content_of(&w).contains(&format!("Tw {expected:.2} ")));
    }

    #[test]
    fn test_underline_draws_stroke() {
        let mut w = writer();
        w.text("Cast:", &body().underline());
        assert!(content_of(&w).contains(" l S"));
    }

    // ── images ──────────────────────────────────────────────────────────────

    #[test]
    fn test_image_fits_box_and_advances_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "wide.png", 200, 100);
        let mut w = writer();
        let (width, height) = w.image(&path, ImageBox::fit(80.0, 40.0)).unwrap();
        assert!((width - 80.0).abs() < 1e-3, "width was {width}");
        assert!((height - 40.0).abs() < 1e-3, "height was {height}");
        assert!((w.y() - 80.0).abs() < 1e-3);

        let (_, tall) = w.image(&path, ImageBox::fit(60.0, 60.0).at(40.0, 300.0)).unwrap();
        assert!((tall - 30.0).abs() < 1e-3, "height was {tall}");
        assert!((w.y() - 80.0).abs() < 1e-3);
        assert_eq!(w.images.len(), 1);
    }

    #[test]
    fn test_stretched_image_fills_box() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "border.png", 10, 10);
        let mut w = writer();
        let size = w.image(&path, ImageBox::stretch(339.5, 24.0)).unwrap();
        assert_eq!(size, (339.5, 24.0));
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let mut w = writer();
        let result = w.image(Path::new("/nonexistent/photo.png"), ImageBox::fit(10.0, 10.0));
        assert!(result.is_err());
        assert!(w.page_images.is_empty());
    }

    // ── output ──────────────────────────────────────────────────────────────

    #[test]
    fn test_finished_document_loads_with_all_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "photo.png", 4, 4);

        let mut w = writer();
        w.text("Cover", &body());
        w.add_page();
        w.image(&path, ImageBox::fit(100.0, 100.0).centered()).unwrap();
        w.add_page();
        w.fill_rect(40.0, 40.0, 60.0, 60.0, Rgb::PLACEHOLDER);
        let bytes = w.finish().unwrap();

        assert!(bytes.starts_with(b"%PDF-1.7"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);

        let images = doc
            .objects
            .values()
            .filter_map(|o| o.as_stream().ok())
            .filter(|s| s.dict.get(b"Subtype").and_then(|o| o.as_name()).ok() == Some(b"Image".as_slice()))
            .count();
        assert_eq!(images, 1);
    }
}
