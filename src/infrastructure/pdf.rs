//! Minimal PDF 1.4 writer for the exported report.
//!
//! Lays out [`ReportElement`]s on US Letter pages using the two standard
//! Helvetica faces and serializes them with uncompressed content streams.
//! Output depends only on the elements, the title and the timestamp.

use std::fmt::Write as _;

use chrono::NaiveDateTime;

use crate::domain::{HeadingLevel, ReportElement, TextSpan};

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 36.0;

const PRODUCER: &str = "regintel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    /// Advance width in 1/1000 em of a WinAnsi-encodable character.
    fn glyph_width(self, ch: char) -> u16 {
        let (low, high) = match self {
            Font::Regular => (&HELVETICA_WIDTHS, &HELVETICA_HIGH_WIDTHS),
            Font::Bold => (&HELVETICA_BOLD_WIDTHS, &HELVETICA_BOLD_HIGH_WIDTHS),
        };
        match win_ansi(ch) {
            Some(code @ 32..=126) => low[usize::from(code - 32)],
            Some(code @ 0x80..=0xFF) => high[usize::from(code - 0x80)],
            _ => 556,
        }
    }

    fn char_width(self, ch: char, size: f32) -> f32 {
        f32::from(self.glyph_width(ch)) * size / 1000.0
    }

    fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.glyph_width(c))).sum();
        units as f32 * size / 1000.0
    }
}

// Standard Adobe metrics for characters 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' .. '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0' .. '9'
    278, 278, 584, 584, 584, 556, 1015, // ':' .. '@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A' .. 'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N' .. 'Z'
    278, 278, 278, 469, 556, 333, // '[' .. '`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a' .. 'm'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n' .. 'z'
    334, 260, 334, 584, // '{' .. '~'
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

// WinAnsi codes 0x80..=0x9F; NUL marks the five unassigned codes.
const WIN_ANSI_HIGH: [char; 32] = [
    '\u{20AC}', '\0', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\0', '\u{017D}', '\0',
    '\0', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\0', '\u{017E}', '\u{0178}',
];

// Adobe metrics for WinAnsi codes 0x80..=0xFF.
const HELVETICA_HIGH_WIDTHS: [u16; 128] = [
    556, 556, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 556, 611, 556, // 0x80
    556, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 556, 500, 667, // 0x90
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];

const HELVETICA_BOLD_HIGH_WIDTHS: [u16; 128] = [
    556, 556, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 556, 611, 556,
    556, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 556, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

/// WinAnsi code of a character, if the encoding has one.
fn win_ansi(ch: char) -> Option<u8> {
    match ch {
        ' '..='~' | '\u{A0}'..='\u{FF}' => u8::try_from(u32::from(ch)).ok(),
        '\0' => None,
        _ => WIN_ANSI_HIGH
            .iter()
            .position(|&c| c == ch)
            .and_then(|i| u8::try_from(0x80 + i).ok()),
    }
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    font: Font,
    size: f32,
    leading: f32,
    space_before: f32,
    space_after: f32,
}

const TITLE_STYLE: TextStyle = TextStyle { font: Font::Bold, size: 18.0, leading: 22.0, space_before: 0.0, space_after: 6.0 };
const SECTION_STYLE: TextStyle = TextStyle { font: Font::Bold, size: 14.0, leading: 18.0, space_before: 12.0, space_after: 6.0 };
const BODY_STYLE: TextStyle = TextStyle { font: Font::Regular, size: 10.0, leading: 12.0, space_before: 0.0, space_after: 0.0 };

/// Keeps WinAnsi-encodable text; anything else becomes `?`.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\t' | '\n' | '\r' => out.push(' '),
            c if c.is_control() => {}
            c if win_ansi(c).is_some() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Escapes a normalized string for a PDF literal string. Codes above 126 are
/// written as octal escapes so the content stream stays ASCII.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            _ => match win_ansi(ch) {
                Some(code) => {
                    let _ = write!(out, "\\{code:03o}");
                }
                None => out.push('?'),
            },
        }
    }
    out
}

/// A word made of one or more same-line fragments, possibly in different fonts.
#[derive(Debug, Default)]
struct Word {
    fragments: Vec<(Font, String)>,
    space_after: bool,
}

impl Word {
    fn push(&mut self, font: Font, ch: char) {
        match self.fragments.last_mut() {
            Some((last, text)) if *last == font => text.push(ch),
            _ => self.fragments.push((font, ch.to_string())),
        }
    }

    fn width(&self, size: f32) -> f32 {
        self.fragments.iter().map(|(font, text)| font.text_width(text, size)).sum()
    }

    fn last_font(&self) -> Font {
        self.fragments.last().map(|(font, _)| *font).unwrap_or(Font::Regular)
    }
}

fn split_words(spans: &[TextSpan], base: Font) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current = Word::default();
    for span in spans {
        let font = if span.bold { Font::Bold } else { base };
        for ch in normalize(&span.text).chars() {
            if ch == ' ' {
                current.space_after = !current.fragments.is_empty();
                continue;
            }
            if current.space_after {
                words.push(std::mem::take(&mut current));
            }
            current.push(font, ch);
        }
    }
    if !current.fragments.is_empty() {
        words.push(current);
    }
    words
}

type Line = Vec<(Font, String)>;

/// Cuts a word wider than `max_width` at character boundaries. Only the
/// last piece keeps the word's trailing space.
fn split_oversized(word: Word, size: f32, max_width: f32) -> Vec<Word> {
    if word.width(size) <= max_width {
        return vec![word];
    }
    let mut pieces = Vec::new();
    let mut current = Word::default();
    let mut width = 0.0;
    for (font, text) in &word.fragments {
        for ch in text.chars() {
            let ch_width = font.char_width(ch, size);
            if !current.fragments.is_empty() && width + ch_width > max_width {
                pieces.push(std::mem::take(&mut current));
                width = 0.0;
            }
            current.push(*font, ch);
            width += ch_width;
        }
    }
    current.space_after = word.space_after;
    pieces.push(current);
    pieces
}

/// Greedy line filling.
fn wrap(words: Vec<Word>, size: f32, max_width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut line: Line = Vec::new();
    let mut width = 0.0;
    let mut pending_space: Option<Font> = None;

    for word in words.into_iter().flat_map(|w| split_oversized(w, size, max_width)) {
        let space = pending_space.map(|f| f.text_width(" ", size)).unwrap_or(0.0);
        let word_width = word.width(size);
        if !line.is_empty() && width + space + word_width > max_width {
            lines.push(std::mem::take(&mut line));
            width = 0.0;
            pending_space = None;
        }
        if let Some(font) = pending_space.take() {
            append(&mut line, font, " ");
            width += font.text_width(" ", size);
        }
        for (font, text) in &word.fragments {
            append(&mut line, *font, text);
        }
        width += word_width;
        if word.space_after {
            pending_space = Some(word.last_font());
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn append(line: &mut Line, font: Font, text: &str) {
    match line.last_mut() {
        Some((last, run)) if *last == font => run.push_str(text),
        _ => line.push((font, text.to_string())),
    }
}

/// Page-filling state while walking the element list.
struct Layout {
    pages: Vec<String>,
    ops: String,
    cursor_y: f32,
    has_content: bool,
    break_pending: bool,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            ops: String::new(),
            cursor_y: PAGE_HEIGHT - MARGIN,
            has_content: false,
            break_pending: false,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.ops));
        self.cursor_y = PAGE_HEIGHT - MARGIN;
        self.has_content = false;
        self.break_pending = false;
    }

    fn page_break(&mut self) {
        if self.has_content {
            self.break_pending = true;
        }
    }

    fn gap(&mut self, points: f32) {
        if self.has_content && !self.break_pending {
            self.cursor_y -= points;
        }
    }

    fn place(&mut self, spans: &[TextSpan], style: TextStyle) {
        let words = split_words(spans, style.font);
        let lines = wrap(words, style.size, PAGE_WIDTH - 2.0 * MARGIN);
        if lines.is_empty() {
            return;
        }
        self.gap(style.space_before);
        for line in &lines {
            if self.break_pending || (self.has_content && self.cursor_y - style.leading < MARGIN) {
                self.new_page();
            }
            self.cursor_y -= style.leading;
            let baseline = self.cursor_y + (style.leading - style.size);
            self.draw_line(line, style.size, baseline);
            self.has_content = true;
        }
        self.gap(style.space_after);
    }

    fn draw_line(&mut self, line: &Line, size: f32, baseline: f32) {
        let _ = writeln!(self.ops, "BT");
        let _ = writeln!(self.ops, "{:.2} {:.2} Td", MARGIN, baseline);
        for (font, text) in line {
            let _ = writeln!(self.ops, "/{} {} Tf", font.resource(), size);
            let _ = writeln!(self.ops, "({}) Tj", escape(text));
        }
        let _ = writeln!(self.ops, "ET");
    }

    fn finish(mut self) -> Vec<String> {
        if self.has_content || self.pages.is_empty() {
            self.pages.push(self.ops);
        }
        self.pages
    }
}

fn layout(elements: &[ReportElement]) -> Vec<String> {
    let mut layout = Layout::new();
    for element in elements {
        match element {
            ReportElement::Heading { level, text } => {
                let style = match level {
                    HeadingLevel::Title => TITLE_STYLE,
                    HeadingLevel::Section => SECTION_STYLE,
                };
                layout.place(&[TextSpan::regular(text.clone())], style);
            }
            ReportElement::Paragraph(spans) => layout.place(spans, BODY_STYLE),
            ReportElement::Spacer(points) => layout.gap(*points),
            ReportElement::PageBreak => layout.page_break(),
        }
    }
    layout.finish()
}

/// Sequential object writer tracking byte offsets for the xref table.
struct ObjectWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl ObjectWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self { buf, offsets: Vec::new() }
    }

    fn next_id(&self) -> usize {
        self.offsets.len() + 1
    }

    fn object(&mut self, body: &str) -> usize {
        let id = self.next_id();
        self.offsets.push(self.buf.len());
        self.buf.extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
        id
    }

    fn stream(&mut self, content: &str) -> usize {
        self.object(&format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ))
    }

    fn finish(mut self, root: usize, info: usize) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let size = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {size} /Root {root} 0 R /Info {info} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const INFO_ID: usize = 5;
const FIRST_PAGE_ID: usize = 6;

pub struct PdfRenderer;

impl PdfRenderer {
    /// Typesets and serializes the elements into a complete PDF file.
    pub fn render(elements: &[ReportElement], title: &str, created_at: NaiveDateTime) -> Vec<u8> {
        let pages = layout(elements);
        let page_ids: Vec<usize> = (0..pages.len()).map(|i| FIRST_PAGE_ID + 2 * i).collect();

        let mut writer = ObjectWriter::new();
        writer.object(&format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>"));
        let kids: Vec<String> = page_ids.iter().map(|id| format!("{id} 0 R")).collect();
        writer.object(&format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ));
        writer.object("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>");
        writer.object("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>");
        writer.object(&format!(
            "<< /Title ({}) /Producer ({}) /CreationDate (D:{}) >>",
            escape(&normalize(title)),
            PRODUCER,
            created_at.format("%Y%m%d%H%M%S")
        ));

        for (ops, page_id) in pages.iter().zip(&page_ids) {
            debug_assert_eq!(writer.next_id(), *page_id);
            writer.object(&format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                page_id + 1
            ));
            writer.stream(ops);
        }

        writer.finish(CATALOG_ID, INFO_ID)
    }
}
