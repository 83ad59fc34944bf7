//! Minimal PDF 1.4 writer for the report's draw instructions.
//!
//! Only the two standard Helvetica faces are used, so no font data needs to
//! be embedded. Text is encoded as WinAnsi; characters outside it become `?`.

use std::fmt::Write as _;
use std::io::{self, Write};

use super::layout::{DrawOp, PageConfig, RowLayout};

const BODY_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";
const BODY_SIZE: f32 = 10.0;
const HEADING_SIZE: f32 = 14.0;
const TITLE_SIZE: f32 = 18.0;
const CARD_FILL: f32 = 0.93;

pub struct PdfWriter {
    page_width: f32,
    page_height: f32,
    pages: Vec<String>,
}

impl PdfWriter {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            page_width: config.page_width,
            page_height: config.page_height,
            pages: vec![String::new()],
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn draw(&mut self, op: &DrawOp) {
        match op {
            DrawOp::Title { text, y } => {
                // Helvetica-Bold averages a little over half an em per glyph.
                let width = text.chars().count() as f32 * TITLE_SIZE * 0.55;
                let x = ((self.page_width - width) / 2.0).max(0.0);
                self.text(BOLD_FONT, TITLE_SIZE, x, y + TITLE_SIZE, text);
            }
            DrawOp::Card {
                x,
                y,
                width,
                height,
                status,
                count,
            } => {
                let bottom = self.flip(y + height);
                let _ = writeln!(
                    self.content(),
                    "{CARD_FILL} g {x:.2} {bottom:.2} {width:.2} {height:.2} re f 0 g"
                );
                self.rect(*x, *y, *width, *height);
                self.text(BOLD_FONT, 12.0, x + 10.0, y + 20.0, status);
                let label = if *count == 1 {
                    "1 record".to_string()
                } else {
                    format!("{count} records")
                };
                self.text(BODY_FONT, BODY_SIZE, x + 10.0, y + 38.0, &label);
            }
            DrawOp::Heading { x, y, text } => {
                self.text(BOLD_FONT, HEADING_SIZE, *x, y + HEADING_SIZE, text);
            }
            DrawOp::Border {
                x,
                y,
                width,
                height,
            } => self.rect(*x, *y, *width, *height),
            DrawOp::HeaderRow(row) => self.row(row, BOLD_FONT),
            DrawOp::DataRow(row) => self.row(row, BODY_FONT),
            DrawOp::PageBreak => self.pages.push(String::new()),
        }
    }

    /// Writes the finished document and consumes the writer.
    pub fn finish<W: Write>(self, out: &mut W) -> io::Result<()> {
        let page_count = self.pages.len();
        // Objects 1-4 are fixed; each page then takes a page and a content object.
        let first_page_obj = 5;
        let mut body: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = Vec::new();

        body.extend_from_slice(b"%PDF-1.4\n");

        let kids = (0..page_count)
            .map(|i| format!("{} 0 R", first_page_obj + 2 * i))
            .collect::<Vec<_>>()
            .join(" ");

        let mut objects: Vec<Vec<u8>> = vec![
            b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
            format!("<< /Type /Pages /Kids [{kids}] /Count {page_count} >>").into_bytes(),
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_vec(),
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_vec(),
        ];

        for (i, content) in self.pages.iter().enumerate() {
            let content_obj = first_page_obj + 2 * i + 1;
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                     /Resources << /Font << /{BODY_FONT} 3 0 R /{BOLD_FONT} 4 0 R >> >> \
                     /Contents {content_obj} 0 R >>",
                    self.page_width, self.page_height
                )
                .into_bytes(),
            );
            let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
            stream.extend_from_slice(content.as_bytes());
            stream.extend_from_slice(b"\nendstream");
            objects.push(stream);
        }

        for (i, object) in objects.iter().enumerate() {
            offsets.push(body.len());
            body.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            body.extend_from_slice(object);
            body.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = body.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        );
        body.extend_from_slice(xref.as_bytes());

        out.write_all(&body)?;
        out.flush()
    }

    fn content(&mut self) -> &mut String {
        // `pages` always holds at least one page.
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn flip(&self, y: f32) -> f32 {
        self.page_height - y
    }

    fn text(&mut self, font: &str, size: f32, x: f32, baseline: f32, text: &str) {
        let y = self.flip(baseline);
        let encoded = escape(text);
        let _ = writeln!(
            self.content(),
            "BT /{font} {size} Tf {x:.2} {y:.2} Td ({encoded}) Tj ET"
        );
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let bottom = self.flip(y + height);
        let _ = writeln!(
            self.content(),
            "{x:.2} {bottom:.2} {width:.2} {height:.2} re S"
        );
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let (y1, y2) = (self.flip(y1), self.flip(y2));
        let _ = writeln!(self.content(), "{x1:.2} {y1:.2} m {x2:.2} {y2:.2} l S");
    }

    fn row(&mut self, row: &RowLayout, font: &str) {
        let baseline = row.y + row.height / 2.0 + BODY_SIZE * 0.35;
        let clip_bottom = self.flip(row.y + row.height);

        for cell in &row.cells {
            let y = self.flip(baseline);
            let encoded = escape(&cell.text);
            let _ = writeln!(
                self.content(),
                "q {:.2} {clip_bottom:.2} {:.2} {:.2} re W n \
                 BT /{font} {BODY_SIZE} Tf {:.2} {y:.2} Td ({encoded}) Tj ET Q",
                cell.x,
                cell.clip_width,
                row.height,
                cell.x,
            );
        }

        for x in &row.dividers {
            self.line(*x, row.y, *x, row.y + row.height);
        }
        self.line(row.x, row.y + row.height, row.x + row.width, row.y + row.height);
    }
}

/// Escapes a string for a PDF literal, mapping Latin-1 to octal escapes.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(out, "\\{:03o}", ch as u32);
            }
            _ => out.push('?'),
        }
    }
    out
}
