//! PDF export.
//!
//! Generates minimal but valid PDF files using raw PDF format construction.
//! Lays entries out as blocks (entry number, creation time, one line per
//! field) and starts new pages as the cursor runs past the bottom margin.
//! Uses built-in Helvetica, so no font files are embedded.

use anyhow::Result;
use std::fmt::Write;

use crate::context::ExportContext;

const PAGE_WIDTH: f64 = 595.0;
const PAGE_HEIGHT: f64 = 842.0;
const LEFT_X: f64 = 57.0;
const VALUE_X: f64 = 227.0;

/// Cursor positions measured from the top edge of the page.
const PAGE_TOP: f64 = 85.0;
const DESCRIPTION_Y: f64 = 128.0;
const CONTENT_START: f64 = 170.0;
/// An entry block starting below this line moves to a fresh page.
const ENTRY_BREAK: f64 = 708.0;
/// A field line starting below this line moves to a fresh page.
const FIELD_BREAK: f64 = 765.0;

const ENTRY_HEADER_ADVANCE: f64 = 28.0;
const CREATED_ADVANCE: f64 = 42.0;
const FIELD_ADVANCE: f64 = 23.0;
const ENTRY_GAP: f64 = 28.0;

/// Roughly how many 10pt Helvetica characters fit between the value column
/// and the right margin.
const VALUE_WRAP_CHARS: usize = 60;
const DESCRIPTION_WRAP_CHARS: usize = 80;
const TITLE_WRAP_CHARS: usize = 42;

const TITLE_ADVANCE: f64 = 24.0;
const DESCRIPTION_ADVANCE: f64 = 16.0;

#[derive(Clone, Copy)]
enum Font {
    Bold,
    Regular,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Self::Bold => "/F1",
            Self::Regular => "/F2",
        }
    }
}

/// Encode entries as a paginated PDF document.
pub fn encode_pdf(ctx: &ExportContext<'_>) -> Result<Vec<u8>> {
    let pages = layout_pages(ctx);
    Ok(PdfBuilder::new(pages).build(&ctx.schema.name))
}

/// Content streams, one per page.
fn layout_pages(ctx: &ExportContext<'_>) -> Vec<String> {
    let mut pages = PageWriter::new();

    for line in wrap_text(&ctx.schema.name, TITLE_WRAP_CHARS) {
        pages.line(Font::Bold, 20.0, LEFT_X, &line, TITLE_ADVANCE);
    }
    if let Some(description) = ctx.schema.description() {
        pages.cursor = pages.cursor.max(DESCRIPTION_Y);
        for line in wrap_text(description, DESCRIPTION_WRAP_CHARS) {
            pages.line(Font::Regular, 12.0, LEFT_X, &line, DESCRIPTION_ADVANCE);
        }
        pages.cursor += 26.0;
    }
    pages.cursor = pages.cursor.max(CONTENT_START);

    for (index, entry) in ctx.entries.iter().enumerate() {
        if pages.cursor > ENTRY_BREAK {
            pages.new_page();
        }

        let y = pages.cursor;
        pages.text(Font::Bold, 14.0, LEFT_X, y, &format!("Entry {}", index + 1));
        pages.cursor += ENTRY_HEADER_ADVANCE;

        let y = pages.cursor;
        let created = format!("Created: {}", ctx.display_time(&entry.created_at));
        pages.text(Font::Regular, 10.0, LEFT_X, y, &created);
        pages.cursor += CREATED_ADVANCE;

        for field in &ctx.schema.fields {
            let value = ctx.normalized(entry, field);
            let value = if value.is_empty() { "N/A".to_string() } else { value };

            for (line_idx, line) in wrap_text(&value, VALUE_WRAP_CHARS).iter().enumerate() {
                if pages.cursor > FIELD_BREAK {
                    pages.new_page();
                }
                let y = pages.cursor;
                if line_idx == 0 {
                    pages.text(Font::Bold, 10.0, LEFT_X, y, &format!("{}:", field.label));
                }
                pages.text(Font::Regular, 10.0, VALUE_X, y, line);
                pages.cursor += FIELD_ADVANCE;
            }
        }

        pages.cursor += ENTRY_GAP;
    }

    pages.finish()
}

struct PageWriter {
    finished: Vec<String>,
    current: String,
    cursor: f64,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            current: String::new(),
            cursor: PAGE_TOP,
        }
    }

    /// Write one line at the cursor and advance it, breaking to a new page
    /// first when the cursor is past the bottom margin.
    fn line(&mut self, font: Font, size: f64, x: f64, text: &str, advance: f64) {
        if self.cursor > FIELD_BREAK {
            self.new_page();
        }
        let y = self.cursor;
        self.text(font, size, x, y, text);
        self.cursor += advance;
    }

    fn new_page(&mut self) {
        self.finished.push(std::mem::take(&mut self.current));
        self.cursor = PAGE_TOP;
    }

    fn text(&mut self, font: Font, size: f64, x: f64, y_from_top: f64, text: &str) {
        let y = PAGE_HEIGHT - y_from_top;
        let _ = write!(
            self.current,
            "BT\n{} {size:.0} Tf\n{x:.0} {y:.0} Td\n({}) Tj\nET\n",
            font.resource(),
            pdf_escape(text)
        );
    }

    fn finish(mut self) -> Vec<String> {
        self.finished.push(self.current);
        self.finished
    }
}

/// Greedy word wrap on whitespace. Always yields at least one line; words
/// longer than `width` are split.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let line_len = line.chars().count();
            if line_len > 0 && line_len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.extend(word);
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Escape text for a PDF string literal in WinAnsi encoding. Latin-1 characters
/// outside ASCII are written as octal escapes so the content stream stays ASCII;
/// anything beyond Latin-1 becomes `?`.
fn pdf_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            c if c.is_control() => out.push(' '),
            c if c.is_ascii() => out.push(c),
            c if (c as u32) <= 0xFF => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            _ => out.push('?'),
        }
    }
    out
}

/// Minimal PDF file builder. Constructs valid PDF 1.4 files with any number of pages.
struct PdfBuilder {
    pages: Vec<String>,
}

impl PdfBuilder {
    fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// Build the complete PDF file as bytes.
    ///
    /// Object layout: 1 catalog, 2 page tree, 3-4 fonts, 5 info, then a
    /// (page, content stream) pair per page.
    fn build(&self, title: &str) -> Vec<u8> {
        let mut pdf = String::new();
        let mut offsets: Vec<usize> = Vec::new();

        let page_obj = |i: usize| 6 + 2 * i;

        // Header
        pdf.push_str("%PDF-1.4\n");

        // Obj 1: Catalog
        offsets.push(pdf.len());
        pdf.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        // Obj 2: Pages
        let kids: Vec<String> = (0..self.pages.len())
            .map(|i| format!("{} 0 R", page_obj(i)))
            .collect();
        offsets.push(pdf.len());
        let _ = write!(
            pdf,
            "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
            kids.join(" "),
            self.pages.len()
        );

        // Obj 3: Font (Helvetica-Bold)
        offsets.push(pdf.len());
        pdf.push_str(
            "3 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>\nendobj\n",
        );

        // Obj 4: Font (Helvetica)
        offsets.push(pdf.len());
        pdf.push_str(
            "4 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>\nendobj\n",
        );

        // Obj 5: Info (title)
        offsets.push(pdf.len());
        let _ = write!(
            pdf,
            "5 0 obj\n<< /Title ({}) /Producer (Formcraft) >>\nendobj\n",
            pdf_escape(title)
        );

        for (i, stream) in self.pages.iter().enumerate() {
            let page = page_obj(i);
            let contents = page + 1;

            offsets.push(pdf.len());
            let _ = write!(
                pdf,
                "{page} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH:.0} {PAGE_HEIGHT:.0}] \
                 /Contents {contents} 0 R /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> >>\nendobj\n"
            );

            offsets.push(pdf.len());
            let _ = write!(
                pdf,
                "{contents} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
                stream.len(),
                stream
            );
        }

        // Cross-reference table
        let xref_offset = pdf.len();
        let num_objects = offsets.len() + 1; // +1 for free entry
        let _ = write!(pdf, "xref\n0 {num_objects}\n");
        pdf.push_str("0000000000 65535 f \n");
        for offset in &offsets {
            let _ = writeln!(pdf, "{offset:010} 00000 n ");
        }

        // Trailer
        let _ = write!(
            pdf,
            "trailer\n<< /Size {num_objects} /Root 1 0 R /Info 5 0 R >>\n"
        );
        let _ = write!(pdf, "startxref\n{xref_offset}\n%%EOF\n");

        pdf.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::fixtures::*;
    use formcraft_core::{ExportOptions, FieldValue, FormEntry};

    fn many_entries(n: usize) -> Vec<FormEntry> {
        (0..n)
            .map(|i| {
                entry(
                    &format!("e{i}"),
                    "2024-03-01T09:30:00Z",
                    &[("name", FieldValue::from(format!("Person {i}")))],
                )
            })
            .collect()
    }

    #[test]
    fn test_encode_pdf_basic() {
        let schema = schema();
        let entries = entries();
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &entries, &options);
        let bytes = encode_pdf(&ctx).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        let content = String::from_utf8_lossy(&bytes);
        assert!(content.contains("(Customer Survey) Tj"));
        assert!(content.contains("(Entry 1) Tj"));
        assert!(content.contains("(Entry 2) Tj"));
        assert!(content.contains("(Created: 2024-03-01 09:30:00 UTC) Tj"));
        assert!(content.contains("(Tags:) Tj"));
        assert!(content.contains("(A,B) Tj"));
    }

    #[test]
    fn test_empty_values_print_placeholder() {
        let schema = schema();
        let entries = vec![entry("e1", "2024-03-01T09:30:00Z", &[])];
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &entries, &options);
        let pages = layout_pages(&ctx);
        assert_eq!(pages[0].matches("(N/A) Tj").count(), 3);
    }

    #[test]
    fn test_no_entries_single_page() {
        let schema = schema();
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &[], &options);
        assert_eq!(layout_pages(&ctx).len(), 1);
        let content = String::from_utf8_lossy(&encode_pdf(&ctx).unwrap()).to_string();
        assert!(content.contains("/Count 1"));
    }

    #[test]
    fn test_paginates_long_exports() {
        let schema = schema();
        // Each entry block takes 28 + 42 + 3*23 + 28 = 167pt.
        let entries = many_entries(12);
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &entries, &options);
        let pages = layout_pages(&ctx);
        assert!(pages.len() > 1);

        let bytes = encode_pdf(&ctx).unwrap();
        let content = String::from_utf8_lossy(&bytes);
        assert!(content.contains(&format!("/Count {}", pages.len())));
        assert_eq!(content.matches("/Type /Page ").count(), pages.len());
    }

    #[test]
    fn test_entry_header_never_orphaned() {
        let schema = schema();
        let entries = many_entries(30);
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &entries, &options);
        for page in layout_pages(&ctx) {
            // An "Entry N" header and its "Created:" line land on the same page.
            assert_eq!(
                page.matches("(Entry ").count(),
                page.matches("(Created: ").count()
            );
        }
    }

    fn td_positions(pages: &[String]) -> Vec<f64> {
        pages
            .iter()
            .flat_map(|page| page.lines())
            .filter(|l| l.ends_with(" Td"))
            .map(|l| l.split_whitespace().nth(1).unwrap().parse().unwrap())
            .collect()
    }

    #[test]
    fn test_long_description_flows_onto_new_pages() {
        let mut schema = schema();
        schema.description = Some(
            (0..80)
                .map(|i| format!("Description line {i}"))
                .collect::<Vec<_>>()
                .join("\n"),
        );
        schema.name = "A very long form title that certainly needs more than one line".into();
        let entries = entries();
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &entries, &options);
        let pages = layout_pages(&ctx);

        assert!(pages.len() > 1);
        let ys = td_positions(&pages);
        assert!(ys.iter().all(|y| *y >= 0.0 && *y <= PAGE_HEIGHT), "{ys:?}");
        let all = pages.concat();
        assert!(all.contains("(Description line 0) Tj"));
        assert!(all.contains("(Description line 79) Tj"));
        assert!(all.contains("(Entry 2) Tj"));
    }

    #[test]
    fn test_short_header_keeps_content_start() {
        let schema = schema();
        let entries = entries();
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &entries, &options);
        let pages = layout_pages(&ctx);
        // title at 85, description at 128, first entry at 170 from the top
        assert!(pages[0].contains("57 757 Td\n(Customer Survey) Tj"));
        assert!(pages[0].contains("57 714 Td\n(Quarterly feedback) Tj"));
        assert!(pages[0].contains("57 672 Td\n(Entry 1) Tj"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let schema = schema();
        let entries = many_entries(8);
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &entries, &options);
        let bytes = encode_pdf(&ctx).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let xref_start = text.find("xref\n").unwrap();
        let offsets: Vec<usize> = text[xref_start..]
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        for (i, offset) in offsets.iter().enumerate() {
            assert!(text[*offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }
    }

    #[test]
    fn test_pdf_escape() {
        assert_eq!(pdf_escape("hello"), "hello");
        assert_eq!(pdf_escape("(test)"), "\\(test\\)");
        assert_eq!(pdf_escape("a\\b"), "a\\\\b");
        assert_eq!(pdf_escape("caf\u{e9}"), "caf\\351");
        assert_eq!(pdf_escape("tab\there"), "tab here");
        assert_eq!(pdf_escape("\u{4e2d}"), "?");
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("", 10), vec![""]);
        assert_eq!(wrap_text("short", 10), vec!["short"]);
        assert_eq!(
            wrap_text("one two three four", 9),
            vec!["one two", "three", "four"]
        );
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("first\nsecond", 20), vec!["first", "second"]);
    }
}
