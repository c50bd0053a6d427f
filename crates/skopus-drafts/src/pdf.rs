//! Minimal PDF 1.4 writer for a laid-out contract.
//!
//! Uses the two standard Helvetica faces with `WinAnsiEncoding`, so no font
//! data is embedded. Content streams are left uncompressed.

use std::fmt::Write as _;

use crate::layout::metrics::mm_to_pt;
use crate::layout::{ContractDocument, Element, Page, TextLine, PAGE_HEIGHT, PAGE_WIDTH};

const HEADER: &[u8] = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n";
const RULE_WIDTH_PT: f64 = 0.5;

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const REGULAR_FONT_ID: usize = 3;
const BOLD_FONT_ID: usize = 4;
const FIRST_PAGE_ID: usize = 5;

/// Serialises `doc` into a complete PDF file.
#[must_use]
pub fn render_pdf(doc: &ContractDocument) -> Vec<u8> {
    let mut writer = ObjectWriter::new();

    let page_ids: Vec<usize> = (0..doc.pages.len())
        .map(|i| FIRST_PAGE_ID + 2 * i)
        .collect();

    writer.object(
        CATALOG_ID,
        format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>").as_bytes(),
    );

    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    writer.object(
        PAGES_ID,
        format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} /MediaBox [0 0 {} {}] >>",
            page_ids.len(),
            num(mm_to_pt(PAGE_WIDTH)),
            num(mm_to_pt(PAGE_HEIGHT)),
        )
        .as_bytes(),
    );
    writer.object(REGULAR_FONT_ID, font_dict("Helvetica").as_bytes());
    writer.object(BOLD_FONT_ID, font_dict("Helvetica-Bold").as_bytes());

    for (page, id) in doc.pages.iter().zip(&page_ids) {
        let content_id = id + 1;
        writer.object(
            *id,
            format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /Resources << /Font << /F1 {REGULAR_FONT_ID} 0 R /F2 {BOLD_FONT_ID} 0 R >> >> /Contents {content_id} 0 R >>"
            )
            .as_bytes(),
        );

        let stream = page_content(page);
        let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        body.extend_from_slice(&stream);
        body.extend_from_slice(b"\nendstream");
        writer.object(content_id, &body);
    }

    writer.finish(CATALOG_ID)
}

fn font_dict(base: &str) -> String {
    format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>")
}

/// Drawing operators for one page.
fn page_content(page: &Page) -> Vec<u8> {
    let mut out = Vec::new();
    for element in &page.elements {
        match element {
            Element::Text(line) => text_ops(&mut out, line),
            Element::Rule { x1, x2, y } => {
                let y = num(mm_to_pt(PAGE_HEIGHT - y));
                out.extend_from_slice(
                    format!(
                        "{} w {} {y} m {} {y} l S\n",
                        num(RULE_WIDTH_PT),
                        num(mm_to_pt(*x1)),
                        num(mm_to_pt(*x2)),
                    )
                    .as_bytes(),
                );
            }
        }
    }
    out
}

fn text_ops(out: &mut Vec<u8>, line: &TextLine) {
    let y = num(mm_to_pt(PAGE_HEIGHT - line.y));
    for run in &line.runs {
        let font = if run.bold { "F2" } else { "F1" };
        let mut ops = format!(
            "BT /{font} {} Tf {} Tw 1 0 0 1 {} {y} Tm (",
            num(line.size),
            num(mm_to_pt(line.word_spacing)),
            num(mm_to_pt(run.x)),
        );
        push_pdf_string(&mut ops, &run.text);
        ops.push_str(") Tj ET\n");
        out.extend_from_slice(ops.as_bytes());
    }
}

fn num(value: f64) -> String {
    format!("{value:.2}")
}

/// Appends `text` as the body of a PDF literal string in `WinAnsiEncoding`.
///
/// Delimiters are escaped and bytes outside printable ASCII are written as
/// octal escapes, keeping the stream 7-bit clean.
pub(crate) fn push_pdf_string(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => {
                let _ = write!(out, "\\{:03o}", win_ansi_byte(c));
            }
        }
    }
}

/// Code of `c` in `WinAnsiEncoding`; unmappable characters become `?`.
pub(crate) fn win_ansi_byte(c: char) -> u8 {
    match c {
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '\t' => b' ',
        _ => match u8::try_from(u32::from(c)) {
            Ok(byte) if byte >= 0x20 && byte != 0x7F && !(0x80..0xA0).contains(&byte) => byte,
            _ => b'?',
        },
    }
}

/// Tracks byte offsets of numbered objects for the cross-reference table.
struct ObjectWriter {
    buf: Vec<u8>,
    offsets: Vec<(usize, usize)>,
}

impl ObjectWriter {
    fn new() -> Self {
        Self {
            buf: HEADER.to_vec(),
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, id: usize, body: &[u8]) {
        self.offsets.push((id, self.buf.len()));
        self.buf.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn finish(mut self, root: usize) -> Vec<u8> {
        self.offsets.sort_unstable();
        let size = self.offsets.len() + 1;
        let xref_at = self.buf.len();

        let mut table = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for (_, offset) in &self.offsets {
            let _ = writeln!(table, "{offset:010} 00000 n ");
        }
        let _ = write!(
            table,
            "trailer\n<< /Size {size} /Root {root} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
        );
        self.buf.extend_from_slice(table.as_bytes());
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout_contract;

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn file_has_header_trailer_and_page_tree() {
        let pdf = render_pdf(&layout_contract("Corpo.", "Ana", "Loja"));
        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        let text = as_text(&pdf);
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("/MediaBox [0 0 595.28 841.89]"));
    }

    #[test]
    fn xref_offsets_point_at_their_objects() {
        let text = ["linha"; 60].join("\n");
        let pdf = render_pdf(&layout_contract(&text, "Ana", "Loja"));
        let raw = as_text(&pdf);

        let xref_at: usize = raw
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .expect("startxref offset");
        assert!(pdf[xref_at..].starts_with(b"xref\n"));

        let entries: Vec<usize> = as_text(&pdf[xref_at..])
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().expect("offset"))
            .collect();
        assert_eq!(entries.len(), 4 + 2 * 2);
        for (i, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj\n", i + 1);
            assert!(pdf[*offset..].starts_with(expected.as_bytes()), "object {}", i + 1);
        }
        assert!(raw.contains("/Count 2"));
    }

    #[test]
    fn stream_length_matches_content() {
        let pdf = as_text(&render_pdf(&layout_contract("Corpo.", "Ana", "Loja")));
        let start = pdf.find("<< /Length ").expect("stream dict") + "<< /Length ".len();
        let length: usize = pdf[start..]
            .split(' ')
            .next()
            .and_then(|n| n.parse().ok())
            .expect("length");
        let body_start = pdf[start..].find("stream\n").expect("stream") + start + "stream\n".len();
        assert_eq!(&pdf[body_start + length..body_start + length + 10], "\nendstream");
    }

    #[test]
    fn text_is_win_ansi_encoded_and_escaped() {
        let mut out = String::new();
        push_pdf_string(&mut out, "PRESTAÇÃO (R$ 10) \\ “ok” – fim… 😀");
        assert_eq!(
            out,
            "PRESTA\\307\\303O \\(R$ 10\\) \\\\ \\223ok\\224 \\226 fim\\205 \\077"
        );
    }

    #[test]
    fn bold_runs_use_the_bold_face() {
        let pdf = as_text(&render_pdf(&layout_contract("O **CONTRATANTE** paga", "Ana", "Loja")));
        assert!(pdf.contains("/F2 10.00 Tf 0.00 Tw"));
        assert!(pdf.contains("(CONTRATANTE) Tj"));
        assert!(pdf.contains("/F1 8.00 Tf"));
        assert!(pdf.contains(" w "));
    }
}
