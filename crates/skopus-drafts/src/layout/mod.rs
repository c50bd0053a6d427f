//! Flows contract text onto A4 pages.
//!
//! All positions are millimetres from the top-left corner of the page; `y`
//! is the text baseline. The output is consumed by [`crate::pdf`] and is
//! also serialised for front ends that draw their own preview.

pub mod metrics;

use serde::Serialize;
use skopus_core::text::{bold_spans, is_heading, strip_bold_markup, Span};

use metrics::text_width_mm;

pub const PAGE_WIDTH: f64 = 210.0;
pub const PAGE_HEIGHT: f64 = 297.0;
pub const MARGIN: f64 = 20.0;
pub const TEXT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;

pub const TITLE: &str = "CONTRATO DE PRESTAÇÃO DE SERVIÇOS";
const TITLE_SIZE: f64 = 16.0;
const TITLE_Y: f64 = 20.0;
const TITLE_GAP: f64 = 15.0;

const BODY_SIZE: f64 = 10.0;
const LINE_ADVANCE: f64 = 6.0;
const BODY_LIMIT: f64 = 280.0;
const PAGE_TOP: f64 = 20.0;

const SIGNATURE_GAP: f64 = 20.0;
const SIGNATURE_LIMIT: f64 = 260.0;
const SIGNATURE_RULE: f64 = 70.0;
const SIGNATURE_NAME_GAP: f64 = 5.0;
const SIGNATURE_ROLE_GAP: f64 = 4.0;
const SIGNATURE_SIZE: f64 = 8.0;

pub const PROVIDER_ROLE: &str = "CONTRATADA";
pub const CLIENT_ROLE: &str = "CONTRATANTE";

/// A stretch of same-weight text starting at `x`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    pub x: f64,
    pub text: String,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub y: f64,
    pub size: f64,
    /// Extra width added to every space, used to justify the line.
    pub word_spacing: f64,
    pub runs: Vec<Run>,
}

impl TextLine {
    /// The line's text without positioning.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, run) in self.runs.iter().enumerate() {
            if i > 0 && !out.ends_with(' ') {
                out.push(' ');
            }
            out.push_str(&run.text);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Text(TextLine),
    Rule { x1: f64, x2: f64, y: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(line) => Some(line),
            Element::Rule { .. } => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractDocument {
    pub pages: Vec<Page>,
}

impl ContractDocument {
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.pages.iter().flat_map(Page::lines)
    }
}

/// Lays out the title, the body and the signature block.
///
/// Body lines are wrapped to [`TEXT_WIDTH`]; `**bold**` spans and clause
/// headings (fully uppercase lines) render bold. Every line but the last of
/// a paragraph is justified.
#[must_use]
pub fn layout_contract(text: &str, provider_name: &str, client_name: &str) -> ContractDocument {
    let mut flow = Flow::new();

    let title_width = text_width_mm(TITLE, true, TITLE_SIZE);
    flow.push_text(TextLine {
        y: TITLE_Y,
        size: TITLE_SIZE,
        word_spacing: 0.0,
        runs: vec![Run {
            x: (PAGE_WIDTH - title_width) / 2.0,
            text: TITLE.to_owned(),
            bold: true,
        }],
    });
    flow.cursor = TITLE_Y + TITLE_GAP;

    for paragraph in text.lines() {
        let heading = is_heading(&strip_bold_markup(paragraph));
        let words = split_words(paragraph, heading);
        if words.is_empty() {
            flow.break_page_past(BODY_LIMIT);
            flow.cursor += LINE_ADVANCE;
            continue;
        }

        let lines = wrap(words, TEXT_WIDTH, BODY_SIZE);
        let last = lines.len() - 1;
        for (i, line) in lines.into_iter().enumerate() {
            flow.break_page_past(BODY_LIMIT);
            let y = flow.cursor;
            flow.push_text(place_line(&line, y, i < last));
            flow.cursor += LINE_ADVANCE;
        }
    }

    flow.cursor += SIGNATURE_GAP;
    flow.break_page_past(SIGNATURE_LIMIT);
    signature_block(&mut flow, provider_name.trim(), client_name.trim());

    ContractDocument { pages: flow.pages }
}

fn signature_block(flow: &mut Flow, provider: &str, client: &str) {
    let right_edge = PAGE_WIDTH - MARGIN;
    let y = flow.cursor;
    flow.push(Element::Rule {
        x1: MARGIN,
        x2: MARGIN + SIGNATURE_RULE,
        y,
    });
    flow.push(Element::Rule {
        x1: right_edge - SIGNATURE_RULE,
        x2: right_edge,
        y,
    });

    let names_y = y + SIGNATURE_NAME_GAP;
    let roles_y = names_y + SIGNATURE_ROLE_GAP;
    for (left, right, line_y) in [(provider, client, names_y), (PROVIDER_ROLE, CLIENT_ROLE, roles_y)] {
        flow.push_text(small_line(left, MARGIN, line_y));
        let width = text_width_mm(right, false, SIGNATURE_SIZE);
        flow.push_text(small_line(right, right_edge - width, line_y));
    }
    flow.cursor = roles_y;
}

fn small_line(text: &str, x: f64, y: f64) -> TextLine {
    TextLine {
        y,
        size: SIGNATURE_SIZE,
        word_spacing: 0.0,
        runs: vec![Run {
            x,
            text: text.to_owned(),
            bold: false,
        }],
    }
}

struct Flow {
    pages: Vec<Page>,
    cursor: f64,
}

impl Flow {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            cursor: PAGE_TOP,
        }
    }

    fn break_page_past(&mut self, limit: f64) {
        if self.cursor > limit {
            self.pages.push(Page::default());
            self.cursor = PAGE_TOP;
        }
    }

    fn push(&mut self, element: Element) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    fn push_text(&mut self, line: TextLine) {
        if !line.runs.is_empty() {
            self.push(Element::Text(line));
        }
    }
}

// ---------------------------------------------------------------------------
// Words and wrapping
// ---------------------------------------------------------------------------

/// Whitespace-delimited word made of one or more same-weight fragments.
#[derive(Debug, Clone, PartialEq)]
struct Word {
    fragments: Vec<Span>,
}

impl Word {
    fn width(&self, size: f64) -> f64 {
        self.fragments
            .iter()
            .map(|f| text_width_mm(&f.text, f.bold, size))
            .sum()
    }

    fn push_char(&mut self, c: char, bold: bool) {
        match self.fragments.last_mut() {
            Some(last) if last.bold == bold => last.text.push(c),
            _ => self.fragments.push(Span {
                text: c.to_string(),
                bold,
            }),
        }
    }
}

fn split_words(paragraph: &str, all_bold: bool) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current = Word { fragments: Vec::new() };

    for span in bold_spans(paragraph) {
        for c in span.text.chars() {
            if c.is_whitespace() {
                if !current.fragments.is_empty() {
                    words.push(std::mem::replace(&mut current, Word { fragments: Vec::new() }));
                }
            } else {
                current.push_char(c, span.bold || all_bold);
            }
        }
    }
    if !current.fragments.is_empty() {
        words.push(current);
    }
    words
}

/// Greedy wrap. A word wider than `max_width` is split across lines.
fn wrap(words: Vec<Word>, max_width: f64, size: f64) -> Vec<Vec<Word>> {
    let space = text_width_mm(" ", false, size);
    let mut lines: Vec<Vec<Word>> = Vec::new();
    let mut current: Vec<Word> = Vec::new();
    let mut current_width = 0.0;

    for word in words.into_iter().flat_map(|w| split_long_word(w, max_width, size)) {
        let width = word.width(size);
        if current.is_empty() {
            current_width = width;
            current.push(word);
        } else if current_width + space + width <= max_width {
            current_width += space + width;
            current.push(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current_width = width;
            current.push(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_long_word(word: Word, max_width: f64, size: f64) -> Vec<Word> {
    if word.width(size) <= max_width {
        return vec![word];
    }

    let mut pieces = Vec::new();
    let mut piece = Word { fragments: Vec::new() };
    for fragment in word.fragments {
        for c in fragment.text.chars() {
            let mut candidate = piece.clone();
            candidate.push_char(c, fragment.bold);
            if candidate.width(size) > max_width && !piece.fragments.is_empty() {
                pieces.push(std::mem::replace(&mut piece, Word { fragments: Vec::new() }));
                piece.push_char(c, fragment.bold);
            } else {
                piece = candidate;
            }
        }
    }
    if !piece.fragments.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Positions a wrapped line at the left margin, stretching its spaces to the
/// full text width when `justify` is set.
fn place_line(words: &[Word], y: f64, justify: bool) -> TextLine {
    let space = text_width_mm(" ", false, BODY_SIZE);
    let natural: f64 = words.iter().map(|w| w.width(BODY_SIZE)).sum::<f64>()
        + space * gaps(words.len());
    let word_spacing = if justify && words.len() > 1 {
        ((TEXT_WIDTH - natural) / gaps(words.len())).max(0.0)
    } else {
        0.0
    };

    let mut runs: Vec<Run> = Vec::new();
    let mut cursor = MARGIN;
    for (i, word) in words.iter().enumerate() {
        let mut continues_run = false;
        if i > 0 {
            cursor += space + word_spacing;
            if let (Some(run), Some(first)) = (runs.last_mut(), word.fragments.first()) {
                if run.bold == first.bold {
                    run.text.push(' ');
                    continues_run = true;
                }
            }
        }
        for (j, fragment) in word.fragments.iter().enumerate() {
            match runs.last_mut() {
                Some(run) if run.bold == fragment.bold && (j > 0 || continues_run) => {
                    run.text.push_str(&fragment.text);
                }
                _ => runs.push(Run {
                    x: cursor,
                    text: fragment.text.clone(),
                    bold: fragment.bold,
                }),
            }
            cursor += text_width_mm(&fragment.text, fragment.bold, BODY_SIZE);
        }
    }

    TextLine {
        y,
        size: BODY_SIZE,
        word_spacing,
        runs,
    }
}

#[allow(clippy::cast_precision_loss)]
fn gaps(words: usize) -> f64 {
    words.saturating_sub(1) as f64
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;
