//! Text runs grouped into blocks.
//!
//! Word splits a paragraph into runs (`<w:r><w:t>..</w:t></w:r>`) wherever
//! formatting or editing history changes, so a token like `{name}` is often
//! spread over several `w:t` elements. Spreadsheets do the same with rich
//! text inside a shared or inline string. Tokens are therefore matched on the
//! concatenated text of a block and written back into the runs they came
//! from.
//!
//! Blocks nest: a text box or shape inside a paragraph carries paragraphs of
//! its own. Each run belongs to its nearest enclosing block, so the outer
//! paragraph's text on both sides of a text box stays one block.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::ops::Range;

use docgen_core::PlaceholderData;
use regex::Regex;

use crate::error::Result;
use crate::placeholder::Tokens;
use crate::xml;

/// Block and text element patterns of one document family
#[derive(Debug, Clone)]
pub struct TextLayout {
    /// Open or close tag of a block; group 1 is `/` on close tags
    boundary: Regex,
    text: Regex,
    tag: &'static str,
}

/// One text element of a part
#[derive(Debug)]
struct Run {
    /// Byte range of the whole element in the part
    element: Range<usize>,
    /// Index of the nearest enclosing block, in document order
    block: usize,
    text: String,
}

impl TextLayout {
    /// Paragraphs (`w:p`) with `w:t` text elements
    pub fn word() -> Result<Self> {
        Ok(Self {
            boundary: Regex::new(r"<(/?)w:p(?:\s[^>]*)?>")?,
            text: Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>")?,
            tag: "w:t",
        })
    }

    /// Shared (`si`) and inline (`is`) strings with `t` text elements
    pub fn spreadsheet() -> Result<Self> {
        Ok(Self {
            boundary: Regex::new(r"<(/?)(?:si|is)(?:\s[^>]*)?>")?,
            text: Regex::new(r"<t(?:\s[^>]*)?>([^<]*)</t>")?,
            tag: "t",
        })
    }

    /// Text elements of `part` that sit inside a block, in document order
    fn runs(&self, part: &str) -> Vec<Run> {
        let mut boundaries = self
            .boundary
            .captures_iter(part)
            .filter_map(|caps| {
                let tag = caps.get(0)?;
                if tag.as_str().ends_with("/>") {
                    return None;
                }
                let closing = caps.get(1).is_some_and(|m| !m.is_empty());
                Some((tag.start(), closing))
            })
            .peekable();

        let mut open: Vec<usize> = Vec::new();
        let mut next_block = 0;
        let mut runs = Vec::new();

        for caps in self.text.captures_iter(part) {
            let Some(element) = caps.get(0) else {
                continue;
            };

            while let Some(&(position, closing)) = boundaries.peek() {
                if position > element.start() {
                    break;
                }
                boundaries.next();
                if closing {
                    open.pop();
                } else {
                    open.push(next_block);
                    next_block += 1;
                }
            }

            if let Some(&block) = open.last() {
                runs.push(Run {
                    element: element.range(),
                    block,
                    text: caps.get(1).map_or_else(String::new, |m| xml::unescape(m.as_str())),
                });
            }
        }

        runs
    }

    /// Append placeholder names found in `part`, in document order
    pub fn collect_names(&self, part: &str, tokens: &Tokens, names: &mut Vec<String>) {
        let runs = self.runs(part);
        for members in blocks(&runs).values() {
            let text: String = members.iter().map(|&i| runs[i].text.as_str()).collect();
            tokens.collect_names(&text, names);
        }
    }

    /// Substitute every token in `part`. Text of blocks without tokens is
    /// returned byte for byte.
    pub fn render<'a>(&self, part: &'a str, tokens: &Tokens, data: &PlaceholderData) -> Cow<'a, str> {
        let runs = self.runs(part);
        let mut rendered: Vec<Option<String>> = vec![None; runs.len()];

        for members in blocks(&runs).values() {
            let mut texts: Vec<String> = members.iter().map(|&i| runs[i].text.clone()).collect();
            let joined = texts.concat();
            let found = tokens.find(&joined);
            if found.is_empty() {
                continue;
            }

            // Right to left, so earlier spans keep their offsets
            for token in found.iter().rev() {
                splice(&mut texts, token.span.clone(), Tokens::value(token.name, data));
            }
            for (&i, text) in members.iter().zip(texts) {
                rendered[i] = Some(text);
            }
        }

        if rendered.iter().all(Option::is_none) {
            return Cow::Borrowed(part);
        }

        let mut out = String::with_capacity(part.len());
        let mut last = 0;
        for (run, text) in runs.iter().zip(rendered) {
            let Some(text) = text else {
                continue;
            };
            out.push_str(&part[last..run.element.start]);
            let _ = write!(
                out,
                "<{tag} xml:space=\"preserve\">{}</{tag}>",
                xml::escape(&text),
                tag = self.tag
            );
            last = run.element.end;
        }
        out.push_str(&part[last..]);
        Cow::Owned(out)
    }
}

/// Run indices grouped by block, blocks in document order
fn blocks(runs: &[Run]) -> BTreeMap<usize, Vec<usize>> {
    let mut grouped: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, run) in runs.iter().enumerate() {
        grouped.entry(run.block).or_default().push(i);
    }
    grouped
}

/// Replace the byte range `span` of the concatenated runs with `value`.
///
/// The value lands in the run where the span starts; the rest of the span is
/// cut from the following runs, which keep their own formatting.
fn splice(runs: &mut [String], span: Range<usize>, value: &str) {
    let mut offset = 0;
    let mut placed = false;

    for run in runs.iter_mut() {
        let start = offset;
        let end = offset + run.len();
        offset = end;

        if end <= span.start || start >= span.end {
            continue;
        }

        let from = span.start.saturating_sub(start);
        let to = span.end.min(end) - start;

        if !placed {
            run.replace_range(from..to, value);
            placed = true;
        } else {
            run.replace_range(from..to, "");
        }
    }
}
