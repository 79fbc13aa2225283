//! Text normalization for extracted document text.
//!
//! Extraction output is messy: hyphenated line wraps, running headers and
//! footers repeated on every page, stray page numbers. Normalization cleans
//! those up and segments the text into sentence-granularity units that keep
//! their offsets into the original document, so evidence stays traceable.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::MalformedInputError;

lazy_static! {
    /// Standalone page-number lines ("3", "- 3 -", "Page 3 of 12").
    static ref PAGE_NUMBER_LINE: Regex =
        Regex::new(r"(?i)^(?:page\s+)?-?\s*\d+\s*-?(?:\s+of\s+\d+)?$").unwrap();
}

/// Lines at most this long that repeat verbatim are header/footer noise.
const NOISE_LINE_MAX_LEN: usize = 80;
const NOISE_REPEAT_THRESHOLD: usize = 3;

/// A normalized span of document text.
///
/// `text` has line-wrap hyphens collapsed and whitespace squeezed;
/// `start_offset..end_offset` is the span in the original raw text that
/// produced it. Units for one document are an owned, finite, re-iterable
/// sequence and are discarded once detection completes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextUnit {
    pub index: usize,
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Split raw extracted text into ordered sentence units.
///
/// Fails only on empty or undecodable input; everything else is best-effort.
pub fn normalize(raw_text: &str) -> Result<Vec<TextUnit>, MalformedInputError> {
    if raw_text.trim().is_empty() {
        return Err(MalformedInputError::Empty);
    }
    if is_undecodable(raw_text) {
        return Err(MalformedInputError::Undecodable);
    }

    let lines = collect_lines(raw_text);
    let noise = noise_line_flags(&lines);

    let mut builder = UnitBuilder::default();
    for (i, line) in lines.iter().enumerate() {
        if noise[i] {
            continue;
        }
        if line.text.trim().is_empty() {
            // Paragraph break: close the current unit even without a terminator.
            builder.flush();
            continue;
        }
        builder.feed_line(line.start, line.text);
    }
    Ok(builder.finish())
}

struct Line<'a> {
    start: usize,
    text: &'a str,
}

fn collect_lines(raw: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, ch) in raw.char_indices() {
        if ch == '\n' {
            lines.push(Line {
                start,
                text: &raw[start..i],
            });
            start = i + 1;
        }
    }
    lines.push(Line {
        start,
        text: &raw[start..],
    });
    lines
}

/// Flag header/footer repeats and page-number lines.
///
/// Page boundaries are not reliably preserved by extractors, so verbatim
/// recurrence of a short standalone line is the observable signal for a
/// running header or footer.
fn noise_line_flags(lines: &[Line]) -> Vec<bool> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for line in lines {
        let trimmed = line.text.trim();
        if !trimmed.is_empty() && trimmed.len() <= NOISE_LINE_MAX_LEN {
            *counts.entry(trimmed).or_insert(0) += 1;
        }
    }

    lines
        .iter()
        .map(|line| {
            let trimmed = line.text.trim();
            if trimmed.is_empty() {
                return false;
            }
            if PAGE_NUMBER_LINE.is_match(trimmed) {
                return true;
            }
            trimmed.len() <= NOISE_LINE_MAX_LEN
                && counts.get(trimmed).copied().unwrap_or(0) >= NOISE_REPEAT_THRESHOLD
        })
        .collect()
}

fn is_undecodable(raw: &str) -> bool {
    let mut visible = 0usize;
    let mut garbage = 0usize;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            continue;
        }
        visible += 1;
        if ch == '\u{FFFD}' || ch.is_control() {
            garbage += 1;
        }
    }
    visible > 0 && garbage * 2 > visible
}

#[derive(Default)]
struct UnitBuilder {
    units: Vec<TextUnit>,
    buf: String,
    start: Option<usize>,
    end: usize,
}

impl UnitBuilder {
    fn feed_line(&mut self, line_start: usize, line: &str) {
        let trimmed = line.trim_start();
        if let Some(first) = trimmed.chars().next() {
            let wrap_len = {
                let settled = self.buf.trim_end();
                (ends_with_wrap_hyphen(settled) && first.is_lowercase()).then(|| settled.len())
            };
            if let Some(len) = wrap_len {
                // "cancel-\nlation" is one wrapped word, not two.
                self.buf.truncate(len - 1);
            } else if !self.buf.is_empty() && !self.buf.ends_with(' ') {
                self.buf.push(' ');
            }
        }

        let mut chars = line.char_indices().peekable();
        while let Some((i, ch)) = chars.next() {
            if ch.is_whitespace() {
                if !self.buf.is_empty() && !self.buf.ends_with(' ') {
                    self.buf.push(' ');
                }
                continue;
            }
            if self.start.is_none() {
                self.start = Some(line_start + i);
            }
            self.buf.push(ch);
            self.end = line_start + i + ch.len_utf8();

            if matches!(ch, '.' | '!' | '?') {
                let at_boundary = match chars.peek() {
                    None => true,
                    Some((_, next)) => next.is_whitespace(),
                };
                if at_boundary {
                    self.flush();
                }
            }
        }
    }

    fn flush(&mut self) {
        let text = self.buf.trim();
        if !text.is_empty() {
            if let Some(start) = self.start {
                self.units.push(TextUnit {
                    index: self.units.len(),
                    text: text.to_string(),
                    start_offset: start,
                    end_offset: self.end,
                });
            }
        }
        self.buf.clear();
        self.start = None;
    }

    fn finish(mut self) -> Vec<TextUnit> {
        self.flush();
        self.units
    }
}

fn ends_with_wrap_hyphen(buf: &str) -> bool {
    let mut rev = buf.chars().rev();
    matches!(rev.next(), Some('-')) && matches!(rev.next(), Some(c) if c.is_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_input() {
        assert_eq!(normalize(""), Err(MalformedInputError::Empty));
        assert_eq!(normalize("   \n\t  "), Err(MalformedInputError::Empty));
    }

    #[test]
    fn rejects_undecodable_garbage() {
        let garbage = "\u{FFFD}\u{FFFD}\u{FFFD}\u{FFFD}ok";
        assert_eq!(normalize(garbage), Err(MalformedInputError::Undecodable));
    }

    #[test]
    fn splits_sentences_with_offsets() {
        let raw = "First sentence. Second one!";
        let units = normalize(raw).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].text, "First sentence.");
        assert_eq!(units[1].text, "Second one!");
        assert_eq!(&raw[units[0].start_offset..units[0].end_offset], "First sentence.");
        assert_eq!(&raw[units[1].start_offset..units[1].end_offset], "Second one!");
        assert_eq!(units[0].index, 0);
        assert_eq!(units[1].index, 1);
    }

    #[test]
    fn collapses_hyphenated_line_wraps() {
        let raw = "The subscriber shall pay a cancel-\nlation fee of ten percent.";
        let units = normalize(raw).unwrap();
        assert_eq!(units.len(), 1);
        assert!(units[0].text.contains("cancellation fee"));
    }

    #[test]
    fn keeps_genuine_hyphens_across_lines() {
        let raw = "Terms apply to third-\nParty vendors.";
        let units = normalize(raw).unwrap();
        // Capitalized continuation is not treated as a wrapped word.
        assert!(units[0].text.contains("third- Party"));
    }

    #[test]
    fn strips_repeated_headers() {
        let raw = "ACME CORP - CONFIDENTIAL\nThe first paragraph of terms.\n\
                   ACME CORP - CONFIDENTIAL\nThe second paragraph of terms.\n\
                   ACME CORP - CONFIDENTIAL\nThe third paragraph of terms.\n";
        let units = normalize(raw).unwrap();
        assert!(units.iter().all(|u| !u.text.contains("ACME CORP")));
        assert_eq!(units.len(), 3);
    }

    #[test]
    fn keeps_lines_repeated_fewer_than_three_times() {
        let raw = "ACME CORP - CONFIDENTIAL\nSome terms.\nACME CORP - CONFIDENTIAL\nMore terms.\n";
        let units = normalize(raw).unwrap();
        assert!(units.iter().any(|u| u.text.contains("ACME CORP")));
    }

    #[test]
    fn strips_page_number_lines() {
        let raw = "Terms continue here\nPage 2 of 9\nand finish here.";
        let units = normalize(raw).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "Terms continue here and finish here.");
    }

    #[test]
    fn paragraph_break_closes_unit_without_terminator() {
        let raw = "A heading without punctuation\n\nBody sentence follows.";
        let units = normalize(raw).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].text, "A heading without punctuation");
    }

    #[test]
    fn wrapped_sentence_spans_lines() {
        let raw = "This agreement renews each\nyear unless cancelled in writing.";
        let units = normalize(raw).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(
            units[0].text,
            "This agreement renews each year unless cancelled in writing."
        );
        assert_eq!(units[0].start_offset, 0);
        assert_eq!(units[0].end_offset, raw.len());
    }

    #[test]
    fn offsets_trace_back_into_messy_input() {
        let raw = "Header\nHeader\nHeader\nThe tenant owes a late fee.\nHeader";
        let units = normalize(raw).unwrap();
        assert_eq!(units.len(), 1);
        let span = &raw[units[0].start_offset..units[0].end_offset];
        assert_eq!(span, "The tenant owes a late fee.");
    }
}
