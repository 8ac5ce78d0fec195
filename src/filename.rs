/// Date formatting and filename construction for PDF Renamer
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Buffer text is clipped to this many characters before sanitization.
pub const MAX_BUFFER_LEN: usize = 50;

/// Characters that never appear in a generated filename. Comma is included:
/// a single replace-with-underscore policy everywhere, so multi-field joins
/// stay unambiguous.
const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', ','];

/// Date prefix layout for generated filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateFormat {
    /// 2-digit year, month, day (default)
    #[default]
    #[serde(rename = "YYMMDD")]
    YyMmDd,
    /// 4-digit year, month, day
    #[serde(rename = "YYYYMMDD")]
    YyyyMmDd,
    /// month, day, 2-digit year
    #[serde(rename = "MMDDYY")]
    MmDdYy,
}

impl DateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateFormat::YyMmDd => "YYMMDD",
            DateFormat::YyyyMmDd => "YYYYMMDD",
            DateFormat::MmDdYy => "MMDDYY",
        }
    }

    /// Parse a stored/select value; anything unrecognized is None.
    pub fn parse(value: &str) -> Option<DateFormat> {
        match value {
            "YYMMDD" => Some(DateFormat::YyMmDd),
            "YYYYMMDD" => Some(DateFormat::YyyyMmDd),
            "MMDDYY" => Some(DateFormat::MmDdYy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("expected YYYY-MM-DD")]
    Malformed,
    #[error("no such calendar date")]
    Invalid,
}

/// A validated calendar date. Construction is the only way to get one, so a
/// `CivilDate` always names a real day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilDate {
    year: u16,
    month: u8,
    day: u8,
}

impl CivilDate {
    pub fn new(year: u16, month: u8, day: u8) -> Result<CivilDate, DateError> {
        if !(1000..=9999).contains(&year) || !(1..=12).contains(&month) {
            return Err(DateError::Invalid);
        }
        if day == 0 || day > days_in_month(year, month) {
            return Err(DateError::Invalid);
        }
        Ok(CivilDate { year, month, day })
    }

    /// Parse an ISO-8601 calendar date (`YYYY-MM-DD`).
    ///
    /// Shape errors and impossible dates are distinguished so the popup can
    /// show the right validation message.
    pub fn parse_iso(input: &str) -> Result<CivilDate, DateError> {
        let input = input.trim();
        if !iso_shape().is_match(input) {
            return Err(DateError::Malformed);
        }
        let year = input[0..4].parse().map_err(|_| DateError::Malformed)?;
        let month = input[5..7].parse().map_err(|_| DateError::Malformed)?;
        let day = input[8..10].parse().map_err(|_| DateError::Malformed)?;
        CivilDate::new(year, month, day)
    }

    pub fn to_iso(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }
}

fn iso_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap())
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Render the date prefix. Pure: same inputs, same output.
pub fn format_date(date: CivilDate, format: DateFormat) -> String {
    match format {
        DateFormat::YyMmDd => {
            format!("{:02}{:02}{:02}", date.year() % 100, date.month(), date.day())
        }
        DateFormat::YyyyMmDd => {
            format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
        }
        DateFormat::MmDdYy => {
            format!("{:02}{:02}{:02}", date.month(), date.day(), date.year() % 100)
        }
    }
}

/// Make a string safe as a filename component.
///
/// Policy: forbidden characters (including comma) become `_`, control
/// characters (0x00-0x1F, 0x80-0x9F) are dropped, any remaining whitespace
/// run collapses to a single `_` after edge trimming, and leading/trailing
/// dots are stripped. Idempotent.
pub fn sanitize(input: &str) -> String {
    let mut replaced = String::with_capacity(input.len());
    for c in input.chars() {
        if FORBIDDEN_CHARS.contains(&c) {
            replaced.push('_');
        } else if is_control(c) {
            // dropped
        } else {
            replaced.push(c);
        }
    }

    let mut out = String::with_capacity(replaced.len());
    let mut pending_gap = false;
    for c in replaced.trim().chars() {
        if c.is_whitespace() {
            pending_gap = true;
        } else {
            if pending_gap {
                out.push('_');
                pending_gap = false;
            }
            out.push(c);
        }
    }

    out.trim_matches('.').to_string()
}

fn is_control(c: char) -> bool {
    let code = c as u32;
    code <= 0x1f || (0x80..=0x9f).contains(&code)
}

/// Clip to at most `max` characters without splitting a code point.
pub fn truncate_chars(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}

/// Strip a trailing `.pdf` (any case) from a fallback filename.
pub fn strip_pdf_extension(filename: &str) -> &str {
    let len = filename.len();
    if len >= 4
        && filename.is_char_boundary(len - 4)
        && filename[len - 4..].eq_ignore_ascii_case(".pdf")
    {
        &filename[..len - 4]
    } else {
        filename
    }
}

/// Assemble the filename base: date prefix, buffer or fallback stem, site
/// label, joined with `_`. Empty segments are omitted along with their
/// separator; the date prefix is always present. The caller appends the
/// extension.
pub fn build_basename(
    date: CivilDate,
    format: DateFormat,
    buffer_text: Option<&str>,
    fallback_filename: &str,
    label: &str,
) -> String {
    let middle = match buffer_text.map(str::trim) {
        Some(text) if !text.is_empty() => sanitize(&truncate_chars(text, MAX_BUFFER_LEN)),
        _ => sanitize(strip_pdf_extension(fallback_filename)),
    };
    let label = sanitize(label);

    let mut joined = format_date(date, format);
    if !middle.is_empty() {
        joined.push('_');
        joined.push_str(&middle);
    }
    if !label.is_empty() {
        joined.push('_');
        joined.push_str(&label);
    }
    sanitize(&joined)
}
