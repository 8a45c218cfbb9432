use std::borrow::Cow;

use pulldown_cmark::{Parser, html};
use serde_json::{Number, Value};

use super::ConvertError;

const HR_WIDTH: usize = 40;

pub(super) fn markdown_to_html(src: &str) -> String {
    let mut out = String::with_capacity(src.len() * 3 / 2);
    html::push_html(&mut out, Parser::new(src));
    out
}

/// Largest integer an f64 represents exactly (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Parse and re-serialize, which drops all insignificant whitespace.
pub(super) fn json_to_text(data: &[u8]) -> Result<String, ConvertError> {
    let mut value: Value = serde_json::from_slice(data)
        .map_err(|e| ConvertError::Failed(format!("invalid JSON: {e}")))?;
    normalize_numbers(&mut value);
    serde_json::to_string(&value).map_err(|e| ConvertError::Failed(e.to_string()))
}

/// Write whole-valued floats as integers, so `1.0` and `1e2` become `1` and `100`.
fn normalize_numbers(value: &mut Value) {
    match value {
        Value::Number(n) if n.is_f64() => {
            let f = n.as_f64().unwrap_or(f64::NAN);
            if f.fract() == 0.0 && f.abs() <= MAX_EXACT_INTEGER {
                *n = Number::from(f as i64);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_numbers),
        Value::Object(map) => map.values_mut().for_each(normalize_numbers),
        _ => {}
    }
}

/// Render HTML as readable plain text.
///
/// Headings are upper-cased and set off by blank lines, paragraphs are
/// separated by a blank line, list items get a ` * ` or ` N. ` marker, and
/// runs of whitespace collapse to one space outside `<pre>`. Script, style
/// and head content is dropped.
pub fn html_to_text(html: &str) -> String {
    let mut writer = TextWriter::default();
    let mut rest = html;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            writer.text(&decode_entities(rest));
            break;
        };

        if lt > 0 {
            writer.text(&decode_entities(&rest[..lt]));
        }
        rest = &rest[lt..];

        if let Some(after) = rest.strip_prefix("<!--") {
            rest = after.find("-->").map_or("", |end| &after[end + 3..]);
            continue;
        }

        let Some((tag, consumed)) = parse_tag(rest) else {
            writer.text("<");
            rest = &rest[1..];
            continue;
        };
        rest = &rest[consumed..];

        if !tag.closing && !tag.self_closing && is_skipped(&tag.name) {
            rest = skip_element(rest, &tag.name);
        } else {
            writer.tag(&tag);
        }
    }

    writer.finish()
}

/// Return what follows the `</name>` closing `s`, without reading the contents
/// as markup. An unclosed element runs to the end of input.
fn skip_element<'a>(s: &'a str, name: &str) -> &'a str {
    let lower = s.to_ascii_lowercase();
    let needle = format!("</{name}");
    let mut from = 0;
    while let Some(pos) = lower[from..].find(&needle) {
        let end = from + pos + needle.len();
        if !lower.as_bytes().get(end).is_some_and(u8::is_ascii_alphanumeric) {
            return s[end..].find('>').map_or("", |gt| &s[end + gt + 1..]);
        }
        from = end;
    }
    ""
}

fn is_skipped(name: &str) -> bool {
    matches!(name, "script" | "style" | "head" | "template")
}

#[derive(Debug, PartialEq)]
struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
}

/// Parse the tag starting at `s[0] == '<'`, returning it and its byte length.
fn parse_tag(s: &str) -> Option<(Tag, usize)> {
    let bytes = s.as_bytes();
    let mut i = 1;
    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }

    let declaration = matches!(bytes.get(i), Some(b'!') | Some(b'?'));
    let name_start = i;
    if !declaration {
        if !bytes.get(i).is_some_and(u8::is_ascii_alphabetic) {
            return None;
        }
        while bytes.get(i).is_some_and(u8::is_ascii_alphanumeric) {
            i += 1;
        }
    }
    let name = s[name_start..i].to_ascii_lowercase();

    let mut quote: Option<u8> = None;
    while let Some(&b) = bytes.get(i) {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => {
                let self_closing = i > 0 && bytes[i - 1] == b'/';
                return Some((
                    Tag {
                        name: if declaration { String::new() } else { name },
                        closing,
                        self_closing,
                    },
                    i + 1,
                ));
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[derive(Default)]
struct TextWriter {
    out: String,
    pending_newlines: usize,
    pending_space: bool,
    uppercase: usize,
    preformatted: usize,
    lists: Vec<Option<usize>>,
}

impl TextWriter {
    fn tag(&mut self, tag: &Tag) {
        let name = tag.name.as_str();
        if tag.closing {
            match name {
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    self.uppercase = self.uppercase.saturating_sub(1);
                    self.block(2);
                }
                "p" => self.block(2),
                "pre" => {
                    self.preformatted = self.preformatted.saturating_sub(1);
                    self.block(2);
                }
                "ul" | "ol" => {
                    self.lists.pop();
                    self.block(2);
                }
                "li" | "div" | "section" | "article" | "header" | "footer" | "nav" | "main"
                | "aside" | "table" | "tr" | "blockquote" | "form" | "dl" | "dt" | "dd"
                | "figure" | "address" => self.block(1),
                "td" | "th" => self.pending_space = true,
                _ => {}
            }
            return;
        }

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.block(2);
                self.uppercase += 1;
            }
            "p" => self.block(2),
            "pre" => {
                self.block(2);
                self.preformatted += 1;
            }
            "ul" => {
                self.block(2);
                self.lists.push(None);
            }
            "ol" => {
                self.block(2);
                self.lists.push(Some(1));
            }
            "li" => {
                self.block(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!(" {n}.");
                        *n += 1;
                        marker
                    }
                    _ => " *".to_string(),
                };
                self.raw(&marker);
                self.pending_space = true;
            }
            "br" => {
                self.pending_space = false;
                self.pending_newlines += 1;
            }
            "hr" => {
                self.block(2);
                self.raw(&"-".repeat(HR_WIDTH));
                self.block(2);
            }
            "div" | "section" | "article" | "header" | "footer" | "nav" | "main" | "aside"
            | "table" | "tr" | "blockquote" | "form" | "dl" | "dt" | "dd" | "figure"
            | "address" => self.block(1),
            "td" | "th" => self.pending_space = true,
            _ => {}
        }
    }

    /// Require at least `lines` line breaks before the next output.
    fn block(&mut self, lines: usize) {
        self.pending_space = false;
        if !self.out.is_empty() {
            self.pending_newlines = self.pending_newlines.max(lines);
        }
    }

    fn flush_newlines(&mut self) -> bool {
        if self.pending_newlines == 0 {
            return false;
        }
        for _ in 0..self.pending_newlines {
            self.out.push('\n');
        }
        self.pending_newlines = 0;
        self.pending_space = false;
        true
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    /// Emit text verbatim after any pending separators.
    fn raw(&mut self, s: &str) {
        if !self.flush_newlines() && self.pending_space && !self.at_line_start() {
            self.out.push(' ');
        }
        self.pending_space = false;
        self.out.push_str(s);
    }

    fn text(&mut self, s: &str) {
        if self.preformatted > 0 {
            let s = if self.uppercase > 0 {
                Cow::Owned(s.to_uppercase())
            } else {
                Cow::Borrowed(s)
            };
            self.raw(&s);
            return;
        }

        for c in s.chars() {
            if c.is_whitespace() {
                self.pending_space = true;
                continue;
            }
            if !self.flush_newlines() && self.pending_space && !self.at_line_start() {
                self.out.push(' ');
            }
            self.pending_space = false;
            if self.uppercase > 0 {
                self.out.extend(c.to_uppercase());
            } else {
                self.out.push(c);
            }
        }
    }

    fn finish(self) -> String {
        self.out.trim_matches('\n').to_string()
    }
}

fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest[1..]
            .find(';')
            .filter(|&end| end > 0 && end <= 10)
            .and_then(|end| decode_entity(&rest[1..1 + end]).map(|c| (c, end + 2)));

        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
