use crate::error::CompileError;
use crate::html::{is_non_phrasing_element, is_raw_text_element, is_whitespace_sensitive_element};
use crate::options::Merged;
use serde::Serialize;

/// How an attribute value was written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Double,
    Single,
    Unquoted,
    /// Attribute without a value, e.g. `disabled`.
    None,
}

/// Attribute as scanned off a start tag, before any directive processing.
///
/// `value` has the fixed set of named character references decoded;
/// `start`/`end` are byte offsets of the attribute in the template, with
/// leading whitespace excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawAttr {
    pub name: String,
    pub value: String,
    pub quote: QuoteStyle,
    pub start: usize,
    pub end: usize,
}

/// Receiver for the structural events of one tokenizer pass.
///
/// `start_tag`, `end_tag` and `text` drive tree construction; `comment` and
/// `doctype` default to no-ops for sinks that do not care. Warnings flow
/// through the sink as well so they interleave correctly with tree-builder
/// diagnostics. A returned error aborts the pass.
pub trait TokenSink {
    fn start_tag(
        &mut self,
        tag: &str,
        attrs: Vec<RawAttr>,
        unary: bool,
        start: usize,
        end: usize,
    ) -> Result<(), CompileError>;

    fn end_tag(&mut self, tag: &str, start: usize, end: usize) -> Result<(), CompileError>;

    fn text(&mut self, text: &str, start: usize, end: usize) -> Result<(), CompileError>;

    fn comment(&mut self, _text: &str, _start: usize, _end: usize) -> Result<(), CompileError> {
        Ok(())
    }

    fn doctype(&mut self, _text: &str, _start: usize, _end: usize) -> Result<(), CompileError> {
        Ok(())
    }

    fn warn(&mut self, _msg: String, _start: Option<usize>, _end: Option<usize>) {}
}

/// Entry on the open-element stack.
struct OpenTag {
    tag: String,
    lower: String,
    start: usize,
    end: usize,
}

/// Scanned start tag, before implicit closes and entity decoding.
struct StartTagMatch<'a> {
    tag_name: &'a str,
    attrs: Vec<PendingAttr<'a>>,
    unary_slash: bool,
    start: usize,
    end: usize,
}

struct PendingAttr<'a> {
    name: &'a str,
    value: &'a str,
    quote: QuoteStyle,
    start: usize,
    end: usize,
}

/// Streaming template lexer.
///
/// Walks the source byte cursor forward, matching one structural construct
/// per step in priority order (comment, conditional comment, doctype, end
/// tag, start tag) and handing each to the sink. A `<` that begins none of
/// these is treated as literal text. Inside `script`/`style`/`textarea`
/// everything up to the matching case-insensitive end tag is one text run.
/// Tag balance is repaired on the fly: end tags close every element opened
/// above their match, and unclosed elements are force-closed at end of
/// input, each with a warning.
pub struct Tokenizer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    opts: &'a Merged,
    stack: Vec<OpenTag>,
}

/// Drive `sink` over every token in `source`.
pub fn tokenize(source: &str, opts: &Merged, sink: &mut dyn TokenSink) -> Result<(), CompileError> {
    Tokenizer::new(source, opts).run(sink)
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str, opts: &'a Merged) -> Self {
        Self { source, bytes: source.as_bytes(), pos: 0, opts, stack: Vec::new() }
    }

    pub fn run(&mut self, sink: &mut dyn TokenSink) -> Result<(), CompileError> {
        while self.pos < self.bytes.len() {
            let last_pos = self.pos;
            let in_raw_text = self
                .stack
                .last()
                .map(|top| is_raw_text_element(&top.lower))
                .unwrap_or(false);
            if in_raw_text {
                self.step_raw_text(sink)?;
            } else {
                self.step(sink)?;
            }
            if self.pos == last_pos {
                // No progress: flush whatever is left as text and stop.
                let rest = &self.source[self.pos..];
                sink.text(rest, self.pos, self.source.len())?;
                if self.stack.is_empty() {
                    sink.warn(
                        format!("Mal-formatted tag at end of template: \"{}\"", rest),
                        Some(self.source.len()),
                        None,
                    );
                }
                break;
            }
        }
        // Force-close anything still open.
        self.parse_end_tag(None, self.pos, self.pos, sink)
    }

    // === Step functions ===

    fn step(&mut self, sink: &mut dyn TokenSink) -> Result<(), CompileError> {
        let src = self.source;
        let rest = &src[self.pos..];
        if rest.starts_with('<') {
            if rest.starts_with("<!--") {
                // Unterminated comments fall through and stall the cursor.
                if let Some(end) = rest.find("-->") {
                    if self.opts.comments {
                        sink.comment(&rest[4..end], self.pos, self.pos + end + 3)?;
                    }
                    self.pos += end + 3;
                    return Ok(());
                }
            } else if rest.starts_with("<![") {
                // Downlevel-revealed conditional comment, dropped wholesale.
                if let Some(end) = rest.find("]>") {
                    self.pos += end + 2;
                    return Ok(());
                }
            } else if let Some(len) = match_doctype(rest) {
                sink.doctype(&rest[..len], self.pos, self.pos + len)?;
                self.pos += len;
                return Ok(());
            } else if let Some((name, len)) = self.match_end_tag() {
                let tag_start = self.pos;
                self.pos += len;
                return self.parse_end_tag(Some(name), tag_start, self.pos, sink);
            } else if let Some(m) = self.parse_start_tag() {
                let tag_name = m.tag_name;
                self.handle_start_tag(m, sink)?;
                // <pre>/<textarea> swallow a newline right after the tag.
                if is_whitespace_sensitive_element(tag_name) && self.peek_byte() == Some(b'\n') {
                    self.pos += 1;
                }
                return Ok(());
            }
        }

        // Text run up to the next construct that could really be a tag; a
        // lone < is forgiven and scanned past. parse_start_tag may have
        // consumed a half-formed tag above, so re-slice from the cursor.
        let rest = &src[self.pos..];
        let text = match rest.find('<') {
            Some(mut text_end) => {
                loop {
                    if self.is_plausible_construct(self.pos + text_end) {
                        break;
                    }
                    match rest[text_end + 1..].find('<') {
                        Some(next) => text_end += 1 + next,
                        None => break,
                    }
                }
                &rest[..text_end]
            }
            None => rest,
        };
        if !text.is_empty() {
            let start = self.pos;
            self.pos += text.len();
            sink.text(text, start, self.pos)?;
        }
        Ok(())
    }

    /// Inside script/style/textarea: one verbatim text run up to the
    /// matching end tag. Comment and CDATA wrappers are peeled off, general
    /// entities are left alone.
    fn step_raw_text(&mut self, sink: &mut dyn TokenSink) -> Result<(), CompileError> {
        let stacked = match self.stack.last() {
            Some(top) => top.lower.clone(),
            None => return Ok(()),
        };
        let rest = &self.source[self.pos..];
        match find_raw_end_tag(rest, &stacked) {
            Some((tag_start, tag_end)) => {
                let mut text = replace_wrapped(&rest[..tag_start], "<!--", "-->");
                text = replace_wrapped(&text, "<![CDATA[", "]]>");
                if is_whitespace_sensitive_element(&stacked) && text.starts_with('\n') {
                    text.remove(0);
                }
                if !text.is_empty() {
                    sink.text(&text, self.pos, self.pos + tag_start)?;
                }
                let abs_tag_start = self.pos + tag_start;
                self.pos += tag_end;
                self.parse_end_tag(Some(&stacked), abs_tag_start, self.pos, sink)
            }
            // No end tag: pop the element here, the main loop flushes the
            // rest as text.
            None => self.parse_end_tag(Some(&stacked), self.pos, self.pos, sink),
        }
    }

    // === Start tags ===

    /// Scan `<name attr1 attr2 ...>`. Returns `None` when the tag never
    /// closes with `>` or `/>`; whatever prefix was consumed stays consumed
    /// and the remainder becomes text.
    fn parse_start_tag(&mut self) -> Option<StartTagMatch<'a>> {
        let src = self.source;
        if self.peek_byte() != Some(b'<') {
            return None;
        }
        let name_end = self.scan_qname(self.pos + 1)?;
        let tag_name = &src[self.pos + 1..name_end];
        let start = self.pos;
        self.pos = name_end;

        let mut attrs = Vec::new();
        loop {
            let save = self.pos;
            self.skip_whitespace();
            let (unary_slash, close_len) = match (self.peek_byte(), self.peek_byte_at(1)) {
                (Some(b'>'), _) => (false, 1),
                (Some(b'/'), Some(b'>')) => (true, 2),
                _ => (false, 0),
            };
            if close_len > 0 {
                self.pos += close_len;
                return Some(StartTagMatch { tag_name, attrs, unary_slash, start, end: self.pos });
            }
            match self.try_parse_attr() {
                Some(attr) => attrs.push(attr),
                None => {
                    self.pos = save;
                    return None;
                }
            }
        }
    }

    fn handle_start_tag(
        &mut self,
        m: StartTagMatch<'a>,
        sink: &mut dyn TokenSink,
    ) -> Result<(), CompileError> {
        let StartTagMatch { tag_name, attrs: pending, unary_slash, start, end } = m;

        if self.opts.expect_html {
            if self.last_tag() == Some("p") && is_non_phrasing_element(tag_name) {
                self.parse_end_tag(Some("p"), self.pos, self.pos, sink)?;
            }
            if (self.opts.can_be_left_open_tag)(tag_name) && self.last_tag() == Some(tag_name) {
                self.parse_end_tag(Some(tag_name), self.pos, self.pos, sink)?;
            }
        }

        let unary = (self.opts.is_unary_tag)(tag_name) || unary_slash;

        let mut attrs = Vec::with_capacity(pending.len());
        for attr in pending {
            let decode_newlines = if tag_name == "a" && attr.name == "href" {
                self.opts.should_decode_newlines_for_href
            } else {
                self.opts.should_decode_newlines
            };
            attrs.push(RawAttr {
                name: attr.name.to_string(),
                value: decode_attr(attr.value, decode_newlines),
                quote: attr.quote,
                start: attr.start,
                end: attr.end,
            });
        }

        if !unary {
            self.stack.push(OpenTag {
                tag: tag_name.to_string(),
                lower: tag_name.to_ascii_lowercase(),
                start,
                end,
            });
        }
        sink.start_tag(tag_name, attrs, unary, start, end)
    }

    /// One attribute, dynamic-argument form first: `v-dir:[arg]`, `:[arg]`,
    /// `@[arg]`, `#[arg]` keep the brackets inside the name. A dangling `=`
    /// leaves the attribute valueless and the `=` unconsumed.
    fn try_parse_attr(&mut self) -> Option<PendingAttr<'a>> {
        let src = self.source;
        let start = self.pos;
        let name_end = self
            .scan_dynamic_attr_name(start)
            .or_else(|| self.scan_attr_name(start))?;
        self.pos = name_end;
        let name = &src[start..name_end];

        let save = self.pos;
        self.skip_whitespace();
        if self.peek_byte() == Some(b'=') {
            self.pos += 1;
            self.skip_whitespace();
            if let Some((value, quote)) = self.scan_attr_value() {
                return Some(PendingAttr { name, value, quote, start, end: self.pos });
            }
        }
        self.pos = save;
        Some(PendingAttr { name, value: "", quote: QuoteStyle::None, start, end: self.pos })
    }

    fn scan_attr_value(&mut self) -> Option<(&'a str, QuoteStyle)> {
        let src = self.source;
        match self.peek_byte() {
            Some(q @ (b'"' | b'\'')) => {
                let value_start = self.pos + 1;
                let close = self.bytes[value_start..].iter().position(|&b| b == q)?;
                self.pos = value_start + close + 1;
                // Repeated closing quotes collapse into the delimiter.
                while self.peek_byte() == Some(q) {
                    self.pos += 1;
                }
                let quote = if q == b'"' { QuoteStyle::Double } else { QuoteStyle::Single };
                Some((&src[value_start..value_start + close], quote))
            }
            _ => {
                let value_start = self.pos;
                let mut end = value_start;
                while let Some(&b) = self.bytes.get(end) {
                    match b {
                        b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'"' | b'\'' | b'=' | b'<'
                        | b'>' | b'`' => break,
                        _ => end += 1,
                    }
                }
                if end == value_start {
                    return None;
                }
                self.pos = end;
                Some((&src[value_start..end], QuoteStyle::Unquoted))
            }
        }
    }

    // === End tags ===

    /// Close the nearest open element matching `tag_name`, warning about and
    /// force-closing everything opened above it. Without a name, closes the
    /// whole stack. Unmatched `</br>` and `</p>` get the historical browser
    /// treatment; other unmatched end tags are dropped.
    fn parse_end_tag(
        &mut self,
        tag_name: Option<&str>,
        start: usize,
        end: usize,
        sink: &mut dyn TokenSink,
    ) -> Result<(), CompileError> {
        let (lower, found) = match tag_name {
            Some(name) => {
                let lower = name.to_ascii_lowercase();
                let found = self.stack.iter().rposition(|entry| entry.lower == lower);
                (Some(lower), found)
            }
            None => (None, Some(0)),
        };

        match found {
            Some(pos) => {
                for i in (pos..self.stack.len()).rev() {
                    let (tag, tag_start, tag_end) = {
                        let entry = &self.stack[i];
                        (entry.tag.clone(), entry.start, entry.end)
                    };
                    if i > pos || tag_name.is_none() {
                        sink.warn(
                            format!("tag <{}> has no matching end tag.", tag),
                            Some(tag_start),
                            Some(tag_end),
                        );
                    }
                    sink.end_tag(&tag, start, end)?;
                }
                self.stack.truncate(pos);
                Ok(())
            }
            None => match (tag_name, lower.as_deref()) {
                (Some(name), Some("br")) => sink.start_tag(name, Vec::new(), true, start, end),
                (Some(name), Some("p")) => {
                    sink.start_tag(name, Vec::new(), false, start, end)?;
                    sink.end_tag(name, start, end)
                }
                _ => Ok(()),
            },
        }
    }

    /// `</name ...junk... >` at the cursor. Returns the tag name and the
    /// matched length.
    fn match_end_tag(&self) -> Option<(&'a str, usize)> {
        if self.peek_byte() != Some(b'<') || self.peek_byte_at(1) != Some(b'/') {
            return None;
        }
        let name_end = self.scan_qname(self.pos + 2)?;
        let name = &self.source[self.pos + 2..name_end];
        let close = self.bytes[name_end..].iter().position(|&b| b == b'>')?;
        Some((name, name_end + close + 1 - self.pos))
    }

    // === Scanning helpers ===

    /// Could the text at `at` open a real construct? Used to decide where a
    /// text run ends. An end tag only counts when its `>` is present; a
    /// doctype never counts and is taken as text.
    fn is_plausible_construct(&self, at: usize) -> bool {
        let rest = &self.source[at..];
        if rest.starts_with("<!--") || rest.starts_with("<![") {
            return true;
        }
        if rest.starts_with("</") {
            if let Some(name_end) = self.scan_qname(at + 2) {
                return self.bytes[name_end..].contains(&b'>');
            }
            return false;
        }
        rest.starts_with('<') && self.scan_qname(at + 1).is_some()
    }

    /// `name` or `prefix:name`.
    fn scan_qname(&self, from: usize) -> Option<usize> {
        let end = self.scan_ncname(from)?;
        if self.bytes.get(end) == Some(&b':') {
            if let Some(end2) = self.scan_ncname(end + 1) {
                return Some(end2);
            }
        }
        Some(end)
    }

    /// ASCII letter or underscore, then letters, digits, `_`, `-`, `.` or
    /// any non-ASCII character.
    fn scan_ncname(&self, from: usize) -> Option<usize> {
        let mut chars = self.source.get(from..)?.char_indices();
        match chars.next() {
            Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return None,
        }
        let mut end = from + 1;
        for (i, c) in chars {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' || !c.is_ascii() {
                end = from + i + c.len_utf8();
            } else {
                break;
            }
        }
        Some(end)
    }

    /// Plain attribute name: anything but whitespace, quotes, `<>/=`.
    fn scan_attr_name(&self, from: usize) -> Option<usize> {
        let mut end = from;
        while let Some(&b) = self.bytes.get(end) {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'"' | b'\'' | b'<' | b'>' | b'/'
                | b'=' => break,
                _ => end += 1,
            }
        }
        (end > from).then_some(end)
    }

    /// Dynamic-argument attribute name: a directive prefix, a bracketed
    /// argument without `=`, and an optional modifier suffix.
    fn scan_dynamic_attr_name(&self, from: usize) -> Option<usize> {
        let bytes = self.bytes;
        let mut i = from;
        if self.source[from..].starts_with("v-") {
            i += 2;
            let word_start = i;
            while let Some(&b) = bytes.get(i) {
                if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
                    i += 1;
                } else {
                    break;
                }
            }
            if i == word_start || bytes.get(i) != Some(&b':') {
                return None;
            }
            i += 1;
        } else {
            match bytes.get(from) {
                Some(b'@' | b':' | b'#') => i += 1,
                _ => return None,
            }
        }
        if bytes.get(i) != Some(&b'[') {
            return None;
        }
        i += 1;
        let arg_start = i;
        while let Some(&b) = bytes.get(i) {
            match b {
                b']' => break,
                b'=' => return None,
                _ => i += 1,
            }
        }
        if bytes.get(i) != Some(&b']') || i == arg_start {
            return None;
        }
        i += 1;
        while let Some(&b) = bytes.get(i) {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'"' | b'\'' | b'<' | b'>' | b'/'
                | b'=' => break,
                _ => i += 1,
            }
        }
        Some(i)
    }

    // === Low-level helpers ===

    fn last_tag(&self) -> Option<&str> {
        self.stack.last().map(|entry| entry.tag.as_str())
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_byte_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }
}

/// `<!DOCTYPE ...>`, case-insensitive. Returns the matched length.
fn match_doctype(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    if bytes.len() < 11 || !bytes[..10].eq_ignore_ascii_case(b"<!doctype ") {
        return None;
    }
    let mut i = 10;
    while i < bytes.len() && bytes[i] != b'>' {
        i += 1;
    }
    (i < bytes.len() && i > 10).then_some(i + 1)
}

/// First case-insensitive `</tag ...>` in `rest`, junk between the name and
/// the closing angle allowed. Returns (tag start, end past `>`).
fn find_raw_end_tag(rest: &str, tag: &str) -> Option<(usize, usize)> {
    let bytes = rest.as_bytes();
    let tag_bytes = tag.as_bytes();
    let needle_len = tag_bytes.len() + 2;
    let mut i = 0;
    while i + needle_len <= bytes.len() {
        if bytes[i] == b'<'
            && bytes[i + 1] == b'/'
            && bytes[i + 2..i + needle_len].eq_ignore_ascii_case(tag_bytes)
        {
            return bytes[i + needle_len..]
                .iter()
                .position(|&b| b == b'>')
                .map(|close| (i, i + needle_len + close + 1));
        }
        i += 1;
    }
    None
}

/// Strip `open`..`close` wrappers, keeping the wrapped content. An open
/// marker with no closing counterpart is left as-is.
fn replace_wrapped(text: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open_at) = rest.find(open) {
        out.push_str(&rest[..open_at]);
        let after_open = &rest[open_at + open.len()..];
        match after_open.find(close) {
            Some(close_at) => {
                out.push_str(&after_open[..close_at]);
                rest = &after_open[close_at + close.len()..];
            }
            None => {
                out.push_str(&rest[open_at..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode the fixed set of named character references in attribute values.
/// `&#10;`/`&#9;` only decode when the surrounding context asks for it.
fn decode_attr(value: &str, should_decode_newlines: bool) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let mut matched = None;
        for (entity, decoded) in
            [("&lt;", "<"), ("&gt;", ">"), ("&quot;", "\""), ("&amp;", "&"), ("&#39;", "'")]
        {
            if tail.starts_with(entity) {
                matched = Some((entity.len(), decoded));
                break;
            }
        }
        if matched.is_none() && should_decode_newlines {
            for (entity, decoded) in [("&#10;", "\n"), ("&#9;", "\t")] {
                if tail.starts_with(entity) {
                    matched = Some((entity.len(), decoded));
                    break;
                }
            }
        }
        match matched {
            Some((len, decoded)) => {
                out.push_str(decoded);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CompileOptions, CompilerConfig};

    #[derive(Debug)]
    enum Event {
        Start { tag: String, attrs: Vec<RawAttr>, unary: bool },
        End { tag: String },
        Text { text: String, start: usize, end: usize },
        Comment { text: String },
        Warn { msg: String },
    }

    #[derive(Default)]
    struct Collector {
        events: Vec<Event>,
    }

    impl TokenSink for Collector {
        fn start_tag(
            &mut self,
            tag: &str,
            attrs: Vec<RawAttr>,
            unary: bool,
            _start: usize,
            _end: usize,
        ) -> Result<(), CompileError> {
            self.events.push(Event::Start { tag: tag.to_string(), attrs, unary });
            Ok(())
        }

        fn end_tag(&mut self, tag: &str, _start: usize, _end: usize) -> Result<(), CompileError> {
            self.events.push(Event::End { tag: tag.to_string() });
            Ok(())
        }

        fn text(&mut self, text: &str, start: usize, end: usize) -> Result<(), CompileError> {
            self.events.push(Event::Text { text: text.to_string(), start, end });
            Ok(())
        }

        fn comment(&mut self, text: &str, _start: usize, _end: usize) -> Result<(), CompileError> {
            self.events.push(Event::Comment { text: text.to_string() });
            Ok(())
        }

        fn warn(&mut self, msg: String, _start: Option<usize>, _end: Option<usize>) {
            self.events.push(Event::Warn { msg });
        }
    }

    fn collect_with(template: &str, options: &CompileOptions) -> Vec<Event> {
        let opts = CompilerConfig::default().merge(options);
        let mut sink = Collector::default();
        tokenize(template, &opts, &mut sink).unwrap();
        sink.events
    }

    fn collect(template: &str) -> Vec<Event> {
        collect_with(template, &CompileOptions::default())
    }

    #[test]
    fn test_plain_element() {
        let events = collect("<div>hello</div>");
        assert!(matches!(&events[0], Event::Start { tag, unary: false, .. } if tag == "div"));
        assert!(matches!(&events[1], Event::Text { text, start: 5, end: 10 } if text == "hello"));
        assert!(matches!(&events[2], Event::End { tag } if tag == "div"));
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_attributes() {
        let events = collect("<div id=\"app\" :class='cls' data-x=1 disabled></div>");
        let Event::Start { attrs, .. } = &events[0] else { panic!("expected start tag") };
        assert_eq!(attrs.len(), 4);
        assert_eq!(attrs[0].name, "id");
        assert_eq!(attrs[0].value, "app");
        assert_eq!(attrs[0].quote, QuoteStyle::Double);
        assert_eq!(attrs[0].start, 5);
        assert_eq!(attrs[0].end, 13);
        assert_eq!(attrs[1].name, ":class");
        assert_eq!(attrs[1].quote, QuoteStyle::Single);
        assert_eq!(attrs[2].value, "1");
        assert_eq!(attrs[2].quote, QuoteStyle::Unquoted);
        assert_eq!(attrs[3].name, "disabled");
        assert_eq!(attrs[3].value, "");
        assert_eq!(attrs[3].quote, QuoteStyle::None);
    }

    #[test]
    fn test_dynamic_argument_attr() {
        let events = collect("<div v-bind:[key]=\"v\" @[ev].stop=\"h\"></div>");
        let Event::Start { attrs, .. } = &events[0] else { panic!("expected start tag") };
        assert_eq!(attrs[0].name, "v-bind:[key]");
        assert_eq!(attrs[1].name, "@[ev].stop");
    }

    #[test]
    fn test_void_element_is_unary() {
        let events = collect("<img src=\"a.png\">");
        assert!(matches!(&events[0], Event::Start { tag, unary: true, .. } if tag == "img"));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_self_closing_component() {
        let events = collect("<my-widget/>");
        assert!(matches!(&events[0], Event::Start { tag, unary: true, .. } if tag == "my-widget"));
    }

    #[test]
    fn test_paragraph_left_open() {
        let events = collect("<p>one<p>two");
        assert!(matches!(&events[0], Event::Start { tag, .. } if tag == "p"));
        assert!(matches!(&events[1], Event::Text { text, .. } if text == "one"));
        assert!(matches!(&events[2], Event::End { tag } if tag == "p"));
        assert!(matches!(&events[3], Event::Start { tag, .. } if tag == "p"));
        assert!(matches!(&events[4], Event::Text { text, .. } if text == "two"));
        // The second <p> never closes; cleanup warns and force-closes it.
        assert!(matches!(&events[5], Event::Warn { msg } if msg.contains("no matching end tag")));
        assert!(matches!(&events[6], Event::End { tag } if tag == "p"));
    }

    #[test]
    fn test_paragraph_closed_by_block_element() {
        let events = collect("<p>a<div>b</div></p>");
        assert!(matches!(&events[2], Event::End { tag } if tag == "p"));
        assert!(matches!(&events[3], Event::Start { tag, .. } if tag == "div"));
        // The trailing </p> has no open <p> left: it resurrects an empty pair.
        assert!(matches!(&events[6], Event::Start { tag, unary: false, .. } if tag == "p"));
        assert!(matches!(&events[7], Event::End { tag } if tag == "p"));
    }

    #[test]
    fn test_stray_br_end_tag() {
        let events = collect("<div>a</br>b</div>");
        assert!(matches!(&events[2], Event::Start { tag, unary: true, .. } if tag == "br"));
        assert!(matches!(&events[3], Event::Text { text, .. } if text == "b"));
    }

    #[test]
    fn test_unknown_stray_end_tag_dropped() {
        let events = collect("<div>a</span>b</div>");
        assert!(matches!(&events[1], Event::Text { text, .. } if text == "a"));
        assert!(matches!(&events[2], Event::Text { text, .. } if text == "b"));
        assert!(matches!(&events[3], Event::End { tag } if tag == "div"));
    }

    #[test]
    fn test_raw_text_keeps_angle_brackets() {
        let events = collect("<script>if (a < b) { x() }</script>");
        assert!(matches!(&events[0], Event::Start { tag, .. } if tag == "script"));
        assert!(
            matches!(&events[1], Event::Text { text, .. } if text == "if (a < b) { x() }")
        );
        assert!(matches!(&events[2], Event::End { tag } if tag == "script"));
    }

    #[test]
    fn test_raw_text_end_tag_case_insensitive() {
        let events = collect("<textarea>x</TEXTAREA>");
        assert!(matches!(&events[1], Event::Text { text, .. } if text == "x"));
        assert!(matches!(&events[2], Event::End { tag } if tag == "textarea"));
    }

    #[test]
    fn test_raw_text_unwraps_cdata() {
        let events = collect("<script><![CDATA[a && b]]></script>");
        assert!(matches!(&events[1], Event::Text { text, .. } if text == "a && b"));
    }

    #[test]
    fn test_unterminated_raw_text() {
        let events = collect("<script>var a = 1;");
        assert!(matches!(&events[0], Event::Start { tag, .. } if tag == "script"));
        assert!(matches!(&events[1], Event::End { tag } if tag == "script"));
        assert!(matches!(&events[2], Event::Text { text, .. } if text == "var a = 1;"));
        assert!(matches!(&events[3], Event::Warn { msg } if msg.contains("Mal-formatted")));
    }

    #[test]
    fn test_comments_dropped_by_default() {
        let events = collect("<div><!-- note --></div>");
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_comments_kept_when_asked() {
        let options = CompileOptions { comments: Some(true), ..CompileOptions::default() };
        let events = collect_with("<div><!-- note --></div>", &options);
        assert!(matches!(&events[1], Event::Comment { text } if text == " note "));
    }

    #[test]
    fn test_conditional_comment_skipped() {
        let events = collect("<div><![if IE]>x<![endif]></div>");
        assert!(matches!(&events[1], Event::Text { text, .. } if text == "x"));
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        let events = collect("<div>a < b</div>");
        assert!(matches!(&events[1], Event::Text { text, .. } if text == "a < b"));
        assert!(matches!(&events[2], Event::End { tag } if tag == "div"));
    }

    #[test]
    fn test_trailing_garbage_flushed_with_warning() {
        let events = collect("<div></div><");
        assert!(matches!(&events[2], Event::Text { text, .. } if text == "<"));
        assert!(matches!(&events[3], Event::Warn { msg } if msg.contains("Mal-formatted")));
    }

    #[test]
    fn test_unclosed_element_warns() {
        let events = collect("<div><span>a");
        let warns: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Event::Warn { msg } => Some(msg.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(warns.len(), 2);
        assert!(warns[0].contains("<span>"));
        assert!(warns[1].contains("<div>"));
    }

    #[test]
    fn test_end_tag_closes_everything_above() {
        let events = collect("<div><span>a</div>");
        assert!(matches!(&events[2], Event::Text { text, .. } if text == "a"));
        assert!(matches!(&events[3], Event::Warn { msg } if msg.contains("<span>")));
        assert!(matches!(&events[4], Event::End { tag } if tag == "span"));
        assert!(matches!(&events[5], Event::End { tag } if tag == "div"));
    }

    #[test]
    fn test_attr_entities_decoded() {
        let events = collect("<div title=\"a&lt;b&amp;c&#10;d\"></div>");
        let Event::Start { attrs, .. } = &events[0] else { panic!("expected start tag") };
        // Newline references stay encoded unless the option asks otherwise.
        assert_eq!(attrs[0].value, "a<b&c&#10;d");
    }

    #[test]
    fn test_href_newline_decoding_flag() {
        let options = CompileOptions {
            should_decode_newlines_for_href: Some(true),
            ..CompileOptions::default()
        };
        let events = collect_with("<a href=\"x&#10;y\"></a>", &options);
        let Event::Start { attrs, .. } = &events[0] else { panic!("expected start tag") };
        assert_eq!(attrs[0].value, "x\ny");
    }

    #[test]
    fn test_pre_swallows_first_newline() {
        let events = collect("<pre>\nkeep\n  this</pre>");
        assert!(matches!(&events[1], Event::Text { text, .. } if text == "keep\n  this"));
    }

    #[test]
    fn test_end_tag_keeps_open_casing() {
        let events = collect("<DIV>x</div>");
        assert!(matches!(&events[0], Event::Start { tag, .. } if tag == "DIV"));
        assert!(matches!(&events[2], Event::End { tag } if tag == "DIV"));
    }

    #[test]
    fn test_doctype_skipped() {
        let events = collect("<!DOCTYPE html><div></div>");
        assert!(matches!(&events[0], Event::Start { tag, .. } if tag == "div"));
    }

    #[test]
    fn test_multiline_attributes() {
        let events = collect("<div id=\"a\"\n     class=\"b\"></div>");
        let Event::Start { attrs, .. } = &events[0] else { panic!("expected start tag") };
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[1].name, "class");
    }
}
