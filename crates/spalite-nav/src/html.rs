//! Lightweight HTML tag scanner.
//!
//! Not a tree builder: it walks start/end tags in source order, skipping
//! comments, doctypes and the bodies of raw-text elements, which is enough
//! to pull the `<title>`, a region's inner markup by `id`, and anchor
//! `href`s out of a fetched page without allocating a DOM.

/// Kind of a scanned tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Start,
    End,
    /// `<tag ... />`
    SelfClosing,
}

/// A scanned tag with byte offsets into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// ASCII-lowercased tag name.
    pub name: String,
    pub kind: TagKind,
    /// Attributes in source order, names lowercased, values raw.
    pub attributes: Vec<(String, String)>,
    /// Offset of the `<`.
    pub start: usize,
    /// Offset just past the `>`.
    pub end: usize,
}

impl Tag {
    /// Raw attribute value, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether this tag opens an element that may have children.
    pub fn opens_element(&self) -> bool {
        match self.kind {
            TagKind::Start => !is_void(&self.name),
            // `<div/>` is not self-closing in HTML; only void and foreign
            // elements honour the slash.
            TagKind::SelfClosing => !is_void(&self.name) && !is_foreign_leaf(&self.name),
            TagKind::End => false,
        }
    }
}

/// Iterator over the tags of an HTML string.
pub struct TagScanner<'a> {
    src: &'a str,
    pos: usize,
    /// Set after a raw-text start tag: the next tag is its end tag.
    raw_text: Option<String>,
}

impl<'a> TagScanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            raw_text: None,
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    /// Skip to the end tag of the current raw-text element.
    fn close_raw_text(&mut self, name: &str) -> Option<Tag> {
        let needle = format!("</{name}");
        let start = find_ci(self.bytes(), self.pos, needle.as_bytes())?;
        let end = find_byte(self.bytes(), start, b'>').map_or(self.src.len(), |i| i + 1);
        self.pos = end;
        Some(Tag {
            name: name.to_string(),
            kind: TagKind::End,
            attributes: Vec::new(),
            start,
            end,
        })
    }

    fn scan_end_tag(&mut self, start: usize) -> Tag {
        let bytes = self.bytes();
        let name_start = start + 2;
        let mut i = name_start;
        while i < bytes.len() && !is_tag_name_terminator(bytes[i]) {
            i += 1;
        }
        let name = self.src[name_start..i].to_ascii_lowercase();
        let end = find_byte(bytes, i, b'>').map_or(bytes.len(), |j| j + 1);
        self.pos = end;
        Tag {
            name,
            kind: TagKind::End,
            attributes: Vec::new(),
            start,
            end,
        }
    }

    fn scan_start_tag(&mut self, start: usize) -> Tag {
        let bytes = self.bytes();
        let name_start = start + 1;
        let mut i = name_start;
        while i < bytes.len() && !is_tag_name_terminator(bytes[i]) {
            i += 1;
        }
        let name = self.src[name_start..i].to_ascii_lowercase();

        let mut attributes = Vec::new();
        let mut kind = TagKind::Start;
        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() {
                break;
            }
            match bytes[i] {
                b'>' => {
                    i += 1;
                    break;
                },
                b'/' => {
                    if bytes.get(i + 1) == Some(&b'>') {
                        kind = TagKind::SelfClosing;
                        i += 2;
                        break;
                    }
                    i += 1;
                    continue;
                },
                _ => {},
            }

            let attr_start = i;
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'=' | b'>' | b'/')
            {
                i += 1;
            }
            let attr_name = self.src[attr_start..i].to_ascii_lowercase();

            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let mut value = String::new();
            if bytes.get(i) == Some(&b'=') {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                match bytes.get(i) {
                    Some(&q @ (b'"' | b'\'')) => {
                        let value_start = i + 1;
                        let value_end = find_byte(bytes, value_start, q).unwrap_or(bytes.len());
                        value = self.src[value_start..value_end].to_string();
                        i = (value_end + 1).min(bytes.len());
                    },
                    Some(_) => {
                        let value_start = i;
                        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>'
                        {
                            i += 1;
                        }
                        value = self.src[value_start..i].to_string();
                    },
                    None => {},
                }
            }
            if !attr_name.is_empty() && !attributes.iter().any(|(n, _)| n == &attr_name) {
                attributes.push((attr_name, value));
            }
        }

        self.pos = i;
        if kind == TagKind::Start && is_raw_text(&name) {
            self.raw_text = Some(name.clone());
        }
        Tag {
            name,
            kind,
            attributes,
            start,
            end: i,
        }
    }
}

impl Iterator for TagScanner<'_> {
    type Item = Tag;

    fn next(&mut self) -> Option<Tag> {
        if let Some(name) = self.raw_text.take() {
            return self.close_raw_text(&name);
        }

        let bytes = self.bytes();
        loop {
            let lt = find_byte(bytes, self.pos, b'<')?;
            let rest = &bytes[lt..];

            if rest.starts_with(b"<!--") {
                self.pos = find_sub(bytes, lt + 4, b"-->").map_or(bytes.len(), |i| i + 3);
                continue;
            }
            if rest.starts_with(b"<!") || rest.starts_with(b"<?") {
                self.pos = find_byte(bytes, lt, b'>').map_or(bytes.len(), |i| i + 1);
                continue;
            }
            if rest.len() > 2 && rest[1] == b'/' && rest[2].is_ascii_alphabetic() {
                return Some(self.scan_end_tag(lt));
            }
            if rest.len() > 1 && rest[1].is_ascii_alphabetic() {
                return Some(self.scan_start_tag(lt));
            }
            self.pos = lt + 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inner markup of the first element whose `id` equals `id`.
///
/// An element left open at end of input extends to the end, as a browser
/// parser would close it there.
pub fn inner_html_by_id<'a>(src: &'a str, id: &str) -> Option<&'a str> {
    let mut scanner = TagScanner::new(src);
    let open = scanner.find(|t| t.kind != TagKind::End && t.attribute("id") == Some(id))?;
    if !open.opens_element() {
        return Some("");
    }

    let content_start = open.end;
    let mut depth = 1usize;
    for tag in scanner {
        if tag.name != open.name {
            continue;
        }
        if tag.kind == TagKind::End {
            depth -= 1;
            if depth == 0 {
                return Some(&src[content_start..tag.start]);
            }
        } else if tag.opens_element() {
            depth += 1;
        }
    }
    Some(&src[content_start..])
}

/// Text of the first `<title>`, entity-decoded with whitespace collapsed
/// the way `document.title` reports it.
pub fn title_text(src: &str) -> Option<String> {
    let mut scanner = TagScanner::new(src);
    let open = scanner.find(|t| t.name == "title" && t.kind == TagKind::Start)?;
    let raw = match scanner.next() {
        Some(close) => &src[open.end..close.start],
        None => &src[open.end..],
    };
    let decoded = decode_entities(raw);
    Some(decoded.split_ascii_whitespace().collect::<Vec<_>>().join(" "))
}

/// Decoded `href` of every `<a>` in source order.
pub fn anchor_hrefs(src: &str) -> Vec<String> {
    TagScanner::new(src)
        .filter(|t| t.name == "a" && t.kind != TagKind::End)
        .filter_map(|t| t.attribute("href").map(decode_entities))
        .collect()
}

// ---------------------------------------------------------------------------
// Character references
// ---------------------------------------------------------------------------

/// Decode named and numeric character references. Unknown references are
/// left verbatim.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let decoded = tail.find(';').filter(|&semi| semi <= 32).and_then(|semi| {
            let name = &tail[..semi];
            decode_reference(name).map(|text| (text, semi + 1))
        });
        match decoded {
            Some((text, consumed)) => {
                out.push_str(&text);
                rest = &tail[consumed..];
            },
            None => {
                out.push('&');
                rest = tail;
            },
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code)
            .filter(|c| *c != '\0')
            .map(String::from);
    }
    lookup_entity(name).map(str::to_string)
}

/// Named references common in page titles and link targets.
fn lookup_entity(name: &str) -> Option<&'static str> {
    let s = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{00A0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "hellip" => "\u{2026}",
        "bull" => "\u{2022}",
        "middot" => "\u{00B7}",
        "laquo" => "\u{00AB}",
        "raquo" => "\u{00BB}",
        "copy" => "\u{00A9}",
        "reg" => "\u{00AE}",
        "trade" => "\u{2122}",
        "times" => "\u{00D7}",
        "deg" => "\u{00B0}",
        "euro" => "\u{20AC}",
        "pound" => "\u{00A3}",
        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        _ => return None,
    };
    Some(s)
}

// ---------------------------------------------------------------------------
// Byte helpers
// ---------------------------------------------------------------------------

fn is_void(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// SVG leaf shapes commonly written as `<path ... />` in inline icons.
fn is_foreign_leaf(name: &str) -> bool {
    matches!(
        name,
        "path" | "circle" | "rect" | "line" | "polyline" | "polygon" | "ellipse" | "use" | "stop"
    )
}

fn is_raw_text(name: &str) -> bool {
    matches!(name, "script" | "style" | "title" | "textarea")
}

fn is_tag_name_terminator(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'>' || b == b'/'
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|i| i + from)
}

fn find_sub(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

fn find_ci(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
        .map(|i| i + from)
}
