//! Lightweight HTML tag scanner.
//!
//! No DOM is built. The scanner walks the raw markup once and yields text runs and tags
//! with their attributes. Comments, doctype declarations and processing instructions never
//! yield tags, and the contents of raw-text elements are handed back whole on the opening
//! tag instead of being scanned for markup.

/// Elements whose contents are raw text rather than markup.
const RAW_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "title", "textarea"];

/// Raw-text elements whose contents never count as visible text.
const HIDDEN_RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    SelfClosing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Lowercased
    pub name: String,
    /// Raw (undecoded) value, empty for a bare attribute
    pub value: &'a str,
    /// Whether the value was written in single or double quotes
    pub quoted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Lowercased element name
    pub name: String,
    pub kind: TagKind,
    pub attrs: Vec<Attribute<'a>>,
    /// Raw text between the opening and closing tag of a raw-text element
    pub content: Option<&'a str>,
}

impl<'a> Tag<'a> {
    /// First value of the named attribute. `name` must be lowercase.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.attribute(name).map(|attr| attr.value)
    }

    /// Value of the named attribute, but only when it was quoted.
    pub fn quoted_attr(&self, name: &str) -> Option<&'a str> {
        self.attribute(name)
            .filter(|attr| attr.quoted)
            .map(|attr| attr.value)
    }

    fn attribute(&self, name: &str) -> Option<&Attribute<'a>> {
        self.attrs.iter().find(|attr| attr.name == name)
    }

    /// True for opening and self-closing tags of the given element.
    pub fn opens(&self, name: &str) -> bool {
        self.kind != TagKind::Close && self.name == name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Tag(Tag<'a>),
}

/// Iterator over the text runs and tags of an HTML document.
pub struct Scanner<'a> {
    html: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(html: &'a str) -> Self {
        Self { html, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.html.as_bytes()
    }

    /// Moves past the next `>` at or after `from`, or to the end of input.
    fn skip_past_gt(&mut self, from: usize) {
        self.pos = match self.html[from..].find('>') {
            Some(offset) => from + offset + 1,
            None => self.html.len(),
        };
    }

    fn skip_whitespace(&self, mut i: usize) -> usize {
        let bytes = self.bytes();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    }

    fn scan_name(&self, start: usize) -> usize {
        let bytes = self.bytes();
        let mut i = start;
        while i < bytes.len() && is_name_byte(bytes[i]) {
            i += 1;
        }
        i
    }

    fn scan_close_tag(&mut self, start: usize) -> Tag<'a> {
        let name_end = self.scan_name(start + 2);
        let name = self.html[start + 2..name_end].to_ascii_lowercase();
        self.skip_past_gt(name_end);
        Tag {
            name,
            kind: TagKind::Close,
            attrs: Vec::new(),
            content: None,
        }
    }

    fn scan_open_tag(&mut self, start: usize) -> Tag<'a> {
        let html = self.html;
        let bytes = self.bytes();
        let len = bytes.len();

        let name_end = self.scan_name(start + 1);
        let name = html[start + 1..name_end].to_ascii_lowercase();

        let mut attrs = Vec::new();
        let mut self_closing = false;
        let mut i = name_end;

        loop {
            i = self.skip_whitespace(i);
            if i >= len {
                break;
            }
            match bytes[i] {
                b'>' => {
                    i += 1;
                    break;
                }
                b'/' => {
                    if bytes.get(i + 1) == Some(&b'>') {
                        self_closing = true;
                        i += 2;
                        break;
                    }
                    i += 1;
                    continue;
                }
                _ => {}
            }

            let attr_start = i;
            while i < len
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'=' | b'>' | b'/')
            {
                i += 1;
            }
            let attr_end = i;

            i = self.skip_whitespace(i);
            let (value, quoted) = if i < len && bytes[i] == b'=' {
                i = self.skip_whitespace(i + 1);
                if i < len && matches!(bytes[i], b'"' | b'\'') {
                    let quote = bytes[i] as char;
                    let value_start = i + 1;
                    let value = match html[value_start..].find(quote) {
                        Some(offset) => {
                            i = value_start + offset + 1;
                            &html[value_start..value_start + offset]
                        }
                        None => {
                            i = len;
                            &html[value_start..]
                        }
                    };
                    (value, true)
                } else {
                    let value_start = i;
                    while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    (&html[value_start..i], false)
                }
            } else {
                ("", false)
            };

            if attr_end > attr_start {
                attrs.push(Attribute {
                    name: html[attr_start..attr_end].to_ascii_lowercase(),
                    value,
                    quoted,
                });
            }
        }

        self.pos = i;

        let kind = if self_closing {
            TagKind::SelfClosing
        } else {
            TagKind::Open
        };

        let content = if kind == TagKind::Open && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            let end = find_close_tag(html, i, &name).unwrap_or(len);
            self.pos = end;
            Some(&html[i..end])
        } else {
            None
        };

        Tag {
            name,
            kind,
            attrs,
            content,
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let html = self.html;
            if self.pos >= html.len() {
                return None;
            }

            let rest = &html[self.pos..];
            match rest.find('<') {
                None => {
                    self.pos = html.len();
                    return Some(Token::Text(rest));
                }
                Some(0) => {}
                Some(offset) => {
                    self.pos += offset;
                    return Some(Token::Text(&rest[..offset]));
                }
            }

            let start = self.pos;
            if rest.starts_with("<!--") {
                self.pos = match html[start + 4..].find("-->") {
                    Some(offset) => start + 4 + offset + 3,
                    None => html.len(),
                };
                continue;
            }

            match self.bytes().get(start + 1) {
                Some(b'!') | Some(b'?') => {
                    self.skip_past_gt(start + 1);
                    continue;
                }
                Some(b'/') => {
                    if self
                        .bytes()
                        .get(start + 2)
                        .is_some_and(|b| b.is_ascii_alphabetic())
                    {
                        return Some(Token::Tag(self.scan_close_tag(start)));
                    }
                    self.skip_past_gt(start + 1);
                    continue;
                }
                Some(b) if b.is_ascii_alphabetic() => {
                    return Some(Token::Tag(self.scan_open_tag(start)));
                }
                _ => {
                    // A bare `<` that does not start markup is literal text.
                    self.pos = start + 1;
                    return Some(Token::Text(&html[start..start + 1]));
                }
            }
        }
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'_')
}

/// Byte offset of the `</name` closing tag at or after `from`, matched case-insensitively.
fn find_close_tag(html: &str, from: usize, name: &str) -> Option<usize> {
    let bytes = html.as_bytes();
    let name = name.as_bytes();
    let mut i = from;
    while let Some(offset) = html[i..].find("</") {
        let candidate = i + offset;
        let name_start = candidate + 2;
        let name_end = name_start + name.len();
        if name_end <= bytes.len()
            && bytes[name_start..name_end].eq_ignore_ascii_case(name)
            && bytes.get(name_end).is_none_or(|b| !is_name_byte(*b))
        {
            return Some(candidate);
        }
        i = candidate + 2;
    }
    None
}

/// All tags in the document, in source order.
pub fn tags(html: &str) -> impl Iterator<Item = Tag<'_>> {
    Scanner::new(html).filter_map(|token| match token {
        Token::Tag(tag) => Some(tag),
        Token::Text(_) => None,
    })
}

/// Visible text of a document: script and style contents dropped, every tag treated as a
/// word boundary, `&nbsp;`/`&#160;`/`&amp;` decoded and whitespace collapsed.
pub fn visible_text(html: &str) -> String {
    let mut raw = String::with_capacity(html.len() / 2);

    for token in Scanner::new(html) {
        match token {
            Token::Text(text) => raw.push_str(text),
            Token::Tag(tag) => {
                raw.push(' ');
                if let Some(content) = tag.content
                    && !HIDDEN_RAW_TEXT_ELEMENTS.contains(&tag.name.as_str())
                {
                    raw.push_str(content);
                    raw.push(' ');
                }
            }
        }
    }

    let decoded = raw
        .replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decodes the common named and numeric character references.
/// Unknown or malformed references are left as they are.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
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

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix('x').or_else(|| number.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
