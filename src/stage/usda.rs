//! Byte-level access to the layer metadata of a `#usda` file.
//!
//! Stage structure is read through `openusd`; this scanner only finds the
//! header line and the layer metadata block, with byte spans, so
//! `defaultPrim` can be written without reformatting the rest of the file.

use std::fmt;
use std::ops::Range;

/// A syntax error with the 1-based line it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for SyntaxError {}

/// Value of a metadata field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A quoted string, unescaped.
    String(String),
    /// Anything else, as raw source text.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataField {
    pub key: String,
    pub value: FieldValue,
    /// Source span of the value, quotes included.
    pub value_span: Range<usize>,
}

/// A parenthesised metadata block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Source span from `(` to `)` inclusive.
    pub span: Range<usize>,
    pub fields: Vec<MetadataField>,
}

impl Metadata {
    pub fn field(&self, key: &str) -> Option<&MetadataField> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// The start of a text layer: header line and optional metadata block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerHead {
    /// Byte offset just past the header line.
    pub header_end: usize,
    pub metadata: Option<Metadata>,
}

impl LayerHead {
    /// The `defaultPrim` field of the layer metadata, if authored as a string.
    pub fn default_prim_field(&self) -> Option<(&str, Range<usize>)> {
        let field = self.metadata.as_ref()?.field("defaultPrim")?;
        match &field.value {
            FieldValue::String(name) => Some((name.as_str(), field.value_span.clone())),
            FieldValue::Other(_) => None,
        }
    }
}

/// Scan the header and layer metadata. The rest of the layer is not read.
pub fn scan_head(text: &str) -> Result<LayerHead, SyntaxError> {
    let mut parser = Parser::new(text);

    let header_end = parser.header()?;
    parser.skip_trivia();

    let metadata = if parser.peek() == Some(b'(') {
        Some(parser.metadata()?)
    } else {
        None
    };

    Ok(LayerHead {
        header_end,
        metadata,
    })
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        let end = self.pos.min(self.bytes.len());
        let line = self.bytes[..end].iter().filter(|b| **b == b'\n').count() + 1;
        SyntaxError {
            line,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn starts_with(&self, token: &str) -> bool {
        self.bytes[self.pos..].starts_with(token.as_bytes())
    }

    fn header(&mut self) -> Result<usize, SyntaxError> {
        if !self.starts_with("#usda") {
            return Err(self.error("missing `#usda` header"));
        }
        let end = self.bytes[self.pos..]
            .iter()
            .position(|b| *b == b'\n')
            .map_or(self.bytes.len(), |i| self.pos + i + 1);
        self.pos = end;
        Ok(end)
    }

    /// Skip whitespace, statement separators and `#` comments.
    fn skip_trivia(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' | b';' => self.pos += 1,
                b'#' => self.skip_comment(),
                _ => break,
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn identifier(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.pos += 1,
            _ => return None,
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || matches!(b, b'_' | b':' | b'.') {
                self.pos += 1;
            } else {
                break;
            }
        }
        Some(&self.src[start..self.pos])
    }

    /// Read a single, double or triple quoted string starting at the quote.
    fn string(&mut self) -> Result<(String, Range<usize>), SyntaxError> {
        let start = self.pos;
        let quote = self.bytes[self.pos];
        let triple = [quote, quote, quote];
        let delim: &[u8] = if self.bytes[self.pos..].starts_with(&triple) {
            &triple
        } else {
            &triple[..1]
        };
        self.pos += delim.len();
        let content_start = self.pos;

        loop {
            match self.peek() {
                None => {
                    self.pos = start;
                    return Err(self.error("unterminated string"));
                }
                Some(b'\\') => self.pos += 2,
                Some(b'\n') if delim.len() == 1 => {
                    self.pos = start;
                    return Err(self.error("newline in string"));
                }
                Some(_) if self.bytes[self.pos..].starts_with(delim) => break,
                Some(_) => self.pos += 1,
            }
        }

        let content = unescape(&self.src[content_start..self.pos]);
        self.pos += delim.len();
        Ok((content, start..self.pos))
    }

    /// Skip an asset path, `@path@` or `@@@path@@@`, plus an optional
    /// `</prim/path>` target.
    fn asset(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        if self.starts_with("@@@") {
            self.pos += 3;
            loop {
                if self.peek().is_none() {
                    self.pos = start;
                    return Err(self.error("unterminated asset path"));
                }
                if self.starts_with("\\@@@") {
                    self.pos += 4;
                } else if self.starts_with("@@@") {
                    self.pos += 3;
                    break;
                } else {
                    self.pos += 1;
                }
            }
        } else {
            self.pos += 1;
            loop {
                match self.peek() {
                    None | Some(b'\n') => {
                        self.pos = start;
                        return Err(self.error("unterminated asset path"));
                    }
                    Some(b'@') => {
                        self.pos += 1;
                        break;
                    }
                    Some(_) => self.pos += 1,
                }
            }
        }

        if self.peek() == Some(b'<') {
            self.path_target()?;
        }
        Ok(())
    }

    fn path_target(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'>' {
                return Ok(());
            }
            if b == b'\n' {
                break;
            }
        }
        self.pos = start;
        Err(self.error("unterminated prim path"))
    }

    /// Skip a balanced `(...)`, `[...]` or `{...}` group starting at the opener.
    fn group(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        let mut closers: Vec<u8> = Vec::new();

        loop {
            let Some(b) = self.peek() else {
                self.pos = start;
                return Err(self.error("unterminated block"));
            };
            match b {
                b'"' | b'\'' => {
                    self.string()?;
                }
                b'@' => self.asset()?,
                b'#' => self.skip_comment(),
                b'(' | b'[' | b'{' => {
                    closers.push(closer(b));
                    self.pos += 1;
                }
                b')' | b']' | b'}' => {
                    if closers.pop() != Some(b) {
                        return Err(self.error(format!("unexpected `{}`", b as char)));
                    }
                    self.pos += 1;
                    if closers.is_empty() {
                        return Ok(());
                    }
                }
                _ => self.pos += 1,
            }
        }
    }

    fn value(&mut self) -> Result<(FieldValue, Range<usize>), SyntaxError> {
        let start = self.pos;
        match self.peek() {
            Some(b'"' | b'\'') => {
                let (content, span) = self.string()?;
                return Ok((FieldValue::String(content), span));
            }
            Some(b'@') => self.asset()?,
            Some(b'(' | b'[' | b'{') => self.group()?,
            Some(b'<') => self.path_target()?,
            _ => {
                while let Some(b) = self.peek() {
                    if b.is_ascii_whitespace() || matches!(b, b')' | b';' | b'#') {
                        break;
                    }
                    self.pos += 1;
                }
                if self.pos == start {
                    return Err(self.error("expected a value"));
                }
            }
        }
        Ok((
            FieldValue::Other(self.src[start..self.pos].to_string()),
            start..self.pos,
        ))
    }

    /// Parse a metadata block starting at `(`.
    fn metadata(&mut self) -> Result<Metadata, SyntaxError> {
        let start = self.pos;
        self.pos += 1;
        let mut fields = Vec::new();

        loop {
            self.skip_trivia();
            match self.peek() {
                None => {
                    self.pos = start;
                    return Err(self.error("unterminated metadata block"));
                }
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                Some(b'"' | b'\'') => {
                    let (doc, span) = self.string()?;
                    fields.push(MetadataField {
                        key: "doc".to_string(),
                        value: FieldValue::String(doc),
                        value_span: span,
                    });
                }
                Some(_) => fields.push(self.field()?),
            }
        }

        Ok(Metadata {
            span: start..self.pos,
            fields,
        })
    }

    /// Parse `[listOp] key = value`.
    fn field(&mut self) -> Result<MetadataField, SyntaxError> {
        let mut key = None;
        loop {
            self.skip_trivia();
            if self.peek() == Some(b'=') {
                break;
            }
            match self.identifier() {
                Some(word) => key = Some(word),
                None => return Err(self.error("expected metadata key")),
            }
        }
        let Some(key) = key else {
            return Err(self.error("expected metadata key before `=`"));
        };

        self.pos += 1;
        self.skip_trivia();
        let (value, value_span) = self.value()?;

        Ok(MetadataField {
            key: key.to_string(),
            value,
            value_span,
        })
    }
}

const fn closer(open: u8) -> u8 {
    match open {
        b'(' => b')',
        b'[' => b']',
        _ => b'}',
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
