//! A streaming tokenizer with its own entity, attribute, and comment
//! machinery — no host XML crate's tree model underneath it.
//!
//! The "streaming" here is a single in-memory buffer scanned one `char`
//! at a time through [`Tokenizer::bump`]/[`Tokenizer::peek`]; nothing
//! downstream depends on the bytes arriving incrementally, so loading the
//! whole file up front keeps the scanner simple without changing the
//! token sequence it produces.

use std::fs;
use std::path::{Path, PathBuf};

use crate::diagnostics::{Code, DiagnosticSink, Position};

use super::elements::{ElementKind, lookup_element};
use super::entities::{EntityKind, lookup_entity};
use super::token::{Attribute, MAX_ATTRIBUTES, MAX_NAME_LEN, Token};

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == ':' || c == '_'
}

fn is_name_continue(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '.' | ':' | '_')
}

fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// A tokenizer bound to one open input. Open with [`Tokenizer::open`] for
/// a file on disk, or [`Tokenizer::from_str`] to parse the contents of an
/// attribute value — `get_attribute_parser` returns the latter so nested
/// parsing reuses the same machinery as a top-level file.
pub struct Tokenizer {
    path: PathBuf,
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    last_char: Option<char>,
    error: bool,
    current_text: String,
    current_element: Option<ElementKind>,
    current_entity: Option<EntityKind>,
    current_attributes: Vec<Attribute>,
}

impl Tokenizer {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let text = fs::read_to_string(&path)?;
        Ok(Self::from_str(&path, &text))
    }

    /// Binds a tokenizer to an in-memory string, as used both for the
    /// top-level file load and for `get_attribute_parser`.
    pub fn from_str(path: impl AsRef<Path>, text: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            last_char: None,
            error: false,
            current_text: String::new(),
            current_element: None,
            current_entity: None,
            current_attributes: Vec::new(),
        }
    }

    pub fn close(self) {}

    pub fn position(&self) -> Position {
        Position::new(self.path.clone(), self.line, self.column)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.last_char = Some(c);
        Some(c)
    }

    fn fail(&mut self, code: Code, sink: &mut impl DiagnosticSink) -> Token {
        self.error = true;
        sink.report(self.position(), code.clone());
        Token::Error { code }
    }

    /// Reads the next token. Once any error has been raised, every
    /// further call returns `Token::Error` without re-scanning.
    pub fn read_next(&mut self, sink: &mut impl DiagnosticSink) -> Token {
        if self.error {
            return Token::Error { code: Code::TokenizerErrorState };
        }
        self.current_element = None;
        self.current_entity = None;
        match self.peek() {
            None => Token::Eof,
            Some('<') => self.scan_markup(sink),
            Some('&') => self.scan_entity(sink),
            Some(c) if is_xml_space(c) => self.scan_whitespace(),
            Some(_) => self.scan_text(),
        }
    }

    pub fn text(&self) -> &str {
        &self.current_text
    }

    pub fn element(&self) -> Option<ElementKind> {
        self.current_element
    }

    pub fn entity(&self) -> Option<EntityKind> {
        self.current_entity
    }

    // --- lexing ---

    fn scan_name(&mut self) -> Option<String> {
        let start = self.peek()?;
        if !is_name_start(start) {
            return None;
        }
        let mut name = String::new();
        name.push(self.bump().unwrap());
        while let Some(c) = self.peek() {
            if is_name_continue(c) {
                name.push(self.bump().unwrap());
            } else {
                break;
            }
        }
        Some(name)
    }

    fn scan_whitespace(&mut self) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if is_xml_space(c) {
                text.push(self.bump().unwrap());
            } else {
                break;
            }
        }
        Token::Whitespace { text }
    }

    fn scan_text(&mut self) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '<' || c == '&' {
                break;
            }
            text.push(self.bump().unwrap());
        }
        Token::Text { text }
    }

    fn scan_entity(&mut self, sink: &mut impl DiagnosticSink) -> Token {
        self.bump(); // '&'
        let mut name = String::new();
        loop {
            match self.peek() {
                None => return self.fail(Code::UnterminatedEntity, sink),
                Some(';') => {
                    self.bump();
                    break;
                }
                Some(c) if is_xml_space(c) => {
                    return self.fail(Code::WhitespaceInEntity { partial: name }, sink);
                }
                Some(c) => {
                    if name.len() >= MAX_NAME_LEN {
                        return self.fail(
                            Code::NameTooLong { prefix: name.clone(), max: MAX_NAME_LEN },
                            sink,
                        );
                    }
                    name.push(c);
                    self.bump();
                }
            }
        }
        match lookup_entity(&name) {
            Some(kind) => {
                self.current_entity = Some(kind);
                Token::Entity { name }
            }
            None => {
                sink.report(self.position(), Code::UnknownEntity { name: name.clone() });
                Token::Entity { name }
            }
        }
    }

    fn scan_markup(&mut self, sink: &mut impl DiagnosticSink) -> Token {
        self.bump(); // '<'
        if self.peek() == Some('!') && self.peek_at(1) == Some('-') && self.peek_at(2) == Some('-') {
            return self.scan_comment(sink);
        }
        if self.peek() == Some('!') || self.peek() == Some('?') {
            return self.scan_other();
        }
        let is_end = if self.peek() == Some('/') {
            self.bump();
            true
        } else {
            false
        };
        let Some(name) = self.scan_name() else {
            return self.fail(Code::UnterminatedTag { name: String::new() }, sink);
        };
        if name.len() > MAX_NAME_LEN {
            return self.fail(Code::NameTooLong { prefix: name, max: MAX_NAME_LEN }, sink);
        }
        let (attributes, saw_slash) = if is_end { (Vec::new(), false) } else {
            match self.scan_attributes(&name, sink) {
                Ok(result) => result,
                Err(token) => return token,
            }
        };
        if is_end {
            // end tags carry no attributes: only trailing whitespace and
            // an optional (erroneous) '/' may precede '>'
            while self.peek().map(is_xml_space).unwrap_or(false) {
                self.bump();
            }
            let saw_slash = if self.peek() == Some('/') {
                self.bump();
                true
            } else {
                false
            };
            while self.peek().map(is_xml_space).unwrap_or(false) {
                self.bump();
            }
            match self.peek() {
                Some('>') => {
                    self.bump();
                }
                _ => return self.fail(Code::UnterminatedTag { name }, sink),
            }
            if saw_slash {
                return self.fail(Code::EndTagSelfClosing { name }, sink);
            }
            match lookup_element(&name) {
                Some(kind) => self.current_element = Some(kind),
                None => sink.report(self.position(), Code::UnknownElement { name: name.clone() }),
            }
            return Token::EndTag { name };
        }

        let is_empty = saw_slash;
        match lookup_element(&name) {
            Some(kind) => self.current_element = Some(kind),
            None => sink.report(self.position(), Code::UnknownElement { name: name.clone() }),
        }
        self.current_attributes = attributes.clone();
        if is_empty {
            Token::EmptyTag { name, attributes }
        } else {
            Token::StartTag { name, attributes }
        }
    }

    fn scan_attributes(
        &mut self,
        tag_name: &str,
        sink: &mut impl DiagnosticSink,
    ) -> Result<(Vec<Attribute>, bool), Token> {
        let mut attributes = Vec::new();
        let mut saw_slash = false;
        loop {
            while self.peek().map(is_xml_space).unwrap_or(false) {
                self.bump();
            }
            match self.peek() {
                None => return Err(self.fail(Code::UnterminatedTag { name: tag_name.to_string() }, sink)),
                Some('>') => {
                    self.bump();
                    return Ok((attributes, saw_slash));
                }
                Some('/') => {
                    self.bump();
                    saw_slash = true;
                    continue;
                }
                Some(c) if is_name_start(c) => {
                    saw_slash = false;
                    if attributes.len() >= MAX_ATTRIBUTES {
                        return Err(self.fail(
                            Code::TooManyAttributes { name: tag_name.to_string(), max: MAX_ATTRIBUTES },
                            sink,
                        ));
                    }
                    let Some(attr_name) = self.scan_name() else {
                        return Err(self.fail(Code::UnterminatedTag { name: tag_name.to_string() }, sink));
                    };
                    while self.peek().map(is_xml_space).unwrap_or(false) {
                        self.bump();
                    }
                    if self.peek() != Some('=') {
                        // boolean-style attribute with no value
                        attributes.push(Attribute { name: attr_name, value: String::new() });
                        continue;
                    }
                    self.bump(); // '='
                    while self.peek().map(is_xml_space).unwrap_or(false) {
                        self.bump();
                    }
                    let quote = match self.peek() {
                        Some(q @ ('\'' | '"')) => q,
                        _ => {
                            return Err(self.fail(
                                Code::UnterminatedAttribute { attr: attr_name },
                                sink,
                            ));
                        }
                    };
                    self.bump();
                    let mut value = String::new();
                    loop {
                        match self.peek() {
                            None => {
                                return Err(self.fail(Code::UnterminatedQuote, sink));
                            }
                            Some(c) if c == quote => {
                                self.bump();
                                break;
                            }
                            Some(c) => {
                                value.push(c);
                                self.bump();
                            }
                        }
                    }
                    attributes.push(Attribute { name: attr_name, value });
                }
                Some(_) => {
                    // stray character: skip it rather than looping forever
                    saw_slash = false;
                    self.bump();
                }
            }
        }
    }

    fn scan_comment(&mut self, sink: &mut impl DiagnosticSink) -> Token {
        self.bump();
        self.bump();
        self.bump(); // '!--'
        loop {
            match self.peek() {
                None => return self.fail(Code::UnterminatedComment, sink),
                Some('-') if self.peek_at(1) == Some('-') && self.peek_at(2) == Some('>') => {
                    self.bump();
                    self.bump();
                    self.bump();
                    return Token::Comment;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// `<!...>` and `<?...?>` are tokenized, not rejected.
    fn scan_other(&mut self) -> Token {
        loop {
            match self.peek() {
                None => return Token::Eof,
                Some('>') => {
                    self.bump();
                    return Token::Other;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    // --- attribute accessors ---

    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.current_attributes.iter().find(|a| a.name == name).map(|a| a.value.as_str())
    }

    pub fn copy_text(&self, name: &str, buf: &mut String) -> bool {
        match self.get_text(name) {
            Some(v) => {
                buf.clear();
                buf.push_str(v);
                true
            }
            None => false,
        }
    }

    /// Returns a sub-tokenizer bound to the named attribute's value, so
    /// nested parsing (e.g. a structured `coldef` width spec) goes
    /// through the same tokenizer API as top-level content.
    pub fn get_attribute_parser(&self, name: &str) -> Option<Tokenizer> {
        let value = self.get_text(name)?;
        Some(Tokenizer::from_str(&self.path, value))
    }

    pub fn test_boolean(&self, name: &str, true_str: &str, false_str: &str) -> Option<bool> {
        match self.get_text(name)? {
            v if v == true_str => Some(true),
            v if v == false_str => Some(false),
            _ => None,
        }
    }

    pub fn read_integer(
        &self,
        name: &str,
        default: i64,
        min: i64,
        max: i64,
        sink: &mut impl DiagnosticSink,
    ) -> i64 {
        let Some(text) = self.get_text(name) else { return default };
        match text.parse::<i64>() {
            Ok(v) if v >= min && v <= max => v,
            Ok(v) => {
                sink.report(
                    self.position(),
                    Code::IntegerOutOfRange { name: name.to_string(), value: v, min, max },
                );
                v.clamp(min, max)
            }
            Err(_) => default,
        }
    }

    pub fn read_option<'a>(&self, name: &str, allowed: &'a [&'a str]) -> Option<&'a str> {
        let value = self.get_text(name)?;
        allowed.iter().find(|a| **a == value).copied()
    }
}
