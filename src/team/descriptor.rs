//! Flat key-value descriptor parsing.
//!
//! Descriptor files use shell assignment syntax (`TEAM_NAME="iOS Team"`,
//! `TEAM_AGENTS=(lead dev)`), but they are never executed. This module reads
//! the subset of that syntax that denotes plain data and rejects anything a
//! shell would evaluate: command substitution, parameter expansion and
//! operators.

use std::collections::HashMap;

use thiserror::Error;

/// Keywords that may prefix an assignment without changing its meaning here.
const DECLARATION_KEYWORDS: [&str; 4] = ["export", "readonly", "declare", "typeset"];

/// A syntax error in a descriptor file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    /// 1-indexed line where the problem starts
    pub line: usize,
    pub message: String,
}

/// Value assigned to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvValue {
    Scalar(String),
    List(Vec<String>),
}

impl KvValue {
    /// The value as a single string. Lists are joined with spaces.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Scalar(value) => value.clone(),
            Self::List(items) => items.join(" "),
        }
    }

    /// The value as an ordered sequence.
    ///
    /// Scalars are split on whitespace and commas so that
    /// `TEAM_AGENTS="lead, dev"` reads the same as `TEAM_AGENTS=(lead dev)`.
    #[must_use]
    pub fn items(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.clone(),
            Self::Scalar(value) => value
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// A single `KEY=VALUE` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub key: String,
    pub value: KvValue,
    /// 1-indexed line of the assignment
    pub line: usize,
}

/// A key assigned more than once in the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey {
    pub key: String,
    pub first_line: usize,
    pub line: usize,
}

/// All assignments of one descriptor file, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvRecord {
    entries: Vec<KvEntry>,
}

impl KvRecord {
    #[must_use]
    pub fn entries(&self) -> &[KvEntry] {
        &self.entries
    }

    /// Value of `key`. The last assignment wins, as it would in a shell.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&KvValue> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Every reassignment of a key, paired with the line of its first assignment.
    #[must_use]
    pub fn duplicate_keys(&self) -> Vec<DuplicateKey> {
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        let mut duplicates = Vec::new();
        for entry in &self.entries {
            match first_seen.get(entry.key.as_str()) {
                Some(&first_line) => duplicates.push(DuplicateKey {
                    key: entry.key.clone(),
                    first_line,
                    line: entry.line,
                }),
                None => {
                    first_seen.insert(&entry.key, entry.line);
                }
            }
        }
        duplicates
    }
}

/// Parse descriptor source text into a record.
pub fn parse_record(source: &str) -> Result<KvRecord, SyntaxError> {
    Parser::new(source).parse()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn parse(mut self) -> Result<KvRecord, SyntaxError> {
        let mut record = KvRecord::default();
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else {
                break;
            };
            if c == '#' {
                self.skip_comment();
                continue;
            }

            let line = self.line;
            let key = self.assignment_key()?;
            let value = if self.peek() == Some('(') {
                self.bump();
                KvValue::List(self.list(line)?)
            } else {
                KvValue::Scalar(self.word(false)?)
            };
            self.end_of_statement()?;
            record.entries.push(KvEntry { key, value, line });
        }
        Ok(record)
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
        }
        Some(c)
    }

    fn error(&self, line: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line,
            message: message.into(),
        }
    }

    fn skip_blank(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\r')) {
            self.bump();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn skip_comment(&mut self) {
        while matches!(self.peek(), Some(c) if c != '\n') {
            self.bump();
        }
    }

    fn identifier(&mut self) -> String {
        let mut name = String::new();
        if matches!(self.peek(), Some(c) if c.is_ascii_alphabetic() || c == '_') {
            while let Some(c) = self.peek() {
                if !(c.is_ascii_alphanumeric() || c == '_') {
                    break;
                }
                name.push(c);
                self.bump();
            }
        }
        name
    }

    fn assignment_key(&mut self) -> Result<String, SyntaxError> {
        let line = self.line;
        let mut name = self.identifier();
        if name.is_empty() {
            return Err(self.error(line, "expected an assignment of the form KEY=VALUE"));
        }

        if DECLARATION_KEYWORDS.contains(&name.as_str()) && matches!(self.peek(), Some(' ' | '\t'))
        {
            let keyword = name;
            self.skip_blank();
            while self.peek() == Some('-') {
                while matches!(self.peek(), Some(c) if !c.is_whitespace()) {
                    self.bump();
                }
                self.skip_blank();
            }
            name = self.identifier();
            if name.is_empty() {
                return Err(self.error(line, format!("expected a variable name after '{keyword}'")));
            }
        }

        match self.peek() {
            Some('=') => {
                self.bump();
                Ok(name)
            }
            Some('+') if self.peek_at(1) == Some('=') => Err(self.error(
                line,
                format!("append assignment to '{name}' is not supported"),
            )),
            _ => Err(self.error(line, format!("expected '=' after '{name}'"))),
        }
    }

    /// Read one shell word. Quoted segments and escapes are concatenated.
    fn word(&mut self, in_list: bool) -> Result<String, SyntaxError> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => break,
                ')' if in_list => break,
                '\'' => {
                    let start = self.line;
                    self.bump();
                    self.single_quoted(&mut out, start)?;
                }
                '"' => {
                    let start = self.line;
                    self.bump();
                    self.double_quoted(&mut out, start)?;
                }
                '\\' => {
                    self.bump();
                    match self.bump() {
                        Some('\n') => {}
                        Some(escaped) => out.push(escaped),
                        None => return Err(self.error(self.line, "dangling backslash at end of file")),
                    }
                }
                '$' => {
                    self.reject_expansion()?;
                    out.push('$');
                    self.bump();
                }
                '`' => return Err(self.error(self.line, "command substitution is not allowed")),
                ';' | '&' | '|' | '<' | '>' | '(' | ')' => {
                    return Err(self.error(self.line, format!("unexpected shell operator '{c}'")));
                }
                _ => {
                    out.push(c);
                    self.bump();
                }
            }
        }
        Ok(out)
    }

    fn single_quoted(&mut self, out: &mut String, start: usize) -> Result<(), SyntaxError> {
        loop {
            match self.bump() {
                None => return Err(self.error(start, "unterminated single-quoted string")),
                Some('\'') => return Ok(()),
                Some(c) => out.push(c),
            }
        }
    }

    fn double_quoted(&mut self, out: &mut String, start: usize) -> Result<(), SyntaxError> {
        loop {
            match self.peek() {
                None => return Err(self.error(start, "unterminated double-quoted string")),
                Some('"') => {
                    self.bump();
                    return Ok(());
                }
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        Some('\n') => {
                            self.bump();
                        }
                        Some(c @ ('"' | '\\' | '$' | '`')) => {
                            out.push(c);
                            self.bump();
                        }
                        Some(_) => out.push('\\'),
                        None => return Err(self.error(start, "unterminated double-quoted string")),
                    }
                }
                Some('$') => {
                    self.reject_expansion()?;
                    out.push('$');
                    self.bump();
                }
                Some('`') => {
                    return Err(self.error(self.line, "command substitution is not allowed"));
                }
                Some(c) => {
                    out.push(c);
                    self.bump();
                }
            }
        }
    }

    /// Called with the cursor on `$`. A lone dollar sign is literal text.
    fn reject_expansion(&self) -> Result<(), SyntaxError> {
        match self.peek_at(1) {
            Some('(') => Err(self.error(self.line, "command substitution is not allowed")),
            Some(c) if c.is_ascii_alphanumeric() || matches!(c, '_' | '{' | '@' | '*' | '#' | '?' | '$' | '!') => {
                Err(self.error(self.line, "variable expansion is not supported in descriptor values"))
            }
            _ => Ok(()),
        }
    }

    fn list(&mut self, open_line: usize) -> Result<Vec<String>, SyntaxError> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error(open_line, "unterminated array, expected ')'")),
                Some(')') => {
                    self.bump();
                    return Ok(items);
                }
                Some('#') => self.skip_comment(),
                Some(_) => items.push(self.word(true)?),
            }
        }
    }

    fn end_of_statement(&mut self) -> Result<(), SyntaxError> {
        self.skip_blank();
        match self.peek() {
            None | Some('\n') => Ok(()),
            Some('#') => {
                self.skip_comment();
                Ok(())
            }
            Some(_) => Err(self.error(
                self.line,
                "unexpected content after value (quote values that contain spaces)",
            )),
        }
    }
}
