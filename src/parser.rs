use indexmap::IndexMap;
use serde::Serialize;

use crate::scanner::{RawStatement, Scanner};
use crate::table::SqlParams;
use crate::{Error, Result};

/// Sheet that statements land on until a `sheetname` directive says otherwise.
pub const DEFAULT_SHEET: &str = "Sheet1";

/// A typed directive value.
#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    fn typed(raw: &str) -> Value {
        if raw.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        if let Ok(n) = raw.parse::<i64>() {
            return Value::Int(n);
        }
        Value::Text(raw.to_owned())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    /// Numeric reading of a value: integers directly, float literals from text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Text(text) => text.parse().ok(),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(text) => write!(f, "{}", text),
            Value::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// The ordered directive map of one statement. A later occurrence of a key
/// overwrites the earlier one, keeping its first position.
#[derive(PartialEq, Clone, Debug, Default, Serialize)]
pub struct Options(pub IndexMap<String, Value>);

impl Options {
    pub fn insert(&mut self, key: String, value: Value) {
        self.0.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Any scalar value, rendered to text.
    pub fn text_value(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| value.to_string())
    }

    pub fn bool_value(&self, key: &str) -> Result<Option<bool>> {
        self.typed_value(key, "a boolean", Value::as_bool)
    }

    pub fn int_value(&self, key: &str) -> Result<Option<i64>> {
        self.typed_value(key, "an integer", Value::as_int)
    }

    pub fn f64_value(&self, key: &str) -> Result<Option<f64>> {
        self.typed_value(key, "a number", Value::as_f64)
    }

    pub fn list_value(&self, key: &str) -> Result<Option<&[Value]>> {
        self.typed_value(key, "a list", Value::as_list)
    }

    fn typed_value<'a, T>(
        &'a self,
        key: &str,
        expected: &str,
        read: impl Fn(&'a Value) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => match read(value) {
                Some(v) => Ok(Some(v)),
                None => Err(Error::Configuration(format!(
                    "Option `{}` expects {}, got `{}`",
                    key, expected, value
                ))),
            },
        }
    }
}

/// Everything resolved for one statement of an annotated script.
#[derive(PartialEq, Clone, Debug, Serialize)]
pub struct QueryConfig {
    pub sql: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<SqlParams>,
    pub options: Options,
    pub target_sheet: String,
    pub export_requested: bool,
    pub line: u32,
}

impl QueryConfig {
    /// A config built from code rather than parsed from a script. These
    /// always export; `line` 0 marks the missing script position.
    pub fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_owned(),
            params: None,
            options: Options::default(),
            target_sheet: DEFAULT_SHEET.to_owned(),
            export_requested: true,
            line: 0,
        }
    }

    pub fn with_params(mut self, params: SqlParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }
}

pub struct Parser<'a> {
    statements: &'a [RawStatement],
    curr: usize,
    current_sheet: String,
}

impl<'a> Parser<'a> {
    pub fn new(statements: &'a [RawStatement]) -> Self {
        Self {
            statements,
            curr: 0,
            current_sheet: DEFAULT_SHEET.to_owned(),
        }
    }

    pub fn parse(&mut self) -> Result<Vec<QueryConfig>> {
        let mut configs = Vec::with_capacity(self.statements.len());
        while self.curr < self.statements.len() {
            configs.push(self.statement_config()?);
            self.curr += 1;
        }
        Ok(configs)
    }

    fn statement_config(&mut self) -> Result<QueryConfig> {
        let statement = &self.statements[self.curr];

        let mut options = Options::default();
        for comment in &statement.comments {
            for (key, value) in lex_comment_line(&comment.text, comment.line)? {
                options.insert(key, value);
            }
        }

        // The sheet name sticks until the next `sheetname` directive.
        if let Some(sheet) = options.text_value("sheetname") {
            self.current_sheet = sheet.trim().to_owned();
        }

        let export_requested = options.contains("chart");
        Ok(QueryConfig {
            sql: statement.sql.clone(),
            params: None,
            options,
            target_sheet: self.current_sheet.clone(),
            export_requested,
            line: statement.line,
        })
    }
}

fn lex_comment_line(text: &str, line: u32) -> Result<Vec<(String, Value)>> {
    let Some(segments) = split_depth_zero(text) else {
        // Unbalanced brackets abort a directive line; prose is ignored.
        if text.contains('=') || text.contains(':') {
            return Err(Error::Syntax(format!(
                "[line {}] Error at '{}': Expected `]`.",
                line,
                text.trim()
            )));
        }
        return Ok(vec![]);
    };

    let mut pairs = vec![];
    for segment in segments {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "chart" {
            pairs.push(("chart".to_owned(), Value::Text(String::new())));
            continue;
        }
        let Some(sep_idx) = separator_index(trimmed) else {
            continue;
        };
        let key = normalize_key(&trimmed[..sep_idx]);
        if key.is_empty() {
            continue;
        }
        let raw_value = trimmed[sep_idx + 1..].trim();
        if raw_value.is_empty() {
            return Err(Error::Syntax(format!(
                "[line {}] Error at '{}': Expected a value after `{}`.",
                line,
                trimmed,
                &trimmed[sep_idx..=sep_idx]
            )));
        }
        pairs.push((key, parse_value(raw_value)));
    }
    Ok(pairs)
}

/// Splits on commas outside any `[`...`]` nesting. `None` means the
/// brackets never closed.
fn split_depth_zero(text: &str) -> Option<Vec<&str>> {
    let mut segments = vec![];
    let mut depth = 0u32;
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                segments.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    segments.push(&text[start..]);
    Some(segments)
}

fn separator_index(segment: &str) -> Option<usize> {
    let mut depth = 0u32;
    for (idx, c) in segment.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '=' | ':' if depth == 0 => return Some(idx),
            _ => {}
        }
    }
    None
}

fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

fn parse_value(raw: &str) -> Value {
    if raw.starts_with('[') && raw.ends_with(']') {
        if let Some(elements) = split_depth_zero(&raw[1..raw.len() - 1]) {
            return Value::List(
                elements
                    .iter()
                    .map(|element| element.trim())
                    .filter(|element| !element.is_empty())
                    .map(list_element)
                    .collect(),
            );
        }
    }
    Value::typed(raw)
}

fn list_element(element: &str) -> Value {
    if element.starts_with('[') && element.ends_with(']') {
        return parse_value(element);
    }
    Value::typed(element.trim_matches(|c| c == '\'' || c == '"'))
}

/// Parse an annotated SQL script into one `QueryConfig` per statement.
pub fn parse_script(script: &str) -> Result<Vec<QueryConfig>> {
    log::debug!("Parsing {}", script.chars().take(50).collect::<String>());
    let mut scanner = Scanner::new(script);
    scanner.scan()?;
    let mut parser = Parser::new(scanner.statements());
    parser.parse()
}
