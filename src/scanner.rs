use crate::{Error, Result};

/// One captured `--` comment line, with the line it appeared on.
#[derive(PartialEq, Clone, Debug)]
pub struct CommentLine {
    pub text: String,
    pub line: u32,
}

/// A single statement split out of a script: the comment lines gathered
/// for it and its SQL text, terminated with `;`.
#[derive(PartialEq, Clone, Debug)]
pub struct RawStatement {
    pub comments: Vec<CommentLine>,
    pub sql: String,
    pub line: u32,
}

pub struct Scanner {
    source_chars: Vec<char>,
    statements: Vec<RawStatement>,
    comments: Vec<CommentLine>,
    sql: String,
    sql_started: bool,
    statement_line: u32,
    current: usize,
    line: u32,
    col: u32,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            source_chars: source.chars().collect(),
            statements: vec![],
            comments: vec![],
            sql: String::new(),
            sql_started: false,
            statement_line: 1,
            current: 0,
            line: 1,
            col: 0,
        }
    }

    pub fn statements(&self) -> &Vec<RawStatement> {
        &self.statements
    }

    fn advance(&mut self) -> char {
        let c = self.source_chars[self.current];
        self.current += 1;
        self.col += 1;
        c
    }

    fn n_advance(&mut self, n: usize) -> char {
        assert!(n > 0);
        let mut c = self.advance();
        for _ in 1..n {
            c = self.advance();
        }
        c
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source_chars.len()
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source_chars[self.current]
        }
    }

    fn n_peek(&mut self, n: usize) -> Option<&[char]> {
        self.source_chars.get(self.current..self.current + n)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() != expected {
            return false;
        };

        self.current += 1;
        true
    }

    fn reset(&mut self) {
        self.statements.clear();
        self.comments.clear();
        self.sql.clear();
        self.sql_started = false;
        self.statement_line = 1;
        self.current = 0;
        self.col = 1;
        self.line = 1;
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.col = 1;
    }

    pub fn scan(&mut self) -> Result<()> {
        self.reset();
        while self.current < self.source_chars.len() {
            self.scan_token()?;
        }
        self.finish_statement();
        Ok(())
    }

    fn push_sql(&mut self, c: char) {
        if !self.sql_started {
            if c.is_whitespace() {
                return;
            }
            self.sql_started = true;
            self.statement_line = self.line;
        }
        self.sql.push(c);
    }

    fn finish_statement(&mut self) {
        let mut sql = std::mem::take(&mut self.sql);
        let comments = std::mem::take(&mut self.comments);
        self.sql_started = false;

        sql.truncate(sql.trim_end().len());
        if sql.is_empty() {
            return;
        }
        sql.push(';');
        self.statements.push(RawStatement {
            comments,
            sql,
            line: self.statement_line,
        });
    }

    fn line_comment(&mut self) {
        let text_start = self.current;
        loop {
            let peek_char = self.peek();
            if peek_char == '\n' || peek_char == '\0' {
                break;
            }
            self.advance();
        }
        // Comments past the first SQL token of a statement carry no directives.
        if !self.sql_started {
            self.comments.push(CommentLine {
                text: self.source_chars[text_start..self.current].iter().collect(),
                line: self.line,
            });
        }
    }

    fn block_comment(&mut self) -> Result<()> {
        loop {
            if self.peek() == '\0' {
                return Err(Error::Syntax(self.error_str("Found unterminated comment")));
            }
            if self.peek() == '\n' {
                self.new_line();
            }
            let peek_chars = self.n_peek(2);
            if peek_chars.is_some()
                && peek_chars
                    .unwrap()
                    .iter()
                    .zip("*/".chars())
                    .all(|(&c1, c2)| c1 == c2)
            {
                self.n_advance(2);
                break;
            }
            self.advance();
        }
        Ok(())
    }

    fn string_literal(&mut self, delimiter: char) -> Result<()> {
        self.push_sql(delimiter);
        loop {
            let peek_char = self.peek();
            if peek_char == '\0' {
                return Err(Error::Syntax(self.error_str("Found unterminated string")));
            }
            if self.match_char(delimiter) {
                self.push_sql(delimiter);
                // A doubled delimiter stays inside the literal.
                if self.peek() == delimiter {
                    self.advance();
                    self.push_sql(delimiter);
                    continue;
                }
                break;
            }
            if peek_char == '\n' {
                self.new_line();
            }
            self.advance();
            self.push_sql(peek_char);
        }
        Ok(())
    }

    fn scan_token(&mut self) -> Result<()> {
        let curr_char = self.advance();
        match curr_char {
            '-' => {
                if self.match_char('-') {
                    self.line_comment();
                } else {
                    self.push_sql(curr_char);
                }
            }
            '/' => {
                if self.match_char('*') {
                    self.block_comment()?;
                } else {
                    self.push_sql(curr_char);
                }
            }
            ';' => self.finish_statement(),
            '\n' => {
                self.new_line();
                self.push_sql(curr_char);
            }
            c if c == '\'' || c == '"' => {
                self.string_literal(c)?;
            }
            c => self.push_sql(c),
        }
        Ok(())
    }

    fn error_str(&mut self, error: &str) -> String {
        format!(
            "[line: {}, col: {}] Scanner error: {}",
            self.line, self.col, error
        )
    }
}
