//! SCPI lexer.
//!
//! Turns a raw byte buffer into a stream of [`Token`]s with one token of
//! lookahead. The lexer never fails: ill-formed input produces an
//! [`TokKind::Error`] token carrying a diagnostic message, and scanning
//! continues so higher layers can translate the failure into a SCPI error
//! code with a source position.

use crate::limits;

/// Classification (and payload) of a SCPI lexer token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokKind {
    /// `:` — hierarchy separator / absolute-path marker.
    Colon,
    /// `;` — command separator.
    Semicolon,
    /// `,` — parameter separator.
    Comma,
    /// `?` — query marker.
    Question,
    /// `*` — common-command prefix.
    Asterisk,
    /// A bare `#` not introducing a base literal or block.
    Hash,
    /// `(` — channel-list open.
    LParen,
    /// `)` — channel-list close.
    RParen,
    /// `@` — channel-list marker.
    At,
    /// A line feed.
    Newline,
    /// End of the input buffer.
    EndOfInput,
    /// A mnemonic or keyword, split into base letters and an optional
    /// trailing decimal suffix (`CH2` -> base `CH`, suffix `2`).
    Identifier {
        /// The identifier without its numeric suffix.
        base: String,
        /// Trailing decimal suffix, when present and in `i32` range.
        suffix: Option<i32>,
    },
    /// A numeric literal, including `#B`/`#H`/`#Q` base-prefixed forms.
    Number {
        /// Parsed value.
        value: f64,
        /// `true` iff the literal had neither a decimal point nor an exponent.
        is_integer: bool,
        /// `true` iff the literal carried a leading `-`.
        negative: bool,
    },
    /// A quoted string with escapes resolved (doubled quote -> one quote).
    Str {
        /// Decoded content, without the delimiting quotes.
        content: String,
    },
    /// Arbitrary block data (`#n...` definite or `#0...` indefinite).
    Block {
        /// The raw payload bytes.
        data: Vec<u8>,
        /// `true` for the `#0` indefinite form.
        indefinite: bool,
    },
    /// A lexical error; scanning continues after it.
    Error {
        /// Human-readable description of the problem.
        message: String,
    },
}

impl TokKind {
    /// Short uppercase name of the token kind, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TokKind::Colon => "COLON",
            TokKind::Semicolon => "SEMICOLON",
            TokKind::Comma => "COMMA",
            TokKind::Question => "QUESTION",
            TokKind::Asterisk => "ASTERISK",
            TokKind::Hash => "HASH",
            TokKind::LParen => "LPAREN",
            TokKind::RParen => "RPAREN",
            TokKind::At => "AT",
            TokKind::Newline => "NEWLINE",
            TokKind::EndOfInput => "END_OF_INPUT",
            TokKind::Identifier { .. } => "IDENTIFIER",
            TokKind::Number { .. } => "NUMBER",
            TokKind::Str { .. } => "STRING",
            TokKind::Block { .. } => "BLOCK_DATA",
            TokKind::Error { .. } => "ERROR",
        }
    }
}

/// A lexical unit with its source position.
///
/// `offset` and `len` are byte-accurate; the splitter uses them for the
/// adjacency checks that glue `100mV` and `-INF` back together.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Kind and payload.
    pub kind: TokKind,
    /// Source text of the token. Empty for block data and end-of-input.
    pub text: String,
    /// Byte offset of the first byte.
    pub offset: usize,
    /// 1-based source line.
    pub line: usize,
    /// 1-based source column.
    pub column: usize,
    /// Token length in bytes (for strings and blocks this covers the full
    /// source form including quotes or headers).
    pub len: usize,
}

impl Token {
    /// Offset one past the last byte of the token.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Returns `true` for the end-of-input marker.
    pub fn is_end(&self) -> bool {
        matches!(self.kind, TokKind::EndOfInput)
    }

    /// Returns `true` for error tokens.
    pub fn is_error(&self) -> bool {
        matches!(self.kind, TokKind::Error { .. })
    }
}

/// Predicate deciding which bytes terminate a `#0` indefinite block.
pub type BlockTerminator = fn(u8) -> bool;

/// Default indefinite-block terminator: `\n` or `\r`.
pub fn default_block_terminator(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

/// Lexer configuration.
#[derive(Debug, Clone, Copy)]
pub struct LexerConfig {
    /// Maximum accepted block payload length. Longer blocks produce an
    /// error token instead of allocating.
    pub max_block_len: usize,
    /// Terminator predicate for `#0` indefinite blocks.
    pub block_terminator: BlockTerminator,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            max_block_len: limits::MAX_BLOCK_DATA_LEN,
            block_terminator: default_block_terminator,
        }
    }
}

/// Streaming SCPI lexer over a borrowed byte buffer.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
    peeked: Option<Token>,
    config: LexerConfig,
}

impl<'a> Lexer<'a> {
    /// Create a lexer with the default configuration.
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, LexerConfig::default())
    }

    /// Create a lexer with an explicit configuration.
    pub fn with_config(input: &'a [u8], config: LexerConfig) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            peeked: None,
            config,
        }
    }

    /// Current byte position (one past the last consumed token when no
    /// token is peeked).
    pub fn position(&self) -> usize {
        match &self.peeked {
            Some(tok) => tok.offset,
            None => self.pos,
        }
    }

    // ── Byte-level primitives ───────────────────────────────────────────

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek_byte(&self, ahead: usize) -> u8 {
        self.input.get(self.pos + ahead).copied().unwrap_or(0)
    }

    fn advance(&mut self) -> u8 {
        if self.at_end() {
            return 0;
        }
        let b = self.input[self.pos];
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        b
    }

    fn skip_inline_whitespace(&mut self) {
        while !self.at_end() {
            match self.peek_byte(0) {
                b' ' | b'\t' | b'\r' => {
                    self.advance();
                }
                _ => break,
            }
        }
    }

    // ── Token construction ──────────────────────────────────────────────

    fn token_at(&self, kind: TokKind, text: &str, start: Start) -> Token {
        Token {
            kind,
            text: text.to_string(),
            offset: start.pos,
            line: start.line,
            column: start.column,
            len: self.pos - start.pos,
        }
    }

    fn error_at(&self, message: impl Into<String>, start: Start) -> Token {
        Token {
            kind: TokKind::Error {
                message: message.into(),
            },
            text: String::new(),
            offset: start.pos,
            line: start.line,
            column: start.column,
            len: self.pos.saturating_sub(start.pos),
        }
    }

    fn mark(&self) -> Start {
        Start {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    // ── Public token interface ──────────────────────────────────────────

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token {
        if let Some(tok) = self.peeked.take() {
            return tok;
        }
        self.lex()
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> &Token {
        if self.peeked.is_none() {
            let tok = self.lex();
            self.peeked = Some(tok);
        }
        self.peeked.as_ref().unwrap()
    }

    /// Tokenize the whole input, stopping after end-of-input or the first
    /// error token.
    pub fn tokenize_all(&mut self) -> Vec<Token> {
        let mut toks = Vec::new();
        loop {
            let tok = self.next_token();
            let stop = tok.is_end() || tok.is_error();
            toks.push(tok);
            if stop {
                break;
            }
        }
        toks
    }

    // ── Main scan ───────────────────────────────────────────────────────

    fn lex(&mut self) -> Token {
        self.skip_inline_whitespace();

        let start = self.mark();
        if self.at_end() {
            return self.token_at(TokKind::EndOfInput, "", start);
        }

        let c = self.peek_byte(0);
        match c {
            b':' | b';' | b',' | b'?' | b'*' | b'(' | b')' | b'@' | b'\n' => {
                self.advance();
                let kind = match c {
                    b':' => TokKind::Colon,
                    b';' => TokKind::Semicolon,
                    b',' => TokKind::Comma,
                    b'?' => TokKind::Question,
                    b'*' => TokKind::Asterisk,
                    b'(' => TokKind::LParen,
                    b')' => TokKind::RParen,
                    b'@' => TokKind::At,
                    _ => TokKind::Newline,
                };
                let text = (c as char).to_string();
                self.token_at(kind, &text, start)
            }
            b'#' => self.read_hash_prefixed(start),
            b'"' | b'\'' => self.read_string(c, start),
            b'+' | b'-' => {
                let next = self.peek_byte(1);
                if next.is_ascii_digit() || next == b'.' {
                    self.read_number(start)
                } else {
                    // A lone sign becomes an identifier so the splitter can
                    // glue `-INF` back together by adjacency.
                    self.advance();
                    let text = (c as char).to_string();
                    self.token_at(
                        TokKind::Identifier {
                            base: text.clone(),
                            suffix: None,
                        },
                        &text,
                        start,
                    )
                }
            }
            b'.' => {
                if self.peek_byte(1).is_ascii_digit() {
                    self.read_number(start)
                } else {
                    self.advance();
                    self.error_at("Unexpected character '.'", start)
                }
            }
            _ if c.is_ascii_digit() => self.read_number(start),
            _ if c.is_ascii_alphabetic() || c == b'_' => self.read_identifier(start),
            _ => {
                self.advance();
                self.error_at(format!("Unexpected character '{}'", c as char), start)
            }
        }
    }

    // ── Identifiers ─────────────────────────────────────────────────────

    fn read_identifier(&mut self, start: Start) -> Token {
        let mut value = String::new();
        while !self.at_end() {
            let c = self.peek_byte(0);
            if c.is_ascii_alphanumeric() || c == b'_' {
                value.push(self.advance() as char);
                if value.len() > limits::MAX_IDENTIFIER_LEN {
                    return self.error_at("Identifier too long (> 255)", start);
                }
            } else {
                break;
            }
        }

        let (base, suffix) = split_numeric_suffix(&value);
        self.token_at(
            TokKind::Identifier {
                base: base.to_string(),
                suffix,
            },
            &value,
            start,
        )
    }

    // ── Numbers ─────────────────────────────────────────────────────────

    fn read_number(&mut self, start: Start) -> Token {
        let mut text = String::new();
        let mut negative = false;
        let mut is_float = false;

        match self.peek_byte(0) {
            b'+' => {
                text.push(self.advance() as char);
            }
            b'-' => {
                negative = true;
                text.push(self.advance() as char);
            }
            _ => {}
        }

        let mut has_int_part = false;
        while !self.at_end() && self.peek_byte(0).is_ascii_digit() {
            text.push(self.advance() as char);
            has_int_part = true;
        }

        if !self.at_end() && self.peek_byte(0) == b'.' {
            text.push(self.advance() as char);
            is_float = true;
            while !self.at_end() && self.peek_byte(0).is_ascii_digit() {
                text.push(self.advance() as char);
            }
        }

        if !self.at_end() && matches!(self.peek_byte(0), b'e' | b'E') {
            text.push(self.advance() as char);
            is_float = true;
            if !self.at_end() && matches!(self.peek_byte(0), b'+' | b'-') {
                text.push(self.advance() as char);
            }
            let mut has_exp_digits = false;
            while !self.at_end() && self.peek_byte(0).is_ascii_digit() {
                text.push(self.advance() as char);
                has_exp_digits = true;
            }
            if !has_exp_digits {
                return self.error_at("Expected digits after exponent", start);
            }
        }

        if !has_int_part && !is_float {
            return self.error_at("Invalid number format", start);
        }

        let Ok(value) = text.parse::<f64>() else {
            return self.error_at("Number parsing failed", start);
        };

        self.token_at(
            TokKind::Number {
                value,
                is_integer: !is_float,
                negative,
            },
            &text,
            start,
        )
    }

    // ── Strings ─────────────────────────────────────────────────────────

    fn read_string(&mut self, quote: u8, start: Start) -> Token {
        self.advance(); // opening quote

        let mut content = String::new();
        loop {
            if self.at_end() {
                return self.error_at("Unterminated string literal", start);
            }
            let c = self.peek_byte(0);
            if c == quote {
                if self.peek_byte(1) == quote {
                    content.push(quote as char);
                    self.advance();
                    self.advance();
                    continue;
                }
                self.advance(); // closing quote
                break;
            }
            if c == b'\n' || c == b'\r' {
                return self.error_at("Unterminated string literal", start);
            }
            content.push(self.advance() as char);
        }

        // `text` holds the decoded content; `len` spans the quoted source.
        self.token_at(TokKind::Str { content: content.clone() }, &content, start)
    }

    // ── `#`-prefixed forms ──────────────────────────────────────────────

    fn read_hash_prefixed(&mut self, start: Start) -> Token {
        self.advance(); // '#'

        if self.at_end() {
            return self.error_at("Unexpected end after '#'", start);
        }

        match self.peek_byte(0) {
            b'B' | b'b' => {
                self.advance();
                self.read_base_literal(start, 2, "binary")
            }
            b'H' | b'h' => {
                self.advance();
                self.read_base_literal(start, 16, "hex")
            }
            b'Q' | b'q' => {
                self.advance();
                self.read_base_literal(start, 8, "octal")
            }
            b'0' => {
                self.advance();
                self.read_indefinite_block(start)
            }
            b'1'..=b'9' => self.read_definite_block(start),
            _ => self.token_at(TokKind::Hash, "#", start),
        }
    }

    fn read_base_literal(&mut self, start: Start, radix: u32, label: &str) -> Token {
        let digit_ok = |b: u8| match radix {
            2 => matches!(b, b'0' | b'1'),
            8 => matches!(b, b'0'..=b'7'),
            _ => b.is_ascii_hexdigit(),
        };

        let mut digits = String::new();
        while !self.at_end() && digit_ok(self.peek_byte(0)) {
            digits.push(self.advance() as char);
        }

        if digits.is_empty() {
            let marker = match radix {
                2 => "#B",
                8 => "#Q",
                _ => "#H",
            };
            return self.error_at(format!("Expected {label} digits after {marker}"), start);
        }

        let Ok(value) = i64::from_str_radix(&digits, radix) else {
            let cap = label
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or('?');
            let rest = &label[1..];
            return self.error_at(format!("{cap}{rest} number overflow"), start);
        };

        let marker = match radix {
            2 => "#B",
            8 => "#Q",
            _ => "#H",
        };
        let text = format!("{marker}{digits}");
        self.token_at(
            TokKind::Number {
                value: value as f64,
                is_integer: true,
                negative: false,
            },
            &text,
            start,
        )
    }

    fn read_definite_block(&mut self, start: Start) -> Token {
        // Digit count 1..=9, then exactly that many length digits.
        let n = (self.advance() - b'0') as usize;

        let mut len_str = String::new();
        for _ in 0..n {
            if self.at_end() {
                return self.error_at("Unexpected end in block data length field", start);
            }
            if !self.peek_byte(0).is_ascii_digit() {
                return self.error_at("Expected digit in block data length field", start);
            }
            len_str.push(self.advance() as char);
        }

        let Ok(data_len) = len_str.parse::<usize>() else {
            return self.error_at(format!("Invalid block data length: {len_str}"), start);
        };

        // Length gate before any allocation.
        if data_len > self.config.max_block_len {
            return self.error_at("Block data too large (exceeds configured maximum)", start);
        }

        if self.pos + data_len > self.input.len() {
            return self.error_at(
                format!(
                    "Block data truncated: expected {} bytes, got {}",
                    data_len,
                    self.input.len() - self.pos
                ),
                start,
            );
        }

        let data = self.input[self.pos..self.pos + data_len].to_vec();
        self.pos += data_len;
        self.column += data_len; // payload may contain newlines; column is approximate here

        self.token_at(
            TokKind::Block {
                data,
                indefinite: false,
            },
            "",
            start,
        )
    }

    fn read_indefinite_block(&mut self, start: Start) -> Token {
        let mut data = Vec::new();
        while !self.at_end() {
            let b = self.peek_byte(0);
            if (self.config.block_terminator)(b) {
                break;
            }
            data.push(b);
            self.advance();
        }

        self.token_at(
            TokKind::Block {
                data,
                indefinite: true,
            },
            "",
            start,
        )
    }
}

/// Scan position snapshot used to stamp tokens.
#[derive(Debug, Clone, Copy)]
struct Start {
    pos: usize,
    line: usize,
    column: usize,
}

/// Split a raw identifier into its base letters and an optional trailing
/// decimal suffix.
///
/// The suffix absorbs only a contiguous trailing digit run and only when
/// letters precede it; a suffix outside `i32` range is treated as absent.
pub fn split_numeric_suffix(identifier: &str) -> (&str, Option<i32>) {
    let bytes = identifier.as_bytes();
    let mut i = bytes.len();
    while i > 0 && bytes[i - 1].is_ascii_digit() {
        i -= 1;
    }

    if i == bytes.len() || i == 0 {
        return (identifier, None);
    }

    match identifier[i..].parse::<i32>() {
        Ok(suffix) => (&identifier[..i], Some(suffix)),
        Err(_) => (identifier, None),
    }
}
