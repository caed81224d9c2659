//! Command splitter.
//!
//! Converts one program message into a sequence of [`ParsedCommand`]s:
//! headers are resolved into path segments, parameters are typed (numbers,
//! units, strings, identifiers, blocks, channel lists), and commands are
//! separated at `;` and newlines. The splitter is fail-fast: the first
//! structural error aborts the message with a [`SplitError`] carrying a
//! SCPI command-error code and the byte position.

use crate::grammar::lexer::{Lexer, LexerConfig, TokKind, Token};
use crate::limits;
use crate::params::units::parse_unit_value;
use crate::params::{Parameter, ParameterList};
use scpi_kit_errors::codes;
use serde::Serialize;

/// One level of a command header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathSegment {
    /// Mnemonic as written, without its numeric suffix.
    pub name: String,
    /// Numeric suffix (`CH2` -> `2`), when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<i32>,
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.suffix {
            Some(s) => write!(f, "{}{}", self.name, s),
            None => f.write_str(&self.name),
        }
    }
}

/// One parsed command, before tree resolution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedCommand {
    /// The header began with `:` (resolution starts at the root).
    pub is_absolute: bool,
    /// The header ended with `?`.
    pub is_query: bool,
    /// The header began with `*` (IEEE 488.2 common command).
    pub is_common: bool,
    /// Header path. For common commands, `path[0]` holds the mnemonic.
    pub path: Vec<PathSegment>,
    /// Typed parameters in source order.
    pub params: ParameterList,
    /// Source byte span `[start, end)` of the command.
    pub span: (usize, usize),
}

impl ParsedCommand {
    /// Reassemble the header as text, for diagnostics.
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        if self.is_common {
            out.push('*');
            if let Some(first) = self.path.first() {
                out.push_str(&first.to_string());
            }
        } else {
            if self.is_absolute {
                out.push(':');
            }
            for (i, seg) in self.path.iter().enumerate() {
                if i > 0 {
                    out.push(':');
                }
                out.push_str(&seg.to_string());
            }
        }
        if self.is_query {
            out.push('?');
        }
        out
    }
}

/// A splitter failure: SCPI code, message, and source byte position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (code {code} at byte {position})")]
pub struct SplitError {
    /// SCPI error code, from the command-error range.
    pub code: i32,
    /// Human-readable description.
    pub message: String,
    /// Byte offset of the offending token.
    pub position: usize,
}

impl SplitError {
    fn new(code: i32, message: impl Into<String>, position: usize) -> Self {
        Self {
            code,
            message: message.into(),
            position,
        }
    }

    fn from_lex_token(token: &Token) -> Self {
        let message = match &token.kind {
            TokKind::Error { message } => message.clone(),
            other => format!("Unexpected token: {}", other.name()),
        };
        Self::new(lex_error_code(&message), message, token.offset)
    }
}

/// Map a lexer diagnostic onto the closest SCPI command-error code.
fn lex_error_code(message: &str) -> i32 {
    if message.contains("block data") || message.contains("Block data") {
        codes::INVALID_BLOCK_DATA
    } else if message.contains("string literal") {
        codes::INVALID_STRING_DATA
    } else if message.contains("Identifier too long") {
        codes::PROGRAM_MNEMONIC_TOO_LONG
    } else {
        codes::SYNTAX_ERROR
    }
}

/// Split a program message with the default lexer configuration.
pub fn split(input: &[u8]) -> Result<Vec<ParsedCommand>, SplitError> {
    split_with_config(input, LexerConfig::default())
}

/// Split a program message with an explicit lexer configuration.
pub fn split_with_config(
    input: &[u8],
    config: LexerConfig,
) -> Result<Vec<ParsedCommand>, SplitError> {
    Splitter {
        lexer: Lexer::with_config(input, config),
    }
    .run()
}

struct Splitter<'a> {
    lexer: Lexer<'a>,
}

impl Splitter<'_> {
    fn run(mut self) -> Result<Vec<ParsedCommand>, SplitError> {
        let mut commands = Vec::new();

        loop {
            // Skip blank separators before a command.
            while matches!(self.lexer.peek_token().kind, TokKind::Newline) {
                self.lexer.next_token();
            }
            if self.lexer.peek_token().is_end() {
                break;
            }

            commands.push(self.parse_one_command()?);

            // A command ends at ';', a newline, or end of input.
            let tok = self.lexer.peek_token();
            match tok.kind {
                TokKind::Semicolon | TokKind::Newline => {
                    self.lexer.next_token();
                }
                TokKind::EndOfInput => break,
                _ => {
                    return Err(SplitError::new(
                        codes::SYNTAX_ERROR,
                        "Expected ';' or newline or end of input",
                        tok.offset,
                    ));
                }
            }
        }

        Ok(commands)
    }

    fn parse_one_command(&mut self) -> Result<ParsedCommand, SplitError> {
        let mut cmd = ParsedCommand {
            span: (self.lexer.peek_token().offset, 0),
            ..ParsedCommand::default()
        };

        self.parse_header(&mut cmd)?;

        // Parameters follow unless the command ends immediately. SCPI
        // prefers whitespace between header and parameters, but adjacency
        // (e.g. `RANG?MIN`) is accepted as many instruments do.
        if !matches!(
            self.lexer.peek_token().kind,
            TokKind::Semicolon | TokKind::Newline | TokKind::EndOfInput
        ) {
            self.parse_parameters(&mut cmd)?;
        }

        cmd.span.1 = self.lexer.position();
        Ok(cmd)
    }

    // ── Header ──────────────────────────────────────────────────────────

    fn parse_header(&mut self, cmd: &mut ParsedCommand) -> Result<(), SplitError> {
        if matches!(self.lexer.peek_token().kind, TokKind::Asterisk) {
            cmd.is_common = true;
            self.lexer.next_token();

            let name_tok = self.lexer.next_token();
            match &name_tok.kind {
                TokKind::Identifier { .. } => {
                    // Common-command mnemonics keep their full spelling;
                    // suffix splitting does not apply.
                    cmd.path.push(PathSegment {
                        name: name_tok.text.clone(),
                        suffix: None,
                    });
                }
                _ => {
                    return Err(SplitError::new(
                        codes::SYNTAX_ERROR,
                        "Expected common command mnemonic after '*'",
                        name_tok.offset,
                    ));
                }
            }

            if matches!(self.lexer.peek_token().kind, TokKind::Question) {
                cmd.is_query = true;
                self.lexer.next_token();
            }
            return Ok(());
        }

        if matches!(self.lexer.peek_token().kind, TokKind::Colon) {
            cmd.is_absolute = true;
            self.lexer.next_token();
        }

        let mut got_any = false;
        loop {
            let id = self.lexer.next_token();
            match &id.kind {
                TokKind::Identifier { base, suffix } => {
                    cmd.path.push(PathSegment {
                        name: base.clone(),
                        suffix: *suffix,
                    });
                    got_any = true;
                }
                TokKind::Error { .. } => return Err(SplitError::from_lex_token(&id)),
                _ if !got_any => {
                    return Err(SplitError::new(
                        codes::SYNTAX_ERROR,
                        "Expected command identifier",
                        id.offset,
                    ));
                }
                _ => {
                    return Err(SplitError::new(
                        codes::SYNTAX_ERROR,
                        "Unexpected token in command header",
                        id.offset,
                    ));
                }
            }

            match self.lexer.peek_token().kind {
                TokKind::Question => {
                    cmd.is_query = true;
                    self.lexer.next_token();
                    break;
                }
                TokKind::Colon => {
                    self.lexer.next_token();
                }
                _ => break,
            }
        }

        Ok(())
    }

    // ── Parameters ──────────────────────────────────────────────────────

    fn skip_param_separators(&mut self) {
        while matches!(self.lexer.peek_token().kind, TokKind::Comma) {
            self.lexer.next_token();
        }
    }

    fn parse_parameters(&mut self, cmd: &mut ParsedCommand) -> Result<(), SplitError> {
        loop {
            if matches!(
                self.lexer.peek_token().kind,
                TokKind::Semicolon | TokKind::Newline | TokKind::EndOfInput
            ) {
                break;
            }

            self.skip_param_separators();

            if matches!(
                self.lexer.peek_token().kind,
                TokKind::Semicolon | TokKind::Newline | TokKind::EndOfInput
            ) {
                break;
            }

            self.parse_one_parameter(cmd)?;
        }
        Ok(())
    }

    fn parse_one_parameter(&mut self, cmd: &mut ParsedCommand) -> Result<(), SplitError> {
        let tok = self.lexer.peek_token();
        match &tok.kind {
            TokKind::LParen => {
                let param = self.parse_channel_list()?;
                cmd.params.push(param);
                Ok(())
            }
            TokKind::Block { .. } => {
                let tok = self.lexer.next_token();
                cmd.params.push(Parameter::from_token(&tok));
                Ok(())
            }
            TokKind::Str { .. } => {
                let tok = self.lexer.next_token();
                cmd.params.push(Parameter::from_token(&tok));
                Ok(())
            }
            TokKind::Number { .. } => {
                let num = self.lexer.next_token();
                let next = self.lexer.peek_token();

                // A unit suffix must be byte-adjacent: `100mV` is one
                // unit parameter, `100 mV` is a number and an identifier.
                if matches!(next.kind, TokKind::Identifier { .. }) && num.end() == next.offset {
                    if num.text.len() + next.text.len() > limits::MAX_COMMAND_LEN {
                        return Err(SplitError::new(
                            codes::DATA_TYPE_ERROR,
                            "Parameter too long",
                            num.offset,
                        ));
                    }
                    let combined = format!("{}{}", num.text, next.text);
                    if let Some(uv) = parse_unit_value(&combined)
                        && uv.has_unit
                    {
                        self.lexer.next_token(); // consume the unit identifier
                        cmd.params.push(Parameter::Unit(uv));
                        return Ok(());
                    }
                }

                cmd.params.push(Parameter::from_token(&num));
                Ok(())
            }
            TokKind::Identifier { .. } => {
                let first = self.lexer.next_token();
                let next = self.lexer.peek_token();

                // Glue a lone sign to an adjacent identifier so `-INF`
                // reaches keyword classification.
                if (first.text == "+" || first.text == "-")
                    && matches!(next.kind, TokKind::Identifier { .. })
                    && first.end() == next.offset
                {
                    let combined = format!("{}{}", first.text, next.text);
                    self.lexer.next_token();
                    cmd.params.push(Parameter::from_identifier(&combined));
                    return Ok(());
                }

                cmd.params.push(Parameter::from_identifier(&first.text));
                Ok(())
            }
            TokKind::Error { .. } => Err(SplitError::from_lex_token(tok)),
            other => Err(SplitError::new(
                codes::SYNTAX_ERROR,
                format!("Unexpected token in parameters: {}", other.name()),
                tok.offset,
            )),
        }
    }

    // ── Channel lists ───────────────────────────────────────────────────

    fn expect_integer(&mut self, what: &str) -> Result<(i32, usize), SplitError> {
        let tok = self.lexer.next_token();
        match tok.kind {
            TokKind::Number {
                value,
                is_integer: true,
                ..
            } => Ok((value as i32, tok.offset)),
            TokKind::Error { .. } => Err(SplitError::from_lex_token(&tok)),
            _ => Err(SplitError::new(
                codes::DATA_TYPE_ERROR,
                format!("Expected integer {what}"),
                tok.offset,
            )),
        }
    }

    fn parse_channel_list(&mut self) -> Result<Parameter, SplitError> {
        self.lexer.next_token(); // '('
        self.skip_param_separators();

        let at = self.lexer.next_token();
        if !matches!(at.kind, TokKind::At) {
            return Err(SplitError::new(
                codes::SYNTAX_ERROR,
                "Expected '@' after '(' in channel list",
                at.offset,
            ));
        }

        let mut channels: Vec<i32> = Vec::new();
        loop {
            self.skip_param_separators();

            if matches!(self.lexer.peek_token().kind, TokKind::RParen) {
                self.lexer.next_token();
                break;
            }

            let (start, start_pos) = self.expect_integer("in channel list")?;

            if matches!(self.lexer.peek_token().kind, TokKind::Colon) {
                self.lexer.next_token();
                let (end, end_pos) = self.expect_integer("range end in channel list")?;

                if end < start {
                    return Err(SplitError::new(
                        codes::ILLEGAL_PARAMETER_VALUE,
                        "Invalid channel range: end < start",
                        end_pos,
                    ));
                }

                // Widen before subtracting so e.g. (@-2000000000:2000000000)
                // cannot overflow.
                let span = i64::from(end) - i64::from(start);
                if span >= limits::MAX_CHANNEL_LIST_LEN as i64 {
                    return Err(SplitError::new(
                        codes::TOO_MUCH_DATA,
                        "Channel range too large",
                        start_pos,
                    ));
                }
                if channels.len() + (span as usize + 1) > limits::MAX_CHANNEL_LIST_LEN {
                    return Err(SplitError::new(
                        codes::TOO_MUCH_DATA,
                        "Channel range expansion too large",
                        start_pos,
                    ));
                }

                channels.extend(start..=end);
            } else {
                if channels.len() + 1 > limits::MAX_CHANNEL_LIST_LEN {
                    return Err(SplitError::new(
                        codes::TOO_MUCH_DATA,
                        "Too many channels",
                        start_pos,
                    ));
                }
                channels.push(start);
            }

            if matches!(self.lexer.peek_token().kind, TokKind::Comma) {
                self.lexer.next_token();
            }
        }

        Ok(Parameter::ChannelList(channels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::keywords::NumericKeyword;
    use crate::params::units::{BaseUnit, SiPrefix};

    fn split_ok(input: &str) -> Vec<ParsedCommand> {
        split(input.as_bytes()).unwrap_or_else(|e| panic!("{input:?} should split: {e}"))
    }

    fn split_err(input: &str) -> SplitError {
        split(input.as_bytes()).expect_err("should fail")
    }

    // ── Headers ─────────────────────────────────────────────────────────

    #[test]
    fn simple_absolute_header() {
        let cmds = split_ok(":SOUR:FREQ 100");
        assert_eq!(cmds.len(), 1);
        let cmd = &cmds[0];
        assert!(cmd.is_absolute);
        assert!(!cmd.is_query);
        assert!(!cmd.is_common);
        assert_eq!(cmd.path.len(), 2);
        assert_eq!(cmd.path[0].name, "SOUR");
        assert_eq!(cmd.path[1].name, "FREQ");
    }

    #[test]
    fn relative_header() {
        let cmds = split_ok("FREQ 100");
        assert!(!cmds[0].is_absolute);
    }

    #[test]
    fn query_header() {
        let cmds = split_ok(":MEAS:VOLT?");
        assert!(cmds[0].is_query);
    }

    #[test]
    fn header_numeric_suffixes() {
        let cmds = split_ok(":MEAS2:VOLT?");
        assert_eq!(cmds[0].path[0].name, "MEAS");
        assert_eq!(cmds[0].path[0].suffix, Some(2));
        assert_eq!(cmds[0].path[1].suffix, None);
    }

    #[test]
    fn common_command_header() {
        let cmds = split_ok("*IDN?");
        let cmd = &cmds[0];
        assert!(cmd.is_common);
        assert!(cmd.is_query);
        assert_eq!(cmd.path[0].name, "IDN");
        assert_eq!(cmd.path_string(), "*IDN?");
    }

    #[test]
    fn common_command_with_param() {
        let cmds = split_ok("*ESE 32");
        assert!(cmds[0].is_common);
        assert!(!cmds[0].is_query);
        assert_eq!(cmds[0].params.int(0, 0), 32);
    }

    #[test]
    fn semicolon_chain() {
        let cmds = split_ok(":SOUR:FREQ 1000;AMPL 2.5;:SYST:ERR?");
        assert_eq!(cmds.len(), 3);
        assert!(cmds[0].is_absolute);
        assert!(!cmds[1].is_absolute);
        assert!(cmds[2].is_absolute);
    }

    #[test]
    fn newline_separates_commands() {
        let cmds = split_ok(":FREQ 1\n:AMPL 2\n");
        assert_eq!(cmds.len(), 2);
    }

    #[test]
    fn spans_cover_commands() {
        let input = ":FREQ 1;:AMPL 2";
        let cmds = split_ok(input);
        assert_eq!(cmds[0].span.0, 0);
        assert!(cmds[0].span.1 <= input.find(';').unwrap() + 1);
        assert_eq!(cmds[1].span.0, input.find(";:").unwrap() + 1);
    }

    #[test]
    fn header_errors() {
        assert_eq!(split_err("*123").code, codes::SYNTAX_ERROR);
        assert_eq!(split_err(":").code, codes::SYNTAX_ERROR);
        assert_eq!(split_err(":FREQ:;").code, codes::SYNTAX_ERROR);
    }

    // ── Parameters ──────────────────────────────────────────────────────

    #[test]
    fn numeric_parameters() {
        let cmds = split_ok(":SOUR:LIST 1,2.5,-3");
        let p = &cmds[0].params;
        assert_eq!(p.len(), 3);
        assert_eq!(p.at(0), &Parameter::Integer(1));
        assert_eq!(p.at(1), &Parameter::Double(2.5));
        assert_eq!(p.at(2), &Parameter::Integer(-3));
    }

    #[test]
    fn unit_parameter_adjacent() {
        let cmds = split_ok(":SOUR:FREQ 1MHz");
        let p = cmds[0].params.at(0);
        assert!(p.has_unit());
        assert_eq!(p.base_unit(), BaseUnit::Hertz);
        assert_eq!(p.si_prefix(), SiPrefix::Mega);
        assert_eq!(p.to_base_unit(), 1e6);
    }

    #[test]
    fn unit_requires_adjacency() {
        // With a space, `mV` is a separate identifier parameter.
        let cmds = split_ok(":SOUR:VOLT 100 mV");
        let p = &cmds[0].params;
        assert_eq!(p.len(), 2);
        assert_eq!(p.at(0), &Parameter::Integer(100));
        assert_eq!(p.at(1), &Parameter::Identifier("mV".into()));
    }

    #[test]
    fn adjacent_non_unit_identifier_stays_separate() {
        let cmds = split_ok(":SOUR:VOLT 5XYZ");
        let p = &cmds[0].params;
        assert_eq!(p.len(), 2);
        assert_eq!(p.at(0), &Parameter::Integer(5));
        assert_eq!(p.at(1), &Parameter::Identifier("XYZ".into()));
    }

    #[test]
    fn string_parameter() {
        let cmds = split_ok(":DISP:TEXT \"hello, world\"");
        assert_eq!(cmds[0].params.at(0), &Parameter::Str("hello, world".into()));
    }

    #[test]
    fn boolean_and_keyword_parameters() {
        let cmds = split_ok(":OUTP ON;:VOLT MIN");
        assert_eq!(cmds[0].params.at(0), &Parameter::Boolean(true));
        assert_eq!(
            cmds[1].params.at(0),
            &Parameter::Keyword(NumericKeyword::Minimum)
        );
    }

    #[test]
    fn negative_infinity_glued() {
        let cmds = split_ok(":SOUR:VOLT -INF");
        assert_eq!(
            cmds[0].params.at(0),
            &Parameter::Keyword(NumericKeyword::InfinityNeg)
        );
    }

    #[test]
    fn sign_requires_adjacency_for_glue() {
        let cmds = split_ok(":SOUR:VOLT - INF");
        let p = &cmds[0].params;
        assert_eq!(p.len(), 2);
        assert_eq!(p.at(0), &Parameter::Identifier("-".into()));
        assert_eq!(
            p.at(1),
            &Parameter::Keyword(NumericKeyword::InfinityPos)
        );
    }

    #[test]
    fn block_parameter() {
        let cmds = split_ok(":DATA:UPL #15HELLO");
        assert_eq!(cmds[0].params.at(0), &Parameter::Block(b"HELLO".to_vec()));
    }

    #[test]
    fn query_with_adjacent_parameter() {
        let cmds = split_ok(":SENS:RANG?MAX");
        assert!(cmds[0].is_query);
        assert_eq!(
            cmds[0].params.at(0),
            &Parameter::Keyword(NumericKeyword::Maximum)
        );
    }

    #[test]
    fn base_prefixed_number_parameter() {
        let cmds = split_ok(":SOUR:PATT #HFF,#B101");
        assert_eq!(cmds[0].params.at(0), &Parameter::Integer(255));
        assert_eq!(cmds[0].params.at(1), &Parameter::Integer(5));
    }

    // ── Channel lists ───────────────────────────────────────────────────

    #[test]
    fn channel_list_single_entries() {
        let cmds = split_ok(":ROUT:CLOS (@1,3,5)");
        assert_eq!(cmds[0].params.at(0).channel_list(), &[1, 3, 5]);
    }

    #[test]
    fn channel_list_ranges_expand() {
        let cmds = split_ok(":ROUT:CLOS (@1:4,10)");
        assert_eq!(cmds[0].params.at(0).channel_list(), &[1, 2, 3, 4, 10]);
    }

    #[test]
    fn channel_list_empty() {
        let cmds = split_ok(":ROUT:CLOS (@)");
        assert!(cmds[0].params.at(0).channel_list().is_empty());
    }

    #[test]
    fn channel_list_reversed_range_rejected() {
        let err = split_err(":ROUT:CLOS (@5:2)");
        assert_eq!(err.code, codes::ILLEGAL_PARAMETER_VALUE);
    }

    #[test]
    fn channel_list_expansion_capped() {
        let err = split_err(":ROUT:CLOS (@1:2000000)");
        assert_eq!(err.code, codes::TOO_MUCH_DATA);
    }

    #[test]
    fn channel_list_overflow_safe_range() {
        let err = split_err(":ROUT:CLOS (@-2000000000:2000000000)");
        assert_eq!(err.code, codes::TOO_MUCH_DATA);
    }

    #[test]
    fn channel_list_type_errors() {
        assert_eq!(split_err(":ROUT (@1.5)").code, codes::DATA_TYPE_ERROR);
        assert_eq!(split_err(":ROUT (1,2)").code, codes::SYNTAX_ERROR);
    }

    // ── Lexer-error passthrough ─────────────────────────────────────────

    #[test]
    fn lexical_errors_carry_positions() {
        let err = split_err(":DISP:TEXT \"unterminated");
        assert_eq!(err.code, codes::INVALID_STRING_DATA);
        assert_eq!(err.position, 11);

        let err = split_err(":DATA #15AB");
        assert_eq!(err.code, codes::INVALID_BLOCK_DATA);
    }

    #[test]
    fn empty_input_yields_no_commands() {
        assert!(split_ok("").is_empty());
        assert!(split_ok("\n\n").is_empty());
    }
}
