//! Integration tests for the lexical layer and command splitter working
//! together on full program messages.

use scpi_kit_core::errors::codes;
use scpi_kit_core::{
    BaseUnit, Lexer, LexerConfig, NumericKeyword, Parameter, SiPrefix, TokKind, split,
};

// ── Whole-message shapes ────────────────────────────────────────────────────

#[test]
fn mixed_message_shapes() {
    let cmds = split(b"*RST;:SOUR:FREQ 1kHz;AMPL 2.5V,MAX;:DISP:TEXT 'hi'").unwrap();
    assert_eq!(cmds.len(), 4);

    assert!(cmds[0].is_common);
    assert_eq!(cmds[0].path_string(), "*RST");

    assert_eq!(cmds[1].path_string(), ":SOUR:FREQ");
    assert_eq!(cmds[1].params.scaled(0, 0.0), 1000.0);

    assert_eq!(cmds[2].path_string(), "AMPL");
    assert_eq!(cmds[2].params.len(), 2);
    assert!(cmds[2].params.is_max(1));

    assert_eq!(cmds[3].params.at(0), &Parameter::Str("hi".into()));
}

#[test]
fn terminators_and_blank_lines() {
    let cmds = split(b"\n\n:FREQ 1\r\n\n:AMPL 2;\n").unwrap();
    assert_eq!(cmds.len(), 2);
}

#[test]
fn whole_message_parameter_menagerie() {
    let cmds = split(b":CONF 42,1.5e-3,#H1F,\"text\",ON,DOWN,100mV,(@1:3),#13xyz").unwrap();
    let p = &cmds[0].params;
    assert_eq!(p.len(), 9);
    assert_eq!(p.at(0), &Parameter::Integer(42));
    assert_eq!(p.at(1), &Parameter::Double(1.5e-3));
    assert_eq!(p.at(2), &Parameter::Integer(0x1F));
    assert_eq!(p.at(3), &Parameter::Str("text".into()));
    assert_eq!(p.at(4), &Parameter::Boolean(true));
    assert_eq!(p.at(5), &Parameter::Keyword(NumericKeyword::Down));
    assert!(p.has_unit(6));
    assert_eq!(p.unit(6), BaseUnit::Volt);
    assert_eq!(p.at(7).channel_list(), &[1, 2, 3]);
    assert_eq!(p.block(8), b"xyz");
}

// ── Unit adjacency through the whole pipeline ───────────────────────────────

#[test]
fn unit_suffix_cases() {
    let cases: &[(&str, f64, SiPrefix, BaseUnit)] = &[
        (":F 100mV", 0.1, SiPrefix::Milli, BaseUnit::Volt),
        (":F 1.5e6Hz", 1.5e6, SiPrefix::None, BaseUnit::Hertz),
        (":F 2MHz", 2e6, SiPrefix::Mega, BaseUnit::Hertz),
        (":F 3mA", 3e-3, SiPrefix::Milli, BaseUnit::Ampere),
        (":F 3MA", 3e6, SiPrefix::Mega, BaseUnit::None),
        (":F 10kOHM", 1e4, SiPrefix::Kilo, BaseUnit::Ohm),
        (":F 4uS", 4e-6, SiPrefix::Micro, BaseUnit::Second),
    ];
    for &(input, scaled, prefix, unit) in cases {
        let cmds = split(input.as_bytes()).unwrap();
        let p = cmds[0].params.at(0);
        let uv = p.unit_value().unwrap_or_else(|| panic!("{input}: no unit"));
        let rel = if scaled == 0.0 {
            (uv.scaled - scaled).abs()
        } else {
            ((uv.scaled - scaled) / scaled).abs()
        };
        assert!(rel < 1e-12, "{input}: scaled {} != {scaled}", uv.scaled);
        assert_eq!(uv.prefix, prefix, "{input}");
        assert_eq!(uv.unit, unit, "{input}");
    }
}

// ── Lexer/splitter block interplay ──────────────────────────────────────────

#[test]
fn definite_block_may_contain_separators() {
    // Payload bytes include ';', ':', '\n', and NUL; none terminate it.
    let cmds = split(b":DATA #16;:\n\x00AB;:NEXT?").unwrap();
    assert_eq!(cmds.len(), 2);
    assert_eq!(cmds[0].params.block(0), b";:\n\x00AB");
    assert!(cmds[1].is_query);
}

#[test]
fn indefinite_block_runs_to_line_end() {
    let cmds = split(b":DATA #0free form bytes\n:NEXT").unwrap();
    assert_eq!(cmds.len(), 2);
    assert_eq!(cmds[0].params.block(0), b"free form bytes");
}

#[test]
fn block_cap_is_configurable() {
    let config = LexerConfig {
        max_block_len: 8,
        ..LexerConfig::default()
    };
    let mut lexer = Lexer::with_config(b"#210ABCDEFGHIJ", config);
    let tok = lexer.next_token();
    assert!(matches!(tok.kind, TokKind::Error { .. }));
}

// ── Error positions ─────────────────────────────────────────────────────────

#[test]
fn error_positions_point_at_offender() {
    // The empty segment between the two semicolons has no identifier.
    let input = b":FREQ 1;;BAD)";
    let err = split(input).unwrap_err();
    assert_eq!(err.position, 8);
    assert_eq!(err.code, codes::SYNTAX_ERROR);
}

#[test]
fn stray_punctuation_in_params() {
    let err = split(b":FREQ 1,)").unwrap_err();
    assert_eq!(err.code, codes::SYNTAX_ERROR);
    assert!(err.message.contains("RPAREN"));
}
