use std::fs;
use std::path::Path;

use anyhow::Context;
use newt::error::ErrorKind;
use newt::model::{Options, Width};

fn fixture(name: &str) -> anyhow::Result<String> {
    let path = Path::new("tests/fixtures").join(name);
    fs::read_to_string(&path).with_context(|| format!("Reading {}", path.display()))
}

#[test]
fn compiles_fixture_program() {
    let source = newt::preprocess::expand(&fixture("main.nwt").unwrap(), fixture).unwrap();
    let compiled = newt::compile(&source, &Options::default()).expect("valid program");

    assert_eq!(compiled.assembly.to_string(), fixture("main.asm").unwrap());
    assert_eq!(compiled.symbols.functions["print"][0].width, Width::Byte);
}

#[test]
fn function_definition_and_call() {
    let src = "dword count = 0;\ndefine bump(dword n) {\n  inc(n);\n}\nbump(count);\n";
    let compiled = newt::compile(src, &Options::default()).unwrap();

    let expected = [
        "section .text",
        "\tglobal _start",
        "\t_start:",
        "\t\tmov dword [count], 0",
        "\t\tjmp ebump",
        "\t\tbump:",
        "\t\t\tinc [n]",
        "\t\t\tret",
        "\t\tebump:",
        "\t\t\tnop",
        "\t\tmov eax, [count]",
        "\t\tmov [n], eax",
        "\t\tcall bump",
        "\t\tret",
        "section .data",
        "\tcount: dd 0",
        "\tn: dd 0",
    ];
    assert_eq!(compiled.assembly.lines().collect::<Vec<_>>(), expected);
}

#[test]
fn data_section_uses_declared_width() {
    let test_cases = vec![
        ("byte a = 1;", "\ta: db 0"),
        ("word a = 1;", "\ta: dw 0"),
        ("dword a = 1;", "\ta: dd 0"),
        ("qword a = 1;", "\ta: dq 0"),
        ("byte a = \"hi\";", "\ta: db \"hi\""),
    ];

    for (src, expected) in test_cases {
        let compiled = newt::compile(src, &Options::default()).unwrap();
        assert_eq!(compiled.assembly.data[1], expected, "compiling {src:?}");
    }
}

#[test]
fn raw_instruction_on_variable() {
    let compiled = newt::compile("byte counter = 0;\ninc(counter);", &Options::default()).unwrap();
    assert!(compiled.assembly.text.contains(&"\t\tinc [counter]".to_string()));
}

#[test]
fn goto_skips_lines() {
    // line 1 would fail to compile if it were reached
    let src = "goto 2;\nmissing = 1;\nnop();\n";
    let compiled = newt::compile(src, &Options::default()).unwrap();
    assert_eq!(compiled.assembly.text[3], "\t\tnop");
}

#[test]
fn goto_errors() {
    let err = newt::compile("nop();\ngoto 5;\n", &Options::default()).unwrap_err();
    assert_eq!(err.line, 1);
    assert_eq!(
        err.kind,
        ErrorKind::InvalidGotoTarget {
            target: "5".into(),
            lines: 2
        }
    );

    let options = Options {
        max_steps: 100,
        ..Options::default()
    };
    let err = newt::compile("nop();\ngoto 0;\n", &options).unwrap_err();
    assert_eq!(err.kind, ErrorKind::StepLimit(100));
}

#[test]
fn first_error_stops_compilation() {
    let test_cases = vec![
        ("byte a = 1;\nb = 2;\nc = 3;", 1, ErrorKind::UnknownVariable("b".into())),
        ("while (1 == 1) {\n  nop();\n", 0, ErrorKind::UnterminatedBlock),
        (
            "define f(byte x) {\n}\nf(1, 2);",
            2,
            ErrorKind::ArityMismatch {
                name: "f".into(),
                expected: 1,
                found: 2,
            },
        ),
    ];

    for (src, line, kind) in test_cases {
        let err = newt::compile(src, &Options::default()).unwrap_err();
        assert_eq!((err.line, err.kind), (line, kind), "compiling {src:?}");
    }
}

#[test]
fn syntax_errors_carry_their_line() {
    let test_cases = vec![
        (
            "nop();\nx = [rax];",
            1,
            "x = [rax];",
            ErrorKind::Lex {
                rest: "[rax];".into(),
            },
        ),
        (
            "nop();\n\n  foo bar;",
            1,
            "  foo bar;",
            ErrorKind::Parse {
                found: "`bar`".into(),
            },
        ),
    ];

    for (src, line, text, kind) in test_cases {
        let err = newt::compile(src, &Options::default()).unwrap_err();
        assert_eq!(err.line, line, "compiling {src:?}");
        assert_eq!(err.text, text);
        assert_eq!(err.kind, kind);
    }
}

#[test]
fn goto_back_into_enclosing_block_is_an_error() {
    let src = "nop();\nif (1 == 1) {\ngoto 0;\n}\n";
    let err = newt::compile(src, &Options::default()).unwrap_err();
    assert_eq!(err.line, 1);
    assert_eq!(err.text, "if (1 == 1) {");
    assert_eq!(err.kind, ErrorKind::NestingLimit(newt::processor::env::MAX_DEPTH));
}
