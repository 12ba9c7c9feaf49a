// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! rexictl: command-line driver for the rexi codec.
//!
//! Encodes XML files into the binary interchange format, decodes them
//! back, or does both in one pass to check the round trip.

use std::fs;
use std::process::ExitCode;

use rexi::{
    documents_eq, encode_document, parse_str, to_xml_string, Align, Document, DomBuilder,
    Options, ParseOptions, Parser, Preserve, Writer,
};

const USAGE: &str = "\
rexictl - EXI codec driver

USAGE:
    rexictl <encode|decode|roundtrip> -i <input> [-o <output>] [flags]

FLAGS:
    -i <path>            input file (XML for encode, EXI for decode)
    -o <path>            output file (stdout when omitted)
    --include-cookie     write the $EXI cookie (encode)
    --include-options    write the options document (encode)
    --byte-aligned       byte-aligned body events
    --pre-compression    pre-compression alignment
    --strict             strict mode
    --fragment           fragment stream
    --self-contained     self-contained elements
    --preserve <name>    comments|pis|dtd|prefixes|lexical (repeatable)
    -h, --help           this text
";

enum Command {
    Encode,
    Decode,
    Roundtrip,
}

struct Cli {
    command: Command,
    input: String,
    output: Option<String>,
    include_cookie: bool,
    include_options: bool,
    options: Options,
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        print!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    match parse_args(&args).and_then(run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("rexictl: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: &[String]) -> Result<Cli, String> {
    let mut iter = args.iter();
    let command = match iter.next().map(String::as_str) {
        Some("encode") => Command::Encode,
        Some("decode") => Command::Decode,
        Some("roundtrip") => Command::Roundtrip,
        Some(other) => return Err(format!("unknown command '{}'", other)),
        None => return Err(format!("missing command\n{}", USAGE)),
    };

    let mut input = None;
    let mut output = None;
    let mut include_cookie = false;
    let mut include_options = false;
    let mut options = Options::default();
    let mut preserve = Preserve::NONE;

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-i" => input = Some(next_value(&mut iter, "-i")?),
            "-o" => output = Some(next_value(&mut iter, "-o")?),
            "--include-cookie" => include_cookie = true,
            "--include-options" => include_options = true,
            "--byte-aligned" => {
                options.set_alignment(Align::ByteAligned).map_err(|e| e.to_string())?;
            }
            "--pre-compression" => {
                options.set_alignment(Align::PreCompression).map_err(|e| e.to_string())?;
            }
            "--strict" => {
                options.set_strict(true).map_err(|e| e.to_string())?;
            }
            "--fragment" => {
                options.set_fragment(true);
            }
            "--self-contained" => {
                options.set_self_contained(true).map_err(|e| e.to_string())?;
            }
            "--preserve" => {
                let name = next_value(&mut iter, "--preserve")?;
                preserve.insert(match name.as_str() {
                    "comments" => Preserve::COMMENTS,
                    "pis" => Preserve::PIS,
                    "dtd" => Preserve::DTD,
                    "prefixes" => Preserve::PREFIXES,
                    "lexical" => Preserve::LEXICAL_VALUES,
                    other => return Err(format!("unknown preserve option '{}'", other)),
                });
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    options.set_preserve(preserve).map_err(|e| e.to_string())?;

    let input = input.ok_or_else(|| format!("missing -i <input>\n{}", USAGE))?;
    Ok(Cli { command, input, output, include_cookie, include_options, options })
}

fn next_value(iter: &mut std::slice::Iter<'_, String>, flag: &str) -> Result<String, String> {
    iter.next()
        .cloned()
        .ok_or_else(|| format!("{} needs a value", flag))
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Encode => {
            let text = fs::read_to_string(&cli.input)
                .map_err(|err| format!("{}: {}", cli.input, err))?;
            let bytes = encode(&text, &cli)?;
            emit_bytes(&cli.output, &bytes)
        }
        Command::Decode => {
            let bytes =
                fs::read(&cli.input).map_err(|err| format!("{}: {}", cli.input, err))?;
            let doc = decode(&bytes, &cli)?;
            emit_text(&cli.output, &to_xml_string(&doc))
        }
        Command::Roundtrip => {
            let text = fs::read_to_string(&cli.input)
                .map_err(|err| format!("{}: {}", cli.input, err))?;
            let source = parse_str(&text, &ParseOptions::default())
                .map_err(|err| err.to_string())?;
            let bytes = encode(&text, &cli)?;
            let decoded = decode(&bytes, &cli)?;
            if !documents_eq(&source, &decoded) {
                return Err("round trip mismatch".to_owned());
            }
            eprintln!(
                "rexictl: {} bytes XML -> {} bytes EXI, round trip ok",
                text.len(),
                bytes.len()
            );
            emit_text(&cli.output, &to_xml_string(&decoded))
        }
    }
}

fn encode(text: &str, cli: &Cli) -> Result<Vec<u8>, String> {
    let doc = parse_str(text, &ParseOptions::default()).map_err(|err| err.to_string())?;
    // Literal coding can only grow by the length prefixes, never by 4x.
    let mut buf = vec![0u8; text.len() * 4 + 4096];
    let mut writer = Writer::with_options(&mut buf, cli.options.clone());
    writer
        .write_header(cli.include_cookie, cli.include_options)
        .map_err(|err| err.to_string())?;
    encode_document(&mut writer, &doc).map_err(|err| err.to_string())?;
    let bytes = writer.finalize().map_err(|err| err.to_string())?.to_vec();
    Ok(bytes)
}

fn decode(bytes: &[u8], cli: &Cli) -> Result<Document<'static>, String> {
    let mut parser = Parser::with_options(DomBuilder::new(), bytes, cli.options.clone());
    parser.parse_header(true).map_err(|err| err.to_string())?;
    parser.parse_all().map_err(|err| err.to_string())?;
    Ok(parser.into_sink().into_document())
}

fn emit_bytes(output: &Option<String>, bytes: &[u8]) -> Result<(), String> {
    match output {
        Some(path) => fs::write(path, bytes).map_err(|err| format!("{}: {}", path, err)),
        None => {
            use std::io::Write;
            std::io::stdout()
                .write_all(bytes)
                .map_err(|err| err.to_string())
        }
    }
}

fn emit_text(output: &Option<String>, text: &str) -> Result<(), String> {
    match output {
        Some(path) => fs::write(path, text).map_err(|err| format!("{}: {}", path, err)),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}
