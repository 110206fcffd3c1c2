//! Purpose: Hold top-level CLI command dispatch for `bnconv`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Each command prints exactly one line to stdout on success.
use bnconv::api::{Align, BigNum, DEMO_LINES, FormatSpec, FormatStyle, sha512_hex};
use serde::Serialize;

use super::*;

#[derive(Serialize)]
struct RenderOutput<'a> {
    input: &'a str,
    base: u32,
    text: String,
    negative: bool,
    bits: u32,
}

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Render {
            value,
            from,
            base,
            json,
        } => {
            let parsed = parse_value(&value, from)?;
            let text = parsed.text(base)?;
            tracing::debug!(from, base, bits = parsed.num_bits(), "rendered value");
            if json {
                let output = RenderOutput {
                    input: &value,
                    base,
                    text,
                    negative: parsed.is_negative(),
                    bits: parsed.num_bits(),
                };
                let line = serde_json::to_string(&output).map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to encode json")
                        .with_source(err)
                })?;
                println!("{line}");
            } else {
                println!("{text}");
            }
            Ok(RunOutcome::ok())
        }
        Command::Format {
            value,
            style,
            from,
            width,
            precision,
            plus,
            space,
            alternate,
            zero,
            align,
            fill,
        } => {
            let parsed = parse_value(&value, from)?;
            let mut spec = FormatSpec::new(style.into());
            spec.width = width;
            spec.precision = precision;
            spec.sign_plus = plus;
            spec.sign_space = space;
            spec.alternate = alternate;
            spec.zero_pad = zero;
            spec.fill = fill;
            if let Some(align) = align {
                spec.align = align.into();
            }
            println!("{}", spec.render(parsed.as_bn_ref())?);
            Ok(RunOutcome::ok())
        }
        Command::Sha512 { text } => {
            let digest = if text.is_empty() {
                sha512_hex(DEMO_LINES)
            } else {
                sha512_hex(&text)
            };
            println!("{digest}");
            Ok(RunOutcome::ok())
        }
    }
}

fn parse_value(value: &str, from: u32) -> Result<BigNum, Error> {
    BigNum::parse(value, from).map_err(|err| match err.kind() {
        ErrorKind::Parse => err.with_hint(
            "Use digits valid for --from, or --from 0 with a 0x/0b/0o prefix.",
        ),
        _ => err,
    })
}

impl From<StyleCli> for FormatStyle {
    fn from(value: StyleCli) -> Self {
        match value {
            StyleCli::Decimal => FormatStyle::Decimal,
            StyleCli::LowerHex => FormatStyle::LowerHex,
            StyleCli::UpperHex => FormatStyle::UpperHex,
            StyleCli::Octal => FormatStyle::Octal,
            StyleCli::Binary => FormatStyle::Binary,
        }
    }
}

impl From<AlignCli> for Align {
    fn from(value: AlignCli) -> Self {
        match value {
            AlignCli::Left => Align::Left,
            AlignCli::Right => Align::Right,
            AlignCli::Center => Align::Center,
        }
    }
}
