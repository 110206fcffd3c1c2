//! Purpose: `bnconv` CLI entry point.
//! Role: Binary crate root; parses args, installs logging, runs commands.
//! Invariants: Command output goes to stdout; diagnostics and logs go to stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::ffi::OsString;
use std::io::{self, IsTerminal};

use bnconv::api::{Error, ErrorKind, to_exit_code};
use clap::{Parser, Subcommand, ValueEnum, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(std::env::args_os().collect::<Vec<OsString>>()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Run `bnconv --help` for usage."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    init_tracing(cli.log.as_deref()).map_err(|err| (err, color_mode))?;

    command_dispatch::dispatch_command(cli.command).map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "bnconv",
    version,
    about = "Render and parse arbitrary-precision integers through libcrypto",
    long_about = r#"Render and parse arbitrary-precision integers through libcrypto.

Values are held as OpenSSL BIGNUMs; every foreign text buffer is copied and
released exactly once."#,
    after_help = r#"EXAMPLES
  $ bnconv render 123456789012345678901234567890
  $ bnconv render 0xff --base 2
  $ bnconv render -42 --json
  $ bnconv format 255 x --alternate --width 10 --zero
  $ bnconv sha512"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Log filter for stderr diagnostics (e.g. debug); defaults to RUST_LOG, then warn"
    )]
    log: Option<String>,
    #[arg(
        long,
        global = true,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum StyleCli {
    #[value(name = "d")]
    Decimal,
    #[value(name = "x")]
    LowerHex,
    #[value(name = "X")]
    UpperHex,
    #[value(name = "o")]
    Octal,
    #[value(name = "b")]
    Binary,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum AlignCli {
    Left,
    Right,
    Center,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Print a value in a base between 2 and 62",
        long_about = r#"Parse VALUE and print it in another base.

Digits above 9 use a-z for 10..35 and A-Z for 36..61. No prefix is printed."#
    )]
    Render {
        #[arg(allow_hyphen_values = true, help = "Integer literal, optionally signed")]
        value: String,
        #[arg(
            long,
            default_value_t = 0,
            help = "Base of VALUE (0 detects 0x/0b/0o/0 prefixes)"
        )]
        from: u32,
        #[arg(long, default_value_t = 10, help = "Output base (2..=62)")]
        base: u32,
        #[arg(long, help = "Emit a JSON object instead of bare text")]
        json: bool,
    },
    #[command(about = "Print a value with integer formatting flags")]
    Format {
        #[arg(allow_hyphen_values = true, help = "Integer literal, optionally signed")]
        value: String,
        #[arg(value_enum, help = "Output style: d|x|X|o|b")]
        style: StyleCli,
        #[arg(long, default_value_t = 0, help = "Base of VALUE (0 detects prefixes)")]
        from: u32,
        #[arg(long, help = "Minimum field width")]
        width: Option<usize>,
        #[arg(long, help = "Minimum number of digits")]
        precision: Option<usize>,
        #[arg(long, help = "Always print a sign")]
        plus: bool,
        #[arg(long, help = "Print a space before non-negative values (--plus wins)")]
        space: bool,
        #[arg(long, help = "Add a 0x/0o/0b prefix")]
        alternate: bool,
        #[arg(long, help = "Pad with zeros after the sign and prefix")]
        zero: bool,
        #[arg(long, value_enum, help = "Alignment within the field")]
        align: Option<AlignCli>,
        #[arg(long, default_value_t = ' ', help = "Fill character for alignment padding")]
        fill: char,
    },
    #[command(
        about = "Print the SHA-512 digest of the given text",
        long_about = r#"Print the lowercase hex SHA-512 digest of TEXT arguments hashed as one stream.

Without arguments, hashes the two built-in demo lines."#
    )]
    Sha512 {
        #[arg(help = "Text to hash; arguments are concatenated without separators")]
        text: Vec<String>,
    },
}

fn init_tracing(directive: Option<&str>) -> Result<(), Error> {
    let env_filter = match directive {
        Some(directive) => EnvFilter::try_new(directive).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("invalid log filter: {directive}"))
                .with_hint("Use a level such as warn, debug or trace.")
                .with_source(err)
        })?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
    Ok(())
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Parse => "invalid number".to_string(),
        ErrorKind::Alloc => "foreign allocation failed".to_string(),
        ErrorKind::Corrupt => "corrupt data".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(offset) = err.offset() {
        inner.insert("offset".to_string(), json!(offset));
    }
    if let Some(cause) = err.source() {
        inner.insert("cause".to_string(), json!(cause.to_string()));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(offset) = err.offset() {
        lines.push(format!(
            "{} {offset}",
            colorize_label("offset:", use_color, AnsiColor::Yellow)
        ));
    }

    if let Some(cause) = err.source() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
