//! Purpose: `textspec` CLI entry point.
//! Role: Binary crate root; parses args, decodes configuration nodes, emits JSON on stdout.
//! Invariants: Commands emit JSON on stdout (compact unless `--pretty`).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `core::to_exit_code`.
//! Invariants: Logs go to stderr and are filtered by `RUST_LOG` (default: warn).
use std::error::Error as StdError;
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod container_json;

use textspec::core::{Error, ErrorKind, to_exit_code};

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
    let exit_code = match run(std::env::args_os()) {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run<I>(args: I) -> Result<RunOutcome, (Error, ColorMode)>
where
    I: IntoIterator<Item = OsString>,
{
    let cli = match Cli::try_parse_from(args) {
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
                        .with_hint("Try `textspec --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing();
    let color_mode = cli.color;
    command_dispatch::dispatch_command(cli.command)
        .map_err(add_shape_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "textspec",
    version,
    about = "Decode text containers from JSON configuration documents",
    long_about = r#"Decode text containers from JSON configuration documents.

A container is either literal text ("hello"), an operation with a text payload
({"file": "body.json"}), or a template with variables
({"template": {"with": "Hi ${name}", "vars": {"name": "World"}}})."#,
    after_help = r#"EXAMPLES
  $ textspec decode response.json --pointer /response/text
  $ echo '{"template": "Hi"}' | textspec decode
  $ textspec decode config.json --alias file_path=file --pretty
  $ textspec aliases"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
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

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Decode one configuration node into a text container",
        after_help = r#"EXAMPLES
  $ textspec decode response.json
  $ textspec decode response.json --pointer /responses/0/text
  $ textspec decode - --config-shape < response.json"#
    )]
    Decode {
        #[arg(
            value_name = "FILE",
            help = "JSON document path (default: stdin; use - for stdin)",
            value_hint = ValueHint::FilePath
        )]
        file: Option<PathBuf>,
        #[arg(
            long,
            value_name = "POINTER",
            help = "JSON pointer selecting the node to decode (default: whole document)"
        )]
        pointer: Option<String>,
        #[arg(long, help = "Emit the configuration shape instead of a decoded description")]
        config_shape: bool,
        #[arg(long, help = "Pretty-print JSON output")]
        pretty: bool,
        #[command(flatten)]
        aliases: AliasArgs,
    },
    #[command(about = "Print the effective operation alias table")]
    Aliases {
        #[arg(long, help = "Pretty-print JSON output")]
        pretty: bool,
        #[command(flatten)]
        aliases: AliasArgs,
    },
}

#[derive(Args, Clone, Debug, Default)]
struct AliasArgs {
    #[arg(
        long = "alias",
        value_name = "PUBLIC=CANONICAL",
        help = "Rename template-variable operations (repeatable)"
    )]
    alias: Vec<String>,
    #[arg(long, help = "Start from an empty alias table instead of the standard one")]
    no_default_aliases: bool,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn add_shape_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::MalformedContainer => err.with_hint(
            "Use a string, or an object with exactly one operation, e.g. {\"file\": \"body.json\"}.",
        ),
        ErrorKind::UnsupportedShape => err.with_hint(
            "Only `template` accepts an object value: {\"template\": {\"with\": \"..\", \"vars\": {..}}}.",
        ),
        _ => err,
    }
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

fn emit_json(value: &Value, pretty: bool) -> Result<(), Error> {
    let encoded = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode output")
            .with_source(err)
    })?;
    println!("{encoded}");
    Ok(())
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
        ErrorKind::Io => "i/o error".to_string(),
        ErrorKind::Syntax => "invalid input document".to_string(),
        ErrorKind::MalformedContainer => "malformed text container".to_string(),
        ErrorKind::UnsupportedShape => "unsupported container shape".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(location) = err.location() {
        inner.insert("location".to_string(), json!(location));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
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
    if let Some(location) = err.location() {
        lines.push(format!(
            "{} {location}",
            colorize_label("at:", use_color, AnsiColor::Yellow)
        ));
    }
    for cause in error_causes(err) {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }
    lines.join("\n")
}
