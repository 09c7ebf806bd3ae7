//! Purpose: Hold top-level CLI command dispatch for `textspec`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Decoding goes through `Decoder` with the alias table built from CLI flags.
//! Invariants: Error locations are reported relative to the whole document, not the selected node.

use std::fs;
use std::io::Read;
use std::path::Path;

use textspec::core::{AliasTable, Decoder};
use textspec::json::{JsonCursor, parse};

use super::*;
use crate::container_json::{alias_table_json, container_json};

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Decode {
            file,
            pointer,
            config_shape,
            pretty,
            aliases,
        } => {
            let table = alias_table(&aliases)?;
            let (input, source) = read_input(file.as_deref())?;
            let document: Value = parse::from_str(&input).map_err(|err| {
                Error::new(ErrorKind::Syntax)
                    .with_message("invalid JSON document")
                    .with_hint(parse::hint_for_error(&err, &source))
                    .with_source(err)
            })?;
            let node = select_node(&document, pointer.as_deref())?;
            tracing::debug!(
                source = %source,
                pointer = pointer.as_deref().unwrap_or(""),
                aliases = table.len(),
                "decoding node"
            );

            let mut cursor = JsonCursor::new(node);
            let container = Decoder::new(table)
                .decode(&mut cursor)
                .map_err(|err| rebase_location(err, pointer.as_deref()))?;

            let value = if config_shape {
                serde_json::to_value(&container).map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to encode container")
                        .with_source(err)
                })?
            } else {
                container_json(&container)
            };
            emit_json(&value, pretty)?;
            Ok(RunOutcome::ok())
        }
        Command::Aliases { pretty, aliases } => {
            let table = alias_table(&aliases)?;
            emit_json(&alias_table_json(&table), pretty)?;
            Ok(RunOutcome::ok())
        }
    }
}

fn alias_table(args: &AliasArgs) -> Result<AliasTable, Error> {
    let mut table = if args.no_default_aliases {
        AliasTable::empty()
    } else {
        AliasTable::standard()
    };
    for spec in &args.alias {
        let (public, canonical) = parse_alias(spec)?;
        table = table.with_alias(public, canonical);
    }
    Ok(table)
}

fn parse_alias(spec: &str) -> Result<(String, String), Error> {
    let invalid = || {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid --alias value `{spec}`"))
            .with_hint("Use --alias public=canonical, e.g. --alias json_paths=jsonPaths.")
    };
    let (public, canonical) = spec.split_once('=').ok_or_else(invalid)?;
    let (public, canonical) = (public.trim(), canonical.trim());
    if public.is_empty() || canonical.is_empty() {
        return Err(invalid());
    }
    Ok((public.to_string(), canonical.to_string()))
}

fn read_input(file: Option<&Path>) -> Result<(String, String), Error> {
    match file {
        Some(path) if path != Path::new("-") => {
            let input = fs::read_to_string(path).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message(format!("failed to read {}", path.display()))
                    .with_hint("Check the path and file permissions.")
                    .with_source(err)
            })?;
            Ok((input, path.display().to_string()))
        }
        _ => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            Ok((input, "stdin".to_string()))
        }
    }
}

fn select_node<'a>(document: &'a Value, pointer: Option<&str>) -> Result<&'a Value, Error> {
    match pointer {
        None | Some("") => Ok(document),
        Some(pointer) => document.pointer(pointer).ok_or_else(|| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("pointer `{pointer}` does not match any node"))
                .with_hint("Pointers use RFC 6901 syntax, e.g. /responses/0/text.")
        }),
    }
}

fn rebase_location(err: Error, pointer: Option<&str>) -> Error {
    let Some(prefix) = pointer.filter(|pointer| !pointer.is_empty()) else {
        return err;
    };
    let rebased = match err.location() {
        Some("(root)") => Some(prefix.to_string()),
        Some(location) if location.starts_with('/') => Some(format!("{prefix}{location}")),
        _ => None,
    };
    match rebased {
        Some(location) => err.with_location(location),
        None => err,
    }
}
