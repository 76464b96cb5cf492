// Command-line interface for blockdoc
//
// This binary is a thin shell over the blockdoc-babel library: it reads files, picks formats and
// prints what the library returns. Every conversion lives in the library.
//
// Converting:
//
// The conversion needs a to and from pair. The from is auto-detected from the file extension,
// while being overwrittable by an explicit --from flag.
// Usage:
//  blockdoc <input> --to <format> [--from <format>] [--output <file>]          - Convert between formats (default)
//  blockdoc convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  blockdoc clipboard <input> (--block <id> | --range <from>:<to> | --cells <table>:<top>:<left>:<bottom>:<right>)
//  blockdoc list-formats                                                        - List available formats
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix. Keys naming a configuration setting
// (bullet-marker, list-indent, emphasis-marker, id-strategy) override it; the rest go to the
// target format.
// Example:
//  blockdoc doc.md --to html --extra-simplify-blocks false

use blockdoc_babel::clipboard::{CellRange, ClipboardExporter, ClipboardPayload, Selection};
use blockdoc_babel::doc::{blocks_to_doc, find_block_pos, Node};
use blockdoc_babel::model::Block;
use blockdoc_babel::{FormatRegistry, FormatSettings};
use blockdoc_config::{BlockdocConfig, Loader};
use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command, ValueHint};
use log::{debug, LevelFilter};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

const SUBCOMMANDS: &[&str] = &["convert", "clipboard", "list-formats", "help"];

/// Extras that are configuration keys rather than format options.
const CONFIG_EXTRAS: &[(&str, &str)] = &[
    ("bullet-marker", "markdown.bullet_marker"),
    ("list-indent", "markdown.list_indent"),
    ("emphasis-marker", "markdown.emphasis_marker"),
    ("id-strategy", "ids.strategy"),
];

/// Splits `--extra-<key> [value]` (or `--extras-<key>`) out of the raw args.
///
/// A key followed by another flag, or by nothing, is a boolean set to "true".
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned = Vec::new();
    let mut extras = HashMap::new();
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        let key = arg
            .strip_prefix("--extra-")
            .or_else(|| arg.strip_prefix("--extras-"));
        let Some(key) = key else {
            cleaned.push(arg.clone());
            continue;
        };
        let value = match iter.peek() {
            Some(next) if !next.starts_with('-') => iter.next().cloned(),
            _ => None,
        };
        extras.insert(key.to_string(), value.unwrap_or_else(|| "true".to_string()));
    }

    (cleaned, extras)
}

fn build_cli() -> Command {
    Command::new("blockdoc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert block documents between HTML, Markdown and JSON")
        .long_about(
            "blockdoc converts block-structured documents between formats and shows what the\n\
            clipboard would receive for a selection.\n\n\
            Commands:\n  \
            - convert:      Transform between document formats (default)\n  \
            - clipboard:    Export a selection as internal HTML, external HTML and Markdown\n  \
            - list-formats: Show the available formats\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            blockdoc notes.md --to html                  # Markdown to HTML (stdout)\n  \
            blockdoc notes.json --to markdown -o out.md  # Block JSON to Markdown file\n  \
            blockdoc clipboard notes.json --block abc    # Copy one block",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a blockdoc.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log more (repeat for more detail)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between different formats.\n\n\
                    Supported formats:\n  \
                    - html:           Semantic HTML (.html, .htm)\n  \
                    - blocknote-html: Editor-internal HTML, keeps block ids\n  \
                    - markdown:       Markdown (.md, .markdown)\n  \
                    - json:           Block tree JSON (.json)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("clipboard")
                .about("Export a selection the way a copy would")
                .long_about(
                    "Loads a document, selects part of it and prints the three clipboard\n\
                    payloads: internal-html, text/html and text/plain (Markdown).\n\n\
                    Positions count like the editor does: every block opens and closes\n\
                    three nested nodes, and each character counts one.\n\n\
                    Examples:\n  \
                    blockdoc clipboard doc.json --block intro\n  \
                    blockdoc clipboard doc.json --range 5:14\n  \
                    blockdoc clipboard doc.json --cells prices:0:0:1:2",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("block")
                        .long("block")
                        .value_name("ID")
                        .help("Select a whole block"),
                )
                .arg(
                    Arg::new("range")
                        .long("range")
                        .value_name("FROM:TO")
                        .help("Select a text range by document position"),
                )
                .arg(
                    Arg::new("cells")
                        .long("cells")
                        .value_name("TABLE:TOP:LEFT:BOTTOM:RIGHT")
                        .help("Select table cells; bottom and right are exclusive"),
                )
                .group(
                    ArgGroup::new("selection")
                        .args(["block", "range", "cells"])
                        .required(true),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the payloads as a JSON object keyed by clipboard slot")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("list-formats").about("List available formats"))
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A leading file path means the implied convert subcommand.
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_logging(matches.get_count("verbose"));

    let overrides = take_config_overrides(&mut extra_params);
    let config = load_cli_config(
        matches.get_one::<String>("config").map(|s| s.as_str()),
        &overrides,
    );
    let settings = FormatSettings::from(&config);

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = required(sub_matches, "input");
            let to = required(sub_matches, "to");
            let registry = FormatRegistry::with_settings(settings);
            let from = source_format(&registry, sub_matches, input);
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(&registry, input, &from, to, output, &extra_params);
        }
        Some(("clipboard", sub_matches)) => {
            let input = required(sub_matches, "input");
            handle_clipboard_command(settings, sub_matches, input);
        }
        Some(("list-formats", _)) => handle_list_formats_command(),
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Default level is warn; `RUST_LOG` can change it, `-v` raises it.
fn init_logging(verbosity: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbosity {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Info);
        }
        2 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.format_timestamp(None).init();
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    match matches.get_one::<String>(name) {
        Some(value) => value.as_str(),
        None => fail(&format!("missing required argument '{name}'")),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

/// `--from`, or the format registered for the input's extension.
fn source_format(registry: &FormatRegistry, matches: &ArgMatches, input: &str) -> String {
    if let Some(from) = matches.get_one::<String>("from") {
        return from.clone();
    }
    match registry.detect_format_from_filename(input) {
        Some(detected) => detected,
        None => {
            eprintln!("Error: Could not detect format from filename '{input}'");
            eprintln!("Please specify --from explicitly");
            std::process::exit(1);
        }
    }
}

fn read_blocks(registry: &FormatRegistry, input: &str, from: &str) -> Vec<Block> {
    if let Err(e) = registry.get(from) {
        fail(&e.to_string());
    }
    let source = fs::read_to_string(input).unwrap_or_else(|e| {
        fail(&format!("reading file '{input}': {e}"));
    });
    registry.parse(&source, from).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    })
}

fn handle_convert_command(
    registry: &FormatRegistry,
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
) {
    if let Err(e) = registry.get(to) {
        fail(&e.to_string());
    }
    let blocks = read_blocks(registry, input, from);
    debug!("converting {input}: {from} -> {to}");

    let result = registry
        .serialize_with_options(&blocks, to, extra_params)
        .unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });

    match output {
        Some(path) => fs::write(path, result).unwrap_or_else(|e| {
            fail(&format!("writing file '{path}': {e}"));
        }),
        None => print!("{result}"),
    }
}

fn handle_clipboard_command(settings: FormatSettings, matches: &ArgMatches, input: &str) {
    let schema = Arc::clone(&settings.schema);
    let deps = Arc::clone(&settings.deps);
    let markdown = settings.markdown.clone();
    let registry = FormatRegistry::with_settings(settings);

    let from = source_format(&registry, matches, input);
    let blocks = read_blocks(&registry, input, &from);
    let doc = blocks_to_doc(&blocks, &schema).unwrap_or_else(|e| fail(&e.to_string()));
    let selection = selection_from_args(&doc, matches).unwrap_or_else(|e| fail(&e));

    let payload = ClipboardExporter::new(schema, deps, markdown)
        .export_selection(&doc, &selection)
        .unwrap_or_else(|e| {
            eprintln!("Export error: {e}");
            std::process::exit(1);
        });

    if matches.get_flag("json") {
        print_payload_json(&payload);
    } else {
        for (slot, data) in payload.entries() {
            println!("--- {slot} ---");
            println!("{}", data.trim_end_matches('\n'));
        }
    }
}

fn print_payload_json(payload: &ClipboardPayload) {
    let object: serde_json::Map<String, serde_json::Value> = payload
        .entries()
        .iter()
        .map(|(slot, data)| (slot.to_string(), serde_json::Value::from(*data)))
        .collect();
    match serde_json::to_string_pretty(&object) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(&e.to_string()),
    }
}

fn selection_from_args(doc: &Node, matches: &ArgMatches) -> Result<Selection, String> {
    if let Some(id) = matches.get_one::<String>("block") {
        return block_selection(doc, id);
    }
    if let Some(range) = matches.get_one::<String>("range") {
        return parse_range(range);
    }
    if let Some(cells) = matches.get_one::<String>("cells") {
        return parse_cells(doc, cells);
    }
    Err("one of --block, --range or --cells is required".to_string())
}

fn block_selection(doc: &Node, id: &str) -> Result<Selection, String> {
    find_block_pos(doc, id)
        .map(Selection::node)
        .ok_or_else(|| format!("no block with id '{id}'"))
}

fn parse_position(raw: &str, what: &str) -> Result<usize, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("invalid {what} '{raw}', expected a number"))
}

/// `FROM:TO`, either order.
fn parse_range(raw: &str) -> Result<Selection, String> {
    let (from, to) = raw
        .split_once(':')
        .ok_or_else(|| format!("invalid range '{raw}', expected FROM:TO"))?;
    Ok(Selection::text(
        parse_position(from, "position")?,
        parse_position(to, "position")?,
    ))
}

/// `TABLE:TOP:LEFT:BOTTOM:RIGHT`, where TABLE is the id of the table block.
fn parse_cells(doc: &Node, raw: &str) -> Result<Selection, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [table, top, left, bottom, right] = parts.as_slice() else {
        return Err(format!(
            "invalid cells '{raw}', expected TABLE:TOP:LEFT:BOTTOM:RIGHT"
        ));
    };
    let block_pos =
        find_block_pos(doc, table).ok_or_else(|| format!("no block with id '{table}'"))?;
    Ok(Selection::Cell(CellRange {
        table_pos: block_pos + 1,
        top: parse_position(top, "row")?,
        left: parse_position(left, "column")?,
        bottom: parse_position(bottom, "row")?,
        right: parse_position(right, "column")?,
    }))
}

fn handle_list_formats_command() {
    let registry = FormatRegistry::default();
    println!("Available formats:\n");
    for name in registry.list_formats() {
        let Ok(format) = registry.get(&name) else {
            continue;
        };
        let mut directions = Vec::new();
        if format.supports_parsing() {
            directions.push("parse");
        }
        if format.supports_serialization() {
            directions.push("serialize");
        }
        let extensions = format
            .file_extensions()
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "  {name:<16} {:<16} {:<18} {}",
            directions.join(", "),
            extensions,
            format.description()
        );
    }
}

fn load_cli_config(explicit_path: Option<&str>, overrides: &[(&str, String)]) -> BlockdocConfig {
    let loader = Loader::new().with_optional_file("blockdoc.toml");
    let mut loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };
    for (key, value) in overrides {
        loader = loader.set_override(key, value.as_str()).unwrap_or_else(|err| {
            fail(&format!("invalid override for {key}: {err}"));
        });
    }

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// Removes extras that name configuration settings, returning them as config keys.
fn take_config_overrides(extras: &mut HashMap<String, String>) -> Vec<(&'static str, String)> {
    CONFIG_EXTRAS
        .iter()
        .filter_map(|(flag, key)| extras.remove(*flag).map(|value| (*key, value)))
        .collect()
}
