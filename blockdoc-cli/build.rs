use clap::{Arg, ArgAction, ArgGroup, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the command tree in src/main.rs, which build scripts cannot import.
fn build_cli() -> Command {
    let input = || {
        Arg::new("input")
            .help("Input file path")
            .required(true)
            .index(1)
            .value_hint(ValueHint::FilePath)
    };
    let from = || {
        Arg::new("from")
            .long("from")
            .help("Source format")
            .value_parser(["html", "blocknote-html", "markdown", "json"])
    };

    Command::new("blockdoc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert block documents between HTML, Markdown and JSON")
        .arg(
            Arg::new("config")
                .long("config")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .arg(input())
                .arg(from())
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .value_parser(["html", "blocknote-html", "markdown", "json"]),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("clipboard")
                .arg(input())
                .arg(from())
                .arg(Arg::new("block").long("block"))
                .arg(Arg::new("range").long("range"))
                .arg(Arg::new("cells").long("cells"))
                .group(ArgGroup::new("selection").args(["block", "range", "cells"]))
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        )
        .subcommand(Command::new("list-formats"))
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = build_cli();

    generate_to(Bash, &mut cmd, "blockdoc", &outdir)?;
    generate_to(Zsh, &mut cmd, "blockdoc", &outdir)?;
    generate_to(Fish, &mut cmd, "blockdoc", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
