mod debug_report;

use anyhow::Context as _;
use proofline::{DictionaryStore, Document, PassStatus, Pipeline, PipelineConfig};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    match run(&config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

enum Input {
    Text(String),
    File(PathBuf),
    Stdin,
}

struct CliConfig {
    input: Input,
    config: Option<PathBuf>,
    dictionary: Option<(PathBuf, PathBuf)>,
    json: bool,
    verbose: bool,
    color: bool,
}

/// Runs one pass and prints it. `Ok(true)` when the text is clean.
fn run(cli: &CliConfig) -> anyhow::Result<bool> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let dictionary = match &cli.dictionary {
        Some((aff, dic)) => DictionaryStore::from_files(aff, dic),
        None => DictionaryStore::bundled(),
    };
    let pipeline = Pipeline::with_dictionary(config, Arc::new(dictionary));

    let bytes = match &cli.input {
        Input::Text(text) => text.clone().into_bytes(),
        Input::File(path) => std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?,
        Input::Stdin => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer).context("failed to read stdin")?;
            buffer
        }
    };

    let Ok(text) = std::str::from_utf8(&bytes) else {
        let report = pipeline.run_bytes(1, &bytes);
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            debug_report::print_report("", &report, cli.color);
        }
        return Ok(false);
    };

    let document = Document::new(text, 1);
    let report = if cli.verbose {
        let details = pipeline.run_verbose(&document);
        if !cli.json {
            debug_report::print_details(&details, cli.color);
        }
        details.report
    } else {
        pipeline.run(&document)
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        debug_report::print_report(text, &report, cli.color);
    }
    Ok(report.is_clean() && report.status != PassStatus::Failed)
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<Input> = None;
    let mut config = None;
    let mut aff: Option<PathBuf> = None;
    let mut dic: Option<PathBuf> = None;
    let mut json = false;
    let mut verbose = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("proofline {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--json" => json = true,
            "-v" | "--verbose" => verbose = true,
            "--config" => config = Some(PathBuf::from(expect_value(&mut args, "--config")?)),
            "--aff" => aff = Some(PathBuf::from(expect_value(&mut args, "--aff")?)),
            "--dic" => dic = Some(PathBuf::from(expect_value(&mut args, "--dic")?)),
            "--input" | "-i" => {
                let value = expect_value(&mut args, "--input")?;
                set_input(&mut input, Input::Text(value))?;
            }
            "--file" | "-f" => {
                let value = expect_value(&mut args, "--file")?;
                set_input(&mut input, Input::File(PathBuf::from(value)))?;
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.is_empty() {
                    set_input(&mut input, Input::Text(rest))?;
                }
                break;
            }
            _ if arg.starts_with("--input=") => {
                let value = arg.trim_start_matches("--input=");
                set_input(&mut input, Input::Text(value.to_string()))?;
            }
            _ if arg.starts_with("--file=") => {
                let value = arg.trim_start_matches("--file=");
                set_input(&mut input, Input::File(PathBuf::from(value)))?;
            }
            _ if arg.starts_with("--config=") => {
                config = Some(PathBuf::from(arg.trim_start_matches("--config=")));
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                set_input(&mut input, Input::Text(rest))?;
                break;
            }
        }
    }

    let dictionary = match (aff, dic) {
        (Some(aff), Some(dic)) => Some((aff, dic)),
        (None, None) => None,
        _ => return Err("error: --aff and --dic must be given together".to_string()),
    };

    let input = match input {
        Some(input) => input,
        None if io::stdin().is_terminal() => {
            return Err(format!("error: no input provided\n\n{}", help_text()));
        }
        None => Input::Stdin,
    };

    Ok(CliConfig { input, config, dictionary, json, verbose, color })
}

fn set_input(input: &mut Option<Input>, value: Input) -> Result<(), String> {
    if input.is_some() {
        return Err("error: input provided multiple times".to_string());
    }
    *input = Some(value);
    Ok(())
}

fn expect_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next().ok_or_else(|| format!("error: {flag} expects a value"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "proofline {version}

Rule-based proofreading for plain text.

Usage:
  proofline [OPTIONS] [--] <text...>
  proofline [OPTIONS] --input <text>
  proofline [OPTIONS] --file <path>
  cat notes.txt | proofline [OPTIONS]

Options:
  -i, --input <text>         Text to check. If omitted, reads remaining args
                             or stdin when no args are provided.
  -f, --file <path>          Check the contents of a file.
  --config <path>            JSON pipeline configuration (enabledRules,
                             preferredQuoteStyle, allowedWords, ...).
  --aff <path>               Affix file of a custom dictionary (needs --dic).
  --dic <path>               Word list of a custom dictionary (needs --aff).
  --json                     Print the report as JSON.
  -v, --verbose              Show rule selection and timing.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  RUST_LOG=proofline=debug   Log rule selection, dictionary loading and
                             aggregation.

Exit codes:
  0  No issues found.
  1  Issues were reported, or the input could not be analysed.
  2  Invalid arguments, configuration, or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
    )
}
