use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

use doc_insight::config::init_tracing;
use doc_insight::{AppConfig, DocumentAnalyzer, VERSION};

const USAGE: &str = "\
Usage: doc-insight [--config <path>] <command>

Commands:
  analyze <file> [--seed <n>]   Extract entities and print the full response JSON
  classify <token>...           Print the category and confidence of each token
  spans <file>                  Print merged multi-token entity spans
";

struct Args {
    config: Option<PathBuf>,
    seed: Option<u64>,
    positional: Vec<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        seed: None,
        positional: Vec::new(),
    };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--seed" => {
                let seed = iter.next().context("--seed needs a number")?;
                args.seed = Some(seed.parse().with_context(|| format!("Invalid seed: {seed}"))?);
            }
            "-h" | "--help" => {
                print!("{USAGE}");
                std::process::exit(0);
            }
            _ => args.positional.push(arg),
        }
    }

    Ok(args)
}

fn main() -> Result<()> {
    init_tracing();

    let args = parse_args()?;
    let Some((command, rest)) = args.positional.split_first() else {
        eprint!("{USAGE}");
        std::process::exit(2);
    };

    if command == "version" {
        println!("doc-insight {VERSION}");
        return Ok(());
    }

    let config = AppConfig::load(args.config.as_deref())?;
    let analyzer = DocumentAnalyzer::from_config(&config)?;

    match command.as_str() {
        "analyze" => run_analyze(&analyzer, rest, args.seed),
        "classify" => run_classify(&analyzer, rest),
        "spans" => run_spans(&analyzer, rest),
        other => bail!("Unknown command: {other}\n\n{USAGE}"),
    }
}

fn read_document(rest: &[String]) -> Result<String> {
    let path = rest.first().context("Missing document path")?;
    fs::read_to_string(path).with_context(|| format!("Failed to read document: {path}"))
}

fn run_analyze(analyzer: &DocumentAnalyzer, rest: &[String], seed: Option<u64>) -> Result<()> {
    let text = read_document(rest)?;
    let response = analyzer.analyze_with_seed(&text, seed)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn run_classify(analyzer: &DocumentAnalyzer, tokens: &[String]) -> Result<()> {
    if tokens.is_empty() {
        bail!("classify needs at least one token");
    }

    let model = analyzer.model();
    for token in tokens {
        let category = model.classify(token);
        let confidence = model
            .posteriors(token)
            .into_iter()
            .find(|(c, _)| *c == category)
            .map(|(_, p)| p);

        match confidence {
            Some(p) => println!("{token}\t{category}\t{p:.3}"),
            None => println!("{token}\t{category}\t-"),
        }
    }
    Ok(())
}

fn run_spans(analyzer: &DocumentAnalyzer, rest: &[String]) -> Result<()> {
    let text = read_document(rest)?;
    for span in analyzer.spans(&text) {
        println!("{}\t{}", span.category, span.text);
    }
    Ok(())
}
