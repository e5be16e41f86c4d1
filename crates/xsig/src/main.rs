#![forbid(unsafe_code)]

//! xsig CLI: run the Sign or Validate callout against files.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use xsig_callout::source::MESSAGE_CONTENT;
use xsig_callout::{
    var_name, ExecutionResult, MemoryStore, Properties, SignCallout, ValidateCallout, VariableStore,
};
use xsig_core::Error;

#[derive(Parser)]
#[command(
    name = "xsig",
    about = "xsig: sign and validate enveloped XML digital signatures",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a document with an enveloped signature
    Sign(Invocation),

    /// Validate the enveloped signature of a document
    Validate(Invocation),
}

#[derive(Args)]
struct Invocation {
    /// Properties file with one `name=value` option per line
    #[arg(short, long)]
    properties: Option<PathBuf>,

    /// Set or override an option (NAME=VALUE)
    #[arg(short = 'P', long = "property")]
    property: Vec<String>,

    /// Input document, stored as message.content
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Set a variable (NAME=VALUE)
    #[arg(long = "variable")]
    variable: Vec<String>,

    /// Set a variable from a file's contents (NAME=PATH)
    #[arg(long = "variable-file")]
    variable_file: Vec<String>,

    /// Where to write the resulting document (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Sign(inv) => run(inv, Mode::Sign),
        Commands::Validate(inv) => run(inv, Mode::Validate),
    };
    match code {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

#[derive(Clone, Copy)]
enum Mode {
    Sign,
    Validate,
}

fn run(inv: Invocation, mode: Mode) -> Result<i32, Error> {
    let mut properties = match &inv.properties {
        Some(path) => parse_properties(&read_file(path)?),
        None => Properties::new(),
    };
    for spec in &inv.property {
        let (name, value) = split_assignment(spec, "property")?;
        properties.insert(name.to_owned(), value.to_owned());
    }

    let store = MemoryStore::new();
    if let Some(path) = &inv.input {
        store.set(MESSAGE_CONTENT, read_file(path)?);
    }
    for spec in &inv.variable {
        let (name, value) = split_assignment(spec, "variable")?;
        store.set(name, value.to_owned());
    }
    for spec in &inv.variable_file {
        let (name, path) = split_assignment(spec, "variable-file")?;
        store.set(name, read_file(Path::new(path))?);
    }

    let result = match mode {
        Mode::Sign => SignCallout::new(properties).execute(&store),
        Mode::Validate => ValidateCallout::new(properties).execute(&store),
    };

    eprintln!("{result:?}");
    for (name, value) in store.snapshot() {
        if name.starts_with(xsig_callout::report::VAR_PREFIX) && name != var_name("stacktrace") {
            eprintln!("{name} = {value}");
        }
    }
    if let Some(trace) = store.get(&var_name("stacktrace")) {
        eprintln!("{trace}");
    }

    if result == ExecutionResult::Abort {
        return Ok(1);
    }
    if let Some(doc) = store.get(&var_name("output")).and_then(|dest| store.get(&dest)) {
        write_output(inv.output.as_deref(), doc.as_bytes())?;
    }
    let invalid = store.get(&var_name("valid")).is_some_and(|v| v == "false");
    Ok(if invalid { 2 } else { 0 })
}

/// Parse `name=value` lines. Blank lines and lines starting with `#` or
/// `!` are skipped; names and values are trimmed.
fn parse_properties(text: &str) -> Properties {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('!'))
        .filter_map(|l| l.split_once('='))
        .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
        .collect()
}

fn split_assignment<'a>(spec: &'a str, what: &str) -> Result<(&'a str, &'a str), Error> {
    spec.split_once('=')
        .filter(|(name, _)| !name.trim().is_empty())
        .map(|(name, value)| (name.trim(), value))
        .ok_or_else(|| Error::Configuration(format!("invalid {what} {spec} (expected NAME=VALUE)")))
}

// ── Utility functions ────────────────────────────────────────────────

fn read_file(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|e| {
        log::debug!("reading {}: {e}", path.display());
        Error::Io(e)
    })
}

fn write_output(path: Option<&Path>, data: &[u8]) -> Result<(), Error> {
    match path {
        Some(p) => std::fs::write(p, data).map_err(Error::Io),
        None => {
            use std::io::Write;
            std::io::stdout().write_all(data).map_err(Error::Io)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_file() {
        let props = parse_properties(
            "# sign options\n\nprivate-key = {key.pem}\n! legacy comment\nsigning-method=rsa-sha1\nnot an option\n",
        );
        assert_eq!(props.len(), 2);
        assert_eq!(props["private-key"], "{key.pem}");
        assert_eq!(props["signing-method"], "rsa-sha1");
    }

    #[test]
    fn assignments() {
        assert_eq!(split_assignment("a=b=c", "variable").unwrap(), ("a", "b=c"));
        assert!(split_assignment("=x", "variable").is_err());
        assert!(split_assignment("novalue", "property").is_err());
    }
}
