use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as CliParser;
use colored::Colorize;
use log::{error, warn};

use pas2cxx::emit::config::Config;
use pas2cxx::sema::loader::NullLoader;

#[derive(CliParser, Debug)]
#[command(author, version, about = "Translate a Pascal-dialect source file to C++17")]
struct Cli {
    /// Pascal source file to translate.
    #[arg(short, long)]
    file: PathBuf,

    /// Where to write the emitted C++ source; defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Indent width used in the emitted C++ source.
    #[arg(long, default_value_t = 4)]
    indent: usize,
}

fn main() -> Result<()> {
    simple_logger::init_with_level(log::Level::Warn).context("failed to initialize logging")?;
    let args = Cli::parse();

    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("could not read file '{}'", args.file.display()))?;

    let config = Config {
        indent_width: args.indent,
        ..Config::default()
    };
    let result = pas2cxx::compile_with_loader(&source, &NullLoader, &config);

    let mut has_errors = false;
    for diagnostic in result.diagnostics.as_slice() {
        let rendered = diagnostic.render(&source);
        if diagnostic.severity == pas2cxx::diagnostic::Severity::Error {
            has_errors = true;
            error!("{}", rendered.red());
        } else {
            warn!("{}", rendered.yellow());
        }
    }

    let Some(source_out) = result.source else {
        anyhow::bail!("translation failed, no output emitted");
    };

    match &args.output {
        Some(path) => std::fs::write(path, source_out)
            .with_context(|| format!("could not write file '{}'", path.display()))?,
        None => print!("{source_out}"),
    }

    if has_errors {
        std::process::exit(1);
    }
    Ok(())
}
