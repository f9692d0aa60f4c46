use clap::Parser;
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use texpand::error;
use texpand::vm;
use tracing_subscriber::EnvFilter;

/// Texpand is a TeX-style macro expansion engine.
///
/// It reads text, expands the macros in it and prints the result.
/// See the subcommands for things it can do.
#[derive(Parser)]
#[clap(version)]
struct Cli {
    /// Maximum number of macro expansions that may be in progress at once
    #[arg(long, global = true, default_value_t = vm::Options::default().max_expansion_depth)]
    max_expansion_depth: usize,

    /// Maximum number of files and buffers that may be open at once
    #[arg(long, global = true, default_value_t = vm::Options::default().max_input_depth)]
    max_input_depth: usize,

    /// Log what the engine is doing to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// How errors are printed
    #[arg(long, global = true, value_enum, default_value_t = ErrorFormat::Human)]
    error_format: ErrorFormat,

    #[clap(subcommand)]
    sub_command: SubCommand,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum ErrorFormat {
    /// Colored, multi-line diagnostics
    Human,
    /// A single JSON object per error
    Json,
}

#[derive(Parser)]
enum SubCommand {
    Doc(Doc),
    Expand(Expand),
    Run(Run),
}

/// Print documentation for a primitive
#[derive(Parser)]
struct Doc {
    /// Name of the control sequence, without the leading backslash
    name: Option<String>,
}

/// Expand text given on the command line
#[derive(Parser)]
struct Expand {
    /// The text to expand
    text: String,
}

/// Expand a TeX file
#[derive(Parser)]
struct Run {
    /// Path to the file; `.tex` is appended if it has no extension
    file_path: PathBuf,

    /// Write the expansion to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let args: Cli = Cli::parse();
    init_tracing(args.verbose);
    let mut vm = vm::VM::new_with_options(
        texpand_stdlib::built_ins(),
        vm::Options {
            max_expansion_depth: args.max_expansion_depth,
            max_input_depth: args.max_input_depth,
        },
    );
    let result = match args.sub_command {
        SubCommand::Doc(d) => match doc(&vm, d.name) {
            Ok(()) => Ok(()),
            Err(message) => {
                eprintln!["{message}"];
                std::process::exit(1);
            }
        },
        SubCommand::Expand(expand) => vm
            .push_source("<command line>", expand.text)
            .and_then(|()| vm.read_to_string())
            .map(|output| print_output(&output, None)),
        SubCommand::Run(run_args) => run(&mut vm, run_args.file_path, run_args.output),
    };
    if let Err(err) = result {
        report_error(&err, args.error_format);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("texpand=debug,texpand_stdlib=debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn run(vm: &mut vm::VM, mut path: PathBuf, output_path: Option<PathBuf>) -> error::Result<()> {
    if path.extension().is_none() {
        path.set_extension("tex");
    }
    tracing::info!(path = %path.display(), "expanding file");
    vm.push_file(&path)?;
    let output = vm.read_to_string()?;
    print_output(&output, output_path.as_ref());
    Ok(())
}

fn print_output(output: &str, path: Option<&PathBuf>) {
    match path {
        None => {
            let mut stdout = std::io::stdout().lock();
            if let Err(err) = stdout.write_all(output.as_bytes()).and_then(|()| stdout.flush()) {
                eprintln!["Failed to write the output: {err}"];
                std::process::exit(1);
            }
        }
        Some(path) => {
            if let Err(err) = std::fs::write(path, output) {
                eprintln!["Failed to write the output to {}: {err}", path.display()];
                std::process::exit(1);
            }
        }
    }
}

fn report_error(err: &error::Error, format: ErrorFormat) {
    match format {
        ErrorFormat::Human => eprintln!["{err}"],
        ErrorFormat::Json => match serde_json::to_string(&err.summary()) {
            Ok(json) => eprintln!["{json}"],
            Err(json_err) => {
                eprintln!["{err}"];
                eprintln!["(failed to serialize the error as JSON: {json_err})"];
            }
        },
    }
}

fn doc(vm: &vm::VM, name: Option<String>) -> Result<(), String> {
    match name {
        None => {
            let mut last_prefix = None;
            for (i, name) in vm.command_names().into_iter().enumerate() {
                let new_last_prefix = name.chars().next();
                if last_prefix != new_last_prefix {
                    last_prefix = new_last_prefix;
                    if i != 0 {
                        println!();
                    }
                }
                let doc = vm.doc(name).unwrap_or("");
                let first_line = doc.split('\n').next().unwrap_or("");
                println!["\\{}  {}", name.bold(), first_line];
            }
            Ok(())
        }
        Some(name) => {
            let name = name.trim_start_matches('\\');
            match vm.doc(name) {
                Some(doc) => {
                    println!["\\{}  {}", name.bold(), doc];
                    Ok(())
                }
                None => {
                    let names = vm.command_names();
                    let mut message = format!("Unknown command \\{name}");
                    let max_distance = (name.chars().count() / 3).max(1);
                    let close_words =
                        error::spellcheck::find_close_words(&names, name, max_distance);
                    if let Some(close) = close_words.first() {
                        message.push_str(&format!("; did you mean \\{close}?"));
                    }
                    Err(message)
                }
            }
        }
    }
}
