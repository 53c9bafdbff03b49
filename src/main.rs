use bytebf::commands::{dump, emit, run};
use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};
use tracing_subscriber::{EnvFilter, fmt};

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run  [OPTIONS] <FILE>...   # Translate and run each file in order
  {0} dump [OPTIONS] <FILE>...   # Print the bytecode listing of each file
  {0} emit [OPTIONS] <FILE>      # Print an equivalent C program

Run "{0} <subcommand> --help" for more info.
Set RUST_LOG=debug for translation and run diagnostics on stderr.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "bytebf", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(run::RunArgs),
    Dump(dump::DumpArgs),
    Emit(emit::EmitArgs),
}

/// Logs go to stderr so they never mix with program output.
/// `RUST_LOG` overrides the default `warn` filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bytebf"));

    init_logging();
    let cli = Cli::parse();

    let Some(command) = cli.command.filter(|_| !cli.help) else {
        print_top_usage_and_exit(&program, if cli.help { 0 } else { 2 });
    };

    let code = match command {
        Command::Run(args) => run::run(&program, args),
        Command::Dump(args) => dump::run(&program, args),
        Command::Emit(args) => emit::run(&program, args),
    };

    std::process::exit(code);
}
