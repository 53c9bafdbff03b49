use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;

use super::{SettingsArgs, load_program, translator_for};
use crate::codegen::{EmitOptions, emit_c};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct EmitArgs {
    /// Write the C source to PATH instead of stdout
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Brainfuck source file
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: EmitArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }
    let Some(path) = args.file else {
        usage_and_exit(program, 2);
    };

    let settings = match args.settings.resolve() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{program}: {e}");
            return 2;
        }
    };
    let Some(code) = load_program(program, &path, &translator_for(&settings)) else {
        return 1;
    };

    let opts = EmitOptions {
        tape_size: settings.tape_size,
        tape: settings.tape_policy,
        eof: settings.eof,
    };
    let source = emit_c(&code, &opts);
    let written = match &args.output {
        Some(out) => fs::write(out, source),
        None => io::stdout().lock().write_all(source.as_bytes()),
    };
    if let Err(e) = written {
        eprintln!("{program}: failed writing C source: {e}");
        return 1;
    }
    0
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} emit [OPTIONS] <FILE>
  {0} emit [OPTIONS] --output <PATH> <FILE>

Description:
  Translates FILE and prints an equivalent C program. Tape size, --wrap/--no-wrap
  and --eof are baked into the generated source.

Examples:
    {0} emit hello.bf > hello.c && cc -O2 -o hello hello.c
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
