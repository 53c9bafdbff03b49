use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;

use super::{SettingsArgs, load_program, translator_for};
use crate::disasm;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct DumpArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Brainfuck source files to disassemble
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: DumpArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }
    if args.files.is_empty() {
        usage_and_exit(program, 2);
    }

    let settings = match args.settings.resolve() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{program}: {e}");
            return 2;
        }
    };
    let translator = translator_for(&settings);

    let mut stdout = io::stdout().lock();
    let mut failed = false;
    for path in &args.files {
        let Some(code) = load_program(program, path, &translator) else {
            failed = true;
            continue;
        };
        let written = writeln!(stdout, "{}\n{}", path.display(), disasm::listing(&code));
        if let Err(e) = written {
            eprintln!("{program}: failed writing listing: {e}");
            return 1;
        }
    }
    let _ = stdout.flush();
    if failed { 1 } else { 0 }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} dump [OPTIONS] <FILE>...

Description:
  Translates each file and prints its bytecode listing without running it.
  Accepts the same translation options as `run` (--max-nesting, --debug-trap).

Listing notation:
  +N / -N   add to the current cell
  >N / <N   move the tape pointer
  [T / ]T   loop branch continuing at instruction T
  . , ?     output, input, debug trap
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
