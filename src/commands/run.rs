use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use tracing::info;

use super::{SettingsArgs, load_program, translator_for};
use crate::cli_util::{format_duration, print_heading, print_run_error};
use crate::{Interpreter, Stats, Tape, disasm};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print the bytecode listing to stderr before running
    #[arg(short = 'd', long = "dump")]
    pub dump: bool,

    /// Print the wall-clock time of each run to stderr
    #[arg(short = 't', long = "time")]
    pub time: bool,

    /// Print execution statistics to stderr
    #[arg(short = 's', long = "stats")]
    pub stats: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Brainfuck source files, run in order
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
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

    // One tape for the whole batch, zeroed before every run.
    let mut tape = Tape::new(settings.tape_size).with_policy(settings.tape_policy);
    let stdout = BufWriter::new(io::stdout().lock());
    let mut vm = Interpreter::new(io::stdin().lock(), stdout)
        .eof_policy(settings.eof)
        .max_steps(settings.max_steps);
    if settings.debug_trap {
        vm.set_debug_trap(|state| {
            eprintln!(" {:4}: cell={}, ptr={}", state.pc, state.cell, state.ptr);
        });
    }

    let mut failed = 0usize;
    for path in &args.files {
        let name = path.display().to_string();
        if args.dump || args.time {
            print_heading(&name);
        }

        let Some(code) = load_program(program, path, &translator) else {
            failed += 1;
            continue;
        };
        if args.dump {
            eprintln!("{}", disasm::listing(&code));
        }

        tape.reset();
        let mut stats = Stats::default();
        let start = Instant::now();
        let result = vm.run(&code, &mut tape, Some(&mut stats));
        let elapsed = start.elapsed();

        if let Err(err) = result {
            print_run_error(program, &name, &err);
            failed += 1;
        }
        if args.time {
            eprintln!("  Time: {}", format_duration(elapsed));
        }
        if args.stats {
            eprint!("{stats}");
        }
        if args.dump || args.time {
            eprintln!();
        }
    }

    info!(files = args.files.len(), failed, "batch finished");
    let _ = io::stderr().flush();
    if failed > 0 { 1 } else { 0 }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] <FILE>...

Options:
  --dump,  -d          Print the bytecode listing to stderr before running
  --time,  -t          Print the wall-clock time of each run to stderr
  --stats, -s          Print execution statistics to stderr
  --tape-size <N>      Number of tape cells (fallback BYTEBF_TAPE_SIZE; default 30000)
  --max-nesting <N>    Reject programs with more than N loops open at once
  --max-steps <N>      Abort a run after N instructions (fallback BYTEBF_MAX_STEPS)
  --wrap               Wrap the tape pointer around instead of failing at either end
  --no-wrap            Fail at either end of the tape even if the config sets wrap
  --eof <MODE>         Cell value after `,` hits end of input: zero, unchanged or max
  --debug-trap         Treat `?` as a debug trap that prints the machine state
  --no-debug-trap      Treat `?` as a comment even if the config enables the trap
  --help,  -h          Show this help

Notes:
- Files run one after another on a freshly zeroed tape; a failing file does not stop the batch.
- Settings can also come from the [run] section of $XDG_CONFIG_HOME/bytebf.toml.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
