use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

use clap::Args;

use crate::cli_util::print_translate_error;
use crate::config::{ConfigError, Settings, parse_eof};
use crate::{EofPolicy, Program, TapePolicy, Translator};

pub mod dump;
pub mod emit;
pub mod run;

/// Flags that override the layered configuration.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Number of tape cells (fallback BYTEBF_TAPE_SIZE; default 30000)
    #[arg(long = "tape-size", value_name = "N")]
    pub tape_size: Option<NonZeroUsize>,

    /// Reject programs with more than N loops open at once (default unlimited)
    #[arg(long = "max-nesting", value_name = "N")]
    pub max_nesting: Option<usize>,

    /// Abort a run after N instructions (fallback BYTEBF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Wrap the tape pointer around instead of failing at either end
    #[arg(long = "wrap", overrides_with = "no_wrap")]
    pub wrap: bool,

    /// Fail at either end of the tape, even if the config file sets wrap
    #[arg(long = "no-wrap", overrides_with = "wrap")]
    pub no_wrap: bool,

    /// Cell value after `,` hits end of input: zero, unchanged or max
    #[arg(long = "eof", value_name = "MODE", value_parser = parse_eof_arg)]
    pub eof: Option<EofPolicy>,

    /// Treat `?` as a debug trap that prints the machine state to stderr
    #[arg(long = "debug-trap", overrides_with = "no_debug_trap")]
    pub debug_trap: bool,

    /// Treat `?` as a comment, even if the config file enables the trap
    #[arg(long = "no-debug-trap", overrides_with = "debug_trap")]
    pub no_debug_trap: bool,
}

impl SettingsArgs {
    /// Resolve settings: flags -> env -> config file -> defaults.
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let mut settings = Settings::load()?;
        self.apply(&mut settings);
        Ok(settings)
    }

    /// Overwrite whatever the flags set; everything else is left alone.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(size) = self.tape_size {
            settings.tape_size = size;
        }
        if let Some(limit) = self.max_nesting {
            settings.max_nesting = Some(limit);
        }
        if let Some(limit) = self.max_steps {
            settings.max_steps = Some(limit);
        }
        if self.wrap {
            settings.tape_policy = TapePolicy::Wrap;
        } else if self.no_wrap {
            settings.tape_policy = TapePolicy::Strict;
        }
        if let Some(eof) = self.eof {
            settings.eof = eof;
        }
        if self.debug_trap {
            settings.debug_trap = true;
        } else if self.no_debug_trap {
            settings.debug_trap = false;
        }
    }
}

fn parse_eof_arg(value: &str) -> Result<EofPolicy, String> {
    parse_eof(value).ok_or_else(|| format!("expected zero, unchanged or max, got {value:?}"))
}

pub(crate) fn translator_for(settings: &Settings) -> Translator {
    Translator::new()
        .max_nesting(settings.max_nesting)
        .debug_trap(settings.debug_trap)
}

/// Read and translate one file, reporting failures on stderr.
pub(crate) fn load_program(program: &str, path: &Path, translator: &Translator) -> Option<Program> {
    let name = path.display().to_string();
    let source = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("{program}: failed to read {name}: {e}");
            return None;
        }
    };
    match translator.translate(&source) {
        Ok(code) => Some(code),
        Err(err) => {
            print_translate_error(program, &name, &source, &err);
            None
        }
    }
}
