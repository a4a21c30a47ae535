//! CLI entry point for the mipsim simulator binary.

use std::env;
use std::ffi::OsString;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use mipsim_cli::{init_tracing, run_session, write_listing, ReportOptions, SessionOptions};
use mipsim_core::{load_file, ByteOrder, ImmediateExtension, MachineConfig, MachineState};
#[cfg(test)]
use tempfile as _;
use tracing as _;
use tracing_subscriber as _;

const USAGE_TEXT: &str = "\
Usage: mipsim <command> [options]

Commands:
  run <image> [options]     Load a program image and execute it
  disasm <image> [options]  Print a listing of the loaded program

Run options:
  -i, --interactive         Prompt before each cycle; answer q to quit
  -r, --registers           Print every register after each cycle
  -m, --memory              Print all non-zero data memory after each cycle
  -d, --debug               Log at debug level to stderr (RUST_LOG overrides)
  -n, --max-steps <count>   Stop after <count> cycles
      --hardwired-zero      Discard writes to register 0
      --sign-extend-logical Sign-extend the andi/ori immediate

Common options:
      --big-endian          Read image words most significant byte first
  -c, --count <count>       Words to list (disasm only; default: image length)
  -h, --help                Show this help message

Examples:
  mipsim run sum.bin
  mipsim run sum.bin -i -r
  mipsim disasm sum.bin
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(RunArgs),
    Disasm(DisasmArgs),
}

#[derive(Debug, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
struct RunArgs {
    input: PathBuf,
    interactive: bool,
    registers: bool,
    memory: bool,
    debug: bool,
    max_steps: Option<u64>,
    hardwired_zero: bool,
    sign_extend_logical: bool,
    big_endian: bool,
}

#[derive(Debug, PartialEq, Eq, Default)]
struct DisasmArgs {
    input: PathBuf,
    count: Option<usize>,
    big_endian: bool,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "run" => parse_run_args(args)
            .map(Command::Run)
            .map(ParseResult::Command),
        "disasm" => parse_disasm_args(args)
            .map(Command::Disasm)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_count<T: std::str::FromStr>(flag: &str, value: Option<OsString>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("missing value for {flag}"))?;
    let text = value.to_string_lossy();
    text.parse().map_err(|_| format!("invalid value for {flag}: {text}"))
}

fn set_input(input: &mut Option<PathBuf>, arg: OsString) -> Result<(), String> {
    if arg.to_string_lossy().starts_with('-') {
        return Err(format!("unknown option: {}", arg.to_string_lossy()));
    }
    if input.is_some() {
        return Err("multiple input paths provided".to_string());
    }
    *input = Some(PathBuf::from(arg));
    Ok(())
}

#[allow(clippy::while_let_on_iterator)]
fn parse_run_args(mut args: impl Iterator<Item = OsString>) -> Result<RunArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut parsed = RunArgs::default();

    while let Some(arg) = args.next() {
        let flag = arg.to_string_lossy().into_owned();
        match flag.as_str() {
            "-h" | "--help" => return Err(USAGE_TEXT.to_string()),
            "-i" | "--interactive" => parsed.interactive = true,
            "-r" | "--registers" => parsed.registers = true,
            "-m" | "--memory" => parsed.memory = true,
            "-d" | "--debug" => parsed.debug = true,
            "-n" | "--max-steps" => parsed.max_steps = Some(parse_count("-n", args.next())?),
            "--hardwired-zero" => parsed.hardwired_zero = true,
            "--sign-extend-logical" => parsed.sign_extend_logical = true,
            "--big-endian" => parsed.big_endian = true,
            _ => set_input(&mut input, arg)?,
        }
    }

    parsed.input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(parsed)
}

#[allow(clippy::while_let_on_iterator)]
fn parse_disasm_args(mut args: impl Iterator<Item = OsString>) -> Result<DisasmArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut parsed = DisasmArgs::default();

    while let Some(arg) = args.next() {
        let flag = arg.to_string_lossy().into_owned();
        match flag.as_str() {
            "-h" | "--help" => return Err(USAGE_TEXT.to_string()),
            "-c" | "--count" => parsed.count = Some(parse_count("-c", args.next())?),
            "--big-endian" => parsed.big_endian = true,
            _ => set_input(&mut input, arg)?,
        }
    }

    parsed.input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(parsed)
}

const fn byte_order(big_endian: bool) -> ByteOrder {
    if big_endian {
        ByteOrder::Big
    } else {
        ByteOrder::Little
    }
}

impl RunArgs {
    fn config(&self) -> MachineConfig {
        MachineConfig {
            logical_immediate: if self.sign_extend_logical {
                ImmediateExtension::SignExtend
            } else {
                ImmediateExtension::ZeroExtend
            },
            hardwired_zero: self.hardwired_zero,
            byte_order: byte_order(self.big_endian),
            ..MachineConfig::default()
        }
    }

    const fn session(&self) -> SessionOptions {
        SessionOptions {
            report: ReportOptions {
                print_registers: self.registers,
                print_memory: self.memory,
            },
            interactive: self.interactive,
            max_steps: self.max_steps,
        }
    }
}

fn load(config: &MachineConfig, input: &Path) -> Result<(MachineState, usize), i32> {
    let mut state = MachineState::new(config);
    match load_file(&mut state, input, config.byte_order) {
        Ok(words) => Ok((state, words)),
        Err(e) => {
            eprintln!("error: {}: {e}", input.display());
            Err(1)
        }
    }
}

fn run_run(args: &RunArgs) -> Result<i32, i32> {
    init_tracing(args.debug);
    let config = args.config();
    let (mut state, _) = load(&config, &args.input)?;

    let stdin = io::stdin();
    let mut out = BufWriter::new(io::stdout().lock());
    let end = run_session(&mut state, &config, args.session(), stdin.lock(), &mut out)
        .map_err(|e| {
            eprintln!("error: {e}");
            1
        })?;
    Ok(end.exit_code())
}

fn run_disasm(args: &DisasmArgs) -> Result<i32, i32> {
    init_tracing(false);
    let config = MachineConfig {
        byte_order: byte_order(args.big_endian),
        ..MachineConfig::default()
    };
    let (state, words) = load(&config, &args.input)?;

    let mut out = BufWriter::new(io::stdout().lock());
    write_listing(&state, args.count.unwrap_or(words), &mut out)
        .and_then(|()| out.flush())
        .map_err(|e| {
            eprintln!("error: {e}");
            1
        })?;
    Ok(0)
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Run(args))) => run_run(&args).unwrap_or_else(|code| code),
        Ok(ParseResult::Command(Command::Disasm(args))) => {
            run_disasm(&args).unwrap_or_else(|code| code)
        }
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn os(args: &[&str]) -> impl Iterator<Item = OsString> {
        args.iter()
            .map(OsString::from)
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_run_command_with_flags() {
        let result = parse_run_args(os(&[
            "prog.bin",
            "-i",
            "--registers",
            "-m",
            "-n",
            "50",
            "--hardwired-zero",
        ]))
        .expect("valid run args should parse");

        assert_eq!(
            result,
            RunArgs {
                input: PathBuf::from("prog.bin"),
                interactive: true,
                registers: true,
                memory: true,
                max_steps: Some(50),
                hardwired_zero: true,
                ..RunArgs::default()
            }
        );
    }

    #[test]
    fn run_flags_map_onto_config() {
        let args = parse_run_args(os(&["p.bin", "--sign-extend-logical", "--big-endian"]))
            .expect("parses");
        let config = args.config();
        assert_eq!(config.logical_immediate, ImmediateExtension::SignExtend);
        assert_eq!(config.byte_order, ByteOrder::Big);
        assert!(!config.hardwired_zero);
        assert_eq!(args.session(), SessionOptions::default());
    }

    #[test]
    fn parses_disasm_command() {
        let result = parse_disasm_args(os(&["prog.bin", "-c", "8"])).expect("parses");
        assert_eq!(
            result,
            DisasmArgs {
                input: PathBuf::from("prog.bin"),
                count: Some(8),
                big_endian: false,
            }
        );
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args(os(&["--help"])).expect("help should parse without error");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn rejects_unknown_command() {
        let error = parse_args(os(&["assemble"])).expect_err("unknown command should fail");
        assert!(error.contains("unknown command"));
    }

    #[test]
    fn rejects_bad_step_count() {
        let error = parse_run_args(os(&["p.bin", "-n", "many"])).expect_err("not a number");
        assert_eq!(error, "invalid value for -n: many");
        let error = parse_run_args(os(&["p.bin", "-n"])).expect_err("missing value");
        assert_eq!(error, "missing value for -n");
    }

    #[test]
    fn run_missing_input() {
        let error = parse_run_args(std::iter::empty()).expect_err("missing input should fail");
        assert!(error.contains("missing input"));
    }

    #[test]
    fn disasm_rejects_run_options() {
        let error = parse_disasm_args(os(&["p.bin", "-i"])).expect_err("run-only flag");
        assert!(error.contains("unknown option"));
    }
}
