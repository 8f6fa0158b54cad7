// subc: evaluator for a small subset of C

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use subc::interpreter::constants::DEFAULT_MEMORY_LIMIT;
use subc::ui::App;
use subc::{compile, Interpreter};

/// Command-line options
struct Options {
    file: String,
    tui: bool,
    calls: Vec<String>,
    verbose: bool,
}

fn usage(program_name: &str) {
    eprintln!("Usage: {} <file.c> [--tui] [--call NAME]... [--verbose]", program_name);
    eprintln!();
    eprintln!("  --tui         open the function explorer");
    eprintln!("  --call NAME   call a parameterless function and print its result");
    eprintln!("  --verbose     report progress on stderr");
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut file = None;
    let mut tui = false;
    let mut calls = Vec::new();
    let mut verbose = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--tui" => tui = true,
            "--verbose" | "-v" => verbose = true,
            "--call" => match iter.next() {
                Some(name) => calls.push(name.clone()),
                None => return Err("--call requires a function name".to_string()),
            },
            flag if flag.starts_with("--") => return Err(format!("Unknown option '{}'", flag)),
            path if file.is_none() => file = Some(path.to_string()),
            extra => return Err(format!("Unexpected argument '{}'", extra)),
        }
    }

    let file = file.ok_or_else(|| "No input file provided".to_string())?;
    Ok(Options {
        file,
        tui,
        calls,
        verbose,
    })
}

/// Write and clear whatever the program has printed so far
fn flush_console(interpreter: &mut Interpreter) -> io::Result<()> {
    let bytes = interpreter.console().bytes();
    interpreter.console_mut().clear();
    let mut stdout = io::stdout().lock();
    stdout.write_all(&bytes)?;
    stdout.flush()
}

fn run_tui(interpreter: Interpreter, source: String) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(interpreter, source);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("subc");

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!();
            usage(program_name);
            return Ok(ExitCode::FAILURE);
        }
    };

    if !Path::new(&options.file).exists() {
        eprintln!("Error: File '{}' not found", options.file);
        return Ok(ExitCode::FAILURE);
    }

    let source = fs::read_to_string(&options.file)?;

    if options.verbose {
        eprintln!("Compiling {}...", options.file);
    }
    let program = match compile(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}: {}", options.file, e);
            return Ok(ExitCode::FAILURE);
        }
    };
    if options.verbose {
        eprintln!(
            "Compiled {} function(s), {} global(s), {} bytes of globals.",
            program.functions.len(),
            program.globals.len(),
            program.globals_size
        );
    }

    let mut interpreter = match Interpreter::new(program, DEFAULT_MEMORY_LIMIT) {
        Ok(interpreter) => interpreter,
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if options.tui {
        run_tui(interpreter, source)?;
        return Ok(ExitCode::SUCCESS);
    }

    if !options.calls.is_empty() {
        for name in &options.calls {
            if options.verbose {
                eprintln!("Calling {}...", name);
            }
            let result = interpreter.call(name, &[]);
            flush_console(&mut interpreter)?;
            match result {
                Ok(value) => println!("{} => {}", name, value),
                Err(e) => {
                    eprintln!("Runtime error: {}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    if options.verbose {
        eprintln!("Executing main...");
    }
    let result = interpreter.run();
    flush_console(&mut interpreter)?;

    match result {
        Ok(status) => {
            if options.verbose {
                eprintln!("main returned {}.", status);
            }
            Ok(ExitCode::from((status & 0xff) as u8))
        }
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
