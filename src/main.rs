mod builtin;
mod context;
mod eval;
mod job;
mod lexer;
mod parser;
mod pipes;
mod redirect;
mod search;
mod spawn;
mod types;

use std::io::{self, BufRead};

use anyhow::Result;
use log::LevelFilter;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use context::ShellContext;

const PROMPT: &str = "psh> ";

fn init_logging() {
	let level = std::env::var("PSH_LOG")
		.ok()
		.and_then(|v| v.parse::<LevelFilter>().ok())
		.unwrap_or(LevelFilter::Warn);
	let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);
}

enum LineResult {
	Continue,
	Exit(u8),
}

fn run_line(ctx: &ShellContext, line: &str) -> LineResult {
	let tokens = lexer::tokenize(line);
	if tokens.is_empty() {
		return LineResult::Continue;
	}
	match builtin::classify(&tokens[0]) {
		builtin::Invocation::Builtin(b) => match builtin::run(b, &tokens) {
			builtin::BuiltinResult::Status(_) => LineResult::Continue,
			builtin::BuiltinResult::Exit(status) => LineResult::Exit(status),
		},
		builtin::Invocation::External => {
			match parser::parse(&tokens) {
				Ok(pipeline) => {
					if let Err(e) = eval::run_pipeline(ctx, &pipeline) {
						eprintln!("psh: {}", e);
					}
				},
				Err(e) => eprintln!("psh: {}", e),
			}
			LineResult::Continue
		},
	}
}

fn repl(ctx: &ShellContext) -> Result<u8> {
	let mut rl = DefaultEditor::new()?;
	loop {
		match rl.readline(PROMPT) {
			Ok(line) => {
				let _ = rl.add_history_entry(line.as_str());
				if let LineResult::Exit(status) = run_line(ctx, &line) {
					return Ok(status);
				}
			},
			Err(ReadlineError::Interrupted) => continue,
			Err(ReadlineError::Eof) => return Ok(0),
			Err(e) => return Err(e.into()),
		}
	}
}

fn run_script(ctx: &ShellContext) -> Result<u8> {
	let stdin = io::stdin();
	for line in stdin.lock().lines() {
		let line = line?;
		if let LineResult::Exit(status) = run_line(ctx, &line) {
			return Ok(status);
		}
	}
	Ok(0)
}

fn main() -> Result<()> {
	init_logging();
	let ctx = ShellContext::init()?;
	let status = if ctx.interactive { repl(&ctx)? } else { run_script(&ctx)? };
	std::process::exit(i32::from(status))
}
