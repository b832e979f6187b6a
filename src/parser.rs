use std::fmt;

use crate::types::{Command, Pipeline, Redirect, RedirectType};

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
	EmptyCommand,
	MissingRedirectTarget(String),
	UnexpectedToken(String),
}

impl fmt::Display for ParseError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			ParseError::EmptyCommand => write!(f, "empty command"),
			ParseError::MissingRedirectTarget(op) => write!(f, "missing file name after '{}'", op),
			ParseError::UnexpectedToken(t) => write!(f, "unexpected token '{}'", t),
		}
	}
}

impl std::error::Error for ParseError {}

/// Splits an already-tokenized line into a pipeline: one command per run of
/// tokens between `|` separators, with a trailing `&` stripped into the
/// background flag.
pub fn parse(tokens: &[String]) -> Result<Pipeline, ParseError> {
	let mut tokens = tokens;
	let mut is_background = false;
	if let Some((last, rest)) = tokens.split_last() {
		if last == "&" {
			is_background = true;
			tokens = rest;
		}
	}
	let mut commands: Vec<Command> = vec![];
	for segment in tokens.split(|t| t == "|") {
		commands.push(parse_command(segment)?);
	}
	Ok(Pipeline { commands, is_background })
}

fn parse_command(tokens: &[String]) -> Result<Command, ParseError> {
	let mut words: Vec<String> = vec![];
	let mut redirects: Vec<Redirect> = vec![];
	let mut i = 0;
	while i < tokens.len() {
		let typ = match tokens[i].as_str() {
			"<" => Some(RedirectType::Input),
			">" => Some(RedirectType::Output),
			"&" => return Err(ParseError::UnexpectedToken(tokens[i].clone())),
			_ => None,
		};
		match typ {
			Some(typ) => {
				let target = tokens
					.get(i + 1)
					.ok_or_else(|| ParseError::MissingRedirectTarget(tokens[i].clone()))?;
				redirects.push(Redirect { typ, target: target.clone() });
				i += 2;
			},
			None => {
				words.push(tokens[i].clone());
				i += 1;
			},
		}
	}
	let mut words = words.into_iter();
	let name = words.next().ok_or(ParseError::EmptyCommand)?;
	Ok(Command { name, arguments: words.collect(), redirects })
}
