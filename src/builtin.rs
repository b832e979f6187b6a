use nix::unistd;

/// What the first word of a line resolves to. The lookup is total: anything
/// not in the builtin table is an external pipeline.
pub enum Invocation {
	Builtin(Builtin),
	External,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Builtin { Cd, Pwd, Help, Exit }

pub enum BuiltinResult {
	Status(u8),
	Exit(u8),
}

const TABLE: &[(&str, Builtin, &str)] = &[
	("?", Builtin::Help, "show this help menu"),
	("exit", Builtin::Exit, "exit the command shell"),
	("pwd", Builtin::Pwd, "prints the current working directory"),
	("cd", Builtin::Cd, "changes the current working directory"),
];

pub fn classify(name: &str) -> Invocation {
	for &(cmd, builtin, _) in TABLE {
		if cmd == name {
			return Invocation::Builtin(builtin);
		}
	}
	Invocation::External
}

/// Runs a builtin synchronously in the shell process. `tokens` is the full
/// token list, builtin name included.
pub fn run(builtin: Builtin, tokens: &[String]) -> BuiltinResult {
	match builtin {
		Builtin::Cd => BuiltinResult::Status(builtin_cd(tokens)),
		Builtin::Pwd => BuiltinResult::Status(builtin_pwd()),
		Builtin::Help => BuiltinResult::Status(builtin_help()),
		Builtin::Exit => BuiltinResult::Exit(0),
	}
}

fn builtin_cd(tokens: &[String]) -> u8 {
	if tokens.len() != 2 {
		eprintln!("cd takes exactly one argument");
		return 1;
	}
	match unistd::chdir(tokens[1].as_str()) {
		Ok(()) => 0,
		Err(e) => {
			eprintln!("cd: {}: {}", tokens[1], e);
			1
		},
	}
}

fn builtin_pwd() -> u8 {
	match unistd::getcwd() {
		Ok(path) => {
			println!("{}", path.display());
			0
		},
		Err(e) => {
			eprintln!("pwd: {}", e);
			1
		},
	}
}

fn builtin_help() -> u8 {
	for &(cmd, _, doc) in TABLE {
		println!("{} - {}", cmd, doc);
	}
	0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builtin_names_are_recognized() {
		for name in ["cd", "pwd", "exit", "?"] {
			assert!(matches!(classify(name), Invocation::Builtin(_)), "{}", name);
		}
	}

	#[test]
	fn everything_else_is_external() {
		for name in ["ls", "echo", "cd2", "Exit", ""] {
			assert!(matches!(classify(name), Invocation::External), "{}", name);
		}
	}

	#[test]
	fn exit_requests_loop_termination() {
		assert!(matches!(run(Builtin::Exit, &["exit".to_string()]), BuiltinResult::Exit(0)));
	}
}
