#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RedirectType { Input, Output }

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Redirect {
	pub typ: RedirectType,
	pub target: String,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Command {
	pub name: String,
	pub arguments: Vec<String>,
	pub redirects: Vec<Redirect>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Pipeline {
	pub commands: Vec<Command>,
	pub is_background: bool,
}

impl Pipeline {
	/// Number of inter-process pipes the pipeline needs.
	pub fn pipe_count(&self) -> usize {
		self.commands.len() - 1
	}
}
