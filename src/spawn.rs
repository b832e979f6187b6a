use std::ffi::{CString, NulError};
use std::fmt;
use std::os::unix::ffi::OsStringExt;

use log::debug;
use nix::errno::Errno;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::wait;
use nix::unistd::{self, ForkResult, Pid};

use crate::context::ShellContext;
use crate::pipes::PipeSet;
use crate::redirect::{self, RedirectError};
use crate::search;
use crate::types::{Command, Pipeline};

/// Anything that can go wrong in a child between fork and exec. Reported to
/// the child's stderr; the parent only ever sees the exit status.
#[derive(Debug)]
enum ChildError {
	Redirect(RedirectError),
	Nul(NulError),
	Sys(Errno),
	Exec(String, Errno),
}

impl From<RedirectError> for ChildError {
	fn from(e: RedirectError) -> ChildError {
		ChildError::Redirect(e)
	}
}
impl From<NulError> for ChildError {
	fn from(e: NulError) -> ChildError {
		ChildError::Nul(e)
	}
}
impl From<Errno> for ChildError {
	fn from(e: Errno) -> ChildError {
		ChildError::Sys(e)
	}
}

impl fmt::Display for ChildError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			ChildError::Redirect(e) => write!(f, "{}", e),
			ChildError::Nul(e) => write!(f, "invalid nul byte in command: {}", e),
			ChildError::Sys(e) => write!(f, "{}", e),
			ChildError::Exec(path, e) => write!(f, "'{}': cannot execute: {}", path, e),
		}
	}
}

impl ChildError {
	fn status(&self) -> u8 {
		match self {
			ChildError::Redirect(_) => 1,
			_ => 126,
		}
	}
}

/// A spawned pipeline: its process group and every member pid, in fork
/// order (so the last entry is the last-forked process).
pub struct Spawned {
	pub pgid: Pid,
	pub pids: Vec<Pid>,
}

/// Restores default dispositions for the signals the shell ignores, so the
/// executed program behaves normally under ^C and terminal stops.
fn reset_job_signals() {
	for sig in [Signal::SIGINT, Signal::SIGTSTP, Signal::SIGTTOU] {
		let _ = unsafe { signal::signal(sig, SigHandler::SigDfl) };
	}
}

fn wire_streams(pipes: &PipeSet, segment: usize, segments: usize) -> nix::Result<()> {
	if segment > 0 {
		unistd::dup2(pipes.read_end(segment - 1), libc::STDIN_FILENO)?;
	}
	if segment + 1 < segments {
		unistd::dup2(pipes.write_end(segment), libc::STDOUT_FILENO)?;
	}
	pipes.close_unused(segment)
}

fn do_exec(command: &Command) -> Result<u8, ChildError> {
	// redirections override the pipe wiring already in place
	for r in &command.redirects {
		let fd = redirect::open_redirect(r)?;
		unistd::dup2(fd, redirect::target_fileno(r.typ))?;
		unistd::close(fd)?;
	}
	let path = match search::resolve(&command.name) {
		Some(path) => path,
		None => {
			eprintln!("{}: command not found", command.name);
			return Ok(127);
		},
	};
	let shown = path.display().to_string();
	let prog = CString::new(path.into_os_string().into_vec())?;
	let mut argv: Vec<CString> = Vec::with_capacity(command.arguments.len() + 1);
	argv.push(CString::new(command.name.as_str())?);
	for arg in &command.arguments {
		argv.push(CString::new(arg.as_str())?);
	}
	unistd::execv(&prog, &argv).map_err(|e| ChildError::Exec(shown, e))?;
	unreachable!()
}

/// Child-side tail: never returns, the image is either replaced by exec or
/// the child exits with the failure's status.
fn exec_segment(command: &Command) -> ! {
	match do_exec(command) {
		Ok(status) => unsafe { libc::_exit(status as libc::c_int) },
		Err(e) => {
			eprintln!("{}", e);
			unsafe { libc::_exit(e.status() as libc::c_int) }
		},
	}
}

/// On a mid-pipeline fork failure the already-forked part of the group is
/// killed and reaped, so no half-wired pipeline is left running.
fn teardown(pgid: Pid, pids: &[Pid]) {
	let _ = signal::killpg(pgid, Signal::SIGKILL);
	for &pid in pids {
		let _ = wait::waitpid(pid, None);
	}
}

/// Forks one process per segment, in order. Segment 0 becomes the group
/// leader; parent and child both assign the group id, whichever runs first,
/// so the group exists before the terminal is handed over and before any
/// later sibling joins it. For foreground pipelines the terminal goes to
/// the group as soon as it is fixed.
pub fn spawn_pipeline(
	ctx: &ShellContext,
	pipeline: &Pipeline,
	pipes: &PipeSet,
) -> Result<Spawned, Errno> {
	let segments = pipeline.commands.len();
	let mut pgid: Option<Pid> = None;
	let mut pids: Vec<Pid> = Vec::with_capacity(segments);
	for (s, command) in pipeline.commands.iter().enumerate() {
		match unsafe { unistd::fork() } {
			Ok(ForkResult::Child) => {
				reset_job_signals();
				let join = pgid.unwrap_or_else(|| Pid::from_raw(0));
				let _ = unistd::setpgid(Pid::from_raw(0), join);
				if let Err(e) = wire_streams(pipes, s, segments) {
					eprintln!("{}: {}", command.name, e);
					unsafe { libc::_exit(126) }
				}
				exec_segment(command);
			},
			Ok(ForkResult::Parent { child }) => {
				let group = *pgid.get_or_insert(child);
				let _ = unistd::setpgid(child, group);
				if s == 0 && !pipeline.is_background {
					ctx.give_terminal_to(group);
				}
				debug!("spawned {} for '{}' (pgid {})", child, command.name, group);
				pids.push(child);
			},
			Err(e) => {
				if let Some(group) = pgid {
					teardown(group, &pids);
				}
				return Err(e);
			},
		}
	}
	let pgid = pgid.expect("pipeline spawned no processes");
	Ok(Spawned { pgid, pids })
}
