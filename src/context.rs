use std::io::{self, IsTerminal};
use std::os::fd::{BorrowedFd, RawFd};

use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::termios::{self, SetArg, Termios};
use nix::unistd::{self, Pid};

/// Process-wide shell state: the controlling terminal, the shell's own
/// process group, and the terminal modes to restore after a foreground job.
/// Built once at startup and passed by reference from the orchestrator
/// down to job control.
pub struct ShellContext {
	terminal: RawFd,
	pub interactive: bool,
	pub shell_pgid: Pid,
	tmodes: Option<Termios>,
}

fn term_fd(raw: RawFd) -> BorrowedFd<'static> {
	unsafe { BorrowedFd::borrow_raw(raw) }
}

/// The shell itself must survive the terminal signals its foreground jobs
/// take; children reset these to default before exec.
fn ignore_job_signals() {
	for sig in [Signal::SIGINT, Signal::SIGTSTP, Signal::SIGTTOU] {
		let _ = unsafe { signal::signal(sig, SigHandler::SigIgn) };
	}
}

impl ShellContext {
	/// When interactive: wait (via SIGTTIN) until the shell's group owns
	/// the terminal, put the shell in its own group, take the terminal and
	/// save its modes. Non-interactive runs skip all terminal handling.
	pub fn init() -> nix::Result<ShellContext> {
		let terminal = libc::STDIN_FILENO;
		let interactive = io::stdin().is_terminal();
		let mut shell_pgid = unistd::getpgrp();
		let mut tmodes = None;
		if interactive {
			// started in the background: stop until moved to the foreground
			loop {
				shell_pgid = unistd::getpgrp();
				if unistd::tcgetpgrp(term_fd(terminal))? == shell_pgid {
					break;
				}
				let _ = signal::killpg(shell_pgid, Signal::SIGTTIN);
			}
		}
		ignore_job_signals();
		if interactive {
			shell_pgid = unistd::getpid();
			let _ = unistd::setpgid(shell_pgid, shell_pgid);
			unistd::tcsetpgrp(term_fd(terminal), shell_pgid)?;
			tmodes = termios::tcgetattr(term_fd(terminal)).ok();
		}
		Ok(ShellContext { terminal, interactive, shell_pgid, tmodes })
	}

	/// Hands the terminal to a foreground job's process group.
	pub fn give_terminal_to(&self, pgid: Pid) {
		if self.interactive {
			let _ = unistd::tcsetpgrp(term_fd(self.terminal), pgid);
		}
	}

	/// Takes the terminal back after a foreground job and restores the
	/// modes saved at startup, in case the job left the terminal raw.
	pub fn reclaim_terminal(&self) {
		if self.interactive {
			let _ = unistd::tcsetpgrp(term_fd(self.terminal), self.shell_pgid);
			if let Some(modes) = &self.tmodes {
				let _ = termios::tcsetattr(term_fd(self.terminal), SetArg::TCSADRAIN, modes);
			}
		}
	}
}
