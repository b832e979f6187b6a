use log::debug;
use nix::errno::Errno;
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::context::ShellContext;
use crate::spawn::Spawned;

/// One pipeline's worth of processes sharing a process group. Lives for a
/// single input line; there is no persistent job table.
#[derive(Debug)]
pub struct Job {
	pub pgid: Pid,
	pub pids: Vec<Pid>,
	pub background: bool,
}

impl Job {
	pub fn new(spawned: Spawned, background: bool) -> Job {
		Job { pgid: spawned.pgid, pids: spawned.pids, background }
	}

	/// The last-forked process stands for the whole pipeline.
	fn representative(&self) -> Pid {
		*self.pids.last().expect("job with no processes")
	}
}

/// Blocks until the job's representative process terminates, then takes
/// the terminal back. Background jobs never come through here; their exit
/// is left to the operating system.
pub fn wait_foreground(ctx: &ShellContext, job: &Job) -> u8 {
	let status = loop {
		match wait::waitpid(job.representative(), None) {
			Ok(WaitStatus::Exited(_, code)) => break code as u8,
			Ok(WaitStatus::Signaled(_, sig, _)) => break (128 + sig as i32) as u8,
			Ok(_) => continue,
			Err(Errno::EINTR) => continue,
			Err(Errno::ECHILD) => break 0,
			Err(e) => {
				log::warn!("waitpid: {}", e);
				break 126;
			},
		}
	};
	debug!("foreground job (pgid {}) finished with status {}", job.pgid, status);
	reap_finished(job);
	ctx.reclaim_terminal();
	status
}

/// Non-blocking sweep over the other pipeline members. Whatever is still
/// running keeps its group and is not waited for.
fn reap_finished(job: &Job) {
	for &pid in &job.pids {
		let _ = wait::waitpid(pid, Some(WaitPidFlag::WNOHANG));
	}
}
