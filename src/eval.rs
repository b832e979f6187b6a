use std::fmt;

use log::debug;
use nix::errno::Errno;

use crate::context::ShellContext;
use crate::job::{self, Job};
use crate::pipes::PipeSet;
use crate::spawn;
use crate::types::Pipeline;

/// Errors that abort a whole pipeline in the parent. Everything after a
/// successful fork is a child-local failure and surfaces only as that
/// child's exit status.
#[derive(Debug)]
pub enum PipelineError {
	PipeAllocation(Errno),
	Fork(Errno),
}

impl fmt::Display for PipelineError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			PipelineError::PipeAllocation(e) => write!(f, "cannot allocate pipes: {}", e),
			PipelineError::Fork(e) => write!(f, "fork failed: {}", e),
		}
	}
}

impl std::error::Error for PipelineError {}

/// Runs one external pipeline: allocate the pipes, spawn every segment into
/// a single process group, drop the parent's pipe ends, then either wait
/// for the job (foreground) or leave it detached (background).
pub fn run_pipeline(ctx: &ShellContext, pipeline: &Pipeline) -> Result<u8, PipelineError> {
	assert!(!pipeline.commands.is_empty());
	let pipes = PipeSet::open(pipeline.commands.len()).map_err(PipelineError::PipeAllocation)?;
	debug_assert_eq!(pipes.len(), pipeline.pipe_count());
	debug!("{} segment(s), {} pipe(s)", pipeline.commands.len(), pipes.len());
	let spawned = spawn::spawn_pipeline(ctx, pipeline, &pipes);
	pipes.close_all();
	let spawned = match spawned {
		Ok(spawned) => spawned,
		Err(e) => {
			// the terminal may already belong to the dead group
			ctx.reclaim_terminal();
			return Err(PipelineError::Fork(e));
		},
	};
	let job = Job::new(spawned, pipeline.is_background);
	if job.background {
		debug!("detached background job (pgid {})", job.pgid);
		Ok(0)
	} else {
		Ok(job::wait_foreground(ctx, &job))
	}
}
