use std::os::fd::{IntoRawFd, RawFd};

use nix::errno::Errno;
use nix::unistd;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum End { Read, Write }

/// The N-1 pipes connecting an N-segment pipeline, created in the parent
/// before any fork so every child can inherit the ends it needs.
pub struct PipeSet {
	pairs: Vec<(RawFd, RawFd)>,
}

impl PipeSet {
	/// Allocates every pipe up front. If one allocation fails, the ones
	/// already opened are closed and the whole pipeline is off.
	pub fn open(segments: usize) -> Result<PipeSet, Errno> {
		let mut pairs: Vec<(RawFd, RawFd)> = Vec::with_capacity(segments.saturating_sub(1));
		for _ in 1..segments {
			match unistd::pipe() {
				Ok((read, write)) => pairs.push((read.into_raw_fd(), write.into_raw_fd())),
				Err(e) => {
					PipeSet { pairs }.close_all();
					return Err(e);
				},
			}
		}
		Ok(PipeSet { pairs })
	}

	pub fn len(&self) -> usize {
		self.pairs.len()
	}

	/// Read end of pipe `i`, owned by segment `i + 1`.
	pub fn read_end(&self, i: usize) -> RawFd {
		self.pairs[i].0
	}

	/// Write end of pipe `i`, owned by segment `i`.
	pub fn write_end(&self, i: usize) -> RawFd {
		self.pairs[i].1
	}

	/// Pipe `i` connects segment `i`'s stdout to segment `i + 1`'s stdin;
	/// those two ends are the only ones the segment may hold.
	fn keeps(segment: usize, pipe: usize, end: End) -> bool {
		(pipe == segment && end == End::Write) || (pipe + 1 == segment && end == End::Read)
	}

	/// Closes, in the calling process, every pipe descriptor the given
	/// segment must not hold. A write end leaked into an idle process keeps
	/// the downstream reader from ever seeing end-of-stream.
	pub fn close_unused(&self, segment: usize) -> nix::Result<()> {
		for (i, &(read, write)) in self.pairs.iter().enumerate() {
			if !PipeSet::keeps(segment, i, End::Read) {
				unistd::close(read)?;
			}
			if !PipeSet::keeps(segment, i, End::Write) {
				unistd::close(write)?;
			}
		}
		Ok(())
	}

	/// Parent-side close of every descriptor once all children are forked.
	pub fn close_all(self) {
		for &(read, write) in &self.pairs {
			let _ = unistd::close(read);
			let _ = unistd::close(write);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn allocation_count_matches_segments() {
		let set = PipeSet::open(4).unwrap();
		assert_eq!(set.len(), 3);
		set.close_all();
	}

	#[test]
	fn single_segment_needs_no_pipes() {
		let set = PipeSet::open(1).unwrap();
		assert_eq!(set.len(), 0);
		set.close_all();
	}

	#[test]
	fn each_segment_keeps_exactly_its_neighbor_ends() {
		// three segments, two pipes
		let kept = |segment| -> Vec<(usize, End)> {
			let mut v = vec![];
			for pipe in 0..2 {
				for end in [End::Read, End::Write] {
					if PipeSet::keeps(segment, pipe, end) {
						v.push((pipe, end));
					}
				}
			}
			v
		};
		assert_eq!(kept(0), [(0, End::Write)]);
		assert_eq!(kept(1), [(0, End::Read), (1, End::Write)]);
		assert_eq!(kept(2), [(1, End::Read)]);
	}

	#[test]
	fn the_parent_keeps_nothing() {
		// a segment index past the end behaves like the parent: close all
		for pipe in 0..2 {
			for end in [End::Read, End::Write] {
				assert!(!PipeSet::keeps(4, pipe, end));
			}
		}
	}
}
