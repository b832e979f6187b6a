use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::os::fd::{IntoRawFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;

use crate::types::{Redirect, RedirectType};

#[derive(Debug)]
pub enum RedirectError {
	NotFound(String),
	PermissionDenied(String),
	Io(String, io::Error),
}

impl fmt::Display for RedirectError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			RedirectError::NotFound(target) => write!(f, "{}: No such file or directory", target),
			RedirectError::PermissionDenied(target) => write!(f, "{}: Permission denied", target),
			RedirectError::Io(target, e) => write!(f, "{}: {}", target, e),
		}
	}
}

impl std::error::Error for RedirectError {}

/// The standard stream a resolved redirection is duplicated onto.
pub fn target_fileno(typ: RedirectType) -> RawFd {
	match typ {
		RedirectType::Input => libc::STDIN_FILENO,
		RedirectType::Output => libc::STDOUT_FILENO,
	}
}

/// Opens the redirection target and hands back the raw descriptor for the
/// spawner to dup onto stdin or stdout. Input targets must already exist;
/// output targets are created mode 0644 and truncated.
pub fn open_redirect(redirect: &Redirect) -> Result<RawFd, RedirectError> {
	let mut oopt = OpenOptions::new();
	match redirect.typ {
		RedirectType::Input => {
			oopt.read(true);
		},
		RedirectType::Output => {
			oopt.write(true).create(true).truncate(true).mode(0o644);
		},
	}
	match oopt.open(&redirect.target) {
		Ok(file) => Ok(file.into_raw_fd()),
		Err(e) => Err(match e.kind() {
			io::ErrorKind::NotFound => RedirectError::NotFound(redirect.target.clone()),
			io::ErrorKind::PermissionDenied => RedirectError::PermissionDenied(redirect.target.clone()),
			_ => RedirectError::Io(redirect.target.clone(), e),
		}),
	}
}
