use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use nix::unistd::{self, AccessFlags};

const PATH_KEY: &str = "PATH";

fn is_executable(path: &Path) -> bool {
	unistd::access(path, AccessFlags::X_OK).is_ok()
}

/// Maps a program word to the path handed to exec. A word that already
/// names an executable is used as-is; otherwise the path list is scanned in
/// order and the first directory holding an executable match wins.
pub fn resolve_in(name: &str, path_var: &OsStr) -> Option<PathBuf> {
	let direct = Path::new(name);
	if is_executable(direct) {
		return Some(direct.to_path_buf());
	}
	for dir in env::split_paths(path_var) {
		let candidate = dir.join(name);
		if is_executable(&candidate) {
			return Some(candidate);
		}
	}
	None
}

/// Resolution against the live environment; PATH is reread on every call.
pub fn resolve(name: &str) -> Option<PathBuf> {
	let path_var = env::var_os(PATH_KEY).unwrap_or_default();
	resolve_in(name, &path_var)
}
