use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

fn shell() -> Command {
	Command::new(env!("CARGO_BIN_EXE_psh"))
}

fn scratch_dir(tag: &str) -> PathBuf {
	let dir = std::env::temp_dir().join(format!("psh-test-{}-{}", tag, std::process::id()));
	let _ = fs::remove_dir_all(&dir);
	fs::create_dir_all(&dir).unwrap();
	dir
}

/// Polls instead of blocking so a close-discipline regression shows up as
/// a test failure rather than a hung test run.
fn wait_with_deadline(mut child: Child, limit: Duration) -> Output {
	let start = Instant::now();
	loop {
		match child.try_wait().expect("try_wait failed") {
			Some(_) => return child.wait_with_output().expect("collecting output failed"),
			None if start.elapsed() > limit => {
				let _ = child.kill();
				let _ = child.wait();
				panic!("shell did not finish within {:?}", limit);
			},
			None => std::thread::sleep(Duration::from_millis(20)),
		}
	}
}

fn run_script_in(dir: &Path, script: &str) -> Output {
	let mut child = shell()
		.current_dir(dir)
		.stdin(Stdio::piped())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.spawn()
		.expect("failed to spawn shell");
	child
		.stdin
		.take()
		.unwrap()
		.write_all(script.as_bytes())
		.unwrap();
	wait_with_deadline(child, Duration::from_secs(10))
}

fn stdout_of(out: &Output) -> String {
	String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr_of(out: &Output) -> String {
	String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn two_stage_pipeline_counts_bytes() {
	let dir = scratch_dir("two-stage");
	let out = run_script_in(&dir, "echo hi | wc -c\n");
	assert_eq!(stdout_of(&out).trim(), "3", "stderr: {}", stderr_of(&out));
	let _ = fs::remove_dir_all(&dir);
}

#[test]
fn three_stage_pipeline_reaches_eof() {
	// if any process leaks an upstream write end, wc never sees EOF and
	// the deadline trips
	let dir = scratch_dir("three-stage");
	let out = run_script_in(&dir, "echo hi | cat | wc -c\n");
	assert_eq!(stdout_of(&out).trim(), "3", "stderr: {}", stderr_of(&out));
	let _ = fs::remove_dir_all(&dir);
}

#[test]
fn redirects_copy_a_file() {
	let dir = scratch_dir("redirect-copy");
	fs::write(dir.join("in.txt"), b"one\ntwo\nthree\n").unwrap();
	let out = run_script_in(&dir, "cat < in.txt > out.txt\n");
	assert!(out.status.success(), "stderr: {}", stderr_of(&out));
	assert_eq!(
		fs::read(dir.join("out.txt")).unwrap(),
		fs::read(dir.join("in.txt")).unwrap()
	);
	let _ = fs::remove_dir_all(&dir);
}

#[test]
fn output_redirect_truncates_prior_contents() {
	let dir = scratch_dir("redirect-trunc");
	fs::write(dir.join("out.txt"), b"previous contents that are longer\n").unwrap();
	let out = run_script_in(&dir, "echo hi > out.txt\n");
	assert!(out.status.success(), "stderr: {}", stderr_of(&out));
	assert_eq!(fs::read(dir.join("out.txt")).unwrap(), b"hi\n");
	let _ = fs::remove_dir_all(&dir);
}

#[test]
fn redirects_may_sit_between_arguments() {
	let dir = scratch_dir("redirect-mid");
	fs::write(dir.join("in.txt"), b"abcd").unwrap();
	let out = run_script_in(&dir, "wc < in.txt -c > out.txt\n");
	assert!(out.status.success(), "stderr: {}", stderr_of(&out));
	assert_eq!(
		String::from_utf8_lossy(&fs::read(dir.join("out.txt")).unwrap()).trim(),
		"4"
	);
	let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_input_file_reports_and_continues() {
	let dir = scratch_dir("redirect-missing");
	let out = run_script_in(&dir, "cat < nope.txt\necho after\n");
	assert!(stderr_of(&out).contains("nope.txt"));
	assert!(stderr_of(&out).contains("No such file"));
	assert!(stdout_of(&out).contains("after"));
	let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unknown_command_reports_and_continues() {
	let dir = scratch_dir("not-found");
	let out = run_script_in(&dir, "definitely-not-a-command-psh\necho after\n");
	assert!(stderr_of(&out).contains("command not found"));
	assert!(stdout_of(&out).contains("after"));
	let _ = fs::remove_dir_all(&dir);
}

#[test]
fn background_job_does_not_block() {
	// stdio is nulled so the detached sleep cannot keep an output pipe
	// open past the shell's exit
	let dir = scratch_dir("background");
	let mut child = shell()
		.current_dir(&dir)
		.stdin(Stdio::piped())
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.spawn()
		.expect("failed to spawn shell");
	let start = Instant::now();
	child
		.stdin
		.take()
		.unwrap()
		.write_all(b"sleep 5 &\n")
		.unwrap();
	wait_with_deadline(child, Duration::from_secs(10));
	assert!(
		start.elapsed() < Duration::from_secs(4),
		"shell blocked on a background job"
	);
	let _ = fs::remove_dir_all(&dir);
}

#[test]
fn pwd_builtin_prints_working_directory() {
	let dir = scratch_dir("pwd");
	let canonical = dir.canonicalize().unwrap();
	let out = run_script_in(&canonical, "pwd\n");
	assert_eq!(stdout_of(&out).trim(), canonical.to_str().unwrap());
	let _ = fs::remove_dir_all(&dir);
}

#[test]
fn cd_builtin_changes_directory_for_later_lines() {
	let dir = scratch_dir("cd");
	let sub = dir.join("sub");
	fs::create_dir_all(&sub).unwrap();
	let canonical = dir.canonicalize().unwrap();
	let out = run_script_in(&canonical, "cd sub\npwd\n");
	assert_eq!(
		stdout_of(&out).trim(),
		canonical.join("sub").to_str().unwrap()
	);
	let _ = fs::remove_dir_all(&dir);
}

#[test]
fn exit_builtin_stops_the_loop() {
	let dir = scratch_dir("exit");
	let out = run_script_in(&dir, "exit\necho after\n");
	assert!(out.status.success());
	assert_eq!(stdout_of(&out).trim(), "");
	let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_errors_do_not_kill_the_shell() {
	let dir = scratch_dir("parse-error");
	let out = run_script_in(&dir, "| wc\necho after\n");
	assert!(stderr_of(&out).contains("empty command"));
	assert!(stdout_of(&out).contains("after"));
	let _ = fs::remove_dir_all(&dir);
}

#[test]
fn quoted_operators_are_plain_arguments() {
	let dir = scratch_dir("quoting");
	let out = run_script_in(&dir, "echo 'a|b'\n");
	assert_eq!(stdout_of(&out).trim(), "a|b");
	let _ = fs::remove_dir_all(&dir);
}
