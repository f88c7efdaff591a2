//! Command execution
//!
//! Runs one stage command as a subprocess in the checkout directory.
//! Stdout and stderr share a single pipe so the captured lines keep the
//! order in which the child wrote them.
//!
//! There is no timeout: a child that never exits blocks its run forever.

use quay_core::domain::command::CommandResult;
use std::io::{BufRead, BufReader, PipeReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use thiserror::Error;
use tracing::debug;

/// Errors that prevent a command from producing a [`CommandResult`]
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("command line is empty")]
    EmptyCommand,

    #[error("failed to create output pipe: {0}")]
    Pipe(#[source] std::io::Error),

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read command output: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to wait for command: {0}")]
    Wait(#[source] std::io::Error),

    #[error("execution task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Splits a command line on single spaces
///
/// Arguments cannot contain spaces. Trailing empty fields are dropped,
/// empty fields between doubled spaces are kept.
pub fn split_command(command_line: &str) -> Vec<String> {
    let mut argv: Vec<String> = command_line.split(' ').map(str::to_string).collect();
    while argv.last().is_some_and(|arg| arg.is_empty()) {
        argv.pop();
    }
    argv
}

/// Executes `command_line` in `working_dir` and captures its merged output
///
/// The returned result holds every output line followed by the exit code.
/// A child terminated by a signal reports `-1`.
pub async fn execute(command_line: &str, working_dir: &Path) -> Result<CommandResult, ExecError> {
    let argv = split_command(command_line);
    if argv.first().is_none_or(|program| program.is_empty()) {
        return Err(ExecError::EmptyCommand);
    }

    let working_dir: PathBuf = working_dir.to_path_buf();
    tokio::task::spawn_blocking(move || execute_blocking(&argv, &working_dir)).await?
}

fn execute_blocking(argv: &[String], working_dir: &Path) -> Result<CommandResult, ExecError> {
    debug!("Executing {:?} in {}", argv, working_dir.display());

    let (reader, writer) = std::io::pipe().map_err(ExecError::Pipe)?;
    let stderr_writer = writer.try_clone().map_err(ExecError::Pipe)?;

    let mut command = Command::new(&argv[0]);
    command
        .args(&argv[1..])
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(writer)
        .stderr(stderr_writer);

    let mut child = command.spawn().map_err(|source| ExecError::Spawn {
        program: argv[0].clone(),
        source,
    })?;

    // The command still owns the parent's write ends; reading only reaches
    // EOF once they are closed.
    drop(command);

    let lines = match read_lines(reader) {
        Ok(lines) => lines,
        Err(e) => return Err(abandon(&mut child, e)),
    };
    let status = child.wait().map_err(ExecError::Wait)?;
    let exit_code = status.code().unwrap_or(-1);

    debug!(
        "Command {:?} exited with {} after {} line(s) of output",
        argv[0],
        exit_code,
        lines.len()
    );

    Ok(CommandResult::new(lines, exit_code))
}

/// Kills and reaps a child whose output could not be read
fn abandon(child: &mut Child, error: std::io::Error) -> ExecError {
    let _ = child.kill();
    let _ = child.wait();
    ExecError::Read(error)
}

fn read_lines(reader: PipeReader) -> std::io::Result<Vec<String>> {
    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        lines.push(String::from_utf8_lossy(&buf).into_owned());
    }

    Ok(lines)
}
