//! Launcher command parsing and detached process spawning
//!
//! A launcher's `path` is a single string of optional leading environment
//! assignments followed by the command line, e.g.
//! `"FOO=bar /usr/bin/app --flag"`. Parsing into argv/envp is pure and
//! testable on its own; the actual spawn is a separate platform call that
//! forks, detaches the child from the session, and replaces its image.

use std::ffi::CString;
use std::io;

use log::{debug, error, info};

use crate::error::ShellError;

/// Parsed argv/envp vectors ready to exec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecSpec {
    pub argv: Vec<String>,
    pub envp: Vec<String>,
}

/// Snapshot of the calling process's environment as "KEY=VALUE" entries
pub fn inherited_env() -> Vec<String> {
    std::env::vars().map(|(k, v)| format!("{}={}", k, v)).collect()
}

/// Split a launcher command into argv and envp.
///
/// Tokens are whitespace separated. A token containing `=` is an
/// environment override only while no command token has been seen; it
/// replaces the first inherited entry whose head matches the key's bytes,
/// or appends when nothing matches. Once a non-assignment token appears,
/// every later token is a command argument, `=` or not.
pub fn build_exec(command: &str, inherited: &[String]) -> ExecSpec {
    let mut envp: Vec<String> = inherited.to_vec();
    let mut argv: Vec<String> = Vec::new();

    for token in command.split_whitespace() {
        let assignment = token.find('=');
        match assignment {
            Some(eq) if argv.is_empty() => {
                let key = &token.as_bytes()[..eq];
                match envp.iter_mut().find(|entry| entry.as_bytes().get(..eq) == Some(key)) {
                    Some(entry) => *entry = token.to_string(),
                    None => envp.push(token.to_string()),
                }
            }
            _ => argv.push(token.to_string()),
        }
    }

    ExecSpec { argv, envp }
}

/// Fork a detached child running `spec`.
///
/// The parent returns immediately; a failed fork is reported to the
/// caller so the activation can be abandoned. The child starts its own
/// session and execs, exiting without returning here on any failure.
pub fn spawn_detached(spec: &ExecSpec) -> Result<(), ShellError> {
    if spec.argv.is_empty() {
        return Err(ShellError::EmptyCommand);
    }

    let argv_c = to_cstrings(&spec.argv)?;
    let envp_c = to_cstrings(&spec.envp)?;
    let argv_ptrs = to_ptr_vec(&argv_c);
    let envp_ptrs = to_ptr_vec(&envp_c);

    match unsafe { libc::fork() } {
        -1 => Err(ShellError::Fork(io::Error::last_os_error())),
        0 => {
            // Child: detach from the controlling session, then exec
            unsafe {
                if libc::setsid() == -1 {
                    libc::_exit(libc::EXIT_FAILURE);
                }
                libc::execve(argv_c[0].as_ptr(), argv_ptrs.as_ptr(), envp_ptrs.as_ptr());
            }
            eprintln!(
                "exec '{}' failed: {}",
                spec.argv[0],
                io::Error::last_os_error()
            );
            unsafe { libc::_exit(1) }
        }
        pid => {
            debug!("🚀 Launched '{}' as pid {}", spec.argv[0], pid);
            Ok(())
        }
    }
}

/// Collect every terminated child without blocking, logging exit status.
///
/// Driven by the event loop's SIGCHLD source; a child that never exits is
/// not the shell's concern.
pub fn reap_children() {
    loop {
        let mut status: libc::c_int = 0;
        let pid = unsafe { libc::waitpid(-1, &mut status, libc::WNOHANG) };
        if pid <= 0 {
            break;
        }
        if libc::WIFEXITED(status) {
            info!("child {} exited with status {}", pid, libc::WEXITSTATUS(status));
        } else if libc::WIFSIGNALED(status) {
            info!("child {} killed by signal {}", pid, libc::WTERMSIG(status));
        } else {
            info!("child {} exited", pid);
        }
    }
}

fn to_cstrings(strings: &[String]) -> Result<Vec<CString>, ShellError> {
    strings
        .iter()
        .map(|s| CString::new(s.as_bytes()).map_err(|_| ShellError::NulInCommand))
        .collect()
}

fn to_ptr_vec(cstrings: &[CString]) -> Vec<*const libc::c_char> {
    cstrings
        .iter()
        .map(|c| c.as_ptr())
        .chain(std::iter::once(std::ptr::null()))
        .collect()
}

/// Log and absorb a failed activation; the shell keeps running
pub fn activate(spec: &ExecSpec) {
    if let Err(e) = spawn_detached(spec) {
        error!("❌ Launcher activation failed: {}", e);
    }
}

#[cfg(test)]
mod tests;
