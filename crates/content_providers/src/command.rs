//! External command providers
//!
//! `command` runs one program, `pipe` runs `first | second`. Both capture
//! standard output and return it line by line. Any failure yields empty
//! content.

use std::process::{Command, Stdio};

use contracts::{CommandSpec, Content, ContentProvider};
use tracing::debug;

use crate::error::ProviderError;

/// Run a program and return its stdout lines
pub fn execute_simple(spec: &CommandSpec) -> Result<Vec<String>, ProviderError> {
    let output = Command::new(&spec.program)
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| ProviderError::command(&spec.program, e))?;

    into_lines(&spec.program, output.stdout)
}

/// Run `first | second` and return the stdout lines of `second`
pub fn execute_compound(
    first: &CommandSpec,
    second: &CommandSpec,
) -> Result<Vec<String>, ProviderError> {
    let mut upstream = Command::new(&first.program)
        .args(&first.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ProviderError::command(&first.program, e))?;

    let Some(pipe) = upstream.stdout.take() else {
        let _ = upstream.kill();
        let _ = upstream.wait();
        return Err(ProviderError::command(
            &first.program,
            std::io::Error::other("stdout not captured"),
        ));
    };

    let downstream = Command::new(&second.program)
        .args(&second.args)
        .stdin(Stdio::from(pipe))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let downstream = match downstream {
        Ok(child) => child,
        Err(e) => {
            let _ = upstream.kill();
            let _ = upstream.wait();
            return Err(ProviderError::command(&second.program, e));
        }
    };

    let output = downstream
        .wait_with_output()
        .map_err(|e| ProviderError::command(&second.program, e))?;
    // Reap the upstream process
    let _ = upstream.wait();

    into_lines(&second.program, output.stdout)
}

fn into_lines(program: &str, stdout: Vec<u8>) -> Result<Vec<String>, ProviderError> {
    let text = String::from_utf8(stdout).map_err(|_| ProviderError::NonUtf8Output {
        program: program.to_string(),
    })?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Log the failure and fall back to empty content
pub(crate) fn lines_or_empty(
    provider: &str,
    result: Result<Vec<String>, ProviderError>,
) -> Content {
    match result {
        Ok(lines) => Content::from_plain(lines),
        Err(e) => {
            debug!(provider, error = %e, "Fetch failed, returning empty content");
            Content::empty()
        }
    }
}

/// Runs one external command
pub struct CommandProvider {
    spec: CommandSpec,
}

impl CommandProvider {
    pub fn new(spec: CommandSpec) -> Result<Self, ProviderError> {
        if spec.program.trim().is_empty() {
            return Err(ProviderError::creation("command", "program cannot be empty"));
        }
        Ok(Self { spec })
    }
}

impl ContentProvider for CommandProvider {
    fn name(&self) -> &str {
        "command"
    }

    fn fetch(&self) -> Content {
        lines_or_empty(self.name(), execute_simple(&self.spec))
    }
}

/// Runs `first | second`
pub struct PipeProvider {
    first: CommandSpec,
    second: CommandSpec,
}

impl PipeProvider {
    pub fn new(first: CommandSpec, second: CommandSpec) -> Result<Self, ProviderError> {
        if first.program.trim().is_empty() || second.program.trim().is_empty() {
            return Err(ProviderError::creation("pipe", "both programs must be set"));
        }
        Ok(Self { first, second })
    }
}

impl ContentProvider for PipeProvider {
    fn name(&self) -> &str {
        "pipe"
    }

    fn fetch(&self) -> Content {
        lines_or_empty(self.name(), execute_compound(&self.first, &self.second))
    }
}
