use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::probe::ProbeError;

pub(crate) const TOOL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub(crate) enum ToolFailure {
    Spawn(std::io::Error),
    TimedOut(Duration),
    Exited(String),
    Encoding(std::string::FromUtf8Error),
}

impl ToolFailure {
    pub(crate) fn into_probe_error(self, tool: &str) -> ProbeError {
        match self {
            ToolFailure::Spawn(err) => ProbeError::Tool {
                tool: tool.to_string(),
                message: err.to_string(),
            },
            ToolFailure::TimedOut(limit) => ProbeError::Tool {
                tool: tool.to_string(),
                message: format!("timed out after {}ms", limit.as_millis()),
            },
            ToolFailure::Exited(message) => ProbeError::Tool {
                tool: tool.to_string(),
                message,
            },
            ToolFailure::Encoding(err) => ProbeError::Unparseable(format!("{tool}: {err}")),
        }
    }
}

/// Runs `program` to completion and returns stdout; the child is killed once `limit` passes.
pub(crate) async fn run(program: &str, args: &[&str], limit: Duration) -> Result<String, ToolFailure> {
    let pending = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    let output = timeout(limit, pending)
        .await
        .map_err(|_| ToolFailure::TimedOut(limit))?
        .map_err(ToolFailure::Spawn)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ToolFailure::Exited(format!("{} {}", output.status, stderr.trim())));
    }

    String::from_utf8(output.stdout).map_err(ToolFailure::Encoding)
}
