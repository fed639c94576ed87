use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tool::{self, ToolFailure, TOOL_TIMEOUT};

const FSTAB_PATH: &str = "/etc/fstab";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilizationReading {
    pub target: String,
    pub percent_used: f64,
    pub taken_at: DateTime<Utc>,
    pub diagnostics: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("target not found: {0}")]
    TargetNotFound(String),
    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },
    #[error("unparseable output: {0}")]
    Unparseable(String),
}

#[async_trait]
pub trait UtilizationProbe: Send + Sync {
    async fn probe(&self, target: &str) -> Result<UtilizationReading, ProbeError>;
}

#[derive(Debug, Clone)]
pub struct DfProbe {
    collect_diagnostics: bool,
}

impl DfProbe {
    pub fn new(collect_diagnostics: bool) -> Self {
        Self { collect_diagnostics }
    }

    async fn collect_diagnostics(target: &str) -> Result<String, ProbeError> {
        let blkid = tool::run("blkid", &[target], TOOL_TIMEOUT)
            .await
            .map_err(|err| err.into_probe_error("blkid"))?;
        let fstab = tokio::fs::read_to_string(FSTAB_PATH)
            .await
            .map_err(|err| ProbeError::Tool {
                tool: FSTAB_PATH.to_string(),
                message: err.to_string(),
            })?;
        let fdisk = tool::run("fdisk", &["-l", target], TOOL_TIMEOUT)
            .await
            .map_err(|err| err.into_probe_error("fdisk"))?;

        Ok(format!(
            "blkid: {}\n\n{FSTAB_PATH}:\n{fstab}\n\nfdisk -l {target}:\n{fdisk}",
            blkid.trim()
        ))
    }
}

impl Default for DfProbe {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl UtilizationProbe for DfProbe {
    async fn probe(&self, target: &str) -> Result<UtilizationReading, ProbeError> {
        let output = tool::run("df", &["-P", target], TOOL_TIMEOUT)
            .await
            .map_err(|err| match err {
                ToolFailure::Exited(message) => ProbeError::TargetNotFound(format!("{target}: {message}")),
                other => other.into_probe_error("df"),
            })?;
        let percent_used = parse_df_output(&output)?;

        let diagnostics = if self.collect_diagnostics {
            Some(Self::collect_diagnostics(target).await?)
        } else {
            None
        };

        Ok(UtilizationReading {
            target: target.to_string(),
            percent_used,
            taken_at: Utc::now(),
            diagnostics,
        })
    }
}

/// Extracts the capacity column (`NN%`) from the first data row of `df` output.
pub fn parse_df_output(output: &str) -> Result<f64, ProbeError> {
    let row = output
        .lines()
        .nth(1)
        .ok_or_else(|| ProbeError::Unparseable("missing data row".to_string()))?;

    let field = row
        .split_whitespace()
        .nth(4)
        .ok_or_else(|| ProbeError::Unparseable(format!("short row: {row:?}")))?;

    let percent: f64 = field
        .trim_end_matches('%')
        .parse()
        .map_err(|_| ProbeError::Unparseable(format!("capacity field {field:?}")))?;

    if !(0.0..=100.0).contains(&percent) {
        return Err(ProbeError::Unparseable(format!("capacity out of range: {percent}")));
    }

    Ok(percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_posix_df_output() {
        let output = "\
Filesystem     1024-blocks     Used Available Capacity Mounted on
/dev/sda1        102687672 87284520  10147280 90% /
";
        assert_eq!(parse_df_output(output).expect("parse"), 90.0);
    }

    #[test]
    fn parses_human_readable_df_output() {
        let output = "\
Filesystem      Size  Used Avail Use% Mounted on
/dev/nvme0n1p2  468G  191G  254G  43% /
";
        assert_eq!(parse_df_output(output).expect("parse"), 43.0);
    }

    #[test]
    fn header_only_is_unparseable() {
        let output = "Filesystem Size Used Avail Use% Mounted on\n";
        assert!(matches!(parse_df_output(output), Err(ProbeError::Unparseable(_))));
    }

    #[test]
    fn short_or_non_numeric_rows_are_unparseable() {
        for output in [
            "hdr\n/dev/sda1 10 5\n",
            "hdr\ntmpfs 0 0 0 - /run/user\n",
            "hdr\n/dev/sda1 10 5 5 150% /\n",
        ] {
            assert!(
                matches!(parse_df_output(output), Err(ProbeError::Unparseable(_))),
                "output {output:?}"
            );
        }
    }

    #[tokio::test]
    async fn failed_diagnostics_fail_the_reading() {
        // blkid rejects a directory, so the bundle cannot be built for "/".
        let result = DfProbe::new(true).probe("/").await;

        assert!(matches!(result, Err(ProbeError::Tool { .. })), "got {result:?}");
    }

    #[tokio::test]
    async fn diagnostics_off_reads_usage_only() {
        let reading = DfProbe::new(false).probe("/").await.expect("df on /");

        assert!((0.0..=100.0).contains(&reading.percent_used));
        assert!(reading.diagnostics.is_none());
    }

    #[tokio::test]
    async fn missing_target_is_reported_not_panicked() {
        let probe = DfProbe::new(false);

        let result = probe.probe("/definitely/not/a/real/mount/point").await;

        assert!(result.is_err());
    }
}
