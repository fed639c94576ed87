use anyhow::Result;
use diskwatch_core::{HostContext, UtilizationReading};

use crate::OutputFormat;

pub(crate) fn render_reading(reading: &UtilizationReading, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(reading)?),
        OutputFormat::Human => {
            let mut out = String::new();
            out.push_str("=== Disk Reading ===\n");
            out.push_str(&format!("Time:       {}\n", reading.taken_at.to_rfc3339()));
            out.push_str(&format!("Target:     {}\n", reading.target));
            out.push_str(&format!("Usage:      {:.2}%", reading.percent_used));
            if let Some(diagnostics) = &reading.diagnostics {
                out.push_str("\n\nDiagnostics:\n");
                out.push_str(diagnostics.trim_end());
            }
            Ok(out)
        }
    }
}

pub(crate) fn render_host(host: &HostContext, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(host)?),
        OutputFormat::Human => Ok(format!(
            "Hostname:   {}\nIP Address: {}\nLocation:   {}",
            host.hostname, host.public_ip, host.location
        )),
    }
}
