use crate::host::HostContext;
use crate::state::AlertKind;

pub fn render(kind: AlertKind, host: &HostContext, target: &str, usage: f64, threshold: f64) -> String {
    let identity = format!(
        "Hostname: {}\nIP Address: {}\nLocation: {}",
        host.hostname, host.public_ip, host.location
    );

    match kind {
        AlertKind::Initial => format!(
            "Disk Usage Warning!\n\n{identity}\n\nDisk: {target}\nUsage: {usage:.2}%\nThreshold: {threshold}%\n\nPlease take action to free up disk space."
        ),
        AlertKind::Reminder => format!(
            "Reminder: Disk usage on {target} is still above {threshold}% at {usage:.2}% capacity.\n\n{identity}"
        ),
        AlertKind::Recovery => {
            format!("Disk usage on {target} is back to normal ({usage:.2}%).\n\n{identity}")
        }
    }
}
