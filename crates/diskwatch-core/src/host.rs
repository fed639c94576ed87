use serde::{Deserialize, Serialize};
use sysinfo::System;
use tracing::info;

use crate::location::{LocationResolver, UNKNOWN};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostContext {
    pub hostname: String,
    pub public_ip: String,
    pub location: String,
}

impl HostContext {
    pub async fn resolve<R: LocationResolver + ?Sized>(resolver: &R) -> Self {
        let hostname = local_hostname();
        let (public_ip, location) = match resolver.resolve_public_address().await {
            Some(address) => (address.to_string(), resolver.resolve_location(address).await),
            None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
        };

        let host = Self {
            hostname,
            public_ip,
            location,
        };
        info!(hostname = %host.hostname, ip = %host.public_ip, location = %host.location, "host context resolved");
        host
    }
}

fn local_hostname() -> String {
    System::host_name()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
