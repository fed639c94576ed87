use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::tool::{self, TOOL_TIMEOUT};

pub const UNKNOWN: &str = "Unknown";

const IPAPI_BASE_URL: &str = "https://ipapi.co";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const INTERFACE_LISTINGS: [(&str, &[&str]); 2] = [("ip", &["-o", "addr", "show"]), ("ifconfig", &[])];

#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn resolve_public_address(&self) -> Option<IpAddr>;
    async fn resolve_location(&self, address: IpAddr) -> String;
}

pub struct IpApiResolver {
    client: reqwest::Client,
    base_url: String,
}

impl IpApiResolver {
    pub fn new() -> Self {
        Self::with_base_url(IPAPI_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn lookup(&self, address: IpAddr) -> Result<IpApiResponse, reqwest::Error> {
        let url = format!("{}/{address}/json/", self.base_url);
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<IpApiResponse>()
            .await
    }
}

impl Default for IpApiResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationResolver for IpApiResolver {
    async fn resolve_public_address(&self) -> Option<IpAddr> {
        for (program, args) in INTERFACE_LISTINGS {
            let listing = match tool::run(program, args, TOOL_TIMEOUT).await {
                Ok(listing) => listing,
                Err(err) => {
                    debug!(program, error = ?err, "interface listing unavailable");
                    continue;
                }
            };

            if let Some(address) = public_addresses(&listing).into_iter().next() {
                return Some(address);
            }
        }

        debug!("no public address found");
        None
    }

    async fn resolve_location(&self, address: IpAddr) -> String {
        match self.lookup(address).await {
            Ok(body) => body.describe(),
            Err(err) => {
                debug!(%address, error = %err, "location lookup failed");
                UNKNOWN.to_string()
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IpApiResponse {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country_name: Option<String>,
}

impl IpApiResponse {
    pub fn describe(&self) -> String {
        let part = |v: &Option<String>| v.clone().unwrap_or_else(|| UNKNOWN.to_string());
        format!(
            "{}, {}, {}",
            part(&self.city),
            part(&self.region),
            part(&self.country_name)
        )
    }
}

/// Publicly routable addresses found in `ip -o addr` or `ifconfig` output, in order.
pub fn public_addresses(listing: &str) -> Vec<IpAddr> {
    let mut found = Vec::new();
    let mut tokens = listing.split_whitespace();

    while let Some(token) = tokens.next() {
        if token != "inet" && token != "inet6" {
            continue;
        }
        let Some(raw) = tokens.next() else {
            break;
        };
        // `ip` prints CIDR, old `ifconfig` prints `addr:x.x.x.x`, BSD appends `%scope`.
        let raw = raw.strip_prefix("addr:").unwrap_or(raw);
        let raw = raw.split(['/', '%']).next().unwrap_or(raw);

        let Ok(address) = raw.parse::<IpAddr>() else {
            continue;
        };
        if is_public(&address) && !found.contains(&address) {
            found.push(address);
        }
    }

    found
}

fn is_public(address: &IpAddr) -> bool {
    match address {
        IpAddr::V4(v4) => {
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            let unique_local = (first & 0xfe00) == 0xfc00;
            let link_local = (first & 0xffc0) == 0xfe80;
            !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_addr_listing_skips_private_ranges() {
        let listing = "\
1: lo    inet 127.0.0.1/8 scope host lo\\       valid_lft forever preferred_lft forever
2: eth0    inet 192.168.1.20/24 brd 192.168.1.255 scope global eth0
3: eth1    inet 203.0.113.7/24 brd 203.0.113.255 scope global eth1
4: docker0    inet 172.17.0.1/16 brd 172.17.255.255 scope global docker0
5: wg0    inet 10.8.0.2/24 scope global wg0
3: eth1    inet6 fe80::1/64 scope link
3: eth1    inet6 2001:db8::7/64 scope global
";

        let found = public_addresses(listing);

        assert_eq!(
            found,
            vec![
                "203.0.113.7".parse::<IpAddr>().expect("v4"),
                "2001:db8::7".parse::<IpAddr>().expect("v6"),
            ]
        );
    }

    #[test]
    fn legacy_ifconfig_listing_is_understood() {
        let listing = "\
eth0      Link encap:Ethernet  HWaddr 00:11:22:33:44:55
          inet addr:198.51.100.4  Bcast:198.51.100.255  Mask:255.255.255.0
lo        Link encap:Local Loopback
          inet addr:127.0.0.1  Mask:255.0.0.0
";

        assert_eq!(
            public_addresses(listing),
            vec!["198.51.100.4".parse::<IpAddr>().expect("v4")]
        );
    }

    #[test]
    fn no_public_interface_yields_nothing() {
        let listing = "inet 127.0.0.1 netmask 0xff000000\ninet 10.0.0.5 netmask 0xffffff00\n";
        assert!(public_addresses(listing).is_empty());
    }

    #[test]
    fn location_fields_default_to_unknown() {
        let full: IpApiResponse = serde_json::from_str(
            r#"{"ip":"203.0.113.7","city":"Lisbon","region":"Lisbon","country_name":"Portugal"}"#,
        )
        .expect("decode");
        assert_eq!(full.describe(), "Lisbon, Lisbon, Portugal");

        let partial: IpApiResponse =
            serde_json::from_str(r#"{"country_name":"Portugal"}"#).expect("decode");
        assert_eq!(partial.describe(), "Unknown, Unknown, Portugal");
    }

    #[tokio::test]
    async fn unreachable_lookup_degrades_to_unknown() {
        let resolver = IpApiResolver::with_base_url("http://127.0.0.1:9");

        let location = resolver
            .resolve_location("203.0.113.7".parse().expect("addr"))
            .await;

        assert_eq!(location, UNKNOWN);
    }
}
