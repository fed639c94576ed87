pub mod clock;
pub mod config;
pub mod duration;
pub mod host;
pub mod location;
pub mod message;
pub mod monitor;
pub mod notifier;
pub mod probe;
pub mod state;
mod tool;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, Credentials, MonitorConfig};
pub use duration::{parse_duration, parse_duration_secs, DurationError};
pub use host::HostContext;
pub use location::{IpApiResolver, LocationResolver};
pub use monitor::{CycleOutcome, Monitor};
pub use notifier::{DeliveryError, DeliveryResult, Notifier, PushoverNotifier};
pub use probe::{DfProbe, ProbeError, UtilizationProbe, UtilizationReading};
pub use state::{AlertKind, Evaluation, MonitorState};
