use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::MonitorConfig;
use crate::host::HostContext;
use crate::message;
use crate::notifier::{DeliveryResult, Notifier};
use crate::probe::UtilizationProbe;
use crate::state::{AlertKind, MonitorState};

#[derive(Debug)]
pub enum CycleOutcome {
    ProbeFailed {
        error: String,
    },
    Evaluated {
        usage: f64,
        action: Option<AlertKind>,
        delivery: Option<Result<DeliveryResult, String>>,
    },
}

pub struct Monitor<P: UtilizationProbe, N: Notifier, C: Clock> {
    config: MonitorConfig,
    host: HostContext,
    probe: P,
    notifier: N,
    clock: C,
    state: MonitorState,
}

impl<P: UtilizationProbe, N: Notifier, C: Clock> Monitor<P, N, C> {
    pub fn new(config: MonitorConfig, host: HostContext, probe: P, notifier: N, clock: C) -> Self {
        Self {
            config,
            host,
            probe,
            notifier,
            clock,
            state: MonitorState::default(),
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub async fn tick(&mut self) -> CycleOutcome {
        let target = self.config.target.as_str();

        let reading = match self.probe.probe(target).await {
            Ok(reading) => reading,
            Err(err) => {
                warn!(disk = target, error = %err, "probe failed, skipping cycle");
                return CycleOutcome::ProbeFailed {
                    error: err.to_string(),
                };
            }
        };

        let usage = reading.percent_used;
        debug!(disk = target, usage = format_args!("{usage:.2}"), "current disk usage");
        if let Some(diagnostics) = reading.diagnostics.as_deref() {
            debug!(disk = target, %diagnostics, "disk diagnostics");
        }

        let now = self.clock.now();
        let evaluation = self
            .state
            .evaluate(usage, self.config.threshold, self.config.nag_interval, now);
        // Committed before delivery: a failed send still counts as the notification.
        self.state = evaluation.state;

        let Some(kind) = evaluation.action else {
            debug!(disk = target, alerting = self.state.is_alerting(), "no notification due");
            return CycleOutcome::Evaluated {
                usage,
                action: None,
                delivery: None,
            };
        };

        let text = message::render(kind, &self.host, target, usage, self.config.threshold);
        let delivery = match self.notifier.notify(&text).await {
            Ok(result) => {
                if result.is_success() {
                    info!(?kind, status = result.status, response = %result.body, "notification sent");
                } else {
                    warn!(?kind, status = result.status, response = %result.body, "notification rejected");
                }
                Ok(result)
            }
            Err(err) => {
                warn!(?kind, error = %err, "notification delivery failed");
                Err(err.to_string())
            }
        };

        CycleOutcome::Evaluated {
            usage,
            action: Some(kind),
            delivery: Some(delivery),
        }
    }

    pub async fn run(&mut self, cancel: CancellationToken) {
        info!(
            disk = %self.config.target,
            threshold = self.config.threshold,
            interval_secs = self.config.polling_interval.as_secs(),
            nag_secs = self.config.nag_interval.as_secs(),
            "monitor started"
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }

            self.tick().await;

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.clock.sleep(self.config.polling_interval) => {}
            }
        }

        info!("monitor stopped");
    }
}
