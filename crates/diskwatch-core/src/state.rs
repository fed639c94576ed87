use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Initial,
    Reminder,
    Recovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorState {
    pub above_threshold: bool,
    pub last_notified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub state: MonitorState,
    pub action: Option<AlertKind>,
}

impl MonitorState {
    pub fn is_alerting(&self) -> bool {
        self.above_threshold
    }

    pub fn evaluate(
        self,
        usage: f64,
        threshold: f64,
        nag_interval: Duration,
        now: DateTime<Utc>,
    ) -> Evaluation {
        if usage > threshold {
            if !self.above_threshold {
                return Evaluation {
                    state: MonitorState {
                        above_threshold: true,
                        last_notified_at: Some(now),
                    },
                    action: Some(AlertKind::Initial),
                };
            }

            if self.nag_due(nag_interval, now) {
                return Evaluation {
                    state: MonitorState {
                        above_threshold: true,
                        last_notified_at: Some(now),
                    },
                    action: Some(AlertKind::Reminder),
                };
            }

            return Evaluation {
                state: self,
                action: None,
            };
        }

        if self.above_threshold {
            // last_notified_at is left as-is; it is not consulted in Normal.
            return Evaluation {
                state: MonitorState {
                    above_threshold: false,
                    ..self
                },
                action: Some(AlertKind::Recovery),
            };
        }

        Evaluation {
            state: self,
            action: None,
        }
    }

    fn nag_due(&self, nag_interval: Duration, now: DateTime<Utc>) -> bool {
        let Some(last) = self.last_notified_at else {
            return true;
        };
        // A clock stepping backwards yields a negative delta; count it as zero.
        let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
        elapsed >= nag_interval
    }
}
