use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Duration written as a table of units in config files, e.g.
/// `[addressable_ttl] minutes = 10`. Absent units count as zero.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milliseconds: Option<u64>,
}

impl ConfigDuration {
    pub fn to_std_duration(&self) -> Duration {
        let hours = self.hours.unwrap_or(0);
        let minutes = self.minutes.unwrap_or(0);
        let seconds = self.seconds.unwrap_or(0);
        let milliseconds = self.milliseconds.unwrap_or(0);
        let secs = hours.saturating_mul(60 * 60)
            .saturating_add(minutes.saturating_mul(60))
            .saturating_add(seconds);
        Duration::from_secs(secs).saturating_add(Duration::from_millis(milliseconds))
    }

    pub fn from_millis(millis: u64) -> Self {
        Self {
            milliseconds: Some(millis),
            ..Default::default()
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self {
            seconds: Some(secs),
            ..Default::default()
        }
    }
}

impl From<ConfigDuration> for Duration {
    fn from(value: ConfigDuration) -> Self {
        value.to_std_duration()
    }
}
