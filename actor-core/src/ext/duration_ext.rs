use std::time::Duration;

use crate::util::duration::ConfigDuration;

pub trait DurationExt {
    fn millis(self) -> Duration;

    fn config_millis(self) -> ConfigDuration;
}

impl DurationExt for u64 {
    fn millis(self) -> Duration {
        Duration::from_millis(self)
    }

    fn config_millis(self) -> ConfigDuration {
        ConfigDuration::from_millis(self)
    }
}
