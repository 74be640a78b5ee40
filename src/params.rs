use std::time::Duration;

use circle_gesture_config::{Buffering, Config, FitMethod, Recognition};

use crate::buffer::DuplicatePolicy;

/// Settings for one gesture attempt, with out-of-range values already corrected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecognitionParameters {
    pub min_hold: Duration,
    pub max_hold: Duration,
    /// In `(0, 100]`.
    pub accuracy_percent: f64,
    pub fit_method: FitMethod,
    pub require_trigger: bool,
    pub duplicates: DuplicatePolicy,
}

impl Default for RecognitionParameters {
    fn default() -> Self {
        Self::new(&Recognition::default(), &Buffering::default())
    }
}

impl RecognitionParameters {
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.recognition, &config.buffering)
    }

    /// Builds the parameters, substituting the defaults for values that make no sense.
    pub fn new(recognition: &Recognition, buffering: &Buffering) -> Self {
        let defaults = Recognition::default();

        let min_hold = duration_or_default(
            "min-hold-duration",
            recognition.min_hold_duration,
            defaults.min_hold_duration,
        );
        let mut max_hold = duration_or_default(
            "max-hold-duration",
            recognition.max_hold_duration,
            defaults.max_hold_duration,
        );
        if max_hold < min_hold {
            warn!(
                "max-hold-duration {max_hold:?} is shorter than min-hold-duration {min_hold:?}, \
                 using the default"
            );
            max_hold = Duration::from_secs_f64(defaults.max_hold_duration).max(min_hold);
        }

        let accuracy_percent = recognition.accuracy_percent;
        let accuracy_percent = if accuracy_percent > 0. && accuracy_percent <= 100. {
            accuracy_percent
        } else {
            warn!(
                "accuracy-percent must be in (0, 100], got {accuracy_percent}, using {}",
                defaults.accuracy_percent
            );
            defaults.accuracy_percent
        };

        let duplicates = if buffering.suppress_duplicates {
            DuplicatePolicy::SkipRepeated
        } else {
            DuplicatePolicy::Keep
        };

        Self {
            min_hold,
            max_hold,
            accuracy_percent,
            fit_method: recognition.fit_method,
            require_trigger: recognition.require_trigger,
            duplicates,
        }
    }
}

fn duration_or_default(name: &str, secs: f64, default: f64) -> Duration {
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) if !duration.is_zero() => duration,
        _ => {
            warn!("{name} must be positive, got {secs}, using {default}");
            Duration::from_secs_f64(default)
        }
    }
}
