use crate::utils::{Flag, MergeWith};
use crate::FloatOrInt;

/// How a candidate circle is derived from the buffered samples.
#[derive(knuffel::DecodeScalar, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FitMethod {
    /// Furthest pair of samples taken as the diameter.
    #[default]
    Diameter,
    /// Circumcircle of three samples spread over the buffer.
    ThreePoint,
    /// Diameter fit with the older tolerance band formula.
    ///
    /// The band is doubled and then split between both sides, so it accepts the same shapes as
    /// [`FitMethod::Diameter`]. Kept for existing configurations.
    LegacyDiameter,
    /// Fixed unit circle of a normalized two-axis stick.
    RadialDevice,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recognition {
    /// Seconds the control must be held before the shape is evaluated.
    pub min_hold_duration: f64,
    /// Seconds after which an unrecognized attempt is canceled.
    pub max_hold_duration: f64,
    pub accuracy_percent: f64,
    pub fit_method: FitMethod,
    /// Whether an auxiliary button must be held to start an attempt.
    pub require_trigger: bool,
}

impl Default for Recognition {
    fn default() -> Self {
        Self {
            // Matches the usual default hold time of input bindings.
            min_hold_duration: 0.4,
            max_hold_duration: 2.,
            accuracy_percent: 80.,
            fit_method: FitMethod::default(),
            require_trigger: false,
        }
    }
}

// Bounds are only a sanity check on the syntax; the recognizer corrects values that make no
// sense for recognition.
#[derive(knuffel::Decode, Debug, Default, Clone, Copy, PartialEq)]
pub struct RecognitionPart {
    #[knuffel(child, unwrap(argument))]
    pub min_hold_duration: Option<FloatOrInt<-65535, 65535>>,
    #[knuffel(child, unwrap(argument))]
    pub max_hold_duration: Option<FloatOrInt<-65535, 65535>>,
    #[knuffel(child, unwrap(argument))]
    pub accuracy_percent: Option<FloatOrInt<-65535, 65535>>,
    #[knuffel(child, unwrap(argument))]
    pub fit_method: Option<FitMethod>,
    #[knuffel(child)]
    pub require_trigger: Option<Flag>,
}

impl MergeWith<RecognitionPart> for Recognition {
    fn merge_with(&mut self, part: &RecognitionPart) {
        merge!(
            (self, part),
            min_hold_duration,
            max_hold_duration,
            accuracy_percent,
            require_trigger,
        );
        merge_clone!((self, part), fit_method);
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Buffering {
    /// Drop samples whose position repeats the previous sample.
    pub suppress_duplicates: bool,
}

#[derive(knuffel::Decode, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BufferingPart {
    #[knuffel(child)]
    pub suppress_duplicates: Option<Flag>,
}

impl MergeWith<BufferingPart> for Buffering {
    fn merge_with(&mut self, part: &BufferingPart) {
        merge!((self, part), suppress_duplicates);
    }
}
