//! Replaying recorded input through a recognizer.
//!
//! A trace is a JSON-lines file with one record per input update:
//!
//! ```text
//! {"t": 0.016, "x": 412.0, "y": 300.5, "actuated": true, "trigger": 0}
//! ```
//!
//! `t` is in seconds. `actuated` defaults to `true` and `trigger` to none. Blank lines and lines
//! starting with `//` are skipped.

use std::io::BufRead;
use std::time::Duration;

use anyhow::{bail, Context};
use glam::DVec2;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::buffer::Sample;
use crate::geometry::Circle;
use crate::recognizer::{GestureRecognizer, Latch, PhaseEvent};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TraceRecord {
    #[serde(rename = "t", deserialize_with = "deserialize_secs")]
    pub timestamp: Duration,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_actuated")]
    pub actuated: bool,
    #[serde(default)]
    pub trigger: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayEvent {
    pub tick: usize,
    pub t: f64,
    pub event: PhaseEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Diagnostics>,
}

/// State of the attempt when it performed or just before it canceled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub circle: Option<Circle>,
    pub incorrect_points: Vec<DVec2>,
}

fn default_actuated() -> bool {
    true
}

fn deserialize_secs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(|_| {
        de::Error::custom(format!(
            "timestamp must be a non-negative number of seconds, got {secs}"
        ))
    })
}

impl TraceRecord {
    pub fn sample(&self) -> Sample {
        Sample::new(DVec2::new(self.x, self.y), self.timestamp)
    }
}

impl Diagnostics {
    fn capture(recognizer: &GestureRecognizer) -> Self {
        Self {
            circle: recognizer.fitted_circle(),
            incorrect_points: recognizer.incorrect_points(),
        }
    }
}

/// Reads and validates a trace.
pub fn read_trace(reader: impl BufRead) -> anyhow::Result<Vec<TraceRecord>> {
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line.with_context(|| format!("error reading line {line_number}"))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        let record: TraceRecord = serde_json::from_str(line)
            .with_context(|| format!("error parsing line {line_number}"))?;

        if !record.x.is_finite() || !record.y.is_finite() {
            bail!("line {line_number}: position must be finite");
        }

        records.push(record);
    }

    Ok(records)
}

/// Feeds every record to the recognizer and returns the ticks that changed its phase.
///
/// With `diagnostics`, performed and canceled events carry the fitted circle and the samples
/// outside its tolerance band.
pub fn replay(
    recognizer: &mut GestureRecognizer,
    records: &[TraceRecord],
    diagnostics: bool,
) -> Vec<ReplayEvent> {
    let mut events = Vec::new();

    for (tick, record) in records.iter().enumerate() {
        // Cancellation drops the buffer, so capture before processing.
        let before = diagnostics.then(|| Diagnostics::capture(recognizer));

        let event = recognizer.process(
            record.sample(),
            record.actuated,
            record.trigger.map(Latch),
        );

        let captured = match event {
            PhaseEvent::None => continue,
            PhaseEvent::Started => None,
            PhaseEvent::Performed if diagnostics => Some(Diagnostics::capture(recognizer)),
            PhaseEvent::Performed => None,
            PhaseEvent::Canceled => before,
        };

        events.push(ReplayEvent {
            tick,
            t: record.timestamp.as_secs_f64(),
            event,
            diagnostics: captured,
        });
    }

    events
}
