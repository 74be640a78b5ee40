//! Circle gesture state machine.
//!
//! Tracks one gesture attempt at a time: the attempt starts when the control is actuated,
//! performs once the buffered path forms a circle, and cancels when the control (or the
//! auxiliary button that started it) is released or when the attempt runs out of time.
//!
//! The host drives the recognizer by calling [`GestureRecognizer::process`] once per input
//! update. Timeouts are polled against sample timestamps, so there are no timers.

use std::time::Duration;

use glam::DVec2;
use serde::Serialize;

use crate::buffer::{GestureBuffer, Push, Sample};
use crate::geometry::{self, BandWidth, Circle};
use crate::params::RecognitionParameters;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Waiting,
    Started,
    Performed,
}

/// Transition reported to the host for one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseEvent {
    None,
    Started,
    Performed,
    Canceled,
}

/// Host-provided token for the auxiliary control that started an attempt.
///
/// The recognizer never looks inside it; it only checks that the host keeps reporting the same
/// token while the attempt is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Latch(pub u32);

#[derive(Debug)]
pub struct GestureRecognizer {
    params: RecognitionParameters,
    phase: Phase,
    buffer: GestureBuffer,
    /// Timestamp of the sample that started the current attempt.
    started_at: Option<Duration>,
    latch: Option<Latch>,
}

impl GestureRecognizer {
    pub fn new(params: RecognitionParameters) -> Self {
        Self {
            params,
            phase: Phase::Waiting,
            buffer: GestureBuffer::new(),
            started_at: None,
            latch: None,
        }
    }

    pub fn params(&self) -> &RecognitionParameters {
        &self.params
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn latch(&self) -> Option<Latch> {
        self.latch
    }

    pub fn buffer(&self) -> &GestureBuffer {
        &self.buffer
    }

    /// Advances the state machine by one input update.
    ///
    /// `actuated` is whether the bound control is actuated. `trigger` is the auxiliary control
    /// the host currently sees held, if any.
    pub fn process(
        &mut self,
        sample: Sample,
        actuated: bool,
        trigger: Option<Latch>,
    ) -> PhaseEvent {
        let _span = tracy_client::span!("GestureRecognizer::process");

        match self.phase {
            Phase::Waiting => self.process_waiting(sample, actuated, trigger),
            Phase::Started => self.process_started(sample, actuated, trigger),
            Phase::Performed => {
                if self.is_held(actuated, trigger) {
                    PhaseEvent::None
                } else {
                    self.cancel("released after performing")
                }
            }
        }
    }

    /// Drops the current attempt without reporting a cancellation.
    pub fn reset(&mut self) {
        if self.phase != Phase::Waiting {
            debug!("resetting circle gesture in phase {:?}", self.phase);
        }

        self.reset_state();
    }

    /// Circle fitted to the current samples with the configured method.
    pub fn fitted_circle(&self) -> Option<Circle> {
        if self.buffer.is_empty() {
            return None;
        }

        geometry::fit_circle(self.params.fit_method, self.buffer.positions())
    }

    /// Samples that fall outside the tolerance band of [`Self::fitted_circle`].
    ///
    /// Only meant for visualizing an attempt; the recognizer does not use it.
    pub fn incorrect_points(&self) -> Vec<DVec2> {
        let Some(circle) = self.fitted_circle() else {
            return Vec::new();
        };

        let band_width =
            BandWidth::for_method(self.params.fit_method).unwrap_or(BandWidth::Standard);
        geometry::incorrect_points(
            self.buffer.positions(),
            circle,
            self.params.accuracy_percent,
            band_width,
        )
    }

    fn process_waiting(
        &mut self,
        sample: Sample,
        actuated: bool,
        trigger: Option<Latch>,
    ) -> PhaseEvent {
        if !actuated {
            return PhaseEvent::None;
        }

        if self.params.require_trigger && trigger.is_none() {
            trace!("control actuated without a trigger held, not starting");
            return PhaseEvent::None;
        }

        self.buffer.clear();
        self.buffer.push(sample, self.params.duplicates);
        self.started_at = Some(sample.timestamp);
        self.latch = trigger;
        self.phase = Phase::Started;

        debug!(
            "circle gesture started at {:?} with latch {:?}",
            sample.timestamp, self.latch
        );
        PhaseEvent::Started
    }

    fn process_started(
        &mut self,
        sample: Sample,
        actuated: bool,
        trigger: Option<Latch>,
    ) -> PhaseEvent {
        if !self.is_held(actuated, trigger) {
            return self.cancel("released before performing");
        }

        // An out-of-order sample is never past the timeout: the last accepted one was not.
        let started_at = self.started_at.unwrap_or(sample.timestamp);
        let elapsed = sample.timestamp.saturating_sub(started_at);
        if elapsed > self.params.max_hold {
            return self.cancel("timed out");
        }

        match self.buffer.push(sample, self.params.duplicates) {
            Push::Appended => (),
            Push::Duplicate => trace!("skipping repeated position {:?}", sample.position),
            Push::OutOfOrder => return PhaseEvent::None,
        }

        if elapsed < self.params.min_hold {
            return PhaseEvent::None;
        }

        if geometry::is_circle(
            self.buffer.positions(),
            self.params.fit_method,
            self.params.accuracy_percent,
        ) {
            self.phase = Phase::Performed;
            debug!(
                "circle gesture performed after {elapsed:?} with {} samples",
                self.buffer.len()
            );
            return PhaseEvent::Performed;
        }

        PhaseEvent::None
    }

    fn is_held(&self, actuated: bool, trigger: Option<Latch>) -> bool {
        actuated && self.latch.map_or(true, |latch| trigger == Some(latch))
    }

    fn cancel(&mut self, reason: &str) -> PhaseEvent {
        debug!("circle gesture canceled: {reason}");
        self.reset_state();
        PhaseEvent::Canceled
    }

    fn reset_state(&mut self) {
        self.phase = Phase::Waiting;
        self.buffer.clear();
        self.started_at = None;
        self.latch = None;
    }
}

#[cfg(test)]
mod tests;
