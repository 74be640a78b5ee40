use std::time::Duration;

use glam::DVec2;

/// One pointer or stick reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub position: DVec2,
    pub timestamp: Duration,
}

impl Sample {
    pub fn new(position: DVec2, timestamp: Duration) -> Self {
        Self {
            position,
            timestamp,
        }
    }
}

/// What to do with a sample at the same position as the one before it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    #[default]
    Keep,
    SkipRepeated,
}

/// Outcome of [`GestureBuffer::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Push {
    Appended,
    /// Same position as the previous sample, dropped by [`DuplicatePolicy::SkipRepeated`].
    Duplicate,
    /// Timestamp earlier than the previous sample, dropped.
    OutOfOrder,
}

/// Samples of one gesture attempt, in arrival order.
///
/// Positions and timestamps are stored apart so the geometry code can borrow the positions as
/// a plain slice. Clearing keeps the allocation for the next attempt.
#[derive(Debug, Default)]
pub struct GestureBuffer {
    positions: Vec<DVec2>,
    timestamps: Vec<Duration>,
}

impl GestureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sample unless it is out of order or a suppressed duplicate.
    pub fn push(&mut self, sample: Sample, duplicates: DuplicatePolicy) -> Push {
        // For the devices that we care about, timestamps should always increase monotonically.
        if let Some(&last) = self.timestamps.last() {
            if sample.timestamp < last {
                trace!(
                    "ignoring sample with timestamp {:?} earlier than last {last:?}",
                    sample.timestamp
                );
                return Push::OutOfOrder;
            }
        }

        if duplicates == DuplicatePolicy::SkipRepeated
            && self.positions.last() == Some(&sample.position)
        {
            return Push::Duplicate;
        }

        self.positions.push(sample.position);
        self.timestamps.push(sample.timestamp);
        Push::Appended
    }

    pub fn positions(&self) -> &[DVec2] {
        &self.positions
    }

    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.positions
            .iter()
            .zip(&self.timestamps)
            .map(|(&position, &timestamp)| Sample::new(position, timestamp))
    }

    pub fn last_timestamp(&self) -> Option<Duration> {
        self.timestamps.last().copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.timestamps.clear();
    }
}
