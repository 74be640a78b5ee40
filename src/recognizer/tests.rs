use std::f64::consts::TAU;

use circle_gesture_config::FitMethod;
use proptest::prelude::*;
use proptest_derive::Arbitrary;

use super::*;
use crate::buffer::DuplicatePolicy;

fn params(min_ms: u64, max_ms: u64, accuracy_percent: f64) -> RecognitionParameters {
    RecognitionParameters {
        min_hold: Duration::from_millis(min_ms),
        max_hold: Duration::from_millis(max_ms),
        accuracy_percent,
        fit_method: FitMethod::Diameter,
        require_trigger: false,
        duplicates: DuplicatePolicy::Keep,
    }
}

fn sample(x: f64, y: f64, ms: u64) -> Sample {
    Sample::new(DVec2::new(x, y), Duration::from_millis(ms))
}

/// Closed loop: the last sample lands back on the first.
fn circle_path(center: DVec2, radius: f64, count: usize, step_ms: u64) -> Vec<Sample> {
    (0..count)
        .map(|i| {
            let angle = TAU * i as f64 / (count - 1) as f64;
            Sample::new(
                center + radius * DVec2::new(angle.cos(), angle.sin()),
                Duration::from_millis(step_ms * i as u64),
            )
        })
        .collect()
}

fn feed(recognizer: &mut GestureRecognizer, samples: &[Sample]) -> Vec<PhaseEvent> {
    samples
        .iter()
        .map(|&s| recognizer.process(s, true, None))
        .collect()
}

#[test]
fn circle_performs() {
    let mut recognizer = GestureRecognizer::new(params(100, 2000, 80.));
    let path = circle_path(DVec2::new(200., 150.), 5., 16, 20);

    let events = feed(&mut recognizer, &path);

    let mut expected = vec![PhaseEvent::Started];
    expected.extend([PhaseEvent::None; 14]);
    expected.push(PhaseEvent::Performed);
    assert_eq!(events, expected);
    assert_eq!(recognizer.phase(), Phase::Performed);
    assert_eq!(recognizer.buffer().len(), 16);
}

#[test]
fn performed_stays_performed_while_held() {
    let mut recognizer = GestureRecognizer::new(params(100, 2000, 80.));
    feed(&mut recognizer, &circle_path(DVec2::ZERO, 5., 16, 20));

    // Past max hold too: a performed gesture does not time out.
    for ms in [400, 1000, 5000] {
        assert_eq!(
            recognizer.process(sample(50., 50., ms), true, None),
            PhaseEvent::None
        );
        assert_eq!(recognizer.phase(), Phase::Performed);
    }

    assert_eq!(
        recognizer.process(sample(50., 50., 5001), false, None),
        PhaseEvent::Canceled
    );
    assert_eq!(recognizer.phase(), Phase::Waiting);
    assert!(recognizer.buffer().is_empty());
}

#[test]
fn straight_line_times_out() {
    let mut recognizer = GestureRecognizer::new(params(100, 2000, 80.));
    let line: Vec<_> = (0..=21).map(|i| sample(i as f64, 0., 100 * i)).collect();

    let events = feed(&mut recognizer, &line);

    let mut expected = vec![PhaseEvent::Started];
    expected.extend([PhaseEvent::None; 20]);
    expected.push(PhaseEvent::Canceled);
    assert_eq!(events, expected);
    assert_eq!(recognizer.phase(), Phase::Waiting);
    assert!(recognizer.buffer().is_empty());
}

#[test]
fn restarts_after_timeout_while_still_held() {
    let mut recognizer = GestureRecognizer::new(params(100, 500, 80.));
    recognizer.process(sample(0., 0., 0), true, None);
    assert_eq!(
        recognizer.process(sample(1., 0., 600), true, None),
        PhaseEvent::Canceled
    );
    assert_eq!(
        recognizer.process(sample(2., 0., 610), true, None),
        PhaseEvent::Started
    );
    assert_eq!(recognizer.buffer().len(), 1);
}

#[test]
fn release_before_min_hold_cancels() {
    let mut recognizer = GestureRecognizer::new(params(100, 2000, 80.));
    assert_eq!(
        recognizer.process(sample(0., 0., 0), true, None),
        PhaseEvent::Started
    );
    assert_eq!(
        recognizer.process(sample(5., 5., 10), true, None),
        PhaseEvent::None
    );
    assert_eq!(
        recognizer.process(sample(5., 5., 20), false, None),
        PhaseEvent::Canceled
    );
    assert_eq!(recognizer.phase(), Phase::Waiting);
    assert!(recognizer.buffer().is_empty());
}

#[test]
fn waiting_ignores_unactuated_control() {
    let mut recognizer = GestureRecognizer::new(params(100, 2000, 80.));
    assert_eq!(
        recognizer.process(sample(0., 0., 0), false, Some(Latch(1))),
        PhaseEvent::None
    );
    assert_eq!(recognizer.phase(), Phase::Waiting);
    assert!(recognizer.buffer().is_empty());
}

#[test]
fn required_trigger_gates_start() {
    let mut recognizer = GestureRecognizer::new(RecognitionParameters {
        require_trigger: true,
        ..params(100, 2000, 80.)
    });

    assert_eq!(
        recognizer.process(sample(0., 0., 0), true, None),
        PhaseEvent::None
    );
    assert_eq!(recognizer.phase(), Phase::Waiting);

    assert_eq!(
        recognizer.process(sample(0., 0., 10), true, Some(Latch(2))),
        PhaseEvent::Started
    );
    assert_eq!(recognizer.latch(), Some(Latch(2)));
}

#[test]
fn latched_trigger_release_cancels() {
    for later in [None, Some(Latch(7))] {
        let mut recognizer = GestureRecognizer::new(RecognitionParameters {
            require_trigger: true,
            ..params(100, 2000, 80.)
        });
        recognizer.process(sample(0., 0., 0), true, Some(Latch(3)));
        assert_eq!(
            recognizer.process(sample(1., 0., 10), true, Some(Latch(3))),
            PhaseEvent::None
        );

        assert_eq!(
            recognizer.process(sample(2., 0., 20), true, later),
            PhaseEvent::Canceled,
            "{later:?}"
        );
        assert_eq!(recognizer.latch(), None);
    }
}

#[test]
fn latched_trigger_release_cancels_performed() {
    let mut recognizer = GestureRecognizer::new(params(100, 2000, 80.));
    let path = circle_path(DVec2::ZERO, 5., 16, 20);
    let events: Vec<_> = path
        .iter()
        .map(|&s| recognizer.process(s, true, Some(Latch(0))))
        .collect();
    assert_eq!(events.last(), Some(&PhaseEvent::Performed));

    assert_eq!(
        recognizer.process(sample(0., 0., 400), true, None),
        PhaseEvent::Canceled
    );
}

#[test]
fn trigger_without_latch_is_ignored() {
    let mut recognizer = GestureRecognizer::new(params(100, 2000, 80.));
    recognizer.process(sample(0., 0., 0), true, None);
    assert_eq!(recognizer.latch(), None);

    assert_eq!(
        recognizer.process(sample(1., 0., 10), true, Some(Latch(4))),
        PhaseEvent::None
    );
    assert_eq!(recognizer.phase(), Phase::Started);
}

#[test]
fn out_of_order_sample_is_ignored() {
    let mut recognizer = GestureRecognizer::new(params(100, 2000, 80.));
    recognizer.process(sample(0., 0., 100), true, None);
    recognizer.process(sample(1., 0., 120), true, None);

    assert_eq!(
        recognizer.process(sample(9., 9., 50), true, None),
        PhaseEvent::None
    );
    assert_eq!(recognizer.phase(), Phase::Started);
    assert_eq!(
        recognizer.buffer().positions(),
        &[DVec2::new(0., 0.), DVec2::new(1., 0.)]
    );
}

#[test]
fn out_of_order_sample_near_timeout_is_ignored() {
    let mut recognizer = GestureRecognizer::new(params(100, 2000, 80.));
    recognizer.process(sample(0., 0., 0), true, None);
    recognizer.process(sample(1., 0., 1900), true, None);

    assert_eq!(
        recognizer.process(sample(2., 0., 1000), true, None),
        PhaseEvent::None
    );
    assert_eq!(recognizer.phase(), Phase::Started);
    assert_eq!(recognizer.buffer().len(), 2);

    assert_eq!(
        recognizer.process(sample(3., 0., 2001), true, None),
        PhaseEvent::Canceled
    );
}

#[test]
fn repeated_positions_can_be_suppressed() {
    let mut recognizer = GestureRecognizer::new(RecognitionParameters {
        duplicates: DuplicatePolicy::SkipRepeated,
        ..params(100, 2000, 80.)
    });

    for ms in 0..10 {
        recognizer.process(sample(3., 3., ms * 10), true, None);
    }
    assert_eq!(recognizer.phase(), Phase::Started);
    assert_eq!(recognizer.buffer().len(), 1);
}

#[test]
fn held_still_never_performs() {
    let mut recognizer = GestureRecognizer::new(params(100, 2000, 80.));
    let still: Vec<_> = (0..50).map(|i| sample(3., 3., 20 * i)).collect();
    assert!(!feed(&mut recognizer, &still).contains(&PhaseEvent::Performed));
}

#[test]
fn three_point_fit_performs() {
    let mut recognizer = GestureRecognizer::new(RecognitionParameters {
        fit_method: FitMethod::ThreePoint,
        ..params(100, 2000, 80.)
    });

    let events = feed(&mut recognizer, &circle_path(DVec2::new(-40., 12.), 30., 16, 20));
    assert_eq!(events.last(), Some(&PhaseEvent::Performed));
}

#[test]
fn radial_device_sweep_performs() {
    let mut recognizer = GestureRecognizer::new(RecognitionParameters {
        fit_method: FitMethod::RadialDevice,
        ..params(100, 2000, 80.)
    });

    let events = feed(&mut recognizer, &circle_path(DVec2::ZERO, 1., 16, 20));
    assert_eq!(events.last(), Some(&PhaseEvent::Performed));
}

#[test]
fn radial_device_half_push_does_not_perform() {
    let mut recognizer = GestureRecognizer::new(RecognitionParameters {
        fit_method: FitMethod::RadialDevice,
        ..params(100, 2000, 80.)
    });

    let events = feed(&mut recognizer, &circle_path(DVec2::ZERO, 0.5, 16, 20));
    assert!(!events.contains(&PhaseEvent::Performed));
}

#[test]
fn reset_returns_to_waiting_from_any_phase() {
    let path = circle_path(DVec2::ZERO, 5., 16, 20);

    // Waiting, Started, Performed.
    for ticks in [0, 3, path.len()] {
        let mut recognizer = GestureRecognizer::new(params(100, 2000, 80.));
        feed(&mut recognizer, &path[..ticks]);

        recognizer.reset();
        assert_eq!(recognizer.phase(), Phase::Waiting);
        assert!(recognizer.buffer().is_empty());
        assert_eq!(recognizer.latch(), None);

        // Next tick starts from scratch.
        assert_eq!(
            recognizer.process(sample(0., 0., 10_000), true, None),
            PhaseEvent::Started
        );
        assert_eq!(recognizer.buffer().len(), 1);
    }
}

#[test]
fn diagnostics_do_not_change_state() {
    let mut recognizer = GestureRecognizer::new(params(100, 2000, 80.));
    let mut path = circle_path(DVec2::ZERO, 5., 16, 20);
    path.truncate(10);
    path.insert(5, sample(0.5, 0.5, 90));
    path[6..].iter_mut().for_each(|s| s.timestamp += Duration::from_millis(1));
    feed(&mut recognizer, &path);

    let phase = recognizer.phase();
    let len = recognizer.buffer().len();

    let first = recognizer.incorrect_points();
    let second = recognizer.incorrect_points();
    assert_eq!(first, second);
    assert!(first.contains(&DVec2::new(0.5, 0.5)));

    assert_eq!(recognizer.phase(), phase);
    assert_eq!(recognizer.buffer().len(), len);
    assert!(recognizer.fitted_circle().is_some());
}

#[test]
fn no_diagnostics_without_samples() {
    let recognizer = GestureRecognizer::new(RecognitionParameters {
        fit_method: FitMethod::RadialDevice,
        ..params(100, 2000, 80.)
    });
    assert_eq!(recognizer.fitted_circle(), None);
    assert!(recognizer.incorrect_points().is_empty());
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Op {
    Move {
        #[proptest(strategy = "-50f64..50.")]
        x: f64,
        #[proptest(strategy = "-50f64..50.")]
        y: f64,
        #[proptest(strategy = "0u64..300")]
        dt_ms: u64,
    },
    Press(#[proptest(strategy = "prop::option::of(0u32..3)")] Option<u32>),
    Release,
    Rewind(#[proptest(strategy = "1u64..200")] u64),
    Reset,
}

struct Harness {
    recognizer: GestureRecognizer,
    now: Duration,
    pos: DVec2,
    actuated: bool,
    trigger: Option<Latch>,
}

impl Harness {
    fn new(params: RecognitionParameters) -> Self {
        Self {
            recognizer: GestureRecognizer::new(params),
            now: Duration::ZERO,
            pos: DVec2::ZERO,
            actuated: false,
            trigger: None,
        }
    }

    fn apply(&mut self, op: Op) {
        let mut timestamp = self.now;
        match op {
            Op::Move { x, y, dt_ms } => {
                self.pos = DVec2::new(x, y);
                self.now += Duration::from_millis(dt_ms);
                timestamp = self.now;
            }
            Op::Press(trigger) => {
                self.actuated = true;
                self.trigger = trigger.map(Latch);
            }
            Op::Release => self.actuated = false,
            Op::Rewind(ms) => timestamp = self.now.saturating_sub(Duration::from_millis(ms)),
            Op::Reset => {
                self.recognizer.reset();
                self.verify_invariants();
                return;
            }
        }

        let before = self.recognizer.phase();
        let event = self.recognizer.process(
            Sample::new(self.pos, timestamp),
            self.actuated,
            self.trigger,
        );
        let after = self.recognizer.phase();

        match event {
            PhaseEvent::None => assert_eq!(before, after),
            PhaseEvent::Started => {
                assert_eq!((before, after), (Phase::Waiting, Phase::Started));
                assert!(self.actuated);
            }
            PhaseEvent::Performed => {
                assert_eq!((before, after), (Phase::Started, Phase::Performed));
            }
            PhaseEvent::Canceled => {
                assert_ne!(before, Phase::Waiting);
                assert_eq!(after, Phase::Waiting);
            }
        }

        if !self.actuated {
            assert_eq!(after, Phase::Waiting);
        }

        self.verify_invariants();
    }

    fn verify_invariants(&self) {
        let recognizer = &self.recognizer;
        let waiting = recognizer.phase() == Phase::Waiting;

        assert_eq!(recognizer.buffer().is_empty(), waiting);
        if waiting {
            assert_eq!(recognizer.latch(), None);
        }
        if recognizer.params().require_trigger && !waiting {
            assert!(recognizer.latch().is_some());
        }

        let timestamps: Vec<_> = recognizer.buffer().samples().map(|s| s.timestamp).collect();
        assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
    }
}

fn arbitrary_params() -> impl Strategy<Value = RecognitionParameters> {
    (
        0u64..500,
        0u64..2000,
        1f64..=100.,
        prop::sample::select(vec![
            FitMethod::Diameter,
            FitMethod::ThreePoint,
            FitMethod::LegacyDiameter,
            FitMethod::RadialDevice,
        ]),
        any::<bool>(),
        prop::sample::select(vec![DuplicatePolicy::Keep, DuplicatePolicy::SkipRepeated]),
    )
        .prop_map(
            |(min, extra, accuracy_percent, fit_method, require_trigger, duplicates)| {
                RecognitionParameters {
                    min_hold: Duration::from_millis(min),
                    max_hold: Duration::from_millis(min + extra),
                    accuracy_percent,
                    fit_method,
                    require_trigger,
                    duplicates,
                }
            },
        )
}

proptest! {
    #[test]
    fn random_operations_keep_invariants(
        params in arbitrary_params(),
        ops in proptest::collection::vec(any::<Op>(), 0..100),
    ) {
        let mut harness = Harness::new(params);
        for op in ops {
            harness.apply(op);
        }
    }

    #[test]
    fn release_before_min_hold_always_cancels(
        points in proptest::collection::vec((-100f64..100., -100f64..100.), 1..20),
    ) {
        let mut recognizer = GestureRecognizer::new(params(1000, 2000, 80.));
        for (i, &(x, y)) in points.iter().enumerate() {
            recognizer.process(sample(x, y, i as u64), true, None);
        }
        prop_assert_eq!(recognizer.phase(), Phase::Started);

        let event = recognizer.process(sample(0., 0., points.len() as u64), false, None);
        prop_assert_eq!(event, PhaseEvent::Canceled);
        prop_assert!(recognizer.buffer().is_empty());
    }
}
