//! Sample planning.
//!
//! A [`Plan`] is the ordered list of samples to extract and concatenate. It
//! is built from independent random draws: a source among the inputs that
//! can hold a full sample, then a start inside that source's usable window.
//! Samples may overlap, within one source or across the plan.

use crate::input::{InputVideo, UsableWindow};
use crate::{Error, Result};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// The parts of the configuration the planner reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanSettings {
    /// Requested output duration in seconds.
    pub total_duration: f64,
    /// Length of every sample in seconds.
    pub sample_duration: f64,
    /// Margin ignored at both ends of each input, in percent.
    pub ignore_percent: f64,
}

/// One slice of one input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleSpec {
    /// Index into the input list.
    pub source: usize,
    /// Start offset in seconds.
    pub start: f64,
    /// Length in seconds.
    pub length: f64,
}

impl SampleSpec {
    pub fn end(&self) -> f64 {
        self.start + self.length
    }
}

/// Ordered samples; the order is the concatenation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub sample_duration: f64,
    pub samples: Vec<SampleSpec>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SampleSpec> {
        self.samples.iter()
    }

    /// Sum of all sample lengths. May exceed the requested duration by less
    /// than one sample.
    pub fn total_duration(&self) -> f64 {
        self.samples.iter().map(|s| s.length).sum()
    }

    /// Indices of the inputs the plan draws from.
    pub fn sources(&self) -> BTreeSet<usize> {
        self.samples.iter().map(|s| s.source).collect()
    }

    /// Human-readable listing, one sample per line.
    pub fn describe(&self, inputs: &[InputVideo]) -> String {
        let mut out = String::new();
        let width = self.len().to_string().len();
        for (i, sample) in self.samples.iter().enumerate() {
            let path = inputs
                .get(sample.source)
                .map(|v| v.path.display().to_string())
                .unwrap_or_else(|| format!("#{}", sample.source));
            let _ = writeln!(
                out,
                "{:>width$}. {} -> {}  {}",
                i + 1,
                format_timestamp(sample.start),
                format_timestamp(sample.end()),
                path,
                width = width
            );
        }
        out
    }
}

/// `m:ss.mmm` rendering of a position in seconds.
pub fn format_timestamp(secs: f64) -> String {
    let millis = (secs.max(0.0) * 1000.0).round() as u64;
    format!(
        "{}:{:02}.{:03}",
        millis / 60_000,
        (millis / 1000) % 60,
        millis % 1000
    )
}

/// Upper bound on the number of samples in one plan.
pub const MAX_SAMPLES: usize = 100_000;

/// Number of samples needed to cover `total` seconds with `sample`-second
/// slices. A ratio within rounding noise of an integer is not bumped up.
///
/// Returns `None` when the count is not finite or exceeds [`MAX_SAMPLES`].
pub fn sample_count(total: f64, sample: f64) -> Option<usize> {
    let ratio = total / sample;
    if !ratio.is_finite() {
        return None;
    }
    let nearest = ratio.round();
    let count = if (ratio - nearest).abs() < 1e-9 {
        nearest
    } else {
        ratio.ceil()
    };
    if count > MAX_SAMPLES as f64 {
        return None;
    }
    Some(count as usize)
}

/// Error for a duration/sample pair that needs too many samples.
pub(crate) fn too_many_samples(total: f64, sample: f64) -> Error {
    Error::Argument(format!(
        "{}s in {}s samples needs more than {} samples",
        total, sample, MAX_SAMPLES
    ))
}

/// Build a plan from probed inputs.
///
/// # Errors
///
/// [`Error::InvalidInput`] when no input has a usable window at least one
/// sample long, [`Error::Argument`] when the settings need more than
/// [`MAX_SAMPLES`] samples.
pub fn build_plan<R: Rng>(
    inputs: &[InputVideo],
    settings: &PlanSettings,
    rng: &mut R,
) -> Result<Plan> {
    let sample = settings.sample_duration;
    let count = sample_count(settings.total_duration, sample)
        .ok_or_else(|| too_many_samples(settings.total_duration, sample))?;

    let mut eligible: Vec<(usize, UsableWindow)> = Vec::with_capacity(inputs.len());
    for (index, video) in inputs.iter().enumerate() {
        let window = video.usable_window(settings.ignore_percent);
        if window.fits(sample) {
            eligible.push((index, window));
        } else {
            tracing::warn!(
                "Skipping {:?}: usable window of {:.3}s is shorter than the {:.3}s sample",
                video.path,
                window.len(),
                sample
            );
        }
    }

    if eligible.is_empty() {
        return Err(Error::InvalidInput(format!(
            "no input has a usable window of at least {:.3}s (ignoring {}% at each end)",
            sample, settings.ignore_percent
        )));
    }

    let mut samples = Vec::with_capacity(count);
    for _ in 0..count {
        let (source, window) = eligible[rng.gen_range(0..eligible.len())];
        let latest = window.end - sample;
        let start = if latest > window.start {
            rng.gen_range(window.start..=latest)
        } else {
            window.start
        };
        samples.push(SampleSpec {
            source,
            start,
            length: sample,
        });
    }

    tracing::debug!(
        "Planned {} samples from {} eligible inputs",
        samples.len(),
        eligible.len()
    );

    Ok(Plan {
        sample_duration: sample,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const EPS: f64 = 1e-9;

    fn settings(total: f64, sample: f64, ignore: f64) -> PlanSettings {
        PlanSettings {
            total_duration: total,
            sample_duration: sample,
            ignore_percent: ignore,
        }
    }

    fn assert_within_windows(plan: &Plan, inputs: &[InputVideo], ignore: f64) {
        for sample in plan.iter() {
            let window = inputs[sample.source].usable_window(ignore);
            assert!(sample.start >= window.start - EPS, "{sample:?} before {window:?}");
            assert!(sample.end() <= window.end + EPS, "{sample:?} past {window:?}");
        }
    }

    #[test]
    fn test_single_input_scenario() {
        let inputs = vec![InputVideo::new("a.mp4", 120.0)];
        let mut rng = StdRng::seed_from_u64(42);
        let plan = build_plan(&inputs, &settings(10.0, 5.0, 10.0), &mut rng).unwrap();

        assert_eq!(plan.len(), 2);
        for sample in plan.iter() {
            assert_eq!(sample.source, 0);
            assert_eq!(sample.length, 5.0);
            assert!((12.0..=103.0).contains(&sample.start), "{sample:?}");
        }
    }

    #[test]
    fn test_same_seed_same_plan() {
        let inputs = vec![
            InputVideo::new("a.mp4", 120.0),
            InputVideo::new("b.mp4", 45.5),
            InputVideo::new("c.mp4", 600.0),
        ];
        let settings = settings(60.0, 1.5, 10.0);

        let first = build_plan(&inputs, &settings, &mut StdRng::seed_from_u64(1234)).unwrap();
        let second = build_plan(&inputs, &settings, &mut StdRng::seed_from_u64(1234)).unwrap();
        assert_eq!(first, second);

        let other = build_plan(&inputs, &settings, &mut StdRng::seed_from_u64(1235)).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_samples_stay_inside_usable_windows() {
        let inputs = vec![
            InputVideo::new("a.mp4", 10.0),
            InputVideo::new("b.mp4", 3.3),
            InputVideo::new("c.mp4", 1000.0),
        ];
        for seed in 0..50 {
            for ignore in [0.0, 10.0, 25.0, 49.0] {
                let mut rng = StdRng::seed_from_u64(seed);
                let plan = build_plan(&inputs, &settings(30.0, 0.7, ignore), &mut rng);
                if let Ok(plan) = plan {
                    assert_within_windows(&plan, &inputs, ignore);
                }
            }
        }
    }

    #[test]
    fn test_sample_count_is_ceiling() {
        let cases = [
            (10.0, 5.0, 2),
            (11.0, 5.0, 3),
            (60.0, 1.0, 60),
            (0.5, 1.0, 1),
            (0.9, 0.3, 3),
            (0.7, 0.1, 7),
            (1.0, 0.3, 4),
            (100.0, 7.0, 15),
        ];
        for (total, sample, expected) in cases {
            assert_eq!(sample_count(total, sample), Some(expected), "{total}/{sample}");
        }
    }

    #[test]
    fn test_plan_length_matches_sample_count() {
        let inputs = vec![InputVideo::new("a.mp4", 300.0)];
        for (total, sample) in [(60.0, 1.0), (10.0, 3.0), (7.5, 2.5), (1.0, 2.0)] {
            let mut rng = StdRng::seed_from_u64(9);
            let plan = build_plan(&inputs, &settings(total, sample, 10.0), &mut rng).unwrap();
            assert_eq!(Some(plan.len()), sample_count(total, sample));
            assert!(plan.total_duration() >= total - EPS);
            assert!(plan.total_duration() < total + sample);
        }
    }

    #[test]
    fn test_sample_count_is_capped() {
        assert_eq!(sample_count(MAX_SAMPLES as f64, 1.0), Some(MAX_SAMPLES));
        assert_eq!(sample_count(MAX_SAMPLES as f64 + 0.5, 1.0), None);
        assert_eq!(sample_count(1e300, 1.0), None);
        assert_eq!(sample_count(60.0, 1e-9), None);
        assert_eq!(sample_count(f64::MAX, f64::MIN_POSITIVE), None);
    }

    #[test]
    fn test_huge_plan_is_rejected() {
        let inputs = vec![InputVideo::new("a.mp4", 120.0)];
        let mut rng = StdRng::seed_from_u64(0);
        let result = build_plan(&inputs, &settings(1e300, 1.0, 10.0), &mut rng);
        assert_matches!(result, Err(Error::Argument(_)));
    }

    #[test]
    fn test_all_windows_too_short() {
        let inputs = vec![
            InputVideo::new("a.mp4", 5.0),
            InputVideo::new("b.mp4", 2.0),
        ];
        let mut rng = StdRng::seed_from_u64(0);
        let result = build_plan(&inputs, &settings(10.0, 5.0, 10.0), &mut rng);
        assert_matches!(result, Err(Error::InvalidInput(_)));
    }

    #[test]
    fn test_short_input_contributes_nothing() {
        let inputs = vec![
            InputVideo::new("short.mp4", 5.0),
            InputVideo::new("long.mp4", 120.0),
        ];
        let mut rng = StdRng::seed_from_u64(3);
        let plan = build_plan(&inputs, &settings(100.0, 5.0, 10.0), &mut rng).unwrap();
        assert_eq!(plan.len(), 20);
        assert!(plan.iter().all(|s| s.source == 1));
        assert_eq!(plan.sources().len(), 1);
    }

    #[test]
    fn test_exact_fit_starts_at_window_start() {
        let inputs = vec![InputVideo::new("a.mp4", 10.0)];
        let mut rng = StdRng::seed_from_u64(5);
        let plan = build_plan(&inputs, &settings(4.0, 10.0, 0.0), &mut rng).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.samples[0].start, 0.0);
    }

    #[test]
    fn test_all_eligible_sources_get_used() {
        let inputs = vec![
            InputVideo::new("a.mp4", 60.0),
            InputVideo::new("b.mp4", 60.0),
            InputVideo::new("c.mp4", 60.0),
        ];
        let mut rng = StdRng::seed_from_u64(77);
        let plan = build_plan(&inputs, &settings(300.0, 1.0, 10.0), &mut rng).unwrap();
        assert_eq!(plan.sources().into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "0:00.000");
        assert_eq!(format_timestamp(12.3456), "0:12.346");
        assert_eq!(format_timestamp(75.5), "1:15.500");
        assert_eq!(format_timestamp(3600.0), "60:00.000");
    }

    #[test]
    fn test_describe_lists_every_sample() {
        let inputs = vec![InputVideo::new("a.mp4", 120.0)];
        let plan = Plan {
            sample_duration: 5.0,
            samples: vec![
                SampleSpec { source: 0, start: 12.0, length: 5.0 },
                SampleSpec { source: 0, start: 60.5, length: 5.0 },
            ],
        };
        let text = plan.describe(&inputs);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "1. 0:12.000 -> 0:17.000  a.mp4");
        assert_eq!(lines[1], "2. 1:00.500 -> 1:05.500  a.mp4");
    }
}
