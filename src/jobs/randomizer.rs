// Parameter randomizer
//
// Pure sampling over an injected Rng: turns (source duration, catalog,
// preferences) into the per-job parameters. No file I/O here; loading the
// config and persisting the descriptor are the caller's concern, which
// keeps the sampling policy independently testable.

use rand::Rng;

use crate::catalog::{Filter, FilterCatalog, SelectionMode};
use crate::constants::MIN_CLIP_SECONDS;
use crate::jobs::ClipWindow;
use crate::preferences::Preferences;

/// Randomized parameters for one job, before the caller attaches an id
/// and file paths.
#[derive(Debug, Clone, PartialEq)]
pub struct JobParameters {
    pub filter: Option<Filter>,
    pub clip: Option<ClipWindow>,
    pub speed: f64,
}

/// Draw the full parameter set for a source of `duration_seconds`.
pub fn select_job_parameters(
    duration_seconds: f64,
    catalog: &FilterCatalog,
    prefs: &Preferences,
    rng: &mut impl Rng,
) -> JobParameters {
    JobParameters {
        filter: select_filter(catalog, prefs, rng).cloned(),
        clip: Some(select_clip(duration_seconds, prefs, rng)),
        speed: select_speed(catalog, rng),
    }
}

/// Pick a filter among the enabled subset of the catalog, or None when
/// nothing is enabled.
fn select_filter<'a>(
    catalog: &'a FilterCatalog,
    prefs: &Preferences,
    rng: &mut impl Rng,
) -> Option<&'a Filter> {
    let enabled: Vec<&Filter> = catalog
        .filters
        .iter()
        .filter(|f| prefs.filter_enabled(&f.id))
        .collect();

    if enabled.is_empty() {
        return None;
    }

    match catalog.randomization.mode {
        SelectionMode::Uniform => Some(enabled[rng.gen_range(0..enabled.len())]),
        SelectionMode::Weighted => {
            let weights: Vec<f64> = enabled
                .iter()
                .map(|f| {
                    catalog
                        .randomization
                        .filter_weights
                        .get(&f.id)
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect();

            let total: f64 = weights.iter().sum();
            if total <= 0.0 {
                // Nothing carries weight; fall back to a uniform pick
                return Some(enabled[rng.gen_range(0..enabled.len())]);
            }

            let mut r = rng.gen_range(0.0..total);
            for (filter, w) in enabled.iter().zip(&weights) {
                if r < *w {
                    return Some(filter);
                }
                r -= w;
            }
            enabled.last().copied()
        }
    }
}

/// Draw a clip window inside [0, duration]. The window fraction comes from
/// the preference range; when the source is too short for the drawn length
/// the window is clamped rather than rejected, so the result is always a
/// non-empty interval within the source.
fn select_clip(duration_seconds: f64, prefs: &Preferences, rng: &mut impl Rng) -> ClipWindow {
    let range = &prefs.clip_length;
    let fraction = if range.max > range.min {
        rng.gen_range(range.min..=range.max)
    } else {
        range.min
    };

    let floor = MIN_CLIP_SECONDS.min(duration_seconds);
    let clip_len = (fraction * duration_seconds)
        .clamp(floor, duration_seconds);

    let max_start = (duration_seconds - clip_len).max(0.0);
    let start = if max_start > 0.0 {
        rng.gen_range(0.0..=max_start)
    } else {
        0.0
    };

    ClipWindow {
        start,
        end: start + clip_len,
    }
}

/// Draw a playback speed: a non-default value with the configured
/// probability, 1.0 otherwise.
fn select_speed(catalog: &FilterCatalog, rng: &mut impl Rng) -> f64 {
    let speed = &catalog.randomization.speed;
    if speed.options.is_empty() || speed.probability <= 0.0 {
        return 1.0;
    }
    if rng.gen::<f64>() < speed.probability {
        speed.options[rng.gen_range(0..speed.options.len())]
    } else {
        1.0
    }
}
