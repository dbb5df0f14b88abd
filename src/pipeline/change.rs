use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One output cell of the comparison table. Absence marks a change that was
/// deliberately not computed (missing side, sub-baseline reference, clamped
/// outlier) and is never interchangeable with a computed 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Variation {
    Value(f64),
    Absent,
}

impl Variation {
    pub fn value(&self) -> Option<f64> {
        match self {
            Variation::Value(v) => Some(*v),
            Variation::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Variation::Absent)
    }
}

impl From<Option<f64>> for Variation {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => Variation::Value(v),
            None => Variation::Absent,
        }
    }
}

/// Percentage change `(cur - prev) / prev * 100` over the union of URL keys.
///
/// The baseline gate examines the previous-period value alone: a missing,
/// zero, or sub-baseline denominator suppresses the change regardless of the
/// current value. Changes beyond `max_abs_variation` are suppressed, not
/// truncated.
pub fn percentage_change(
    current: &BTreeMap<String, f64>,
    previous: &BTreeMap<String, f64>,
    min_baseline: f64,
    max_abs_variation: Option<f64>,
) -> BTreeMap<String, Variation> {
    let mut changes = BTreeMap::new();
    for url in union_keys(current, previous) {
        let variation = match (current.get(url), previous.get(url)) {
            (Some(&cur), Some(&prev)) => {
                if prev == 0.0 || prev.abs() < min_baseline {
                    Variation::Absent
                } else {
                    let change = (cur - prev) / prev * 100.0;
                    if !change.is_finite() {
                        Variation::Absent
                    } else if max_abs_variation.is_some_and(|cap| change.abs() > cap) {
                        Variation::Absent
                    } else {
                        Variation::Value(change)
                    }
                }
            }
            _ => Variation::Absent,
        };
        changes.insert(url.clone(), variation);
    }
    changes
}

/// Direct difference `(cur - prev) * multiplier` over the union of URL keys.
///
/// Unlike percentage mode, the baseline gate examines the larger magnitude of
/// the two periods. No clamp applies.
pub fn difference_change(
    current: &BTreeMap<String, f64>,
    previous: &BTreeMap<String, f64>,
    min_baseline: f64,
    multiplier: f64,
) -> BTreeMap<String, Variation> {
    let mut changes = BTreeMap::new();
    for url in union_keys(current, previous) {
        let variation = match (current.get(url), previous.get(url)) {
            (Some(&cur), Some(&prev)) => {
                let baseline = prev.abs().max(cur.abs());
                if baseline < min_baseline {
                    Variation::Absent
                } else {
                    Variation::Value((cur - prev) * multiplier)
                }
            }
            _ => Variation::Absent,
        };
        changes.insert(url.clone(), variation);
    }
    changes
}

fn union_keys<'a>(
    a: &'a BTreeMap<String, f64>,
    b: &'a BTreeMap<String, f64>,
) -> BTreeSet<&'a String> {
    a.keys().chain(b.keys()).collect()
}
