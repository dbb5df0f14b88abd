use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Decision of the external run gate: the pipeline runs only on days that
/// fall an exact cadence multiple after the anchor timestamp.
#[derive(Debug, Clone, Copy)]
pub struct GuardDecision {
    pub should_run: bool,
    pub days_elapsed: i64,
    pub anchor: DateTime<Utc>,
    pub now: DateTime<Utc>,
}

impl GuardDecision {
    /// Key=value lines in the shape CI workflows consume.
    pub fn output_lines(&self) -> String {
        format!(
            "should_run={}\ndays_elapsed={}\nanchor_utc={}\nnow_utc={}\n",
            self.should_run,
            self.days_elapsed,
            self.anchor.to_rfc3339(),
            self.now.to_rfc3339(),
        )
    }
}

/// Parses an anchor timestamp. Offset-less timestamps are assumed UTC.
pub fn parse_anchor(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .with_context(|| format!("unparsable anchor timestamp: {raw}"))?;
    Ok(naive.and_utc())
}

pub fn evaluate(anchor_raw: &str, cadence_days: i64, now: DateTime<Utc>) -> Result<GuardDecision> {
    let anchor = parse_anchor(anchor_raw)?;
    let (should_run, days_elapsed) = if now < anchor {
        (false, -1)
    } else {
        let days = (now - anchor).num_days();
        (cadence_days > 0 && days % cadence_days == 0, days)
    };
    Ok(GuardDecision {
        should_run,
        days_elapsed,
        anchor,
        now,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    const ANCHOR: &str = "2025-12-28T08:15:00+00:00";

    fn anchor() -> DateTime<Utc> {
        parse_anchor(ANCHOR).unwrap()
    }

    #[test]
    fn runs_on_exact_cadence_multiples() {
        for days in [0, 28, 56, 280] {
            let decision = evaluate(ANCHOR, 28, anchor() + Duration::days(days)).unwrap();
            assert!(decision.should_run, "day {days}");
            assert_eq!(decision.days_elapsed, days);
        }
    }

    #[test]
    fn skips_days_off_cadence() {
        for days in [1, 27, 29, 55] {
            let decision = evaluate(ANCHOR, 28, anchor() + Duration::days(days)).unwrap();
            assert!(!decision.should_run, "day {days}");
        }
    }

    #[test]
    fn never_runs_before_the_anchor() {
        let decision = evaluate(ANCHOR, 28, anchor() - Duration::hours(1)).unwrap();
        assert!(!decision.should_run);
        assert_eq!(decision.days_elapsed, -1);
    }

    #[test]
    fn offsetless_anchor_is_read_as_utc() {
        let parsed = parse_anchor("2025-12-28T08:15:00").unwrap();
        assert_eq!(parsed, anchor());
    }

    #[test]
    fn output_lines_carry_all_four_keys() {
        let decision = evaluate(ANCHOR, 28, anchor()).unwrap();
        let lines = decision.output_lines();
        assert!(lines.contains("should_run=true"));
        assert!(lines.contains("days_elapsed=0"));
        assert!(lines.contains("anchor_utc=2025-12-28T08:15:00+00:00"));
        assert!(lines.contains("now_utc="));
    }
}
