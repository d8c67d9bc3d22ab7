//! Edge strength model: a bounded confidence for a single relationship.

use chrono::{DateTime, Duration, Utc};

use super::Edge;

/// Base weight used when an edge has no stored `strength_score`.
pub const DEFAULT_STRENGTH_SCORE: f64 = 0.5;

const INTERACTION_BONUS_PER_CONTACT: f64 = 0.05;
const MAX_INTERACTION_BONUS: f64 = 0.3;
const RECENT_WINDOW_DAYS: i64 = 30;
const RECENT_BONUS: f64 = 0.2;
const WARM_WINDOW_DAYS: i64 = 90;
const WARM_BONUS: f64 = 0.1;

/// Strength of `edge` evaluated at `now`, always within `[0, 1]`.
///
/// Stored base weight, plus up to 0.3 for interaction volume, plus a recency
/// bonus of 0.2 (contact within 30 days) or 0.1 (within 90 days).
pub fn edge_strength(edge: &Edge, now: DateTime<Utc>) -> f64 {
    let base = match edge.strength_score {
        Some(score) if score.is_finite() => score,
        _ => DEFAULT_STRENGTH_SCORE,
    };

    let interaction_bonus = (f64::from(edge.interaction_count) * INTERACTION_BONUS_PER_CONTACT)
        .min(MAX_INTERACTION_BONUS);

    let recency_bonus = match edge.last_interaction_date {
        Some(last) => {
            let age = now - last;
            if age <= Duration::days(RECENT_WINDOW_DAYS) {
                RECENT_BONUS
            } else if age <= Duration::days(WARM_WINDOW_DAYS) {
                WARM_BONUS
            } else {
                0.0
            }
        }
        None => 0.0,
    };

    (base + interaction_bonus + recency_bonus).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn edge() -> Edge {
        Edge::new("e1", "a", "b", "knows")
    }

    #[test]
    fn test_default_base_strength() {
        assert!((edge_strength(&edge(), now()) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_interaction_bonus_is_capped() {
        let mut e = edge();
        e.strength_score = Some(0.2);
        e.interaction_count = 2;
        assert!((edge_strength(&e, now()) - 0.3).abs() < 1e-9);

        e.interaction_count = 100;
        assert!((edge_strength(&e, now()) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_recency_tiers() {
        let mut e = edge();
        e.strength_score = Some(0.1);

        e.last_interaction_date = Some(now() - Duration::days(10));
        assert!((edge_strength(&e, now()) - 0.3).abs() < 1e-9);

        e.last_interaction_date = Some(now() - Duration::days(30));
        assert!((edge_strength(&e, now()) - 0.3).abs() < 1e-9);

        e.last_interaction_date = Some(now() - Duration::days(60));
        assert!((edge_strength(&e, now()) - 0.2).abs() < 1e-9);

        e.last_interaction_date = Some(now() - Duration::days(200));
        assert!((edge_strength(&e, now()) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_future_contact_counts_as_recent() {
        let mut e = edge();
        e.strength_score = Some(0.0);
        e.last_interaction_date = Some(now() + Duration::days(3));
        assert!((edge_strength(&e, now()) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_strength_is_clamped() {
        let mut e = edge();
        e.strength_score = Some(0.9);
        e.interaction_count = 10;
        e.last_interaction_date = Some(now());
        assert_eq!(edge_strength(&e, now()), 1.0);

        e.strength_score = Some(-2.0);
        e.interaction_count = 0;
        e.last_interaction_date = None;
        assert_eq!(edge_strength(&e, now()), 0.0);
    }

    #[test]
    fn test_non_finite_score_falls_back_to_default() {
        let mut e = edge();
        e.strength_score = Some(f64::NAN);
        assert!((edge_strength(&e, now()) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_strength_bound_over_grid() {
        let scores = [-1.0, 0.0, 0.3, 0.5, 1.0, 3.0];
        let counts = [0, 1, 5, 50];
        let ages = [None, Some(0), Some(45), Some(365)];
        for score in scores {
            for count in counts {
                for age in ages {
                    let mut e = edge();
                    e.strength_score = Some(score);
                    e.interaction_count = count;
                    e.last_interaction_date = age.map(|d| now() - Duration::days(d));
                    let s = edge_strength(&e, now());
                    assert!((0.0..=1.0).contains(&s), "strength {} out of bounds", s);
                }
            }
        }
    }
}
