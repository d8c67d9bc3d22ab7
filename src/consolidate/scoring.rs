//! Candidate scoring and canonical-survivor election for a duplicate group.

use crate::graph::Entity;

const ANALYSIS_WEIGHT: i64 = 10;
const DOMAIN_WEIGHT: i64 = 5;
const ENRICHED_WEIGHT: i64 = 2;

/// How much identity evidence a record carries: enrichment quality plus raw degree.
pub fn candidate_score(entity: &Entity, degree: usize) -> i64 {
    let mut score = degree as i64;
    if entity.has_substantive_analysis {
        score += ANALYSIS_WEIGHT;
    }
    if entity.has_domain() {
        score += DOMAIN_WEIGHT;
    }
    if entity.enriched {
        score += ENRICHED_WEIGHT;
    }
    score
}

#[derive(Debug)]
pub struct Election<'a> {
    pub winner: &'a Entity,
    pub winner_score: i64,
    pub losers: Vec<&'a Entity>,
}

/// Highest score wins; equal scores go to the lexicographically smallest id.
pub fn elect<'a>(scored: &[(&'a Entity, i64)]) -> Option<Election<'a>> {
    let (winner, winner_score) = scored
        .iter()
        .copied()
        .max_by(|(a, a_score), (b, b_score)| {
            a_score.cmp(b_score).then_with(|| b.id.cmp(&a.id))
        })?;

    let mut losers: Vec<&'a Entity> = scored
        .iter()
        .map(|(e, _)| *e)
        .filter(|e| e.id != winner.id)
        .collect();
    losers.sort_by(|a, b| a.id.cmp(&b.id));

    Some(Election {
        winner,
        winner_score,
        losers,
    })
}

/// Copy onto `winner` whatever it lacks and `loser` has. Never overwrites a
/// value the winner already holds. Returns true if the winner changed.
pub fn backfill(winner: &mut Entity, loser: &Entity) -> bool {
    let before = winner.clone();

    if !winner.has_domain() && loser.has_domain() {
        winner.domain = loser.domain.clone();
    }
    if !winner.has_substantive_analysis && loser.has_substantive_analysis {
        winner.set_business_analysis(loser.business_analysis.clone());
        if winner.enrichment_source.is_none() {
            winner.enrichment_source = loser.enrichment_source.clone();
        }
    } else if winner.business_analysis.is_none() && loser.business_analysis.is_some() {
        winner.set_business_analysis(loser.business_analysis.clone());
    }
    winner.enriched |= loser.enriched;
    winner.is_internal_owner |= loser.is_internal_owner;
    winner.is_portfolio |= loser.is_portfolio;
    winner.is_pipeline |= loser.is_pipeline;
    winner.linkedin_first_degree |= loser.linkedin_first_degree;

    *winner != before
}
