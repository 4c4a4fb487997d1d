#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that scores enemy candidates and picks a tower's target.

use curve_defence_core::{EnemyId, FieldPoint};

/// Weight applied to the distance an enemy has already covered along the path.
const TRAVEL_WEIGHT: f32 = 0.7;
/// Weight applied to how deep inside the tower's range an enemy sits.
const PROXIMITY_WEIGHT: f32 = 0.3;

/// One live enemy offered to the selection policy.
///
/// Callers build the candidate list once per tick from the live enemy set, in
/// spawn order, and share it across every tower evaluated that tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetCandidate {
    /// Identifier handed back when this candidate wins.
    pub enemy: EnemyId,
    /// Current position on the field.
    pub position: FieldPoint,
    /// Distance already covered along the path, in field units.
    pub travelled: f32,
}

/// Picks the best target for a tower at `origin` with the given attack range.
///
/// Candidates farther than `range` are excluded outright. The rest are scored
/// by a weighted sum of path progress and closeness to the tower, and the
/// highest score wins. A later candidate must strictly beat the held score to
/// replace it, so ties resolve to the earliest candidate in iteration order.
#[must_use]
pub fn select_target(
    origin: FieldPoint,
    range: f32,
    candidates: &[TargetCandidate],
) -> Option<EnemyId> {
    let range_sq = range * range;
    let mut best: Option<ScoredCandidate> = None;

    for candidate in candidates {
        let distance_sq = origin.distance_squared_to(candidate.position);
        if distance_sq > range_sq {
            continue;
        }

        let distance = distance_sq.sqrt();
        let current = ScoredCandidate {
            enemy: candidate.enemy,
            score: TRAVEL_WEIGHT * candidate.travelled + PROXIMITY_WEIGHT * (range - distance),
        };

        match &mut best {
            Some(existing) => {
                if current.score > existing.score {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }

    best.map(|winner| winner.enemy)
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ScoredCandidate {
    enemy: EnemyId,
    score: f32,
}
