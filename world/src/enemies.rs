//! Enemy units marching down the path toward the base.

use curve_defence_core::{EnemyId, EnemyKind, FieldPoint};
use curve_defence_system_path_geometry::PathGeometry;

/// Outcome of advancing an enemy by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Advance {
    /// The enemy is still on the road, or the call was a no-op.
    Moving,
    /// The enemy ran out of road this tick. Reported exactly once.
    ReachedBase,
}

/// A single enemy, tracked by the distance it still has to cover.
///
/// `remaining` may start beyond the path's total length; the spawn jitter
/// staggers arrivals by parking enemies behind the spawn end for a moment.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) health: f32,
    pub(crate) remaining: f32,
    pub(crate) position: FieldPoint,
    pub(crate) dead: bool,
    pub(crate) reached_base: bool,
    /// Set once the defeat has been paid out, so gold and lives cannot be
    /// settled twice for the same enemy.
    pub(crate) accounted: bool,
}

impl Enemy {
    pub(crate) fn spawn(id: EnemyId, kind: EnemyKind, remaining: f32, path: &PathGeometry) -> Self {
        Self {
            id,
            kind,
            health: kind.max_health(),
            remaining,
            position: path.point_at(remaining),
            dead: false,
            reached_base: false,
            accounted: false,
        }
    }

    /// Moves the enemy down the path by `speed * dt`.
    ///
    /// Zero and negative deltas are no-ops, as are calls on dead enemies, so
    /// the base can only ever be reached once.
    pub(crate) fn advance(&mut self, dt: f32, path: &PathGeometry) -> Advance {
        if self.dead || dt <= 0.0 {
            return Advance::Moving;
        }

        self.remaining -= self.kind.speed() * dt;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.dead = true;
            self.reached_base = true;
            self.position = path.base();
            return Advance::ReachedBase;
        }

        self.position = path.point_at(self.remaining);
        Advance::Moving
    }

    /// Subtracts damage, clamping health at zero.
    ///
    /// Returns whether this call was the killing blow. Dead enemies ignore
    /// further damage; several towers may fire at the same target in one tick.
    pub(crate) fn apply_damage(&mut self, amount: f32) -> bool {
        if self.dead {
            return false;
        }

        self.health = (self.health - amount).max(0.0);
        if self.health <= 0.0 {
            self.dead = true;
            return true;
        }
        false
    }

    /// Distance already covered along the path. Negative while the enemy is
    /// still queued behind the spawn end, which keeps jittered spawns ordered
    /// by how soon they enter the field.
    pub(crate) fn travelled(&self, total_length: f32) -> f32 {
        total_length - self.remaining
    }
}
