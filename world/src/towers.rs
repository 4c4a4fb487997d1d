//! Tower state: baselines, upgrades, and the modifier stack.

use curve_defence_core::{
    EnemyId, FieldPoint, StatKind, TowerId, TowerKind, TowerStats, UpgradeKind, WeatherModifier,
    MIN_FIRE_RATE,
};

/// A stat adjustment that wears off after a fixed number of seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TimedModifier {
    pub(crate) stat: StatKind,
    pub(crate) multiplier: f32,
    pub(crate) remaining: f32,
}

/// A placed tower.
///
/// `baseline` is the permanent truth: upgrades rewrite it. `effective` is a
/// derived value rebuilt from the baseline on every modifier refresh, so
/// weather swaps replace each other instead of stacking.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Tower {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) position: FieldPoint,
    pub(crate) baseline: TowerStats,
    pub(crate) effective: TowerStats,
    pub(crate) cooldown: f32,
    /// Seconds since the last target re-evaluation. Starts unbounded so a
    /// fresh tower may acquire immediately.
    pub(crate) retarget_clock: f32,
    pub(crate) target: Option<EnemyId>,
    pub(crate) timed: Vec<TimedModifier>,
    pub(crate) invested: u32,
    pub(crate) kills: u32,
    pub(crate) damage_dealt: f32,
}

impl Tower {
    pub(crate) fn place(id: TowerId, kind: TowerKind, position: FieldPoint) -> Self {
        let baseline = kind.baseline();
        Self {
            id,
            kind,
            position,
            baseline,
            effective: baseline,
            cooldown: 0.0,
            retarget_clock: f32::INFINITY,
            target: None,
            timed: Vec::new(),
            invested: kind.cost(),
            kills: 0,
            damage_dealt: 0.0,
        }
    }

    /// Ages out timed modifiers and rebuilds `effective` from the baseline,
    /// applying the provided weather set first and surviving timed modifiers
    /// after.
    pub(crate) fn refresh_modifiers(&mut self, dt: f32, weather: &[WeatherModifier]) {
        self.timed.retain_mut(|modifier| {
            modifier.remaining -= dt;
            modifier.remaining > 0.0
        });

        let mut stats = self.baseline;
        for modifier in weather {
            if modifier.scope.covers(self.kind.category()) {
                stats.set(modifier.stat, stats.get(modifier.stat) * modifier.multiplier);
            }
        }
        for modifier in &self.timed {
            stats.set(modifier.stat, stats.get(modifier.stat) * modifier.multiplier);
        }
        self.effective = stats;
    }

    /// Rewrites one baseline stat and records the spend.
    ///
    /// `effective` catches up on the next modifier refresh; callers refresh
    /// immediately so the purchase is visible within the same command.
    pub(crate) fn apply_upgrade(&mut self, upgrade: UpgradeKind) {
        let stat = upgrade.stat();
        self.baseline
            .set(stat, self.baseline.get(stat) * upgrade.multiplier());
        self.invested += upgrade.cost();
    }

    /// Restarts the reload using the current effective fire rate.
    pub(crate) fn reset_cooldown(&mut self) {
        self.cooldown = 1.0 / self.effective.fire_rate.max(MIN_FIRE_RATE);
    }

    /// Gold returned when the tower is demolished.
    pub(crate) fn refund_value(&self) -> u32 {
        self.invested / 2
    }
}
