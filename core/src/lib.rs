#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Curve Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! actually happened. Suppliers of external data (wave catalogues, weather
//! reports) answer request events with further commands, so the simulation
//! itself never blocks on the outside world.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest effective fire rate a tower can be reduced to.
///
/// Cooldowns are computed as `1 / fire_rate`, so modifiers are floored here
/// to keep the reload interval finite.
pub const MIN_FIRE_RATE: f32 = 0.0001;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Stages a replacement path layout, applied at the next tick boundary.
    ConfigureLayout {
        /// Ordered control points for the new path, base first.
        waypoints: Vec<FieldPoint>,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        elapsed: Duration,
    },
    /// Arms or clears the build selection used by presentation layers.
    SelectTower {
        /// Tower kind to arm, or `None` to clear the selection.
        kind: Option<TowerKind>,
    },
    /// Requests construction of a tower centred on the provided point.
    PlaceTower {
        /// Kind of tower to construct.
        kind: TowerKind,
        /// Centre of the requested footprint in playfield coordinates.
        at: FieldPoint,
    },
    /// Requests demolition of an existing tower for a partial refund.
    SellTower {
        /// Identifier of the tower to demolish.
        tower: TowerId,
    },
    /// Requests a permanent stat upgrade on an existing tower.
    UpgradeTower {
        /// Identifier of the tower to improve.
        tower: TowerId,
        /// Upgrade to purchase from the catalogue.
        upgrade: UpgradeKind,
    },
    /// Starts the next wave in the catalogue if the field is clear.
    StartWave,
    /// Enables or disables automatic wave progression.
    SetAutoWaves {
        /// Whether completed waves should chain into the next automatically.
        enabled: bool,
    },
    /// Pauses or resumes a running simulation.
    SetPaused {
        /// Whether the simulation should hold at the current state.
        paused: bool,
    },
    /// Replaces the built-in wave catalogue with an externally loaded one.
    InstallWaveCatalog {
        /// Waves to install, in play order.
        waves: Vec<WaveDefinition>,
    },
    /// Delivers the result of a previously requested weather fetch.
    SubmitWeather {
        /// Observation payload, or the failure marker.
        outcome: WeatherFetchOutcome,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Clamped duration of simulated time applied by the tick.
        dt: Duration,
    },
    /// Confirms that a staged path layout became active.
    LayoutChanged {
        /// Arc length of the rebuilt path in playfield units.
        total_length: f32,
    },
    /// Reports that a staged path layout was refused.
    LayoutRejected {
        /// Specific reason the layout failed validation.
        reason: PathError,
    },
    /// Confirms that an external wave catalogue replaced the built-in one.
    WaveCatalogInstalled {
        /// Number of waves now available to play.
        total_waves: u32,
    },
    /// Reports that an external wave catalogue was refused.
    WaveCatalogRejected {
        /// Specific reason the catalogue failed validation.
        reason: CatalogError,
    },
    /// Confirms a change to the armed build selection.
    SelectedTowerChanged {
        /// Tower kind now armed, if any.
        kind: Option<TowerKind>,
    },
    /// Confirms that automatic wave progression was toggled.
    AutoWavesChanged {
        /// Whether automatic progression is now active.
        enabled: bool,
    },
    /// Confirms that the pause state changed.
    PausedChanged {
        /// Whether the simulation is now holding.
        paused: bool,
    },
    /// Asks the driving loop to fetch a fresh weather observation.
    WeatherFetchRequested,
    /// Announces that the resolved weather bucket changed.
    WeatherChanged {
        /// Weather bucket now applied to towers.
        kind: WeatherKind,
    },
    /// Announces the start of a wave.
    WaveStarted {
        /// One-based number of the wave that started.
        wave_number: u32,
        /// Total number of waves in the catalogue.
        total_waves: u32,
        /// Enemies queued to spawn during the wave.
        enemy_count: u32,
        /// Whether the catalogue marks this wave as a boss wave.
        boss_wave: bool,
    },
    /// Announces that a wave was cleared and its reward credited.
    WaveCompleted {
        /// One-based number of the completed wave.
        wave_number: u32,
        /// Gold credited for the clearance.
        gold_reward: u32,
    },
    /// Reports the remaining enemy count after each defeat.
    RemainingEnemiesChanged {
        /// Enemies still queued or alive in the current wave.
        remaining: u32,
    },
    /// Confirms that an enemy entered the field.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of enemy that spawned.
        kind: EnemyKind,
        /// One-based number of the wave that produced it.
        wave_number: u32,
    },
    /// Reports that a tower destroyed an enemy.
    EnemyKilled {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Kind of the destroyed enemy.
        kind: EnemyKind,
        /// Gold credited for the kill.
        reward: u32,
    },
    /// Reports that an enemy walked into the base.
    EnemyReachedBase {
        /// Identifier of the enemy that leaked through.
        enemy: EnemyId,
        /// Lives remaining after the breach.
        lives: u32,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Kind of tower that was placed.
        kind: TowerKind,
        /// Centre of the tower in playfield coordinates.
        at: FieldPoint,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Kind of tower requested for placement.
        kind: TowerKind,
        /// Centre provided in the placement request.
        at: FieldPoint,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower was demolished and refunded.
    TowerSold {
        /// Identifier of the demolished tower.
        tower: TowerId,
        /// Gold returned to the player.
        refund: u32,
    },
    /// Reports that a tower sale request was rejected.
    TowerSaleRejected {
        /// Identifier provided in the sale request.
        tower: TowerId,
        /// Specific reason the sale failed.
        reason: SellError,
    },
    /// Confirms that a tower upgrade was purchased and applied.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Upgrade that was applied.
        upgrade: UpgradeKind,
        /// Cumulative gold invested in the tower after the purchase.
        invested: u32,
    },
    /// Reports that a tower upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier provided in the upgrade request.
        tower: TowerId,
        /// Upgrade requested.
        upgrade: UpgradeKind,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Announces defeat. Emitted at most once per game.
    GameOver {
        /// Why the game ended.
        reason: GameOverReason,
        /// Final score tally at the moment of defeat.
        score: ScoreBreakdown,
    },
    /// Announces victory over the full catalogue. Emitted at most once.
    Victory {
        /// Final score tally at the moment of victory.
        score: ScoreBreakdown,
    },
}

/// Unique identifier assigned to an enemy.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Point in playfield coordinates, measured in pixels from the top left.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldPoint {
    x: f32,
    y: f32,
}

impl FieldPoint {
    /// Creates a new playfield point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the point.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate of the point.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: FieldPoint) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared_to(self, other: FieldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Reports whether both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Types of enemies that march along the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Baseline footsoldier with average stats.
    Basic,
    /// Quick but fragile runner.
    Fast,
    /// Slow, heavily armoured bruiser.
    Tank,
    /// Swift raider that still follows the road.
    Flying,
    /// Rare heavyweight that anchors late waves.
    Boss,
}

impl EnemyKind {
    /// Every enemy kind, in catalogue order.
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Basic,
        EnemyKind::Fast,
        EnemyKind::Tank,
        EnemyKind::Flying,
        EnemyKind::Boss,
    ];

    /// Walking speed along the path in pixels per second.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Basic => 70.0,
            Self::Fast => 140.0,
            Self::Tank => 40.0,
            Self::Flying => 110.0,
            Self::Boss => 50.0,
        }
    }

    /// Hit points the enemy spawns with.
    #[must_use]
    pub const fn max_health(self) -> f32 {
        match self {
            Self::Basic => 12.0,
            Self::Fast => 6.0,
            Self::Tank => 30.0,
            Self::Flying => 8.0,
            Self::Boss => 50.0,
        }
    }

    /// Body radius in pixels, used by presentation layers.
    #[must_use]
    pub const fn radius(self) -> f32 {
        match self {
            Self::Basic => 9.0,
            Self::Fast => 9.0,
            Self::Tank => 11.0,
            Self::Flying => 8.0,
            Self::Boss => 14.0,
        }
    }

    /// Gold credited when a tower destroys this enemy.
    #[must_use]
    pub const fn reward(self) -> u32 {
        match self {
            Self::Basic => 6,
            Self::Fast => 8,
            Self::Tank => 15,
            Self::Flying => 10,
            Self::Boss => 25,
        }
    }
}

/// Broad grouping of towers used by weather modifier scoping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerCategory {
    /// Short to medium range direct-fire towers.
    Ballistic,
    /// Long range towers that depend on sight lines.
    Precision,
}

/// Types of towers that can be constructed beside the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    /// Moderate damage, medium reach.
    Basic,
    /// High damage, long reach, slow reload.
    Sniper,
    /// Low damage, short reach, rapid reload.
    Rapid,
}

impl TowerKind {
    /// Every tower kind, in catalogue order.
    pub const ALL: [TowerKind; 3] = [TowerKind::Basic, TowerKind::Sniper, TowerKind::Rapid];

    /// Gold required to place a tower of this kind.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Basic => 40,
            Self::Sniper => 80,
            Self::Rapid => 60,
        }
    }

    /// Weather scoping category for the kind.
    #[must_use]
    pub const fn category(self) -> TowerCategory {
        match self {
            Self::Basic | Self::Rapid => TowerCategory::Ballistic,
            Self::Sniper => TowerCategory::Precision,
        }
    }

    /// Factory stats before any upgrade or modifier is applied.
    #[must_use]
    pub const fn baseline(self) -> TowerStats {
        match self {
            Self::Basic => TowerStats {
                damage: 4.0,
                range: 120.0,
                fire_rate: 1.0,
            },
            Self::Sniper => TowerStats {
                damage: 12.0,
                range: 260.0,
                fire_rate: 0.5,
            },
            Self::Rapid => TowerStats {
                damage: 2.0,
                range: 100.0,
                fire_rate: 2.5,
            },
        }
    }

    /// Radius of the footprint circle blocked out by the tower.
    #[must_use]
    pub const fn footprint_radius(self) -> f32 {
        match self {
            Self::Basic => 14.0,
            Self::Sniper => 16.0,
            Self::Rapid => 12.0,
        }
    }
}

/// The trio of combat stats every tower carries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Hit points removed from the target per shot.
    pub damage: f32,
    /// Maximum engagement distance in pixels.
    pub range: f32,
    /// Shots per second.
    pub fire_rate: f32,
}

impl TowerStats {
    /// Returns the stat selected by `stat`.
    #[must_use]
    pub const fn get(&self, stat: StatKind) -> f32 {
        match stat {
            StatKind::Damage => self.damage,
            StatKind::Range => self.range,
            StatKind::FireRate => self.fire_rate,
        }
    }

    /// Replaces the stat selected by `stat`.
    pub fn set(&mut self, stat: StatKind, value: f32) {
        match stat {
            StatKind::Damage => self.damage = value,
            StatKind::Range => self.range = value,
            StatKind::FireRate => self.fire_rate = value,
        }
    }
}

/// Tower stats that modifiers and upgrades may act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    /// Damage per shot.
    Damage,
    /// Engagement range.
    Range,
    /// Shots per second.
    FireRate,
}

/// Permanent stat upgrades purchasable per tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeKind {
    /// Multiplies baseline damage.
    Damage,
    /// Multiplies baseline range.
    Range,
    /// Multiplies baseline fire rate.
    Speed,
}

impl UpgradeKind {
    /// Every upgrade, in catalogue order.
    pub const ALL: [UpgradeKind; 3] = [UpgradeKind::Damage, UpgradeKind::Range, UpgradeKind::Speed];

    /// Gold required to purchase the upgrade.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Damage => 30,
            Self::Range => 25,
            Self::Speed => 35,
        }
    }

    /// Baseline stat the upgrade multiplies.
    #[must_use]
    pub const fn stat(self) -> StatKind {
        match self {
            Self::Damage => StatKind::Damage,
            Self::Range => StatKind::Range,
            Self::Speed => StatKind::FireRate,
        }
    }

    /// Multiplier applied to the baseline stat.
    #[must_use]
    pub const fn multiplier(self) -> f32 {
        match self {
            Self::Damage => 1.5,
            Self::Range => 1.3,
            Self::Speed => 1.4,
        }
    }
}

/// Which towers a weather modifier reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierScope {
    /// Every tower on the field.
    AllTowers,
    /// Only towers of the named category.
    Category(TowerCategory),
}

impl ModifierScope {
    /// Reports whether a tower of `category` falls under the scope.
    #[must_use]
    pub const fn covers(self, category: TowerCategory) -> bool {
        match self {
            Self::AllTowers => true,
            Self::Category(scoped) => matches!(
                (scoped, category),
                (TowerCategory::Ballistic, TowerCategory::Ballistic)
                    | (TowerCategory::Precision, TowerCategory::Precision)
            ),
        }
    }
}

/// One multiplicative stat adjustment carried by a weather bucket.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherModifier {
    /// Towers the adjustment reaches.
    pub scope: ModifierScope,
    /// Stat the adjustment multiplies.
    pub stat: StatKind,
    /// Multiplier applied on top of the baseline.
    pub multiplier: f32,
}

/// Weather buckets that numeric observation codes resolve into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherKind {
    /// Calm skies, no effect on towers.
    Clear,
    /// Overcast, no effect on towers.
    Cloudy,
    /// Dense fog that shortens sight lines.
    Fog,
    /// Rain that slows tower mechanisms.
    Rain,
    /// Snow that slows mechanisms and shortens reach.
    Snow,
    /// Storms that badly disrupt firing.
    Thunderstorm,
}

impl WeatherKind {
    /// Human readable label for HUD surfaces.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Fog => "fog",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Thunderstorm => "thunderstorm",
        }
    }
}

/// Result of a weather fetch performed by the driving loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeatherFetchOutcome {
    /// The fetch succeeded and produced a numeric weather code.
    Observed {
        /// Raw observation code reported by the feed.
        code: u16,
    },
    /// The fetch failed; the engine falls back to clear skies.
    Unavailable,
}

/// One wave of the catalogue, as stored by the external wave service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveDefinition {
    #[serde(rename = "id")]
    wave_number: u32,
    #[serde(default)]
    name: String,
    #[serde(rename = "enemies")]
    groups: Vec<EnemyGroup>,
    #[serde(rename = "goldReward")]
    gold_reward: u32,
    #[serde(rename = "boss", default)]
    boss_wave: bool,
}

impl WaveDefinition {
    /// Creates a wave definition from its parts.
    #[must_use]
    pub fn new(
        wave_number: u32,
        name: impl Into<String>,
        groups: Vec<EnemyGroup>,
        gold_reward: u32,
        boss_wave: bool,
    ) -> Self {
        Self {
            wave_number,
            name: name.into(),
            groups,
            gold_reward,
            boss_wave,
        }
    }

    /// One-based number of the wave.
    #[must_use]
    pub const fn wave_number(&self) -> u32 {
        self.wave_number
    }

    /// Display name of the wave. May be empty for older catalogues.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spawn groups in the order they enter the queue.
    #[must_use]
    pub fn groups(&self) -> &[EnemyGroup] {
        &self.groups
    }

    /// Gold credited when the wave is cleared.
    #[must_use]
    pub const fn gold_reward(&self) -> u32 {
        self.gold_reward
    }

    /// Whether the catalogue marks this wave as a boss wave.
    #[must_use]
    pub const fn boss_wave(&self) -> bool {
        self.boss_wave
    }

    /// Total number of enemies the wave will spawn.
    #[must_use]
    pub fn enemy_count(&self) -> u32 {
        self.groups.iter().map(EnemyGroup::count).sum()
    }
}

/// A run of identical enemies within a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyGroup {
    #[serde(rename = "type")]
    kind: EnemyKind,
    count: u32,
}

impl EnemyGroup {
    /// Creates a group of `count` enemies of the provided kind.
    #[must_use]
    pub const fn new(kind: EnemyKind, count: u32) -> Self {
        Self { kind, count }
    }

    /// Kind of enemy the group spawns.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Number of enemies in the group.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }
}

/// Built-in wave catalogue used whenever no external catalogue is installed.
#[must_use]
pub fn builtin_wave_catalogue() -> Vec<WaveDefinition> {
    vec![
        WaveDefinition::new(
            1,
            "Scouts",
            vec![
                EnemyGroup::new(EnemyKind::Basic, 6),
                EnemyGroup::new(EnemyKind::Fast, 3),
            ],
            60,
            false,
        ),
        WaveDefinition::new(
            2,
            "Rush",
            vec![
                EnemyGroup::new(EnemyKind::Fast, 8),
                EnemyGroup::new(EnemyKind::Basic, 4),
            ],
            70,
            false,
        ),
        WaveDefinition::new(
            3,
            "Armour",
            vec![
                EnemyGroup::new(EnemyKind::Tank, 4),
                EnemyGroup::new(EnemyKind::Basic, 6),
            ],
            90,
            false,
        ),
        WaveDefinition::new(
            4,
            "Skies",
            vec![
                EnemyGroup::new(EnemyKind::Flying, 6),
                EnemyGroup::new(EnemyKind::Fast, 4),
            ],
            100,
            false,
        ),
        WaveDefinition::new(
            5,
            "Warlord",
            vec![
                EnemyGroup::new(EnemyKind::Basic, 8),
                EnemyGroup::new(EnemyKind::Tank, 2),
                EnemyGroup::new(EnemyKind::Boss, 1),
            ],
            150,
            true,
        ),
    ]
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested centre carried a NaN or infinite coordinate.
    InvalidPoint,
    /// The player cannot afford the tower.
    InsufficientGold {
        /// Gold the placement would cost.
        required: u32,
        /// Gold currently held.
        available: u32,
    },
    /// The footprint intersects the base building.
    InsideBase,
    /// The footprint sits closer to the road than allowed.
    TooCloseToPath {
        /// Measured clearance to the road centreline in pixels.
        clearance: f32,
    },
    /// The footprint overlaps an existing tower.
    OverlapsTower {
        /// Tower already occupying the space.
        other: TowerId,
    },
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    UnknownTower,
    /// The player cannot afford the upgrade.
    InsufficientGold {
        /// Gold the upgrade would cost.
        required: u32,
        /// Gold currently held.
        available: u32,
    },
}

/// Reasons a tower sale request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SellError {
    /// No tower with the provided identifier exists.
    UnknownTower,
}

/// Reasons an external wave catalogue may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogError {
    /// The catalogue contained no waves.
    Empty,
    /// A wave has already started, so the catalogue is locked in.
    LockedIn,
}

/// Why a game ended in defeat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    /// Every life was lost to enemies reaching the base.
    NoLives,
}

/// Validation failures for path layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PathError {
    /// A path needs at least two waypoints to span a road.
    #[error("a path needs at least two waypoints, got {count}")]
    TooFewWaypoints {
        /// Number of waypoints provided.
        count: usize,
    },
    /// A waypoint carried a NaN or infinite coordinate.
    #[error("waypoint {index} has a non-finite coordinate")]
    NonFiniteWaypoint {
        /// Index of the offending waypoint.
        index: usize,
    },
}

/// Lifecycle phase of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimPhase {
    /// Ticks advance the game.
    Running,
    /// Ticks are held; state is frozen.
    Paused,
    /// The player lost every life. Terminal.
    Defeat,
    /// The player cleared the catalogue. Terminal.
    Victory,
}

impl SimPhase {
    /// Whether the phase accepts further gameplay.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Defeat | Self::Victory)
    }
}

/// Final score tally attached to victory and defeat announcements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Combined score across all components.
    #[serde(rename = "finalScore")]
    pub final_score: u32,
    /// Waves completed before the game ended.
    #[serde(rename = "totalWaves")]
    pub total_waves: u32,
    /// Lives still held when the game ended.
    #[serde(rename = "remainingLives")]
    pub remaining_lives: u32,
    /// Gold still held when the game ended.
    #[serde(rename = "finalGold")]
    pub final_gold: u32,
}

impl ScoreBreakdown {
    /// Tallies the score from its inputs.
    ///
    /// Gold counts ten points each, lives fifty, completed waves a hundred.
    #[must_use]
    pub const fn tally(gold: u32, lives: u32, completed_waves: u32) -> Self {
        Self {
            final_score: gold * 10 + lives * 50 + completed_waves * 100,
            total_waves: completed_waves,
            remaining_lives: lives,
            final_gold: gold,
        }
    }
}

/// Every tunable the simulation reads, gathered in one place.
///
/// Defaults describe a 960x640 field with the base on the left, 100 starting
/// gold, and 20 lives.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Gold held at the start of the game.
    pub start_gold: u32,
    /// Lives held at the start of the game.
    pub start_lives: u32,
    /// Ordered path control points, base first, spawn end last.
    pub waypoints: Vec<FieldPoint>,
    /// Seconds between consecutive spawns within a wave.
    pub spawn_spacing: f32,
    /// Seconds between a wave clearing and the next auto-started wave.
    pub auto_wave_delay: f32,
    /// Seconds between weather fetch requests.
    pub weather_refresh_interval: f32,
    /// Minimum seconds between target re-evaluations per tower.
    pub retarget_interval: f32,
    /// Upper clamp applied to tick deltas, in seconds.
    pub max_tick_seconds: f32,
    /// Minimum allowed distance between a tower centre and the road.
    pub path_clearance: f32,
    /// Half extents of the base building centred on the first waypoint.
    pub base_half_extents: (f32, f32),
    /// Lower bound of the spawn-distance jitter in pixels.
    pub spawn_jitter_min: f32,
    /// Width of the spawn-distance jitter band in pixels.
    pub spawn_jitter_spread: f32,
    /// Seed for the deterministic jitter stream.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_gold: 100,
            start_lives: 20,
            waypoints: vec![
                FieldPoint::new(80.0, 320.0),
                FieldPoint::new(240.0, 230.0),
                FieldPoint::new(520.0, 360.0),
                FieldPoint::new(912.0, 320.0),
            ],
            spawn_spacing: 0.5,
            auto_wave_delay: 1.5,
            weather_refresh_interval: 300.0,
            retarget_interval: 0.25,
            max_tick_seconds: 1.0 / 30.0,
            path_clearance: 36.0,
            base_half_extents: (40.0, 80.0),
            spawn_jitter_min: 24.0,
            spawn_jitter_spread: 40.0,
            seed: 0x51f2_ab98_c03d_77e4,
        }
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Kind of enemy.
    pub kind: EnemyKind,
    /// Current playfield position.
    pub position: FieldPoint,
    /// Remaining hit points.
    pub health: f32,
    /// Hit points the enemy spawned with.
    pub max_health: f32,
    /// Path distance left before the base is reached.
    pub remaining: f32,
    /// Walking speed in pixels per second.
    pub speed: f32,
}

/// Read-only snapshot describing all enemies on the field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower.
    pub kind: TowerKind,
    /// Weather scoping category.
    pub category: TowerCategory,
    /// Centre of the tower in playfield coordinates.
    pub position: FieldPoint,
    /// Stats before modifiers, after upgrades.
    pub baseline: TowerStats,
    /// Stats after weather and scripted modifiers.
    pub effective: TowerStats,
    /// Seconds left before the tower may fire again.
    pub cooldown: f32,
    /// Enemy the tower is currently tracking, if any.
    pub target: Option<EnemyId>,
    /// Enemies destroyed by the tower.
    pub kills: u32,
    /// Cumulative damage dealt by the tower.
    pub damage_dealt: f32,
    /// Cumulative gold spent on the tower.
    pub invested: u32,
}

impl TowerSnapshot {
    /// Damage dealt per gold invested.
    #[must_use]
    pub fn efficiency(&self) -> f32 {
        if self.invested == 0 {
            return 0.0;
        }
        self.damage_dealt / self.invested as f32
    }
}

/// Read-only snapshot describing all towers on the field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of towers captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no towers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Wave progress summary surfaced on the HUD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveStatus {
    /// Waves started so far.
    pub started_waves: u32,
    /// Total waves in the catalogue.
    pub total_waves: u32,
    /// Enemies still queued or alive in the current wave.
    pub remaining_enemies: u32,
    /// Whether a wave is currently spawning or clearing.
    pub in_progress: bool,
    /// Whether automatic progression is active.
    pub auto_waves: bool,
}

/// Deep read-only copy of everything a consumer may present.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    /// Gold currently held.
    pub gold: u32,
    /// Lives currently held.
    pub lives: u32,
    /// Lifecycle phase of the simulation.
    pub phase: SimPhase,
    /// Armed build selection, if any.
    pub selected_tower: Option<TowerKind>,
    /// Wave progress summary.
    pub wave: WaveStatus,
    /// Weather bucket currently applied to towers.
    pub weather: WeatherKind,
    /// Score the player would bank if the game ended now.
    pub score: u32,
    /// Enemies on the field, sorted by identifier.
    pub enemies: EnemyView,
    /// Towers on the field, sorted by identifier.
    pub towers: TowerView,
}
