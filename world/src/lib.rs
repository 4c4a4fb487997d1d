#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Curve Defence.

mod enemies;
mod rng;
mod towers;
mod waves;
mod weather;

use std::time::Duration;

use curve_defence_core::{
    builtin_wave_catalogue, Command, EnemyId, EnemyKind, Event, FieldPoint, GameOverReason,
    PathError, PlacementError, ScoreBreakdown, SellError, SimPhase, SimulationConfig, TowerId,
    TowerKind, UpgradeError, UpgradeKind,
};
use curve_defence_system_path_geometry::PathGeometry;
use curve_defence_system_tower_targeting::{select_target, TargetCandidate};
use curve_defence_system_weather::modifier_set;

use crate::enemies::Enemy;
use crate::rng::SplitMix64;
use crate::towers::Tower;
use crate::waves::{WaveDirector, WaveLaunch};
use crate::weather::WeatherStation;

/// Represents the authoritative Curve Defence world state.
#[derive(Debug)]
pub struct World {
    config: SimulationConfig,
    path: PathGeometry,
    pending_layout: Option<PathGeometry>,
    phase: SimPhase,
    gold: u32,
    lives: u32,
    selected: Option<TowerKind>,
    enemies: Vec<Enemy>,
    towers: Vec<Tower>,
    director: WaveDirector,
    station: WeatherStation,
    rng: SplitMix64,
    next_enemy_id: u32,
    next_tower_id: u32,
    candidates: Vec<TargetCandidate>,
}

impl World {
    /// Creates a new Curve Defence world ready for simulation.
    ///
    /// Fails when the configured waypoints cannot form a valid road.
    pub fn new(config: SimulationConfig) -> Result<Self, PathError> {
        let path = PathGeometry::from_waypoints(&config.waypoints)?;
        let director = WaveDirector::new(
            builtin_wave_catalogue(),
            config.spawn_spacing,
            config.auto_wave_delay,
        );
        let station = WeatherStation::new(config.weather_refresh_interval);
        let rng = SplitMix64::new(config.seed);
        Ok(Self {
            phase: SimPhase::Running,
            gold: config.start_gold,
            lives: config.start_lives,
            selected: None,
            enemies: Vec::new(),
            towers: Vec::new(),
            pending_layout: None,
            next_enemy_id: 0,
            next_tower_id: 0,
            candidates: Vec::new(),
            director,
            station,
            rng,
            path,
            config,
        })
    }

    // Tick order is fixed: staged layout, weather, scheduler, towers,
    // movement, then settlement. Events record the same order.
    fn run_tick(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        self.apply_pending_layout(out_events);
        self.advance_weather(dt, out_events);
        self.advance_scheduler(dt, out_events);
        self.advance_towers(dt);
        self.advance_enemies(dt);
        self.resolve_kills(out_events);
        self.resolve_breaches(out_events);
        self.prune_dead();
        self.check_defeat(out_events);
    }

    fn prune_dead(&mut self) {
        self.enemies.retain(|enemy| !enemy.dead);
        for tower in &mut self.towers {
            let Some(id) = tower.target else {
                continue;
            };
            if !self.enemies.iter().any(|enemy| enemy.id == id) {
                tower.target = None;
            }
        }
    }

    fn apply_pending_layout(&mut self, out_events: &mut Vec<Event>) {
        let Some(path) = self.pending_layout.take() else {
            return;
        };
        self.path = path;
        // Progress carries over as distance-to-base; anything parked beyond
        // the new spawn margin snaps back into it.
        let margin = self.config.spawn_jitter_min + self.config.spawn_jitter_spread;
        let ceiling = self.path.total_length() + margin;
        for enemy in &mut self.enemies {
            enemy.remaining = enemy.remaining.min(ceiling);
            enemy.position = self.path.point_at(enemy.remaining);
        }
        out_events.push(Event::LayoutChanged {
            total_length: self.path.total_length(),
        });
    }

    fn advance_weather(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        if self.station.advance(dt) {
            out_events.push(Event::WeatherFetchRequested);
        }
        self.refresh_tower_modifiers(dt);
    }

    fn refresh_tower_modifiers(&mut self, dt: f32) {
        let active = modifier_set(self.station.current());
        for tower in &mut self.towers {
            tower.refresh_modifiers(dt, active);
        }
    }

    fn advance_scheduler(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let advance = self.director.advance(dt);
        for kind in advance.due {
            self.spawn_enemy(kind, out_events);
        }
        if let Some(completion) = advance.completion {
            self.gold += completion.gold_reward;
            out_events.push(Event::WaveCompleted {
                wave_number: completion.wave_number,
                gold_reward: completion.gold_reward,
            });
            if completion.settled {
                self.phase = SimPhase::Victory;
                out_events.push(Event::Victory {
                    score: self.score_now(),
                });
            }
        }
        if advance.start_next {
            if let Some(launch) = self.director.start_next() {
                push_wave_started(launch, out_events);
            }
        }
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, out_events: &mut Vec<Event>) {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id += 1;
        let jitter = self.config.spawn_jitter_min
            + self.rng.next_unit() as f32 * self.config.spawn_jitter_spread;
        let remaining = self.path.total_length() + jitter;
        let enemy = Enemy::spawn(id, kind, remaining, &self.path);
        self.enemies.push(enemy);
        self.director.note_spawned();
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            wave_number: self.director.current_wave(),
        });
    }

    fn advance_towers(&mut self, dt: f32) {
        self.rebuild_candidates();
        for index in 0..self.towers.len() {
            {
                let tower = &mut self.towers[index];
                tower.cooldown = (tower.cooldown - dt).max(0.0);
                tower.retarget_clock += dt;
                if tower.cooldown > 0.0 {
                    continue;
                }
            }
            let origin = self.towers[index].position;
            let range = self.towers[index].effective.range;
            let target = self.acquire_target(index, origin, range);
            self.towers[index].target = target;
            if let Some(victim) = target {
                self.fire_at(index, victim);
            }
        }
    }

    fn rebuild_candidates(&mut self) {
        let total = self.path.total_length();
        self.candidates.clear();
        for enemy in &self.enemies {
            if enemy.dead {
                continue;
            }
            self.candidates.push(TargetCandidate {
                enemy: enemy.id,
                position: enemy.position,
                travelled: enemy.travelled(total),
            });
        }
    }

    /// A held target survives as long as it is alive and in range. A fresh
    /// pick runs at most once per retarget interval; between picks the tower
    /// holds fire rather than grabbing whatever walked past.
    fn acquire_target(&mut self, index: usize, origin: FieldPoint, range: f32) -> Option<EnemyId> {
        let cached = self.towers[index].target.filter(|id| {
            self.enemies.iter().any(|enemy| {
                enemy.id == *id
                    && !enemy.dead
                    && origin.distance_squared_to(enemy.position) <= range * range
            })
        });
        if let Some(id) = cached {
            return Some(id);
        }
        if self.towers[index].retarget_clock < self.config.retarget_interval {
            return None;
        }
        self.towers[index].retarget_clock = 0.0;
        select_target(origin, range, &self.candidates)
    }

    fn fire_at(&mut self, index: usize, victim: EnemyId) {
        let damage = self.towers[index].effective.damage;
        let Some(enemy) = self
            .enemies
            .iter_mut()
            .find(|enemy| enemy.id == victim && !enemy.dead)
        else {
            return;
        };
        let killed = enemy.apply_damage(damage);
        let tower = &mut self.towers[index];
        tower.damage_dealt += damage;
        if killed {
            tower.kills += 1;
            self.candidates.retain(|candidate| candidate.enemy != victim);
        }
        tower.reset_cooldown();
    }

    fn advance_enemies(&mut self, dt: f32) {
        for enemy in &mut self.enemies {
            let _ = enemy.advance(dt, &self.path);
        }
    }

    fn resolve_kills(&mut self, out_events: &mut Vec<Event>) {
        for enemy in &mut self.enemies {
            if !enemy.dead || enemy.reached_base || enemy.accounted {
                continue;
            }
            enemy.accounted = true;
            let reward = enemy.kind.reward();
            self.gold += reward;
            let remaining = self.director.note_defeated();
            out_events.push(Event::EnemyKilled {
                enemy: enemy.id,
                kind: enemy.kind,
                reward,
            });
            out_events.push(Event::RemainingEnemiesChanged { remaining });
        }
    }

    fn resolve_breaches(&mut self, out_events: &mut Vec<Event>) {
        for enemy in &mut self.enemies {
            if !enemy.reached_base || enemy.accounted {
                continue;
            }
            enemy.accounted = true;
            self.lives = self.lives.saturating_sub(1);
            let remaining = self.director.note_defeated();
            out_events.push(Event::EnemyReachedBase {
                enemy: enemy.id,
                lives: self.lives,
            });
            out_events.push(Event::RemainingEnemiesChanged { remaining });
        }
    }

    fn check_defeat(&mut self, out_events: &mut Vec<Event>) {
        if self.phase == SimPhase::Running && self.lives == 0 {
            self.phase = SimPhase::Defeat;
            out_events.push(Event::GameOver {
                reason: GameOverReason::NoLives,
                score: self.score_now(),
            });
        }
    }

    fn validate_placement(&self, kind: TowerKind, at: FieldPoint) -> Result<(), PlacementError> {
        if !at.is_finite() {
            return Err(PlacementError::InvalidPoint);
        }
        let required = kind.cost();
        if self.gold < required {
            return Err(PlacementError::InsufficientGold {
                required,
                available: self.gold,
            });
        }
        let base = self.path.base();
        let (half_width, half_height) = self.config.base_half_extents;
        if (at.x() - base.x()).abs() <= half_width && (at.y() - base.y()).abs() <= half_height {
            return Err(PlacementError::InsideBase);
        }
        let clearance = self.path.distance_to(at);
        if clearance < self.config.path_clearance {
            return Err(PlacementError::TooCloseToPath { clearance });
        }
        let radius = kind.footprint_radius();
        for existing in &self.towers {
            let reach = radius + existing.kind.footprint_radius();
            if at.distance_squared_to(existing.position) < reach * reach {
                return Err(PlacementError::OverlapsTower { other: existing.id });
            }
        }
        Ok(())
    }

    fn place_tower(&mut self, kind: TowerKind, at: FieldPoint, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.validate_placement(kind, at) {
            out_events.push(Event::TowerPlacementRejected { kind, at, reason });
            return;
        }
        self.gold -= kind.cost();
        let id = TowerId::new(self.next_tower_id);
        self.next_tower_id += 1;
        let mut tower = Tower::place(id, kind, at);
        tower.refresh_modifiers(0.0, modifier_set(self.station.current()));
        self.towers.push(tower);
        out_events.push(Event::TowerPlaced {
            tower: id,
            kind,
            at,
        });
    }

    fn sell_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let Some(index) = self.towers.iter().position(|existing| existing.id == tower) else {
            out_events.push(Event::TowerSaleRejected {
                tower,
                reason: SellError::UnknownTower,
            });
            return;
        };
        let removed = self.towers.remove(index);
        let refund = removed.refund_value();
        self.gold += refund;
        out_events.push(Event::TowerSold { tower, refund });
    }

    fn upgrade_tower(
        &mut self,
        tower: TowerId,
        upgrade: UpgradeKind,
        out_events: &mut Vec<Event>,
    ) {
        let weather = modifier_set(self.station.current());
        let Some(existing) = self.towers.iter_mut().find(|existing| existing.id == tower) else {
            out_events.push(Event::TowerUpgradeRejected {
                tower,
                upgrade,
                reason: UpgradeError::UnknownTower,
            });
            return;
        };
        let required = upgrade.cost();
        if self.gold < required {
            out_events.push(Event::TowerUpgradeRejected {
                tower,
                upgrade,
                reason: UpgradeError::InsufficientGold {
                    required,
                    available: self.gold,
                },
            });
            return;
        }
        self.gold -= required;
        existing.apply_upgrade(upgrade);
        existing.refresh_modifiers(0.0, weather);
        out_events.push(Event::TowerUpgraded {
            tower,
            upgrade,
            invested: existing.invested,
        });
    }

    fn score_now(&self) -> ScoreBreakdown {
        ScoreBreakdown::tally(self.gold, self.lives, self.director.completed_waves())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the world reaches a terminal phase every further command is ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.phase.is_terminal() {
        return;
    }
    match command {
        Command::ConfigureLayout { waypoints } => {
            match PathGeometry::from_waypoints(&waypoints) {
                Ok(path) => world.pending_layout = Some(path),
                Err(reason) => out_events.push(Event::LayoutRejected { reason }),
            }
        }
        Command::Tick { elapsed } => {
            if world.phase == SimPhase::Paused {
                return;
            }
            let dt = elapsed.as_secs_f32().min(world.config.max_tick_seconds);
            world.run_tick(dt, out_events);
            out_events.push(Event::TimeAdvanced {
                dt: Duration::from_secs_f32(dt),
            });
        }
        Command::SelectTower { kind } => {
            if world.selected != kind {
                world.selected = kind;
                out_events.push(Event::SelectedTowerChanged { kind });
            }
        }
        Command::PlaceTower { kind, at } => world.place_tower(kind, at, out_events),
        Command::SellTower { tower } => world.sell_tower(tower, out_events),
        Command::UpgradeTower { tower, upgrade } => {
            world.upgrade_tower(tower, upgrade, out_events);
        }
        Command::StartWave => {
            if let Some(launch) = world.director.start_next() {
                push_wave_started(launch, out_events);
            }
        }
        Command::SetAutoWaves { enabled } => {
            world.director.set_auto_waves(enabled);
            out_events.push(Event::AutoWavesChanged { enabled });
        }
        Command::SetPaused { paused } => {
            let next = if paused {
                SimPhase::Paused
            } else {
                SimPhase::Running
            };
            if world.phase != next {
                world.phase = next;
                out_events.push(Event::PausedChanged { paused });
            }
        }
        Command::InstallWaveCatalog { waves } => match world.director.install(waves) {
            Ok(total_waves) => out_events.push(Event::WaveCatalogInstalled { total_waves }),
            Err(reason) => out_events.push(Event::WaveCatalogRejected { reason }),
        },
        Command::SubmitWeather { outcome } => {
            if let Some(kind) = world.station.submit(outcome) {
                out_events.push(Event::WeatherChanged { kind });
                world.refresh_tower_modifiers(0.0);
            }
        }
    }
}

fn push_wave_started(launch: WaveLaunch, out_events: &mut Vec<Event>) {
    out_events.push(Event::WaveStarted {
        wave_number: launch.wave_number,
        total_waves: launch.total_waves,
        enemy_count: launch.enemy_count,
        boss_wave: launch.boss_wave,
    });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use curve_defence_core::{
        EnemySnapshot, EnemyView, FieldPoint, ScoreBreakdown, SimPhase, SimulationSnapshot,
        TowerKind, TowerSnapshot, TowerView, WaveStatus, WeatherKind,
    };

    use super::World;

    /// Gold currently held by the player.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.gold
    }

    /// Lives currently held by the player.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Lifecycle phase of the simulation.
    #[must_use]
    pub fn phase(world: &World) -> SimPhase {
        world.phase
    }

    /// Whether the simulation clock is currently advancing.
    #[must_use]
    pub fn is_running(world: &World) -> bool {
        world.phase == SimPhase::Running
    }

    /// Armed build selection, if any.
    #[must_use]
    pub fn selected_tower(world: &World) -> Option<TowerKind> {
        world.selected
    }

    /// Arc length of the active road.
    #[must_use]
    pub fn path_length(world: &World) -> f32 {
        world.path.total_length()
    }

    /// Sampled road polyline in base-to-spawn order.
    #[must_use]
    pub fn path_samples(world: &World) -> &[FieldPoint] {
        world.path.samples()
    }

    /// Weather bucket currently applied to towers.
    #[must_use]
    pub fn current_weather(world: &World) -> WeatherKind {
        world.station.current()
    }

    /// Wave progress summary.
    #[must_use]
    pub fn wave_status(world: &World) -> WaveStatus {
        world.director.status()
    }

    /// Score the player would bank if the game ended now.
    #[must_use]
    pub fn score(world: &World) -> ScoreBreakdown {
        world.score_now()
    }

    /// Captures a read-only view of the enemies on the field.
    #[must_use]
    pub fn enemies(world: &World) -> EnemyView {
        let snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                kind: enemy.kind,
                position: enemy.position,
                health: enemy.health,
                max_health: enemy.kind.max_health(),
                remaining: enemy.remaining,
                speed: enemy.kind.speed(),
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the towers on the field.
    #[must_use]
    pub fn towers(world: &World) -> TowerView {
        let snapshots: Vec<TowerSnapshot> = world
            .towers
            .iter()
            .map(|tower| TowerSnapshot {
                id: tower.id,
                kind: tower.kind,
                category: tower.kind.category(),
                position: tower.position,
                baseline: tower.baseline,
                effective: tower.effective,
                cooldown: tower.cooldown,
                target: tower.target,
                kills: tower.kills,
                damage_dealt: tower.damage_dealt,
                invested: tower.invested,
            })
            .collect();
        TowerView::from_snapshots(snapshots)
    }

    /// Captures a deep snapshot of everything a consumer may present.
    #[must_use]
    pub fn snapshot(world: &World) -> SimulationSnapshot {
        SimulationSnapshot {
            gold: world.gold,
            lives: world.lives,
            phase: world.phase,
            selected_tower: world.selected,
            wave: wave_status(world),
            weather: current_weather(world),
            score: world.score_now().final_score,
            enemies: enemies(world),
            towers: towers(world),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{apply, query, World};
    use curve_defence_core::{
        CatalogError, Command, EnemyGroup, EnemyId, EnemyKind, Event, FieldPoint, GameOverReason,
        PathError, PlacementError, ScoreBreakdown, SellError, SimPhase, SimulationConfig, TowerId,
        TowerKind, UpgradeError, UpgradeKind, WaveDefinition, WeatherFetchOutcome, WeatherKind,
    };

    fn straight_config() -> SimulationConfig {
        SimulationConfig {
            waypoints: vec![FieldPoint::new(0.0, 0.0), FieldPoint::new(1000.0, 0.0)],
            ..SimulationConfig::default()
        }
    }

    fn straight_world() -> World {
        World::new(straight_config()).unwrap()
    }

    fn apply_one(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    fn single_wave(kind: EnemyKind, count: u32) -> Vec<WaveDefinition> {
        vec![WaveDefinition::new(
            1,
            "Probe",
            vec![EnemyGroup::new(kind, count)],
            25,
            false,
        )]
    }

    #[test]
    fn rejects_configs_without_a_viable_road() {
        let config = SimulationConfig {
            waypoints: vec![FieldPoint::new(0.0, 0.0)],
            ..SimulationConfig::default()
        };
        assert_eq!(
            World::new(config).err(),
            Some(PathError::TooFewWaypoints { count: 1 })
        );
    }

    #[test]
    fn nan_points_are_rejected_before_anything_else() {
        let mut world = straight_world();
        let events = apply_one(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                at: FieldPoint::new(f32::NAN, 50.0),
            },
        );
        assert!(matches!(
            events.as_slice(),
            [Event::TowerPlacementRejected {
                reason: PlacementError::InvalidPoint,
                ..
            }]
        ));
        assert_eq!(query::gold(&world), 100);
    }

    #[test]
    fn gold_is_checked_before_geometry() {
        let mut world = straight_world();
        let _ = apply_one(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Sniper,
                at: FieldPoint::new(500.0, 50.0),
            },
        );
        assert_eq!(query::gold(&world), 20);

        let events = apply_one(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                at: FieldPoint::new(10.0, 10.0),
            },
        );
        assert_eq!(
            events,
            vec![Event::TowerPlacementRejected {
                kind: TowerKind::Basic,
                at: FieldPoint::new(10.0, 10.0),
                reason: PlacementError::InsufficientGold {
                    required: 40,
                    available: 20,
                },
            }]
        );
    }

    #[test]
    fn the_base_footprint_refuses_towers() {
        let mut world = straight_world();
        let events = apply_one(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                at: FieldPoint::new(10.0, 10.0),
            },
        );
        assert_eq!(
            events,
            vec![Event::TowerPlacementRejected {
                kind: TowerKind::Basic,
                at: FieldPoint::new(10.0, 10.0),
                reason: PlacementError::InsideBase,
            }]
        );
        assert!(query::towers(&world).is_empty());
        assert_eq!(query::gold(&world), 100);
    }

    #[test]
    fn road_clearance_reports_the_measured_distance() {
        let mut world = straight_world();
        let events = apply_one(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                at: FieldPoint::new(500.0, 10.0),
            },
        );
        let clearance = match events.as_slice() {
            [Event::TowerPlacementRejected {
                reason: PlacementError::TooCloseToPath { clearance },
                ..
            }] => *clearance,
            other => panic!("expected a clearance rejection, got {other:?}"),
        };
        assert!((clearance - 10.0).abs() < 1e-3);
    }

    #[test]
    fn towers_may_not_overlap() {
        let mut world = straight_world();
        let _ = apply_one(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                at: FieldPoint::new(500.0, 50.0),
            },
        );
        let events = apply_one(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                at: FieldPoint::new(510.0, 50.0),
            },
        );
        assert_eq!(
            events,
            vec![Event::TowerPlacementRejected {
                kind: TowerKind::Basic,
                at: FieldPoint::new(510.0, 50.0),
                reason: PlacementError::OverlapsTower {
                    other: TowerId::new(0),
                },
            }]
        );
    }

    #[test]
    fn placements_debit_gold_and_number_towers_in_order() {
        let mut world = straight_world();
        let first = apply_one(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                at: FieldPoint::new(500.0, 50.0),
            },
        );
        assert_eq!(
            first,
            vec![Event::TowerPlaced {
                tower: TowerId::new(0),
                kind: TowerKind::Basic,
                at: FieldPoint::new(500.0, 50.0),
            }]
        );
        let second = apply_one(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Rapid,
                at: FieldPoint::new(600.0, 50.0),
            },
        );
        assert_eq!(
            second,
            vec![Event::TowerPlaced {
                tower: TowerId::new(1),
                kind: TowerKind::Rapid,
                at: FieldPoint::new(600.0, 50.0),
            }]
        );
        assert_eq!(query::gold(&world), 0);
        assert_eq!(query::towers(&world).len(), 2);
    }

    #[test]
    fn pausing_freezes_the_clock_entirely() {
        let mut world = straight_world();
        assert_eq!(
            apply_one(&mut world, Command::SetPaused { paused: true }),
            vec![Event::PausedChanged { paused: true }]
        );
        assert!(!query::is_running(&world));
        assert!(apply_one(&mut world, Command::SetPaused { paused: true }).is_empty());
        assert!(apply_one(
            &mut world,
            Command::Tick {
                elapsed: Duration::from_secs(1),
            },
        )
        .is_empty());

        assert_eq!(
            apply_one(&mut world, Command::SetPaused { paused: false }),
            vec![Event::PausedChanged { paused: false }]
        );
        assert!(query::is_running(&world));
        let events = apply_one(
            &mut world,
            Command::Tick {
                elapsed: Duration::from_millis(16),
            },
        );
        assert!(events.contains(&Event::WeatherFetchRequested));
    }

    #[test]
    fn runaway_deltas_clamp_to_the_tick_ceiling() {
        let mut world = straight_world();
        let _ = apply_one(
            &mut world,
            Command::Tick {
                elapsed: Duration::from_millis(16),
            },
        );
        let events = apply_one(
            &mut world,
            Command::Tick {
                elapsed: Duration::from_secs(5),
            },
        );
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_secs_f32(1.0 / 30.0),
            }]
        );
    }

    #[test]
    fn upgrades_debit_gold_until_it_runs_out() {
        let mut world = straight_world();
        let _ = apply_one(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                at: FieldPoint::new(500.0, 50.0),
            },
        );
        let tower = TowerId::new(0);

        assert_eq!(
            apply_one(
                &mut world,
                Command::UpgradeTower {
                    tower,
                    upgrade: UpgradeKind::Damage,
                },
            ),
            vec![Event::TowerUpgraded {
                tower,
                upgrade: UpgradeKind::Damage,
                invested: 70,
            }]
        );
        assert_eq!(
            apply_one(
                &mut world,
                Command::UpgradeTower {
                    tower,
                    upgrade: UpgradeKind::Range,
                },
            ),
            vec![Event::TowerUpgraded {
                tower,
                upgrade: UpgradeKind::Range,
                invested: 95,
            }]
        );
        assert_eq!(
            apply_one(
                &mut world,
                Command::UpgradeTower {
                    tower,
                    upgrade: UpgradeKind::Speed,
                },
            ),
            vec![Event::TowerUpgradeRejected {
                tower,
                upgrade: UpgradeKind::Speed,
                reason: UpgradeError::InsufficientGold {
                    required: 35,
                    available: 5,
                },
            }]
        );
        assert_eq!(query::gold(&world), 5);

        let towers = query::towers(&world).into_vec();
        assert_eq!(towers[0].baseline.damage, 6.0);
        assert_eq!(towers[0].effective.damage, 6.0);
    }

    #[test]
    fn selling_returns_half_the_investment() {
        let mut world = straight_world();
        let _ = apply_one(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                at: FieldPoint::new(500.0, 50.0),
            },
        );
        let _ = apply_one(
            &mut world,
            Command::UpgradeTower {
                tower: TowerId::new(0),
                upgrade: UpgradeKind::Damage,
            },
        );
        assert_eq!(query::gold(&world), 30);

        let events = apply_one(
            &mut world,
            Command::SellTower {
                tower: TowerId::new(0),
            },
        );
        assert_eq!(
            events,
            vec![Event::TowerSold {
                tower: TowerId::new(0),
                refund: 35,
            }]
        );
        assert_eq!(query::gold(&world), 65);
        assert!(query::towers(&world).is_empty());
    }

    #[test]
    fn requests_against_unknown_towers_are_rejected() {
        let mut world = straight_world();
        assert_eq!(
            apply_one(
                &mut world,
                Command::SellTower {
                    tower: TowerId::new(9),
                },
            ),
            vec![Event::TowerSaleRejected {
                tower: TowerId::new(9),
                reason: SellError::UnknownTower,
            }]
        );
        assert_eq!(
            apply_one(
                &mut world,
                Command::UpgradeTower {
                    tower: TowerId::new(9),
                    upgrade: UpgradeKind::Damage,
                },
            ),
            vec![Event::TowerUpgradeRejected {
                tower: TowerId::new(9),
                upgrade: UpgradeKind::Damage,
                reason: UpgradeError::UnknownTower,
            }]
        );
    }

    #[test]
    fn layouts_swap_at_the_next_tick_boundary() {
        let mut world = straight_world();
        let staged = apply_one(
            &mut world,
            Command::ConfigureLayout {
                waypoints: vec![FieldPoint::new(0.0, 0.0), FieldPoint::new(500.0, 0.0)],
            },
        );
        assert!(staged.is_empty());
        assert!(query::path_length(&world) > 900.0);

        let events = apply_one(
            &mut world,
            Command::Tick {
                elapsed: Duration::from_millis(16),
            },
        );
        let total = events
            .iter()
            .find_map(|event| match event {
                Event::LayoutChanged { total_length } => Some(*total_length),
                _ => None,
            })
            .expect("layout should activate on the tick");
        assert!((total - 500.0).abs() < 1.0);
        assert!((query::path_length(&world) - 500.0).abs() < 1.0);
    }

    #[test]
    fn broken_layouts_are_refused_immediately() {
        let mut world = straight_world();
        assert_eq!(
            apply_one(
                &mut world,
                Command::ConfigureLayout {
                    waypoints: vec![FieldPoint::new(0.0, 0.0)],
                },
            ),
            vec![Event::LayoutRejected {
                reason: PathError::TooFewWaypoints { count: 1 },
            }]
        );
    }

    #[test]
    fn selection_changes_emit_once() {
        let mut world = straight_world();
        assert_eq!(
            apply_one(
                &mut world,
                Command::SelectTower {
                    kind: Some(TowerKind::Rapid),
                },
            ),
            vec![Event::SelectedTowerChanged {
                kind: Some(TowerKind::Rapid),
            }]
        );
        assert!(apply_one(
            &mut world,
            Command::SelectTower {
                kind: Some(TowerKind::Rapid),
            },
        )
        .is_empty());
        assert_eq!(query::selected_tower(&world), Some(TowerKind::Rapid));
        assert_eq!(
            apply_one(&mut world, Command::SelectTower { kind: None }),
            vec![Event::SelectedTowerChanged { kind: None }]
        );
    }

    #[test]
    fn catalogues_validate_and_lock_in() {
        let mut world = straight_world();
        assert_eq!(
            apply_one(&mut world, Command::InstallWaveCatalog { waves: Vec::new() }),
            vec![Event::WaveCatalogRejected {
                reason: CatalogError::Empty,
            }]
        );
        assert_eq!(
            apply_one(
                &mut world,
                Command::InstallWaveCatalog {
                    waves: single_wave(EnemyKind::Basic, 2),
                },
            ),
            vec![Event::WaveCatalogInstalled { total_waves: 1 }]
        );
        assert_eq!(
            apply_one(&mut world, Command::StartWave),
            vec![Event::WaveStarted {
                wave_number: 1,
                total_waves: 1,
                enemy_count: 2,
                boss_wave: false,
            }]
        );
        assert_eq!(
            apply_one(
                &mut world,
                Command::InstallWaveCatalog {
                    waves: single_wave(EnemyKind::Fast, 1),
                },
            ),
            vec![Event::WaveCatalogRejected {
                reason: CatalogError::LockedIn,
            }]
        );
    }

    #[test]
    fn waves_spawn_on_the_configured_cadence() {
        let mut config = straight_config();
        config.max_tick_seconds = 0.5;
        let mut world = World::new(config).unwrap();
        let _ = apply_one(
            &mut world,
            Command::InstallWaveCatalog {
                waves: single_wave(EnemyKind::Basic, 2),
            },
        );
        let _ = apply_one(&mut world, Command::StartWave);

        let first = apply_one(
            &mut world,
            Command::Tick {
                elapsed: Duration::from_secs_f32(0.3),
            },
        );
        assert!(first.contains(&Event::EnemySpawned {
            enemy: EnemyId::new(0),
            kind: EnemyKind::Basic,
            wave_number: 1,
        }));
        let second = apply_one(
            &mut world,
            Command::Tick {
                elapsed: Duration::from_secs_f32(0.3),
            },
        );
        assert!(second.contains(&Event::EnemySpawned {
            enemy: EnemyId::new(1),
            kind: EnemyKind::Basic,
            wave_number: 1,
        }));

        assert_eq!(query::enemies(&world).len(), 2);
        let status = query::wave_status(&world);
        assert!(status.in_progress);
        assert_eq!(status.remaining_enemies, 2);
    }

    #[test]
    fn a_basic_tower_fires_on_its_reload_cadence() {
        let mut config = straight_config();
        config.max_tick_seconds = 0.1;
        let mut world = World::new(config).unwrap();
        let _ = apply_one(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                at: FieldPoint::new(500.0, 60.0),
            },
        );
        let _ = apply_one(
            &mut world,
            Command::InstallWaveCatalog {
                waves: single_wave(EnemyKind::Tank, 1),
            },
        );
        let _ = apply_one(&mut world, Command::StartWave);

        let tick = Command::Tick {
            elapsed: Duration::from_secs_f32(0.1),
        };
        let mut warmup = 0;
        while query::towers(&world).into_vec()[0].damage_dealt == 0.0 {
            let _ = apply_one(&mut world, tick.clone());
            warmup += 1;
            assert!(warmup < 400, "the tank never walked into range");
        }

        // One reload per second at 0.1 s ticks: three more shots inside the
        // next 3.5 s, the fifth not before the 4 s mark.
        for _ in 0..35 {
            let _ = apply_one(&mut world, tick.clone());
        }

        let towers = query::towers(&world).into_vec();
        assert_eq!(towers[0].damage_dealt, 16.0);
        assert_eq!(towers[0].kills, 0);
        assert_eq!(query::enemies(&world).len(), 1);
    }

    #[test]
    fn a_lone_sniper_clears_the_probe_wave() {
        let mut config = straight_config();
        config.max_tick_seconds = 0.1;
        let mut world = World::new(config).unwrap();
        let _ = apply_one(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Sniper,
                at: FieldPoint::new(500.0, 50.0),
            },
        );
        let _ = apply_one(
            &mut world,
            Command::InstallWaveCatalog {
                waves: single_wave(EnemyKind::Basic, 1),
            },
        );
        let _ = apply_one(&mut world, Command::StartWave);

        let mut all = Vec::new();
        for _ in 0..200 {
            apply(
                &mut world,
                Command::Tick {
                    elapsed: Duration::from_secs_f32(0.1),
                },
                &mut all,
            );
        }

        assert!(all.contains(&Event::EnemyKilled {
            enemy: EnemyId::new(0),
            kind: EnemyKind::Basic,
            reward: 6,
        }));
        assert!(all.contains(&Event::RemainingEnemiesChanged { remaining: 0 }));
        assert!(all.contains(&Event::WaveCompleted {
            wave_number: 1,
            gold_reward: 25,
        }));
        assert!(all.contains(&Event::Victory {
            score: ScoreBreakdown::tally(51, 20, 1),
        }));
        assert_eq!(query::phase(&world), SimPhase::Victory);

        let towers = query::towers(&world).into_vec();
        assert_eq!(towers[0].kills, 1);
        assert_eq!(towers[0].damage_dealt, 12.0);
    }

    #[test]
    fn defeat_freezes_the_world() {
        let mut config = straight_config();
        config.waypoints = vec![FieldPoint::new(0.0, 0.0), FieldPoint::new(200.0, 0.0)];
        config.start_lives = 1;
        config.max_tick_seconds = 0.1;
        let mut world = World::new(config).unwrap();
        let _ = apply_one(
            &mut world,
            Command::InstallWaveCatalog {
                waves: single_wave(EnemyKind::Basic, 1),
            },
        );
        let _ = apply_one(&mut world, Command::StartWave);

        let mut all = Vec::new();
        for _ in 0..60 {
            apply(
                &mut world,
                Command::Tick {
                    elapsed: Duration::from_secs_f32(0.1),
                },
                &mut all,
            );
        }

        assert!(all.contains(&Event::EnemyReachedBase {
            enemy: EnemyId::new(0),
            lives: 0,
        }));
        let game_overs: Vec<_> = all
            .iter()
            .filter(|event| matches!(event, Event::GameOver { .. }))
            .collect();
        assert_eq!(game_overs.len(), 1);
        assert_eq!(
            game_overs[0],
            &Event::GameOver {
                reason: GameOverReason::NoLives,
                score: ScoreBreakdown::tally(100, 0, 0),
            }
        );
        assert_eq!(query::phase(&world), SimPhase::Defeat);

        assert!(apply_one(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                at: FieldPoint::new(100.0, 50.0),
            },
        )
        .is_empty());
        assert!(apply_one(
            &mut world,
            Command::Tick {
                elapsed: Duration::from_secs_f32(0.1),
            },
        )
        .is_empty());
        assert!(apply_one(&mut world, Command::StartWave).is_empty());
    }

    #[test]
    fn weather_submissions_retune_towers_immediately() {
        let mut world = straight_world();
        let _ = apply_one(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                at: FieldPoint::new(500.0, 50.0),
            },
        );

        assert_eq!(
            apply_one(
                &mut world,
                Command::SubmitWeather {
                    outcome: WeatherFetchOutcome::Observed { code: 61 },
                },
            ),
            vec![Event::WeatherChanged {
                kind: WeatherKind::Rain,
            }]
        );
        let towers = query::towers(&world).into_vec();
        assert_eq!(towers[0].effective.fire_rate, towers[0].baseline.fire_rate * 0.8);

        assert!(apply_one(
            &mut world,
            Command::SubmitWeather {
                outcome: WeatherFetchOutcome::Observed { code: 63 },
            },
        )
        .is_empty());

        assert_eq!(
            apply_one(
                &mut world,
                Command::SubmitWeather {
                    outcome: WeatherFetchOutcome::Unavailable,
                },
            ),
            vec![Event::WeatherChanged {
                kind: WeatherKind::Clear,
            }]
        );
        let towers = query::towers(&world).into_vec();
        assert_eq!(towers[0].effective, towers[0].baseline);
    }

    #[test]
    fn the_first_tick_requests_an_observation() {
        let mut world = straight_world();
        let events = apply_one(
            &mut world,
            Command::Tick {
                elapsed: Duration::from_millis(16),
            },
        );
        assert_eq!(events.first(), Some(&Event::WeatherFetchRequested));
    }

    #[test]
    fn snapshots_capture_the_opening_state() {
        let world = straight_world();
        let snapshot = query::snapshot(&world);
        assert_eq!(snapshot.gold, 100);
        assert_eq!(snapshot.lives, 20);
        assert_eq!(snapshot.phase, SimPhase::Running);
        assert_eq!(snapshot.score, 100 * 10 + 20 * 50);
        assert_eq!(snapshot.wave.total_waves, 5);
        assert_eq!(snapshot.weather, WeatherKind::Clear);
        assert!(snapshot.enemies.is_empty());
        assert!(snapshot.towers.is_empty());
    }
}
