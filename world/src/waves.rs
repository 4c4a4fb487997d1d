//! Wave scheduling: spawn queues, completion detection, and auto progression.

use std::collections::VecDeque;

use curve_defence_core::{CatalogError, EnemyKind, WaveDefinition, WaveStatus};

/// Where the director sits in the wave lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WavePhase {
    /// Between waves, waiting on a start request or the auto timer.
    Idle,
    /// Entries remain in the spawn queue.
    Spawning,
    /// Everything spawned, waiting for the live count to drain.
    Clearing,
    /// The final wave completed. Nothing left to schedule.
    Settled,
}

/// A queued spawn with its countdown in seconds.
#[derive(Clone, Copy, Debug)]
struct PendingSpawn {
    kind: EnemyKind,
    delay: f32,
}

/// Data announced when a wave launches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WaveLaunch {
    pub(crate) wave_number: u32,
    pub(crate) total_waves: u32,
    pub(crate) enemy_count: u32,
    pub(crate) boss_wave: bool,
}

/// Data announced when a wave clears.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WaveCompletion {
    pub(crate) wave_number: u32,
    pub(crate) gold_reward: u32,
    /// True when this was the last wave in the catalogue.
    pub(crate) settled: bool,
}

/// Everything one scheduler step produced.
#[derive(Clone, Debug, Default)]
pub(crate) struct WaveAdvance {
    /// Enemy kinds whose countdown elapsed this step, in queue order.
    pub(crate) due: Vec<EnemyKind>,
    /// Present when the in-flight wave finished clearing.
    pub(crate) completion: Option<WaveCompletion>,
    /// True when the auto timer elapsed and the next wave should launch.
    pub(crate) start_next: bool,
}

/// Owns the wave catalogue and drives spawn timing.
///
/// The director never touches enemies directly. It hands due spawn kinds to
/// the caller and is told about spawns and defeats through `note_spawned`
/// and `note_defeated`.
#[derive(Clone, Debug)]
pub(crate) struct WaveDirector {
    catalogue: Vec<WaveDefinition>,
    spacing: f32,
    auto_delay: f32,
    phase: WavePhase,
    queue: VecDeque<PendingSpawn>,
    live: u32,
    started: u32,
    completed: u32,
    auto_waves: bool,
    auto_timer: Option<f32>,
}

impl WaveDirector {
    pub(crate) fn new(catalogue: Vec<WaveDefinition>, spacing: f32, auto_delay: f32) -> Self {
        Self {
            catalogue,
            spacing,
            auto_delay,
            phase: WavePhase::Idle,
            queue: VecDeque::new(),
            live: 0,
            started: 0,
            completed: 0,
            auto_waves: false,
            auto_timer: None,
        }
    }

    /// Replaces the catalogue. Refused once the first wave has started.
    pub(crate) fn install(&mut self, waves: Vec<WaveDefinition>) -> Result<u32, CatalogError> {
        if waves.is_empty() {
            return Err(CatalogError::Empty);
        }
        if self.started > 0 {
            return Err(CatalogError::LockedIn);
        }
        self.catalogue = waves;
        Ok(self.catalogue.len() as u32)
    }

    /// Launches the next wave if the director is idle and waves remain.
    ///
    /// Spawn entries are flattened from the definition's groups in order,
    /// with each entry's countdown offset by one spacing interval from the
    /// previous.
    pub(crate) fn start_next(&mut self) -> Option<WaveLaunch> {
        if self.phase != WavePhase::Idle {
            return None;
        }
        let definition = self.catalogue.get(self.started as usize)?;
        let launch = WaveLaunch {
            wave_number: self.started + 1,
            total_waves: self.catalogue.len() as u32,
            enemy_count: definition.enemy_count(),
            boss_wave: definition.boss_wave(),
        };
        let groups: Vec<_> = definition.groups().to_vec();

        let mut slot = 0u32;
        for group in groups {
            for _ in 0..group.count() {
                self.queue.push_back(PendingSpawn {
                    kind: group.kind(),
                    delay: slot as f32 * self.spacing,
                });
                slot += 1;
            }
        }
        self.started += 1;
        self.auto_timer = None;
        self.phase = if self.queue.is_empty() {
            WavePhase::Clearing
        } else {
            WavePhase::Spawning
        };
        Some(launch)
    }

    /// Advances timers by `dt` and reports what fell due.
    pub(crate) fn advance(&mut self, dt: f32) -> WaveAdvance {
        let mut advance = WaveAdvance::default();
        match self.phase {
            WavePhase::Idle => {
                if let Some(timer) = self.auto_timer.as_mut() {
                    *timer -= dt;
                    if *timer <= 0.0 {
                        self.auto_timer = None;
                        advance.start_next = true;
                    }
                }
            }
            WavePhase::Spawning => {
                for entry in &mut self.queue {
                    entry.delay -= dt;
                }
                while matches!(self.queue.front(), Some(entry) if entry.delay <= 0.0) {
                    let Some(entry) = self.queue.pop_front() else {
                        break;
                    };
                    advance.due.push(entry.kind);
                }
                if self.queue.is_empty() {
                    self.phase = WavePhase::Clearing;
                }
            }
            WavePhase::Clearing => {
                if self.live == 0 {
                    advance.completion = self.complete_wave();
                }
            }
            WavePhase::Settled => {}
        }
        advance
    }

    fn complete_wave(&mut self) -> Option<WaveCompletion> {
        let index = self.started.checked_sub(1)? as usize;
        let definition = self.catalogue.get(index)?;
        // Waves are numbered by play order, not by the catalogue's id field,
        // so starts and completions always agree.
        let completion = WaveCompletion {
            wave_number: self.started,
            gold_reward: definition.gold_reward(),
            settled: self.started as usize >= self.catalogue.len(),
        };
        self.completed += 1;
        if completion.settled {
            self.phase = WavePhase::Settled;
        } else {
            self.phase = WavePhase::Idle;
            if self.auto_waves {
                self.auto_timer = Some(self.auto_delay);
            }
        }
        Some(completion)
    }

    /// Records that a due spawn actually entered the field.
    pub(crate) fn note_spawned(&mut self) {
        self.live += 1;
    }

    /// Records a defeat and reports the remaining enemy count.
    pub(crate) fn note_defeated(&mut self) -> u32 {
        self.live = self.live.saturating_sub(1);
        self.remaining()
    }

    fn remaining(&self) -> u32 {
        self.queue.len() as u32 + self.live
    }

    /// One-based number of the wave currently in flight or last started.
    pub(crate) fn current_wave(&self) -> u32 {
        self.started
    }

    pub(crate) fn completed_waves(&self) -> u32 {
        self.completed
    }

    /// Toggles auto progression. Enabling between waves arms the timer so
    /// the break still honours the configured delay.
    pub(crate) fn set_auto_waves(&mut self, enabled: bool) {
        self.auto_waves = enabled;
        if !enabled {
            self.auto_timer = None;
        } else if self.phase == WavePhase::Idle
            && self.completed > 0
            && (self.started as usize) < self.catalogue.len()
        {
            self.auto_timer = Some(self.auto_delay);
        }
    }

    pub(crate) fn status(&self) -> WaveStatus {
        WaveStatus {
            started_waves: self.started,
            total_waves: self.catalogue.len() as u32,
            remaining_enemies: self.remaining(),
            in_progress: matches!(self.phase, WavePhase::Spawning | WavePhase::Clearing),
            auto_waves: self.auto_waves,
        }
    }
}
