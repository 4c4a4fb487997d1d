#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weather bucket tables mapping observation codes onto tower stat modifiers.

use curve_defence_core::{
    ModifierScope, StatKind, TowerCategory, WeatherKind, WeatherModifier,
};

/// Sorts a numeric WMO observation code into one of the labeled buckets.
///
/// Codes outside every bucket classify as [`WeatherKind::Clear`], which is
/// also the fallback used when no observation is available at all.
#[must_use]
pub const fn classify(code: u16) -> WeatherKind {
    match code {
        0 | 1 => WeatherKind::Clear,
        2 | 3 => WeatherKind::Cloudy,
        45 | 48 => WeatherKind::Fog,
        51..=57 | 61..=67 | 80..=82 => WeatherKind::Rain,
        71..=77 | 85 | 86 => WeatherKind::Snow,
        95 | 96 | 99 => WeatherKind::Thunderstorm,
        _ => WeatherKind::Clear,
    }
}

/// Returns the stat modifiers a weather bucket imposes on towers.
///
/// Calm skies impose nothing. Every listed multiplier dampens the named stat;
/// weather never buffs a tower.
#[must_use]
pub const fn modifier_set(kind: WeatherKind) -> &'static [WeatherModifier] {
    match kind {
        WeatherKind::Clear | WeatherKind::Cloudy => &[],
        WeatherKind::Fog => &[
            WeatherModifier {
                scope: ModifierScope::Category(TowerCategory::Precision),
                stat: StatKind::Range,
                multiplier: 0.6,
            },
            WeatherModifier {
                scope: ModifierScope::Category(TowerCategory::Ballistic),
                stat: StatKind::Range,
                multiplier: 0.85,
            },
        ],
        WeatherKind::Rain => &[WeatherModifier {
            scope: ModifierScope::AllTowers,
            stat: StatKind::FireRate,
            multiplier: 0.8,
        }],
        WeatherKind::Snow => &[
            WeatherModifier {
                scope: ModifierScope::AllTowers,
                stat: StatKind::FireRate,
                multiplier: 0.7,
            },
            WeatherModifier {
                scope: ModifierScope::AllTowers,
                stat: StatKind::Range,
                multiplier: 0.9,
            },
        ],
        WeatherKind::Thunderstorm => &[
            WeatherModifier {
                scope: ModifierScope::AllTowers,
                stat: StatKind::FireRate,
                multiplier: 0.6,
            },
            WeatherModifier {
                scope: ModifierScope::Category(TowerCategory::Precision),
                stat: StatKind::Range,
                multiplier: 0.75,
            },
        ],
    }
}
