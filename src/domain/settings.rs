use super::task::DEFAULT_DURATION_SECS;
use serde::{Deserialize, Serialize};

/// Alarm sound used when nothing else is configured
pub const DEFAULT_ALARM_SOUND: &str = "Glass";

/// Duration presets offered to the user (label, seconds)
pub const AVAILABLE_DURATIONS: &[(&str, f64)] = &[
    ("5 minutes", 300.0),
    ("10 minutes", 600.0),
    ("15 minutes", 900.0),
    ("20 minutes", 1200.0),
    ("25 minutes", 1500.0),
    ("30 minutes", 1800.0),
];

/// Alarm sounds that can be selected
pub const AVAILABLE_SOUNDS: &[&str] = &[
    "Glass",
    "Basso",
    "Blow",
    "Bottle",
    "Frog",
    "Funk",
    "Hero",
    "Morse",
    "Ping",
    "Pop",
    "Purr",
    "Sosumi",
    "Submarine",
    "Tink",
];

/// User preferences stored in settings.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    /// Duration in seconds for newly added tasks
    pub default_duration: f64,
    /// Sound identifier played when a timer completes
    pub alarm_sound: String,
    pub launch_at_login: bool,
    pub show_floating_timer: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_duration: DEFAULT_DURATION_SECS,
            alarm_sound: DEFAULT_ALARM_SOUND.to_string(),
            launch_at_login: false,
            show_floating_timer: true,
        }
    }
}

impl AppSettings {
    /// Check if a sound name is in the catalogue
    pub fn is_known_sound(name: &str) -> bool {
        AVAILABLE_SOUNDS.contains(&name)
    }

    /// Label for a duration preset, if the value matches one
    pub fn duration_label(seconds: f64) -> Option<&'static str> {
        AVAILABLE_DURATIONS
            .iter()
            .find(|(_, value)| (*value - seconds).abs() < f64::EPSILON)
            .map(|(label, _)| *label)
    }
}
