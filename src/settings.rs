use crate::domain::AppSettings;
use crate::persistence::{save_json, KeyValueStore, SETTINGS_KEY};
use tracing::{info, warn};

/// User preferences, saved on every change
pub struct SettingsStore {
    settings: AppSettings,
    storage: Box<dyn KeyValueStore>,
}

impl SettingsStore {
    /// Load settings, falling back to defaults when missing or unreadable
    pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
        let settings = match storage.load(SETTINGS_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!(error = %e, "failed to decode settings, using defaults");
                AppSettings::default()
            }),
            Ok(None) => AppSettings::default(),
            Err(e) => {
                warn!(error = %e, "failed to load settings, using defaults");
                AppSettings::default()
            }
        };

        Self { settings, storage }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn default_duration(&self) -> f64 {
        self.settings.default_duration
    }

    pub fn alarm_sound(&self) -> &str {
        &self.settings.alarm_sound
    }

    /// Ignored unless the duration is positive
    pub fn set_default_duration(&mut self, seconds: f64) {
        if seconds <= 0.0 {
            return;
        }
        self.settings.default_duration = seconds;
        self.save();
    }

    pub fn set_alarm_sound(&mut self, sound: &str) {
        self.settings.alarm_sound = sound.to_string();
        self.save();
    }

    /// Records the preference only; registering with the OS is left to the host
    pub fn set_launch_at_login(&mut self, enabled: bool) {
        self.settings.launch_at_login = enabled;
        info!(enabled, "launch at login preference changed");
        self.save();
    }

    pub fn set_show_floating_timer(&mut self, show: bool) {
        self.settings.show_floating_timer = show;
        self.save();
    }

    fn save(&self) {
        if let Err(e) = save_json(self.storage.as_ref(), SETTINGS_KEY, &self.settings) {
            warn!(error = %e, "failed to save settings");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn create_test_settings() -> (SettingsStore, Rc<MemoryStore>) {
        let storage = Rc::new(MemoryStore::new());
        (SettingsStore::load(Box::new(storage.clone())), storage)
    }

    fn stored(storage: &MemoryStore) -> AppSettings {
        serde_json::from_str(&storage.get(SETTINGS_KEY).unwrap()).unwrap()
    }

    #[test]
    fn test_load_defaults_when_empty() {
        let (settings, storage) = create_test_settings();
        assert_eq!(settings.settings(), &AppSettings::default());
        // Nothing is written until something changes
        assert!(storage.get(SETTINGS_KEY).is_none());
    }

    #[test]
    fn test_setters_persist() {
        let (mut settings, storage) = create_test_settings();

        settings.set_default_duration(1500.0);
        settings.set_alarm_sound("Submarine");
        settings.set_launch_at_login(true);
        settings.set_show_floating_timer(false);

        let expected = AppSettings {
            default_duration: 1500.0,
            alarm_sound: "Submarine".to_string(),
            launch_at_login: true,
            show_floating_timer: false,
        };
        assert_eq!(settings.settings(), &expected);
        assert_eq!(stored(&storage), expected);
    }

    #[test]
    fn test_non_positive_duration_ignored() {
        let (mut settings, _) = create_test_settings();
        settings.set_default_duration(0.0);
        settings.set_default_duration(-60.0);
        assert_eq!(settings.default_duration(), 600.0);
    }

    #[test]
    fn test_reload_and_corrupt_blob() {
        let storage = Rc::new(MemoryStore::new());
        {
            let mut settings = SettingsStore::load(Box::new(storage.clone()));
            settings.set_alarm_sound("Ping");
        }
        let reloaded = SettingsStore::load(Box::new(storage.clone()));
        assert_eq!(reloaded.alarm_sound(), "Ping");

        storage.insert(SETTINGS_KEY, "{broken");
        let fallback = SettingsStore::load(Box::new(storage));
        assert_eq!(fallback.settings(), &AppSettings::default());
    }
}
