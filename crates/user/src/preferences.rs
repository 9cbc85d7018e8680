use eventhub_shared::{Storage, keys};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[derive(
    Serialize, Deserialize, EnumString, Display, AsRefStr, Clone, Copy, Debug, Default, PartialEq, Eq,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Store-wide UI settings, independent of any account's preferences.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub theme: Theme,
    pub language: String,
    pub notifications: bool,
    pub email_notifications: bool,
    pub event_reminders: bool,
    pub newsletter: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            language: "es".to_owned(),
            notifications: true,
            email_notifications: true,
            event_reminders: true,
            newsletter: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreferencesStore {
    storage: Storage,
}

impl PreferencesStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn get(&self) -> Preferences {
        self.storage.get(keys::PREFERENCES, Preferences::default())
    }

    pub fn set(&self, preferences: &Preferences) -> bool {
        self.storage.set(keys::PREFERENCES, preferences)
    }

    /// Read-modify-write; returns the saved value, or `None` when the write fails.
    pub fn update(&self, change: impl FnOnce(&mut Preferences)) -> Option<Preferences> {
        let mut preferences = self.get();
        change(&mut preferences);

        self.set(&preferences).then_some(preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_absent_or_partial() {
        let storage = Storage::memory();
        let store = PreferencesStore::new(storage.clone());

        assert_eq!(store.get(), Preferences::default());
        assert_eq!(store.get().language, "es");

        storage.set_raw(keys::PREFERENCES, r#"{"theme":"dark"}"#);
        let preferences = store.get();
        assert_eq!(preferences.theme, Theme::Dark);
        assert!(preferences.newsletter);
    }

    #[test]
    fn update_persists() {
        let store = PreferencesStore::new(Storage::memory());

        let saved = store
            .update(|p| {
                p.language = "en".to_owned();
                p.newsletter = false;
            })
            .unwrap();

        assert_eq!(store.get(), saved);
        assert!(!store.get().newsletter);
        assert_eq!(store.get().theme, Theme::Light);
    }
}
