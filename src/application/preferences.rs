// User alert preferences on top of the settings provider
use crate::application::ports::SettingsProvider;
use crate::domain::alert::AlertPreferences;
use crate::error::SettingsError;

pub const NOTIFICATIONS_ENABLED: &str = "notifications_enabled";
pub const FATIGUE_THRESHOLD: &str = "fatigue_threshold";
pub const EARLY_NOTIFICATIONS_ENABLED: &str = "early_notifications_enabled";
pub const EARLY_NOTIFICATION_TIME: &str = "early_notification_time";
pub const DATA_COLLECTION_CONSENT: &str = "data_collection_consent";
pub const SETTINGS_INITIALIZED: &str = "settings_initialized";

const DEFAULT_DATA_COLLECTION_CONSENT: bool = true;

/// Seed default preferences exactly once per settings store.
/// Returns whether defaults were written.
pub fn ensure_defaults(settings: &dyn SettingsProvider) -> Result<bool, SettingsError> {
    if settings.get_bool(SETTINGS_INITIALIZED).unwrap_or(false) {
        return Ok(false);
    }

    write_preferences(settings, &AlertPreferences::default())?;
    settings.set_bool(DATA_COLLECTION_CONSENT, DEFAULT_DATA_COLLECTION_CONSENT)?;
    settings.set_bool(SETTINGS_INITIALIZED, true)?;
    tracing::info!("Seeded default alert preferences");
    Ok(true)
}

/// Read the current preferences; absent keys fall back to the defaults.
pub fn load_preferences(settings: &dyn SettingsProvider) -> AlertPreferences {
    let defaults = AlertPreferences::default();
    AlertPreferences {
        notifications_enabled: settings
            .get_bool(NOTIFICATIONS_ENABLED)
            .unwrap_or(defaults.notifications_enabled),
        threshold: settings.get_f64(FATIGUE_THRESHOLD).unwrap_or(defaults.threshold),
        early_warning_enabled: settings
            .get_bool(EARLY_NOTIFICATIONS_ENABLED)
            .unwrap_or(defaults.early_warning_enabled),
        early_warning_lead_minutes: settings
            .get_i64(EARLY_NOTIFICATION_TIME)
            .unwrap_or(defaults.early_warning_lead_minutes),
    }
}

/// Whether the user allows anonymous usage data collection.
pub fn data_collection_consent(settings: &dyn SettingsProvider) -> bool {
    settings
        .get_bool(DATA_COLLECTION_CONSENT)
        .unwrap_or(DEFAULT_DATA_COLLECTION_CONSENT)
}

pub fn set_data_collection_consent(
    settings: &dyn SettingsProvider,
    consent: bool,
) -> Result<(), SettingsError> {
    settings.set_bool(DATA_COLLECTION_CONSENT, consent)
}

/// Explicit user save. Rejects values the settings screen cannot produce.
pub fn save_preferences(
    settings: &dyn SettingsProvider,
    prefs: &AlertPreferences,
) -> Result<(), SettingsError> {
    prefs.validate()?;
    write_preferences(settings, prefs)?;
    tracing::info!("Settings saved successfully");
    Ok(())
}

pub fn reset_to_defaults(settings: &dyn SettingsProvider) -> Result<AlertPreferences, SettingsError> {
    let defaults = AlertPreferences::default();
    write_preferences(settings, &defaults)?;
    settings.set_bool(DATA_COLLECTION_CONSENT, DEFAULT_DATA_COLLECTION_CONSENT)?;
    Ok(defaults)
}

fn write_preferences(
    settings: &dyn SettingsProvider,
    prefs: &AlertPreferences,
) -> Result<(), SettingsError> {
    settings.set_bool(NOTIFICATIONS_ENABLED, prefs.notifications_enabled)?;
    settings.set_f64(FATIGUE_THRESHOLD, prefs.threshold)?;
    settings.set_bool(EARLY_NOTIFICATIONS_ENABLED, prefs.early_warning_enabled)?;
    settings.set_i64(EARLY_NOTIFICATION_TIME, prefs.early_warning_lead_minutes)?;
    Ok(())
}
