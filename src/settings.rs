/// Persisted settings for chrome.storage.sync / chrome.storage.local
use serde::{Deserialize, Serialize};

use crate::filename::{CivilDate, DateFormat};

/// chrome.storage.sync key for [`SyncSettings`].
pub const SETTINGS_KEY: &str = "pdf_renamer_settings";
/// chrome.storage.local key for [`LocalState`].
pub const STATE_KEY: &str = "pdf_renamer_state";
/// chrome.storage.local key for a staged [`PopupOverride`].
pub const OVERRIDE_KEY: &str = "pdf_renamer_override";

/// User settings, synced across browsers. Low write volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSettings {
    pub enabled: bool,
    pub date_format: DateFormat,
    /// ISO-8601 date string, or None when filenames use "today".
    pub locked_date: Option<String>,
}

impl SyncSettings {
    /// The pinned date, if one is stored and still parses as a real date.
    /// A corrupt stored value degrades to "no pinned date".
    pub fn pinned_date(&self) -> Option<CivilDate> {
        let raw = self.locked_date.as_deref()?;
        match CivilDate::parse_iso(raw) {
            Ok(date) => Some(date),
            Err(err) => {
                log::warn!("ignoring stored locked date {raw:?}: {err}");
                None
            }
        }
    }

    pub fn set_pinned_date(&mut self, date: Option<CivilDate>) {
        self.locked_date = date.map(|d| d.to_iso());
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            enabled: true,
            date_format: DateFormat::default(),
            locked_date: None,
        }
    }
}

/// Ephemeral per-browser state. Higher write volume, never synced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalState {
    /// Sanitized clipboard capture, inserted between date and site label.
    pub clipboard_text: String,
    /// Site label of the tab the popup last looked at, for the preview.
    pub current_domain: String,
    /// Epoch millis at which the feature auto-disables, when armed.
    pub disable_at_ms: Option<f64>,
}

impl LocalState {
    /// The buffer text as the filename builder wants it: None when blank.
    pub fn buffer(&self) -> Option<&str> {
        let text = self.clipboard_text.trim();
        if text.is_empty() { None } else { Some(text) }
    }
}

/// A complete filename staged by the popup's "download current tab" action.
/// Consumed verbatim by the next matching download event, then cleared.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PopupOverride {
    pub filename: String,
    pub date: String,
    pub buffer: String,
}

impl PopupOverride {
    pub fn is_usable(&self) -> bool {
        !self.filename.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_settings_defaults() {
        let settings = SyncSettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.date_format, DateFormat::YyMmDd);
        assert_eq!(settings.locked_date, None);
        assert_eq!(settings.pinned_date(), None);
    }

    #[test]
    fn test_sync_settings_wire_format() {
        let mut settings = SyncSettings::default();
        settings.date_format = DateFormat::YyyyMmDd;
        settings.set_pinned_date(Some(CivilDate::new(2024, 3, 5).unwrap()));

        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"dateFormat\":\"YYYYMMDD\""));
        assert!(json.contains("\"lockedDate\":\"2024-03-05\""));

        let back: SyncSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_sync_settings_missing_fields_use_defaults() {
        let settings: SyncSettings = serde_json::from_str("{\"enabled\":false}").unwrap();
        assert!(!settings.enabled);
        assert_eq!(settings.date_format, DateFormat::YyMmDd);
        assert_eq!(settings.locked_date, None);
    }

    #[test]
    fn test_corrupt_locked_date_degrades_to_none() {
        let mut settings = SyncSettings::default();
        settings.locked_date = Some("2024-02-30".to_string());
        assert_eq!(settings.pinned_date(), None);

        settings.locked_date = Some("soon".to_string());
        assert_eq!(settings.pinned_date(), None);
    }

    #[test]
    fn test_local_state_buffer_blank_is_none() {
        let mut state = LocalState::default();
        assert_eq!(state.buffer(), None);
        state.clipboard_text = "   ".to_string();
        assert_eq!(state.buffer(), None);
        state.clipboard_text = " Q1 Report ".to_string();
        assert_eq!(state.buffer(), Some("Q1 Report"));
    }

    #[test]
    fn test_local_state_wire_format() {
        let state = LocalState {
            clipboard_text: "Q1".to_string(),
            current_domain: "FID".to_string(),
            disable_at_ms: Some(1_700_000_000_000.0),
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"clipboardText\":\"Q1\""));
        assert!(json.contains("\"currentDomain\":\"FID\""));
        assert!(json.contains("\"disableAtMs\":1700000000000.0"));
    }

    #[test]
    fn test_popup_override_usable() {
        assert!(!PopupOverride::default().is_usable());
        let staged = PopupOverride {
            filename: "240305_Q1_Report_FID".to_string(),
            date: "240305".to_string(),
            buffer: "Q1 Report".to_string(),
        };
        assert!(staged.is_usable());
    }
}
