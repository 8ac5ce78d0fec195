/// Download rename decisions: PDF gating, override path, preview
use serde::{Deserialize, Serialize};

use crate::domain_map::{self, DomainMap};
use crate::filename::{CivilDate, build_basename};
use crate::settings::{LocalState, PopupOverride, SyncSettings};
use crate::timer;

/// What the download-interception hook hands us.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DownloadItem {
    pub filename: String,
    pub url: Option<String>,
    pub mime_type: Option<String>,
}

/// The single filename suggestion produced for a download event: either the
/// original name passed through, or a computed name with uniquify conflict
/// handling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_action: Option<&'static str>,
}

impl Suggestion {
    pub fn keep(filename: &str) -> Suggestion {
        Suggestion {
            filename: filename.to_string(),
            conflict_action: None,
        }
    }

    pub fn rename(filename: String) -> Suggestion {
        Suggestion {
            filename,
            conflict_action: Some("uniquify"),
        }
    }

    pub fn is_rename(&self) -> bool {
        self.conflict_action.is_some()
    }
}

/// Only PDFs are renamed: case-insensitive extension, or the MIME type when
/// the hook supplies one.
pub fn is_pdf(item: &DownloadItem) -> bool {
    if item.filename.to_lowercase().ends_with(".pdf") {
        return true;
    }
    matches!(item.mime_type.as_deref(), Some(mime) if mime.eq_ignore_ascii_case("application/pdf"))
}

fn effectively_enabled(settings: &SyncSettings, state: &LocalState, now_ms: f64) -> bool {
    settings.enabled && !timer::is_expired(state.disable_at_ms, now_ms)
}

/// A download with no URL at all gets no site segment; a URL that is present
/// but unparsable resolves to the UnknownSite sentinel inside `resolve`.
fn label_for(map: &DomainMap, url: Option<&str>) -> String {
    match url {
        Some(url) => domain_map::resolve(map, url),
        None => String::new(),
    }
}

/// Decide the filename for one download event.
///
/// Exactly one suggestion comes back for every call: disabled feature,
/// expired timer, and non-PDF items all pass the original name through. A
/// staged popup override is consumed verbatim; otherwise the name is built
/// from date prefix, buffer (or original stem), and resolved site label.
pub fn suggest(
    item: &DownloadItem,
    settings: &SyncSettings,
    state: &LocalState,
    staged: Option<&PopupOverride>,
    map: &DomainMap,
    today: CivilDate,
    now_ms: f64,
) -> Suggestion {
    if !effectively_enabled(settings, state, now_ms) || !is_pdf(item) {
        return Suggestion::keep(&item.filename);
    }

    if let Some(staged) = staged {
        if staged.is_usable() {
            return Suggestion::rename(format!("{}.pdf", staged.filename.trim()));
        }
    }

    let label = label_for(map, item.url.as_deref());
    let date = settings.pinned_date().unwrap_or(today);
    let base = build_basename(
        date,
        settings.date_format,
        state.buffer(),
        &item.filename,
        &label,
    );
    Suggestion::rename(format!("{base}.pdf"))
}

/// Preview string for the popup: the full suggested filename, or None when
/// the feature is off (the popup shows a neutral placeholder for None).
pub fn preview(
    url: Option<&str>,
    filename: &str,
    settings: &SyncSettings,
    state: &LocalState,
    map: &DomainMap,
    today: CivilDate,
    now_ms: f64,
) -> Option<String> {
    if !effectively_enabled(settings, state, now_ms) {
        return None;
    }
    let label = label_for(map, url);
    let date = settings.pinned_date().unwrap_or(today);
    let base = build_basename(date, settings.date_format, state.buffer(), filename, &label);
    Some(format!("{base}.pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filename::DateFormat;

    fn fixture() -> (DomainMap, SyncSettings, LocalState, CivilDate) {
        let map = DomainMap::parse("fidelity.com,FID\n");
        let settings = SyncSettings::default();
        let state = LocalState::default();
        let today = CivilDate::new(2024, 3, 5).unwrap();
        (map, settings, state, today)
    }

    fn pdf_item(url: Option<&str>, filename: &str) -> DownloadItem {
        DownloadItem {
            filename: filename.to_string(),
            url: url.map(|u| u.to_string()),
            mime_type: None,
        }
    }

    #[test]
    fn test_is_pdf_by_extension_or_mime() {
        assert!(is_pdf(&pdf_item(None, "statement.pdf")));
        assert!(is_pdf(&pdf_item(None, "STATEMENT.PDF")));
        assert!(!is_pdf(&pdf_item(None, "statement.docx")));

        let by_mime = DownloadItem {
            filename: "download".to_string(),
            url: None,
            mime_type: Some("application/pdf".to_string()),
        };
        assert!(is_pdf(&by_mime));
    }

    #[test]
    fn test_suggest_with_buffer() {
        let (map, settings, mut state, today) = fixture();
        state.clipboard_text = "Q1 Report".to_string();

        let item = pdf_item(Some("https://www.fidelity.com/x.pdf"), "x.pdf");
        let got = suggest(&item, &settings, &state, None, &map, today, 0.0);
        assert_eq!(got, Suggestion::rename("240305_Q1_Report_FID.pdf".to_string()));
    }

    #[test]
    fn test_suggest_falls_back_to_original_stem() {
        let (map, settings, state, today) = fixture();
        let item = pdf_item(Some("https://www.fidelity.com/x.pdf"), "statement march.pdf");
        let got = suggest(&item, &settings, &state, None, &map, today, 0.0);
        assert_eq!(got.filename, "240305_statement_march_FID.pdf");
    }

    #[test]
    fn test_suggest_disabled_passes_through() {
        let (map, mut settings, state, today) = fixture();
        settings.enabled = false;
        let item = pdf_item(Some("https://www.fidelity.com/x.pdf"), "x.pdf");
        let got = suggest(&item, &settings, &state, None, &map, today, 0.0);
        assert_eq!(got, Suggestion::keep("x.pdf"));
        assert!(!got.is_rename());
    }

    #[test]
    fn test_suggest_expired_timer_passes_through() {
        let (map, settings, mut state, today) = fixture();
        state.disable_at_ms = Some(1_000.0);
        let item = pdf_item(Some("https://www.fidelity.com/x.pdf"), "x.pdf");
        let got = suggest(&item, &settings, &state, None, &map, today, 2_000.0);
        assert_eq!(got, Suggestion::keep("x.pdf"));

        let still_running = suggest(&item, &settings, &state, None, &map, today, 500.0);
        assert!(still_running.is_rename());
    }

    #[test]
    fn test_suggest_non_pdf_passes_through() {
        let (map, settings, state, today) = fixture();
        let item = pdf_item(Some("https://www.fidelity.com/x.zip"), "x.zip");
        let got = suggest(&item, &settings, &state, None, &map, today, 0.0);
        assert_eq!(got, Suggestion::keep("x.zip"));
    }

    #[test]
    fn test_suggest_consumes_staged_override() {
        let (map, settings, state, today) = fixture();
        let staged = PopupOverride {
            filename: "240305_Q1_Report_FID".to_string(),
            date: "240305".to_string(),
            buffer: "Q1 Report".to_string(),
        };
        let item = pdf_item(Some("https://www.fidelity.com/x.pdf"), "x.pdf");
        let got = suggest(&item, &settings, &state, Some(&staged), &map, today, 0.0);
        assert_eq!(got, Suggestion::rename("240305_Q1_Report_FID.pdf".to_string()));
    }

    #[test]
    fn test_suggest_blank_override_is_ignored() {
        let (map, settings, state, today) = fixture();
        let staged = PopupOverride::default();
        let item = pdf_item(Some("https://www.fidelity.com/x.pdf"), "doc.pdf");
        let got = suggest(&item, &settings, &state, Some(&staged), &map, today, 0.0);
        assert_eq!(got.filename, "240305_doc_FID.pdf");
    }

    #[test]
    fn test_suggest_without_url_omits_site_segment() {
        let (map, settings, state, today) = fixture();
        let item = pdf_item(None, "doc.pdf");
        let got = suggest(&item, &settings, &state, None, &map, today, 0.0);
        assert_eq!(got.filename, "240305_doc.pdf");
    }

    #[test]
    fn test_suggest_malformed_url_uses_unknown_site() {
        let (map, settings, state, today) = fixture();
        let item = pdf_item(Some("https://"), "doc.pdf");
        let got = suggest(&item, &settings, &state, None, &map, today, 0.0);
        assert_eq!(got.filename, "240305_doc_UnknownSite.pdf");
    }

    #[test]
    fn test_suggest_pinned_date_overrides_today() {
        let (map, mut settings, state, today) = fixture();
        settings.locked_date = Some("2023-12-31".to_string());
        settings.date_format = DateFormat::YyyyMmDd;
        let item = pdf_item(Some("https://www.fidelity.com/x.pdf"), "doc.pdf");
        let got = suggest(&item, &settings, &state, None, &map, today, 0.0);
        assert_eq!(got.filename, "20231231_doc_FID.pdf");
    }

    #[test]
    fn test_preview_matches_suggest_shape() {
        let (map, settings, mut state, today) = fixture();
        state.clipboard_text = "Q1 Report".to_string();
        let got = preview(
            Some("https://www.fidelity.com/page"),
            "ignored.pdf",
            &settings,
            &state,
            &map,
            today,
            0.0,
        );
        assert_eq!(got.as_deref(), Some("240305_Q1_Report_FID.pdf"));
    }

    #[test]
    fn test_preview_none_when_disabled_or_expired() {
        let (map, mut settings, mut state, today) = fixture();
        settings.enabled = false;
        assert_eq!(
            preview(None, "doc.pdf", &settings, &state, &map, today, 0.0),
            None
        );

        settings.enabled = true;
        state.disable_at_ms = Some(1.0);
        assert_eq!(
            preview(None, "doc.pdf", &settings, &state, &map, today, 2.0),
            None
        );
    }

    #[test]
    fn test_suggestion_serialization() {
        let rename = Suggestion::rename("240305_doc_FID.pdf".to_string());
        let json = serde_json::to_string(&rename).unwrap();
        assert_eq!(
            json,
            "{\"filename\":\"240305_doc_FID.pdf\",\"conflictAction\":\"uniquify\"}"
        );

        let keep = Suggestion::keep("doc.pdf");
        assert_eq!(serde_json::to_string(&keep).unwrap(), "{\"filename\":\"doc.pdf\"}");
    }
}
