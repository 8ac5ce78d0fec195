/// PDF Renamer - Chrome Extension for PDF download naming
/// Built with Rust + WASM + Yew

pub mod domain_map;
pub mod filename;
pub mod rename;
pub mod settings;
pub mod timer;
pub mod ui;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use domain_map::DomainMap;
use filename::CivilDate;
use rename::{DownloadItem, Suggestion};
use settings::{LocalState, PopupOverride, SyncSettings};

// The loaded mapping table. Swapped wholesale on (re)load; resolutions that
// already borrowed the old map finish against it.
thread_local! {
    static DOMAIN_MAP: RefCell<DomainMap> = RefCell::new(DomainMap::new());
}

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Parse the `domain_map.csv` text and replace the active map with the
/// result. The background worker calls this at startup and on reload; an
/// unreadable resource comes through as an empty string and degrades to the
/// default-derivation tier. Returns the number of entries loaded.
#[wasm_bindgen]
pub fn load_domain_map(csv_text: &str) -> usize {
    let map = DomainMap::parse(csv_text);
    if map.is_empty() {
        log::warn!("domain map has no entries; site labels fall back to hostname derivation");
    } else {
        log::info!("domain map loaded: {} entries", map.len());
    }
    let count = map.len();
    DOMAIN_MAP.with(|cell| cell.replace(map));
    count
}

// Re-export the resolver for JavaScript access
#[wasm_bindgen]
pub fn resolve_site_label(url: &str) -> String {
    DOMAIN_MAP.with(|cell| domain_map::resolve(&cell.borrow(), url))
}

/// Filename decision for one download event, called by the background
/// worker with `{filename, url, mimeType}` plus the stored settings, local
/// state, and any staged popup override.
///
/// Always produces exactly one suggestion object. Malformed input from the
/// bridge degrades to passing the original filename through; a download must
/// never fail because of a renaming bug.
#[wasm_bindgen]
pub fn suggest_download_filename(
    item: JsValue,
    settings: JsValue,
    state: JsValue,
    staged: JsValue,
) -> JsValue {
    let item: DownloadItem = match serde_wasm_bindgen::from_value(item) {
        Ok(item) => item,
        Err(err) => {
            log::error!("unusable download item from bridge: {err}");
            return suggestion_to_js(&Suggestion::keep(""));
        }
    };

    let settings: SyncSettings = serde_wasm_bindgen::from_value(settings).unwrap_or_default();
    let state: LocalState = serde_wasm_bindgen::from_value(state).unwrap_or_default();
    let staged: Option<PopupOverride> = serde_wasm_bindgen::from_value(staged).unwrap_or(None);

    // one clock read per download event
    let now = js_sys::Date::new_0();
    let suggestion = match civil_date_of(&now) {
        Some(today) => DOMAIN_MAP.with(|cell| {
            rename::suggest(
                &item,
                &settings,
                &state,
                staged.as_ref(),
                &cell.borrow(),
                today,
                now.get_time(),
            )
        }),
        None => Suggestion::keep(&item.filename),
    };
    suggestion_to_js(&suggestion)
}

fn suggestion_to_js(suggestion: &Suggestion) -> JsValue {
    // a null return tells the background worker to keep the original name
    serde_wasm_bindgen::to_value(suggestion).unwrap_or(JsValue::NULL)
}

/// Preview for the popup, resolved against the active map.
pub(crate) fn preview_with_map(
    url: Option<&str>,
    filename: &str,
    settings: &SyncSettings,
    state: &LocalState,
    today: CivilDate,
    now_ms: f64,
) -> Option<String> {
    DOMAIN_MAP.with(|cell| {
        rename::preview(url, filename, settings, state, &cell.borrow(), today, now_ms)
    })
}

/// Today's date off the browser clock. None only if the clock reports
/// something no calendar accepts.
pub(crate) fn js_today() -> Option<CivilDate> {
    civil_date_of(&js_sys::Date::new_0())
}

fn civil_date_of(date: &js_sys::Date) -> Option<CivilDate> {
    CivilDate::new(
        date.get_full_year() as u16,
        date.get_month() as u8 + 1,
        date.get_date() as u8,
    )
    .ok()
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
