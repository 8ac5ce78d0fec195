/// Popup UI for PDF Renamer extension

use yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use patternfly_yew::prelude::*;

use crate::filename::{CivilDate, DateError, DateFormat, format_date, build_basename, sanitize};
use crate::settings::{LocalState, PopupOverride, SyncSettings};
use crate::timer::{self, Countdown};
use crate::ui::components::{CountdownBadge, InlineHint, InlineTone, PreviewBox};

// Import JS bridge functions
#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSyncSettings() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSyncSettings(value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getLocalState() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setLocalState(value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn setPopupOverride(value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn readClipboardText() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getActiveTabUrl() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn fetchDomainMapCsv() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn startDownload(url: &str, save_as: bool) -> Result<(), JsValue>;
}

#[derive(Clone, PartialEq)]
enum AppState {
    Loading(String),
    Idle,
    Error(String),
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Loading("Loading settings...".to_string()));
    let settings = use_state(SyncSettings::default);
    let local = use_state(LocalState::default);
    let tab_url = use_state(|| None::<String>);
    let lock_input = use_state(String::new);
    let lock_error = use_state(String::new);
    let clip_status = use_state(|| (String::new(), InlineTone::Muted));
    let saved_flash = use_state(|| false);
    let now_ms = use_state(js_sys::Date::now);

    // Load the domain map, stored settings, and active tab on mount
    {
        let state = state.clone();
        let settings = settings.clone();
        let local = local.clone();
        let tab_url = tab_url.clone();
        let lock_input = lock_input.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match fetch_domain_map_csv().await {
                    Ok(csv) => {
                        crate::load_domain_map(&csv);
                    }
                    Err(e) => {
                        log::warn!("domain map unavailable: {}", e);
                        crate::load_domain_map("");
                    }
                }

                match load_settings().await {
                    Ok(loaded) => {
                        lock_input.set(loaded.locked_date.clone().unwrap_or_default());
                        settings.set(loaded);
                    }
                    Err(e) => {
                        state.set(AppState::Error(format!("Failed to load settings: {}", e)));
                        return;
                    }
                }

                match load_local_state().await {
                    Ok(loaded) => local.set(loaded),
                    Err(e) => log::warn!("local state unavailable: {}", e),
                }

                match active_tab_url().await {
                    Ok(url) => tab_url.set(url),
                    Err(e) => log::warn!("active tab unavailable: {}", e),
                }

                state.set(AppState::Idle);
            });
            || ()
        });
    }

    // One-second tick for the countdown badge
    {
        let now_ms = now_ms.clone();
        use_effect_with((), move |_| {
            let callback = Closure::wrap(Box::new(move || {
                now_ms.set(js_sys::Date::now());
            }) as Box<dyn Fn()>);
            let handle = web_sys::window().and_then(|w| {
                w.set_interval_with_callback_and_timeout_and_arguments_0(
                    callback.as_ref().unchecked_ref(),
                    1_000,
                )
                .ok()
            });
            move || {
                if let (Some(w), Some(id)) = (web_sys::window(), handle) {
                    w.clear_interval_with_handle(id);
                }
                drop(callback);
            }
        });
    }

    // Timer expiry switches the feature off and persists that
    {
        let settings = settings.clone();
        let local = local.clone();
        let expired = settings.enabled && timer::is_expired(local.disable_at_ms, *now_ms);
        use_effect_with(expired, move |&expired| {
            if expired {
                let mut s = (*settings).clone();
                s.enabled = false;
                let mut l = (*local).clone();
                l.disable_at_ms = None;
                settings.set(s.clone());
                local.set(l.clone());
                spawn_local(async move {
                    if let Err(e) = save_settings(&s).await {
                        log::warn!("could not persist auto-disable: {}", e);
                    }
                    let _ = save_local_state(&l).await;
                });
            }
            || ()
        });
    }

    // Enable toggle: arms or clears the one-hour timer. Enabling also
    // unpins the date, so a fresh session starts at "today".
    let on_toggle = {
        let settings = settings.clone();
        let local = local.clone();
        let lock_input = lock_input.clone();
        let lock_error = lock_error.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut s = (*settings).clone();
            let mut l = (*local).clone();
            s.enabled = input.checked();
            if s.enabled {
                s.set_pinned_date(None);
                l.disable_at_ms = Some(timer::arm(js_sys::Date::now()));
                lock_input.set(String::new());
                lock_error.set(String::new());
            } else {
                l.disable_at_ms = None;
            }
            settings.set(s.clone());
            local.set(l.clone());
            spawn_local(async move {
                if let Err(e) = save_settings(&s).await {
                    log::warn!("saving settings failed: {}", e);
                }
                if let Err(e) = save_local_state(&l).await {
                    log::warn!("saving local state failed: {}", e);
                }
            });
        })
    };

    let on_format_change = {
        let settings = settings.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let Some(format) = DateFormat::parse(&select.value()) else {
                return;
            };
            let mut s = (*settings).clone();
            s.date_format = format;
            settings.set(s.clone());
            spawn_local(async move {
                if let Err(e) = save_settings(&s).await {
                    log::warn!("saving settings failed: {}", e);
                }
            });
        })
    };

    let on_lock_input = {
        let lock_input = lock_input.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            lock_input.set(input.value());
        })
    };

    // Lock the date used for filenames. Bad input keeps the prior state.
    let on_lock = {
        let settings = settings.clone();
        let lock_input = lock_input.clone();
        let lock_error = lock_error.clone();
        Callback::from(move |_| {
            match CivilDate::parse_iso(&lock_input) {
                Ok(date) => {
                    lock_error.set(String::new());
                    let mut s = (*settings).clone();
                    s.set_pinned_date(Some(date));
                    settings.set(s.clone());
                    spawn_local(async move {
                        if let Err(e) = save_settings(&s).await {
                            log::warn!("saving settings failed: {}", e);
                        }
                    });
                }
                Err(DateError::Malformed) => {
                    lock_error.set("Enter a date as YYYY-MM-DD".to_string());
                }
                Err(DateError::Invalid) => {
                    lock_error.set("That calendar date does not exist".to_string());
                }
            }
        })
    };

    let on_unlock = {
        let settings = settings.clone();
        let lock_input = lock_input.clone();
        let lock_error = lock_error.clone();
        Callback::from(move |_| {
            let mut s = (*settings).clone();
            s.set_pinned_date(None);
            settings.set(s.clone());
            lock_input.set(String::new());
            lock_error.set(String::new());
            spawn_local(async move {
                if let Err(e) = save_settings(&s).await {
                    log::warn!("saving settings failed: {}", e);
                }
            });
        })
    };

    // Explicit clipboard capture: this is the one place a clipboard failure
    // is surfaced to the user.
    let on_capture = {
        let local = local.clone();
        let clip_status = clip_status.clone();
        Callback::from(move |_| {
            let local = local.clone();
            let clip_status = clip_status.clone();
            spawn_local(async move {
                match read_clipboard().await {
                    Ok(text) => {
                        let mut l = (*local).clone();
                        l.clipboard_text = sanitize(&text);
                        local.set(l.clone());
                        clip_status.set(("Captured!".to_string(), InlineTone::Success));
                        if let Err(e) = save_local_state(&l).await {
                            log::warn!("saving buffer failed: {}", e);
                        }
                    }
                    Err(e) => {
                        log::warn!("clipboard read failed: {}", e);
                        clip_status.set((
                            "Clipboard unavailable".to_string(),
                            InlineTone::Danger,
                        ));
                    }
                }
                let clip_status = clip_status.clone();
                after_ms(2_000, move || {
                    clip_status.set((String::new(), InlineTone::Muted));
                });
            });
        })
    };

    // Download the active tab with a staged filename and a Save As dialog.
    // Clipboard failure here is silent: the buffer just stays empty.
    let on_download = {
        let state = state.clone();
        let settings = settings.clone();
        let local = local.clone();
        let tab_url = tab_url.clone();
        Callback::from(move |_| {
            let state = state.clone();
            let settings = settings.clone();
            let local = local.clone();
            let tab_url = tab_url.clone();
            spawn_local(async move {
                let Some(url) = (*tab_url).clone() else {
                    state.set(AppState::Error("No active tab to download".to_string()));
                    return;
                };

                let mut l = (*local).clone();
                if let Ok(text) = read_clipboard().await {
                    l.clipboard_text = sanitize(&text);
                }
                let label = crate::resolve_site_label(&url);
                l.current_domain = label.clone();
                local.set(l.clone());
                if let Err(e) = save_local_state(&l).await {
                    log::warn!("saving buffer failed: {}", e);
                }

                let Some(today) = crate::js_today() else {
                    state.set(AppState::Error("Clock unavailable".to_string()));
                    return;
                };
                let s = (*settings).clone();
                let date = s.pinned_date().unwrap_or(today);
                let staged = PopupOverride {
                    filename: build_basename(date, s.date_format, l.buffer(), "", &label),
                    date: format_date(date, s.date_format),
                    buffer: l.clipboard_text.clone(),
                };

                if let Err(e) = stage_override(&staged).await {
                    state.set(AppState::Error(format!("Could not stage download: {}", e)));
                    return;
                }
                if let Err(e) = start_download(&url, true).await {
                    state.set(AppState::Error(format!("Download failed: {}", e)));
                } else {
                    state.set(AppState::Idle);
                }
            });
        })
    };

    let on_save = {
        let settings = settings.clone();
        let saved_flash = saved_flash.clone();
        Callback::from(move |_| {
            let s = (*settings).clone();
            let saved_flash = saved_flash.clone();
            spawn_local(async move {
                match save_settings(&s).await {
                    Ok(()) => {
                        saved_flash.set(true);
                        let saved_flash = saved_flash.clone();
                        after_ms(1_500, move || saved_flash.set(false));
                    }
                    Err(e) => log::warn!("saving settings failed: {}", e),
                }
            });
        })
    };

    let is_busy = matches!(*state, AppState::Loading(_));
    let countdown = if settings.enabled {
        timer::countdown(local.disable_at_ms, *now_ms)
    } else {
        Countdown::Inactive
    };
    let preview = crate::js_today().and_then(|today| {
        crate::preview_with_map(
            (*tab_url).as_deref(),
            "original-filename.pdf",
            &settings,
            &local,
            today,
            *now_ms,
        )
    });
    let (clip_message, clip_tone) = (*clip_status).clone();
    let buffer_display = if local.clipboard_text.is_empty() {
        "(empty)".to_string()
    } else {
        local.clipboard_text.clone()
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"PDF Renamer"}</h1>

            {match &*state {
                AppState::Loading(msg) => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{msg}</p>
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Idle => html! {},
            }}

            <div class="flex-column-gap">
                <label style="display: flex; align-items: center; gap: 8px;">
                    <input
                        type="checkbox"
                        checked={settings.enabled}
                        disabled={is_busy}
                        onchange={on_toggle}
                    />
                    <span>{"Rename PDF downloads"}</span>
                    if let Countdown::Running { remaining_ms } = countdown {
                        <CountdownBadge {remaining_ms} />
                    }
                </label>

                <label style="display: flex; align-items: center; gap: 8px;">
                    <span>{"Date format"}</span>
                    <select onchange={on_format_change} disabled={is_busy}>
                        <option value="YYMMDD" selected={settings.date_format == DateFormat::YyMmDd}>{"YYMMDD"}</option>
                        <option value="YYYYMMDD" selected={settings.date_format == DateFormat::YyyyMmDd}>{"YYYYMMDD"}</option>
                        <option value="MMDDYY" selected={settings.date_format == DateFormat::MmDdYy}>{"MMDDYY"}</option>
                    </select>
                </label>

                <div>
                    <div style="display: flex; align-items: center; gap: 8px;">
                        <input
                            type="text"
                            placeholder="YYYY-MM-DD"
                            value={(*lock_input).clone()}
                            oninput={on_lock_input}
                            disabled={is_busy}
                        />
                        <Button onclick={on_lock} disabled={is_busy} variant={ButtonVariant::Secondary}>
                            {"Lock date"}
                        </Button>
                        <Button onclick={on_unlock} disabled={is_busy || settings.locked_date.is_none()} variant={ButtonVariant::Secondary}>
                            {"Clear"}
                        </Button>
                    </div>
                    <InlineHint message={(*lock_error).clone()} tone={InlineTone::Danger} />
                    if let Some(locked) = &settings.locked_date {
                        <InlineHint message={format!("Filenames use {}", locked)} tone={InlineTone::Muted} />
                    }
                </div>

                <div>
                    <div style="display: flex; align-items: center; gap: 8px;">
                        <span style="font-size: 12px;">{"Buffer: "}{buffer_display}</span>
                        <Button onclick={on_capture} disabled={is_busy} variant={ButtonVariant::Secondary}>
                            {"Capture clipboard"}
                        </Button>
                    </div>
                    <InlineHint message={clip_message} tone={clip_tone} />
                </div>

                <PreviewBox filename={preview} />

                <Button onclick={on_download} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                    {"Download current tab"}
                </Button>
                <Button onclick={on_save} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                    {if *saved_flash { "Saved!" } else { "Save Settings" }}
                </Button>
            </div>

            <p class="footer-popup">
                {"PDF Renamer v0.1.0"}
            </p>
        </div>
    }
}

// Helper functions

async fn load_settings() -> Result<SyncSettings, String> {
    let value = getSyncSettings().await.map_err(|e| format!("{:?}", e))?;
    if value.is_null() || value.is_undefined() {
        return Ok(SyncSettings::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| format!("Failed to parse settings: {:?}", e))
}

async fn save_settings(settings: &SyncSettings) -> Result<(), String> {
    let value = serde_wasm_bindgen::to_value(settings)
        .map_err(|e| format!("Failed to serialize settings: {:?}", e))?;
    setSyncSettings(value)
        .await
        .map_err(|e| format!("Failed to save settings: {:?}", e))
}

async fn load_local_state() -> Result<LocalState, String> {
    let value = getLocalState().await.map_err(|e| format!("{:?}", e))?;
    if value.is_null() || value.is_undefined() {
        return Ok(LocalState::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| format!("Failed to parse state: {:?}", e))
}

async fn save_local_state(state: &LocalState) -> Result<(), String> {
    let value = serde_wasm_bindgen::to_value(state)
        .map_err(|e| format!("Failed to serialize state: {:?}", e))?;
    setLocalState(value)
        .await
        .map_err(|e| format!("Failed to save state: {:?}", e))
}

async fn stage_override(staged: &PopupOverride) -> Result<(), String> {
    let value = serde_wasm_bindgen::to_value(staged)
        .map_err(|e| format!("Failed to serialize override: {:?}", e))?;
    setPopupOverride(value)
        .await
        .map_err(|e| format!("Failed to stage override: {:?}", e))
}

async fn read_clipboard() -> Result<String, String> {
    let value = readClipboardText().await.map_err(|e| format!("{:?}", e))?;
    Ok(value.as_string().unwrap_or_default())
}

async fn active_tab_url() -> Result<Option<String>, String> {
    let value = getActiveTabUrl().await.map_err(|e| format!("{:?}", e))?;
    Ok(value.as_string())
}

async fn fetch_domain_map_csv() -> Result<String, String> {
    let value = fetchDomainMapCsv().await.map_err(|e| format!("{:?}", e))?;
    Ok(value.as_string().unwrap_or_default())
}

async fn start_download(url: &str, save_as: bool) -> Result<(), String> {
    startDownload(url, save_as)
        .await
        .map_err(|e| format!("{:?}", e))
}

fn after_ms(ms: i32, callback: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(callback);
    if window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            ms,
        )
        .is_err()
    {
        log::warn!("could not schedule timeout");
    }
    closure.forget();
}
