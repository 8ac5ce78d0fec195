/// Reusable UI components for the popup

use yew::prelude::*;

use crate::timer;

/// Live filename preview. `None` means the feature is off or the preview
/// could not be computed; a neutral placeholder is shown instead of an
/// error.
#[derive(Properties, PartialEq)]
pub struct PreviewBoxProps {
    pub filename: Option<String>,
}

#[function_component(PreviewBox)]
pub fn preview_box(props: &PreviewBoxProps) -> Html {
    let (text, color) = match &props.filename {
        Some(name) => (name.clone(), "#333"),
        None => ("original-filename.pdf".to_string(), "#999"),
    };

    html! {
        <div style="padding: 10px; border-radius: 4px; background-color: #f5f5f5; border: 1px solid #e0e0e0; margin: 10px 0; font-family: monospace; font-size: 12px; overflow-wrap: anywhere;">
            <span style={format!("color: {};", color)}>{text}</span>
        </div>
    }
}

/// Countdown badge for the auto-disable timer.
#[derive(Properties, PartialEq)]
pub struct CountdownBadgeProps {
    pub remaining_ms: f64,
}

#[function_component(CountdownBadge)]
pub fn countdown_badge(props: &CountdownBadgeProps) -> Html {
    html! {
        <span style="margin-left: 8px; padding: 2px 8px; border-radius: 10px; background-color: #e3f2fd; color: #1565c0; font-size: 11px; font-weight: bold;">
            {format!("auto-off in {}", timer::format_remaining(props.remaining_ms))}
        </span>
    }
}

#[derive(PartialEq, Clone)]
pub enum InlineTone {
    Success,
    Danger,
    Muted,
}

impl Default for InlineTone {
    fn default() -> Self {
        InlineTone::Muted
    }
}

/// Transient inline status text (clipboard capture result, validation
/// messages).
#[derive(Properties, PartialEq)]
pub struct InlineHintProps {
    pub message: String,
    #[prop_or_default]
    pub tone: InlineTone,
}

#[function_component(InlineHint)]
pub fn inline_hint(props: &InlineHintProps) -> Html {
    if props.message.is_empty() {
        return html! {};
    }

    let color = match props.tone {
        InlineTone::Success => "#2e7d32",
        InlineTone::Danger => "#c62828",
        InlineTone::Muted => "#777",
    };

    html! {
        <p style={format!("margin: 4px 0 0; font-size: 12px; color: {};", color)}>
            {&props.message}
        </p>
    }
}
