/// Auto-disable countdown for the enable toggle
///
/// Enabling the feature arms a 60-minute expiry timestamp persisted in local
/// state; the popup ticks the countdown and the rename path treats an
/// expired timer as disabled. All functions are pure over an injected
/// `now_ms` so nothing here reads a clock.

/// How long the feature stays on after being enabled.
pub const AUTO_DISABLE_MS: f64 = 60.0 * 60.0 * 1000.0;

/// Where the countdown stands at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Countdown {
    /// No expiry armed.
    Inactive,
    /// Armed and still in the future.
    Running { remaining_ms: f64 },
    /// Armed and already past: the feature should be switched off.
    Expired,
}

/// Expiry timestamp for a toggle flipped on at `now_ms`.
pub fn arm(now_ms: f64) -> f64 {
    now_ms + AUTO_DISABLE_MS
}

pub fn countdown(disable_at_ms: Option<f64>, now_ms: f64) -> Countdown {
    match disable_at_ms {
        None => Countdown::Inactive,
        Some(at) if at > now_ms => Countdown::Running {
            remaining_ms: at - now_ms,
        },
        Some(_) => Countdown::Expired,
    }
}

/// Whether the enabled flag should be treated as off because the timer ran
/// out. An unarmed timer never expires.
pub fn is_expired(disable_at_ms: Option<f64>, now_ms: f64) -> bool {
    matches!(countdown(disable_at_ms, now_ms), Countdown::Expired)
}

/// mm:ss rendering for the popup badge. Clamps at zero.
pub fn format_remaining(remaining_ms: f64) -> String {
    let total_seconds = (remaining_ms.max(0.0) / 1000.0).ceil() as u64;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
