//! Semantic action IDs for click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.

/// The cookie panel itself.
pub const TAP_COOKIE: u16 = 0;

// ── Fortune card buttons ────────────────────────────────────────
pub const SHARE: u16 = 10;
pub const OPEN_ANOTHER: u16 = 11;
