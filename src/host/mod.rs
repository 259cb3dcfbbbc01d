//! Host capabilities (haptics, audio, theme, story share, clipboard, ads).
//!
//! [`Host`] is the raw, fallible surface of the chat-platform runtime.
//! [`HostAdapter`] wraps it and is the only thing the rest of the app talks
//! to: every operation is best-effort, each one is isolated from the others,
//! and none of them returns an error. Failures are logged and turned into
//! no-ops or explicit outcome values.

pub mod web;

#[cfg(test)]
pub mod testing;

use std::future::Future;

use crate::error::HostError;
use crate::reveal::Feedback;

/// Haptic pulse strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    Light,
    Medium,
    Heavy,
}

impl Intensity {
    /// Style name understood by `HapticFeedback.impactOccurred`.
    pub fn as_str(self) -> &'static str {
        match self {
            Intensity::Light => "light",
            Intensity::Medium => "medium",
            Intensity::Heavy => "heavy",
        }
    }
}

/// Sound effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Quiet crunch on the priming taps.
    Tap,
    /// Loud crunch when the cookie breaks.
    Crunch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub text: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// Handed to the native story share.
    Delivered,
    /// Native share unavailable or failed; the text was copied instead.
    FallbackCopied,
    /// Neither share nor clipboard worked.
    Failed,
}

impl ShareOutcome {
    /// Message shown to the user after a share attempt.
    pub fn message(self) -> &'static str {
        match self {
            ShareOutcome::Delivered => "Открываю редактор истории...",
            ShareOutcome::FallbackCopied => "Предсказание скопировано в буфер обмена!",
            ShareOutcome::Failed => "Не удалось поделиться предсказанием",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdOutcome {
    Shown,
    Skipped,
}

/// Theme colours reported by the host. Absent values keep the CSS defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeParams {
    pub bg_color: Option<String>,
    pub text_color: Option<String>,
    pub button_color: Option<String>,
    pub button_text_color: Option<String>,
}

impl ThemeParams {
    /// `(css variable, value)` pairs for every colour that is present.
    pub fn variables(&self) -> Vec<(&'static str, &str)> {
        [
            ("--tg-theme-bg-color", &self.bg_color),
            ("--tg-theme-text-color", &self.text_color),
            ("--tg-theme-button-color", &self.button_color),
            ("--tg-theme-button-text-color", &self.button_text_color),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

/// Which capabilities the host exposes. Detected once, read-only afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityState {
    /// The chat-platform runtime object itself (lifecycle + theme).
    pub webapp: bool,
    pub haptics: bool,
    pub share: bool,
    pub clipboard: bool,
    pub ads: bool,
    pub audio: bool,
}

/// Raw host surface. Implementations may fail on any call.
pub trait Host {
    fn capabilities(&self) -> CapabilityState;
    fn ready(&self) -> Result<(), HostError>;
    fn expand(&self) -> Result<(), HostError>;
    fn haptic_impact(&self, intensity: Intensity) -> Result<(), HostError>;
    fn play_cue(&self, cue: Cue) -> Result<(), HostError>;
    fn theme_params(&self) -> Result<ThemeParams, HostError>;
    fn set_theme_variable(&self, name: &str, value: &str) -> Result<(), HostError>;
    fn share_to_story(&self, payload: &SharePayload) -> Result<(), HostError>;
    fn write_clipboard(&self, text: &str) -> impl Future<Output = Result<(), HostError>>;
    fn show_ad(&self, block_id: &str) -> impl Future<Output = Result<(), HostError>>;
}

/// Never-failing wrapper around a [`Host`].
pub struct HostAdapter<H> {
    host: H,
    caps: CapabilityState,
}

impl<H: Host> HostAdapter<H> {
    /// Detects capabilities once; they are not re-checked per call.
    pub fn new(host: H) -> Self {
        let caps = host.capabilities();
        log::debug!("host capabilities: {caps:?}");
        Self { host, caps }
    }

    pub fn capabilities(&self) -> CapabilityState {
        self.caps
    }

    #[cfg(test)]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Startup handshake: `ready()`, `expand()`, then theme colours.
    pub fn init(&self) {
        if !self.caps.webapp {
            log::info!("no host runtime; running standalone");
            return;
        }
        if let Err(e) = self.host.ready() {
            log::warn!("ready() failed: {e}");
        }
        if let Err(e) = self.host.expand() {
            log::warn!("expand() failed: {e}");
        }
        self.apply_theme();
    }

    pub fn apply_theme(&self) {
        if !self.caps.webapp {
            return;
        }
        let params = match self.host.theme_params() {
            Ok(p) => p,
            Err(e) => {
                log::debug!("theme params unavailable: {e}");
                return;
            }
        };
        for (name, value) in params.variables() {
            if let Err(e) = self.host.set_theme_variable(name, value) {
                log::debug!("could not set {name}: {e}");
            }
        }
    }

    pub fn pulse(&self, intensity: Intensity) {
        if !self.caps.haptics {
            return;
        }
        if let Err(e) = self.host.haptic_impact(intensity) {
            log::debug!("haptic feedback not available: {e}");
        }
    }

    pub fn play_cue(&self, cue: Cue) {
        if !self.caps.audio {
            return;
        }
        if let Err(e) = self.host.play_cue(cue) {
            log::debug!("{cue:?} audio failed: {e}");
        }
    }

    /// Native story share, falling back to the clipboard.
    pub async fn share(&self, payload: &SharePayload) -> ShareOutcome {
        if self.caps.share {
            match self.host.share_to_story(payload) {
                Ok(()) => return ShareOutcome::Delivered,
                Err(e) => log::warn!("share to story failed: {e}; copying instead"),
            }
        }
        self.copy_to_clipboard(&payload.text).await
    }

    async fn copy_to_clipboard(&self, text: &str) -> ShareOutcome {
        if !self.caps.clipboard {
            log::warn!("clipboard not available; share failed");
            return ShareOutcome::Failed;
        }
        match self.host.write_clipboard(text).await {
            Ok(()) => ShareOutcome::FallbackCopied,
            Err(e) => {
                log::warn!("clipboard write failed: {e}");
                ShareOutcome::Failed
            }
        }
    }

    /// Show an ad if one is configured and the SDK is present. The caller
    /// treats `Skipped` exactly like `Shown`.
    pub async fn show_ad(&self, block_id: Option<&str>) -> AdOutcome {
        let Some(block_id) = block_id else {
            return AdOutcome::Skipped;
        };
        if !self.caps.ads {
            log::debug!("ad SDK not loaded; skipping ad");
            return AdOutcome::Skipped;
        }
        match self.host.show_ad(block_id).await {
            Ok(()) => AdOutcome::Shown,
            Err(e) => {
                log::debug!("ad skipped: {e}");
                AdOutcome::Skipped
            }
        }
    }
}

impl<H: Host> Feedback for HostAdapter<H> {
    fn pulse(&self, intensity: Intensity) {
        HostAdapter::pulse(self, intensity);
    }

    fn play_cue(&self, cue: Cue) {
        HostAdapter::play_cue(self, cue);
    }
}
