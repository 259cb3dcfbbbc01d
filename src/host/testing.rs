//! Recording stub host for tests.

use std::cell::{Cell, RefCell};

use super::{CapabilityState, Cue, Host, Intensity, SharePayload, ThemeParams};
use crate::error::HostError;

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Ready,
    Expand,
    Haptic(Intensity),
    Cue(Cue),
    SetTheme(String, String),
    ShareToStory(String),
    Clipboard(String),
    ShowAd(String),
}

pub struct StubHost {
    pub caps: CapabilityState,
    pub theme: ThemeParams,
    pub fail_haptics: bool,
    pub fail_audio: bool,
    pub fail_share: bool,
    pub fail_clipboard: bool,
    pub fail_ad: bool,
    calls: RefCell<Vec<HostCall>>,
    capability_checks: Cell<u32>,
}

impl StubHost {
    /// Every capability present and working.
    pub fn full() -> Self {
        Self::with_caps(CapabilityState {
            webapp: true,
            haptics: true,
            share: true,
            clipboard: true,
            ads: true,
            audio: true,
        })
    }

    /// Plain browser tab: nothing available.
    pub fn bare() -> Self {
        Self::with_caps(CapabilityState::default())
    }

    fn with_caps(caps: CapabilityState) -> Self {
        Self {
            caps,
            theme: ThemeParams::default(),
            fail_haptics: false,
            fail_audio: false,
            fail_share: false,
            fail_clipboard: false,
            fail_ad: false,
            calls: RefCell::new(Vec::new()),
            capability_checks: Cell::new(0),
        }
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    pub fn capability_checks(&self) -> u32 {
        self.capability_checks.get()
    }

    fn record(&self, call: HostCall) {
        self.calls.borrow_mut().push(call);
    }

    fn outcome(fail: bool) -> Result<(), HostError> {
        if fail {
            Err(HostError::Js("stub failure".into()))
        } else {
            Ok(())
        }
    }
}

impl Host for StubHost {
    fn capabilities(&self) -> CapabilityState {
        self.capability_checks.set(self.capability_checks.get() + 1);
        self.caps
    }

    fn ready(&self) -> Result<(), HostError> {
        self.record(HostCall::Ready);
        Ok(())
    }

    fn expand(&self) -> Result<(), HostError> {
        self.record(HostCall::Expand);
        Ok(())
    }

    fn haptic_impact(&self, intensity: Intensity) -> Result<(), HostError> {
        self.record(HostCall::Haptic(intensity));
        Self::outcome(self.fail_haptics)
    }

    fn play_cue(&self, cue: Cue) -> Result<(), HostError> {
        self.record(HostCall::Cue(cue));
        Self::outcome(self.fail_audio)
    }

    fn theme_params(&self) -> Result<ThemeParams, HostError> {
        Ok(self.theme.clone())
    }

    fn set_theme_variable(&self, name: &str, value: &str) -> Result<(), HostError> {
        self.record(HostCall::SetTheme(name.into(), value.into()));
        Ok(())
    }

    fn share_to_story(&self, payload: &SharePayload) -> Result<(), HostError> {
        self.record(HostCall::ShareToStory(payload.text.clone()));
        Self::outcome(self.fail_share)
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), HostError> {
        self.record(HostCall::Clipboard(text.into()));
        Self::outcome(self.fail_clipboard)
    }

    async fn show_ad(&self, block_id: &str) -> Result<(), HostError> {
        self.record(HostCall::ShowAd(block_id.into()));
        Self::outcome(self.fail_ad)
    }
}
