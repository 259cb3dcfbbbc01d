//! App shell: session + cookie image slot + presentation counters.
//!
//! Input dispatch lives here so that keyboard and click paths share one
//! code path. Async work (share, ad) is handed back to the caller as a
//! [`Command`] to spawn, keeping this type free of any executor.

use std::cell::RefCell;
use std::rc::Rc;

use crate::actions::{OPEN_ANOTHER, SHARE, TAP_COOKIE};
use crate::asset::{AssetHandle, AssetSlot};
use crate::host::Host;
use crate::input::InputEvent;
use crate::reveal::TapOutcome;
use crate::session::{AdTask, SessionController, ShareTask};

/// Ticks the cookie wobbles after a counted tap.
const SHAKE_TICKS: u32 = 6;
/// Ticks a toast stays on screen (3s).
const TOAST_TICKS: u32 = 60;

/// Async work requested by an input.
pub enum Command<H> {
    Share(ShareTask<H>),
    Ad(AdTask<H>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub text: String,
    ticks_left: u32,
}

pub struct App<H: Host> {
    session: SessionController<H>,
    asset: Rc<RefCell<AssetSlot>>,
    toast: Option<Toast>,
    anim_frame: u32,
    shake: u32,
    opening_indicator: bool,
}

impl<H: Host> App<H> {
    pub fn new(
        session: SessionController<H>,
        asset: Rc<RefCell<AssetSlot>>,
        opening_indicator: bool,
    ) -> Self {
        Self {
            session,
            asset,
            toast: None,
            anim_frame: 0,
            shake: 0,
            opening_indicator,
        }
    }

    pub fn session(&self) -> &SessionController<H> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionController<H> {
        &mut self.session
    }

    pub fn asset_handle(&self) -> AssetHandle {
        self.asset.borrow().current()
    }

    /// A resolved image is in use; false while probing or after a downgrade.
    pub fn image_available(&self) -> bool {
        self.asset.borrow().is_image_available()
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn anim_frame(&self) -> u32 {
        self.anim_frame
    }

    /// Remaining wobble ticks; non-zero right after a counted tap.
    pub fn shake(&self) -> u32 {
        self.shake
    }

    pub fn opening_indicator(&self) -> bool {
        self.opening_indicator
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> Option<Command<H>> {
        match event {
            InputEvent::Key(' ' | '\n' | 'c') | InputEvent::Click(TAP_COOKIE) => self.tap(),
            InputEvent::Key('s') | InputEvent::Click(SHARE) => self.share(),
            InputEvent::Key('r') | InputEvent::Click(OPEN_ANOTHER) => {
                if self.session.request_reset() {
                    self.toast = None;
                }
                None
            }
            _ => None,
        }
    }

    fn tap(&mut self) -> Option<Command<H>> {
        match self.session.tap() {
            TapOutcome::Ignored => None,
            TapOutcome::Primed { .. } => {
                self.shake = SHAKE_TICKS;
                None
            }
            TapOutcome::Broke => {
                self.shake = SHAKE_TICKS;
                self.session.ad_task().map(Command::Ad)
            }
        }
    }

    fn share(&mut self) -> Option<Command<H>> {
        self.session.request_share().map(Command::Share)
    }

    pub fn show_toast(&mut self, text: impl Into<String>) {
        self.toast = Some(Toast {
            text: text.into(),
            ticks_left: TOAST_TICKS,
        });
    }

    /// Advance by `delta_ticks`, which may be zero on a fast frame. The
    /// session still sees zero deltas so a zero settle delay reveals on the
    /// frame after the breaking tap.
    pub fn tick(&mut self, delta_ticks: u32) {
        self.anim_frame = self.anim_frame.wrapping_add(delta_ticks);
        self.shake = self.shake.saturating_sub(delta_ticks);
        if let Some(toast) = self.toast.as_mut() {
            toast.ticks_left = toast.ticks_left.saturating_sub(delta_ticks);
            if toast.ticks_left == 0 {
                self.toast = None;
            }
        }
        self.session.tick(delta_ticks);
    }
}
