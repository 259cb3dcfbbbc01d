//! Tap-driven reveal state machine.
//!
//! `Idle` → `Priming` (1 tap) → `Priming` (2 taps) → `Breaking` (3rd tap) →
//! `Revealed`. The fortune is chosen on the breaking tap; the reveal itself
//! happens once the settle timer has run down on later ticks.

use rand::Rng;

use crate::fortune::FortuneStore;
use crate::host::{Cue, Intensity};

/// Taps needed to break the cookie.
pub const TAPS_TO_BREAK: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Idle,
    Priming,
    Breaking,
    Revealed,
}

/// Side effects the machine triggers on each counted tap.
pub trait Feedback {
    fn pulse(&self, intensity: Intensity);
    fn play_cue(&self, cue: Cue);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Counted; the cookie is not broken yet.
    Primed { taps: u8 },
    /// This tap broke the cookie.
    Broke,
    /// Dropped without side effects.
    Ignored,
}

/// Ticks left until the reveal. Owned by the cycle so that dropping or
/// cancelling the cycle also drops the timer.
#[derive(Debug)]
struct SettleTimer {
    remaining: u32,
}

impl SettleTimer {
    /// Returns true once the timer has run out.
    fn advance(&mut self, delta_ticks: u32) -> bool {
        self.remaining = self.remaining.saturating_sub(delta_ticks);
        self.remaining == 0
    }
}

/// One interaction with one cookie.
#[derive(Debug)]
pub struct RevealCycle {
    taps: u8,
    phase: RevealPhase,
    selected: Option<String>,
    timer: Option<SettleTimer>,
    settle_ticks: u32,
    cancelled: bool,
}

impl RevealCycle {
    pub fn new(settle_ticks: u32) -> Self {
        Self {
            taps: 0,
            phase: RevealPhase::Idle,
            selected: None,
            timer: None,
            settle_ticks,
            cancelled: false,
        }
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn taps(&self) -> u8 {
        self.taps
    }

    /// The fortune picked on the breaking tap.
    #[cfg(test)]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[cfg(test)]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Register one tap. Feedback is emitted in a fixed order: haptic pulse
    /// first, then the sound cue. The breaking tap additionally selects the
    /// fortune and arms the settle timer, but never completes the reveal.
    pub fn tap<R: Rng, F: Feedback>(
        &mut self,
        store: &FortuneStore,
        rng: &mut R,
        fx: &F,
    ) -> TapOutcome {
        if self.cancelled || matches!(self.phase, RevealPhase::Breaking | RevealPhase::Revealed) {
            return TapOutcome::Ignored;
        }

        self.taps += 1;
        if self.taps < TAPS_TO_BREAK {
            self.phase = RevealPhase::Priming;
            fx.pulse(Intensity::Medium);
            fx.play_cue(Cue::Tap);
            log::debug!("cookie tapped ({}/{TAPS_TO_BREAK})", self.taps);
            return TapOutcome::Primed { taps: self.taps };
        }

        self.phase = RevealPhase::Breaking;
        fx.pulse(Intensity::Heavy);
        fx.play_cue(Cue::Crunch);
        if self.selected.is_none() {
            self.selected = Some(store.pick(rng).to_string());
        }
        self.timer = Some(SettleTimer {
            remaining: self.settle_ticks,
        });
        log::debug!("cookie broken; revealing in {} ticks", self.settle_ticks);
        TapOutcome::Broke
    }

    /// Advance the settle timer. Returns the fortune exactly once, on the
    /// tick where the timer runs out.
    pub fn tick(&mut self, delta_ticks: u32) -> Option<String> {
        let timer = self.timer.as_mut()?;
        if !timer.advance(delta_ticks) {
            return None;
        }
        self.timer = None;
        self.phase = RevealPhase::Revealed;
        self.selected.clone()
    }

    /// Stop the cycle: no further taps are counted and the pending reveal
    /// never fires.
    pub fn cancel(&mut self) {
        if self.timer.take().is_some() {
            log::debug!("pending reveal cancelled");
        }
        self.cancelled = true;
    }
}
