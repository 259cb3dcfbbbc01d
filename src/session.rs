//! Screen lifecycle around the reveal machine.
//!
//! The controller owns the current [`RevealCycle`], collects its completion,
//! and hands out self-contained async tasks for share and ads so that the
//! caller can `spawn_local` them without keeping the session borrowed.

use std::rc::Rc;

use rand::rngs::SmallRng;

use crate::config::AppConfig;
use crate::fortune::FortuneStore;
use crate::host::{AdOutcome, Host, HostAdapter, ShareOutcome, SharePayload};
use crate::reveal::{RevealCycle, RevealPhase, TapOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No counted tap yet.
    Idle,
    /// Tapping or breaking; the fortune is not shown yet.
    AwaitingReveal,
    ShowingFortune,
    /// Torn down; everything is ignored.
    Closed,
}

pub struct SessionController<H: Host> {
    host: Rc<HostAdapter<H>>,
    store: FortuneStore,
    rng: SmallRng,
    settle_ticks: u32,
    cycle: Option<RevealCycle>,
    phase: SessionPhase,
    fortune: Option<String>,
    share_link: Option<String>,
    ad_block_id: Option<String>,
    ad_pending: bool,
}

impl<H: Host> SessionController<H> {
    pub fn new(
        host: Rc<HostAdapter<H>>,
        store: FortuneStore,
        rng: SmallRng,
        config: &AppConfig,
    ) -> Self {
        Self {
            host,
            store,
            rng,
            settle_ticks: config.settle_ticks(),
            cycle: None,
            phase: SessionPhase::Idle,
            fortune: None,
            share_link: config.share_url.clone(),
            ad_block_id: config.ad_block_id.clone(),
            ad_pending: false,
        }
    }

    /// Link used when no `share_url` is configured (the page URL).
    pub fn set_default_share_link(&mut self, link: String) {
        if self.share_link.is_none() {
            self.share_link = Some(link);
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn fortune(&self) -> Option<&str> {
        self.fortune.as_deref()
    }

    /// Phase of the current cycle; `Idle` when there is none.
    pub fn reveal_phase(&self) -> RevealPhase {
        self.cycle
            .as_ref()
            .map_or(RevealPhase::Idle, RevealCycle::phase)
    }

    pub fn taps(&self) -> u8 {
        self.cycle.as_ref().map_or(0, RevealCycle::taps)
    }

    pub fn host(&self) -> &Rc<HostAdapter<H>> {
        &self.host
    }

    /// Begin a fresh cycle. Does nothing if one is already running or the
    /// session is closed.
    pub fn start_cycle(&mut self) -> bool {
        if self.phase == SessionPhase::Closed || self.cycle.is_some() {
            return false;
        }
        self.cycle = Some(RevealCycle::new(self.settle_ticks));
        log::debug!("reveal cycle started");
        true
    }

    pub fn tap(&mut self) -> TapOutcome {
        if matches!(
            self.phase,
            SessionPhase::Closed | SessionPhase::ShowingFortune
        ) {
            return TapOutcome::Ignored;
        }
        if self.cycle.is_none() {
            self.start_cycle();
        }
        let Some(cycle) = self.cycle.as_mut() else {
            return TapOutcome::Ignored;
        };

        let outcome = cycle.tap(&self.store, &mut self.rng, &*self.host);
        if outcome != TapOutcome::Ignored && self.phase == SessionPhase::Idle {
            self.phase = SessionPhase::AwaitingReveal;
        }
        if outcome == TapOutcome::Broke {
            self.ad_pending = true;
        }
        outcome
    }

    /// Drive the settle timer. Returns true on the tick the fortune appears.
    pub fn tick(&mut self, delta_ticks: u32) -> bool {
        let Some(fortune) = self.cycle.as_mut().and_then(|c| c.tick(delta_ticks)) else {
            return false;
        };
        self.on_reveal_complete(fortune)
    }

    /// Completion signal from the machine. Only the first delivery while
    /// awaiting a reveal is accepted.
    pub fn on_reveal_complete(&mut self, fortune: String) -> bool {
        if self.phase != SessionPhase::AwaitingReveal {
            log::debug!("ignoring reveal completion in {:?}", self.phase);
            return false;
        }
        log::debug!("fortune revealed");
        self.fortune = Some(fortune);
        self.phase = SessionPhase::ShowingFortune;
        true
    }

    pub fn request_share(&self) -> Option<ShareTask<H>> {
        if self.phase != SessionPhase::ShowingFortune {
            return None;
        }
        let text = self.fortune.clone()?;
        Some(ShareTask {
            host: Rc::clone(&self.host),
            payload: SharePayload {
                text,
                link: self.share_link.clone(),
            },
        })
    }

    /// "Open another": back to a fresh idle screen.
    pub fn request_reset(&mut self) -> bool {
        if self.phase != SessionPhase::ShowingFortune {
            return false;
        }
        self.cycle = None;
        self.fortune = None;
        self.phase = SessionPhase::Idle;
        log::debug!("session reset");
        true
    }

    /// The ad owed for the most recent break, if any. Handed out once.
    pub fn ad_task(&mut self) -> Option<AdTask<H>> {
        if !std::mem::take(&mut self.ad_pending) {
            return None;
        }
        let block_id = self.ad_block_id.clone()?;
        Some(AdTask {
            host: Rc::clone(&self.host),
            block_id,
        })
    }

    /// Page is going away: cancel any pending reveal and ignore all input.
    pub fn teardown(&mut self) {
        if let Some(cycle) = self.cycle.as_mut() {
            cycle.cancel();
        }
        self.cycle = None;
        self.ad_pending = false;
        self.phase = SessionPhase::Closed;
        log::debug!("session closed");
    }

    /// Page came back from the back-forward cache: reopen on a fresh idle
    /// screen. Only a closed session can be resumed.
    pub fn resume(&mut self) -> bool {
        if self.phase != SessionPhase::Closed {
            return false;
        }
        self.cycle = None;
        self.fortune = None;
        self.phase = SessionPhase::Idle;
        log::debug!("session resumed");
        true
    }
}

/// A share request detached from the session.
pub struct ShareTask<H> {
    host: Rc<HostAdapter<H>>,
    payload: SharePayload,
}

impl<H: Host> ShareTask<H> {
    #[cfg(test)]
    pub fn payload(&self) -> &SharePayload {
        &self.payload
    }

    pub async fn run(self) -> ShareOutcome {
        self.host.share(&self.payload).await
    }
}

/// An ad display detached from the session. Its outcome never affects the
/// reveal.
pub struct AdTask<H> {
    host: Rc<HostAdapter<H>>,
    block_id: String,
}

impl<H: Host> AdTask<H> {
    pub async fn run(self) -> AdOutcome {
        self.host.show_ad(Some(&self.block_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CorpusError;
    use crate::host::testing::{HostCall, StubHost};
    use crate::host::{Cue, Intensity};
    use rand::SeedableRng;

    fn session_with(host: StubHost, config: &AppConfig) -> SessionController<StubHost> {
        let store = FortuneStore::new(vec!["A".into(), "B".into(), "C".into()]).unwrap();
        SessionController::new(
            Rc::new(HostAdapter::new(host)),
            store,
            SmallRng::seed_from_u64(3),
            config,
        )
    }

    fn session(host: StubHost) -> SessionController<StubHost> {
        session_with(host, &AppConfig::default())
    }

    fn reveal(s: &mut SessionController<StubHost>) {
        for _ in 0..3 {
            s.tap();
        }
        assert!(s.tick(AppConfig::default().settle_ticks()));
    }

    #[test]
    fn empty_corpus_fails_before_any_session_exists() {
        assert!(matches!(FortuneStore::new(Vec::new()), Err(CorpusError::Empty)));
    }

    #[test]
    fn first_tap_starts_cycle_and_awaits_reveal() {
        let mut s = session(StubHost::full());
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert_eq!(s.reveal_phase(), RevealPhase::Idle);
        assert_eq!(s.tap(), TapOutcome::Primed { taps: 1 });
        assert_eq!(s.phase(), SessionPhase::AwaitingReveal);
        assert_eq!(s.reveal_phase(), RevealPhase::Priming);
    }

    #[test]
    fn start_cycle_is_a_no_op_while_one_runs() {
        let mut s = session(StubHost::full());
        assert!(s.start_cycle());
        assert!(!s.start_cycle());
        assert_eq!(s.phase(), SessionPhase::Idle);
    }

    #[test]
    fn third_tap_pulses_heavy_and_crunches() {
        let mut s = session(StubHost::full());
        s.tap();
        s.tap();
        assert_eq!(s.tap(), TapOutcome::Broke);
        let calls = s.host().host().calls();
        assert_eq!(
            &calls[calls.len() - 2..],
            &[HostCall::Haptic(Intensity::Heavy), HostCall::Cue(Cue::Crunch)]
        );
        assert_eq!(s.fortune(), None);
    }

    #[test]
    fn reveal_only_after_settle_delay() {
        let mut s = session(StubHost::full());
        for _ in 0..3 {
            s.tap();
        }
        let ticks = AppConfig::default().settle_ticks();
        assert!(!s.tick(ticks - 1));
        assert_eq!(s.phase(), SessionPhase::AwaitingReveal);
        assert!(s.tick(1));
        assert_eq!(s.phase(), SessionPhase::ShowingFortune);
        assert!(matches!(s.fortune(), Some("A" | "B" | "C")));
    }

    #[test]
    fn repeated_completion_is_ignored() {
        let mut s = session(StubHost::full());
        reveal(&mut s);
        let shown = s.fortune().map(str::to_string);
        assert!(!s.on_reveal_complete("other".into()));
        assert_eq!(s.fortune().map(str::to_string), shown);
        assert!(!s.tick(100));
    }

    #[test]
    fn completion_outside_awaiting_is_ignored() {
        let mut s = session(StubHost::full());
        assert!(!s.on_reveal_complete("A".into()));
        assert_eq!(s.phase(), SessionPhase::Idle);
    }

    #[test]
    fn taps_on_shown_fortune_are_ignored() {
        let mut s = session(StubHost::full());
        reveal(&mut s);
        let calls = s.host().host().calls().len();
        assert_eq!(s.tap(), TapOutcome::Ignored);
        assert_eq!(s.host().host().calls().len(), calls);
    }

    #[test]
    fn share_only_when_showing_fortune() {
        let mut s = session(StubHost::full());
        assert!(s.request_share().is_none());
        s.tap();
        assert!(s.request_share().is_none());
    }

    #[test]
    fn share_carries_fortune_and_link() {
        let config = AppConfig {
            share_url: Some("https://t.me/fortune_bot/app".into()),
            ..AppConfig::default()
        };
        let mut s = session_with(StubHost::full(), &config);
        s.set_default_share_link("https://example.test/".into());
        reveal(&mut s);
        let task = s.request_share().unwrap();
        assert_eq!(Some(task.payload().text.as_str()), s.fortune());
        assert_eq!(
            task.payload().link.as_deref(),
            Some("https://t.me/fortune_bot/app")
        );
        assert_eq!(pollster::block_on(task.run()), ShareOutcome::Delivered);
    }

    #[test]
    fn default_share_link_used_when_unconfigured() {
        let mut s = session(StubHost::full());
        s.set_default_share_link("https://example.test/".into());
        reveal(&mut s);
        let task = s.request_share().unwrap();
        assert_eq!(task.payload().link.as_deref(), Some("https://example.test/"));
    }

    #[test]
    fn share_falls_back_to_clipboard() {
        let mut host = StubHost::full();
        host.caps.share = false;
        let mut s = session(host);
        reveal(&mut s);
        let fortune = s.fortune().unwrap().to_string();
        let outcome = pollster::block_on(s.request_share().unwrap().run());
        assert_eq!(outcome, ShareOutcome::FallbackCopied);
        assert_eq!(s.host().host().calls().last(), Some(&HostCall::Clipboard(fortune)));
        assert_eq!(s.phase(), SessionPhase::ShowingFortune);
    }

    #[test]
    fn reset_returns_to_a_fresh_idle_cycle() {
        let mut s = session(StubHost::full());
        assert!(!s.request_reset());
        reveal(&mut s);
        assert!(s.request_reset());
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert_eq!(s.fortune(), None);
        assert_eq!(s.taps(), 0);
        assert_eq!(s.tap(), TapOutcome::Primed { taps: 1 });
    }

    #[test]
    fn ad_task_handed_out_once_per_break() {
        let config = AppConfig {
            ad_block_id: Some("1234".into()),
            ..AppConfig::default()
        };
        let mut s = session_with(StubHost::full(), &config);
        s.tap();
        assert!(s.ad_task().is_none());
        s.tap();
        s.tap();
        let task = s.ad_task().unwrap();
        assert!(s.ad_task().is_none());
        assert_eq!(pollster::block_on(task.run()), AdOutcome::Shown);
    }

    #[test]
    fn failing_ad_does_not_block_reveal() {
        let config = AppConfig {
            ad_block_id: Some("1234".into()),
            ..AppConfig::default()
        };
        let mut host = StubHost::full();
        host.fail_ad = true;
        let mut s = session_with(host, &config);
        for _ in 0..3 {
            s.tap();
        }
        assert_eq!(pollster::block_on(s.ad_task().unwrap().run()), AdOutcome::Skipped);
        assert!(s.tick(config.settle_ticks()));
        assert_eq!(s.phase(), SessionPhase::ShowingFortune);
    }

    #[test]
    fn no_ad_without_block_id() {
        let mut s = session(StubHost::full());
        for _ in 0..3 {
            s.tap();
        }
        assert!(s.ad_task().is_none());
    }

    #[test]
    fn teardown_cancels_pending_reveal() {
        let mut s = session(StubHost::full());
        for _ in 0..3 {
            s.tap();
        }
        s.teardown();
        assert_eq!(s.phase(), SessionPhase::Closed);
        assert!(!s.tick(1000));
        assert_eq!(s.fortune(), None);
        assert_eq!(s.tap(), TapOutcome::Ignored);
        assert!(!s.start_cycle());
    }

    #[test]
    fn restored_page_gets_a_fresh_cookie() {
        let mut s = session(StubHost::full());
        assert!(!s.resume());
        for _ in 0..3 {
            s.tap();
        }
        s.teardown();
        assert!(s.resume());
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert_eq!(s.reveal_phase(), RevealPhase::Idle);
        assert_eq!(s.fortune(), None);
        assert!(!s.tick(1000));
        assert_eq!(s.tap(), TapOutcome::Primed { taps: 1 });
        assert_eq!(s.phase(), SessionPhase::AwaitingReveal);
        assert!(!s.resume());
    }

    #[test]
    fn failing_feedback_still_reveals_on_time() {
        let mut host = StubHost::full();
        host.fail_haptics = true;
        host.fail_audio = true;
        let mut s = session(host);
        assert_eq!(s.tap(), TapOutcome::Primed { taps: 1 });
        assert_eq!(s.tap(), TapOutcome::Primed { taps: 2 });
        assert_eq!(s.tap(), TapOutcome::Broke);

        let ticks = AppConfig::default().settle_ticks();
        assert!(!s.tick(ticks - 1));
        assert!(s.tick(1));
        assert_eq!(s.phase(), SessionPhase::ShowingFortune);
        assert!(matches!(s.fortune(), Some("A" | "B" | "C")));
        assert_eq!(
            s.host().host().calls(),
            vec![
                HostCall::Haptic(Intensity::Medium),
                HostCall::Cue(Cue::Tap),
                HostCall::Haptic(Intensity::Medium),
                HostCall::Cue(Cue::Tap),
                HostCall::Haptic(Intensity::Heavy),
                HostCall::Cue(Cue::Crunch),
            ]
        );
    }

    #[test]
    fn works_without_any_host_capability() {
        let mut s = session(StubHost::bare());
        reveal(&mut s);
        assert!(s.fortune().is_some());
        assert!(s.host().host().calls().is_empty());
        let outcome = pollster::block_on(s.request_share().unwrap().run());
        assert_eq!(outcome, ShareOutcome::Failed);
    }
}
