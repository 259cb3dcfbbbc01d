//! Cookie image resolution.
//!
//! At startup the candidate locations are probed one by one; the first that
//! loads wins and is cached in an [`AssetSlot`] for the rest of the session.
//! If nothing loads (or the winner later fails to display) the UI draws the
//! 🥠 glyph instead, which is a normal outcome and not an error.

use std::future::Future;

/// Location of a candidate image (a URL path such as `/cookie.png`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocator(pub String);

impl AssetLocator {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetLocator {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What the cookie is drawn with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetHandle {
    Image(AssetLocator),
    /// Draw the built-in glyph.
    Fallback,
}

/// Existence check for a single candidate.
pub trait AssetProbe {
    fn exists(&self, locator: &AssetLocator) -> impl Future<Output = bool>;
}

/// Probe `candidates` strictly in order, one at a time, and stop at the
/// first success. An empty or all-failing list yields [`AssetHandle::Fallback`].
pub async fn resolve<P: AssetProbe>(probe: &P, candidates: &[AssetLocator]) -> AssetHandle {
    for candidate in candidates {
        if probe.exists(candidate).await {
            log::debug!("cookie image resolved to {}", candidate.as_str());
            return AssetHandle::Image(candidate.clone());
        }
        log::debug!("cookie image candidate {} missing", candidate.as_str());
    }
    log::info!("no cookie image found; using glyph");
    AssetHandle::Fallback
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SlotState {
    Pending,
    Resolved(AssetHandle),
}

/// Session-lifetime cache of the resolved handle.
#[derive(Debug)]
pub struct AssetSlot {
    state: SlotState,
}

impl AssetSlot {
    pub fn new() -> Self {
        Self {
            state: SlotState::Pending,
        }
    }

    /// Store the probe result. Only the first call has an effect.
    pub fn settle(&mut self, handle: AssetHandle) -> bool {
        match self.state {
            SlotState::Pending => {
                self.state = SlotState::Resolved(handle);
                true
            }
            SlotState::Resolved(_) => {
                log::warn!("asset slot already settled; ignoring {handle:?}");
                false
            }
        }
    }

    #[cfg(test)]
    pub fn is_settled(&self) -> bool {
        !matches!(self.state, SlotState::Pending)
    }

    /// Handle to draw with right now. The glyph is used while probing.
    pub fn current(&self) -> AssetHandle {
        match &self.state {
            SlotState::Pending => AssetHandle::Fallback,
            SlotState::Resolved(handle) => handle.clone(),
        }
    }

    pub fn is_image_available(&self) -> bool {
        matches!(self.state, SlotState::Resolved(AssetHandle::Image(_)))
    }

    /// The resolved image failed to load at display time. Switch to the
    /// glyph for the rest of the session without probing again.
    pub fn downgrade(&mut self) {
        if let SlotState::Resolved(AssetHandle::Image(locator)) = &self.state {
            log::warn!("cookie image {} failed to load; using glyph", locator.as_str());
            self.state = SlotState::Resolved(AssetHandle::Fallback);
        }
    }
}

impl Default for AssetSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Succeeds for the listed locators and records every attempt.
    struct StubProbe {
        present: Vec<&'static str>,
        attempts: RefCell<Vec<String>>,
    }

    impl StubProbe {
        fn new(present: &[&'static str]) -> Self {
            Self {
                present: present.to_vec(),
                attempts: RefCell::new(Vec::new()),
            }
        }
    }

    impl AssetProbe for StubProbe {
        async fn exists(&self, locator: &AssetLocator) -> bool {
            self.attempts.borrow_mut().push(locator.0.clone());
            self.present.contains(&locator.as_str())
        }
    }

    fn candidates(names: &[&str]) -> Vec<AssetLocator> {
        names.iter().map(|n| AssetLocator::from(*n)).collect()
    }

    #[test]
    fn second_candidate_wins_and_third_is_never_tried() {
        let probe = StubProbe::new(&["/b.png", "/c.png"]);
        let list = candidates(&["/a.gif", "/b.png", "/c.png"]);
        let handle = pollster::block_on(resolve(&probe, &list));
        assert_eq!(handle, AssetHandle::Image("/b.png".into()));
        assert_eq!(*probe.attempts.borrow(), vec!["/a.gif", "/b.png"]);
    }

    #[test]
    fn first_success_short_circuits() {
        let probe = StubProbe::new(&["/a.gif", "/b.png"]);
        let list = candidates(&["/a.gif", "/b.png"]);
        let handle = pollster::block_on(resolve(&probe, &list));
        assert_eq!(handle, AssetHandle::Image("/a.gif".into()));
        assert_eq!(probe.attempts.borrow().len(), 1);
    }

    #[test]
    fn nothing_found_falls_back() {
        let probe = StubProbe::new(&[]);
        let list = candidates(&["/a.gif", "/b.png"]);
        assert_eq!(pollster::block_on(resolve(&probe, &list)), AssetHandle::Fallback);
        assert_eq!(probe.attempts.borrow().len(), 2);
    }

    #[test]
    fn empty_candidate_list_falls_back() {
        let probe = StubProbe::new(&["/a.gif"]);
        assert_eq!(pollster::block_on(resolve(&probe, &[])), AssetHandle::Fallback);
        assert!(probe.attempts.borrow().is_empty());
    }

    #[test]
    fn pending_slot_draws_glyph() {
        let slot = AssetSlot::new();
        assert!(!slot.is_settled());
        assert_eq!(slot.current(), AssetHandle::Fallback);
        assert!(!slot.is_image_available());
    }

    #[test]
    fn slot_settles_once() {
        let mut slot = AssetSlot::new();
        assert!(slot.settle(AssetHandle::Image("/a.gif".into())));
        assert!(!slot.settle(AssetHandle::Fallback));
        assert_eq!(slot.current(), AssetHandle::Image("/a.gif".into()));
        assert!(slot.is_image_available());
    }

    #[test]
    fn downgrade_is_permanent() {
        let mut slot = AssetSlot::new();
        slot.settle(AssetHandle::Image("/a.gif".into()));
        slot.downgrade();
        assert_eq!(slot.current(), AssetHandle::Fallback);
        assert!(!slot.is_image_available());
        // Still settled: a late probe result cannot bring the image back.
        assert!(!slot.settle(AssetHandle::Image("/a.gif".into())));
        assert_eq!(slot.current(), AssetHandle::Fallback);
    }

    #[test]
    fn downgrade_before_settle_is_a_no_op() {
        let mut slot = AssetSlot::new();
        slot.downgrade();
        assert!(!slot.is_settled());
        assert!(slot.settle(AssetHandle::Image("/a.gif".into())));
    }
}
