//! Direct DOM access that the terminal backend does not cover: the inline
//! config block, the page URL, the grid container geometry, page lifecycle,
//! and the `<img>` overlay that shows the resolved cookie image.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{DomRect, HtmlImageElement, PageTransitionEvent};

use crate::asset::{AssetHandle, AssetSlot};
use crate::config::CONFIG_ELEMENT_ID;
use crate::input::cells_to_pixels;

/// Text of the inline `<script id="fortune-config">` block, if present.
pub fn config_text() -> Option<String> {
    let document = web_sys::window()?.document()?;
    document
        .get_element_by_id(CONFIG_ELEMENT_ID)?
        .text_content()
        .filter(|t| !t.trim().is_empty())
}

pub fn page_url() -> Option<String> {
    web_sys::window()?.location().href().ok()
}

pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now())
}

/// Bounding rect of the grid container.
pub fn grid_bounds() -> Option<DomRect> {
    let document = web_sys::window()?.document()?;
    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    Some(grid.get_bounding_client_rect())
}

/// Run `callback` on a page transition event (`pagehide` or `pageshow`).
/// The argument is the event's `persisted` flag, true when the page goes
/// into or comes out of the back-forward cache.
pub fn on_page_transition(event: &str, mut callback: impl FnMut(bool) + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::<dyn FnMut(PageTransitionEvent)>::new(
        move |e: PageTransitionEvent| callback(e.persisted()),
    );
    if let Err(e) =
        window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
    {
        log::warn!("could not register {event} listener: {e:?}");
    }
    // Lives for the whole page.
    closure.forget();
}

/// The `<img>` laid over the cookie panel when an image was resolved.
///
/// The element is created on first use. A display-time load failure
/// downgrades the shared [`AssetSlot`] so the next frame draws the glyph.
pub struct CookieOverlay {
    slot: Rc<RefCell<AssetSlot>>,
    img: Option<HtmlImageElement>,
    src: Option<String>,
}

impl CookieOverlay {
    pub fn new(slot: Rc<RefCell<AssetSlot>>) -> Self {
        Self {
            slot,
            img: None,
            src: None,
        }
    }

    /// Bring the overlay in line with the frame just drawn.
    pub fn sync(&mut self, handle: &AssetHandle, area: Option<Rect>, cols: u16, rows: u16) {
        let (AssetHandle::Image(locator), Some(area)) = (handle, area) else {
            self.hide();
            return;
        };
        let Some(bounds) = grid_bounds() else {
            self.hide();
            return;
        };
        let Some((left, top, width, height)) =
            cells_to_pixels(area, bounds.width(), bounds.height(), cols, rows)
        else {
            self.hide();
            return;
        };
        let Some(img) = self.element() else {
            return;
        };

        if self.src.as_deref() != Some(locator.as_str()) {
            img.set_src(locator.as_str());
            self.src = Some(locator.as_str().to_string());
        }
        let style = img.style();
        let placed = [
            ("left", format!("{}px", bounds.left() + left)),
            ("top", format!("{}px", bounds.top() + top)),
            ("width", format!("{width}px")),
            ("height", format!("{height}px")),
            ("display", "block".to_string()),
        ];
        for (name, value) in placed {
            if let Err(e) = style.set_property(name, &value) {
                log::debug!("overlay style {name} rejected: {e:?}");
            }
        }
    }

    fn hide(&self) {
        if let Some(img) = &self.img {
            let _ = img.style().set_property("display", "none");
        }
    }

    fn element(&mut self) -> Option<HtmlImageElement> {
        if let Some(img) = &self.img {
            return Some(img.clone());
        }
        let document = web_sys::window()?.document()?;
        let img: HtmlImageElement = document.create_element("img").ok()?.dyn_into().ok()?;
        img.set_alt("Печенье с предсказанием");
        let _ = img.style().set_css_text(
            "position:fixed;pointer-events:none;object-fit:contain;display:none;",
        );

        let slot = Rc::clone(&self.slot);
        let on_error = Closure::<dyn FnMut()>::new(move || slot.borrow_mut().downgrade());
        img.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_error.forget();

        if let Err(e) = document.body()?.append_child(&img) {
            log::warn!("could not attach cookie image: {e:?}");
            return None;
        }
        self.img = Some(img.clone());
        Some(img)
    }
}
