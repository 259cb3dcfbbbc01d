//! Browser binding: `Telegram.WebApp`, `navigator.clipboard`, the Adsgram
//! SDK and `<audio>` elements, all looked up dynamically so that a plain
//! browser tab (no Telegram, no SDK) still works.

use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlAudioElement, HtmlElement, HtmlImageElement};

use super::{CapabilityState, Cue, Host, Intensity, SharePayload, ThemeParams};
use crate::asset::{AssetLocator, AssetProbe};
use crate::config::AudioConfig;
use crate::error::HostError;

/// `target[key]`, treating `undefined`/`null` as absent.
fn property(target: &JsValue, key: &str) -> Option<JsValue> {
    let value = Reflect::get(target, &JsValue::from_str(key)).ok()?;
    if value.is_undefined() || value.is_null() {
        None
    } else {
        Some(value)
    }
}

fn has_method(target: Option<&JsValue>, name: &str) -> bool {
    target
        .and_then(|t| property(t, name))
        .is_some_and(|f| f.is_function())
}

fn call_method(target: &JsValue, name: &'static str, args: &Array) -> Result<JsValue, HostError> {
    let method = property(target, name)
        .and_then(|f| f.dyn_into::<Function>().ok())
        .ok_or(HostError::Unavailable(name))?;
    Reflect::apply(&method, target, args).map_err(js_error)
}

fn js_error(value: JsValue) -> HostError {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"));
    HostError::Js(message)
}

fn window_object() -> Option<JsValue> {
    web_sys::window().map(JsValue::from)
}

fn webapp() -> Option<JsValue> {
    let telegram = property(&window_object()?, "Telegram")?;
    property(&telegram, "WebApp")
}

fn require_webapp() -> Result<JsValue, HostError> {
    webapp().ok_or(HostError::Unavailable("Telegram.WebApp"))
}

fn clipboard() -> Option<JsValue> {
    let navigator = property(&window_object()?, "navigator")?;
    property(&navigator, "clipboard")
}

fn adsgram() -> Option<JsValue> {
    property(&window_object()?, "Adsgram")
}

fn create_audio(src: &str, volume: f64) -> Option<HtmlAudioElement> {
    match HtmlAudioElement::new_with_src(src) {
        Ok(el) => {
            el.set_volume(volume);
            el.set_preload("auto");
            el.load();
            Some(el)
        }
        Err(e) => {
            log::debug!("audio creation failed: {}", js_error(e));
            None
        }
    }
}

/// The real host inside Telegram (or a plain browser tab).
pub struct TelegramHost {
    tap_audio: Option<HtmlAudioElement>,
    crunch_audio: Option<HtmlAudioElement>,
}

impl TelegramHost {
    pub fn new(audio: &AudioConfig) -> Self {
        Self {
            tap_audio: create_audio(&audio.src, audio.tap_volume),
            crunch_audio: create_audio(&audio.src, audio.crunch_volume),
        }
    }
}

impl Host for TelegramHost {
    fn capabilities(&self) -> CapabilityState {
        let app = webapp();
        let haptics = app.as_ref().and_then(|a| property(a, "HapticFeedback"));
        CapabilityState {
            webapp: app.is_some(),
            haptics: has_method(haptics.as_ref(), "impactOccurred"),
            share: has_method(app.as_ref(), "shareToStory"),
            clipboard: has_method(clipboard().as_ref(), "writeText"),
            ads: has_method(adsgram().as_ref(), "init"),
            audio: self.tap_audio.is_some() && self.crunch_audio.is_some(),
        }
    }

    fn ready(&self) -> Result<(), HostError> {
        call_method(&require_webapp()?, "ready", &Array::new()).map(drop)
    }

    fn expand(&self) -> Result<(), HostError> {
        call_method(&require_webapp()?, "expand", &Array::new()).map(drop)
    }

    fn haptic_impact(&self, intensity: Intensity) -> Result<(), HostError> {
        let haptics = property(&require_webapp()?, "HapticFeedback")
            .ok_or(HostError::Unavailable("HapticFeedback"))?;
        let style = JsValue::from_str(intensity.as_str());
        call_method(&haptics, "impactOccurred", &Array::of1(&style)).map(drop)
    }

    fn play_cue(&self, cue: Cue) -> Result<(), HostError> {
        let el = match cue {
            Cue::Tap => self.tap_audio.as_ref(),
            Cue::Crunch => self.crunch_audio.as_ref(),
        }
        .ok_or(HostError::Unavailable("audio"))?;
        el.set_current_time(0.0);
        let promise = el.play().map_err(js_error)?;
        // Autoplay policies reject the promise; that is logged, never awaited.
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::debug!("{cue:?} audio play rejected: {}", js_error(e));
            }
        });
        Ok(())
    }

    fn theme_params(&self) -> Result<ThemeParams, HostError> {
        let params = property(&require_webapp()?, "themeParams")
            .ok_or(HostError::Unavailable("themeParams"))?;
        let color = |key: &str| {
            property(&params, key)
                .and_then(|v| v.as_string())
                .filter(|s| !s.is_empty())
        };
        Ok(ThemeParams {
            bg_color: color("bg_color"),
            text_color: color("text_color"),
            button_color: color("button_color"),
            button_text_color: color("button_text_color"),
        })
    }

    fn set_theme_variable(&self, name: &str, value: &str) -> Result<(), HostError> {
        let root = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
            .ok_or(HostError::Unavailable("document"))?;
        let root: HtmlElement = root
            .dyn_into()
            .map_err(|_| HostError::Unavailable("document style"))?;
        root.style().set_property(name, value).map_err(js_error)
    }

    fn share_to_story(&self, payload: &SharePayload) -> Result<(), HostError> {
        let app = require_webapp()?;
        let params = Object::new();
        Reflect::set(
            &params,
            &JsValue::from_str("text"),
            &JsValue::from_str(&payload.text),
        )
        .map_err(js_error)?;
        if let Some(link) = &payload.link {
            Reflect::set(&params, &JsValue::from_str("url"), &JsValue::from_str(link))
                .map_err(js_error)?;
        }
        call_method(&app, "shareToStory", &Array::of1(&params)).map(drop)
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), HostError> {
        let clipboard = clipboard().ok_or(HostError::Unavailable("clipboard"))?;
        let pending = call_method(&clipboard, "writeText", &Array::of1(&JsValue::from_str(text)))?;
        JsFuture::from(Promise::resolve(&pending))
            .await
            .map_err(js_error)?;
        Ok(())
    }

    async fn show_ad(&self, block_id: &str) -> Result<(), HostError> {
        let sdk = adsgram().ok_or(HostError::Unavailable("Adsgram"))?;
        let params = Object::new();
        Reflect::set(
            &params,
            &JsValue::from_str("blockId"),
            &JsValue::from_str(block_id),
        )
        .map_err(js_error)?;
        let controller = call_method(&sdk, "init", &Array::of1(&params))?;
        let shown = call_method(&controller, "show", &Array::new())?;
        JsFuture::from(Promise::resolve(&shown))
            .await
            .map_err(js_error)?;
        Ok(())
    }
}

/// Probes a candidate by loading it into an off-screen `<img>`.
pub struct ImageProbe;

impl AssetProbe for ImageProbe {
    async fn exists(&self, locator: &AssetLocator) -> bool {
        let Ok(img) = HtmlImageElement::new() else {
            return false;
        };
        let loaded = Promise::new(&mut |resolve: Function, _reject: Function| {
            let on_load = {
                let resolve = resolve.clone();
                Closure::once_into_js(move || {
                    let _ = resolve.call1(&JsValue::NULL, &JsValue::TRUE);
                })
            };
            let on_error = Closure::once_into_js(move || {
                let _ = resolve.call1(&JsValue::NULL, &JsValue::FALSE);
            });
            img.set_onload(Some(on_load.unchecked_ref()));
            img.set_onerror(Some(on_error.unchecked_ref()));
        });
        img.set_src(locator.as_str());
        matches!(JsFuture::from(loaded).await, Ok(v) if v.is_truthy())
    }
}
