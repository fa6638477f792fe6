//! Browser display helpers
//!
//! Fullscreen with the vendor-prefixed fallbacks, and the mobile landscape
//! rule that enters it automatically after an orientation change.

/// Time for the viewport to settle after an orientation change
pub const ORIENTATION_SETTLE_MS: i32 = 300;

const MOBILE_MARKERS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Phones and tablets, judged by the user agent string
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_MARKERS.iter().any(|marker| ua.contains(marker))
}

pub fn is_landscape(width: f64, height: f64) -> bool {
    width > height
}

/// Whether an orientation change should take the page fullscreen
pub fn wants_auto_fullscreen(mobile: bool, width: f64, height: f64, fullscreen: bool) -> bool {
    mobile && !fullscreen && is_landscape(width, height)
}

#[cfg(target_arch = "wasm32")]
pub use web::{is_fullscreen, request_fullscreen, viewport_size};

#[cfg(target_arch = "wasm32")]
mod web {
    use js_sys::{Function, Promise, Reflect};
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Window};

    const REQUEST_METHODS: [&str; 4] = [
        "requestFullscreen",
        "webkitRequestFullscreen",
        "mozRequestFullScreen",
        "msRequestFullscreen",
    ];
    const ELEMENT_PROPS: [&str; 2] = ["fullscreenElement", "webkitFullscreenElement"];

    /// Ask the browser to show the whole page fullscreen
    pub fn request_fullscreen(document: &Document) {
        let Some(root) = document.document_element() else {
            return;
        };
        for name in REQUEST_METHODS {
            let Ok(method) = Reflect::get(&root, &JsValue::from_str(name)) else {
                continue;
            };
            let Some(method) = method.dyn_ref::<Function>() else {
                continue;
            };
            match method.call0(&root) {
                Ok(ret) => {
                    if let Ok(promise) = ret.dyn_into::<Promise>() {
                        let on_reject = Closure::once(|err: JsValue| {
                            log::info!("Fullscreen request failed: {err:?}");
                        });
                        let _ = promise.catch(&on_reject);
                        on_reject.forget();
                    }
                }
                Err(e) => log::info!("Fullscreen request failed: {e:?}"),
            }
            return;
        }
        log::warn!("Fullscreen API not available");
    }

    pub fn is_fullscreen(document: &Document) -> bool {
        ELEMENT_PROPS.iter().any(|prop| {
            Reflect::get(document, &JsValue::from_str(prop))
                .map(|el| !el.is_null() && !el.is_undefined())
                .unwrap_or(false)
        })
    }

    /// Window inner size in CSS pixels
    pub fn viewport_size(window: &Window) -> (f64, f64) {
        let width = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let height = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        (width, height)
    }
}
