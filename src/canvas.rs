//! HTML Canvas front end for WASM environments.
//!
//! [`EffectsCanvas`] wraps an [`EffectsRuntime`] and wires it to the page:
//! particles are painted into a full-window canvas, the animated cursor is
//! applied through an injected page-wide `cursor` rule, cursor files are
//! fetched from `<base_path>cursor/`, and settings persist in `localStorage`.
//!
//! # Feature Flag
//!
//! This module is only available with the `canvas` feature enabled:
//!
//! ```toml
//! [dependencies]
//! star-effects = { version = "0.1", features = ["canvas"] }
//! ```
//!
//! # Example (JavaScript/TypeScript)
//!
//! ```javascript
//! import init, { EffectsCanvas } from 'star-effects';
//!
//! await init();
//!
//! const canvas = document.getElementById('effects');
//! const fx = new EffectsCanvas(canvas, '/seffects/', 42, performance.now());
//!
//! addEventListener('mousemove', e => fx.pointerMove(e.clientX, e.clientY, performance.now()));
//! addEventListener('click', e => fx.click(e.clientX, e.clientY, performance.now()));
//!
//! const frame = now => {
//!   fx.tick(now);
//!   fx.render(now);
//!   fx.pollCursor(now);
//!   requestAnimationFrame(frame);
//! };
//! requestAnimationFrame(frame);
//!
//! fx.applySettingsJson('{"colorMode":"rainbow","cursor":"cyan.ani"}', performance.now());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::warn;
use resvg::tiny_skia::{Color, Pixmap};
use wasm_bindgen::Clamped;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, ImageData, Response, Storage,
};

use crate::cursor::CursorPresenter;
use crate::error::LoadError;
use crate::icon::{DecodedFrame, Hotspot};
use crate::runtime::{EffectsRuntime, SettingsStore};
use crate::settings::SettingsPatch;

/// Id of the `<style>` element carrying the cursor rule.
const CURSOR_STYLE_ID: &str = "star-effects-cursor";

// ============================================================================
// Host collaborators
// ============================================================================

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

/// A rule applying the PNG as the cursor of every element on the page.
fn cursor_rule(png: &[u8], hotspot: Hotspot) -> String {
    format!(
        "* {{ cursor: url(data:image/png;base64,{}) {} {}, auto !important; }}",
        STANDARD.encode(png),
        hotspot.x,
        hotspot.y
    )
}

/// Presents cursor frames as a data-URL `cursor` rule applied to every
/// element on the page.
struct CssCursor;

impl CssCursor {
    fn style_element(document: &Document) -> Result<Element, JsValue> {
        if let Some(existing) = document.get_element_by_id(CURSOR_STYLE_ID) {
            return Ok(existing);
        }
        let style = document.create_element("style")?;
        style.set_id(CURSOR_STYLE_ID);
        let head = document
            .head()
            .ok_or_else(|| JsValue::from_str("document has no <head>"))?;
        head.append_child(&style)?;
        Ok(style)
    }
}

impl CursorPresenter for CssCursor {
    fn present(&mut self, frame: &DecodedFrame, hotspot: Hotspot) {
        let png = match frame.png_bytes() {
            Ok(png) => png,
            Err(e) => {
                warn!("canvas: failed to encode cursor frame: {}", e);
                return;
            }
        };
        let rule = cursor_rule(&png, hotspot);
        let Some(document) = document() else {
            warn!("canvas: no document to apply the cursor to");
            return;
        };
        match Self::style_element(&document) {
            Ok(style) => style.set_text_content(Some(&rule)),
            Err(e) => warn!("canvas: failed to install cursor style: {:?}", e),
        }
    }

    fn clear(&mut self) {
        let Some(style) = document().and_then(|d| d.get_element_by_id(CURSOR_STYLE_ID)) else {
            return;
        };
        if let Some(parent) = style.parent_node() {
            if let Err(e) = parent.remove_child(&style) {
                warn!("canvas: failed to remove cursor style: {:?}", e);
            }
        }
    }
}

/// `localStorage`, or nothing if the page has no storage.
struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    fn new() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            warn!("canvas: localStorage unavailable, settings will not persist");
        }
        Self { storage }
    }
}

impl SettingsStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            if storage.set_item(key, value).is_err() {
                warn!("canvas: failed to write {} to localStorage", key);
            }
        }
    }
}

// ============================================================================
// Cursor fetching
// ============================================================================

fn js_reason(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now())
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, LoadError> {
    let window = web_sys::window().ok_or_else(|| LoadError::io(url, "no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| LoadError::io(url, js_reason(&e)))?
        .dyn_into()
        .map_err(|_| LoadError::io(url, "fetch did not resolve to a Response"))?;
    if !response.ok() {
        return Err(LoadError::io(url, format!("HTTP {}", response.status())));
    }
    let body = response
        .array_buffer()
        .map_err(|e| LoadError::io(url, js_reason(&e)))?;
    let buffer = JsFuture::from(body)
        .await
        .map_err(|e| LoadError::io(url, js_reason(&e)))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Fetches the runtime's pending cursor file, then any fallback it queues.
fn fetch_pending_cursor(runtime: &Rc<RefCell<EffectsRuntime>>) {
    let Some(request) = runtime.borrow_mut().take_cursor_request() else {
        return;
    };
    let runtime = Rc::clone(runtime);
    spawn_local(async move {
        let fetched = fetch_bytes(&request.url).await;
        runtime
            .borrow_mut()
            .finish_cursor_load(request, fetched, performance_now());
        fetch_pending_cursor(&runtime);
    });
}

// ============================================================================
// EffectsCanvas
// ============================================================================

/// Cursor effects bound to an HTML canvas element.
#[wasm_bindgen]
pub struct EffectsCanvas {
    runtime: Rc<RefCell<EffectsRuntime>>,
    canvas: HtmlCanvasElement,
    pixmap: Pixmap,
}

#[wasm_bindgen]
impl EffectsCanvas {
    /// Creates the effects, restores persisted settings and starts fetching
    /// the stored cursor file.
    ///
    /// # Arguments
    ///
    /// * `canvas` - The overlay canvas particles are painted into
    /// * `base_path` - Directory cursor file names are resolved against
    /// * `seed` - Seed for all particle jitter
    /// * `now` - Current time in milliseconds
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        base_path: &str,
        seed: u32,
        now: f64,
    ) -> Result<EffectsCanvas, JsError> {
        let pixmap = Pixmap::new(canvas.width().max(1), canvas.height().max(1))
            .ok_or_else(|| JsError::new("Failed to allocate pixmap"))?;
        let runtime = Rc::new(RefCell::new(EffectsRuntime::with_deferred_cursor(
            Box::new(LocalStore::new()),
            Box::new(CssCursor),
            base_path,
            u64::from(seed),
            now,
        )));
        fetch_pending_cursor(&runtime);
        Ok(Self {
            runtime,
            canvas,
            pixmap,
        })
    }

    /// Names of the selectable cursor files.
    #[wasm_bindgen(js_name = "cursorAssets")]
    pub fn cursor_assets() -> js_sys::Array {
        EffectsRuntime::cursor_assets()
            .iter()
            .map(|name| JsValue::from_str(name))
            .collect()
    }

    // ---- Settings ----

    /// Returns the settings in effect as a JSON string.
    #[wasm_bindgen(js_name = "getSettingsJson")]
    pub fn get_settings_json(&self) -> Result<String, JsError> {
        self.runtime
            .borrow()
            .settings()
            .to_json()
            .map_err(|e| JsError::new(&format!("Failed to serialize settings: {}", e)))
    }

    /// Returns the default settings as a JSON string.
    #[wasm_bindgen(js_name = "getDefaultsJson")]
    pub fn get_defaults_json() -> Result<String, JsError> {
        EffectsRuntime::defaults()
            .to_json()
            .map_err(|e| JsError::new(&format!("Failed to serialize settings: {}", e)))
    }

    /// Applies and persists a partial settings object given as JSON.
    #[wasm_bindgen(js_name = "applySettingsJson")]
    pub fn apply_settings_json(&mut self, json: &str, now: f64) -> Result<(), JsError> {
        let patch = SettingsPatch::from_json(json)
            .map_err(|e| JsError::new(&format!("Failed to parse settings: {}", e)))?;
        self.runtime.borrow_mut().apply_settings(&patch, now);
        fetch_pending_cursor(&self.runtime);
        Ok(())
    }

    #[wasm_bindgen(js_name = "isActive")]
    pub fn is_active(&self) -> bool {
        self.runtime.borrow().is_active()
    }

    /// Stops the effects, clears the canvas and restores the default pointer.
    pub fn destroy(&mut self) -> Result<(), JsError> {
        self.runtime.borrow_mut().destroy();
        self.pixmap.fill(Color::TRANSPARENT);
        self.context()?.clear_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        );
        Ok(())
    }

    // ---- Input ----

    #[wasm_bindgen(js_name = "pointerMove")]
    pub fn pointer_move(&mut self, x: f32, y: f32, now: f64) {
        self.runtime.borrow_mut().pointer_move(x, y, now);
    }

    /// Returns the number of burst particles spawned.
    pub fn click(&mut self, x: f32, y: f32, now: f64) -> u32 {
        self.runtime.borrow_mut().click(x, y, now) as u32
    }

    // ---- Clocks ----

    pub fn tick(&mut self, now: f64) {
        self.runtime.borrow_mut().tick(now);
    }

    #[wasm_bindgen(js_name = "pollCursor")]
    pub fn poll_cursor(&mut self, now: f64) -> bool {
        self.runtime.borrow_mut().poll_cursor(now)
    }

    #[wasm_bindgen(js_name = "nextCursorDeadline")]
    pub fn next_cursor_deadline(&self) -> Option<f64> {
        self.runtime.borrow().next_cursor_deadline()
    }

    // ---- Rendering ----

    /// Resizes the canvas and its backing pixmap.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), JsError> {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.pixmap = Pixmap::new(width.max(1), height.max(1))
            .ok_or_else(|| JsError::new("Failed to allocate pixmap"))?;
        Ok(())
    }

    /// Paints the current particles into the canvas.
    pub fn render(&mut self, now: f64) -> Result<(), JsError> {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        self.pixmap.fill(Color::TRANSPARENT);
        self.runtime.borrow_mut().render(&mut self.pixmap, now);

        // ImageData expects straight alpha.
        let raw_pixels: Vec<u8> = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        let image_data =
            ImageData::new_with_u8_clamped_array_and_sh(Clamped(&raw_pixels), width, height)
                .map_err(|_| JsError::new("Failed to create ImageData"))?;

        self.context()?
            .put_image_data(&image_data, 0.0, 0.0)
            .map_err(|_| JsError::new("Failed to put image data"))?;
        Ok(())
    }
}

impl EffectsCanvas {
    fn context(&self) -> Result<CanvasRenderingContext2d, JsError> {
        self.canvas
            .get_context("2d")
            .map_err(|_| JsError::new("Failed to get 2d context"))?
            .ok_or_else(|| JsError::new("Canvas 2d context is null"))?
            .dyn_into()
            .map_err(|_| JsError::new("Failed to cast to CanvasRenderingContext2d"))
    }
}

// ============================================================================
// Tests
// ============================================================================
