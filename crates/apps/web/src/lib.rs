use std::cell::RefCell;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use foundation::LonLat;
use labs::StatePatch;
use runtime::{InteractionEvent, Publication, Session, SessionConfig};
use serde::Serialize;
use wasm_bindgen::prelude::*;

mod surface;
use surface::BrowserSurface;

// Guard to prevent double-initialization of global state (relevant during hot reload).
static INITIALIZED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_SET: OnceLock<()> = OnceLock::new();

struct WebState {
    session: Session,
    surface: BrowserSurface,
}

thread_local! {
    static STATE: RefCell<Option<WebState>> = const { RefCell::new(None) };
}

fn init_panic_hook() {
    PANIC_HOOK_SET.get_or_init(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = info.to_string();
            web_sys::console::error_1(&JsValue::from_str(&msg));
        }));
    });
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    let msg = err.to_string();
    web_sys::console::warn_1(&JsValue::from_str(&msg));
    JsValue::from_str(&msg)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(js_err)?;
    js_sys::JSON::parse(&json)
}

/// TLS access that reports a missing session instead of panicking.
fn with_state<F, R>(f: F) -> Result<R, JsValue>
where
    F: FnOnce(&mut WebState) -> Result<R, JsValue>,
{
    STATE
        .try_with(|cell| {
            let mut slot = cell.borrow_mut();
            let state = slot
                .as_mut()
                .ok_or_else(|| JsValue::from_str("session not started"))?;
            f(state)
        })
        .map_err(js_err)?
}

/// Hands a publication to the browser surface and returns it to the caller.
fn publish(state: &mut WebState, publication: Option<Publication>) -> Result<JsValue, JsValue> {
    match publication {
        Some(p) => {
            p.deliver(&mut state.surface);
            to_js(&p)
        }
        None => Ok(JsValue::NULL),
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Avoid double-initialization (can happen during hot-reload edge cases).
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    init_panic_hook();
    let session = Session::with_builtin_labs().map_err(js_err)?;
    STATE
        .try_with(|cell| {
            *cell.borrow_mut() = Some(WebState {
                session,
                surface: BrowserSurface::default(),
            });
        })
        .map_err(js_err)?;
    Ok(())
}

/// Lab metadata in display order, for the selector.
#[wasm_bindgen]
pub fn list_labs() -> Result<JsValue, JsValue> {
    with_state(|s| {
        let metas: Vec<_> = s.session.registry().entries().iter().map(|e| e.meta).collect();
        to_js(&metas)
    })
}

#[wasm_bindgen]
pub fn get_active_lab() -> Option<String> {
    with_state(|s| Ok(s.session.active_id().map(str::to_string)))
        .ok()
        .flatten()
}

#[wasm_bindgen]
pub fn select_lab(id: &str) -> Result<JsValue, JsValue> {
    with_state(|s| {
        let p = s.session.select(id).map_err(js_err)?;
        publish(s, Some(p))
    })
}

#[wasm_bindgen]
pub fn deselect_lab() -> Result<(), JsValue> {
    with_state(|s| {
        s.session.deselect();
        Ok(())
    })
}

/// Map click in WGS84 degrees. Returns `null` when no lab is selected.
#[wasm_bindgen]
pub fn map_click(lon: f64, lat: f64) -> Result<JsValue, JsValue> {
    with_state(|s| {
        let p = s.session.click(LonLat::new(lon, lat)).map_err(js_err)?;
        publish(s, p)
    })
}

/// Panel edit as a JSON object of field -> value.
#[wasm_bindgen]
pub fn edit_panel(patch_json: &str) -> Result<JsValue, JsValue> {
    let patch: StatePatch = serde_json::from_str(patch_json).map_err(js_err)?;
    with_state(|s| {
        let p = s.session.edit(&patch).map_err(js_err)?;
        publish(s, Some(p))
    })
}

#[wasm_bindgen]
pub fn reset_lab() -> Result<JsValue, JsValue> {
    with_state(|s| {
        let p = s.session.reset().map_err(js_err)?;
        publish(s, Some(p))
    })
}

/// Any interaction in its JSON form, e.g. `{"click": [139.7, 35.7]}`.
#[wasm_bindgen]
pub fn handle_event(event_json: &str) -> Result<JsValue, JsValue> {
    let event: InteractionEvent = serde_json::from_str(event_json).map_err(js_err)?;
    with_state(|s| {
        let p = s.session.handle(event).map_err(js_err)?;
        publish(s, p)
    })
}

#[wasm_bindgen]
pub fn apply_config(config_json: &str) -> Result<JsValue, JsValue> {
    let config = SessionConfig::from_json_str(config_json).map_err(js_err)?;
    with_state(|s| {
        let p = s.session.apply_config(&config).map_err(js_err)?;
        publish(s, p)
    })
}

/// Feature collections last delivered to the map, in layer order.
#[wasm_bindgen]
pub fn get_layers() -> Result<JsValue, JsValue> {
    with_state(|s| to_js(&s.surface.layers))
}

#[wasm_bindgen]
pub fn get_panel() -> Result<JsValue, JsValue> {
    with_state(|s| to_js(&s.surface.panel))
}

#[wasm_bindgen]
pub fn get_event_log() -> Result<JsValue, JsValue> {
    with_state(|s| to_js(&s.session.events()))
}
