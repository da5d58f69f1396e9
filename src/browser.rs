//! Thin wrappers over the browser capabilities the page touches directly.
//! Nothing here is reachable off the `wasm32` target at runtime.

use gloo_events::{EventListener, EventListenerOptions};
use js_sys::{Function, Object, Promise, Reflect};
use log::{info, warn};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, MediaQueryList, Window};

use crate::theme::Theme;

const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("no browser window available")]
    NoWindow,
    #[error("browser call failed: {0}")]
    Js(String),
}

impl PlatformError {
    fn js(err: JsValue) -> Self {
        Self::Js(format!("{err:?}"))
    }
}

fn window() -> Result<Window, PlatformError> {
    web_sys::window().ok_or(PlatformError::NoWindow)
}

pub fn is_online() -> bool {
    web_sys::window()
        .map(|window| window.navigator().on_line())
        .unwrap_or(true)
}

pub fn reload_page() -> Result<(), PlatformError> {
    window()?.location().reload().map_err(PlatformError::js)
}

pub fn current_url() -> Result<String, PlatformError> {
    window()?.location().href().map_err(PlatformError::js)
}

pub fn dark_scheme_query() -> Option<MediaQueryList> {
    web_sys::window()?.match_media(DARK_SCHEME_QUERY).ok().flatten()
}

pub fn system_prefers_dark() -> bool {
    dark_scheme_query().map_or(false, |query| query.matches())
}

/// Writes the already-resolved theme to the root element's `data-theme`.
pub fn apply_theme(effective: Theme) -> Result<(), PlatformError> {
    let root = window()?
        .document()
        .and_then(|document| document.document_element())
        .ok_or(PlatformError::NoWindow)?;
    root.set_attribute("data-theme", effective.as_str())
        .map_err(PlatformError::js)
}

pub async fn register_service_worker(script_url: &str) {
    let Ok(window) = window() else {
        return;
    };
    let navigator = window.navigator();
    if !Reflect::has(&navigator, &JsValue::from_str("serviceWorker")).unwrap_or(false) {
        info!("Service workers unsupported; skipping offline cache");
        return;
    }

    let registration = navigator.service_worker().register(script_url);
    match JsFuture::from(registration).await {
        Ok(_) => info!("Service worker registered from {}", script_url),
        Err(err) => warn!("SW registration failed: {:?}", err),
    }
}

/// A deferred `beforeinstallprompt` event, held until the visitor asks.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallPrompt(Event);

impl InstallPrompt {
    /// Captures the event and suppresses the browser's own mini-infobar.
    pub fn capture(event: &Event) -> Self {
        event.prevent_default();
        Self(event.clone())
    }

    pub fn prompt(&self) -> Result<(), PlatformError> {
        let prompt = method(&self.0, "prompt")
            .ok_or_else(|| PlatformError::Js("install event has no prompt()".to_owned()))?;
        prompt.call0(&self.0).map_err(PlatformError::js)?;
        Ok(())
    }
}

/// `beforeinstallprompt` must be heard by a non-passive listener, otherwise
/// `prevent_default` is ignored and the browser shows its own banner.
pub fn install_prompt_listener_options() -> EventListenerOptions {
    EventListenerOptions::enable_prevent_default()
}

pub fn listen_for_install_prompt<F>(window: &Window, mut on_prompt: F) -> EventListener
where
    F: FnMut(InstallPrompt) + 'static,
{
    EventListener::new_with_options(
        window,
        "beforeinstallprompt",
        install_prompt_listener_options(),
        move |event| on_prompt(InstallPrompt::capture(event)),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Copied,
    Unsupported,
}

/// Native share sheet when there is one, else the clipboard.
pub async fn share_page(title: &str) -> Result<ShareOutcome, PlatformError> {
    let window = window()?;
    let url = current_url()?;
    let navigator: JsValue = window.navigator().into();

    if let Some(share) = method(&navigator, "share") {
        let data = Object::new();
        Reflect::set(&data, &"title".into(), &title.into()).map_err(PlatformError::js)?;
        Reflect::set(&data, &"url".into(), &url.as_str().into()).map_err(PlatformError::js)?;
        await_call(share.call1(&navigator, &data)).await?;
        return Ok(ShareOutcome::Shared);
    }

    let clipboard = Reflect::get(&navigator, &"clipboard".into()).map_err(PlatformError::js)?;
    if let Some(write_text) = method(&clipboard, "writeText") {
        await_call(write_text.call1(&clipboard, &url.as_str().into())).await?;
        return Ok(ShareOutcome::Copied);
    }

    Ok(ShareOutcome::Unsupported)
}

fn method(target: &JsValue, name: &str) -> Option<Function> {
    if target.is_undefined() || target.is_null() {
        return None;
    }
    Reflect::get(target, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

async fn await_call(result: Result<JsValue, JsValue>) -> Result<JsValue, PlatformError> {
    let promise: Promise = result
        .map_err(PlatformError::js)?
        .dyn_into()
        .map_err(PlatformError::js)?;
    JsFuture::from(promise).await.map_err(PlatformError::js)
}
