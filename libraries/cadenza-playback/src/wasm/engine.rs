//! `MediaEngine` over an HTML media element

use crate::{
    EngineEvent, MediaEngine, PlayRequest, PlaybackError, Result, Subscription, SubscriptionSet,
    Track,
};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, EventTarget, HtmlMediaElement};

/// Receives engine observations (the player's dispatch function)
pub type EventSink = Rc<dyn Fn(EngineEvent)>;

/// `HTMLMediaElement.readyState` value once duration is available
const HAVE_METADATA: u16 = 1;

/// Engine adapter for `<audio>` and `<video>`
pub struct WebMediaEngine {
    element: HtmlMediaElement,
    sink: EventSink,
    listeners: SubscriptionSet,
}

impl WebMediaEngine {
    /// Register `timeupdate`, `loadedmetadata` and `ended` listeners
    pub fn attach(element: HtmlMediaElement, sink: EventSink) -> Result<Self> {
        let mut listeners = SubscriptionSet::new();

        let el = element.clone();
        let s = Rc::clone(&sink);
        listeners.push(listen(&element, "timeupdate", move |_| {
            s(EngineEvent::TimeUpdate(el.current_time()));
        })?);

        let el = element.clone();
        let s = Rc::clone(&sink);
        listeners.push(listen(&element, "loadedmetadata", move |_| {
            s(EngineEvent::MetadataLoaded(el.duration()));
        })?);

        let s = Rc::clone(&sink);
        listeners.push(listen(&element, "ended", move |_| {
            s(EngineEvent::Ended);
        })?);

        Ok(Self {
            element,
            sink,
            listeners,
        })
    }

    pub fn element(&self) -> &HtmlMediaElement {
        &self.element
    }
}

impl MediaEngine for WebMediaEngine {
    fn load(&mut self, track: &Track) {
        // Re-assigning the same src restarts the load algorithm; keep the
        // element and its metadata, only rewind
        if self.element.get_attribute("src").as_deref() == Some(track.media.as_str()) {
            self.element.set_current_time(0.0);
        } else {
            self.element.set_src(&track.media);
        }
    }

    /// `loadedmetadata` does not fire again for an already loaded source
    fn loaded_duration(&self) -> Option<f64> {
        (self.element.ready_state() >= HAVE_METADATA).then(|| self.element.duration())
    }

    fn play(&mut self, request: PlayRequest) -> Result<()> {
        let promise = self
            .element
            .play()
            .map_err(|e| PlaybackError::PlayRejected(describe(&e)))?;

        let sink = Rc::clone(&self.sink);
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                sink(EngineEvent::PlayRejected {
                    request,
                    reason: describe(&e),
                });
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        if let Err(e) = self.element.pause() {
            tracing::warn!("Media element refused to pause: {}", describe(&e));
        }
    }

    fn seek(&mut self, position: f64) {
        self.element.set_current_time(position);
    }

    fn set_volume(&mut self, volume: f64) {
        self.element.set_volume(volume);
    }

    fn set_muted(&mut self, muted: bool) {
        self.element.set_muted(muted);
    }

    fn detach(&mut self) {
        self.listeners.clear();
    }
}

/// Add a DOM listener, returning the guard that removes it
///
/// The closure is freed on a later microtask, so a handler may release its
/// own registration while it runs.
pub(crate) fn listen(
    target: &EventTarget,
    event: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Result<Subscription> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|e| PlaybackError::Engine(describe(&e)))?;

    let target = target.clone();
    Ok(Subscription::new(move || {
        target
            .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .ok();
        wasm_bindgen_futures::spawn_local(async move {
            drop(closure);
        });
    }))
}

/// Best-effort message for a JS error value
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}
