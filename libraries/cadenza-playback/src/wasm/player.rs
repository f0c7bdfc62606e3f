//! WASM-compatible transport wrapper

use super::engine::{listen, EventSink, WebMediaEngine};
use super::types::WasmTrack;
use crate::{
    BarGeometry, EngineEvent, PlaybackError, PlayerConfig, Playlist, Subscription,
    SubscriptionSet, Track, TransportController, TransportEvent,
};
use js_sys::Function;
use std::cell::{OnceCell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlMediaElement, MouseEvent};

type Transport = TransportController<WebMediaEngine>;

/// State shared between the JS-facing wrapper and DOM listeners
struct Shared {
    transport: RefCell<Transport>,

    // Engine events that arrived while the transport was borrowed
    inbox: RefCell<VecDeque<EngineEvent>>,

    on_event: RefCell<Option<Function>>,
}

impl Shared {
    fn dispatch(&self, event: EngineEvent) {
        self.inbox.borrow_mut().push_back(event);
        self.pump();
    }

    /// Apply queued engine events and deliver transport events to JS
    ///
    /// A re-entrant call returns early; the outer call drains the inbox.
    fn pump(&self) {
        let Ok(mut transport) = self.transport.try_borrow_mut() else {
            return;
        };
        loop {
            let next = self.inbox.borrow_mut().pop_front();
            match next {
                Some(event) => transport.handle_engine_event(event),
                None => break,
            }
        }
        let events = transport.drain_events();
        drop(transport);
        self.deliver(events);
    }

    fn deliver(&self, events: Vec<TransportEvent>) {
        let callback = self.on_event.borrow().clone();
        let Some(callback) = callback else {
            return;
        };
        for event in events {
            match serde_wasm_bindgen::to_value(&event) {
                Ok(value) => {
                    callback.call1(&JsValue::NULL, &value).ok();
                }
                Err(e) => tracing::warn!("Failed to serialize {} event: {}", event.name(), e),
            }
        }
    }
}

/// WASM-compatible player
///
/// Wraps the transport controller with a JavaScript-friendly API. Hand it
/// the media element, the progress-bar element and the playlist; wire the
/// bar's `mousedown` to `scrubStart`. Window-level drag listeners are
/// managed here.
#[wasm_bindgen]
pub struct WasmPlayer {
    shared: Rc<Shared>,
    bar: Element,
}

#[wasm_bindgen]
impl WasmPlayer {
    /// Create a player
    ///
    /// `playlist` is an array of `{ id, title, artist, artwork?, media }`;
    /// `config` is an optional `PlayerConfig`-shaped object.
    #[wasm_bindgen(constructor)]
    pub fn new(
        element: HtmlMediaElement,
        bar: Element,
        playlist: JsValue,
        config: JsValue,
    ) -> Result<WasmPlayer, JsValue> {
        console_error_panic_hook::set_once();

        let tracks: Vec<Track> = serde_wasm_bindgen::from_value(playlist)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse playlist: {}", e)))?;
        let playlist = Playlist::new(tracks).map_err(to_js)?;

        let config: PlayerConfig = if config.is_undefined() || config.is_null() {
            PlayerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?
        };

        // Listeners are registered before the shared state exists
        let slot: Rc<OnceCell<Weak<Shared>>> = Rc::new(OnceCell::new());
        let sink: EventSink = {
            let slot = Rc::clone(&slot);
            Rc::new(move |event| {
                if let Some(shared) = slot.get().and_then(Weak::upgrade) {
                    shared.dispatch(event);
                }
            })
        };

        let engine = WebMediaEngine::attach(element, sink).map_err(to_js)?;
        let transport = TransportController::new(engine, playlist, config).map_err(to_js)?;

        let shared = Rc::new(Shared {
            transport: RefCell::new(transport),
            inbox: RefCell::new(VecDeque::new()),
            on_event: RefCell::new(None),
        });
        slot.set(Rc::downgrade(&shared)).ok();

        Ok(Self { shared, bar })
    }

    // ===== Playback Control =====

    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&self) {
        self.with_transport(|t| t.toggle_play_pause());
    }

    pub fn play(&self) {
        self.with_transport(|t| t.play());
    }

    pub fn pause(&self) {
        self.with_transport(|t| t.pause());
    }

    #[wasm_bindgen(js_name = nextTrack)]
    pub fn next_track(&self) {
        self.with_transport(|t| t.next_track());
    }

    #[wasm_bindgen(js_name = previousTrack)]
    pub fn previous_track(&self) {
        self.with_transport(|t| t.previous_track());
    }

    /// Play the playlist entry at `index`
    #[wasm_bindgen(js_name = selectTrack)]
    pub fn select_track(&self, index: usize) -> Result<(), JsValue> {
        self.with_transport(|t| t.select_track(index)).map_err(to_js)
    }

    // ===== Seeking =====

    /// Seek to position in seconds
    pub fn seek(&self, position_secs: f64) {
        self.with_transport(|t| t.seek(position_secs));
    }

    /// Skip ahead (configured amount when omitted)
    #[wasm_bindgen(js_name = skipForward)]
    pub fn skip_forward(&self, seconds: Option<f64>) {
        self.with_transport(|t| match seconds {
            Some(s) => t.skip_forward(s),
            None => t.skip_forward_default(),
        });
    }

    /// Skip back (configured amount when omitted)
    pub fn rewind(&self, seconds: Option<f64>) {
        self.with_transport(|t| match seconds {
            Some(s) => t.rewind(s),
            None => t.rewind_default(),
        });
    }

    /// `mousedown` on the progress bar
    ///
    /// Starts a drag and registers window `mousemove`/`mouseup` listeners
    /// that live exactly as long as the drag.
    #[wasm_bindgen(js_name = scrubStart)]
    pub fn scrub_start(&self, event: &MouseEvent) -> Result<bool, JsValue> {
        let bar = geometry_of(&self.bar);
        let started = self.shared.transport.borrow_mut().scrub_start_with(
            f64::from(event.client_x()),
            bar,
            || self.drag_listeners(),
        );
        self.shared.pump();
        started.map_err(to_js)
    }

    /// End a drag programmatically (normally done by the `mouseup` listener)
    #[wasm_bindgen(js_name = scrubEnd)]
    pub fn scrub_end(&self) -> bool {
        self.with_transport(|t| t.scrub_end())
    }

    // ===== Volume Control =====

    /// Slider input (0.0-1.0); also unmutes
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f64) {
        self.with_transport(|t| t.set_volume(volume));
    }

    #[wasm_bindgen(js_name = increaseVolume)]
    pub fn increase_volume(&self) {
        self.with_transport(|t| t.increase_volume());
    }

    #[wasm_bindgen(js_name = decreaseVolume)]
    pub fn decrease_volume(&self) {
        self.with_transport(|t| t.decrease_volume());
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) {
        self.with_transport(|t| t.toggle_mute());
    }

    // ===== State Queries =====

    /// Full state snapshot as a plain object
    pub fn state(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.shared.transport.borrow().state())
            .unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.shared.transport.borrow().is_playing()
    }

    #[wasm_bindgen(js_name = isMuted)]
    pub fn is_muted(&self) -> bool {
        self.shared.transport.borrow().is_muted()
    }

    #[wasm_bindgen(js_name = isScrubbing)]
    pub fn is_scrubbing(&self) -> bool {
        self.shared.transport.borrow().is_scrubbing()
    }

    #[wasm_bindgen(js_name = currentTime)]
    pub fn current_time(&self) -> f64 {
        self.shared.transport.borrow().current_time()
    }

    pub fn duration(&self) -> f64 {
        self.shared.transport.borrow().duration()
    }

    /// Stored volume (0.0-1.0)
    pub fn volume(&self) -> f64 {
        self.shared.transport.borrow().volume()
    }

    /// Slider position: 0 while muted
    #[wasm_bindgen(js_name = effectiveVolume)]
    pub fn effective_volume(&self) -> f64 {
        self.shared.transport.borrow().effective_volume()
    }

    #[wasm_bindgen(js_name = volumeLabel)]
    pub fn volume_label(&self) -> String {
        self.shared.transport.borrow().volume_label()
    }

    /// Width of the filled part of the progress bar (0-100)
    #[wasm_bindgen(js_name = progressPercent)]
    pub fn progress_percent(&self) -> f64 {
        self.shared.transport.borrow().progress_percent()
    }

    #[wasm_bindgen(js_name = formattedCurrentTime)]
    pub fn formatted_current_time(&self) -> String {
        self.shared.transport.borrow().formatted_current_time()
    }

    #[wasm_bindgen(js_name = formattedDuration)]
    pub fn formatted_duration(&self) -> String {
        self.shared.transport.borrow().formatted_duration()
    }

    #[wasm_bindgen(js_name = statusText)]
    pub fn status_text(&self) -> String {
        self.shared.transport.borrow().status_text().to_string()
    }

    #[wasm_bindgen(js_name = currentIndex)]
    pub fn current_index(&self) -> usize {
        self.shared.transport.borrow().current_index()
    }

    #[wasm_bindgen(js_name = currentTrack)]
    pub fn current_track(&self) -> WasmTrack {
        WasmTrack::from(self.shared.transport.borrow().current_track())
    }

    /// All playlist entries as plain objects
    pub fn playlist(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.shared.transport.borrow().playlist())
            .unwrap_or(JsValue::NULL)
    }

    // ===== Event Listeners =====

    /// Register the callback that receives every transport event
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&self, callback: Function) {
        *self.shared.on_event.borrow_mut() = Some(callback);
    }

    /// Release all listeners; the player ignores the element afterwards
    pub fn dispose(&self) {
        self.shared.transport.borrow_mut().teardown();
        *self.shared.on_event.borrow_mut() = None;
    }

    // ===== Internals =====

    fn with_transport<R>(&self, f: impl FnOnce(&mut Transport) -> R) -> R {
        let result = f(&mut self.shared.transport.borrow_mut());
        self.shared.pump();
        result
    }

    fn drag_listeners(&self) -> crate::Result<Subscription> {
        let window = web_sys::window()
            .ok_or_else(|| PlaybackError::Engine("No window available".to_string()))?;
        let mut set = SubscriptionSet::new();

        let weak = Rc::downgrade(&self.shared);
        let bar = self.bar.clone();
        set.push(
            listen(&window, "mousemove", move |event: Event| {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                    let geometry = geometry_of(&bar);
                    if let Ok(mut transport) = shared.transport.try_borrow_mut() {
                        transport.scrub_move(f64::from(mouse.client_x()), geometry);
                    }
                    shared.pump();
                }
            })?,
        );

        let weak = Rc::downgrade(&self.shared);
        set.push(
            listen(&window, "mouseup", move |_| {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                if let Ok(mut transport) = shared.transport.try_borrow_mut() {
                    transport.scrub_end();
                }
                shared.pump();
            })?,
        );

        Ok(Subscription::new(move || drop(set)))
    }
}

fn geometry_of(bar: &Element) -> BarGeometry {
    let rect = bar.get_bounding_client_rect();
    BarGeometry::new(rect.left(), rect.width())
}

fn to_js(error: PlaybackError) -> JsValue {
    JsValue::from_str(&error.to_string())
}
