//! WASM-compatible type definitions

use crate::Track;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// WASM-compatible track
///
/// Mirrors `Track` with getters JavaScript can read directly.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[wasm_bindgen]
pub struct WasmTrack {
    id: String,
    title: String,
    artist: String,
    artwork: String,
    media: String,
}

#[wasm_bindgen]
impl WasmTrack {
    /// Create a new track
    #[wasm_bindgen(constructor)]
    pub fn new(id: String, title: String, artist: String, artwork: String, media: String) -> Self {
        Self {
            id,
            title,
            artist,
            artwork,
            media,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn id(&self) -> String {
        self.id.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn title(&self) -> String {
        self.title.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn artist(&self) -> String {
        self.artist.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn artwork(&self) -> String {
        self.artwork.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn media(&self) -> String {
        self.media.clone()
    }
}

impl From<&Track> for WasmTrack {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            artwork: track.artwork.clone(),
            media: track.media.clone(),
        }
    }
}

impl From<WasmTrack> for Track {
    fn from(track: WasmTrack) -> Self {
        Track {
            id: track.id,
            title: track.title,
            artist: track.artist,
            artwork: track.artwork,
            media: track.media,
        }
    }
}
