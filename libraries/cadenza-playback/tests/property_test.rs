//! Property-based tests for the transport controller
//!
//! Uses proptest to verify invariants across many random inputs.

use cadenza_playback::{
    format_time, BarGeometry, EngineEvent, MediaEngine, PlayRequest, PlayerConfig, Playlist,
    Track, TransportController, Volume,
};
use proptest::prelude::*;

// ===== Helpers =====

/// Engine that accepts every command
struct NullEngine;

impl MediaEngine for NullEngine {
    fn load(&mut self, _track: &Track) {}

    fn play(&mut self, _request: PlayRequest) -> cadenza_playback::Result<()> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn seek(&mut self, _position: f64) {}

    fn set_volume(&mut self, _volume: f64) {}

    fn set_muted(&mut self, _muted: bool) {}
}

fn arbitrary_track() -> impl Strategy<Value = Track> {
    ("[a-z0-9]{1,10}", "[A-Za-z ]{1,30}", "[A-Za-z ]{1,20}").prop_map(|(id, title, artist)| {
        let media = format!("/media/{id}.mp3");
        Track::new(id, title, artist, "", media)
    })
}

fn arbitrary_playlist() -> impl Strategy<Value = Playlist> {
    prop::collection::vec(arbitrary_track(), 1..20).prop_map(|tracks| Playlist::new(tracks).unwrap())
}

fn transport(playlist: Playlist, duration: f64) -> TransportController<NullEngine> {
    let mut transport =
        TransportController::new(NullEngine, playlist, PlayerConfig::default()).unwrap();
    transport.handle_engine_event(EngineEvent::MetadataLoaded(duration));
    transport
}

fn single() -> Playlist {
    Playlist::single(Track::new("t", "Track", "Artist", "", "/t.mp3"))
}

/// Commands a user can issue from the controls
#[derive(Debug, Clone)]
enum Command {
    TogglePlay,
    Seek(f64),
    SkipForward,
    Rewind,
    ScrubStart(f64),
    ScrubMove(f64),
    ScrubEnd,
    TimeUpdate(f64),
}

fn arbitrary_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::TogglePlay),
        (-50.0f64..500.0).prop_map(Command::Seek),
        Just(Command::SkipForward),
        Just(Command::Rewind),
        (-100.0f64..500.0).prop_map(Command::ScrubStart),
        (-100.0f64..500.0).prop_map(Command::ScrubMove),
        Just(Command::ScrubEnd),
        (-50.0f64..500.0).prop_map(Command::TimeUpdate),
    ]
}

const BAR: BarGeometry = BarGeometry {
    left: 50.0,
    width: 300.0,
};

// ===== Property Tests =====

proptest! {
    /// Property: Volume stepping stays in [0, 1] and lands on the step grid
    #[test]
    fn volume_steps_saturate(
        initial in 0.0f64..=1.0,
        step in 0.005f64..=0.25,
        steps in prop::collection::vec(any::<bool>(), 1..300)
    ) {
        let mut volume = Volume::new(initial);
        for up in steps {
            if up {
                volume.increase(step);
            } else {
                volume.decrease(step);
            }
            let level = volume.level();
            prop_assert!((0.0..=1.0).contains(&level));

            let on_grid = ((level / step).round() * step - level).abs() < 1e-6;
            prop_assert!(on_grid || level == 1.0, "{} is off the {} grid", level, step);
        }
    }

    /// Property: Mute never changes the stored level
    #[test]
    fn mute_preserves_level(initial in 0.0f64..=1.0, toggles in 1usize..10) {
        let mut transport = transport(single(), 60.0);
        transport.set_volume(initial);
        prop_assert_eq!(transport.volume(), initial);

        for _ in 0..toggles {
            transport.toggle_mute();
            prop_assert_eq!(transport.volume(), initial);
        }
        prop_assert_eq!(transport.is_muted(), toggles % 2 == 1);
    }

    /// Property: Bar fraction is always in [0, 1]
    #[test]
    fn bar_fraction_is_clamped(
        left in -1000.0f64..1000.0,
        width in -10.0f64..2000.0,
        x in prop::num::f64::ANY
    ) {
        let fraction = BarGeometry::new(left, width).fraction_at(x);
        prop_assert!((0.0..=1.0).contains(&fraction));
    }

    /// Property: Position stays within [0, duration] under any command mix
    #[test]
    fn position_stays_in_bounds(
        duration in 1.0f64..400.0,
        commands in prop::collection::vec(arbitrary_command(), 1..60)
    ) {
        let mut transport = transport(single(), duration);

        for command in commands {
            match command {
                Command::TogglePlay => transport.toggle_play_pause(),
                Command::Seek(p) => transport.seek(p),
                Command::SkipForward => transport.skip_forward_default(),
                Command::Rewind => transport.rewind_default(),
                Command::ScrubStart(x) => {
                    transport.scrub_start(x, BAR);
                }
                Command::ScrubMove(x) => {
                    transport.scrub_move(x, BAR);
                }
                Command::ScrubEnd => {
                    transport.scrub_end();
                }
                Command::TimeUpdate(t) => {
                    transport.on_time_update(t);
                }
            }
            prop_assert!(transport.current_time() >= 0.0);
            prop_assert!(transport.current_time() <= duration);
            prop_assert!((0.0..=1.0).contains(&transport.progress_fraction()));
        }
    }

    /// Property: No time update is applied while a drag is active
    #[test]
    fn time_updates_ignored_while_scrubbing(
        x in 50.0f64..350.0,
        updates in prop::collection::vec(0.0f64..200.0, 1..30)
    ) {
        let mut transport = transport(single(), 200.0);
        transport.play();
        prop_assert!(transport.scrub_start(x, BAR));
        let pinned = transport.current_time();

        for t in updates {
            prop_assert!(!transport.on_time_update(t));
            prop_assert_eq!(transport.current_time(), pinned);
        }
    }

    /// Property: A time update right after a seek is reflected exactly
    #[test]
    fn seek_then_update_matches(target in 0.0f64..300.0, drift in 0.0f64..1.0) {
        let mut transport = transport(single(), 300.0);
        transport.seek(target);
        prop_assert_eq!(transport.current_time(), target);

        let reported = (target + drift).min(300.0);
        prop_assert!(transport.on_time_update(reported));
        prop_assert_eq!(transport.current_time(), reported);
    }

    /// Property: Calling next playlist-length times returns to the start
    #[test]
    fn next_cycles_through_playlist(playlist in arbitrary_playlist(), start in 0usize..20) {
        let len = playlist.len();
        let mut transport = transport(playlist, 100.0);
        transport.select_track(start % len).unwrap();
        let origin = transport.current_index();

        for _ in 0..len {
            transport.next_track();
        }
        prop_assert_eq!(transport.current_index(), origin);

        for _ in 0..len {
            transport.previous_track();
        }
        prop_assert_eq!(transport.current_index(), origin);
    }

    /// Property: Formatted time is always mm:ss with seconds below 60
    #[test]
    fn format_time_shape(seconds in 0.0f64..6000.0) {
        let text = format_time(seconds);
        let (minutes, secs) = text.split_once(':').unwrap();

        prop_assert_eq!(secs.len(), 2);
        prop_assert!(minutes.len() >= 2);
        let secs: u64 = secs.parse().unwrap();
        let minutes: u64 = minutes.parse().unwrap();
        prop_assert!(secs < 60);
        prop_assert_eq!(minutes * 60 + secs, seconds.floor() as u64);
    }
}
