//! Property tests for index navigation.
#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use embassy_time::Instant;
use library::{EntryKind, Playlist, PlaylistEntry};
use platform::mocks::{MockStorage, NoopDelay};
use playback::mocks::MockPipeline;
use playback::{NullSink, PlaybackConfig, PlaybackController, PlayerState};
use proptest::prelude::*;

fn controller(len: usize) -> PlaybackController<MockStorage, MockPipeline, NoopDelay> {
    let storage = MockStorage::new();
    let mut playlist = Playlist::new();
    for i in 0..len {
        let name = format!("/track{i:03}.mp3");
        storage.add_sized_file(&name, 1);
        playlist.push(PlaylistEntry::new(&name, EntryKind::Mp3, 1).unwrap()).unwrap();
    }
    PlaybackController::new(storage, MockPipeline::new(), NoopDelay::new(), playlist, PlaybackConfig::default())
}

fn block_on<F: core::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
}

proptest! {
    #[test]
    fn next_from_first_entry_cycles_back_to_it(len in 1usize..40) {
        block_on(async {
            let mut c = controller(len);
            c.request_play(0, Instant::from_millis(1_000), &mut NullSink).await.unwrap();
            let mut seen = vec![0usize; len];
            for step in 1..=len {
                let now = Instant::from_millis(1_000 + 200 * step as u64);
                c.play_next(now, &mut NullSink).await.unwrap();
                seen[c.current_index().unwrap()] += 1;
            }
            prop_assert!(seen.iter().all(|&n| n == 1));
            prop_assert_eq!(c.current_index(), Some(0));
            prop_assert_eq!(c.state(), PlayerState::Playing);
            Ok(())
        })?;
    }

    #[test]
    fn previous_then_next_returns_to_start(len in 1usize..40, start in 0usize..40) {
        let start = start % len;
        block_on(async {
            let mut c = controller(len);
            c.request_play(start, Instant::from_millis(1_000), &mut NullSink).await.unwrap();
            c.play_previous(Instant::from_millis(2_000), &mut NullSink).await.unwrap();
            prop_assert_eq!(c.current_index(), Some((start + len - 1) % len));
            c.play_next(Instant::from_millis(3_000), &mut NullSink).await.unwrap();
            prop_assert_eq!(c.current_index(), Some(start));
            prop_assert_eq!(c.state(), PlayerState::Playing);
            Ok(())
        })?;
    }

    #[test]
    fn switches_closer_than_spacing_never_change_session(gap in 0u64..100) {
        block_on(async {
            let mut c = controller(3);
            c.request_play(0, Instant::from_millis(5_000), &mut NullSink).await.unwrap();
            let before = c.session();
            let _ = c.play_next(Instant::from_millis(5_000 + gap), &mut NullSink).await;
            prop_assert_eq!(c.session(), before);
            Ok(())
        })?;
    }
}
