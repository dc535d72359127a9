//! Property-based tests for the player state machine
//!
//! Uses proptest to drive random command sequences through a player with a
//! recording engine.

mod common;

use std::sync::Arc;

use chant_playback::{
    EngineEvent, PlaybackStatus, PlaybackUrlProvider, Player, PlayerCommand, PlayerConfig,
    PlayerError,
};
use common::{track, ControlledProvider, FakeEngine, Harness};
use proptest::prelude::*;

// ===== Helpers =====

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// ===== Property Tests =====

proptest! {
    /// Property: a locator without a recognized scheme never reaches the provider
    #[test]
    fn unprefixed_locator_never_calls_provider(locator in "[a-z0-9/._-]{0,40}") {
        runtime().block_on(async {
            let provider = ControlledProvider::default();
            let shared: Arc<dyn PlaybackUrlProvider> = Arc::new(provider.clone());
            let (mut player, _events) =
                Player::new(FakeEngine::default(), shared, PlayerConfig::default());

            player
                .handle(PlayerCommand::SelectTrack(Some(track("1", &locator))).into())
                .await;
            tokio::task::yield_now().await;

            assert_eq!(player.status(), PlaybackStatus::Error);
            assert!(matches!(player.error(), Some(PlayerError::InvalidLocator(_))));
            assert!(provider.calls().is_empty());
            assert!(player.engine().calls().is_empty());
        });
    }

    /// Property: however intent flips while resolving, at most one start is
    /// issued, and only when the last request was play
    #[test]
    fn intent_flips_while_resolving_coalesce(flips in prop::collection::vec(any::<bool>(), 0..12)) {
        runtime().block_on(async {
            let mut h = Harness::new();
            h.command(PlayerCommand::SelectTrack(Some(track("1", "s3://bucket/song.mp3")))).await;

            for play in &flips {
                let command = if *play { PlayerCommand::Play } else { PlayerCommand::Pause };
                h.command(command).await;
            }

            h.provider.succeed("bucket/song.mp3", "https://cdn.test/song").await;
            h.settle().await;
            h.engine_event(EngineEvent::CanPlay).await;

            let wants_play = flips.last().copied().unwrap_or(false);
            assert_eq!(h.engine.play_count(), usize::from(wants_play));
            assert_eq!(h.engine.sources().len(), 1);
            let expected = if wants_play { PlaybackStatus::Playing } else { PlaybackStatus::Ready };
            assert_eq!(h.player.status(), expected);
        });
    }

    /// Property: only the last of several rapid selections attaches a source
    #[test]
    fn last_selection_wins(count in 2usize..6, order in prop::collection::vec(any::<prop::sample::Index>(), 6)) {
        runtime().block_on(async {
            let mut h = Harness::new();
            let tracks: Vec<_> = (0..count)
                .map(|i| track(&i.to_string(), &format!("s3://bucket/{i}.mp3")))
                .collect();

            for song in &tracks {
                h.command(PlayerCommand::SelectTrack(Some(Arc::clone(song)))).await;
            }

            // Resolutions finish in arbitrary order
            let mut remaining: Vec<usize> = (0..count).collect();
            for index in &order {
                if remaining.is_empty() {
                    break;
                }
                let i = remaining.remove(index.index(remaining.len()));
                h.provider.succeed(&format!("bucket/{i}.mp3"), &format!("https://cdn.test/{i}")).await;
                h.settle().await;
            }
            for i in remaining {
                h.provider.succeed(&format!("bucket/{i}.mp3"), &format!("https://cdn.test/{i}")).await;
                h.settle().await;
            }

            let last = count - 1;
            assert_eq!(h.engine.sources(), vec![format!("https://cdn.test/{last}")]);
        });
    }
}
