use std::{mem, sync::Arc};

use url::Url;

use crate::asset::{AssetHandle, AssetLoader, AssetSource, CompletionSink, LoadCompletion};

use super::{
    CachingPolicy, PlayAffordance, PlaybackConfig, PlaybackState, VideoPlayer, VisualState,
};

/// Lifecycle of a single feed item: `Idle -> Loading -> ReadyToPlay -> Playing
/// -> Paused`.
///
/// All methods are expected to be called from the one context that also
/// receives the loader completions, so transitions never race.  Events that
/// have no transition from the current state are dropped, nothing is queued.
pub struct PlaybackStateMachine {
    state: PlaybackState,
    config: PlaybackConfig,
    loader: AssetLoader,
    handle: Option<AssetHandle>,
    player: Box<dyn VideoPlayer>,
    affordance: Option<Box<dyn PlayAffordance>>,
    visual: VisualState,
    // Set by a replay that had to reload a discarded asset.
    play_when_ready: bool,
}

impl PlaybackStateMachine {
    pub fn new(
        config: PlaybackConfig,
        source: Arc<dyn AssetSource>,
        sink: CompletionSink,
        mut player: Box<dyn VideoPlayer>,
    ) -> Self {
        if config.muted {
            player.set_muted(true);
        }
        Self {
            loader: AssetLoader::new(source, config.settling_delay, sink),
            state: PlaybackState::Idle,
            config,
            handle: None,
            player,
            affordance: None,
            visual: VisualState {
                is_play_affordance_visible: true,
            },
            play_when_ready: false,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn visual_state(&self) -> VisualState {
        self.visual
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Asset currently held for the player, if any.
    pub fn handle(&self) -> Option<&AssetHandle> {
        self.handle.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_pending()
    }

    pub fn set_caching(&mut self, caching: CachingPolicy) {
        self.config.caching = caching;
    }

    pub fn set_play_affordance(&mut self, mut affordance: Box<dyn PlayAffordance>) {
        affordance.set_visible(self.visual.is_play_affordance_visible);
        self.affordance = Some(affordance);
    }

    /// Starts loading `url`, discarding whatever the machine was doing before.
    pub fn configure(&mut self, url: Url) {
        log::debug!("configuring playback of {}", url);
        if self.state.is_playing() {
            self.player.pause();
        }
        self.release_handle();
        self.play_when_ready = false;
        self.loader.request(url.clone());
        self.set_affordance_visible(true);
        self.state = PlaybackState::Loading(url);
    }

    pub fn handle_loaded(&mut self, completion: LoadCompletion) {
        let url = match &self.state {
            PlaybackState::Loading(url) if self.loader.commit(completion.ticket) => url.clone(),
            _ => {
                log::debug!("stale load completion received, ignoring");
                return;
            }
        };
        log::info!("asset ready: {}", url);
        self.player.set_handle(Some(completion.handle.clone()));
        self.handle = Some(completion.handle);
        if mem::take(&mut self.play_when_ready) {
            self.start_playback(url);
        } else {
            self.state = PlaybackState::ReadyToPlay(url);
        }
    }

    pub fn enter_visible(&mut self) {
        match &self.state {
            PlaybackState::ReadyToPlay(url) => {
                let url = url.clone();
                self.start_playback(url);
            }
            state => {
                log::debug!("entered visible state while {}, ignoring", state);
            }
        }
    }

    pub fn exit_visible(&mut self) {
        if !self.config.auto_pause {
            return;
        }
        match &self.state {
            PlaybackState::Playing(url) => {
                let url = url.clone();
                self.pause_playback(url);
            }
            state => {
                log::debug!("exited visible state while {}, ignoring", state);
            }
        }
    }

    /// Resumes a paused item on explicit user request, regardless of whether it
    /// is visible.
    pub fn replay(&mut self) {
        let url = match &self.state {
            PlaybackState::Paused(url) => url.clone(),
            state => {
                log::debug!("replay requested while {}, ignoring", state);
                return;
            }
        };
        if self.handle.is_some() {
            self.state = PlaybackState::ReadyToPlay(url.clone());
            self.start_playback(url);
        } else {
            log::info!("reloading discarded asset for replay: {}", url);
            self.loader.request(url.clone());
            self.play_when_ready = true;
            self.state = PlaybackState::Loading(url);
        }
    }

    /// The row is going away: stop acquisition and let go of the asset unless
    /// it is meant to be cached.
    pub fn unmount(&mut self) {
        self.loader.cancel();
        self.play_when_ready = false;
        if self.config.caching == CachingPolicy::Discard {
            self.release_handle();
        }
    }

    fn start_playback(&mut self, url: Url) {
        log::info!("starting playback: {}", url);
        self.player.play();
        self.player.set_gravity(self.config.gravity);
        self.set_affordance_visible(false);
        self.state = PlaybackState::Playing(url);
    }

    fn pause_playback(&mut self, url: Url) {
        log::info!("pausing playback: {}", url);
        self.player.pause();
        self.loader.cancel();
        if let Some(handle) = &self.handle {
            handle.cancel_loading();
        }
        self.set_affordance_visible(true);
        if self.config.caching == CachingPolicy::Discard {
            self.release_handle();
        }
        self.state = PlaybackState::Paused(url);
    }

    fn release_handle(&mut self) {
        if self.handle.take().is_some() {
            self.player.set_handle(None);
        }
    }

    fn set_affordance_visible(&mut self, visible: bool) {
        self.visual.is_play_affordance_visible = visible;
        if let Some(affordance) = &mut self.affordance {
            affordance.set_visible(visible);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        playback::VideoGravity,
        testing::{machine, url, wait_loaded, PlayerCall, RecordingAffordance, TEST_SETTLING},
    };

    fn ready_machine(config: PlaybackConfig) -> (PlaybackStateMachine, crate::testing::RecordingPlayer) {
        let (mut machine, player, completions) = machine(config);
        machine.configure(url("a"));
        machine.handle_loaded(wait_loaded(&completions));
        (machine, player)
    }

    #[test]
    fn starts_idle_with_affordance_shown() {
        let (machine, player, _completions) = machine(crate::testing::config());
        assert_eq!(machine.state(), &PlaybackState::Idle);
        assert!(machine.visual_state().is_play_affordance_visible);
        assert!(machine.handle().is_none());
        assert_eq!(player.calls(), vec![PlayerCall::Muted(true)]);
    }

    #[test]
    fn configure_enters_loading() {
        let (mut machine, _player, _completions) = machine(crate::testing::config());
        machine.configure(url("a"));
        assert_eq!(machine.state(), &PlaybackState::Loading(url("a")));
        assert!(machine.is_loading());
    }

    #[test]
    fn completion_commits_handle_without_playing() {
        let (machine, player) = ready_machine(crate::testing::config());
        assert_eq!(machine.state(), &PlaybackState::ReadyToPlay(url("a")));
        assert!(machine.handle().is_some());
        assert!(player.has_handle());
        assert!(!player.calls().contains(&PlayerCall::Play));
        assert!(machine.visual_state().is_play_affordance_visible);
    }

    #[test]
    fn configure_resets_from_any_state() {
        let (mut machine, player) = ready_machine(crate::testing::config());
        machine.enter_visible();
        assert!(machine.state().is_playing());

        machine.configure(url("a"));
        assert_eq!(machine.state(), &PlaybackState::Loading(url("a")));
        assert!(machine.handle().is_none());
        assert!(!player.has_handle());
        assert!(machine.visual_state().is_play_affordance_visible);
    }

    #[test]
    fn configure_while_playing_stops_the_player() {
        let (mut machine, player) = ready_machine(crate::testing::config());
        machine.enter_visible();
        machine.configure(url("b"));

        let calls = player.calls();
        let tail = &calls[calls.len() - 2..];
        assert_eq!(tail, &[PlayerCall::Pause, PlayerCall::SetHandle(false)]);
        assert_eq!(machine.state(), &PlaybackState::Loading(url("b")));
    }

    #[test]
    fn configure_while_ready_does_not_pause() {
        let (mut machine, player) = ready_machine(crate::testing::config());
        machine.configure(url("b"));
        assert!(!player.calls().contains(&PlayerCall::Pause));
    }

    #[test]
    fn visible_ready_item_plays() {
        let (mut machine, player) = ready_machine(crate::testing::config());
        machine.enter_visible();
        assert_eq!(machine.state(), &PlaybackState::Playing(url("a")));
        assert!(!machine.visual_state().is_play_affordance_visible);
        assert!(player.calls().contains(&PlayerCall::Play));
        assert!(player
            .calls()
            .contains(&PlayerCall::Gravity(VideoGravity::AspectFill)));
    }

    #[test]
    fn hidden_playing_item_pauses() {
        let (mut machine, player) = ready_machine(crate::testing::config());
        machine.enter_visible();
        machine.exit_visible();
        assert_eq!(machine.state(), &PlaybackState::Paused(url("a")));
        assert!(machine.visual_state().is_play_affordance_visible);
        assert_eq!(player.calls().last(), Some(&PlayerCall::Pause));
    }

    #[test]
    fn auto_pause_can_be_disabled() {
        let (mut machine, _player) = ready_machine(PlaybackConfig {
            auto_pause: false,
            ..crate::testing::config()
        });
        machine.enter_visible();
        machine.exit_visible();
        assert_eq!(machine.state(), &PlaybackState::Playing(url("a")));
    }

    #[test]
    fn retained_handle_survives_pause() {
        let (mut machine, player) = ready_machine(crate::testing::config());
        machine.enter_visible();
        machine.exit_visible();
        let handle = machine.handle().expect("handle retained");
        assert!(!handle.is_loading());
        assert!(player.has_handle());
    }

    #[test]
    fn discarded_handle_is_released_on_pause() {
        let (mut machine, player) = ready_machine(PlaybackConfig {
            caching: CachingPolicy::Discard,
            ..crate::testing::config()
        });
        machine.enter_visible();
        machine.exit_visible();
        assert!(machine.state().is_paused());
        assert!(machine.handle().is_none());
        assert!(!player.has_handle());
    }

    #[test]
    fn replay_resumes_paused_item() {
        let (mut machine, _player) = ready_machine(crate::testing::config());
        machine.enter_visible();
        machine.exit_visible();
        machine.replay();
        assert_eq!(machine.state(), &PlaybackState::Playing(url("a")));
        assert!(!machine.visual_state().is_play_affordance_visible);
    }

    #[test]
    fn replay_is_ignored_outside_paused() {
        let (mut machine, player, completions) = machine(crate::testing::config());
        machine.replay();
        assert_eq!(machine.state(), &PlaybackState::Idle);

        machine.configure(url("a"));
        machine.replay();
        assert!(machine.state().is_loading());

        machine.handle_loaded(wait_loaded(&completions));
        machine.replay();
        assert!(machine.state().is_ready());

        machine.enter_visible();
        let calls = player.calls().len();
        machine.replay();
        assert!(machine.state().is_playing());
        assert_eq!(player.calls().len(), calls);
    }

    #[test]
    fn replay_after_discard_reloads_then_plays() {
        let (mut machine, player, completions) = machine(PlaybackConfig {
            caching: CachingPolicy::Discard,
            ..crate::testing::config()
        });
        machine.configure(url("a"));
        machine.handle_loaded(wait_loaded(&completions));
        machine.enter_visible();
        machine.exit_visible();

        machine.replay();
        assert_eq!(machine.state(), &PlaybackState::Loading(url("a")));
        machine.handle_loaded(wait_loaded(&completions));
        assert_eq!(machine.state(), &PlaybackState::Playing(url("a")));
        assert!(player.has_handle());
        assert!(!machine.visual_state().is_play_affordance_visible);
    }

    #[test]
    fn visibility_while_loading_is_dropped() {
        let (mut machine, _player, completions) = machine(crate::testing::config());
        machine.configure(url("b"));
        machine.exit_visible();
        machine.enter_visible();
        assert!(machine.state().is_loading());

        machine.handle_loaded(wait_loaded(&completions));
        assert_eq!(machine.state(), &PlaybackState::ReadyToPlay(url("b")));
    }

    #[test]
    fn superseded_completion_is_ignored() {
        let (mut machine, _player, completions) = machine(crate::testing::config());
        machine.configure(url("a"));
        let first = wait_loaded(&completions);
        machine.configure(url("a"));
        machine.handle_loaded(first);
        assert!(machine.state().is_loading());
        assert!(machine.handle().is_none());

        machine.handle_loaded(wait_loaded(&completions));
        assert!(machine.state().is_ready());
    }

    #[test]
    fn unmount_cancels_pending_load() {
        let (mut machine, _player, completions) = machine(PlaybackConfig {
            settling_delay: Duration::from_millis(100),
            ..crate::testing::config()
        });
        machine.configure(url("a"));
        machine.unmount();
        assert!(!machine.is_loading());
        assert!(completions
            .recv_timeout(TEST_SETTLING + Duration::from_millis(300))
            .is_err());
        assert!(machine.state().is_loading());
    }

    #[test]
    fn unmount_discards_handle_only_when_not_cached() {
        let (mut retained, _player) = ready_machine(crate::testing::config());
        retained.unmount();
        assert!(retained.handle().is_some());

        let (mut discarded, player) = ready_machine(PlaybackConfig {
            caching: CachingPolicy::Discard,
            ..crate::testing::config()
        });
        discarded.unmount();
        assert!(discarded.handle().is_none());
        assert!(!player.has_handle());
    }

    #[test]
    fn late_affordance_receives_current_visibility() {
        let (mut machine, _player) = ready_machine(crate::testing::config());
        machine.enter_visible();

        let affordance = RecordingAffordance::default();
        machine.set_play_affordance(Box::new(affordance.clone()));
        assert_eq!(affordance.visible(), Some(false));

        machine.exit_visible();
        assert_eq!(affordance.visible(), Some(true));
    }
}
