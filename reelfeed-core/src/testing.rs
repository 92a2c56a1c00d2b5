use std::{sync::Arc, time::Duration};

use crossbeam_channel::{unbounded, Receiver};
use parking_lot::Mutex;
use url::Url;

use crate::{
    asset::{simulated::SimulatedAssetSource, AssetHandle, CompletionSink, LoadCompletion},
    playback::{PlayAffordance, PlaybackConfig, PlaybackStateMachine, VideoGravity, VideoPlayer},
};

pub const TEST_SETTLING: Duration = Duration::from_millis(10);

const COMPLETION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCall {
    SetHandle(bool),
    Play,
    Pause,
    Gravity(VideoGravity),
    Muted(bool),
}

#[derive(Clone, Default)]
pub struct RecordingPlayer {
    calls: Arc<Mutex<Vec<PlayerCall>>>,
    handle: Arc<Mutex<Option<AssetHandle>>>,
}

impl RecordingPlayer {
    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls.lock().clone()
    }

    pub fn has_handle(&self) -> bool {
        self.handle.lock().is_some()
    }
}

impl VideoPlayer for RecordingPlayer {
    fn set_handle(&mut self, handle: Option<AssetHandle>) {
        self.calls.lock().push(PlayerCall::SetHandle(handle.is_some()));
        *self.handle.lock() = handle;
    }

    fn play(&mut self) {
        self.calls.lock().push(PlayerCall::Play);
    }

    fn pause(&mut self) {
        self.calls.lock().push(PlayerCall::Pause);
    }

    fn set_gravity(&mut self, gravity: VideoGravity) {
        self.calls.lock().push(PlayerCall::Gravity(gravity));
    }

    fn set_muted(&mut self, muted: bool) {
        self.calls.lock().push(PlayerCall::Muted(muted));
    }
}

#[derive(Clone, Default)]
pub struct RecordingAffordance {
    visible: Arc<Mutex<Option<bool>>>,
}

impl RecordingAffordance {
    pub fn visible(&self) -> Option<bool> {
        *self.visible.lock()
    }
}

impl PlayAffordance for RecordingAffordance {
    fn set_visible(&mut self, visible: bool) {
        *self.visible.lock() = Some(visible);
    }
}

pub fn url(name: &str) -> Url {
    Url::parse(&format!("https://streams.example.com/{name}.m3u8")).unwrap()
}

pub fn config() -> PlaybackConfig {
    PlaybackConfig {
        settling_delay: TEST_SETTLING,
        ..PlaybackConfig::default()
    }
}

pub fn completion_sink() -> (CompletionSink, Receiver<LoadCompletion>) {
    let (send, recv) = unbounded();
    let sink: CompletionSink = Arc::new(move |completion| {
        let _ = send.send(completion);
    });
    (sink, recv)
}

pub fn machine(
    config: PlaybackConfig,
) -> (PlaybackStateMachine, RecordingPlayer, Receiver<LoadCompletion>) {
    let (sink, completions) = completion_sink();
    let player = RecordingPlayer::default();
    let source = Arc::new(SimulatedAssetSource::new(Duration::ZERO));
    let machine = PlaybackStateMachine::new(config, source, sink, Box::new(player.clone()));
    (machine, player, completions)
}

pub fn wait_loaded(completions: &Receiver<LoadCompletion>) -> LoadCompletion {
    completions
        .recv_timeout(COMPLETION_TIMEOUT)
        .expect("asset load did not complete")
}
