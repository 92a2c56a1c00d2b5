use std::sync::Arc;

use crate::{
    asset::{AssetSource, CompletionSink, LoadCompletion},
    item::VideoItem,
    playback::{
        CachingPolicy, PlayAffordance, PlaybackConfig, PlaybackState, PlaybackStateMachine,
        VideoPlayer, VisualState,
    },
};

/// Binds one feed row to its playback state machine.  Presentation of the title
/// and description is left to the rendering layer, which reads them from
/// `item()`.
pub struct VideoItemController {
    item: VideoItem,
    machine: PlaybackStateMachine,
}

impl VideoItemController {
    pub fn new(
        item: VideoItem,
        config: PlaybackConfig,
        source: Arc<dyn AssetSource>,
        sink: CompletionSink,
        player: Box<dyn VideoPlayer>,
    ) -> Self {
        Self {
            item,
            machine: PlaybackStateMachine::new(config, source, sink, player),
        }
    }

    pub fn item(&self) -> &VideoItem {
        &self.item
    }

    pub fn state(&self) -> &PlaybackState {
        self.machine.state()
    }

    pub fn machine(&self) -> &PlaybackStateMachine {
        &self.machine
    }

    pub fn current_visual_state(&self) -> VisualState {
        self.machine.visual_state()
    }

    pub fn set_play_affordance(&mut self, affordance: Box<dyn PlayAffordance>) {
        self.machine.set_play_affordance(affordance);
    }

    pub fn mount(&mut self) {
        self.machine.configure(self.item.url.clone());
    }

    /// Points the row at `item` and starts over from `Loading`.
    pub fn configure(&mut self, item: VideoItem, caching: CachingPolicy) {
        self.item = item;
        self.machine.set_caching(caching);
        self.machine.configure(self.item.url.clone());
    }

    pub fn on_enter_visible(&mut self) {
        self.machine.enter_visible();
    }

    pub fn on_exit_visible(&mut self) {
        self.machine.exit_visible();
    }

    pub fn on_replay_requested(&mut self) {
        self.machine.replay();
    }

    pub fn on_loaded(&mut self, completion: LoadCompletion) {
        self.machine.handle_loaded(completion);
    }

    pub fn unmount(&mut self) {
        self.machine.unmount();
    }
}
