use std::{collections::HashMap, sync::Arc};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::{
    asset::{AssetSource, CompletionSink, LoadCompletion},
    controller::VideoItemController,
    item::{RowId, VideoItem},
    playback::{PlayAffordance, PlaybackConfig, PlaybackState, VideoPlayer, VisualState},
    util::Sequence,
};

/// Distinguishes successive mounts of the same row.
pub type MountId = u64;

/// Creates the player capability of a newly mounted row.
pub type PlayerFactory = Box<dyn FnMut(RowId, &VideoItem) -> Box<dyn VideoPlayer>>;

/// Hosts the controllers of all mounted rows on one serialized context.
/// Visibility signals from the list and asset completions from the loaders
/// arrive through the same channel and are handled strictly in order.
pub struct Feed {
    config: PlaybackConfig,
    source: Arc<dyn AssetSource>,
    make_player: PlayerFactory,
    mounts: Sequence<MountId>,
    rows: HashMap<RowId, MountedRow>,
    sender: Sender<FeedEvent>,
    receiver: Receiver<FeedEvent>,
}

impl Feed {
    pub fn new(
        config: PlaybackConfig,
        source: Arc<dyn AssetSource>,
        make_player: PlayerFactory,
    ) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            config,
            source,
            make_player,
            mounts: Sequence::new(1),
            rows: HashMap::new(),
            sender,
            receiver,
        }
    }

    pub fn sender(&self) -> Sender<FeedEvent> {
        self.sender.clone()
    }

    pub fn receiver(&self) -> Receiver<FeedEvent> {
        self.receiver.clone()
    }

    /// Processes events until `Shutdown` is received.
    pub fn run(&mut self) {
        for event in self.receiver() {
            if let FeedEvent::Shutdown = event {
                log::info!("feed shutting down");
                break;
            }
            self.handle(event);
        }
        for (_, mut mounted) in self.rows.drain() {
            mounted.controller.unmount();
        }
    }

    pub fn handle(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Mount { row, item } => self.mount(row, item),
            FeedEvent::Unmount { row } => self.unmount(row),
            FeedEvent::EnterVisible { row } => {
                self.with_row(row, VideoItemController::on_enter_visible)
            }
            FeedEvent::ExitVisible { row } => {
                self.with_row(row, VideoItemController::on_exit_visible)
            }
            FeedEvent::Replay { row } => {
                self.with_row(row, VideoItemController::on_replay_requested)
            }
            FeedEvent::Loaded {
                row,
                mount,
                completion,
            } => match self.rows.get_mut(&row) {
                Some(mounted) if mounted.mount == mount => mounted.controller.on_loaded(completion),
                Some(_) => log::debug!("load result for a previous mount of {}, ignoring", row),
                None => log::info!("load result for unmounted {}, ignoring", row),
            },
            FeedEvent::Shutdown => {}
        }
    }

    pub fn state(&self, row: RowId) -> Option<&PlaybackState> {
        self.controller(row).map(VideoItemController::state)
    }

    pub fn visual_state(&self, row: RowId) -> Option<VisualState> {
        self.controller(row)
            .map(VideoItemController::current_visual_state)
    }

    pub fn controller(&self, row: RowId) -> Option<&VideoItemController> {
        self.rows.get(&row).map(|mounted| &mounted.controller)
    }

    pub fn mounted_rows(&self) -> Vec<RowId> {
        let mut rows: Vec<_> = self.rows.keys().copied().collect();
        rows.sort();
        rows
    }

    pub fn set_play_affordance(&mut self, row: RowId, affordance: Box<dyn PlayAffordance>) {
        if let Some(mounted) = self.rows.get_mut(&row) {
            mounted.controller.set_play_affordance(affordance);
        }
    }

    fn mount(&mut self, row: RowId, item: VideoItem) {
        if let Some(mounted) = self.rows.get_mut(&row) {
            log::debug!("reconfiguring mounted {}", row);
            mounted.controller.configure(item, self.config.caching);
            return;
        }
        let mount = self.mounts.advance();
        log::debug!("mounting {} (mount {}): {}", row, mount, item.title);
        let player = (self.make_player)(row, &item);
        let sink: CompletionSink = {
            let sender = self.sender.clone();
            Arc::new(move |completion| {
                let _ = sender.send(FeedEvent::Loaded {
                    row,
                    mount,
                    completion,
                });
            })
        };
        let mut controller = VideoItemController::new(
            item,
            self.config.clone(),
            Arc::clone(&self.source),
            sink,
            player,
        );
        controller.mount();
        self.rows.insert(row, MountedRow { mount, controller });
    }

    fn unmount(&mut self, row: RowId) {
        if let Some(mut mounted) = self.rows.remove(&row) {
            log::debug!("unmounting {}", row);
            mounted.controller.unmount();
        }
    }

    fn with_row(&mut self, row: RowId, f: impl FnOnce(&mut VideoItemController)) {
        match self.rows.get_mut(&row) {
            Some(mounted) => f(&mut mounted.controller),
            None => log::debug!("event for unmounted {}, ignoring", row),
        }
    }
}

struct MountedRow {
    mount: MountId,
    controller: VideoItemController,
}

pub enum FeedEvent {
    /// Row was mounted, or re-mounted with new content.  Loading starts.
    Mount { row: RowId, item: VideoItem },
    /// Row was unmounted.  Pending loads are cancelled.
    Unmount { row: RowId },
    EnterVisible { row: RowId },
    ExitVisible { row: RowId },
    /// User tapped the play control of a row.
    Replay { row: RowId },
    /// Asset of a row finished settling.  Results of an earlier mount of the
    /// row are dropped.
    Loaded {
        row: RowId,
        mount: MountId,
        completion: LoadCompletion,
    },
    Shutdown,
}
