use reelfeed_core::{
    asset::AssetHandle,
    item::{RowId, VideoItem},
    playback::{VideoGravity, VideoPlayer},
};

/// Stands in for a video surface: reports what it is told to do.
pub struct LoggingPlayer {
    row: RowId,
    title: String,
    handle: Option<AssetHandle>,
}

impl LoggingPlayer {
    pub fn new(row: RowId, item: &VideoItem) -> Self {
        Self {
            row,
            title: item.title.to_owned(),
            handle: None,
        }
    }
}

impl VideoPlayer for LoggingPlayer {
    fn set_handle(&mut self, handle: Option<AssetHandle>) {
        match &handle {
            Some(handle) => log::info!(
                "{} [{}]: asset attached ({} bytes buffered, {:?})",
                self.row,
                self.title,
                handle.buffered_len(),
                handle.info().content_type
            ),
            None => log::info!("{} [{}]: asset released", self.row, self.title),
        }
        self.handle = handle;
    }

    fn play(&mut self) {
        if self.handle.is_none() {
            log::warn!("{} [{}]: playing without an asset", self.row, self.title);
        }
        println!("▶ {} {}", self.row, self.title);
    }

    fn pause(&mut self) {
        println!("⏸ {} {}", self.row, self.title);
    }

    fn set_gravity(&mut self, gravity: VideoGravity) {
        log::debug!("{} [{}]: gravity {:?}", self.row, self.title, gravity);
    }

    fn set_muted(&mut self, muted: bool) {
        log::debug!("{} [{}]: muted {}", self.row, self.title, muted);
    }
}
