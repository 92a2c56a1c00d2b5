use std::{sync::Arc, thread, time::Duration};

use url::Url;

use crate::{error::Error, util::Sequence};

use super::{AssetHandle, AssetSource, CancelToken, Canceller};

/// Identifies one `request` of a loader.  Completions carry the ticket of the
/// request that produced them.
pub type LoadTicket = u64;

#[derive(Debug)]
pub struct LoadCompletion {
    pub ticket: LoadTicket,
    pub handle: AssetHandle,
}

/// Marshals completions back onto the context owning the state machine.
pub type CompletionSink = Arc<dyn Fn(LoadCompletion) + Send + Sync>;

struct PendingLoad {
    ticket: LoadTicket,
    url: Url,
    canceller: Canceller,
}

/// Acquires handles on a background worker, holding completions back for a
/// settling delay.  At most one request is outstanding at a time.
pub struct AssetLoader {
    source: Arc<dyn AssetSource>,
    settling_delay: Duration,
    sink: CompletionSink,
    tickets: Sequence<LoadTicket>,
    pending: Option<PendingLoad>,
}

impl AssetLoader {
    pub fn new(source: Arc<dyn AssetSource>, settling_delay: Duration, sink: CompletionSink) -> Self {
        Self {
            source,
            settling_delay,
            sink,
            tickets: Sequence::new(1),
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn request(&mut self, url: Url) -> LoadTicket {
        self.cancel();

        let ticket = self.tickets.advance();
        let (canceller, token) = CancelToken::pair();
        thread::spawn({
            let source = Arc::clone(&self.source);
            let sink = Arc::clone(&self.sink);
            let settling_delay = self.settling_delay;
            let url = url.clone();
            move || {
                if let Some(handle) = acquire(source.as_ref(), &url, &token, settling_delay) {
                    sink(LoadCompletion { ticket, handle });
                }
            }
        });
        log::debug!("requested asset {} (ticket {})", url, ticket);
        self.pending = Some(PendingLoad {
            ticket,
            url,
            canceller,
        });
        ticket
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            log::debug!("cancelling asset load {} (ticket {})", pending.url, pending.ticket);
            pending.canceller.cancel();
        }
    }

    /// Accepts a completion if it belongs to the outstanding request, which is
    /// then no longer pending.  Completions of cancelled or superseded requests
    /// are refused.
    pub fn commit(&mut self, ticket: LoadTicket) -> bool {
        match &self.pending {
            Some(pending) if pending.ticket == ticket => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn acquire(
    source: &dyn AssetSource,
    url: &Url,
    token: &CancelToken,
    settling_delay: Duration,
) -> Option<AssetHandle> {
    let handle = match source.open(url, token) {
        Ok(handle) => handle,
        Err(Error::LoadCancelled) => {
            log::debug!("asset load cancelled: {}", url);
            return None;
        }
        Err(err) => {
            if token.is_cancelled() {
                log::debug!("asset load cancelled: {}", url);
            } else {
                log::error!("failed to load asset {}: {}", url, err);
            }
            return None;
        }
    };
    if token.wait(settling_delay) {
        log::debug!("asset load cancelled while settling: {}", url);
        handle.cancel_loading();
        return None;
    }
    // Do not keep preloading, playback will resume streaming.
    handle.cancel_loading();
    Some(handle)
}
