pub mod http;
mod loader;
pub mod simulated;

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use url::Url;

use crate::error::Error;

pub use self::loader::{AssetLoader, CompletionSink, LoadCompletion, LoadTicket};

/// Acquisition primitive turning a locator into a playable handle.  `open` runs
/// on a loader worker thread and may block; it should give up early once
/// `cancel` reports cancellation.
pub trait AssetSource: Send + Sync + 'static {
    fn open(&self, url: &Url, cancel: &CancelToken) -> Result<AssetHandle, Error>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetInfo {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

/// Shared token for a loaded (or loading) media resource.  Clones refer to the
/// same resource.
#[derive(Clone)]
pub struct AssetHandle {
    inner: Arc<AssetInner>,
}

struct AssetInner {
    url: Url,
    info: AssetInfo,
    loading: AtomicBool,
    prefix: Mutex<Vec<u8>>,
}

impl AssetHandle {
    pub fn new(url: Url, info: AssetInfo) -> Self {
        Self {
            inner: Arc::new(AssetInner {
                url,
                info,
                loading: AtomicBool::new(true),
                prefix: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    pub fn info(&self) -> &AssetInfo {
        &self.inner.info
    }

    /// True while the underlying resource may keep buffering in the background.
    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::Acquire)
    }

    /// Stops any background buffering.  Playback, not preloading, drives
    /// streaming from here on.
    pub fn cancel_loading(&self) {
        self.inner.loading.store(false, Ordering::Release);
    }

    pub fn append_prefix(&self, bytes: &[u8]) {
        self.inner.prefix.lock().extend_from_slice(bytes);
    }

    pub fn buffered_len(&self) -> usize {
        self.inner.prefix.lock().len()
    }

    /// Copy of the bytes buffered ahead of playback.
    pub fn prefix(&self) -> Vec<u8> {
        self.inner.prefix.lock().clone()
    }

    pub fn same_resource(&self, other: &AssetHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("url", &self.inner.url.as_str())
            .field("info", &self.inner.info)
            .field("loading", &self.is_loading())
            .finish()
    }
}

/// Worker side of a cancellable request.
#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    // Never carries a message, disconnects when the request is cancelled.
    signal: Receiver<()>,
}

/// Requester side of a cancellable request.  Dropping it cancels.
pub struct Canceller {
    cancelled: Arc<AtomicBool>,
    _signal: Sender<()>,
}

impl CancelToken {
    pub fn pair() -> (Canceller, CancelToken) {
        let cancelled = Arc::new(AtomicBool::new(false));
        let (send, recv) = bounded(0);
        let canceller = Canceller {
            cancelled: Arc::clone(&cancelled),
            _signal: send,
        };
        let token = CancelToken {
            cancelled,
            signal: recv,
        };
        (canceller, token)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Blocks for `timeout` or until cancelled, whichever comes first.  Returns
    /// `true` if the request got cancelled.
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.signal.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => self.is_cancelled(),
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        }
    }
}

impl Canceller {
    pub fn cancel(self) {
        // Flag first, so the worker woken by the disconnect observes it.
        self.cancelled.store(true, Ordering::Release);
    }
}

impl Drop for Canceller {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
    }
}
