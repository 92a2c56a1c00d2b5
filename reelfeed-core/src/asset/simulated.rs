use std::time::Duration;

use url::Url;

use crate::error::Error;

use super::{AssetHandle, AssetInfo, AssetSource, CancelToken};

/// Offline source that reports every locator playable after a fixed latency.
#[derive(Debug, Clone)]
pub struct SimulatedAssetSource {
    latency: Duration,
}

impl SimulatedAssetSource {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl AssetSource for SimulatedAssetSource {
    fn open(&self, url: &Url, cancel: &CancelToken) -> Result<AssetHandle, Error> {
        if cancel.wait(self.latency) {
            return Err(Error::LoadCancelled);
        }
        log::debug!("simulated asset ready: {}", url);
        Ok(AssetHandle::new(url.clone(), AssetInfo::default()))
    }
}
