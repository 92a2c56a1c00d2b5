use std::{
    env::{self, VarError},
    fs::File,
    path::Path,
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    catalog::{Catalog, DEFAULT_STREAMS},
    error::Error,
    playback::{CachingPolicy, PlaybackConfig, VideoGravity},
};

const PROXY_ENV_VAR: &str = "HTTPS_PROXY";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub settling_delay_ms: u64,
    pub caching: CachingPolicy,
    pub auto_pause: bool,
    pub gravity: VideoGravity,
    pub muted: bool,
    pub item_count: usize,
    pub proxy_url: Option<String>,
    pub streams: Vec<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            settling_delay_ms: PlaybackConfig::DEFAULT_SETTLING_DELAY.as_millis() as u64,
            caching: CachingPolicy::default(),
            auto_pause: true,
            gravity: VideoGravity::default(),
            muted: true,
            item_count: 100,
            proxy_url: None,
            streams: DEFAULT_STREAMS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FeedConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        log::info!("loading config: {:?}", path);
        let file = File::open(path)?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn playback(&self) -> PlaybackConfig {
        PlaybackConfig {
            settling_delay: Duration::from_millis(self.settling_delay_ms),
            caching: self.caching,
            auto_pause: self.auto_pause,
            gravity: self.gravity,
            muted: self.muted,
        }
    }

    pub fn catalog(&self) -> Result<Catalog, Error> {
        Catalog::from_streams(self.streams.as_slice())
    }

    /// Configured proxy, falling back to the `HTTPS_PROXY` environment variable.
    pub fn proxy(&self) -> Option<String> {
        if self.proxy_url.is_some() {
            return self.proxy_url.clone();
        }
        match env::var(PROXY_ENV_VAR) {
            Ok(url) => Some(url),
            Err(VarError::NotPresent) => None,
            Err(VarError::NotUnicode(_)) => {
                log::error!("proxy URL is not a valid unicode");
                None
            }
        }
    }
}
