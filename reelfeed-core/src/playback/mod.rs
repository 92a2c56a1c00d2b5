mod machine;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::asset::AssetHandle;

pub use self::machine::PlaybackStateMachine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    /// No asset requested yet.
    Idle,
    /// Asset requested, not yet committed to the player.
    Loading(Url),
    /// Asset committed to the player, not playing.
    ReadyToPlay(Url),
    Playing(Url),
    Paused(Url),
}

impl PlaybackState {
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Idle => None,
            Self::Loading(url) | Self::ReadyToPlay(url) | Self::Playing(url) | Self::Paused(url) => {
                Some(url)
            }
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing(_))
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::ReadyToPlay(_))
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading(url) => write!(f, "loading {url}"),
            Self::ReadyToPlay(url) => write!(f, "ready {url}"),
            Self::Playing(url) => write!(f, "playing {url}"),
            Self::Paused(url) => write!(f, "paused {url}"),
        }
    }
}

/// Whether a loaded asset survives a pause.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachingPolicy {
    /// Keep the handle for near-instant replay.
    #[default]
    Retain,
    /// Release the handle on pause, replay loads it again.
    Discard,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoGravity {
    #[default]
    AspectFill,
    AspectFit,
    Fill,
}

#[derive(Clone, Debug)]
pub struct PlaybackConfig {
    pub settling_delay: Duration,
    pub caching: CachingPolicy,
    pub auto_pause: bool,
    pub gravity: VideoGravity,
    pub muted: bool,
}

impl PlaybackConfig {
    pub const DEFAULT_SETTLING_DELAY: Duration = Duration::from_secs(3);
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            settling_delay: Self::DEFAULT_SETTLING_DELAY,
            caching: CachingPolicy::default(),
            auto_pause: true,
            gravity: VideoGravity::default(),
            muted: true,
        }
    }
}

/// What the rendering layer needs to reflect the playback state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VisualState {
    pub is_play_affordance_visible: bool,
}

/// Player capability of a row.  Decoding and rendering happen behind it.
pub trait VideoPlayer: Send {
    fn set_handle(&mut self, handle: Option<AssetHandle>);
    fn play(&mut self);
    fn pause(&mut self);

    fn set_gravity(&mut self, _gravity: VideoGravity) {}
    fn set_muted(&mut self, _muted: bool) {}
}

/// Visibility toggle of the play control overlaying a row.
pub trait PlayAffordance: Send {
    fn set_visible(&mut self, visible: bool);
}
