#![allow(clippy::new_without_default)]

pub mod asset;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod feed;
pub mod item;
pub mod playback;
pub mod util;

#[cfg(test)]
mod testing;
