use rand::Rng;

use crate::{error::Error, item::VideoItem};

pub const DEFAULT_STREAMS: &[&str] = &[
    "http://184.72.239.149/vod/smil:BigBuckBunny.smil/playlist.m3u8",
    "https://bitdash-a.akamaihd.net/content/MI201109210084_1/m3u8s/f08e80da-bf1d-4e3d-8899-f0f6155f6efa.m3u8",
    "http://devimages.apple.com/iphone/samples/bipbop/gear1/prog_index.m3u8",
    "https://bitmovin-a.akamaihd.net/content/playhouse-vr/m3u8s/105560.m3u8",
];

/// Fixed, non-empty list of items the feed is populated from.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<VideoItem>,
}

impl Catalog {
    pub fn new(items: Vec<VideoItem>) -> Result<Self, Error> {
        if items.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        Ok(Self { items })
    }

    pub fn from_streams<S: AsRef<str>>(streams: &[S]) -> Result<Self, Error> {
        let items = streams
            .iter()
            .map(|stream| VideoItem::from_stream(stream.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(items)
    }

    pub fn items(&self) -> &[VideoItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Builds `count` feed rows, asking `provider` for the item of each row.
    pub fn populate(&self, provider: &mut impl ItemProvider, count: usize) -> Vec<VideoItem> {
        (0..count).map(|row| provider.pick(self, row)).collect()
    }
}

/// Decides which catalog item a feed row shows.
pub trait ItemProvider {
    fn pick(&mut self, catalog: &Catalog, row: usize) -> VideoItem;
}

/// Uniformly random selection from an injected generator.
pub struct RandomProvider<R> {
    rng: R,
}

impl<R: Rng> RandomProvider<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> ItemProvider for RandomProvider<R> {
    fn pick(&mut self, catalog: &Catalog, _row: usize) -> VideoItem {
        let index = self.rng.random_range(0..catalog.len());
        catalog.items[index].clone()
    }
}

/// Walks the catalog in order, wrapping around at the end.
#[derive(Debug, Default)]
pub struct CyclicProvider;

impl ItemProvider for CyclicProvider {
    fn pick(&mut self, catalog: &Catalog, row: usize) -> VideoItem {
        catalog.items[row % catalog.len()].clone()
    }
}
