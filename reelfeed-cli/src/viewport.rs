use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportChange {
    Mount(usize),
    Unmount(usize),
    EnterVisible(usize),
    ExitVisible(usize),
}

/// Window over the feed rows.  Rows within `preload` of the visible range stay
/// mounted so their assets can settle before they scroll into view.
#[derive(Debug)]
pub struct Viewport {
    len: usize,
    visible: usize,
    preload: usize,
    first: usize,
}

impl Viewport {
    pub fn new(len: usize, visible: usize, preload: usize) -> Self {
        Self {
            len,
            visible,
            preload,
            first: 0,
        }
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn visible_rows(&self) -> Range<usize> {
        self.first..(self.first + self.visible).min(self.len)
    }

    pub fn mounted_rows(&self) -> Range<usize> {
        let start = self.first.saturating_sub(self.preload);
        let end = (self.first + self.visible + self.preload).min(self.len);
        start..end
    }

    /// Changes bringing an empty screen to the current window.
    pub fn open(&self) -> Vec<ViewportChange> {
        let mut changes: Vec<_> = self.mounted_rows().map(ViewportChange::Mount).collect();
        changes.extend(self.visible_rows().map(ViewportChange::EnterVisible));
        changes
    }

    pub fn scroll_by(&mut self, delta: isize) -> Vec<ViewportChange> {
        let first = self.first.saturating_add_signed(delta);
        self.scroll_to(first)
    }

    pub fn scroll_to(&mut self, first: usize) -> Vec<ViewportChange> {
        let first = first.min(self.len.saturating_sub(self.visible));
        let old_visible = self.visible_rows();
        let old_mounted = self.mounted_rows();
        self.first = first;
        let new_visible = self.visible_rows();
        let new_mounted = self.mounted_rows();

        // Rows leave the screen before they are unmounted, and are mounted
        // before they enter it.
        let mut changes = Vec::new();
        changes.extend(
            old_visible
                .clone()
                .filter(|row| !new_visible.contains(row))
                .map(ViewportChange::ExitVisible),
        );
        changes.extend(
            old_mounted
                .clone()
                .filter(|row| !new_mounted.contains(row))
                .map(ViewportChange::Unmount),
        );
        changes.extend(
            new_mounted
                .filter(|row| !old_mounted.contains(row))
                .map(ViewportChange::Mount),
        );
        changes.extend(
            new_visible
                .filter(|row| !old_visible.contains(row))
                .map(ViewportChange::EnterVisible),
        );
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::{ViewportChange::*, *};

    #[test]
    fn open_mounts_preload_and_shows_visible() {
        let viewport = Viewport::new(10, 2, 1);
        assert_eq!(
            viewport.open(),
            vec![Mount(0), Mount(1), Mount(2), EnterVisible(0), EnterVisible(1)]
        );
    }

    #[test]
    fn scrolling_down_one_row() {
        let mut viewport = Viewport::new(10, 2, 1);
        assert_eq!(
            viewport.scroll_by(1),
            vec![ExitVisible(0), Mount(3), EnterVisible(2)]
        );
        assert_eq!(viewport.scroll_by(1), vec![ExitVisible(1), Unmount(0), Mount(4), EnterVisible(3)]);
    }

    #[test]
    fn scrolling_up_past_the_top_is_clamped() {
        let mut viewport = Viewport::new(10, 2, 1);
        assert!(viewport.scroll_by(-3).is_empty());
        assert_eq!(viewport.first(), 0);
    }

    #[test]
    fn jumping_to_the_end_is_clamped() {
        let mut viewport = Viewport::new(5, 2, 1);
        let changes = viewport.scroll_to(100);
        assert_eq!(viewport.first(), 3);
        assert_eq!(viewport.visible_rows(), 3..5);
        assert_eq!(viewport.mounted_rows(), 2..5);
        assert_eq!(
            changes,
            vec![
                ExitVisible(0),
                ExitVisible(1),
                Unmount(0),
                Unmount(1),
                Mount(3),
                Mount(4),
                EnterVisible(3),
                EnterVisible(4),
            ]
        );
    }

    #[test]
    fn short_feed_fits_on_screen() {
        let viewport = Viewport::new(1, 3, 2);
        assert_eq!(viewport.visible_rows(), 0..1);
        assert_eq!(viewport.open(), vec![Mount(0), EnterVisible(0)]);
    }
}
