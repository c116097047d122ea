/// Live geometry of the rendered article, as seen by the tracker. Positions
/// are document-relative pixel offsets.
pub trait Viewport {
    /// Top of the rendered element for a heading identifier, or `None` when
    /// the element is not currently in the tree.
    fn heading_top(&self, identifier: &str) -> Option<f64>;

    /// Current scroll position of the article container.
    fn scroll_top(&self) -> f64;
}

/// Tracks which heading the reader is currently in, for table-of-contents
/// highlighting.
///
/// A heading counts as active once its top has scrolled up to an offset line
/// below the viewport top; among those, the lowest one wins, and past the
/// last heading the last one sticks. Above the first heading nothing is
/// active, including after scrolling back up. Scroll events only mark the
/// tracker dirty — recomputation runs at most once per frame — while manual
/// activation (a TOC click) applies immediately and invalidates any
/// recomputation scheduled before it.
pub struct ActiveSectionTracker<V> {
    viewport: V,
    offset: f64,
    headings: Vec<String>,
    active: Option<String>,
    dirty: bool,
    epoch: u64,
    scheduled_epoch: u64,
    on_change: Option<Box<dyn FnMut(&str)>>,
}

impl<V: Viewport> ActiveSectionTracker<V> {
    pub fn new(viewport: V, offset: f64) -> Self {
        Self {
            viewport,
            offset,
            headings: Vec::new(),
            active: None,
            dirty: false,
            epoch: 0,
            scheduled_epoch: 0,
            on_change: None,
        }
    }

    /// Replace the tracked headings (a new article was rendered). Resets the
    /// active identifier.
    pub fn set_headings(&mut self, identifiers: Vec<String>) {
        self.headings = identifiers;
        self.active = None;
        self.dirty = false;
        self.epoch += 1;
    }

    pub fn on_active_change(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Note a scroll event. Cheap: schedules a recomputation for the next
    /// frame instead of recomputing on every event.
    pub fn note_scroll(&mut self) {
        if self.headings.is_empty() {
            return;
        }
        self.dirty = true;
        self.scheduled_epoch = self.epoch;
    }

    /// Frame tick. Runs the scheduled recomputation, if any is still valid.
    pub fn on_frame(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        if self.scheduled_epoch != self.epoch {
            // Scheduled before a manual activation; stale.
            return;
        }
        // A `None` result is applied too: scrolling back above the first
        // heading clears the highlight instead of keeping a stale one.
        let active = self.compute_active();
        self.set_active(active);
    }

    /// Manual activation, e.g. the user clicked a table-of-contents entry.
    /// Takes effect immediately and cannot be overridden by a recomputation
    /// scheduled before this call.
    pub fn activate(&mut self, identifier: &str) {
        self.epoch += 1;
        self.set_active(Some(identifier.to_owned()));
    }

    fn compute_active(&self) -> Option<String> {
        let line = self.viewport.scroll_top() + self.offset;
        let mut best: Option<(&str, f64)> = None;

        for identifier in &self.headings {
            let Some(top) = self.viewport.heading_top(identifier) else {
                continue;
            };
            if top > line {
                continue;
            }
            if best.is_none_or(|(_, best_top)| top >= best_top) {
                best = Some((identifier, top));
            }
        }

        best.map(|(identifier, _)| identifier.to_owned())
    }

    fn set_active(&mut self, identifier: Option<String>) {
        if self.active == identifier {
            return;
        }
        self.active = identifier;
        if let (Some(callback), Some(active)) = (self.on_change.as_mut(), self.active.as_deref()) {
            callback(active);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;

    struct FakeViewport {
        tops: HashMap<String, f64>,
        scroll: Rc<Cell<f64>>,
    }

    impl Viewport for FakeViewport {
        fn heading_top(&self, identifier: &str) -> Option<f64> {
            self.tops.get(identifier).copied()
        }

        fn scroll_top(&self) -> f64 {
            self.scroll.get()
        }
    }

    fn tracker(
        tops: &[(&str, f64)],
    ) -> (ActiveSectionTracker<FakeViewport>, Rc<Cell<f64>>) {
        let scroll = Rc::new(Cell::new(0.0));
        let viewport = FakeViewport {
            tops: tops
                .iter()
                .map(|(id, top)| ((*id).to_owned(), *top))
                .collect(),
            scroll: Rc::clone(&scroll),
        };
        let mut tracker = ActiveSectionTracker::new(viewport, 80.0);
        tracker.set_headings(tops.iter().map(|(id, _)| (*id).to_owned()).collect());
        (tracker, scroll)
    }

    fn scroll_to(
        tracker: &mut ActiveSectionTracker<FakeViewport>,
        scroll: &Rc<Cell<f64>>,
        position: f64,
    ) {
        scroll.set(position);
        tracker.note_scroll();
        tracker.on_frame();
    }

    #[test]
    fn nearest_heading_at_or_above_the_offset_line_wins() {
        let (mut tracker, scroll) = tracker(&[("a", 50.0), ("b", 400.0), ("c", 900.0)]);

        // Line at 420 + 80 = 500: both a and b are above it, b is nearest.
        scroll_to(&mut tracker, &scroll, 420.0);
        assert_eq!(tracker.active(), Some("b"));
    }

    #[test]
    fn last_heading_sticks_past_the_end() {
        let (mut tracker, scroll) = tracker(&[("a", 50.0), ("b", 400.0), ("c", 900.0)]);

        scroll_to(&mut tracker, &scroll, 5000.0);
        assert_eq!(tracker.active(), Some("c"));
    }

    #[test]
    fn nothing_active_before_the_first_heading() {
        let (mut tracker, scroll) = tracker(&[("a", 500.0), ("b", 900.0)]);

        scroll_to(&mut tracker, &scroll, 0.0);
        assert_eq!(tracker.active(), None);
    }

    #[test]
    fn scrolling_back_above_all_headings_clears_the_highlight() {
        let (mut tracker, scroll) = tracker(&[("a", 200.0), ("b", 600.0)]);

        scroll_to(&mut tracker, &scroll, 900.0);
        assert_eq!(tracker.active(), Some("b"));

        // Back to the top of the document: nothing qualifies anymore.
        scroll_to(&mut tracker, &scroll, 0.0);
        assert_eq!(tracker.active(), None);
    }

    #[test]
    fn missing_elements_are_skipped() {
        let (mut tracker, scroll) = tracker(&[("a", 50.0), ("c", 900.0)]);
        // "b" has no rendered element.
        tracker.set_headings(vec!["a".to_owned(), "b".to_owned(), "c".to_owned()]);

        scroll_to(&mut tracker, &scroll, 300.0);
        assert_eq!(tracker.active(), Some("a"));
    }

    #[test]
    fn no_headings_means_nothing_ever_activates() {
        let (mut tracker, scroll) = tracker(&[]);

        scroll_to(&mut tracker, &scroll, 1000.0);
        assert_eq!(tracker.active(), None);
    }

    #[test]
    fn scroll_events_coalesce_until_the_next_frame() {
        let (mut tracker, scroll) = tracker(&[("a", 50.0), ("b", 400.0)]);
        let recomputes = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&recomputes);
        tracker.on_active_change(move |_| counter.set(counter.get() + 1));

        scroll.set(500.0);
        tracker.note_scroll();
        tracker.note_scroll();
        tracker.note_scroll();
        assert_eq!(tracker.active(), None);

        tracker.on_frame();
        assert_eq!(tracker.active(), Some("b"));
        assert_eq!(recomputes.get(), 1);

        // No pending work: a frame without scrolls does nothing.
        tracker.on_frame();
        assert_eq!(recomputes.get(), 1);
    }

    #[test]
    fn manual_activation_survives_a_stale_recomputation() {
        let (mut tracker, scroll) = tracker(&[("a", 50.0), ("b", 400.0)]);

        scroll.set(500.0); // would resolve to "b"
        tracker.note_scroll();
        tracker.activate("a"); // user clicked the TOC before the frame ran
        assert_eq!(tracker.active(), Some("a"));

        tracker.on_frame(); // the pre-click recomputation must be dropped
        assert_eq!(tracker.active(), Some("a"));
    }

    #[test]
    fn change_callback_fires_only_on_transitions() {
        let (mut tracker, scroll) = tracker(&[("a", 50.0), ("b", 400.0)]);
        let changes = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&changes);
        tracker.on_active_change(move |_| counter.set(counter.get() + 1));

        scroll_to(&mut tracker, &scroll, 100.0);
        scroll_to(&mut tracker, &scroll, 120.0);
        scroll_to(&mut tracker, &scroll, 140.0);
        assert_eq!(tracker.active(), Some("a"));
        assert_eq!(changes.get(), 1);

        scroll_to(&mut tracker, &scroll, 500.0);
        assert_eq!(changes.get(), 2);
    }
}
