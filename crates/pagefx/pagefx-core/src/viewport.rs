//! Registrations for reveal-on-scroll and parallax elements.

/// Elements currently tracked for reveal and parallax.
///
/// An element appears at most once in each set. Reveal items leave the set the moment
/// they are revealed, so the visible marker is applied once per element.
#[derive(Debug, Clone)]
pub struct ViewportObserver<E> {
    reveal: Vec<E>,
    parallax: Vec<E>,
}

impl<E> Default for ViewportObserver<E> {
    fn default() -> Self {
        Self {
            reveal: Vec::new(),
            parallax: Vec::new(),
        }
    }
}

impl<E: Clone + PartialEq> ViewportObserver<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a reveal item. Returns `false` if it is already tracked.
    pub fn observe_reveal(&mut self, el: E) -> bool {
        if self.reveal.contains(&el) {
            return false;
        }
        self.reveal.push(el);
        true
    }

    /// Mark a tracked reveal item as revealed and stop tracking it.
    ///
    /// `false` for elements that are not (or no longer) tracked.
    pub fn take_revealed(&mut self, el: &E) -> bool {
        match self.reveal.iter().position(|e| e == el) {
            Some(idx) => {
                self.reveal.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    /// Drop every reveal item for which `keep` is false and return the dropped ones.
    pub fn retain_reveal<F: FnMut(&E) -> bool>(&mut self, mut keep: F) -> Vec<E> {
        let mut dropped = Vec::new();
        self.reveal.retain(|el| {
            if keep(el) {
                true
            } else {
                dropped.push(el.clone());
                false
            }
        });
        dropped
    }

    /// Replace the parallax set, dropping duplicates.
    pub fn set_parallax(&mut self, items: Vec<E>) {
        self.parallax.clear();
        for el in items {
            if !self.parallax.contains(&el) {
                self.parallax.push(el);
            }
        }
    }

    pub fn reveal_items(&self) -> &[E] {
        &self.reveal
    }

    pub fn parallax_items(&self) -> &[E] {
        &self.parallax
    }

    pub fn is_observing(&self, el: &E) -> bool {
        self.reveal.contains(el)
    }
}
