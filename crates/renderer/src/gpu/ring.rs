use std::collections::VecDeque;

/// Fixed-size rotation of output slots.
///
/// The compute pass writes the front slot; `advance` moves it to the back
/// where it becomes the slot the render pass samples.
pub(crate) struct Ring<T> {
    slots: VecDeque<T>,
}

impl<T> Ring<T> {
    pub(crate) fn new(slots: impl IntoIterator<Item = T>) -> Self {
        let slots: VecDeque<T> = slots.into_iter().collect();
        assert!(!slots.is_empty(), "ring needs at least one slot");
        Self { slots }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Slot the next compute pass writes.
    pub(crate) fn front(&self) -> &T {
        &self.slots[0]
    }

    /// Slot written most recently.
    pub(crate) fn current(&self) -> &T {
        &self.slots[self.slots.len() - 1]
    }

    /// Rotates the front slot to the back and returns it.
    pub(crate) fn advance(&mut self) -> &T {
        self.slots.rotate_left(1);
        self.current()
    }
}
