/// Controls how many elements a stage may produce before its consumer receives them.
///
/// Every channel created by a pipeline stage is sized by a `Capacity`. A [`crate::Pipeline`]
/// always uses [`Capacity::handoff`], a [`crate::BufferedPipeline`] uses the capacity it was
/// constructed with for every stage chained off it.
///
/// Example:
///
/// ```rust
/// use sluice::Capacity;
///
/// // a producer may run up to 64 elements ahead of its consumer
/// let capacity = Capacity::bounded(64);
/// assert_eq!(capacity.get(), 64);
///
/// // 0 means hand-off: a single slot, and every send waits for the consumer
/// assert_eq!(Capacity::from(0), Capacity::handoff());
/// assert_eq!(Capacity::handoff().get(), 1);
/// assert_ne!(Capacity::bounded(1), Capacity::handoff());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capacity(usize);

impl Capacity {
    /// Defines a hand-off capacity. The producer waits until its consumer received each element.
    pub fn handoff() -> Self {
        Self(0)
    }

    /// Defines a bounded capacity of `n` elements. `0` is treated as hand-off.
    pub fn bounded(n: usize) -> Self {
        if n == 0 {
            tracing::debug!("capacity 0 requested, using hand-off");
        }

        Self(n)
    }

    /// Number of slots of the channel behind a stage. Hand-off stages use a single slot.
    pub fn get(self) -> usize {
        self.0.max(1)
    }

    pub fn is_handoff(self) -> bool {
        self.0 == 0
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self::handoff()
    }
}

impl From<usize> for Capacity {
    fn from(n: usize) -> Self {
        Self::bounded(n)
    }
}
