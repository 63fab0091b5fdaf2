//! Fixed-size rolling windows of samples, one per metric.
//!
//! A history is created full: every slot holds the fill value until real
//! samples replace it, so a renderer always has a complete window to scale
//! against. Internally a ring buffer; callers only ever see the samples
//! oldest-first.

/// Number of samples kept per metric, one per tick.
pub const HISTORY_LEN: usize = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricHistory<T> {
    buffer: Vec<T>,
    head: usize,
}

impl<T: Copy> MetricHistory<T> {
    /// Create a full window of `capacity` copies of `fill`.
    pub fn new(capacity: usize, fill: T) -> Self {
        assert!(capacity > 0, "history capacity must be non-zero");
        Self {
            buffer: vec![fill; capacity],
            head: 0,
        }
    }

    /// Evict the oldest sample and append `sample` as the newest.
    pub fn push(&mut self, sample: T) {
        self.buffer[self.head] = sample;
        self.head = (self.head + 1) % self.buffer.len();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer[self.head..]
            .iter()
            .chain(&self.buffer[..self.head])
    }

    pub fn latest(&self) -> T {
        let len = self.buffer.len();
        self.buffer[(self.head + len - 1) % len]
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().copied().collect()
    }
}

impl<T: Copy + PartialOrd> MetricHistory<T> {
    pub fn max(&self) -> T {
        self.iter()
            .copied()
            .reduce(|a, b| if b > a { b } else { a })
            .unwrap_or(self.buffer[0])
    }
}

impl<T: Copy + Default> Default for MetricHistory<T> {
    fn default() -> Self {
        Self::new(HISTORY_LEN, T::default())
    }
}
