/// Number of per-chunk bias estimates kept for the moving average.
pub const DC_HISTORY_LEN: usize = 32;

/// Fixed-capacity ring of recent values; pushing past capacity drops the oldest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingMean<const N: usize> {
    values: [f64; N],
    head: usize,
    len: usize,
}

pub type DcHistory = RingMean<DC_HISTORY_LEN>;

impl<const N: usize> RingMean<N> {
    pub const fn new() -> Self {
        Self {
            values: [0.0; N],
            head: 0,
            len: 0,
        }
    }

    /// Appends `value`, overwriting the oldest entry once the ring is full.
    pub fn push(&mut self, value: f64) {
        self.values[self.head] = value;
        self.head = (self.head + 1) % N;
        self.len = (self.len + 1).min(N);
    }

    pub fn mean(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        Some(self.iter().sum::<f64>() / self.len as f64)
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let start = (self.head + N - self.len) % N;
        (0..self.len).map(move |i| self.values[(start + i) % N])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> Default for RingMean<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_ring_has_no_mean() {
        let ring = DcHistory::new();
        assert!(ring.is_empty());
        assert_eq!(ring.mean(), None);
        assert_eq!(DC_HISTORY_LEN, 32);
    }

    #[test]
    fn mean_of_partial_ring() {
        let mut ring = RingMean::<4>::new();
        ring.push(1.0);
        ring.push(2.0);
        assert_relative_eq!(ring.mean().unwrap(), 1.5);
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut ring = RingMean::<3>::new();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            ring.push(v);
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
        assert_relative_eq!(ring.mean().unwrap(), 4.0);
    }

    #[test]
    fn dc_history_keeps_last_32_chunks() {
        let mut ring = DcHistory::new();
        for i in 0..40 {
            ring.push(i as f64);
        }
        assert_eq!(ring.len(), DC_HISTORY_LEN);
        // 8..=39
        assert_relative_eq!(ring.mean().unwrap(), 23.5);
    }
}
