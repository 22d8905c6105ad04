//! Bounded window of recent loudness readings
//!
//! Fixed-capacity overwrite-oldest ring, so a long-running connection
//! stays O(window) in memory and trimming never reallocates.

/// Ring of the most recent loudness readings, oldest-first iteration
#[derive(Debug)]
pub struct SampleWindow {
    /// Backing storage, fixed at construction
    buf: Vec<f32>,
    /// Index of the oldest live reading
    head: usize,
    /// Number of live readings, `<= buf.len()`
    len: usize,
}

impl SampleWindow {
    /// Create a window retaining at most `capacity` readings
    pub fn new(capacity: usize) -> Self {
        // A zero-length window still needs one slot so push stays total
        let capacity = capacity.max(1);
        Self {
            buf: vec![0.0; capacity],
            head: 0,
            len: 0,
        }
    }

    /// Append a reading, overwriting the oldest once full
    pub fn push(&mut self, reading: f32) {
        let capacity = self.buf.len();
        if self.len == capacity {
            self.buf[self.head] = reading;
            self.head = (self.head + 1) % capacity;
        } else {
            let tail = (self.head + self.len) % capacity;
            self.buf[tail] = reading;
            self.len += 1;
        }
    }

    /// Arithmetic mean of the `count` most recent readings (all of them
    /// if fewer exist). `NaN` when the effective count is zero.
    pub fn recent_mean(&self, count: usize) -> f32 {
        let take = count.min(self.len);
        let capacity = self.buf.len();
        let start = self.head + self.len - take;
        let sum: f32 = (0..take).map(|i| self.buf[(start + i) % capacity]).sum();
        sum / take as f32
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Drop every reading
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_push_within_capacity() {
        let mut window = SampleWindow::new(4);
        window.push(1.0);
        window.push(2.0);
        assert_eq!(window.len(), 2);
        assert_eq!(window.recent_mean(2), 1.5);
    }

    #[test]
    fn test_overwrites_oldest_when_full() {
        let mut window = SampleWindow::new(3);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            window.push(v);
        }
        assert_eq!(window.len(), 3);
        // 3, 4, 5 survive
        assert_eq!(window.recent_mean(3), 4.0);
    }

    #[test]
    fn test_recent_mean_takes_newest() {
        let mut window = SampleWindow::new(10);
        for v in 1..=10 {
            window.push(v as f32);
        }
        // last four: 7 8 9 10
        assert_eq!(window.recent_mean(4), 8.5);
        // asking for more than held averages everything
        assert_eq!(window.recent_mean(100), 5.5);
    }

    #[test]
    fn test_recent_mean_of_nothing_is_nan() {
        let window = SampleWindow::new(4);
        assert!(window.recent_mean(4).is_nan());
        let mut window = SampleWindow::new(4);
        window.push(3.0);
        assert!(window.recent_mean(0).is_nan());
    }

    #[test]
    fn test_clear_empties_and_restarts() {
        let mut window = SampleWindow::new(3);
        window.push(1.0);
        window.push(2.0);
        window.clear();
        assert!(window.is_empty());
        window.push(7.0);
        assert_eq!(window.recent_mean(1), 7.0);
    }

    #[test]
    fn test_zero_capacity_clamps_to_one() {
        let mut window = SampleWindow::new(0);
        window.push(1.0);
        window.push(2.0);
        assert_eq!(window.len(), 1);
        assert_eq!(window.recent_mean(1), 2.0);
    }

    proptest! {
        #[test]
        fn prop_len_never_exceeds_capacity(
            capacity in 1usize..64,
            readings in proptest::collection::vec(-120.0f32..120.0, 0..512),
        ) {
            let mut window = SampleWindow::new(capacity);
            for reading in readings {
                window.push(reading);
                prop_assert!(window.len() <= capacity);
            }
        }

        #[test]
        fn prop_mean_within_input_range(
            readings in proptest::collection::vec(0.0f32..200.0, 1..128),
        ) {
            let mut window = SampleWindow::new(32);
            for &reading in &readings {
                window.push(reading);
            }
            let mean = window.recent_mean(16);
            prop_assert!(mean >= 0.0 && mean <= 200.0);
        }
    }
}
