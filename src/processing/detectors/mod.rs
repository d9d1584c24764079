pub mod adaptive_threshold;

// DETECTOR COMPONENT ----------------------------------------------------------

pub trait DetectorInstance: Send {
    fn id(&self) -> &str;

    fn process_sample(&mut self, sample: f64) -> adaptive_threshold::DetectorStep;

    fn reset(&mut self);
}

// BUFFER COMPONENT ------------------------------------------------------------

/// Fixed-capacity trailing window. Once full, each `add` overwrites the oldest
/// element.
#[derive(Clone, Debug)]
pub struct RingBuffer {
    buffer: Vec<f64>,
    capacity: usize,
    start: usize,
    len: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity],
            capacity,
            start: 0,
            len: 0,
        }
    }

    pub fn add(&mut self, element: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.len < self.capacity {
            let end = (self.start + self.len) % self.capacity;
            self.buffer[end] = element;
            self.len += 1;
        } else {
            // Overwrite oldest
            self.buffer[self.start] = element;
            self.start = (self.start + 1) % self.capacity;
        }
    }

    /// Element `index` positions after the oldest one.
    pub fn get(&self, index: usize) -> Option<f64> {
        if index >= self.len {
            return None;
        }
        Some(self.buffer[(self.start + index) % self.capacity])
    }

    pub fn last(&self) -> Option<f64> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    pub fn clear(&mut self) {
        self.start = 0;
        self.len = 0;
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len).map(move |i| self.buffer[(self.start + i) % self.capacity])
    }

    /// Arithmetic mean of the buffered values, summed oldest to newest.
    pub fn mean(&self) -> f64 {
        self.iter().sum::<f64>() / self.len as f64
    }

    /// Population standard deviation (divides by the count, not count - 1).
    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        let variance = self.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / self.len as f64;
        variance.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_keeps_chronological_order() {
        let mut buffer = RingBuffer::new(3);
        for x in [1.0, 2.0, 3.0, 4.0, 5.0] {
            buffer.add(x);
        }

        assert!(buffer.is_full());
        assert_eq!(buffer.iter().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
        assert_eq!(buffer.get(0), Some(3.0));
        assert_eq!(buffer.last(), Some(5.0));
        assert_eq!(buffer.get(3), None);
    }

    #[test]
    fn test_ring_buffer_partial_fill() {
        let mut buffer = RingBuffer::new(4);
        buffer.add(2.0);
        buffer.add(4.0);

        assert_eq!(buffer.len(), 2);
        assert!(!buffer.is_full());
        assert_eq!(buffer.mean(), 3.0);
        assert_eq!(buffer.std_dev(), 1.0);
    }

    #[test]
    fn test_population_std_dev() {
        let mut buffer = RingBuffer::new(8);
        for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            buffer.add(x);
        }

        assert_eq!(buffer.mean(), 5.0);
        assert_eq!(buffer.std_dev(), 2.0);
    }

    #[test]
    fn test_clear() {
        let mut buffer = RingBuffer::new(2);
        buffer.add(1.0);
        buffer.clear();

        assert!(buffer.is_empty());
        assert_eq!(buffer.last(), None);
    }
}
