use std::collections::VecDeque;

/// A bucketed priority queue with one FIFO bucket per priority value.
///
/// Items with equal priority pop in insertion order. The bucket array grows
/// to fit the largest priority pushed so far, and a bitmap of non-empty
/// buckets keeps pop-min proportional to the number of 64-bucket words.
pub struct PriorityQueue<T> {
    buckets: Vec<VecDeque<T>>,
    bitmap: Vec<u64>,
    len: usize,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            bitmap: Vec::new(),
            len: 0,
        }
    }

    pub fn push(&mut self, priority: u32, item: T) {
        let priority = priority as usize;
        if priority >= self.buckets.len() {
            self.buckets.resize_with(priority + 1, VecDeque::new);
            self.bitmap.resize(priority / 64 + 1, 0);
        }
        self.buckets[priority].push_back(item);
        self.bitmap[priority / 64] |= 1u64 << (priority % 64);
        self.len += 1;
    }

    pub fn pop_min(&mut self) -> Option<T> {
        // Find first non-empty word
        let word_idx = self.bitmap.iter().position(|&word| word != 0)?;

        // Find first non-empty bucket in that word
        let bit_idx = self.bitmap[word_idx].trailing_zeros() as usize;
        let priority = word_idx * 64 + bit_idx;

        let item = self.buckets[priority].pop_front()?;
        self.len -= 1;

        if self.buckets[priority].is_empty() {
            self.bitmap[word_idx] &= !(1u64 << bit_idx);
        }

        Some(item)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
