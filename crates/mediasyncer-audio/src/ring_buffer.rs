//! Lock-free single-producer single-consumer ring buffer for real-time audio.
//!
//! The PCM feeder thread is the only producer and the cpal callback the
//! only consumer. Positions are monotonically increasing counters; the
//! slot index is the counter modulo capacity.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A SPSC ring buffer of interleaved f32 samples.
pub struct RingBuffer {
    slots: Box<[UnsafeCell<f32>]>,
    /// Total samples ever read
    head: AtomicUsize,
    /// Total samples ever written
    tail: AtomicUsize,
}

// SAFETY: the producer only touches slots in [tail, head + capacity) and the
// consumer only touches slots in [head, tail). The ranges never overlap and
// each side publishes its counter with Release after finishing its copies.
unsafe impl Send for RingBuffer {}
unsafe impl Sync for RingBuffer {}

impl RingBuffer {
    /// Create a ring holding up to `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: (0..capacity).map(|_| UnsafeCell::new(0.0)).collect(),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Samples waiting to be read.
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        tail.wrapping_sub(head)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Room left for the producer.
    fn free(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Producer side. Copies as much of `data` as fits; returns the count.
    pub fn push_slice(&self, data: &[f32]) -> usize {
        let count = data.len().min(self.free());
        let tail = self.tail.load(Ordering::Relaxed);
        let cap = self.capacity();
        for (i, sample) in data[..count].iter().enumerate() {
            // SAFETY: slot is in the producer's free region, see type docs.
            unsafe { *self.slots[(tail.wrapping_add(i)) % cap].get() = *sample };
        }
        self.tail.store(tail.wrapping_add(count), Ordering::Release);
        count
    }

    /// Consumer side. Fills `out` with available samples and pads the rest
    /// with silence. Returns the number of real samples copied.
    pub fn pop_into(&self, out: &mut [f32]) -> usize {
        let count = out.len().min(self.len());
        let head = self.head.load(Ordering::Relaxed);
        let cap = self.capacity();
        for (i, slot) in out[..count].iter_mut().enumerate() {
            // SAFETY: slot is in the consumer's filled region, see type docs.
            *slot = unsafe { *self.slots[(head.wrapping_add(i)) % cap].get() };
        }
        out[count..].fill(0.0);
        self.head.store(head.wrapping_add(count), Ordering::Release);
        count
    }
}
