//! Fixed-capacity single-producer/single-consumer slot channel
//!
//! Unlike a plain `rtrb` ring of values, the slots here are pre-allocated
//! objects (sample blocks, paths, spectrum frames) that live for the whole
//! lifetime of the channel. Writing into a slot reuses its allocation, and
//! the consumer can trade its own object for the slot's contents instead of
//! copying them ([`FifoConsumer::exchange`]).
//!
//! # How it works
//!
//! Slot ownership travels through two `rtrb` queues of slot indices:
//!
//! ```text
//!   free:    consumer ──index──▶ producer
//!   filled:  producer ──index──▶ consumer
//! ```
//!
//! Whoever holds an index has exclusive access to that slot. Both queues
//! are wait-free, so neither side ever blocks, locks or allocates.
//!
//! # Usage
//!
//! ```ignore
//! let (mut tx, mut rx) = fifo(30, || Vec::<f32>::with_capacity(512));
//!
//! // Audio thread
//! if !tx.push(&block) { /* full: drop it */ }
//!
//! // UI thread
//! while rx.num_available_for_reading() > 0 {
//!     rx.exchange(&mut incoming);
//! }
//! ```

use std::cell::UnsafeCell;
use std::sync::Arc;

/// Default number of slots, enough for ~0.5 s of 512-sample blocks at 30 Hz pulls
pub const DEFAULT_FIFO_CAPACITY: usize = 30;

/// Decides whether handing a caller's object to a slot is safe
///
/// [`FifoConsumer::exchange`] swaps the caller's object into the slot it just
/// read. That is only acceptable when the object left behind is at least as
/// capable as the one taken out, otherwise the next producer write into the
/// slot could have to reallocate on the audio thread. Types that return
/// `false` get copied instead.
pub trait SlotExchange: Clone {
    /// Can `incoming` replace `slot` without shrinking it?
    fn can_swap_into(slot: &Self, incoming: &Self) -> bool;
}

impl<T: Clone> SlotExchange for Vec<T> {
    fn can_swap_into(slot: &Self, incoming: &Self) -> bool {
        incoming.capacity() >= slot.capacity()
    }
}

struct Slots<T> {
    cells: Box<[UnsafeCell<T>]>,
}

// SAFETY: a cell is only touched by the side currently holding its index,
// and index hand-off through rtrb is a release/acquire pair.
unsafe impl<T: Send> Sync for Slots<T> {}

impl<T> Slots<T> {
    /// SAFETY: caller must hold `index` (popped from one of the queues and
    /// not yet pushed back).
    #[allow(clippy::mut_from_ref)]
    #[inline]
    unsafe fn get_mut(&self, index: usize) -> &mut T {
        &mut *self.cells[index].get()
    }
}

/// Write half of a slot channel (one per producer thread)
pub struct FifoProducer<T> {
    slots: Arc<Slots<T>>,
    free: rtrb::Consumer<usize>,
    filled: rtrb::Producer<usize>,
}

/// Read half of a slot channel (one per consumer thread)
pub struct FifoConsumer<T> {
    slots: Arc<Slots<T>>,
    free: rtrb::Producer<usize>,
    filled: rtrb::Consumer<usize>,
}

/// Create a channel with `capacity` slots, each built by `make_slot`
///
/// This is the only place slots are allocated. Size them for the largest
/// item the producer will ever write so pushes never reallocate.
pub fn fifo<T, F>(capacity: usize, mut make_slot: F) -> (FifoProducer<T>, FifoConsumer<T>)
where
    T: SlotExchange + Send,
    F: FnMut() -> T,
{
    assert!(capacity > 0, "fifo capacity must be at least 1");

    let cells: Box<[UnsafeCell<T>]> = (0..capacity).map(|_| UnsafeCell::new(make_slot())).collect();
    let slots = Arc::new(Slots { cells });

    let (mut free_tx, free_rx) = rtrb::RingBuffer::new(capacity);
    let (filled_tx, filled_rx) = rtrb::RingBuffer::new(capacity);

    for index in 0..capacity {
        // Queue was created with exactly `capacity` slots
        let _ = free_tx.push(index);
    }

    let producer = FifoProducer {
        slots: Arc::clone(&slots),
        free: free_rx,
        filled: filled_tx,
    };
    let consumer = FifoConsumer {
        slots,
        free: free_tx,
        filled: filled_rx,
    };
    (producer, consumer)
}

/// Channel of `Vec`s pre-sized to `num_elements` zeros
pub fn vec_fifo<T: Clone + Default + Send>(
    capacity: usize,
    num_elements: usize,
) -> (FifoProducer<Vec<T>>, FifoConsumer<Vec<T>>) {
    fifo(capacity, || vec![T::default(); num_elements])
}

impl<T: SlotExchange> FifoProducer<T> {
    /// Copy `item` into the next free slot
    ///
    /// Returns `false` (and drops the write) when every slot is waiting to
    /// be read. Never blocks.
    pub fn push(&mut self, item: &T) -> bool {
        let Ok(index) = self.free.pop() else {
            return false;
        };
        // SAFETY: index came from the free queue, so the consumer is done with it
        let slot = unsafe { self.slots.get_mut(index) };
        slot.clone_from(item);
        let published = self.filled.push(index).is_ok();
        debug_assert!(published, "filled queue can never exceed slot count");
        true
    }

    /// Number of slots that can be written before the channel is full
    pub fn num_free(&self) -> usize {
        self.free.slots()
    }

    /// Total number of slots
    pub fn capacity(&self) -> usize {
        self.slots.cells.len()
    }
}

impl<T: SlotExchange> FifoConsumer<T> {
    /// Copy the oldest completed item into `item`
    ///
    /// Returns `false` when nothing is waiting. Never blocks.
    pub fn pull(&mut self, item: &mut T) -> bool {
        let Ok(index) = self.filled.pop() else {
            return false;
        };
        // SAFETY: index came from the filled queue, so the producer published it
        let slot = unsafe { self.slots.get_mut(index) };
        item.clone_from(slot);
        self.release(index);
        true
    }

    /// Take the oldest completed item, leaving `item`'s old contents in the slot
    ///
    /// Falls back to a copy when `item` cannot stand in for the slot's
    /// contents (see [`SlotExchange`]). Returns `false` when nothing is waiting.
    pub fn exchange(&mut self, item: &mut T) -> bool {
        let Ok(index) = self.filled.pop() else {
            return false;
        };
        // SAFETY: index came from the filled queue, so the producer published it
        let slot = unsafe { self.slots.get_mut(index) };
        if T::can_swap_into(slot, item) {
            std::mem::swap(slot, item);
        } else {
            item.clone_from(slot);
        }
        self.release(index);
        true
    }

    /// Number of completed pushes not yet read
    pub fn num_available_for_reading(&self) -> usize {
        self.filled.slots()
    }

    /// Total number of slots
    pub fn capacity(&self) -> usize {
        self.slots.cells.len()
    }

    fn release(&mut self, index: usize) {
        let returned = self.free.push(index).is_ok();
        debug_assert!(returned, "free queue can never exceed slot count");
    }
}

/// Draining iterator over everything currently readable
///
/// Yields each waiting item once, oldest first, then ends. Items pushed
/// after the drain started are also picked up; a finished drain stays
/// finished only until the producer pushes again.
pub struct Drain<'a, T: SlotExchange + Default> {
    consumer: &'a mut FifoConsumer<T>,
}

impl<T: SlotExchange + Default> FifoConsumer<T> {
    /// Drain all readable items (allocates one `T` per item; UI side only)
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain { consumer: self }
    }
}

impl<T: SlotExchange + Default> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let mut item = T::default();
        if self.consumer.exchange(&mut item) {
            Some(item)
        } else {
            None
        }
    }
}
