//! Bounded hand-off queue between the acceptor and the worker pool.
//!
//! # Responsibilities
//! - FIFO transfer of accepted sockets to whichever worker is free
//! - Block the acceptor when all slots are taken (backpressure)
//! - Block workers when no connection is waiting
//!
//! # Design Decisions
//! - Fixed circular slot array; two counting semaphores track free and
//!   filled slots, a mutex serializes the index updates
//! - No timeouts and no cancellation: production only stops at process exit

use tokio::sync::{Mutex, Semaphore};

/// A fixed-capacity FIFO queue whose operations suspend instead of failing.
///
/// `push` waits for a free slot; `pop` waits for an item. Items are never
/// lost and never observed twice.
pub struct HandoffQueue<T> {
    slots: Mutex<Slots<T>>,
    /// Permits for empty slots; acquired by producers.
    free: Semaphore,
    /// Permits for occupied slots; acquired by consumers.
    filled: Semaphore,
    capacity: usize,
}

struct Slots<T> {
    buf: Vec<Option<T>>,
    head: usize,
    tail: usize,
}

impl<T: Send> HandoffQueue<T> {
    /// Create a queue with the given number of slots.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        Self {
            slots: Mutex::new(Slots {
                buf: (0..capacity).map(|_| None).collect(),
                head: 0,
                tail: 0,
            }),
            free: Semaphore::new(capacity),
            filled: Semaphore::new(0),
            capacity,
        }
    }

    /// Enqueue an item, waiting until a slot is free.
    pub async fn push(&self, item: T) {
        let permit = self
            .free
            .acquire()
            .await
            .expect("queue semaphore closed unexpectedly");
        permit.forget();

        {
            let mut slots = self.slots.lock().await;
            let tail = slots.tail;
            debug_assert!(slots.buf[tail].is_none());
            slots.buf[tail] = Some(item);
            slots.tail = (tail + 1) % self.capacity;
        }

        self.filled.add_permits(1);
    }

    /// Dequeue the oldest item, waiting until one exists.
    pub async fn pop(&self) -> T {
        let permit = self
            .filled
            .acquire()
            .await
            .expect("queue semaphore closed unexpectedly");
        permit.forget();

        let item = {
            let mut slots = self.slots.lock().await;
            let head = slots.head;
            let item = slots.buf[head].take().expect("filled slot was empty");
            slots.head = (head + 1) % self.capacity;
            item
        };

        self.free.add_permits(1);
        item
    }

    /// Number of slots in the queue.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
