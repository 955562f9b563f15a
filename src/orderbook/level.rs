//! A single price level: a FIFO queue of orders all resting at the same price.

use super::order::Order;
use std::collections::VecDeque;
use std::sync::Mutex;

/// All orders resting at one price, in strict arrival order.
///
/// Mutating access goes through a `Mutex` rather than the teacher crate's
/// `DashMap`-plus-`SegQueue` hybrid: that design earns its keep under
/// per-level lock-free concurrent access, but this engine's concurrency
/// model (§5) serialises every mutation behind one exchange-wide lock
/// already, so a second fine-grained lock-free layer here would add
/// complexity without adding concurrency. A plain `VecDeque` behind a
/// `Mutex` gives the same peek-the-head-and-mutate-in-place semantics the
/// reference implementation's `deque` does.
pub struct PriceLevel {
    orders: Mutex<VecDeque<Order>>,
}

impl PriceLevel {
    pub fn new() -> Self {
        PriceLevel {
            orders: Mutex::new(VecDeque::new()),
        }
    }

    /// Appends `order` to the back of the FIFO.
    pub fn push_back(&self, order: Order) {
        self.orders.lock().expect("price level mutex poisoned").push_back(order);
    }

    /// Total resting quantity across every order at this level.
    pub fn total_quantity(&self) -> u32 {
        self.orders
            .lock()
            .expect("price level mutex poisoned")
            .iter()
            .map(|o| o.quantity)
            .sum()
    }

    /// Number of orders resting at this level.
    pub fn len(&self) -> usize {
        self.orders.lock().expect("price level mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns the order with `id`, wherever it sits in the queue.
    pub fn remove(&self, id: u64) -> Option<Order> {
        let mut guard = self.orders.lock().expect("price level mutex poisoned");
        let pos = guard.iter().position(|o| o.id == id)?;
        guard.remove(pos)
    }

    /// Runs `f` against the head order (index 0), removing it first if `f`
    /// reports it should be removed (fully filled). Returns `None` if the
    /// level is empty.
    ///
    /// `f` receives a mutable reference to the head order and must return
    /// `true` if the order is now fully depleted and should be dropped.
    pub fn with_head_mut<R>(&self, f: impl FnOnce(&mut Order) -> (R, bool)) -> Option<R> {
        let mut guard = self.orders.lock().expect("price level mutex poisoned");
        let head = guard.front_mut()?;
        let (result, remove_head) = f(head);
        if remove_head {
            guard.pop_front();
        }
        Some(result)
    }

    /// A snapshot clone of every order at this level, in FIFO order.
    pub fn snapshot(&self) -> Vec<Order> {
        self.orders.lock().expect("price level mutex poisoned").iter().cloned().collect()
    }
}

impl Default for PriceLevel {
    fn default() -> Self {
        Self::new()
    }
}
