use std::collections::VecDeque;

use nalgebra::Vector3;

use crate::core::domain::MixingConfig;

/// The accepted-particle subset of one past event, as retained by the pool.
/// Owned exclusively by the pool; destroyed on FIFO eviction.
#[derive(Debug, Clone)]
pub struct PooledEvent {
    pub codes: Vec<i32>,
    pub momenta: Vec<Vector3<f64>>,
    pub positions: Vec<Vector3<f64>>,
}

impl PooledEvent {
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Fixed-capacity FIFO buffers of past events, one per tracked centrality
/// class. A push into a class whose buffer already holds `capacity` entries
/// evicts the oldest. Untracked classes are a no-op.
#[derive(Debug, Clone)]
pub struct MixingPool {
    capacity: usize,
    pools: Vec<(usize, VecDeque<PooledEvent>)>,
}

impl MixingPool {
    pub fn new(config: &MixingConfig) -> Self {
        Self {
            capacity: config.capacity,
            pools: config
                .classes
                .iter()
                .map(|&c| (c, VecDeque::with_capacity(config.capacity + 1)))
                .collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn tracked(&self, class: usize) -> bool {
        self.pools.iter().any(|(c, _)| *c == class)
    }

    pub fn len(&self, class: usize) -> Option<usize> {
        self.pools.iter().find(|(c, _)| *c == class).map(|(_, q)| q.len())
    }

    pub fn oldest(&self, class: usize) -> Option<&PooledEvent> {
        self.pools
            .iter()
            .find(|(c, _)| *c == class)
            .and_then(|(_, q)| q.front())
    }

    /// Pushes an entry into the class's buffer, evicting beyond capacity.
    /// Once the buffer is warm (holds exactly `capacity` entries), returns
    /// the most recently pushed entry, which is the only one the correlation
    /// fill draws from.
    pub fn push(&mut self, class: usize, entry: PooledEvent) -> Option<&PooledEvent> {
        let capacity = self.capacity;
        let (_, queue) = self.pools.iter_mut().find(|(c, _)| *c == class)?;
        queue.push_back(entry);
        if queue.len() > capacity {
            queue.pop_front();
        }
        if queue.len() == capacity {
            queue.back()
        } else {
            None
        }
    }
}
