//! Picker module - constrained random draws from a fixed pool
//!
//! A draw can never repeat an element whose index sits in the sliding
//! recent-use window. The engine runs one picker over the 5 piece colors
//! (window 3) and one over the 7 shape kinds (window 5).

use std::collections::VecDeque;

use crate::core::rng::SimpleRng;
use crate::types::ConfigError;

/// Draws pool elements such that the last `window` picks cannot repeat.
#[derive(Debug, Clone)]
pub struct NonRepeatingPicker<T> {
    pool: Vec<T>,
    window: usize,
    /// FIFO of recently drawn indices, oldest first. Length stays `window`.
    recent: VecDeque<usize>,
    rng: SimpleRng,
}

impl<T: Copy> NonRepeatingPicker<T> {
    /// Create a picker over `pool` with the given no-repeat window.
    ///
    /// The window is pre-seeded with distinct shuffled indices so the very
    /// first draws are already constrained. Fails if the pool is empty or
    /// the window is not below the pool size.
    pub fn new(pool: Vec<T>, window: usize, seed: u32) -> Result<Self, ConfigError> {
        if pool.is_empty() || window >= pool.len() {
            return Err(ConfigError::InvalidRepeatWindow {
                window,
                pool: pool.len(),
            });
        }

        let mut rng = SimpleRng::new(seed);
        let mut indices: Vec<usize> = (0..pool.len()).collect();
        rng.shuffle(&mut indices);
        let recent: VecDeque<usize> = indices.into_iter().take(window).collect();

        Ok(Self {
            pool,
            window,
            recent,
            rng,
        })
    }

    /// Draw the next element.
    ///
    /// Picks uniformly among indices outside the recent window, then evicts
    /// the oldest window entry and records the pick.
    pub fn next(&mut self) -> T {
        let available: Vec<usize> = (0..self.pool.len())
            .filter(|index| !self.recent.contains(index))
            .collect();
        let pick = available[self.rng.next_range(available.len() as u32) as usize];

        self.recent.push_back(pick);
        while self.recent.len() > self.window {
            self.recent.pop_front();
        }

        self.pool[pick]
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn window(&self) -> usize {
        self.window
    }
}
