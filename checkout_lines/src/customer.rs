use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::SimError;

/// A shopper heading for the registers. Ids follow creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: usize,
    pub items: u32,
}

impl Customer {
    pub fn new(id: usize, items: u32) -> Self {
        Customer { id, items }
    }
}

/// Creates customers with a uniformly drawn basket size
#[derive(Debug, Clone)]
pub struct CustomerGenerator {
    rng: StdRng,
    items: Uniform<u32>,
    next_id: usize,
}

impl CustomerGenerator {
    pub fn new(seed: u64, items: Uniform<u32>) -> Self {
        CustomerGenerator {
            rng: StdRng::seed_from_u64(seed),
            items,
            next_id: 0,
        }
    }

    /// Build the basket-size distribution for `min_items..=max_items`
    pub fn item_range(min_items: u32, max_items: u32) -> Result<Uniform<u32>, SimError> {
        Uniform::new_inclusive(min_items, max_items).map_err(|e| {
            SimError::invalid(format!(
                "item range [{}, {}] is unusable: {}",
                min_items, max_items, e
            ))
        })
    }

    pub fn generate(&mut self) -> Customer {
        let id = self.next_id;
        self.next_id += 1;
        Customer {
            id,
            items: self.items.sample(&mut self.rng),
        }
    }

    pub fn generated(&self) -> usize {
        self.next_id
    }
}
