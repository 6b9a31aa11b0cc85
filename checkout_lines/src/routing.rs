use crate::Snapshot;

/// Picks the lane a new arrival joins from a fresh snapshot of every lane.
pub trait RoutingPolicy: Send + Sync {
    fn choose(&self, lanes: &[Snapshot]) -> usize;
}

impl<F> RoutingPolicy for F
where
    F: Fn(&[Snapshot]) -> usize + Send + Sync,
{
    fn choose(&self, lanes: &[Snapshot]) -> usize {
        self(lanes)
    }
}

/// Join the lane with the least assigned work, lowest index on ties
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestQueue;

impl RoutingPolicy for ShortestQueue {
    fn choose(&self, lanes: &[Snapshot]) -> usize {
        shortest_queue(lanes)
    }
}

/// Index of the lane minimising `queue_length + active_count`.
///
/// The first minimum wins. An empty slice yields 0.
pub fn shortest_queue(lanes: &[Snapshot]) -> usize {
    lanes
        .iter()
        .enumerate()
        .min_by_key(|(_, lane)| lane.load())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane(queue_length: usize, active_count: usize) -> Snapshot {
        Snapshot {
            queue_length,
            active_count,
            capacity: 1,
        }
    }

    #[test]
    fn counts_customers_in_service() {
        // lane 0 has nobody waiting but is busy; lane 1 is idle
        let lanes = [lane(0, 1), lane(0, 0), lane(2, 1)];
        assert_eq!(shortest_queue(&lanes), 1);
    }

    #[test]
    fn waiting_and_serving_weigh_the_same() {
        let lanes = [lane(2, 1), lane(1, 1), lane(3, 0)];
        assert_eq!(shortest_queue(&lanes), 1);
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let lanes = [lane(1, 1), lane(0, 1), lane(1, 0), lane(0, 1)];
        for _ in 0..10 {
            assert_eq!(ShortestQueue.choose(&lanes), 1);
        }
        let idle = [lane(0, 0); 3];
        assert_eq!(shortest_queue(&idle), 0);
    }

    #[test]
    fn single_lane_and_empty() {
        assert_eq!(shortest_queue(&[lane(9, 1)]), 0);
        assert_eq!(shortest_queue(&[]), 0);
    }
}
