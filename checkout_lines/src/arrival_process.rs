use des::{Agent, Response};
use log::debug;

use crate::{ArrivalStats, CustomerGenerator, Event, Stats};

/// Admits the opening crowd at `Start`, then one customer per interval.
///
/// The initial population all arrives at the start instant in generation
/// order. Each periodic arrival is scheduled one interval ahead, at the tick
/// before it, and arrivals repeat until the horizon cuts them off.
pub struct ArrivalProcess {
    generator: CustomerGenerator,
    initial_population: usize,
    arrival_interval: f64,
}

impl ArrivalProcess {
    pub fn new(
        generator: CustomerGenerator,
        initial_population: usize,
        arrival_interval: f64,
    ) -> Self {
        ArrivalProcess {
            generator,
            initial_population,
            arrival_interval,
        }
    }

    /// Book the next customer together with the tick that follows it.
    ///
    /// The customer is drawn now so its arrival holds an earlier sequence
    /// number than any completion scheduled for the same instant later on.
    fn book_next(&mut self, current_t: f64) -> [(f64, Event); 2] {
        let next_t = current_t + self.arrival_interval;
        [
            (next_t, Event::CustomerArrived(self.generator.generate())),
            (next_t, Event::NextArrival),
        ]
    }
}

impl Agent<Event, Stats> for ArrivalProcess {
    fn act(&mut self, current_t: f64, data: &Event) -> Response<Event, Stats> {
        match data {
            Event::Start => {
                debug!(
                    "[{}] Store opens with {} customers",
                    current_t, self.initial_population
                );
                let mut events: Vec<(f64, Event)> = (0..self.initial_population)
                    .map(|_| (current_t, Event::CustomerArrived(self.generator.generate())))
                    .collect();
                events.extend(self.book_next(current_t));
                Response::events(events)
            }
            Event::NextArrival => {
                debug!(
                    "[{}] Customer {} booked",
                    current_t,
                    self.generator.generated()
                );
                Response::events(self.book_next(current_t).into())
            }
            _ => Response::new(),
        }
    }

    fn stats(&self) -> Stats {
        Stats::Arrivals(ArrivalStats {
            generated: self.generator.generated(),
        })
    }
}
