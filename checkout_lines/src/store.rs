use std::sync::Arc;

use des::{Agent, Response};
use log::debug;

use crate::{Admission, Event, Registers, ServiceTime, Stats, StoreStats, Ticket, WaitSample};

/// The registers plus the checkout flow of every customer.
///
/// Each customer runs arrive, route, request, wait, service, release and
/// record. The wait is measured when a register is granted; the sample is
/// only kept once service completes, so customers still in the store at
/// the horizon leave no sample behind.
pub struct Store {
    registers: Box<dyn Registers>,
    service_time: Arc<dyn ServiceTime>,
    stats: StoreStats,
}

impl Store {
    pub fn new(registers: Box<dyn Registers>, service_time: Arc<dyn ServiceTime>) -> Self {
        Store {
            registers,
            service_time,
            stats: StoreStats::default(),
        }
    }

    fn begin_service(&self, current_t: f64, lane: usize, ticket: Ticket) -> (f64, Event) {
        let waited = current_t - ticket.requested_at;
        let hold = self.service_time.service_time(&ticket.customer);
        debug!(
            "[{}] Customer {} starts at register {} after waiting {}",
            current_t, ticket.customer.id, lane, waited
        );
        (
            current_t + hold,
            Event::ServiceCompleted {
                lane,
                customer: ticket.customer,
                waited,
            },
        )
    }
}

impl Agent<Event, Stats> for Store {
    fn act(&mut self, current_t: f64, data: &Event) -> Response<Event, Stats> {
        match data {
            Event::CustomerArrived(customer) => {
                self.stats.arrivals += 1;
                let ticket = Ticket {
                    customer: *customer,
                    requested_at: current_t,
                };
                match self.registers.request(ticket) {
                    Admission::Granted { lane, ticket } => {
                        let (t, completion) = self.begin_service(current_t, lane, ticket);
                        Response::event(t, completion)
                    }
                    Admission::Queued { lane, ahead } => {
                        debug!(
                            "[{}] Customer {} queues at register {} behind {}",
                            current_t, customer.id, lane, ahead
                        );
                        self.stats.peak_waiting =
                            self.stats.peak_waiting.max(self.registers.waiting());
                        Response::new()
                    }
                }
            }
            Event::ServiceCompleted {
                lane,
                customer,
                waited,
            } => {
                debug!(
                    "[{}] Customer {} leaves register {}",
                    current_t, customer.id, lane
                );
                self.stats.served += 1;
                self.stats.samples.push(WaitSample {
                    customer: customer.id,
                    items: customer.items,
                    lane: *lane,
                    elapsed: *waited,
                    completed_at: current_t,
                });

                match self.registers.release(*lane) {
                    Some(next) => {
                        let (t, completion) = self.begin_service(current_t, *lane, next);
                        Response::event(t, completion)
                    }
                    None => Response::new(),
                }
            }
            _ => Response::new(),
        }
    }

    fn stats(&self) -> Stats {
        Stats::Store(StoreStats {
            waiting: self.registers.waiting(),
            in_service: self.registers.in_service(),
            ..self.stats.clone()
        })
    }
}
