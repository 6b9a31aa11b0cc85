//! How long a customer holds a register.

use crate::Customer;

/// Holding time at a register as a pure function of the customer.
///
/// Any `Fn(&Customer) -> f64` closure can be used in place of the
/// default linear formula.
pub trait ServiceTime: Send + Sync {
    fn service_time(&self, customer: &Customer) -> f64;
}

impl<F> ServiceTime for F
where
    F: Fn(&Customer) -> f64 + Send + Sync,
{
    fn service_time(&self, customer: &Customer) -> f64 {
        self(customer)
    }
}

/// `items * per_item + overhead`: scanning time plus the time to pay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearServiceTime {
    pub per_item: f64,
    pub overhead: f64,
}

impl LinearServiceTime {
    pub fn new(per_item: f64, overhead: f64) -> Self {
        LinearServiceTime { per_item, overhead }
    }
}

impl Default for LinearServiceTime {
    fn default() -> Self {
        LinearServiceTime {
            per_item: 0.25,
            overhead: 2.0,
        }
    }
}

impl ServiceTime for LinearServiceTime {
    fn service_time(&self, customer: &Customer) -> f64 {
        customer.items as f64 * self.per_item + self.overhead
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_formula() {
        let service = LinearServiceTime::default();
        assert_eq!(service.service_time(&Customer::new(0, 4)), 3.0);
        assert_eq!(service.service_time(&Customer::new(1, 1)), 2.25);
        assert_eq!(service.service_time(&Customer::new(2, 20)), 7.0);
    }

    #[test]
    fn closures_are_pluggable() {
        let flat = |_: &Customer| 1.5;
        let boxed: Box<dyn ServiceTime> = Box::new(flat);
        assert_eq!(boxed.service_time(&Customer::new(0, 17)), 1.5);
    }
}
