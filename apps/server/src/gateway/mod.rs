//! External-service gateways.
//!
//! Both gateways share one rule: they NEVER fail an order. An unconfigured
//! or unreachable collaborator degrades to "no link" and the order flow
//! continues. Failures are logged at warn and swallowed.

pub mod messaging;
pub mod payment;
