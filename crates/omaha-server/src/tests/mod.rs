//! Behavioural suites that drive a live server over HTTP.

mod exchange_behaviour;
mod support;
