//! Application crate for the Iris classifier: the prediction service, the
//! dashboard, and the blocking client they share.
pub mod client;
pub mod config;
pub mod dashboard;
pub mod service;
