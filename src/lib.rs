pub mod config;
pub mod metrics;
pub mod notify;
pub mod output;
pub mod pipeline;
pub mod run;
pub mod schedule;
pub mod sheet;
pub mod store;
