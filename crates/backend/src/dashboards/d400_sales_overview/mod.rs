pub mod aggregation;
pub mod error;
pub mod export;
pub mod filter_state;
pub mod lookup;
pub mod presentation;
pub mod query_builder;
pub mod repository;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;
