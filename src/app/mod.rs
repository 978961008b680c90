pub mod batch;
pub mod common;
pub mod matcher;

#[cfg(test)]
pub(crate) mod fakes;
