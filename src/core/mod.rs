pub mod cache;
pub mod fs;
pub mod matching;
pub mod naming;
pub mod notify;
pub mod provider;
pub mod text;
