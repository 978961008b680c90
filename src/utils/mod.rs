mod errors;

pub use errors::{Error, MatchError};

pub type SubarrResult<T> = Result<T, Error>;
