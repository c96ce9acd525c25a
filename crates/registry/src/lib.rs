pub mod schema;
pub mod active;
pub mod catalog;
pub mod jobs;
pub mod error;

pub use schema::*;
pub use active::*;
pub use catalog::*;
pub use jobs::*;
pub use error::*;
