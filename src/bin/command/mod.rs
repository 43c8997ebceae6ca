mod graph;
mod outcast;
mod query;
mod serialize;

pub use graph::*;
pub use outcast::*;
pub use query::*;
pub use serialize::*;
