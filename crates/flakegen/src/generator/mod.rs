mod builder;
mod id_generator;
mod iter;
mod mutex;

pub use builder::*;
pub use id_generator::*;
pub use iter::*;
pub use mutex::*;
