mod face_table;
mod resolver;

pub use face_table::*;
pub use resolver::*;
