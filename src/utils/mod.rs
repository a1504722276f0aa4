mod constants;
mod errors;
mod math_helpers;
mod session_config;

pub use constants::*;
pub use errors::*;
pub use math_helpers::*;
pub use session_config::*;
