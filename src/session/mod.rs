mod dice_session;
mod frame_clock;
mod tray;

pub use dice_session::*;
pub use frame_clock::*;
pub use tray::*;

#[cfg(test)]
mod dice_session_tests;
#[cfg(test)]
mod frame_clock_tests;
