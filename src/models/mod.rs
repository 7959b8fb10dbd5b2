pub mod sample;
pub mod session;
