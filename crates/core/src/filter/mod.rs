mod temporal;
mod window;

pub use temporal::{FilterState, TemporalFilter};
pub use window::PreFilter;
