//! Uploaded document handles and the polling policy shared by the
//! knowledge-base loader and the paper analyzer.

mod handle;
mod poll;

pub use handle::*;
pub use poll::*;
