//! Stream rewriting passes: tail-call elimination and entry/exit
//! instrumentation.
//!
//! Both passes mutate [`retread_model::Method`] streams in place.
//!
//! - [`is_tail_recursive`] / [`optimize`] — detect methods ending in a
//!   recursive tail call and replace the call with argument stores plus
//!   a jump back to the start of the body.
//! - [`instrument`] / [`instrument_class`] — splice hook calls into every
//!   method entry and exit point, feeding a `retread_profile` recorder.

pub mod error;

mod instrument;
mod tailcall;

pub use error::RewriteError;
pub use instrument::{enter_patch, exit_patch, instrument, instrument_class};
pub use tailcall::{is_tail_recursive, optimize, optimize_class, tail_recursive_methods};
