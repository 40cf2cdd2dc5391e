//! Helper tools around the svparse parser
//!
//! - [`simshim`]: stands in for a simulator command line and writes the
//!   equivalent project XML
//! - [`fixtrace`]: indents the enter/exit/consume trace the parser emits

pub mod error;
pub mod fixtrace;
pub mod simshim;

pub use error::{ShimError, ShimResult};
