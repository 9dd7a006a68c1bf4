//! String types: owning `FastString`, borrowed `StrSlice`, and numeric
//! parsing
//!
//! The borrowed slice carries all search, split, iteration, and
//! classification logic; the owning string adds allocation, growth, and
//! the NUL-termination contract, delegating everything else.

pub mod owned;
pub mod parse;
pub mod slice;

pub use owned::FastString;
pub use parse::{atof, atol};
pub use slice::{CharSlices, Chars, StrSlice, StrSliceMut};
