//! Font program helpers.

pub mod truetype;

pub use truetype::UnicodeCmap;
