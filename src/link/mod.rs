//! The id index and link resolver: numbers chapters/sections and binds
//! `ref`/`link` targets once a whole document tree (includes already
//! spliced in) is available.

pub mod resolve;
pub mod types;

pub use resolve::link;
pub use types::Index;
