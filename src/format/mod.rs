//! Text layout: list-item numbering and the column-oriented line
//! formatter used by the plain-text and legacy-hypertext writers.

pub mod line;
pub mod numbering;

pub use line::{FORCED_BREAK, LineFormatter};
pub use numbering::{Style, label, max_label_width};
