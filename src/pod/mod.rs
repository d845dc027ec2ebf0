mod nullable;
mod optional_index;

pub use nullable::*;
pub use optional_index::*;
