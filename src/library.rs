//! Library module: scans a directory of chiptune files into a
//! System → Game → Track index and exposes a browsable tree over it.

mod model;
mod order;
mod scan;
mod tree;

pub use model::{Library, Track};
pub use scan::scan;
pub use tree::LibBrowser;
