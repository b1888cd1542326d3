mod panel;
mod state;

pub use panel::{NotesPanel, Slice, SliceWrite, WindowPin};
pub use state::*;
