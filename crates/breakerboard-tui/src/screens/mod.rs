//! Screen components.

pub mod panel;

pub use panel::PanelScreen;
