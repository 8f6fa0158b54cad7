//! TUI pane rendering modules
//!
//! Each pane is a stateless `render_*` function; scroll offsets live in
//! [`App`](crate::ui::App) and are clamped by the pane that owns them.
//!
//! - [`functions`]: defined functions with their signatures
//! - [`source`]: program text with syntax highlighting and a marked line
//! - [`memory`]: the globals block as hex bytes with decoded scalar values
//! - [`console`]: captured `printf`/`assert` output
//! - [`status`]: status bar with the last outcome and keybindings

pub mod console;
pub mod functions;
pub mod memory;
pub mod source;
pub mod status;

pub use console::render_console_pane;
pub use functions::render_functions_pane;
pub use memory::render_memory_pane;
pub use source::{render_source_pane, LineMark, SourceScrollState};
pub use status::{render_status_bar, StatusKind};
