//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! A function explorer over a loaded program:
//!
//! - **[`app`]**: explorer state, keyboard event loop, pane focus
//! - **[`panes`]**: stateless render functions for each visible pane (functions,
//!   source, globals memory, console, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! Construct an [`App`] from an [`Interpreter`] and call [`App::run`]. Globals
//! persist across calls made from the explorer until reset.
//!
//! [`Interpreter`]: crate::interpreter::Interpreter
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
