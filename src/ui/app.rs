//! Function explorer state and event loop

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::ui::panes::{self, LineMark, SourceScrollState, StatusKind};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Functions,
    Source,
    Memory,
    Console,
}

impl FocusedPane {
    /// Clockwise: functions -> source -> memory -> console
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Functions => FocusedPane::Source,
            FocusedPane::Source => FocusedPane::Memory,
            FocusedPane::Memory => FocusedPane::Console,
            FocusedPane::Console => FocusedPane::Functions,
        }
    }
}

/// The main application state
pub struct App {
    pub interpreter: Interpreter,

    /// The source code the program was compiled from
    pub source_code: String,

    pub focused_pane: FocusedPane,

    /// Index into the program's function list
    pub selected_function: usize,

    /// Per-pane scroll offsets
    pub source_scroll: SourceScrollState,
    pub memory_scroll: usize,
    pub console_scroll: usize,

    /// Line of the last runtime error, cleared when the selection moves
    pub error_line: Option<usize>,

    pub should_quit: bool,

    pub status_message: String,
    pub status_kind: StatusKind,
}

impl App {
    pub fn new(interpreter: Interpreter, source_code: String) -> Self {
        let selected_function = interpreter
            .program()
            .function_index
            .get("main")
            .copied()
            .unwrap_or(0);

        App {
            interpreter,
            source_code,
            focused_pane: FocusedPane::Functions,
            selected_function,
            source_scroll: SourceScrollState::default(),
            memory_scroll: 0,
            console_scroll: 0,
            error_line: None,
            should_quit: false,
            status_message: String::from("Ready!"),
            status_kind: StatusKind::Ready,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Line to mark in the source pane
    fn line_mark(&self) -> Option<LineMark> {
        if let Some(line) = self.error_line {
            return Some(LineMark::Error(line));
        }
        self.interpreter
            .program()
            .functions
            .get(self.selected_function)
            .map(|f| LineMark::Selected(f.location.line))
    }

    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        // Left: functions over console. Right: source over globals.
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(main_chunks[0]);
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[0]);
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(columns[1]);

        let mark = self.line_mark();

        panes::render_functions_pane(
            frame,
            left_rows[0],
            &self.interpreter.program().functions,
            self.selected_function,
            self.focused_pane == FocusedPane::Functions,
        );

        panes::render_console_pane(
            frame,
            left_rows[1],
            self.interpreter.console(),
            self.focused_pane == FocusedPane::Console,
            &mut self.console_scroll,
        );

        panes::render_source_pane(
            frame,
            right_rows[0],
            &self.source_code,
            mark,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        panes::render_memory_pane(
            frame,
            right_rows[1],
            &self.interpreter,
            self.focused_pane == FocusedPane::Memory,
            &mut self.memory_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            self.status_kind,
            self.interpreter.arena(),
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab => self.focused_pane = self.focused_pane.next(),
            KeyCode::Enter => self.call_selected(),
            KeyCode::Char('r') => self.run_main(),
            KeyCode::Char('g') => self.reset_globals(),
            KeyCode::Up => self.scroll(-1),
            KeyCode::Down => self.scroll(1),
            _ => {}
        }
    }

    fn scroll(&mut self, delta: isize) {
        let step = |value: usize| value.saturating_add_signed(delta);
        match self.focused_pane {
            FocusedPane::Functions => {
                let count = self.interpreter.program().functions.len();
                self.selected_function =
                    step(self.selected_function).min(count.saturating_sub(1));
                self.error_line = None;
            }
            // Moving the marked line down the screen scrolls the text up
            FocusedPane::Source => {
                if let Some(row) = self.source_scroll.target_line_row {
                    self.source_scroll.target_line_row =
                        Some(row.saturating_add_signed(-delta));
                }
            }
            FocusedPane::Memory => self.memory_scroll = step(self.memory_scroll),
            FocusedPane::Console => self.console_scroll = step(self.console_scroll),
        }
    }

    /// Invoke the selected function if it takes no arguments
    fn call_selected(&mut self) {
        let Some(function) = self.interpreter.program().functions.get(self.selected_function)
        else {
            return;
        };
        let name = function.name.clone();
        let arity = function.params.len();

        if arity > 0 {
            self.status_kind = StatusKind::Ready;
            self.status_message = format!(
                "{} takes {} argument(s); only parameterless functions can be called",
                name, arity
            );
            return;
        }

        match self.interpreter.call(&name, &[]) {
            Ok(value) => self.succeed(format!("{}() => {}", name, value)),
            Err(e) => self.fail(e),
        }
    }

    fn run_main(&mut self) {
        match self.interpreter.run() {
            Ok(status) => self.succeed(format!("main returned {}", status)),
            Err(e) => self.fail(e),
        }
    }

    fn reset_globals(&mut self) {
        match self.interpreter.reset_globals() {
            Ok(()) => self.succeed("Globals reset".to_string()),
            Err(e) => self.fail(e),
        }
    }

    fn succeed(&mut self, message: String) {
        self.status_kind = StatusKind::Success;
        self.status_message = message;
        self.error_line = None;
        self.console_scroll = usize::MAX;
    }

    fn fail(&mut self, error: RuntimeError) {
        self.status_kind = StatusKind::Failure;
        self.error_line = error.location().map(|l| l.line);
        self.status_message = error.to_string();
        self.console_scroll = usize::MAX;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::load;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    const SOURCE: &str = "int counter;
int bump() { counter = counter + 1; return counter; }
int add(int a, int b) { return a + b; }
int crash() { int *p = 0; return *p; }
int main() { printf(\"hi\\n\"); return 3; }
";

    fn app() -> App {
        App::new(load(SOURCE).unwrap(), SOURCE.to_string())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_starts_on_main() {
        let app = app();
        assert_eq!(app.selected_function, 3);
        assert_eq!(app.line_mark(), Some(LineMark::Selected(5)));
    }

    #[test]
    fn test_call_selected_function_keeps_globals() {
        let mut app = app();
        for _ in 0..5 {
            press(&mut app, KeyCode::Up);
        }
        assert_eq!(app.selected_function, 0);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.status_kind, StatusKind::Success);
        assert_eq!(app.status_message, "bump() => 2");

        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.status_message, "bump() => 1");
    }

    #[test]
    fn test_functions_with_parameters_are_not_called() {
        let mut app = app();
        app.selected_function = 1;
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.status_kind, StatusKind::Ready);
        assert!(app.status_message.starts_with("add takes 2 argument(s)"));
    }

    #[test]
    fn test_runtime_error_marks_line() {
        let mut app = app();
        app.selected_function = 2;
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.status_kind, StatusKind::Failure);
        assert_eq!(app.line_mark(), Some(LineMark::Error(4)));

        press(&mut app, KeyCode::Down);
        assert_eq!(app.error_line, None);
        assert_eq!(app.selected_function, 3);
    }

    #[test]
    fn test_run_main_and_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.status_message, "main returned 3");
        assert_eq!(app.interpreter.console().get_output(), vec!["hi"]);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_pane, FocusedPane::Source);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_render_draws_every_pane() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content.iter().map(|cell| cell.symbol()).collect();
        for title in [" Functions ", " Console ", " Source Code ", " Globals (8 bytes) "] {
            assert!(text.contains(title), "missing {:?}", title);
        }
        assert!(text.contains("int bump()"));
    }
}
