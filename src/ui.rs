//! Terminal output: the renderer seam, the dashboard layout and its theme.

use ratatui::text::Line;

pub mod dashboard;
pub mod metric;
pub mod terminal;
pub mod theme;

/// Where dashboard frames are written.
///
/// A frame is `clear_screen`, any number of `write_line`, then `present`.
/// Output is best-effort: implementations log failures and carry on.
pub trait Renderer {
    fn clear_screen(&mut self);
    fn set_cursor_visible(&mut self, visible: bool);
    fn write_line(&mut self, line: Line<'static>);
    fn present(&mut self) {}
}
