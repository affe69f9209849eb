pub mod activity;
pub mod cell;
pub mod chart;
pub mod onboarding;

use color_eyre::eyre::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::layout::Rect;

use crate::tui::Frame;

/// A screen-level UI element that can handle events and render itself.
pub trait Component {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()>;

    fn handle_mouse_event(&mut self, _mouse: MouseEvent) -> Result<()> {
        Ok(())
    }

    /// Advances animations; driven by the app's tick action.
    fn tick(&mut self) {}

    fn draw(&mut self, f: &mut Frame, area: Rect);
}
