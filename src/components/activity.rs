//! Activity feed screen.
//!
//! Renders the controller's rows into the terminal, keeps the viewport
//! and cursor, and reports the visible range back so the controller can
//! fire its boundary trigger. Cells are dequeued: one container per
//! content kind, re-configured per row.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::components::Component;
use crate::components::cell::{CellContent, ContainerCell, ShimmerCellContent, TransactionCellContent};
use crate::domain::feed::{ActivityListController, Row};
use crate::domain::section::PaginationState;
use crate::tui::Frame;

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

pub struct ActivityComponent {
    pub controller: ActivityListController,
    cursor: usize,
    scroll: usize,
    selection_flash: Option<usize>,
    refreshing: bool,
    tick_phase: u8,
    tx_cell: ContainerCell<TransactionCellContent>,
    shimmer_cell: ContainerCell<ShimmerCellContent>,
}

impl ActivityComponent {
    pub fn new() -> Self {
        Self {
            controller: ActivityListController::new(),
            cursor: 0,
            scroll: 0,
            selection_flash: None,
            refreshing: false,
            tick_phase: 0,
            tx_cell: ContainerCell::new(),
            shimmer_cell: ContainerCell::new(),
        }
    }

    pub fn set_refreshing(&mut self, refreshing: bool) {
        self.refreshing = refreshing;
    }

    fn move_cursor(&mut self, delta: isize) {
        let rows = self.controller.rows().len();
        if rows == 0 {
            self.cursor = 0;
            return;
        }
        let cursor = self.cursor as isize + delta;
        self.cursor = cursor.clamp(0, rows as isize - 1) as usize;
    }

    fn row_height(&self, row: &Row, width: u16) -> u16 {
        match row {
            Row::Header(_) => 3,
            Row::SectionTitle(_) | Row::ShimmerTitle => 1,
            Row::Event(id) => {
                let mut content = TransactionCellContent::default();
                if let Some(model) = self.controller.resolve(id) {
                    content.configure(model);
                }
                content.height_for_width(width)
            }
            Row::Shimmer(_) => 2,
            Row::PaginationFooter(_) => 3,
        }
    }

    fn visible_count(&self, rows: &[Row], scroll: usize, area: Rect) -> usize {
        let mut used = 0u16;
        let mut count = 0;
        for row in rows.iter().skip(scroll) {
            let height = self.row_height(row, area.width);
            if used + height > area.height {
                break;
            }
            used += height;
            count += 1;
        }
        count.max(1)
    }

    fn render_row(&mut self, buf: &mut Buffer, area: Rect, row: &Row, index: usize) {
        let is_cursor = index == self.cursor;
        match row {
            Row::Header(header) => {
                let title = Line::from(Span::styled(
                    header.title.clone(),
                    Style::new().add_modifier(Modifier::BOLD),
                ));
                let subtitle = Line::from(Span::styled(
                    header.subtitle.clone(),
                    Style::new().fg(Color::DarkGray),
                ));
                buf.set_line(area.x, area.y, &title, area.width);
                if area.height > 1 {
                    buf.set_line(area.x, area.y + 1, &subtitle, area.width);
                }
            }
            Row::SectionTitle(title) => {
                let line = Line::from(Span::styled(
                    title.clone(),
                    Style::new()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                ));
                buf.set_line(area.x, area.y, &line, area.width);
            }
            Row::Event(id) => {
                let model = self.controller.resolve(id);
                self.tx_cell.prepare_for_reuse();
                if let Some(model) = model {
                    self.tx_cell.configure(model);
                }
                self.tx_cell.set_highlighted(is_cursor);
                if self.selection_flash == Some(index) {
                    self.tx_cell.select();
                }
                self.tx_cell.render(area, buf);
            }
            Row::ShimmerTitle => {
                let line = Line::from(Span::styled(
                    "░".repeat((area.width / 3).max(4) as usize),
                    Style::new().fg(Color::DarkGray),
                ));
                buf.set_line(area.x, area.y, &line, area.width);
            }
            Row::Shimmer(_) => {
                self.shimmer_cell.prepare_for_reuse();
                self.shimmer_cell.configure(self.tick_phase);
                self.shimmer_cell.render(area, buf);
            }
            Row::PaginationFooter(state) => {
                let line = match state {
                    PaginationState::Loading => Line::from(vec![
                        Span::styled(
                            SPINNER[self.tick_phase as usize % SPINNER.len()],
                            Style::new().fg(Color::Blue),
                        ),
                        Span::styled(" Loading…", Style::new().fg(Color::DarkGray)),
                    ]),
                    PaginationState::Error(title) => Line::from(vec![
                        Span::styled(format!("⚠ {title}"), Style::new().fg(Color::Red)),
                        Span::styled(
                            "  press Enter to retry",
                            Style::new().fg(Color::DarkGray),
                        ),
                    ]),
                };
                if is_cursor {
                    buf.set_style(area, Style::new().bg(Color::DarkGray));
                }
                if area.height > 1 {
                    buf.set_line(area.x, area.y + 1, &line, area.width);
                }
            }
        }
    }
}

impl Default for ActivityComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ActivityComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::PageDown => self.move_cursor(10),
            KeyCode::PageUp => self.move_cursor(-10),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => {
                self.cursor = self.controller.rows().len().saturating_sub(1);
            }
            KeyCode::Enter => {
                if self.controller.select(self.cursor).is_some() {
                    self.selection_flash = Some(self.cursor);
                }
            }
            KeyCode::Char('r') => {
                self.refreshing = true;
                self.controller.pull_to_refresh();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<()> {
        match mouse.kind {
            MouseEventKind::ScrollDown => self.move_cursor(1),
            MouseEventKind::ScrollUp => self.move_cursor(-1),
            _ => {}
        }
        Ok(())
    }

    fn tick(&mut self) {
        self.tick_phase = self.tick_phase.wrapping_add(1);
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let title = if self.refreshing {
            format!(
                " Activity {} refreshing ",
                SPINNER[self.tick_phase as usize % SPINNER.len()]
            )
        } else {
            " Activity ".to_string()
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::new().fg(Color::DarkGray));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let rows = self.controller.rows();
        if self.controller.take_full_reload() {
            self.scroll = 0;
            self.cursor = 0;
        }
        if !self.controller.take_changes().is_empty() && !rows.is_empty() {
            self.cursor = self.cursor.min(rows.len() - 1);
            self.scroll = self.scroll.min(rows.len() - 1);
        }

        if rows.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No transactions yet — press r to refresh",
                Style::new().fg(Color::DarkGray),
            )));
            f.render_widget(empty, inner);
            return;
        }

        // Keep the cursor inside the viewport.
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        }
        while self.cursor >= self.scroll + self.visible_count(&rows, self.scroll, inner) {
            self.scroll += 1;
        }

        let buf = f.buffer_mut();
        let mut y = inner.y;
        let mut index = self.scroll;
        let mut last_visible = self.scroll;
        while index < rows.len() && y < inner.bottom() {
            let height = self.row_height(&rows[index], inner.width).min(inner.bottom() - y);
            let row_area = Rect::new(inner.x, y, inner.width, height);
            self.render_row(buf, row_area, &rows[index], index);
            last_visible = index;
            y += height;
            index += 1;
        }

        self.controller.note_visible_range(self.scroll, last_visible);
        // Selection is momentary: it shows for exactly one frame.
        self.selection_flash = None;
    }
}
