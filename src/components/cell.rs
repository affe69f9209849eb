//! Generic cell container for feed rows.
//!
//! [`ContainerCell`] wraps any [`CellContent`] and owns the pressed/
//! selected appearance and height negotiation; contents only draw
//! themselves. The feed keeps one container per content kind and
//! re-configures it for every row, so `prepare_for_reuse` runs between
//! rows exactly like a dequeue.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::domain::event::{EventDirection, EventModel};

/// Capabilities a view needs to live inside a [`ContainerCell`]:
/// configurable with a model, sizeable for a width, and resettable.
pub trait CellContent {
    type Model;

    fn configure(&mut self, model: Self::Model);
    fn prepare_for_reuse(&mut self);
    /// Rows self-size: the container reports whatever the content needs
    /// at the given width.
    fn height_for_width(&self, width: u16) -> u16;
    fn render(&self, area: Rect, buf: &mut Buffer, base: Style);
}

const CONTENT_BG: Color = Color::Reset;
const HIGHLIGHT_BG: Color = Color::DarkGray;

pub struct ContainerCell<C: CellContent> {
    pub content: C,
    selected: bool,
    highlighted: bool,
}

impl<C: CellContent + Default> ContainerCell<C> {
    pub fn new() -> Self {
        Self {
            content: C::default(),
            selected: false,
            highlighted: false,
        }
    }
}

impl<C: CellContent + Default> Default for ContainerCell<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CellContent> ContainerCell<C> {
    pub fn configure(&mut self, model: C::Model) {
        self.content.configure(model);
    }

    pub fn prepare_for_reuse(&mut self) {
        self.content.prepare_for_reuse();
        self.deselect();
        self.highlighted = false;
    }

    pub fn select(&mut self) {
        self.selected = true;
    }

    pub fn deselect(&mut self) {
        self.selected = false;
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    /// Pressed and selected share one appearance; either flag wins.
    pub fn shows_selected(&self) -> bool {
        self.selected || self.highlighted
    }

    pub fn height_for_width(&self, width: u16) -> u16 {
        self.content.height_for_width(width)
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let base = if self.shows_selected() {
            Style::new().bg(HIGHLIGHT_BG)
        } else {
            Style::new().bg(CONTENT_BG)
        };
        buf.set_style(area, base);
        self.content.render(area, buf, base);
    }
}

pub(crate) fn direction_color(direction: EventDirection) -> Color {
    match direction {
        EventDirection::Incoming => Color::Green,
        EventDirection::Outgoing => Color::Red,
        EventDirection::Neutral => Color::Yellow,
    }
}

/// Two-line transaction row that grows when the comment wraps.
#[derive(Default)]
pub struct TransactionCellContent {
    model: Option<EventModel>,
}

impl TransactionCellContent {
    fn comment_lines(&self, width: u16) -> u16 {
        let Some(comment) = self.model.as_ref().and_then(|m| m.comment.as_ref()) else {
            return 0;
        };
        let usable = width.saturating_sub(2).max(1) as usize;
        comment.chars().count().div_ceil(usable) as u16
    }
}

impl CellContent for TransactionCellContent {
    type Model = EventModel;

    fn configure(&mut self, model: EventModel) {
        self.model = Some(model);
    }

    fn prepare_for_reuse(&mut self) {
        self.model = None;
    }

    fn height_for_width(&self, width: u16) -> u16 {
        2 + self.comment_lines(width)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, base: Style) {
        // An unresolved row stays an empty cell.
        let Some(model) = &self.model else {
            return;
        };
        if area.height == 0 {
            return;
        }
        let color = direction_color(model.direction);
        let first = Line::from(vec![
            Span::styled(format!("{:<9}", model.kind_label), base.fg(color)),
            Span::styled(
                model.amount.clone(),
                base.fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(model.time.clone(), base.fg(Color::DarkGray)),
        ]);
        buf.set_line(area.x, area.y, &first, area.width);

        if area.height > 1 {
            let second = Line::from(Span::styled(
                format!("  {}", model.counterparty),
                base.fg(Color::DarkGray),
            ));
            buf.set_line(area.x, area.y + 1, &second, area.width);
        }

        if let Some(comment) = &model.comment {
            let usable = area.width.saturating_sub(2).max(1) as usize;
            let chars: Vec<char> = comment.chars().collect();
            for (row, chunk) in chars.chunks(usable).enumerate() {
                let y = area.y + 2 + row as u16;
                if y >= area.bottom() {
                    break;
                }
                let text: String = chunk.iter().collect();
                let line = Line::from(Span::styled(format!("  {text}"), base.fg(Color::Reset)));
                buf.set_line(area.x, y, &line, area.width);
            }
        }
    }
}

/// Placeholder row; the feed advances the phase on every tick and
/// re-configures the content at draw time, so freshly shown rows
/// animate without extra wiring.
#[derive(Default)]
pub struct ShimmerCellContent {
    phase: u8,
}

impl CellContent for ShimmerCellContent {
    type Model = u8;

    fn configure(&mut self, phase: u8) {
        self.phase = phase;
    }

    fn prepare_for_reuse(&mut self) {
        self.phase = 0;
    }

    fn height_for_width(&self, _width: u16) -> u16 {
        2
    }

    fn render(&self, area: Rect, buf: &mut Buffer, base: Style) {
        const BLOCKS: [char; 3] = ['░', '▒', '▓'];
        for y in 0..area.height.min(2) {
            let mut text = String::with_capacity(area.width as usize);
            for x in 0..area.width {
                let index = (x as usize + self.phase as usize + y as usize) % BLOCKS.len();
                text.push(BLOCKS[index]);
            }
            let line = Line::from(Span::styled(text, base.fg(Color::DarkGray)));
            buf.set_line(area.x, area.y + y, &line, area.width);
        }
    }
}
