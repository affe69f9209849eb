//! First-run onboarding: wallet address and display currency.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;
use crate::components::Component;
use crate::tui::Frame;

const CURRENCIES: [&str; 5] = ["USD", "EUR", "GBP", "CHF", "JPY"];

/// Which step of the flow the user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    Address,
    Currency,
}

pub struct OnboardingComponent {
    action_tx: UnboundedSender<Action>,
    pub step: OnboardingStep,
    pub address: String,
    pub currency_index: usize,
    pub error_message: Option<String>,
}

impl OnboardingComponent {
    pub fn new(action_tx: UnboundedSender<Action>) -> Self {
        Self {
            action_tx,
            step: OnboardingStep::Address,
            address: String::new(),
            currency_index: 0,
            error_message: None,
        }
    }

    /// Bracketed paste lands here; addresses are usually pasted.
    pub fn insert_str(&mut self, text: &str) {
        if self.step == OnboardingStep::Address {
            self.address
                .extend(text.chars().filter(|c| !c.is_whitespace()));
            self.error_message = None;
        }
    }

    fn submit_address(&mut self) {
        let address = self.address.trim();
        if address.len() < 8 || address.chars().any(char::is_whitespace) {
            self.error_message = Some("Enter a valid wallet address".to_string());
            return;
        }
        self.error_message = None;
        self.step = OnboardingStep::Currency;
    }

    fn finish(&mut self) {
        let _ = self.action_tx.send(Action::CompleteOnboarding {
            address: self.address.trim().to_string(),
            currency: CURRENCIES[self.currency_index].to_string(),
        });
    }

    fn centered(area: Rect) -> Rect {
        let [_, middle, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(12),
            Constraint::Fill(1),
        ])
        .areas(area);
        let [_, center, _] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(56.min(area.width)),
            Constraint::Fill(1),
        ])
        .areas(middle);
        center
    }
}

impl Component for OnboardingComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        match self.step {
            OnboardingStep::Address => match key.code {
                KeyCode::Char(c) if !c.is_control() => {
                    self.address.push(c);
                    self.error_message = None;
                }
                KeyCode::Backspace => {
                    self.address.pop();
                }
                KeyCode::Enter => self.submit_address(),
                _ => {}
            },
            OnboardingStep::Currency => match key.code {
                KeyCode::Up | KeyCode::Left => {
                    self.currency_index =
                        (self.currency_index + CURRENCIES.len() - 1) % CURRENCIES.len();
                }
                KeyCode::Down | KeyCode::Right => {
                    self.currency_index = (self.currency_index + 1) % CURRENCIES.len();
                }
                KeyCode::Enter => self.finish(),
                KeyCode::Esc => self.step = OnboardingStep::Address,
                _ => {}
            },
        }
        Ok(())
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let center = Self::centered(area);
        f.render_widget(Clear, center);

        let block = Block::default()
            .title(" Welcome to Ember Wallet ")
            .borders(Borders::ALL)
            .border_style(Style::new().fg(Color::Blue));

        let mut lines = vec![Line::from("")];
        match self.step {
            OnboardingStep::Address => {
                lines.push(Line::from("Paste or type the wallet address to watch:"));
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled(
                        format!(" {} ", self.address),
                        Style::new().fg(Color::Cyan),
                    ),
                    Span::styled("▏", Style::new().fg(Color::Magenta)),
                ]));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Enter to continue",
                    Style::new().fg(Color::DarkGray),
                )));
            }
            OnboardingStep::Currency => {
                lines.push(Line::from("Display currency:"));
                lines.push(Line::from(""));
                let mut spans = Vec::new();
                for (index, currency) in CURRENCIES.iter().enumerate() {
                    let style = if index == self.currency_index {
                        Style::new()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::new().fg(Color::DarkGray)
                    };
                    spans.push(Span::styled(format!(" {currency} "), style));
                }
                lines.push(Line::from(spans));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Enter to finish, Esc to go back",
                    Style::new().fg(Color::DarkGray),
                )));
            }
        }
        if let Some(error) = &self.error_message {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::new().fg(Color::Red),
            )));
        }

        f.render_widget(Paragraph::new(lines).block(block), center);
    }
}
