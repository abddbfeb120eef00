use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{ClientDraft, ClientId};
use crate::ui::components::date_input::DateInputState;

pub enum ClientWizardAction {
    Cancel,
    Save(ClientDraft),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum ClientField {
    Name,
    Phone,
    Birthday,
    Services,
}

/// What the wizard was opened for
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum WizardTarget {
    New,
    /// Saving overwrites this client
    Update(ClientId),
    /// The client was already taken out of the roster; saving adds it back
    Readd,
}

pub struct ClientWizardState {
    pub target: WizardTarget,
    pub draft: ClientDraft,
    pub birthday: DateInputState,
    pub current_field: ClientField,
    pub editing: bool,
}

impl ClientWizardState {
    pub fn new(today: NaiveDate) -> Self {
        Self::with_draft(WizardTarget::New, ClientDraft::default(), today)
    }

    pub fn with_draft(target: WizardTarget, draft: ClientDraft, today: NaiveDate) -> Self {
        let birthday = DateInputState::from_birthday(&draft.birthday, today);
        Self {
            target,
            draft,
            birthday,
            current_field: ClientField::Name,
            editing: false,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.current_field == ClientField::Birthday {
            self.birthday.toggle_editing();
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            ClientField::Name => ClientField::Phone,
            ClientField::Phone => ClientField::Birthday,
            ClientField::Birthday => ClientField::Services,
            ClientField::Services => ClientField::Name,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            ClientField::Name => ClientField::Services,
            ClientField::Phone => ClientField::Name,
            ClientField::Birthday => ClientField::Phone,
            ClientField::Services => ClientField::Birthday,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let field_value = match self.current_field {
            ClientField::Name => &mut self.draft.name,
            ClientField::Phone => &mut self.draft.phone,
            ClientField::Services => &mut self.draft.services,
            ClientField::Birthday => {
                self.birthday.handle_input(key);
                self.draft.birthday = self.birthday.value();
                return;
            }
        };

        match key {
            KeyCode::Char(c) => {
                field_value.push(c);
            }
            KeyCode::Backspace => {
                field_value.pop();
            }
            _ => {}
        }
    }

    /// The draft as it should be submitted.
    ///
    /// `draft.birthday` only follows the date input once that field has been
    /// typed into, so a stored birthday the input cannot parse survives a save.
    pub fn submitted(&self) -> ClientDraft {
        self.draft.clone()
    }
}

pub fn render_client_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ClientWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = match state.target {
        WizardTarget::New => "Add Client",
        WizardTarget::Update(_) | WizardTarget::Readd => "Edit Client",
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let help_text = match (state.editing, state.current_field) {
        (true, ClientField::Birthday) => {
            "Digits - Fill segment | Left/Right - Year/Month/Day | Del - Clear | Enter - Done"
        }
        (true, _) => "Enter - Done editing field",
        (false, _) => "Enter - Edit field | Up/Down - Navigate fields | S - Save client | Esc - Cancel",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &ClientWizardState, area: Rect) {
    // Birthdays the date input cannot parse are shown as stored
    let birthday = if state.birthday.date.is_none() && !state.birthday.editing {
        state.draft.birthday.clone()
    } else {
        state.birthday.get_display_string()
    };

    let fields = [
        (ClientField::Name, "Name", state.draft.name.clone()),
        (ClientField::Phone, "Phone", state.draft.phone.clone()),
        (ClientField::Birthday, "Birthday", birthday),
        (ClientField::Services, "Services", state.draft.services.clone()),
    ];

    let items: Vec<ListItem> = fields
        .into_iter()
        .map(|(field, name, value)| {
            let selected = field == state.current_field;
            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };

            let content = if selected && state.editing {
                let cursor = if field == ClientField::Birthday { "" } else { "|" };
                Spans::from(vec![
                    Span::styled(format!("{}: ", name), label_style),
                    Span::styled(
                        format!("{}{}", value, cursor),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                Spans::from(vec![
                    Span::styled(format!("{}: ", name), label_style),
                    Span::raw(value),
                ])
            };

            ListItem::new(content)
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Client Details"));

    f.render_widget(form_list, area);
}

pub fn handle_key(state: &mut ClientWizardState, key: KeyCode) -> Option<ClientWizardAction> {
    match key {
        KeyCode::Esc => {
            if state.editing {
                state.toggle_editing();
            } else {
                return Some(ClientWizardAction::Cancel);
            }
        }
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up if !state.editing => state.previous_field(),
        KeyCode::Down if !state.editing => state.next_field(),
        KeyCode::Char('s') if !state.editing => {
            return Some(ClientWizardAction::Save(state.submitted()));
        }
        _ if state.editing => state.edit_current_field(key),
        _ => {}
    }

    None
}

pub fn handle_input(state: &mut ClientWizardState) -> Result<Option<ClientWizardAction>> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            return Ok(handle_key(state, key.code));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn type_text(state: &mut ClientWizardState, text: &str) {
        for c in text.chars() {
            handle_key(state, KeyCode::Char(c));
        }
    }

    fn saved(action: Option<ClientWizardAction>) -> ClientDraft {
        match action {
            Some(ClientWizardAction::Save(draft)) => draft,
            _ => panic!("expected save"),
        }
    }

    #[test]
    fn fills_every_field() {
        let mut state = ClientWizardState::new(today());

        handle_key(&mut state, KeyCode::Enter);
        type_text(&mut state, "Amy");
        handle_key(&mut state, KeyCode::Enter);

        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Enter);
        type_text(&mut state, "5556");
        handle_key(&mut state, KeyCode::Backspace);
        handle_key(&mut state, KeyCode::Enter);

        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Enter);
        type_text(&mut state, "20000303");
        handle_key(&mut state, KeyCode::Enter);

        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Enter);
        type_text(&mut state, "Cut");
        handle_key(&mut state, KeyCode::Esc);

        let draft = saved(handle_key(&mut state, KeyCode::Char('s')));
        assert_eq!(draft, ClientDraft::new("Amy", "555", "2000-03-03", "Cut"));
    }

    #[test]
    fn empty_form_can_be_saved() {
        let mut state = ClientWizardState::new(today());
        let draft = saved(handle_key(&mut state, KeyCode::Char('s')));

        assert_eq!(draft, ClientDraft::default());
    }

    #[test]
    fn s_is_text_while_editing() {
        let mut state = ClientWizardState::new(today());
        handle_key(&mut state, KeyCode::Enter);

        assert!(handle_key(&mut state, KeyCode::Char('s')).is_none());
        assert_eq!(state.draft.name, "s");
    }

    #[test]
    fn prefilled_draft_keeps_birthday() {
        let draft = ClientDraft::new("John Doe", "123456789", "1990-01-01", "Service 1");
        let mut state = ClientWizardState::with_draft(WizardTarget::Update(1), draft.clone(), today());

        assert_eq!(saved(handle_key(&mut state, KeyCode::Char('s'))), draft);
    }

    #[test]
    fn unparseable_birthday_survives_untouched_save() {
        let draft = ClientDraft::new("Old Import", "1", "sometime in May", "Cut");
        let mut state = ClientWizardState::with_draft(WizardTarget::Update(1), draft.clone(), today());

        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Enter);
        type_text(&mut state, "Ann");
        handle_key(&mut state, KeyCode::Enter);

        let mut expected = draft;
        expected.phone = "1Ann".to_string();
        assert_eq!(saved(handle_key(&mut state, KeyCode::Char('s'))), expected);
    }

    #[test]
    fn typing_into_unparseable_birthday_replaces_it() {
        let draft = ClientDraft::new("Old Import", "1", "sometime in May", "Cut");
        let mut state = ClientWizardState::with_draft(WizardTarget::Update(1), draft, today());

        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Enter);
        type_text(&mut state, "19800512");
        handle_key(&mut state, KeyCode::Enter);

        assert_eq!(saved(handle_key(&mut state, KeyCode::Char('s'))).birthday, "1980-05-12");
    }

    #[test]
    fn escape_cancels_only_when_not_editing() {
        let mut state = ClientWizardState::new(today());
        handle_key(&mut state, KeyCode::Enter);

        assert!(handle_key(&mut state, KeyCode::Esc).is_none());
        assert!(matches!(
            handle_key(&mut state, KeyCode::Esc),
            Some(ClientWizardAction::Cancel)
        ));
    }

    #[test]
    fn field_navigation_wraps() {
        let mut state = ClientWizardState::new(today());
        state.previous_field();
        assert_eq!(state.current_field, ClientField::Services);
        state.next_field();
        assert_eq!(state.current_field, ClientField::Name);
    }
}
