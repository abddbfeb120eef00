use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Spans,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::models::{today_query, ClientId, ClientRecord};
use crate::store::ClientStore;

const COLUMN_WIDTHS: [Constraint; 4] = [
    Constraint::Percentage(30),
    Constraint::Percentage(20),
    Constraint::Percentage(15),
    Constraint::Percentage(35),
];

/// Which table the selection keys act on
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Focus {
    Roster,
    Birthdays,
}

// Represents the state of the roster screen
pub struct RosterState {
    clients: Vec<ClientRecord>,
    birthdays: Vec<ClientRecord>,
    query: String,
    today: NaiveDate,
    focus: Focus,
    roster_table: TableState,
    birthday_table: TableState,
    searching: bool,
    show_delete_confirmation: bool,
}

pub enum RosterAction {
    Quit,
    NewClient,
    EditClient(ClientId),
    DeleteClient(ClientId),
    QueryChanged,
}

impl RosterState {
    pub fn new(store: &ClientStore, today: NaiveDate) -> Self {
        let mut state = Self {
            clients: Vec::new(),
            birthdays: Vec::new(),
            query: String::new(),
            today,
            focus: Focus::Roster,
            roster_table: TableState::default(),
            birthday_table: TableState::default(),
            searching: false,
            show_delete_confirmation: false,
        };
        state.refresh(store);
        state
    }

    /// Re-read both views from the store. Call after every mutation.
    pub fn refresh(&mut self, store: &ClientStore) {
        self.clients = store.search(&self.query).into_iter().cloned().collect();
        self.birthdays = store.todays_birthdays(self.today).into_iter().cloned().collect();

        clamp_selection(&mut self.roster_table, self.clients.len());
        clamp_selection(&mut self.birthday_table, self.birthdays.len());
    }

    /// Move to a new current date; returns whether it changed
    pub fn set_today(&mut self, today: NaiveDate, store: &ClientStore) -> bool {
        if self.today == today {
            return false;
        }
        self.today = today;
        self.refresh(store);
        true
    }

    pub fn clients(&self) -> &[ClientRecord] {
        &self.clients
    }

    pub fn birthdays(&self) -> &[ClientRecord] {
        &self.birthdays
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Roster => Focus::Birthdays,
            Focus::Birthdays => Focus::Roster,
        };
    }

    fn focused(&mut self) -> (&mut TableState, usize) {
        match self.focus {
            Focus::Roster => (&mut self.roster_table, self.clients.len()),
            Focus::Birthdays => (&mut self.birthday_table, self.birthdays.len()),
        }
    }

    pub fn next(&mut self) {
        let (table, len) = self.focused();
        if len == 0 {
            return;
        }

        let i = match table.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        table.select(Some(i));
    }

    pub fn previous(&mut self) {
        let (table, len) = self.focused();
        if len == 0 {
            return;
        }

        let i = match table.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        table.select(Some(i));
    }

    pub fn selected_client(&self) -> Option<&ClientRecord> {
        match self.focus {
            Focus::Roster => self.roster_table.selected().and_then(|i| self.clients.get(i)),
            Focus::Birthdays => self.birthday_table.selected().and_then(|i| self.birthdays.get(i)),
        }
    }

    pub fn selected_client_id(&self) -> Option<ClientId> {
        self.selected_client().map(|c| c.id)
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }
}

fn clamp_selection(table: &mut TableState, len: usize) {
    let selected = match table.selected() {
        _ if len == 0 => None,
        Some(i) => Some(i.min(len - 1)),
        None => Some(0),
    };
    table.select(selected);
}

pub fn render_roster<B: Backend>(frame: &mut Frame<B>, state: &mut RosterState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Percentage(30),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(size);

    render_search_bar(frame, state, chunks[0]);

    let focus = state.focus();
    let roster_title = if state.query().is_empty() {
        "Client Database".to_string()
    } else {
        format!("Client Database ({} matching)", state.clients().len())
    };
    let birthdays_title = match state.birthdays().len() {
        0 => format!("Today's Birthdays ({}) - none", state.today().format("%Y-%m-%d")),
        n => format!("Today's Birthdays ({}) - {}", state.today().format("%Y-%m-%d"), n),
    };

    let roster = client_table(&state.clients, roster_title, focus == Focus::Roster);
    frame.render_stateful_widget(roster, chunks[1], &mut state.roster_table);

    let birthdays = client_table(&state.birthdays, birthdays_title, focus == Focus::Birthdays);
    frame.render_stateful_widget(birthdays, chunks[2], &mut state.birthday_table);

    let buttons_text = if state.searching {
        "Type to filter by birthday | <Enter>/<Esc> Done"
    } else if state.selected_client().is_some() {
        "<N> New | <E> Edit | <D> Delete | </> Search | <A> All Clients | <T> Today's Birthdays | <Tab> Switch table | <Q> Quit"
    } else {
        "<N> New | </> Search | <A> All Clients | <T> Today's Birthdays | <Tab> Switch table | <Q> Quit"
    };

    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[3]);

    if state.show_delete_confirmation {
        render_delete_confirmation(frame, size);
    }
}

fn render_search_bar<B: Backend>(frame: &mut Frame<B>, state: &RosterState, area: Rect) {
    let (text, style) = if state.searching {
        (format!("{}|", state.query()), Style::default().fg(Color::Yellow))
    } else if state.query().is_empty() {
        ("Search by birthday".to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (state.query().to_string(), Style::default())
    };

    let search = Paragraph::new(text)
        .style(style)
        .block(Block::default().title("Search").borders(Borders::ALL));
    frame.render_widget(search, area);
}

fn client_table(clients: &[ClientRecord], title: String, focused: bool) -> Table<'_> {
    let header = Row::new(vec!["Name", "Phone", "Birthday", "Services"])
        .style(Style::default().add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows = clients.iter().map(|client| {
        Row::new(vec![
            Cell::from(client.name.as_str()),
            Cell::from(client.phone.as_str()),
            Cell::from(client.birthday.as_str()),
            Cell::from(client.services.as_str()),
        ])
    });

    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    Table::new(rows)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .widths(&COLUMN_WIDTHS)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    let popup_area = centered_rect(50, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Are you sure you want to delete this client?"),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn handle_key(state: &mut RosterState, key: KeyCode) -> Option<RosterAction> {
    if state.searching {
        match key {
            KeyCode::Enter | KeyCode::Esc => state.searching = false,
            KeyCode::Char(c) => {
                state.query.push(c);
                return Some(RosterAction::QueryChanged);
            }
            KeyCode::Backspace => {
                state.query.pop();
                return Some(RosterAction::QueryChanged);
            }
            _ => {}
        }
        return None;
    }

    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.toggle_delete_confirmation();
                return state.selected_client_id().map(RosterAction::DeleteClient);
            }
            KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                state.toggle_delete_confirmation();
            }
            _ => {}
        }
        return None;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(RosterAction::Quit),
        KeyCode::Char('n') => return Some(RosterAction::NewClient),
        KeyCode::Char('e') => return state.selected_client_id().map(RosterAction::EditClient),
        KeyCode::Char('d') => {
            if state.selected_client().is_some() {
                state.toggle_delete_confirmation();
            }
        }
        KeyCode::Char('/') => state.searching = true,
        KeyCode::Char('a') => {
            state.query.clear();
            return Some(RosterAction::QueryChanged);
        }
        KeyCode::Char('t') => {
            state.query = today_query(state.today);
            return Some(RosterAction::QueryChanged);
        }
        KeyCode::Tab => state.toggle_focus(),
        KeyCode::Down => state.next(),
        KeyCode::Up => state.previous(),
        _ => {}
    }

    None
}

pub fn handle_input(state: &mut RosterState) -> Result<Option<RosterAction>> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            return Ok(handle_key(state, key.code));
        }
    }

    Ok(None)
}
