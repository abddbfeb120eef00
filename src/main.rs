mod config;
mod logging;
mod models;
mod store;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{info, warn};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::config::{Cli, Config, EditMode};
use crate::models::ClientId;
use crate::store::ClientStore;
use crate::ui::{
    client_wizard::{
        handle_input as handle_client_wizard_input, render_client_wizard, ClientWizardAction,
        ClientWizardState, WizardTarget,
    },
    roster::{handle_input as handle_roster_input, render_roster, RosterAction, RosterState},
};

// How long to wait for a key before re-checking the clock
const TICK: Duration = Duration::from_secs(1);

// Represents the current screen in the app
enum AppScreen {
    Roster,
    ClientWizard,
}

// Main application state
struct AppState {
    store: ClientStore,
    edit_mode: EditMode,
    fixed_today: Option<NaiveDate>,
    screen: AppScreen,
    roster_state: RosterState,
    client_wizard_state: Option<ClientWizardState>,
}

impl AppState {
    fn new(store: ClientStore, config: &Config) -> Result<Self> {
        let fixed_today = config.fixed_today()?;
        let today = fixed_today.unwrap_or_else(|| Local::now().date_naive());
        let roster_state = RosterState::new(&store, today);

        Ok(Self {
            store,
            edit_mode: config.edit_mode,
            fixed_today,
            screen: AppScreen::Roster,
            roster_state,
            client_wizard_state: None,
        })
    }

    // Local calendar date, not UTC, so the day rolls over at local midnight
    fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(|| Local::now().date_naive())
    }

    fn show_roster(&mut self) {
        self.client_wizard_state = None;
        self.roster_state.refresh(&self.store);
        self.screen = AppScreen::Roster;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init(cli)?;

    if let Err(err) = logging::init(&config) {
        eprintln!("Warning: logging disabled: {}", err);
    }

    let store = if config.seed {
        ClientStore::seeded()
    } else {
        ClientStore::new()
    };
    let mut app_state = AppState::new(store, &config)?;
    info!(clients = app_state.store.len(), edit_mode = ?config.edit_mode, "starting client roster");

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app_state);

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        warn!(error = %err, "client roster stopped with an error");
        println!("Error: {}", err);
    }

    info!("client roster closed");
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| match app_state.screen {
            AppScreen::Roster => render_roster(f, &mut app_state.roster_state),
            AppScreen::ClientWizard => {
                if let Some(state) = &mut app_state.client_wizard_state {
                    render_client_wizard(f, state);
                }
            }
        })?;

        if !event::poll(TICK)? {
            let today = app_state.today();
            if app_state.roster_state.set_today(today, &app_state.store) {
                info!(%today, "date changed, birthdays recomputed");
            }
            continue;
        }

        let should_quit = match app_state.screen {
            AppScreen::Roster => handle_roster_screen(app_state)?,
            AppScreen::ClientWizard => handle_client_wizard_screen(app_state)?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_roster_screen(app_state: &mut AppState) -> Result<bool> {
    match handle_roster_input(&mut app_state.roster_state)? {
        Some(action) => Ok(apply_roster_action(app_state, action)),
        None => Ok(false),
    }
}

/// Returns true when the app should quit
fn apply_roster_action(app_state: &mut AppState, action: RosterAction) -> bool {
    match action {
        RosterAction::Quit => return true,
        RosterAction::QueryChanged => {
            app_state.roster_state.refresh(&app_state.store);
        }
        RosterAction::NewClient => {
            app_state.client_wizard_state = Some(ClientWizardState::new(app_state.today()));
            app_state.screen = AppScreen::ClientWizard;
        }
        RosterAction::EditClient(client_id) => {
            begin_edit(app_state, client_id);
        }
        RosterAction::DeleteClient(client_id) => {
            app_state.store.delete(client_id);
            app_state.roster_state.refresh(&app_state.store);
        }
    }

    false
}

fn begin_edit(app_state: &mut AppState, client_id: ClientId) {
    let today = app_state.today();
    let wizard = match app_state.edit_mode {
        EditMode::InPlace => app_state
            .store
            .find_by_id(client_id)
            .map(|client| ClientWizardState::with_draft(WizardTarget::Update(client_id), client.into(), today)),
        EditMode::Replace => {
            let wizard = app_state
                .store
                .edit(client_id)
                .map(|draft| ClientWizardState::with_draft(WizardTarget::Readd, draft, today));
            // The record is gone from the roster until the form is saved
            app_state.roster_state.refresh(&app_state.store);
            wizard
        }
    };

    if let Some(wizard) = wizard {
        app_state.client_wizard_state = Some(wizard);
        app_state.screen = AppScreen::ClientWizard;
    }
}

fn handle_client_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let Some(state) = app_state.client_wizard_state.as_mut() else {
        app_state.show_roster();
        return Ok(false);
    };

    if let Some(action) = handle_client_wizard_input(state)? {
        apply_wizard_action(app_state, action);
    }

    Ok(false)
}

fn apply_wizard_action(app_state: &mut AppState, action: ClientWizardAction) {
    let Some(target) = app_state.client_wizard_state.as_ref().map(|state| state.target) else {
        app_state.show_roster();
        return;
    };

    match action {
        ClientWizardAction::Cancel => {
            if target == WizardTarget::Readd {
                warn!("edit abandoned, client removed from roster");
            }
        }
        ClientWizardAction::Save(draft) => match target {
            WizardTarget::New | WizardTarget::Readd => {
                app_state.store.add_draft(draft);
            }
            WizardTarget::Update(client_id) => {
                app_state.store.update(client_id, draft);
            }
        },
    }

    app_state.show_roster();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientDraft;

    fn app(edit_mode: &str) -> AppState {
        let config = Config::from_pairs(vec![
            ("ROSTER_EDIT_MODE".to_string(), edit_mode.to_string()),
            ("ROSTER_TODAY".to_string(), "2024-01-01".to_string()),
        ])
        .unwrap();
        AppState::new(ClientStore::seeded(), &config).unwrap()
    }

    fn ids(app_state: &AppState) -> Vec<ClientId> {
        app_state.store.records().iter().map(|c| c.id).collect()
    }

    fn edited_draft() -> ClientDraft {
        ClientDraft::new("Johnny", "555", "1990-01-02", "Service 9")
    }

    fn is_wizard(app_state: &AppState) -> bool {
        matches!(app_state.screen, AppScreen::ClientWizard)
    }

    #[test]
    fn in_place_cancel_leaves_roster_alone() {
        let mut app_state = app("in-place");

        assert!(!apply_roster_action(&mut app_state, RosterAction::EditClient(1)));
        assert!(is_wizard(&app_state));
        assert_eq!(ids(&app_state), vec![1, 2]);

        apply_wizard_action(&mut app_state, ClientWizardAction::Cancel);

        assert!(!is_wizard(&app_state));
        assert!(app_state.client_wizard_state.is_none());
        assert_eq!(ids(&app_state), vec![1, 2]);
        assert_eq!(app_state.store.records()[0].name, "John Doe");
    }

    #[test]
    fn in_place_save_keeps_id_and_position() {
        let mut app_state = app("in-place");

        apply_roster_action(&mut app_state, RosterAction::EditClient(1));
        apply_wizard_action(&mut app_state, ClientWizardAction::Save(edited_draft()));

        assert_eq!(ids(&app_state), vec![1, 2]);
        assert_eq!(app_state.store.records()[0], edited_draft().into_record(1));
        assert_eq!(app_state.roster_state.clients()[0].name, "Johnny");
    }

    #[test]
    fn replace_edit_removes_record_until_saved() {
        let mut app_state = app("replace");

        apply_roster_action(&mut app_state, RosterAction::EditClient(1));

        assert!(is_wizard(&app_state));
        assert_eq!(ids(&app_state), vec![2]);
        assert_eq!(app_state.roster_state.clients().len(), 1);
        let prefilled = app_state.client_wizard_state.as_ref().map(|w| w.draft.clone());
        assert_eq!(
            prefilled,
            Some(ClientDraft::new("John Doe", "123456789", "1990-01-01", "Service 1"))
        );
    }

    #[test]
    fn replace_cancel_loses_record() {
        let mut app_state = app("replace");

        apply_roster_action(&mut app_state, RosterAction::EditClient(1));
        apply_wizard_action(&mut app_state, ClientWizardAction::Cancel);

        assert!(!is_wizard(&app_state));
        assert_eq!(ids(&app_state), vec![2]);
    }

    #[test]
    fn replace_save_appends_under_new_id() {
        let mut app_state = app("replace");

        apply_roster_action(&mut app_state, RosterAction::EditClient(1));
        apply_wizard_action(&mut app_state, ClientWizardAction::Save(edited_draft()));

        assert_eq!(ids(&app_state), vec![2, 3]);
        assert_eq!(app_state.store.records()[1], edited_draft().into_record(3));
    }

    #[test]
    fn edit_of_missing_client_stays_on_roster() {
        for mode in ["in-place", "replace"] {
            let mut app_state = app(mode);

            apply_roster_action(&mut app_state, RosterAction::EditClient(9));

            assert!(!is_wizard(&app_state));
            assert_eq!(ids(&app_state), vec![1, 2]);
        }
    }

    #[test]
    fn new_client_is_appended_and_delete_refreshes_birthdays() {
        let mut app_state = app("in-place");

        apply_roster_action(&mut app_state, RosterAction::NewClient);
        let draft = ClientDraft::new("Bob", "111", "2010-01-01", "Color");
        apply_wizard_action(&mut app_state, ClientWizardAction::Save(draft));
        assert_eq!(ids(&app_state), vec![1, 2, 3]);
        assert_eq!(app_state.roster_state.birthdays().len(), 2);

        apply_roster_action(&mut app_state, RosterAction::DeleteClient(1));
        assert_eq!(ids(&app_state), vec![2, 3]);
        assert_eq!(app_state.roster_state.birthdays().len(), 1);
        assert!(apply_roster_action(&mut app_state, RosterAction::Quit));
    }
}
