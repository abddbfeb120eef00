use chrono::NaiveDate;
use tracing::{debug, info};

use crate::models::{month_day_key, ClientDraft, ClientId, ClientRecord};

/// In-memory client roster
///
/// Records keep insertion order. Ids come from a counter owned by the store
/// that only ever moves forward, so an id is never handed out twice.
#[derive(Debug, Clone)]
pub struct ClientStore {
    records: Vec<ClientRecord>,
    next_id: ClientId,
}

impl Default for ClientStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Create a store holding the two example clients
    pub fn seeded() -> Self {
        let mut store = Self::new();
        store.add("John Doe", "123456789", "1990-01-01", "Service 1");
        store.add("Jane Doe", "987654321", "1995-06-01", "Service 2");
        store
    }

    pub fn records(&self) -> &[ClientRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn add(&mut self, name: &str, phone: &str, birthday: &str, services: &str) -> &ClientRecord {
        self.add_draft(ClientDraft::new(name, phone, birthday, services))
    }

    /// Append a new record built from `draft` and return it
    pub fn add_draft(&mut self, draft: ClientDraft) -> &ClientRecord {
        let id = self.next_id;
        self.next_id += 1;

        info!(id, "adding client");
        let index = self.records.len();
        self.records.push(draft.into_record(id));

        &self.records[index]
    }

    /// Remove the record with `id`; unknown ids are ignored
    pub fn delete(&mut self, id: ClientId) {
        let before = self.records.len();
        self.records.retain(|client| client.id != id);

        if self.records.len() < before {
            info!(id, "deleted client");
        } else {
            debug!(id, "delete of unknown client ignored");
        }
    }

    pub fn find_by_id(&self, id: ClientId) -> Option<&ClientRecord> {
        self.records.iter().find(|client| client.id == id)
    }

    /// Begin a destructive edit.
    ///
    /// The record leaves the store and its fields are handed back for the form.
    /// Saving the form goes through [`ClientStore::add_draft`], which appends the
    /// record at the end under a fresh id. Abandoning the form loses the record.
    pub fn edit(&mut self, id: ClientId) -> Option<ClientDraft> {
        let index = self.records.iter().position(|client| client.id == id)?;
        let record = self.records.remove(index);

        info!(id, "client taken out for editing");
        Some(ClientDraft::from(record))
    }

    /// Overwrite the fields of an existing record, keeping its id and position
    pub fn update(&mut self, id: ClientId, draft: ClientDraft) -> Option<&ClientRecord> {
        let Some(record) = self.records.iter_mut().find(|client| client.id == id) else {
            debug!(id, "update of unknown client ignored");
            return None;
        };

        *record = draft.into_record(id);
        info!(id, "updated client");
        Some(&*record)
    }

    /// Records whose birthday string contains `query`, in store order.
    ///
    /// This is plain substring containment: `"01"` matches a month or a day.
    /// An empty query returns every record.
    pub fn search(&self, query: &str) -> Vec<&ClientRecord> {
        let found: Vec<&ClientRecord> = self
            .records
            .iter()
            .filter(|client| query.is_empty() || client.birthday.contains(query))
            .collect();

        debug!(query, matches = found.len(), "searched clients");
        found
    }

    pub fn todays_birthdays(&self, today: NaiveDate) -> Vec<&ClientRecord> {
        todays_birthdays(self.records(), today)
    }
}

/// Records whose birthday falls on the month and day of `today`, any year.
pub fn todays_birthdays(records: &[ClientRecord], today: NaiveDate) -> Vec<&ClientRecord> {
    let key = month_day_key(&today.format("%Y-%m-%d").to_string());

    records
        .iter()
        .filter(|client| month_day_key(&client.birthday) == key)
        .collect()
}
