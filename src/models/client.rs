pub type ClientId = u32;

/// A client tracked by the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRecord {
    pub id: ClientId,
    pub name: String,
    pub phone: String,
    /// ISO `YYYY-MM-DD`, or empty when unknown.
    pub birthday: String,
    pub services: String,
}

/// Field values of a client that has not been stored yet, as held by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientDraft {
    pub name: String,
    pub phone: String,
    pub birthday: String,
    pub services: String,
}

impl ClientDraft {
    pub fn new(name: &str, phone: &str, birthday: &str, services: &str) -> Self {
        Self {
            name: name.to_string(),
            phone: phone.to_string(),
            birthday: birthday.to_string(),
            services: services.to_string(),
        }
    }

    pub fn into_record(self, id: ClientId) -> ClientRecord {
        ClientRecord {
            id,
            name: self.name,
            phone: self.phone,
            birthday: self.birthday,
            services: self.services,
        }
    }
}

impl From<&ClientRecord> for ClientDraft {
    fn from(record: &ClientRecord) -> Self {
        Self {
            name: record.name.clone(),
            phone: record.phone.clone(),
            birthday: record.birthday.clone(),
            services: record.services.clone(),
        }
    }
}

impl From<ClientRecord> for ClientDraft {
    fn from(record: ClientRecord) -> Self {
        Self {
            name: record.name,
            phone: record.phone,
            birthday: record.birthday,
            services: record.services,
        }
    }
}
