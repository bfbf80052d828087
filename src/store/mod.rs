// 🗂️ Session Store - In-memory collections, persisted on every mutation
//
// Holds the default bankroll (top-level sessions + transactions), named
// bankrolls, locations and stakes. Each mutation rewrites the affected
// document(s) in full. If a save fails the in-memory state is rolled back, so
// memory and disk never silently diverge.

pub mod backend;
pub mod sqlite;

pub use backend::{Document, JsonDirectory, SnapshotBackend};
pub use sqlite::{Event, SqliteBackend};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::config::{BackendKind, Config};
use crate::entities::{
    default_locations, default_stakes, Bankroll, Location, Session, Transaction,
};
use crate::error::StoreError;

#[derive(Debug, Clone, Default, PartialEq)]
struct StoreState {
    sessions: Vec<Session>,
    transactions: Vec<Transaction>,
    bankrolls: Vec<Bankroll>,
    locations: Vec<Location>,
    stakes: Vec<String>,
}

/// Result of a bulk append
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub added: usize,
    pub duplicates: usize,
}

pub struct DataStore {
    state: StoreState,
    backend: Box<dyn SnapshotBackend>,
}

impl DataStore {
    /// Load every document from `backend`. Missing session/ledger documents
    /// start empty; missing locations and stakes are seeded with defaults.
    pub fn open(backend: Box<dyn SnapshotBackend>) -> Result<Self, StoreError> {
        let mut store = DataStore {
            state: StoreState::default(),
            backend,
        };

        store.state.sessions = store.load_or_default(Document::Sessions)?;
        store.state.transactions = store.load_or_default(Document::Transactions)?;
        store.state.bankrolls = store.load_or_default(Document::Bankrolls)?;

        match store.load_document::<Vec<Location>>(Document::Locations)? {
            Some(locations) => store.state.locations = locations,
            None => {
                store.state.locations = default_locations();
                store.persist(Document::Locations)?;
            }
        }

        match store.load_document::<Vec<String>>(Document::Stakes)? {
            Some(stakes) => store.state.stakes = stakes,
            None => {
                store.state.stakes = default_stakes();
                store.persist(Document::Stakes)?;
            }
        }

        info!(
            backend = store.backend.kind(),
            sessions = store.state.sessions.len(),
            bankrolls = store.state.bankrolls.len(),
            "store opened"
        );

        Ok(store)
    }

    /// Open the backend named in the config
    pub fn open_configured(config: &Config) -> Result<Self, StoreError> {
        let backend: Box<dyn SnapshotBackend> = match config.backend {
            BackendKind::Json => Box::new(JsonDirectory::new(&config.data_dir)),
            BackendKind::Sqlite => Box::new(SqliteBackend::open(&config.data_dir.join("bankroll.db"))?),
        };
        Self::open(backend)
    }

    fn load_document<T: DeserializeOwned>(&self, document: Document) -> Result<Option<T>, StoreError> {
        match self.backend.load(document)? {
            Some(json) => {
                debug!(document = document.name(), bytes = json.len(), "loaded document");
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, document: Document) -> Result<T, StoreError> {
        Ok(self.load_document(document)?.unwrap_or_default())
    }

    fn persist(&mut self, document: Document) -> Result<(), StoreError> {
        let json = match document {
            Document::Sessions => to_json(&self.state.sessions)?,
            Document::Transactions => to_json(&self.state.transactions)?,
            Document::Bankrolls => to_json(&self.state.bankrolls)?,
            Document::Locations => to_json(&self.state.locations)?,
            Document::Stakes => to_json(&self.state.stakes)?,
        };
        self.backend.save(document, &json)?;
        debug!(document = document.name(), bytes = json.len(), "saved document");
        Ok(())
    }

    /// Apply `mutate` and save `documents`; restore the previous state on any error.
    fn commit<T, F>(&mut self, documents: &[Document], mutate: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut StoreState) -> Result<T, StoreError>,
    {
        let before = self.state.clone();

        let value = match mutate(&mut self.state) {
            Ok(value) => value,
            Err(e) => {
                self.state = before;
                return Err(e);
            }
        };

        for document in documents {
            if let Err(e) = self.persist(*document) {
                warn!(document = document.name(), error = %e, "save failed, rolling back");
                self.state = before;
                return Err(e);
            }
        }

        Ok(value)
    }

    // ========================================================================
    // SESSIONS (default bankroll)
    // ========================================================================

    pub fn add_session(&mut self, session: Session) -> Result<(), StoreError> {
        if self.find_session(&session.id).is_some() {
            return Err(StoreError::Duplicate {
                kind: "session",
                id: session.id,
            });
        }
        self.commit(&[Document::Sessions], |state| {
            state.sessions.push(session);
            Ok(())
        })
    }

    /// Delete a session from whichever bankroll holds it
    pub fn delete_session(&mut self, id: &str) -> Result<Session, StoreError> {
        if self.state.sessions.iter().any(|s| s.id == id) {
            return self.commit(&[Document::Sessions], |state| {
                let index = state
                    .sessions
                    .iter()
                    .position(|s| s.id == id)
                    .ok_or_else(|| not_found("session", id))?;
                Ok(state.sessions.remove(index))
            });
        }

        self.commit(&[Document::Bankrolls], |state| {
            for bankroll in &mut state.bankrolls {
                if let Some(index) = bankroll.sessions.iter().position(|s| s.id == id) {
                    return Ok(bankroll.sessions.remove(index));
                }
            }
            Err(not_found("session", id))
        })
    }

    /// Sessions of the default bankroll, in insertion order
    pub fn sessions(&self) -> &[Session] {
        &self.state.sessions
    }

    /// Sessions of every bankroll, ordered by start time
    pub fn all_sessions(&self) -> Vec<Session> {
        let mut all: Vec<Session> = self
            .state
            .sessions
            .iter()
            .chain(self.state.bankrolls.iter().flat_map(|b| b.sessions.iter()))
            .cloned()
            .collect();
        all.sort_by_key(|s| s.start_time);
        all
    }

    pub fn find_session(&self, id: &str) -> Option<&Session> {
        self.state
            .sessions
            .iter()
            .chain(self.state.bankrolls.iter().flat_map(|b| b.sessions.iter()))
            .find(|s| s.id == id)
    }

    /// Append many sessions with a single save, skipping any whose id or
    /// fingerprint is already present (in the store or earlier in the batch).
    pub fn merge_sessions(&mut self, incoming: Vec<Session>) -> Result<MergeOutcome, StoreError> {
        let existing: Vec<&Session> = self
            .state
            .sessions
            .iter()
            .chain(self.state.bankrolls.iter().flat_map(|b| b.sessions.iter()))
            .collect();
        let mut seen_ids: HashSet<String> = existing.iter().map(|s| s.id.clone()).collect();
        let mut seen: HashSet<String> = existing.iter().map(|s| s.fingerprint()).collect();

        let mut outcome = MergeOutcome::default();
        let mut fresh = Vec::new();
        for session in incoming {
            if seen_ids.contains(&session.id) || !seen.insert(session.fingerprint()) {
                debug!(session = %session.id, "duplicate session in batch");
                outcome.duplicates += 1;
                continue;
            }
            seen_ids.insert(session.id.clone());
            fresh.push(session);
            outcome.added += 1;
        }

        if outcome.duplicates > 0 {
            warn!(duplicates = outcome.duplicates, "skipped duplicate sessions");
        }
        if fresh.is_empty() {
            return Ok(outcome);
        }

        self.commit(&[Document::Sessions], |state| {
            state.sessions.extend(fresh);
            Ok(())
        })?;

        info!(added = outcome.added, "merged sessions");
        Ok(outcome)
    }

    // ========================================================================
    // TRANSACTIONS (default bankroll)
    // ========================================================================

    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<(), StoreError> {
        self.commit(&[Document::Transactions], |state| {
            state.transactions.push(transaction);
            Ok(())
        })
    }

    pub fn delete_transaction(&mut self, id: &str) -> Result<Transaction, StoreError> {
        self.commit(&[Document::Transactions], |state| {
            let index = state
                .transactions
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| not_found("transaction", id))?;
            Ok(state.transactions.remove(index))
        })
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.state.transactions
    }

    /// Transactions of every bankroll, ordered by date
    pub fn all_transactions(&self) -> Vec<Transaction> {
        let mut all: Vec<Transaction> = self
            .state
            .transactions
            .iter()
            .chain(self.state.bankrolls.iter().flat_map(|b| b.transactions.iter()))
            .cloned()
            .collect();
        all.sort_by_key(|t| t.date);
        all
    }

    // ========================================================================
    // BANKROLLS
    // ========================================================================

    /// Create a named bankroll and return its id
    pub fn add_bankroll(&mut self, name: &str) -> Result<String, StoreError> {
        let name = name.trim();
        if self.bankroll_by_name(name).is_some() {
            return Err(StoreError::Duplicate {
                kind: "bankroll",
                id: name.to_string(),
            });
        }

        let bankroll = Bankroll::new(name);
        let id = bankroll.id.clone();
        self.commit(&[Document::Bankrolls], |state| {
            state.bankrolls.push(bankroll);
            Ok(())
        })?;
        Ok(id)
    }

    pub fn delete_bankroll(&mut self, id: &str) -> Result<Bankroll, StoreError> {
        self.commit(&[Document::Bankrolls], |state| {
            let index = state
                .bankrolls
                .iter()
                .position(|b| b.id == id)
                .ok_or_else(|| not_found("bankroll", id))?;
            Ok(state.bankrolls.remove(index))
        })
    }

    pub fn add_session_to_bankroll(&mut self, bankroll_id: &str, session: Session) -> Result<(), StoreError> {
        if self.find_session(&session.id).is_some() {
            return Err(StoreError::Duplicate {
                kind: "session",
                id: session.id,
            });
        }
        self.commit(&[Document::Bankrolls], |state| {
            let bankroll = state
                .bankrolls
                .iter_mut()
                .find(|b| b.id == bankroll_id)
                .ok_or_else(|| not_found("bankroll", bankroll_id))?;
            bankroll.sessions.push(session);
            Ok(())
        })
    }

    pub fn add_transaction_to_bankroll(
        &mut self,
        bankroll_id: &str,
        transaction: Transaction,
    ) -> Result<(), StoreError> {
        self.commit(&[Document::Bankrolls], |state| {
            let bankroll = state
                .bankrolls
                .iter_mut()
                .find(|b| b.id == bankroll_id)
                .ok_or_else(|| not_found("bankroll", bankroll_id))?;
            bankroll.transactions.push(transaction);
            Ok(())
        })
    }

    pub fn bankrolls(&self) -> &[Bankroll] {
        &self.state.bankrolls
    }

    pub fn bankroll(&self, id: &str) -> Option<&Bankroll> {
        self.state.bankrolls.iter().find(|b| b.id == id)
    }

    pub fn bankroll_by_name(&self, name: &str) -> Option<&Bankroll> {
        self.state
            .bankrolls
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name.trim()))
    }

    // ========================================================================
    // LOCATIONS & STAKES
    // ========================================================================

    pub fn add_location(&mut self, location: Location) -> Result<(), StoreError> {
        if self.state.locations.iter().any(|l| l.matches(&location.name)) {
            return Err(StoreError::Duplicate {
                kind: "location",
                id: location.name,
            });
        }
        self.commit(&[Document::Locations], |state| {
            state.locations.push(location);
            Ok(())
        })
    }

    /// Remove a location by name. Sessions keep their location text.
    pub fn delete_location(&mut self, name: &str) -> Result<Location, StoreError> {
        self.commit(&[Document::Locations], |state| {
            let index = state
                .locations
                .iter()
                .position(|l| l.matches(name))
                .ok_or_else(|| not_found("location", name))?;
            Ok(state.locations.remove(index))
        })
    }

    pub fn locations(&self) -> &[Location] {
        &self.state.locations
    }

    pub fn add_stakes(&mut self, stakes: &str) -> Result<(), StoreError> {
        let stakes = stakes.trim().to_string();
        if self.state.stakes.contains(&stakes) {
            return Err(StoreError::Duplicate {
                kind: "stakes",
                id: stakes,
            });
        }
        self.commit(&[Document::Stakes], |state| {
            state.stakes.push(stakes);
            Ok(())
        })
    }

    pub fn delete_stakes(&mut self, stakes: &str) -> Result<(), StoreError> {
        self.commit(&[Document::Stakes], |state| {
            let index = state
                .stakes
                .iter()
                .position(|s| s == stakes.trim())
                .ok_or_else(|| not_found("stakes", stakes))?;
            state.stakes.remove(index);
            Ok(())
        })
    }

    pub fn stakes(&self) -> &[String] {
        &self.state.stakes
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn not_found(kind: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
