//! Optimistic updates over a local keyed view
//!
//! Command pattern: [`OptimisticLedger::apply`] installs a tentative value
//! and returns a token; the caller later settles the token with
//! [`OptimisticLedger::confirm`] (server value) or
//! [`OptimisticLedger::rollback`] (prior value restored exactly).
//!
//! At most one update per key is in flight. Tokens that were abandoned or
//! already settled are ignored, so results arriving after navigation are
//! discarded rather than applied.

use std::collections::HashMap;
use std::hash::Hash;

use thiserror::Error;

/// Handle for one in-flight update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UpdateToken(u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptimisticError {
    #[error("An update for this item is already in flight")]
    UpdateInFlight,
}

#[derive(Debug)]
struct Pending<K, V> {
    key: K,
    /// `None` when the key was absent before the update
    prior: Option<V>,
}

#[derive(Debug)]
pub struct OptimisticLedger<K, V> {
    view: HashMap<K, V>,
    pending: HashMap<UpdateToken, Pending<K, V>>,
    next_token: u64,
}

impl<K, V> Default for OptimisticLedger<K, V> {
    fn default() -> Self {
        Self {
            view: HashMap::new(),
            pending: HashMap::new(),
            next_token: 0,
        }
    }
}

impl<K, V> OptimisticLedger<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.view.get(key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.view.values()
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        self.pending.values().any(|p| &p.key == key)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Store an authoritative value outside of any update
    pub fn upsert(&mut self, key: K, value: V) -> Result<(), OptimisticError> {
        if self.is_in_flight(&key) {
            return Err(OptimisticError::UpdateInFlight);
        }
        self.view.insert(key, value);
        Ok(())
    }

    pub fn remove(&mut self, key: &K) -> Result<Option<V>, OptimisticError> {
        if self.is_in_flight(key) {
            return Err(OptimisticError::UpdateInFlight);
        }
        Ok(self.view.remove(key))
    }

    /// Install `tentative` and remember what it replaced
    pub fn apply(&mut self, key: K, tentative: V) -> Result<UpdateToken, OptimisticError> {
        if self.is_in_flight(&key) {
            return Err(OptimisticError::UpdateInFlight);
        }

        let token = UpdateToken(self.next_token);
        self.next_token += 1;

        let prior = self.view.insert(key.clone(), tentative);
        self.pending.insert(token, Pending { key, prior });
        Ok(token)
    }

    /// Replace the tentative value with the server's; `false` if the token
    /// is unknown, in which case nothing changes
    pub fn confirm(&mut self, token: UpdateToken, value: V) -> bool {
        match self.pending.remove(&token) {
            Some(pending) => {
                self.view.insert(pending.key, value);
                true
            }
            None => false,
        }
    }

    /// Restore the value seen before `apply`; `false` if the token is unknown
    pub fn rollback(&mut self, token: UpdateToken) -> bool {
        match self.pending.remove(&token) {
            Some(pending) => {
                self.restore(pending);
                true
            }
            None => false,
        }
    }

    /// Roll back every in-flight update, returning how many there were
    pub fn abandon_all(&mut self) -> usize {
        let count = self.pending.len();
        for (_, pending) in self.pending.drain().collect::<Vec<_>>() {
            self.restore(pending);
        }
        count
    }

    fn restore(&mut self, pending: Pending<K, V>) {
        match pending.prior {
            Some(prior) => {
                self.view.insert(pending.key, prior);
            }
            None => {
                self.view.remove(&pending.key);
            }
        }
    }
}
