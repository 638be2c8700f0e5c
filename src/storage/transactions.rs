use crate::core::Transaction;
use crate::error::{FactomError, Result};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// ( K -> tx name, V => Transaction under construction )
pub struct TransactionPool {
    inner: RwLock<BTreeMap<String, Transaction>>,
}

impl Default for TransactionPool {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> FactomError {
    log::error!("Transaction pool lock poisoned");
    FactomError::Transaction("Transaction pool lock poisoned".to_string())
}

impl TransactionPool {
    pub fn new() -> TransactionPool {
        TransactionPool {
            inner: RwLock::new(BTreeMap::new()),
        }
    }

    /// Fails with TxExists when the name is taken
    pub fn create(&self, name: &str, tx: Transaction) -> Result<Transaction> {
        let mut pool = self.inner.write().map_err(|_| poisoned())?;
        if pool.contains_key(name) {
            return Err(FactomError::TxExists(name.to_string()));
        }
        pool.insert(name.to_string(), tx.clone());
        Ok(tx)
    }

    pub fn get(&self, name: &str) -> Result<Transaction> {
        let pool = self.inner.read().map_err(|_| poisoned())?;
        pool.get(name)
            .cloned()
            .ok_or_else(|| FactomError::TxNotFound(name.to_string()))
    }

    /// Run `f` on the named transaction and keep its changes only if it succeeds
    pub fn update<F>(&self, name: &str, f: F) -> Result<Transaction>
    where
        F: FnOnce(&mut Transaction) -> Result<()>,
    {
        let mut pool = self.inner.write().map_err(|_| poisoned())?;
        let current = pool
            .get(name)
            .ok_or_else(|| FactomError::TxNotFound(name.to_string()))?;
        let mut draft = current.clone();
        f(&mut draft)?;
        pool.insert(name.to_string(), draft.clone());
        Ok(draft)
    }

    pub fn remove(&self, name: &str) -> Result<Transaction> {
        let mut pool = self.inner.write().map_err(|_| poisoned())?;
        pool.remove(name)
            .ok_or_else(|| FactomError::TxNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        match self.inner.read() {
            Ok(pool) => pool.contains_key(name),
            Err(_) => {
                log::error!("Failed to acquire read lock on transaction pool");
                false
            }
        }
    }

    /// Every transaction, ordered by name
    pub fn get_all(&self) -> Vec<(String, Transaction)> {
        match self.inner.read() {
            Ok(pool) => pool
                .iter()
                .map(|(name, tx)| (name.clone(), tx.clone()))
                .collect(),
            Err(_) => {
                log::error!("Failed to acquire read lock on transaction pool");
                Vec::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        match self.inner.read() {
            Ok(pool) => pool.len(),
            Err(_) => {
                log::error!("Failed to acquire read lock on transaction pool");
                0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
