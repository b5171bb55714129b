//! Registry of running tables.

use std::collections::HashMap;

use log::info;
use tokio::sync::{RwLock, oneshot};

use super::actor::{TableActor, TableHandle};
use super::config::TableConfig;
use super::messages::{TableInfo, TableMessage};
use super::short_id;

pub const DEFAULT_MAX_TABLES: usize = 50;

/// In-memory table registry. Creating a table spawns its actor task;
/// nothing survives a restart.
pub struct TableManager {
    tables: RwLock<HashMap<String, TableHandle>>,
    max_tables: usize,
}

impl Default for TableManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TABLES)
    }
}

impl TableManager {
    #[must_use]
    pub fn new(max_tables: usize) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            max_tables,
        }
    }

    /// Validate the config, spawn the actor, and return the new game
    /// id.
    pub async fn create_table(&self, config: TableConfig) -> Result<String, String> {
        config.validate()?;

        let mut tables = self.tables.write().await;
        if tables.len() >= self.max_tables {
            return Err(format!("table limit of {} reached", self.max_tables));
        }
        let game_id = short_id();
        let (actor, handle) = TableActor::new(game_id.clone(), config);
        tables.insert(game_id.clone(), handle);
        drop(tables);

        tokio::spawn(actor.run());
        info!("created table {game_id}");
        Ok(game_id)
    }

    pub async fn get(&self, game_id: &str) -> Option<TableHandle> {
        self.tables.read().await.get(game_id).cloned()
    }

    /// Lobby listing. Tables that fail to answer (shutting down) are
    /// skipped.
    pub async fn list(&self) -> Vec<TableInfo> {
        let handles: Vec<TableHandle> = self.tables.read().await.values().cloned().collect();
        let mut infos = Vec::with_capacity(handles.len());
        for handle in handles {
            let (tx, rx) = oneshot::channel();
            if handle.send(TableMessage::GetInfo { response: tx }).await.is_ok()
                && let Ok(info) = rx.await
            {
                infos.push(info);
            }
        }
        infos.sort_by(|a, b| a.game_id.cmp(&b.game_id));
        infos
    }

    /// Close a table and forget it. Returns whether it existed.
    pub async fn close_table(&self, game_id: &str) -> bool {
        let handle = self.tables.write().await.remove(game_id);
        match handle {
            Some(handle) => {
                let _ = handle.send(TableMessage::Close).await;
                info!("closed table {game_id}");
                true
            }
            None => false,
        }
    }
}
