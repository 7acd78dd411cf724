//! Error types.
//!
//! Transport failures never leave the backend raw: every one is wrapped in a
//! [`BackendError`] naming the attempted [`Operation`] and the index.

use thiserror::Error;

pub use crate::transport::TransportError;

/// Operations the backend performs against the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CheckExists,
    CreateIndex,
    DeleteIndex,
    UpdateSettings,
    UpdateMapping,
    IndexItems,
    DeleteItems,
    Search,
}

impl Operation {
    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CheckExists => "check_exists",
            Self::CreateIndex => "create_index",
            Self::DeleteIndex => "delete_index",
            Self::UpdateSettings => "update_settings",
            Self::UpdateMapping => "update_mapping",
            Self::IndexItems => "index_items",
            Self::DeleteItems => "delete_items",
            Self::Search => "search",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::CheckExists => "checking existence of",
            Self::CreateIndex => "creating",
            Self::DeleteIndex => "deleting",
            Self::UpdateSettings => "updating settings for",
            Self::UpdateMapping => "updating field mappings for",
            Self::IndexItems => "indexing items in",
            Self::DeleteItems => "deleting items from",
            Self::Search => "searching",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// One document the engine rejected inside a bulk call.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemFailure {
    pub id: String,
    pub status: u16,
    pub reason: String,
    pub caused_by: Option<String>,
}

impl std::fmt::Display for BulkItemFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.id, self.status, self.reason)?;
        if let Some(cause) = &self.caused_by {
            write!(f, " caused by {cause}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("An error occurred {operation} index {index}: {source}")]
    Transport {
        operation: Operation,
        index: String,
        #[source]
        source: TransportError,
    },
    #[error("{} of {} items failed {} index {}", .failures.len(), .submitted.len(), .operation, .index)]
    BulkFailures {
        operation: Operation,
        index: String,
        failures: Vec<BulkItemFailure>,
        /// Every id that was sent, rejected ones included
        submitted: Vec<String>,
    },
}

impl BackendError {
    pub fn transport(operation: Operation, index: impl Into<String>, source: TransportError) -> Self {
        Self::Transport {
            operation,
            index: index.into(),
            source,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::Transport { operation, .. } | Self::BulkFailures { operation, .. } => *operation,
        }
    }

    pub fn index(&self) -> &str {
        match self {
            Self::Transport { index, .. } | Self::BulkFailures { index, .. } => index,
        }
    }

    /// Metrics label for the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { source, .. } => source.kind(),
            Self::BulkFailures { .. } => "bulk_item",
        }
    }
}

pub type Result<T> = std::result::Result<T, BackendError>;
