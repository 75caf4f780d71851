//! Results of a delivery.

use crate::connection::{SecurityMode, ServerInfo};
use crate::error::{Error, RecipientRejection};
use crate::types::{Address, Reply};

/// Outcome of one completed transaction.
#[derive(Debug, Clone)]
pub struct GroupReport {
    /// Destination domain of the group.
    pub domain: String,
    /// Mail exchange the message was handed to.
    pub server: String,
    /// Security of the channel the message travelled over.
    pub security: SecurityMode,
    /// Greeting hostname and final EHLO capabilities.
    pub server_info: ServerInfo,
    /// Recipients the server accepted.
    pub accepted: Vec<Address>,
    /// Recipients the server refused.
    pub rejected: Vec<RecipientRejection>,
    /// Reply to the end-of-data terminator.
    pub reply: Reply,
}

impl GroupReport {
    /// Returns true if every recipient was accepted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Returns one [`Error::RecipientRejected`] per refused recipient.
    #[must_use]
    pub fn rejection_errors(&self) -> Vec<Error> {
        self.rejected
            .iter()
            .cloned()
            .map(Error::RecipientRejected)
            .collect()
    }
}

/// Outcome of delivering to one recipient group.
#[derive(Debug)]
pub struct GroupDelivery {
    /// Destination domain.
    pub domain: String,
    /// Recipients of the group.
    pub recipients: Vec<Address>,
    /// Report on success, fatal error otherwise.
    pub result: Result<GroupReport, Error>,
}

/// Outcome of a whole run, one entry per group in delivery order.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    /// Per-group outcomes.
    pub groups: Vec<GroupDelivery>,
}

impl DeliveryReport {
    /// Returns true if every group completed and no recipient was refused.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.groups
            .iter()
            .all(|g| g.result.as_ref().is_ok_and(GroupReport::is_complete))
    }

    /// Counts recipients the servers accepted.
    #[must_use]
    pub fn accepted_count(&self) -> usize {
        self.groups
            .iter()
            .filter_map(|g| g.result.as_ref().ok())
            .map(|r| r.accepted.len())
            .sum()
    }

    /// Iterates over groups that failed fatally.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.groups
            .iter()
            .filter_map(|g| g.result.as_ref().err().map(|e| (g.domain.as_str(), e)))
    }
}
