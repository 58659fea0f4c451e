//! User and account domain models.

use serde::{Deserialize, Serialize};

/// A tenant account. Accounts may belong to a primary (group) account whose
/// users are visible to every member account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub primary_account_id: Option<String>,
}

impl Account {
    /// Account ids whose users the holder of this account may address.
    pub fn visible_account_ids(&self) -> Vec<String> {
        let mut ids = vec![self.id.clone()];
        if let Some(primary) = &self.primary_account_id {
            if primary != &self.id {
                ids.push(primary.clone());
            }
        }
        ids
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub account_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub unread_notifications: i64,
}

impl User {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub id: Option<String>,
    pub account_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// State of a contact link between two users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactStatus {
    Accepted,
    Pending,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Accepted => "ACCEPTED",
            ContactStatus::Pending => "PENDING",
        }
    }
}
