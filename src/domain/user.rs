use serde::{Deserialize, Serialize};

/// The operator signed in to the admin panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}
