use serde::Deserialize;

use crate::domain::user::CurrentUser;

/// `me` record as returned by the GraphQL API.
#[derive(Debug, Clone, Deserialize)]
pub struct UserNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<UserNode> for CurrentUser {
    fn from(node: UserNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
            email: node.email,
        }
    }
}
