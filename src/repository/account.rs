use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::domain::user::CurrentUser;
use crate::models::user::UserNode;
use crate::repository::{AccountGateway, GraphQlRepository, RepositoryResult};

const CURRENT_USER_QUERY: &str = r#"
query me {
  me {
    id
    name
    email
  }
}
"#;

const LOGOUT_MUTATION: &str = r#"
mutation logout {
  logout
}
"#;

#[derive(Deserialize)]
struct MeData {
    me: UserNode,
}

#[async_trait]
impl AccountGateway for GraphQlRepository {
    async fn current_user(&self) -> RepositoryResult<CurrentUser> {
        let data: MeData = self.execute(CURRENT_USER_QUERY, json!({})).await?;
        Ok(data.me.into())
    }

    async fn logout(&self) -> RepositoryResult<()> {
        let _: serde_json::Value = self.execute(LOGOUT_MUTATION, json!({})).await?;
        Ok(())
    }
}
