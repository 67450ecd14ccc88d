//! Postgres database API implementation

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::error::ApiError;

const POSTGRES_PATH: &str = "/api/v1/postgres";

/// Status reported once a database accepts connections
pub const STATUS_RUNNING: &str = "running";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresDatabase {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
}

impl PostgresDatabase {
    pub fn is_running(&self) -> bool {
        self.status == STATUS_RUNNING
    }
}

/// Request body for creating databases
#[derive(Debug, Serialize)]
pub struct CreatePostgresRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatePostgresResponse {
    id: String,
}

pub struct PostgresApi<'a> {
    client: &'a Client,
}

impl<'a> PostgresApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Create a database and return its id. The database is usually still
    /// provisioning when this returns.
    pub async fn create(&self, name: &str) -> Result<String, ApiError> {
        let response: CreatePostgresResponse = self
            .client
            .post(POSTGRES_PATH, &CreatePostgresRequest { name })
            .await?;
        tracing::info!(id = %response.id, name, "created postgres database");
        Ok(response.id)
    }

    pub async fn get(&self, id: &str) -> Result<PostgresDatabase, ApiError> {
        self.client.get(&database_path(id)?).await.map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::NotFound(id.to_string()),
            e => e,
        })
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let _: serde_json::Value = self.client.delete(&database_path(id)?).await?;
        tracing::info!(id, "deleted postgres database");
        Ok(())
    }
}

/// Ids come from users on import and in data sources, so they are always
/// encoded as a single path segment
fn database_path(id: &str) -> Result<String, ApiError> {
    if matches!(id, "" | "." | "..") {
        return Err(ApiError::Parse(format!(
            "invalid postgres database id {:?}",
            id
        )));
    }
    Ok(format!("{}/{}", POSTGRES_PATH, urlencoding::encode(id)))
}
