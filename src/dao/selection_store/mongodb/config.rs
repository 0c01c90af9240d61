use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

/// Runtime configuration describing how to connect to MongoDB.
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// Parsed driver options.
    pub options: ClientOptions,
    /// Database holding the `selections` collection.
    pub database_name: String,
}

impl MongoConfig {
    /// Build a configuration from a connection URI and an optional database name.
    pub async fn from_uri(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let database_name = db_name.unwrap_or("santa_draw").to_owned();
        let options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;

        Ok(Self {
            options,
            database_name,
        })
    }

    /// Build a configuration from `MONGO_URI` and `MONGO_DB`, defaulting to a
    /// local deployment when no URI is set.
    pub async fn from_env() -> MongoResult<Self> {
        let uri =
            std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
        let db = std::env::var("MONGO_DB").ok();
        Self::from_uri(&uri, db.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_uri_defaults_the_database_name() {
        let config = MongoConfig::from_uri("mongodb://localhost:27017", None)
            .await
            .unwrap();
        assert_eq!(config.database_name, "santa_draw");
    }

    #[tokio::test]
    async fn from_uri_honors_an_explicit_database_name() {
        let config = MongoConfig::from_uri("mongodb://localhost:27017", Some("gifts"))
            .await
            .unwrap();
        assert_eq!(config.database_name, "gifts");
    }

    #[tokio::test]
    async fn from_uri_rejects_garbage() {
        let err = MongoConfig::from_uri("not-a-mongo-uri", None)
            .await
            .unwrap_err();
        assert!(matches!(err, MongoDaoError::InvalidUri { .. }));
    }
}
