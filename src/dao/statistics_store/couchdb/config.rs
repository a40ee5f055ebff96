use super::error::{CouchDaoError, CouchResult};

/// Database used when `COUCH_DB` is not set.
pub const DEFAULT_STATISTICS_DATABASE: &str = "movie_quiz";

/// Basic-auth pair sent with every CouchDB request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouchCredentials {
    /// CouchDB user.
    pub username: String,
    /// Password of `username`.
    pub password: String,
}

/// Where the statistics document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouchConfig {
    /// Server root without trailing slash, e.g. `http://localhost:5984`.
    pub base_url: String,
    /// Database holding the statistics document.
    pub database: String,
    /// Sent as basic auth when present.
    pub credentials: Option<CouchCredentials>,
}

impl CouchConfig {
    /// Anonymous access to `database` on the server at `base_url`.
    pub fn new(base_url: impl Into<String>, database: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            database: database.into(),
            credentials: None,
        }
    }

    /// Authenticate as `username`.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(CouchCredentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Read `COUCH_BASE_URL`, `COUCH_DB`, `COUCH_USERNAME` and `COUCH_PASSWORD`.
    pub fn from_env() -> CouchResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`CouchConfig::from_env`] with variables resolved by `lookup`.
    ///
    /// Blank values count as unset. The user and password must be given together.
    pub fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> CouchResult<Self> {
        let var = |name| lookup(name).filter(|value| !value.trim().is_empty());

        let base_url = var("COUCH_BASE_URL").ok_or(CouchDaoError::MissingEnvVar {
            var: "COUCH_BASE_URL",
        })?;
        let database = var("COUCH_DB").unwrap_or_else(|| DEFAULT_STATISTICS_DATABASE.to_string());
        let config = Self::new(base_url, database);

        match (var("COUCH_USERNAME"), var("COUCH_PASSWORD")) {
            (Some(username), Some(password)) => Ok(config.with_credentials(username, password)),
            (None, None) => Ok(config),
            (Some(_), None) => Err(CouchDaoError::MissingEnvVar {
                var: "COUCH_PASSWORD",
            }),
            (None, Some(_)) => Err(CouchDaoError::MissingEnvVar {
                var: "COUCH_USERNAME",
            }),
        }
    }
}
