use crate::libs::schema::{TableCatalog, TableSchema};
use config::{Config, ConfigError, Environment, File, FileFormat, FileSourceFile};
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::mysql::MySqlConnectOptions;
use std::net::SocketAddr;
use std::time::Duration;

/// MySQL connection settings, read from `MYSQL_*` environment variables.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(
        default = "default_db_port",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub port: u16,
    pub user: String,
    pub password: Secret<String>,
    pub database: String,
}

fn default_db_host() -> String {
    "db".to_string()
}

fn default_db_port() -> u16 {
    3306
}

impl DatabaseSettings {
    pub fn from_environment(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.expose_secret())
            .database(&self.database)
    }
}

/// Console settings: the shared password, the listen address and,
/// optionally, a replacement table catalog.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct ConsoleSettings {
    #[serde(default = "default_console_host")]
    pub host: String,
    #[serde(
        default = "default_console_port",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub port: u16,
    pub password: Secret<String>,
    #[serde(
        default = "default_session_idle_minutes",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub session_idle_minutes: u64,
    #[serde(default)]
    pub tables: Vec<TableSchema>,
}

fn default_console_host() -> String {
    "0.0.0.0".to_string()
}

fn default_console_port() -> u16 {
    8501
}

fn default_session_idle_minutes() -> u64 {
    30
}

impl ConsoleSettings {
    pub fn from_sources(
        file: Option<File<FileSourceFile, FileFormat>>,
        env: Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(file);
        }
        builder.add_source(env).build()?.try_deserialize()
    }

    pub fn catalog(&self) -> TableCatalog {
        if self.tables.is_empty() {
            TableCatalog::mortgage()
        } else {
            TableCatalog::new(self.tables.clone())
        }
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_minutes.saturating_mul(60))
    }

    /// Resolves `host:port` to the first matching socket address. The host
    /// may be an IP literal or a name such as `localhost`.
    pub async fn listen_address(&self) -> Result<SocketAddr, ConfigError> {
        let invalid = |detail: String| {
            ConfigError::Message(format!(
                "invalid listen address {}:{}: {detail}",
                self.host, self.port
            ))
        };
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("host did not resolve".to_string()))
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub console: ConsoleSettings,
}

/// Loads `MYSQL_*` and `CONSOLE_*` from the process environment, with an
/// optional `console.toml` under the console settings.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let database = DatabaseSettings::from_environment(Environment::with_prefix("MYSQL"))?;
    let console = ConsoleSettings::from_sources(
        Some(File::with_name("console").required(false)),
        Environment::with_prefix("CONSOLE"),
    )?;
    Ok(Settings { database, console })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn database_settings_read_mysql_variables() {
        let source = env(&[
            ("MYSQL_HOST", "mysql.internal"),
            ("MYSQL_PORT", "3307"),
            ("MYSQL_USER", "console"),
            ("MYSQL_PASSWORD", "hunter2"),
            ("MYSQL_DATABASE", "mortgages"),
        ]);
        let settings = DatabaseSettings::from_environment(
            Environment::with_prefix("MYSQL").source(Some(source)),
        )
        .unwrap();
        assert_eq!(settings.host, "mysql.internal");
        assert_eq!(settings.port, 3307);
        assert_eq!(settings.user, "console");
        assert_eq!(settings.password.expose_secret(), "hunter2");
        assert_eq!(settings.database, "mortgages");
    }

    #[test]
    fn host_and_port_have_defaults() {
        let source = env(&[
            ("MYSQL_USER", "console"),
            ("MYSQL_PASSWORD", "hunter2"),
            ("MYSQL_DATABASE", "mortgages"),
        ]);
        let settings = DatabaseSettings::from_environment(
            Environment::with_prefix("MYSQL").source(Some(source)),
        )
        .unwrap();
        assert_eq!(settings.host, "db");
        assert_eq!(settings.port, 3306);
    }

    #[test]
    fn missing_database_name_is_an_error() {
        let source = env(&[("MYSQL_USER", "console"), ("MYSQL_PASSWORD", "hunter2")]);
        let result = DatabaseSettings::from_environment(
            Environment::with_prefix("MYSQL").source(Some(source)),
        );
        assert!(result.is_err());
    }

    #[test]
    fn non_numeric_port_is_an_error() {
        let source = env(&[
            ("MYSQL_PORT", "three"),
            ("MYSQL_USER", "console"),
            ("MYSQL_PASSWORD", "hunter2"),
            ("MYSQL_DATABASE", "mortgages"),
        ]);
        let result = DatabaseSettings::from_environment(
            Environment::with_prefix("MYSQL").source(Some(source)),
        );
        assert!(result.is_err());
    }

    #[test]
    fn console_defaults_to_the_mortgage_catalog() {
        let source = env(&[("CONSOLE_PASSWORD", "letmein")]);
        let settings = ConsoleSettings::from_sources(
            None,
            Environment::with_prefix("CONSOLE").source(Some(source)),
        )
        .unwrap();
        assert_eq!(settings.port, 8501);
        assert_eq!(settings.session_idle_timeout(), Duration::from_secs(30 * 60));
        assert_eq!(settings.catalog(), TableCatalog::mortgage());
    }

    #[tokio::test]
    async fn listen_address_accepts_ip_literals() {
        let source = env(&[("CONSOLE_PASSWORD", "letmein")]);
        let settings = ConsoleSettings::from_sources(
            None,
            Environment::with_prefix("CONSOLE").source(Some(source)),
        )
        .unwrap();
        let address = settings.listen_address().await.unwrap();
        assert_eq!(address.to_string(), "0.0.0.0:8501");
    }

    #[tokio::test]
    async fn listen_address_resolves_host_names() {
        let source = env(&[
            ("CONSOLE_PASSWORD", "letmein"),
            ("CONSOLE_HOST", "localhost"),
            ("CONSOLE_PORT", "9001"),
            ("CONSOLE_SESSION_IDLE_MINUTES", "5"),
        ]);
        let settings = ConsoleSettings::from_sources(
            None,
            Environment::with_prefix("CONSOLE").source(Some(source)),
        )
        .unwrap();
        let address = settings.listen_address().await.unwrap();
        assert!(address.ip().is_loopback());
        assert_eq!(address.port(), 9001);
        assert_eq!(settings.session_idle_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn console_password_is_required() {
        let result = ConsoleSettings::from_sources(
            None,
            Environment::with_prefix("CONSOLE").source(Some(HashMap::new())),
        );
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn configuration_comes_from_the_process_environment() {
        let vars = [
            ("MYSQL_USER", "console"),
            ("MYSQL_PASSWORD", "hunter2"),
            ("MYSQL_DATABASE", "mortgages"),
            ("CONSOLE_PASSWORD", "letmein"),
            ("CONSOLE_PORT", "9000"),
        ];
        for (key, value) in vars {
            unsafe { std::env::set_var(key, value) };
        }

        let settings = get_configuration();

        for (key, _) in vars {
            unsafe { std::env::remove_var(key) };
        }
        let settings = settings.unwrap();
        assert_eq!(settings.database.database, "mortgages");
        assert_eq!(settings.console.port, 9000);
        assert_eq!(settings.console.password.expose_secret(), "letmein");
    }
}
