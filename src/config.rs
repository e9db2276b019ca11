use clap::Parser;

/// Runtime settings. Every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "apiconnector", about = "Upsert/query service for live segment speed data")]
pub struct Config {
    /// Postgres connection string.
    #[arg(long, env = "POSTGRES_CONNECTION", hide_env_values = true)]
    pub database_url: String,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Upper bound on pooled backend connections.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: [&str; 4] = ["POSTGRES_CONNECTION", "HOST", "PORT", "DATABASE_MAX_CONNECTIONS"];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn missing_connection_string_fails() {
        clear_env();
        assert!(Config::try_parse_from(["apiconnector"]).is_err());
    }

    #[test]
    #[serial]
    fn reads_settings_from_environment() {
        clear_env();
        env::set_var("POSTGRES_CONNECTION", "postgres://env/livedata");
        env::set_var("PORT", "7000");

        let config = Config::try_parse_from(["apiconnector"]).unwrap();
        clear_env();

        assert_eq!(config.database_url, "postgres://env/livedata");
        assert_eq!(config.bind_addr(), "0.0.0.0:7000");
        assert_eq!(config.max_connections, 10);
    }

    #[test]
    #[serial]
    fn flags_override_environment() {
        clear_env();
        env::set_var("POSTGRES_CONNECTION", "postgres://env/livedata");
        env::set_var("PORT", "7000");

        let config = Config::try_parse_from([
            "apiconnector",
            "--database-url",
            "postgres://localhost/livedata",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--max-connections",
            "2",
        ])
        .unwrap();
        clear_env();

        assert_eq!(config.database_url, "postgres://localhost/livedata");
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.max_connections, 2);
    }

    #[test]
    #[serial]
    fn rejects_non_numeric_port() {
        clear_env();
        let result = Config::try_parse_from([
            "apiconnector",
            "--database-url",
            "postgres://localhost/livedata",
            "--port",
            "eighty",
        ]);
        assert!(result.is_err());
    }
}
