use crate::auth::password::DEFAULT_BCRYPT_COST;
use crate::auth::token::DEFAULT_TOKEN_TTL_SECS;
use std::env;

/// Process-wide configuration, loaded once at startup and handed to the
/// components that need it. Nothing reads the environment after this.
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Signing key for issued tokens. Rotating it invalidates all
    /// outstanding tokens.
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub bcrypt_cost: u32,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_callback_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            token_ttl_secs: env::var("TOKEN_TTL_SECS")
                .ok()
                .map(|value| value.parse().expect("TOKEN_TTL_SECS must be a number"))
                .unwrap_or(DEFAULT_TOKEN_TTL_SECS),
            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .map(|value| value.parse().expect("BCRYPT_COST must be a number"))
                .unwrap_or(DEFAULT_BCRYPT_COST),
            google_client_id: env::var("GOOGLE_CLIENT_ID").expect("GOOGLE_CLIENT_ID must be set"),
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET")
                .expect("GOOGLE_CLIENT_SECRET must be set"),
            google_callback_url: env::var("GOOGLE_CALLBACK_URL")
                .expect("GOOGLE_CALLBACK_URL must be set"),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("DATABASE_URL", "postgres://test");
        env::set_var("JWT_SECRET", "config-test-secret");
        env::set_var("GOOGLE_CLIENT_ID", "client-id");
        env::set_var("GOOGLE_CLIENT_SECRET", "client-secret");
        env::set_var(
            "GOOGLE_CALLBACK_URL",
            "http://127.0.0.1:8080/api/users/google/callback",
        );

        let config = Config::from_env();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(config.bcrypt_cost, DEFAULT_BCRYPT_COST);

        env::set_var("TOKEN_TTL_SECS", "120");
        env::set_var("BCRYPT_COST", "4");

        let config = Config::from_env();

        assert_eq!(config.token_ttl_secs, 120);
        assert_eq!(config.bcrypt_cost, 4);

        env::remove_var("TOKEN_TTL_SECS");
        env::remove_var("BCRYPT_COST");
    }
}
