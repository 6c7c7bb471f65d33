//! Authentication service

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{
    config::Config,
    constants::JWT_EXPIRY_DAYS,
    db::repositories::UserRepository,
    error::{AppError, AppResult},
    models::User,
};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication service
pub struct AuthService;

impl AuthService {
    /// Register a new user and issue a token
    pub async fn register(
        pool: &PgPool,
        config: &Config,
        username: &str,
        email: &str,
        password: &str,
    ) -> AppResult<(i64, String)> {
        if UserRepository::find_by_username(pool, username)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists("Username already exists".to_string()));
        }

        let password_hash = Self::hash_password(password, config.auth.bcrypt_rounds)?;
        let user_id = UserRepository::create(pool, username, email, &password_hash).await?;
        let token = Self::generate_token(config, user_id, username)?;

        Ok((user_id, token))
    }

    /// Login with username and password
    pub async fn login(
        pool: &PgPool,
        config: &Config,
        username: &str,
        password: &str,
    ) -> AppResult<(User, String)> {
        let user = UserRepository::find_by_username(pool, username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !Self::verify_password(password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        UserRepository::update_last_login(pool, user.id).await?;

        let token = Self::generate_token(config, user.id, &user.username)?;

        Ok((user, token))
    }

    /// Verify a JWT and extract its claims
    pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Issue a 7-day HS256 token
    pub fn generate_token(config: &Config, user_id: i64, username: &str) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            username: username.to_string(),
            exp: (now + Duration::days(JWT_EXPIRY_DAYS)).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.auth.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token generation failed: {e}")))?;

        Ok(token)
    }

    /// Hash a password with the configured bcrypt cost
    fn hash_password(password: &str, rounds: u32) -> AppResult<String> {
        hash(password, rounds)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
    }

    /// Verify a password against its stored hash
    fn verify_password(password: &str, hashed: &str) -> AppResult<bool> {
        verify(password, hashed)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password verification failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        // Cost 4 is the bcrypt minimum; keeps the test fast.
        let hashed = AuthService::hash_password("hunter22", 4).unwrap();
        assert!(AuthService::verify_password("hunter22", &hashed).unwrap());
        assert!(!AuthService::verify_password("hunter23", &hashed).unwrap());
    }

    #[test]
    fn test_token_round_trip() {
        let mut config = test_config();
        config.auth.jwt_secret = "test-secret".to_string();

        let token = AuthService::generate_token(&config, 42, "alice").unwrap();
        let claims = AuthService::verify_token(&token, "test-secret").unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let mut config = test_config();
        config.auth.jwt_secret = "test-secret".to_string();

        let token = AuthService::generate_token(&config, 42, "alice").unwrap();
        assert!(AuthService::verify_token(&token, "other-secret").is_err());
    }

    fn test_config() -> Config {
        use crate::config::*;

        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                rust_log: "info".to_string(),
                allowed_origins: vec![],
            },
            database: DatabaseConfig {
                url: "postgres://localhost/test".to_string(),
                max_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost".to_string(),
            },
            auth: AuthConfig {
                jwt_secret: "secret".to_string(),
                bcrypt_rounds: 4,
            },
            docker: DockerConfig {
                socket_path: "/var/run/docker.sock".to_string(),
                network_disabled: false,
            },
            execution: ExecutionConfig {
                run_timeout_seconds: 15,
                memory_limit: "512m".to_string(),
            },
            limits: LimitsConfig {
                max_file_size: 50_000,
                max_total_files_size: 200_000,
            },
            deployment: DeploymentConfig {
                enabled: false,
                min_security_score: 80,
            },
        }
    }
}
