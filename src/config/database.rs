//! Configuración de base de datos
//!
//! Este módulo maneja la configuración del pool de PostgreSQL con SQLx.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::environment::EnvironmentConfig;

/// Configuración de la base de datos
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl From<&EnvironmentConfig> for DatabaseConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            url: config.database_url.clone(),
            max_connections: 20,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(3600),
        }
    }
}

impl DatabaseConfig {
    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
    }

    /// Crear un nuevo pool de conexiones
    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        self.options().connect(&self.url).await
    }

    /// Pool que no abre conexiones hasta la primera consulta
    pub fn create_lazy_pool(&self) -> Result<PgPool, sqlx::Error> {
        self.options().min_connections(0).connect_lazy(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_environment() {
        let env = EnvironmentConfig::for_tests();
        let config = DatabaseConfig::from(&env);
        assert_eq!(config.url, env.database_url);
        assert!(config.max_connections >= config.min_connections);
    }
}
