use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use latchkey_api::app::{AppDeps, build_app};
use latchkey_api::config::ApiConfig;
use latchkey_auth::{
    MemoryCache, MemoryDirectory, PrincipalKind, RoleDirectory, TokenGateway, TtlCache,
};
use latchkey_infra::{PgDirectory, RedisCache};

#[tokio::main]
async fn main() {
    latchkey_observability::init();

    let config = ApiConfig::from_env();

    let cache: Arc<dyn TtlCache> = match &config.redis_url {
        Some(url) => Arc::new(
            RedisCache::connect(url)
                .await
                .expect("failed to connect to redis"),
        ),
        None => {
            tracing::warn!("REDIS_URL not set; sessions and codes are process-local");
            Arc::new(MemoryCache::new())
        }
    };

    let directory: Arc<dyn RoleDirectory> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(8)
                .connect(url)
                .await
                .expect("failed to connect to postgres");
            Arc::new(PgDirectory::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; role directory is process-local");
            Arc::new(MemoryDirectory::with_default_roles())
        }
    };

    let user_gateway = Arc::new(TokenGateway::new(
        PrincipalKind::User,
        config.user_secret.as_bytes(),
        config.session_ttl,
        cache.clone(),
    ));
    let admin_gateway = Arc::new(TokenGateway::new(
        PrincipalKind::Admin,
        config.admin_secret.as_bytes(),
        config.session_ttl,
        cache,
    ));

    let app = build_app(AppDeps {
        user_gateway,
        admin_gateway,
        directory,
    });

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
