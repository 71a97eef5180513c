//! Application Startup
//!
//! Application building and server initialization. The real-time hub and its
//! fanout are constructed here exactly once and shared through `AppState`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::application::realtime::{ConnectionRegistry, Fanout, LocalFanout, Realtime, RealtimeOptions};
use crate::config::{FanoutMode, Settings};
use crate::domain::{DirectMessageRepository, MessageRepository, UserRepository};
use crate::infrastructure::repositories::{
    PgDirectMessageRepository, PgMessageRepository, PgUserRepository,
};
use crate::infrastructure::{database, pubsub};
use crate::presentation::http::routes;
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::FrameDispatcher;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Present only with the distributed fanout
    pub redis: Option<ConnectionManager>,
    pub realtime: Arc<Realtime>,
    pub users: Arc<dyn UserRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub direct_messages: Arc<dyn DirectMessageRepository>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn dispatcher(&self) -> FrameDispatcher {
        FrameDispatcher::new(
            self.realtime.clone(),
            self.messages.clone(),
            self.direct_messages.clone(),
        )
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    /// Kept alive for the life of the server
    bus: Option<JoinHandle<()>>,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        // Create database pool
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        let registry = Arc::new(ConnectionRegistry::new());
        let options = RealtimeOptions::from(&settings.realtime);

        // The one place the fanout implementation is chosen
        let (fanout, redis, bus) = match (
            settings.realtime.fanout,
            settings.redis.as_ref(),
        ) {
            (FanoutMode::Redis, Some(redis_settings)) => {
                let instance_id = Uuid::new_v4();
                let client = pubsub::open_client(redis_settings)?;
                let conn = pubsub::create_redis_client(client.clone()).await?;

                let bus = pubsub::BusSubscriber::new(
                    client,
                    registry.clone(),
                    instance_id,
                    settings.realtime.bus_retry_delay(),
                )
                .spawn();
                tracing::info!(instance_id = %instance_id, "Bus subscriber started");

                let fanout: Arc<dyn Fanout> =
                    Arc::new(pubsub::RedisFanout::new(conn.clone(), instance_id));
                (fanout, Some(conn), Some(bus))
            }
            (FanoutMode::Redis, None) => {
                anyhow::bail!("realtime.fanout = \"redis\" requires redis.url")
            }
            (FanoutMode::Local, _) => {
                let fanout: Arc<dyn Fanout> = Arc::new(LocalFanout::new(registry.clone()));
                (fanout, None, None)
            }
        };
        tracing::info!(fanout = %settings.realtime.fanout, "Real-time hub configured");

        let realtime = Arc::new(Realtime::new(registry, fanout, options));

        // Create app state
        let state = AppState {
            users: Arc::new(PgUserRepository::new(db.clone())),
            messages: Arc::new(PgMessageRepository::new(db.clone())),
            direct_messages: Arc::new(PgDirectMessageRepository::new(db.clone())),
            db,
            redis,
            realtime,
            settings: Arc::new(settings.clone()),
        };

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(logging::create_trace_layer())
            .layer(cors::create_cors_layer(&settings.cors));

        // Bind to address
        let listener = TcpListener::bind(settings.server_addr()).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            router,
            bus,
        })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        let result = axum::serve(self.listener, self.router).await;
        if let Some(bus) = self.bus {
            bus.abort();
        }
        result?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
