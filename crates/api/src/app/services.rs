use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::broadcast;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};
use tracing::{info, warn};

use storefront_events::{EventBus, EventEnvelope, InMemoryEventBus};
use storefront_infra::{
    repository::{
        InMemoryRepository, InventoryRepository, OrderRepository, PostgresInventoryRepository,
        PostgresOrderRepository, PostgresProductRepository, ProductRepository, ensure_schema,
    },
    seed::seed_inventory,
    services::{InventoryService, OrderService, ProductService, StockChecker},
};

use crate::config::ApiConfig;

pub type Bus = Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>;

/// Realtime message broadcasted via SSE.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RealtimeMessage {
    pub topic: String,
    pub payload: JsonValue,
}

pub struct AppServices {
    inventory: Arc<InventoryService>,
    orders: OrderService<Bus>,
    products: ProductService,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
}

impl AppServices {
    pub fn inventory(&self) -> &InventoryService {
        &self.inventory
    }

    pub fn orders(&self) -> &OrderService<Bus> {
        &self.orders
    }

    pub fn products(&self) -> &ProductService {
        &self.products
    }

    pub fn realtime_tx(&self) -> &broadcast::Sender<RealtimeMessage> {
        &self.realtime_tx
    }
}

struct Stores {
    inventory: Arc<dyn InventoryRepository>,
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
}

pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let stores = if config.use_persistent_stores {
        postgres_stores(config).await?
    } else {
        info!("using in-memory stores");
        Stores {
            inventory: Arc::new(InMemoryRepository::new()),
            orders: Arc::new(InMemoryRepository::new()),
            products: Arc::new(InMemoryRepository::new()),
        }
    };

    if config.seed_inventory {
        let inserted = seed_inventory(stores.inventory.as_ref()).await?;
        info!(inserted, "inventory seeded");
    }

    let (realtime_tx, _) = broadcast::channel(256);
    let bus: Bus = Arc::new(InMemoryEventBus::new());
    spawn_notification_listener(&bus, realtime_tx.clone())?;

    let inventory = Arc::new(InventoryService::new(stores.inventory));
    let stock: Arc<dyn StockChecker> = inventory.clone();

    Ok(AppServices {
        orders: OrderService::new(stores.orders, stock, bus),
        products: ProductService::new(stores.products),
        inventory,
        realtime_tx,
    })
}

async fn postgres_stores(config: &ApiConfig) -> anyhow::Result<Stores> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required when USE_PERSISTENT_STORES=true"))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await?;
    ensure_schema(&pool).await?;
    info!("using postgres stores");

    Ok(Stores {
        inventory: Arc::new(PostgresInventoryRepository::new(pool.clone())),
        orders: Arc::new(PostgresOrderRepository::new(pool.clone())),
        products: Arc::new(PostgresProductRepository::new(pool)),
    })
}

/// Background subscriber: bus -> notification log + SSE fan-out.
///
/// Runs on its own thread since `Subscription::recv` blocks. The loop ends
/// when the bus is dropped.
fn spawn_notification_listener(
    bus: &Bus,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
) -> std::io::Result<()> {
    let sub = bus.subscribe();
    std::thread::Builder::new()
        .name("order-notifications".to_string())
        .spawn(move || {
            while let Ok(env) = sub.recv() {
                let order_number = env
                    .payload()
                    .get("orderNumber")
                    .and_then(JsonValue::as_str)
                    .unwrap_or_default()
                    .to_string();
                info!(
                    event_type = env.event_type(),
                    %order_number,
                    "received notification for order"
                );

                // Lossy: no receivers is not an error.
                let _ = realtime_tx.send(RealtimeMessage {
                    topic: env.event_type().to_string(),
                    payload: env.payload().clone(),
                });
            }
            warn!("event bus closed; notification listener stopping");
        })?;
    Ok(())
}

pub fn order_sse_stream(
    services: Arc<AppServices>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.realtime_tx().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(m) => {
            let data = serde_json::to_string(&m.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(m.topic).data(data)))
        }
        // Lagged receivers skip what they missed.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
