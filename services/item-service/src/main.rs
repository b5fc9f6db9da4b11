//! item-service - gRPC server

use std::sync::Arc;

use itemrpc_bootstrap::{build_reflection, run};
use tonic::service::Routes;
use tracing::info;

use item_service::FILE_DESCRIPTOR_SET;
use item_service::api::ItemServiceImpl;
use item_service::application::ItemHandler;
use item_service::infrastructure::persistence::InMemoryItemStore;
use item_service::proto::item_service_server::ItemServiceServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run("config", |config| {
        info!("Initializing {}...", config.app_name);

        let store = Arc::new(InMemoryItemStore::with_seed_data());
        let handler = Arc::new(ItemHandler::new(store));
        let service = ItemServiceImpl::new(handler);

        let reflection_service = build_reflection(vec![FILE_DESCRIPTOR_SET])?;

        Ok(Routes::new(ItemServiceServer::new(service)).add_service(reflection_service))
    })
    .await
}
