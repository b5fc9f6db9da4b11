//! item-client - 依次演示三种调用模式

use itemrpc_bootstrap::ClientCredentials;
use itemrpc_config::AppConfig;
use itemrpc_telemetry::init_tracing;
use tonic::Status;
use tonic::transport::Channel;
use tracing::{error, info};

use item_service::api::conversions::timestamp_from_proto;
use item_service::proto::item_service_client::ItemServiceClient;
use item_service::proto::{ClientStreamRequest, Item, ServerStreamRequest, UnaryRequest};

type Client = ItemServiceClient<Channel>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load("config")?;
    init_tracing(&config.telemetry.log_level);

    // CA 信任证书
    let mut credentials = ClientCredentials::load(&config.tls.ca_path)
        .inspect_err(|e| error!(error = %e, "Error while loading CA trust certificate"))?;
    if let Some(domain_name) = &config.tls.domain_name {
        credentials = credentials.with_domain_name(domain_name.clone());
    }

    let channel = credentials
        .connect(config.client.endpoint.clone())
        .await
        .inspect_err(|e| error!(error = %e, endpoint = %config.client.endpoint, "Could not connect"))?;
    let mut client = ItemServiceClient::new(channel);

    unary_request(&mut client).await;
    server_stream_request(&mut client).await?;
    client_stream_request(&mut client).await;

    Ok(())
}

fn item(name: &str, number: i32, price: f64, is_active: bool) -> Item {
    Item {
        name: name.to_string(),
        number,
        price,
        is_active,
        ..Default::default()
    }
}

fn report(call: &str, status: &Status) {
    error!(call, code = ?status.code(), message = status.message(), "Call failed");
}

async fn unary_request(client: &mut Client) {
    let request = UnaryRequest {
        item: Some(item("Foo", 300, 17.5, true)),
    };

    match client.unary(request).await {
        Ok(response) => info!(id = %response.into_inner().id, "Response from Unary"),
        Err(status) => report("Unary", &status),
    }
}

async fn server_stream_request(client: &mut Client) -> Result<(), Status> {
    let request = ServerStreamRequest {
        ids: vec!["1".to_string(), "3".to_string()],
    };

    let mut stream = match client.server_streaming(request).await {
        Ok(response) => response.into_inner(),
        Err(status) => {
            report("ServerStreaming", &status);
            return Ok(());
        }
    };

    // 流结束即为终止信号
    while let Some(response) = stream.message().await? {
        if let Some(item) = response.item {
            let created_at = item.created_at.as_ref().and_then(timestamp_from_proto);
            info!(
                id = %item.id,
                name = %item.name,
                number = item.number,
                price = item.price,
                is_active = item.is_active,
                created_at = ?created_at,
                "Response from ServerStreaming"
            );
        }
    }

    Ok(())
}

async fn client_stream_request(client: &mut Client) {
    let requests: Vec<ClientStreamRequest> = [
        item("Foo", 110, 3.2, false),
        item("Bar", 220, 6.4, true),
        item("Baz", 330, 9.6, false),
    ]
    .into_iter()
    .map(|item| ClientStreamRequest { item: Some(item) })
    .collect();

    match client.client_streaming(tokio_stream::iter(requests)).await {
        Ok(response) => info!(ids = ?response.into_inner().ids, "Response from ClientStreaming"),
        Err(status) => report("ClientStreaming", &status),
    }
}
