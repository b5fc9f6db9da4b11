//! gRPC service implementation

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use itemrpc_bootstrap::RequestTimer;
use itemrpc_errors::AppError;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};
use tracing::debug;

use crate::application::ItemHandler;
use crate::domain::value_objects::ItemId;
use crate::proto::item_service_server::ItemService;
use crate::proto::{
    ClientStreamRequest, ClientStreamResponse, ServerStreamRequest, ServerStreamResponse,
    UnaryRequest, UnaryResponse,
};

use super::conversions::{item_from_proto, item_to_proto};

const SERVICE_NAME: &str = "item.v1.ItemService";

/// 服务端流的发送缓冲，满了之后查找任务等待传输层消费
const STREAM_BUFFER: usize = 16;

pub struct ItemServiceImpl {
    handler: Arc<ItemHandler>,
}

impl ItemServiceImpl {
    pub fn new(handler: Arc<ItemHandler>) -> Self {
        Self { handler }
    }

    /// 客户端流的处理主体，对任何帧流都适用
    pub async fn collect_items<S>(&self, frames: S) -> Result<Response<ClientStreamResponse>, Status>
    where
        S: Stream<Item = Result<ClientStreamRequest, Status>> + Send,
    {
        let items = frames.map(|frame| {
            frame.map(|req| item_from_proto(req.item)).map_err(|status| {
                AppError::internal(format!(
                    "Error while reading client stream: {}",
                    status.message()
                ))
            })
        });

        let ids = self.handler.ingest_items(items).await?;

        Ok(Response::new(ClientStreamResponse {
            ids: ids.into_iter().map(ItemId::into_inner).collect(),
        }))
    }
}

#[tonic::async_trait]
impl ItemService for ItemServiceImpl {
    async fn unary(
        &self,
        request: Request<UnaryRequest>,
    ) -> Result<Response<UnaryResponse>, Status> {
        let timer = RequestTimer::new(SERVICE_NAME, "Unary");
        let item = item_from_proto(request.into_inner().item);

        let result = self
            .handler
            .create_item(item)
            .await
            .map(|id| {
                Response::new(UnaryResponse {
                    id: id.into_inner(),
                })
            })
            .map_err(Status::from);

        timer.finish_with(&result);
        result
    }

    type ServerStreamingStream =
        Pin<Box<dyn Stream<Item = Result<ServerStreamResponse, Status>> + Send>>;

    async fn server_streaming(
        &self,
        request: Request<ServerStreamRequest>,
    ) -> Result<Response<Self::ServerStreamingStream>, Status> {
        let timer = RequestTimer::new(SERVICE_NAME, "ServerStreaming");
        let ids: Vec<ItemId> = request
            .into_inner()
            .ids
            .into_iter()
            .map(ItemId::from)
            .collect();
        debug!(requested = ids.len(), "Server stream started");

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let handler = self.handler.clone();
        tokio::spawn(async move {
            match handler.stream_items(ids, tx).await {
                Ok(sent) => {
                    debug!(sent, "Server stream finished");
                    timer.finish("ok");
                }
                Err(_) => timer.finish("Internal"),
            }
        });

        let stream = ReceiverStream::new(rx).map(|found| {
            found
                .map(|item| ServerStreamResponse {
                    item: Some(item_to_proto(item)),
                })
                .map_err(Status::from)
        });

        Ok(Response::new(Box::pin(stream)))
    }

    async fn client_streaming(
        &self,
        request: Request<Streaming<ClientStreamRequest>>,
    ) -> Result<Response<ClientStreamResponse>, Status> {
        let timer = RequestTimer::new(SERVICE_NAME, "ClientStreaming");
        let result = self.collect_items(request.into_inner()).await;
        timer.finish_with(&result);
        result
    }
}
