//! High-level client API
//!
//! `OpcUaClient` wraps the channel engine with typed operations: reads,
//! writes, browsing and subscriptions. One event stream carries data
//! changes and lifecycle notifications to the consumer. A supervisor task
//! forwards engine events and, when reconnection is enabled, restarts the
//! connection from Hello after a transport loss.

use crate::channel::Channel;
use crate::config::ClientConfig;
use crate::events::ClientEvent;
use crate::publish::run_publish_loop;
use crate::state::ConnectionState;
use opcua_application::attribute::{ReadRequest, ReadValueId, TimestampsToReturn, WriteRequest, WriteValue};
use opcua_application::message::ServiceResponse;
use opcua_application::subscription::{
    CreateMonitoredItemsRequest, CreateSubscriptionRequest, DeleteSubscriptionsRequest,
    MonitoredItemCreateRequest,
};
use opcua_application::types::DataValue;
use opcua_application::view::{BrowseDescription, BrowseRequest, BrowseResult};
use opcua_core::{NodeId, OpcUaError, OpcUaResult, StatusCode};
use opcua_transport::Transport;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Depth of the event channel between the engine and the consumer
const EVENT_CHANNEL_DEPTH: usize = 256;

/// State shared between the client handle and the supervisor task
struct ClientInner {
    config: ClientConfig,
    transport: tokio::sync::Mutex<Box<dyn Transport>>,
    channel: RwLock<Channel>,
    /// Consumer-facing event sender; publish loops feed it directly
    events_tx: mpsc::Sender<ClientEvent>,
    /// Sender handed to the channel engine; the supervisor drains the
    /// other end
    engine_tx: mpsc::Sender<ClientEvent>,
    /// Cancellation handles of running publish loops, by subscription id
    publish_loops: Mutex<HashMap<u32, watch::Sender<bool>>>,
    /// Server certificate from the last handshake, fed back on reconnect
    server_certificate: Mutex<Option<Vec<u8>>>,
    next_client_handle: AtomicU32,
}

impl ClientInner {
    fn stop_publish_loops(&self) {
        if let Ok(mut loops) = self.publish_loops.lock() {
            for (_, cancel) in loops.drain() {
                let _ = cancel.send(true);
            }
        }
    }

    /// Dial again with fresh identifiers; prior subscriptions are gone
    async fn restore(&self) -> OpcUaResult<()> {
        self.stop_publish_loops();
        let known = self
            .server_certificate
            .lock()
            .ok()
            .and_then(|slot| slot.clone());
        let mut transport = self.transport.lock().await;
        let channel = Channel::establish(
            transport.as_mut(),
            &self.config,
            self.engine_tx.clone(),
            known,
        )
        .await?;
        if let Ok(mut slot) = self.server_certificate.lock() {
            *slot = channel.server_certificate();
        }
        if let Ok(mut slot) = self.channel.write() {
            *slot = channel;
        }
        Ok(())
    }
}

/// OPC UA TCP binary client
pub struct OpcUaClient {
    inner: Arc<ClientInner>,
    events_rx: Mutex<Option<mpsc::Receiver<ClientEvent>>>,
}

impl OpcUaClient {
    /// Connect and run the handshake; returns an active client
    pub async fn connect(
        config: ClientConfig,
        mut transport: Box<dyn Transport>,
    ) -> OpcUaResult<Self> {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_DEPTH);
        let (engine_tx, engine_rx) = mpsc::channel(EVENT_CHANNEL_DEPTH);
        let channel =
            Channel::establish(transport.as_mut(), &config, engine_tx.clone(), None).await?;
        let server_certificate = channel.server_certificate();
        let inner = Arc::new(ClientInner {
            config,
            transport: tokio::sync::Mutex::new(transport),
            channel: RwLock::new(channel),
            events_tx,
            engine_tx,
            publish_loops: Mutex::new(HashMap::new()),
            server_certificate: Mutex::new(server_certificate),
            next_client_handle: AtomicU32::new(1),
        });
        tokio::spawn(run_supervisor(Arc::downgrade(&inner), engine_rx));
        Ok(Self {
            inner,
            events_rx: Mutex::new(Some(events_rx)),
        })
    }

    /// Connect, retrying fatal failures with the configured delay
    ///
    /// Takes a factory because each attempt needs a fresh transport.
    pub async fn connect_with_retry<F>(
        config: ClientConfig,
        make_transport: F,
        max_attempts: u32,
    ) -> OpcUaResult<Self>
    where
        F: Fn() -> Box<dyn Transport>,
    {
        let delay = config.reconnect_delay;
        let mut attempt = 1;
        loop {
            match Self::connect(config.clone(), make_transport()).await {
                Ok(client) => return Ok(client),
                Err(e) if attempt < max_attempts && e.is_fatal() => {
                    log::warn!(
                        "Connect attempt {}/{} failed: {}, retrying in {:?}",
                        attempt,
                        max_attempts,
                        e,
                        delay
                    );
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Take the event stream; only the first caller gets it
    pub fn subscribe(&self) -> Option<mpsc::Receiver<ClientEvent>> {
        self.events_rx.lock().ok().and_then(|mut slot| slot.take())
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.inner
            .channel
            .read()
            .map(|channel| channel.state())
            .unwrap_or(ConnectionState::Disconnected)
    }

    fn channel(&self) -> OpcUaResult<Channel> {
        self.inner
            .channel
            .read()
            .map(|channel| channel.clone())
            .map_err(|_| OpcUaError::Protocol("Client state poisoned".to_string()))
    }

    /// Drop the session and dial again; existing subscriptions are gone
    /// and must be recreated by the consumer
    ///
    /// With `ClientConfig::reconnect` set the supervisor does this on its
    /// own after a lost connection.
    pub async fn reconnect(&self) -> OpcUaResult<()> {
        self.inner.restore().await
    }

    /// Read the Value attribute of the given nodes
    pub async fn read(&self, node_ids: Vec<NodeId>) -> OpcUaResult<Vec<DataValue>> {
        let channel = self.channel()?;
        channel.state().require_active()?;
        let request_id = channel.next_request_id();
        let request = ReadRequest {
            header: channel.request_header(request_id),
            max_age: 0.0,
            timestamps_to_return: TimestampsToReturn::Both,
            nodes_to_read: node_ids.into_iter().map(ReadValueId::value_of).collect(),
        };
        match channel.call(request_id, &request).await?.into_good()? {
            ServiceResponse::Read(response) => Ok(response.results),
            other => Err(unexpected("Read", &other)),
        }
    }

    /// Read a single node's Value attribute
    pub async fn read_value(&self, node_id: NodeId) -> OpcUaResult<DataValue> {
        let mut results = self.read(vec![node_id]).await?;
        results
            .pop()
            .ok_or_else(|| OpcUaError::Protocol("Read returned no results".to_string()))
    }

    /// Write attribute values; returns per-write status codes in order
    pub async fn write(&self, nodes_to_write: Vec<WriteValue>) -> OpcUaResult<Vec<StatusCode>> {
        let channel = self.channel()?;
        channel.state().require_active()?;
        let request_id = channel.next_request_id();
        let request = WriteRequest {
            header: channel.request_header(request_id),
            nodes_to_write,
        };
        match channel.call(request_id, &request).await?.into_good()? {
            ServiceResponse::Write(response) => Ok(response.results),
            other => Err(unexpected("Write", &other)),
        }
    }

    /// Browse references of the given nodes
    pub async fn browse(
        &self,
        nodes_to_browse: Vec<BrowseDescription>,
    ) -> OpcUaResult<Vec<BrowseResult>> {
        let channel = self.channel()?;
        channel.state().require_active()?;
        let request_id = channel.next_request_id();
        let request = BrowseRequest::new(channel.request_header(request_id), nodes_to_browse);
        match channel.call(request_id, &request).await?.into_good()? {
            ServiceResponse::Browse(response) => Ok(response.results),
            other => Err(unexpected("Browse", &other)),
        }
    }

    /// Create a subscription monitoring the Value attribute of `node_ids`
    ///
    /// Data changes arrive as `ClientEvent::DataChange` on the event
    /// stream; the returned id identifies the subscription in those events
    /// and in `delete_subscriptions`.
    pub async fn create_subscription(
        &self,
        publishing_interval: Duration,
        node_ids: Vec<NodeId>,
    ) -> OpcUaResult<u32> {
        let channel = self.channel()?;
        channel.state().require_active()?;

        let request_id = channel.next_request_id();
        let request = CreateSubscriptionRequest::new(
            channel.request_header(request_id),
            publishing_interval.as_secs_f64() * 1_000.0,
        );
        let created = match channel.call(request_id, &request).await?.into_good()? {
            ServiceResponse::CreateSubscription(response) => response,
            other => return Err(unexpected("CreateSubscription", &other)),
        };
        let subscription_id = created.subscription_id;
        let revised_interval =
            Duration::from_secs_f64(created.revised_publishing_interval.max(0.0) / 1_000.0);

        let statuses = self
            .add_monitored_items(&channel, subscription_id, node_ids)
            .await?;
        for status in &statuses {
            if status.is_bad() {
                log::warn!("Monitored item rejected: {:?}", status);
            }
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        tokio::spawn(run_publish_loop(
            channel,
            subscription_id,
            revised_interval,
            self.inner.config.publish_backoff_step,
            self.inner.events_tx.clone(),
            cancel_rx,
        ));
        if let Ok(mut loops) = self.inner.publish_loops.lock() {
            loops.insert(subscription_id, cancel_tx);
        }
        log::info!(
            "Subscription {} created at {:?}",
            subscription_id,
            revised_interval
        );
        Ok(subscription_id)
    }

    /// Monitor the Value attribute of more nodes under an existing
    /// subscription; returns the per-item creation status codes
    pub async fn create_monitored_items(
        &self,
        subscription_id: u32,
        node_ids: Vec<NodeId>,
    ) -> OpcUaResult<Vec<StatusCode>> {
        let channel = self.channel()?;
        channel.state().require_active()?;
        self.add_monitored_items(&channel, subscription_id, node_ids)
            .await
    }

    async fn add_monitored_items(
        &self,
        channel: &Channel,
        subscription_id: u32,
        node_ids: Vec<NodeId>,
    ) -> OpcUaResult<Vec<StatusCode>> {
        let items = node_ids
            .into_iter()
            .map(|node_id| {
                let handle = self.inner.next_client_handle.fetch_add(1, Ordering::Relaxed);
                MonitoredItemCreateRequest::reporting(ReadValueId::value_of(node_id), handle)
            })
            .collect();
        let request_id = channel.next_request_id();
        let request = CreateMonitoredItemsRequest {
            header: channel.request_header(request_id),
            subscription_id,
            timestamps_to_return: TimestampsToReturn::Both,
            items_to_create: items,
        };
        match channel.call(request_id, &request).await?.into_good()? {
            ServiceResponse::CreateMonitoredItems(response) => {
                Ok(response.results.iter().map(|result| result.status).collect())
            }
            other => Err(unexpected("CreateMonitoredItems", &other)),
        }
    }

    /// Stop the publish loops and delete the subscriptions on the server
    pub async fn delete_subscriptions(&self, subscription_ids: Vec<u32>) -> OpcUaResult<()> {
        if let Ok(mut loops) = self.inner.publish_loops.lock() {
            for subscription_id in &subscription_ids {
                if let Some(cancel) = loops.remove(subscription_id) {
                    let _ = cancel.send(true);
                }
            }
        }
        let channel = self.channel()?;
        channel.state().require_active()?;
        let request_id = channel.next_request_id();
        let request = DeleteSubscriptionsRequest {
            header: channel.request_header(request_id),
            subscription_ids,
        };
        channel.call(request_id, &request).await?.into_good()?;
        Ok(())
    }

    /// Close the session and the channel
    ///
    /// `delete_subscriptions` asks the server to drop the session's
    /// subscriptions along with it.
    pub async fn disconnect(&self, delete_subscriptions: bool) -> OpcUaResult<()> {
        self.inner.stop_publish_loops();
        self.channel()?.close(delete_subscriptions).await
    }
}

fn unexpected(operation: &str, response: &ServiceResponse) -> OpcUaError {
    OpcUaError::Protocol(format!(
        "Expected a {} response, got handle {}",
        operation,
        response.request_handle()
    ))
}

/// Forward engine events to the consumer; after a connection loss with
/// reconnection enabled, delay and restart from Hello until a handshake
/// succeeds or the client is dropped
async fn run_supervisor(inner: Weak<ClientInner>, mut engine_rx: mpsc::Receiver<ClientEvent>) {
    while let Some(event) = engine_rx.recv().await {
        let lost = event == ClientEvent::ConnectionLost;
        {
            let strong = match inner.upgrade() {
                Some(strong) => strong,
                None => return,
            };
            let _ = strong.events_tx.send(event).await;
            if !lost || !strong.config.reconnect {
                continue;
            }
            strong.stop_publish_loops();
        }
        loop {
            let delay = match inner.upgrade() {
                Some(strong) => strong.config.reconnect_delay,
                None => return,
            };
            tokio::time::sleep(delay).await;
            let strong = match inner.upgrade() {
                Some(strong) => strong,
                None => return,
            };
            match strong.restore().await {
                Ok(()) => break,
                Err(e) => {
                    log::warn!("Reconnect failed: {}, retrying in {:?}", e, delay);
                    let _ = strong
                        .events_tx
                        .send(ClientEvent::Error {
                            message: e.to_string(),
                        })
                        .await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use opcua_application::discovery::{GetEndpointsRequest, GetEndpointsResponse};
    use opcua_application::message::{encode_message, MessageBody};
    use opcua_application::secure_channel::{
        AsymmetricSecurityHeader, OpenSecureChannelRequest, OpenSecureChannelResponse,
    };
    use opcua_application::session::{
        ActivateSessionRequest, ActivateSessionResponse, CloseSessionRequest,
        CloseSessionResponse, CreateSessionRequest, CreateSessionResponse,
    };
    use opcua_application::transport::{Acknowledge, Hello};
    use opcua_application::type_ids::{self, decode_type_id};
    use opcua_application::types::{
        ApplicationDescription, EndpointDescription, SignatureData, UserTokenPolicy, Variant,
    };
    use opcua_application::attribute::ReadResponse;
    use opcua_application::ResponseHeader;
    use opcua_codec::{BinaryDecoder, BinaryEncoder};
    use opcua_security::MessageSecurityMode;
    use opcua_session::{ChunkAssembler, ChunkKind, Frame, MessageKind, SequenceHeader};
    use opcua_transport::{TransportReader, TransportWriter};
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

    struct DuplexTransport {
        stream: Option<DuplexStream>,
    }

    impl DuplexTransport {
        fn new(stream: DuplexStream) -> Self {
            Self {
                stream: Some(stream),
            }
        }
    }

    #[async_trait]
    impl Transport for DuplexTransport {
        async fn connect(&mut self) -> OpcUaResult<(TransportReader, TransportWriter)> {
            let stream = self
                .stream
                .take()
                .ok_or_else(|| OpcUaError::Protocol("Transport already used".to_string()))?;
            let (reader, writer) = tokio::io::split(stream);
            Ok((Box::new(reader), Box::new(writer)))
        }
    }

    fn test_endpoint() -> EndpointDescription {
        EndpointDescription {
            endpoint_url: Some("opc.tcp://scripted:4840".into()),
            server: ApplicationDescription::client("urn:scripted", "scripted"),
            server_certificate: None,
            security_mode: MessageSecurityMode::None,
            security_policy_uri: Some(
                "http://opcfoundation.org/UA/SecurityPolicy#None".into(),
            ),
            user_identity_tokens: vec![UserTokenPolicy::anonymous("anon")],
            transport_profile_uri: None,
            security_level: 0,
        }
    }

    fn msg_frame(sequence: SequenceHeader, message: Vec<u8>) -> Vec<u8> {
        let mut enc = BinaryEncoder::new();
        sequence.encode(&mut enc);
        enc.encode_bytes(&message);
        Frame::new(MessageKind::Message, ChunkKind::Final, enc.into_bytes()).encode()
    }

    fn service_reply(body: &[u8]) -> Option<Vec<u8>> {
        let mut dec = BinaryDecoder::new(body);
        let sequence = SequenceHeader::decode(&mut dec).ok()?;
        let rest = dec.decode_remaining();
        let mut mdec = BinaryDecoder::new(rest);
        let type_id = decode_type_id(&mut mdec).ok()?;
        let message = match type_id {
            type_ids::GET_ENDPOINTS_REQUEST => {
                let request = GetEndpointsRequest::decode_body(&mut mdec).ok()?;
                encode_message(&GetEndpointsResponse {
                    header: ResponseHeader::good(request.header.request_handle),
                    endpoints: vec![test_endpoint()],
                })
            }
            type_ids::CREATE_SESSION_REQUEST => {
                let request = CreateSessionRequest::decode_body(&mut mdec).ok()?;
                encode_message(&CreateSessionResponse {
                    header: ResponseHeader::good(request.header.request_handle),
                    session_id: NodeId::numeric(7_000),
                    authentication_token: NodeId::Opaque {
                        namespace: 0,
                        id: vec![0xDE, 0xAD, 0xBE, 0xEF],
                    },
                    revised_session_timeout: 60_000.0,
                    server_nonce: Some(vec![1u8; 32]),
                    server_certificate: None,
                    server_endpoints: vec![test_endpoint()],
                    server_software_certificates: Vec::new(),
                    server_signature: SignatureData::default(),
                    max_request_message_size: 0,
                })
            }
            type_ids::ACTIVATE_SESSION_REQUEST => {
                let request = ActivateSessionRequest::decode_body(&mut mdec).ok()?;
                encode_message(&ActivateSessionResponse {
                    header: ResponseHeader::good(request.header.request_handle),
                    server_nonce: Some(vec![2u8; 32]),
                    results: Vec::new(),
                    diagnostic_infos: Vec::new(),
                })
            }
            type_ids::READ_REQUEST => {
                let request = ReadRequest::decode_body(&mut mdec).ok()?;
                let results = request
                    .nodes_to_read
                    .iter()
                    .map(|_| DataValue::from_value(Variant::Int32(42)))
                    .collect();
                encode_message(&ReadResponse {
                    header: ResponseHeader::good(request.header.request_handle),
                    results,
                    diagnostic_infos: Vec::new(),
                })
            }
            type_ids::CLOSE_SESSION_REQUEST => {
                let request = CloseSessionRequest::decode_body(&mut mdec).ok()?;
                encode_message(&CloseSessionResponse {
                    header: ResponseHeader::good(request.header.request_handle),
                })
            }
            _ => return None,
        };
        Some(msg_frame(sequence, message))
    }

    async fn run_scripted_server(stream: DuplexStream) {
        let (mut reader, mut writer) = tokio::io::split(stream);
        let mut assembler = ChunkAssembler::new();
        let mut buf = [0u8; 8_192];
        loop {
            let n = match reader.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            assembler.extend(&buf[..n]);
            while let Ok(Some(frame)) = assembler.next_frame() {
                let reply = match frame.message() {
                    MessageKind::Hello => {
                        let mut dec = BinaryDecoder::new(frame.body());
                        let hello = match Hello::decode(&mut dec) {
                            Ok(hello) => hello,
                            Err(_) => return,
                        };
                        let ack = Acknowledge {
                            protocol_version: 0,
                            receive_buffer_size: hello.receive_buffer_size,
                            send_buffer_size: hello.send_buffer_size,
                            max_message_size: hello.max_message_size,
                            max_chunk_count: hello.max_chunk_count,
                        };
                        let mut enc = BinaryEncoder::new();
                        ack.encode(&mut enc);
                        Some(
                            Frame::new(
                                MessageKind::Acknowledge,
                                ChunkKind::Final,
                                enc.into_bytes(),
                            )
                            .encode(),
                        )
                    }
                    MessageKind::OpenChannel => {
                        let body = frame.into_body();
                        let mut dec = BinaryDecoder::new(&body);
                        let security = match AsymmetricSecurityHeader::decode(&mut dec) {
                            Ok(security) => security,
                            Err(_) => return,
                        };
                        let sequence = match SequenceHeader::decode(&mut dec) {
                            Ok(sequence) => sequence,
                            Err(_) => return,
                        };
                        let rest = dec.decode_remaining();
                        let mut mdec = BinaryDecoder::new(rest);
                        let _ = decode_type_id(&mut mdec);
                        let request = match OpenSecureChannelRequest::decode_body(&mut mdec) {
                            Ok(request) => request,
                            Err(_) => return,
                        };
                        let response = OpenSecureChannelResponse::granting(
                            request.header.request_handle,
                            42,
                            9,
                        );
                        let mut enc = BinaryEncoder::new();
                        security.encode(&mut enc);
                        sequence.encode(&mut enc);
                        enc.encode_bytes(&encode_message(&response));
                        Some(
                            Frame::new(
                                MessageKind::OpenChannel,
                                ChunkKind::Final,
                                enc.into_bytes(),
                            )
                            .encode(),
                        )
                    }
                    MessageKind::Message => service_reply(frame.body()),
                    MessageKind::CloseChannel => return,
                    _ => None,
                };
                if let Some(bytes) = reply {
                    if writer.write_all(&bytes).await.is_err() {
                        return;
                    }
                    let _ = writer.flush().await;
                }
            }
        }
    }

    async fn connected_client() -> OpcUaClient {
        let (client_stream, server_stream) = tokio::io::duplex(16_384);
        tokio::spawn(run_scripted_server(server_stream));
        OpcUaClient::connect(
            ClientConfig::new("opc.tcp://scripted:4840"),
            Box::new(DuplexTransport::new(client_stream)),
        )
        .await
        .expect("handshake against scripted server")
    }

    #[tokio::test]
    async fn test_handshake_reaches_active() {
        let client = connected_client().await;
        assert!(client.state().is_active());

        let mut events = client.subscribe().expect("event stream");
        assert_eq!(events.recv().await, Some(ClientEvent::Activated));
    }

    #[tokio::test]
    async fn test_read_over_scripted_connection() {
        let client = connected_client().await;
        let value = client.read_value(NodeId::numeric(2_258)).await.unwrap();
        assert_eq!(value.value, Some(Variant::Int32(42)));
    }

    #[tokio::test]
    async fn test_disconnect_closes_session() {
        let client = connected_client().await;
        client.disconnect(true).await.unwrap();
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_event_stream_is_single_consumer() {
        let client = connected_client().await;
        assert!(client.subscribe().is_some());
        assert!(client.subscribe().is_none());
    }

    /// Transport that dials a fresh scripted server on every connect,
    /// keeping the server task handles so a test can cut a connection
    struct RespawningTransport {
        servers: Arc<Mutex<Vec<tokio::task::JoinHandle<()>>>>,
    }

    #[async_trait]
    impl Transport for RespawningTransport {
        async fn connect(&mut self) -> OpcUaResult<(TransportReader, TransportWriter)> {
            let (client_stream, server_stream) = tokio::io::duplex(16_384);
            let handle = tokio::spawn(run_scripted_server(server_stream));
            if let Ok(mut servers) = self.servers.lock() {
                servers.push(handle);
            }
            let (reader, writer) = tokio::io::split(client_stream);
            Ok((Box::new(reader), Box::new(writer)))
        }
    }

    #[tokio::test]
    async fn test_reconnects_after_transport_loss() {
        let servers = Arc::new(Mutex::new(Vec::new()));
        let config = ClientConfig::new("opc.tcp://scripted:4840")
            .with_reconnect(Duration::from_millis(10));
        let client = OpcUaClient::connect(
            config,
            Box::new(RespawningTransport {
                servers: Arc::clone(&servers),
            }),
        )
        .await
        .unwrap();
        let mut events = client.subscribe().expect("event stream");
        assert_eq!(events.recv().await, Some(ClientEvent::Activated));

        // cut the first connection; the server's end of the pipe drops
        // with its task
        servers.lock().unwrap().remove(0).abort();

        let mut saw_error = false;
        loop {
            match events.recv().await.expect("event stream open") {
                ClientEvent::ConnectionLost => break,
                ClientEvent::Error { .. } => saw_error = true,
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert!(saw_error);

        // the supervisor restarts from Hello on its own
        assert_eq!(events.recv().await, Some(ClientEvent::Activated));
        assert!(client.state().is_active());
        let value = client.read_value(NodeId::numeric(2_258)).await.unwrap();
        assert_eq!(value.value, Some(Variant::Int32(42)));
    }

    #[tokio::test]
    async fn test_no_restart_without_reconnect_flag() {
        let servers = Arc::new(Mutex::new(Vec::new()));
        let client = OpcUaClient::connect(
            ClientConfig::new("opc.tcp://scripted:4840"),
            Box::new(RespawningTransport {
                servers: Arc::clone(&servers),
            }),
        )
        .await
        .unwrap();
        let mut events = client.subscribe().expect("event stream");
        assert_eq!(events.recv().await, Some(ClientEvent::Activated));

        servers.lock().unwrap().remove(0).abort();
        loop {
            match events.recv().await.expect("event stream open") {
                ClientEvent::ConnectionLost => break,
                ClientEvent::Error { .. } => {}
                other => panic!("unexpected event {:?}", other),
            }
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!client.state().is_active());
        assert!(client.read_value(NodeId::numeric(2_258)).await.is_err());
    }
}
