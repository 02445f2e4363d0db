//! Secure channel engine
//!
//! One `Channel` owns a connected transport split into two tasks: the
//! inbound task reassembles frames and resolves the correlation table, the
//! outbound task serializes writes so one message's chunks are never
//! interleaved with another's. The handshake ladder runs before the
//! channel is handed to callers.

use crate::config::{ClientConfig, Credentials};
use crate::endpoint::{choose_identity, select_endpoint};
use crate::events::ClientEvent;
use crate::pending::{PendingRequests, RawReply, CONNECT_REQUEST_ID};
use crate::state::ConnectionState;
use opcua_application::discovery::GetEndpointsRequest;
use opcua_application::message::{
    decode_service_response, encode_message, MessageBody, ServiceResponse,
};
use opcua_application::secure_channel::{
    AsymmetricSecurityHeader, CloseSecureChannelRequest, OpenSecureChannelRequest,
    SecurityTokenRequestType,
};
use opcua_application::session::{
    ActivateSessionRequest, CloseSessionRequest, CreateSessionRequest,
};
use opcua_application::transport::{Acknowledge, ErrorMessage, Hello, PROTOCOL_VERSION};
use opcua_application::types::{ApplicationDescription, SignatureData};
use opcua_application::RequestHeader;
use opcua_codec::{BinaryDecoder, BinaryEncoder};
use opcua_core::{NodeId, OpcUaError, OpcUaResult};
use opcua_security::{sha1_thumbprint, SecurityPolicy};
use opcua_session::{
    chunk_message, ChunkAssembler, ChunkKind, Frame, MessageKind, SequenceHeader,
};
use opcua_transport::{Transport, TransportReader, TransportWriter};
use rand::RngCore;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;

/// Mutable per-connection protocol state
struct ChannelShared {
    state: ConnectionState,
    secure_channel_id: u32,
    token_id: u32,
    sequence_number: u32,
    authentication_token: NodeId,
    max_frame_size: usize,
    server_certificate: Option<Vec<u8>>,
}

/// An established client connection
///
/// Cloning is cheap; clones share the correlation table, the outbound
/// writer and the protocol state.
#[derive(Clone)]
pub struct Channel {
    pending: Arc<PendingRequests>,
    outbound: mpsc::Sender<Vec<u8>>,
    shared: Arc<Mutex<ChannelShared>>,
    request_timeout: Duration,
}

impl Channel {
    /// Connect the transport and run the handshake ladder to `Active`
    ///
    /// `known_server_certificate` is the server certificate from an
    /// earlier connection, if any; with certificate credentials it lets
    /// the open round carry our certificate and the server's thumbprint.
    pub async fn establish(
        transport: &mut dyn Transport,
        config: &ClientConfig,
        events: mpsc::Sender<ClientEvent>,
        known_server_certificate: Option<Vec<u8>>,
    ) -> OpcUaResult<Self> {
        let (reader, writer) = transport.connect().await?;

        let pending = Arc::new(PendingRequests::new());
        let shared = Arc::new(Mutex::new(ChannelShared {
            state: ConnectionState::Disconnected,
            secure_channel_id: 0,
            token_id: 0,
            sequence_number: 1,
            authentication_token: NodeId::null(),
            max_frame_size: 8_192,
            server_certificate: known_server_certificate,
        }));

        let (outbound, outbound_rx) = mpsc::channel::<Vec<u8>>(64);
        tokio::spawn(run_writer(writer, outbound_rx));
        tokio::spawn(run_reader(
            reader,
            Arc::clone(&pending),
            Arc::clone(&shared),
            events.clone(),
        ));

        let channel = Self {
            pending,
            outbound,
            shared,
            request_timeout: config.request_timeout,
        };
        channel.handshake(config).await?;
        let _ = events.send(ClientEvent::Activated).await;
        Ok(channel)
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.shared
            .lock()
            .map(|shared| shared.state)
            .unwrap_or(ConnectionState::Disconnected)
    }

    fn advance(&self) {
        if let Ok(mut shared) = self.shared.lock() {
            let next = shared.state.next();
            log::debug!("Connection state {} -> {}", shared.state, next);
            shared.state = next;
        }
    }

    fn drop_to_disconnected(&self) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.state = ConnectionState::Disconnected;
        }
    }

    /// Request header carrying the session token; the request id doubles
    /// as the request handle
    pub fn request_header(&self, request_id: u32) -> RequestHeader {
        let token = self
            .shared
            .lock()
            .map(|shared| shared.authentication_token.clone())
            .unwrap_or_else(|_| NodeId::null());
        RequestHeader::new(token, request_id)
    }

    /// Allocate the next request id
    pub fn next_request_id(&self) -> u32 {
        self.pending.next_id()
    }

    /// Server certificate learned during the handshake, if any
    pub fn server_certificate(&self) -> Option<Vec<u8>> {
        self.shared
            .lock()
            .ok()
            .and_then(|shared| shared.server_certificate.clone())
    }

    /// Security header for the open round
    ///
    /// With certificate credentials and a known server certificate the
    /// header carries our certificate and the server's thumbprint;
    /// otherwise the round runs unsecured and escalates once the server
    /// certificate is learned.
    fn open_security_header(&self, config: &ClientConfig) -> AsymmetricSecurityHeader {
        let known = self
            .shared
            .lock()
            .ok()
            .and_then(|shared| shared.server_certificate.clone());
        match (&config.credentials, known) {
            (Credentials::Certificate { certificate }, Some(server)) => {
                AsymmetricSecurityHeader::secured(
                    SecurityPolicy::Basic256Sha256,
                    certificate.clone(),
                    sha1_thumbprint(&server),
                )
            }
            _ => AsymmetricSecurityHeader::unsecured(),
        }
    }

    /// Issue a service request over the established channel
    pub async fn call<T: MessageBody>(
        &self,
        request_id: u32,
        request: &T,
    ) -> OpcUaResult<ServiceResponse> {
        let raw = self
            .exchange(MessageKind::Message, request_id, encode_message(request))
            .await?;
        decode_service_response(&raw)
    }

    /// Issue a request and fail unless the service result is Good
    pub async fn call_good<T: MessageBody>(&self, request: &T) -> OpcUaResult<ServiceResponse> {
        let request_id = self.next_request_id();
        self.call(request_id, request).await?.into_good()
    }

    async fn exchange(
        &self,
        kind: MessageKind,
        request_id: u32,
        message: Vec<u8>,
    ) -> OpcUaResult<RawReply> {
        let frames = self.frame_message(kind, request_id, message, None)?;
        let receiver = self.pending.register(request_id);
        for frame in frames {
            self.send_frame(frame).await?;
        }
        self.await_reply(request_id, receiver).await
    }

    async fn await_reply(
        &self,
        request_id: u32,
        receiver: tokio::sync::oneshot::Receiver<OpcUaResult<RawReply>>,
    ) -> OpcUaResult<RawReply> {
        match tokio::time::timeout(self.request_timeout, receiver).await {
            Ok(Ok(reply)) => reply,
            // the inbound task dropped the sender with the connection
            Ok(Err(_)) => Err(OpcUaError::Protocol("Connection closed".to_string())),
            Err(_) => {
                self.pending.forget(request_id);
                Err(OpcUaError::Timeout)
            }
        }
    }

    /// Build the wire frames for one logical message
    ///
    /// `prefix` is prepended before the sequence header; OPN frames use it
    /// for the asymmetric security header.
    fn frame_message(
        &self,
        kind: MessageKind,
        request_id: u32,
        message: Vec<u8>,
        prefix: Option<&AsymmetricSecurityHeader>,
    ) -> OpcUaResult<Vec<Frame>> {
        let (sequence_header, max_frame_size) = {
            let mut shared = self
                .shared
                .lock()
                .map_err(|_| OpcUaError::Protocol("Channel state poisoned".to_string()))?;
            let sequence_number = shared.sequence_number;
            shared.sequence_number = shared.sequence_number.wrapping_add(1);
            (
                SequenceHeader::new(
                    shared.secure_channel_id,
                    shared.token_id,
                    sequence_number,
                    request_id,
                ),
                shared.max_frame_size,
            )
        };

        let mut encoder = BinaryEncoder::new();
        sequence_header.encode(&mut encoder);
        encoder.encode_bytes(&message);
        let body = encoder.into_bytes();

        let frames = match prefix {
            // an OPN message is never chunked; it precedes size negotiation
            Some(header) => {
                let mut framed = BinaryEncoder::new();
                header.encode(&mut framed);
                framed.encode_bytes(&body);
                vec![Frame::new(kind, ChunkKind::Final, framed.into_bytes())]
            }
            None => chunk_message(kind, &body, max_frame_size)?,
        };
        Ok(frames)
    }

    async fn send_frame(&self, frame: Frame) -> OpcUaResult<()> {
        self.outbound
            .send(frame.encode())
            .await
            .map_err(|_| OpcUaError::Protocol("Connection closed".to_string()))
    }

    async fn handshake(&self, config: &ClientConfig) -> OpcUaResult<()> {
        // Hello / Acknowledge
        self.advance();
        let hello = Hello {
            protocol_version: PROTOCOL_VERSION,
            receive_buffer_size: config.receive_buffer_size,
            send_buffer_size: config.receive_buffer_size,
            max_message_size: config.max_message_size,
            max_chunk_count: config.max_chunk_count,
            endpoint_url: Some(config.endpoint_url.clone()),
        };
        let mut encoder = BinaryEncoder::new();
        hello.encode(&mut encoder);
        let receiver = self.pending.register(CONNECT_REQUEST_ID);
        self.send_frame(Frame::new(
            MessageKind::Hello,
            ChunkKind::Final,
            encoder.into_bytes(),
        ))
        .await?;
        let raw = self.await_reply(CONNECT_REQUEST_ID, receiver).await?;
        let acknowledge = Acknowledge::decode(&mut BinaryDecoder::new(&raw))?;
        log::info!(
            "Server acknowledged: receive buffer {}, send buffer {}",
            acknowledge.receive_buffer_size,
            acknowledge.send_buffer_size
        );
        if let Ok(mut shared) = self.shared.lock() {
            shared.max_frame_size = acknowledge.negotiated_chunk_size();
        }

        // OpenSecureChannel
        self.advance();
        let request_id = self.next_request_id();
        let mut client_nonce = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut client_nonce);
        let open = OpenSecureChannelRequest {
            header: self.request_header(request_id),
            client_protocol_version: 0,
            request_type: SecurityTokenRequestType::Issue,
            security_mode: config.security_mode,
            client_nonce: Some(client_nonce),
            requested_lifetime: config.channel_lifetime_ms,
        };
        let security = self.open_security_header(config);
        let frames = self.frame_message(
            MessageKind::OpenChannel,
            request_id,
            encode_message(&open),
            Some(&security),
        )?;
        let receiver = self.pending.register(request_id);
        for frame in frames {
            self.send_frame(frame).await?;
        }
        let raw = self.await_reply(request_id, receiver).await?;
        let opened = match decode_service_response(&raw)?.into_good()? {
            ServiceResponse::OpenSecureChannel(response) => response,
            other => {
                return Err(OpcUaError::Protocol(format!(
                    "Expected an OpenSecureChannel response, got handle {}",
                    other.request_handle()
                )))
            }
        };
        log::info!(
            "Secure channel {} opened, token {}",
            opened.token.channel_id,
            opened.token.token_id
        );
        if let Ok(mut shared) = self.shared.lock() {
            shared.secure_channel_id = opened.token.channel_id;
            shared.token_id = opened.token.token_id;
        }

        // GetEndpoints
        self.advance();
        let request_id = self.next_request_id();
        let get_endpoints = GetEndpointsRequest::new(
            self.request_header(request_id),
            &config.endpoint_url,
        );
        let endpoints = match self.call(request_id, &get_endpoints).await?.into_good()? {
            ServiceResponse::GetEndpoints(response) => response.endpoints,
            other => {
                return Err(OpcUaError::Protocol(format!(
                    "Expected a GetEndpoints response, got handle {}",
                    other.request_handle()
                )))
            }
        };
        let endpoint = select_endpoint(&endpoints, config.security_mode)?.clone();
        let identity = choose_identity(&endpoint, &config.credentials)?;
        if let Some(certificate) = &endpoint.server_certificate {
            if let Ok(mut shared) = self.shared.lock() {
                shared.server_certificate = Some(certificate.clone());
            }
        }
        log::info!(
            "Selected endpoint {} ({})",
            endpoint.endpoint_url.as_deref().unwrap_or("<no url>"),
            endpoint.security_mode
        );

        // CreateSession
        self.advance();
        let request_id = self.next_request_id();
        let mut session_nonce = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut session_nonce);
        let create = CreateSessionRequest {
            header: self.request_header(request_id),
            client_description: ApplicationDescription::client(
                &config.application_uri,
                &config.application_name,
            ),
            server_uri: None,
            endpoint_url: Some(config.endpoint_url.clone()),
            session_name: Some(config.session_name.clone()),
            client_nonce: Some(session_nonce),
            client_certificate: match &config.credentials {
                Credentials::Certificate { certificate } => Some(certificate.clone()),
                _ => None,
            },
            requested_session_timeout: config.session_timeout_ms,
            max_response_message_size: 0,
        };
        let created = match self.call(request_id, &create).await?.into_good()? {
            ServiceResponse::CreateSession(response) => response,
            other => {
                return Err(OpcUaError::Protocol(format!(
                    "Expected a CreateSession response, got handle {}",
                    other.request_handle()
                )))
            }
        };
        log::info!("Session created: {}", created.session_id);
        if let Ok(mut shared) = self.shared.lock() {
            shared.authentication_token = created.authentication_token.clone();
            if created.server_certificate.is_some() {
                shared.server_certificate = created.server_certificate.clone();
            }
        }

        // ActivateSession
        self.advance();
        let request_id = self.next_request_id();
        let activate = ActivateSessionRequest {
            header: self.request_header(request_id),
            client_signature: SignatureData::default(),
            client_software_certificates: Vec::new(),
            locale_ids: Vec::new(),
            user_identity_token: identity,
            user_token_signature: SignatureData::default(),
        };
        self.call(request_id, &activate).await?.into_good()?;
        self.advance();
        log::info!("Session activated");
        Ok(())
    }

    /// Close the session and the channel, then stop the writer
    ///
    /// `delete_subscriptions` asks the server to drop the session's
    /// subscriptions along with it.
    pub async fn close(&self, delete_subscriptions: bool) -> OpcUaResult<()> {
        if self.state().is_active() {
            let request_id = self.next_request_id();
            let close_session = CloseSessionRequest {
                header: self.request_header(request_id),
                delete_subscriptions,
            };
            if let Err(e) = self.call(request_id, &close_session).await {
                log::warn!("CloseSession failed: {}", e);
            }
        }

        // CLO is fire-and-forget, the server answers by closing the socket
        let request_id = self.next_request_id();
        let close_channel = CloseSecureChannelRequest {
            header: self.request_header(request_id),
        };
        let frames = self.frame_message(
            MessageKind::CloseChannel,
            request_id,
            encode_message(&close_channel),
            None,
        )?;
        for frame in frames {
            self.send_frame(frame).await?;
        }
        self.drop_to_disconnected();
        Ok(())
    }
}

async fn run_writer(mut writer: TransportWriter, mut outbound: mpsc::Receiver<Vec<u8>>) {
    while let Some(bytes) = outbound.recv().await {
        if let Err(e) = writer.write_all(&bytes).await {
            log::warn!("Write failed: {}", e);
            break;
        }
        if let Err(e) = writer.flush().await {
            log::warn!("Flush failed: {}", e);
            break;
        }
    }
}

async fn run_reader(
    mut reader: TransportReader,
    pending: Arc<PendingRequests>,
    shared: Arc<Mutex<ChannelShared>>,
    events: mpsc::Sender<ClientEvent>,
) {
    let mut assembler = ChunkAssembler::new();
    let mut buf = [0u8; 8_192];
    let error = loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                break OpcUaError::Protocol("Server closed the connection".to_string());
            }
            Ok(n) => {
                assembler.extend(&buf[..n]);
                match drain_frames(&mut assembler, &pending) {
                    Ok(()) => {}
                    Err(e) => break e,
                }
            }
            Err(e) => break OpcUaError::Connection(e),
        }
    };

    log::info!("Inbound task stopping: {}", error);
    if let Ok(mut shared) = shared.lock() {
        shared.state = ConnectionState::Disconnected;
    }
    pending.reject_all(&error);
    let _ = events
        .send(ClientEvent::Error {
            message: error.to_string(),
        })
        .await;
    let _ = events.send(ClientEvent::ConnectionLost).await;
}

fn drain_frames(assembler: &mut ChunkAssembler, pending: &PendingRequests) -> OpcUaResult<()> {
    while let Some(frame) = assembler.next_frame()? {
        dispatch_frame(frame, pending)?;
    }
    Ok(())
}

fn dispatch_frame(frame: Frame, pending: &PendingRequests) -> OpcUaResult<()> {
    match frame.message() {
        MessageKind::Acknowledge => {
            pending.resolve(CONNECT_REQUEST_ID, Ok(frame.into_body()));
            Ok(())
        }
        MessageKind::Error => {
            let mut decoder = BinaryDecoder::new(frame.body());
            let message = ErrorMessage::decode(&mut decoder)?;
            log::warn!(
                "Server error 0x{:08X}: {}",
                message.error,
                message.reason.as_deref().unwrap_or("")
            );
            Err(message.to_error())
        }
        MessageKind::OpenChannel => {
            let body = frame.into_body();
            let mut decoder = BinaryDecoder::new(&body);
            let _security = AsymmetricSecurityHeader::decode(&mut decoder)?;
            let sequence = SequenceHeader::decode(&mut decoder)?;
            pending.resolve(sequence.request_id, Ok(decoder.decode_remaining().to_vec()));
            Ok(())
        }
        MessageKind::Message => {
            let body = frame.into_body();
            let mut decoder = BinaryDecoder::new(&body);
            let sequence = SequenceHeader::decode(&mut decoder)?;
            pending.resolve(sequence.request_id, Ok(decoder.decode_remaining().to_vec()));
            Ok(())
        }
        MessageKind::Hello | MessageKind::CloseChannel => Err(OpcUaError::Protocol(format!(
            "Unexpected {:?} frame from server",
            frame.message()
        ))),
    }
}
