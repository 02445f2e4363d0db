//! OPC UA TCP binary client engine
//!
//! Wires the lower layers into a working client: the connection handshake
//! ladder, the request correlation table, the chunked frame pipeline and
//! the subscription publish loops.
//!
//! # Usage
//!
//! ```rust,no_run
//! use opcua_client::{ClientConfig, OpcUaClient};
//! use opcua_core::NodeId;
//! use opcua_transport::TcpTransport;
//!
//! # async fn example() -> opcua_core::OpcUaResult<()> {
//! let config = ClientConfig::new("opc.tcp://192.168.0.10:4840");
//! let transport = TcpTransport::from_address(config.socket_address());
//! let client = OpcUaClient::connect(config, Box::new(transport)).await?;
//!
//! let value = client
//!     .read_value(NodeId::String { namespace: 2, id: "Motor.Speed".into() })
//!     .await?;
//! println!("{:?}", value);
//! client.disconnect(true).await?;
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod events;
pub mod pending;
pub mod publish;
pub mod state;

pub use channel::Channel;
pub use client::OpcUaClient;
pub use config::{ClientConfig, Credentials};
pub use events::ClientEvent;
pub use state::ConnectionState;
