//! One `CommandHandler` per received command, and the routing table tying them to
//! command keys.

mod connection;
mod consumer;
mod metadata;
mod publisher;

use crate::adapters::protocol::dto::Command;
use crate::adapters::protocol::parser::{BaseParser, PrimitiveParser, StringParser};
use crate::ports::incoming::command_handler::CommandHandler;
use crate::Result;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

pub use connection::{
    CloseHandler, GenericResponseHandler, HeartbeatHandler, OpenHandler, PeerPropertiesHandler,
    SaslHandshakeHandler, TuneHandler,
};
pub use consumer::{CreditHandler, DeliverHandler, QueryOffsetHandler};
pub use metadata::{MetadataHandler, MetadataUpdateHandler};
pub use publisher::{PublishConfirmHandler, PublishErrorHandler, QueryPublisherSequenceHandler};

pub type RoutingTable = HashMap<Command, Arc<dyn CommandHandler>>;

pub fn routing_table() -> RoutingTable {
    let generic: Arc<dyn CommandHandler> = Arc::new(GenericResponseHandler);
    let mut routes: RoutingTable = HashMap::new();

    routes.insert(Command::PeerProperties, Arc::new(PeerPropertiesHandler));
    routes.insert(Command::SaslHandshake, Arc::new(SaslHandshakeHandler));
    routes.insert(Command::Tune, Arc::new(TuneHandler));
    for command in [
        Command::DeclarePublisher,
        Command::DeletePublisher,
        Command::DeleteStream,
        Command::CreateStream,
        Command::SaslAuthenticate,
        Command::Subscribe,
        Command::Unsubscribe,
    ] {
        routes.insert(command, Arc::clone(&generic));
    }
    routes.insert(Command::Open, Arc::new(OpenHandler));
    routes.insert(Command::PublishError, Arc::new(PublishErrorHandler));
    routes.insert(Command::PublishConfirm, Arc::new(PublishConfirmHandler));
    routes.insert(Command::Deliver, Arc::new(DeliverHandler));
    routes.insert(Command::QueryPublisherSequence, Arc::new(QueryPublisherSequenceHandler));
    routes.insert(Command::MetadataUpdate, Arc::new(MetadataUpdateHandler));
    routes.insert(Command::Credit, Arc::new(CreditHandler));
    routes.insert(Command::Heartbeat, Arc::new(HeartbeatHandler));
    routes.insert(Command::QueryOffset, Arc::new(QueryOffsetHandler));
    routes.insert(Command::Metadata, Arc::new(MetadataHandler));
    routes.insert(Command::Close, Arc::new(CloseHandler));

    routes
}

/// correlation id + response code, the prefix shared by most responses
fn parse_correlation(payload: &mut Bytes) -> Result<(u32, u16)> {
    let parser = BaseParser;
    let correlation_id = parser.parse_u32(payload)?;
    let response_code = parser.parse_u16(payload)?;
    Ok((correlation_id, response_code))
}

/// count×(key, value). An entry that is not valid UTF-8 is dropped; the rest still decode.
fn parse_properties(payload: &mut Bytes) -> Result<HashMap<String, String>> {
    let parser = BaseParser;
    let count = parser.parse_u32(payload)?;
    let mut properties = HashMap::new();

    for _ in 0..count {
        let key = parser.parse_u16(payload)? as usize;
        let key = parser.parse_byte_array(payload, key)?;
        let value = parser.parse_u16(payload)? as usize;
        let value = parser.parse_byte_array(payload, value)?;

        match (String::from_utf8(key.to_vec()), String::from_utf8(value.to_vec())) {
            (Ok(key), Ok(value)) => {
                properties.insert(key, value);
            }
            _ => warn!(key = %hex::encode(&key), "dropping property with invalid UTF-8"),
        }
    }

    Ok(properties)
}

fn parse_strings(payload: &mut Bytes) -> Result<Vec<String>> {
    let parser = BaseParser;
    let count = parser.parse_u32(payload)?;
    let mut items = Vec::new();
    for _ in 0..count {
        items.push(parser.parse_string(payload)?);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_command_is_routed() {
        let routes = routing_table();
        for command in Command::ALL {
            assert!(routes.contains_key(&command), "{:?} has no handler", command);
        }
    }

    #[test]
    fn test_parse_properties_drops_invalid_entry() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u32.to_be_bytes());
        for (k, v) in [(&b"bad"[..], &[0xc3, 0x28][..]), (&b"product"[..], &b"broker"[..])] {
            data.extend_from_slice(&(k.len() as u16).to_be_bytes());
            data.extend_from_slice(k);
            data.extend_from_slice(&(v.len() as u16).to_be_bytes());
            data.extend_from_slice(v);
        }
        let mut payload = Bytes::from(data);

        let properties = parse_properties(&mut payload).unwrap();

        assert_eq!(properties.len(), 1);
        assert_eq!(properties["product"], "broker");
    }
}

#[cfg(test)]
fn test_context() -> (
    crate::application::context::ConnectionContext,
    crate::adapters::outgoing::memory_writer::MemoryFrameWriter,
) {
    let writer = crate::adapters::outgoing::memory_writer::MemoryFrameWriter::new();
    let ctx = crate::application::context::ConnectionContext::new(
        crate::config::create_test_config(),
        Arc::new(writer.clone()),
    );
    (ctx, writer)
}

#[cfg(test)]
fn response_header(command: Command) -> crate::adapters::protocol::dto::FrameHeader {
    crate::adapters::protocol::dto::FrameHeader {
        length: 0,
        raw_key: command.key() | crate::adapters::protocol::constants::RESPONSE_FLAG,
        version: 1,
    }
}
