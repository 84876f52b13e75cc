use crate::adapters::protocol::dto::FrameHeader;
use crate::adapters::protocol::parser::{BaseParser, PrimitiveParser, StringParser};
use crate::application::context::ConnectionContext;
use crate::application::waiter::ResponseData;
use crate::domain::message::MetadataUpdateEvent;
use crate::domain::metadata::{Brokers, StreamsMetadata};
use crate::domain::response_code::{Code, ResponseCode};
use crate::ports::incoming::command_handler::CommandHandler;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, trace, warn};

/// correlationId, brokers table, streams table. The broker table is read in full first;
/// stream leader/replica references then resolve against it.
pub struct MetadataHandler;

#[async_trait]
impl CommandHandler for MetadataHandler {
    async fn handle(
        &self,
        ctx: &ConnectionContext,
        _header: &FrameHeader,
        payload: &mut Bytes,
    ) -> Result<()> {
        let parser = BaseParser;
        let correlation_id = parser.parse_u32(payload)?;

        let mut brokers = Brokers::new();
        let brokers_count = parser.parse_u32(payload)?;
        for _ in 0..brokers_count {
            let reference = parser.parse_i16(payload)?;
            let host = parser.parse_string(payload)?;
            let port = parser.parse_u32(payload)?;
            brokers.add(reference, host, port);
        }
        if brokers.is_empty() {
            debug!(correlation_id, "metadata response without brokers");
        }

        let mut streams = StreamsMetadata::new();
        let streams_count = parser.parse_u32(payload)?;
        for _ in 0..streams_count {
            let stream = parser.parse_string(payload)?;
            let response_code = parser.parse_u16(payload)?;
            let leader_reference = parser.parse_i16(payload)?;
            let leader = brokers.get(leader_reference);
            if leader.is_none() {
                debug!(%stream, leader_reference, "leader not in broker table");
            }

            let replicas_count = parser.parse_u32(payload)?;
            let mut replicas = Vec::new();
            for _ in 0..replicas_count {
                replicas.push(brokers.get(parser.parse_i16(payload)?));
            }
            streams.add(stream, response_code, leader, replicas);
        }

        trace!(correlation_id, brokers = brokers.len(), streams = streams.len(), "metadata");

        // Metadata responses carry per-stream codes only; the request itself succeeded.
        let mut waiter = ctx.coordinator().take_response_by_id(correlation_id)?;
        waiter.complete_code(Code::new(ResponseCode::Ok.into()))?;
        waiter.complete_data(ResponseData::Metadata(streams))
    }
}

pub struct MetadataUpdateHandler;

#[async_trait]
impl CommandHandler for MetadataUpdateHandler {
    async fn handle(
        &self,
        ctx: &ConnectionContext,
        _header: &FrameHeader,
        payload: &mut Bytes,
    ) -> Result<()> {
        let parser = BaseParser;
        let code = parser.parse_u16(payload)?;
        if code != u16::from(ResponseCode::StreamNotAvailable) {
            warn!(code, "unsupported metadata update code");
            return Ok(());
        }

        let stream_name = parser.parse_string(payload)?;
        debug!(stream = %stream_name, "stream is no longer available");
        ctx.publish_metadata_update(MetadataUpdateEvent { stream_name, code });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{response_header, test_context};
    use super::*;
    use crate::adapters::protocol::dto::Command;
    use bytes::{BufMut, BytesMut};

    fn put_string(buf: &mut BytesMut, s: &str) {
        buf.put_u16(s.len() as u16);
        buf.put_slice(s.as_bytes());
    }

    fn metadata_payload(correlation_id: u32) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_u32(correlation_id);

        buf.put_u32(2);
        buf.put_i16(0);
        put_string(&mut buf, "node-0");
        buf.put_u32(5552);
        buf.put_i16(1);
        put_string(&mut buf, "node-1");
        buf.put_u32(5553);

        buf.put_u32(2);
        put_string(&mut buf, "orders");
        buf.put_u16(1);
        buf.put_i16(0);
        buf.put_u32(2);
        buf.put_i16(1);
        buf.put_i16(5); // not in the broker table
        put_string(&mut buf, "audit");
        buf.put_u16(2);
        buf.put_i16(9); // not in the broker table
        buf.put_u32(0);
        buf
    }

    #[tokio::test]
    async fn test_metadata_resolves_brokers() {
        let (ctx, _) = test_context();
        let mut pending = ctx.coordinator().register_by_id(3).unwrap();

        MetadataHandler
            .handle(&ctx, &response_header(Command::Metadata), &mut metadata_payload(3).freeze())
            .await
            .unwrap();

        assert!(pending.code().await.unwrap().is_ok());
        let ResponseData::Metadata(streams) = pending.data().await.unwrap() else {
            panic!("expected metadata");
        };
        assert_eq!(streams.len(), 2);

        let orders = streams.get("orders").unwrap();
        let leader = orders.leader.as_ref().unwrap();
        assert_eq!((leader.host.as_str(), leader.port), ("node-0", 5552));
        assert_eq!(orders.replicas.len(), 2);
        assert_eq!(orders.replicas[0].as_ref().unwrap().host, "node-1");
        assert!(orders.replicas[1].is_none());

        let audit = streams.get("audit").unwrap();
        assert_eq!(audit.response_code, 2);
        assert!(audit.leader.is_none());
        assert!(audit.replicas.is_empty());
    }

    #[tokio::test]
    async fn test_metadata_update_stream_not_available() {
        let (ctx, _) = test_context();
        let mut events = ctx.notify_metadata_update();
        let mut payload = BytesMut::new();
        payload.put_u16(6);
        put_string(&mut payload, "orders");

        MetadataUpdateHandler
            .handle(&ctx, &response_header(Command::MetadataUpdate), &mut payload.freeze())
            .await
            .unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            MetadataUpdateEvent {
                stream_name: "orders".to_string(),
                code: 6,
            }
        );
    }

    #[tokio::test]
    async fn test_metadata_update_other_code_is_ignored() {
        let (ctx, _) = test_context();
        let mut events = ctx.notify_metadata_update();
        let mut payload = BytesMut::new();
        payload.put_u16(15);

        MetadataUpdateHandler
            .handle(&ctx, &response_header(Command::MetadataUpdate), &mut payload.freeze())
            .await
            .unwrap();

        assert!(events.try_recv().is_err());
    }
}
