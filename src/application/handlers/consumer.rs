use super::parse_correlation;
use crate::adapters::protocol::constants::SUB_BATCH_ENTRY_FLAG;
use crate::adapters::protocol::dto::{ChunkHeader, FrameHeader};
use crate::adapters::protocol::parser::frame_encoder::CreditFrame;
use crate::adapters::protocol::parser::{BaseParser, Deserialize, PrimitiveParser, StringParser};
use crate::application::context::ConnectionContext;
use crate::application::waiter::ResponseData;
use crate::domain::response_code::{lookup_meaning, Code};
use crate::ports::incoming::command_handler::CommandHandler;
use crate::Result;
use async_trait::async_trait;
use bytes::{Buf, Bytes};
use tracing::{debug, error, trace, warn};

/// subscriptionId, chunk header, records.
///
/// One credit is requested as soon as the chunk header is read. Records are decoded in
/// order; the running offset moves by one per record whether or not the record was kept.
pub struct DeliverHandler;

#[async_trait]
impl CommandHandler for DeliverHandler {
    async fn handle(
        &self,
        ctx: &ConnectionContext,
        _header: &FrameHeader,
        payload: &mut Bytes,
    ) -> Result<()> {
        let parser = BaseParser;
        let subscription_id = parser.parse_u8(payload)?;
        let consumer = ctx.coordinator().get_consumer_by_id(subscription_id)?;

        let chunk = ChunkHeader::deserialize(payload)?;
        if !chunk.is_user_chunk() {
            warn!(subscription_id, chunk_type = chunk.chunk_type, "invalid chunk type");
        }

        let credit = ctx.encoder().encode(&CreditFrame {
            subscription_id,
            credit: ctx.config().credits_per_chunk,
        });
        if let Err(e) = ctx.writer().write_frame(credit).await {
            warn!(subscription_id, "failed to request credit: {}", e);
        }

        let floor = consumer.options().offset.floor();
        let mut offset = chunk.chunk_first_offset;
        // num_records comes off the wire; the payload bounds how many records can follow
        let mut batch = Vec::with_capacity((chunk.num_records as usize).min(payload.remaining()));
        let mut remaining = chunk.num_records;

        while remaining > 0 {
            let Some(entry_type) = parser.peek_u8(payload) else {
                debug!(subscription_id, offset, "end of data reading entry type");
                return Ok(());
            };

            if entry_type & SUB_BATCH_ENTRY_FLAG != 0 {
                // Sub-batch entries are not decoded; the rest of the chunk can't be framed.
                warn!(subscription_id, entry_type, "entry type not handled");
                offset = offset.wrapping_add(i64::from(remaining));
                break;
            }

            let size = parser.parse_u32(payload)? as usize;
            let raw = parser.parse_byte_array(payload, size)?;
            if floor.is_some_and(|floor| offset < floor) {
                trace!(subscription_id, offset, "record filtered");
            } else {
                match ctx.decoder().decode(raw) {
                    Ok(message) => batch.push(message),
                    Err(e) => error!(subscription_id, offset, "error unmarshal messages: {}", e),
                }
            }

            remaining -= 1;
            offset = offset.wrapping_add(1);
        }

        trace!(subscription_id, offset, messages = batch.len(), "chunk decoded");
        consumer.deliver(offset, batch)?;
        Ok(())
    }
}

/// Credit responses only arrive when the broker rejected a credit request.
pub struct CreditHandler;

#[async_trait]
impl CommandHandler for CreditHandler {
    async fn handle(
        &self,
        _ctx: &ConnectionContext,
        _header: &FrameHeader,
        payload: &mut Bytes,
    ) -> Result<()> {
        let parser = BaseParser;
        let response_code = parser.parse_u16(payload)?;
        let subscription_id = parser.parse_u8(payload)?;
        warn!(
            subscription_id,
            code = %lookup_meaning(response_code),
            "credit notification"
        );
        Ok(())
    }
}

pub struct QueryOffsetHandler;

#[async_trait]
impl CommandHandler for QueryOffsetHandler {
    async fn handle(
        &self,
        ctx: &ConnectionContext,
        _header: &FrameHeader,
        payload: &mut Bytes,
    ) -> Result<()> {
        let (correlation_id, response_code) = parse_correlation(payload)?;
        let offset = BaseParser.parse_i64(payload)?;

        let mut waiter = ctx.coordinator().take_response_by_id(correlation_id)?;
        waiter.complete_code(Code::new(response_code))?;
        waiter.complete_data(ResponseData::Offset(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::super::{response_header, test_context};
    use super::*;
    use crate::adapters::protocol::dto::Command;
    use crate::application::ApplicationError;
    use crate::domain::message::Message;
    use crate::domain::consumer::{Consumer, ConsumerOptions, ConsumerReceiver, OffsetSpecification};
    use bytes::{BufMut, BytesMut};
    use std::sync::Arc;

    fn chunk(subscription_id: u8, first_offset: i64, records: &[&[u8]]) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_u8(subscription_id);
        buf.put_u8(0x50);
        buf.put_u8(0);
        buf.put_u16(records.len() as u16);
        buf.put_u32(records.len() as u32);
        buf.put_i64(0);
        buf.put_i64(1);
        buf.put_i64(first_offset);
        buf.put_bytes(0, 16);
        for record in records {
            buf.put_u32(record.len() as u32);
            buf.put_slice(record);
        }
        buf
    }

    fn subscribe(
        ctx: &ConnectionContext,
        id: u8,
        offset: OffsetSpecification,
    ) -> ConsumerReceiver {
        let (consumer, rx) = Consumer::new(id, ConsumerOptions::new("s", offset), 4);
        ctx.coordinator().register_consumer(Arc::new(consumer)).unwrap();
        rx
    }

    #[tokio::test]
    async fn test_deliver_two_records() {
        let (ctx, writer) = test_context();
        let mut rx = subscribe(&ctx, 1, OffsetSpecification::First);

        DeliverHandler
            .handle(&ctx, &response_header(Command::Deliver), &mut chunk(1, 50, &[&b"a"[..], &b"b"[..]]).freeze())
            .await
            .unwrap();

        assert_eq!(rx.offsets.recv().await, Some(52));
        let batch = rx.messages.recv().await.unwrap();
        assert_eq!(batch, vec![Message::new("a"), Message::new("b")]);

        let frames = writer.frames().await;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref(), &[0, 0, 0, 7, 0x00, 0x09, 0, 1, 1, 0, 1]);
    }

    #[tokio::test]
    async fn test_records_below_floor_are_filtered() {
        let (ctx, _) = test_context();
        let mut rx = subscribe(&ctx, 2, OffsetSpecification::Offset(11));

        DeliverHandler
            .handle(
                &ctx,
                &response_header(Command::Deliver),
                &mut chunk(2, 10, &[&b"ten"[..], &b"eleven"[..], &b"twelve"[..]]).freeze(),
            )
            .await
            .unwrap();

        assert_eq!(rx.offsets.recv().await, Some(13));
        let batch = rx.messages.recv().await.unwrap();
        assert_eq!(batch, vec![Message::new("eleven"), Message::new("twelve")]);
    }

    #[tokio::test]
    async fn test_undecodable_record_is_dropped() {
        let (ctx, _) = test_context();
        let mut rx = subscribe(&ctx, 3, OffsetSpecification::Next);

        DeliverHandler
            .handle(
                &ctx,
                &response_header(Command::Deliver),
                &mut chunk(3, 0, &[&[0xFFu8, 0x00][..], &b"ok"[..]]).freeze(),
            )
            .await
            .unwrap();

        assert_eq!(rx.offsets.recv().await, Some(2));
        assert_eq!(rx.messages.recv().await.unwrap(), vec![Message::new("ok")]);
    }

    #[tokio::test]
    async fn test_sub_batch_entry_still_advances_offset() {
        let (ctx, _) = test_context();
        let mut rx = subscribe(&ctx, 4, OffsetSpecification::First);
        let mut payload = chunk(4, 100, &[&b"x"[..]]);
        // rewrite the record count to 3 and append a sub-batch entry
        payload[5..9].copy_from_slice(&3u32.to_be_bytes());
        payload.put_u8(0x80);
        payload.put_bytes(0, 10);

        DeliverHandler
            .handle(&ctx, &response_header(Command::Deliver), &mut payload.freeze())
            .await
            .unwrap();

        assert_eq!(rx.offsets.recv().await, Some(103));
        assert_eq!(rx.messages.recv().await.unwrap(), vec![Message::new("x")]);
    }

    #[tokio::test]
    async fn test_end_of_chunk_data_returns_quietly() {
        let (ctx, writer) = test_context();
        let mut rx = subscribe(&ctx, 5, OffsetSpecification::First);
        let mut payload = chunk(5, 0, &[&b"only"[..]]);
        payload[5..9].copy_from_slice(&2u32.to_be_bytes());

        DeliverHandler
            .handle(&ctx, &response_header(Command::Deliver), &mut payload.freeze())
            .await
            .unwrap();

        assert!(rx.offsets.try_recv().is_err());
        assert_eq!(writer.frames().await.len(), 1);
    }

    #[tokio::test]
    async fn test_lying_record_count_returns_quietly() {
        let (ctx, writer) = test_context();
        let mut rx = subscribe(&ctx, 6, OffsetSpecification::First);
        let mut payload = chunk(6, 0, &[&b"z"[..]]);
        payload[5..9].copy_from_slice(&u32::MAX.to_be_bytes());

        DeliverHandler
            .handle(&ctx, &response_header(Command::Deliver), &mut payload.freeze())
            .await
            .unwrap();

        assert!(rx.offsets.try_recv().is_err());
        assert_eq!(writer.frames().await.len(), 1);
    }

    #[tokio::test]
    async fn test_offset_near_max_wraps_instead_of_panicking() {
        let (ctx, _) = test_context();
        let mut rx = subscribe(&ctx, 7, OffsetSpecification::First);

        DeliverHandler
            .handle(
                &ctx,
                &response_header(Command::Deliver),
                &mut chunk(7, i64::MAX, &[&b"a"[..], &b"b"[..]]).freeze(),
            )
            .await
            .unwrap();

        assert_eq!(rx.offsets.recv().await, Some(i64::MIN + 1));
    }

    #[tokio::test]
    async fn test_undrained_consumer_does_not_block_handler() {
        let (ctx, _) = test_context();
        let (consumer, mut rx) =
            Consumer::new(8, ConsumerOptions::new("s", OffsetSpecification::First), 1);
        ctx.coordinator().register_consumer(Arc::new(consumer)).unwrap();

        for first_offset in [0, 1, 2] {
            DeliverHandler
                .handle(
                    &ctx,
                    &response_header(Command::Deliver),
                    &mut chunk(8, first_offset, &[&b"r"[..]]).freeze(),
                )
                .await
                .unwrap();
        }

        assert_eq!(rx.offsets.recv().await, Some(1));
        assert!(rx.offsets.try_recv().is_err());
        assert_eq!(ctx.coordinator().get_consumer_by_id(8).unwrap().offset(), 3);
    }

    #[tokio::test]
    async fn test_deliver_for_unknown_subscription() {
        let (ctx, writer) = test_context();

        let err = DeliverHandler
            .handle(&ctx, &response_header(Command::Deliver), &mut chunk(9, 0, &[&b"a"[..]]).freeze())
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::NotFound(_)));
        assert!(writer.frames().await.is_empty());
    }

    #[tokio::test]
    async fn test_query_offset() {
        let (ctx, _) = test_context();
        let mut pending = ctx.coordinator().register_by_id(21).unwrap();
        let mut payload = BytesMut::new();
        payload.put_u32(21);
        payload.put_u16(1);
        payload.put_i64(4096);

        QueryOffsetHandler
            .handle(&ctx, &response_header(Command::QueryOffset), &mut payload.freeze())
            .await
            .unwrap();

        assert!(pending.code().await.unwrap().is_ok());
        assert_eq!(pending.data().await.unwrap(), ResponseData::Offset(4096));
    }

    #[tokio::test]
    async fn test_credit_notification_is_informational() {
        let (ctx, writer) = test_context();
        let mut payload = BytesMut::new();
        payload.put_u16(4);
        payload.put_u8(7);

        CreditHandler
            .handle(&ctx, &response_header(Command::Credit), &mut payload.freeze())
            .await
            .unwrap();

        assert!(writer.frames().await.is_empty());
    }
}
