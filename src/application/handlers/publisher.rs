use super::parse_correlation;
use crate::adapters::protocol::dto::FrameHeader;
use crate::adapters::protocol::parser::{ArrayParser, BaseParser, PrimitiveParser};
use crate::application::context::ConnectionContext;
use crate::application::waiter::ResponseData;
use crate::domain::producer::Producer;
use crate::domain::response_code::Code;
use crate::ports::incoming::command_handler::CommandHandler;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{trace, warn};

/// publisherId, count×publishingId. Confirms the tracked ids as one batch.
pub struct PublishConfirmHandler;

#[async_trait]
impl CommandHandler for PublishConfirmHandler {
    async fn handle(
        &self,
        ctx: &ConnectionContext,
        _header: &FrameHeader,
        payload: &mut Bytes,
    ) -> Result<()> {
        let parser = BaseParser;
        let publisher_id = parser.parse_u8(payload)?;
        let producer = match ctx.coordinator().get_producer_by_id(publisher_id) {
            Ok(producer) => producer,
            Err(e) => {
                warn!(publisher_id, "can't find the producer during confirmation: {}", e);
                return Ok(());
            }
        };

        let publishing_ids = parser.parse_array(payload, |buf| parser.parse_i64(buf))?;
        let confirmed = producer.confirm(&publishing_ids);
        trace!(publisher_id, received = publishing_ids.len(), confirmed, "publish confirm");
        Ok(())
    }
}

/// publisherId, count×(publishingId, code). Every entry reaches the error listener.
pub struct PublishErrorHandler;

#[async_trait]
impl CommandHandler for PublishErrorHandler {
    async fn handle(
        &self,
        ctx: &ConnectionContext,
        _header: &FrameHeader,
        payload: &mut Bytes,
    ) -> Result<()> {
        let parser = BaseParser;
        let publisher_id = parser.parse_u8(payload)?;
        // Unknown publisher: errors are decoded against a detached record and discarded.
        let producer = ctx
            .coordinator()
            .get_producer_by_id(publisher_id)
            .unwrap_or_else(|e| {
                warn!(publisher_id, "producer not found: {}", e);
                Arc::new(Producer::detached(publisher_id))
            });

        let count = parser.parse_u32(payload)?;
        for _ in 0..count {
            let publishing_id = parser.parse_i64(payload)?;
            let code = parser.parse_u16(payload)?;
            producer.fail(publishing_id, code);
        }
        Ok(())
    }
}

pub struct QueryPublisherSequenceHandler;

#[async_trait]
impl CommandHandler for QueryPublisherSequenceHandler {
    async fn handle(
        &self,
        ctx: &ConnectionContext,
        _header: &FrameHeader,
        payload: &mut Bytes,
    ) -> Result<()> {
        let (correlation_id, response_code) = parse_correlation(payload)?;
        let sequence = BaseParser.parse_i64(payload)?;

        let mut waiter = ctx.coordinator().take_response_by_id(correlation_id)?;
        waiter.complete_code(Code::new(response_code))?;
        waiter.complete_data(ResponseData::Sequence(sequence))
    }
}
