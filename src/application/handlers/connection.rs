use super::{parse_correlation, parse_properties, parse_strings};
use crate::adapters::protocol::constants::TUNE_WAITER;
use crate::adapters::protocol::dto::FrameHeader;
use crate::adapters::protocol::parser::frame_encoder::{CloseResponseFrame, TuneFrame};
use crate::adapters::protocol::parser::{BaseParser, PrimitiveParser, StringParser};
use crate::application::context::ConnectionContext;
use crate::application::waiter::ResponseData;
use crate::domain::response_code::{lookup_meaning, Code, ResponseCode};
use crate::ports::incoming::command_handler::CommandHandler;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info, trace};

/// correlation id + response code only; completes the code slot.
pub struct GenericResponseHandler;

#[async_trait]
impl CommandHandler for GenericResponseHandler {
    async fn handle(
        &self,
        ctx: &ConnectionContext,
        _header: &FrameHeader,
        payload: &mut Bytes,
    ) -> Result<()> {
        let (correlation_id, response_code) = parse_correlation(payload)?;
        let mut waiter = ctx.coordinator().take_response_by_id(correlation_id)?;
        waiter.complete_code(Code::new(response_code))
    }
}

pub struct PeerPropertiesHandler;

#[async_trait]
impl CommandHandler for PeerPropertiesHandler {
    async fn handle(
        &self,
        ctx: &ConnectionContext,
        _header: &FrameHeader,
        payload: &mut Bytes,
    ) -> Result<()> {
        let (correlation_id, response_code) = parse_correlation(payload)?;
        let properties = parse_properties(payload)?;
        debug!(correlation_id, ?properties, "server properties");

        let mut waiter = ctx.coordinator().take_response_by_id(correlation_id)?;
        waiter.complete_code(Code::new(response_code))
    }
}

pub struct SaslHandshakeHandler;

#[async_trait]
impl CommandHandler for SaslHandshakeHandler {
    async fn handle(
        &self,
        ctx: &ConnectionContext,
        _header: &FrameHeader,
        payload: &mut Bytes,
    ) -> Result<()> {
        let (correlation_id, _response_code) = parse_correlation(payload)?;
        let mechanisms = parse_strings(payload)?;

        let mut waiter = ctx.coordinator().take_response_by_id(correlation_id)?;
        waiter.complete_data(ResponseData::Mechanisms(mechanisms))
    }
}

/// Builds the Tune reply with the broker's values and hands it to the "tune" waiter,
/// whose owner sends it as part of the opening handshake.
pub struct TuneHandler;

#[async_trait]
impl CommandHandler for TuneHandler {
    async fn handle(
        &self,
        ctx: &ConnectionContext,
        _header: &FrameHeader,
        payload: &mut Bytes,
    ) -> Result<()> {
        let parser = BaseParser;
        let max_frame_size = parser.parse_u32(payload)?;
        let heartbeat = parser.parse_u32(payload)?;
        debug!(max_frame_size, heartbeat, "tune");

        let reply = ctx.encoder().encode(&TuneFrame {
            max_frame_size,
            heartbeat,
        });
        let mut waiter = ctx.coordinator().take_response_by_name(TUNE_WAITER)?;
        waiter.complete_data(ResponseData::Bytes(reply))
    }
}

pub struct OpenHandler;

#[async_trait]
impl CommandHandler for OpenHandler {
    async fn handle(
        &self,
        ctx: &ConnectionContext,
        _header: &FrameHeader,
        payload: &mut Bytes,
    ) -> Result<()> {
        let (correlation_id, response_code) = parse_correlation(payload)?;
        // a failed open carries no properties
        let properties = if payload.is_empty() {
            Default::default()
        } else {
            parse_properties(payload)?
        };

        let mut waiter = ctx.coordinator().take_response_by_id(correlation_id)?;
        waiter.complete_code(Code::new(response_code))?;
        waiter.complete_data(ResponseData::Properties(properties))
    }
}

/// Broker-initiated close: log the reason and acknowledge with the same correlation id.
pub struct CloseHandler;

#[async_trait]
impl CommandHandler for CloseHandler {
    async fn handle(
        &self,
        ctx: &ConnectionContext,
        _header: &FrameHeader,
        payload: &mut Bytes,
    ) -> Result<()> {
        let (correlation_id, response_code) = parse_correlation(payload)?;
        let reason = BaseParser.parse_string(payload)?;
        info!(
            correlation_id,
            code = %lookup_meaning(response_code),
            %reason,
            "received close from server"
        );

        let ack = ctx.encoder().encode(&CloseResponseFrame {
            correlation_id,
            response_code: ResponseCode::Ok.into(),
        });
        ctx.writer().write_frame(ack).await
    }
}

pub struct HeartbeatHandler;

#[async_trait]
impl CommandHandler for HeartbeatHandler {
    async fn handle(
        &self,
        _ctx: &ConnectionContext,
        _header: &FrameHeader,
        _payload: &mut Bytes,
    ) -> Result<()> {
        trace!("heartbeat");
        Ok(())
    }
}
