use crate::application::error::ApplicationError;
use crate::domain::metadata::StreamsMetadata;
use crate::domain::response_code::Code;
use crate::Result;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::oneshot;

/// Payload delivered through a waiter's data slot; the variant depends on the command.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    Bytes(Bytes),
    Properties(HashMap<String, String>),
    Mechanisms(Vec<String>),
    Offset(i64),
    Sequence(i64),
    Metadata(StreamsMetadata),
}

/// Completion side of a pending request. Each slot can be filled once.
#[derive(Debug)]
pub struct Waiter {
    key: String,
    code: Option<oneshot::Sender<Code>>,
    data: Option<oneshot::Sender<ResponseData>>,
}

/// Call-site side of a pending request.
#[derive(Debug)]
pub struct PendingResponse {
    key: String,
    code: Option<oneshot::Receiver<Code>>,
    data: Option<oneshot::Receiver<ResponseData>>,
}

pub(crate) fn waiter_pair(key: String) -> (Waiter, PendingResponse) {
    let (code_tx, code_rx) = oneshot::channel();
    let (data_tx, data_rx) = oneshot::channel();
    let waiter = Waiter {
        key: key.clone(),
        code: Some(code_tx),
        data: Some(data_tx),
    };
    let pending = PendingResponse {
        key,
        code: Some(code_rx),
        data: Some(data_rx),
    };
    (waiter, pending)
}

impl Waiter {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn complete_code(&mut self, code: Code) -> Result<()> {
        let tx = self
            .code
            .take()
            .ok_or_else(|| ApplicationError::AlreadyCompleted(format!("{} code", self.key)))?;
        tx.send(code)
            .map_err(|_| ApplicationError::ChannelClosed(format!("{} code", self.key)))
    }

    pub fn complete_data(&mut self, data: ResponseData) -> Result<()> {
        let tx = self
            .data
            .take()
            .ok_or_else(|| ApplicationError::AlreadyCompleted(format!("{} data", self.key)))?;
        tx.send(data)
            .map_err(|_| ApplicationError::ChannelClosed(format!("{} data", self.key)))
    }
}

impl PendingResponse {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Waits for the response code. There is no built-in timeout; wrap in
    /// `tokio::time::timeout` when the broker may never answer.
    pub async fn code(&mut self) -> Result<Code> {
        let rx = self
            .code
            .take()
            .ok_or_else(|| ApplicationError::AlreadyCompleted(format!("{} code", self.key)))?;
        rx.await
            .map_err(|_| ApplicationError::ChannelClosed(format!("{} code", self.key)))
    }

    pub async fn data(&mut self) -> Result<ResponseData> {
        let rx = self
            .data
            .take()
            .ok_or_else(|| ApplicationError::AlreadyCompleted(format!("{} data", self.key)))?;
        rx.await
            .map_err(|_| ApplicationError::ChannelClosed(format!("{} data", self.key)))
    }

    /// Non-blocking check of the data slot, `None` while nothing was delivered yet.
    pub fn try_data(&mut self) -> Option<ResponseData> {
        let rx = self.data.as_mut()?;
        match rx.try_recv() {
            Ok(data) => {
                self.data = None;
                Some(data)
            }
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_each_slot_completes_once() {
        let (mut waiter, mut pending) = waiter_pair("id:1".to_string());

        waiter.complete_code(Code::new(1)).unwrap();
        let err = waiter.complete_code(Code::new(1)).unwrap_err();
        assert!(matches!(err, ApplicationError::AlreadyCompleted(_)));

        waiter.complete_data(ResponseData::Offset(3)).unwrap();
        assert!(waiter.complete_data(ResponseData::Offset(4)).is_err());

        assert_eq!(pending.code().await.unwrap(), Code::new(1));
        assert_eq!(pending.data().await.unwrap(), ResponseData::Offset(3));
        assert!(pending.code().await.is_err());
    }

    #[tokio::test]
    async fn test_code_is_visible_before_data() {
        let (mut waiter, mut pending) = waiter_pair("id:2".to_string());

        waiter.complete_code(Code::new(1)).unwrap();
        assert!(pending.try_data().is_none());
        assert!(pending.code().await.unwrap().is_ok());

        waiter.complete_data(ResponseData::Sequence(10)).unwrap();
        assert_eq!(pending.try_data(), Some(ResponseData::Sequence(10)));
    }

    #[tokio::test]
    async fn test_dropped_waiter_closes_pending() {
        let (waiter, mut pending) = waiter_pair("name:tune".to_string());
        drop(waiter);

        assert!(matches!(
            pending.code().await,
            Err(ApplicationError::ChannelClosed(_))
        ));
    }

    #[test]
    fn test_abandoned_call_site_surfaces_on_completion() {
        let (mut waiter, pending) = waiter_pair("id:3".to_string());
        drop(pending);

        assert!(matches!(
            waiter.complete_code(Code::new(1)),
            Err(ApplicationError::ChannelClosed(_))
        ));
    }
}
