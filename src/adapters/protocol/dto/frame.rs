use crate::adapters::protocol::constants::*;

/// Commands this client knows how to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    DeclarePublisher,
    PublishConfirm,
    PublishError,
    QueryPublisherSequence,
    DeletePublisher,
    Subscribe,
    Deliver,
    Credit,
    QueryOffset,
    Unsubscribe,
    CreateStream,
    DeleteStream,
    Metadata,
    MetadataUpdate,
    PeerProperties,
    SaslHandshake,
    SaslAuthenticate,
    Tune,
    Open,
    Close,
    Heartbeat,
}

impl Command {
    pub const ALL: [Command; 21] = [
        Command::DeclarePublisher,
        Command::PublishConfirm,
        Command::PublishError,
        Command::QueryPublisherSequence,
        Command::DeletePublisher,
        Command::Subscribe,
        Command::Deliver,
        Command::Credit,
        Command::QueryOffset,
        Command::Unsubscribe,
        Command::CreateStream,
        Command::DeleteStream,
        Command::Metadata,
        Command::MetadataUpdate,
        Command::PeerProperties,
        Command::SaslHandshake,
        Command::SaslAuthenticate,
        Command::Tune,
        Command::Open,
        Command::Close,
        Command::Heartbeat,
    ];

    /// Maps a command key (response flag already stripped) to a command.
    pub fn from_key(key: u16) -> Option<Self> {
        let command = match key {
            DECLARE_PUBLISHER_KEY => Command::DeclarePublisher,
            PUBLISH_CONFIRM_KEY => Command::PublishConfirm,
            PUBLISH_ERROR_KEY => Command::PublishError,
            QUERY_PUBLISHER_SEQUENCE_KEY => Command::QueryPublisherSequence,
            DELETE_PUBLISHER_KEY => Command::DeletePublisher,
            SUBSCRIBE_KEY => Command::Subscribe,
            DELIVER_KEY => Command::Deliver,
            CREDIT_KEY => Command::Credit,
            QUERY_OFFSET_KEY => Command::QueryOffset,
            UNSUBSCRIBE_KEY => Command::Unsubscribe,
            CREATE_STREAM_KEY => Command::CreateStream,
            DELETE_STREAM_KEY => Command::DeleteStream,
            METADATA_KEY => Command::Metadata,
            METADATA_UPDATE_KEY => Command::MetadataUpdate,
            PEER_PROPERTIES_KEY => Command::PeerProperties,
            SASL_HANDSHAKE_KEY => Command::SaslHandshake,
            SASL_AUTHENTICATE_KEY => Command::SaslAuthenticate,
            TUNE_KEY => Command::Tune,
            OPEN_KEY => Command::Open,
            CLOSE_KEY => Command::Close,
            HEARTBEAT_KEY => Command::Heartbeat,
            _ => return None,
        };
        Some(command)
    }

    /// Commands the broker sends on its own rather than in reply to a request; these arrive
    /// without the response flag.
    pub fn is_broker_initiated(&self) -> bool {
        matches!(
            self,
            Command::Deliver
                | Command::PublishConfirm
                | Command::PublishError
                | Command::MetadataUpdate
                | Command::Tune
                | Command::Close
                | Command::Heartbeat
        )
    }

    pub fn key(&self) -> u16 {
        match self {
            Command::DeclarePublisher => DECLARE_PUBLISHER_KEY,
            Command::PublishConfirm => PUBLISH_CONFIRM_KEY,
            Command::PublishError => PUBLISH_ERROR_KEY,
            Command::QueryPublisherSequence => QUERY_PUBLISHER_SEQUENCE_KEY,
            Command::DeletePublisher => DELETE_PUBLISHER_KEY,
            Command::Subscribe => SUBSCRIBE_KEY,
            Command::Deliver => DELIVER_KEY,
            Command::Credit => CREDIT_KEY,
            Command::QueryOffset => QUERY_OFFSET_KEY,
            Command::Unsubscribe => UNSUBSCRIBE_KEY,
            Command::CreateStream => CREATE_STREAM_KEY,
            Command::DeleteStream => DELETE_STREAM_KEY,
            Command::Metadata => METADATA_KEY,
            Command::MetadataUpdate => METADATA_UPDATE_KEY,
            Command::PeerProperties => PEER_PROPERTIES_KEY,
            Command::SaslHandshake => SASL_HANDSHAKE_KEY,
            Command::SaslAuthenticate => SASL_AUTHENTICATE_KEY,
            Command::Tune => TUNE_KEY,
            Command::Open => OPEN_KEY,
            Command::Close => CLOSE_KEY,
            Command::Heartbeat => HEARTBEAT_KEY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub length: u32,
    /// Key as received, response flag included.
    pub raw_key: u16,
    pub version: u16,
}

impl FrameHeader {
    pub fn command_key(&self) -> u16 {
        self.raw_key & COMMAND_MASK
    }

    pub fn is_response(&self) -> bool {
        self.raw_key & RESPONSE_FLAG != 0
    }

    pub fn command(&self) -> Option<Command> {
        Command::from_key(self.command_key())
    }

    /// A reply-only command arriving without the response flag.
    pub fn is_misdirected(&self) -> bool {
        !self.is_response() && self.command().is_some_and(|c| !c.is_broker_initiated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_misdirected_request_frames() {
        let header = |raw_key| FrameHeader {
            length: 4,
            raw_key,
            version: 1,
        };

        assert!(!header(0x0008).is_misdirected()); // deliver
        assert!(!header(0x0017).is_misdirected()); // heartbeat
        assert!(!header(0x800d).is_misdirected()); // create stream response
        assert!(header(0x000d).is_misdirected()); // create stream request
        assert!(!header(0x7FFF).is_misdirected()); // unknown command
    }

    #[test]
    fn test_command_key_round_trip() {
        for command in Command::ALL {
            assert_eq!(Command::from_key(command.key()), Some(command));
        }
        assert_eq!(Command::from_key(0x7FFF), None);
    }

    #[test]
    fn test_header_strips_response_flag() {
        let header = FrameHeader {
            length: 12,
            raw_key: 0x8014,
            version: 1,
        };

        assert!(header.is_response());
        assert_eq!(header.command_key(), TUNE_KEY);
        assert_eq!(header.command(), Some(Command::Tune));
    }
}
