use crate::domain::error::DomainError;

/// Broker-defined response codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ResponseCode {
    Ok = 1,
    StreamDoesNotExist = 2,
    SubscriptionIdAlreadyExists = 3,
    SubscriptionIdDoesNotExist = 4,
    StreamAlreadyExists = 5,
    StreamNotAvailable = 6,
    SaslMechanismNotSupported = 7,
    AuthenticationFailure = 8,
    SaslError = 9,
    SaslChallenge = 10,
    AuthenticationFailureLoopback = 11,
    VirtualHostAccessFailure = 12,
    UnknownFrame = 13,
    FrameTooLarge = 14,
    InternalError = 15,
    AccessRefused = 16,
    PreconditionFailed = 17,
    PublisherDoesNotExist = 18,
    NoOffset = 19,
}

impl ResponseCode {
    pub fn meaning(&self) -> &'static str {
        match self {
            ResponseCode::Ok => "OK",
            ResponseCode::StreamDoesNotExist => "stream does not exist",
            ResponseCode::SubscriptionIdAlreadyExists => "subscription ID already exists",
            ResponseCode::SubscriptionIdDoesNotExist => "subscription ID does not exist",
            ResponseCode::StreamAlreadyExists => "stream already exists",
            ResponseCode::StreamNotAvailable => "stream not available",
            ResponseCode::SaslMechanismNotSupported => "SASL mechanism not supported",
            ResponseCode::AuthenticationFailure => "authentication failure",
            ResponseCode::SaslError => "SASL error",
            ResponseCode::SaslChallenge => "SASL challenge",
            ResponseCode::AuthenticationFailureLoopback => "authentication failure loopback",
            ResponseCode::VirtualHostAccessFailure => "virtual host access failure",
            ResponseCode::UnknownFrame => "unknown frame",
            ResponseCode::FrameTooLarge => "frame too large",
            ResponseCode::InternalError => "internal error",
            ResponseCode::AccessRefused => "access refused",
            ResponseCode::PreconditionFailed => "precondition failed",
            ResponseCode::PublisherDoesNotExist => "publisher does not exist",
            ResponseCode::NoOffset => "no offset",
        }
    }
}

impl From<ResponseCode> for u16 {
    fn from(code: ResponseCode) -> Self {
        code as u16
    }
}

impl TryFrom<u16> for ResponseCode {
    type Error = DomainError;

    fn try_from(code: u16) -> std::result::Result<Self, Self::Error> {
        let code = match code {
            1 => ResponseCode::Ok,
            2 => ResponseCode::StreamDoesNotExist,
            3 => ResponseCode::SubscriptionIdAlreadyExists,
            4 => ResponseCode::SubscriptionIdDoesNotExist,
            5 => ResponseCode::StreamAlreadyExists,
            6 => ResponseCode::StreamNotAvailable,
            7 => ResponseCode::SaslMechanismNotSupported,
            8 => ResponseCode::AuthenticationFailure,
            9 => ResponseCode::SaslError,
            10 => ResponseCode::SaslChallenge,
            11 => ResponseCode::AuthenticationFailureLoopback,
            12 => ResponseCode::VirtualHostAccessFailure,
            13 => ResponseCode::UnknownFrame,
            14 => ResponseCode::FrameTooLarge,
            15 => ResponseCode::InternalError,
            16 => ResponseCode::AccessRefused,
            17 => ResponseCode::PreconditionFailed,
            18 => ResponseCode::PublisherDoesNotExist,
            19 => ResponseCode::NoOffset,
            other => return Err(DomainError::UnknownResponseCode(other)),
        };
        Ok(code)
    }
}

/// Human-readable meaning of a raw response code, tolerant of codes newer than this table.
pub fn lookup_meaning(code: u16) -> String {
    match ResponseCode::try_from(code) {
        Ok(code) => code.meaning().to_string(),
        Err(e) => e.to_string(),
    }
}

/// Raw response code wrapper delivered to waiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
    pub id: u16,
}

impl Code {
    pub fn new(id: u16) -> Self {
        Self { id }
    }

    pub fn is_ok(&self) -> bool {
        self.id == u16::from(ResponseCode::Ok)
    }

    pub fn meaning(&self) -> String {
        lookup_meaning(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_round_trip_through_u16() {
        for raw in 1..=19u16 {
            let code = ResponseCode::try_from(raw).unwrap();
            assert_eq!(u16::from(code), raw);
        }
    }

    #[test]
    fn test_unknown_code_has_readable_meaning() {
        assert_eq!(lookup_meaning(6), "stream not available");
        assert_eq!(lookup_meaning(999), "Unknown response code: 999");
        assert!(ResponseCode::try_from(0).is_err());
    }

    #[test]
    fn test_code_is_ok() {
        assert!(Code::new(1).is_ok());
        assert!(!Code::new(18).is_ok());
        assert_eq!(Code::new(18).meaning(), "publisher does not exist");
    }
}
