#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    InvalidOffsetSpecification(String),
    UnknownResponseCode(u16),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::InvalidOffsetSpecification(msg) => {
                write!(f, "Invalid offset specification: {}", msg)
            }
            DomainError::UnknownResponseCode(code) => write!(f, "Unknown response code: {}", code),
        }
    }
}

impl std::error::Error for DomainError {}
