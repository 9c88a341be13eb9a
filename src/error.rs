/// CapsightError enum to represent various error types
/// that can occur in the capsight library.
#[derive(Debug)]
pub enum CapsightError {
    /// Represents an error when the service endpoint is invalid.
    InvalidEndpoint(String),
    /// Represents an error when the endpoint scheme is not supported.
    /// For example, if the endpoint does not start with "http://" or "https://".
    EndpointNotSupported(String),
    /// Represents an error when an upload is requested without a selected file.
    Validation(String),
    /// Represents a transport-level failure while talking to the analysis service.
    Network(String),
    /// Represents a failure reported by the analysis service itself (non-2xx reply).
    Service(String),
    /// Represents an error when decoding the analysis service response fails.
    Parse(String),
    /// Represents an operation invoked in a session state that does not hold
    /// the data the operation needs.
    InvalidState(String),
}

impl std::fmt::Display for CapsightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapsightError::InvalidEndpoint(msg) => write!(f, "Invalid endpoint: {}", msg),
            CapsightError::EndpointNotSupported(msg) => {
                write!(f, "Endpoint not supported: {}", msg)
            }
            CapsightError::Validation(msg) => write!(f, "Validation error: {}", msg),
            CapsightError::Network(msg) => write!(f, "Network error: {}", msg),
            CapsightError::Service(msg) => write!(f, "Service error: {}", msg),
            CapsightError::Parse(msg) => write!(f, "Parse error: {}", msg),
            CapsightError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
        }
    }
}
