//! Error and warning types shared by the topology and routing engines.
//!
//! Fatal conditions are [`GenerationError`]s and abort the current test case.
//! Recoverable conditions are recorded as [`GenerationWarning`]s, logged, and
//! kept on the generator so callers can inspect them after a run.

/// Fatal conditions that terminate topology or route generation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Missing parameter '{parameter}' for topology strategy {strategy}")]
    MissingParameter { strategy: String, parameter: String },

    #[error("Invalid parameter '{parameter}' for topology strategy {strategy}: {reason}")]
    InvalidParameter {
        strategy: String,
        parameter: String,
        reason: String,
    },

    #[error("Topology strategy {strategy} produces {actual} switches, but {expected} were requested")]
    SizeMismatch {
        strategy: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported routing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid traffic type: {0}")]
    UnknownTrafficType(String),

    #[error("Traffic type {0} must define both min_delay and max_delay")]
    MissingDelayBounds(String),

    #[error("Traffic type {traffic_type} has invalid delay bounds [{min}, {max}]")]
    InvalidDelayBounds {
        traffic_type: String,
        min: f64,
        max: f64,
    },

    #[error("Switch {switch} has no more available ports (all {capacity} ports are in use)")]
    PortExhaustion { switch: String, capacity: u8 },

    #[error("Switch {0} is not registered with the port allocator")]
    UnknownSwitch(String),
}

/// Recoverable conditions. Generation continues; the condition is logged and recorded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationWarning {
    #[error("Switch {switch} is using port {port} for {class} connection outside of its priority range")]
    PortOutsidePriority {
        switch: String,
        port: u8,
        class: String,
    },

    #[error("Domain {domain}: placed {placed} of {requested} end systems due to switch capacity constraints")]
    EndSystemShortfall {
        domain: usize,
        placed: usize,
        requested: usize,
    },

    #[error("Cannot connect domains {first} and {second}: missing switches")]
    DomainWithoutSwitches { first: usize, second: usize },

    #[error("No path exists between end systems {first} and {second}")]
    DisconnectedEndSystems { first: String, second: String },

    #[error("Stream {stream}: node {node} not found in topology, skipping route generation")]
    MissingNode { stream: u64, node: String },

    #[error("Stream {stream} has no destinations, skipping route generation")]
    NoDestinations { stream: u64 },

    #[error("Stream {stream}: no path found from {from} to {to}, skipping route generation")]
    NoPath {
        stream: u64,
        from: String,
        to: String,
    },

    #[error("Stream {stream}: could only find {found} paths out of {requested} requested for {from} to {to}")]
    PathShortfall {
        stream: u64,
        from: String,
        to: String,
        found: usize,
        requested: usize,
    },

    #[error("Stream {stream}: missing link {from} -> {to} in topology, defaulting port to 0")]
    MissingLink {
        stream: u64,
        from: String,
        to: String,
    },
}

pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors_name_the_culprit() {
        let err = GenerationError::MissingParameter {
            strategy: "mesh".to_string(),
            parameter: "m".to_string(),
        };
        assert!(err.to_string().contains("'m'"));

        let err = GenerationError::PortExhaustion {
            switch: "SW3".to_string(),
            capacity: 8,
        };
        assert!(err.to_string().contains("SW3"));
        assert!(err.to_string().contains('8'));
    }

    #[test]
    fn test_warnings_name_stream_and_node() {
        let warning = GenerationWarning::MissingNode {
            stream: 7,
            node: "ES42".to_string(),
        };
        let text = warning.to_string();
        assert!(text.contains("Stream 7"));
        assert!(text.contains("ES42"));
    }
}
