use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broker {
    pub reference: i16,
    pub host: String,
    pub port: u32,
}

/// Broker table of a single metadata response, keyed by its local reference.
#[derive(Debug, Default)]
pub struct Brokers {
    items: HashMap<i16, Broker>,
}

impl Brokers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, reference: i16, host: String, port: u32) {
        self.items.insert(reference, Broker { reference, host, port });
    }

    pub fn get(&self, reference: i16) -> Option<Broker> {
        self.items.get(&reference).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamMetadata {
    pub stream_name: String,
    pub response_code: u16,
    pub leader: Option<Broker>,
    /// Replicas in broker order; a reference missing from the broker table stays `None`.
    pub replicas: Vec<Option<Broker>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamsMetadata {
    items: HashMap<String, StreamMetadata>,
}

impl StreamsMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        stream_name: String,
        response_code: u16,
        leader: Option<Broker>,
        replicas: Vec<Option<Broker>>,
    ) {
        self.items.insert(
            stream_name.clone(),
            StreamMetadata {
                stream_name,
                response_code,
                leader,
                replicas,
            },
        );
    }

    pub fn get(&self, stream_name: &str) -> Option<&StreamMetadata> {
        self.items.get(stream_name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamMetadata> {
        self.items.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brokers_lookup() {
        let mut brokers = Brokers::new();
        brokers.add(0, "node-0".to_string(), 5552);

        assert_eq!(brokers.get(0).map(|b| b.port), Some(5552));
        assert_eq!(brokers.get(7), None);
        assert_eq!(brokers.len(), 1);
    }

    #[test]
    fn test_streams_metadata_keyed_by_name() {
        let mut metadata = StreamsMetadata::new();
        metadata.add("orders".to_string(), 1, None, vec![None]);

        let orders = metadata.get("orders").unwrap();
        assert_eq!(orders.response_code, 1);
        assert!(orders.leader.is_none());
        assert_eq!(orders.replicas, vec![None]);
        assert!(metadata.get("missing").is_none());
    }
}
