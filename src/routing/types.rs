//! Stream and route records.
//!
//! Streams come from the traffic collaborator (`streams.json`); routes are
//! what the engine emits (`routes.json`). Field names follow those files.

use serde::{Deserialize, Serialize};

/// Traffic type tag that never carries a delay estimate
pub const BEST_EFFORT: &str = "BEST-EFFORT";

/// One destination of a stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    #[serde(default)]
    pub deadline: Option<f64>,
}

/// A stream as consumed by the route engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub source: String,
    pub destinations: Vec<Destination>,
    /// Traffic type tag, e.g. `ISOCHRONOUS` or `BEST-EFFORT`
    #[serde(rename = "type")]
    pub traffic_type: String,
    #[serde(rename = "PCP", default, skip_serializing_if = "Option::is_none")]
    pub pcp: Option<u8>,
    /// Frame size in bytes
    #[serde(default)]
    pub size: u64,
    /// Period in microseconds; `None` for aperiodic traffic
    #[serde(default)]
    pub period: Option<f64>,
    /// Additional diverse paths requested beyond the primary one
    #[serde(default)]
    pub redundancy: usize,
}

impl StreamDescriptor {
    pub fn new(id: u64, source: &str, destinations: &[&str], traffic_type: &str) -> Self {
        Self {
            id,
            name: Some(format!("Stream{}", id)),
            source: source.to_string(),
            destinations: destinations
                .iter()
                .map(|d| Destination {
                    id: d.to_string(),
                    deadline: None,
                })
                .collect(),
            traffic_type: traffic_type.to_string(),
            pcp: None,
            size: 0,
            period: None,
            redundancy: 0,
        }
    }

    pub fn is_best_effort(&self) -> bool {
        self.traffic_type == BEST_EFFORT
    }

    /// Bandwidth demand in bits per second, `None` for aperiodic streams
    pub fn demand_bps(&self) -> Option<f64> {
        let period = self.period.filter(|p| *p > 0.0)?;
        Some((self.size as f64 * 8.0) / (period / 1e6))
    }
}

/// Contents of a `streams.json` file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSet {
    #[serde(default = "default_delay_units")]
    pub delay_units: String,
    pub streams: Vec<StreamDescriptor>,
}

impl StreamSet {
    pub fn new(streams: Vec<StreamDescriptor>) -> Self {
        Self {
            delay_units: default_delay_units(),
            streams,
        }
    }

    pub fn get(&self, id: u64) -> Option<&StreamDescriptor> {
        self.streams.iter().find(|s| s.id == id)
    }
}

fn default_delay_units() -> String {
    "MICRO_SECOND".to_string()
}

/// Delay bounds of one traffic type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficType {
    pub name: String,
    #[serde(default)]
    pub min_delay: Option<f64>,
    #[serde(default)]
    pub max_delay: Option<f64>,
}

/// One directed hop; `port` is the egress port towards the next hop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    pub node: String,
    pub port: u8,
}

/// Routing result for one stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub flow_id: u64,
    pub paths: Vec<Vec<Hop>>,
    pub min_e2e_delay: f64,
}

/// Contents of a `routes.json` file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSet {
    pub delay_units: String,
    pub routes: Vec<Route>,
}

impl RouteSet {
    pub fn new(delay_units: &str, routes: Vec<Route>) -> Self {
        Self {
            delay_units: delay_units.to_string(),
            routes,
        }
    }

    pub fn route_for(&self, flow_id: u64) -> Option<&Route> {
        self.routes.iter().find(|r| r.flow_id == flow_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_stream() {
        let json = r#"{
            "delay_units": "MICRO_SECOND",
            "streams": [{
                "id": 3,
                "name": "Stream3",
                "source": "ES0",
                "destinations": [{"id": "ES4", "deadline": 1000}, {"id": "ES5", "deadline": null}],
                "type": "ISOCHRONOUS",
                "PCP": 6,
                "size": 125,
                "period": 1000,
                "redundancy": 1
            }, {
                "id": 4,
                "source": "ES1",
                "destinations": [{"id": "ES2"}],
                "type": "BEST-EFFORT",
                "period": null
            }]
        }"#;
        let set: StreamSet = serde_json::from_str(json).unwrap();
        let first = &set.streams[0];
        assert_eq!(first.traffic_type, "ISOCHRONOUS");
        assert_eq!(first.pcp, Some(6));
        assert_eq!(first.destinations[0].deadline, Some(1000.0));
        assert_eq!(first.destinations[1].deadline, None);
        assert_eq!(first.redundancy, 1);

        let second = set.get(4).unwrap();
        assert!(second.is_best_effort());
        assert_eq!(second.size, 0);
        assert_eq!(second.demand_bps(), None);
    }

    #[test]
    fn test_demand() {
        let mut stream = StreamDescriptor::new(0, "ES0", &["ES1"], "ISOCHRONOUS");
        stream.size = 125;
        stream.period = Some(1000.0);
        // 1000 bits every millisecond
        assert_eq!(stream.demand_bps(), Some(1_000_000.0));
    }

    #[test]
    fn test_route_layout() {
        let set = RouteSet::new(
            "MICRO_SECOND",
            vec![Route {
                flow_id: 1,
                paths: vec![vec![
                    Hop { node: "ES0".to_string(), port: 0 },
                    Hop { node: "SW0".to_string(), port: 2 },
                ]],
                min_e2e_delay: 0.0,
            }],
        );
        let value = serde_json::to_value(&set).unwrap();
        assert_eq!(value["routes"][0]["flow_id"], 1);
        assert_eq!(value["routes"][0]["paths"][0][1]["node"], "SW0");
        assert_eq!(value["routes"][0]["paths"][0][1]["port"], 2);
        assert!(set.route_for(1).is_some());
    }
}
