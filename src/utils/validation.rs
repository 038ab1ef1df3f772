//! Fixture integrity checks.
//!
//! These functions inspect generated topology, stream and route records and
//! report every inconsistency they find as a human readable message. An empty
//! list means the fixture is consistent.

use std::collections::{HashMap, HashSet};

use crate::routing::{RouteSet, StreamSet};
use crate::topology::Topology;

/// Traffic type that has deadlines but no period
const AUDIO_VOICE: &str = "AUDIO/VOICE";

/// Validate topology integrity
///
/// Checks for:
/// - Links referencing unknown nodes
/// - Duplicate link IDs
/// - A `(source, sourcePort)` pair used by more than one link
/// - Switch ports outside the switch's port count
/// - Links without a reverse link carrying swapped ports
///
/// # Examples
/// ```
/// use tsngen::topology::Topology;
/// use tsngen::utils::validation::validate_topology;
///
/// let topology = Topology::new("MICRO_SECOND", 1000);
/// assert!(validate_topology(&topology).is_empty());
/// ```
pub fn validate_topology(topology: &Topology) -> Vec<String> {
    let mut errors = Vec::new();

    let ports: HashMap<&str, u8> = topology
        .switches
        .iter()
        .map(|s| (s.id.as_str(), s.ports))
        .collect();
    for link in &topology.links {
        if !topology.has_node(&link.source) {
            errors.push(format!(
                "Link {} references non-existent source node {}",
                link.id, link.source
            ));
        }
        if !topology.has_node(&link.destination) {
            errors.push(format!(
                "Link {} references non-existent destination node {}",
                link.id, link.destination
            ));
        }
    }

    let mut link_ids = HashSet::new();
    for link in &topology.links {
        if !link_ids.insert(link.id.as_str()) {
            errors.push(format!("Duplicate link ID {} found in topology", link.id));
        }
    }

    let mut used: HashSet<(&str, u8)> = HashSet::new();
    for link in &topology.links {
        if !used.insert((link.source.as_str(), link.source_port)) {
            errors.push(format!(
                "Port {} on node {} is used by multiple links",
                link.source_port, link.source
            ));
        }
        if let Some(&capacity) = ports.get(link.source.as_str()) {
            if link.source_port >= capacity {
                errors.push(format!(
                    "Link {} uses port {} on switch {}, which only has {} ports",
                    link.id, link.source_port, link.source, capacity
                ));
            }
        }
    }

    let index = topology.link_index();
    for link in &topology.links {
        match index.get(&(link.destination.as_str(), link.source.as_str())) {
            Some(reverse)
                if reverse.source_port == link.destination_port
                    && reverse.destination_port == link.source_port => {}
            Some(reverse) => errors.push(format!(
                "Link {} and its reverse link {} disagree on ports",
                link.id, reverse.id
            )),
            None => errors.push(format!(
                "Link {} ({} -> {}) has no reverse link",
                link.id, link.source, link.destination
            )),
        }
    }

    errors
}

/// Validate stream integrity
///
/// Checks for duplicate stream IDs, missing destinations, PCP values outside
/// `0..=7` and period/deadline presence per traffic type.
pub fn validate_streams(streams: &StreamSet) -> Vec<String> {
    let mut errors = Vec::new();

    let mut ids = HashSet::new();
    for stream in &streams.streams {
        if !ids.insert(stream.id) {
            errors.push(format!("Duplicate stream ID {} found", stream.id));
        }
        if stream.destinations.is_empty() {
            errors.push(format!("Stream {} has no destinations", stream.id));
        }
        if let Some(pcp) = stream.pcp {
            if pcp > 7 {
                errors.push(format!("Stream {} has invalid PCP value {}", stream.id, pcp));
            }
        }

        // best-effort carries neither; audio/voice has deadlines only; the rest need both
        let (period_required, deadline_required) = if stream.is_best_effort() {
            (false, false)
        } else if stream.traffic_type == AUDIO_VOICE {
            (false, true)
        } else {
            (true, true)
        };
        match (period_required, stream.period.is_some()) {
            (false, true) => errors.push(format!(
                "Stream {} has type {}, but period should be None",
                stream.id, stream.traffic_type
            )),
            (true, false) => errors.push(format!("Stream {} does not have a valid period", stream.id)),
            _ => {}
        }
        for destination in &stream.destinations {
            match (deadline_required, destination.deadline.is_some()) {
                (false, true) => errors.push(format!(
                    "Stream {} has type {}, but destination {} has a deadline",
                    stream.id, stream.traffic_type, destination.id
                )),
                (true, false) => errors.push(format!(
                    "Stream {} does not have a valid deadline for destination {}",
                    stream.id, destination.id
                )),
                _ => {}
            }
        }
    }

    errors
}

/// Validate routes against their topology and streams
///
/// Every stream must have a route; every path must start at the stream's
/// source, end at one of its destinations, and follow existing links using
/// the links' source ports. End systems always use port 0. Routes for
/// unknown streams are reported too.
pub fn validate_routes(routes: &RouteSet, topology: &Topology, streams: &StreamSet) -> Vec<String> {
    let mut errors = Vec::new();

    for route in &routes.routes {
        if streams.get(route.flow_id).is_none() {
            errors.push(format!("Route for flow {} has no matching stream", route.flow_id));
        }
    }

    for stream in &streams.streams {
        let Some(route) = routes.route_for(stream.id) else {
            errors.push(format!("Stream {} does not have a route", stream.id));
            continue;
        };

        for path in &route.paths {
            let (Some(first), Some(last)) = (path.first(), path.last()) else {
                errors.push(format!("Empty path found for stream {}", stream.id));
                continue;
            };
            if first.node != stream.source {
                errors.push(format!(
                    "Route for stream {} does not start at source {}",
                    stream.id, stream.source
                ));
            }
            if !stream.destinations.iter().any(|d| d.id == last.node) {
                errors.push(format!(
                    "Route path for stream {} does not end at a destination, ends at {}",
                    stream.id, last.node
                ));
            }

            for hop in path {
                if topology.is_end_system(&hop.node) {
                    if hop.port != 0 {
                        errors.push(format!(
                            "End system {} in route for stream {} uses invalid port {}, should be 0",
                            hop.node, stream.id, hop.port
                        ));
                    }
                } else if let Some(switch) = topology.switch(&hop.node) {
                    if hop.port >= switch.ports {
                        errors.push(format!(
                            "Switch {} in route for stream {} uses port {}, but only has {} ports",
                            hop.node, stream.id, hop.port, switch.ports
                        ));
                    }
                } else {
                    errors.push(format!(
                        "Route for stream {} references non-existent node {}",
                        stream.id, hop.node
                    ));
                }
            }

            for pair in path.windows(2) {
                let (from, to) = (&pair[0], &pair[1]);
                match topology.find_link(&from.node, &to.node) {
                    Some(link) if link.source_port != from.port => errors.push(format!(
                        "Route for stream {} uses port {} on node {}, but link {} uses port {}",
                        stream.id, from.port, from.node, link.id, link.source_port
                    )),
                    Some(_) => {}
                    None => errors.push(format!(
                        "No link exists between {} and {} in route for stream {}",
                        from.node, to.node, stream.id
                    )),
                }
            }
        }
    }

    errors
}

/// Validate a complete fixture; routes are optional
pub fn validate_all(topology: &Topology, streams: &StreamSet, routes: Option<&RouteSet>) -> Vec<String> {
    let mut errors = validate_topology(topology);
    errors.extend(validate_streams(streams));
    if let Some(routes) = routes {
        errors.extend(validate_routes(routes, topology, streams));
    }
    errors
}
