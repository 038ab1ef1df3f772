//! Priority-ordered candidate ports per connection class.

use crate::topology::types::ConnectionClass;

const DOMAIN_CONNECTION_PORTS: &[u8] = &[0, 1];
const SWITCH_TO_SWITCH_PORTS: &[u8] = &[2, 3, 4, 5];
const SWITCH_TO_END_SYSTEM_PORTS: &[u8] = &[6, 7, 0, 1, 2, 3, 4, 5];

/// Candidate ports for `class`, most preferred first
pub fn priority_ports(class: ConnectionClass) -> &'static [u8] {
    match class {
        ConnectionClass::DomainConnection => DOMAIN_CONNECTION_PORTS,
        ConnectionClass::SwitchToSwitch => SWITCH_TO_SWITCH_PORTS,
        ConnectionClass::SwitchToEndSystem => SWITCH_TO_END_SYSTEM_PORTS,
    }
}
