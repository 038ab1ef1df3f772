//! Switch port allocation.
//!
//! Ports are handed out per switch from priority-ordered pools keyed by
//! connection class, so the port number of a link loosely indicates its role:
//! inter-domain links on 0-1, switch-to-switch on 2-5 and access links from 6.

pub mod allocator;
pub mod pools;

pub use allocator::PortAllocator;
pub use pools::priority_ports;
