//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements        | Connects to                 |
//! |-------------|-------------------|-----------------------------|
//! | `log_sink`  | EventSink         | `log` facade                |
//! | `simulated` | DoorPort          | In-memory doors             |
//! |             | VentPort          | In-memory chamber pressure  |
//! |             | DiscoveryPort     | Named blocks and groups     |
//! |             | DisplayPort       | Captured panel text         |

pub mod log_sink;
pub mod simulated;
