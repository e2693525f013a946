pub mod events;

pub use events::{
    is_settled, total_paid, EventListener, EventRegistry, HostEvent, OrderSyncListener,
    SyncDecision,
};
