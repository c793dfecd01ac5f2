pub mod byte_key;
pub mod retention_queue;
pub mod slot_arena;

pub use byte_key::{ByteKey, bytes_eq};
pub use retention_queue::RetentionQueue;
pub use slot_arena::{SlotArena, SlotId};
