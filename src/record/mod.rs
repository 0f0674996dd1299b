//! Tuple storage on top of the buffer pool: a second, independently
//! grounded client beside the B+ tree exercising the pin/markDirty/unpin
//! discipline (§6's record-store contract, made concrete here).

mod schema;
mod store;
mod tuple;

pub use schema::{Attribute, Schema, ATTRIBUTE_NAME_SIZE};
pub use store::SlottedRecordStore;
pub use tuple::{decode_tuple, encode_tuple, TOMBSTONE_DELETED, TOMBSTONE_LIVE};
