//! Serializer Adapters

mod bincode;

pub use self::bincode::BincodeRecordSerializer;
