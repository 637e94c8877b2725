#![forbid(unsafe_code)]

pub mod datastore;
pub mod memory;
pub mod remote;

pub use datastore::{
    ConfigureReply, Connection, CreateReply, DataStore, InstalledProtocol, ProtocolFilter,
    ProtocolsReply, RecordEnvelope, RecordFilter, RecordsReply, RemotePeer, Status, StoreError,
    WriteMessage,
};
pub use memory::InMemoryNode;
pub use remote::HttpRemotePeer;
