pub mod client;
pub mod peers;

pub use client::HttpPeerClient;
pub use peers::PeerSet;
