mod connection;
mod packets;

pub use packets::*;

pub type ClientConnection = connection::Connection<ServerBoundPacket, ClientBoundPacket>;
pub type ServerConnection = connection::Connection<ClientBoundPacket, ServerBoundPacket>;
