use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;

use log::warn;

use super::Packet;

// A framed packet stream over TCP. Each well-formed packet is prefixed with
// two bytes holding the bincode payload size.
pub struct Connection<T: Packet, V: Packet> {
    tcp_stream: TcpStream,
    incoming_packets: VecDeque<T>,
    outgoing_packets: VecDeque<V>,
    closed: bool,
}

impl<T: Packet, V: Packet> Connection<T, V> {
    pub fn new(tcp_stream: TcpStream) -> Connection<T, V> {
        // disable the Nagle algorithm to allow for real-time transfers
        tcp_stream
            .set_nodelay(true)
            .expect("could not turn off TCP delay");
        Connection {
            tcp_stream,
            incoming_packets: VecDeque::new(),
            outgoing_packets: VecDeque::new(),
            closed: false,
        }
    }

    // true once the peer has gone away; a closed connection silently drops
    // all further traffic
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn set_nonblocking(&self) {
        self.tcp_stream
            .set_nonblocking(true)
            .expect("failed to set connection as non-blocking");
    }

    fn set_blocking(&self) {
        self.tcp_stream
            .set_nonblocking(false)
            .expect("failed to set connection back to blocking");
    }

    // fetch packets for this connection until exhausted
    pub fn fetch_incoming_packets(&mut self) {
        if self.closed {
            return;
        }
        loop {
            // allows us to keep going if there's no input
            self.set_nonblocking();

            // each well-formed packet starts with two bytes giving the size
            // of the incoming payload
            let mut buffer: [u8; 2] = [0, 0];
            let packet_size = match self.tcp_stream.read_exact(&mut buffer) {
                Ok(_) => ((buffer[0] as u16) << 8) | buffer[1] as u16,
                // this error just means there's no new data on this connection
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => break,
                // anything else means the peer went away mid-stream
                Err(e) => {
                    warn!("connection lost while polling packets: {:?}", e);
                    self.closed = true;
                    break;
                }
            };

            // we know the size now, so block until the whole payload is here
            self.set_blocking();
            let payload = &mut Read::by_ref(&mut self.tcp_stream).take(packet_size as u64);
            match T::parse_packet(payload) {
                Ok(packet) => self.incoming_packets.push_back(packet),
                Err(e) => {
                    warn!("dropping connection with undecodable packet: {:?}", e);
                    self.closed = true;
                    break;
                }
            }
        }
    }

    pub fn pop_incoming(&mut self) -> Option<T> {
        self.incoming_packets.pop_front()
    }

    pub fn push_outgoing(&mut self, packet: V) {
        self.outgoing_packets.push_back(packet);
    }

    // send packets on this connection until exhausted
    pub fn sync_outgoing(&mut self) {
        while let Some(packet) = self.outgoing_packets.pop_front() {
            if self.closed {
                // keep draining so the queue doesn't grow without bound
                continue;
            }
            let size = packet
                .packet_size()
                .expect("failed to get serialized packet size");
            if self
                .tcp_stream
                .write_all(&[(size >> 8) as u8, size as u8])
                .is_err()
                || packet.write_packet(&mut self.tcp_stream).is_err()
            {
                warn!("connection lost while sending packets");
                self.closed = true;
            }
        }
    }
}
