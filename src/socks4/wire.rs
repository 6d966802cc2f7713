use crate::socks4::error::Error;
use crate::socks4::result::Result;
use crate::socks4::types::{self, SocksCmd};
use std::net::{Ipv4Addr, SocketAddrV4};

pub const REQUEST_HEADER_SIZE: usize = 8;
pub const REPLY_SIZE: usize = 8;

/// One SOCKS4 request frame, without the trailing user-id field. See
/// [protocol specification](https://www.openssh.com/txt/socks4.protocol)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocksRequest {
    pub command: SocksCmd,
    pub port: u16,
    pub address: Ipv4Addr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocksReply {
    pub code: u8,
    pub port: u16,
    pub address: Ipv4Addr,
}

impl SocksReply {
    pub fn granted(bound: SocketAddrV4) -> Self {
        SocksReply {
            code: types::GRANTED_CODE,
            port: bound.port(),
            address: *bound.ip(),
        }
    }

    pub fn rejected() -> Self {
        SocksReply {
            code: types::REJECTED_CODE,
            port: 0,
            address: Ipv4Addr::UNSPECIFIED,
        }
    }
}

/// Parses the fixed request header. The version byte is checked before any
/// other field is interpreted.
pub fn decode_request(header: &[u8; REQUEST_HEADER_SIZE]) -> Result<SocksRequest> {
    if header[0] != types::SOCKS4_VERSION {
        return Err(Error::SocksProtocolVersionNotSupported(header[0]));
    }
    let command = SocksCmd::try_from(header[1])?;
    let port = u16::from_be_bytes([header[2], header[3]]);
    let address = Ipv4Addr::new(header[4], header[5], header[6], header[7]);
    Ok(SocksRequest {
        command,
        port,
        address,
    })
}

/// Serializes the fixed request header. The null-terminated user-id field is
/// appended by the caller.
pub fn encode_request(request: &SocksRequest) -> [u8; REQUEST_HEADER_SIZE] {
    let mut frame = [0u8; REQUEST_HEADER_SIZE];
    frame[0] = types::SOCKS4_VERSION;
    frame[1] = request.command.value();
    frame[2..4].clone_from_slice(&request.port.to_be_bytes());
    frame[4..8].clone_from_slice(&request.address.octets());
    frame
}

pub fn encode_reply(reply: &SocksReply) -> [u8; REPLY_SIZE] {
    let mut frame = [0u8; REPLY_SIZE];
    frame[0] = 0;
    frame[1] = reply.code;
    frame[2..4].clone_from_slice(&reply.port.to_be_bytes());
    frame[4..8].clone_from_slice(&reply.address.octets());
    frame
}
