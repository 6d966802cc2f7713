mod error;
mod firewall;
mod relay;
mod result;
mod types;
mod utils;
mod wire;

pub use error::Error;
pub use firewall::Firewall;
pub use result::Result;
pub use types::SocksCmd;
pub use wire::{encode_request, SocksReply, SocksRequest};

use log;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpSocket, TcpStream};

// The trailing user-id field never exceeds one read of this size in practice
const USERID_BUFFER_SIZE: usize = 255;

pub struct Socks4Proxy {
    firewall: Firewall,
}

impl Socks4Proxy {
    pub fn new(firewall_file: Option<PathBuf>) -> Self {
        Socks4Proxy {
            firewall: Firewall::new(firewall_file),
        }
    }

    pub async fn accept_stream(&self, mut stream: TcpStream) -> Result<()> {
        let client_name = stream.peer_addr()?.to_string();

        // Handshake failures close the client socket by dropping it. The only
        // reply a failed handshake produces is the firewall rejection frame,
        // sent before FirewallRejected is returned.
        let mut target = handshake_socks4(&mut stream, &self.firewall).await?;
        let target_name = target.peer_addr()?.to_string();

        log::info!(
            "Start bidirectional communication between \"{}\" and \"{}\"",
            client_name,
            target_name
        );

        relay::run(&mut stream, &mut target).await?;

        log::info!(
            "End communication between \"{}\" and \"{}\"",
            client_name,
            target_name
        );
        Ok(())
    }
}

/// Initiate SOCKS handshake communication. The provided `stream` will be
/// advanced to read and send protocol details. See more about
/// [protocol specification](https://www.openssh.com/txt/socks4.protocol)
async fn handshake_socks4(stream: &mut TcpStream, firewall: &Firewall) -> Result<TcpStream> {
    log::info!("Start SOCKS4 handshake");

    let mut header = [0u8; wire::REQUEST_HEADER_SIZE];
    stream.read_exact(&mut header).await?;
    let request = wire::decode_request(&header)?;

    log::trace!("Got request: {:?}", request);

    // Drain the null-terminated user-id field with a single read. The field
    // is ignored and is not required to be fully consumed before the request
    // is acted on.
    let mut tail = [0u8; USERID_BUFFER_SIZE];
    let length = stream.read(&mut tail).await?;
    log::trace!("Ignoring {} byte user-id field", length);

    let source = stream.peer_addr()?;
    let permitted = firewall.evaluate(request.command, request.address);
    log::info!(
        "<S_IP>: {} <S_PORT>: {} <D_IP>: {} <D_PORT>: {} <COMMAND>: {} <Reply>: {}",
        source.ip(),
        source.port(),
        request.address,
        request.port,
        request.command.name(),
        if permitted { "Accept" } else { "Reject" },
    );

    if !permitted {
        utils::send_reply(stream, &SocksReply::rejected()).await?;
        return Err(Error::FirewallRejected);
    }

    match request.command {
        SocksCmd::CONNECT => connect_target(stream, &request).await,
        SocksCmd::BIND => bind_target(stream, &request).await,
    }
}

/// CONNECT: open the outbound connection, then reply with its local-facing
/// endpoint. A connect failure closes the client side without a reply.
async fn connect_target(stream: &mut TcpStream, request: &SocksRequest) -> Result<TcpStream> {
    log::info!(
        "Connecting to target \"{}:{}\"",
        request.address,
        request.port
    );
    let target =
        TcpStream::connect(SocketAddr::new(IpAddr::V4(request.address), request.port)).await?;

    let local = local_v4_addr(&target)?;
    utils::send_reply(stream, &SocksReply::granted(local)).await?;

    log::info!("Successful SOCKS4 handshake");
    Ok(target)
}

/// BIND: listen on an OS-assigned port, reply once with the bound endpoint,
/// then wait for exactly one inbound peer. The listener is dropped as soon as
/// the peer is accepted, so a second peer is refused.
async fn bind_target(stream: &mut TcpStream, request: &SocksRequest) -> Result<TcpStream> {
    let listener = bind_ephemeral_listener()?;
    let bound = match listener.local_addr()? {
        SocketAddr::V4(addr) => addr,
        SocketAddr::V6(_) => return Err(Error::SocksBadProtocol),
    };

    log::info!("Listening for bind peer on \"{}\"", bound);
    utils::send_reply(stream, &SocksReply::granted(bound)).await?;

    let (peer, peer_addr) = listener.accept().await?;
    log::info!(
        "Accepted bind peer \"{}\" for requested target \"{}:{}\"",
        peer_addr,
        request.address,
        request.port
    );

    log::info!("Successful SOCKS4 handshake");
    Ok(peer)
}

fn bind_ephemeral_listener() -> Result<TcpListener> {
    let socket = TcpSocket::new_v4()?;
    socket.set_reuseaddr(true)?;
    socket.bind(SocketAddr::new(
        IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        0,
    ))?;
    Ok(socket.listen(1)?)
}

fn local_v4_addr(stream: &TcpStream) -> Result<SocketAddrV4> {
    match stream.local_addr()? {
        SocketAddr::V4(addr) => Ok(addr),
        SocketAddr::V6(_) => Err(Error::SocksBadProtocol),
    }
}
