use log;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

mod error;
pub mod socks4;

pub use self::error::{Error, Result};

#[derive(Debug)]
pub struct ExecuteConfig {
    listen_address: SocketAddr,
    firewall_file: Option<PathBuf>,
}

impl ExecuteConfig {
    pub fn new(listen_ip: IpAddr, listen_port: u16, firewall_file: Option<PathBuf>) -> Self {
        Self {
            listen_address: SocketAddr::new(listen_ip, listen_port),
            firewall_file,
        }
    }
}

pub struct Server {
    listener: TcpListener,
    proxy: Arc<socks4::Socks4Proxy>,
}

impl Server {
    pub async fn bind(cfg: ExecuteConfig) -> Result<Self> {
        log::info!("Starting SOCKS4 proxy on \"{}\"", cfg.listen_address);
        let listener = TcpListener::bind(cfg.listen_address).await?;
        Ok(Server {
            listener,
            proxy: Arc::new(socks4::Socks4Proxy::new(cfg.firewall_file)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop. Every connection gets its own task and owns its sockets;
    /// no session outcome stops the loop or touches another session.
    pub async fn serve(self) -> Result<()> {
        log::debug!("Waiting for connections");
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    log::debug!("Accepted connection from \"{}\"", peer);
                    let proxy = Arc::clone(&self.proxy);
                    tokio::spawn(async move {
                        if let Err(e) = proxy.accept_stream(stream).await {
                            log::error!("Error during connection handling: {:?}", e);
                        }
                    });
                }
                Err(error) => {
                    log::error!("Could not accept connection: {:?}", error);
                }
            }
        }
    }
}

pub async fn run(cfg: ExecuteConfig) -> Result<()> {
    Server::bind(cfg).await?.serve().await
}
