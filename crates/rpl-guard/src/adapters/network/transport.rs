use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV6, UdpSocket};
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{Channel, ChannelPorts, PeerAddr};
use crate::ports::{DatagramTransport, TransportError};

/// Largest datagram we hand to the kernel (IPv6 minimum MTU minus headers).
pub const MAX_DATAGRAM_LEN: usize = 1232;

/// Link-local "all RPL nodes" multicast group.
const ALL_RPL_NODES: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 0x1a);

/// Where and how to open the channel sockets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportSettings {
    /// Local address every channel socket binds to
    pub bind: IpAddr,
    /// Destination of multicast advertisements.
    ///
    /// When this is not a multicast address no group is joined and
    /// "multicast" sends go to this single address instead.
    pub group: IpAddr,
    /// Interface index used to join the group and as IPv6 scope id
    pub interface: u32,
    /// Port per channel
    pub ports: ChannelPorts,
}

impl TransportSettings {
    /// Wildcard IPv6 bind, all-RPL-nodes group, default interface.
    pub fn new(ports: ChannelPorts) -> Self {
        Self {
            bind: IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            group: IpAddr::V6(ALL_RPL_NODES),
            interface: 0,
            ports,
        }
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self::new(ChannelPorts::default())
    }
}

/// UDP transport with one non-blocking socket per channel.
///
/// Datagrams for a channel leave from that channel's socket, so replies
/// arrive back on the same port. Only the advertisement socket joins the
/// multicast group.
///
/// The sockets are shared handles; [`socket`](Self::socket) lets the host
/// register them with its own reactor for receiving.
#[derive(Debug, Clone)]
pub struct UdpDatagramTransport {
    advertisement: Arc<UdpSocket>,
    auth: Arc<UdpSocket>,
    data: Arc<UdpSocket>,
    settings: TransportSettings,
}

impl UdpDatagramTransport {
    /// Bind the three channel sockets and join the multicast group.
    ///
    /// # Errors
    ///
    /// Returns error if any bind or group join fails.
    pub fn bind(settings: TransportSettings) -> io::Result<Self> {
        let open = |channel: Channel| -> io::Result<Arc<UdpSocket>> {
            let socket =
                UdpSocket::bind(SocketAddr::new(settings.bind, settings.ports.port(channel)))?;
            socket.set_nonblocking(true)?;
            Ok(Arc::new(socket))
        };

        let transport = Self {
            advertisement: open(Channel::Advertisement)?,
            auth: open(Channel::Auth)?,
            data: open(Channel::Data)?,
            settings,
        };
        transport.join_group()?;

        info!(
            bind = %settings.bind,
            group = %settings.group,
            advertisement = settings.ports.advertisement,
            auth = settings.ports.auth,
            data = settings.ports.data,
            "UDP transport bound"
        );
        Ok(transport)
    }

    fn join_group(&self) -> io::Result<()> {
        match self.settings.group {
            IpAddr::V6(group) if group.is_multicast() => self
                .advertisement
                .join_multicast_v6(&group, self.settings.interface),
            IpAddr::V4(group) if group.is_multicast() => {
                let interface = match self.settings.bind {
                    IpAddr::V4(local) => local,
                    IpAddr::V6(_) => Ipv4Addr::UNSPECIFIED,
                };
                self.advertisement.join_multicast_v4(&group, &interface)
            }
            group => {
                debug!(%group, "Not a multicast group, advertisements are unicast");
                Ok(())
            }
        }
    }

    /// Socket used for `channel`.
    pub fn socket(&self, channel: Channel) -> &UdpSocket {
        match channel {
            Channel::Advertisement => self.advertisement.as_ref(),
            Channel::Auth => self.auth.as_ref(),
            Channel::Data => self.data.as_ref(),
        }
    }

    /// Independent handle on the socket used for `channel`, for receiving.
    ///
    /// # Errors
    ///
    /// Returns error if the descriptor cannot be duplicated.
    pub fn try_clone_socket(&self, channel: Channel) -> io::Result<UdpSocket> {
        self.socket(channel).try_clone()
    }

    /// Local address of the socket used for `channel`.
    pub fn local_addr(&self, channel: Channel) -> io::Result<SocketAddr> {
        self.socket(channel).local_addr()
    }

    /// Settings the transport was bound with.
    pub fn settings(&self) -> TransportSettings {
        self.settings
    }

    fn destination(&self, to: PeerAddr, channel: Channel) -> SocketAddr {
        let port = self.settings.ports.port(channel);
        match to {
            IpAddr::V6(addr) if needs_scope(&addr) => {
                SocketAddr::V6(SocketAddrV6::new(addr, port, 0, self.settings.interface))
            }
            addr => SocketAddr::new(addr, port),
        }
    }

    fn send(&self, to: PeerAddr, channel: Channel, payload: &[u8]) -> Result<(), TransportError> {
        if payload.len() > MAX_DATAGRAM_LEN {
            return Err(TransportError::MessageTooLarge {
                size: payload.len(),
                max: MAX_DATAGRAM_LEN,
            });
        }

        let target = self.destination(to, channel);
        match self.socket(channel).send_to(payload, target) {
            Ok(_) => Ok(()),
            Err(e) => Err(match e.kind() {
                io::ErrorKind::WouldBlock => TransportError::WouldBlock,
                io::ErrorKind::InvalidInput | io::ErrorKind::AddrNotAvailable => {
                    TransportError::InvalidAddress(target.to_string())
                }
                _ => TransportError::Io(e.to_string()),
            }),
        }
    }
}

/// Link-local unicast and multicast destinations must carry an interface.
fn needs_scope(addr: &Ipv6Addr) -> bool {
    (addr.segments()[0] & 0xffc0) == 0xfe80 || addr.is_multicast()
}

impl DatagramTransport for UdpDatagramTransport {
    fn multicast(&mut self, channel: Channel, payload: &[u8]) -> Result<(), TransportError> {
        self.send(self.settings.group, channel, payload)
    }

    fn unicast(
        &mut self,
        to: PeerAddr,
        channel: Channel,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        self.send(to, channel, payload)
    }
}
