//! Transport selection by port convention.

/// Conventional SMTPS port.
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// How a send reaches the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStrategy {
    /// TLS from the first byte, then the SMTP exchange.
    ImplicitTls,
    /// Plain connection upgraded with STARTTLS when offered, falling back to
    /// [`TransportStrategy::ImplicitTls`] on any failure.
    Opportunistic,
}

/// Port 465 selects implicit TLS, every other port the opportunistic path.
pub fn select_strategy(port: u16) -> TransportStrategy {
    if port == IMPLICIT_TLS_PORT {
        TransportStrategy::ImplicitTls
    } else {
        TransportStrategy::Opportunistic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_465_is_implicit_tls() {
        assert_eq!(select_strategy(465), TransportStrategy::ImplicitTls);
    }

    #[test]
    fn test_other_ports_are_opportunistic() {
        for port in [25, 587, 2525, 1025, 0, 464, 466, u16::MAX] {
            assert_eq!(select_strategy(port), TransportStrategy::Opportunistic, "port {port}");
        }
    }
}
