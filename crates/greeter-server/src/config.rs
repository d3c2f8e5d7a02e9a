//! Command line / environment configuration

use clap::Parser;

/// Greeter - a minimal MCP server with one tool, one prompt and one resource
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "greeter")]
#[command(version)]
#[command(about = "Greeter - a minimal MCP server with one tool, one prompt and one resource")]
pub struct ServerConfig {
    /// Serve streamable HTTP at this address (empty to disable)
    #[arg(long = "http", env = "GREETER_HTTP_ADDR", default_value = "localhost:3001")]
    pub http_addr: String,

    /// Serve SSE at this address (empty to disable)
    #[arg(long = "sse", env = "GREETER_SSE_ADDR", default_value = "localhost:3002")]
    pub sse_addr: String,

    /// Use stdin/stdout instead of the HTTP and SSE transports
    #[arg(long, env = "GREETER_STDIO")]
    pub stdio: bool,
}

impl ServerConfig {
    /// Resolve the flags into the transports to start
    pub fn transport_plan(&self) -> TransportPlan {
        if self.stdio {
            return TransportPlan::Stdio;
        }

        TransportPlan::Network {
            http: non_empty(&self.http_addr),
            sse: non_empty(&self.sse_addr),
        }
    }
}

fn non_empty(addr: &str) -> Option<String> {
    let addr = addr.trim();
    (!addr.is_empty()).then(|| addr.to_string())
}

/// Which transports the server runs, decided once at startup
///
/// stdio is single-client and takes over the process; the two network
/// transports can run side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportPlan {
    Stdio,
    Network {
        http: Option<String>,
        sse: Option<String>,
    },
}

impl TransportPlan {
    /// Addresses that will be bound, tagged with the transport serving them
    pub fn listeners(&self) -> Vec<(NetworkMode, &str)> {
        match self {
            TransportPlan::Stdio => Vec::new(),
            TransportPlan::Network { http, sse } => {
                let mut listeners = Vec::new();
                if let Some(addr) = http {
                    listeners.push((NetworkMode::Http, addr.as_str()));
                }
                if let Some(addr) = sse {
                    listeners.push((NetworkMode::Sse, addr.as_str()));
                }
                listeners
            }
        }
    }
}

/// A single delivery mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportMode {
    Stdio,
    Http,
    Sse,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Stdio => "stdio",
            TransportMode::Http => "HTTP",
            TransportMode::Sse => "SSE",
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transport that binds a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkMode {
    Http,
    Sse,
}

impl NetworkMode {
    pub fn as_str(&self) -> &'static str {
        TransportMode::from(*self).as_str()
    }
}

impl From<NetworkMode> for TransportMode {
    fn from(mode: NetworkMode) -> Self {
        match mode {
            NetworkMode::Http => TransportMode::Http,
            NetworkMode::Sse => TransportMode::Sse,
        }
    }
}

impl std::fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerConfig {
        let mut argv = vec!["greeter"];
        argv.extend_from_slice(args);
        ServerConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.http_addr, "localhost:3001");
        assert_eq!(config.sse_addr, "localhost:3002");
        assert!(!config.stdio);
        assert_eq!(
            config.transport_plan(),
            TransportPlan::Network {
                http: Some("localhost:3001".to_string()),
                sse: Some("localhost:3002".to_string()),
            }
        );
    }

    #[test]
    fn test_stdio_wins() {
        let config = parse(&["--stdio", "--http", "127.0.0.1:9000"]);
        let plan = config.transport_plan();
        assert_eq!(plan, TransportPlan::Stdio);
        assert!(plan.listeners().is_empty());
    }

    #[test]
    fn test_empty_address_disables_listener() {
        let config = parse(&["--http", "", "--sse", "127.0.0.1:9001"]);
        let plan = config.transport_plan();
        assert_eq!(
            plan.listeners(),
            vec![(NetworkMode::Sse, "127.0.0.1:9001")]
        );
    }

    #[test]
    fn test_network_mode_names() {
        assert_eq!(TransportMode::from(NetworkMode::Http), TransportMode::Http);
        assert_eq!(NetworkMode::Sse.as_str(), "SSE");
        assert_eq!(NetworkMode::Http.to_string(), "HTTP");
    }

    #[test]
    fn test_both_addresses_empty() {
        let config = parse(&["--http=", "--sse="]);
        assert!(config.transport_plan().listeners().is_empty());
    }
}
