//! Web server command.

use console::style;

use crate::config::Settings;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings) -> anyhow::Result<()> {
    println!(
        "{} Starting streamrelay server at http://{}:{}",
        style("→").cyan(),
        settings.server.host,
        settings.server.port
    );
    println!(
        "  Uploads go to {} in bucket {}",
        style(&settings.store.endpoint).dim(),
        style(&settings.store.bucket).dim()
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings).await
}

/// Parse a bind address that can be:
/// - Just a port: "3030" -> <host>:3030
/// - Just a host: "127.0.0.1" -> 127.0.0.1:<port>
/// - Host and port: "127.0.0.1:3030" -> 127.0.0.1:3030
pub fn parse_bind_address(bind: &str, host: &str, port: u16) -> anyhow::Result<(String, u16)> {
    let bind = bind.trim();
    if bind.is_empty() {
        anyhow::bail!("Bind address is empty");
    }

    // Try parsing as just a port number
    if let Ok(port) = bind.parse::<u16>() {
        return Ok((host.to_string(), port));
    }

    // Try parsing as host:port
    if let Some((bind_host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((bind_host.to_string(), port));
        }
        if port_str.chars().all(|c| c.is_ascii_digit()) && !port_str.is_empty() {
            anyhow::bail!("Invalid port in bind address: {}", bind);
        }
    }

    // Must be just a host, use the configured port
    Ok((bind.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_only() {
        let (host, port) = parse_bind_address("3030", "0.0.0.0", 8080).unwrap();
        assert_eq!(host, "0.0.0.0");
        assert_eq!(port, 3030);
    }

    #[test]
    fn test_parse_host_only() {
        let (host, port) = parse_bind_address("127.0.0.1", "0.0.0.0", 8080).unwrap();
        assert_eq!(host, "127.0.0.1");
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_parse_host_and_port() {
        let (host, port) = parse_bind_address("127.0.0.1:9000", "0.0.0.0", 8080).unwrap();
        assert_eq!(host, "127.0.0.1");
        assert_eq!(port, 9000);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_bind_address("", "0.0.0.0", 8080).is_err());
        assert!(parse_bind_address("localhost:99999", "0.0.0.0", 8080).is_err());
    }
}
