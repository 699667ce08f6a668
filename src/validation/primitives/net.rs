//! Ports, IPv4 addresses, CIDR blocks, Unix socket paths and `host:port`
//! proxy addresses.

use std::net::IpAddr;

use super::dns::{validate_fqdn, validate_wildcard_domain};
use crate::validation::report::{append_errors, Outcome, Violation};

/// Prefix marking a service-entry endpoint as a Unix domain socket.
pub const UNIX_ADDRESS_PREFIX: &str = "unix://";

/// Validate a network port number: `1..=65535`.
pub fn validate_port(port: i64) -> Outcome {
    if (1..=65535).contains(&port) {
        Ok(())
    } else {
        Violation::range(format!("port number {} must be in the range 1..65535", port)).fail()
    }
}

/// Validate a dot-decimal IPv4 address.
pub fn validate_ipv4_address(addr: &str) -> Outcome {
    match addr.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => Ok(()),
        Ok(IpAddr::V6(_)) => {
            Violation::format(format!("{} is not a valid IPv4 address", addr)).fail()
        }
        Err(_) => Violation::format(format!("{} is not a valid IP", addr)).fail(),
    }
}

/// Validate an IPv4 block in CIDR notation (`a.b.c.d/xx`).
pub fn validate_cidr(cidr: &str) -> Outcome {
    let invalid = || Violation::format(format!("{} is not a valid CIDR block", cidr)).fail();

    let Some((ip, prefix)) = cidr.split_once('/') else {
        return invalid();
    };
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return invalid();
    }
    let Ok(prefix) = prefix.parse::<u32>() else {
        return invalid();
    };
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) if prefix <= 32 => Ok(()),
        Ok(IpAddr::V6(_)) if prefix <= 128 => {
            Violation::format(format!("{} is not a valid IPv4 address", cidr)).fail()
        }
        _ => invalid(),
    }
}

/// Validate an IPv4 subnet: CIDR notation when the value contains exactly one
/// `/`, a plain address otherwise.
pub fn validate_ipv4_subnet(subnet: &str) -> Outcome {
    if subnet.matches('/').count() == 1 {
        validate_cidr(subnet)
    } else {
        validate_ipv4_address(subnet)
    }
}

/// Validate a host that is either a wildcard domain or an IPv4 subnet.
///
/// When neither form matches, both failures are reported.
pub fn validate_host_or_subnet(host: &str) -> Outcome {
    match validate_wildcard_domain(host) {
        Ok(()) => Ok(()),
        Err(domain_errors) => match validate_ipv4_subnet(host) {
            Ok(()) => Ok(()),
            Err(subnet_errors) => append_errors([Err(domain_errors), Err(subnet_errors)]),
        },
    }
}

/// Validate a Unix domain socket path. Paths always use forward slashes,
/// whatever the host platform.
pub fn validate_unix_address(addr: &str) -> Outcome {
    if addr.is_empty() {
        return Violation::required("unix address must not be empty").fail();
    }
    if !addr.starts_with('/') {
        return Violation::format(format!("{} is not an absolute path", addr)).fail();
    }
    Ok(())
}

fn split_host_port(addr: &str) -> Result<(&str, &str), &'static str> {
    if let Some(bracketed) = addr.strip_prefix('[') {
        let (host, rest) = bracketed.split_once(']').ok_or("missing ']' in address")?;
        let port = match rest.strip_prefix(':') {
            Some(port) => port,
            None if rest.is_empty() => return Err("missing port in address"),
            None => return Err("unexpected text after ']' in address"),
        };
        return Ok((host, port));
    }
    let (host, port) = addr.rsplit_once(':').ok_or("missing port in address")?;
    if host.contains(':') {
        return Err("too many colons in address");
    }
    Ok((host, port))
}

/// Validate a `host:port` proxy address. The port must be numeric and in
/// range; the host must be a domain name or an IP address.
pub fn validate_proxy_address(host_addr: &str) -> Outcome {
    let (host, port) = match split_host_port(host_addr) {
        Ok(parts) => parts,
        Err(reason) => {
            return Violation::format(format!("unable to split {:?}: {}", host_addr, reason)).fail()
        }
    };
    let port = match port.parse::<i64>() {
        Ok(port) => port,
        Err(e) => {
            return Violation::format(format!("port ({}) is not a number: {}", port, e)).fail()
        }
    };
    validate_port(port)?;
    if validate_fqdn(host).is_err() && host.parse::<IpAddr>().is_err() {
        return Violation::format(format!(
            "{:?} is not a valid hostname or an IP address",
            host
        ))
        .fail();
    }
    Ok(())
}
