// Linux-specific helpers: /proc/cpuinfo, /etc/os-release, interface naming.

/// Read first "model name" from /proc/cpuinfo (Linux). Prefer over sysinfo when it returns "cpu0" etc.
pub(super) fn read_cpu_model_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        for line in content.lines() {
            if line.starts_with("model name") {
                let name = line
                    .find(": ")
                    .map(|i| line[i + 2..].trim())
                    .filter(|s| !s.is_empty() && *s != "cpu0")?;
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Distro name and release (`NAME`, `VERSION_ID`) from /etc/os-release (Linux).
pub(super) fn read_os_release_linux() -> Option<(String, String)> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/etc/os-release").ok()?;
        parse_os_release(&content)
    }
    #[cfg(not(target_os = "linux"))]
    None
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_os_release(content: &str) -> Option<(String, String)> {
    let field = |key: &str| {
        content
            .lines()
            .find_map(|line| line.strip_prefix(key)?.strip_prefix('='))
            .map(|v| v.trim().trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
    };
    let name = field("NAME")?;
    Some((name, field("VERSION_ID").unwrap_or_default()))
}

/// Map a CPUID vendor string to the manufacturer name.
pub(super) fn vendor_name(vendor_id: &str) -> String {
    match vendor_id.trim() {
        "GenuineIntel" => "Intel".into(),
        "AuthenticAMD" => "AMD".into(),
        other => other.to_string(),
    }
}

/// Loopback, container and bridge interfaces. Their traffic is also seen on the physical NIC.
pub(super) fn is_virtual(interface_name: &str) -> bool {
    match interface_name {
        "lo" | "Loopback" => true,
        name => {
            name.starts_with("lo0")
                || name.starts_with("docker")
                || name.starts_with("veth")
                || name.starts_with("br-")
                || name.starts_with("virbr")
        }
    }
}

/// Interface carrying the default route, from /proc/net/route (Linux).
pub(super) fn read_default_route_interface_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/net/route").ok()?;
        parse_default_route(&content)
    }
    #[cfg(not(target_os = "linux"))]
    None
}

const RTF_UP: u32 = 0x1;

/// Lowest-metric route with destination 0.0.0.0 that is up.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_default_route(content: &str) -> Option<String> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            let (iface, destination, flags, metric) =
                (cols.first()?, cols.get(1)?, cols.get(3)?, cols.get(6)?);
            let flags = u32::from_str_radix(flags, 16).ok()?;
            if *destination != "00000000" || flags & RTF_UP == 0 {
                return None;
            }
            Some((metric.parse::<u32>().unwrap_or(u32::MAX), iface.to_string()))
        })
        .min_by_key(|(metric, _)| *metric)
        .map(|(_, iface)| iface)
}
