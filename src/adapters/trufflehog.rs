//! Host extraction from a detectors source tree.
//!
//! Every subdirectory of the root is one detector. Its verification hosts are
//! taken from string literals in the non-test Go sources whose whole value is
//! an `http(s)://` URL. Comments and URLs embedded in larger strings are not
//! hosts. Only hosts are read; nothing else from the tree ends up in the export.

use crate::adapters::go_literals::string_literals;
use crate::core::keyword::keyword_from_detector_name;
use crate::domain::model::HostEntity;
use crate::utils::error::{ExportError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::net::{IpAddr, Ipv6Addr};
use std::path::{Path, PathBuf};
use url::Url;

static VERSION_DIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v(\d+)$").expect("version dir pattern"));

static VALID_HOST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9\-]*[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9\-]*[a-zA-Z0-9])?)*$",
    )
    .expect("valid host pattern")
});

const INTERNAL_SUFFIXES: &[&str] = &[
    ".local",
    ".localdomain",
    ".internal",
    ".lan",
    ".home",
    ".svc",
    ".cluster.local",
    ".svc.cluster.local",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct HostExtractOptions {
    /// Keep public IP literals. Non-routable ranges are dropped regardless.
    pub allow_ip_hosts: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HostExtraction {
    pub entities: Vec<HostEntity>,
    /// `"<detector>: <reason>"` for detectors that could not be read.
    pub skipped: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn extract_host_entities(root: &Path, options: &HostExtractOptions) -> Result<HostExtraction> {
    let entries = fs::read_dir(root).map_err(|e| ExportError::HostExtractionError {
        message: format!("{}: {}", root.display(), e),
    })?;

    let mut extraction = HostExtraction::default();

    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let dir_name = entry.file_name().to_string_lossy().into_owned();
        let scan_dir = match choose_highest_version_dir(&entry.path()) {
            Ok(dir) => dir,
            Err(e) => {
                extraction.skipped.push(format!("{}: {}", dir_name, e));
                continue;
            }
        };

        let hosts = match extract_hosts_from_sources(&scan_dir, options, &mut extraction.warnings) {
            Ok(hosts) => hosts,
            Err(e) => {
                extraction.skipped.push(format!("{}: {}", dir_name, e));
                continue;
            }
        };
        if hosts.is_empty() {
            continue;
        }

        tracing::debug!("{}: {} hosts", dir_name, hosts.len());
        extraction.entities.push(HostEntity {
            keyword: keyword_from_detector_name(&dir_name),
            source_name: dir_name,
            hosts,
        });
    }

    extraction
        .entities
        .sort_by(|a, b| a.source_name.cmp(&b.source_name));
    extraction.skipped.sort();

    Ok(extraction)
}

/// Detectors are often versioned as `<service>/v1`, `<service>/v2`, ...; only
/// the newest version is scanned.
fn choose_highest_version_dir(detector_dir: &Path) -> io::Result<PathBuf> {
    let mut best: Option<(u32, PathBuf)> = None;

    for entry in fs::read_dir(detector_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(version) = VERSION_DIR_RE
            .captures(&name.to_string_lossy())
            .and_then(|caps| caps[1].parse::<u32>().ok())
        else {
            continue;
        };
        if best.as_ref().map_or(true, |(current, _)| version > *current) {
            best = Some((version, entry.path()));
        }
    }

    Ok(best.map_or_else(|| detector_dir.to_path_buf(), |(_, dir)| dir))
}

fn extract_hosts_from_sources(
    dir: &Path,
    options: &HostExtractOptions,
    warnings: &mut Vec<String>,
) -> io::Result<Vec<String>> {
    let mut sources: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_scannable_source(path))
        .collect();
    sources.sort();

    let mut hosts = BTreeSet::new();
    for path in sources {
        let content = fs::read_to_string(&path)?;
        let literals = string_literals(&content).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("{}: {}", path.display(), e))
        })?;

        for literal in literals {
            let value = match literal.value {
                Ok(value) => value,
                Err(e) => {
                    warnings.push(format!(
                        "{}:{}: unquote string literal {}: {}",
                        path.display(),
                        literal.line,
                        literal.source,
                        e
                    ));
                    continue;
                }
            };
            if !value.starts_with("https://") && !value.starts_with("http://") {
                continue;
            }
            if is_noise_url(&value) {
                continue;
            }

            let parsed = match Url::parse(&value) {
                Ok(parsed) => parsed,
                // A bare scheme, usually the head of a concatenated URL.
                Err(url::ParseError::EmptyHost) => continue,
                Err(e) => {
                    warnings.push(format!(
                        "{}:{}: parse url {:?}: {}",
                        path.display(),
                        literal.line,
                        value,
                        e
                    ));
                    continue;
                }
            };
            let Some(host) = parsed.host_str() else {
                continue;
            };
            let host = host
                .trim_start_matches('[')
                .trim_end_matches(']')
                .to_lowercase();
            if !is_noise_host(&host, options.allow_ip_hosts) {
                hosts.insert(host);
            }
        }
    }

    Ok(hosts.into_iter().collect())
}

fn is_scannable_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go")
}

fn is_noise_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("howtorotate.com") || lower.contains("github.com/truffle")
}

pub fn is_noise_host(host: &str, allow_ip_hosts: bool) -> bool {
    let host = host.to_lowercase();
    if host.is_empty() || host == "localhost" {
        return true;
    }
    if host == "howtorotate.com" || host == "github.com" || host.ends_with("fsf.org") {
        return true;
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        if !allow_ip_hosts || is_non_routable(&ip) {
            return true;
        }
    }

    if INTERNAL_SUFFIXES.iter().any(|suffix| host.ends_with(suffix)) {
        return true;
    }

    // Regex fragments and other junk that slipped into a URL literal.
    if !VALID_HOST_RE.is_match(&host) {
        return true;
    }

    !host.contains('.')
}

fn is_non_routable(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_multicast()
        }
        IpAddr::V6(v6) => {
            v6.is_loopback() || v6.is_unspecified() || v6.is_multicast() || is_local_v6(v6)
        }
    }
}

/// Unique-local (fc00::/7) or link-local unicast (fe80::/10).
fn is_local_v6(ip: &Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
}
