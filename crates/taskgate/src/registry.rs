//! Static worker registry handed to the coordinator at construction.

use std::collections::HashSet;
use std::str::FromStr;

use reqwest::Url;
use serde::Serialize;

use crate::error::{Error, Result};

pub const DEFAULT_DOMAIN: &str = "service.consul";
pub const DEFAULT_SERVICE_PORT: u16 = 8080;

/// How service names are turned into base URLs.
///
/// A name resolves to `http://{name}.{domain}:{port}`. An empty domain uses
/// the name as the host verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAddress {
    pub domain: String,
    pub port: u16,
}

impl ServiceAddress {
    pub fn new(domain: impl Into<String>, port: u16) -> Self {
        Self {
            domain: domain.into(),
            port,
        }
    }

    pub fn base_url(&self, name: &str) -> String {
        let domain = self.domain.trim_matches('.');
        if domain.is_empty() {
            format!("http://{}:{}", name, self.port)
        } else {
            format!("http://{}.{}:{}", name, domain, self.port)
        }
    }
}

impl Default for ServiceAddress {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAIN, DEFAULT_SERVICE_PORT)
    }
}

/// One worker as written in configuration: either a bare service name or
/// `name=base-url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSpec {
    pub id: String,
    pub base_url: Option<String>,
}

impl FromStr for WorkerSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || Error::InvalidWorkerSpec(s.to_string());

        let (id, base_url) = match s.split_once('=') {
            Some((id, url)) => {
                let url = url.trim().trim_end_matches('/');
                if !is_http_base_url(url) {
                    return Err(invalid());
                }
                (id.trim(), Some(url.to_string()))
            }
            None => (s, None),
        };

        if !is_service_name(id) {
            return Err(invalid());
        }

        Ok(Self {
            id: id.to_string(),
            base_url,
        })
    }
}

/// Host-name characters only, so a bare id can be placed in a URL.
fn is_service_name(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
        && !id.starts_with('.')
        && !id.ends_with('.')
}

fn is_http_base_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerEndpoint {
    pub id: String,
    pub base_url: String,
}

impl WorkerEndpoint {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
        }
    }

    pub fn process_url(&self) -> String {
        format!("{}/process", self.base_url)
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }
}

/// Immutable set of workers addressed by one dispatch cycle.
///
/// Ids are unique and the set is never empty.
#[derive(Debug, Clone)]
pub struct WorkerRegistry {
    workers: Vec<WorkerEndpoint>,
}

impl WorkerRegistry {
    pub fn new(workers: Vec<WorkerEndpoint>) -> Result<Self> {
        if workers.is_empty() {
            return Err(Error::NoWorkers);
        }

        let mut seen = HashSet::with_capacity(workers.len());
        for worker in &workers {
            if !seen.insert(worker.id.as_str()) {
                return Err(Error::DuplicateWorker(worker.id.clone()));
            }
        }

        Ok(Self { workers })
    }

    pub fn from_specs(specs: Vec<WorkerSpec>, address: &ServiceAddress) -> Result<Self> {
        let workers = specs
            .into_iter()
            .map(|spec| {
                let base_url = spec.base_url.unwrap_or_else(|| address.base_url(&spec.id));
                WorkerEndpoint::new(spec.id, base_url)
            })
            .collect();

        Self::new(workers)
    }

    /// Parse a comma separated list such as `research-agent,code=http://10.0.0.2:8080`.
    /// Blank entries are skipped.
    pub fn parse(list: &str, address: &ServiceAddress) -> Result<Self> {
        let specs = list
            .split(',')
            .filter(|entry| !entry.trim().is_empty())
            .map(WorkerSpec::from_str)
            .collect::<Result<Vec<_>>>()?;

        Self::from_specs(specs, address)
    }

    pub fn get(&self, id: &str) -> Option<&WorkerEndpoint> {
        self.workers.iter().find(|worker| worker.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.workers.iter().map(|worker| worker.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkerEndpoint> {
        self.workers.iter()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Always `false`: [`WorkerRegistry::new`] rejects an empty worker list.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
