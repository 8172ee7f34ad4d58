use crate::config::ProxyDescriptor;
use crate::traits::{LogSink, Severity};
use std::fs;
use std::path::Path;

/// Reusable HTTP proxy connector bound to one descriptor.
///
/// Cheap to clone; every client built from it tunnels through the same proxy.
#[derive(Debug, Clone)]
pub struct ProxyAgent {
    descriptor: ProxyDescriptor,
    proxy: reqwest::Proxy,
}

impl ProxyAgent {
    pub fn descriptor(&self) -> &ProxyDescriptor {
        &self.descriptor
    }

    /// The connector to install on a `reqwest::ClientBuilder`.
    pub fn proxy(&self) -> reqwest::Proxy {
        self.proxy.clone()
    }
}

/// Ordered list of proxies, handed out to wallets round-robin by index.
#[derive(Debug, Clone, Default)]
pub struct ProxyRegistry {
    proxies: Vec<ProxyDescriptor>,
}

impl ProxyRegistry {
    pub fn new(proxies: Vec<ProxyDescriptor>) -> Self {
        Self { proxies }
    }

    /// Loads proxies from a line-oriented file.
    ///
    /// A missing file is not an error: the registry is empty and a warning is
    /// logged. Blank lines, `#` comments and unparseable lines are skipped.
    pub fn load(path: impl AsRef<Path>, sink: &(impl LogSink + ?Sized)) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            sink.emit(
                Severity::Warning,
                &format!(
                    "Proxy file {} not found. Proceeding without proxies.",
                    path.display()
                ),
            );
            return Self::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                sink.emit(
                    Severity::Error,
                    &format!("Error loading proxies from {}: {}", path.display(), e),
                );
                return Self::default();
            }
        };

        let registry = Self::from_lines(&content, sink);
        sink.emit(
            Severity::System,
            &format!(
                "Loaded {} proxies from {}",
                registry.len(),
                path.display()
            ),
        );
        registry
    }

    /// Parses an in-memory line source with the same rules as [`Self::load`].
    pub fn from_lines(content: &str, sink: &(impl LogSink + ?Sized)) -> Self {
        let mut proxies = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.parse::<ProxyDescriptor>() {
                Ok(p) => proxies.push(p),
                Err(e) => sink.emit(Severity::Warning, &format!("Skipping proxy: {}", e)),
            }
        }

        Self { proxies }
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn proxies(&self) -> &[ProxyDescriptor] {
        &self.proxies
    }

    /// Proxy for the wallet at `index`: `proxies[index % len]`, or `None`
    /// when no proxies are configured.
    pub fn assign(&self, index: usize) -> Option<&ProxyDescriptor> {
        if self.proxies.is_empty() {
            return None;
        }
        self.proxies.get(index % self.proxies.len())
    }

    /// Builds a connector for `descriptor`.
    ///
    /// No descriptor means no agent. A descriptor the HTTP stack rejects is
    /// logged and also yields no agent.
    pub fn build_agent(
        descriptor: Option<&ProxyDescriptor>,
        sink: &(impl LogSink + ?Sized),
    ) -> Option<ProxyAgent> {
        let descriptor = descriptor?;

        let proxy = match reqwest::Proxy::all(descriptor.base_url()) {
            Ok(p) => p,
            Err(e) => {
                sink.emit(
                    Severity::Warning,
                    &format!("Proxy {} rejected: {}", descriptor, e),
                );
                return None;
            }
        };
        let proxy = match &descriptor.credentials {
            Some(c) => proxy.basic_auth(&c.username, &c.password),
            None => proxy,
        };

        sink.emit(Severity::System, &format!("Using proxy: {}", descriptor));
        Some(ProxyAgent {
            descriptor: descriptor.clone(),
            proxy,
        })
    }
}
