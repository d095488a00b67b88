/*!
HTTP transport construction.

build_client(ca_file) -> reqwest::Client

Trust store:
  1. platform roots (rustls-native-certs); load errors only warn, the store
     may end up partial or empty
  2. optional PEM bundle appended on top; failing to READ it is fatal,
     unparsable entries inside it are skipped

No client certificate, no pinning, no request timeout: the remote command
timeout is enforced by the agents, not by this client.
*/

use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::RootCertStore;
use rustls::pki_types::CertificateDer;
use tracing::{debug, warn};

use super::error::TransportError;

/// Root certificates used to verify the Sensu API.
#[derive(Debug)]
pub struct TrustStore {
    pub roots: RootCertStore,
    /// Anchors taken from the platform store.
    pub system: usize,
    /// Anchors appended from the trusted CA file.
    pub supplementary: usize,
}

impl TrustStore {
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Platform roots, best effort.
fn system_roots() -> (RootCertStore, usize) {
    let mut roots = RootCertStore::empty();
    let loaded = rustls_native_certs::load_native_certs();
    for e in &loaded.errors {
        warn!("failed to load system cert pool: {e}");
    }
    let (added, ignored) = roots.add_parsable_certificates(loaded.certs);
    if ignored > 0 {
        debug!("ignored {ignored} unparsable system certificates");
    }
    (roots, added)
}

/// Append every parsable PEM certificate in `pem`; returns how many were added.
pub fn append_pem(roots: &mut RootCertStore, pem: &[u8]) -> usize {
    let mut reader = BufReader::new(pem);
    let mut certs: Vec<CertificateDer<'static>> = Vec::new();
    for item in rustls_pemfile::certs(&mut reader) {
        match item {
            Ok(c) => certs.push(c),
            Err(e) => warn!("skipping malformed PEM block: {e}"),
        }
    }
    let (added, ignored) = roots.add_parsable_certificates(certs);
    if ignored > 0 {
        warn!("skipped {ignored} certificates that could not be used as trust anchors");
    }
    added
}

pub fn load_trust_store(ca_file: Option<&Path>) -> Result<TrustStore, TransportError> {
    let (mut roots, system) = system_roots();

    let mut supplementary = 0;
    if let Some(path) = ca_file {
        let pem = std::fs::read(path).map_err(|source| TransportError::CaFile {
            path: path.to_path_buf(),
            source,
        })?;
        supplementary = append_pem(&mut roots, &pem);
        if supplementary == 0 {
            warn!("no certificates found in CA file {}", path.display());
        }
    }

    Ok(TrustStore {
        roots,
        system,
        supplementary,
    })
}

/// Build a TLS-verifying client from an already assembled trust store.
pub fn client_from_store(store: TrustStore) -> Result<reqwest::Client, TransportError> {
    if store.is_empty() {
        warn!("trust store is empty; TLS connections will fail verification");
    }
    debug!(
        anchors = store.len(),
        system = store.system,
        supplementary = store.supplementary,
        "trust store ready"
    );
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let tls = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_root_certificates(store.roots)
        .with_no_client_auth();

    reqwest::Client::builder()
        .use_preconfigured_tls(tls)
        .build()
        .map_err(TransportError::Client)
}

pub fn build_client(ca_file: Option<&Path>) -> Result<reqwest::Client, TransportError> {
    client_from_store(load_trust_store(ca_file)?)
}
