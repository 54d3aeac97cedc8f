//! HTTP transport using `ureq`.

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use super::ModuleSource;
use super::archive_path;
use super::detail_path;
use super::INDEX_PATH;
use crate::KawaError;
use crate::Result;
use crate::TransportConfig;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::manifest::ManifestIndex;
use crate::manifest::ModuleDetail;
use crate::manifest::store::parse_detail;
use crate::manifest::store::parse_index;
use crate::types::ModuleName;

/// A [`ModuleSource`] backed by a module server.
///
/// Every request is a single synchronous call bounded by the configured
/// global timeout. There are no retries.
///
/// # Examples
///
/// ```no_run
/// use kawa_core::TransportConfig;
/// use kawa_core::client::HttpTransport;
/// use kawa_core::client::ModuleSource;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = HttpTransport::new(TransportConfig::default());
/// for module in transport.fetch_index()?.modules {
///     println!("{} {}", module.name, module.version);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpTransport {
    config: TransportConfig,
    agent: ureq::Agent,
}

impl HttpTransport {
    /// Builds a transport from `config`.
    #[must_use]
    pub fn new(config: TransportConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build();
        Self {
            config,
            agent: ureq::Agent::new_with_config(agent_config),
        }
    }

    /// Returns the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn get(&self, path: &str) -> Result<(String, ureq::http::Response<ureq::Body>)> {
        let url = self.config.url(path);
        debug!(%url, "GET");
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| map_ureq_error(&url, e))?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(KawaError::NotFound { url, status });
        }
        Ok((url, response))
    }

    fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let (url, response) = self.get(path)?;
        response
            .into_body()
            .read_to_vec()
            .map_err(|e| map_ureq_error(&url, e))
    }
}

impl ModuleSource for HttpTransport {
    fn fetch_index(&self) -> Result<ManifestIndex> {
        parse_index(&self.get_bytes(INDEX_PATH)?)
    }

    fn fetch_detail(&self, name: &ModuleName) -> Result<ModuleDetail> {
        parse_detail(&self.get_bytes(&detail_path(name))?)
    }

    fn download_archive(&self, name: &ModuleName, dest: &Path) -> Result<u64> {
        let (url, response) = self.get(&archive_path(name))?;
        let mut writer = BufWriter::new(File::create(dest)?);
        let mut reader = response.into_body().into_reader();
        let bytes = copy_with_buffer(&mut reader, &mut writer, &mut CopyBuffer::new()).map_err(|e| {
            KawaError::Transport {
                url: url.clone(),
                reason: e.to_string(),
            }
        })?;
        writer.flush()?;
        debug!(%url, bytes, dest = %dest.display(), "downloaded archive");
        Ok(bytes)
    }
}

/// Maps a `ureq` failure onto [`KawaError`].
fn map_ureq_error(url: &str, err: ureq::Error) -> KawaError {
    match err {
        ureq::Error::StatusCode(status) => KawaError::NotFound {
            url: url.to_owned(),
            status,
        },
        other => KawaError::Transport {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_are_not_found() {
        for status in [404, 403, 500] {
            let err = map_ureq_error("http://example.test/x", ureq::Error::StatusCode(status));
            assert!(matches!(err, KawaError::NotFound { status: s, .. } if s == status));
        }
    }

    #[test]
    fn test_other_errors_are_transport() {
        let err = map_ureq_error("http://example.test/x", ureq::Error::HostNotFound);
        assert!(matches!(err, KawaError::Transport { .. }));
    }

    #[test]
    fn test_connection_refused_is_transport() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap_or_else(|e| panic!("{e}"));
        let addr = listener.local_addr().unwrap_or_else(|e| panic!("{e}"));
        drop(listener);

        let transport = HttpTransport::new(TransportConfig {
            base_url: format!("http://{addr}"),
            ..Default::default()
        });
        let err = transport.fetch_index().unwrap_err();
        assert!(matches!(err, KawaError::Transport { .. }), "got {err:?}");
    }
}
