//! Per-host TLS certificate provisioning.
//!
//! A host is provisioned once: if both `<ssl_dir>/<host>.crt` and
//! `<ssl_dir>/<host>.key` exist nothing runs. Otherwise the pair is issued by
//! mkcert when the policy enables it and the binary resolves, else by a
//! self-signed openssl request. Existing files are never inspected.

use crate::config::ServerSpec;
use crate::error::{DevhostError, Result};
use crate::exec::CommandRunner;
use crate::fs::atomic::io_error;
use crate::probe::FsProbe;
use std::path::{Path, PathBuf};

/// What [`CertificateProvisioner::ensure`] did for a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertOutcome {
    /// Both files already existed.
    Skipped,
    /// Issued by the primary tool (mkcert).
    GeneratedByPrimary,
    /// Issued by the fallback tool (openssl).
    GeneratedByFallback,
}

impl CertOutcome {
    pub fn describe(&self) -> &'static str {
        match self {
            CertOutcome::Skipped => "exists",
            CertOutcome::GeneratedByPrimary => "generated with mkcert",
            CertOutcome::GeneratedByFallback => "generated self-signed with openssl",
        }
    }
}

/// Which tools may issue certificates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertPolicy {
    pub use_primary: bool,
    pub primary_bin: PathBuf,
    pub fallback_bin: PathBuf,
}

impl CertPolicy {
    pub fn from_server(server: &ServerSpec) -> Self {
        Self {
            use_primary: server.use_mkcert,
            primary_bin: server.mkcert_bin.clone(),
            fallback_bin: PathBuf::from("openssl"),
        }
    }
}

/// Issues missing certificate pairs into one directory.
pub struct CertificateProvisioner<'a> {
    ssl_dir: PathBuf,
    domain_suffix: String,
    policy: CertPolicy,
    probe: &'a dyn FsProbe,
    runner: &'a dyn CommandRunner,
}

impl<'a> CertificateProvisioner<'a> {
    pub fn new(
        ssl_dir: impl Into<PathBuf>,
        domain_suffix: impl Into<String>,
        policy: CertPolicy,
        probe: &'a dyn FsProbe,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            ssl_dir: ssl_dir.into(),
            domain_suffix: domain_suffix.into(),
            policy,
            probe,
            runner,
        }
    }

    pub fn cert_path(&self, name: &str) -> PathBuf {
        self.ssl_dir.join(format!("{}.crt", name))
    }

    pub fn key_path(&self, name: &str) -> PathBuf {
        self.ssl_dir.join(format!("{}.key", name))
    }

    /// Make sure `name` has a certificate pair.
    pub fn ensure(&self, name: &str) -> Result<CertOutcome> {
        let cert = self.cert_path(name);
        let key = self.key_path(name);

        if self.probe.exists(&cert) && self.probe.exists(&key) {
            tracing::debug!(host = name, "certificate pair present");
            return Ok(CertOutcome::Skipped);
        }

        std::fs::create_dir_all(&self.ssl_dir)
            .map_err(|e| io_error(&self.ssl_dir, "failed to create directory", e))?;

        let fqdn = format!("{}.{}", name, self.domain_suffix);

        if self.policy.use_primary {
            match self.probe.resolve_binary(&self.policy.primary_bin) {
                Some(mkcert) => {
                    let args = primary_args(&cert, &key, &fqdn);
                    self.runner.run(&mkcert, &args, &cert)?;
                    tracing::info!(host = name, "certificate issued by mkcert");
                    return Ok(CertOutcome::GeneratedByPrimary);
                }
                None => tracing::warn!(
                    mkcert = %self.policy.primary_bin.display(),
                    "mkcert not found, falling back to openssl"
                ),
            }
        }

        let openssl = self
            .probe
            .resolve_binary(&self.policy.fallback_bin)
            .ok_or_else(|| DevhostError::MissingArtifact {
                what: "openssl".to_string(),
                path: self.policy.fallback_bin.clone(),
                fix: "install openssl, or install mkcert and set server.use_mkcert: true"
                    .to_string(),
            })?;
        let args = fallback_args(&cert, &key, &fqdn);
        self.runner.run(&openssl, &args, &cert)?;
        tracing::info!(host = name, "self-signed certificate issued by openssl");
        Ok(CertOutcome::GeneratedByFallback)
    }
}

fn primary_args(cert: &Path, key: &Path, fqdn: &str) -> Vec<String> {
    vec![
        "-cert-file".to_string(),
        cert.display().to_string(),
        "-key-file".to_string(),
        key.display().to_string(),
        fqdn.to_string(),
    ]
}

fn fallback_args(cert: &Path, key: &Path, fqdn: &str) -> Vec<String> {
    ["req", "-x509", "-nodes", "-newkey", "rsa:2048", "-subj"]
        .iter()
        .map(|s| s.to_string())
        .chain([
            format!("/CN={}", fqdn),
            "-days".to_string(),
            "365".to_string(),
            "-keyout".to_string(),
            key.display().to_string(),
            "-out".to_string(),
            cert.display().to_string(),
        ])
        .collect()
}
