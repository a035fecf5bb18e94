//! Operator configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use truststore_core::{TrustStoreError, CERTIFICATES_FIELD, CSR_FIELD, TRUST_FIELD};

/// Relation and field names the operator works with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Relation requirers join to exchange CSRs and trust (default: tls-truststore).
    #[serde(default = "default_truststore_relation")]
    pub truststore_relation: String,

    /// Relation to the CA integration (default: tls-certificates).
    #[serde(default = "default_certificates_relation")]
    pub certificates_relation: String,

    /// Peer relation holding key material on requirers (default: replicas).
    #[serde(default = "default_peer_relation")]
    pub peer_relation: String,

    /// Databag field names.
    #[serde(default)]
    pub fields: FieldConfig,
}

/// Databag field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Requirer unit field holding the CSR.
    #[serde(default = "default_csr_field")]
    pub csr: String,

    /// Application field the trust map is published under.
    #[serde(default = "default_trust_field")]
    pub trust: String,

    /// CA application field listing issued certificates.
    #[serde(default = "default_certificates_field")]
    pub certificates: String,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            truststore_relation: default_truststore_relation(),
            certificates_relation: default_certificates_relation(),
            peer_relation: default_peer_relation(),
            fields: FieldConfig::default(),
        }
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            csr: default_csr_field(),
            trust: default_trust_field(),
            certificates: default_certificates_field(),
        }
    }
}

impl OperatorConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> truststore_core::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self =
                toml::from_str(&content).map_err(|e| TrustStoreError::Config(e.to_string()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject empty names; they would address no relation or field at all.
    pub fn validate(&self) -> truststore_core::Result<()> {
        let names = [
            ("truststore_relation", &self.truststore_relation),
            ("certificates_relation", &self.certificates_relation),
            ("peer_relation", &self.peer_relation),
            ("fields.csr", &self.fields.csr),
            ("fields.trust", &self.fields.trust),
            ("fields.certificates", &self.fields.certificates),
        ];
        for (key, value) in names {
            if value.trim().is_empty() {
                return Err(TrustStoreError::Config(format!("`{key}` must not be empty")));
            }
        }
        Ok(())
    }
}

// Default value functions for serde.
fn default_truststore_relation() -> String {
    String::from("tls-truststore")
}

fn default_certificates_relation() -> String {
    String::from("tls-certificates")
}

fn default_peer_relation() -> String {
    String::from("replicas")
}

fn default_csr_field() -> String {
    String::from(CSR_FIELD)
}

fn default_trust_field() -> String {
    String::from(TRUST_FIELD)
}

fn default_certificates_field() -> String {
    String::from(CERTIFICATES_FIELD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = OperatorConfig::default();
        assert_eq!(config.truststore_relation, "tls-truststore");
        assert_eq!(config.certificates_relation, "tls-certificates");
        assert_eq!(config.peer_relation, "replicas");
        assert_eq!(config.fields.csr, "certificate_signing_request");
        assert_eq!(config.fields.trust, "trust");
        assert_eq!(config.fields.certificates, "certificates");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let path = Path::new("/tmp/nonexistent_truststore_config_test.toml");
        let config = OperatorConfig::load(path).unwrap();
        assert_eq!(config, OperatorConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmpfile,
            r#"
truststore_relation = "receive-trust"

[fields]
csr = "csr"
"#
        )
        .unwrap();

        let config = OperatorConfig::load(tmpfile.path()).unwrap();
        assert_eq!(config.truststore_relation, "receive-trust");
        assert_eq!(config.certificates_relation, "tls-certificates");
        assert_eq!(config.fields.csr, "csr");
        assert_eq!(config.fields.trust, "trust");
    }

    #[test]
    fn test_load_rejects_empty_names() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "peer_relation = \"\"\n").unwrap();

        let err = OperatorConfig::load(tmpfile.path()).unwrap_err();
        assert!(matches!(err, TrustStoreError::Config(_)));
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "truststore_relation = [").unwrap();

        let err = OperatorConfig::load(tmpfile.path()).unwrap_err();
        assert!(matches!(err, TrustStoreError::Config(_)));
    }
}
