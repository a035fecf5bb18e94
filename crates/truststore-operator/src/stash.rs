//! Requirer-side key material kept in the peer relation.
//!
//! Each requirer unit stashes its private key, its current CSR and, once
//! issued, its certificate in its own databag of the peer relation, so the
//! material survives across events. Key and CSR generation are delegated
//! to a [`CsrGenerator`].

use tracing::{debug, info, instrument};
use truststore_core::{json_field, Databag, Result, TrustRecord, TrustStoreError};

use crate::config::OperatorConfig;
use crate::guard::{readiness, require_single, require_single_mut, Access, CardinalityPolicy, Readiness};
use crate::relation::{LocalStore, RelationView};
use crate::requirer::TrustRequirer;

const PRIVATE_KEY: &str = "private_key";
const PRIVATE_KEY_PASSWORD: &str = "private_key_password";
const CSR: &str = "csr";
const CERTIFICATE: &str = "certificate";
const CA: &str = "ca";
const CHAIN: &str = "chain";

/// Generates private keys and CSRs, typically backed by a crypto library.
pub trait CsrGenerator {
    /// Error reported by the backend
    type Error: std::fmt::Display;

    /// Generate a PEM private key protected by `password`.
    fn generate_private_key(&mut self, password: &str) -> std::result::Result<String, Self::Error>;

    /// Generate a PEM CSR for `subject` signed with `private_key`.
    fn generate_csr(
        &mut self,
        private_key: &str,
        password: &str,
        subject: &str,
    ) -> std::result::Result<String, Self::Error>;
}

/// Result of a stash operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StashOutcome {
    /// The peer databag was updated
    Stored,
    /// The peer databag already held this content
    Unchanged,
    /// No peer relation yet; retry on the next relation event
    WaitingForRelation,
    /// No private key stashed yet
    MissingKeyMaterial,
    /// No CSR was ever submitted, so there is nothing to renew
    NoPendingRequest,
    /// The truststore has not published a record for this unit yet
    AwaitingCertificate,
}

/// Key material lifecycle of one requirer unit.
#[derive(Debug, Clone)]
pub struct PeerKeyStash {
    peer_relation: String,
    subject: String,
    password: String,
    requirer: TrustRequirer,
}

impl PeerKeyStash {
    /// Stash for a unit requesting certificates for `subject`
    #[must_use]
    pub fn new(config: &OperatorConfig, subject: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            peer_relation: config.peer_relation.clone(),
            subject: subject.into(),
            password: password.into(),
            requirer: TrustRequirer::new(config),
        }
    }

    /// Generate and stash a private key unless one exists.
    #[instrument(skip_all, fields(relation = %self.peer_relation))]
    pub fn install<P, G>(&self, peers: &mut [P], generator: &mut G) -> Result<StashOutcome>
    where
        P: RelationView,
        G: CsrGenerator,
    {
        let Some(peer) = self.peer(peers)? else {
            return Ok(StashOutcome::WaitingForRelation);
        };
        let mut data = peer.local_data(LocalStore::Unit)?;
        if data.contains_key(PRIVATE_KEY) {
            return Ok(StashOutcome::Unchanged);
        }

        let key = generator
            .generate_private_key(&self.password)
            .map_err(|e| TrustStoreError::KeyMaterial(e.to_string()))?;
        data.insert(PRIVATE_KEY.to_string(), key);
        data.insert(PRIVATE_KEY_PASSWORD.to_string(), self.password.clone());
        peer.replace_local_data(LocalStore::Unit, data)?;
        info!("stashed private key");
        Ok(StashOutcome::Stored)
    }

    /// Generate a CSR from the stashed key, stash it and submit it to the
    /// truststore if related.
    #[instrument(skip_all, fields(relation = %self.peer_relation))]
    pub fn request<P, T, G>(&self, peers: &mut [P], trust: &mut [T], generator: &mut G) -> Result<StashOutcome>
    where
        P: RelationView,
        T: RelationView,
        G: CsrGenerator,
    {
        let Some(peer) = self.peer(peers)? else {
            return Ok(StashOutcome::WaitingForRelation);
        };
        self.regenerate(peer, trust, generator)
    }

    /// Record a certificate issued for this unit.
    pub fn certificate_available<P: RelationView>(&self, peers: &mut [P], record: &TrustRecord) -> Result<StashOutcome> {
        let Some(peer) = self.peer(peers)? else {
            return Ok(StashOutcome::WaitingForRelation);
        };
        let mut data = peer.local_data(LocalStore::Unit)?;
        let before = data.clone();
        data.insert(CERTIFICATE.to_string(), record.certificate.clone());
        data.insert(CA.to_string(), record.ca.clone());
        data.insert(CHAIN.to_string(), serde_json::to_string(&record.chain)?);
        if data == before {
            return Ok(StashOutcome::Unchanged);
        }
        peer.replace_local_data(LocalStore::Unit, data)?;
        info!("stashed issued certificate");
        Ok(StashOutcome::Stored)
    }

    /// Pull this unit's record from the published trust map into the stash.
    pub fn adopt_published<P, T>(&self, peers: &mut [P], trust: &[T]) -> Result<StashOutcome>
    where
        P: RelationView,
        T: RelationView,
    {
        match self.requirer.own_record(trust)? {
            Some(record) => self.certificate_available(peers, &record),
            None => Ok(StashOutcome::AwaitingCertificate),
        }
    }

    /// Replace an expiring certificate's CSR with a fresh one.
    ///
    /// Does nothing if no CSR was ever stashed.
    #[instrument(skip_all, fields(relation = %self.peer_relation))]
    pub fn certificate_expiring<P, T, G>(
        &self,
        peers: &mut [P],
        trust: &mut [T],
        generator: &mut G,
    ) -> Result<StashOutcome>
    where
        P: RelationView,
        T: RelationView,
        G: CsrGenerator,
    {
        let Some(peer) = self.peer(peers)? else {
            return Ok(StashOutcome::WaitingForRelation);
        };
        let data = peer.local_data(LocalStore::Unit)?;
        if data.get(CSR).map_or(true, String::is_empty) {
            debug!("no CSR to renew");
            return Ok(StashOutcome::NoPendingRequest);
        }
        self.regenerate(peer, trust, generator)
    }

    /// The certificate currently stashed, if any.
    pub fn stashed_record<P: RelationView>(&self, peers: &[P]) -> Result<Option<TrustRecord>> {
        if peers.is_empty() {
            return Ok(None);
        }
        let peer = require_single(&self.peer_relation, peers)?;
        let data = peer.local_data(LocalStore::Unit)?;
        let (Some(certificate), Some(ca)) = (data.get(CERTIFICATE), data.get(CA)) else {
            return Ok(None);
        };
        let chain: Vec<String> = json_field(peer.local_identity(), &data, CHAIN)?.unwrap_or_default();
        Ok(Some(TrustRecord {
            certificate: certificate.clone(),
            ca: ca.clone(),
            chain,
        }))
    }

    fn peer<'a, P: RelationView>(&self, peers: &'a mut [P]) -> Result<Option<&'a mut P>> {
        match readiness(&self.peer_relation, &*peers, CardinalityPolicy::ExactlyOne, Access::Read)? {
            Readiness::Ready => Ok(Some(require_single_mut(&self.peer_relation, peers)?)),
            _ => {
                debug!(relation = %self.peer_relation, "waiting for peer relation");
                Ok(None)
            }
        }
    }

    fn regenerate<P, T, G>(&self, peer: &mut P, trust: &mut [T], generator: &mut G) -> Result<StashOutcome>
    where
        P: RelationView,
        T: RelationView,
        G: CsrGenerator,
    {
        if !trust.is_empty() {
            require_single(self.requirer.relation_name(), &*trust)?;
        }

        let mut data = peer.local_data(LocalStore::Unit)?;
        let Some((key, password)) = key_material(&data) else {
            debug!("no private key stashed yet");
            return Ok(StashOutcome::MissingKeyMaterial);
        };

        let csr = generator
            .generate_csr(&key, &password, &self.subject)
            .map_err(|e| TrustStoreError::KeyMaterial(e.to_string()))?;

        data.insert(CSR.to_string(), csr.clone());
        peer.replace_local_data(LocalStore::Unit, data)?;
        if !trust.is_empty() {
            self.requirer.submit_csr(trust, &csr)?;
        }
        info!(subject = %self.subject, "stashed new CSR");
        Ok(StashOutcome::Stored)
    }
}

fn key_material(data: &Databag) -> Option<(String, String)> {
    let key = data.get(PRIVATE_KEY).filter(|k| !k.is_empty())?;
    let password = data.get(PRIVATE_KEY_PASSWORD)?;
    Some((key.clone(), password.clone()))
}
