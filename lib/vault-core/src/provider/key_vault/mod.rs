//! Narrow interface to the secret store holding private keys.
//!
//! Certificates and CRLs are public and handed back to the caller for storage,
//! private keys never leave the vault except through [`KeyVault::fetch_private_key`].

use secrecy::SecretSlice;
use shared_types::KeyHandle;

use crate::model::certificate_request::PrivateKeyFormat;

pub mod error;
pub(crate) mod guard;
pub mod internal;
pub mod model;

use error::KeyVaultError;
use model::{
    CrlRequest, GeneratedIssuer, GeneratedKeyPair, IssuerKeyRequest, IssuerReference,
    KeyPairRequest, SignRequest,
};

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait KeyVault: Send + Sync {
    /// Creates a CA key pair with its certificate, self-signed when `parent` is `None`
    async fn generate_issuer(
        &self,
        request: IssuerKeyRequest,
        parent: Option<IssuerReference>,
    ) -> Result<GeneratedIssuer, KeyVaultError>;

    /// Creates a leaf key pair with a certificate signed by `issuer`
    async fn generate_key_pair(
        &self,
        request: KeyPairRequest,
        issuer: IssuerReference,
    ) -> Result<GeneratedKeyPair, KeyVaultError>;

    /// Issues a certificate for a caller supplied CSR, returns the DER encoded certificate
    async fn sign(
        &self,
        request: SignRequest,
        issuer: IssuerReference,
    ) -> Result<Vec<u8>, KeyVaultError>;

    /// Signs a new revocation list of `issuer`, returns the DER encoded CRL
    async fn update_crl(
        &self,
        request: CrlRequest,
        issuer: IssuerReference,
    ) -> Result<Vec<u8>, KeyVaultError>;

    /// Repeatable until the handle is purged
    async fn fetch_private_key(
        &self,
        handle: KeyHandle,
        format: PrivateKeyFormat,
    ) -> Result<SecretSlice<u8>, KeyVaultError>;

    /// Idempotent
    async fn purge(&self, handle: KeyHandle) -> Result<(), KeyVaultError>;
}
