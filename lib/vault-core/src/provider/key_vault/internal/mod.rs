//! In-process key vault on top of `rcgen`.
//!
//! Private keys live in memory only, wrapped in secret boxes and zeroized on purge.
//! RSA key generation is not available in this backend.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};

use rcgen::{
    BasicConstraints, CertificateParams, CertificateRevocationListParams,
    CertificateSigningRequestParams, DistinguishedName as RcgenDistinguishedName, DnType,
    ExtendedKeyUsagePurpose, IsCa, Issuer, KeyIdMethod, KeyPair, KeyUsagePurpose,
    RevokedCertParams, SanType, SerialNumber,
};
use rustls_pki_types::{CertificateDer, CertificateSigningRequestDer};
use secrecy::{ExposeSecret, SecretSlice};
use shared_types::KeyHandle;
use time::OffsetDateTime;
use uuid::Uuid;

use super::KeyVault;
use super::error::KeyVaultError;
use super::model::{
    CrlRequest, GeneratedIssuer, GeneratedKeyPair, IssuerKeyRequest, IssuerReference,
    KeyPairRequest, SignRequest,
};
use crate::model::certificate_request::PrivateKeyFormat;
use crate::model::trust_group::{CertificateType, INITIAL_CRL_NUMBER, SignatureAlgorithm};
use crate::util::x509::{DistinguishedName, DnAttribute, subject_key_identifier};


#[derive(Default)]
pub struct InternalKeyVault {
    keys: Mutex<HashMap<KeyHandle, SecretSlice<u8>>>,
}

impl InternalKeyVault {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self, pkcs8: SecretSlice<u8>) -> KeyHandle {
        let handle = KeyHandle::from(format!("internal:{}", Uuid::new_v4()));
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle.clone(), pkcs8);
        handle
    }

    fn load(&self, handle: &KeyHandle) -> Result<KeyPair, KeyVaultError> {
        let keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        let pkcs8 = keys
            .get(handle)
            .ok_or_else(|| KeyVaultError::KeyNotFound(handle.clone()))?;

        Ok(KeyPair::try_from(pkcs8.expose_secret())?)
    }

    fn load_issuer(
        &self,
        reference: &IssuerReference,
    ) -> Result<Issuer<'static, KeyPair>, KeyVaultError> {
        let key = self.load(&reference.key_handle)?;
        let certificate = CertificateDer::from(reference.certificate.as_slice());

        Ok(Issuer::from_ca_cert_der(&certificate, key)?)
    }
}

#[async_trait::async_trait]
impl KeyVault for InternalKeyVault {
    async fn generate_issuer(
        &self,
        request: IssuerKeyRequest,
        parent: Option<IssuerReference>,
    ) -> Result<GeneratedIssuer, KeyVaultError> {
        let algorithm = rcgen_algorithm(request.signature_algorithm, request.key_size)?;
        let parent = parent
            .map(|reference| self.load_issuer(&reference))
            .transpose()?;
        let (not_before, not_after) = (request.not_before, request.not_after);

        let (key, certificate, crl, serial_number) = run_blocking(move || {
            let key = KeyPair::generate_for(algorithm)?;
            let (serial, serial_number) = random_serial();

            let mut params = CertificateParams::default();
            params.distinguished_name = to_rcgen_name(&request.subject);
            params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
            params.use_authority_key_identifier_extension = true;
            params.key_usages = vec![
                KeyUsagePurpose::DigitalSignature,
                KeyUsagePurpose::KeyCertSign,
                KeyUsagePurpose::CrlSign,
            ];
            params.not_before = request.not_before;
            params.not_after = request.not_after;
            params.serial_number = Some(serial);

            let certificate = match &parent {
                None => params.self_signed(&key)?,
                Some(parent) => params.signed_by(&key, parent)?,
            };

            let crl_params = CertificateRevocationListParams {
                this_update: OffsetDateTime::now_utc(),
                next_update: request.not_after,
                crl_number: SerialNumber::from(u64::from(INITIAL_CRL_NUMBER)),
                issuing_distribution_point: None,
                revoked_certs: vec![],
                key_identifier_method: params.key_identifier_method.to_owned(),
            };
            let pkcs8 = SecretSlice::from(key.serialize_der());
            let crl = crl_params.signed_by(&Issuer::new(params, key))?;

            Ok((
                pkcs8,
                certificate.der().to_vec(),
                crl.der().to_vec(),
                serial_number,
            ))
        })
        .await?;

        Ok(GeneratedIssuer {
            key_handle: self.store(key),
            certificate,
            crl,
            serial_number,
            not_before,
            not_after,
        })
    }

    async fn generate_key_pair(
        &self,
        request: KeyPairRequest,
        issuer: IssuerReference,
    ) -> Result<GeneratedKeyPair, KeyVaultError> {
        let algorithm = rcgen_algorithm(request.signature_algorithm, request.key_size)?;
        let issuer = self.load_issuer(&issuer)?;

        let (key, certificate) = run_blocking(move || {
            let key = KeyPair::generate_for(algorithm)?;

            let mut params = leaf_params(
                request.certificate_type,
                request.not_before,
                request.not_after,
            );
            params.distinguished_name = to_rcgen_name(&request.subject);
            for name in &request.domain_names {
                params.subject_alt_names.push(match name.parse::<IpAddr>() {
                    Ok(ip) => SanType::IpAddress(ip),
                    Err(_) => SanType::DnsName(name.as_str().try_into()?),
                });
            }

            let certificate = params.signed_by(&key, &issuer)?;
            Ok((
                SecretSlice::from(key.serialize_der()),
                certificate.der().to_vec(),
            ))
        })
        .await?;

        Ok(GeneratedKeyPair {
            key_handle: self.store(key),
            certificate,
        })
    }

    async fn sign(
        &self,
        request: SignRequest,
        issuer: IssuerReference,
    ) -> Result<Vec<u8>, KeyVaultError> {
        let issuer = self.load_issuer(&issuer)?;

        run_blocking(move || {
            let mut csr = CertificateSigningRequestParams::from_der(
                &CertificateSigningRequestDer::from(request.csr),
            )
            .map_err(|err| KeyVaultError::InvalidCsr(err.to_string()))?;

            let requested = std::mem::take(&mut csr.params);
            csr.params = leaf_params(
                request.certificate_type,
                request.not_before,
                request.not_after,
            );
            csr.params.distinguished_name = requested.distinguished_name;
            csr.params.subject_alt_names = requested.subject_alt_names;

            let certificate = csr.signed_by(&issuer)?;
            Ok(certificate.der().to_vec())
        })
        .await
    }

    async fn update_crl(
        &self,
        request: CrlRequest,
        issuer: IssuerReference,
    ) -> Result<Vec<u8>, KeyVaultError> {
        let key_identifier_method = subject_key_identifier(&issuer.certificate)
            .map_err(|err| KeyVaultError::Failed(err.to_string()))?
            .map_or(KeyIdMethod::Sha256, KeyIdMethod::PreSpecified);
        let issuer = self.load_issuer(&issuer)?;

        run_blocking(move || {
            let crl_params = CertificateRevocationListParams {
                this_update: request.this_update,
                next_update: request.next_update,
                crl_number: SerialNumber::from(u64::from(request.crl_number)),
                issuing_distribution_point: None,
                revoked_certs: request
                    .revoked
                    .into_iter()
                    .map(|revoked| RevokedCertParams {
                        serial_number: SerialNumber::from(revoked.serial_number),
                        revocation_time: revoked.revocation_time,
                        reason_code: None,
                        invalidity_date: None,
                    })
                    .collect(),
                key_identifier_method,
            };

            Ok(crl_params.signed_by(&issuer)?.der().to_vec())
        })
        .await
    }

    async fn fetch_private_key(
        &self,
        handle: KeyHandle,
        format: PrivateKeyFormat,
    ) -> Result<SecretSlice<u8>, KeyVaultError> {
        let key = self.load(&handle)?;

        Ok(match format {
            PrivateKeyFormat::Pem => SecretSlice::from(key.serialize_pem().into_bytes()),
            PrivateKeyFormat::Der => SecretSlice::from(key.serialize_der()),
        })
    }

    async fn purge(&self, handle: KeyHandle) -> Result<(), KeyVaultError> {
        if self
            .keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle)
            .is_some()
        {
            tracing::debug!("Purged key {handle}");
        }
        Ok(())
    }
}

async fn run_blocking<T: Send + 'static>(
    operation: impl FnOnce() -> Result<T, KeyVaultError> + Send + 'static,
) -> Result<T, KeyVaultError> {
    tokio::task::spawn_blocking(operation)
        .await
        .map_err(|err| KeyVaultError::Failed(err.to_string()))?
}

fn rcgen_algorithm(
    algorithm: SignatureAlgorithm,
    key_size: u32,
) -> Result<&'static rcgen::SignatureAlgorithm, KeyVaultError> {
    match (algorithm, key_size) {
        (SignatureAlgorithm::EcdsaP256Sha256, 256) => Ok(&rcgen::PKCS_ECDSA_P256_SHA256),
        (SignatureAlgorithm::EcdsaP384Sha384, 384) => Ok(&rcgen::PKCS_ECDSA_P384_SHA384),
        (SignatureAlgorithm::Eddsa, 256) => Ok(&rcgen::PKCS_ED25519),
        _ => Err(KeyVaultError::UnsupportedAlgorithm {
            algorithm,
            key_size,
        }),
    }
}

fn random_serial() -> (SerialNumber, String) {
    let mut bytes: [u8; 16] = rand::random();
    // keep the DER integer positive
    bytes[0] &= 0x7f;
    (SerialNumber::from_slice(&bytes), hex::encode(bytes))
}

fn leaf_params(
    certificate_type: CertificateType,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
) -> CertificateParams {
    let mut params = CertificateParams::default();
    params.distinguished_name = RcgenDistinguishedName::new();
    params.is_ca = IsCa::ExplicitNoCa;
    params.use_authority_key_identifier_extension = true;
    params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
    params.extended_key_usages = match certificate_type {
        CertificateType::ApplicationInstanceCertificate => vec![
            ExtendedKeyUsagePurpose::ServerAuth,
            ExtendedKeyUsagePurpose::ClientAuth,
        ],
        CertificateType::HttpsCertificate => vec![ExtendedKeyUsagePurpose::ServerAuth],
        CertificateType::UserCredentialCertificate => vec![ExtendedKeyUsagePurpose::ClientAuth],
    };
    params.not_before = not_before;
    params.not_after = not_after;
    params.serial_number = Some(random_serial().0);
    params
}

fn to_rcgen_name(name: &DistinguishedName) -> RcgenDistinguishedName {
    let mut result = RcgenDistinguishedName::new();
    for (attribute, value) in name.attributes() {
        let dn_type = match attribute {
            DnAttribute::CommonName => DnType::CommonName,
            DnAttribute::Organization => DnType::OrganizationName,
            DnAttribute::OrganizationalUnit => DnType::OrganizationalUnitName,
            DnAttribute::Country => DnType::CountryName,
            DnAttribute::StateOrProvince => DnType::StateOrProvinceName,
            DnAttribute::Locality => DnType::LocalityName,
        };
        result.push(dn_type, value.as_str());
    }
    result
}
