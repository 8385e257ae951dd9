use thiserror::Error;
use x509_parser::certificate::X509Certificate;
use x509_parser::certification_request::X509CertificationRequest;
use x509_parser::extensions::ParsedExtension;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::FromDer;

#[derive(Debug, Error)]
pub enum CertificateFormatError {
    #[error("Invalid distinguished name `{0}`")]
    InvalidDistinguishedName(String),
    #[error("Distinguished name `{0}` has no common name")]
    MissingCommonName(String),
    #[error("Invalid certificate signing request: `{0}`")]
    InvalidCsr(String),
    #[error("Invalid certificate: `{0}`")]
    InvalidCertificate(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DnAttribute {
    CommonName,
    Organization,
    OrganizationalUnit,
    Country,
    StateOrProvince,
    Locality,
}

impl DnAttribute {
    fn from_key(key: &str) -> Option<Self> {
        Some(match key.to_ascii_uppercase().as_str() {
            "CN" => Self::CommonName,
            "O" => Self::Organization,
            "OU" => Self::OrganizationalUnit,
            "C" => Self::Country,
            "ST" | "S" => Self::StateOrProvince,
            "L" => Self::Locality,
            _ => return None,
        })
    }
}

/// Subject of an issuer or leaf certificate in `CN=..., O=...` notation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DistinguishedName {
    attributes: Vec<(DnAttribute, String)>,
}

impl DistinguishedName {
    /// Parses a comma separated list of `KEY=value` pairs. Commas inside a value
    /// have to be escaped (`\,`) or the value quoted. A common name is mandatory.
    pub fn parse(value: &str) -> Result<Self, CertificateFormatError> {
        let invalid = || CertificateFormatError::InvalidDistinguishedName(value.to_owned());

        let attributes = split_components(value)
            .ok_or_else(invalid)?
            .into_iter()
            .map(|component| {
                let (key, value) = component.split_once('=').ok_or_else(invalid)?;
                let attribute = DnAttribute::from_key(key.trim()).ok_or_else(invalid)?;
                let value = unquote(value.trim());
                if value.is_empty() {
                    return Err(invalid());
                }
                Ok((attribute, value))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let result = Self { attributes };
        if result.common_name().is_none() {
            return Err(CertificateFormatError::MissingCommonName(value.to_owned()));
        }

        Ok(result)
    }

    pub fn from_common_name(common_name: impl Into<String>) -> Self {
        Self {
            attributes: vec![(DnAttribute::CommonName, common_name.into())],
        }
    }

    pub fn common_name(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attribute, _)| *attribute == DnAttribute::CommonName)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> &[(DnAttribute, String)] {
        &self.attributes
    }
}

fn split_components(value: &str) -> Option<Vec<String>> {
    let mut components = vec![];
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => current.push(chars.next()?),
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            ',' | ';' if !quoted => components.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    if quoted {
        return None;
    }
    components.push(current);

    Some(
        components
            .into_iter()
            .map(|component| component.trim().to_owned())
            .filter(|component| !component.is_empty())
            .collect(),
    )
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|value| value.strip_suffix('"'))
        .unwrap_or(value)
        .to_owned()
}

#[derive(Clone, Debug)]
pub struct ParsedCsr {
    pub der: Vec<u8>,
    pub subject: String,
}

/// Accepts a PEM or DER encoded PKCS#10 request and checks its self-signature
pub fn parse_csr(content: &[u8]) -> Result<ParsedCsr, CertificateFormatError> {
    let der = if content.starts_with(b"-----BEGIN") {
        let (_, pem) = parse_x509_pem(content)
            .map_err(|err| CertificateFormatError::InvalidCsr(err.to_string()))?;
        if !pem.label.ends_with("CERTIFICATE REQUEST") {
            return Err(CertificateFormatError::InvalidCsr(format!(
                "unexpected PEM label `{}`",
                pem.label
            )));
        }
        pem.contents
    } else {
        content.to_vec()
    };

    let (remaining, csr) = X509CertificationRequest::from_der(&der)
        .map_err(|err| CertificateFormatError::InvalidCsr(err.to_string()))?;
    if !remaining.is_empty() {
        return Err(CertificateFormatError::InvalidCsr(
            "trailing data after request".to_owned(),
        ));
    }

    csr.verify_signature()
        .map_err(|err| CertificateFormatError::InvalidCsr(err.to_string()))?;

    let subject = csr.certification_request_info.subject.to_string();

    Ok(ParsedCsr { der, subject })
}

fn parse_certificate(der: &[u8]) -> Result<X509Certificate<'_>, CertificateFormatError> {
    X509Certificate::from_der(der)
        .map(|(_, certificate)| certificate)
        .map_err(|err| CertificateFormatError::InvalidCertificate(err.to_string()))
}

/// Big-endian serial number of a DER encoded certificate
pub fn certificate_serial(der: &[u8]) -> Result<Vec<u8>, CertificateFormatError> {
    Ok(parse_certificate(der)?.raw_serial().to_vec())
}

pub fn subject_key_identifier(der: &[u8]) -> Result<Option<Vec<u8>>, CertificateFormatError> {
    Ok(parse_certificate(der)?
        .iter_extensions()
        .find_map(|extension| match extension.parsed_extension() {
            ParsedExtension::SubjectKeyIdentifier(key_id) => Some(key_id.0.to_vec()),
            _ => None,
        }))
}
