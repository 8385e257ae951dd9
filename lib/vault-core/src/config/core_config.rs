use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use figment::Figment;
#[cfg(feature = "config_env")]
use figment::providers::Env;
#[cfg(feature = "config_json")]
use figment::providers::Json;
#[cfg(feature = "config_yaml")]
use figment::providers::Yaml;
use figment::providers::{Data, Format};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

use super::{ConfigParsingError, ConfigValidationError};
use crate::model::trust_group::SignatureAlgorithm;

type Dict<K, V> = BTreeMap<K, V>;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoCustomConfig;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppCustomConfigSerdeDTO<Custom> {
    #[serde(default)]
    pub(super) app: Custom,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig<Custom> {
    pub core: CoreConfig,
    #[serde(default)]
    pub app: Custom,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreConfig {
    #[serde(default)]
    pub trust_group: TrustGroupConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrustGroupConfig {
    pub algorithms: Dict<SignatureAlgorithm, AlgorithmConfig>,
    pub lifetime: LifetimeConfig,
    pub defaults: GroupDefaultsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub key_sizes: Vec<u32>,
}

fn default_enabled() -> bool {
    true
}

/// Bounds in months
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeConfig {
    pub issuer_min_months: u32,
    pub issuer_max_months: u32,
    pub issued_min_months: u32,
    pub issued_max_months: u32,
}

/// Parameters used when a create request leaves them out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDefaultsConfig {
    pub lifetime: u32,
    pub key_size: u32,
    pub signature_algorithm: SignatureAlgorithm,
    pub issued_lifetime: u32,
    pub issued_key_size: u32,
    pub issued_signature_algorithm: SignatureAlgorithm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub delay: Duration,
}

impl Default for TrustGroupConfig {
    fn default() -> Self {
        let rsa = || AlgorithmConfig {
            enabled: true,
            key_sizes: vec![2048, 3072, 4096],
        };
        let fixed = |key_size| AlgorithmConfig {
            enabled: true,
            key_sizes: vec![key_size],
        };

        Self {
            algorithms: Dict::from([
                (SignatureAlgorithm::RsaSha256, rsa()),
                (SignatureAlgorithm::RsaSha384, rsa()),
                (SignatureAlgorithm::RsaSha512, rsa()),
                (SignatureAlgorithm::EcdsaP256Sha256, fixed(256)),
                (SignatureAlgorithm::EcdsaP384Sha384, fixed(384)),
                (SignatureAlgorithm::Eddsa, fixed(256)),
            ]),
            lifetime: LifetimeConfig {
                issuer_min_months: 1,
                issuer_max_months: 1200,
                issued_min_months: 1,
                issued_max_months: 60,
            },
            defaults: GroupDefaultsConfig {
                lifetime: 60,
                key_size: 2048,
                signature_algorithm: SignatureAlgorithm::RsaSha256,
                issued_lifetime: 24,
                issued_key_size: 2048,
                issued_signature_algorithm: SignatureAlgorithm::RsaSha256,
            },
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 500,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(200),
        }
    }
}

impl TrustGroupConfig {
    pub fn check_algorithm(
        &self,
        algorithm: SignatureAlgorithm,
        key_size: u32,
    ) -> Result<(), ConfigValidationError> {
        let config = self
            .algorithms
            .get(&algorithm)
            .filter(|config| config.enabled)
            .ok_or_else(|| ConfigValidationError::AlgorithmNotEnabled(algorithm.to_string()))?;

        if !config.key_sizes.contains(&key_size) {
            return Err(ConfigValidationError::UnsupportedKeySize {
                algorithm: algorithm.to_string(),
                key_size,
            });
        }

        Ok(())
    }
}

impl PaginationConfig {
    /// Effective page size for a caller supplied hint
    pub fn page_size(&self, hint: Option<u32>) -> u32 {
        hint.unwrap_or(self.default_page_size)
            .min(self.max_page_size)
            .max(1)
    }
}

impl CoreConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let lifetime = &self.trust_group.lifetime;
        if lifetime.issuer_min_months == 0 || lifetime.issued_min_months == 0 {
            return Err(ConfigValidationError::InvalidValue {
                key: "trustGroup.lifetime",
                reason: "minimum lifetime must be at least one month".to_owned(),
            });
        }
        if lifetime.issuer_min_months > lifetime.issuer_max_months
            || lifetime.issued_min_months > lifetime.issued_max_months
        {
            return Err(ConfigValidationError::InvalidValue {
                key: "trustGroup.lifetime",
                reason: "minimum exceeds maximum".to_owned(),
            });
        }

        let defaults = &self.trust_group.defaults;
        self.trust_group
            .check_algorithm(defaults.signature_algorithm, defaults.key_size)?;
        self.trust_group
            .check_algorithm(defaults.issued_signature_algorithm, defaults.issued_key_size)?;

        if self.pagination.default_page_size == 0
            || self.pagination.default_page_size > self.pagination.max_page_size
        {
            return Err(ConfigValidationError::InvalidValue {
                key: "pagination",
                reason: "default page size must be between 1 and the maximum page size"
                    .to_owned(),
            });
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigValidationError::InvalidValue {
                key: "retry.maxAttempts",
                reason: "at least one attempt is required".to_owned(),
            });
        }

        Ok(())
    }
}

pub enum InputFormat {
    #[cfg(feature = "config_yaml")]
    Yaml(Data<Yaml>),
    #[cfg(feature = "config_json")]
    Json(Data<Json>),
}

impl InputFormat {
    #[cfg(feature = "config_yaml")]
    pub fn yaml_file(p: impl AsRef<Path>) -> InputFormat {
        InputFormat::Yaml(Yaml::file(p))
    }

    #[cfg(feature = "config_yaml")]
    pub fn yaml_str(s: impl AsRef<str>) -> InputFormat {
        InputFormat::Yaml(Yaml::string(s.as_ref()))
    }

    #[cfg(feature = "config_json")]
    pub fn json_file(p: impl AsRef<Path>) -> InputFormat {
        InputFormat::Json(Json::file(p))
    }

    #[cfg(feature = "config_json")]
    pub fn json_str(s: impl AsRef<str>) -> InputFormat {
        InputFormat::Json(Json::string(s.as_ref()))
    }
}

impl<Custom> AppConfig<Custom>
where
    Custom: Serialize + DeserializeOwned + Default,
{
    pub fn from_files(files: &[impl AsRef<Path>]) -> Result<Self, ConfigParsingError> {
        let mut inputs: Vec<InputFormat> = Vec::with_capacity(files.len());

        for path in files {
            let path = path.as_ref();
            let extension = path.extension().and_then(|ext| ext.to_str());

            #[cfg(feature = "config_yaml")]
            if matches!(extension, Some("yml" | "yaml")) {
                inputs.push(InputFormat::yaml_file(path));
                continue;
            }

            #[cfg(feature = "config_json")]
            if matches!(extension, Some("json")) {
                inputs.push(InputFormat::json_file(path));
                continue;
            }

            return Err(ConfigParsingError::UnsupportedFile(
                path.display().to_string(),
            ));
        }

        AppConfig::parse(inputs)
    }

    #[cfg(feature = "config_yaml")]
    pub fn from_yaml(
        configs: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self, ConfigParsingError> {
        let inputs = configs.into_iter().map(InputFormat::yaml_str);

        AppConfig::parse(inputs)
    }

    pub fn parse(
        inputs: impl IntoIterator<Item = InputFormat>,
    ) -> Result<Self, ConfigParsingError> {
        let mut figment = Figment::new();

        for data in inputs {
            figment = match data {
                #[cfg(feature = "config_yaml")]
                InputFormat::Yaml(content) => figment.merge(content),
                #[cfg(feature = "config_json")]
                InputFormat::Json(content) => figment.merge(content),
            };
        }

        #[cfg(feature = "config_env")]
        {
            figment = figment.merge(Env::prefixed("VAULT_").split("__").lowercase(false));
        }

        let core = figment
            .extract::<CoreConfig>()
            .map_err(|e| ConfigParsingError::GeneralParsingError(e.to_string()))?;
        let custom = figment
            .extract::<AppCustomConfigSerdeDTO<Custom>>()
            .map_err(|e| ConfigParsingError::GeneralParsingError(e.to_string()))?;

        Ok(Self {
            core,
            app: custom.app,
        })
    }
}
