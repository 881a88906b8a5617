//! Credential bindings between API definitions and runtimes.
//!
//! A runtime calls an application API with the credential stored for the
//! (API, runtime) pair. Credentials are a closed sum type; the input shape
//! `{basic?, oauth?}` is converted with [`TryFrom`] and must select exactly
//! one kind.

use crate::error::{ValidationError, ValidationResult};
use crate::model::application::validate_target_url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Extra HTTP headers or query parameters sent with every call.
pub type MultiValueMap = BTreeMap<String, Vec<String>>;

/// Username/password credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicCredential {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// OAuth client-credentials grant.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthCredential {
    pub client_id: String,
    pub client_secret: String,
    pub url: String,
}

impl fmt::Debug for OAuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("url", &self.url)
            .finish()
    }
}

/// The credential of a binding, exactly one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Credential {
    #[serde(rename = "basic")]
    Basic(BasicCredential),
    #[serde(rename = "oauth")]
    OAuth(OAuthCredential),
}

impl Credential {
    /// Short name of the credential kind, safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::Basic(_) => "basic",
            Credential::OAuth(_) => "oauth",
        }
    }
}

/// Stored authentication of a binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auth {
    pub credential: Credential,
    #[serde(default)]
    pub additional_headers: MultiValueMap,
    #[serde(default)]
    pub additional_query_params: MultiValueMap,
}

/// Credential input: exactly one of the fields must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDataInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic: Option<BasicCredential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth: Option<OAuthCredential>,
}

impl CredentialDataInput {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            basic: Some(BasicCredential {
                username: username.into(),
                password: password.into(),
            }),
            oauth: None,
        }
    }

    pub fn oauth(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            basic: None,
            oauth: Some(OAuthCredential {
                client_id: client_id.into(),
                client_secret: client_secret.into(),
                url: url.into(),
            }),
        }
    }
}

impl TryFrom<CredentialDataInput> for Credential {
    type Error = ValidationError;

    fn try_from(input: CredentialDataInput) -> ValidationResult<Self> {
        let credential = match (input.basic, input.oauth) {
            (Some(basic), None) => Credential::Basic(basic),
            (None, Some(oauth)) => Credential::OAuth(oauth),
            (None, None) => {
                return Err(ValidationError::InvalidCredential {
                    details: "one of basic or oauth must be provided".to_string(),
                });
            }
            (Some(_), Some(_)) => {
                return Err(ValidationError::InvalidCredential {
                    details: "only one of basic or oauth may be provided".to_string(),
                });
            }
        };

        match &credential {
            Credential::Basic(basic) if basic.username.is_empty() => {
                return Err(ValidationError::InvalidCredential {
                    details: "basic username must not be empty".to_string(),
                });
            }
            Credential::OAuth(oauth) if oauth.client_id.is_empty() => {
                return Err(ValidationError::InvalidCredential {
                    details: "oauth clientId must not be empty".to_string(),
                });
            }
            Credential::OAuth(oauth) => {
                validate_target_url(&oauth.url).map_err(|_| ValidationError::InvalidCredential {
                    details: "oauth url must be an absolute http or https URL".to_string(),
                })?;
            }
            Credential::Basic(_) => {}
        }

        Ok(credential)
    }
}

/// Input of `setAPIAuth`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInput {
    pub credential: CredentialDataInput,
    #[serde(default)]
    pub additional_headers: MultiValueMap,
    #[serde(default)]
    pub additional_query_params: MultiValueMap,
}

impl AuthInput {
    pub fn new(credential: CredentialDataInput) -> Self {
        Self {
            credential,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.additional_headers.insert(name.into(), values);
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.additional_query_params.insert(name.into(), values);
        self
    }
}

impl TryFrom<AuthInput> for Auth {
    type Error = ValidationError;

    fn try_from(input: AuthInput) -> ValidationResult<Self> {
        if input.additional_headers.keys().any(|name| name.trim().is_empty()) {
            return Err(ValidationError::invalid_field(
                "additionalHeaders",
                "header names must not be empty",
            ));
        }
        if input
            .additional_query_params
            .keys()
            .any(|name| name.trim().is_empty())
        {
            return Err(ValidationError::invalid_field(
                "additionalQueryParams",
                "parameter names must not be empty",
            ));
        }

        Ok(Auth {
            credential: Credential::try_from(input.credential)?,
            additional_headers: input.additional_headers,
            additional_query_params: input.additional_query_params,
        })
    }
}

/// The credential binding of an API and a runtime.
///
/// `auth` is `None` when the pair is valid but no credential has been set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRuntimeAuth {
    pub api_id: String,
    pub runtime_id: String,
    pub auth: Option<Auth>,
}
