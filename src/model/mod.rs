//! Domain model of the registry.
//!
//! Entities are plain serde types stored as JSON documents. Inputs are kept
//! separate from entities: they carry raw strings that are validated when an
//! operation runs, so a malformed name surfaces as a [`ValidationError`]
//! rather than a deserialization failure.
//!
//! [`ValidationError`]: crate::error::ValidationError

pub mod application;
pub mod auth;
pub mod label;
pub mod name;
pub mod runtime;

pub use application::{
    ApiDefinition, ApiDefinitionInput, Application, ApplicationRegisterInput,
    ApplicationUpdateInput,
};
pub use auth::{
    ApiRuntimeAuth, Auth, AuthInput, BasicCredential, Credential, CredentialDataInput,
    OAuthCredential,
};
pub use label::{Label, LabelFilter, Labels};
pub use name::EntityName;
pub use runtime::{Runtime, RuntimeInput, Status, StatusCondition};
