//! The service type model consumed by the generator.
//!
//! The model is produced upstream (e.g. from an API description) and is
//! assumed to be validated. It is read from JSON:
//!
//! ```json
//! {
//!   "types": [{ "name": "User", "fields": [{ "name": "id", "type": "integer", "required": true }] }],
//!   "interfaces": [{ "name": "Users", "methods": [{
//!     "name": "getUser",
//!     "params": [{ "name": "id", "type": "integer", "required": true }],
//!     "http": { "id": "path" }
//!   }] }],
//!   "unions": [{ "name": "Pet", "variants": [{ "name": "cat", "type": "Cat" }], "discriminator": "kind" }],
//!   "enums": [{ "name": "Status", "values": ["active", "archived"] }]
//! }
//! ```

use crate::entity::{MapExtension, Member, ParamLocation, Rule};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A normalized service description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceModel {
    pub types: Vec<TypeDecl>,
    pub interfaces: Vec<Interface>,
    pub unions: Vec<UnionDecl>,
    pub enums: Vec<EnumDecl>,
}

/// A record type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Member>,
    #[serde(default)]
    pub map: Option<MapExtension>,
    /// Entity-level rules such as key count bounds.
    #[serde(default)]
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Member>,
    /// HTTP binding: transport location per parameter name.
    #[serde(default)]
    pub http: BTreeMap<String, ParamLocation>,
}

impl Method {
    /// Transport location of a parameter. The binding table wins over a
    /// location declared inline on the parameter.
    pub fn location(&self, param: &Member) -> Option<ParamLocation> {
        self.http.get(&param.name).copied().or(param.location)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionDecl {
    pub name: String,
    #[serde(default)]
    pub variants: Vec<Member>,
    #[serde(default)]
    pub discriminator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Error loading a service model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid service model: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServiceModel {
    pub fn from_json_str(input: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }
}
