//! Auth method abstraction.
//!
//! A method turns a filled credential table into the path + payload of a
//! single login write. New methods are added by implementing [`AuthMethod`]
//! and registering a factory in the [`AuthRegistry`].

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::*;
use crate::model::{CredField, CredMap};

pub mod userpass;

pub use userpass::UserPassAuth;

/// One way of authenticating against the Vault server.
/// Stateless after construction; credentials stay in the caller's `CredMap`.
pub trait AuthMethod: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fields the end-user must fill in, in prompting order.
    fn credential_fields(&self) -> &'static [CredField];

    /// Path of the login write, e.g. `auth/userpass/login/bob`.
    fn login_path(&self, cred: &CredMap) -> String;

    /// JSON body of the login write.
    fn login_payload(&self, cred: &CredMap) -> Map<String, Value>;
}

type Factory = fn() -> Box<dyn AuthMethod>;

/// Name -> factory table of the supported auth methods.
/// Built once at startup and passed around by reference.
pub struct AuthRegistry {
    factories: HashMap<&'static str, Factory>,
}

impl AuthRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry preloaded with every built-in method.
    pub fn with_builtin() -> Self {
        let mut reg = Self::new();
        for (name, factory) in [
            ("userpass", UserPassAuth::userpass as Factory),
            ("radius", UserPassAuth::radius as Factory),
        ] {
            reg.register(name, factory)
                .unwrap_or_else(|e| unreachable!("builtin auth methods collided: {}", e));
        }
        reg
    }

    pub fn register(&mut self, name: &'static str, factory: Factory) -> Result<()> {
        if self.factories.contains_key(name) {
            return Err(Error::DuplicateAuthMethod(name.to_owned()));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Registered method names, sorted for stable presentation.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn AuthMethod>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| Error::UnknownAuthMethod(name.to_owned()))
    }
}
