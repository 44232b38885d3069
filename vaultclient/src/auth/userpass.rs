use serde_json::{Map, Value};

use super::AuthMethod;
use crate::model::{CredField, CredFieldKind, CredMap};

const FIELDS: &[CredField] = &[
    CredField {
        name: "username",
        prompt: "Username",
        kind: CredFieldKind::Text,
    },
    CredField {
        name: "password",
        prompt: "Password",
        kind: CredFieldKind::Password,
    },
];

/// Username + password login against a `userpass`-shaped auth mount.
/// The radius backend shares the same wire format, so both are covered by
/// this one type parameterized on the mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPassAuth {
    name: &'static str,
    mount: &'static str,
}

impl UserPassAuth {
    pub fn userpass() -> Box<dyn AuthMethod> {
        Box::new(Self {
            name: "userpass",
            mount: "userpass",
        })
    }

    pub fn radius() -> Box<dyn AuthMethod> {
        Box::new(Self {
            name: "radius",
            mount: "radius",
        })
    }
}

impl AuthMethod for UserPassAuth {
    fn name(&self) -> &'static str {
        self.name
    }

    fn credential_fields(&self) -> &'static [CredField] {
        FIELDS
    }

    fn login_path(&self, cred: &CredMap) -> String {
        let username = cred.get("username").map(String::as_str).unwrap_or_default();
        format!("auth/{}/login/{}", self.mount, username)
    }

    fn login_payload(&self, cred: &CredMap) -> Map<String, Value> {
        let password = cred.get("password").map(String::as_str).unwrap_or_default();
        let mut payload = Map::new();
        payload.insert("password".to_owned(), Value::from(password));
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cred(username: &str, password: &str) -> CredMap {
        let mut map = CredMap::new();
        map.insert("username", username.to_owned());
        map.insert("password", password.to_owned());
        map
    }

    #[test]
    fn login_path_embeds_mount_and_username() {
        let cred = cred("bob", "hunter2");
        assert_eq!(
            UserPassAuth::userpass().login_path(&cred),
            "auth/userpass/login/bob"
        );
        assert_eq!(
            UserPassAuth::radius().login_path(&cred),
            "auth/radius/login/bob"
        );
    }

    #[test]
    fn login_payload_contains_only_the_password() {
        let payload = UserPassAuth::userpass().login_payload(&cred("bob", "hunter2"));
        assert_eq!(payload.len(), 1);
        assert_eq!(payload["password"], Value::from("hunter2"));
    }

    #[test]
    fn field_schema_masks_only_the_password() {
        let fields = UserPassAuth::userpass().credential_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "username");
        assert_eq!(fields[0].kind, CredFieldKind::Text);
        assert_eq!(fields[1].name, "password");
        assert_eq!(fields[1].kind, CredFieldKind::Password);
    }
}
