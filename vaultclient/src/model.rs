use std::collections::HashMap;

pub use reqwest::Url;

/// Credential field name.
/// e.g. "username", "password"
pub type CredName = &'static str;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CredFieldKind {
    Text,
    /// Input must be masked while typing.
    Password,
}

/// Template describing one piece of information the end-user must supply
/// before a login request can be built.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CredField {
    pub name: CredName,
    pub prompt: &'static str,
    pub kind: CredFieldKind,
}

/// Credential table.
/// e.g. `[ "username" => "Bob", "password" => "***" ]`
pub type CredMap = HashMap<CredName, String>;
