use std::io;

use vssh_vaultclient::{AuthMethod, CredFieldKind, CredMap};

pub mod util {
    use dialoguer::{theme::ColorfulTheme, Input, Password, Select};
    use std::io;

    fn theme() -> ColorfulTheme {
        ColorfulTheme::default()
    }

    pub fn ask_text(prompt: &str) -> io::Result<String> {
        Input::with_theme(&theme())
            .with_prompt(prompt)
            .interact_text()
    }

    pub fn ask_password(prompt: &str) -> io::Result<String> {
        Password::with_theme(&theme())
            .with_prompt(prompt)
            .interact()
    }

    pub fn select(prompt: &str, options: &[&str]) -> io::Result<usize> {
        Select::with_theme(&theme())
            .with_prompt(prompt)
            .items(options)
            .default(0)
            .interact()
    }
}

/// Prompt boundary: `(prompt text, sensitive) -> input`.
/// The dialoguer-backed implementation is [`ask_interactively`]; tests pass
/// closures instead.
pub fn ask_interactively(prompt: &str, sensitive: bool) -> io::Result<String> {
    if sensitive {
        util::ask_password(prompt)
    } else {
        util::ask_text(prompt)
    }
}

/// Fills every field of the method's schema by invoking `ask` exactly once
/// per field, in schema order. Fails atomically: the first `ask` error is
/// propagated unchanged and no partial credential map escapes.
pub fn collect_credentials<F>(method: &dyn AuthMethod, mut ask: F) -> io::Result<CredMap>
where
    F: FnMut(&str, bool) -> io::Result<String>,
{
    let mut cred = CredMap::new();
    for field in method.credential_fields() {
        let sensitive = field.kind == CredFieldKind::Password;
        let value = ask(field.prompt, sensitive)?;
        cred.insert(field.name, value);
    }
    Ok(cred)
}

/// Lets the user pick one of the registered auth methods.
/// Skips the prompt when there is no actual choice.
pub fn select_auth_method(names: &[&'static str]) -> io::Result<&'static str> {
    match names {
        [] => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "no auth method is registered",
        )),
        &[only] => Ok(only),
        _ => {
            let idx = util::select("Please choose an authentication method", names)?;
            Ok(names[idx])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vssh_vaultclient::auth::UserPassAuth;

    #[test]
    fn collector_asks_every_field_once_in_schema_order() {
        let method = UserPassAuth::userpass();
        let mut prompts = Vec::new();

        let cred = collect_credentials(&*method, |prompt, sensitive| {
            prompts.push((prompt.to_owned(), sensitive));
            Ok(format!("value-of-{}", prompt))
        })
        .unwrap();

        assert_eq!(
            prompts,
            vec![
                ("Username".to_owned(), false),
                ("Password".to_owned(), true),
            ]
        );
        assert_eq!(cred["username"], "value-of-Username");
        assert_eq!(cred["password"], "value-of-Password");
    }

    #[test]
    fn collector_propagates_the_first_failure_and_stops() {
        let method = UserPassAuth::userpass();
        let mut calls = 0;

        let res = collect_credentials(&*method, |_, _| {
            calls += 1;
            Err(io::Error::new(io::ErrorKind::Interrupted, "ctrl-c"))
        });

        assert_eq!(res.unwrap_err().kind(), io::ErrorKind::Interrupted);
        assert_eq!(calls, 1, "remaining fields must not be prompted");
    }
}
