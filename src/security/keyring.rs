use tracing::debug;

use crate::core::types::Provider;

const SERVICE: &str = "docbot";

fn username_for_provider(provider: &Provider) -> &'static str {
    match provider {
        Provider::Gemini => "gemini",
    }
}

/// Key stored in the OS keyring, if any. Keyring errors (no backend, no
/// entry) are treated as "not configured".
pub fn get_provider_key(provider: Provider) -> Option<String> {
    let entry = match keyring::Entry::new(SERVICE, username_for_provider(&provider)) {
        Ok(entry) => entry,
        Err(err) => {
            debug!(error = %err, "keyring unavailable");
            return None;
        }
    };
    match entry.get_password() {
        Ok(key) if !key.trim().is_empty() => Some(key.trim().to_string()),
        Ok(_) => None,
        Err(err) => {
            debug!(error = %err, "no provider key in keyring");
            None
        }
    }
}

/// Environment first, then the keyring.
pub fn resolve_provider_key(provider: Provider, configured: Option<String>) -> Option<String> {
    configured.or_else(|| get_provider_key(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_key_wins_without_touching_keyring() {
        let key = resolve_provider_key(Provider::Gemini, Some("from-env".to_string()));
        assert_eq!(key.as_deref(), Some("from-env"));
    }
}
