//! Per-request credential selection from a client-supplied key list.

use rand::seq::SliceRandom;

/// Picks one credential out of the parsed candidates.
///
/// Implemented for closures so tests can pin the choice.
pub trait CredentialPolicy: Send + Sync {
    fn choose<'a>(&self, candidates: &'a [String]) -> Option<&'a String>;
}

/// Uniform random choice, one draw per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCredential;

impl CredentialPolicy for RandomCredential {
    fn choose<'a>(&self, candidates: &'a [String]) -> Option<&'a String> {
        candidates.choose(&mut rand::thread_rng())
    }
}

impl<F> CredentialPolicy for F
where
    F: Fn(&[String]) -> usize + Send + Sync,
{
    fn choose<'a>(&self, candidates: &'a [String]) -> Option<&'a String> {
        if candidates.is_empty() {
            return None;
        }
        candidates.get(self(candidates))
    }
}

/// Split on commas, trim, drop empties.
pub fn parse_credentials(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|k| !k.is_empty()).map(str::to_string).collect()
}

/// Parse `raw` and let `policy` pick one. `None` means forward no credential.
pub fn select_credential(raw: &str, policy: &dyn CredentialPolicy) -> Option<String> {
    let candidates = parse_credentials(raw);
    let selected = policy.choose(&candidates).cloned();
    if let Some(key) = selected.as_deref() {
        tracing::info!(
            candidates = candidates.len(),
            selected = %mask_credential(key),
            "Selected upstream API key"
        );
    }
    selected
}

/// `AIzaSy...wxyz` style rendering for logs and API output.
pub fn mask_credential(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 10 {
        return "*".repeat(chars.len());
    }
    let head: String = chars.iter().take(6).collect();
    let tail: String = chars.iter().skip(chars.len() - 4).collect();
    format!("{}...{}", head, tail)
}
