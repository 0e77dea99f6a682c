use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;

/// Single shared-secret gate in front of the console.
pub struct PasswordGate {
    secret: Secret<String>,
}

impl PasswordGate {
    pub fn new(secret: Secret<String>) -> Self {
        Self { secret }
    }

    /// Compares `candidate` with the secret in constant time.
    pub fn verify(&self, candidate: &str) -> bool {
        let expected = self.secret.expose_secret().as_bytes();
        // an empty secret would let an empty form through
        if expected.is_empty() {
            return false;
        }
        expected.ct_eq(candidate.as_bytes()).into()
    }
}
