use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

/// Argon2id hashing with a fixed parameter set. Stateless per call, safe to
/// share across request tasks. The configured params are what `needs_rehash`
/// compares stored hashes against, enabling online credential upgrades.
#[derive(Clone)]
pub struct PasswordService {
    params: Params,
}

impl Default for PasswordService {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordService {
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// PHC string embedding algorithm, version and cost parameters.
    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// A mismatch is `Ok(false)`; only a malformed stored hash is an error.
    pub fn verify(&self, hash: &str, plain: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        Ok(self.hasher().verify_password(plain.as_bytes(), &parsed).is_ok())
    }

    /// True when the stored hash carries weaker parameters than currently
    /// configured, or is not an Argon2id hash at all. Only meaningful after a
    /// successful `verify`.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return true;
        };
        if !matches!(Algorithm::try_from(parsed.algorithm), Ok(Algorithm::Argon2id)) {
            return true;
        }
        let Ok(stored) = Params::try_from(&parsed) else {
            return true;
        };
        stored.m_cost() < self.params.m_cost()
            || stored.t_cost() < self.params.t_cost()
            || stored.p_cost() < self.params.p_cost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weak_service() -> PasswordService {
        PasswordService::with_params(Params::new(8192, 1, 1, None).expect("valid params"))
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let service = weak_service();
        let hash = service.hash("Secur3P@ssw0rd!").expect("hashing should succeed");
        assert!(service.verify(&hash, "Secur3P@ssw0rd!").expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let service = weak_service();
        let hash = service
            .hash("correct-horse-battery-staple")
            .expect("hashing should succeed");
        assert!(!service.verify(&hash, "wrong-password").expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = weak_service().verify("not-a-valid-hash", "anything").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn fresh_hash_does_not_need_rehash() {
        let service = weak_service();
        let hash = service.hash("pw").expect("hashing should succeed");
        assert!(!service.needs_rehash(&hash));
    }

    #[test]
    fn weaker_params_trigger_rehash() {
        let weak = weak_service();
        let strong = PasswordService::default();
        let hash = weak.hash("pw").expect("hashing should succeed");
        assert!(strong.needs_rehash(&hash));
        // The upgraded hash passes the same check.
        let upgraded = strong.hash("pw").expect("hashing should succeed");
        assert!(!strong.needs_rehash(&upgraded));
    }

    #[test]
    fn unparseable_hash_needs_rehash() {
        assert!(weak_service().needs_rehash("$2b$12$legacy-bcrypt-blob"));
    }
}
