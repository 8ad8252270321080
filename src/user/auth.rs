//! Password credentials.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod vidshare_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    #[cfg(not(any(test, feature = "test-fast-hasher")))]
    fn argon2() -> Result<Argon2<'static>> {
        Ok(Argon2::default())
    }

    #[cfg(any(test, feature = "test-fast-hasher"))]
    fn argon2() -> Result<Argon2<'static>> {
        use argon2::{Algorithm, Params, Version};
        let params = Params::new(Params::MIN_M_COST, 1, 1, None).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    pub fn generate_b64_salt() -> String {
        SaltString::generate(&mut OsRng).to_string()
    }

    pub fn hash<T: AsRef<str>>(plain: &[u8], b64_salt: T) -> Result<String> {
        let salt = SaltString::from_b64(b64_salt.as_ref()).map_err(|err| anyhow!("{}", err))?;
        let hash_string = argon2()?
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify<T: AsRef<str>>(plain_pw: &[u8], target_hash: T) -> Result<bool> {
        let password_hash =
            PasswordHash::new(target_hash.as_ref()).map_err(|err| anyhow!("{}", err))?;
        Ok(argon2()?.verify_password(plain_pw, &password_hash).is_ok())
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VidshareHasher {
    Argon2,
}

impl VidshareHasher {
    pub fn generate_b64_salt(&self) -> String {
        match self {
            VidshareHasher::Argon2 => vidshare_argon2::generate_b64_salt(),
        }
    }

    pub fn hash<T: AsRef<str>>(&self, plain: &[u8], b64_salt: T) -> Result<String> {
        match self {
            VidshareHasher::Argon2 => vidshare_argon2::hash(plain, b64_salt),
        }
    }

    pub fn verify<T: AsRef<str>>(&self, plain_pw: T, target_hash: T) -> Result<bool> {
        match self {
            VidshareHasher::Argon2 => {
                vidshare_argon2::verify(plain_pw.as_ref().as_bytes(), target_hash)
            }
        }
    }
}

/// The salt travels inside the PHC formatted `hash`.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PasswordCredentials {
    pub hash: String,
    pub hasher: VidshareHasher,

    pub created: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
}

impl PasswordCredentials {
    pub fn create(password: &str) -> Result<PasswordCredentials> {
        let hasher = VidshareHasher::Argon2;
        let salt = hasher.generate_b64_salt();
        let hash = hasher.hash(password.as_bytes(), &salt)?;
        Ok(PasswordCredentials {
            hash,
            hasher,
            created: Utc::now(),
            last_used: None,
        })
    }

    /// A hash that cannot be parsed counts as a mismatch.
    pub fn verify(&self, password: &str) -> bool {
        self.hasher
            .verify(password, self.hash.as_str())
            .unwrap_or(false)
    }
}
