//! Password hashing configuration

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// bcrypt work factor
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl SecurityConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ValidationError::InvalidBcryptCost);
        }
        Ok(())
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_bounds_are_enforced() {
        assert!(SecurityConfig::default().validate().is_ok());
        assert!(SecurityConfig { bcrypt_cost: 3 }.validate().is_err());
        assert!(SecurityConfig { bcrypt_cost: 32 }.validate().is_err());
    }
}
