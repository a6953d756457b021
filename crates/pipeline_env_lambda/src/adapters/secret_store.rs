pub trait SecretStore {
    /// Returns `Ok(None)` when the secret exists but has no string value.
    fn secret_string(&self, secret_id: &str) -> Result<Option<String>, String>;
}
