#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter both email and password.")]
    MissingCredentials,
}

/// both the email and password must be present before the identity provider
/// is contacted
pub fn check_credentials<E, P>(email: E, password: P) -> Result<(), ValidationError>
where
    E: AsRef<str>,
    P: AsRef<str>,
{
    if email.as_ref().is_empty() || password.as_ref().is_empty() {
        Err(ValidationError::MissingCredentials)
    } else {
        Ok(())
    }
}
