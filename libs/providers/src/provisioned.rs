use crate::error::ProviderError;

/// A provider slot that is either configured with a live client or known
/// to be absent.
///
/// Call sites branch on the state explicitly instead of holding a stub
/// client whose every method fails.
#[derive(Debug)]
pub enum Provisioned<T> {
    Configured(T),
    Unconfigured { provider: &'static str },
}

impl<T> Provisioned<T> {
    pub fn configured(client: T) -> Self {
        Self::Configured(client)
    }

    pub fn unconfigured(provider: &'static str) -> Self {
        Self::Unconfigured { provider }
    }

    /// Borrow the client, or report which provider is missing.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unconfigured`] naming the provider when no
    /// client was wired in at startup.
    pub fn get(&self) -> Result<&T, ProviderError> {
        match self {
            Self::Configured(client) => Ok(client),
            Self::Unconfigured { provider } => Err(ProviderError::unconfigured(provider)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_slot_yields_client() {
        let slot = Provisioned::configured(42_u32);
        assert_eq!(slot.get().map(|v| *v).ok(), Some(42));
    }

    #[test]
    fn unconfigured_slot_names_the_provider() {
        let slot: Provisioned<u32> = Provisioned::unconfigured("email");
        let err = slot.get().err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("email provider is not configured"));
    }
}
