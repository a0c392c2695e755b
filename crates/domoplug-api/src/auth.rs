// Credential handling for the Domoticz API.
//
// Domoticz accepts either HTTP basic auth or a `passcode` query
// parameter on protected switches; a plug may carry both.

use secrecy::SecretString;

/// Username/password pair sent as HTTP basic auth.
#[derive(Debug, Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password: SecretString,
}

/// Optional authentication material for one relay controller.
#[derive(Debug, Clone, Default)]
pub struct RelayCredentials {
    /// HTTP basic auth applied to every request.
    pub basic: Option<BasicCredentials>,
    /// Protected-switch passcode, appended as a query parameter on
    /// switch commands.
    pub passcode: Option<SecretString>,
}

impl RelayCredentials {
    /// No authentication at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Basic-auth credentials only.
    pub fn basic(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            basic: Some(BasicCredentials {
                username: username.into(),
                password: password.into(),
            }),
            passcode: None,
        }
    }

    /// Attach a protected-switch passcode.
    pub fn with_passcode(mut self, passcode: impl Into<SecretString>) -> Self {
        self.passcode = Some(passcode.into());
        self
    }

    /// Returns `true` if no credential material is present.
    pub fn is_empty(&self) -> bool {
        self.basic.is_none() && self.passcode.is_none()
    }
}
