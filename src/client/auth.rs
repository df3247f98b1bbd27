use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

pub enum Auth {
    /// Use a Pingdom API token via the Bearer scheme
    Bearer(String),
    /// Don't send an Authorization header
    None,
}

impl Auth {
    /// Build the auth from an optional token; blank tokens count as missing.
    pub fn new(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.trim().is_empty() => Self::Bearer(token),
            _ => Self::None,
        }
    }

    /// Insert the Authorization header into `headers`.
    pub fn apply(&self, headers: &mut HeaderMap) -> eyre::Result<()> {
        if let Self::Bearer(token) = self {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(())
    }
}

impl std::fmt::Display for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(_) => write!(f, "Bearer"),
            Self::None => write!(f, "None"),
        }
    }
}
