use std::error::Error;

use url::Url;

/// Just a wrapper around the API root URL and credentials
#[derive(Clone, Debug)]
pub struct Resource {
    base_url: Url,
    token: Option<String>,
}

impl Resource {
    pub fn new(base_url: Url) -> Self {
        Self { base_url, token: None }
    }

    pub fn base_url(&self) -> &Url { &self.base_url }
    pub fn token(&self) -> Option<&str> { self.token.as_deref() }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Build the URL of an endpoint, by appending path segments to the path of the API root.
    /// Every segment is percent-encoded on its own
    pub fn endpoint(&self, path: &[&str]) -> Result<Url, Box<dyn Error>> {
        let mut built = self.base_url.clone();
        {
            let mut segments = built.path_segments_mut()
                .map_err(|_| format!("{} cannot be a base URL", self.base_url))?;
            segments.pop_if_empty();
            segments.extend(path);
        }
        Ok(built)
    }
}
