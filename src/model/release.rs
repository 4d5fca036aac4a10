use serde::Deserialize;

/// Where the installer binary is published.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseSource {
    pub host: String,
    pub owner: String,
    pub repo: String,
    pub binary: String,
    /// Pinned release tag. `None` follows whatever release is newest.
    #[serde(default)]
    pub tag: Option<String>,
}

impl ReleaseSource {
    pub fn download_url(&self) -> String {
        let Self {
            host,
            owner,
            repo,
            binary,
            tag,
        } = self;

        match tag.as_deref().map(str::trim).filter(|tag| !tag.is_empty()) {
            Some(tag) => format!("https://{host}/{owner}/{repo}/releases/download/{tag}/{binary}"),
            None => format!("https://{host}/{owner}/{repo}/releases/latest/download/{binary}"),
        }
    }
}
