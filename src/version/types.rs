//! Common types for registry lookups

use std::sync::LazyLock;

use regex::Regex;

static GITHUB_REPO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?github\.com/([^/]+)/([^/#?]+)").expect("valid regex")
});

/// Raw metadata returned by a registry for one package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    /// Latest published version, if the registry reports one
    pub latest_version: Option<String>,
    /// Source repository URL as published (any scheme)
    pub repository_url: Option<String>,
}

impl PackageMetadata {
    pub fn new(latest_version: Option<String>, repository_url: Option<String>) -> Self {
        Self {
            latest_version,
            repository_url,
        }
    }
}

/// Resolved lookup result consumed by the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub latest_version: String,
    pub doc_url: String,
}

/// A GitHub repository reference derived from a repository URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub repo: String,
}

impl RepositoryRef {
    /// Parse a repository URL of any supported scheme into a GitHub reference
    ///
    /// Returns None for repositories hosted anywhere other than github.com.
    pub fn from_url(url: &str) -> Option<Self> {
        let https = to_https_url(url);
        let caps = GITHUB_REPO_RE.captures(&https)?;
        Some(Self {
            owner: caps[1].to_string(),
            repo: caps[2].trim_end_matches(".git").to_string(),
        })
    }

    /// `owner/repo`
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Human-facing releases page
    pub fn releases_page(&self) -> String {
        format!("https://github.com/{}/{}/releases", self.owner, self.repo)
    }
}

/// Normalize a published repository URL to an HTTPS web URL
///
/// Handles the `git+` prefix, a `.git` suffix, `ssh://git@host/...`,
/// `git@host:...`, `git://host/...` and the `github:owner/repo` shorthand.
/// Unknown forms are returned with only the prefix/suffix cleanup applied.
pub fn to_https_url(url: &str) -> String {
    let url = url.trim();
    let url = url.strip_prefix("git+").unwrap_or(url);
    let url = url.strip_suffix(".git").unwrap_or(url);

    if let Some(rest) = url.strip_prefix("ssh://git@") {
        return format!("https://{}", rest);
    }
    if let Some(rest) = url.strip_prefix("git@")
        && let Some((host, path)) = rest.split_once(':')
    {
        return format!("https://{}/{}", host, path);
    }
    if let Some(rest) = url.strip_prefix("git://") {
        return format!("https://{}", rest);
    }
    if let Some(rest) = url.strip_prefix("github:") {
        return format!("https://github.com/{}", rest);
    }
    if let Some(rest) = url.strip_prefix("http://") {
        return format!("https://{}", rest);
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("git+https://github.com/lodash/lodash.git", "https://github.com/lodash/lodash")]
    #[case("ssh://git@github.com/axios/axios.git", "https://github.com/axios/axios")]
    #[case("git@github.com:expressjs/express.git", "https://github.com/expressjs/express")]
    #[case("git://github.com/facebook/react.git", "https://github.com/facebook/react")]
    #[case("github:vercel/next.js", "https://github.com/vercel/next.js")]
    #[case("https://gitlab.com/foo/bar", "https://gitlab.com/foo/bar")]
    #[case("git+ssh://git@gitlab.com/foo/bar.git", "https://gitlab.com/foo/bar")]
    fn to_https_url_normalizes_known_schemes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_https_url(input), expected);
    }

    #[rstest]
    #[case("git+https://github.com/lodash/lodash.git", Some(("lodash", "lodash")))]
    #[case("git@github.com:expressjs/express.git", Some(("expressjs", "express")))]
    #[case("https://github.com/babel/babel/tree/main/packages/babel-core", Some(("babel", "babel")))]
    #[case("https://gitlab.com/foo/bar", None)]
    #[case("not a url", None)]
    fn repository_ref_from_url_extracts_github_slug(
        #[case] input: &str,
        #[case] expected: Option<(&str, &str)>,
    ) {
        let result = RepositoryRef::from_url(input);
        assert_eq!(
            result.as_ref().map(|r| (r.owner.as_str(), r.repo.as_str())),
            expected
        );
    }

    #[test]
    fn releases_page_points_at_web_releases() {
        let repo = RepositoryRef::from_url("git://github.com/facebook/react.git").unwrap();
        assert_eq!(repo.slug(), "facebook/react");
        assert_eq!(
            repo.releases_page(),
            "https://github.com/facebook/react/releases"
        );
    }
}
