// Cache identity for remote content.
// Keys are fully qualified so distinct repositories and branches never collide.

use crate::config::RemoteTarget;

/// Cache key for a file in a remote repository: `owner/repo/branch/path`.
pub fn cache_key(target: &RemoteTarget, path: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        target.owner,
        target.repo,
        target.branch,
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key() {
        let target = RemoteTarget::new("janik-technika", "janik-tech-spark", "main");
        assert_eq!(
            cache_key(&target, "public/content/news.json"),
            "janik-technika/janik-tech-spark/main/public/content/news.json"
        );
    }

    #[test]
    fn test_branches_do_not_collide() {
        let main = RemoteTarget::new("acme", "site", "main");
        let preview = RemoteTarget::new("acme", "site", "preview");
        assert_ne!(
            cache_key(&main, "public/content/news.json"),
            cache_key(&preview, "public/content/news.json")
        );
    }

    #[test]
    fn test_leading_slash_ignored() {
        let target = RemoteTarget::default();
        assert_eq!(
            cache_key(&target, "/public/content/news.json"),
            cache_key(&target, "public/content/news.json")
        );
    }
}
