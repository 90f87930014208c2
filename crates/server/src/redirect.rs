//! Where a comment submission may send the browser afterwards.
//!
//! The target comes straight from the submitted form. With no configured
//! origins it is used unchecked, which lets any page that can obtain a
//! token bounce readers to an arbitrary site.

#[derive(Clone, Debug, Default)]
pub struct RedirectPolicy {
    allowed_origins: Vec<String>,
}

impl RedirectPolicy {
    pub fn from_list(origins: &str) -> Self {
        let allowed_origins = origins
            .split(',')
            .map(|s| s.trim().trim_end_matches('/'))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self { allowed_origins }
    }

    pub fn is_restricted(&self) -> bool {
        !self.allowed_origins.is_empty()
    }

    pub fn permits(&self, target: &str) -> bool {
        if !self.is_restricted() {
            return true;
        }
        if is_same_site_path(target) {
            return true;
        }
        self.allowed_origins.iter().any(|origin| {
            target
                .strip_prefix(origin.as_str())
                .map(|rest| rest.is_empty() || rest.starts_with(&['/', '?', '#'][..]))
                .unwrap_or(false)
        })
    }
}

// "//host" and "/\host" are treated by browsers as absolute URLs
fn is_same_site_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.starts_with("/\\")
}
