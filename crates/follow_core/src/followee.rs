/// Three-valued account flag as reported by the API.
///
/// `Unknown` is distinct from `No`: filters only keep `Yes`, and exports leave
/// `Unknown` blank instead of writing `NO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Flag {
    Yes,
    No,
    #[default]
    Unknown,
}

impl Flag {
    pub fn is_yes(self) -> bool {
        self == Flag::Yes
    }

    /// Export rendering: `YES`, `NO`, or nothing.
    pub fn export_label(self) -> Option<&'static str> {
        match self {
            Flag::Yes => Some("YES"),
            Flag::No => Some("NO"),
            Flag::Unknown => None,
        }
    }
}

impl From<Option<bool>> for Flag {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Flag::Yes,
            Some(false) => Flag::No,
            None => Flag::Unknown,
        }
    }
}

/// Counts and biography fetched by the enrichment pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileDetails {
    pub followers: Option<u64>,
    pub followings: Option<u64>,
    pub bio: Option<String>,
    pub hd_profile_pic_url: Option<String>,
}

/// One account the target user follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Followee {
    pub username: String,
    pub full_name: Option<String>,
    pub verified: Flag,
    pub private: Flag,
    /// Numeric account id kept as text; ids exceed what f64 holds exactly.
    pub user_id: Option<String>,
    pub profile_pic_url: Option<String>,
    pub followers: Option<u64>,
    pub followings: Option<u64>,
    pub bio: Option<String>,
}

pub const PROFILE_BASE_URL: &str = "https://instagram.com";

impl Followee {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            full_name: None,
            verified: Flag::Unknown,
            private: Flag::Unknown,
            user_id: None,
            profile_pic_url: None,
            followers: None,
            followings: None,
            bio: None,
        }
    }

    pub fn profile_link(&self) -> String {
        format!("{PROFILE_BASE_URL}/{}", self.username)
    }

    /// Merges enrichment data. An HD picture replaces the page-level one only
    /// when present.
    pub fn apply_details(&mut self, details: ProfileDetails) {
        self.followers = details.followers;
        self.followings = details.followings;
        self.bio = details.bio;
        if let Some(url) = details.hd_profile_pic_url.filter(|u| !u.is_empty()) {
            self.profile_pic_url = Some(url);
        }
    }
}
