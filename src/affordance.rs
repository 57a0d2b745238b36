/// Toolbar icon and title for a tab's go link state

pub const NO_LINKS_TITLE: &str = "No links found";

const ICON_SIZES: [u32; 4] = [16, 32, 48, 128];

/// Which of the two icon sets to show
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IconSet {
    Active,
    Grey,
}

impl IconSet {
    /// `(size, path)` pairs in the shape `chrome.action.setIcon` expects
    pub fn paths(self) -> Vec<(u32, String)> {
        let suffix = match self {
            IconSet::Active => "",
            IconSet::Grey => "-grey",
        };
        ICON_SIZES
            .iter()
            .map(|size| (*size, format!("icons/lynx-{}{}.png", size, suffix)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordance {
    pub icon: IconSet,
    pub title: String,
}

pub fn affordance(has_links: bool, count: usize) -> Affordance {
    if has_links {
        Affordance {
            icon: IconSet::Active,
            title: format!("{} link(s) found", count),
        }
    } else {
        Affordance {
            icon: IconSet::Grey,
            title: NO_LINKS_TITLE.to_string(),
        }
    }
}
