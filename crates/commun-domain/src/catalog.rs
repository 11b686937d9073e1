//! Service category catalog.
//!
//! The single authoritative table of categories and the sub-categories and
//! keywords each one allows. Served to clients over HTTP so that no other copy
//! has to be maintained by hand. Bump [`CATALOG_VERSION`] on every edit.

use serde::Serialize;

/// Version of [`CATALOG`]. Clients cache the table keyed by this value.
pub const CATALOG_VERSION: u32 = 1;

/// One catalog entry.
///
/// An empty `sub_categories` or `keywords` list means the category imposes no
/// constraint on that list (any values, including none, are accepted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: &'static str,
    pub sub_categories: &'static [&'static str],
    pub keywords: &'static [&'static str],
}

pub static CATALOG: &[Category] = &[
    Category {
        name: "Academics",
        sub_categories: &["Home Tuitions", "Coaching Centre", "Online Classes"],
        keywords: &[
            "Maths",
            "Science",
            "English",
            "Hindi",
            "Physics",
            "Chemistry",
            "Biology",
            "Social Studies",
            "Computer Science",
            "Accountancy",
        ],
    },
    Category {
        name: "Music",
        sub_categories: &["Home Classes", "Academy"],
        keywords: &["Guitar", "Piano", "Keyboard", "Vocals", "Drums", "Violin", "Flute", "Tabla"],
    },
    Category {
        name: "Dance",
        sub_categories: &["Home Classes", "Academy", "Event Choreography"],
        keywords: &["Bollywood", "Hip Hop", "Classical", "Contemporary", "Salsa", "Zumba"],
    },
    Category {
        name: "Fitness",
        sub_categories: &["Personal Training", "Yoga", "Group Classes"],
        keywords: &["Weight Loss", "Strength", "Cardio", "Pilates", "Meditation", "Nutrition"],
    },
    Category {
        name: "Home Services",
        sub_categories: &["Repairs", "Cleaning", "Installation"],
        keywords: &[
            "Plumbing",
            "Electrical",
            "Carpentry",
            "Painting",
            "Appliance Repair",
            "Pest Control",
        ],
    },
    Category {
        name: "Beauty & Wellness",
        sub_categories: &["At Home", "Salon"],
        keywords: &["Haircut", "Makeup", "Mehendi", "Massage", "Skin Care", "Nail Art"],
    },
    Category {
        name: "Photography",
        sub_categories: &["Events", "Portraits", "Products"],
        keywords: &["Wedding", "Birthday", "Pre-Wedding", "Fashion", "Videography", "Editing"],
    },
    Category {
        name: "Tech Support",
        sub_categories: &["On Site", "Remote"],
        keywords: &["Computer Repair", "Networking", "Software Setup", "Mobile Repair", "CCTV"],
    },
    Category {
        name: "Other",
        sub_categories: &[],
        keywords: &[],
    },
];

impl Category {
    pub fn requires_sub_categories(&self) -> bool {
        !self.sub_categories.is_empty()
    }

    pub fn requires_keywords(&self) -> bool {
        !self.keywords.is_empty()
    }

    pub fn allows_sub_category(&self, value: &str) -> bool {
        !self.requires_sub_categories() || self.sub_categories.contains(&value)
    }

    pub fn allows_keyword(&self, value: &str) -> bool {
        !self.requires_keywords() || self.keywords.contains(&value)
    }
}

/// Look up a category by its exact name.
pub fn find(name: &str) -> Option<&'static Category> {
    CATALOG.iter().find(|c| c.name == name)
}

/// Reasons a category/sub-category/keyword selection is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("category is required")]
    MissingCategory,
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("please select at least one sub-category")]
    MissingSubCategories,
    #[error("sub-category '{value}' is not offered under '{category}'")]
    DisallowedSubCategory {
        category: &'static str,
        value: String,
    },
    #[error("please select at least one keyword")]
    MissingKeywords,
    #[error("keyword '{value}' is not offered under '{category}'")]
    DisallowedKeyword {
        category: &'static str,
        value: String,
    },
}

/// Check a selection against the catalog.
///
/// Checks run in a fixed order: category, sub-category presence, sub-category
/// membership, keyword presence, keyword membership. The first failure wins.
pub fn validate_selection(
    category: &str,
    sub_categories: &[String],
    keywords: &[String],
) -> Result<&'static Category, SelectionError> {
    if category.trim().is_empty() {
        return Err(SelectionError::MissingCategory);
    }
    let entry =
        find(category).ok_or_else(|| SelectionError::UnknownCategory(category.to_owned()))?;

    if entry.requires_sub_categories() && sub_categories.is_empty() {
        return Err(SelectionError::MissingSubCategories);
    }
    if let Some(bad) = sub_categories.iter().find(|s| !entry.allows_sub_category(s)) {
        return Err(SelectionError::DisallowedSubCategory {
            category: entry.name,
            value: bad.clone(),
        });
    }

    if entry.requires_keywords() && keywords.is_empty() {
        return Err(SelectionError::MissingKeywords);
    }
    if let Some(bad) = keywords.iter().find(|k| !entry.allows_keyword(k)) {
        return Err(SelectionError::DisallowedKeyword {
            category: entry.name,
            value: bad.clone(),
        });
    }

    Ok(entry)
}
