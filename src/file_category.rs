//! Category table for selecting media files by name.
//!
//! Each category carries its own ordered list of extension patterns, a byte
//! budget, the subdirectory its files are moved into and the name of the list
//! file the selection is written to.
//!
//! # Examples
//!
//! ```
//! use mediasift::file_category::{Category, CategoryTable};
//!
//! let table = CategoryTable::default();
//! let image = table.rule(Category::Image).unwrap();
//! assert!(image.matches("holiday.jpg"));
//! assert!(!image.matches("holiday.mp4"));
//! ```

/// One gibibyte.
const GIB: u64 = 1024 * 1024 * 1024;

/// Default budget for the image category (15 GiB).
pub const DEFAULT_IMAGE_BUDGET: u64 = 15 * GIB;

/// Default budget for the video category (20 GiB).
pub const DEFAULT_VIDEO_BUDGET: u64 = 20 * GIB;

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".bmp", ".gif", ".tiff"];
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mkv", ".avi", ".mov", ".wmv"];

/// A media category that files can be selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Image files (JPG, PNG, GIF, etc.)
    Image,
    /// Video files (MP4, MKV, AVI, etc.)
    Video,
}

impl Category {
    /// All categories, in the order they are processed.
    pub const ALL: [Category; 2] = [Category::Image, Category::Video];

    /// Returns the default destination directory name for this category.
    ///
    /// ```
    /// use mediasift::file_category::Category;
    ///
    /// assert_eq!(Category::Image.dir_name(), "images");
    /// assert_eq!(Category::Video.dir_name(), "videos");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Image => "images",
            Category::Video => "videos",
        }
    }

    /// Returns the default selection list file name for this category.
    pub fn list_file_name(&self) -> &'static str {
        match self {
            Category::Image => "imageNames.txt",
            Category::Video => "videoNames.txt",
        }
    }

    /// Returns the key used for this category in configuration files.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Video => "video",
        }
    }

    /// Returns a human-readable label for summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Image => "Images",
            Category::Video => "Videos",
        }
    }

    fn default_extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Image => IMAGE_EXTENSIONS,
            Category::Video => VIDEO_EXTENSIONS,
        }
    }

    fn default_budget(&self) -> u64 {
        match self {
            Category::Image => DEFAULT_IMAGE_BUDGET,
            Category::Video => DEFAULT_VIDEO_BUDGET,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Selection and placement rules for a single category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    /// The category these rules apply to.
    pub category: Category,
    /// Extension patterns, in priority order. Matching is by substring.
    pub extensions: Vec<String>,
    /// Maximum cumulative size in bytes of the files selected.
    pub budget: u64,
    /// Name of the subdirectory (under the scanned folder) files are moved into.
    pub folder: String,
    /// Name of the selection list file inside the output directory.
    pub list_file: String,
}

impl CategoryRule {
    /// Creates the built-in rule for a category.
    pub fn defaults_for(category: Category) -> Self {
        Self {
            category,
            extensions: category
                .default_extensions()
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            budget: category.default_budget(),
            folder: category.dir_name().to_string(),
            list_file: category.list_file_name().to_string(),
        }
    }

    /// Returns true if `file_name` contains any of this rule's extensions.
    ///
    /// The match is a case-sensitive substring test anywhere in the name, so
    /// `archive.jpg.bak` matches `.jpg` while `PHOTO.JPG` does not.
    ///
    /// ```
    /// use mediasift::file_category::{Category, CategoryRule};
    ///
    /// let rule = CategoryRule::defaults_for(Category::Image);
    /// assert!(rule.matches("archive.jpg.bak"));
    /// assert!(!rule.matches("PHOTO.JPG"));
    /// ```
    pub fn matches(&self, file_name: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| !ext.is_empty() && file_name.contains(ext.as_str()))
    }
}

/// Ordered set of category rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
}

impl CategoryTable {
    /// Creates a table with the built-in rules for every category.
    pub fn new() -> Self {
        Self {
            rules: Category::ALL
                .iter()
                .map(|&category| CategoryRule::defaults_for(category))
                .collect(),
        }
    }

    /// Returns the rule for a category.
    pub fn rule(&self, category: Category) -> Option<&CategoryRule> {
        self.rules.iter().find(|rule| rule.category == category)
    }

    /// Returns a mutable reference to the rule for a category.
    pub fn rule_mut(&mut self, category: Category) -> Option<&mut CategoryRule> {
        self.rules.iter_mut().find(|rule| rule.category == category)
    }

    /// Overrides the budget of a category.
    pub fn set_budget(&mut self, category: Category, budget: u64) {
        if let Some(rule) = self.rule_mut(category) {
            rule.budget = budget;
        }
    }

    /// Iterates over the rules in processing order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryRule> {
        self.rules.iter()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_dir_names() {
        assert_eq!(Category::Image.dir_name(), "images");
        assert_eq!(Category::Video.dir_name(), "videos");
    }

    #[test]
    fn test_category_list_file_names() {
        assert_eq!(Category::Image.list_file_name(), "imageNames.txt");
        assert_eq!(Category::Video.list_file_name(), "videoNames.txt");
    }

    #[test]
    fn test_default_budgets() {
        let table = CategoryTable::default();
        assert_eq!(table.rule(Category::Image).unwrap().budget, 15 * GIB);
        assert_eq!(table.rule(Category::Video).unwrap().budget, 20 * GIB);
    }

    #[test]
    fn test_table_order_is_image_then_video() {
        let table = CategoryTable::default();
        let order: Vec<_> = table.iter().map(|rule| rule.category).collect();
        assert_eq!(order, vec![Category::Image, Category::Video]);
    }

    #[test]
    fn test_matches_image_extensions() {
        let rule = CategoryRule::defaults_for(Category::Image);
        for name in ["a.jpg", "b.jpeg", "c.png", "d.bmp", "e.gif", "f.tiff"] {
            assert!(rule.matches(name), "{} should match", name);
        }
        assert!(!rule.matches("clip.mp4"));
        assert!(!rule.matches("notes.txt"));
    }

    #[test]
    fn test_matches_video_extensions() {
        let rule = CategoryRule::defaults_for(Category::Video);
        for name in ["a.mp4", "b.mkv", "c.avi", "d.mov", "e.wmv"] {
            assert!(rule.matches(name), "{} should match", name);
        }
        assert!(!rule.matches("photo.png"));
    }

    #[test]
    fn test_match_is_substring_not_suffix() {
        let image = CategoryRule::defaults_for(Category::Image);
        let video = CategoryRule::defaults_for(Category::Video);
        assert!(image.matches("archive.jpg.bak"));
        assert!(video.matches("my.mp4.notes.txt"));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let rule = CategoryRule::defaults_for(Category::Image);
        assert!(!rule.matches("PHOTO.JPG"));
        assert!(!rule.matches("Photo.Png"));
    }

    #[test]
    fn test_empty_extension_never_matches() {
        let mut rule = CategoryRule::defaults_for(Category::Image);
        rule.extensions = vec![String::new()];
        assert!(!rule.matches("anything.txt"));
    }

    #[test]
    fn test_set_budget() {
        let mut table = CategoryTable::default();
        table.set_budget(Category::Video, 42);
        assert_eq!(table.rule(Category::Video).unwrap().budget, 42);
        assert_eq!(
            table.rule(Category::Image).unwrap().budget,
            DEFAULT_IMAGE_BUDGET
        );
    }
}
