use std::cmp::Ordering;

use crate::record::ImageRecord;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterType {
    #[default]
    All,
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl FilterType {
    pub const ALL: [FilterType; 5] = [
        FilterType::All,
        FilterType::Jpeg,
        FilterType::Png,
        FilterType::Gif,
        FilterType::Webp,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterType::All => "All Types",
            FilterType::Jpeg => "JPG",
            FilterType::Png => "PNG",
            FilterType::Gif => "GIF",
            FilterType::Webp => "WebP",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::All => "all",
            FilterType::Jpeg => "jpeg",
            FilterType::Png => "png",
            FilterType::Gif => "gif",
            FilterType::Webp => "webp",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(FilterType::All),
            "jpeg" | "jpg" => Some(FilterType::Jpeg),
            "png" => Some(FilterType::Png),
            "gif" => Some(FilterType::Gif),
            "webp" => Some(FilterType::Webp),
            _ => None,
        }
    }

    pub fn matches(self, mime_type: &str) -> bool {
        match self {
            FilterType::All => true,
            other => mime_type
                .strip_prefix("image/")
                .is_some_and(|subtype| subtype.starts_with(other.as_str())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Newest first.
    #[default]
    Date,
    /// A to Z.
    Name,
    /// Largest first.
    Size,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Date, SortKey::Name, SortKey::Size];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Date => "Date Added",
            SortKey::Name => "Name",
            SortKey::Size => "Size",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Name => "name",
            SortKey::Size => "size",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "date" => Some(SortKey::Date),
            "name" => Some(SortKey::Name),
            "size" => Some(SortKey::Size),
            _ => None,
        }
    }

    fn compare(self, a: &ImageRecord, b: &ImageRecord) -> Ordering {
        match self {
            SortKey::Date => b.added_at.cmp(&a.added_at),
            SortKey::Name => compare_names(&a.display_name, &b.display_name),
            SortKey::Size => b.byte_size.cmp(&a.byte_size),
        }
    }
}

/// Case-insensitive first, so `apple.png` sorts before `Banana.png`; raw byte
/// order only breaks exact ties.
fn compare_names(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

/// Filtered and sorted projection of the collection. The collection itself is
/// left in upload order.
pub fn derive(records: &[ImageRecord], filter: FilterType, sort: SortKey) -> Vec<&ImageRecord> {
    let mut view: Vec<&ImageRecord> = records
        .iter()
        .filter(|record| filter.matches(&record.mime_type))
        .collect();
    // `sort_by` is stable, ties keep upload order.
    view.sort_by(|a, b| sort.compare(a, b));
    view
}
