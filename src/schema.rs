use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source dataset layout handled by the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum SchemaVariant {
    /// MovieLens 100K: `u.user`, `u.item` pipe-delimited, `u.data` tab-delimited
    #[value(name = "100k")]
    #[serde(rename = "100k")]
    Ml100k,
    /// MovieLens 1M: `users.dat`, `movies.dat`, `ratings.dat`, all `::`-delimited
    #[value(name = "1m")]
    #[serde(rename = "1m")]
    Ml1m,
}

/// How the fields of a user row are laid out and decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLayout {
    /// `id|age|gender|occupation|zip` with literal values
    Plain,
    /// `id::gender::ageCode::occupationCode::zip` with coded age and occupation
    Coded,
}

/// How the fields of a movie row are laid out and decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieLayout {
    /// `id|title|release|videoRelease|imdbUrl` followed by 19 genre indicator columns
    GenreFlags,
    /// `id::title::Genre1|Genre2|...`
    GenreList,
}

/// Everything the pipeline needs to know about one source layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub variant: SchemaVariant,
    pub metadata_delimiter: &'static str,
    pub ratings_delimiter: &'static str,
    pub user_layout: UserLayout,
    pub movie_layout: MovieLayout,
}

impl SchemaVariant {
    pub fn descriptor(self) -> SchemaDescriptor {
        match self {
            SchemaVariant::Ml100k => SchemaDescriptor {
                variant: self,
                metadata_delimiter: "|",
                ratings_delimiter: "\t",
                user_layout: UserLayout::Plain,
                movie_layout: MovieLayout::GenreFlags,
            },
            SchemaVariant::Ml1m => SchemaDescriptor {
                variant: self,
                metadata_delimiter: "::",
                ratings_delimiter: "::",
                user_layout: UserLayout::Coded,
                movie_layout: MovieLayout::GenreList,
            },
        }
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVariant::Ml100k => write!(f, "100k"),
            SchemaVariant::Ml1m => write!(f, "1m"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_100k() {
        let descriptor = SchemaVariant::Ml100k.descriptor();
        assert_eq!(descriptor.metadata_delimiter, "|");
        assert_eq!(descriptor.ratings_delimiter, "\t");
        assert_eq!(descriptor.user_layout, UserLayout::Plain);
        assert_eq!(descriptor.movie_layout, MovieLayout::GenreFlags);
    }

    #[test]
    fn test_descriptor_1m() {
        let descriptor = SchemaVariant::Ml1m.descriptor();
        assert_eq!(descriptor.metadata_delimiter, "::");
        assert_eq!(descriptor.ratings_delimiter, "::");
        assert_eq!(descriptor.user_layout, UserLayout::Coded);
        assert_eq!(descriptor.movie_layout, MovieLayout::GenreList);
    }

    #[test]
    fn test_schema_variant_display() {
        assert_eq!(SchemaVariant::Ml100k.to_string(), "100k");
        assert_eq!(SchemaVariant::Ml1m.to_string(), "1m");
    }

    #[test]
    fn test_schema_variant_value_names() {
        assert_eq!(SchemaVariant::from_str("100k", false).unwrap(), SchemaVariant::Ml100k);
        assert_eq!(SchemaVariant::from_str("1M", true).unwrap(), SchemaVariant::Ml1m);
        assert!(SchemaVariant::from_str("10m", false).is_err());
    }
}
