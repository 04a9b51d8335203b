use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Relation type of every rating record
pub const RATING_EXPLICIT: &str = "rating.explicit";

const FIELD_SEPARATOR: char = '\t';

fn raw_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d*$").expect("raw id pattern is valid"))
}

/// Kind of an entity; also decides the digit appended to its raw id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Movie,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Movie => "movie",
        }
    }

    fn id_suffix(self) -> char {
        match self {
            EntityKind::User => '0',
            EntityKind::Movie => '1',
        }
    }

    /// Namespace a raw source id by appending the kind digit to its text.
    ///
    /// `"12"` becomes `120` for users and `121` for movies; an empty id becomes
    /// the bare digit. Returns `None` when the raw id is not decimal or the
    /// result does not fit in a `u64`.
    pub fn namespaced_id(self, raw: &str) -> Option<u64> {
        let raw = raw.trim();
        if !raw_id_pattern().is_match(raw) {
            return None;
        }
        format!("{}{}", raw, self.id_suffix()).parse().ok()
    }

    /// Reference to an entity of this kind as used in `linkedEntities`
    pub fn reference(self, eid: u64) -> String {
        format!("{}:{}", self.as_str(), eid)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User age: literal years (100K) or a bracket label (1M)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Age {
    Years(u32),
    Bracket(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProperties {
    pub age: Age,
    pub gender: String,
    pub occupation: String,
    #[serde(rename = "zipCode")]
    pub zip_code: String,
}

/// Movie attributes; release date and IMDb URL only exist in the 100K layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieProperties {
    pub title: String,
    #[serde(rename = "release date", default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(rename = "imdbUrl", default, skip_serializing_if = "Option::is_none")]
    pub imdb_url: Option<String>,
    pub genres: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityProperties {
    User(UserProperties),
    Movie(MovieProperties),
}

/// One line of `entities.dat`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    pub kind: EntityKind,
    pub eid: u64,
    pub properties: EntityProperties,
}

impl EntityRecord {
    /// `etype \t eid \t \t properties \t` with empty timestamp and linked entities
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let properties = serde_json::to_string(&self.properties)?;
        Ok(format!(
            "{kind}{sep}{eid}{sep}{sep}{properties}{sep}",
            kind = self.kind,
            eid = self.eid,
            sep = FIELD_SEPARATOR,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingProperties {
    pub rating: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedEntities {
    pub subject: String,
    pub object: String,
}

/// One line of `relations.dat`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRecord {
    pub rid: u64,
    pub timestamp: i64,
    pub properties: RatingProperties,
    pub linked_entities: LinkedEntities,
}

impl RelationRecord {
    pub fn rating(rid: u64, user_eid: u64, movie_eid: u64, rating: i32, timestamp: i64) -> Self {
        Self {
            rid,
            timestamp,
            properties: RatingProperties { rating },
            linked_entities: LinkedEntities {
                subject: EntityKind::User.reference(user_eid),
                object: EntityKind::Movie.reference(movie_eid),
            },
        }
    }

    /// `rtype \t rid \t timestamp \t properties \t linkedEntities`
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let properties = serde_json::to_string(&self.properties)?;
        let linked_entities = serde_json::to_string(&self.linked_entities)?;
        Ok(format!(
            "{RATING_EXPLICIT}{sep}{rid}{sep}{ts}{sep}{properties}{sep}{linked_entities}",
            rid = self.rid,
            ts = self.timestamp,
            sep = FIELD_SEPARATOR,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_id_is_textual() {
        assert_eq!(EntityKind::User.namespaced_id("5"), Some(50));
        assert_eq!(EntityKind::Movie.namespaced_id("5"), Some(51));
        assert_eq!(EntityKind::User.namespaced_id("7"), Some(70));
        assert_eq!(EntityKind::Movie.namespaced_id("7"), Some(71));
        assert_eq!(EntityKind::User.namespaced_id("123"), Some(1230));
        assert_eq!(EntityKind::Movie.namespaced_id("123"), Some(1231));
    }

    #[test]
    fn test_empty_id_namespaces_to_kind_digit() {
        assert_eq!(EntityKind::User.namespaced_id(""), Some(0));
        assert_eq!(EntityKind::Movie.namespaced_id(" "), Some(1));
    }

    #[test]
    fn test_namespaced_id_rejects_non_decimal() {
        assert_eq!(EntityKind::User.namespaced_id("abc"), None);
        assert_eq!(EntityKind::Movie.namespaced_id("-3"), None);
        assert_eq!(EntityKind::Movie.namespaced_id("99999999999999999999"), None);
    }

    #[test]
    fn test_user_entity_line() {
        let record = EntityRecord {
            kind: EntityKind::User,
            eid: 10,
            properties: EntityProperties::User(UserProperties {
                age: Age::Years(25),
                gender: "M".to_string(),
                occupation: "engineer".to_string(),
                zip_code: "10001".to_string(),
            }),
        };

        assert_eq!(
            record.to_line().unwrap(),
            "user\t10\t\t{\"age\":25,\"gender\":\"M\",\
             \"occupation\":\"engineer\",\"zipCode\":\"10001\"}\t"
        );
    }

    #[test]
    fn test_bracket_age_is_quoted() {
        let props = UserProperties {
            age: Age::Bracket("56+".to_string()),
            gender: "F".to_string(),
            occupation: "programmer".to_string(),
            zip_code: "02460".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&props).unwrap(),
            r#"{"age":"56+","gender":"F","occupation":"programmer","zipCode":"02460"}"#
        );
    }

    #[test]
    fn test_movie_properties_key_order() {
        let with_release = MovieProperties {
            title: "Toy Story (1995)".to_string(),
            release_date: Some("01-Jan-1995".to_string()),
            imdb_url: Some("http://imdb.example/toy".to_string()),
            genres: "Animation, Children's, Comedy".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&with_release).unwrap(),
            concat!(
                r#"{"title":"Toy Story (1995)","release date":"01-Jan-1995","#,
                r#""imdbUrl":"http://imdb.example/toy","genres":"Animation, Children's, Comedy"}"#
            )
        );

        let without_release = MovieProperties {
            title: "Heat (1995)".to_string(),
            release_date: None,
            imdb_url: None,
            genres: "Action, Crime, Thriller".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&without_release).unwrap(),
            r#"{"title":"Heat (1995)","genres":"Action, Crime, Thriller"}"#
        );
    }

    #[test]
    fn test_title_quotes_are_escaped() {
        let props = MovieProperties {
            title: "The \"Best\" Movie".to_string(),
            release_date: None,
            imdb_url: None,
            genres: String::new(),
        };
        let json = serde_json::to_string(&props).unwrap();
        assert_eq!(json, r#"{"title":"The \"Best\" Movie","genres":""}"#);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["title"], "The \"Best\" Movie");
    }

    #[test]
    fn test_relation_line() {
        let record = RelationRecord::rating(1, 10, 51, 4, 881250949);
        assert_eq!(
            record.to_line().unwrap(),
            "rating.explicit\t1\t881250949\t{\"rating\":4}\t\
             {\"subject\":\"user:10\",\"object\":\"movie:51\"}"
        );
    }
}
