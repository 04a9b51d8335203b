use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    lookup,
    record::{
        Age, EntityKind, EntityProperties, EntityRecord, MovieProperties, RelationRecord,
        UserProperties,
    },
    schema::{MovieLayout, SchemaDescriptor, SchemaVariant, UserLayout},
    sink::Sink,
    source::{split_fields, Source},
};

pub const ENTITIES_FILE: &str = "entities.dat";
pub const RELATIONS_FILE: &str = "relations.dat";

/// Eids that are a multiple of this trigger a flush and a progress event
const PROGRESS_INTERVAL: u64 = 100;

/// Number of fields in a ratings row: user, movie, rating, timestamp
const RATING_FIELDS: usize = 4;

/// Columns of a 100K movie row before the genre indicator flags
const MOVIE_FLAG_OFFSET: usize = 5;

/// Errors that abort a conversion phase
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize {kind} record: {source}")]
    Serialize {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Counts for one entity conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStats {
    pub users: u64,
    pub movies: u64,
    pub skipped: u64,
}

/// Counts for one relation conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationStats {
    pub relations: u64,
    pub skipped: u64,
}

/// Paths of the three source files of a dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub users: PathBuf,
    pub items: PathBuf,
    pub ratings: PathBuf,
}

/// Result of both phases; each phase succeeds or fails on its own
#[derive(Debug)]
pub struct ConversionOutcome {
    pub entities: Result<EntityStats, ConversionError>,
    pub relations: Result<RelationStats, ConversionError>,
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        self.entities.is_ok() && self.relations.is_ok()
    }
}

struct RatingRow {
    user_eid: u64,
    movie_eid: u64,
    rating: i32,
    timestamp: i64,
}

/// Converts one MovieLens layout into `entities.dat` and `relations.dat`
pub struct Converter {
    descriptor: SchemaDescriptor,
}

impl Converter {
    pub fn new(variant: SchemaVariant) -> Self {
        Self {
            descriptor: variant.descriptor(),
        }
    }

    /// Run entity conversion, then relation conversion, into `output_dir`
    pub fn run(&self, inputs: &InputPaths, output_dir: &Path) -> ConversionOutcome {
        if let Err(e) = fs::create_dir_all(output_dir) {
            warn!(path = %output_dir.display(), error = %e, "could not create output directory");
        }

        let entities = self.convert_entities(&inputs.users, &inputs.items, output_dir);
        if let Err(ref e) = entities {
            error!(error = %e, "entity conversion aborted");
        }

        let relations = self.convert_relations(&inputs.ratings, output_dir);
        if let Err(ref e) = relations {
            error!(error = %e, "relation conversion aborted");
        }

        ConversionOutcome { entities, relations }
    }

    /// Convert a users file and a movies file into `<output_dir>/entities.dat`
    pub fn convert_entities(
        &self,
        users: &Path,
        items: &Path,
        output_dir: &Path,
    ) -> Result<EntityStats, ConversionError> {
        let users = Source::open(users)?;
        let items = Source::open(items)?;
        let mut sink = Sink::create(&output_dir.join(ENTITIES_FILE))?;

        let stats = self.write_entities(users, items, &mut sink)?;
        let path = sink.path().to_path_buf();
        sink.close()?;

        info!(
            schema = %self.descriptor.variant,
            users = stats.users,
            movies = stats.movies,
            skipped = stats.skipped,
            path = %path.display(),
            "entities written"
        );
        Ok(stats)
    }

    /// Convert a ratings file into `<output_dir>/relations.dat`
    pub fn convert_relations(
        &self,
        ratings: &Path,
        output_dir: &Path,
    ) -> Result<RelationStats, ConversionError> {
        let ratings = Source::open(ratings)?;
        let mut sink = Sink::create(&output_dir.join(RELATIONS_FILE))?;

        let stats = self.write_relations(ratings, &mut sink)?;
        let path = sink.path().to_path_buf();
        sink.close()?;

        info!(
            schema = %self.descriptor.variant,
            relations = stats.relations,
            skipped = stats.skipped,
            path = %path.display(),
            "relations written"
        );
        Ok(stats)
    }

    /// Write all users, then all movies, as entity records
    pub fn write_entities<U: BufRead, M: BufRead, W: Write>(
        &self,
        users: Source<U>,
        movies: Source<M>,
        sink: &mut Sink<W>,
    ) -> Result<EntityStats, ConversionError> {
        let mut stats = EntityStats::default();

        let (written, skipped) = self.write_entity_pass(EntityKind::User, users, sink)?;
        stats.users = written;
        stats.skipped += skipped;

        let (written, skipped) = self.write_entity_pass(EntityKind::Movie, movies, sink)?;
        stats.movies = written;
        stats.skipped += skipped;

        Ok(stats)
    }

    fn write_entity_pass<R: BufRead, W: Write>(
        &self,
        kind: EntityKind,
        source: Source<R>,
        sink: &mut Sink<W>,
    ) -> Result<(u64, u64), ConversionError> {
        let mut written = 0;
        let mut skipped = 0;
        let mut current_eid = 0;

        for (index, row) in source.rows().enumerate() {
            let line = row?;

            let Some(record) = self.parse_entity(kind, &line, current_eid) else {
                debug!(etype = %kind, line = index + 1, "skipping row with a non-numeric id");
                skipped += 1;
                continue;
            };
            current_eid = record.eid;

            let encoded = record.to_line().map_err(|source| ConversionError::Serialize {
                kind: kind.to_string(),
                source,
            })?;
            sink.write_line(&encoded)?;
            written += 1;

            if record.eid % PROGRESS_INTERVAL == 0 {
                sink.flush()?;
                debug!(etype = %kind, eid = record.eid, "progress");
            }
        }

        Ok((written, skipped))
    }

    /// Build an entity from one metadata row.
    ///
    /// Missing trailing fields take their defaults. An empty id namespaces to
    /// the bare kind digit, and a row made only of delimiters keeps
    /// `previous_eid`. Only a non-numeric id makes the row unusable.
    pub fn parse_entity(
        &self,
        kind: EntityKind,
        line: &str,
        previous_eid: u64,
    ) -> Option<EntityRecord> {
        let fields = split_fields(line, self.descriptor.metadata_delimiter);
        let eid = if fields.is_empty() && !line.is_empty() {
            previous_eid
        } else {
            kind.namespaced_id(field(&fields, 0))?
        };
        let properties = match kind {
            EntityKind::User => EntityProperties::User(self.user_properties(&fields)),
            EntityKind::Movie => EntityProperties::Movie(self.movie_properties(&fields)),
        };
        Some(EntityRecord {
            kind,
            eid,
            properties,
        })
    }

    fn user_properties(&self, fields: &[&str]) -> UserProperties {
        match self.descriptor.user_layout {
            UserLayout::Plain => UserProperties {
                age: Age::Years(parse_code(field(fields, 1)).unwrap_or(0)),
                gender: field(fields, 2).to_string(),
                occupation: field(fields, 3).to_string(),
                zip_code: field(fields, 4).to_string(),
            },
            UserLayout::Coded => UserProperties {
                gender: field(fields, 1).to_string(),
                age: Age::Bracket(
                    parse_code(field(fields, 2))
                        .map(lookup::age_bucket)
                        .unwrap_or("")
                        .to_string(),
                ),
                occupation: parse_code(field(fields, 3))
                    .map(lookup::occupation)
                    .unwrap_or("")
                    .to_string(),
                zip_code: field(fields, 4).to_string(),
            },
        }
    }

    fn movie_properties(&self, fields: &[&str]) -> MovieProperties {
        match self.descriptor.movie_layout {
            MovieLayout::GenreFlags => {
                // flags are only decoded when every indicator column is present
                let genres = if fields.len() >= MOVIE_FLAG_OFFSET + lookup::GENRES.len() {
                    lookup::decode_genre_flags(&fields[MOVIE_FLAG_OFFSET..])
                } else {
                    String::new()
                };
                MovieProperties {
                    title: field(fields, 1).to_string(),
                    release_date: Some(field(fields, 2).to_string()),
                    imdb_url: Some(field(fields, 4).to_string()),
                    genres,
                }
            }
            MovieLayout::GenreList => MovieProperties {
                title: field(fields, 1).to_string(),
                release_date: None,
                imdb_url: None,
                genres: lookup::join_genre_list(field(fields, 2)),
            },
        }
    }

    /// Write one relation per well-formed ratings row, numbering them from 1
    pub fn write_relations<R: BufRead, W: Write>(
        &self,
        ratings: Source<R>,
        sink: &mut Sink<W>,
    ) -> Result<RelationStats, ConversionError> {
        let mut stats = RelationStats::default();
        let mut rid: u64 = 0;

        for (index, row) in ratings.rows().enumerate() {
            let line = row?;
            let fields = split_fields(&line, self.descriptor.ratings_delimiter);

            let Some(rating) = parse_rating(&fields) else {
                debug!(line = index + 1, fields = fields.len(), "skipping malformed rating row");
                stats.skipped += 1;
                continue;
            };

            rid += 1;
            let record = RelationRecord::rating(
                rid,
                rating.user_eid,
                rating.movie_eid,
                rating.rating,
                rating.timestamp,
            );
            let encoded = record.to_line().map_err(|source| ConversionError::Serialize {
                kind: crate::record::RATING_EXPLICIT.to_string(),
                source,
            })?;
            sink.write_line(&encoded)?;
            stats.relations += 1;
        }

        Ok(stats)
    }
}

fn field<'a>(fields: &[&'a str], index: usize) -> &'a str {
    fields.get(index).copied().unwrap_or("")
}

fn parse_code(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

fn parse_rating(fields: &[&str]) -> Option<RatingRow> {
    if fields.len() != RATING_FIELDS {
        return None;
    }
    Some(RatingRow {
        user_eid: EntityKind::User.namespaced_id(fields[0])?,
        movie_eid: EntityKind::Movie.namespaced_id(fields[1])?,
        rating: fields[2].trim().parse().ok()?,
        timestamp: fields[3].trim().parse().ok()?,
    })
}
