//! Fixed code tables used to decode MovieLens metadata columns.

/// Genre names in indicator-column order (MovieLens 100K `u.item`)
pub const GENRES: [&str; 19] = [
    "unknown",
    "Action",
    "Adventure",
    "Animation",
    "Children's",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Fantasy",
    "Film-Noir",
    "Horror",
    "Musical",
    "Mystery",
    "Romance",
    "Sci-Fi",
    "Thriller",
    "War",
    "Western",
];

/// Age bucket codes (MovieLens 1M `users.dat`)
pub const AGE_BUCKETS: [(u32, &str); 7] = [
    (1, "Under 18"),
    (18, "18-24"),
    (25, "25-34"),
    (35, "35-44"),
    (45, "45-49"),
    (50, "50-55"),
    (56, "56+"),
];

/// Occupation names indexed by code (MovieLens 1M `users.dat`)
pub const OCCUPATIONS: [&str; 21] = [
    "other",
    "academic/educator",
    "artist",
    "clerical/admin",
    "college/grad student",
    "customer service",
    "doctor/health care",
    "executive/managerial",
    "farmer",
    "homemaker",
    "K-12 student",
    "lawyer",
    "programmer",
    "retired",
    "sales/marketing",
    "scientist",
    "self-employed",
    "technician/engineer",
    "tradesman/craftsman",
    "unemployed",
    "writer",
];

const GENRE_SEPARATOR: &str = ", ";

/// Age bracket label for a code, or an empty string for unlisted codes
pub fn age_bucket(code: u32) -> &'static str {
    AGE_BUCKETS
        .iter()
        .find(|(bucket, _)| *bucket == code)
        .map(|(_, label)| *label)
        .unwrap_or("")
}

/// Occupation name for a code, or an empty string when out of range
pub fn occupation(code: u32) -> &'static str {
    usize::try_from(code)
        .ok()
        .and_then(|index| OCCUPATIONS.get(index))
        .copied()
        .unwrap_or("")
}

/// Join the genres whose indicator flag is `1`, in table order.
///
/// Flags beyond the table are ignored; any token other than `1` is inactive.
pub fn decode_genre_flags<S: AsRef<str>>(flags: &[S]) -> String {
    flags
        .iter()
        .zip(GENRES.iter())
        .filter(|(flag, _)| flag.as_ref().trim() == "1")
        .map(|(_, genre)| *genre)
        .collect::<Vec<_>>()
        .join(GENRE_SEPARATOR)
}

/// Rewrite a pipe-joined genre list as a comma-and-space-joined one
pub fn join_genre_list(genres: &str) -> String {
    genres.split('|').collect::<Vec<_>>().join(GENRE_SEPARATOR)
}
