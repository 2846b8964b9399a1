//! Best-effort content classification from title/artist strings.
//!
//! Keyword matching only: an informational scoring input to ranking.
//! False positives and negatives are expected and acceptable; nothing
//! downstream depends on these guesses being right.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Tamil,
    Telugu,
    Hindi,
    Malayalam,
    Kannada,
    English,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Tamil => "tamil",
            Language::Telugu => "telugu",
            Language::Hindi => "hindi",
            Language::Malayalam => "malayalam",
            Language::Kannada => "kannada",
            Language::English => "english",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Energetic,
    Romantic,
    Sad,
    Chill,
    Motivational,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Energetic => "energetic",
            Mood::Romantic => "romantic",
            Mood::Sad => "sad",
            Mood::Chill => "chill",
            Mood::Motivational => "motivational",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Genre {
    HipHop,
    Electronic,
    Classical,
    Rock,
    Pop,
    Folk,
}

impl Genre {
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::HipHop => "hip hop",
            Genre::Electronic => "electronic",
            Genre::Classical => "classical",
            Genre::Rock => "rock",
            Genre::Pop => "pop",
            Genre::Folk => "folk",
        }
    }
}

/// What the keyword matcher could guess about a track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackProfile {
    pub language: Option<Language>,
    pub mood: Option<Mood>,
    pub genre: Option<Genre>,
}

const TAMIL: &[&str] = &[
    "tamil", "kollywood", "anirudh", "ilayaraja", "ilaiyaraaja", "yuvan", "sid sriram",
];
const TELUGU: &[&str] = &["telugu", "tollywood", "devi sri prasad", "thaman"];
const HINDI: &[&str] = &[
    "hindi", "bollywood", "arijit", "shreya ghoshal", "pritam", "atif aslam", "kumar sanu",
];
const MALAYALAM: &[&str] = &["malayalam", "mollywood", "sushin shyam", "vineeth"];
const KANNADA: &[&str] = &["kannada", "sandalwood"];

const ENERGETIC: &[&str] = &[
    "party", "dance", "mass", "pump", "workout", "bass boosted", "hype",
];
const ROMANTIC: &[&str] = &["love", "romantic", "pyaar", "kadhal", "prema", "heart"];
const SAD: &[&str] = &["sad", "broken", "breakup", "miss you", "alone", "pain"];
const CHILL: &[&str] = &["lofi", "chill", "slowed", "reverb", "calm", "relax", "acoustic"];
const MOTIVATIONAL: &[&str] = &["motivation", "motivational", "gym", "success", "rise up"];

const HIP_HOP: &[&str] = &["rap", "hip hop", "hiphop", "hip-hop", "drill", "trap"];
const ELECTRONIC: &[&str] = &["edm", "electronic", "house", "techno", "dubstep", "remix"];
const CLASSICAL: &[&str] = &["classical", "carnatic", "symphony", "raga", "veena"];
const ROCK: &[&str] = &["rock", "metal", "punk"];
const POP: &[&str] = &["pop"];
const FOLK: &[&str] = &["folk", "folklore"];

fn matches_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Guess language/mood/genre from a track's display strings.
pub fn classify(title: &str, artist: &str) -> TrackProfile {
    let text = format!("{} {}", title, artist).to_lowercase();

    let language = if matches_any(&text, TAMIL) {
        Some(Language::Tamil)
    } else if matches_any(&text, TELUGU) {
        Some(Language::Telugu)
    } else if matches_any(&text, HINDI) {
        Some(Language::Hindi)
    } else if matches_any(&text, MALAYALAM) {
        Some(Language::Malayalam)
    } else if matches_any(&text, KANNADA) {
        Some(Language::Kannada)
    } else if text.is_ascii() {
        // No regional marker and plain-ASCII text: call it English
        Some(Language::English)
    } else {
        None
    };

    let mood = if matches_any(&text, ENERGETIC) {
        Some(Mood::Energetic)
    } else if matches_any(&text, ROMANTIC) {
        Some(Mood::Romantic)
    } else if matches_any(&text, SAD) {
        Some(Mood::Sad)
    } else if matches_any(&text, CHILL) {
        Some(Mood::Chill)
    } else if matches_any(&text, MOTIVATIONAL) {
        Some(Mood::Motivational)
    } else {
        None
    };

    let genre = if matches_any(&text, HIP_HOP) {
        Some(Genre::HipHop)
    } else if matches_any(&text, ELECTRONIC) {
        Some(Genre::Electronic)
    } else if matches_any(&text, CLASSICAL) {
        Some(Genre::Classical)
    } else if matches_any(&text, ROCK) {
        Some(Genre::Rock)
    } else if matches_any(&text, FOLK) {
        Some(Genre::Folk)
    } else if matches_any(&text, POP) {
        Some(Genre::Pop)
    } else {
        None
    };

    TrackProfile {
        language,
        mood,
        genre,
    }
}

/// Strip parenthetical noise like "(Official Video)" or "[4K]" that
/// trips up search APIs, plus dangling "feat." suffixes.
pub fn clean_title(title: &str) -> String {
    let mut result = String::with_capacity(title.len());
    let mut depth = 0i32;
    for c in title.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth -= 1;
                continue;
            }
            _ if depth <= 0 => result.push(c),
            _ => {}
        }
    }

    let result = result.split(" feat.").next().unwrap_or(&result).to_string();
    let result = result.split(" ft.").next().unwrap_or(&result).to_string();

    result.trim().to_string()
}

/// Extract the primary (first) artist from a comma-separated artist
/// string: "Reol, Kradness" -> "Reol".
pub fn primary_artist(artist: &str) -> String {
    artist.split(',').next().unwrap_or(artist).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_language_from_keywords() {
        let profile = classify("Vaathi Coming (Tamil)", "Anirudh Ravichander");
        assert_eq!(profile.language, Some(Language::Tamil));
    }

    #[test]
    fn ascii_without_markers_is_english() {
        let profile = classify("Shape of You", "Ed Sheeran");
        assert_eq!(profile.language, Some(Language::English));
    }

    #[test]
    fn classifies_mood_and_genre() {
        let profile = classify("Midnight Lofi Chill Mix", "Beats Collective");
        assert_eq!(profile.mood, Some(Mood::Chill));

        let profile = classify("Old Town Rap Freestyle", "MC Test");
        assert_eq!(profile.genre, Some(Genre::HipHop));
    }

    #[test]
    fn unmatched_signals_stay_none() {
        let profile = classify("Untitled 7", "Unknown");
        assert_eq!(profile.mood, None);
        assert_eq!(profile.genre, None);
    }

    #[test]
    fn clean_title_strips_noise() {
        assert_eq!(
            clean_title("Blinding Lights (Official Video) [4K]"),
            "Blinding Lights"
        );
        assert_eq!(clean_title("Stay ft. Bieber"), "Stay");
    }

    #[test]
    fn primary_artist_takes_first() {
        assert_eq!(primary_artist("Reol, Kradness"), "Reol");
        assert_eq!(primary_artist("Solo"), "Solo");
    }
}
