//! Canonicalization and validation of user-provided custom hashes.
//!
//! Custom hashes are case-insensitive from the user's point of view. Rather than
//! checking every case variant, every hash is rewritten into lower camel case
//! before it is stored, compared or looked up.

/// Longest accepted custom hash, after canonicalization.
pub const MAX_HASH_LENGTH: usize = 50;

/// Hashes that would shadow service routes mounted next to `/{hash}`.
pub const RESERVED_HASHES: &[&str] = &["api", "health"];

/// Reasons a canonical custom hash is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidHash {
    #[error("Hash must contain at least one letter or digit")]
    Empty,

    #[error("Hash must be {min}-{max} characters, got {actual}")]
    Length {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Hash can only contain ASCII letters and digits")]
    Charset,

    #[error("Hash {0} is reserved")]
    Reserved(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Upper,
    /// ASCII lowercase, and any non-ASCII alphanumeric (which has no case here).
    Lower,
    Digit,
    Separator,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_ascii_uppercase() {
            Self::Upper
        } else if c.is_ascii_digit() {
            Self::Digit
        } else if c.is_ascii_lowercase() || (!c.is_ascii() && c.is_alphanumeric()) {
            Self::Lower
        } else {
            Self::Separator
        }
    }

    fn is_letter(self) -> bool {
        matches!(self, Self::Upper | Self::Lower)
    }
}

/// Whether a new word starts at `chars[i]`, given that `chars[i - 1]` is in the same run.
fn starts_word(chars: &[(char, CharClass)], i: usize) -> bool {
    let prev = chars[i - 1].1;
    let cur = chars[i].1;
    let next = chars.get(i + 1).map(|&(_, class)| class);

    match (prev, cur) {
        (CharClass::Lower, CharClass::Upper) => true,
        (CharClass::Digit, c) if c.is_letter() => true,
        (p, CharClass::Digit) if p.is_letter() => true,
        // Last capital of an acronym begins the next word: `XMLHttp` -> `XML`, `Http`.
        (CharClass::Upper, CharClass::Upper) => next == Some(CharClass::Lower),
        _ => false,
    }
}

/// Splits `raw` into words.
///
/// Separators delimit runs; runs break on lower-to-upper, letter/digit and
/// acronym boundaries. Consecutive one-letter words are joined, so `a b c`
/// becomes the single word `abc` rather than `a`, `B`, `C`.
fn split_words(raw: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut run: Vec<(char, CharClass)> = Vec::new();

    let chars = raw
        .chars()
        .map(|c| (c, CharClass::of(c)))
        .chain(std::iter::once((' ', CharClass::Separator)));

    for (c, class) in chars {
        if class != CharClass::Separator {
            run.push((c, class));
            continue;
        }

        let mut start = 0;
        for i in 1..=run.len() {
            if i == run.len() || starts_word(&run, i) {
                words.push(run[start..i].iter().map(|&(c, _)| c).collect());
                start = i;
            }
        }
        run.clear();
    }

    let mut joined: Vec<String> = Vec::with_capacity(words.len());
    let mut previous_single = false;
    for word in words {
        let single = is_single_letter(&word);
        if single
            && previous_single
            && let Some(last) = joined.last_mut()
        {
            last.push_str(&word);
        } else {
            joined.push(word);
        }
        previous_single = single;
    }

    joined
}

fn is_single_letter(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(c), None) if CharClass::of(c).is_letter()
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut capitalized = String::with_capacity(word.len());
            capitalized.push(first.to_ascii_uppercase());
            capitalized.push_str(&chars.as_str().to_ascii_lowercase());
            capitalized
        }
        None => String::new(),
    }
}

/// Rewrites a custom hash into its canonical lower camel case form.
///
/// Words are split on any non-alphanumeric character, on lower-to-upper case
/// boundaries and between letters and digits; the first word is lowercased and
/// each following word capitalized. The result is a fixed point:
/// canonicalizing it again returns it unchanged.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(canonicalize_hash("Hello"), "hello");
/// assert_eq!(canonicalize_hash("my custom-link"), "myCustomLink");
/// assert_eq!(canonicalize_hash("2025 spring"), "2025Spring");
/// ```
pub fn canonicalize_hash(raw: &str) -> String {
    let mut canonical = String::with_capacity(raw.len());

    for (i, word) in split_words(raw).iter().enumerate() {
        if i == 0 {
            canonical.push_str(&word.to_ascii_lowercase());
        } else {
            canonical.push_str(&capitalize(word));
        }
    }

    canonical
}

/// Validates an already canonical custom hash.
///
/// # Rules
///
/// - Not empty
/// - Length: `min_length`..=[`MAX_HASH_LENGTH`] characters
/// - Allowed characters: ASCII letters and digits
/// - Cannot be a reserved route name
///
/// # Errors
///
/// Returns the first [`InvalidHash`] rule that is violated.
pub fn validate_canonical_hash(hash: &str, min_length: usize) -> Result<(), InvalidHash> {
    if hash.is_empty() {
        return Err(InvalidHash::Empty);
    }

    if !hash.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(InvalidHash::Charset);
    }

    if RESERVED_HASHES.contains(&hash) {
        return Err(InvalidHash::Reserved(hash.to_string()));
    }

    if hash.len() < min_length || hash.len() > MAX_HASH_LENGTH {
        return Err(InvalidHash::Length {
            min: min_length,
            max: MAX_HASH_LENGTH,
            actual: hash.len(),
        });
    }

    Ok(())
}
