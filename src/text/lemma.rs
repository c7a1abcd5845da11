//! Part-of-speech tagging and lemmatization.
//!
//! Tokens are tagged in isolation with suffix heuristics and reduced to a
//! dictionary form with ordered suffix-detachment rules plus a small
//! irregular-form table, in the manner of WordNet's morphy. The same
//! function runs at ingest and at query time, so retrieval only needs the
//! mapping to be deterministic, not linguistically perfect.

/// Coarse part-of-speech classes the lemmatizer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PosTag {
    Adjective,
    Verb,
    Noun,
    Adverb,
}

/// Tag a single token in isolation. Defaults to noun, which is also what
/// the vocabulary and multi-word query paths use without tagging at all.
pub(crate) fn tag_in_isolation(word: &str) -> PosTag {
    const VERB_SUFFIXES: &[&str] = &["ing", "ed", "ize", "ise", "ify"];
    const ADJECTIVE_SUFFIXES: &[&str] = &[
        "ous", "ful", "ive", "less", "able", "ible", "al", "ic", "ish",
    ];

    if word.ends_with("ly") {
        return PosTag::Adverb;
    }
    if VERB_SUFFIXES.iter().any(|s| word.ends_with(s)) {
        return PosTag::Verb;
    }
    if ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s)) {
        return PosTag::Adjective;
    }
    PosTag::Noun
}

/// Irregular forms checked before any rule fires.
const NOUN_EXCEPTIONS: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("analyses", "analysis"),
    ("criteria", "criterion"),
];

const VERB_EXCEPTIONS: &[(&str, &str)] = &[
    ("ran", "run"),
    ("running", "run"),
    ("took", "take"),
    ("taken", "take"),
    ("taking", "take"),
    ("made", "make"),
    ("making", "make"),
    ("came", "come"),
    ("coming", "come"),
    ("went", "go"),
    ("gone", "go"),
    ("going", "go"),
    ("got", "get"),
    ("getting", "get"),
    ("gave", "give"),
    ("given", "give"),
    ("giving", "give"),
    ("used", "use"),
    ("using", "use"),
    ("wrote", "write"),
    ("written", "write"),
    ("writing", "write"),
    ("built", "build"),
    ("said", "say"),
    ("found", "find"),
    ("led", "lead"),
    ("held", "hold"),
    ("kept", "keep"),
    ("met", "meet"),
    ("paid", "pay"),
    ("sold", "sell"),
    ("sent", "send"),
    ("drove", "drive"),
    ("driven", "drive"),
];

const ADJECTIVE_EXCEPTIONS: &[(&str, &str)] = &[
    ("better", "good"),
    ("best", "good"),
    ("worse", "bad"),
    ("worst", "bad"),
];

const ADVERB_EXCEPTIONS: &[(&str, &str)] = &[("further", "far"), ("farther", "far")];

/// Minimum stem length a detachment rule may leave behind.
const MIN_STEM: usize = 2;

/// Consonants after which a detached `-ed`/`-ing` stem gets its silent `e`
/// restored (`manag` → `manage`, `serv` → `serve`).
const E_RESTORE: &[char] = &['c', 'g', 's', 'v', 'z'];

/// Reduce a word to its lemma given a part-of-speech hint. The word must
/// already be lowercase.
pub(crate) fn lemmatize(word: &str, pos: PosTag) -> String {
    let exceptions = match pos {
        PosTag::Noun => NOUN_EXCEPTIONS,
        PosTag::Verb => VERB_EXCEPTIONS,
        PosTag::Adjective => ADJECTIVE_EXCEPTIONS,
        PosTag::Adverb => ADVERB_EXCEPTIONS,
    };
    if let Some((_, lemma)) = exceptions.iter().find(|(form, _)| *form == word) {
        return (*lemma).to_string();
    }

    match pos {
        PosTag::Noun => lemmatize_noun(word),
        PosTag::Verb => lemmatize_verb(word),
        PosTag::Adjective => lemmatize_adjective(word),
        PosTag::Adverb => word.to_string(),
    }
}

fn lemmatize_noun(word: &str) -> String {
    if let Some(stem) = strip(word, "ies") {
        if stem.len() >= MIN_STEM {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = strip(word, "lves") {
        return format!("{stem}lf");
    }
    for (suffix, replacement) in [("ches", "ch"), ("shes", "sh"), ("xes", "x")] {
        if let Some(stem) = strip(word, suffix) {
            if stem.len() >= MIN_STEM {
                return format!("{stem}{replacement}");
            }
        }
    }
    if let Some(stem) = strip(word, "sses") {
        return format!("{stem}ss");
    }
    if let Some(stem) = strip(word, "zzes") {
        return format!("{stem}z");
    }
    // Bare plural `s`, guarded so `business`, `status`, `basis` and
    // `analytics` keep their final letter.
    if word.ends_with('s')
        && !["ss", "us", "is"].iter().any(|s| word.ends_with(s))
        && !word.ends_with("ics")
    {
        let stem = &word[..word.len() - 1];
        if stem.len() > MIN_STEM {
            return stem.to_string();
        }
    }
    word.to_string()
}

fn lemmatize_verb(word: &str) -> String {
    if let Some(stem) = strip(word, "ies") {
        if stem.len() >= MIN_STEM {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = strip(word, "es") {
        let specialized = ["ch", "sh", "ss", "x", "z", "o"]
            .iter()
            .any(|s| stem.ends_with(s));
        if specialized && stem.len() >= MIN_STEM {
            return stem.to_string();
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") {
        let stem = &word[..word.len() - 1];
        if stem.len() >= MIN_STEM {
            return stem.to_string();
        }
    }
    if let Some(stem) = strip(word, "ied") {
        if stem.len() >= MIN_STEM {
            return format!("{stem}y");
        }
    }
    for suffix in ["ed", "ing"] {
        if let Some(stem) = strip(word, suffix) {
            if stem.len() >= MIN_STEM {
                return restore_stem(stem);
            }
        }
    }
    word.to_string()
}

fn lemmatize_adjective(word: &str) -> String {
    for suffix in ["est", "er"] {
        if let Some(stem) = strip(word, suffix) {
            if stem.len() >= MIN_STEM + 1 {
                return restore_stem(stem);
            }
        }
    }
    word.to_string()
}

/// Undo consonant doubling (`plann` → `plan`) or restore a silent `e`
/// (`manag` → `manage`) on a detached stem.
fn restore_stem(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    if chars.len() >= 2 {
        let last = chars[chars.len() - 1];
        let prev = chars[chars.len() - 2];
        if last == prev && !last.is_ascii_digit() && !matches!(last, 'l' | 's') {
            return stem[..stem.len() - last.len_utf8()].to_string();
        }
        if E_RESTORE.contains(&last) && prev != last {
            return format!("{stem}e");
        }
    }
    stem.to_string()
}

fn strip<'a>(word: &'a str, suffix: &str) -> Option<&'a str> {
    word.strip_suffix(suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case("quickly", PosTag::Adverb)]
    #[case("running", PosTag::Verb)]
    #[case("visualize", PosTag::Verb)]
    #[case("powerful", PosTag::Adjective)]
    #[case("engineer", PosTag::Noun)]
    #[case("java", PosTag::Noun)]
    fn tagging_by_suffix(#[case] word: &str, #[case] expected: PosTag) {
        check!(tag_in_isolation(word) == expected);
    }

    #[rstest]
    #[case("engineers", "engineer")]
    #[case("skills", "skill")]
    #[case("analytics", "analytics")] // -ics guard
    #[case("business", "business")] // -ss guard
    #[case("status", "status")] // -us guard
    #[case("basis", "basis")] // -is guard
    #[case("companies", "company")]
    #[case("technologies", "technology")]
    #[case("classes", "class")]
    #[case("processes", "process")]
    #[case("boxes", "box")]
    #[case("churches", "church")]
    #[case("shelves", "shelf")]
    #[case("men", "man")]
    #[case("analyses", "analysis")]
    #[case("java", "java")]
    fn noun_lemmas(#[case] word: &str, #[case] lemma: &str) {
        check!(lemmatize(word, PosTag::Noun) == lemma);
    }

    #[rstest]
    #[case("running", "run")]
    #[case("planned", "plan")]
    #[case("managed", "manage")]
    #[case("applies", "apply")]
    #[case("applied", "apply")]
    #[case("watches", "watch")]
    #[case("makes", "make")]
    #[case("using", "use")]
    #[case("visualize", "visualize")] // base form passes through
    fn verb_lemmas(#[case] word: &str, #[case] lemma: &str) {
        check!(lemmatize(word, PosTag::Verb) == lemma);
    }

    #[rstest]
    #[case("larger", "large")]
    #[case("bigger", "big")]
    #[case("fastest", "fast")]
    #[case("best", "good")]
    fn adjective_lemmas(#[case] word: &str, #[case] lemma: &str) {
        check!(lemmatize(word, PosTag::Adjective) == lemma);
    }

    #[test]
    fn adverbs_only_use_exceptions() {
        check!(lemmatize("quickly", PosTag::Adverb) == "quickly");
        check!(lemmatize("further", PosTag::Adverb) == "far");
    }

    #[test]
    fn short_words_never_lose_their_suffix() {
        // Stripping would leave a stem below the minimum length.
        check!(lemmatize("red", PosTag::Verb) == "red");
        check!(lemmatize("gas", PosTag::Noun) == "gas");
    }
}
