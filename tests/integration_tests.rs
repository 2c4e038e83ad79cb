//! Integration tests for Picklock
//!
//! Whole analysis runs through the public API:
//! - Vigenère ciphertexts broken with Friedman and Kasiski
//! - Substitution keys applied through a session
//! - Language profiles saved, loaded and used as the reference
//! - Change events observed over a channel

use std::collections::BTreeMap;

use picklock::text::Ciphertext;
use picklock::{
    estimate_number_of_alphabets, AlphabetEstimate, AlphabetRules, AnalyzerConfig, CharKey,
    Collator, EstimateUnavailable, FilterConfig, FrequencyReport, IgnoreSet, KasiskiOrder,
    LanguageProfile, Session, SubstitutionEvent,
};

/// Relative weights of English letters, per mille.
#[rustfmt::skip]
const ENGLISH_WEIGHTS: [(char, u64); 26] = [
    ('e', 127), ('t', 91), ('a', 82), ('o', 75), ('i', 70), ('n', 67), ('s', 63),
    ('h', 61), ('r', 60), ('d', 43), ('l', 40), ('c', 28), ('u', 28), ('m', 24),
    ('w', 24), ('f', 22), ('g', 20), ('y', 20), ('p', 19), ('b', 15), ('v', 10),
    ('k', 8), ('j', 2), ('x', 2), ('q', 1), ('z', 1),
];

/// Pseudo-random lowercase text with English letter frequencies.
fn english_like(seed: u64, len: usize) -> String {
    let total: u64 = ENGLISH_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut state = seed;
    let mut out = String::with_capacity(len);

    for _ in 0..len {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let mut r = (state >> 33) % total;
        for &(c, w) in &ENGLISH_WEIGHTS {
            if r < w {
                out.push(c);
                break;
            }
            r -= w;
        }
    }
    out
}

fn vigenere(plain: &str, key: &[u8]) -> String {
    plain
        .bytes()
        .enumerate()
        .map(|(i, b)| ((b - b'a' + key[i % key.len()]) % 26 + b'a') as char)
        .collect()
}

fn english_profile() -> LanguageProfile {
    LanguageProfile::extract(
        &english_like(7, 5000),
        &AlphabetRules::default(),
        &Collator::default(),
        &FilterConfig::default(),
    )
    .unwrap()
}

fn friedman(key: &[u8]) -> f64 {
    let mut session = Session::with_text(
        &vigenere(&english_like(42, 3000), key),
        AnalyzerConfig::default(),
    );
    session.set_profile(english_profile());
    session.number_of_alphabets_estimate().value().unwrap()
}

/// Friedman's test tells a monoalphabetic cipher from short Vigenère keys
#[test]
fn test_friedman_estimates_key_length() {
    let one = friedman(&[3]);
    let two = friedman(&[3, 17]);
    let three = friedman(&[3, 17, 8]);

    assert!((one - 1.0).abs() < 0.5, "one alphabet: {one}");
    assert!((two - 2.0).abs() < 0.5, "two alphabets: {two}");
    assert!(one < two && two < three);
}

/// k blocks of 2000 characters, each shifted by a different amount, read as k alphabets
#[test]
fn test_friedman_on_concatenated_blocks() {
    let shifts = [0u8, 7, 14, 21];
    for k in 1..=shifts.len() {
        let plain = english_like(42, 2000 * k);
        let cipher: String = (0..k)
            .map(|i| vigenere(&plain[i * 2000..(i + 1) * 2000], &shifts[i..=i]))
            .collect();

        let ct = Ciphertext::new(&cipher, &Collator::default());
        let filter = FilterConfig::default();
        let estimate =
            estimate_number_of_alphabets(&ct, &IgnoreSet::new(), &filter, 0.065, 26).unwrap();
        assert!((estimate - k as f64).abs() < 0.25, "{k} blocks: {estimate}");
    }
}

#[test]
fn test_estimate_needs_profile() {
    let session = Session::with_text("ABCABC", AnalyzerConfig::default());
    assert_eq!(
        session.number_of_alphabets_estimate(),
        AlphabetEstimate::CannotEstimate(EstimateUnavailable::NoProfile)
    );
    assert_eq!(session.number_of_alphabets_estimate().to_string(), "---");
}

/// Kasiski finds the repeated CSASTP of "CRYPTO" enciphered twice with key ABCD
#[test]
fn test_kasiski_on_vigenere() {
    let session = Session::with_text("CSASTPKVSIQUTGQUCSASTPIUAQJB", AnalyzerConfig::default());
    let repeats = session.kasiski();

    let longest = &repeats[0];
    assert_eq!(longest.sequence().as_str(), "CSASTP");
    assert_eq!(longest.positions(), &[0, 16]);
    assert_eq!(longest.distances(), &[16]);
    assert_eq!(longest.factors(), &[vec![2usize, 2, 2, 2]]);

    let qu = repeats
        .iter()
        .find(|e| e.sequence().as_str() == "QU")
        .unwrap();
    assert_eq!(qu.distances(), &[4]);
}

#[test]
fn test_kasiski_min_length_and_order() {
    let config = AnalyzerConfig {
        kasiski_min_length: 5,
        ..Default::default()
    };
    let session = Session::with_text("CSASTPKVSIQUTGQUCSASTPIUAQJB", config);
    let mut repeats = session.kasiski();
    assert_eq!(repeats.len(), 3);
    assert!(repeats.iter().all(|e| e.length() >= 5));

    picklock::analysis::sort_entries(&mut repeats, KasiskiOrder::Frequency);
    assert_eq!(repeats[0].sequence().as_str(), "CSASTP");
}

/// A full Vigenère key entered slot by slot deciphers the text
#[test]
fn test_vigenere_key_recovers_plaintext() {
    let plain = english_like(42, 300);
    let key = [3u8, 17, 8];
    let mut session = Session::with_text(&vigenere(&plain, &key), AnalyzerConfig::default());
    session.set_profile(english_profile());

    let collator = session.collator().clone();
    let selections: Vec<BTreeMap<CharKey, CharKey>> = key
        .iter()
        .map(|shift| {
            (b'a'..=b'z')
                .map(|p| {
                    let c = (p - b'a' + shift) % 26 + b'a';
                    (
                        collator.key(&(c as char).to_string()),
                        collator.key(&(p as char).to_string()),
                    )
                })
                .collect()
        })
        .collect();

    let substitution = session.substitution_mut();
    substitution.set_number_of_alphabets(3).unwrap();
    substitution.set_selections(&selections).unwrap();

    assert_eq!(session.plaintext(), plain);
}

#[test]
fn test_polyalphabetic_frequencies_split_by_key_position() {
    let mut session = Session::with_text("AB AB AB", AnalyzerConfig::default());
    session.substitution_mut().set_number_of_alphabets(2).unwrap();

    let report = session.frequencies().unwrap();
    let FrequencyReport::Polyalphabetic { alphabets } = report else {
        panic!("expected one table per alphabet");
    };
    let a = session.collator().key("A");
    let b = session.collator().key("B");
    assert_eq!(alphabets[0].get(&a), 3);
    assert_eq!(alphabets[0].get(&b), 0);
    assert_eq!(alphabets[1].get(&b), 3);
    assert_eq!(alphabets[1].get(&a), 0);
}

/// Precomposed and decomposed accents are the same letter
#[test]
fn test_canonically_equivalent_characters_count_together() {
    let session = Session::with_text("caf\u{e9} cafe\u{301}", AnalyzerConfig::default());
    let report = session.frequencies().unwrap();
    let characters = report.characters(0).unwrap();

    assert_eq!(characters.get(&session.collator().key("\u{e9}")), 2);
    assert_eq!(characters.total(), 8);
}

#[test]
fn test_profile_saved_and_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("english.json");

    let profile = english_profile();
    profile.save(&path).unwrap();
    let loaded = LanguageProfile::load(&path).unwrap();

    assert_eq!(loaded.locale(), profile.locale());
    assert_eq!(loaded.characters(), profile.characters());
    assert_eq!(loaded.bigrams(), profile.bigrams());
    assert_eq!(loaded.alphabet().len(), 26);
}

#[test]
fn test_events_through_channel() {
    let mut session = Session::with_text("ABC", AnalyzerConfig::default());
    let events = session.substitution_mut().channel();

    session.substitution_mut().set_number_of_alphabets(2).unwrap();
    session.load_text("XYZ");

    let received: Vec<SubstitutionEvent> = events.try_iter().collect();
    assert_eq!(
        received,
        vec![
            SubstitutionEvent::NumberOfAlphabetsChanged { count: 2 },
            SubstitutionEvent::NumberOfAlphabetsChanged { count: 1 },
            SubstitutionEvent::CipherAlphabetChanged { alphabet: None },
        ]
    );
}

#[test]
fn test_config_from_json_drives_session() {
    let config = AnalyzerConfig::from_json(
        r#"{ "locale": "es", "filter": { "ignore_whitespace": false } }"#,
    )
    .unwrap();
    let session = Session::with_text("A B", config);

    assert_eq!(session.collator().locale().language(), "es");
    assert_eq!(session.substitution().cipher_alphabet().len(), 3);
}
