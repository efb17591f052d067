//! Translation resolution: ordered backend fallback, caching, language
//! detection, and date localization.
//!
//! The resolver's one promise is totality: [`Translator::translate`] always
//! returns *some* string. A cache hit, a text already in the target
//! language, a translation won from any backend in the chain, or — when
//! every backend fails — the original text, recorded as a negative cache
//! entry so the failing chain is not walked again for the same input.

pub mod backends;

use crate::cache::TranslationCache;
use crate::config::RunConfig;
use crate::utils::truncate_for_log;
use backends::{LibreTranslate, Lingva, MyMemory, TranslateBackend};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Minimum trimmed length for an accepted candidate. Anything shorter is
/// indistinguishable from a backend error page or an empty echo.
const MIN_CANDIDATE_CHARS: usize = 10;

/// whatlang speaks ISO 639-3; the translation APIs speak ISO 639-1.
static ISO_639_1: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("eng", "en"),
        ("fra", "fr"),
        ("deu", "de"),
        ("spa", "es"),
        ("ita", "it"),
        ("por", "pt"),
        ("nld", "nl"),
        ("rus", "ru"),
        ("ukr", "uk"),
        ("pol", "pl"),
        ("ces", "cs"),
        ("slk", "sk"),
        ("hun", "hu"),
        ("ron", "ro"),
        ("bul", "bg"),
        ("ell", "el"),
        ("swe", "sv"),
        ("dan", "da"),
        ("fin", "fi"),
        ("tur", "tr"),
        ("ara", "ar"),
        ("heb", "he"),
        ("hin", "hi"),
        ("jpn", "ja"),
        ("kor", "ko"),
        ("cmn", "zh"),
        ("vie", "vi"),
        ("ind", "id"),
        ("cat", "ca"),
        ("lit", "lt"),
        ("lav", "lv"),
        ("est", "et"),
        ("hrv", "hr"),
        ("srp", "sr"),
    ])
});

/// English → French month and weekday tokens, long forms before
/// abbreviations so `January` is consumed before `Jan` can match inside it.
static DATE_TOKENS_FR: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("January", "janvier"),
        ("February", "février"),
        ("March", "mars"),
        ("April", "avril"),
        ("May", "mai"),
        ("June", "juin"),
        ("July", "juillet"),
        ("August", "août"),
        ("September", "septembre"),
        ("October", "octobre"),
        ("November", "novembre"),
        ("December", "décembre"),
        ("Jan", "janv."),
        ("Feb", "févr."),
        ("Mar", "mars"),
        ("Apr", "avr."),
        ("Jun", "juin"),
        ("Jul", "juill."),
        ("Aug", "août"),
        ("Sep", "sept."),
        ("Oct", "oct."),
        ("Nov", "nov."),
        ("Dec", "déc."),
        ("Monday", "lundi"),
        ("Tuesday", "mardi"),
        ("Wednesday", "mercredi"),
        ("Thursday", "jeudi"),
        ("Friday", "vendredi"),
        ("Saturday", "samedi"),
        ("Sunday", "dimanche"),
        ("Mon", "lun"),
        ("Tue", "mar"),
        ("Wed", "mer"),
        ("Thu", "jeu"),
        ("Fri", "ven"),
        ("Sat", "sam"),
        ("Sun", "dim"),
    ]
});

/// Resolves texts into the target language through an ordered chain of
/// fallible backends, memoized in a shared persistent cache.
pub struct Translator {
    backends: Vec<Box<dyn TranslateBackend>>,
    cache: Arc<TranslationCache>,
    target: String,
    default_source: String,
}

impl Translator {
    /// Build the production backend chain: MyMemory, then LibreTranslate,
    /// then Lingva.
    pub fn new(config: &RunConfig, cache: Arc<TranslationCache>) -> Self {
        let backends: Vec<Box<dyn TranslateBackend>> = vec![
            Box::new(MyMemory::new()),
            Box::new(LibreTranslate::new()),
            Box::new(Lingva::new()),
        ];
        Self::with_backends(
            backends,
            cache,
            &config.target_lang,
            &config.default_source_lang,
        )
    }

    /// Build a resolver over an arbitrary backend chain.
    pub fn with_backends(
        backends: Vec<Box<dyn TranslateBackend>>,
        cache: Arc<TranslationCache>,
        target: &str,
        default_source: &str,
    ) -> Self {
        Self {
            backends,
            cache,
            target: target.to_string(),
            default_source: default_source.to_string(),
        }
    }

    /// Detect the ISO 639-1 language code of `text`, if detection is
    /// confident enough to name one we can feed to the backends.
    pub fn detect_lang(text: &str) -> Option<String> {
        let info = whatlang::detect(text)?;
        ISO_639_1
            .get(info.lang().code())
            .map(|code| (*code).to_string())
    }

    /// Whether `text` already reads as the target language.
    pub fn is_target_lang(&self, text: &str) -> bool {
        Self::detect_lang(text).as_deref() == Some(self.target.as_str())
    }

    /// Resolve `text` into the target language. Total: always returns some
    /// string, falling back to the input itself when every backend fails.
    pub async fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        let key = TranslationCache::key(text);
        if let Some(hit) = self.cache.get(&key) {
            debug!(preview = %truncate_for_log(text, 40), "Translation cache hit");
            return hit;
        }

        let source = match Self::detect_lang(text) {
            Some(lang) if lang == self.target => {
                // Already in the target language; remember that and skip
                // the backends entirely.
                self.cache.insert_original(&key, text);
                return text.to_string();
            }
            Some(lang) => lang,
            None => self.default_source.clone(),
        };

        for backend in &self.backends {
            match backend.attempt(text, &source, &self.target).await {
                Ok(Some(candidate)) => {
                    let trimmed = candidate.trim();
                    if !trimmed.is_empty() && trimmed.chars().count() > MIN_CANDIDATE_CHARS {
                        info!(backend = backend.name(), source = %source, "Translation accepted");
                        self.cache.insert_translation(&key, &candidate);
                        return candidate;
                    }
                    debug!(backend = backend.name(), "Candidate too short, trying next backend");
                }
                Ok(None) => {
                    debug!(backend = backend.name(), "Backend had no usable translation");
                }
                Err(e) => {
                    warn!(backend = backend.name(), error = %e, "Backend attempt failed");
                }
            }
        }

        warn!(
            preview = %truncate_for_log(text, 50),
            "All translation backends failed; keeping original text"
        );
        self.cache.insert_original(&key, text);
        text.to_string()
    }

    /// Localize a free-form date string into `DD <month> YYYY à HH:MM`.
    ///
    /// Feeds publish dates in anything from RFC 2822 to bare `YYYY-MM-DD`;
    /// a parse ladder covers the common shapes. When nothing parses, the
    /// month/weekday token substitution is applied to the raw string so at
    /// least the readable parts come out localized. Never fails.
    pub fn localize_date(&self, raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return String::new();
        }
        match parse_flexible(raw) {
            Some(dt) => substitute_tokens(&dt.format("%d %B %Y à %H:%M").to_string()),
            None => {
                debug!(raw = %raw, "Unparseable date, substituting tokens in place");
                substitute_tokens(raw)
            }
        }
    }
}

fn parse_flexible(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc2822(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%d %B %Y %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    for format in ["%Y-%m-%d", "%d/%m/%Y", "%d %B %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, format) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

fn substitute_tokens(text: &str) -> String {
    let mut out = text.to_string();
    for (english, french) in DATE_TOKENS_FR.iter() {
        out = out.replace(english, french);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::BoxError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ENGLISH: &str = "The government announced today a series of new economic measures \
                           intended to support small businesses across the country.";
    const FRENCH: &str = "Le gouvernement a annoncé aujourd'hui une série de nouvelles mesures \
                          économiques destinées à soutenir les petites entreprises du pays.";

    struct FixedBackend {
        reply: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedBackend {
        fn new(reply: Option<&'static str>) -> Self {
            Self {
                reply,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn counted(reply: Option<&'static str>, calls: Arc<AtomicUsize>) -> Self {
            Self { reply, calls }
        }
    }

    #[async_trait]
    impl TranslateBackend for FixedBackend {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn attempt(
            &self,
            _text: &str,
            _source: &str,
            _target: &str,
        ) -> Result<Option<String>, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.map(|s| s.to_string()))
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl TranslateBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn attempt(
            &self,
            _text: &str,
            _source: &str,
            _target: &str,
        ) -> Result<Option<String>, BoxError> {
            Err("backend unreachable".into())
        }
    }

    fn scratch_cache() -> (tempfile::TempDir, Arc<TranslationCache>) {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(TranslationCache::load(dir.path().join("cache.json")));
        (dir, cache)
    }

    fn translator_with(
        backends: Vec<Box<dyn TranslateBackend>>,
        cache: Arc<TranslationCache>,
    ) -> Translator {
        Translator::with_backends(backends, cache, "fr", "en")
    }

    #[tokio::test]
    async fn test_blank_input_unchanged() {
        let (_dir, cache) = scratch_cache();
        let translator = translator_with(vec![Box::new(FailingBackend)], cache.clone());
        assert_eq!(translator.translate("   ").await, "   ");
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_warm_cache_is_idempotent_and_makes_no_calls() {
        let (_dir, cache) = scratch_cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = Box::new(FixedBackend::counted(Some(FRENCH), calls.clone()));
        let translator = translator_with(vec![backend], cache);

        let first = translator.translate(ENGLISH).await;
        let second = translator.translate(ENGLISH).await;
        assert_eq!(first, FRENCH);
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1, "second call must be served from cache");
    }

    #[tokio::test]
    async fn test_fallback_to_second_backend() {
        let (_dir, cache) = scratch_cache();
        let translator = translator_with(
            vec![
                Box::new(FailingBackend),
                Box::new(FixedBackend::new(Some(FRENCH))),
            ],
            cache,
        );
        assert_eq!(translator.translate(ENGLISH).await, FRENCH);
    }

    #[tokio::test]
    async fn test_all_backends_fail_returns_input_and_negative_caches() {
        let (_dir, cache) = scratch_cache();
        let translator = translator_with(
            vec![Box::new(FailingBackend), Box::new(FixedBackend::new(None))],
            cache.clone(),
        );

        assert_eq!(translator.translate(ENGLISH).await, ENGLISH);
        let key = TranslationCache::key(ENGLISH);
        assert_eq!(cache.get(&key).as_deref(), Some(ENGLISH));
    }

    #[tokio::test]
    async fn test_target_language_is_a_no_op() {
        let (_dir, cache) = scratch_cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = FixedBackend::counted(Some("should never be used ever"), calls.clone());
        let translator = translator_with(vec![Box::new(backend)], cache.clone());

        let result = translator.translate(FRENCH).await;
        assert_eq!(result, FRENCH);
        assert_eq!(calls.load(Ordering::SeqCst), 0, "no outbound call for target-language text");
        // cached as itself, so the next run short-circuits too
        assert_eq!(
            cache.get(&TranslationCache::key(FRENCH)).as_deref(),
            Some(FRENCH)
        );
    }

    #[tokio::test]
    async fn test_short_candidates_rejected() {
        let (_dir, cache) = scratch_cache();
        let translator = translator_with(
            vec![
                Box::new(FixedBackend::new(Some("court"))),
                Box::new(FixedBackend::new(Some(FRENCH))),
            ],
            cache,
        );
        assert_eq!(translator.translate(ENGLISH).await, FRENCH);
    }

    #[test]
    fn test_detect_lang() {
        assert_eq!(Translator::detect_lang(ENGLISH).as_deref(), Some("en"));
        assert_eq!(Translator::detect_lang(FRENCH).as_deref(), Some("fr"));
    }

    #[test]
    fn test_localize_date_rfc2822() {
        let (_dir, cache) = scratch_cache();
        let translator = translator_with(vec![], cache);
        assert_eq!(
            translator.localize_date("Fri, 15 Mar 2024 10:30:00 GMT"),
            "15 mars 2024 à 10:30"
        );
    }

    #[test]
    fn test_localize_date_rfc3339() {
        let (_dir, cache) = scratch_cache();
        let translator = translator_with(vec![], cache);
        assert_eq!(
            translator.localize_date("2024-01-05T08:00:00Z"),
            "05 janvier 2024 à 08:00"
        );
    }

    #[test]
    fn test_localize_date_bare_date() {
        let (_dir, cache) = scratch_cache();
        let translator = translator_with(vec![], cache);
        assert_eq!(
            translator.localize_date("2024-03-15"),
            "15 mars 2024 à 00:00"
        );
    }

    #[test]
    fn test_localize_date_unparseable_substitutes_tokens() {
        let (_dir, cache) = scratch_cache();
        let translator = translator_with(vec![], cache);
        assert_eq!(
            translator.localize_date("Published Monday, in January"),
            "Published lundi, in janvier"
        );
        assert_eq!(translator.localize_date(""), "");
    }

    #[test]
    fn test_token_order_long_before_short() {
        // "March" must become "mars", not "mars" + a stray "ch" from "Mar".
        assert_eq!(substitute_tokens("March"), "mars");
        assert_eq!(substitute_tokens("Jan"), "janv.");
    }
}
