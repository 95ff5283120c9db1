//! Transform: translate, then romanize, each record's title and text.
//!
//! Both steps degrade instead of failing. Translation is retried under the
//! configured [`RetryPolicy`] and falls back to the original text once the
//! attempts are used up; a transliteration error falls back to the
//! (translated) input. Empty strings skip both collaborators.

use std::path::Path;
use std::time::Instant;

use storyvoice_services::Translator;
use storyvoice_shared::{Result, StoryRecord, TransformConfig};
use storyvoice_transliterate::Transliterator;
use tracing::{error, info, instrument, warn};

use crate::pipeline::ProgressReporter;
use crate::report::{RecordOutcome, SkipReason, Stage, StageOutput, StageReport};
use crate::retry::{RetryPolicy, retry};

/// Borrowed collaborators and settings for one stage invocation.
struct Transformer<'a> {
    translator: &'a dyn Translator,
    transliterator: &'a dyn Transliterator,
    config: &'a TransformConfig,
    policy: RetryPolicy,
}

impl Transformer<'_> {
    async fn translate(&self, id: &str, field: &str, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let translator = self.translator;
        let lang = self.config.target_lang.as_str();
        match retry(self.policy, move |_| translator.translate(text, lang)).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!(
                    id,
                    field,
                    attempts = self.policy.max_attempts,
                    error = %e,
                    "translation failed, keeping original text"
                );
                text.to_string()
            }
        }
    }

    fn romanize(&self, id: &str, field: &str, text: String) -> String {
        if text.is_empty() {
            return text;
        }

        match self.transliterator.transliterate(
            &text,
            &self.config.from_scheme,
            &self.config.to_scheme,
        ) {
            Ok(romanized) => romanized,
            Err(e) => {
                warn!(id, field, error = %e, "transliteration failed, keeping input text");
                text
            }
        }
    }

    async fn record(&self, mut record: StoryRecord) -> std::result::Result<StoryRecord, SkipReason> {
        if record.id.trim().is_empty() {
            return Err(SkipReason::InvalidRecord("blank id".into()));
        }

        let title = self.translate(&record.id, "title", &record.title).await;
        let text = self.translate(&record.id, "text", &record.text).await;

        record.title_translated_romanized = Some(self.romanize(&record.id, "title", title));
        record.text_translated_romanized = Some(self.romanize(&record.id, "text", text));
        Ok(record)
    }
}

/// Translate and romanize every record in order.
#[instrument(skip_all, fields(records = records.len(), target_lang = %config.target_lang))]
pub async fn transform(
    records: Vec<StoryRecord>,
    translator: &dyn Translator,
    transliterator: &dyn Transliterator,
    config: &TransformConfig,
    progress: &dyn ProgressReporter,
) -> StageOutput<StoryRecord> {
    let start = Instant::now();
    let mut report = StageReport::new(Stage::Transform);
    report.input_count = records.len();
    progress.stage_started(Stage::Transform);
    info!("transform started");

    let transformer = Transformer {
        translator,
        transliterator,
        config,
        policy: RetryPolicy::from(config),
    };

    let total = records.len();
    let mut output = Vec::with_capacity(total);

    for (i, record) in records.into_iter().enumerate() {
        progress.item(Stage::Transform, &record.id, i + 1, total);
        let id = record.id.clone();

        match transformer.record(record).await {
            Ok(done) => {
                report.record(RecordOutcome::succeeded(Stage::Transform, id));
                output.push(done);
            }
            Err(reason) => report.record(RecordOutcome::skipped(Stage::Transform, id, reason)),
        }
    }

    report.elapsed = start.elapsed();
    report.log_completion();
    progress.stage_finished(&report);

    StageOutput {
        records: output,
        report,
    }
}

/// Load `input`, [`transform`] it and persist the survivors to `output`.
///
/// A missing or unreadable input file yields an empty result, not an error.
pub async fn run(
    input: &Path,
    output: &Path,
    translator: &dyn Translator,
    transliterator: &dyn Transliterator,
    config: &TransformConfig,
    progress: &dyn ProgressReporter,
) -> Result<StageOutput<StoryRecord>> {
    let records = match storyvoice_store::load(input) {
        Ok(records) => records,
        Err(e) if e.is_input_error() => {
            let mut report = StageReport::new(Stage::Transform);
            report.input_error(input.display().to_string(), e.to_string());
            progress.stage_finished(&report);
            return Ok(StageOutput::empty(report));
        }
        Err(e) => return Err(e),
    };

    let mut result = transform(records, translator, transliterator, config, progress).await;
    if result.records.is_empty() {
        warn!("no records to write");
        return Ok(result);
    }

    match storyvoice_store::save(output, &result.records) {
        Ok(()) => result.report.output_path = Some(output.to_path_buf()),
        Err(e) => {
            error!(path = %output.display(), error = %e, "failed to save transformed stories");
            result.report.persist_error = Some(e.to_string());
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use storyvoice_transliterate::SchemeTransliterator;

    use super::*;
    use crate::pipeline::SilentProgress;
    use crate::testing::{
        FixedTranslator, ScriptedTranslator, StubTransliterator, record, temp_dir,
    };

    fn config() -> TransformConfig {
        TransformConfig {
            target_lang: "hi".into(),
            from_scheme: "devanagari".into(),
            to_scheme: "itrans".into(),
            max_attempts: 3,
            retry_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn translates_then_romanizes() {
        let translator = ScriptedTranslator::ok();
        let transliterator = StubTransliterator::upper();

        let out = transform(
            vec![record("a")],
            &translator,
            &transliterator,
            &config(),
            &SilentProgress,
        )
        .await;

        let r = &out.records[0];
        assert_eq!(r.title_translated_romanized.as_deref(), Some("[HI] MY PARTNER'S SECRET"));
        assert!(r.romanized_text().unwrap().starts_with("[HI] IT STARTED"));
        // Stage-1 fields survive untouched.
        assert_eq!(r.title, "My partner's secret");
        assert_eq!(r.score, 10);
        assert_eq!(translator.calls(), 2);
    }

    #[tokio::test]
    async fn recovers_within_attempt_budget() {
        let translator = ScriptedTranslator::failing_first(2);
        let transliterator = StubTransliterator::upper();
        let mut only_title = record("a");
        only_title.text = String::new();

        let out = transform(
            vec![only_title],
            &translator,
            &transliterator,
            &config(),
            &SilentProgress,
        )
        .await;

        assert_eq!(translator.calls(), 3);
        assert_eq!(
            out.records[0].title_translated_romanized.as_deref(),
            Some("[HI] MY PARTNER'S SECRET")
        );
    }

    #[tokio::test]
    async fn exhausted_translation_falls_back_to_original() {
        let translator = ScriptedTranslator::always_failing();
        let transliterator = StubTransliterator::upper();
        let original = record("a");

        let out = transform(
            vec![original.clone()],
            &translator,
            &transliterator,
            &config(),
            &SilentProgress,
        )
        .await;

        // Three attempts each for title and text.
        assert_eq!(translator.calls(), 6);
        let r = &out.records[0];
        assert_eq!(
            r.title_translated_romanized.as_deref(),
            Some(original.title.to_uppercase().as_str())
        );
        assert_eq!(out.report.succeeded(), 1);
    }

    #[tokio::test]
    async fn exhausted_translation_with_identity_romanization_equals_original() {
        let translator = ScriptedTranslator::always_failing();
        let original = record("a");

        let out = transform(
            vec![original.clone()],
            &translator,
            &SchemeTransliterator,
            &config(),
            &SilentProgress,
        )
        .await;

        // Latin text passes through the Devanagari tables untouched.
        let r = &out.records[0];
        assert_eq!(r.title_translated_romanized.as_deref(), Some(original.title.as_str()));
        assert_eq!(r.text_translated_romanized.as_deref(), Some(original.text.as_str()));
    }

    #[tokio::test]
    async fn transliteration_error_keeps_translation() {
        let translator = ScriptedTranslator::ok();
        let transliterator = StubTransliterator::failing();

        let out = transform(
            vec![record("a")],
            &translator,
            &transliterator,
            &config(),
            &SilentProgress,
        )
        .await;

        assert_eq!(
            out.records[0].title_translated_romanized.as_deref(),
            Some("[hi] My partner's secret")
        );
    }

    #[tokio::test]
    async fn empty_fields_skip_collaborators() {
        let translator = ScriptedTranslator::ok();
        let transliterator = StubTransliterator::upper();
        let mut blank = record("a");
        blank.title = String::new();
        blank.text = String::new();

        let out = transform(
            vec![blank],
            &translator,
            &transliterator,
            &config(),
            &SilentProgress,
        )
        .await;

        assert_eq!(translator.calls(), 0);
        assert_eq!(transliterator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(out.records[0].title_translated_romanized.as_deref(), Some(""));
        assert_eq!(out.records[0].text_translated_romanized.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn devanagari_translation_is_romanized() {
        let translator = FixedTranslator("मेरी कहानी");

        let out = transform(
            vec![record("a")],
            &translator,
            &SchemeTransliterator,
            &config(),
            &SilentProgress,
        )
        .await;

        assert_eq!(out.records[0].romanized_text(), Some("merI kahAnI"));
    }

    #[tokio::test]
    async fn blank_id_is_dropped_and_processing_continues() {
        let translator = ScriptedTranslator::ok();
        let transliterator = StubTransliterator::upper();

        let out = transform(
            vec![record("a"), record("  "), record("c")],
            &translator,
            &transliterator,
            &config(),
            &SilentProgress,
        )
        .await;

        let ids: Vec<&str> = out.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(out.report.input_count, 3);
        assert_eq!(out.report.failed(), 1);
    }

    #[tokio::test]
    async fn missing_input_is_empty_not_error() {
        let dir = temp_dir();
        let translator = ScriptedTranslator::ok();
        let transliterator = StubTransliterator::upper();

        let out = run(
            &dir.join("reddit_stories.json"),
            &dir.join("romanized.json"),
            &translator,
            &transliterator,
            &config(),
            &SilentProgress,
        )
        .await
        .unwrap();

        assert!(out.records.is_empty());
        assert_eq!(out.report.source_errors.len(), 1);
        assert!(!dir.join("romanized.json").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn malformed_input_is_empty_not_error() {
        let dir = temp_dir();
        let input = dir.join("reddit_stories.json");
        std::fs::write(&input, "not json").unwrap();
        let translator = ScriptedTranslator::ok();
        let transliterator = StubTransliterator::upper();

        let out = run(
            &input,
            &dir.join("romanized.json"),
            &translator,
            &transliterator,
            &config(),
            &SilentProgress,
        )
        .await
        .unwrap();

        assert!(out.records.is_empty());
        assert_eq!(translator.calls(), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn non_utf8_input_is_empty_not_error() {
        let dir = temp_dir();
        let input = dir.join("reddit_stories.json");
        std::fs::write(&input, b"[{\"id\":\"a\",\"title\":\"\xff\xfe\"}]").unwrap();
        let translator = ScriptedTranslator::ok();
        let transliterator = StubTransliterator::upper();

        let out = run(
            &input,
            &dir.join("romanized.json"),
            &translator,
            &transliterator,
            &config(),
            &SilentProgress,
        )
        .await
        .unwrap();

        assert!(out.records.is_empty());
        assert_eq!(out.report.source_errors.len(), 1);
        assert!(out.report.source_errors[0].message.contains("malformed"));
        assert!(!dir.join("romanized.json").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn run_persists_survivors() {
        let dir = temp_dir();
        let input = dir.join("reddit_stories.json");
        let output = dir.join("romanized.json");
        storyvoice_store::save(&input, &[record("a"), record("b")]).unwrap();

        let translator = ScriptedTranslator::ok();
        let transliterator = StubTransliterator::upper();
        let out = run(
            &input,
            &output,
            &translator,
            &transliterator,
            &config(),
            &SilentProgress,
        )
        .await
        .unwrap();

        assert!(out.has_output());
        let saved = storyvoice_store::load(&output).unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved.iter().all(|r| r.romanized_text().is_some()));
        // The input file is left as it was.
        assert!(storyvoice_store::load(&input).unwrap()[0]
            .title_translated_romanized
            .is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn save_failure_is_reported_with_records_in_memory() {
        let dir = temp_dir();
        let input = dir.join("reddit_stories.json");
        storyvoice_store::save(&input, &[record("a")]).unwrap();

        // A directory where the output file should go.
        let output = dir.join("occupied");
        std::fs::create_dir_all(output.join("child")).unwrap();

        let translator = ScriptedTranslator::ok();
        let transliterator = StubTransliterator::upper();
        let out = run(
            &input,
            &output,
            &translator,
            &transliterator,
            &config(),
            &SilentProgress,
        )
        .await
        .unwrap();

        assert_eq!(out.records.len(), 1);
        assert!(out.report.persist_error.is_some());
        assert!(out.report.output_path.is_none());
        assert!(!out.has_output());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
