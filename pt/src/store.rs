//! Core TemplateStore implementation

use chrono::Utc;
use rand::Rng;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::codec::{self, ImportReport};
use crate::defaults;
use crate::error::{Result, StoreError};
use crate::settings::{FileBackend, SettingsBackend, WriteOutcome};
use crate::template::{Options, PromptTemplate, TemplateDraft, Theme, unique_timestamp_id};

/// Default number of attempts for a read-modify-write before giving up
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Backoff before the second attempt; doubles per attempt
const RETRY_BASE_DELAY: Duration = Duration::from_millis(2);

/// Upper bound for a single backoff
const RETRY_MAX_DELAY: Duration = Duration::from_millis(250);

/// Random delay in `[0, min(base * 2^(attempt-1), max)]` after a failed attempt
fn retry_delay(attempt: u32) -> Duration {
    let ceiling = RETRY_BASE_DELAY
        .saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
        .min(RETRY_MAX_DELAY);
    let micros = rand::rng().random_range(0..=ceiling.as_micros() as u64);
    Duration::from_micros(micros)
}

/// What a read-modify-write decided to do with the document
enum Change<T> {
    Write(T),
    Unchanged(T),
}

/// The prompt template store
///
/// Every mutation reads the whole settings record, edits the template list
/// and writes it back conditionally on the revision it read. If another
/// client wrote in between, the edit is replayed on the fresh record.
pub struct TemplateStore<B = FileBackend> {
    backend: B,
    max_retries: u32,
}

impl TemplateStore<FileBackend> {
    /// Open a file-backed store at the given directory
    pub fn open(path: impl AsRef<Path>, defaults: Options) -> Result<Self> {
        Ok(Self::new(FileBackend::open_with_defaults(path, defaults)?))
    }
}

impl<B: SettingsBackend> TemplateStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// All templates, newest user entries first
    pub fn list(&self) -> Result<Vec<PromptTemplate>> {
        self.backend.read()?.options.templates()
    }

    /// Look up a single template
    pub fn get(&self, id: &str) -> Result<Option<PromptTemplate>> {
        Ok(self.list()?.into_iter().find(|t| t.id == id))
    }

    /// Validate and store a new template at the front of the list
    pub fn add(&self, draft: TemplateDraft) -> Result<PromptTemplate> {
        let draft = draft.validated()?;
        let created = self.modify(|_, options| {
            let mut templates = options.templates()?;
            let id = unique_timestamp_id(Utc::now(), &templates);
            let template = draft.clone().into_template(id);
            templates.insert(0, template.clone());
            options.set_templates(&templates)?;
            Ok(Change::Write(template))
        })?;
        info!(id = %created.id, title = %created.title, "Added template");
        Ok(created)
    }

    /// Replace the template with the same ID; unknown IDs are ignored
    pub fn update(&self, template: PromptTemplate) -> Result<PromptTemplate> {
        let draft = TemplateDraft {
            title: template.title,
            content: template.content,
            category: template.category,
        }
        .validated()?;
        let updated = draft.into_template(template.id);

        let found = self.modify(|_, options| {
            let mut templates = options.templates()?;
            match templates.iter_mut().find(|t| t.id == updated.id) {
                Some(slot) => {
                    *slot = updated.clone();
                    options.set_templates(&templates)?;
                    Ok(Change::Write(true))
                }
                None => Ok(Change::Unchanged(false)),
            }
        })?;

        if found {
            info!(id = %updated.id, "Updated template");
        } else {
            debug!(id = %updated.id, "update: no template with this id");
        }
        Ok(updated)
    }

    /// Remove a template; removing an unknown ID is a no-op
    pub fn remove(&self, id: &str) -> Result<()> {
        let removed = self.modify(|_, options| {
            let mut templates = options.templates()?;
            let before = templates.len();
            templates.retain(|t| t.id != id);
            if templates.len() == before {
                return Ok(Change::Unchanged(false));
            }
            options.set_templates(&templates)?;
            Ok(Change::Write(true))
        })?;

        if removed {
            info!(id, "Removed template");
        } else {
            debug!(id, "remove: no template with this id");
        }
        Ok(())
    }

    /// Write the seed templates if the settings record has never been written
    ///
    /// Returns how many templates were seeded.
    pub fn seed_defaults(&self) -> Result<usize> {
        let seeds = defaults::seed_templates()?;
        let count = self.modify(|revision, options| {
            if revision > 0 {
                return Ok(Change::Unchanged(0));
            }
            let mut templates = options.templates()?;
            let fresh: Vec<PromptTemplate> = seeds
                .iter()
                .filter(|seed| !templates.iter().any(|t| t.id == seed.id))
                .cloned()
                .collect();
            let count = fresh.len();
            templates.extend(fresh);
            options.set_templates(&templates)?;
            Ok(Change::Write(count))
        })?;

        if count > 0 {
            info!(count, version = defaults::SEED_VERSION, "Seeded default templates");
        }
        Ok(count)
    }

    pub fn theme(&self) -> Result<Theme> {
        Ok(self.backend.read()?.options.theme)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.modify(|_, options| {
            if options.theme == theme {
                return Ok(Change::Unchanged(()));
            }
            options.theme = theme;
            Ok(Change::Write(()))
        })?;
        info!(%theme, "Set theme");
        Ok(())
    }

    /// Pretty-printed JSON of every stored template
    pub fn export(&self) -> Result<String> {
        codec::export(&self.list()?)
    }

    /// Merge templates from an import file after the existing ones
    ///
    /// Invalid entries are skipped. If none survive, nothing is written and
    /// a format error is returned.
    pub fn import(&self, input: &str) -> Result<ImportReport> {
        let batch = codec::parse_import(input)?;
        if batch.accepted.is_empty() {
            warn!(total = batch.total, "Import contained no valid templates");
            return Err(StoreError::Format("no valid templates found in import file".to_string()));
        }

        let report = batch.report();
        self.modify(|_, options| {
            let mut templates = options.templates()?;
            templates.extend(batch.accepted.iter().cloned());
            options.set_templates(&templates)?;
            Ok(Change::Write(()))
        })?;

        info!(imported = report.imported, total = report.total, "Imported templates");
        Ok(report)
    }

    fn modify<T>(&self, mut edit: impl FnMut(u64, &mut Options) -> Result<Change<T>>) -> Result<T> {
        for attempt in 1..=self.max_retries {
            let snapshot = self.backend.read()?;
            let mut options = snapshot.options;
            let value = match edit(snapshot.revision, &mut options)? {
                Change::Unchanged(value) => return Ok(value),
                Change::Write(value) => value,
            };
            match self.backend.write_if(snapshot.revision, &options)? {
                WriteOutcome::Written(revision) => {
                    debug!(revision, attempt, "modify: committed");
                    return Ok(value);
                }
                WriteOutcome::Conflict { current } => {
                    debug!(read = snapshot.revision, current, attempt, "modify: conflict");
                    if attempt < self.max_retries {
                        std::thread::sleep(retry_delay(attempt));
                    }
                }
            }
        }
        Err(StoreError::Conflict {
            attempts: self.max_retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{MemoryBackend, Snapshot};
    use std::cell::Cell;
    use tempfile::TempDir;

    fn memory_store() -> TemplateStore<MemoryBackend> {
        TemplateStore::new(MemoryBackend::new())
    }

    /// Backend where another client sneaks in a write before each of our first `n` writes
    struct RacingBackend {
        inner: MemoryBackend,
        interruptions: Cell<u32>,
    }

    impl SettingsBackend for RacingBackend {
        fn read(&self) -> Result<Snapshot> {
            self.inner.read()
        }

        fn write_if(&self, expected: u64, options: &Options) -> Result<WriteOutcome> {
            if self.interruptions.get() > 0 {
                self.interruptions.set(self.interruptions.get() - 1);
                let mut other = self.inner.read()?;
                let mut templates = other.options.templates()?;
                let id = format!("other-{}", self.interruptions.get());
                templates.push(TemplateDraft::new("Other", "From another tab").into_template(id));
                other.options.set_templates(&templates)?;
                self.inner.write_if(other.revision, &other.options)?;
            }
            self.inner.write_if(expected, options)
        }
    }

    #[test]
    fn test_retry_delay_grows_and_is_capped() {
        for _ in 0..50 {
            assert!(retry_delay(1) <= RETRY_BASE_DELAY);
            assert!(retry_delay(3) <= RETRY_BASE_DELAY * 4);
            assert!(retry_delay(40) <= RETRY_MAX_DELAY);
        }
    }

    #[test]
    fn test_add_prepends_and_trims() {
        let store = memory_store();
        let first = store.add(TemplateDraft::new("First", "one")).unwrap();
        let second = store.add(TemplateDraft::new("  Second ", " two ")).unwrap();

        let list = store.list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, second.id);
        assert_eq!(list[1].id, first.id);
        assert_eq!(list[0].title, "Second");
        assert_eq!(list[0].content, "two");
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_add_rejects_blank_fields() {
        let store = memory_store();
        store.add(TemplateDraft::new("Keep", "me")).unwrap();

        let err = store.add(TemplateDraft::new(" ", "content")).unwrap_err();
        assert!(err.is_validation());
        let err = store.add(TemplateDraft::new("title", "\t\n")).unwrap_err();
        assert!(err.is_validation());

        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_add_keeps_category() {
        let store = memory_store();
        let t = store.add(TemplateDraft::new("T", "C").with_category("work")).unwrap();
        assert_eq!(store.get(&t.id).unwrap().unwrap().category(), Some("work"));
    }

    #[test]
    fn test_update_replaces_matching_entry() {
        let store = memory_store();
        let mut t = store.add(TemplateDraft::new("Old", "content")).unwrap();
        t.title = "New".to_string();
        store.update(t.clone()).unwrap();
        assert_eq!(store.get(&t.id).unwrap().unwrap().title, "New");
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let store = memory_store();
        store.add(TemplateDraft::new("A", "B")).unwrap();
        let before = store.list().unwrap();
        let revision = store.backend().read().unwrap().revision;

        let ghost = TemplateDraft::new("Ghost", "x").into_template("does-not-exist".to_string());
        store.update(ghost).unwrap();

        assert_eq!(store.list().unwrap(), before);
        assert_eq!(store.backend().read().unwrap().revision, revision);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = memory_store();
        let t = store.add(TemplateDraft::new("A", "B")).unwrap();
        store.remove(&t.id).unwrap();
        assert!(store.get(&t.id).unwrap().is_none());
        store.remove(&t.id).unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_seed_defaults_only_on_first_run() {
        let store = memory_store();
        assert_eq!(store.seed_defaults().unwrap(), 3);
        assert_eq!(store.seed_defaults().unwrap(), 0);

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&"default-code-review".to_string()));
    }

    #[test]
    fn test_theme_roundtrip() {
        let store = TemplateStore::new(MemoryBackend::with_defaults(Options::with_theme(Theme::Dark)));
        assert_eq!(store.theme().unwrap(), Theme::Dark);
        store.set_theme(Theme::Light).unwrap();
        assert_eq!(store.theme().unwrap(), Theme::Light);
    }

    #[test]
    fn test_list_surfaces_corrupt_blob() {
        let backend = MemoryBackend::with_defaults(Options {
            prompt_templates_json: "{broken".to_string(),
            theme: Theme::Light,
        });
        let store = TemplateStore::new(backend);
        assert!(matches!(store.list(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_conflicting_write_is_retried_without_losing_updates() {
        let backend = RacingBackend {
            inner: MemoryBackend::new(),
            interruptions: Cell::new(2),
        };
        let store = TemplateStore::new(backend);
        let mine = store.add(TemplateDraft::new("Mine", "content")).unwrap();

        let list = store.list().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].id, mine.id);
        assert!(list.iter().any(|t| t.id == "other-1"));
        assert!(list.iter().any(|t| t.id == "other-0"));
    }

    #[test]
    fn test_conflict_after_max_retries() {
        let backend = RacingBackend {
            inner: MemoryBackend::new(),
            interruptions: Cell::new(10),
        };
        let store = TemplateStore::new(backend).with_max_retries(3);
        let err = store.add(TemplateDraft::new("Mine", "content")).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_file_store_persists_across_handles() {
        let temp = TempDir::new().unwrap();
        let store = TemplateStore::open(temp.path(), Options::default()).unwrap();
        let t = store.add(TemplateDraft::new("Persisted", "content")).unwrap();

        let reopened = TemplateStore::open(temp.path(), Options::default()).unwrap();
        assert_eq!(reopened.get(&t.id).unwrap().unwrap().title, "Persisted");
    }
}
