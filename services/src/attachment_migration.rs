//! Moves issue attachments from the legacy media root into the S3 bucket.
//!
//! Every file row whose path is not yet prefixed is copied to
//! `<prefix><path>` in the target store. Depending on the rewrite policy the
//! row is then pointed at the new key. Progress goes to `out` as
//! `Note: ...` lines; a dry run reports the same steps without writing to the
//! store or the database.

use db::models::file;
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use std::io::Write;
use storage::{S3Overlay, StorageBackend};
use tracing::{debug, info};

use crate::ServiceError;

/// When to point a file row at its bucket copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RewritePolicy {
    /// Upload only; rows keep their legacy paths.
    #[default]
    None,
    /// Rewrite every row once its object is in the bucket.
    All,
    /// Rewrite only rows whose object was already in the bucket before this run.
    OnlyExisting,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationOptions {
    /// Without it nothing is uploaded or persisted.
    pub execute: bool,
    pub rewrite: RewritePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub uploaded: usize,
    pub already_present: usize,
    pub rows_rewritten: u64,
}

pub struct AttachmentMigration<'a> {
    db: &'a DatabaseConnection,
    legacy: &'a dyn StorageBackend,
    target: &'a dyn StorageBackend,
    overlay: &'a S3Overlay,
}

impl<'a> AttachmentMigration<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        legacy: &'a dyn StorageBackend,
        target: &'a dyn StorageBackend,
        overlay: &'a S3Overlay,
    ) -> Self {
        Self {
            db,
            legacy,
            target,
            overlay,
        }
    }

    pub async fn run<W: Write>(
        &self,
        options: MigrationOptions,
        out: &mut W,
    ) -> Result<MigrationSummary, ServiceError> {
        if !options.execute {
            note(out, "Dry run")?;
        }

        let existing: HashSet<String> = self
            .target
            .list(self.overlay.prefix())
            .await?
            .into_iter()
            .collect();
        debug!(objects = existing.len(), "listed target bucket");

        let mut uploaded: HashSet<String> = HashSet::new();
        let mut summary = MigrationSummary::default();

        // Snapshot: rows rewritten mid-run are still visited under their old path.
        for row in file::Model::all_ordered(self.db).await? {
            if self.overlay.is_s3_stored(&row.path) {
                continue;
            }
            let dest = self.overlay.append_s3_prefix(&row.path);

            let rewrite = if existing.contains(&dest) {
                if options.rewrite == RewritePolicy::None {
                    continue;
                }
                note(out, &format!("destination already exists: {dest}"))?;
                summary.already_present += 1;
                true
            } else if uploaded.contains(&dest) {
                continue;
            } else {
                if options.execute {
                    let content = self.legacy.open(&row.path).await?;
                    self.target.save(&dest, &content).await?;
                }
                note(out, &format!("uploaded: {dest}"))?;
                uploaded.insert(dest.clone());
                summary.uploaded += 1;
                options.rewrite == RewritePolicy::All
            };

            if rewrite {
                note(out, &format!("updating model: {row}, {dest}"))?;
                if options.execute {
                    summary.rows_rewritten +=
                        file::Model::rewrite_path(self.db, &row.path, &dest).await?;
                    note(out, &format!("updated model: {row}, {dest}"))?;
                }
            }
        }

        info!(
            execute = options.execute,
            uploaded = summary.uploaded,
            already_present = summary.already_present,
            rows_rewritten = summary.rows_rewritten,
            "attachment migration finished"
        );
        Ok(summary)
    }
}

fn note<W: Write>(out: &mut W, message: &str) -> Result<(), ServiceError> {
    writeln!(out, "Note: {message}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::models::{course, event, event::EventPayload, issue, task, user};
    use db::test_utils::setup_test_db;
    use storage::MemoryStorage;

    struct Fixture {
        db: DatabaseConnection,
        legacy: MemoryStorage,
        target: MemoryStorage,
        overlay: S3Overlay,
        event_id: i64,
    }

    async fn fixture() -> Fixture {
        let db = setup_test_db().await;
        let course = course::Model::create(&db, "C", 2025).await.unwrap();
        let student = user::Model::create(&db, "student", "s@x", "S", "N", "pw", false)
            .await
            .unwrap();
        let task = task::Model::create(&db, course.id, "task_title", 10, None)
            .await
            .unwrap();
        let issue = issue::Model::get_or_create(&db, student.id, task.id).await.unwrap();
        let event = event::Model::create(
            &db,
            issue.id,
            Some(student.id),
            &EventPayload::File { review: None },
        )
        .await
        .unwrap();

        Fixture {
            db,
            legacy: MemoryStorage::new(),
            target: MemoryStorage::new(),
            overlay: S3Overlay::default(),
            event_id: event.id,
        }
    }

    impl Fixture {
        async fn attach(&self, path: &str, content: &[u8]) -> file::Model {
            self.legacy.save(path, content).await.unwrap();
            let filename = path.rsplit('/').next().unwrap();
            file::Model::create(&self.db, self.event_id, path, filename)
                .await
                .unwrap()
        }

        async fn run(&self, execute: bool, rewrite: RewritePolicy) -> String {
            let mut out = Vec::new();
            AttachmentMigration::new(&self.db, &self.legacy, &self.target, &self.overlay)
                .run(MigrationOptions { execute, rewrite }, &mut out)
                .await
                .unwrap();
            String::from_utf8(out).unwrap()
        }

        async fn path_of(&self, id: i64) -> String {
            use sea_orm::EntityTrait;
            file::Entity::find_by_id(id)
                .one(&self.db)
                .await
                .unwrap()
                .unwrap()
                .path
        }
    }

    const PATH: &str = "files/issue_1/event_1/test_s3_issues.py";
    const DEST: &str = "s3/files/issue_1/event_1/test_s3_issues.py";

    #[tokio::test]
    async fn dry_run_with_rewrite_reports_without_touching_anything() {
        let f = fixture().await;
        let row = f.attach(PATH, b"some text").await;

        let out = f.run(false, RewritePolicy::All).await;

        assert_eq!(
            out,
            format!(
                "Note: Dry run\nNote: uploaded: {DEST}\nNote: updating model: test_s3_issues.py, {DEST}\n"
            )
        );
        assert_eq!(f.path_of(row.id).await, PATH);
        assert!(!f.target.exists(DEST).await.unwrap());
    }

    #[tokio::test]
    async fn dry_run_without_rewrite_only_reports_upload() {
        let f = fixture().await;
        f.attach(PATH, b"some text").await;

        let out = f.run(false, RewritePolicy::OnlyExisting).await;

        assert_eq!(out, format!("Note: Dry run\nNote: uploaded: {DEST}\n"));
        assert_eq!(f.target.write_count().await, 0);
    }

    #[tokio::test]
    async fn dry_run_over_existing_destination_reports_rewrite_only() {
        for policy in [RewritePolicy::OnlyExisting, RewritePolicy::All] {
            let f = fixture().await;
            let row = f.attach(PATH, b"some text").await;
            f.target.save(DEST, b"already there").await.unwrap();
            let seeded = f.target.write_count().await;

            let out = f.run(false, policy).await;

            assert_eq!(
                out,
                format!(
                    "Note: Dry run\n\
                     Note: destination already exists: {DEST}\n\
                     Note: updating model: test_s3_issues.py, {DEST}\n"
                ),
                "{policy:?}"
            );
            assert_eq!(f.target.write_count().await, seeded);
            assert_eq!(f.target.open(DEST).await.unwrap(), b"already there");
            assert_eq!(f.path_of(row.id).await, PATH);
        }
    }

    #[tokio::test]
    async fn execute_uploads_and_keeps_legacy_path() {
        let f = fixture().await;
        let row = f.attach(PATH, b"some text").await;

        let out = f.run(true, RewritePolicy::None).await;

        assert_eq!(out, format!("Note: uploaded: {DEST}\n"));
        assert_eq!(f.path_of(row.id).await, PATH);
        assert_eq!(f.target.open(DEST).await.unwrap(), b"some text");
    }

    #[tokio::test]
    async fn execute_with_rewrite_points_row_at_bucket() {
        let f = fixture().await;
        let row = f.attach(PATH, b"some text").await;

        let out = f.run(true, RewritePolicy::All).await;

        assert_eq!(
            out,
            format!(
                "Note: uploaded: {DEST}\n\
                 Note: updating model: test_s3_issues.py, {DEST}\n\
                 Note: updated model: test_s3_issues.py, {DEST}\n"
            )
        );
        assert_eq!(f.path_of(row.id).await, DEST);

        // Second pass has nothing left to do.
        assert_eq!(f.run(true, RewritePolicy::All).await, "");
    }

    #[tokio::test]
    async fn rewrite_only_existing_takes_two_runs() {
        let f = fixture().await;
        let row = f.attach(PATH, b"some text").await;

        let first = f.run(true, RewritePolicy::OnlyExisting).await;
        assert_eq!(first, format!("Note: uploaded: {DEST}\n"));
        assert_eq!(f.path_of(row.id).await, PATH);

        let second = f.run(true, RewritePolicy::OnlyExisting).await;
        assert_eq!(
            second,
            format!(
                "Note: destination already exists: {DEST}\n\
                 Note: updating model: test_s3_issues.py, {DEST}\n\
                 Note: updated model: test_s3_issues.py, {DEST}\n"
            )
        );
        assert_eq!(f.path_of(row.id).await, DEST);
        assert_eq!(f.target.write_count().await, 1);
        assert_eq!(f.target.open(DEST).await.unwrap(), b"some text");
    }

    #[tokio::test]
    async fn shared_paths_are_uploaded_once_and_rewritten_together() {
        let f = fixture().await;
        let first = f.attach(PATH, b"some text").await;
        let second = file::Model::create(&f.db, f.event_id, PATH, "test_s3_issues.py")
            .await
            .unwrap();

        let out = f.run(true, RewritePolicy::OnlyExisting).await;
        assert_eq!(out, format!("Note: uploaded: {DEST}\n"));

        let out = f.run(true, RewritePolicy::OnlyExisting).await;
        let block = format!(
            "Note: destination already exists: {DEST}\n\
             Note: updating model: test_s3_issues.py, {DEST}\n\
             Note: updated model: test_s3_issues.py, {DEST}\n"
        );
        assert_eq!(out, block.repeat(2));
        assert_eq!(f.path_of(first.id).await, DEST);
        assert_eq!(f.path_of(second.id).await, DEST);
        assert_eq!(f.target.write_count().await, 1);
    }

    #[tokio::test]
    async fn existing_objects_are_skipped_without_a_rewrite_policy() {
        let f = fixture().await;
        f.attach(PATH, b"some text").await;
        f.target.save(DEST, b"already there").await.unwrap();

        assert_eq!(f.run(true, RewritePolicy::None).await, "");
        assert_eq!(f.target.open(DEST).await.unwrap(), b"already there");
    }

    #[tokio::test]
    async fn reads_legacy_files_from_disk() {
        use storage::{LocalStorage, config::LocalConfig};
        use tempfile::TempDir;

        let f = fixture().await;
        let dir = TempDir::new().unwrap();
        let legacy = LocalStorage::new(LocalConfig {
            base_path: dir.path().to_string_lossy().into_owned(),
        })
        .unwrap();
        legacy.save(PATH, b"on disk").await.unwrap();
        file::Model::create(&f.db, f.event_id, PATH, "test_s3_issues.py")
            .await
            .unwrap();

        let mut out = Vec::new();
        AttachmentMigration::new(&f.db, &legacy, &f.target, &f.overlay)
            .run(
                MigrationOptions {
                    execute: true,
                    rewrite: RewritePolicy::All,
                },
                &mut out,
            )
            .await
            .unwrap();

        assert_eq!(f.target.open(DEST).await.unwrap(), b"on disk");
        assert!(legacy.exists(PATH).await.unwrap());
    }
}
