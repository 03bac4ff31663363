use anyhow::{Context, Result};
use clap::Parser;
use services::attachment_migration::{AttachmentMigration, MigrationOptions, RewritePolicy};
use storage::{S3Overlay, StorageConfig, create_storage};
use util::logging::init_logging;

/// Log filter used when `LOG_LEVEL` is unset. The migration itself logs from
/// `services` and the bucket client from `storage`.
const LOG_FILTER: &str = "s3migrate=info,services=info,storage=info,db=info";

/// Copy issue attachments from the local media root into the S3 bucket.
///
/// Without --execute nothing is uploaded or written to the database; the
/// steps that would be taken are still printed.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Actually upload and persist changes
    #[arg(long)]
    execute: bool,
    /// Point every migrated attachment at its bucket copy
    #[arg(long, conflicts_with = "rewrite_only_existing")]
    do_rewrite_url: bool,
    /// Only repoint attachments whose bucket copy existed before this run
    #[arg(long)]
    rewrite_only_existing: bool,
}

impl Args {
    fn options(&self) -> MigrationOptions {
        let rewrite = if self.do_rewrite_url {
            RewritePolicy::All
        } else if self.rewrite_only_existing {
            RewritePolicy::OnlyExisting
        } else {
            RewritePolicy::None
        };
        MigrationOptions {
            execute: self.execute,
            rewrite,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging("s3migrate.log", LOG_FILTER);

    let db = db::connect().await;
    let legacy = create_storage(StorageConfig::legacy_from_config())
        .await
        .context("opening legacy attachment storage")?;
    let target = create_storage(StorageConfig::s3_from_config()?)
        .await
        .context("connecting to S3")?;
    let overlay = S3Overlay::from_config();

    let options = args.options();
    tracing::info!(?options, "starting attachment migration");

    let mut stdout = std::io::stdout().lock();
    AttachmentMigration::new(&db, legacy.as_ref(), target.as_ref(), &overlay)
        .run(options, &mut stdout)
        .await
        .context("attachment migration failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_select_rewrite_policy() {
        let args = Args::parse_from(["s3migrate"]);
        assert_eq!(args.options(), MigrationOptions::default());

        let args = Args::parse_from(["s3migrate", "--execute", "--do-rewrite-url"]);
        assert_eq!(
            args.options(),
            MigrationOptions {
                execute: true,
                rewrite: RewritePolicy::All
            }
        );

        let args = Args::parse_from(["s3migrate", "--rewrite-only-existing"]);
        assert_eq!(args.options().rewrite, RewritePolicy::OnlyExisting);
        assert!(!args.options().execute);
    }

    #[test]
    fn rewrite_flags_are_exclusive() {
        assert!(
            Args::try_parse_from(["s3migrate", "--do-rewrite-url", "--rewrite-only-existing"])
                .is_err()
        );
    }

    #[test]
    fn default_log_filter_covers_migration_targets() {
        let targets: Vec<&str> = LOG_FILTER
            .split(',')
            .filter_map(|directive| directive.split_once('='))
            .map(|(target, _)| target)
            .collect();
        for target in ["s3migrate", "services", "storage"] {
            assert!(targets.contains(&target), "{target} missing from {LOG_FILTER}");
        }
        assert!(tracing_subscriber::EnvFilter::try_new(LOG_FILTER).is_ok());
    }
}
