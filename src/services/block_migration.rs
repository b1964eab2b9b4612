use crate::database::BlockRepository;
use crate::domain::Block;
use crate::error::Result;
use chrono::Utc;

/// Changed blocks are written in transactions of this many records.
pub const FLUSH_BATCH_SIZE: usize = 100;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    /// Blocks that needed a change.
    pub migrated: usize,
    /// Transactions written, the final one included.
    pub flushes: usize,
}

/// Moves a legacy `name` setting to `code` and drops the unused `orientation`
/// setting of containers. With `update_name` the block's name follows the
/// migrated code. Returns whether anything changed.
pub fn migrate_block(block: &mut Block, update_name: bool) -> bool {
    let mut changed = false;

    if block.is_container() && block.settings.remove("orientation").is_some() {
        changed = true;
    }

    if let Some(legacy) = block.settings.remove("name") {
        block.settings.insert("code".to_string(), legacy);
        if update_name {
            if let Some(code) = block.setting("code").and_then(|code| code.as_str()) {
                block.name = code.to_string();
            }
        }
        changed = true;
    }

    changed
}

/// Migrates the settings of every stored block. Blocks already in the new
/// shape are left untouched, so running it twice is harmless.
pub async fn migrate_block_settings(
    repo: &dyn BlockRepository,
    update_name: bool,
) -> Result<MigrationReport> {
    let mut report = MigrationReport::default();
    let mut pending = Vec::with_capacity(FLUSH_BATCH_SIZE);

    for mut block in repo.get_all_blocks().await? {
        if !migrate_block(&mut block, update_name) {
            continue;
        }

        block.updated_at = Utc::now().naive_utc();
        pending.push(block);
        report.migrated += 1;

        if pending.len() == FLUSH_BATCH_SIZE {
            repo.save_blocks(&pending).await?;
            report.flushes += 1;
            pending.clear();
        }
    }

    repo.save_blocks(&pending).await?;
    report.flushes += 1;

    tracing::info!(migrated = report.migrated, flushes = report.flushes, "block settings migrated");

    Ok(report)
}
