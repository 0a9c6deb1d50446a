use crate::analysis::{DetectionEngine, ScanScope, group_by_type};
use crate::cli::FixArgs;
use crate::fs::{FileSystem, default_fs};
use crate::host::{CommandSink, DocumentHost, HostCommand, NodeTree};
use crate::model::IssueType;
use crate::style;

use super::CommandContext;

pub fn cmd_fix(args: FixArgs) -> i32 {
    cmd_fix_with_fs(args, default_fs())
}

pub fn cmd_fix_with_fs(args: FixArgs, fs: &dyn FileSystem) -> i32 {
    let mut ctx = match CommandContext::new(&args.document, &args.thresholds, fs) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let min_font_size = ctx.config.thresholds.min_font_size;
    let engine = DetectionEngine::new(ctx.config.clone());
    let report = ctx
        .runtime
        .block_on(engine.scan(&ctx.document, &ScanScope::Document));

    let (sink, mut queue) = CommandSink::channel();
    for issue in group_by_type(&report.issues, IssueType::Typography) {
        sink.request_font_size_change(issue.node_id(), min_font_size);
    }
    drop(sink);

    let mut commands = Vec::new();
    while let Ok(command) = queue.try_recv() {
        commands.push(command);
    }

    if commands.is_empty() {
        style::success("No undersized text found, nothing to fix.");
        return 0;
    }

    style::header(&format!("Raising {} text layer(s) to {}px", commands.len(), min_font_size));
    for command in &commands {
        if let Some(id) = ctx.document.find(command.node_id()) {
            let node = ctx.document.node(id);
            let current = node
                .text()
                .and_then(|t| t.font_size.number())
                .unwrap_or_default();
            println!(
                "{}",
                style::metric(
                    &format!("{} ({})", node.name_or_empty(), node.id),
                    format!("{}px → {}px", current, min_font_size)
                )
            );
        }
    }

    if args.dry_run {
        style::hint("Dry run, document left unchanged.");
        return 0;
    }

    let mut failed = 0;
    for command in &commands {
        if let Err(e) = apply_after_font_load(&mut ctx, command) {
            style::warning(&format!("Skipped {}: {}", command.node_id(), e));
            failed += 1;
        }
    }

    let json = match ctx.document.to_json() {
        Ok(json) => json,
        Err(e) => {
            style::error(&format!("Failed to serialize document: {}", e));
            return 1;
        }
    };

    let target = args.output.as_ref().unwrap_or(&ctx.document_path);
    if let Err(e) = fs.write(target, &json) {
        style::error(&format!("Failed to write document: {}", e));
        return 1;
    }

    style::success(&format!(
        "Fixed {} text layer(s) in {}",
        commands.len() - failed,
        style::path(target)
    ));
    if failed > 0 { 1 } else { 0 }
}

/// The font must be loaded before the host accepts a size change.
fn apply_after_font_load(
    ctx: &mut CommandContext,
    command: &HostCommand,
) -> Result<(), crate::host::SnapshotError> {
    if let Some(id) = ctx.document.find(command.node_id()) {
        ctx.runtime.block_on(ctx.document.load_font(id))?;
    }
    ctx.document.apply(command)
}
