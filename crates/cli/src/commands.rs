//! Subcommand handlers. Each returns whether the action fully succeeded.

use anyhow::{bail, Context, Result};
use tracing::warn;

use timekeeper_core::{Config, ParentKind};
use timekeeper_engine::actions::apply_bulk;
use timekeeper_engine::history::stats_for;
use timekeeper_engine::{
    Cascade, Classification, ExecutionFilter, ExecutionHistory, InstancePager, PagerError,
    ParentView, Report, PAGE_SIZES,
};
use timekeeper_notify::Notifier;
use timekeeper_store::{BulkAction, RecordStore};

use crate::cli::{Command, ExecutionArgs, GeoCommand, InstanceCommand, PageArgs, ParentCommand, SelectArgs};
use crate::terminal::Terminal;

/// Shared handles for one invocation.
pub struct Ctx<'a> {
    pub store: &'a dyn RecordStore,
    pub notifier: &'a dyn Notifier,
    pub config: &'a Config,
    pub terminal: &'a Terminal,
}

pub async fn run(command: Command, ctx: &Ctx<'_>) -> Result<bool> {
    match command {
        Command::Templates { action } => parents(ctx, ParentKind::Template, action).await,
        Command::Timers { action } => parents(ctx, ParentKind::Timer, action).await,
        Command::Instances { action } => instances(ctx, action).await,
        Command::Executions(args) => executions(ctx, args).await,
        Command::Geo { action } => geo(ctx, action).await,
    }
}

async fn parents(ctx: &Ctx<'_>, kind: ParentKind, action: ParentCommand) -> Result<bool> {
    let mut view = ParentView::new(kind);
    view.refresh(ctx.store)
        .await
        .with_context(|| format!("failed to list {}s", kind.label()))?;

    let cascade = Cascade::new(ctx.store, ctx.notifier, kind)
        .collect_page_size(ctx.config.paging.collect_page_size);

    match action {
        ParentCommand::List => {
            ctx.terminal.print_parents(kind, view.rows())?;
            Ok(true)
        }
        ParentCommand::Suspend(select) => {
            apply_selection(&mut view, &select);
            finish(ctx, cascade.suspend(&mut view).await)
        }
        ParentCommand::Resume(select) => {
            apply_selection(&mut view, &select);
            finish(ctx, cascade.resume(&mut view).await)
        }
        ParentCommand::Delete { select, yes } => {
            apply_selection(&mut view, &select);
            if !yes && !view.selected_ids().is_empty() {
                let names: Vec<&str> = view.selected_rows().iter().map(|r| r.name.as_str()).collect();
                let question = format!(
                    "Delete {} {}(s)? {}",
                    names.len(),
                    kind.label(),
                    names.join(", ")
                );
                if !ctx.terminal.confirm(&question)? {
                    ctx.terminal.print_info("Cancelled.")?;
                    return Ok(true);
                }
            }
            finish(ctx, cascade.delete(&mut view).await)
        }
        ParentCommand::Trigger(select) => {
            if kind != ParentKind::Timer {
                bail!("only timers can be triggered; trigger the template's instances instead");
            }
            apply_selection(&mut view, &select);
            match cascade.trigger(&view).await {
                None => {
                    ctx.terminal.print_info("Nothing selected.")?;
                    Ok(true)
                }
                Some(result) => Ok(result.is_ok()),
            }
        }
    }
}

fn apply_selection(view: &mut ParentView, select: &SelectArgs) {
    if select.all {
        view.select_all();
        return;
    }
    view.select(&select.ids);
    for id in &select.ids {
        if view.find(id).is_none() {
            warn!(kind = %view.kind(), id = %id, "unknown id ignored");
        }
    }
}

fn finish(ctx: &Ctx<'_>, report: Option<Report>) -> Result<bool> {
    match report {
        None => {
            ctx.terminal.print_info("Nothing selected.")?;
            Ok(true)
        }
        Some(report) => Ok(!matches!(
            report.summary.classification,
            Classification::Partial | Classification::AllFailed
        )),
    }
}

async fn instances(ctx: &Ctx<'_>, action: InstanceCommand) -> Result<bool> {
    let (page, bulk) = match action {
        InstanceCommand::List(page) => (page, None),
        InstanceCommand::Suspend(s) => (s.page, Some((BulkAction::Suspend, s.ids))),
        InstanceCommand::Resume(s) => (s.page, Some((BulkAction::Resume, s.ids))),
        InstanceCommand::Trigger(s) => (s.page, Some((BulkAction::Trigger, s.ids))),
        InstanceCommand::Reset(s) => (s.page, Some((BulkAction::Reset, s.ids))),
    };

    let mut pager = open_pager(ctx, &page).await?;
    let mut ok = true;

    if let Some((action, ids)) = bulk {
        pager.select(&ids);
        if pager.selected_ids().len() < ids.len() {
            warn!(
                requested = ids.len(),
                on_page = pager.selected_ids().len(),
                page = pager.current_page(),
                "some instance ids are not on the selected page and were ignored"
            );
        }
        match apply_bulk(ctx.notifier, &mut pager, action).await {
            None => ctx.terminal.print_info(&format!(
                "None of the given instances are on page {}.",
                pager.current_page()
            ))?,
            Some(Ok(_)) => {}
            Some(Err(PagerError::Store(_))) => ok = false,
            Some(Err(e @ PagerError::Refresh { .. })) => {
                warn!(error = %e, "showing the page as it was before the action");
                ctx.terminal.print_info(&e.to_string())?;
            }
            Some(Err(e)) => return Err(e).context("failed to refresh instances"),
        }
    }

    ctx.terminal.print_instances(&pager)?;
    Ok(ok)
}

async fn open_pager<'a>(ctx: &Ctx<'a>, args: &PageArgs) -> Result<InstancePager<'a>> {
    let size = match args.size {
        Some(size) if !PAGE_SIZES.contains(&size) => return Err(PagerError::InvalidPageSize(size).into()),
        Some(size) => size,
        None => ctx.config.paging.instance_page_size,
    };
    let mut pager = InstancePager::with_page_size(ctx.store, size)?;
    pager
        .go_to_page(args.page)
        .await
        .context("failed to list instances")?;
    Ok(pager)
}

async fn executions(ctx: &Ctx<'_>, args: ExecutionArgs) -> Result<bool> {
    let history = ExecutionHistory::load(ctx.store, args.instance.as_deref())
        .await
        .context("failed to list executions")?;

    let filter = ExecutionFilter {
        instance_id: args.instance,
        outcome: args.outcome,
        trigger_type: args.trigger_type,
    };
    let records = history.filter(&filter);
    let stats = stats_for(records.iter().copied());
    ctx.terminal.print_executions(&records, &stats)?;
    Ok(true)
}

async fn geo(ctx: &Ctx<'_>, action: GeoCommand) -> Result<bool> {
    match action {
        GeoCommand::Regions => {
            let regions = ctx.store.list_regions().await.context("failed to list regions")?;
            ctx.terminal.print_regions(&regions)?;
        }
        GeoCommand::Countries { region } => {
            let countries = ctx
                .store
                .list_countries(region.as_deref())
                .await
                .context("failed to list countries")?;
            ctx.terminal.print_countries(&countries)?;
        }
    }
    Ok(true)
}
