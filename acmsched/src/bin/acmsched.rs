use acmclient::{
    Client,
    Config,
};
use acmcore::{
    acl::AclChoice,
    entity::{
        EntityKind,
        EntityRow,
    },
    transition::iso_date,
};
use acmsched::{
    platform::Builder,
    Page,
    Scheduler,
};
use anyhow::Context;
use chrono::{
    DateTime,
    Utc,
};
use clap::{
    Parser,
    Subcommand,
};
use std::time::Duration;

#[derive(Debug, Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[clap(long, value_name = "ACM_BASE_URL", env = "ACM_BASE_URL")]
    base_url: String,
    #[clap(long, value_name = "ACM_TIMEOUT", env = "ACM_TIMEOUT", default_value_t = 30)]
    timeout: u64,
    #[clap(long, value_name = "ACM_USER_AGENT", env = "ACM_USER_AGENT")]
    user_agent: Option<String>,
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, clap::Args)]
struct Target {
    kind: EntityKind,
    id: String,
    /// The series an episode belongs to.
    #[clap(long)]
    series: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the current ACL and the scheduled transitions.
    #[command(arg_required_else_help = true)]
    Show {
        #[command(flatten)]
        target: Target,
    },
    /// Schedule a new transition.
    #[command(arg_required_else_help = true)]
    Add {
        #[command(flatten)]
        target: Target,
        /// ACL template id, or `_series` to go back to the series ACL.
        #[clap(long)]
        acl: String,
        #[clap(long)]
        date: DateTime<Utc>,
        #[clap(long)]
        workflow: Option<String>,
        #[clap(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
        #[clap(long = "override")]
        override_: bool,
    },
    /// Apply an ACL right away.
    #[command(arg_required_else_help = true)]
    Apply {
        #[command(flatten)]
        target: Target,
        #[clap(long)]
        acl: String,
        #[clap(long = "override")]
        override_: bool,
    },
    /// Delete a scheduled transition.
    #[command(arg_required_else_help = true)]
    Delete {
        #[command(flatten)]
        target: Target,
        transition_id: String,
    },
    /// List the ACL templates.
    Acls,
    /// List the workflow definitions.
    Workflows,
    /// Render the schedulers of a listing.
    Render {
        /// Episode id, optionally followed by `@` and its series id.
        #[clap(long = "episode", value_parser = parse_episode)]
        episodes: Vec<EntityRow>,
        #[clap(long = "series", value_parser = parse_series)]
        series: Vec<EntityRow>,
        #[clap(long)]
        expand: bool,
    },
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("invalid param `{s}`, expected key=value"))
}

fn parse_episode(s: &str) -> Result<EntityRow, String> {
    match s.split_once('@') {
        Some((id, series_id)) => Ok(EntityRow::episode(id, Some(series_id.to_string()))),
        None => Ok(EntityRow::episode(s, None)),
    }
}

fn parse_series(s: &str) -> Result<EntityRow, String> {
    Ok(EntityRow::series(s))
}

impl Target {
    fn row(&self) -> EntityRow {
        match self.kind {
            EntityKind::Episode => EntityRow::episode(self.id.clone(), self.series.clone()),
            EntityKind::Series => EntityRow::series(self.id.clone()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    stderrlog::new()
        .module(module_path!())
        .module("acmclient")
        .module("acmsched")
        .verbosity((args.verbose as usize) + 1)
        .timestamp(stderrlog::Timestamp::Second)
        .init()
        .unwrap();

    let mut config = Config::new(&args.base_url)?
        .timeout(Duration::from_secs(args.timeout));
    if let Some(user_agent) = args.user_agent {
        config = config.user_agent(user_agent);
    }
    let platform = Builder::new()
        .backend(Client::new(config)?)
        .build();

    match args.command {
        Commands::Show { target } => {
            let mut page = Page::load(platform, vec![target.row()]).await;
            let scheduler = scheduler(&mut page, &target)?;
            print_scheduler(scheduler);
        }
        Commands::Add { target, acl, date, workflow, params, override_ } => {
            let mut page = Page::load(platform, vec![target.row()]).await;
            let scheduler = scheduler(&mut page, &target)?;
            let key = scheduler.insert_schedule(None);
            scheduler.change_acl(key, AclChoice::from(acl))?;
            scheduler.change_from_date(key, date)?;
            if override_ {
                scheduler.change_override(key, true)?;
            }
            if workflow.is_some() {
                scheduler.change_workflow(key, workflow).await?;
                if !params.is_empty() {
                    let mut values = scheduler.schedule(key)
                        .and_then(|entry| entry.params().workflow_params.clone())
                        .unwrap_or_default();
                    values.extend(params);
                    scheduler.set_workflow_params(key, values)?;
                }
            }
            scheduler.save(key).await?;
            let id = scheduler.schedule(key)
                .and_then(|entry| entry.id())
                .unwrap_or_default();
            println!("created transition {id}");
        }
        Commands::Apply { target, acl, override_ } => {
            let mut page = Page::load(platform, vec![target.row()]).await;
            let scheduler = scheduler(&mut page, &target)?;
            scheduler.change_current_acl(AclChoice::from(acl))?;
            if override_ {
                scheduler.change_current_override(true)?;
            }
            scheduler.apply().await?;
            println!("applied {}", scheduler.current_acl().name());
        }
        Commands::Delete { target, transition_id } => {
            let mut page = Page::load(platform, vec![target.row()]).await;
            let scheduler = scheduler(&mut page, &target)?;
            let key = scheduler.schedules().iter()
                .find(|entry| entry.id() == Some(transition_id.as_str()))
                .map(|entry| entry.key())
                .with_context(|| format!("no transition {transition_id} on {} {}", target.kind, target.id))?;
            scheduler.destroy(key).await?;
            println!("deleted transition {transition_id}");
        }
        Commands::Acls => {
            for acl in platform.acl_templates().await {
                println!("{}\t{}", acl.id, acl.name);
            }
        }
        Commands::Workflows => {
            for def in platform.workflow_definitions().await {
                println!("{}\t{}", def.id, def.description);
            }
        }
        Commands::Render { episodes, series, expand } => {
            let rows = episodes.into_iter().chain(series).collect::<Vec<_>>();
            let mut page = Page::load(platform, rows).await;
            let rows = page.rows().to_vec();
            for row in rows.iter() {
                if let Some(scheduler) = page.scheduler_mut(row.kind, &row.id) {
                    scheduler.toggle(Some(!expand));
                }
            }
            println!("{}", page.render());
        }
    }

    Ok(())
}

fn scheduler<'p>(page: &'p mut Page, target: &Target) -> anyhow::Result<&'p mut Scheduler> {
    page.scheduler_mut(target.kind, &target.id)
        .with_context(|| format!("{} {} not loaded", target.kind, target.id))
}

fn print_scheduler(scheduler: &Scheduler) {
    let current = scheduler.current_acl();
    println!(
        "{} {}: {}{}",
        scheduler.kind(),
        scheduler.entity_id(),
        current.name(),
        if current.is_from_series() { " (from series)" } else { "" },
    );
    let in_effect = scheduler.current_schedule(Utc::now()).map(|entry| entry.key());
    for entry in scheduler.schedules() {
        let params = entry.params();
        println!(
            "{}{}\t{}\t{}\t{}{}{}",
            if Some(entry.key()) == in_effect { "*" } else { " " },
            entry.id().unwrap_or("-"),
            iso_date(&params.from_date),
            match &params.acl {
                AclChoice::Template(id) => scheduler.platform()
                    .acl_name(id)
                    .unwrap_or(id.as_str())
                    .to_string(),
                acl => acl.to_string(),
            },
            params.workflow_id.as_deref().unwrap_or("-"),
            if params.override_ { "\toverride" } else { "" },
            if entry.is_read_only() { "\t(series)" } else { "" },
        );
    }
}
