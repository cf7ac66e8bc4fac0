use clap::ArgMatches;
use colored::Colorize;
use commands::command_argument_builder;
use seoaudit::handlers::{
    handle_audit, handle_sitemap_add, handle_sitemap_check, handle_sitemap_init,
    handle_sitemap_list, handle_sitemap_remove, handle_sitemap_resolve, print_banner,
};
use tracing::Level;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    init_tracing(verbose);

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    if let Err(e) = dispatch(&chosen_command, quiet).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(matches: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("audit", primary_command)) => handle_audit(primary_command, quiet).await,
        Some(("sitemap", primary_command)) => match primary_command.subcommand() {
            Some(("list", secondary_command)) => handle_sitemap_list(secondary_command),
            Some(("init", secondary_command)) => handle_sitemap_init(secondary_command),
            Some(("add", secondary_command)) => handle_sitemap_add(secondary_command),
            Some(("remove", secondary_command)) => handle_sitemap_remove(secondary_command),
            Some(("resolve", secondary_command)) => {
                handle_sitemap_resolve(secondary_command, quiet)
            }
            Some(("check", secondary_command)) => {
                handle_sitemap_check(secondary_command, quiet).await
            }
            _ => unreachable!("clap should ensure we don't get here"),
        },
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
