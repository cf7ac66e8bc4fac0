use crate::CLAP_STYLING;
use clap::{ArgAction, arg, command};
use seoaudit_core::mapping::DEFAULT_MAPPING_FILE;

fn mapping_arg() -> clap::Arg {
    arg!(-m --"mapping" <PATH>)
        .required(false)
        .help("Path to the sitemap mapping JSON file")
        .default_value(DEFAULT_MAPPING_FILE)
}

fn timeout_arg() -> clap::Arg {
    arg!(--"timeout" <SECONDS>)
        .required(false)
        .help("Request timeout in seconds")
        .value_parser(clap::value_parser!(u64).range(1..))
        .default_value("10")
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("seoaudit")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("seoaudit")
        .about("SEO metadata, alt text and sitemap inclusion audits")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Show internal debug logging").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("audit")
                .about("Audit a list of pages and write one report")
                .arg(
                    arg!(-t --"ticket" <TICKET>)
                        .required(true)
                        .help("Ticket name, used in the report title and file name"),
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("A page to audit (repeatable)")
                        .action(ArgAction::Append)
                        .conflicts_with("urls-file"),
                )
                .arg(
                    arg!(-U --"urls-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of page URLs")
                        .conflicts_with("url"),
                )
                .group(
                    clap::ArgGroup::new("pages")
                        .args(["url", "urls-file"])
                        .required(true),
                )
                .arg(mapping_arg())
                .arg(
                    arg!(-o --"output-dir" <DIR>)
                        .required(false)
                        .help("Directory the report is written to")
                        .default_value(seoaudit_core::audit::DEFAULT_OUTPUT_DIR),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: html, json")
                        .value_parser(["html", "json"])
                        .default_value("html"),
                )
                .arg(
                    arg!(--"no-alt-text")
                        .required(false)
                        .help("Skip the Image Alt QA table")
                        .action(ArgAction::SetTrue),
                )
                .arg(timeout_arg()),
        )
        .subcommand(
            command!("sitemap")
                .about("Manage the sitemap mapping table")
                .subcommand_required(true)
                .arg(mapping_arg().global(true))
                .subcommand(command!("list").about("List mapping entries in lookup order"))
                .subcommand(
                    command!("init")
                        .about("Write the built-in mapping to the mapping file")
                        .arg(
                            arg!(-f --"force")
                                .help("Overwrite an existing mapping file")
                                .required(false),
                        ),
                )
                .subcommand(
                    command!("add")
                        .about("Add a prefix, or point an existing prefix at a new sitemap")
                        .arg(arg!(<PREFIX>).help("Page URL prefix, e.g. https://sg.brand.com/"))
                        .arg(arg!(<SITEMAP>).help("Sitemap URL for pages under the prefix")),
                )
                .subcommand(
                    command!("remove")
                        .about("Remove a prefix")
                        .arg(arg!(<PREFIX>).help("Prefix to remove")),
                )
                .subcommand(
                    command!("resolve")
                        .about("Show which sitemap governs a page URL")
                        .arg(arg!(<URL>).help("Page URL")),
                )
                .subcommand(
                    command!("check")
                        .about("Check whether a page URL is listed in its sitemap")
                        .arg(arg!(<URL>).help("Page URL, matched exactly"))
                        .arg(timeout_arg()),
                ),
        )
}
