use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

fn connection_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-u --"base-url" <URL>)
            .required(true)
            .help("Root URL of the CMS site")
            .value_parser(clap::value_parser!(Url)),
    )
    .arg(
        arg!(--"token" <TOKEN>)
            .required(false)
            .help("Anti-forgery token sent with every Stores request"),
    )
    .arg(
        arg!(--"token-page" <PATH>)
            .required(false)
            .help("Page to scrape the anti-forgery token from when --token is not given")
            .default_value("/EPiServer/CMS/"),
    )
    .arg(
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Request timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("10"),
    )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("treeport")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("treeport")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(connection_args(
            command!("report")
                .about(
                    "Crawl the content tree and write one JSON report per content type \
                plus an HTML index.",
                )
                .arg(
                    arg!(-r --"root-id" <ID>)
                        .required(false)
                        .help("Content id to start the crawl from")
                        .default_value("1"),
                )
                .arg(
                    arg!(-o --"output" <DIR>)
                        .required(false)
                        .help("Directory to write the report into")
                        .default_value("./content-report"),
                )
                .arg(
                    arg!(-b --"batch-size" <N>)
                        .required(false)
                        .help("Content ids fetched per page")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("50"),
                )
                .arg(
                    arg!(-d --"delay" <SECONDS>)
                        .required(false)
                        .help("Pause between fetch pages, to go easy on the server")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("0"),
                )
                .arg(
                    arg!(--"level-delay" <SECONDS>)
                        .required(false)
                        .help("Minimum duration of each traversal fan-out")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("0"),
                )
                .arg(
                    arg!(--"shared-assets")
                        .required(false)
                        .help("Include the shared assets folder subtree in the report")
                        .action(clap::ArgAction::SetTrue),
                ),
        ))
        .subcommand(connection_args(
            command!("types").about("List the content type catalog"),
        ))
        .subcommand(connection_args(
            command!("resolve")
                .about("Look up a content item by permanent link and print it as JSON")
                .arg(
                    arg!(-p --"permanent-link" <LINK>)
                        .required(true)
                        .help("Permanent link to resolve"),
                ),
        ))
}
