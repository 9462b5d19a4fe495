//! `netsim`: create, check, inspect and convert scenario documents

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use netsim_engine::{
    create_new_scenario, get_element_from_scenario, parse_scenario, validate_scenario_with,
    EngineConfig, ScenarioTree,
};
use netsim_model::{DocumentFormat, Scenario};

fn cli() -> Command {
    let file = || {
        Arg::new("file")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Scenario document (.json, .yaml or .yml)")
    };
    let format_arg = |name: &'static str| {
        Arg::new(name)
            .long(name)
            .value_parser(["json", "yaml", "yml"])
            .help("Output format")
    };
    let out = || {
        Arg::new("out")
            .long("out")
            .short('o')
            .value_parser(value_parser!(PathBuf))
            .help("Write to this file instead of stdout")
    };

    Command::new("netsim")
        .version(netsim_engine::VERSION)
        .about("Scenario tree tools for simulated network topologies")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Engine configuration (TOML)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("new")
                .about("Create an empty scenario")
                .arg(Arg::new("name").required(true).help("Scenario name"))
                .arg(format_arg("format").default_value("yaml"))
                .arg(out()),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a document and list every issue")
                .arg(file()),
        )
        .subcommand(
            Command::new("element")
                .about("Print one element as JSON")
                .arg(file())
                .arg(Arg::new("id").required(true).help("Element id, or the scenario name")),
        )
        .subcommand(
            Command::new("inspect")
                .about("Summarize the flattened scenario")
                .arg(file())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print table, graph and map as JSON"),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Re-encode a document")
                .arg(file())
                .arg(format_arg("to").required(true))
                .arg(out()),
        )
        .subcommand(Command::new("schema").about("Print the document JSON schema"))
}

fn init_tracing(matches: &ArgMatches) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if matches.get_flag("verbose") {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let layer = if matches.get_flag("log-json") {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };
    tracing_subscriber::registry().with(filter).with(layer).init();
}

fn load_config(matches: &ArgMatches) -> Result<EngineConfig> {
    let Some(path) = matches.get_one::<PathBuf>("config") else {
        return Ok(EngineConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    EngineConfig::from_toml_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn load_tree(path: &Path) -> Result<ScenarioTree> {
    let format = DocumentFormat::from_path(path)?;
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let scenario =
        Scenario::parse(&text, format).with_context(|| format!("parsing {}", path.display()))?;
    ScenarioTree::from_scenario(scenario).with_context(|| format!("importing {}", path.display()))
}

fn output_format(args: &ArgMatches, name: &str) -> Result<DocumentFormat> {
    let value = args.get_one::<String>(name).map_or("yaml", String::as_str);
    DocumentFormat::from_name(value).with_context(|| format!("unknown format '{value}'"))
}

fn emit(args: &ArgMatches, text: &str) -> Result<()> {
    match args.get_one::<PathBuf>("out") {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote document");
        }
        None => println!("{}", text.trim_end()),
    }
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<ExitCode> {
    let config = load_config(matches)?;

    match matches.subcommand() {
        Some(("new", args)) => {
            let name = args
                .get_one::<String>("name")
                .context("missing scenario name")?;
            let tree = create_new_scenario(name)?;
            let text = tree.to_scenario().render(output_format(args, "format")?)?;
            emit(args, &text)?;
        }
        Some(("validate", args)) => {
            let path = file_arg(args)?;
            let tree = load_tree(path)?;
            let issues = validate_scenario_with(&tree, &config);
            if !issues.is_empty() {
                for issue in &issues {
                    println!("{issue}");
                }
                tracing::warn!(count = issues.len(), "scenario has issues");
                return Ok(ExitCode::FAILURE);
            }
            println!("{}: ok ({} nodes)", tree.name(), tree.len());
        }
        Some(("element", args)) => {
            let tree = load_tree(file_arg(args)?)?;
            let id = args.get_one::<String>("id").context("missing element id")?;
            let Some(element) = get_element_from_scenario(&tree, id) else {
                bail!("no editable element with id '{id}'");
            };
            println!("{}", serde_json::to_string_pretty(&element)?);
        }
        Some(("inspect", args)) => {
            let tree = load_tree(file_arg(args)?)?;
            let parsed = parse_scenario(&tree);
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            } else {
                println!("scenario: {}", tree.name());
                println!("elements: {}", parsed.table.len());
                println!(
                    "graph:    {} nodes, {} edges",
                    parsed.graph.nodes.len(),
                    parsed.graph.edges.len()
                );
                println!(
                    "map:      {} ue, {} poa, {} compute",
                    parsed.map.ue.len(),
                    parsed.map.poa.len(),
                    parsed.map.compute.len()
                );
            }
        }
        Some(("convert", args)) => {
            let tree = load_tree(file_arg(args)?)?;
            let text = tree.to_scenario().render(output_format(args, "to")?)?;
            emit(args, &text)?;
        }
        Some(("schema", _)) => {
            println!("{}", serde_json::to_string_pretty(&Scenario::schema())?);
        }
        _ => bail!("unknown command"),
    }
    Ok(ExitCode::SUCCESS)
}

fn file_arg(args: &ArgMatches) -> Result<&Path> {
    args.get_one::<PathBuf>("file")
        .map(PathBuf::as_path)
        .context("missing document path")
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(&matches);

    match run(&matches) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
