mod output;

use std::fs;
use std::path::PathBuf;

use canopy_core::{
    BuilderConfig, Callable, CanopyErrorExt, IrBuilder, MemoryRegistry, generate_tree_from_source,
    ir::{DEFAULT_MAX_DEPTH, DEFAULT_SEPARATOR}, load_function, syntax::json::tree_to_json,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use output::{FormatStyle, SummaryRow};

fn main() {
    let cli = Command::new("canopy")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate Python function definitions into canopy IR");

    let cli = setup_cli(cli);
    let matches = cli.get_matches();
    init_logging(matches.get_count("verbose"));

    let code = dispatch_commands(&matches);
    std::process::exit(code);
}

/// Sets up the CLI with its subcommands and arguments.
fn setup_cli(cli: Command) -> Command {
    cli.subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .help("Raise log verbosity (-v info, -vv debug, -vvv trace)")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a source file and print its syntax tree as JSON")
                .arg(
                    Arg::new("file")
                        .help("The source file to parse")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("output")
                        .help("Write the tree to this file instead of stdout")
                        .short('o')
                        .long("output")
                        .value_parser(clap::value_parser!(String))
                        .value_name("FILE"),
                ),
        )
        .subcommand(
            Command::new("translate")
                .about("Translate the first function of each file into IR")
                .arg(
                    Arg::new("files")
                        .help("Source files or glob patterns")
                        .required(true)
                        .num_args(1..)
                        .index(1),
                )
                .arg(
                    Arg::new("output")
                        .help("Write the IR to this file instead of stdout")
                        .short('o')
                        .long("output")
                        .value_parser(clap::value_parser!(String))
                        .value_name("FILE"),
                )
                .arg(
                    Arg::new("separator")
                        .help("Separator between scope names in qualified names")
                        .long("separator")
                        .value_parser(clap::value_parser!(String))
                        .default_value(DEFAULT_SEPARATOR)
                        .value_name("SEP"),
                )
                .arg(
                    Arg::new("max-depth")
                        .help(format!(
                            "Maximum nesting depth of the translated tree [default: {}]",
                            DEFAULT_MAX_DEPTH
                        ))
                        .long("max-depth")
                        .value_parser(clap::value_parser!(usize))
                        .value_name("N"),
                )
                .arg(
                    Arg::new("keep-decorator-lines")
                        .help("Report line numbers as written, without discounting decorators")
                        .long("keep-decorator-lines")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("summary")
                        .help("Print a table of node kinds per translated function to stderr")
                        .long("summary")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn init_logging(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Dispatches the command based on the parsed arguments and returns the
/// process exit code.
fn dispatch_commands(matches: &ArgMatches) -> i32 {
    let formatting = FormatStyle::default();
    match matches.subcommand() {
        Some(("parse", sub_m)) => match run_parse(sub_m) {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("{}", output::render_error(err.as_ref(), &formatting));
                1
            }
        },
        Some(("translate", sub_m)) => run_translate(sub_m, &formatting),
        _ => {
            eprintln!("No valid subcommand was used. Use --help for more information.");
            2
        }
    }
}

fn run_parse(sub_m: &ArgMatches) -> Result<(), Box<dyn CanopyErrorExt>> {
    let Some(file) = sub_m.get_one::<String>("file") else {
        return Ok(());
    };
    let callable = Callable::new(PathBuf::from(file))?;
    let tree = generate_tree_from_source(&callable)?;
    let json = tree_to_json(&tree)?;
    emit(sub_m.get_one::<String>("output"), &json);
    Ok(())
}

fn run_translate(sub_m: &ArgMatches, formatting: &FormatStyle) -> i32 {
    let patterns: Vec<String> = sub_m
        .get_many::<String>("files")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let mut config = BuilderConfig::default()
        .with_discount_decorators(!sub_m.get_flag("keep-decorator-lines"));
    if let Some(separator) = sub_m.get_one::<String>("separator") {
        config = config.with_separator(separator.clone());
    }
    if let Some(max_depth) = sub_m.get_one::<usize>("max-depth") {
        config = config.with_max_depth(*max_depth);
    }

    let (paths, mut failures) = expand_inputs(&patterns, formatting);
    let mut builder = IrBuilder::new(config.clone()).with_registry(MemoryRegistry::new());
    let mut translated = Vec::new();
    let mut summary = Vec::new();

    let bar = output::progress_bar(paths.len());
    for path in &paths {
        bar.set_message(path.display().to_string());
        let result = translate_file(path, &config, &mut builder);
        match result {
            Ok((value, row)) => {
                translated.push(value);
                summary.push(row);
            }
            Err(err) => {
                bar.suspend(|| eprintln!("{}", output::render_error(err.as_ref(), formatting)));
                failures += 1;
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    log::info!(
        "translated {} of {} file(s), {} function(s) registered",
        translated.len(),
        paths.len(),
        builder.registry().len()
    );

    if !translated.is_empty() {
        let document = if paths.len() == 1 && translated.len() == 1 {
            translated.remove(0)
        } else {
            serde_json::Value::Array(translated)
        };
        match serde_json::to_string_pretty(&document) {
            Ok(json) => emit(sub_m.get_one::<String>("output"), &json),
            Err(err) => {
                eprintln!("{}", output::render_warning(&format!("Cannot serialize IR: {}", err), formatting));
                failures += 1;
            }
        }
    }

    if sub_m.get_flag("summary") && !summary.is_empty() {
        eprintln!("{}", output::summary_table(&summary, formatting));
    }

    if failures > 0 { 1 } else { 0 }
}

/// Load, prepare and translate one file. The IR borrows the tree, so it is
/// turned into JSON before the tree goes out of scope.
fn translate_file(
    path: &PathBuf,
    config: &BuilderConfig,
    builder: &mut IrBuilder<MemoryRegistry>,
) -> Result<(serde_json::Value, SummaryRow), Box<dyn CanopyErrorExt>> {
    let callable = Callable::new(path.clone())?;
    let tree = load_function(&callable, config)?;
    let function = builder.translate(&tree)?;

    let row = SummaryRow {
        file: callable.name.clone(),
        name: function.name.clone(),
        qualified_name: function.qualified_name.clone(),
        line: function.line,
        node_count: function.node_count(),
        kinds: function.kind_histogram(),
    };
    let value = function.to_json()?;
    Ok((value, row))
}

/// Expand glob patterns; plain paths pass through untouched so a missing
/// file is reported when it is read. Returns the paths and the number of
/// patterns that could not be expanded.
fn expand_inputs(patterns: &[String], formatting: &FormatStyle) -> (Vec<PathBuf>, usize) {
    let mut paths = Vec::new();
    let mut failures = 0;
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(pattern));
            continue;
        }
        match glob::glob(pattern) {
            Ok(entries) => {
                let before = paths.len();
                paths.extend(entries.filter_map(Result::ok));
                if paths.len() == before {
                    eprintln!(
                        "{}",
                        output::render_warning(&format!("Pattern `{}` matched no files", pattern), formatting)
                    );
                    failures += 1;
                }
            }
            Err(err) => {
                eprintln!(
                    "{}",
                    output::render_warning(&format!("Invalid pattern `{}`: {}", pattern, err), formatting)
                );
                failures += 1;
            }
        }
    }
    (paths, failures)
}

fn emit(output: Option<&String>, text: &str) {
    match output {
        Some(path) => {
            if let Err(err) = fs::write(path, text) {
                eprintln!("Failed to write {}: {}", path, err);
                std::process::exit(1);
            }
        }
        None => println!("{}", text),
    }
}
