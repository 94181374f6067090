use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use inireg::{ConfigRegistry, SectionGroup, SectionGroupSpec};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Inspect and edit inireg configuration files
///
/// Built-in schemas are always registered; more can be added with --schema.
#[derive(Parser, Debug)]
#[command(name = "inireg")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the configuration files
    ///
    /// Defaults to the platform configuration directory.
    #[arg(long, env = "INIREG_HOME")]
    home: Option<PathBuf>,

    /// Additional schema file (TOML) to register
    #[arg(long = "schema", value_name = "FILE")]
    schemas: Vec<PathBuf>,

    /// Override an option for this run, e.g. -o v=true or -o --scale=2
    #[arg(short = 'o', long = "override", value_name = "KEY=VALUE", allow_hyphen_values = true)]
    overrides: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log to file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every setting of one or all config types
    Show {
        config_type: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the value of one option
    Get {
        config_type: String,
        section: String,
        option: String,
    },
    /// Change one option and save its file
    Set {
        config_type: String,
        section: String,
        option: String,
        value: String,
    },
    /// Write every config file with its current values
    Init,
    /// List the options that can be overridden with -o
    Flags {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn setup_logging(log_level: &str, log_file: Option<PathBuf>) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if let Some(log_path) = log_file {
        let file = std::fs::File::create(log_path)?;
        subscriber.with_writer(file).init();
    } else {
        subscriber.with_writer(std::io::stderr).init();
    }

    Ok(())
}

fn build_registry(args: &Args) -> Result<ConfigRegistry> {
    let mut registry = match &args.home {
        Some(home) => ConfigRegistry::with_home(home),
        None => ConfigRegistry::new("inireg"),
    };
    info!("Configuration home: {}", registry.home().display());

    registry.register_builtin()?;

    for path in &args.schemas {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema {}", path.display()))?;
        let spec = SectionGroupSpec::from_toml_str(&content)
            .with_context(|| format!("Failed to parse schema {}", path.display()))?;
        registry.register(spec)?;
    }

    Ok(registry)
}

fn print_group(group: &SectionGroup) {
    println!("# {} ({})", group.config_type(), group.file_specification(None).display());
    for section in group.sections() {
        println!("{}", section.name());
        for (name, _) in section.option_pairs() {
            println!("{}", section.setting_line(name).trim_end());
        }
    }
}

fn group_json(group: &SectionGroup) -> Value {
    let mut sections = Map::new();
    for section in group.sections() {
        let options: Map<String, Value> = section
            .option_pairs()
            .map(|(name, opt)| (name.to_string(), Value::String(opt.value().to_string())))
            .collect();
        sections.insert(section.name().to_string(), Value::Object(options));
    }
    Value::Object(sections)
}

fn run(args: Args, mut registry: ConfigRegistry) -> Result<()> {
    match args.command {
        Command::Show { config_type, json } => {
            let groups: Vec<&SectionGroup> = match &config_type {
                Some(config_type) => {
                    let group = registry.find(config_type);
                    if !group.active() {
                        bail!("Unknown config type: {}", config_type);
                    }
                    vec![group]
                }
                None => registry.groups().iter().collect(),
            };

            if json {
                let all: Map<String, Value> = groups
                    .iter()
                    .map(|g| (g.config_type().to_string(), group_json(g)))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&Value::Object(all))?);
            } else {
                for group in groups {
                    print_group(group);
                }
            }
        }
        Command::Get {
            config_type,
            section,
            option,
        } => {
            let opt = registry.find_option_spec(&config_type, &section, &option);
            if !opt.active() {
                bail!("No option {} {} {}", config_type, section, option);
            }
            println!("{}", opt.value());
        }
        Command::Set {
            config_type,
            section,
            option,
            value,
        } => {
            if !registry.set_value(&config_type, &section, &option, &value) {
                bail!("No option {} {} {}", config_type, section, option);
            }
            let path = registry.write(None, &config_type)?;
            println!("{}", path.display());
        }
        Command::Init => {
            for path in registry.write_all()? {
                println!("{}", path.display());
            }
        }
        Command::Flags { json } => {
            if json {
                let entries: Vec<Value> = registry
                    .overrides()
                    .iter()
                    .map(|(key, address)| json!({ "key": key.to_string(), "address": address }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for line in registry.cli_help() {
                    println!("{}", line);
                }
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args.log_level, args.log_file.clone())?;

    info!("Starting inireg v{}", env!("CARGO_PKG_VERSION"));

    let mut registry = build_registry(&args)?;

    for (config_type, report) in registry.read_all() {
        if !report.missing_sections.is_empty() {
            info!(
                "{} is missing sections: {}",
                config_type,
                report.missing_sections.join(", ")
            );
        }
    }

    for token in &args.overrides {
        let address = registry.apply_override(token)?;
        info!("Override applied to {}", address);
    }

    run(args, registry)
}
