mod config;
#[cfg(feature = "web")]
mod web;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use recur_core::{
    to_plain_text, Algorithm, AlgorithmCatalog, Case, Classification, PlotSeries,
    RecurrenceParams,
};
use recur_store::SqliteStore;

use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "recur",
    version,
    about = "Master Theorem evaluator for divide-and-conquer recurrences"
)]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify T(n) = aT(n/b) + n^k
    #[command(allow_negative_numbers = true)]
    Evaluate {
        /// Number of subproblems (>= 1)
        a: i64,
        /// Factor by which the problem size shrinks (>= 2)
        b: i64,
        /// Exponent of the non-recursive work (>= 0)
        k: i64,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Keep <sup>/<sub> markup instead of plain notation
        #[arg(long)]
        html: bool,
    },

    /// Sample n^log_b(a), f(n) and T(n) over n in [1, 100]
    #[command(allow_negative_numbers = true)]
    Plot {
        a: i64,
        b: i64,
        k: i64,

        /// Output format
        #[arg(short, long, default_value = "csv")]
        format: PlotFormat,

        /// Keep every n-th point (the last point is always kept)
        #[arg(short, long, default_value = "1")]
        every: usize,
    },

    /// Manage the algorithm catalog
    Algorithms {
        #[command(subcommand)]
        command: AlgorithmCommands,
    },

    /// Show the active configuration
    Config,

    /// Run the MCP server on stdio
    Mcp,

    /// Serve the HTTP API
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum AlgorithmCommands {
    /// List algorithms in creation order
    List {
        /// Only algorithms in this case (1, 2 or 3)
        #[arg(short, long)]
        case: Option<Case>,
    },

    /// Show one algorithm by name or id
    Show {
        /// Name (case-insensitive) or id
        name: String,
    },

    /// Add an algorithm to the catalog
    #[command(allow_negative_numbers = true)]
    Add {
        /// Unique name
        #[arg(short, long)]
        name: String,

        #[arg(short)]
        a: i64,

        #[arg(short)]
        b: i64,

        #[arg(short)]
        k: i64,

        /// What the algorithm does
        #[arg(short, long)]
        description: String,

        /// Code snippet
        #[arg(long, conflicts_with = "code_file")]
        code: Option<String>,

        /// Read the code snippet from a file
        #[arg(long)]
        code_file: Option<PathBuf>,

        /// Free-form complexity analysis
        #[arg(long)]
        analysis: Option<String>,
    },

    /// Remove an algorithm by name or id
    Remove {
        name: String,
    },

    /// Insert the builtin algorithms that are missing
    Seed,

    /// Show catalog statistics
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlotFormat {
    Csv,
    Json,
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("dev", "recur", "recur")
        .map(|dirs| dirs.data_dir().join("algorithms.db"))
        .unwrap_or_else(|| PathBuf::from("algorithms.db"))
}

fn open_store(db: Option<PathBuf>, cfg: &Config) -> Result<SqliteStore> {
    let path = db
        .or_else(|| cfg.store.path.as_ref().map(PathBuf::from))
        .unwrap_or_else(default_db_path);
    let store = SqliteStore::new(&path).context("failed to open database")?;
    if cfg.catalog.seed_on_start && store.count()? == 0 {
        recur_store::seed_builtin(&store)?;
    }
    Ok(store)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config()?;

    match cli.command {
        Commands::Evaluate {
            a,
            b,
            k,
            json,
            html,
        } => cmd_evaluate(a, b, k, json, html),
        Commands::Plot {
            a,
            b,
            k,
            format,
            every,
        } => cmd_plot(a, b, k, format, every),
        Commands::Algorithms { command } => {
            let store = open_store(cli.db, &cfg)?;
            match command {
                AlgorithmCommands::List { case } => cmd_algorithms_list(&store, case),
                AlgorithmCommands::Show { name } => cmd_algorithms_show(&store, &name),
                AlgorithmCommands::Add {
                    name,
                    a,
                    b,
                    k,
                    description,
                    code,
                    code_file,
                    analysis,
                } => {
                    let code = match code_file {
                        Some(path) => std::fs::read_to_string(&path)
                            .with_context(|| format!("reading {}", path.display()))?,
                        None => code.unwrap_or_default(),
                    };
                    let params = RecurrenceParams::new(a, b, k)?;
                    cmd_algorithms_add(&store, name, params, description, code, analysis)
                }
                AlgorithmCommands::Remove { name } => cmd_algorithms_remove(&store, &name),
                AlgorithmCommands::Seed => cmd_algorithms_seed(&store),
                AlgorithmCommands::Stats => cmd_algorithms_stats(&store),
            }
        }
        Commands::Config => cmd_config(&cfg),
        Commands::Mcp => {
            let store = open_store(cli.db, &cfg)?;
            let options = recur_mcp::ServerOptions {
                instructions: cfg.mcp.instructions.clone(),
            };
            recur_mcp::run_server(&store, &options)
        }
        Commands::Serve { host, port } => {
            let store = open_store(cli.db, &cfg)?;
            cmd_serve(store, cfg, host, port)
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation commands
// ---------------------------------------------------------------------------

fn render(markup: &str, html: bool) -> String {
    if html {
        markup.to_string()
    } else {
        to_plain_text(markup)
    }
}

fn print_classification(c: &Classification, html: bool) {
    println!("Recurrence Relation: {}", render(&c.recurrence_relation, html));
    println!("Complexity:          {}", render(&c.complexity, html));
    println!("Case:                {}", render(&c.case_label, html));
    if c.case == Case::Three {
        let met = if c.regularity_condition_met {
            "met"
        } else {
            "not met"
        };
        println!("Regularity:          {met}");
    }
}

fn cmd_evaluate(a: i64, b: i64, k: i64, json: bool, html: bool) -> Result<()> {
    let params = RecurrenceParams::new(a, b, k)?;
    let classification = params.classify();

    if json {
        println!("{}", serde_json::to_string_pretty(&classification)?);
    } else {
        print_classification(&classification, html);
    }
    Ok(())
}

fn plot_csv(series: &PlotSeries) -> String {
    let mut out = String::from("n,n_log_b_a,f_n,time_complexity\n");
    for (n, l, f, t) in series.rows() {
        out.push_str(&format!("{n},{l},{f},{t}\n"));
    }
    out
}

fn cmd_plot(a: i64, b: i64, k: i64, format: PlotFormat, every: usize) -> Result<()> {
    let series = RecurrenceParams::new(a, b, k)?.sample().every_nth(every);
    match format {
        PlotFormat::Csv => print!("{}", plot_csv(&series)),
        PlotFormat::Json => println!("{}", serde_json::to_string(&series)?),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Catalog commands
// ---------------------------------------------------------------------------

fn print_algorithm_line(algo: &Algorithm) {
    let p = &algo.params;
    let bound = algo
        .time_complexity
        .as_deref()
        .map(to_plain_text)
        .unwrap_or_else(|| "unclassified".into());
    println!(
        "  {:<32} a={:<3} b={:<3} k={:<3} {}",
        algo.name,
        p.a(),
        p.b(),
        p.k(),
        bound
    );
}

fn cmd_algorithms_list(store: &SqliteStore, case: Option<Case>) -> Result<()> {
    let algos = match case {
        Some(c) => store.list_by_case(c)?,
        None => store.list()?,
    };

    if algos.is_empty() {
        println!("No algorithms found.");
        return Ok(());
    }

    for algo in &algos {
        print_algorithm_line(algo);
    }
    Ok(())
}

fn find(store: &SqliteStore, name: &str) -> Result<Algorithm> {
    match store.resolve(name)? {
        Some(a) => Ok(a),
        None => bail!("algorithm not found: {name}"),
    }
}

fn cmd_algorithms_show(store: &SqliteStore, name: &str) -> Result<()> {
    let algo = find(store, name)?;
    println!("{} ({})", algo.name, algo.id);
    println!("{}", algo.description);
    println!();
    print_classification(&algo.params.classify(), false);
    if let Some(ref analysis) = algo.complexity_analysis {
        println!("Analysis:            {analysis}");
    }
    println!("Added:               {}", algo.created_at.format("%Y-%m-%d %H:%M"));
    if !algo.code.is_empty() {
        println!();
        println!("{}", algo.code);
    }
    Ok(())
}

fn cmd_algorithms_add(
    store: &SqliteStore,
    name: String,
    params: RecurrenceParams,
    description: String,
    code: String,
    analysis: Option<String>,
) -> Result<()> {
    let mut algo = Algorithm::new(name, params, description, code).analyze();
    algo.complexity_analysis = analysis;
    let bound = algo
        .time_complexity
        .as_deref()
        .map(to_plain_text)
        .unwrap_or_default();
    let id = store.add(algo)?;
    println!("Added: {id} ({bound})");
    Ok(())
}

fn cmd_algorithms_remove(store: &SqliteStore, name: &str) -> Result<()> {
    let algo = find(store, name)?;
    store.delete(&algo.id)?;
    println!("Removed: {} ({})", algo.name, algo.id);
    Ok(())
}

fn cmd_algorithms_seed(store: &SqliteStore) -> Result<()> {
    let inserted = recur_store::seed_builtin(store)?;
    println!("Seeded {inserted} builtin algorithms.");
    Ok(())
}

fn cmd_algorithms_stats(store: &SqliteStore) -> Result<()> {
    let stats = store.stats()?;
    println!("Algorithms: {}", stats.total);
    for (case, count) in &stats.by_case {
        println!("  Case {}:   {count}", case.number());
    }
    if let Some(newest) = stats.newest {
        println!("Newest:     {}", newest.format("%Y-%m-%d %H:%M"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config / serve
// ---------------------------------------------------------------------------

fn cmd_config(cfg: &Config) -> Result<()> {
    println!("Config: {}", config::show_config_path());
    println!();
    println!("[store]");
    println!(
        "  path = {}",
        cfg.store
            .path
            .as_deref()
            .unwrap_or("(default platform path)")
    );
    println!("  default = {}", default_db_path().display());
    println!();
    println!("[web]");
    println!("  host = {}", cfg.web.host);
    println!("  port = {}", cfg.web.port);
    println!("  allowed_origins = {}", cfg.web.allowed_origins.join(", "));
    println!();
    println!("[catalog]");
    println!("  seed_on_start = {}", cfg.catalog.seed_on_start);
    println!();
    println!("[mcp]");
    if let Some(ref instr) = cfg.mcp.instructions {
        println!("  instructions = {instr}");
    }
    Ok(())
}

#[cfg(feature = "web")]
fn cmd_serve(
    store: SqliteStore,
    mut cfg: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(h) = host {
        cfg.web.host = h;
    }
    if let Some(p) = port {
        cfg.web.port = p;
    }
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(web::serve(store, &cfg.web))
}

#[cfg(not(feature = "web"))]
fn cmd_serve(
    _store: SqliteStore,
    _cfg: Config,
    _host: Option<String>,
    _port: Option<u16>,
) -> Result<()> {
    bail!("web feature not enabled — rebuild with `--features web`")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_evaluate() {
        let cli = Cli::try_parse_from(["recur", "evaluate", "2", "2", "1", "--json"]).unwrap();
        match cli.command {
            Commands::Evaluate { a, b, k, json, .. } => {
                assert_eq!((a, b, k), (2, 2, 1));
                assert!(json);
            }
            _ => panic!("expected evaluate"),
        }
    }

    #[test]
    fn test_parse_negative_values_reach_validation() {
        let cli = Cli::try_parse_from(["recur", "evaluate", "-1", "2", "1"]).unwrap();
        match cli.command {
            Commands::Evaluate { a, b, k, .. } => {
                assert!(RecurrenceParams::new(a, b, k).is_err());
            }
            _ => panic!("expected evaluate"),
        }
    }

    #[test]
    fn test_parse_algorithms_list_case() {
        let cli = Cli::try_parse_from(["recur", "algorithms", "list", "--case", "3"]).unwrap();
        match cli.command {
            Commands::Algorithms {
                command: AlgorithmCommands::List { case },
            } => assert_eq!(case, Some(Case::Three)),
            _ => panic!("expected algorithms list"),
        }
    }

    #[test]
    fn test_plot_csv_shape() {
        let series = RecurrenceParams::new(2, 2, 1).unwrap().sample();
        let csv = plot_csv(&series);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 401);
        assert_eq!(lines[0], "n,n_log_b_a,f_n,time_complexity");
        assert!(lines[1].starts_with("1,1,1,0"));
        assert!(lines[400].starts_with("100,"));
    }

    #[test]
    fn test_open_store_seeds_empty_catalog_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("algorithms.db");
        let cfg = Config::default();

        let store = open_store(Some(path.clone()), &cfg).unwrap();
        let seeded = store.count().unwrap();
        assert!(seeded > 0);

        let first = store.list().unwrap().remove(0);
        store.delete(&first.id).unwrap();
        drop(store);

        // Non-empty catalog is left alone on the next start.
        let store = open_store(Some(path), &cfg).unwrap();
        assert_eq!(store.count().unwrap(), seeded - 1);
    }

    #[test]
    fn test_open_store_respects_seed_flag() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.catalog.seed_on_start = false;
        let store = open_store(Some(dir.path().join("empty.db")), &cfg).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }
}
