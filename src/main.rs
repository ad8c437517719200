use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use vanish_wipe::orchestrator::{WipeOrchestrator, WipeTarget};
use vanish_wipe::ui::progress::{human_bytes, ConsoleProgress};
use vanish_wipe::{NullProgress, ProgressSink, WipeConfig, WipeMethod, WipeResult};

#[derive(Parser)]
#[command(name = "vanish")]
#[command(about = "Secure data erasure for files, directories and free disk space")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Overwrite method
    #[arg(short, long, global = true, value_enum, default_value_t = MethodArg::Dod3)]
    method: MethodArg,

    /// Print the final record as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Suppress progress output and the summary
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Securely erase a single file
    File {
        /// Path of the file to erase
        path: PathBuf,
    },

    /// Recursively erase a directory tree
    Dir {
        /// Path of the directory to erase
        path: PathBuf,
    },

    /// Overwrite the free space of a volume
    FreeSpace {
        /// Directory on the volume to fill
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    /// One pass of zeros
    Single,
    /// DoD 5220.22-M, 3 passes
    Dod3,
    /// DoD 5220.22-M ECE, 7 passes
    Dod7,
    /// Gutmann-inspired, 35 passes
    Gutmann,
}

impl From<MethodArg> for WipeMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Single => WipeMethod::SinglePass,
            MethodArg::Dod3 => WipeMethod::DoD3Pass,
            MethodArg::Dod7 => WipeMethod::DoD7Pass,
            MethodArg::Gutmann => WipeMethod::Gutmann,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let method: WipeMethod = cli.method.into();
    let target = match &cli.command {
        Commands::File { path } => WipeTarget::File(path.clone()),
        Commands::Dir { path } => WipeTarget::Directory(path.clone()),
        Commands::FreeSpace { path } => WipeTarget::FreeSpace(path.clone()),
    };

    if !cli.yes && !confirm(&target, method)? {
        println!("Aborted.");
        return Ok(());
    }

    let orchestrator = WipeOrchestrator::new(method, WipeConfig::default());

    // Ctrl+C flips the shared token; the wipe stops at the next block
    let cancel = orchestrator.cancel_token();
    signal_hook::flag::register(signal_hook::consts::SIGINT, cancel.flag())?;

    let console: Option<Arc<ConsoleProgress>> =
        (!cli.quiet && !cli.json).then(|| Arc::new(ConsoleProgress::new()));
    let sink: Arc<dyn ProgressSink> = match &console {
        Some(bar) => bar.clone(),
        None => Arc::new(NullProgress),
    };

    let result = orchestrator.execute(target, sink).await;

    if let Some(bar) = &console {
        bar.finish();
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if !cli.quiet {
        print_summary(&result, method);
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn confirm(target: &WipeTarget, method: WipeMethod) -> Result<bool> {
    println!(
        "{}",
        "WARNING: erased data cannot be recovered.".red().bold()
    );
    match target {
        WipeTarget::File(path) => println!("File to erase:      {}", path.display()),
        WipeTarget::Directory(path) => println!("Directory to erase: {}", path.display()),
        WipeTarget::FreeSpace(path) => {
            println!("Free space to wipe on the volume containing: {}", path.display())
        }
    }
    println!("Method:             {}", method.name());

    print!("\nType 'YES' to confirm: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim() == "YES")
}

fn print_summary(result: &WipeResult, method: WipeMethod) {
    if result.success {
        println!("{}", "✓ Wipe completed".green().bold());
    } else {
        println!("{}", "✗ Wipe failed".red().bold());
    }

    println!("  Method:   {}", method.name());
    println!("  Bytes:    {}", human_bytes(result.bytes_wiped as f64));
    println!("  Passes:   {}", result.passes_completed);
    println!(
        "  Duration: {}",
        humantime::format_duration(Duration::from_secs(result.duration_secs as u64))
    );

    if let Some(error) = &result.error {
        println!("  {}    {}", "Error:".red(), error);
    }
}
