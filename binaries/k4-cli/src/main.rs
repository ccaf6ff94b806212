//! k4 CLI
//!
//! Brute-force keyword and primer search over Vigenère and Gromark
//! ciphertexts, plus single-key decryption and text statistics.

mod report;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use k4_config::{K4Config, WordlistFile};
use k4_core::alphabet::{KRYPTOS, STANDARD};
use k4_core::{Alphabet, Anchor, ChainedSource, Cipher, KeyedAlphabet, RunningKey, StaticKeywords};
use k4_search::{
    Attack, ConstraintSet, PhraseMatch, ProgressSink, SearchConfig, SearchEngine, SearchPhase,
    SearchReport, SearchRequest, StatisticalBand,
};

#[derive(Parser)]
#[command(name = "k4")]
#[command(about = "Classical cipher search - Vigenère and Gromark keyword/primer sweeps")]
#[command(version)]
struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Worker threads (default: CPU count minus reserved cores)
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Candidates per batch, for both keyword and primer batches
    #[arg(long, global = true)]
    batch_size: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep keywords against a Vigenère ciphertext
    Vigenere(SweepArgs),

    /// Sweep keywords x primers against a Gromark ciphertext
    Gromark {
        #[command(flatten)]
        sweep: SweepArgs,

        /// First primer to try
        #[arg(long)]
        primer_start: Option<u32>,

        /// Last primer to try (inclusive)
        #[arg(long)]
        primer_end: Option<u32>,
    },

    /// Decrypt with one known key
    Decrypt {
        #[command(subcommand)]
        command: DecryptCommands,
    },

    /// Index of coincidence, English deviation and n-gram report
    Analyze {
        /// Text to analyze
        text: String,
    },
}

#[derive(Args)]
struct SweepArgs {
    /// Ciphertext to attack
    #[arg(long)]
    ciphertext: String,

    /// Alphabet to sweep; repeatable. Accepts `standard`, `kryptos` or the
    /// symbols themselves
    #[arg(long)]
    alphabet: Vec<String>,

    /// Phrase every accepted plaintext must contain; repeatable
    #[arg(long)]
    phrase: Vec<String>,

    /// Match phrases as scattered subsequences instead of substrings
    #[arg(long)]
    subsequence: bool,

    /// Keyword tried before the dictionary; repeatable
    #[arg(long)]
    key: Vec<String>,

    /// Known plaintext at a 0-based ciphertext offset, as POS:PLAIN
    #[arg(long)]
    anchor: Vec<String>,

    /// Lower bound on plaintext index of coincidence
    #[arg(long)]
    ic_min: Option<f64>,

    /// Upper bound on plaintext index of coincidence
    #[arg(long)]
    ic_max: Option<f64>,

    /// Mean English frequency deviation must stay below this
    #[arg(long)]
    max_deviation: Option<f64>,

    /// Wordlist file, one keyword per line
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Write the full reports as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Matches to print per alphabet
    #[arg(long, default_value = "20")]
    limit: usize,
}

#[derive(Subcommand)]
enum DecryptCommands {
    /// Vigenère over a possibly keyed alphabet
    Vigenere {
        #[arg(long)]
        ciphertext: String,

        #[arg(long)]
        key: String,

        #[arg(long, default_value = "standard")]
        alphabet: String,
    },

    /// Gromark with keyword-mixed alphabet and 5-digit primer
    Gromark {
        #[arg(long)]
        ciphertext: String,

        #[arg(long)]
        key: String,

        #[arg(long)]
        primer: String,

        #[arg(long, default_value = "standard")]
        alphabet: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze { text } => {
            print!("{}", report::Analysis::of(&text));
            Ok(())
        }
        Commands::Decrypt { command } => {
            let config = K4Config::resolve(cli.config.as_deref())
                .context("Failed to load configuration")?;
            cmd_decrypt(command, &config)
        }
        Commands::Vigenere(sweep) => {
            let config = load_config(cli.config.as_deref(), cli.workers, cli.batch_size, &sweep)?;
            cmd_sweep(&config, &sweep, Attack::Vigenere)
        }
        Commands::Gromark { sweep, primer_start, primer_end } => {
            let mut config = load_config(cli.config.as_deref(), cli.workers, cli.batch_size, &sweep)?;
            if let Some(start) = primer_start {
                config.search.primer_start = start;
            }
            if let Some(end) = primer_end {
                config.search.primer_end = end;
            }
            let primers = config.primer_range().context("Invalid primer range")?;
            cmd_sweep(&config, &sweep, Attack::Gromark { primers })
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "k4=info,k4_search=info,k4_config=info",
        1 => "k4=debug,k4_search=debug,k4_config=debug",
        _ => "k4=trace,k4_search=trace,k4_config=trace",
    };
    let filter = if verbose > 0 {
        tracing_subscriber::EnvFilter::new(default)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file, then flag overrides on top.
fn load_config(
    path: Option<&Path>,
    workers: Option<usize>,
    batch_size: Option<usize>,
    sweep: &SweepArgs,
) -> Result<K4Config> {
    let mut config = K4Config::resolve(path).context("Failed to load configuration")?;
    apply_overrides(&mut config, workers, batch_size, sweep);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn apply_overrides(
    config: &mut K4Config,
    workers: Option<usize>,
    batch_size: Option<usize>,
    sweep: &SweepArgs,
) {
    if let Some(workers) = workers {
        config.search.workers = Some(workers);
    }
    if let Some(size) = batch_size {
        config.search.keyword_batch_size = size;
        config.search.primer_batch_size = size;
    }
    if let Some(dictionary) = &sweep.dictionary {
        config.dictionary.path = Some(dictionary.clone());
    }
    if sweep.ic_min.is_some() {
        config.scoring.ic_min = sweep.ic_min;
    }
    if sweep.ic_max.is_some() {
        config.scoring.ic_max = sweep.ic_max;
    }
    if sweep.max_deviation.is_some() {
        config.scoring.max_deviation = sweep.max_deviation;
    }
    if !sweep.alphabet.is_empty() {
        config.alphabets = sweep
            .alphabet
            .iter()
            .map(|a| resolve_alphabet_name(a).to_string())
            .collect();
    }
}

fn resolve_alphabet_name(name: &str) -> &str {
    match name.to_ascii_lowercase().as_str() {
        "standard" => STANDARD,
        "kryptos" => KRYPTOS,
        _ => name,
    }
}

fn parse_alphabet(name: &str) -> Result<Alphabet> {
    Alphabet::parse(resolve_alphabet_name(name))
        .with_context(|| format!("Invalid alphabet '{name}'"))
}

fn parse_anchor(ciphertext: &str, arg: &str) -> Result<Anchor> {
    let (pos, plain) = arg
        .split_once(':')
        .with_context(|| format!("Anchor '{arg}' is not POS:PLAIN"))?;
    let pos: usize = pos
        .trim()
        .parse()
        .with_context(|| format!("Anchor position '{pos}' is not a number"))?;
    Anchor::at(ciphertext, pos, plain.trim()).with_context(|| format!("Invalid anchor '{arg}'"))
}

fn build_constraints(config: &K4Config, sweep: &SweepArgs) -> Result<ConstraintSet> {
    let mut constraints = ConstraintSet::new().matching(if sweep.subsequence {
        PhraseMatch::Subsequence
    } else {
        PhraseMatch::Substring
    });

    for phrase in &sweep.phrase {
        constraints = constraints.phrase(phrase.as_str());
    }
    for arg in &sweep.anchor {
        constraints = constraints.anchor(parse_anchor(&sweep.ciphertext, arg)?);
    }
    constraints = constraints.band(StatisticalBand {
        ic_min: config.scoring.ic_min,
        ic_max: config.scoring.ic_max,
        max_deviation: config.scoring.max_deviation,
    });

    Ok(constraints)
}

fn search_config(config: &K4Config) -> SearchConfig {
    SearchConfig {
        keyword_batch_size: config.search.keyword_batch_size,
        primer_batch_size: config.search.primer_batch_size,
        workers: config.search.workers,
        reserved_cores: config.search.reserved_cores,
        output_case: config.output_case,
    }
}

/// Priority keys first, then the dictionary.
fn keyword_source(config: &K4Config, sweep: &SweepArgs, alphabet: &Alphabet) -> Result<ChainedSource> {
    let mut source = ChainedSource::new();
    if !sweep.key.is_empty() {
        source = source.with(StaticKeywords::new("keys", sweep.key.iter().cloned()));
    }
    if let Some(wordlist) = WordlistFile::from_settings(&config.dictionary, alphabet.clone()) {
        debug!(path = %wordlist.path().display(), "Using dictionary");
        source = source.with(wordlist);
    }
    if source.is_empty() {
        bail!("No candidate keywords: pass --key or --dictionary, or set dictionary.path in the config");
    }
    Ok(source)
}

fn cmd_sweep(config: &K4Config, sweep: &SweepArgs, attack: Attack) -> Result<()> {
    let constraints = build_constraints(config, sweep)?;
    let alphabets = config.parsed_alphabets().context("Invalid alphabet")?;

    let mut reports: Vec<SearchReport> = Vec::with_capacity(alphabets.len());
    for alphabet in alphabets {
        let source = keyword_source(config, sweep, &alphabet)?;
        let engine = SearchEngine::new(search_config(config))
            .with_progress(Arc::new(BarProgress::new()));
        let request = SearchRequest {
            attack,
            ciphertext: sweep.ciphertext.clone(),
            alphabet,
            constraints: constraints.clone(),
        };

        let report = engine
            .run(request, &source)
            .with_context(|| format!("{} search failed", attack.family()))?;
        if report.summary.skipped > 0 {
            warn!(skipped = report.summary.skipped, "Some candidates could not be evaluated");
        }
        reports.push(report);
    }

    for report in &reports {
        print!("{}", report::Summary(&report.summary));
        print!("{}", report::Matches { matches: &report.matches, limit: sweep.limit });
    }
    if reports.len() > 1 {
        let total: usize = reports.iter().map(|r| r.matches.len()).sum();
        println!("\n  {} matches across {} alphabets", total, reports.len());
    }

    if let Some(path) = &sweep.json {
        write_json(path, &reports)?;
        info!(path = %path.display(), "Wrote JSON report");
    }

    Ok(())
}

/// One alphabet writes a single report object; several write an array.
fn write_json(path: &Path, reports: &[SearchReport]) -> Result<()> {
    let json = match reports {
        [report] => report.to_json()?,
        _ => serde_json::to_string_pretty(reports)?,
    };
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn cmd_decrypt(command: DecryptCommands, config: &K4Config) -> Result<()> {
    match command {
        DecryptCommands::Vigenere { ciphertext, key, alphabet } => {
            let alphabet = parse_alphabet(&alphabet)?;
            if Cipher::vigenere_shifts(&key, &alphabet).is_empty() {
                bail!("Key '{key}' has no symbols from alphabet {alphabet}");
            }
            let plaintext = Cipher::vigenere_decrypt(&ciphertext, &key, &alphabet, config.output_case);

            println!("\n  DECRYPT (VIGENERE)");
            println!("  Alphabet: {}", alphabet);
            println!("  Key:      {}", key);
            println!("  Input:    {}", ciphertext);
            println!("  Output:   {}", plaintext);
            Ok(())
        }

        DecryptCommands::Gromark { ciphertext, key, primer, alphabet } => {
            let alphabet = parse_alphabet(&alphabet)?;
            let keyed = KeyedAlphabet::build(&key, &alphabet)
                .with_context(|| format!("Invalid keyword '{key}'"))?;
            let running = RunningKey::from_primer_str(&primer, ciphertext.chars().count())
                .with_context(|| format!("Invalid primer '{primer}'"))?;
            let plaintext =
                Cipher::gromark_decrypt(&ciphertext, &keyed, &running, &alphabet, config.output_case);

            println!("\n  DECRYPT (GROMARK)");
            println!("  Alphabet:    {}", alphabet);
            println!("  Mixed:       {}", keyed.alphabet());
            println!("  Running key: {}", running);
            println!("  Input:       {}", ciphertext);
            println!("  Output:      {}", plaintext);
            Ok(())
        }
    }
}

/// Progress bar over the current phase's units.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(
            "  {msg:>12} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed_precise}, eta {eta})",
        ) {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar }
    }
}

impl ProgressSink for BarProgress {
    fn phase_started(&self, phase: SearchPhase, total: u64) {
        self.bar.reset();
        self.bar.set_length(total);
        self.bar.set_message(phase.to_string());
    }

    fn advanced(&self, _attempts: u64, _matches: usize) {
        self.bar.inc(1);
    }

    fn finished(&self) {
        self.bar.finish_and_clear();
    }
}
