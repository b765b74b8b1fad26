use anyhow::{ensure, Context};
use clap::Parser;
use depgraph_model::{Job, Manifest, Snapshot};
use depgraph_spdx::ManifestReader;
use depgraph_submit::client::SnapshotClient;
use depgraph_submit::{detector, discover_files};
use std::io;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// directory searched for spdx documents
    #[arg(long, env = "INPUT_FILEPATH", default_value = ".")]
    file_path: String,

    /// glob pattern matched inside the search directory
    #[arg(long, env = "INPUT_FILEPATTERN", default_value = "*.spdx.json")]
    file_pattern: String,

    /// repository slug (owner/name) receiving the snapshot
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// token used to authenticate the submission
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// commit sha the snapshot describes
    #[arg(long, env = "GITHUB_SHA")]
    sha: Option<String>,

    /// git ref the snapshot describes
    #[arg(long = "ref", env = "GITHUB_REF")]
    git_ref: Option<String>,

    /// correlator grouping snapshots from the same workflow job
    #[arg(long, env = "GITHUB_JOB", default_value = "depgraph-submit")]
    correlator: String,

    /// run identifier recorded in the snapshot job
    #[arg(long, env = "GITHUB_RUN_ID", default_value = "0")]
    run_id: String,

    /// api base url of the ingestion service
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    api_url: String,

    /// print the snapshot json to stdout instead of submitting it
    #[arg(long)]
    dry_run: bool,

    /// suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

fn build_snapshot(args: &Args, manifests: Vec<Manifest>) -> Snapshot {
    let job = Job {
        id: args.run_id.clone(),
        correlator: args.correlator.clone(),
    };
    let mut snapshot = Snapshot::new(
        detector(),
        job,
        args.sha.clone().unwrap_or_default(),
        args.git_ref.clone().unwrap_or_default(),
    );
    for manifest in manifests {
        snapshot.add_manifest(manifest);
    }
    snapshot
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let files = discover_files(&args.file_path, &args.file_pattern)?;
    if !args.quiet {
        eprintln!("processing {} spdx files", files.len());
        for file in &files {
            eprintln!("  {}", file.display());
        }
    }

    let manifests = ManifestReader::read_files(&files).context("failed to read spdx documents")?;

    if args.dry_run {
        let snapshot = build_snapshot(&args, manifests);
        serde_json::to_writer_pretty(io::stdout().lock(), &snapshot)?;
        println!();
        return Ok(());
    }

    let repository = args
        .repository
        .clone()
        .context("--repository (GITHUB_REPOSITORY) is required to submit")?;
    let token = args
        .token
        .clone()
        .context("--token (GITHUB_TOKEN) is required to submit")?;
    ensure!(
        args.sha.is_some(),
        "--sha (GITHUB_SHA) is required to submit"
    );
    ensure!(
        args.git_ref.is_some(),
        "--ref (GITHUB_REF) is required to submit"
    );

    let snapshot = build_snapshot(&args, manifests);
    let client = SnapshotClient::new(&args.api_url, token)?;
    client.submit(&repository, &snapshot)?;

    if !args.quiet {
        eprintln!(
            "submitted snapshot with {} manifests to {}",
            snapshot.manifests().len(),
            repository
        );
    }

    Ok(())
}
