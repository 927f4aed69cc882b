use anyhow::{bail, Context, Result};
use qor::{run_batch, Batch};

use crate::cli::{BatchArgs, Cli};

pub fn run(_cli: &Cli, args: &BatchArgs) -> Result<()> {
    let batch = Batch::from_json_file(&args.jobs)
        .with_context(|| format!("[batch] failed to read job file {}", args.jobs.display()))?;

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("[batch] failed to size the worker pool")?;
    }

    tracing::info!("[batch] running {} jobs", batch.jobs.len());
    let outcomes = run_batch(&batch);

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(summary) => println!("{}\t{}", outcome.name, serde_json::to_string(summary)?),
            Err(e) => {
                failed += 1;
                eprintln!("{}\tfailed: {e}", outcome.name);
            }
        }
    }

    if failed > 0 { bail!("[batch] {failed} of {} jobs failed", outcomes.len()) }
    Ok(())
}
