// src/cli/summarize.rs — `reviselab summarize`: table over a results file

use std::path::Path;

use crate::report;

pub fn run_summarize(path: &Path) -> anyhow::Result<()> {
    let records = report::read_results(path)
        .map_err(|e| anyhow::anyhow!("cannot load results {}: {}", path.display(), e))?;
    print!("{}", report::summarize(&records).render());
    Ok(())
}
